//! The workspace provider: transactional request dispatch
//!
//! [`WorkspaceProvider`] is the core state machine. One dispatch cycle
//! per request: resolve the target, find the processor for the target
//! type and the adapter for the target's workspace and collection, run
//! the transactional hooks around the processor, classify any failure,
//! and always produce a response. The provider holds no per-request
//! state and is safe for concurrent use.
//!
//! Dispatch exits:
//! - unroutable target, unconfigured target type, or unregistered
//!   collection: 404, nothing else runs
//! - processor (or extension fallback) response: returned as-is
//! - neither claimed the request: 400
//! - any error: classified, compensated, answered with the original
//!   status (500 when the error carries none)
//!
//! After a successful transactional `start`, `end` runs exactly once on
//! every exit, with whatever response dispatch produced. A failed
//! `start` is compensated and classified like a processing failure but
//! skips `end`: no commit boundary was opened.

use arc_swap::ArcSwap;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::adapter::{CollectionAdapter, Transactional};
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::processor::{ProcessorTable, RequestProcessor};
use crate::request::RequestContext;
use crate::resolver::TargetResolver;
use crate::response::{self, ResponseContext};
use crate::target::{Target, TargetType};
use crate::uri::{TemplateParameters, UriTemplate};
use crate::workspace::WorkspaceManager;

/// Request dispatcher over a registry of workspaces
pub struct WorkspaceProvider {
    resolver: TargetResolver,
    processors: ProcessorTable,
    manager: WorkspaceManager,
    filters: ArcSwap<Vec<Arc<dyn Filter>>>,
}

impl WorkspaceProvider {
    /// Create a provider with the default processors and an empty registry
    pub fn new(host: HostConfig) -> Self {
        Self {
            resolver: TargetResolver::new(),
            processors: ProcessorTable::with_defaults(),
            manager: WorkspaceManager::new(host),
            filters: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// The workspace registry
    pub fn workspace_manager(&self) -> &WorkspaceManager {
        &self.manager
    }

    /// The target resolver
    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Resolve (and pin) the target for a request
    pub fn resolve_target<'a>(&self, request: &'a RequestContext) -> &'a Target {
        request.resolve_target(&self.resolver)
    }

    /// Build an absolute URL for a logical route
    pub fn url_for(
        &self,
        request: &RequestContext,
        template: UriTemplate,
        parameters: Option<TemplateParameters>,
    ) -> Result<String> {
        self.manager.url_for(request, template, parameters)
    }

    /// Replace the processor table
    pub fn set_processors(&self, processors: HashMap<TargetType, Arc<dyn RequestProcessor>>) {
        self.processors.set(processors);
    }

    /// Merge processors into the table
    pub fn add_processors(&self, processors: HashMap<TargetType, Arc<dyn RequestProcessor>>) {
        self.processors.merge(processors);
    }

    /// Read-only snapshot of the processor table
    pub fn processors(&self) -> Arc<HashMap<TargetType, Arc<dyn RequestProcessor>>> {
        self.processors.snapshot()
    }

    /// Append filters to the ordered list
    pub fn add_filters(&self, filters: Vec<Arc<dyn Filter>>) {
        self.filters.rcu(|current| {
            let mut list = (**current).clone();
            list.extend(filters.clone());
            list
        });
    }

    /// Replace the filter list
    pub fn set_filters(&self, filters: Vec<Arc<dyn Filter>>) {
        self.filters.store(Arc::new(filters));
    }

    /// The ordered filter list
    pub fn filters(&self) -> Arc<Vec<Arc<dyn Filter>>> {
        self.filters.load_full()
    }

    /// Run the filter chain around one dispatch cycle
    ///
    /// `before` hooks run in order; the first to return a response (or
    /// fail) short-circuits dispatch. `after` hooks run in reverse order
    /// on the final response either way.
    pub async fn dispatch(&self, request: &RequestContext) -> ResponseContext {
        let filters = self.filters.load_full();

        let mut response = None;

        for filter in filters.iter() {
            match filter.before(request).await {
                Ok(None) => {}
                Ok(Some(intercepted)) => {
                    response = Some(intercepted);
                    break;
                }
                Err(err) => {
                    response = Some(self.fail(request, None, err).await);
                    break;
                }
            }
        }

        let mut response = match response {
            Some(response) => response,
            None => self.process(request).await,
        };

        for filter in filters.iter().rev() {
            filter.after(request, &mut response).await;
        }

        response
    }

    /// Run one dispatch cycle
    pub async fn process(&self, request: &RequestContext) -> ResponseContext {
        let target = request.resolve_target(&self.resolver);

        if target.kind() == TargetType::NotFound {
            tracing::debug!(path = request.path(), "No route matched");
            return response::not_found();
        }

        // An unconfigured target type answers like an unroutable request
        let Some(processor) = self.processors.get(target.kind()) else {
            tracing::debug!(target = %target.kind(), "No processor registered");
            return response::not_found();
        };

        let Some(adapter) = self.manager.collection_adapter(request) else {
            tracing::debug!(
                workspace = target.workspace().unwrap_or_default(),
                collection = target.collection().unwrap_or_default(),
                "No collection adapter registered"
            );
            return response::not_found();
        };

        let transaction = adapter.transactional();

        if let Some(tx) = transaction {
            if let Err(err) = tx.start(request).await {
                // No commit boundary was opened, so end is skipped; the
                // failure still compensates and classifies like any other
                return self.fail(request, Some(tx), err).await;
            }
        }

        let outcome = self
            .invoke(request, processor.as_ref(), adapter.as_ref())
            .await;

        let response = match outcome {
            Ok(Some(response)) => Some(response),
            Ok(None) => None,
            Err(err) => Some(self.fail(request, transaction, err).await),
        };

        if let Some(tx) = transaction {
            tx.end(request, response.as_ref()).await;
        }

        response.unwrap_or_else(response::bad_request)
    }

    /// Processor invocation with the extension fallback
    ///
    /// Panics are converted to internal errors so the transactional
    /// hooks still run. The extension hook is consulted only when the
    /// processor declined the request.
    async fn invoke(
        &self,
        request: &RequestContext,
        processor: &dyn RequestProcessor,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        let processed = AssertUnwindSafe(processor.process(request, &self.manager, adapter))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(Error::Internal("processor panicked".to_string())))?;

        if let Some(response) = processed {
            return Ok(Some(response));
        }

        AssertUnwindSafe(adapter.extension_request(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(Error::Internal("extension request panicked".to_string())))
    }

    /// Classify a failure, compensate, and build the error response
    async fn fail(
        &self,
        request: &RequestContext,
        transaction: Option<&dyn Transactional>,
        error: Error,
    ) -> ResponseContext {
        let disposition = error.classify();

        if disposition.client_error {
            // routine 4xx outcomes stay out of the error log
            tracing::info!(
                status = disposition.status.as_u16(),
                path = request.path(),
                "{}",
                error
            );
        } else {
            tracing::error!(
                status = disposition.status.as_u16(),
                path = request.path(),
                error = ?error,
                "Request processing failed"
            );
        }

        if let Some(tx) = transaction {
            tx.compensate(request, &error).await;
        }

        response::error_response(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::{Method, StatusCode};
    use std::sync::Mutex;

    use crate::response::{Document, ATOM};

    type EventLog = Arc<Mutex<Vec<String>>>;

    fn log(events: &EventLog, event: impl Into<String>) {
        events.lock().unwrap().push(event.into());
    }

    #[derive(Clone, Copy, PartialEq)]
    enum EntryMode {
        Succeed,
        FailForbidden,
        FailOpaque,
        Panic,
    }

    struct RecordingTx {
        events: EventLog,
        fail_start: bool,
    }

    #[async_trait]
    impl Transactional for RecordingTx {
        async fn start(&self, _request: &RequestContext) -> Result<()> {
            log(&self.events, "start");
            if self.fail_start {
                return Err(Error::Transaction("start refused".to_string()));
            }
            Ok(())
        }

        async fn end(&self, _request: &RequestContext, response: Option<&ResponseContext>) {
            let status = response
                .map(|r| r.status().as_u16().to_string())
                .unwrap_or_else(|| "none".to_string());
            log(&self.events, format!("end({})", status));
        }

        async fn compensate(&self, _request: &RequestContext, _error: &Error) {
            log(&self.events, "compensate");
        }
    }

    struct TestAdapter {
        events: EventLog,
        mode: EntryMode,
        tx: Option<RecordingTx>,
        extension_response: bool,
    }

    impl TestAdapter {
        fn new(events: EventLog, mode: EntryMode) -> Self {
            Self {
                events,
                mode,
                tx: None,
                extension_response: false,
            }
        }

        fn with_transaction(mut self, fail_start: bool) -> Self {
            self.tx = Some(RecordingTx {
                events: self.events.clone(),
                fail_start,
            });
            self
        }

        fn with_extension_response(mut self) -> Self {
            self.extension_response = true;
            self
        }
    }

    #[async_trait]
    impl CollectionAdapter for TestAdapter {
        async fn get_entry(&self, _request: &RequestContext) -> Result<ResponseContext> {
            log(&self.events, "get_entry");
            match self.mode {
                EntryMode::Succeed => Ok(response::ok(Document::new("<entry/>"), ATOM)),
                EntryMode::FailForbidden => Err(Error::Forbidden("no access".to_string())),
                EntryMode::FailOpaque => Err(anyhow::anyhow!("storage exploded").into()),
                EntryMode::Panic => panic!("adapter bug"),
            }
        }

        async fn extension_request(
            &self,
            _request: &RequestContext,
        ) -> Result<Option<ResponseContext>> {
            log(&self.events, "extension");
            if self.extension_response {
                Ok(Some(response::ok(Document::new("<extended/>"), ATOM)))
            } else {
                Ok(None)
            }
        }

        fn transactional(&self) -> Option<&dyn Transactional> {
            self.tx.as_ref().map(|tx| tx as &dyn Transactional)
        }
    }

    fn provider_with(adapter: TestAdapter) -> WorkspaceProvider {
        let provider = WorkspaceProvider::new(HostConfig::default());
        provider
            .workspace_manager()
            .register_workspace("workspace1", "Workspace One");
        provider
            .workspace_manager()
            .register_collection("workspace1", "feedA", "Feed A", Arc::new(adapter))
            .unwrap();
        provider
    }

    fn request(method: Method, path: &str) -> RequestContext {
        RequestContext::new(method, path.parse().unwrap())
    }

    fn events() -> EventLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_unroutable_request_is_404_without_side_effects() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));

        let response = provider.process(&request(Method::GET, "/")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_processor_type_is_404() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));
        provider.set_processors(HashMap::new());

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_collection_is_404() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedB/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_brackets_processing_with_start_and_end() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::Succeed).with_transaction(false);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "get_entry", "end(200)"]
        );
    }

    #[tokio::test]
    async fn test_client_error_compensates_before_end() {
        let log = events();
        let adapter =
            TestAdapter::new(log.clone(), EntryMode::FailForbidden).with_transaction(false);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.error().is_some());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "get_entry", "compensate", "end(403)"]
        );
    }

    #[tokio::test]
    async fn test_statusless_error_defaults_to_500() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::FailOpaque).with_transaction(false);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "get_entry", "compensate", "end(500)"]
        );
    }

    #[tokio::test]
    async fn test_processor_panic_still_releases_transaction() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::Panic).with_transaction(false);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "get_entry", "compensate", "end(500)"]
        );
    }

    #[tokio::test]
    async fn test_extension_runs_only_when_processor_declines() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::Succeed)
            .with_transaction(false)
            .with_extension_response();
        let provider = provider_with(adapter);

        // PATCH is unclaimed by the entry processor
        let response = provider
            .process(&request(Method::PATCH, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "extension", "end(200)"]
        );
    }

    #[tokio::test]
    async fn test_extension_not_consulted_on_success_or_error() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));
        provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;
        assert!(!log.lock().unwrap().contains(&"extension".to_string()));

        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::FailForbidden));
        provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;
        assert!(!log.lock().unwrap().contains(&"extension".to_string()));
    }

    #[tokio::test]
    async fn test_unclaimed_request_without_extension_is_400() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::Succeed).with_transaction(false);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::PATCH, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // end still runs, observing that no response was produced
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "extension", "end(none)"]
        );
    }

    #[tokio::test]
    async fn test_failed_start_compensates_and_skips_end() {
        let log = events();
        let adapter = TestAdapter::new(log.clone(), EntryMode::Succeed).with_transaction(true);
        let provider = provider_with(adapter);

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*log.lock().unwrap(), vec!["start", "compensate"]);
    }

    #[tokio::test]
    async fn test_non_transactional_adapter_dispatches_plainly() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));

        let response = provider
            .process(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["get_entry"]);
    }

    #[tokio::test]
    async fn test_service_discovery_lists_registered_workspaces() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log, EntryMode::Succeed));

        let response = provider.process(&request(Method::GET, "/workspace1")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), response::ATOM_SERVICE);

        let body = response.body().and_then(Document::as_str).unwrap();
        assert!(body.contains("Workspace One"));
        assert!(body.contains("Feed A"));
        assert_eq!(body.matches("<workspace>").count(), 1);
    }

    #[tokio::test]
    async fn test_processor_registration_api() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log, EntryMode::Succeed));

        assert_eq!(provider.processors().len(), 5);

        provider.set_processors(HashMap::new());
        assert!(provider.processors().is_empty());

        provider.add_processors(crate::processors::defaults());
        assert_eq!(provider.processors().len(), 5);
    }

    struct TaggingFilter {
        events: EventLog,
        name: &'static str,
        intercept: bool,
    }

    #[async_trait]
    impl Filter for TaggingFilter {
        async fn before(
            &self,
            _request: &RequestContext,
        ) -> Result<Option<ResponseContext>> {
            log(&self.events, format!("before:{}", self.name));
            if self.intercept {
                return Ok(Some(response::no_content()));
            }
            Ok(None)
        }

        async fn after(&self, _request: &RequestContext, _response: &mut ResponseContext) {
            log(&self.events, format!("after:{}", self.name));
        }
    }

    #[tokio::test]
    async fn test_filters_wrap_dispatch_in_order() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));
        provider.add_filters(vec![
            Arc::new(TaggingFilter {
                events: log.clone(),
                name: "outer",
                intercept: false,
            }),
            Arc::new(TaggingFilter {
                events: log.clone(),
                name: "inner",
                intercept: false,
            }),
        ]);

        let response = provider
            .dispatch(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "before:outer",
                "before:inner",
                "get_entry",
                "after:inner",
                "after:outer"
            ]
        );
    }

    #[tokio::test]
    async fn test_intercepting_filter_short_circuits_dispatch() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));
        provider.set_filters(vec![Arc::new(TaggingFilter {
            events: log.clone(),
            name: "guard",
            intercept: true,
        })]);

        let response = provider
            .dispatch(&request(Method::GET, "/workspace1/feedA/entry42"))
            .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before:guard", "after:guard"]
        );
    }

    #[tokio::test]
    async fn test_filter_list_accessor_preserves_order() {
        let log = events();
        let provider = provider_with(TestAdapter::new(log.clone(), EntryMode::Succeed));
        provider.add_filters(vec![Arc::new(TaggingFilter {
            events: log.clone(),
            name: "first",
            intercept: false,
        })]);
        provider.add_filters(vec![Arc::new(TaggingFilter {
            events: log,
            name: "second",
            intercept: false,
        })]);

        assert_eq!(provider.filters().len(), 2);
    }
}
