//! Entry-level processor (fetch, replace, delete)

use async_trait::async_trait;
use http::Method;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::request::RequestContext;
use crate::response::ResponseContext;
use crate::workspace::WorkspaceManager;

/// GET/HEAD fetch an entry, PUT replaces it, DELETE removes it
pub struct EntryRequestProcessor;

#[async_trait]
impl RequestProcessor for EntryRequestProcessor {
    async fn process(
        &self,
        request: &RequestContext,
        _manager: &WorkspaceManager,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        match *request.method() {
            Method::GET | Method::HEAD => adapter.get_entry(request).await.map(Some),
            Method::PUT => adapter.put_entry(request).await.map(Some),
            Method::DELETE => adapter.delete_entry(request).await.map(Some),
            _ => Ok(None),
        }
    }
}
