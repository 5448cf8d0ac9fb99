//! Collection-level processor (list and create)

use async_trait::async_trait;
use http::Method;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::request::RequestContext;
use crate::response::ResponseContext;
use crate::workspace::WorkspaceManager;

/// GET/HEAD list the collection, POST creates an entry
pub struct CollectionRequestProcessor;

#[async_trait]
impl RequestProcessor for CollectionRequestProcessor {
    async fn process(
        &self,
        request: &RequestContext,
        _manager: &WorkspaceManager,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        match *request.method() {
            Method::GET | Method::HEAD => adapter.get_feed(request).await.map(Some),
            Method::POST => adapter.post_entry(request).await.map(Some),
            _ => Ok(None),
        }
    }
}
