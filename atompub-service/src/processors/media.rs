//! Media resource processor

use async_trait::async_trait;
use http::Method;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::request::RequestContext;
use crate::response::ResponseContext;
use crate::workspace::WorkspaceManager;

/// GET/HEAD fetch an entry's media resource, PUT replaces it
pub struct MediaRequestProcessor;

#[async_trait]
impl RequestProcessor for MediaRequestProcessor {
    async fn process(
        &self,
        request: &RequestContext,
        _manager: &WorkspaceManager,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        match *request.method() {
            Method::GET | Method::HEAD => adapter.get_media(request).await.map(Some),
            Method::PUT => adapter.put_media(request).await.map(Some),
            _ => Ok(None),
        }
    }
}
