//! Category listing processor

use async_trait::async_trait;
use http::Method;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::request::RequestContext;
use crate::response::ResponseContext;
use crate::workspace::WorkspaceManager;

/// GET/HEAD fetch the collection's category document
pub struct CategoriesRequestProcessor;

#[async_trait]
impl RequestProcessor for CategoriesRequestProcessor {
    async fn process(
        &self,
        request: &RequestContext,
        _manager: &WorkspaceManager,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        match *request.method() {
            Method::GET | Method::HEAD => adapter.get_categories(request).await.map(Some),
            _ => Ok(None),
        }
    }
}
