//! Request/response filters applied around dispatch
//!
//! Filters are the hosting server's interception points (logging, auth,
//! request shaping). The core stores an ordered list and applies it at
//! the dispatch boundary; what a filter does is entirely external.

use async_trait::async_trait;

use crate::error::Result;
use crate::request::RequestContext;
use crate::response::ResponseContext;

/// An interceptor around the dispatch cycle
///
/// `before` hooks run in registration order; returning a response
/// short-circuits dispatch and the remaining `before` hooks. `after`
/// hooks run in reverse registration order on whatever response dispatch
/// produced, short-circuited or not.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Inspect or intercept the request before dispatch
    async fn before(&self, request: &RequestContext) -> Result<Option<ResponseContext>> {
        let _ = request;
        Ok(None)
    }

    /// Observe or rewrite the response after dispatch
    async fn after(&self, request: &RequestContext, response: &mut ResponseContext) {
        let _ = (request, response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    struct PassThrough;

    impl Filter for PassThrough {}

    #[tokio::test]
    async fn test_default_filter_passes_through() {
        let request = RequestContext::new(Method::GET, "/workspace1".parse().unwrap());
        let outcome = PassThrough.before(&request).await.unwrap();
        assert!(outcome.is_none());

        let mut response = crate::response::not_found();
        PassThrough.after(&request, &mut response).await;
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
