//! Collection adapters and the transactional capability
//!
//! A [`CollectionAdapter`] is the storage-facing half of a collection:
//! the dispatch core sequences calls into it but owns none of its CRUD
//! logic. Every operation has a default body answering 405, so adapters
//! implement only the operations their storage supports.
//!
//! Adapters that need a request-scoped resource (a connection, a lock, a
//! unit of work) expose it through [`Transactional`]. The dispatcher
//! guarantees: `start` at most once per request; after a successful
//! `start`, `end` exactly once on every exit path; `compensate` before
//! the error response when processing fails.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::request::RequestContext;
use crate::response::{self, ResponseContext};

/// Optional request-scoped transaction hooks for an adapter
#[async_trait]
pub trait Transactional: Send + Sync {
    /// Called before the processor runs
    async fn start(&self, request: &RequestContext) -> Result<()>;

    /// Called exactly once per successful `start`, on every exit path
    ///
    /// `response` is whatever dispatch produced so far: the success
    /// response, the error response, or `None` when neither the
    /// processor nor the extension fallback claimed the request.
    async fn end(&self, request: &RequestContext, response: Option<&ResponseContext>);

    /// Called when processing fails, before the error response is built
    async fn compensate(&self, request: &RequestContext, error: &Error);
}

/// Storage-facing operations for one collection
///
/// All operations receive the full request context; the resolved target
/// carries the workspace, collection, and entry identifiers.
#[async_trait]
pub trait CollectionAdapter: Send + Sync {
    /// List the collection (GET on the collection URI)
    async fn get_feed(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Create an entry (POST on the collection URI)
    async fn post_entry(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Fetch one entry
    async fn get_entry(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Replace one entry
    async fn put_entry(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Delete one entry
    async fn delete_entry(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Category listing for the collection
    async fn get_categories(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Fetch the media resource behind an entry
    async fn get_media(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Replace the media resource behind an entry
    async fn put_media(&self, request: &RequestContext) -> Result<ResponseContext> {
        let _ = request;
        Ok(response::not_allowed(&[]))
    }

    /// Fallback for requests no standard processor claimed
    ///
    /// Invoked only when the matched processor returned `Ok(None)`.
    /// Returning `Ok(None)` here too ends the dispatch with 400.
    async fn extension_request(
        &self,
        request: &RequestContext,
    ) -> Result<Option<ResponseContext>> {
        let _ = request;
        Ok(None)
    }

    /// The adapter's transactional capability, when it has one
    fn transactional(&self) -> Option<&dyn Transactional> {
        None
    }
}
