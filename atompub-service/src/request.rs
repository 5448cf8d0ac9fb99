//! Inbound request model
//!
//! [`RequestContext`] carries what the resolver and processors need:
//! method, URI, headers, optional body bytes, and the resolved target.
//! The target is pinned on first resolution so every later read within
//! the same dispatch observes the identical value.

use axum::body::Bytes;
use http::{HeaderMap, Method, Uri};
use std::sync::OnceLock;

use crate::resolver::TargetResolver;
use crate::target::Target;

/// A single inbound request, as seen by the dispatch core
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
    target: OnceLock<Target>,
}

impl RequestContext {
    /// Create a request context for the given method and URI
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
            target: OnceLock::new(),
        }
    }

    /// Attach request headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URI
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, if any
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// First value for a query parameter
    ///
    /// Values are returned as-is; percent-decoding is left to processors
    /// that need it.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as UTF-8, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request body bytes, if any
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The resolved target, if resolution has run
    pub fn target(&self) -> Option<&Target> {
        self.target.get()
    }

    /// Resolve and pin the target for this request
    ///
    /// The first call resolves against the request path; later calls
    /// return the pinned value. Resolution itself is idempotent, so the
    /// pinned target equals what any repeat resolution would produce.
    pub fn resolve_target(&self, resolver: &TargetResolver) -> &Target {
        self.target.get_or_init(|| resolver.resolve(self.path()))
    }
}
