//! Response model and protocol response builders
//!
//! Every terminal dispatch path produces a [`ResponseContext`]: a status
//! code, a content type, an optional opaque [`Document`] body, and, on
//! error paths, the causing error so boundary filters can log it.
//! Document serialization stays outside the core; the builders here only
//! emit the minimal protocol error bodies.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::Error;

/// `application/xml`, the default error body type
pub const XML: &str = "application/xml";

/// Atom feed and entry documents
pub const ATOM: &str = "application/atom+xml";

/// Atom service documents
pub const ATOM_SERVICE: &str = "application/atomsvc+xml";

/// Atom category documents
pub const ATOM_CATEGORIES: &str = "application/atomcat+xml";

/// Opaque response payload
///
/// The core never inspects document contents; adapters hand over bytes
/// produced by whatever serializer they use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: Bytes,
}

impl Document {
    /// Create a document from raw content
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Document bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Document contents as UTF-8, when valid
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// True when the document is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn into_bytes(self) -> Bytes {
        self.content
    }
}

/// A terminal dispatch outcome
#[derive(Debug)]
pub struct ResponseContext {
    status: StatusCode,
    content_type: String,
    body: Option<Document>,
    headers: HeaderMap,
    error: Option<Error>,
}

impl ResponseContext {
    /// Create a response with the given status and the default XML type
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: XML.to_string(),
            body: None,
            headers: HeaderMap::new(),
            error: None,
        }
    }

    /// Override the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Attach a document body
    pub fn with_body(mut self, body: Document) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an extra header (Location, Allow, ...)
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Record the error that produced this response
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Document body, if any
    pub fn body(&self) -> Option<&Document> {
        self.body.as_ref()
    }

    /// Extra headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The causing error, on error responses
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

impl IntoResponse for ResponseContext {
    fn into_response(self) -> Response {
        let mut builder = Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, self.content_type.as_str());

        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }

        let body = match self.body {
            Some(document) => Body::from(document.into_bytes()),
            None => Body::empty(),
        };

        builder
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// 200 OK with a document body
pub fn ok(body: Document, content_type: &str) -> ResponseContext {
    ResponseContext::new(StatusCode::OK)
        .with_content_type(content_type)
        .with_body(body)
}

/// 201 Created, with an optional Location header
pub fn created(body: Document, content_type: &str, location: Option<&str>) -> ResponseContext {
    let mut response = ResponseContext::new(StatusCode::CREATED)
        .with_content_type(content_type)
        .with_body(body);

    if let Some(location) = location {
        if let Ok(value) = HeaderValue::from_str(location) {
            response = response.with_header(header::LOCATION, value);
        }
    }

    response
}

/// 204 No Content
pub fn no_content() -> ResponseContext {
    ResponseContext::new(StatusCode::NO_CONTENT)
}

/// 404 Not Found, the terminal response for every unroutable request
pub fn not_found() -> ResponseContext {
    let status = StatusCode::NOT_FOUND;
    ResponseContext::new(status).with_body(error_document(status, "Target not found"))
}

/// 400 Bad Request, when dispatch produced neither response nor error
pub fn bad_request() -> ResponseContext {
    let status = StatusCode::BAD_REQUEST;
    ResponseContext::new(status).with_body(error_document(status, "Malformed request"))
}

/// 405 Method Not Allowed, advertising the supported methods
pub fn not_allowed(allowed: &[Method]) -> ResponseContext {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    let mut response =
        ResponseContext::new(status).with_body(error_document(status, "Method not allowed"));

    if !allowed.is_empty() {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        if let Ok(value) = HeaderValue::from_str(&allow) {
            response = response.with_header(header::ALLOW, value);
        }
    }

    response
}

/// Generic error response for a classified dispatch failure
///
/// Carries the original status when the error had one (500 otherwise),
/// the error detail in the body, and the error itself for logging.
pub fn error_response(error: Error) -> ResponseContext {
    let disposition = error.classify();

    ResponseContext::new(disposition.status)
        .with_body(error_document(disposition.status, &error.to_string()))
        .with_error(error)
}

/// Minimal XML error body
fn error_document(status: StatusCode, message: &str) -> Document {
    Document::new(format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <error><code>{}</code><message>{}</message></error>",
        status.as_u16(),
        xml_escape(message)
    ))
}

/// Escape text for inclusion in XML content
pub(crate) fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
