//! Response construction
//!
//! The router only ever builds a 404 (unmatched route, unresolved model
//! id), a 415 (non-JSON body on a model create), or passes through whatever
//! the matched chain returned. `Response` implements
//! [`axum::response::IntoResponse`] so an axum host can return it directly.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value as JsonValue;

// -- Shared helpers --

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) {
    if let (Ok(name), Ok(val)) = (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, val);
    }
}

/// A response produced by a handler, a middleware, or the router itself
///
/// ```
/// use virgule::Response;
/// use axum::http::StatusCode;
///
/// let response = Response::text("created").with_status(StatusCode::CREATED);
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body(), "created");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Creates an empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// 200 with an empty body
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 200 with a plain-text body
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .with_body(body)
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// 200 with an HTML body
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_body(body)
            .with_header("content-type", "text/html; charset=utf-8")
    }

    /// 200 with a JSON body
    pub fn json(value: &JsonValue) -> Self {
        Self::ok()
            .with_body(value.to_string())
            .with_header("content-type", "application/json")
    }

    /// 404 for unmatched routes and unresolved model identifiers
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND).with_body("Not Found")
    }

    /// 415 for a model create without a JSON content type
    pub fn unsupported_media_type() -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE).with_body("Unsupported Media Type")
    }

    /// Replaces the status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replaces the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a header (invalid names or values are ignored)
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        insert_header(&mut self.headers, key, value);
        self
    }

    /// Response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}
