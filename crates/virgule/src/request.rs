//! Incoming request wrapper
//!
//! The host HTTP layer hands the router an already-parsed request: method,
//! target (path plus optional query), headers, and the raw body bytes. This
//! module wraps those pieces and offers the body-reading operations the
//! dispatcher and handlers need — as JSON, as text, or as decoded form
//! fields. No HTTP wire syntax is parsed here.

use axum::http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// An already-parsed HTTP request, supplied by the host layer
///
/// # Examples
///
/// ```
/// use virgule::Request;
///
/// let request = Request::get("/users/42?tab=posts");
/// assert_eq!(request.path(), "/users/42");
/// assert_eq!(request.query(), Some("tab=posts"));
/// ```
#[derive(Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .finish()
    }
}

impl Request {
    /// Creates a request from its already-parsed pieces
    ///
    /// The target is split on the first `?` into path and query.
    pub fn new(method: Method, target: &str, headers: HeaderMap, body: Vec<u8>) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers,
            body,
        }
    }

    /// Creates a bare GET request (builder entry point)
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target, HeaderMap::new(), Vec::new())
    }

    /// Creates a bare POST request
    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target, HeaderMap::new(), Vec::new())
    }

    /// Creates a bare PUT request
    pub fn put(target: &str) -> Self {
        Self::new(Method::PUT, target, HeaderMap::new(), Vec::new())
    }

    /// Creates a bare DELETE request
    pub fn delete(target: &str) -> Self {
        Self::new(Method::DELETE, target, HeaderMap::new(), Vec::new())
    }

    /// Creates a bare PATCH request
    pub fn patch(target: &str) -> Self {
        Self::new(Method::PATCH, target, HeaderMap::new(), Vec::new())
    }

    /// Creates a bare OPTIONS request
    pub fn options(target: &str) -> Self {
        Self::new(Method::OPTIONS, target, HeaderMap::new(), Vec::new())
    }

    /// Sets a header (invalid names or values are ignored)
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, val);
        }
        self
    }

    /// Sets the body and its content type
    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut request = self.with_header(CONTENT_TYPE.as_str(), content_type);
        request.body = body.into();
        request
    }

    /// Sets a JSON body with `Content-Type: application/json`
    pub fn with_json_body(self, json: &JsonValue) -> Self {
        self.with_body("application/json", json.to_string())
    }

    /// Sets a URL-encoded form body from field pairs
    pub fn with_form_body(self, fields: &[(&str, &str)]) -> Self {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.with_body("application/x-www-form-urlencoded", encoded)
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL path, without the query suffix
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Content type without parameters: `application/json; charset=utf-8`
    /// → `application/json`
    pub fn content_type(&self) -> Option<&str> {
        let raw = self.header(CONTENT_TYPE.as_str())?;
        Some(raw.split(';').next().unwrap_or(raw).trim())
    }

    /// Raw body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    // ========================================================================
    // Body-reading operations
    // ========================================================================

    /// Reads the body as UTF-8 text
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Reads the body as JSON
    pub fn json(&self) -> Option<JsonValue> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Decodes the query string into key/value pairs
    pub fn query_pairs(&self) -> HashMap<String, String> {
        self.query
            .as_deref()
            .map(decode_pairs)
            .unwrap_or_default()
    }

    /// Decodes a URL-encoded form body into key/value pairs
    pub fn form_fields(&self) -> HashMap<String, String> {
        self.text().map(|body| decode_pairs(&body)).unwrap_or_default()
    }

    /// Decodes a `multipart/form-data` body into text field values
    ///
    /// The boundary comes from the content-type header. Parts without a
    /// field name are skipped.
    pub fn multipart_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();

        let Some(boundary) = self
            .header(CONTENT_TYPE.as_str())
            .and_then(|raw| raw.split(';').find_map(|p| p.trim().strip_prefix("boundary=")))
            .map(|b| b.trim_matches('"').to_string())
        else {
            return fields;
        };
        let Some(body) = self.text() else {
            return fields;
        };

        let delimiter = format!("--{}", boundary);
        for part in body.split(delimiter.as_str()) {
            let part = part.trim_start_matches("\r\n");
            if part.is_empty() || part.starts_with("--") {
                continue;
            }
            let Some((headers, value)) = part.split_once("\r\n\r\n") else {
                continue;
            };
            let Some(name) = headers
                .lines()
                .find(|line| line.to_ascii_lowercase().starts_with("content-disposition"))
                .and_then(extract_field_name)
            else {
                continue;
            };
            fields.insert(name, value.trim_end_matches("\r\n").to_string());
        }

        fields
    }
}

/// Decodes `a=1&b=two` pairs, percent-decoding keys and values
fn decode_pairs(input: &str) -> HashMap<String, String> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let plus_decoded = component.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(plus_decoded)
}

/// Pulls `name="field"` out of a Content-Disposition header line
fn extract_field_name(line: &str) -> Option<String> {
    line.split(';').find_map(|piece| {
        piece
            .trim()
            .strip_prefix("name=")
            .map(|name| name.trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_splits_target() {
        let request = Request::get("/users/42?tab=posts&page=2");
        assert_eq!(request.path(), "/users/42");
        assert_eq!(request.query(), Some("tab=posts&page=2"));

        let request = Request::get("/users/42");
        assert_eq!(request.query(), None);
    }

    #[test]
    fn test_query_pairs_decoding() {
        let request = Request::get("/search?q=hello+world&lang=en%2Dus&flag");
        let pairs = request.query_pairs();

        assert_eq!(pairs.get("q"), Some(&"hello world".to_string()));
        assert_eq!(pairs.get("lang"), Some(&"en-us".to_string()));
        assert_eq!(pairs.get("flag"), Some(&String::new()));
    }

    #[test]
    fn test_json_body() {
        let request = Request::post("/users").with_json_body(&json!({"name": "Alice"}));

        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.json(), Some(json!({"name": "Alice"})));
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let request =
            Request::post("/users").with_body("application/json; charset=utf-8", "{}");
        assert_eq!(request.content_type(), Some("application/json"));
    }

    #[test]
    fn test_form_fields() {
        let request =
            Request::post("/users").with_form_body(&[("name", "John Doe"), ("role", "admin")]);

        let fields = request.form_fields();
        assert_eq!(fields.get("name"), Some(&"John Doe".to_string()));
        assert_eq!(fields.get("role"), Some(&"admin".to_string()));
    }

    #[test]
    fn test_multipart_fields() {
        let body = "--xyz\r\n\
                    Content-Disposition: form-data; name=\"title\"\r\n\r\n\
                    Hello\r\n\
                    --xyz\r\n\
                    Content-Disposition: form-data; name=\"tags\"\r\n\r\n\
                    a,b,c\r\n\
                    --xyz--\r\n";
        let request =
            Request::post("/posts").with_body("multipart/form-data; boundary=xyz", body);

        let fields = request.multipart_fields();
        assert_eq!(fields.get("title"), Some(&"Hello".to_string()));
        assert_eq!(fields.get("tags"), Some(&"a,b,c".to_string()));
    }

    #[test]
    fn test_multipart_without_boundary_is_empty() {
        let request = Request::post("/posts").with_body("multipart/form-data", "garbage");
        assert!(request.multipart_fields().is_empty());
    }
}
