//! Incoming HTTP request type.
//!
//! The server parses the wire request into this framework-owned value so
//! handlers never touch hyper types. Handlers read path parameters, query
//! parameters, headers, and the (already fully collected) body; the access
//! middleware attaches the authenticated [`Principal`] before a protected
//! handler runs.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::method::Method;
use crate::token::Principal;

/// An incoming HTTP request.
pub struct Request {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    principal: Option<Principal>,
}

impl Request {
    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/todos/{id}`, `req.param("id")` on `/api/todos/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A path parameter that the route guarantees, as an [`ApiError`] when
    /// the route table and handler disagree.
    pub fn require_param(&self, key: &str) -> Result<&str, ApiError> {
        self.param(key)
            .ok_or_else(|| ApiError::Internal(format!("missing route parameter `{key}`")))
    }

    /// Returns a query-string parameter, percent-decoded.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Deserializes the request body as JSON. A body that does not parse
    /// into `T` is the caller's fault: 400, with the parser's message.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
    }

    /// The principal resolved by the access middleware.
    ///
    /// `None` on routes that are not wrapped in
    /// [`require_auth`](crate::middleware::auth::require_auth).
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub(crate) fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Starts building a request by hand. This is how handler and router
    /// tests drive the stack without opening a socket; the server uses it
    /// too when converting the wire request.
    pub fn builder(method: Method, path: &str) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.to_owned(),
            query: HashMap::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Builder for [`Request`]. Obtain via [`Request::builder`].
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Parses a raw query string (`page=2&limit=5`), percent-decoding keys
    /// and values.
    pub fn raw_query(mut self, raw: &str) -> Self {
        self.query.extend(parse_query(raw));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serializes `value` as the JSON body and sets the content type.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.header("content-type", "application/json").body(body)
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body: self.body,
            params: HashMap::new(),
            principal: None,
        }
    }
}

// ── Query-string parsing ──────────────────────────────────────────────────────

/// Splits `a=1&b=two` into pairs, percent-decoding both halves. Keys
/// without `=` map to the empty string; repeated keys keep the last value.
pub(crate) fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

/// Minimal percent-decoding: `%XX` escapes and `+` as space. Invalid
/// escapes pass through untouched rather than failing the whole request.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 3 <= bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi * 16 + lo) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
