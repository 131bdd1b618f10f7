//! # Request Context
//!
//! [`Context`] is the only thing handlers, filters and conditions see. It is the
//! narrow contract the routing engine depends on:
//!
//! - write a response body ([`Context::write`])
//! - read a bound path parameter ([`Context::param`])
//! - read the request domain ([`Context::domain`])
//! - get/set the response status ([`Context::status`], [`Context::set_status`])
//!
//! The transport adapter in [`crate::server`] builds a `Context` per request
//! and turns the [`Output`] back into bytes on the wire; tests build them
//! directly with [`Context::new`].

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage (lower-cased names).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request side of a [`Context`].
#[derive(Debug, Clone)]
pub struct Input {
    method: Method,
    path: String,
    host: String,
    query: ParamVec,
    headers: HeaderVec,
    body: Vec<u8>,
    params: ParamVec,
}

impl Input {
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Host header as sent, including any port.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host without the port (`api.example.com:8080` → `api.example.com`).
    #[must_use]
    pub fn domain(&self) -> &str {
        if self.host.starts_with('[') {
            // IPv6 literal: keep the bracketed address
            return match self.host.find(']') {
                Some(end) => &self.host[..=end],
                None => &self.host,
            };
        }
        match self.host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => &self.host,
        }
    }

    /// Get a bound path parameter. Both `id` and `:id` are accepted.
    ///
    /// Uses "last write wins" semantics if the same name was bound twice.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Bind (or rebind) a path parameter.
    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        self.params.push((Arc::from(name), value.into()));
    }

    pub(crate) fn replace_params(&mut self, params: ParamVec) {
        self.params = params;
    }

    /// Get a query parameter by name (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn query_params(&self) -> &ParamVec {
        &self.query
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Response side of a [`Context`].
#[derive(Debug, Clone)]
pub struct Output {
    status: u16,
    headers: HeaderVec,
    body: Vec<u8>,
    written: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
            written: false,
        }
    }
}

impl Output {
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Set the response body. Marks the output as written, which
    /// short-circuits any remaining `before` filters and the action.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.written = true;
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8 (lossy); mostly useful in tests and logs.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    #[inline]
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Write a JSON body with the given status.
    pub fn json(&mut self, status: u16, body: &Value) {
        self.status = status;
        self.set_header("content-type", "application/json".to_string());
        self.set_body(body.to_string());
    }

    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }
}

/// Per-request state owned by exactly one request.
#[derive(Debug, Clone)]
pub struct Context {
    pub request_id: RequestId,
    pub input: Input,
    pub output: Output,
}

impl Context {
    /// Create a context for `method` and `uri` (path plus optional query string).
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        Self::from_parts(method, uri, HeaderVec::new(), Vec::new())
    }

    /// Create a context from already-extracted request parts.
    ///
    /// Header names are expected lower-cased; the `host` and `x-request-id`
    /// headers are picked up if present.
    #[must_use]
    pub fn from_parts(method: Method, uri: &str, headers: HeaderVec, body: Vec<u8>) -> Self {
        let (path, query_str) = match uri.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (uri, None),
        };
        let query = query_str
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        let host = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("host"))
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                .map(|(_, v)| v.as_str()),
        );
        let path = if path.is_empty() { "/" } else { path };

        Self {
            request_id,
            input: Input {
                method,
                path: path.to_string(),
                host,
                query,
                headers,
                body,
                params: ParamVec::new(),
            },
            output: Output::default(),
        }
    }

    /// Set the `Host` header (builder style).
    #[must_use]
    pub fn with_host(mut self, host: &str) -> Self {
        self.input.host = host.to_string();
        self.input
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case("host"));
        self.input
            .headers
            .push((Arc::from("host"), host.to_string()));
        self
    }

    /// Add a request header (builder style).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name == "host" {
            return self.with_host(value);
        }
        self.input
            .headers
            .push((Arc::from(name.as_str()), value.to_string()));
        self
    }

    /// Set the request body (builder style).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.input.body = body.into();
        self
    }

    /// Write the response body.
    pub fn write(&mut self, body: impl Into<Vec<u8>>) {
        self.output.set_body(body);
    }

    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.input.param(name)
    }

    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.input.domain()
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        self.input.method()
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.output.status()
    }

    pub fn set_status(&mut self, status: u16) {
        self.output.set_status(status);
    }
}
