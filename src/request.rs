//! Parsed request value and the method allow-list.

use std::fmt;

/// HTTP method allow-list.
///
/// Only the methods the server actually dispatches are representable; any
/// other token on the request line is rejected during parsing as
/// [`crate::ParseError::UnsupportedMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method.
    Get,
    /// POST method.
    Post,
}

impl Method {
    /// Parse a method from bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"GET" => Some(Self::Get),
            b"POST" => Some(Self::Post),
            _ => None,
        }
    }

    /// Return the canonical uppercase method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed HTTP request.
///
/// Built exactly once per connection by [`crate::parser::parse`] and never
/// mutated afterwards; the dispatch task that created it is its only owner.
///
/// Invariants upheld by the parser:
/// - `method` is in the allow-list,
/// - `path` starts with `/` and carries no query component,
/// - `body` is exactly `Content-Length` bytes when that header is present on
///   a non-GET request, and empty otherwise.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    version: String,
    headers: Vec<String>,
    body: Vec<u8>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        query: Vec<(String, String)>,
        version: String,
        headers: Vec<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            path,
            query,
            version,
            headers,
            body,
        }
    }

    /// Returns the request method.
    #[inline]
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the request path (query component stripped).
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query parameters in request order.
    ///
    /// Duplicate names are preserved; use [`Request::query_value`] for the
    /// common first-match case.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the first query parameter named `name`, if any.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the protocol version token from the request line.
    ///
    /// Not validated beyond presence; `HTTP/1.1` in practice.
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the raw header lines in request order.
    ///
    /// Lines are kept unsplit; extract individual values with
    /// [`Request::header`].
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Extracts a header value by literal, case-sensitive prefix match on
    /// the raw line, returning the remainder after the colon, trimmed.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|line| line.starts_with(name))
            .and_then(|line| line.split_once(':'))
            .map(|(_, value)| value.trim())
    }

    /// Returns the request body.
    ///
    /// Empty for GET requests and for non-GET requests without a
    /// `Content-Length` header.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
