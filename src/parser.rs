//! HTTP request parser.
//!
//! Transforms a connection's byte stream into a [`Request`], or classifies
//! the failure. The parser never writes to the socket: protocol error
//! responses are the dispatcher's job, which keeps every failure path here
//! an early return.
//!
//! # Framing
//!
//! Framing happens against a single bounded read of up to [`READ_LIMIT`]
//! bytes. The request line and the header block must both terminate inside
//! that window; a header block that fills the window without a `\r\n\r\n`
//! separator is rejected rather than truncated. The body is different: its
//! length comes from `Content-Length`, and any declared bytes not already
//! buffered are fetched with a fresh read of the remaining stream, so a
//! declared body may exceed [`READ_LIMIT`].

use std::io::Read;

use thiserror::Error;

use crate::query;
use crate::request::{Method, Request};
use crate::scan;

/// Upper bound on the framing read, in bytes.
///
/// Request line and headers must fit in this window; the body is exempt.
pub const READ_LIMIT: usize = 4096;

/// Shortest framable request: `GET / v\r\n\r\n`.
const MIN_REQUEST_LEN: usize = 11;

const CRLF: &[u8] = b"\r\n";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Request parsing failure.
///
/// The dispatcher maps every variant to a `400 Bad Request`; the variants
/// exist so logs say why.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Request line or header framing could not be located or parsed.
    #[error("malformed request: {0}")]
    MalformedRequest(&'static str),
    /// Method token is not in the allow-list.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// Parses one request from `stream`.
///
/// Performs one bounded read of up to [`READ_LIMIT`] bytes for framing,
/// then, for a non-GET request with a `Content-Length` header, reads the
/// declared body to completion from the remaining stream.
///
/// # Errors
///
/// [`ParseError::MalformedRequest`] when framing fails (missing
/// terminators, wrong request-line token count, bad target, malformed
/// `Content-Length`, short body) and [`ParseError::UnsupportedMethod`] for
/// a method outside {GET, POST}.
pub fn parse(stream: &mut impl Read) -> Result<Request, ParseError> {
    let mut buffer = [0u8; READ_LIMIT];
    let n = stream
        .read(&mut buffer)
        .map_err(|_| ParseError::MalformedRequest("read failed"))?;
    if n < MIN_REQUEST_LEN {
        return Err(ParseError::MalformedRequest("request too short"));
    }

    let line_end = scan::find(&buffer, CRLF, 0, n)
        .ok_or(ParseError::MalformedRequest("request line terminator not found"))?;
    let line = std::str::from_utf8(&buffer[..line_end])
        .map_err(|_| ParseError::MalformedRequest("request line is not UTF-8"))?;

    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != 3 {
        return Err(ParseError::MalformedRequest(
            "request line must be `METHOD SP TARGET SP VERSION`",
        ));
    }
    let (method_token, target, version) = (tokens[0], tokens[1], tokens[2]);

    let method = Method::from_bytes(method_token.as_bytes())
        .ok_or_else(|| ParseError::UnsupportedMethod(method_token.to_string()))?;
    if !target.starts_with('/') {
        return Err(ParseError::MalformedRequest("request target must start with '/'"));
    }
    let (path, query) = match target.split_once('?') {
        Some((path, raw_query)) => (path.to_string(), query::parse(raw_query)),
        None => (target.to_string(), Vec::new()),
    };

    // The separator scan starts at the request-line CRLF so that a request
    // with no headers (`...\r\n\r\n`) frames correctly: its terminator
    // overlaps the request-line terminator.
    let headers_start = line_end + CRLF.len();
    let headers_end = scan::find(&buffer, HEADER_TERMINATOR, line_end, n)
        .ok_or(ParseError::MalformedRequest("header terminator not found"))?;

    let headers: Vec<String> = if headers_end > headers_start {
        String::from_utf8_lossy(&buffer[headers_start..headers_end])
            .split("\r\n")
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let body = if method == Method::Get {
        Vec::new()
    } else {
        match content_length(&headers)? {
            Some(length) => {
                let body_start = headers_end + HEADER_TERMINATOR.len();
                read_body(stream, &buffer[body_start..n], length)?
            }
            // A non-GET request without Content-Length keeps an empty body.
            None => Vec::new(),
        }
    };

    Ok(Request::new(
        method,
        path,
        query,
        version.to_string(),
        headers,
        body,
    ))
}

/// Finds the first `Content-Length` header line (literal prefix match) and
/// parses its value.
fn content_length(headers: &[String]) -> Result<Option<usize>, ParseError> {
    let Some(line) = headers.iter().find(|line| line.starts_with("Content-Length")) else {
        return Ok(None);
    };
    let value = line.split_once(':').map(|(_, value)| value.trim()).unwrap_or("");
    let length = value
        .parse::<usize>()
        .map_err(|_| ParseError::MalformedRequest("malformed Content-Length"))?;
    Ok(Some(length))
}

/// Assembles the declared body: buffered bytes first, then a fresh read of
/// exactly the shortfall from the stream.
fn read_body(
    stream: &mut impl Read,
    buffered: &[u8],
    length: usize,
) -> Result<Vec<u8>, ParseError> {
    let mut body = Vec::with_capacity(length);
    body.extend_from_slice(&buffered[..length.min(buffered.len())]);
    if body.len() < length {
        let mut rest = vec![0u8; length - body.len()];
        stream
            .read_exact(&mut rest)
            .map_err(|_| ParseError::MalformedRequest("body shorter than Content-Length"))?;
        body.extend_from_slice(&rest);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    /// Yields at most one queued chunk per `read` call, so a body can be
    /// made to arrive after the framing read.
    struct ChunkedStream {
        chunks: Vec<Vec<u8>>,
    }

    impl ChunkedStream {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().rev().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl Read for ChunkedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop() {
                Some(chunk) => {
                    assert!(chunk.len() <= buf.len(), "test chunk larger than buffer");
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    fn parse_bytes(bytes: &[u8]) -> Result<Request, ParseError> {
        parse(&mut Cursor::new(bytes))
    }

    // ========================================================================
    // Well-Formed Requests
    // ========================================================================

    #[test]
    fn get_with_headers() {
        let request = parse_bytes(b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.version(), "HTTP/1.1");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()[0], "Host: x");
        assert!(request.body().is_empty());
    }

    #[test]
    fn get_without_headers() {
        let request = parse_bytes(b"GET /nope HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.path(), "/nope");
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn get_with_query() {
        let request = parse_bytes(b"GET /search?q=rust&page=2 HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();

        assert_eq!(request.path(), "/search");
        assert_eq!(request.query_value("q"), Some("rust"));
        assert_eq!(request.query_value("page"), Some("2"));
    }

    #[test]
    fn headers_keep_request_order() {
        let request =
            parse_bytes(b"GET / HTTP/1.1\r\nHost: x\r\nAccept: */*\r\nUser-Agent: t\r\n\r\n")
                .unwrap();

        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.headers()[0], "Host: x");
        assert_eq!(request.headers()[2], "User-Agent: t");
    }

    #[test]
    fn post_body_round_trip() {
        let request =
            parse_bytes(b"POST /message HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "/message");
        assert_eq!(request.body(), b"hello");
    }

    #[test]
    fn post_body_arriving_after_framing_read_is_completed() {
        // The framing read sees headers plus a body prefix; the rest of the
        // body must come from a fresh read of the stream.
        let mut stream = ChunkedStream::new(&[
            b"POST /message HTTP/1.1\r\nContent-Length: 10\r\n\r\nhell",
            b"o worl",
        ]);

        // read_exact issues as many reads as needed for the shortfall.
        let request = parse(&mut stream).unwrap();
        assert_eq!(request.body(), b"hello worl");
    }

    #[test]
    fn post_without_content_length_has_empty_body() {
        let request = parse_bytes(b"POST /message HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert!(request.body().is_empty());
    }

    #[test]
    fn get_ignores_content_length() {
        let request =
            parse_bytes(b"GET /index.html HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();
        assert!(request.body().is_empty());
    }

    #[test]
    fn body_excess_bytes_are_not_consumed_into_body() {
        let request =
            parse_bytes(b"POST /m HTTP/1.1\r\nContent-Length: 2\r\n\r\nhiEXTRA").unwrap();
        assert_eq!(request.body(), b"hi");
    }

    // ========================================================================
    // Malformed Requests
    // ========================================================================

    #[test]
    fn too_short_input_is_rejected() {
        assert!(matches!(
            parse_bytes(b"GET /"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn missing_request_line_terminator_is_rejected() {
        assert!(matches!(
            parse_bytes(b"GET / HTTP/1.1 no terminator here"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn wrong_token_count_is_rejected() {
        assert!(matches!(
            parse_bytes(b"GET /index.html\r\nHost: x\r\n\r\n"),
            Err(ParseError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_bytes(b"GET  /index.html HTTP/1.1\r\n\r\n"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn unsupported_method_is_rejected() {
        let err = parse_bytes(b"DELETE /x HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedMethod(method) if method == "DELETE"));
    }

    #[test]
    fn lowercase_method_is_rejected() {
        assert!(matches!(
            parse_bytes(b"get /x HTTP/1.1\r\n\r\n"),
            Err(ParseError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn target_not_starting_with_slash_is_rejected() {
        assert!(matches!(
            parse_bytes(b"GET index.html HTTP/1.1\r\n\r\n"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn missing_header_terminator_is_rejected() {
        assert!(matches!(
            parse_bytes(b"GET / HTTP/1.1\r\nHost: x\r\n"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn header_block_filling_read_limit_without_separator_is_rejected() {
        // Header bytes run right up to the read limit with no `\r\n\r\n`:
        // must be rejected, not truncated or accepted.
        let mut raw = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        raw.resize(READ_LIMIT + 64, b'a');

        assert!(matches!(
            parse_bytes(&raw),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn malformed_content_length_is_rejected() {
        assert!(matches!(
            parse_bytes(b"POST /m HTTP/1.1\r\nContent-Length: five\r\n\r\nhello"),
            Err(ParseError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_bytes(b"POST /m HTTP/1.1\r\nContent-Length: -5\r\n\r\nhello"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn body_shorter_than_declared_is_rejected() {
        assert!(matches!(
            parse_bytes(b"POST /m HTTP/1.1\r\nContent-Length: 10\r\n\r\nhi"),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_bytes(b""),
            Err(ParseError::MalformedRequest(_))
        ));
    }
}
