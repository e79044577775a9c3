use crate::error::{ServerError, ServerResult};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marks the end of the header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP Status Codes
///
/// The server only ever answers with a success status; failures surface as a
/// closed connection rather than an error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 200,
}

impl Status {
    /// Get the text description for this status code
    pub fn as_str(&self) -> &'static str {
        match *self {
            Status::Ok => "OK",
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

/// HTTP Methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// Convert the method to a string
    pub fn as_str(&self) -> &'static str {
        match *self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

impl FromStr for Method {
    type Err = ServerError;

    /// Method tokens are case-sensitive.
    fn from_str(s: &str) -> ServerResult<Self> {
        match s {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "CONNECT" => Ok(Method::Connect),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "PATCH" => Ok(Method::Patch),
            _ => Err(ServerError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP Request
///
/// `headers` is the raw header block, request line included, exactly as it
/// arrived. Nothing in it is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: String,
    pub body: String,
}

impl Request {
    /// The third token of the request line, if the client sent one.
    pub fn version(&self) -> Option<&str> {
        self.request_line().split(' ').nth(2).filter(|v| !v.is_empty())
    }

    /// Case-insensitive lookup of a header value in the raw block.
    ///
    /// Lines without a colon are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    fn request_line(&self) -> &str {
        self.headers.split("\r\n").next().unwrap_or("")
    }
}

/// Position of the first `\r\n\r\n` in `buf`.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Parse a raw request buffer.
///
/// The request line is split on single spaces: the first token is the method,
/// the second the path, and anything after is ignored. The body is whatever
/// follows the header terminator, with no regard for `Content-Length`.
/// Bytes that are not valid UTF-8 are replaced, never rejected.
pub fn parse_request(buf: &[u8]) -> ServerResult<Request> {
    let headers_end = find_header_end(buf).ok_or_else(|| {
        ServerError::MalformedRequest("no end of headers found".to_string())
    })?;

    let headers = String::from_utf8_lossy(&buf[..headers_end]);
    let body = String::from_utf8_lossy(&buf[headers_end + HEADER_TERMINATOR.len()..]);

    let request_line = headers.split("\r\n").next().unwrap_or("");
    let mut tokens = request_line.split(' ');
    let method: Method = tokens.next().unwrap_or("").parse()?;
    let path = tokens.next().unwrap_or("");

    Ok(Request {
        method,
        path: path.to_string(),
        headers: headers.into_owned(),
        body: body.into_owned(),
    })
}

/// HTTP Response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response with an empty body
    pub fn new(status: Status) -> Self {
        let mut response = Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        };
        response.set_header("Server", concat!("dinoscale/", env!("CARGO_PKG_VERSION")));
        response.set_header("Connection", "close");
        response.set_header("Content-Length", "0");
        response
    }

    /// A `200 OK` carrying an HTML document.
    pub fn html(body: Vec<u8>) -> Self {
        let mut response = Self::new(Status::Ok);
        response.set_header("Content-Type", "text/html");
        response.set_body(body);
        response
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Get a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set the body and update content-length
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.set_header("Content-Length", &body.len().to_string());
        self.body = body;
    }

    /// Serialize the response into its wire form
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128 + self.body.len());

        buf.put_slice(
            format!("{} {} {}\r\n", HTTP_VERSION, self.status.code(), self.status.as_str())
                .as_bytes(),
        );
        for (name, value) in &self.headers {
            buf.put_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        buf.put_slice(b"\r\n");
        buf.put_slice(&self.body);

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = parse_request(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/hello");
        assert_eq!(request.headers, "GET /hello HTTP/1.1\r\nHost: localhost");
        assert_eq!(request.body, "");
        assert_eq!(request.version(), Some("HTTP/1.1"));
    }

    #[test]
    fn test_body_is_taken_verbatim() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 2\r\n\r\nname=dino\r\n\r\nrest";
        let request = parse_request(raw).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, "name=dino\r\n\r\nrest");
    }

    #[test]
    fn test_missing_terminator_is_malformed() {
        let result = parse_request(b"GET / HTTP/1.1\r\nHost: localhost\r\n");
        assert!(matches!(result, Err(ServerError::MalformedRequest(_))));

        let result = parse_request(b"");
        assert!(matches!(result, Err(ServerError::MalformedRequest(_))));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result = parse_request(b"BREW /pot HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ServerError::UnknownMethod(m)) if m == "BREW"));

        let result = parse_request(b"get / HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ServerError::UnknownMethod(_))));
    }

    #[test]
    fn test_extra_request_line_tokens_are_ignored() {
        let request = parse_request(b"GET /a HTTP/9.9 trailing junk\r\n\r\n").unwrap();
        assert_eq!(request.path, "/a");
        assert_eq!(request.version(), Some("HTTP/9.9"));
    }

    #[test]
    fn test_request_line_without_path() {
        let request = parse_request(b"GET\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "");
        assert_eq!(request.version(), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request =
            parse_request(b"GET / HTTP/1.1\r\nUser-Agent: curl/8.0\r\nbroken line\r\n\r\n").unwrap();
        assert_eq!(request.header("user-agent"), Some("curl/8.0"));
        assert_eq!(request.header("Host"), None);
    }

    #[test]
    fn test_method_round_trip_through_display() {
        for method in [Method::Get, Method::Post, Method::Options, Method::Patch] {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn test_html_response_serialization() {
        let response = Response::html(b"<h1>hi</h1>".to_vec());
        let wire = response.serialize();
        let text = String::from_utf8_lossy(&wire);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n<h1>hi</h1>"));
    }

    #[test]
    fn test_non_utf8_header_bytes_are_tolerated() {
        let request = parse_request(b"GET / HTTP/1.1\r\nUser-Agent: caf\xe9\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/");
        assert_eq!(request.header("user-agent"), Some("caf\u{FFFD}"));
    }

    #[test]
    fn test_content_length_follows_body() {
        let mut response = Response::html(b"<p>first</p>".to_vec());
        assert_eq!(response.header("Content-Length"), Some("12"));

        response.set_body(b"ok".to_vec());
        assert_eq!(response.body(), b"ok");
        assert_eq!(response.header("Content-Length"), Some("2"));
    }

    #[test]
    fn test_set_header_replaces_existing() {
        let mut response = Response::new(Status::Ok);
        response.set_header("content-length", "7");
        assert_eq!(response.header("Content-Length"), Some("7"));
        response.set_body(Vec::new());
        assert_eq!(response.header("Content-Length"), Some("0"));
    }
}
