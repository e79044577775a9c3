use dinoscale::http::{find_header_end, parse_request, Method, Response, Status};
use dinoscale::ServerError;

#[test]
fn test_http_parser_simple_get() {
    let request_data = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";

    let request = parse_request(request_data).unwrap();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "/index.html");
    assert_eq!(request.header("host"), Some("example.com"));
    assert_eq!(request.body.len(), 0);
}

#[test]
fn test_http_parser_post_with_body() {
    let request_data = b"POST /submit HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/json\r\nContent-Length: 15\r\n\r\n{\"name\":\"test\"}";

    let request = parse_request(request_data).unwrap();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/submit");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.body, "{\"name\":\"test\"}");
}

#[test]
fn test_http_parser_multiple_headers() {
    let request_data = b"GET /api/data HTTP/1.1\r\n\
                        Host: example.com\r\n\
                        User-Agent: Test Client\r\n\
                        Accept: application/json\r\n\
                        Cookie: session=abc123\r\n\
                        \r\n";

    let request = parse_request(request_data).unwrap();
    assert_eq!(request.path, "/api/data");
    assert_eq!(request.header("User-Agent"), Some("Test Client"));
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.header("cookie"), Some("session=abc123"));
    assert!(request.headers.starts_with("GET /api/data HTTP/1.1\r\nHost: example.com"));
}

#[test]
fn test_parsing_is_deterministic() {
    let raw = b"GET /night HTTP/1.1\r\nHost: example.com\r\n\r\nleftover";

    let first = parse_request(raw).unwrap();
    let second = parse_request(raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.body, "leftover");
}

#[test]
fn test_missing_separator_is_always_malformed() {
    let inputs: [&[u8]; 5] = [
        b"",
        b"GET / HTTP/1.1",
        b"GET / HTTP/1.1\r\nHost: a\r\n",
        b"GET / HTTP/1.1\n\nbody",
        b"\r\n\r",
    ];

    for input in inputs {
        for _ in 0..2 {
            let result = parse_request(input);
            assert!(
                matches!(result, Err(ServerError::MalformedRequest(_))),
                "{:?} should be malformed",
                String::from_utf8_lossy(input)
            );
        }
    }
}

#[test]
fn test_find_header_end() {
    assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n\r\n"), Some(14));
    assert_eq!(find_header_end(b"\r\n\r\n\r\n\r\n"), Some(0));
    assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n"), None);
}

#[test]
fn test_request_line_uses_single_space_tokens() {
    // A doubled space yields an empty path token.
    let request = parse_request(b"GET  /spaced HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(request.path, "");
}

#[test]
fn test_response_creation_and_serialization() {
    let mut response = Response::new(Status::Ok);
    response.set_header("Content-Type", "text/plain");
    response.set_body(b"Hello, World!".to_vec());

    let wire = response.serialize();
    let response_str = String::from_utf8_lossy(&wire);
    assert!(response_str.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response_str.contains("Content-Type: text/plain\r\n"));
    assert!(response_str.contains("Content-Length: 13\r\n"));
    assert!(response_str.ends_with("\r\n\r\nHello, World!"));
}

#[test]
fn test_content_length_counts_bytes_not_chars() {
    let body = "héllo wörld".as_bytes().to_vec();
    let response = Response::html(body.clone());
    assert_eq!(response.header("Content-Length"), Some(body.len().to_string().as_str()));
    assert_eq!(body.len(), 13);
}
