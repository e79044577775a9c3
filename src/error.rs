use crate::http::Method;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open listening socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept incoming connection: {0}")]
    Accept(#[source] io::Error),

    #[error("invalid request: {0}")]
    MalformedRequest(String),

    #[error("request exceeds the {limit} byte limit")]
    RequestTooLarge { limit: usize },

    #[error("unknown HTTP method: {0:?}")]
    UnknownMethod(String),

    #[error("route {method} {path} is already defined")]
    DuplicateRoute { method: Method, path: String },

    #[error("routes cannot be registered once the server is listening")]
    RoutesFrozen,

    #[error("server is not listening")]
    NotListening,

    #[error("sent {sent} of {total} response bytes")]
    PartialSend { sent: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// Whether the error leaves the listener unusable.
    ///
    /// Everything else only concerns the connection it happened on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ServerError::Bind { .. }
                | ServerError::Accept(_)
                | ServerError::Config(_)
                | ServerError::NotListening
        )
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let accept = ServerError::Accept(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(accept.is_fatal());

        assert!(!ServerError::MalformedRequest("no end of headers".into()).is_fatal());
        assert!(!ServerError::PartialSend { sent: 1, total: 2 }.is_fatal());
        assert!(!ServerError::RequestTooLarge { limit: 10 }.is_fatal());
    }

    #[test]
    fn test_duplicate_route_message() {
        let err = ServerError::DuplicateRoute {
            method: Method::Get,
            path: "/".to_string(),
        };
        assert_eq!(err.to_string(), "route GET / is already defined");
    }
}
