pub mod acceptor;
pub mod buffer;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod router;
pub mod server;
pub mod static_files;
pub mod transmitter;

/// Re-exports of common components for easier access
pub use acceptor::ConnectionAcceptor;
pub use config::{ServerConfig, MAX_REQUEST_SIZE};
pub use connection::Connection;
pub use error::{ServerError, ServerResult};
pub use http::{parse_request, Method, Request, Response, Status};
pub use logger::{LogLevel, LogOutput, LogSink, Logger};
pub use metrics::{Counter, ServerStats};
pub use router::{RouteEntry, RouteTable};
pub use server::{Server, ServerState, ShutdownHandle};
pub use static_files::{ResponseBuilder, DEFAULT_ERROR_FILE};
