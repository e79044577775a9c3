use crate::error::{ServerError, ServerResult};
use crate::http::Method;
use crate::logger::LogLevel;
use crate::router::RouteEntry;
use crate::static_files::DEFAULT_ERROR_FILE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};

/// Largest request the server will buffer, in bytes
pub const MAX_REQUEST_SIZE: usize = 30720;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // Network configuration
    pub listen_address: String,
    pub port: u16,
    pub backlog: i32,

    /// Served for GET requests that match no route
    pub default_file: PathBuf,

    // Logging
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,

    /// Routes registered before the server starts listening
    pub routes: Vec<RouteEntry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1".to_string(),
            port: 6969,
            backlog: 20,

            default_file: PathBuf::from(DEFAULT_ERROR_FILE),

            log_level: LogLevel::Info,
            log_file: None,

            routes: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address and port to listen on
    pub fn with_address(mut self, address: &str, port: u16) -> Self {
        self.listen_address = address.to_string();
        self.port = port;
        self
    }

    /// Set the pending connection backlog
    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn with_default_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_file = path.into();
        self
    }

    /// Append a route to register at startup
    pub fn with_route(mut self, method: Method, path: &str, file_path: impl Into<PathBuf>) -> Self {
        self.routes.push(RouteEntry::new(method, path, file_path));
        self
    }

    /// Maximum request size. Fixed, not configurable.
    pub fn max_request_size(&self) -> usize {
        MAX_REQUEST_SIZE
    }

    /// Get the IPv4 socket address to bind
    pub fn socket_address(&self) -> ServerResult<SocketAddrV4> {
        let ip: Ipv4Addr = self.listen_address.parse().map_err(|_| {
            ServerError::Config(format!("invalid IPv4 address: {}", self.listen_address))
        })?;
        Ok(SocketAddrV4::new(ip, self.port))
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_json_file<P: AsRef<Path>>(&self, path: P) -> ServerResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
