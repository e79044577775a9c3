//! The accept, parse, respond, close loop.
//!
//! ```text
//!   Starting ──listen()──▶ Listening ──▶ Accepting ◀──────┐
//!                                           │             │
//!                                   accept()│             │ close
//!                                           ▼             │
//!                                        Handling ────────┘
//!
//!   shutdown or fatal error ──▶ Stopped
//! ```
//!
//! Connections are handled strictly one after another. A request that cannot
//! be read or parsed only costs its own connection; a failing `accept` ends the
//! loop with an error.

use crate::acceptor::ConnectionAcceptor;
use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::{ServerError, ServerResult};
use crate::http::{parse_request, Method};
use crate::logger::{LogLevel, LogSink};
use crate::metrics::ServerStats;
use crate::router::RouteTable;
use crate::static_files::ResponseBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle of a [`Server`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Listening,
    Accepting,
    Handling,
    Stopped,
}

/// Asks a running server to stop after the connection it is handling.
///
/// The flag is checked between connections, so a server blocked in `accept`
/// stops once the next client has been served.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct Server {
    config: ServerConfig,
    routes: RouteTable,
    responder: Option<ResponseBuilder>,
    acceptor: Option<ConnectionAcceptor>,
    logger: Arc<dyn LogSink>,
    stats: Arc<ServerStats>,
    shutdown: ShutdownHandle,
    state: ServerState,
}

impl Server {
    /// Create a server. Routes listed in the configuration are registered
    /// immediately; nothing is bound until [`Server::listen`].
    pub fn new(config: ServerConfig, logger: Arc<dyn LogSink>) -> ServerResult<Self> {
        let mut server = Self {
            routes: RouteTable::new(),
            responder: None,
            acceptor: None,
            logger,
            stats: Arc::new(ServerStats::new()),
            shutdown: ShutdownHandle::default(),
            state: ServerState::Starting,
            config,
        };

        for entry in server.config.routes.clone() {
            server.create_route(entry.method, &entry.path, entry.file_path)?;
        }

        Ok(server)
    }

    /// Register a route. Only allowed before the server starts listening.
    pub fn create_route(
        &mut self,
        method: Method,
        path: &str,
        file_path: impl Into<PathBuf>,
    ) -> ServerResult<()> {
        if self.state != ServerState::Starting {
            return Err(ServerError::RoutesFrozen);
        }

        let file_path = file_path.into();
        match self.routes.register(method, path, file_path.clone()) {
            Ok(()) => {
                self.logger.log(
                    &format!("route {} {} added -> {}", method, path, file_path.display()),
                    LogLevel::Debug,
                );
                Ok(())
            }
            Err(e) => {
                self.logger.log(&e.to_string(), LogLevel::Warn);
                Err(e)
            }
        }
    }

    /// Bind and listen, returning the bound address.
    ///
    /// Calling it again while listening just returns the address.
    pub fn listen(&mut self) -> ServerResult<SocketAddr> {
        if let Some(acceptor) = &self.acceptor {
            return Ok(acceptor.local_addr()?);
        }
        if self.state == ServerState::Stopped {
            return Err(ServerError::NotListening);
        }

        let addr = self.config.socket_address()?;
        let acceptor = match ConnectionAcceptor::open(addr, self.config.backlog) {
            Ok(acceptor) => acceptor,
            Err(e) => {
                self.logger.log(&e.to_string(), LogLevel::Error);
                self.state = ServerState::Stopped;
                return Err(e);
            }
        };
        let local_addr = acceptor.local_addr()?;

        let routes = std::mem::take(&mut self.routes);
        self.responder = Some(ResponseBuilder::new(
            routes,
            self.config.default_file.clone(),
            self.logger.clone(),
        ));
        self.acceptor = Some(acceptor);
        self.state = ServerState::Listening;

        self.logger.log(
            &format!(
                "*** Listening on ADDRESS: {} PORT: {} ***",
                local_addr.ip(),
                local_addr.port()
            ),
            LogLevel::Info,
        );

        Ok(local_addr)
    }

    /// Listen (if not already) and serve connections until shut down.
    ///
    /// Returns early only on a fatal error.
    pub fn start_listening(&mut self) -> ServerResult<()> {
        self.listen()?;

        while !self.shutdown.is_shutdown() {
            self.handle_next()?;
        }

        self.stop();
        Ok(())
    }

    /// Accept one connection and serve it completely.
    ///
    /// Errors belonging to the connection are logged and swallowed; only
    /// listener failures are returned.
    pub fn handle_next(&mut self) -> ServerResult<()> {
        self.listen()?;
        self.state = ServerState::Accepting;
        self.logger
            .log("----- Waiting for a new connection -----", LogLevel::Info);

        let accepted = match &self.acceptor {
            Some(acceptor) => acceptor.accept(),
            None => Err(ServerError::NotListening),
        };
        let mut connection = match accepted {
            Ok(connection) => connection,
            Err(e) => {
                self.logger.log(&e.to_string(), LogLevel::Error);
                self.stop();
                return Err(e);
            }
        };

        self.state = ServerState::Handling;
        self.stats.connections.increment(1);

        match self.handle_connection(&mut connection) {
            Ok(sent) => {
                self.stats.responses.increment(1);
                self.stats.bytes_sent.increment(sent);
                self.logger.log(
                    "------ Server Response sent to client ------",
                    LogLevel::Success,
                );
            }
            Err(ServerError::PartialSend { sent, total }) => {
                self.stats.partial_sends.increment(1);
                self.stats.bytes_sent.increment(sent);
                self.logger.log(
                    &format!("Error sending response to client. ({} of {} bytes)", sent, total),
                    LogLevel::Error,
                );
            }
            Err(e) => {
                self.stats.rejected.increment(1);
                self.logger.log(
                    &format!(
                        "dropping connection #{} from {}: {}",
                        connection.id(),
                        connection.peer_addr(),
                        e
                    ),
                    LogLevel::Warn,
                );
            }
        }

        if let Err(e) = connection.close() {
            self.logger
                .log(&format!("error closing connection: {}", e), LogLevel::Debug);
        }
        self.state = ServerState::Accepting;

        Ok(())
    }

    fn handle_connection(&self, connection: &mut Connection) -> ServerResult<usize> {
        let responder = self.responder.as_ref().ok_or(ServerError::NotListening)?;

        let buffer = connection.read_request(self.config.max_request_size())?;
        self.logger
            .log("------ Received Request from client ------", LogLevel::Info);

        let request = parse_request(buffer.as_slice())?;
        self.logger.log(
            &format!(
                "{} {} from {} ({})",
                request.method,
                request.path,
                connection.peer_addr(),
                request.header("User-Agent").unwrap_or("-")
            ),
            LogLevel::Debug,
        );

        let response = responder.build(request.method, &request.path);
        connection.send(&response.serialize())
    }

    /// Release the listening socket. The server cannot be restarted.
    pub fn stop(&mut self) {
        if self.state == ServerState::Stopped {
            return;
        }

        self.acceptor = None;
        self.state = ServerState::Stopped;
        self.logger.log(
            &format!("Server stopped: {}", self.stats.format()),
            LogLevel::Info,
        );
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Address of the listening socket, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.acceptor.as_ref().and_then(|a| a.local_addr().ok())
    }

    /// Registered routes
    pub fn routes(&self) -> &RouteTable {
        match &self.responder {
            Some(responder) => responder.routes(),
            None => &self.routes,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }
}
