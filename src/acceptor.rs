use crate::connection::Connection;
use crate::error::{ServerError, ServerResult};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Owns the listening socket and hands out accepted connections one at a time.
pub struct ConnectionAcceptor {
    listener: TcpListener,
    connection_count: AtomicUsize,
}

impl ConnectionAcceptor {
    /// Create, bind and listen on `addr`.
    ///
    /// Any failure here means the server cannot run at all; there is no retry.
    pub fn open(addr: SocketAddrV4, backlog: i32) -> ServerResult<Self> {
        let listener: TcpListener = Self::create_socket(addr, backlog)
            .map_err(|source| ServerError::Bind {
                addr: SocketAddr::V4(addr),
                source,
            })?
            .into();

        Ok(Self {
            listener,
            connection_count: AtomicUsize::new(0),
        })
    }

    /// Block until a client connects.
    pub fn accept(&self) -> ServerResult<Connection> {
        let (stream, peer_addr) = self.listener.accept().map_err(ServerError::Accept)?;
        let id = self.connection_count.fetch_add(1, Ordering::Relaxed);

        Ok(Connection::new(stream, peer_addr, id))
    }

    /// Get the local address this acceptor is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Create a blocking IPv4 listening socket
    fn create_socket(addr: SocketAddrV4, backlog: i32) -> io::Result<Socket> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;

        // Lets a restarted server rebind while old connections sit in TIME_WAIT.
        socket.set_reuse_address(true)?;

        socket.bind(&SockAddr::from(addr))?;
        socket.listen(backlog)?;

        Ok(socket)
    }
}
