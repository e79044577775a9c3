use crate::buffer::RequestBuffer;
use crate::error::ServerResult;
use crate::transmitter;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Represents a TCP connection with a client
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    id: usize,
}

impl Connection {
    /// Create a new connection from a TcpStream
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, id: usize) -> Self {
        Self {
            stream,
            peer_addr,
            id,
        }
    }

    /// Read the request head (and any body bytes sent with it), up to `limit` bytes.
    pub fn read_request(&mut self, limit: usize) -> ServerResult<RequestBuffer> {
        let mut buffer = RequestBuffer::new(limit);
        buffer.fill_request(&mut self.stream)?;
        Ok(buffer)
    }

    /// Send a complete response
    pub fn send(&mut self, bytes: &[u8]) -> ServerResult<usize> {
        transmitter::send(&mut self.stream, bytes)
    }

    /// Close the connection
    ///
    /// The socket itself is released when the connection is dropped.
    pub fn close(self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already be gone.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    /// Get the connection's peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get the connection's unique ID
    pub fn id(&self) -> usize {
        self.id
    }
}
