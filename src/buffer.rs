use crate::error::{ServerError, ServerResult};
use crate::http::{find_header_end, HEADER_TERMINATOR};
use std::io::{self, Read};

/// Bytes requested from the socket per read call
const READ_CHUNK: usize = 4096;

/// A growable request buffer with a hard upper bound.
///
/// Memory is only taken as data arrives, so small requests stay small.
pub struct RequestBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl RequestBuffer {
    /// Create an empty buffer that will never hold more than `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit.min(READ_CHUNK)),
            limit,
        }
    }

    /// Perform a single read from `reader`, appending what arrives.
    ///
    /// Returns the number of bytes read; 0 means the peer closed its side.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> ServerResult<usize> {
        let start = self.data.len();
        let room = self.limit - start;
        if room == 0 {
            return Err(ServerError::RequestTooLarge { limit: self.limit });
        }

        self.data.resize(start + room.min(READ_CHUNK), 0);
        match reader.read(&mut self.data[start..]) {
            Ok(n) => {
                self.data.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                self.data.truncate(start);
                Err(e.into())
            }
        }
    }

    /// Read until the header terminator has arrived or the peer stops sending.
    ///
    /// A request whose headers do not fit in the limit fails with
    /// `RequestTooLarge`. Whatever body bytes arrived alongside the headers are
    /// kept; nothing more is waited for.
    pub fn fill_request<R: Read>(&mut self, reader: &mut R) -> ServerResult<()> {
        let mut scan_from = 0;
        loop {
            if find_header_end(&self.data[scan_from..]).is_some() {
                return Ok(());
            }
            // Only the tail of what was already scanned can start a terminator.
            scan_from = self.data.len().saturating_sub(HEADER_TERMINATOR.len() - 1);

            match self.read_from(reader) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(ServerError::Io(e)) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Whether a complete header block is buffered
    pub fn has_header_end(&self) -> bool {
        find_header_end(&self.data).is_some()
    }

    /// Get a slice of the buffer's data
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop all buffered data
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
