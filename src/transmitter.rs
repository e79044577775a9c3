use crate::error::{ServerError, ServerResult};
use std::io::Write;

/// Write all of `bytes` to `writer`.
///
/// Partial writes are continued from where they stopped. The first write
/// error, or a write that accepts nothing, ends the attempt; the result is
/// then `PartialSend` with the number of bytes that did go out.
pub fn send<W: Write>(writer: &mut W, bytes: &[u8]) -> ServerResult<usize> {
    let total = bytes.len();
    let mut sent = 0;

    while sent < total {
        match writer.write(&bytes[sent..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => sent += n,
        }
    }

    if sent == total && writer.flush().is_ok() {
        Ok(sent)
    } else {
        Err(ServerError::PartialSend { sent, total })
    }
}
