/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Non-blocking socket read abstraction.
//!
//! The endpoint never blocks: a read returns immediately with however many
//! bytes are available, possibly zero. [`Channel`] is the seam that keeps
//! the endpoint free of concrete I/O types; the provided implementation
//! wraps a `std::net::TcpStream` placed in non-blocking mode.

use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};

/// Result of one non-blocking read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were appended (zero when nothing was available).
    Bytes(usize),
    /// The remote peer closed the stream.
    Closed,
}

/// Non-blocking byte source for a receiver endpoint.
pub trait Channel {
    /// Reads available bytes into `buf` without blocking.
    ///
    /// # Arguments
    /// * `buf` - Destination slice; implementations read at most `buf.len()`
    ///
    /// # Errors
    /// Returns the underlying I/O error for faults; "nothing available" is
    /// `Ok(ReadOutcome::Bytes(0))`, never an error.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Releases the underlying socket. Further reads are undefined.
    fn shutdown(&mut self);
}

impl Channel for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        match Read::read(self, buf) {
            Ok(0) if !buf.is_empty() => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Bytes(n)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Ok(ReadOutcome::Bytes(0))
            }
            Err(e) => Err(e),
        }
    }

    fn shutdown(&mut self) {
        let _ = TcpStream::shutdown(self, Shutdown::Both);
    }
}

/// Classifies an I/O fault as an ordinary peer disconnect.
///
/// Regular disconnects are not errors: they run the quiet remote-disconnect
/// path instead of being reported as faults.
#[must_use]
pub fn is_benign_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::NotConnected
    )
}
