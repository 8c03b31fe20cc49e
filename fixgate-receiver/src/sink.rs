/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Downstream message bus interface.
//!
//! Every byte that arrives on a connection leaves through [`Sink::publish`]
//! as a classified record. The sink is non-blocking: when the bus cannot
//! accept more it returns [`Backpressure`], and the endpoint stops
//! consuming, retains its position, and retries the same record on a later
//! poll. Strict head-of-line ordering per connection follows from that:
//! no record overtakes an earlier stuck one.

use fixgate_core::{ConnectionId, LibraryId, MessageStatus, MsgTypeCode, SequenceIndex, SessionId};
use thiserror::Error;

/// Success token returned by a publish: the bus position the record
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Position(u64);

impl Position {
    /// Creates a position token.
    ///
    /// # Arguments
    /// * `value` - The raw bus position
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw bus position.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Signal that the downstream bus cannot accept the record right now.
///
/// Must be retried, never dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("downstream bus backpressured")]
pub struct Backpressure;

/// One classified record handed to the bus.
///
/// `bytes` is the exact wire span of the record; it borrows the receive
/// buffer and is only valid for the duration of the publish call.
#[derive(Debug)]
pub struct Record<'a> {
    /// The wire bytes of the record.
    pub bytes: &'a [u8],
    /// Routing identifier of the owning library.
    pub library_id: LibraryId,
    /// Message type code, or a sentinel for unreadable records.
    pub msg_type: MsgTypeCode,
    /// Session identifier, unset before authentication.
    pub session_id: Option<SessionId>,
    /// Session incarnation counter.
    pub sequence_index: SequenceIndex,
    /// Connection the record arrived on.
    pub connection_id: ConnectionId,
    /// Framing/integrity classification.
    pub status: MessageStatus,
}

/// Non-blocking interface to the downstream message bus.
pub trait Sink {
    /// Publishes one classified record.
    ///
    /// # Arguments
    /// * `record` - The record to forward
    ///
    /// # Errors
    /// Returns [`Backpressure`] when the bus cannot accept the record; the
    /// caller must retry the identical record later.
    fn publish(&mut self, record: Record<'_>) -> Result<Position, Backpressure>;
}
