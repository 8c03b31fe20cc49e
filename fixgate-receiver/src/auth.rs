/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Authentication gate collaborator.
//!
//! While a connection's session identifier is unset, the first
//! checksum-valid framed message is assumed to be a logon and is handed to
//! the [`Authenticator`]. The authenticator is non-blocking: it may answer
//! immediately, or report backpressure with the downstream position it is
//! waiting for, in which case the endpoint stashes the logon and retries
//! with identical inputs on later polls.

use crate::sink::Position;
use fixgate_core::{ConnectionId, DisconnectReason, LibraryId, SequenceIndex, SessionId};
use fixgate_tagvalue::LogonView;

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationResult {
    /// The logon was accepted; the endpoint adopts the session identity.
    Valid {
        /// Session identifier assigned to this connection.
        session_id: SessionId,
        /// Incarnation counter for the session.
        sequence_index: SequenceIndex,
    },
    /// The logon was rejected; the connection is disconnected.
    Invalid {
        /// Reason recorded in the disconnect notification.
        reason: DisconnectReason,
    },
    /// The authenticator cannot answer until the downstream bus reaches
    /// `required_position`. Retry with identical inputs once it has.
    Backpressured {
        /// Bus position that must be reached before retrying.
        required_position: Position,
    },
}

/// External authenticator for incoming logons.
pub trait Authenticator {
    /// Authenticates the first message of a connection.
    ///
    /// # Arguments
    /// * `logon` - Decoded view of the framed logon
    /// * `connection_id` - The connection the logon arrived on
    /// * `library_id` - Current routing identifier of the connection
    fn authenticate(
        &mut self,
        logon: &LogonView<'_>,
        connection_id: ConnectionId,
        library_id: LibraryId,
    ) -> AuthenticationResult;

    /// Probes whether the bus position a backpressured result asked for has
    /// been reached. Never blocks.
    ///
    /// # Arguments
    /// * `required_position` - The position from the stashed result
    fn position_reached(&mut self, required_position: Position) -> bool;
}
