/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Poll-driven receiver endpoint.
//!
//! [`ReceiverEndpoint`] owns one socket and one receive buffer and turns
//! the inbound byte stream into classified records for the downstream bus.
//! One poll performs: read available bytes, frame as many complete messages
//! as the buffer holds, authenticate the first message of the connection,
//! publish each record, and compact the buffer. On any backpressure it
//! stops consuming and retains its position, so the socket's read readiness
//! is not advanced and the OS throttles the peer at the TCP layer once the
//! buffer fills.
//!
//! Malformed input never tears the connection down; it leaves as `Invalid*`
//! records. Only I/O faults, authentication rejection, and explicit
//! disconnect requests terminate a connection.

use crate::auth::{AuthenticationResult, Authenticator};
use crate::buffer::ReceiveBuffer;
use crate::channel::{Channel, ReadOutcome, is_benign_disconnect};
use crate::hooks::EndpointHooks;
use crate::sink::{Backpressure, Position, Record, Sink};
use fixgate_core::{
    ConnectionId, DisconnectReason, LibraryId, MessageStatus, MsgTypeCode, SequenceIndex,
    SessionId,
};
use fixgate_tagvalue::logon::LogonView;
use fixgate_tagvalue::scanner::{ScanOutcome, scan};
use tracing::{debug, error, trace, warn};

/// Construction parameters for a receiver endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Identifier of the accepted connection.
    pub connection_id: ConnectionId,
    /// Initial routing identifier.
    pub library_id: LibraryId,
    /// Receive buffer capacity in bytes.
    pub buffer_capacity: usize,
    /// Known session identity when resuming an authenticated session;
    /// `None` for a fresh connection that must log on first.
    pub session: Option<(SessionId, SequenceIndex)>,
}

/// A backpressured logon waiting for the downstream bus.
///
/// The stashed message always sits at the start of the buffer; while a
/// stash is pending no reads or framing happen, so its offset is stable.
#[derive(Debug, Clone, Copy)]
struct StashedLogon {
    required_position: Position,
    length: usize,
}

/// How the authentication gate resolved for the first message.
enum AuthStep {
    /// Authenticated; publish the logon and keep framing.
    Publish,
    /// Disconnected or stashed; stop consuming this poll.
    Stop,
    /// The first message did not decode as a logon; condemn the buffer.
    CondemnBuffer,
}

/// The receive side of one gateway connection.
pub struct ReceiverEndpoint<C, S, A, H> {
    channel: C,
    sink: S,
    authenticator: A,
    hooks: H,
    connection_id: ConnectionId,
    library_id: LibraryId,
    session_id: Option<SessionId>,
    sequence_index: SequenceIndex,
    buffer: ReceiveBuffer,
    is_paused: bool,
    has_disconnected: bool,
    stashed_logon: Option<StashedLogon>,
}

impl<C, S, A, H> ReceiverEndpoint<C, S, A, H>
where
    C: Channel,
    S: Sink,
    A: Authenticator,
    H: EndpointHooks,
{
    /// Creates an endpoint for an accepted connection.
    ///
    /// # Arguments
    /// * `channel` - Non-blocking byte source for the socket
    /// * `sink` - Downstream message bus
    /// * `authenticator` - External logon authenticator
    /// * `hooks` - Lifecycle and bookkeeping callbacks
    /// * `config` - Identifiers, buffer capacity, optional resumed session
    pub fn new(channel: C, sink: S, authenticator: A, hooks: H, config: EndpointConfig) -> Self {
        let (session_id, sequence_index) = match config.session {
            Some((id, index)) => (Some(id), index),
            None => (None, SequenceIndex::default()),
        };
        Self {
            channel,
            sink,
            authenticator,
            hooks,
            connection_id: config.connection_id,
            library_id: config.library_id,
            session_id,
            sequence_index,
            buffer: ReceiveBuffer::new(config.buffer_capacity),
            is_paused: false,
            has_disconnected: false,
            stashed_logon: None,
        }
    }

    /// Returns the connection identifier.
    #[inline]
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the current routing identifier.
    #[inline]
    #[must_use]
    pub const fn library_id(&self) -> LibraryId {
        self.library_id
    }

    /// Reassigns the routing identifier.
    ///
    /// # Arguments
    /// * `library_id` - The new owning library
    #[inline]
    pub fn assign_library_id(&mut self, library_id: LibraryId) {
        self.library_id = library_id;
    }

    /// Returns the session identifier once authenticated.
    #[inline]
    #[must_use]
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Returns true if the endpoint has reached its terminal state.
    #[inline]
    #[must_use]
    pub const fn has_disconnected(&self) -> bool {
        self.has_disconnected
    }

    /// Suspends all processing without tearing the endpoint down.
    #[inline]
    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    /// Resumes processing after [`pause`](Self::pause).
    #[inline]
    pub fn play(&mut self) {
        self.is_paused = false;
    }

    /// Runs one non-blocking receive cycle.
    ///
    /// # Returns
    /// The number of bytes processed this cycle (read plus consumed); zero
    /// when paused, disconnected, waiting on a stashed logon, or idle.
    pub fn poll(&mut self) -> usize {
        if self.is_paused || self.has_disconnected {
            return 0;
        }

        if self.stashed_logon.is_some() {
            return self.retry_stashed_logon();
        }

        let read = self.read_data();

        // Framing runs even when the read detected a disconnect: bytes
        // already buffered (for instance retained under backpressure) are
        // still published before the endpoint goes quiet.
        let consumed = self.frame_messages();
        self.buffer.compact(consumed);
        read + consumed
    }

    /// Releases the socket and, if not already disconnected, runs the
    /// disconnect notification path once.
    ///
    /// Invoked by the owning router, so endpoint removal is not reported
    /// back to it.
    ///
    /// # Arguments
    /// * `reason` - Reason recorded in the disconnect notification
    pub fn close(&mut self, reason: DisconnectReason) {
        self.channel.shutdown();
        if !self.has_disconnected {
            self.disconnect_endpoint(reason);
        }
    }

    /// Disconnects because no logon arrived within the externally enforced
    /// window.
    pub fn on_no_logon_disconnect(&mut self) {
        self.complete_disconnect(DisconnectReason::NoLogon);
    }

    /// Reads available bytes into the spare region of the buffer.
    fn read_data(&mut self) -> usize {
        let outcome = {
            let writable = self.buffer.writable();
            if writable.is_empty() {
                // Full buffer: stop reading so TCP backpressure reaches the
                // peer.
                return 0;
            }
            self.channel.read(writable)
        };

        match outcome {
            Ok(ReadOutcome::Bytes(n)) => {
                self.buffer.commit(n);
                if n > 0 {
                    trace!(connection_id = %self.connection_id, bytes = n, "read");
                }
                n
            }
            Ok(ReadOutcome::Closed) => {
                debug!(connection_id = %self.connection_id, "remote closed the stream");
                self.on_disconnect_detected();
                0
            }
            Err(e) => {
                if is_benign_disconnect(&e) {
                    debug!(connection_id = %self.connection_id, error = %e, "peer disconnected");
                } else {
                    error!(connection_id = %self.connection_id, error = %e, "socket read failed");
                }
                self.on_disconnect_detected();
                0
            }
        }
    }

    /// Frames and publishes as many complete messages as are buffered.
    ///
    /// # Returns
    /// The number of bytes consumed; the caller compacts the buffer by this
    /// amount, exactly once per poll.
    fn frame_messages(&mut self) -> usize {
        let used = self.buffer.used();
        let mut offset = 0;

        while offset < used {
            match scan(self.buffer.as_slice(), offset, used) {
                ScanOutcome::NeedMoreData => break,
                ScanOutcome::Invalid => {
                    offset = self.publish_unparseable(offset);
                    break;
                }
                ScanOutcome::InvalidBodyLength { length } => {
                    let end = offset + length;
                    let published = self.sink.publish(Record {
                        bytes: &self.buffer.as_slice()[offset..end],
                        library_id: self.library_id,
                        msg_type: MsgTypeCode::UNKNOWN,
                        session_id: self.session_id,
                        sequence_index: self.sequence_index,
                        connection_id: self.connection_id,
                        status: MessageStatus::InvalidBodyLength,
                    });
                    match published {
                        Ok(_) => {
                            self.hooks.on_message(
                                &self.buffer.as_slice()[offset..end],
                                MsgTypeCode::UNKNOWN,
                                self.session_id,
                            );
                            offset = end;
                        }
                        Err(Backpressure) => break,
                    }
                }
                ScanOutcome::Frame(frame) => {
                    let end = offset + frame.length;
                    let status = frame.status();

                    if status == MessageStatus::Ok && self.requires_authentication() {
                        match self.authenticate_first_message(offset, frame.length) {
                            AuthStep::Publish => {}
                            AuthStep::Stop => break,
                            AuthStep::CondemnBuffer => {
                                offset = self.publish_unparseable(offset);
                                break;
                            }
                        }
                    }

                    if status == MessageStatus::InvalidChecksum {
                        warn!(
                            connection_id = %self.connection_id,
                            msg_type = %frame.msg_type,
                            "checksum mismatch, forwarding for audit"
                        );
                    }

                    let published = self.sink.publish(Record {
                        bytes: &self.buffer.as_slice()[offset..end],
                        library_id: self.library_id,
                        msg_type: frame.msg_type,
                        session_id: self.session_id,
                        sequence_index: self.sequence_index,
                        connection_id: self.connection_id,
                        status,
                    });
                    match published {
                        Ok(_) => {
                            self.hooks.on_message(
                                &self.buffer.as_slice()[offset..end],
                                frame.msg_type,
                                self.session_id,
                            );
                            offset = end;
                        }
                        Err(Backpressure) => break,
                    }
                }
            }
        }

        offset
    }

    /// Publishes the entire unconsumed region as one unparseable record.
    ///
    /// # Returns
    /// The new consume offset: the end of the buffer if the publish
    /// succeeded, the unchanged `offset` if it was backpressured (the
    /// region is retained and retried next poll).
    fn publish_unparseable(&mut self, offset: usize) -> usize {
        let used = self.buffer.used();
        debug!(
            connection_id = %self.connection_id,
            length = used - offset,
            "unrecoverable framing error, publishing region as invalid"
        );
        let published = self.sink.publish(Record {
            bytes: &self.buffer.as_slice()[offset..used],
            library_id: self.library_id,
            msg_type: MsgTypeCode::INVALID,
            session_id: self.session_id,
            sequence_index: self.sequence_index,
            connection_id: self.connection_id,
            status: MessageStatus::Invalid,
        });
        match published {
            Ok(_) => {
                self.hooks.on_message(
                    &self.buffer.as_slice()[offset..used],
                    MsgTypeCode::INVALID,
                    self.session_id,
                );
                used
            }
            Err(Backpressure) => offset,
        }
    }

    /// Returns true while no session identity has been adopted.
    #[inline]
    fn requires_authentication(&self) -> bool {
        self.session_id.is_none()
    }

    /// Runs the authentication gate for the first checksum-valid message.
    fn authenticate_first_message(&mut self, offset: usize, length: usize) -> AuthStep {
        let decision = {
            let bytes = &self.buffer.as_slice()[offset..offset + length];
            match LogonView::parse(bytes) {
                Ok(logon) => Some(self.authenticator.authenticate(
                    &logon,
                    self.connection_id,
                    self.library_id,
                )),
                Err(e) => {
                    debug!(
                        connection_id = %self.connection_id,
                        error = %e,
                        "first message is not a decodable logon"
                    );
                    None
                }
            }
        };

        match decision {
            None => AuthStep::CondemnBuffer,
            Some(AuthenticationResult::Valid {
                session_id,
                sequence_index,
            }) => {
                debug!(
                    connection_id = %self.connection_id,
                    session_id = %session_id,
                    "logon authenticated"
                );
                self.session_id = Some(session_id);
                self.sequence_index = sequence_index;
                AuthStep::Publish
            }
            Some(AuthenticationResult::Invalid { reason }) => {
                warn!(connection_id = %self.connection_id, %reason, "logon rejected");
                self.complete_disconnect(reason);
                AuthStep::Stop
            }
            Some(AuthenticationResult::Backpressured { required_position }) => {
                debug!(
                    connection_id = %self.connection_id,
                    required_position = required_position.value(),
                    "authentication backpressured, stashing logon"
                );
                self.stashed_logon = Some(StashedLogon {
                    required_position,
                    length,
                });
                AuthStep::Stop
            }
        }
    }

    /// Retries a stashed backpressured logon with identical inputs.
    ///
    /// While the stash is pending no reads or framing happen; the logon
    /// sits at the start of the buffer.
    fn retry_stashed_logon(&mut self) -> usize {
        let Some(stash) = self.stashed_logon else {
            return 0;
        };
        if !self.authenticator.position_reached(stash.required_position) {
            return 0;
        }

        let decision = {
            let bytes = &self.buffer.as_slice()[..stash.length];
            match LogonView::parse(bytes) {
                Ok(logon) => Some(self.authenticator.authenticate(
                    &logon,
                    self.connection_id,
                    self.library_id,
                )),
                Err(_) => None,
            }
        };

        match decision {
            None => {
                // The span decoded before it was stashed; if it no longer
                // does, condemn it rather than wedge the connection.
                self.stashed_logon = None;
                let consumed = self.publish_unparseable(0);
                self.buffer.compact(consumed);
                consumed
            }
            Some(AuthenticationResult::Valid {
                session_id,
                sequence_index,
            }) => {
                self.session_id = Some(session_id);
                self.sequence_index = sequence_index;
                self.stashed_logon = None;

                let published = self.sink.publish(Record {
                    bytes: &self.buffer.as_slice()[..stash.length],
                    library_id: self.library_id,
                    msg_type: MsgTypeCode::from_byte(b'A'),
                    session_id: self.session_id,
                    sequence_index: self.sequence_index,
                    connection_id: self.connection_id,
                    status: MessageStatus::Ok,
                });
                match published {
                    Ok(_) => {
                        self.hooks.on_message(
                            &self.buffer.as_slice()[..stash.length],
                            MsgTypeCode::from_byte(b'A'),
                            self.session_id,
                        );
                        self.buffer.compact(stash.length);
                        stash.length
                    }
                    // Session identity is adopted, so the next poll retries
                    // this message through the ordinary framing path.
                    Err(Backpressure) => 0,
                }
            }
            Some(AuthenticationResult::Invalid { reason }) => {
                warn!(connection_id = %self.connection_id, %reason, "stashed logon rejected");
                self.stashed_logon = None;
                self.complete_disconnect(reason);
                0
            }
            Some(AuthenticationResult::Backpressured { required_position }) => {
                self.stashed_logon = Some(StashedLogon {
                    required_position,
                    length: stash.length,
                });
                0
            }
        }
    }

    /// Handles a disconnect noticed while reading.
    fn on_disconnect_detected(&mut self) {
        self.complete_disconnect(DisconnectReason::RemoteDisconnect);
    }

    /// Runs the full disconnect path for internally detected disconnects,
    /// including removal from the owning router. Idempotent.
    fn complete_disconnect(&mut self, reason: DisconnectReason) {
        if self.has_disconnected {
            return;
        }
        self.disconnect_endpoint(reason);
        self.hooks.on_endpoint_removed(self.library_id, self.connection_id);
    }

    /// Emits the disconnect notifications and marks the terminal state.
    fn disconnect_endpoint(&mut self, reason: DisconnectReason) {
        debug!(connection_id = %self.connection_id, %reason, "disconnecting endpoint");
        self.hooks
            .schedule_disconnect(self.library_id, self.connection_id, reason);
        self.hooks.on_session_disconnected(self.session_id);
        self.hooks.cancel_registration(self.connection_id);
        self.has_disconnected = true;
    }
}
