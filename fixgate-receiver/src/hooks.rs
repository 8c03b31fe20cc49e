/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Lifecycle and bookkeeping hooks.
//!
//! The endpoint does not own the event loop, the session registry, or the
//! disconnect notification path; it reports into them through
//! [`EndpointHooks`]. The disconnect notification is deferred by contract:
//! implementations enqueue it for the external scheduler, never deliver it
//! inline from within the hook call.

use fixgate_core::{ConnectionId, DisconnectReason, LibraryId, MsgTypeCode, SessionId};

/// Callbacks from a receiver endpoint into its owning framework.
pub trait EndpointHooks {
    /// Notifies the session object that a message of any classification has
    /// been framed and published, for bookkeeping such as last-seen
    /// sequence numbers.
    ///
    /// # Arguments
    /// * `bytes` - The wire span of the framed message
    /// * `msg_type` - Its message type code
    /// * `session_id` - The session it belongs to, if authenticated
    fn on_message(&mut self, bytes: &[u8], msg_type: MsgTypeCode, session_id: Option<SessionId>);

    /// Schedules a disconnect notification to the downstream bus. Deferred,
    /// never delivered inline.
    ///
    /// # Arguments
    /// * `library_id` - Routing identifier of the connection
    /// * `connection_id` - The disconnected connection
    /// * `reason` - Why it disconnected
    fn schedule_disconnect(
        &mut self,
        library_id: LibraryId,
        connection_id: ConnectionId,
        reason: DisconnectReason,
    );

    /// Notifies the session registry that the connection's session (if any)
    /// is gone.
    ///
    /// # Arguments
    /// * `session_id` - The session, unset if the connection never
    ///   authenticated
    fn on_session_disconnected(&mut self, session_id: Option<SessionId>);

    /// Cancels the endpoint's registration with the socket multiplexer.
    ///
    /// # Arguments
    /// * `connection_id` - The connection to deregister
    fn cancel_registration(&mut self, connection_id: ConnectionId);

    /// Removes the endpoint from the owning router. Invoked only for
    /// internally detected disconnects; an external `close` implies the
    /// router already knows.
    ///
    /// # Arguments
    /// * `library_id` - Routing identifier of the connection
    /// * `connection_id` - The removed connection
    fn on_endpoint_removed(&mut self, library_id: LibraryId, connection_id: ConnectionId);
}
