/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! # Fixgate Receiver
//!
//! The receive side of the fixgate FIX gateway: turns a raw, non-blocking
//! byte stream into discrete, classified messages and forwards them to the
//! downstream bus, applying bus backpressure back onto the socket.
//!
//! This crate provides:
//! - **Receive buffer**: fixed-capacity byte arena with explicit compaction
//! - **Channel**: non-blocking socket read abstraction
//! - **Collaborator traits**: downstream sink, authenticator, lifecycle hooks
//! - **Receiver endpoint**: the poll-driven core tying them together
//!
//! Everything runs single-threaded and cooperatively: one external scheduler
//! invokes [`ReceiverEndpoint::poll`] per tick, nothing blocks, and
//! collaborators report unavailability through return values.

pub mod auth;
pub mod buffer;
pub mod channel;
pub mod endpoint;
pub mod hooks;
pub mod sink;

pub use auth::{AuthenticationResult, Authenticator};
pub use buffer::ReceiveBuffer;
pub use channel::{Channel, ReadOutcome, is_benign_disconnect};
pub use endpoint::{EndpointConfig, ReceiverEndpoint};
pub use hooks::EndpointHooks;
pub use sink::{Backpressure, Position, Record, Sink};
