/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! # Fixgate Tag-Value
//!
//! Zero-copy FIX tag=value framing for the fixgate gateway receive path.
//!
//! This crate provides the wire-format layer:
//!
//! - **Checksum**: mod-256 checksum computation, formatting and parsing
//! - **Frame scanner**: stateless location of message boundaries inside a
//!   partially filled receive buffer, with resynchronization after a bad
//!   body length
//! - **Logon view**: zero-copy decode of a framed logon message for the
//!   authentication gate
//!
//! All scanning is expressed as pure functions over `(bytes, offset, used)`
//! so it can be unit tested without a socket.

pub mod checksum;
pub mod logon;
pub mod scanner;

pub use checksum::calculate_checksum;
pub use logon::{FieldRef, LogonView};
pub use scanner::{FrameInfo, ScanOutcome, scan};
