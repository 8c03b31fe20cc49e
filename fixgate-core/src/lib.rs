/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! # Fixgate Core
//!
//! Core types and error definitions for the fixgate FIX gateway.
//!
//! This crate provides the fundamental building blocks used across the
//! fixgate crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Identifiers**: `ConnectionId`, `SessionId`, `SequenceIndex`, `LibraryId`
//! - **Message model**: `MessageStatus`, `MsgTypeCode`, `DisconnectReason`
//!
//! The gateway's receive path is zero-copy: messages are classified and
//! routed as byte spans, so the types here are small `Copy` values that can
//! travel alongside a span without allocation.

pub mod error;
pub mod message;
pub mod types;

pub use error::{DecodeError, GatewayError, Result};
pub use message::{DisconnectReason, MessageStatus, MsgTypeCode};
pub use types::{ConnectionId, LibraryId, SequenceIndex, SessionId};
