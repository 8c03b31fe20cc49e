/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Error types for the fixgate gateway.
//!
//! This module provides a unified error hierarchy using `thiserror`.
//!
//! Note that framing problems on the receive path are mostly *not* errors:
//! malformed input becomes a classified record
//! ([`MessageStatus`](crate::message::MessageStatus)) and the connection
//! stays up. [`DecodeError`] covers the cases where a decode step itself has
//! to report failure, such as parsing a logon view.

use thiserror::Error;

/// Result type alias using [`GatewayError`] as the error type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Top-level error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// I/O error from the underlying socket.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while decoding tag=value data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: message must start with 8=")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Checksum field value is not three decimal digits.
    #[error("invalid checksum format")]
    InvalidChecksumFormat,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Unexpected message type for the decode being attempted.
    #[error("unexpected msg type: expected {expected}, found {found}")]
    UnexpectedMsgType {
        /// The message type the decoder required.
        expected: char,
        /// The message type found on the wire.
        found: String,
    },

    /// Invalid tag format (not a valid integer).
    #[error("invalid tag format")]
    InvalidTag,

    /// Missing required field.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
    },

    /// Invalid UTF-8 in a string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
