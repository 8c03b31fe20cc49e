/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Message classification model for the receive path.
//!
//! This module provides:
//! - [`MessageStatus`]: classification attached to every published record
//! - [`MsgTypeCode`]: compact 1-2 byte FIX message type code
//! - [`DisconnectReason`]: the closed set of reasons a connection ends
//!
//! Every byte that arrives on a connection is forwarded downstream as a
//! record carrying one of these classifications; nothing is silently
//! dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a framed record handed to the downstream bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Well-framed message with a valid checksum.
    Ok,
    /// Declared body length did not lead to the checksum field; the span was
    /// recovered by resynchronization.
    InvalidBodyLength,
    /// Well-framed message whose declared checksum does not match the
    /// computed one. Forwarded for audit, never dropped.
    InvalidChecksum,
    /// Unparseable bytes with no recoverable framing boundary.
    Invalid,
}

impl MessageStatus {
    /// Returns true if the record passed both framing and integrity checks.
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::InvalidBodyLength => "INVALID_BODYLENGTH",
            Self::InvalidChecksum => "INVALID_CHECKSUM",
            Self::Invalid => "INVALID",
        };
        write!(f, "{s}")
    }
}

/// Compact FIX message type code (tag 35).
///
/// FIX message types are one or two ASCII bytes (`A` = Logon, `AE` = Trade
/// Capture Report). The receive path never allocates, so the code is stored
/// inline. Two sentinels cover records without a readable type:
/// [`MsgTypeCode::UNKNOWN`] when the body could not be read at all, and
/// [`MsgTypeCode::INVALID`] for unparseable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsgTypeCode {
    bytes: [u8; 2],
    len: u8,
}

impl MsgTypeCode {
    /// Message type of a record whose type field could not be located.
    pub const UNKNOWN: Self = Self {
        bytes: [0, 0],
        len: 0,
    };

    /// Message type attached to unparseable records.
    pub const INVALID: Self = Self {
        bytes: [b'-', 0],
        len: 1,
    };

    /// Creates a one-byte message type code.
    ///
    /// # Arguments
    /// * `byte` - The single type byte (e.g. `b'A'` for Logon)
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            bytes: [byte, 0],
            len: 1,
        }
    }

    /// Creates a message type code from a 1-2 byte slice.
    ///
    /// # Arguments
    /// * `bytes` - The type bytes as they appear on the wire
    ///
    /// # Returns
    /// The code, or [`MsgTypeCode::UNKNOWN`] if `bytes` is empty or longer
    /// than two bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: &[u8]) -> Self {
        match bytes.len() {
            1 => Self {
                bytes: [bytes[0], 0],
                len: 1,
            },
            2 => Self {
                bytes: [bytes[0], bytes[1]],
                len: 2,
            },
            _ => Self::UNKNOWN,
        }
    }

    /// Returns the wire bytes of this code (empty for [`MsgTypeCode::UNKNOWN`]).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Returns true if this is the unknown-type sentinel.
    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.len == 0
    }

    /// Returns true if this code identifies a Logon message.
    #[inline]
    #[must_use]
    pub const fn is_logon(self) -> bool {
        self.len == 1 && self.bytes[0] == b'A'
    }
}

impl fmt::Display for MsgTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "?")
        } else {
            for &b in self.as_bytes() {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        }
    }
}

/// Reason a connection was disconnected.
///
/// Attached to the deferred disconnect notification sent to the downstream
/// bus so consumers can distinguish a peer hanging up from the gateway
/// rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisconnectReason {
    /// The remote peer closed the socket or the read faulted.
    RemoteDisconnect,
    /// No logon arrived within the externally enforced window.
    NoLogon,
    /// The authenticator rejected the logon credentials.
    FailedAuthentication,
    /// The logon named a session that is already connected elsewhere.
    DuplicateSession,
    /// The owning library or operator requested the disconnect.
    ApplicationRequested,
    /// An unexpected fault tore down the connection.
    Exception,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RemoteDisconnect => "remote disconnect",
            Self::NoLogon => "no logon received",
            Self::FailedAuthentication => "failed authentication",
            Self::DuplicateSession => "duplicate session",
            Self::ApplicationRequested => "application requested",
            Self::Exception => "exception",
        };
        write!(f, "{s}")
    }
}
