/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Identifier types used throughout the fixgate gateway.
//!
//! This module provides the typed identifiers that travel with every framed
//! message:
//! - [`ConnectionId`]: stable identifier for one accepted socket
//! - [`SessionId`]: identifier assigned by the authenticator
//! - [`SequenceIndex`]: session incarnation counter
//! - [`LibraryId`]: routing identifier for the owning library

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a single accepted connection.
///
/// Assigned when the socket is accepted and stable for the lifetime of the
/// socket. Unlike [`SessionId`], a connection id never repeats across
/// reconnects of the same counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new connection identifier.
    ///
    /// # Arguments
    /// * `value` - The raw connection id value
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw connection id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an authenticated FIX session.
///
/// Assigned by the authenticator on a successful logon. An endpoint holds
/// `Option<SessionId>`: it is unset until authentication succeeds and
/// transitions at most once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session identifier.
    ///
    /// # Arguments
    /// * `value` - The raw session id value
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw session id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session incarnation counter.
///
/// Distinguishes incarnations of a session that share the same
/// [`SessionId`], for example after a sequence-number reset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SequenceIndex(u32);

impl SequenceIndex {
    /// Creates a new sequence index.
    ///
    /// # Arguments
    /// * `value` - The raw sequence index value
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw sequence index value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the next incarnation.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SequenceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing identifier for the library that owns a connection.
///
/// Assigned externally by the gateway-session router and mutable over the
/// life of a connection (ownership of a session can migrate between
/// libraries).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct LibraryId(i32);

impl LibraryId {
    /// Creates a new library identifier.
    ///
    /// # Arguments
    /// * `value` - The raw library id value
    #[inline]
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw library id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
