/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Stateless frame scanner for the gateway receive path.
//!
//! [`scan`] locates the boundaries of the next candidate message inside a
//! partially filled receive buffer. It is a pure function over
//! `(bytes, offset, used)`: the caller owns the buffer and the cursor, the
//! scanner owns nothing.
//!
//! The scanner distinguishes four outcomes:
//! - a complete well-formed frame (with its checksum already classified)
//! - a malformed span recovered by resynchronization after a bad body length
//! - an unrecoverable parse failure, which condemns the whole unconsumed
//!   buffer (a corrupt `8=`/`9=` header leaves no reliable boundary to
//!   resume from)
//! - need-more-data, which is never an error
//!
//! Partial input always yields [`ScanOutcome::NeedMoreData`]: the caller
//! retains the buffered bytes and retries after the next socket read, so a
//! message split across any number of reads frames identically to one that
//! arrived whole.

use crate::checksum::{calculate_checksum, parse_checksum};
use fixgate_core::MsgTypeCode;
use memchr::memchr;
use tracing::debug;

/// SOH (Start of Header) field separator.
pub const SOH: u8 = 0x01;

/// Tag byte of the BeginString field (tag 8).
const BEGIN_STRING_TAG: u8 = b'8';

/// Tag byte of the BodyLength field (tag 9).
const BODY_LENGTH_TAG: u8 = b'9';

/// The checksum tag pattern as it appears on the wire: `<SOH>10=`.
const CHECKSUM_PATTERN: [u8; 4] = [SOH, b'1', b'0', b'='];

/// Length of the checksum tag without its leading SOH (`10=`).
const CHECKSUM_TAG_SIZE: usize = 3;

/// Leading SOH, checksum tag, and at least one digit of its value.
const MIN_CHECKSUM_SIZE: usize = CHECKSUM_TAG_SIZE + 2;

/// Minimum number of buffered bytes before scanning is attempted.
///
/// Below this threshold not even the fixed `8=...|9=...|10=XXX|` skeleton
/// fits, so the scanner reports need-more-data without looking at the bytes.
pub const MIN_MESSAGE_SIZE: usize = 20;

/// A complete, structurally well-formed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Total length of the frame from the scan offset through the SOH that
    /// terminates the checksum field.
    pub length: usize,
    /// The message type code (tag 35), or [`MsgTypeCode::UNKNOWN`] if the
    /// type field could not be located.
    pub msg_type: MsgTypeCode,
    /// Whether the declared checksum matches the computed one. A mismatch
    /// does not invalidate the framing; the message is still delivered,
    /// classified accordingly.
    pub checksum_ok: bool,
}

impl FrameInfo {
    /// Returns the integrity classification for this frame.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> fixgate_core::MessageStatus {
        if self.checksum_ok {
            fixgate_core::MessageStatus::Ok
        } else {
            fixgate_core::MessageStatus::InvalidChecksum
        }
    }
}

/// Result of one scan attempt at a given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The buffered bytes do not yet contain a complete frame. Not an
    /// error: retain the bytes and retry after the next read.
    NeedMoreData,
    /// Unrecoverable parse failure. The entire unconsumed region
    /// `[offset, used)` must be treated as one invalid record; no
    /// resynchronization point exists.
    Invalid,
    /// A complete frame starting at the scan offset.
    Frame(FrameInfo),
    /// A malformed span recovered by resynchronization: the declared body
    /// length was wrong but the checksum tag pattern was located further
    /// on. `length` covers the whole malformed span from the scan offset.
    InvalidBodyLength {
        /// Length of the malformed span.
        length: usize,
    },
}

/// Scans for the next message starting at `offset`.
///
/// # Arguments
/// * `data` - The receive buffer
/// * `offset` - Start of the unconsumed region
/// * `used` - End of the valid region; bytes `[offset, used)` are pending
///
/// # Returns
/// The scan outcome; see [`ScanOutcome`].
#[must_use]
pub fn scan(data: &[u8], offset: usize, used: usize) -> ScanOutcome {
    debug_assert!(offset <= used && used <= data.len());

    if used - offset < MIN_MESSAGE_SIZE {
        return ScanOutcome::NeedMoreData;
    }

    // Fixed two-field header: 8=<ver><SOH>9=<len><SOH>.
    if !valid_tag(data, offset, BEGIN_STRING_TAG) {
        debug!(offset, "begin string tag mismatch, condemning buffer");
        return ScanOutcome::Invalid;
    }
    let Some(end_of_begin_string) = find_soh(data, offset + 2, used) else {
        debug!(offset, "no field separator after begin string");
        return ScanOutcome::Invalid;
    };

    let start_of_body_tag = end_of_begin_string + 1;
    if start_of_body_tag + 1 >= used {
        return ScanOutcome::NeedMoreData;
    }
    if !valid_tag(data, start_of_body_tag, BODY_LENGTH_TAG) {
        debug!(offset, "body length tag mismatch, condemning buffer");
        return ScanOutcome::Invalid;
    }
    let start_of_body_length = start_of_body_tag + 2;
    let Some(end_of_body_length) = find_soh(data, start_of_body_length, used) else {
        return ScanOutcome::NeedMoreData;
    };

    let Some(body_length) = parse_natural(&data[start_of_body_length..end_of_body_length]) else {
        debug!(offset, "non-numeric body length, condemning buffer");
        return ScanOutcome::Invalid;
    };

    // The declared body ends with the SOH that precedes the checksum tag.
    let Some(start_of_checksum_tag) = end_of_body_length.checked_add(body_length) else {
        return ScanOutcome::Invalid;
    };
    if start_of_checksum_tag.saturating_add(MIN_CHECKSUM_SIZE) >= used {
        return ScanOutcome::NeedMoreData;
    }

    if !is_checksum_tag(data, start_of_checksum_tag) {
        return resynchronize(data, offset, used, start_of_checksum_tag);
    }

    let start_of_checksum_value = start_of_checksum_tag + CHECKSUM_PATTERN.len();
    let Some(end_of_message) = find_soh(data, start_of_checksum_value, used) else {
        return ScanOutcome::NeedMoreData;
    };

    let Some(declared) = parse_checksum(&data[start_of_checksum_value..end_of_message]) else {
        debug!(offset, "malformed checksum value, condemning buffer");
        return ScanOutcome::Invalid;
    };
    // Checksum covers every byte through the SOH preceding the checksum tag.
    let computed = calculate_checksum(&data[offset..=start_of_checksum_tag]);

    ScanOutcome::Frame(FrameInfo {
        length: (end_of_message + 1) - offset,
        msg_type: message_type(data, end_of_body_length + 1, end_of_message),
        // A declared value beyond the mod-256 range never matches.
        checksum_ok: u16::from(computed) == declared,
    })
}

/// Recovers the end of a malformed message after a wrong declared body
/// length.
///
/// Searches forward, byte by byte from one past the expected checksum
/// position, for the literal `<SOH>10=` pattern, then to the next field
/// separator. The whole span is one invalid-body-length record; scanning
/// can resume immediately after it.
fn resynchronize(
    data: &[u8],
    offset: usize,
    used: usize,
    start_of_checksum_tag: usize,
) -> ScanOutcome {
    let mut search = start_of_checksum_tag + 1;
    let point = loop {
        let Some(i) = find_soh(data, search, used) else {
            return ScanOutcome::NeedMoreData;
        };
        if i + CHECKSUM_TAG_SIZE >= used {
            // Pattern cannot be confirmed yet; later separators are even
            // closer to the end of the buffered data.
            return ScanOutcome::NeedMoreData;
        }
        if is_checksum_tag(data, i) {
            break i;
        }
        search = i + 1;
    };

    let Some(end_of_message) = find_soh(data, point + CHECKSUM_PATTERN.len(), used) else {
        return ScanOutcome::NeedMoreData;
    };

    debug!(
        offset,
        length = (end_of_message + 1) - offset,
        "resynchronized after invalid body length"
    );
    ScanOutcome::InvalidBodyLength {
        length: (end_of_message + 1) - offset,
    }
}

/// Checks for a single-digit tag followed by `=` at `index`.
#[inline]
fn valid_tag(data: &[u8], index: usize, tag: u8) -> bool {
    data[index] == tag && data[index + 1] == b'='
}

/// Checks for the `<SOH>10=` pattern at `index`.
#[inline]
fn is_checksum_tag(data: &[u8], index: usize) -> bool {
    data[index..index + CHECKSUM_PATTERN.len()] == CHECKSUM_PATTERN
}

/// Finds the next SOH in `[from, used)`.
#[inline]
fn find_soh(data: &[u8], from: usize, used: usize) -> Option<usize> {
    if from >= used {
        return None;
    }
    memchr(SOH, &data[from..used]).map(|i| from + i)
}

/// Parses an unsigned decimal ASCII value.
///
/// # Returns
/// The value, or `None` if the slice is empty, contains a non-digit, or
/// overflows.
#[inline]
fn parse_natural(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: usize = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value
            .checked_mul(10)?
            .checked_add(usize::from(b - b'0'))?;
    }
    Some(value)
}

/// Extracts the message type code from the first field of the body.
///
/// The type field sits between the body-length field and the checksum
/// field: a single byte if followed immediately by SOH, otherwise a
/// two-byte code.
fn message_type(data: &[u8], body_start: usize, end_of_message: usize) -> MsgTypeCode {
    let Some(i) = memchr(b'=', &data[body_start..end_of_message]) else {
        return MsgTypeCode::UNKNOWN;
    };
    let start = body_start + i + 1;
    if start >= end_of_message {
        return MsgTypeCode::UNKNOWN;
    }
    if start + 1 < end_of_message && data[start + 1] != SOH {
        MsgTypeCode::from_bytes(&data[start..start + 2])
    } else {
        MsgTypeCode::from_byte(data[start])
    }
}
