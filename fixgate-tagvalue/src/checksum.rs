/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of all bytes in the message up to and
//! including the SOH that precedes the checksum field, modulo 256, formatted
//! as a 3-digit zero-padded decimal value.

/// Calculates the FIX checksum for the given data.
///
/// The checksum is the sum of all bytes modulo 256.
///
/// # Arguments
/// * `data` - The message bytes to checksum (excluding the 10=XXX| field)
///
/// # Returns
/// The checksum value as a u8 (0-255).
///
/// # Example
/// ```
/// use fixgate_tagvalue::calculate_checksum;
///
/// let data = b"8=FIX.4.2\x019=5\x0135=A\x01";
/// let checksum = calculate_checksum(data);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    let sum: u32 = data.iter().map(|&b| u32::from(b)).sum();
    (sum % 256) as u8
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Arguments
/// * `checksum` - The checksum value (0-255)
///
/// # Returns
/// A 3-character representation (e.g., "042", "255").
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Parses a 3-digit checksum string.
///
/// The wire allows any three decimal digits, so the declared value can
/// exceed the mod-256 range ("256" through "999"). Such values are
/// returned as-is; they can never equal a computed checksum, so the
/// comparison classifies them as a mismatch rather than a framing error.
///
/// # Arguments
/// * `bytes` - The 3-byte checksum string
///
/// # Returns
/// `Some(declared)` if the value is three decimal digits, `None` otherwise.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 3 {
        return None;
    }

    let d0 = bytes[0].checked_sub(b'0')?;
    let d1 = bytes[1].checked_sub(b'0')?;
    let d2 = bytes[2].checked_sub(b'0')?;

    if d0 > 9 || d1 > 9 || d2 > 9 {
        return None;
    }

    Some(u16::from(d0) * 100 + u16::from(d1) * 10 + u16::from(d2))
}
