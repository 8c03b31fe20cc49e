/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Zero-copy logon message view.
//!
//! The first message on an unauthenticated connection is assumed to be a
//! logon. [`LogonView`] decodes a framed logon span without copying: field
//! values reference the receive buffer, and only the tags the authenticator
//! needs are resolved eagerly. The remaining fields stay available by tag
//! through [`LogonView::get`].

use fixgate_core::error::DecodeError;
use memchr::memchr;
use smallvec::SmallVec;

use crate::scanner::SOH;

/// SenderCompID (tag 49).
const SENDER_COMP_ID: u32 = 49;
/// TargetCompID (tag 56).
const TARGET_COMP_ID: u32 = 56;
/// HeartBtInt (tag 108).
const HEART_BT_INT: u32 = 108;
/// ResetSeqNumFlag (tag 141).
const RESET_SEQ_NUM_FLAG: u32 = 141;
/// Username (tag 553).
const USERNAME: u32 = 553;
/// Password (tag 554).
const PASSWORD: u32 = 554;
/// MsgType (tag 35).
const MSG_TYPE: u32 = 35;
/// CheckSum (tag 10).
const CHECK_SUM: u32 = 10;

/// A single tag=value field referencing the original buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    /// The tag number.
    pub tag: u32,
    /// The raw field value.
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Returns the field value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        Ok(std::str::from_utf8(self.value)?)
    }
}

/// Zero-copy view of a framed logon message.
#[derive(Debug, Clone)]
pub struct LogonView<'a> {
    fields: SmallVec<[FieldRef<'a>; 16]>,
    sender_comp_id: &'a [u8],
    target_comp_id: &'a [u8],
    heart_bt_int: u32,
}

impl<'a> LogonView<'a> {
    /// Decodes a logon view from a framed message span.
    ///
    /// # Arguments
    /// * `bytes` - The complete framed message, begin string through
    ///   checksum field
    ///
    /// # Errors
    /// Returns `DecodeError` if the span is not a logon or a required field
    /// is missing or malformed.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let mut fields: SmallVec<[FieldRef<'a>; 16]> = SmallVec::new();
        let mut cursor = 0;
        while let Some(field) = next_field(bytes, &mut cursor) {
            if field.tag == CHECK_SUM {
                break;
            }
            fields.push(field);
        }

        let msg_type = fields
            .iter()
            .find(|f| f.tag == MSG_TYPE)
            .ok_or(DecodeError::MissingMsgType)?;
        if msg_type.value != b"A" {
            return Err(DecodeError::UnexpectedMsgType {
                expected: 'A',
                found: String::from_utf8_lossy(msg_type.value).into_owned(),
            });
        }

        let sender_comp_id = required(&fields, SENDER_COMP_ID)?;
        let target_comp_id = required(&fields, TARGET_COMP_ID)?;
        let heart_bt_int = parse_u32(required(&fields, HEART_BT_INT)?)
            .ok_or(DecodeError::InvalidFieldValue { tag: HEART_BT_INT })?;

        Ok(Self {
            fields,
            sender_comp_id,
            target_comp_id,
            heart_bt_int,
        })
    }

    /// Returns the SenderCompID (tag 49).
    #[inline]
    #[must_use]
    pub fn sender_comp_id(&self) -> &'a [u8] {
        self.sender_comp_id
    }

    /// Returns the TargetCompID (tag 56).
    #[inline]
    #[must_use]
    pub fn target_comp_id(&self) -> &'a [u8] {
        self.target_comp_id
    }

    /// Returns the heartbeat interval in seconds (tag 108).
    #[inline]
    #[must_use]
    pub const fn heart_bt_int(&self) -> u32 {
        self.heart_bt_int
    }

    /// Returns the Username (tag 553), if present.
    #[inline]
    #[must_use]
    pub fn username(&self) -> Option<&'a [u8]> {
        self.get(USERNAME)
    }

    /// Returns the Password (tag 554), if present.
    #[inline]
    #[must_use]
    pub fn password(&self) -> Option<&'a [u8]> {
        self.get(PASSWORD)
    }

    /// Returns true if the logon requests a sequence-number reset (tag 141).
    #[inline]
    #[must_use]
    pub fn reset_seq_num(&self) -> bool {
        self.get(RESET_SEQ_NUM_FLAG) == Some(b"Y".as_slice())
    }

    /// Returns the value of an arbitrary tag, if present.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&'a [u8]> {
        self.fields.iter().find(|f| f.tag == tag).map(|f| f.value)
    }

    /// Returns an iterator over all fields before the checksum.
    pub fn fields(&self) -> impl Iterator<Item = &FieldRef<'a>> {
        self.fields.iter()
    }
}

/// Parses the next tag=value field, advancing `cursor` past its separator.
fn next_field<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<FieldRef<'a>> {
    if *cursor >= bytes.len() {
        return None;
    }
    let remaining = &bytes[*cursor..];

    let eq_pos = memchr(b'=', remaining)?;
    let tag = parse_tag(&remaining[..eq_pos])?;

    let value_start = eq_pos + 1;
    let soh_pos = memchr(SOH, &remaining[value_start..])?;
    let value = &remaining[value_start..value_start + soh_pos];

    *cursor += value_start + soh_pos + 1;
    Some(FieldRef { tag, value })
}

/// Looks up a required tag.
fn required<'a>(fields: &[FieldRef<'a>], tag: u32) -> Result<&'a [u8], DecodeError> {
    fields
        .iter()
        .find(|f| f.tag == tag)
        .map(|f| f.value)
        .ok_or(DecodeError::MissingRequiredField { tag })
}

/// Parses a tag number from ASCII bytes.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(result)
}

/// Parses an unsigned 32-bit decimal value.
#[inline]
fn parse_u32(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(result)
}
