/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag-value frame decoder.
//!
//! Parses exactly one complete frame into a [`FieldMessage`]. Stream
//! framing (finding where a frame ends) is the transport's job.

use crate::checksum::Checksum;
use crate::field::{FieldMessage, FieldRef};
use crate::{SOH, tags};
use ironfixp_core::DecodeError;
use memchr::memchr;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Tag-value frame decoder.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
    validate_checksum: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder over one frame.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            validate_checksum: true,
        }
    }

    /// Sets whether to validate checksums during decoding.
    #[inline]
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Decodes the frame.
    ///
    /// # Errors
    /// Returns `DecodeError` if the header is wrong, BodyLength does not
    /// match, the checksum fails, or bytes follow the CheckSum field.
    pub fn decode(&mut self) -> Result<FieldMessage, DecodeError> {
        let begin = self.expect_field("BeginString")?;
        if begin.tag != tags::BEGIN_STRING {
            return Err(DecodeError::InvalidBeginString);
        }

        let body_length = match self.next_field()? {
            Some(field) if field.tag == tags::BODY_LENGTH => field
                .as_str()?
                .parse::<usize>()
                .map_err(|_| DecodeError::InvalidBodyLength)?,
            _ => return Err(DecodeError::MissingBodyLength),
        };
        let body_start = self.offset;

        let msg_type = match self.next_field()? {
            Some(field) if field.tag == tags::MSG_TYPE => field.as_str()?,
            _ => return Err(DecodeError::MissingMsgType),
        };
        let mut message = FieldMessage::new(msg_type);

        let (body_end, declared) = loop {
            let field_start = self.offset;
            let field = self.expect_field("CheckSum")?;
            if field.tag == tags::CHECKSUM {
                let declared = Checksum::parse(field.value).ok_or_else(|| {
                    DecodeError::InvalidFieldValue {
                        field: "10".to_string(),
                        reason: "checksum must be three digits".to_string(),
                    }
                })?;
                break (field_start, declared);
            }
            message.push(field.tag, field.as_str()?);
        };

        if body_end - body_start != body_length {
            return Err(DecodeError::InvalidBodyLength);
        }

        if self.validate_checksum {
            let calculated = Checksum::of(&self.input[..body_end]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated: calculated.value(),
                    declared: declared.value(),
                });
            }
        }

        if self.offset != self.input.len() {
            return Err(DecodeError::Malformed(format!(
                "{} trailing bytes after checksum",
                self.input.len() - self.offset
            )));
        }

        Ok(message)
    }

    /// Parses the next field.
    ///
    /// Returns `Ok(None)` when the input is exhausted or the last field is
    /// not terminated by SOH.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidTag` if the tag is not a positive integer.
    pub fn next_field(&mut self) -> Result<Option<FieldRef<'a>>, DecodeError> {
        let remaining = &self.input[self.offset..];
        let Some(eq_pos) = memchr(EQUALS, remaining) else {
            return Ok(None);
        };
        let tag_bytes = &remaining[..eq_pos];
        let tag = parse_tag(tag_bytes)
            .ok_or_else(|| DecodeError::InvalidTag(String::from_utf8_lossy(tag_bytes).into_owned()))?;

        let value_start = eq_pos + 1;
        let Some(soh_pos) = memchr(SOH, &remaining[value_start..]) else {
            return Ok(None);
        };
        let value = &remaining[value_start..value_start + soh_pos];
        self.offset += value_start + soh_pos + 1;

        Ok(Some(FieldRef::new(tag, value)))
    }

    fn expect_field(&mut self, what: &str) -> Result<FieldRef<'a>, DecodeError> {
        self.next_field()?
            .ok_or_else(|| DecodeError::Malformed(format!("frame truncated before {what}")))
    }
}

/// Decodes one complete frame with checksum validation.
///
/// # Errors
/// See [`Decoder::decode`].
pub fn decode_message(frame: &[u8]) -> Result<FieldMessage, DecodeError> {
    Decoder::new(frame).decode()
}

/// Parses a tag number from ASCII digits.
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

    (result > 0).then_some(result)
}
