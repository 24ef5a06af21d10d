/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag-value frame encoder.
//!
//! Fields are appended to a body buffer; [`Encoder::finish`] prepends
//! BeginString and BodyLength and appends the CheckSum.

use crate::SOH;
use crate::checksum::Checksum;
use crate::field::FieldMessage;
use crate::tags;
use bytes::{BufMut, Bytes, BytesMut};
use ironfixp_core::EncodeError;

/// Tag-value frame encoder.
#[derive(Debug)]
pub struct Encoder<'a> {
    /// Everything between BodyLength and CheckSum.
    body: BytesMut,
    /// BeginString value, e.g. `"FIXT.1.1"`.
    begin_string: &'a str,
    /// First field that could not be represented.
    invalid: Option<EncodeError>,
}

impl<'a> Encoder<'a> {
    /// Creates a new encoder with the given BeginString.
    #[must_use]
    pub fn new(begin_string: &'a str) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string,
            invalid: None,
        }
    }

    /// Appends a string field.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends an unsigned integer field.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with raw bytes.
    ///
    /// A value containing SOH cannot be framed; the error is reported by
    /// [`Encoder::finish`].
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        if memchr::memchr(SOH, value).is_some() {
            self.invalid.get_or_insert(EncodeError::InvalidFieldValue {
                field: tag.to_string(),
                reason: "value contains the SOH delimiter".to_string(),
            });
            return;
        }

        let mut tag_buf = itoa::Buffer::new();
        self.body.put_slice(tag_buf.format(tag).as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Appends the MsgType and every body field of `message`.
    pub fn put_message(&mut self, message: &FieldMessage) {
        self.put_str(tags::MSG_TYPE, message.msg_type());
        for (tag, value) in message.fields() {
            self.put_str(*tag, value);
        }
    }

    /// Finalizes the frame.
    ///
    /// # Errors
    /// Returns the first `EncodeError` recorded while fields were appended.
    pub fn finish(self) -> Result<Bytes, EncodeError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }

        let mut len_buf = itoa::Buffer::new();
        let body_len = len_buf.format(self.body.len());

        let mut frame =
            BytesMut::with_capacity(self.begin_string.len() + body_len.len() + self.body.len() + 16);
        frame.put_slice(b"8=");
        frame.put_slice(self.begin_string.as_bytes());
        frame.put_u8(SOH);
        frame.put_slice(b"9=");
        frame.put_slice(body_len.as_bytes());
        frame.put_u8(SOH);
        frame.put_slice(&self.body);

        let checksum = Checksum::of(&frame);
        frame.put_slice(b"10=");
        frame.put_slice(&checksum.to_digits());
        frame.put_u8(SOH);

        Ok(frame.freeze())
    }

    /// Returns the current body length.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

/// Encodes a complete [`FieldMessage`] frame.
///
/// # Errors
/// Returns `EncodeError::InvalidFieldValue` if a value contains SOH.
pub fn encode_message(begin_string: &str, message: &FieldMessage) -> Result<Bytes, EncodeError> {
    let mut encoder = Encoder::new(begin_string);
    encoder.put_message(message);
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_frame_layout() {
        let mut encoder = Encoder::new("FIXT.1.1");
        encoder.put_str(35, "0");

        let frame = encoder.finish().unwrap();
        // body is "35=0|" (5 bytes)
        assert!(frame.starts_with(b"8=FIXT.1.1\x019=5\x0135=0\x01"));

        let checksum = Checksum::of(b"8=FIXT.1.1\x019=5\x0135=0\x01");
        let trailer = format!("10={checksum}\x01");
        assert!(frame.ends_with(trailer.as_bytes()));
    }

    #[test]
    fn test_encoder_uint() {
        let mut encoder = Encoder::new("FIXT.1.1");
        encoder.put_str(35, "D");
        encoder.put_uint(38, 1_000);
        assert_eq!(encoder.body_len(), b"35=D\x0138=1000\x01".len());
    }

    #[test]
    fn test_encoder_rejects_soh_in_value() {
        let mut encoder = Encoder::new("FIXT.1.1");
        encoder.put_str(35, "D");
        encoder.put_str(58, "bad\x01text");

        assert!(matches!(
            encoder.finish(),
            Err(EncodeError::InvalidFieldValue { field, .. }) if field == "58"
        ));
    }

    #[test]
    fn test_encode_message_keeps_field_order() {
        let message = FieldMessage::new("x")
            .with_field(320, "R1")
            .with_field(559, "4");
        let frame = encode_message("FIXT.1.1", &message).unwrap();
        let text = String::from_utf8_lossy(&frame);
        let body = "35=x\x01320=R1\x01559=4\x01";
        assert!(text.contains(body));
    }
}
