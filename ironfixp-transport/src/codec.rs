/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for tag-value framing over TCP.
//!
//! Splits a byte stream into complete `8=..|9=..|...|10=nnn|` frames using
//! BodyLength. Field-level validation, including the checksum value, is left
//! to the tag-value decoder.

use bytes::{BufMut, Bytes, BytesMut};
use ironfixp_core::TransportError;
use ironfixp_tagvalue::{Checksum, SOH};
use memchr::memchr;
use tokio_util::codec::{Decoder, Encoder};

/// Length of the `10=nnn<SOH>` trailer.
const TRAILER_LEN: usize = 7;

/// Tokio codec for tag-value frames.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Creates a codec with a 1 MiB frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: 1024 * 1024,
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 2 {
            return Ok(None);
        }
        if &src[..2] != b"8=" {
            return Err(TransportError::Framing("frame must start with 8=".to_string()));
        }

        let Some(first_soh) = memchr(SOH, src) else {
            return Ok(None);
        };

        let body_len_start = first_soh + 1;
        if src.len() < body_len_start + 2 {
            return Ok(None);
        }
        if &src[body_len_start..body_len_start + 2] != b"9=" {
            return Err(TransportError::Framing("BodyLength must follow BeginString".to_string()));
        }
        let Some(pos) = memchr(SOH, &src[body_len_start..]) else {
            return Ok(None);
        };
        let body_len_soh = body_len_start + pos;

        let body_length: usize = std::str::from_utf8(&src[body_len_start + 2..body_len_soh])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| TransportError::Framing("invalid BodyLength".to_string()))?;

        let total_length = (body_len_soh + 1 + TRAILER_LEN)
            .checked_add(body_length)
            .filter(|len| *len <= self.max_frame_size)
            .ok_or_else(|| {
                TransportError::Framing(format!(
                    "BodyLength {body_length} exceeds frame limit of {}",
                    self.max_frame_size
                ))
            })?;

        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let trailer = &src[total_length - TRAILER_LEN..total_length];
        if &trailer[..3] != b"10=" || trailer[6] != SOH || Checksum::parse(&trailer[3..6]).is_none() {
            return Err(TransportError::Framing(
                "BodyLength does not point at a CheckSum field".to_string(),
            ));
        }

        Ok(Some(src.split_to(total_length).freeze()))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfixp_tagvalue::{FieldMessage, encode_message};

    fn heartbeat() -> Bytes {
        encode_message("FIXT.1.1", &FieldMessage::new("UnsequencedHeartbeat")).unwrap()
    }

    #[test]
    fn test_decode_complete_frame() {
        let frame = heartbeat();
        let mut buf = BytesMut::from(&frame[..]);

        let decoded = FrameCodec::new().decode(&mut buf).unwrap();
        assert_eq!(decoded, Some(frame));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_then_complete() {
        let frame = heartbeat();
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&frame[..frame.len() - 4]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(&frame[frame.len() - 4..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(frame));
    }

    #[test]
    fn test_decode_two_frames_in_one_read() {
        let frame = heartbeat();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&frame);
        buf.extend_from_slice(&frame);

        let mut codec = FrameCodec::new();
        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\n"[..]);
        assert!(matches!(
            FrameCodec::new().decode(&mut buf),
            Err(TransportError::Framing(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_body_length() {
        let mut buf = BytesMut::from(&b"8=FIXT.1.1\x019=3\x0135=0\x0110=000\x01"[..]);
        assert!(FrameCodec::new().decode(&mut buf).is_err());
    }

    #[test]
    fn test_decode_enforces_limit() {
        let frame = heartbeat();
        let mut buf = BytesMut::from(&frame[..]);
        assert!(FrameCodec::new().with_max_frame_size(10).decode(&mut buf).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_body_length() {
        let mut buf = BytesMut::from(&b"8=FIXT.1.1\x019=18446744073709551615\x0135=0\x01"[..]);
        assert!(matches!(
            FrameCodec::new().decode(&mut buf),
            Err(TransportError::Framing(_))
        ));
    }

    #[test]
    fn test_encode_passthrough() {
        let frame = heartbeat();
        let mut dst = BytesMut::new();
        FrameCodec::new().encode(frame.clone(), &mut dst).unwrap();
        assert_eq!(&dst[..], &frame[..]);
    }
}
