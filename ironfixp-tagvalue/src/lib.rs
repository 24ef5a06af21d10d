/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Tag-Value
//!
//! FIX tag=value encoding and decoding for the IronFixp session client.
//!
//! This crate turns SOH-delimited `tag=value` frames into [`FieldMessage`]s
//! and back. It knows nothing about sessions; the codec crate maps the
//! administrative messages onto fields.
//!
//! ## Features
//!
//! - **Owned messages**: Decoded frames outlive the receive buffer
//! - **SIMD-accelerated**: Uses `memchr` for delimiter search
//! - **Full validation**: BeginString, BodyLength and CheckSum are all checked

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod field;

pub use checksum::Checksum;
pub use decoder::{Decoder, decode_message};
pub use encoder::{Encoder, encode_message};
pub use field::{FieldMessage, FieldRef};

/// SOH (Start of Header) delimiter used in tag=value frames.
pub const SOH: u8 = 0x01;

/// Standard header and trailer tags.
pub mod tags {
    /// BeginString.
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength.
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum.
    pub const CHECKSUM: u32 = 10;
    /// MsgType.
    pub const MSG_TYPE: u32 = 35;
    /// Text.
    pub const TEXT: u32 = 58;
}
