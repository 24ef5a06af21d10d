/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field access for tag-value frames.
//!
//! - [`FieldRef`]: A field borrowed from a receive buffer during decoding
//! - [`FieldMessage`]: An owned message body, used both for decoded frames
//!   and for building outbound application messages

use ironfixp_core::DecodeError;
use smallvec::SmallVec;
use std::str::FromStr;

/// A field borrowed from the frame being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    /// The field tag number.
    pub tag: u32,
    /// The value bytes, without delimiters.
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Creates a new field reference.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        std::str::from_utf8(self.value).map_err(DecodeError::from)
    }
}

/// An owned tag-value message body.
///
/// Holds the message type (tag 35) plus every body field in wire order.
/// Header and trailer fields (8, 9, 10) are never stored; the encoder adds
/// them. Repeated tags are kept, which is how repeating groups appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    msg_type: String,
    fields: SmallVec<[(u32, String); 16]>,
}

impl FieldMessage {
    /// Creates an empty message of the given type.
    #[must_use]
    pub fn new(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            fields: SmallVec::new(),
        }
    }

    /// Adds a field and returns the message.
    #[must_use]
    pub fn with_field(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.push(tag, value);
        self
    }

    /// Appends a field.
    pub fn push(&mut self, tag: u32, value: impl Into<String>) {
        self.fields.push((tag, value.into()));
    }

    /// Returns the message type.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// Returns the first value of `tag`.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of `tag`, in wire order.
    pub fn get_all(&self, tag: u32) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Parses the first value of `tag`.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidFieldValue` if the value does not parse.
    pub fn parse<T: FromStr>(&self, tag: u32) -> Result<Option<T>, DecodeError> {
        match self.get(tag) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| DecodeError::InvalidFieldValue {
                field: tag.to_string(),
                reason: format!("cannot parse '{raw}'"),
            }),
        }
    }

    /// Returns all body fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[(u32, String)] {
        &self.fields
    }

    /// Returns the number of body fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message has no body fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
