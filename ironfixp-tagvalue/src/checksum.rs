/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag-value checksum.
//!
//! The checksum is the byte sum of everything before the `10=` field, modulo
//! 256, written as exactly three ASCII digits.

use std::fmt;

/// A tag-value frame checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum(u8);

impl Checksum {
    /// Computes the checksum of `data`.
    ///
    /// # Arguments
    /// * `data` - Frame bytes up to, not including, the `10=` field
    #[inline]
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self(data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)))
    }

    /// Parses the three-digit field value.
    ///
    /// Returns `None` unless `digits` is exactly three ASCII digits with a
    /// value no greater than 255.
    #[must_use]
    pub fn parse(digits: &[u8]) -> Option<Self> {
        let [a, b, c] = digits else {
            return None;
        };
        if !(a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit()) {
            return None;
        }
        let value = u32::from(a - b'0') * 100 + u32::from(b - b'0') * 10 + u32::from(c - b'0');
        u8::try_from(value).ok().map(Self)
    }

    /// Returns the checksum as three ASCII digits.
    #[inline]
    #[must_use]
    pub const fn to_digits(self) -> [u8; 3] {
        [
            b'0' + self.0 / 100,
            b'0' + (self.0 / 10) % 10,
            b'0' + self.0 % 10,
        ]
    }

    /// Returns the numeric value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_of_known_frame() {
        let sum: u32 = b"8=FIX.4.4\x019=5\x0135=0\x01".iter().map(|&b| u32::from(b)).sum();
        let checksum = Checksum::of(b"8=FIX.4.4\x019=5\x0135=0\x01");
        assert_eq!(u32::from(checksum.value()), sum % 256);
    }

    #[test]
    fn test_checksum_wraps() {
        let data = vec![255u8; 1000];
        assert_eq!(Checksum::of(&data).value(), ((255u32 * 1000) % 256) as u8);
        assert_eq!(Checksum::of(b"").value(), 0);
    }

    #[test]
    fn test_checksum_digits() {
        assert_eq!(Checksum(7).to_digits(), *b"007");
        assert_eq!(Checksum(255).to_digits(), *b"255");
        assert_eq!(Checksum(42).to_string(), "042");
    }

    #[test]
    fn test_checksum_parse_rejects_bad_input() {
        assert_eq!(Checksum::parse(b"042"), Some(Checksum(42)));
        assert_eq!(Checksum::parse(b"42"), None);
        assert_eq!(Checksum::parse(b"0042"), None);
        assert_eq!(Checksum::parse(b"25a"), None);
        assert_eq!(Checksum::parse(b"256"), None);
    }
}
