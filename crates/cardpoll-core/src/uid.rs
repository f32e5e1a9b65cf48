//! Fixed-capacity hexadecimal UID text.
//!
//! Card identifiers travel through the handoff channel as a NUL-terminated,
//! upper-case hex string stored inline in the event. The buffer never
//! allocates and always keeps a terminator, even when an unusually long UID
//! has to be cut short.
//!
//! ```
//! use cardpoll_core::UidText;
//!
//! let text = UidText::<21>::encode(&[0xDE, 0xAD, 0xBE, 0xEF]);
//! assert_eq!(text.as_str(), "DEADBEEF");
//! assert_eq!(text.as_bytes_with_nul(), b"DEADBEEF\0");
//!
//! // Five characters fit in a six byte buffer.
//! let short = UidText::<6>::encode(&[0x01, 0x23, 0x45, 0x67]);
//! assert_eq!(short.as_str(), "01234");
//! ```

use crate::{Result, error::Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Upper-case hex text in a buffer of `N` bytes, terminator included.
///
/// At most `N - 1` characters are stored. `N` must be at least 1; a zero
/// capacity is rejected at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UidText<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> UidText<N> {
    const HAS_TERMINATOR: () = assert!(N > 0, "UidText needs room for the NUL terminator");

    /// Total buffer size, terminator included.
    pub const CAPACITY: usize = N;

    /// Create an empty text (terminator only).
    #[must_use]
    pub fn empty() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::HAS_TERMINATOR;
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Encode every byte as two upper-case hex digits, no separator.
    ///
    /// Encoding stops once `N - 1` characters are written, which can split
    /// the last byte when `N - 1` is odd.
    #[must_use]
    pub fn encode(bytes: &[u8]) -> Self {
        let mut text = Self::empty();
        let limit = N - 1;

        let digits = bytes
            .iter()
            .flat_map(|byte| [byte >> 4, byte & 0x0F])
            .take(limit);

        for nibble in digits {
            text.buf[text.len] = HEX_DIGITS[nibble as usize];
            text.len += 1;
        }

        // buf[len] is still zero from `empty()`.
        text
    }

    /// Number of hex characters, terminator excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no characters are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the text filled every slot before the terminator.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N - 1
    }

    /// Get the text without the terminator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII hex digits are ever written.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    /// Get the text followed by its NUL terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    /// Get the whole backing buffer, including the bytes after the terminator.
    #[must_use]
    pub fn as_raw(&self) -> &[u8; N] {
        &self.buf
    }
}

impl<const N: usize> Default for UidText<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> fmt::Debug for UidText<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("UidText").field(&self.as_str()).finish()
    }
}

impl<const N: usize> fmt::Display for UidText<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> std::str::FromStr for UidText<N> {
    type Err = Error;

    /// Parse already normalized text.
    ///
    /// Lower-case digits are folded to upper case; anything else is rejected.
    /// Text longer than `N - 1` characters is rejected rather than truncated.
    fn from_str(s: &str) -> Result<Self> {
        let mut text = Self::empty();

        if s.len() > N - 1 {
            return Err(Error::InvalidUid(format!(
                "UID text must be at most {} chars, got {}",
                N - 1,
                s.len()
            )));
        }

        for c in s.bytes() {
            if !c.is_ascii_hexdigit() {
                return Err(Error::InvalidUid(format!(
                    "UID text must be hexadecimal, got {s:?}"
                )));
            }
            text.buf[text.len] = c.to_ascii_uppercase();
            text.len += 1;
        }

        Ok(text)
    }
}

impl<const N: usize> Serialize for UidText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, const N: usize> Deserialize<'de> for UidText<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0xDE, 0xAD, 0xBE, 0xEF], "DEADBEEF")]
    #[case(&[0x00], "00")]
    #[case(&[0x0A, 0xB0], "0AB0")]
    #[case(&[0x04, 0x1F, 0x2E, 0x3D, 0x4C, 0x5B, 0x6A], "041F2E3D4C5B6A")]
    fn test_encode(#[case] bytes: &[u8], #[case] expected: &str) {
        let text = UidText::<21>::encode(bytes);
        assert_eq!(text.as_str(), expected);
        assert_eq!(text.len(), bytes.len() * 2);
        assert!(!text.is_full());
    }

    #[test]
    fn test_encode_ten_bytes_fills_buffer() {
        let text = UidText::<21>::encode(&[0xFF; 10]);
        assert_eq!(text.as_str(), "FFFFFFFFFFFFFFFFFFFF");
        assert!(text.is_full());
        assert_eq!(text.as_raw()[20], 0);
    }

    #[test]
    fn test_encode_truncates_and_keeps_terminator() {
        let text = UidText::<21>::encode(&[0x11; 12]);
        assert_eq!(text.len(), 20);
        assert_eq!(text.as_bytes_with_nul().last(), Some(&0));
    }

    #[test]
    fn test_encode_odd_limit_splits_last_byte() {
        let text = UidText::<4>::encode(&[0xAB, 0xCD]);
        assert_eq!(text.as_str(), "ABC");
        assert_eq!(text.as_bytes_with_nul(), b"ABC\0");
    }

    #[test]
    fn test_capacity_one_holds_only_terminator() {
        let text = UidText::<1>::encode(&[0xDE, 0xAD]);
        assert!(text.is_empty());
        assert!(text.is_full());
        assert_eq!(text.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn test_encode_empty_input() {
        let text = UidText::<21>::encode(&[]);
        assert!(text.is_empty());
        assert_eq!(text, UidText::default());
    }

    #[rstest]
    #[case("DEADBEEF", "DEADBEEF")]
    #[case("deadbeef", "DEADBEEF")]
    #[case("", "")]
    fn test_parse_valid(#[case] input: &str, #[case] expected: &str) {
        let text: UidText<21> = input.parse().unwrap();
        assert_eq!(text.as_str(), expected);
    }

    #[rstest]
    #[case("DEADBEEG")] // not hex
    #[case("DE:AD")] // separator
    #[case("0123456789ABCDEF01234")] // 21 chars, no room for terminator
    fn test_parse_invalid(#[case] input: &str) {
        let result: Result<UidText<21>> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_debug() {
        let text = UidText::<9>::encode(&[0x01, 0x02]);
        assert_eq!(text.to_string(), "0102");
        assert_eq!(format!("{:?}", text), "UidText(\"0102\")");
    }

    #[test]
    fn test_serialization() {
        let text = UidText::<21>::encode(&[0xCA, 0xFE]);
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, "\"CAFE\"");

        let deserialized: UidText<21> = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, text);
    }
}
