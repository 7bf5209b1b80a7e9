// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 7-byte small string optimisation for use in the KiloJS ECMAScript engine.
//!
//! [`SmallString`] packs up to 7 bytes of UTF-8 text plus a length nibble into
//! a single `u64`-sized value with no heap allocation. It is used by the
//! engine's string representation (see `kilojs_core::types::string`) to avoid
//! allocating a heap string for short identifiers and literals, which make up
//! the overwhelming majority of strings that appear in real ECMAScript source.
//!
//! Only strings whose UTF-8 encoding is at most 7 bytes, and which do not
//! require surrogate-pair handling beyond what UTF-8 already expresses, are
//! representable. Everything else must be stored on the heap.

use core::fmt;
use wtf8::Wtf8;

pub const SMALL_STRING_DATA_LEN: usize = 7;

/// An inline string of at most 7 bytes, stored without indirection.
///
/// The last byte of the backing array doubles as a length marker: unused
/// trailing bytes are filled with `0xFF`, a byte that can never appear inside
/// well-formed UTF-8, so the length can be recovered by counting trailing
/// `0xFF` bytes instead of storing it separately.
#[derive(Clone, Copy, Eq)]
pub struct SmallString {
    bytes: [u8; SMALL_STRING_DATA_LEN],
}

const EMPTY_BYTE: u8 = 0xFF;

impl SmallString {
    pub const EMPTY: Self = Self {
        bytes: [EMPTY_BYTE; SMALL_STRING_DATA_LEN],
    };

    /// Creates a `SmallString` from a `&str`, without checking that it fits.
    ///
    /// # Safety
    /// The caller must guarantee `string.len() <= SMALL_STRING_DATA_LEN` and
    /// that `string` contains no byte equal to `0xFF` (true of all UTF-8).
    pub const unsafe fn from_str_unchecked(string: &str) -> Self {
        let mut bytes = [EMPTY_BYTE; SMALL_STRING_DATA_LEN];
        let src = string.as_bytes();
        let mut i = 0;
        while i < src.len() {
            bytes[i] = src[i];
            i += 1;
        }
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes
            .iter()
            .position(|&b| b == EMPTY_BYTE)
            .unwrap_or(SMALL_STRING_DATA_LEN)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes[0] == EMPTY_BYTE
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: construction only ever copies valid UTF-8 bytes in.
        unsafe { core::str::from_utf8_unchecked(&self.bytes[..self.len()]) }
    }

    pub fn as_wtf8(&self) -> &Wtf8 {
        Wtf8::from_str(self.as_str())
    }

    pub fn is_ascii(&self) -> bool {
        self.bytes[..self.len()].is_ascii()
    }

    pub fn to_string(self) -> std::string::String {
        self.as_str().to_owned()
    }
}

impl Default for SmallString {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringTooLongError;

impl TryFrom<&str> for SmallString {
    type Error = StringTooLongError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.len() > SMALL_STRING_DATA_LEN || value.as_bytes().contains(&EMPTY_BYTE) {
            return Err(StringTooLongError);
        }
        // SAFETY: just checked the length and the absence of 0xFF bytes.
        Ok(unsafe { Self::from_str_unchecked(value) })
    }
}

impl PartialEq for SmallString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl core::hash::Hash for SmallString {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for SmallString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SmallString").field(&self.as_str()).finish()
    }
}

impl fmt::Display for SmallString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_ascii() {
        let s = SmallString::try_from("hello").unwrap();
        assert_eq!(s.as_str(), "hello");
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn rejects_strings_longer_than_seven_bytes() {
        assert!(SmallString::try_from("too long a string").is_err());
    }

    #[test]
    fn accepts_exactly_seven_bytes() {
        let s = SmallString::try_from("1234567").unwrap();
        assert_eq!(s.len(), 7);
        assert_eq!(s.as_str(), "1234567");
    }

    #[test]
    fn empty_string_has_zero_length() {
        assert_eq!(SmallString::default().len(), 0);
        assert!(SmallString::default().is_empty());
    }

    #[test]
    fn equality_is_byte_exact() {
        let a = SmallString::try_from("ab").unwrap();
        let b = SmallString::try_from("ab").unwrap();
        assert_eq!(a, b);
    }
}
