// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
//!
//! `spec.md` §3.3: magic string, external magic string, short inline string,
//! long string, external string, and transient concatenated rope.

use crate::heap::indexes::Index;
use small_string::SmallString;
use wtf8::{CodePoint, Wtf8, Wtf8Buf};

/// One arena slot for a heap-resident string: everything that isn't a
/// [`SmallString`] (7 bytes or fewer).
#[derive(Debug)]
pub enum StringHeapData {
    /// A long string with a separately allocated byte buffer.
    Owned(Wtf8Buf),
    /// A byte buffer owned by the embedder; `release` is invoked on
    /// finalization (`spec.md` §4.7 sweep: "external strings invoke the
    /// embedder's release callback").
    External {
        bytes: Box<[u8]>,
        release: Option<ExternalStringFinalizer>,
    },
    /// A well-known engine string (property names like `"length"`, the
    /// primitive `typeof` results, ...), seeded once into
    /// [`crate::heap::builtin_strings::TABLE`] at [`crate::heap::Heap::new`]
    /// time. Stores only the table index, not a copy of the bytes.
    Magic(u16),
    /// An embedder-registered magic string (`spec.md` §3.3): unlike
    /// [`StringHeapData::External`], which is interned by content like any
    /// other string, an external magic string is registered once up front
    /// via `heap::builtin_strings::register_external` and is expected to be
    /// looked up by the `JsString` handle returned from registration, not
    /// re-derived from its bytes.
    ExternalMagic {
        bytes: Box<[u8]>,
        release: Option<ExternalStringFinalizer>,
    },
    /// A transient concatenation of two other string values, produced by
    /// `+` and flattened into [`StringHeapData::Owned`] lazily the first
    /// time its bytes are read.
    Rope {
        left: super::value::Value,
        right: super::value::Value,
    },
}

pub type ExternalStringFinalizer = fn(*mut u8, usize);

impl StringHeapData {
    pub fn from_string(s: std::string::String) -> Self {
        Self::Owned(Wtf8Buf::from_string(s))
    }

    pub fn as_flattened_str(&self) -> Option<&str> {
        match self {
            Self::Owned(buf) => buf.as_str(),
            Self::External { bytes, .. } | Self::ExternalMagic { bytes, .. } => std::str::from_utf8(bytes).ok(),
            Self::Magic(index) => Some(crate::heap::builtin_strings::TABLE[*index as usize]),
            Self::Rope { .. } => None,
        }
    }
}

/// A heap-resident string, referenced through its arena [`Index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapString(pub(crate) Index<StringHeapData>);

impl HeapString {
    pub(crate) fn new(index: Index<StringHeapData>) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index<StringHeapData> {
        self.0
    }
}

/// The [`String`] value type: either inline (no allocation) or heap-backed.
///
/// Two `String` values are guaranteed equal-by-identity iff their contents
/// are equal, because every non-rope string is produced through
/// `Heap::find_or_create_string`, which deduplicates on creation
/// (`spec.md` §3.3, §8 "String identity").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsString {
    SmallString(SmallString),
    String(HeapString),
}

impl JsString {
    pub const EMPTY: Self = Self::SmallString(SmallString::EMPTY);

    pub fn from_small_string_unchecked(s: &str) -> Self {
        Self::SmallString(SmallString::try_from(s).expect("string did not fit inline"))
    }

    pub fn is_empty_str(self, agent: &crate::context::Context) -> bool {
        self.len_utf8(agent) == 0
    }

    pub fn len_utf8(self, agent: &crate::context::Context) -> usize {
        match self {
            Self::SmallString(s) => s.len(),
            Self::String(h) => agent.heap.flattened_string_bytes(h).len(),
        }
    }

    pub fn as_wtf8<'a>(self, agent: &'a crate::context::Context) -> std::borrow::Cow<'a, Wtf8> {
        match self {
            Self::SmallString(s) => std::borrow::Cow::Owned(s.as_wtf8().to_owned()),
            Self::String(h) => std::borrow::Cow::Borrowed(agent.heap.flattened_string_wtf8(h)),
        }
    }

    pub fn as_str<'a>(self, agent: &'a crate::context::Context) -> &'a str {
        match self {
            Self::SmallString(_) => unreachable!("use `as_str_buffered` for a SmallString"),
            Self::String(h) => agent.heap.flattened_string_bytes(h),
        }
    }

    /// Returns a `&str` for strings of either representation, buffering a
    /// `SmallString`'s bytes into `scratch` when needed.
    pub fn as_str_buffered<'a>(self, agent: &'a crate::context::Context, scratch: &'a mut std::string::String) -> &'a str {
        match self {
            Self::SmallString(s) => {
                *scratch = s.to_string();
                scratch.as_str()
            }
            Self::String(h) => agent.heap.flattened_string_bytes(h),
        }
    }

    pub fn concat(agent: &mut crate::context::Context, a: JsString, b: JsString) -> JsString {
        if a.is_empty_str(agent) {
            return b;
        }
        if b.is_empty_str(agent) {
            return a;
        }
        let mut buf = Wtf8Buf::new();
        buf.push_wtf8(&a.as_wtf8(agent));
        buf.push_wtf8(&b.as_wtf8(agent));
        agent.heap.find_or_create_string(buf)
    }

    pub fn push_code_point(agent: &mut crate::context::Context, s: JsString, cp: CodePoint) -> JsString {
        let mut buf = s.as_wtf8(agent).into_owned();
        buf.push(cp);
        agent.heap.find_or_create_string(buf)
    }

    pub fn eq(self, agent: &crate::context::Context, other: JsString) -> bool {
        match (self, other) {
            (Self::SmallString(a), Self::SmallString(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            // Every string is interned, so representations never differ for
            // equal content — but guard anyway for strings constructed
            // outside of `find_or_create_string` (ropes mid-flatten).
            _ => self.as_wtf8(agent) == other.as_wtf8(agent),
        }
    }
}

impl From<SmallString> for JsString {
    fn from(value: SmallString) -> Self {
        Self::SmallString(value)
    }
}

impl From<HeapString> for JsString {
    fn from(value: HeapString) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn equal_contents_intern_to_the_same_slot() {
        let mut agent = Context::new_for_test();
        let a = agent.heap.find_or_create_string(Wtf8Buf::from_str("a somewhat long string"));
        let b = agent.heap.find_or_create_string(Wtf8Buf::from_str("a somewhat long string"));
        assert_eq!(a, b);
    }

    #[test]
    fn short_strings_stay_inline() {
        let mut agent = Context::new_for_test();
        let s = agent.heap.find_or_create_string(Wtf8Buf::from_str("short"));
        assert!(matches!(s, JsString::SmallString(_)));
    }

    #[test]
    fn concat_is_observably_equal_to_direct_literal() {
        let mut agent = Context::new_for_test();
        let concatenated = JsString::concat(&mut agent, JsString::from_small_string_unchecked("foo"), JsString::from_small_string_unchecked("bar"));
        let direct = agent.heap.find_or_create_string(Wtf8Buf::from_str("foobar"));
        assert!(concatenated.eq(&agent, direct));
    }
}
