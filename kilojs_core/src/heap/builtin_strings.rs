// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### `spec.md` §3.3 "magic string"
//!
//! A fixed table of well-known strings — reserved property names, the
//! primitive `typeof` results, well-known symbol descriptions — seeded into
//! the string heap once at [`super::Heap::new`] time so that looking one up
//! never allocates and never touches the content-based intern table.
//!
//! Grounded on `nova_vm/build.rs`'s `BUILTIN_STRING_MEMORY` codegen, which
//! reads a newline-delimited `src/builtin_strings` file and emits a
//! `BuiltinStrings` struct of pre-resolved `String` values addressed by
//! table index. This table is small enough to list inline rather than
//! generate from a build script.

use super::Heap;
use crate::types::language::string::{HeapString, JsString, StringHeapData};

/// Every entry here gets its own heap slot at startup; `Heap::magic` maps a
/// table index straight back to the `HeapString` that was seeded for it.
pub const TABLE: &[&str] = &[
    "length",
    "name",
    "prototype",
    "constructor",
    "message",
    "stack",
    "toString",
    "valueOf",
    "next",
    "value",
    "done",
    "__proto__",
    "undefined",
    "object",
    "function",
    "boolean",
    "number",
    "string",
    "symbol",
    "bigint",
    "true",
    "false",
    "null",
    "get",
    "set",
    "configurable",
    "enumerable",
    "writable",
    "size",
    "byteLength",
    "byteOffset",
    "buffer",
];

/// Seeds every [`TABLE`] entry into `heap`'s string arena and returns the
/// resulting handles, indexed the same as `TABLE`. Called once from
/// `Heap::new`.
pub(crate) fn seed(heap: &mut Heap) -> Vec<HeapString> {
    TABLE
        .iter()
        .enumerate()
        .map(|(index, _)| HeapString::new(heap.alloc_string_slot(StringHeapData::Magic(index as u16))))
        .collect()
}

/// Looks up `name` in [`TABLE`], returning the pre-seeded `JsString` if
/// present. `Heap::find_or_create_string` calls this before falling back to
/// content-based interning, so every call site that builds a property key
/// for a table entry (`PropertyKey::from_str(agent, "length")`, ...)
/// transparently gets the zero-allocation magic string instead.
pub(crate) fn lookup(heap: &Heap, name: &str) -> Option<JsString> {
    TABLE.iter().position(|s| *s == name).map(|index| JsString::String(heap.magic[index]))
}

/// Registers an embedder-owned buffer as an external magic string
/// (`spec.md` §3.3): unlike [`crate::types::language::string::StringHeapData::External`],
/// which goes through ordinary content-based interning, this is meant to be
/// called once per distinct embedder string and the returned handle reused,
/// not re-derived from the bytes on every use.
pub fn register_external(heap: &mut Heap, bytes: Box<[u8]>, release: Option<crate::types::language::string::ExternalStringFinalizer>) -> JsString {
    let index = heap.alloc_string_slot(StringHeapData::ExternalMagic { bytes, release });
    JsString::String(HeapString::new(index))
}
