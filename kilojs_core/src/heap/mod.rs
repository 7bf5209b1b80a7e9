// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### The KiloJS heap (`spec.md` §3, §4.7)
//!
//! One typed arena (`Vec<Option<T>>` plus a parallel mark bitset and a free
//! list) per heap-resident kind, each addressed through an
//! [`indexes::Index<T>`] compressed pointer. A free list recycles slots
//! vacated by sweep, so `alloc` is amortized O(1) and arena growth is
//! monotonic only under sustained net allocation.

pub mod builtin_strings;
pub mod gc;
pub mod indexes;

use ahash::AHashMap;
use indexes::Index;
use wtf8::{Wtf8, Wtf8Buf};

use crate::bytecode::{CompiledCodeData, CompiledCodeId};
use crate::execution::environments::{EnvironmentHeapData, EnvironmentIndex};
use crate::types::language::bigint::{BigIntHeapData, HeapBigInt};
use crate::types::language::number::{HeapNumber, NumberHeapData};
use crate::types::language::object::{Object, ObjectHeapData, ObjectKind};
use crate::types::language::string::{HeapString, JsString, StringHeapData};
use crate::types::language::symbol::{Symbol, SymbolHeapData};
use crate::types::language::Value;

/// Per-arena bookkeeping shared by every kind: which slots are marked this
/// GC cycle, and which slots are free for reuse.
#[derive(Default)]
struct ArenaMeta {
    marks: Vec<bool>,
    free: Vec<u32>,
}

impl ArenaMeta {
    fn alloc_slot(&mut self, len: usize) -> u32 {
        if let Some(slot) = self.free.pop() {
            self.marks[slot as usize] = false;
            slot
        } else {
            self.marks.push(false);
            len as u32
        }
    }

    fn mark(&mut self, slot: usize) -> bool {
        let already = std::mem::replace(&mut self.marks[slot], true);
        !already
    }

    fn clear_marks(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = false);
    }
}

macro_rules! arena_kind {
    ($field:ident, $meta:ident, $data:ty, $alloc_fn:ident, $mark_fn:ident, $sweep_fn:ident) => {
        pub(crate) fn $alloc_fn(&mut self, value: $data) -> Index<$data> {
            let slot = self.$meta.alloc_slot(self.$field.len());
            let slot_usize = slot as usize;
            if slot_usize >= self.$field.len() {
                self.$field.push(Some(value));
            } else {
                self.$field[slot_usize] = Some(value);
            }
            Index::from_u32_index(slot)
        }

        pub(crate) fn $mark_fn(&mut self, index: Index<$data>) -> bool {
            self.$meta.mark(index.into_usize_index())
        }

        pub(crate) fn $sweep_fn(&mut self) {
            for (slot, marked) in self.$meta.marks.iter().enumerate() {
                if !*marked && self.$field[slot].is_some() {
                    self.$field[slot] = None;
                    self.$meta.free.push(slot as u32);
                }
            }
        }
    };
}

/// The object heap. Every arena is owned here; every cross-kind reference
/// ([`Object`], [`HeapString`], ...) is a compressed pointer into one of
/// these arenas, never a native Rust reference.
pub struct Heap {
    pub(crate) objects: Vec<Option<ObjectHeapData>>,
    objects_meta: ArenaMeta,
    pub(crate) strings: Vec<Option<StringHeapData>>,
    strings_meta: ArenaMeta,
    pub(crate) numbers: Vec<Option<NumberHeapData>>,
    numbers_meta: ArenaMeta,
    pub(crate) bigints: Vec<Option<BigIntHeapData>>,
    bigints_meta: ArenaMeta,
    pub(crate) symbols: Vec<Option<SymbolHeapData>>,
    symbols_meta: ArenaMeta,
    pub(crate) environments: Vec<Option<EnvironmentHeapData>>,
    environments_meta: ArenaMeta,
    pub(crate) compiled_codes: Vec<Option<CompiledCodeData>>,
    compiled_codes_meta: ArenaMeta,

    /// Interning table for heap strings, keyed by content, so that
    /// `spec.md` §3.3/§8 "String identity" holds: equal content always maps
    /// to the same arena slot. `SmallString`s never enter this table.
    string_intern: AHashMap<Wtf8Buf, HeapString>,

    /// One pre-seeded [`HeapString`] per `builtin_strings::TABLE` entry,
    /// indexed the same way (`spec.md` §3.3 "magic string").
    pub(crate) magic: Vec<HeapString>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Self {
            objects: Vec::new(),
            objects_meta: ArenaMeta::default(),
            strings: Vec::new(),
            strings_meta: ArenaMeta::default(),
            numbers: Vec::new(),
            numbers_meta: ArenaMeta::default(),
            bigints: Vec::new(),
            bigints_meta: ArenaMeta::default(),
            symbols: Vec::new(),
            symbols_meta: ArenaMeta::default(),
            environments: Vec::new(),
            environments_meta: ArenaMeta::default(),
            compiled_codes: Vec::new(),
            compiled_codes_meta: ArenaMeta::default(),
            string_intern: AHashMap::new(),
            magic: Vec::new(),
        };
        heap.magic = builtin_strings::seed(&mut heap);
        heap
    }

    pub fn create_object(&mut self, prototype: Option<Value>, kind: ObjectKind) -> Object {
        Object::new(self.alloc_object_slot(ObjectHeapData::new(prototype, kind)))
    }

    pub fn create_number(&mut self, value: f64) -> HeapNumber {
        HeapNumber(self.alloc_number_slot(NumberHeapData(value)))
    }

    pub fn create_bigint(&mut self, value: num_bigint::BigInt) -> HeapBigInt {
        HeapBigInt(self.alloc_bigint_slot(BigIntHeapData(value)))
    }

    pub fn create_symbol(&mut self, descriptor: Option<JsString>) -> Symbol {
        Symbol(self.alloc_symbol_slot(SymbolHeapData { descriptor }))
    }

    pub fn create_compiled_code(&mut self, code: CompiledCodeData) -> CompiledCodeId {
        CompiledCodeId(self.alloc_compiled_code_slot(code))
    }

    pub fn create_environment(&mut self, data: EnvironmentHeapData) -> EnvironmentIndex {
        EnvironmentIndex::new(self.alloc_environment_slot(data))
    }

    /// Interns `buf`, returning the `JsString` representing it: inline if
    /// it fits in a [`small_string::SmallString`], otherwise a deduplicated
    /// heap slot (`spec.md` §3.3, §8 "String identity").
    pub fn find_or_create_string(&mut self, buf: Wtf8Buf) -> JsString {
        if let Some(s) = buf.as_str() {
            if let Ok(small) = small_string::SmallString::try_from(s) {
                return JsString::SmallString(small);
            }
            if let Some(magic) = builtin_strings::lookup(self, s) {
                return magic;
            }
        }
        if let Some(existing) = self.string_intern.get(&buf) {
            return JsString::String(*existing);
        }
        let index = self.alloc_string_slot(StringHeapData::Owned(buf.clone()));
        let heap_string = HeapString::new(index);
        self.string_intern.insert(buf, heap_string);
        JsString::String(heap_string)
    }

    pub fn flattened_string_bytes(&self, s: HeapString) -> &str {
        self.strings[s.index().into_usize_index()]
            .as_ref()
            .expect("dangling HeapString index")
            .as_flattened_str()
            .expect("rope not flattened before read; call flatten_rope first")
    }

    pub fn flattened_string_wtf8(&self, s: HeapString) -> &Wtf8 {
        Wtf8::from_str(self.flattened_string_bytes(s))
    }

    arena_kind!(objects, objects_meta, ObjectHeapData, alloc_object_slot, mark_object, sweep_objects);
    arena_kind!(strings, strings_meta, StringHeapData, alloc_string_slot, mark_string, sweep_strings);
    arena_kind!(numbers, numbers_meta, NumberHeapData, alloc_number_slot, mark_number, sweep_numbers);
    arena_kind!(bigints, bigints_meta, BigIntHeapData, alloc_bigint_slot, mark_bigint, sweep_bigints);
    arena_kind!(symbols, symbols_meta, SymbolHeapData, alloc_symbol_slot, mark_symbol, sweep_symbols);
    arena_kind!(environments, environments_meta, EnvironmentHeapData, alloc_environment_slot, mark_environment, sweep_environments);
    arena_kind!(compiled_codes, compiled_codes_meta, CompiledCodeData, alloc_compiled_code_slot, mark_compiled_code, sweep_compiled_codes);

    pub(crate) fn clear_marks(&mut self) {
        self.objects_meta.clear_marks();
        self.strings_meta.clear_marks();
        self.numbers_meta.clear_marks();
        self.bigints_meta.clear_marks();
        self.symbols_meta.clear_marks();
        self.environments_meta.clear_marks();
        self.compiled_codes_meta.clear_marks();
        // Magic strings are permanent roots (`builtin_strings::TABLE`
        // outlives every realm), so pin them here rather than relying on
        // some live value happening to reference one this cycle.
        for magic in &self.magic {
            self.strings_meta.mark(magic.index().into_usize_index());
        }
        // A dropped interned string leaves a dangling intern-table entry;
        // rather than track reverse pointers, just drop entries whose slot
        // didn't survive the sweep that just ran.
        let strings = &self.strings;
        self.string_intern
            .retain(|_, v| strings[v.index().into_usize_index()].is_some());
    }
}

/// Shared "push data, get back a typed handle" constructor entry point
/// (mirrors the teacher's `heap::CreateHeapData` trait) used by abstract
/// operations that don't want to know which arena they're targeting.
pub trait CreateHeapData<T, H> {
    fn create(&mut self, data: T) -> H;
}

impl CreateHeapData<f64, HeapNumber> for Heap {
    fn create(&mut self, data: f64) -> HeapNumber {
        self.create_number(data)
    }
}

impl CreateHeapData<num_bigint::BigInt, HeapBigInt> for Heap {
    fn create(&mut self, data: num_bigint::BigInt) -> HeapBigInt {
        self.create_bigint(data)
    }
}
