// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
//!
//! `spec.md` §3.4: "An object is a header plus a zero-length linked list of
//! property descriptors." The linked list is realized here as an
//! insertion-ordered `Vec<(PropertyKey, PropertyDescriptor)>` (which already
//! gives the enumeration-order guarantee a linked list would) plus a derived
//! `AHashMap<PropertyKey, u32>` offset cache for O(1) lookup — the same
//! "dense slots + side lookup table" shape as the teacher's
//! `ElementStorageRef`/`PropertyStorageRef` split in `ordinary.rs`, without
//! that file's shape/offset machinery.

use super::function::Function;
use super::string::JsString;
use super::symbol::Symbol;
use super::value::Value;
use crate::heap::gc::{HeapMarkAndSweep, WorkQueues};
use crate::heap::indexes::Index;
use ahash::AHashMap;

/// A canonicalized property key: either an interned string, a symbol, or an
/// array-index integer. `spec.md` §4.2: "Array-index strings ... are
/// canonicalized and ... stored as integer-indexed property entries instead
/// of string properties."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Symbol(Symbol),
    Index(u32),
}

impl PropertyKey {
    /// Canonicalizes a property-key string: if it is the decimal
    /// representation of an integer in `[0, 2^32 - 2]` with no leading zero
    /// (other than the literal `"0"`), returns the `Index` form instead.
    pub fn from_str(agent: &mut crate::context::Context, s: &str) -> Self {
        if let Some(index) = canonical_array_index(s) {
            return Self::Index(index);
        }
        Self::String(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(s)))
    }
}

fn canonical_array_index(s: &str) -> Option<u32> {
    if s == "0" {
        return Some(0);
    }
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = s.parse().ok()?;
    if value < (u32::MAX as u64) {
        Some(value as u32)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyAttributes {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyAttributes {
    pub const DEFAULT_DATA: Self = Self {
        writable: true,
        enumerable: true,
        configurable: true,
    };
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyDescriptor {
    Data {
        value: Value,
        attributes: PropertyAttributes,
    },
    Accessor {
        get: Option<Function>,
        set: Option<Function>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.enumerable,
            Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.configurable,
            Self::Accessor { configurable, .. } => *configurable,
        }
    }
}

/// What kind of exotic object this is, per `spec.md` §3.4's header "object
/// kind" field. Internal-method dispatch (`ordinary_*` vs. a kind's own
/// trap) switches on this; see `abstract_operations::operations_on_objects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Ordinary,
    Array,
    Error,
    Arguments,
    BooleanObject,
    NumberObject,
    StringObject,
    Function,
    BoundFunction,
    Date,
    RegExp,
    Promise,
    Map,
    Set,
    Proxy,
    ArrayBuffer,
    TypedArray,
    DataView,
    Generator,
    AsyncGenerator,
    WeakMap,
    WeakSet,
    WeakRef,
    FinalizationRegistry,
    Module,
    Global,
}

/// Dense packed-vector storage for an array whose keys form a dense integer
/// prefix with every attribute at its default (`spec.md` §3.4 "fast
/// arrays"). `None` entries are holes.
#[derive(Debug, Clone, Default)]
pub struct FastArrayData {
    pub elements: Vec<Option<Value>>,
}

#[derive(Debug)]
pub struct ObjectHeapData {
    pub prototype: Option<Value>,
    pub extensible: bool,
    pub kind: ObjectKind,
    keys: Vec<PropertyKey>,
    descriptors: Vec<PropertyDescriptor>,
    key_index: AHashMap<PropertyKey, u32>,
    /// `Some` only while `kind == ObjectKind::Array` and the fast-array
    /// optimization hasn't been given up on yet. Transitioning to `None` is
    /// irreversible for the object's lifetime (`spec.md` §3.4).
    pub fast_array: Option<FastArrayData>,
    /// Per-kind auxiliary payload (spec.md §3.4's "per-kind auxiliary
    /// word"), e.g. a `HeapString` for `StringObject`, an `ErrorKind` for
    /// `Error`. Boxed so `ObjectHeapData` itself stays a fixed size; the
    /// concrete type lives in the relevant `builtins` submodule.
    pub auxiliary: Option<Box<dyn std::any::Any>>,
}

impl ObjectHeapData {
    pub fn new(prototype: Option<Value>, kind: ObjectKind) -> Self {
        Self {
            prototype,
            extensible: true,
            kind,
            keys: Vec::new(),
            descriptors: Vec::new(),
            key_index: AHashMap::new(),
            fast_array: if kind == ObjectKind::Array {
                Some(FastArrayData::default())
            } else {
                None
            },
            auxiliary: None,
        }
    }

    pub fn get_own_property(&self, key: PropertyKey) -> Option<PropertyDescriptor> {
        if let (Some(fast), PropertyKey::Index(i)) = (&self.fast_array, key) {
            return fast.elements.get(i as usize).and_then(|v| *v).map(|value| {
                PropertyDescriptor::Data {
                    value,
                    attributes: PropertyAttributes::DEFAULT_DATA,
                }
            });
        }
        let offset = *self.key_index.get(&key)?;
        Some(self.descriptors[offset as usize])
    }

    pub fn has_own_property(&self, key: PropertyKey) -> bool {
        if let (Some(fast), PropertyKey::Index(i)) = (&self.fast_array, key) {
            return fast.elements.get(i as usize).is_some_and(|v| v.is_some());
        }
        self.key_index.contains_key(&key)
    }

    /// Inserts or overwrites a property descriptor, preserving insertion
    /// order for newly added keys (enumeration order, `spec.md` §8
    /// "Fast-array consistency").
    pub fn define_property(&mut self, key: PropertyKey, descriptor: PropertyDescriptor) {
        if let (Some(fast), PropertyKey::Index(i)) = (&mut self.fast_array, key) {
            if let PropertyDescriptor::Data {
                value,
                attributes: PropertyAttributes::DEFAULT_DATA,
            } = descriptor
            {
                let i = i as usize;
                if i >= fast.elements.len() {
                    fast.elements.resize(i + 1, None);
                }
                fast.elements[i] = Some(value);
                return;
            }
            // Non-default attribute or accessor on an array index: give up
            // the fast-array optimization for good, preserving current
            // values and order.
            self.demote_fast_array();
        }
        match self.key_index.get(&key) {
            Some(&offset) => self.descriptors[offset as usize] = descriptor,
            None => {
                let offset = self.descriptors.len() as u32;
                self.keys.push(key);
                self.descriptors.push(descriptor);
                self.key_index.insert(key, offset);
            }
        }
    }

    pub fn delete_property(&mut self, key: PropertyKey) {
        if let (Some(fast), PropertyKey::Index(i)) = (&mut self.fast_array, key) {
            if let Some(slot) = fast.elements.get_mut(i as usize) {
                *slot = None;
            }
            return;
        }
        if let Some(offset) = self.key_index.remove(&key) {
            self.keys.remove(offset as usize);
            self.descriptors.remove(offset as usize);
            // Re-index everything after the removed slot.
            for (k, idx) in self.key_index.iter_mut() {
                if *idx > offset {
                    *idx -= 1;
                }
                let _ = k;
            }
        }
    }

    /// Gives up the fast-array optimization, materializing every dense
    /// element as an ordinary indexed data property. Preserves both value
    /// sequence and attributes (`spec.md` §8 "Fast-array consistency").
    pub fn demote_fast_array(&mut self) {
        let Some(fast) = self.fast_array.take() else {
            return;
        };
        for (i, value) in fast.elements.into_iter().enumerate() {
            if let Some(value) = value {
                self.define_property(
                    PropertyKey::Index(i as u32),
                    PropertyDescriptor::Data {
                        value,
                        attributes: PropertyAttributes::DEFAULT_DATA,
                    },
                );
            }
        }
    }

    /// Enumerable own keys in specification order: integer indices
    /// ascending, then string keys in insertion order, then symbols (symbols
    /// are never enumerable via `for-in`/`Object.keys`, but are returned by
    /// `Reflect.ownKeys`).
    pub fn own_property_keys_in_order(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = Vec::new();
        if let Some(fast) = &self.fast_array {
            indices.extend(
                fast.elements
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|_| i as u32)),
            );
        }
        for key in &self.keys {
            if let PropertyKey::Index(i) = key {
                indices.push(*i);
            }
        }
        indices.sort_unstable();

        let mut out: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        out.extend(
            self.keys
                .iter()
                .filter(|k| matches!(k, PropertyKey::String(_)))
                .copied(),
        );
        out.extend(
            self.keys
                .iter()
                .filter(|k| matches!(k, PropertyKey::Symbol(_)))
                .copied(),
        );
        out
    }
}

impl HeapMarkAndSweep for ObjectHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        if let Some(Value::Object(o)) = self.prototype {
            queues.push_object(o.0);
        }
        if let Some(fast) = &self.fast_array {
            for value in fast.elements.iter().flatten() {
                value.mark_values(queues);
            }
        }
        for descriptor in &self.descriptors {
            match descriptor {
                PropertyDescriptor::Data { value, .. } => value.mark_values(queues),
                PropertyDescriptor::Accessor { get, set, .. } => {
                    if let Some(get) = get {
                        get.mark_values(queues);
                    }
                    if let Some(set) = set {
                        set.mark_values(queues);
                    }
                }
            }
        }
        for key in &self.keys {
            if let PropertyKey::Symbol(s) = key {
                queues.push_symbol(s.0);
            }
        }
    }
}

/// An object reference: a compressed pointer (`Index<ObjectHeapData>`) into
/// the object arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Object(pub(crate) Index<ObjectHeapData>);

impl Object {
    pub(crate) fn new(index: Index<ObjectHeapData>) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index<ObjectHeapData> {
        self.0
    }

    pub fn data<'a>(self, agent: &'a crate::context::Context) -> &'a ObjectHeapData {
        agent.heap.objects[self.0.into_usize_index()]
            .as_ref()
            .expect("dangling Object index")
    }

    pub fn data_mut<'a>(self, agent: &'a mut crate::context::Context) -> &'a mut ObjectHeapData {
        agent.heap.objects[self.0.into_usize_index()]
            .as_mut()
            .expect("dangling Object index")
    }
}
