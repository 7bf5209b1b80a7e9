// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1 ECMAScript Language Types](https://tc39.es/ecma262/#sec-ecmascript-language-types)
//!
//! `spec.md` §3.1: a tagged value. This is modeled as a Rust `enum` with an
//! explicit `#[repr(u8)]` discriminant, following the teacher's own
//! approach (`ecmascript/types/language/value.rs`) and the re-architecture
//! guidance in `spec.md` §9 ("either a tagged-union `enum` with explicit
//! numeric discriminant ... or a `struct` wrapping a `u32`"). The
//! discriminant *is* the tag; there is no separate bit-packing layer.

use super::bigint::HeapBigInt;
use super::function::Function;
use super::number::{HeapNumber, JsNumber, SmallInteger};
use super::object::Object;
use super::string::{HeapString, JsString};
use super::symbol::Symbol;
use crate::heap::gc::{HeapMarkAndSweep, WorkQueues};
use small_string::SmallString;

/// A 6.1-conformant ECMAScript language value, plus the two internal
/// markers `spec.md` §3.1 requires: `Empty` (a hole, distinct from
/// `undefined`) and `Exception` (the transient "an exception is pending"
/// return-channel marker, which must never be stored anywhere durable).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(u8)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    SmallString(SmallString),
    String(HeapString),
    SmallInteger(SmallInteger),
    Number(HeapNumber),
    SmallBigInt(i32),
    BigInt(HeapBigInt),
    Symbol(Symbol),
    Object(Object),
    /// A hole: an uninitialized array element or an uninitialized lexical
    /// binding. Never observable as a JS value; every read site that can
    /// see one must substitute `undefined` or throw a `ReferenceError`.
    Empty,
    /// "An exception is in context" (`spec.md` §3.1, §7). Only ever the
    /// transient result of an interpreter operation; must not appear inside
    /// arrays, properties, or a suspended frame's value stack (`spec.md`
    /// §8 "Exception channel").
    Exception,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    String,
    Number,
    BigInt,
    Symbol,
    Object,
}

impl Value {
    pub fn from_str(agent: &mut crate::context::Context, s: &str) -> Self {
        agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(s)).into()
    }

    pub fn from_f64(agent: &mut crate::context::Context, n: f64) -> Self {
        JsNumber::from_f64(agent, n).into()
    }

    pub fn value_type(self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::SmallString(_) | Value::String(_) => Kind::String,
            Value::SmallInteger(_) | Value::Number(_) => Kind::Number,
            Value::SmallBigInt(_) | Value::BigInt(_) => Kind::BigInt,
            Value::Symbol(_) => Kind::Symbol,
            Value::Object(_) => Kind::Object,
            Value::Empty => unreachable!("Value::Empty leaked to value_type"),
            Value::Exception => unreachable!("Value::Exception leaked to value_type"),
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_nullish(self) -> bool {
        self.is_undefined() || self.is_null()
    }

    pub fn is_object(self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_string(self) -> bool {
        matches!(self, Value::SmallString(_) | Value::String(_))
    }

    pub fn is_number(self) -> bool {
        matches!(self, Value::SmallInteger(_) | Value::Number(_))
    }

    pub fn as_js_string(self) -> Option<JsString> {
        match self {
            Value::SmallString(s) => Some(JsString::SmallString(s)),
            Value::String(s) => Some(JsString::String(s)),
            _ => None,
        }
    }

    pub fn as_number(self) -> Option<JsNumber> {
        match self {
            Value::SmallInteger(i) => Some(JsNumber::Integer(i)),
            Value::Number(n) => Some(JsNumber::Float(n)),
            _ => None,
        }
    }

    pub fn as_object(self) -> Option<Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(self) -> Option<Function> {
        self.as_object().and_then(|o| {
            // Threaded through `Agent`-free here on purpose: callers that
            // need the strict object-kind check go through
            // `Function::try_from_object`, which needs `&Context`. This
            // helper only covers the representational fact that a
            // `Function` is a `Value::Object`.
            Some(Function::from_object_unchecked(o))
        })
    }
}

impl Function {
    /// Wraps an [`Object`] as a [`Function`] without checking its kind.
    /// Only used where the caller already knows (e.g. it just created the
    /// object as a function) — see `Function::try_from_object` for the
    /// checked version used at trust boundaries.
    pub(crate) fn from_object_unchecked(object: Object) -> Self {
        // SAFETY/INVARIANT: relies on `Function`'s layout being a
        // newtype around `Object`; enforced by `Function(pub(crate) Object)`
        // staying private outside this crate.
        unsafe { std::mem::transmute::<Object, Function>(object) }
    }
}

impl From<JsString> for Value {
    fn from(value: JsString) -> Self {
        match value {
            JsString::SmallString(s) => Value::SmallString(s),
            JsString::String(s) => Value::String(s),
        }
    }
}

impl From<JsNumber> for Value {
    fn from(value: JsNumber) -> Self {
        match value {
            JsNumber::Integer(i) => Value::SmallInteger(i),
            JsNumber::Float(f) => Value::Number(f),
        }
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl HeapMarkAndSweep for Value {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            Value::String(s) => queues.push_string(s.index()),
            Value::Number(n) => queues.push_number(n.0),
            Value::BigInt(b) => queues.push_bigint(b.0),
            Value::Symbol(s) => queues.push_symbol(s.0),
            Value::Object(o) => queues.push_object(o.0),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn small_integers_round_trip_through_f64() {
        let mut agent = Context::new_for_test();
        let v = Value::from_f64(&mut agent, 42.0);
        assert!(matches!(v, Value::SmallInteger(_)));
        assert_eq!(v.as_number().unwrap().value(&agent), 42.0);
    }

    #[test]
    fn fractional_numbers_are_heap_allocated() {
        let mut agent = Context::new_for_test();
        let v = Value::from_f64(&mut agent, 1.5);
        assert!(matches!(v, Value::Number(_)));
    }

    #[test]
    fn value_type_distinguishes_every_kind() {
        assert_eq!(Value::Undefined.value_type(), Kind::Undefined);
        assert_eq!(Value::Null.value_type(), Kind::Null);
        assert_eq!(Value::Boolean(true).value_type(), Kind::Boolean);
    }
}
