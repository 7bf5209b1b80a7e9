// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.6.1 The Number Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-number-type)
//!
//! `spec.md` §3.1 calls out "immediate integer (a specified range around
//! zero)" as one of `Value`'s tag discriminants; everything outside that
//! range, and every non-integral `f64`, lives on the heap as a
//! [`NumberHeapData`].

use crate::heap::indexes::Index;

/// The inclusive range of integers representable without heap allocation.
/// Chosen to be `i32`'s range minus one bit, leaving the top bit free so a
/// `SmallInteger` can be stored alongside the `Value` discriminant without
/// any value in range losing precision when round-tripped through `f64`
/// (every `i32` already round-trips through `f64` exactly).
pub const SMALL_INTEGER_MIN: i64 = -(2i64.pow(31));
pub const SMALL_INTEGER_MAX: i64 = 2i64.pow(31) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SmallInteger(i32);

impl SmallInteger {
    pub fn into_i64(self) -> i64 {
        self.0 as i64
    }

    pub fn into_f64(self) -> f64 {
        self.0 as f64
    }
}

impl TryFrom<i64> for SmallInteger {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, ()> {
        if (SMALL_INTEGER_MIN..=SMALL_INTEGER_MAX).contains(&value) {
            Ok(Self(value as i32))
        } else {
            Err(())
        }
    }
}

impl From<i32> for SmallInteger {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// A heap-allocated `f64` outside `SmallInteger`'s range, or with a
/// fractional part, or `NaN`/`-0.0`/an infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberHeapData(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapNumber(pub(crate) Index<NumberHeapData>);

/// The [`Number`][crate::types::language::value::Value::Number] payload:
/// either an immediate [`SmallInteger`] or a heap [`HeapNumber`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsNumber {
    Integer(SmallInteger),
    Float(HeapNumber),
}

impl JsNumber {
    pub fn value(self, agent: &crate::context::Context) -> f64 {
        match self {
            Self::Integer(i) => i.into_f64(),
            Self::Float(h) => agent.heap.numbers[h.0.into_usize_index()]
                .as_ref()
                .expect("dangling HeapNumber index")
                .0,
        }
    }

    pub fn from_f64(agent: &mut crate::context::Context, value: f64) -> Self {
        if value.fract() == 0.0
            && value.is_finite()
            && !(value == 0.0 && value.is_sign_negative())
            && let Ok(small) = SmallInteger::try_from(value as i64)
            && small.into_f64() == value
        {
            return Self::Integer(small);
        }
        Self::Float(agent.heap.create_number(value))
    }

    pub fn is_nan(self, agent: &crate::context::Context) -> bool {
        self.value(agent).is_nan()
    }
}
