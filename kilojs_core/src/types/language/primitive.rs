// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A [`Value`] known not to be an object: the union `spec.md` §3.1 implies
//! by "every non-object tag". Used at the boundary of `to_primitive` and by
//! operations (`typeof`, strict equality) that are only ever defined over
//! primitives.

use super::bigint::HeapBigInt;
use super::number::JsNumber;
use super::string::JsString;
use super::symbol::Symbol;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Undefined,
    Null,
    Boolean(bool),
    String(JsString),
    Number(JsNumber),
    BigInt(HeapBigInt),
    Symbol(Symbol),
}

impl TryFrom<Value> for Primitive {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        Ok(match value {
            Value::Undefined => Self::Undefined,
            Value::Null => Self::Null,
            Value::Boolean(b) => Self::Boolean(b),
            Value::SmallString(_) | Value::String(_) => {
                Self::String(value.as_js_string().unwrap())
            }
            Value::SmallInteger(_) | Value::Number(_) => Self::Number(value.as_number().unwrap()),
            Value::SmallBigInt(_) | Value::BigInt(_) => return Err(()), // handled by caller: small bigints need agent access
            Value::Symbol(s) => Self::Symbol(s),
            Value::Object(_) | Value::Empty | Value::Exception => return Err(()),
        })
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Boolean(b) => Value::Boolean(b),
            Primitive::String(s) => s.into(),
            Primitive::Number(n) => n.into(),
            Primitive::BigInt(b) => Value::BigInt(b),
            Primitive::Symbol(s) => Value::Symbol(s),
        }
    }
}
