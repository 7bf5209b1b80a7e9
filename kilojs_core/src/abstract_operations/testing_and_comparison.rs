// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use crate::context::Context;
use crate::execution::agent::JsResult;
use crate::types::language::Value;

/// `SameValue` (`===` for NaN/-0 purposes; used by `Object.is`).
pub fn same_value(agent: &Context, a: Value, b: Value) -> bool {
    if a.value_type() != b.value_type() {
        return false;
    }
    match (a, b) {
        (Value::SmallInteger(_) | Value::Number(_), Value::SmallInteger(_) | Value::Number(_)) => {
            let (x, y) = (a.as_number().unwrap().value(agent), b.as_number().unwrap().value(agent));
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y && x.is_sign_negative() == y.is_sign_negative()
            }
        }
        _ => strict_equals(agent, a, b),
    }
}

pub fn same_value_zero(agent: &Context, a: Value, b: Value) -> bool {
    if a.value_type() != b.value_type() {
        return false;
    }
    if let (Value::SmallInteger(_) | Value::Number(_), Value::SmallInteger(_) | Value::Number(_)) = (a, b) {
        let (x, y) = (a.as_number().unwrap().value(agent), b.as_number().unwrap().value(agent));
        return (x.is_nan() && y.is_nan()) || x == y;
    }
    strict_equals(agent, a, b)
}

/// `===`.
pub fn strict_equals(agent: &Context, a: Value, b: Value) -> bool {
    if a.value_type() != b.value_type() {
        return false;
    }
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::SmallInteger(_) | Value::Number(_), Value::SmallInteger(_) | Value::Number(_)) => {
            a.as_number().unwrap().value(agent) == b.as_number().unwrap().value(agent)
        }
        (Value::SmallString(_) | Value::String(_), Value::SmallString(_) | Value::String(_)) => {
            a.as_js_string().unwrap().eq(agent, b.as_js_string().unwrap())
        }
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x == y,
        (Value::SmallBigInt(x), Value::SmallBigInt(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x.value(agent) == y.value(agent),
        _ => false,
    }
}

/// `==`, with the full coercion ladder (`spec.md` §4.8).
pub fn loose_equals(agent: &mut Context, a: Value, b: Value) -> JsResult<bool> {
    if a.value_type() == b.value_type() {
        return Ok(strict_equals(agent, a, b));
    }
    match (a, b) {
        (Value::Null, Value::Undefined) | (Value::Undefined, Value::Null) => Ok(true),
        (Value::SmallInteger(_) | Value::Number(_), Value::SmallString(_) | Value::String(_)) => {
            let rhs = crate::abstract_operations::type_conversion::to_number(agent, b)?;
            Ok(a.as_number().unwrap().value(agent) == rhs.value(agent))
        }
        (Value::SmallString(_) | Value::String(_), Value::SmallInteger(_) | Value::Number(_)) => {
            loose_equals(agent, b, a)
        }
        (Value::Boolean(_), _) => {
            let lhs = crate::abstract_operations::type_conversion::to_number(agent, a)?;
            loose_equals(agent, lhs.into(), b)
        }
        (_, Value::Boolean(_)) => loose_equals(agent, b, a),
        (Value::SmallInteger(_) | Value::Number(_) | Value::SmallString(_) | Value::String(_) | Value::SmallBigInt(_) | Value::BigInt(_), Value::Object(_)) => {
            let primitive = crate::abstract_operations::type_conversion::to_primitive(agent, b, None)?;
            loose_equals(agent, a, primitive)
        }
        (Value::Object(_), Value::SmallInteger(_) | Value::Number(_) | Value::SmallString(_) | Value::String(_) | Value::SmallBigInt(_) | Value::BigInt(_)) => {
            loose_equals(agent, b, a)
        }
        _ => Ok(false),
    }
}

pub fn is_callable(agent: &Context, value: Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| crate::types::language::Function::try_from_object(o, agent).is_some())
}

pub fn is_constructor(agent: &Context, value: Value) -> bool {
    use crate::types::language::object::ObjectKind;
    value
        .as_object()
        .is_some_and(|o| matches!(o.data(agent).kind, ObjectKind::Function | ObjectKind::BoundFunction))
}
