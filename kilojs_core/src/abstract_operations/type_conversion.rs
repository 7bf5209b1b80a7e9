// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)

use crate::context::Context;
use crate::execution::agent::JsResult;
use crate::types::language::number::JsNumber;
use crate::types::language::object::PropertyKey;
use crate::types::language::{JsString, Value};

pub fn to_boolean(agent: &Context, value: Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => b,
        Value::SmallString(s) => !s.is_empty(),
        Value::String(s) => !crate::types::language::JsString::String(s).is_empty_str(agent),
        Value::SmallInteger(_) | Value::Number(_) => {
            let n = value.as_number().unwrap();
            !n.is_nan(agent) && n.value(agent) != 0.0
        }
        Value::SmallBigInt(i) => i != 0,
        Value::BigInt(b) => !b.value(agent).eq(&num_bigint::BigInt::from(0)),
        Value::Symbol(_) | Value::Object(_) => true,
        Value::Empty | Value::Exception => unreachable!("internal marker reached to_boolean"),
    }
}

pub fn to_numeric(agent: &mut Context, value: Value) -> JsResult<Value> {
    let primitive = to_primitive(agent, value, Some(PreferredType::Number))?;
    if let Value::SmallBigInt(_) | Value::BigInt(_) = primitive {
        return Ok(primitive);
    }
    Ok(to_number(agent, primitive)?.into())
}

pub fn to_number(agent: &mut Context, value: Value) -> JsResult<JsNumber> {
    match value {
        Value::SmallInteger(_) | Value::Number(_) => Ok(value.as_number().unwrap()),
        Value::Undefined => Ok(JsNumber::from_f64(agent, f64::NAN)),
        Value::Null => Ok(JsNumber::from_f64(agent, 0.0)),
        Value::Boolean(b) => Ok(JsNumber::from_f64(agent, if b { 1.0 } else { 0.0 })),
        Value::SmallString(_) | Value::String(_) => {
            let s = value.as_js_string().unwrap();
            let mut scratch = std::string::String::new();
            let text = s.as_str_buffered(agent, &mut scratch).trim();
            let parsed = if text.is_empty() {
                0.0
            } else {
                fast_float::parse::<f64, _>(text).unwrap_or(f64::NAN)
            };
            Ok(JsNumber::from_f64(agent, parsed))
        }
        Value::SmallBigInt(_) | Value::BigInt(_) => {
            Err(crate::execution::agent::JsError::type_error(agent, "Cannot convert a BigInt value to a number"))
        }
        Value::Symbol(_) => Err(crate::execution::agent::JsError::type_error(agent, "Cannot convert a Symbol value to a number")),
        Value::Object(_) => {
            let primitive = to_primitive(agent, value, Some(PreferredType::Number))?;
            to_number(agent, primitive)
        }
        Value::Empty | Value::Exception => unreachable!("internal marker reached to_number"),
    }
}

pub fn to_string(agent: &mut Context, value: Value) -> JsResult<JsString> {
    match value {
        Value::SmallString(_) | Value::String(_) => Ok(value.as_js_string().unwrap()),
        Value::Undefined => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str("undefined"))),
        Value::Null => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str("null"))),
        Value::Boolean(true) => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str("true"))),
        Value::Boolean(false) => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str("false"))),
        Value::SmallInteger(_) | Value::Number(_) => {
            let n = value.as_number().unwrap().value(agent);
            let mut buf = ryu_js::Buffer::new();
            Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(buf.format(n))))
        }
        Value::SmallBigInt(i) => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(&i.to_string()))),
        Value::BigInt(b) => Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(&b.value(agent).to_string()))),
        Value::Symbol(_) => Err(crate::execution::agent::JsError::type_error(agent, "Cannot convert a Symbol value to a string")),
        Value::Object(_) => {
            let primitive = to_primitive(agent, value, Some(PreferredType::String))?;
            to_string(agent, primitive)
        }
        Value::Empty | Value::Exception => unreachable!("internal marker reached to_string"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

/// `spec.md` §4.8 dispatches `Symbol.toPrimitive` first, then falls back to
/// `valueOf`/`toString` (or the reverse) depending on `hint`, per
/// ECMA-262's `OrdinaryToPrimitive`.
pub fn to_primitive(agent: &mut Context, value: Value, hint: Option<PreferredType>) -> JsResult<Value> {
    let Value::Object(object) = value else {
        return Ok(value);
    };
    let hint = hint.unwrap_or(PreferredType::Default);
    let method_names: [&str; 2] = match hint {
        PreferredType::String => ["toString", "valueOf"],
        _ => ["valueOf", "toString"],
    };
    for name in method_names {
        let key = PropertyKey::from_str(agent, name);
        if let Some(crate::types::language::object::PropertyDescriptor::Data { value: method, .. }) =
            object.data(agent).get_own_property(key)
        {
            if let Some(function) = method.as_function() {
                let result = crate::vm::call_function(agent, function, value, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
    }
    Err(crate::execution::agent::JsError::type_error(agent, "Cannot convert object to primitive value"))
}

pub fn to_object(agent: &mut Context, value: Value) -> JsResult<crate::types::language::Object> {
    match value {
        Value::Object(o) => Ok(o),
        Value::Undefined | Value::Null => Err(crate::execution::agent::JsError::type_error(agent, "Cannot convert undefined or null to object")),
        _ => Ok(crate::builtins::ordinary::wrap_primitive(agent, value)),
    }
}

pub fn to_property_key(agent: &mut Context, value: Value) -> JsResult<PropertyKey> {
    if let Value::Symbol(s) = value {
        return Ok(PropertyKey::Symbol(s));
    }
    let primitive = to_primitive(agent, value, Some(PreferredType::String))?;
    if let Value::Symbol(s) = primitive {
        return Ok(PropertyKey::Symbol(s));
    }
    let s = to_string(agent, primitive)?;
    let mut scratch = std::string::String::new();
    Ok(PropertyKey::from_str(agent, s.as_str_buffered(agent, &mut scratch)))
}

pub fn to_int32(agent: &mut Context, value: Value) -> JsResult<i32> {
    let n = to_number(agent, value)?.value(agent);
    Ok(to_int32_from_f64(n))
}

pub fn to_int32_from_f64(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let n = n.trunc();
    let modulo = n.rem_euclid(4294967296.0);
    if modulo >= 2147483648.0 {
        (modulo - 4294967296.0) as i32
    } else {
        modulo as i32
    }
}

pub fn to_uint32(agent: &mut Context, value: Value) -> JsResult<u32> {
    let n = to_number(agent, value)?.value(agent);
    if !n.is_finite() || n == 0.0 {
        return Ok(0);
    }
    Ok(n.trunc().rem_euclid(4294967296.0) as u32)
}

pub fn to_length(agent: &mut Context, value: Value) -> JsResult<usize> {
    let n = to_number(agent, value)?.value(agent);
    if n.is_nan() || n <= 0.0 {
        return Ok(0);
    }
    Ok(n.min(2f64.powi(53) - 1.0) as usize)
}
