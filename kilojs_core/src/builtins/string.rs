// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [22.1 String Objects](https://tc39.es/ecma262/#sec-string-objects)

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{JsString, Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_STRING_CONSTRUCTOR, "String", 1);
    let prototype = agent.realm(realm).intrinsics.get("%String.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toString", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_TO_STRING, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "charAt", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_CHAR_AT, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "slice", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_SLICE, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "indexOf", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_INDEX_OF, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "concat", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_CONCAT, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toUpperCase", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_TO_UPPER_CASE, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toLowerCase", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_TO_LOWER_CASE, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "trim", crate::vm::builtins::ROUTING_STRING_PROTOTYPE_TRIM, 0, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "String");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

pub fn string_constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let value = match args.first().copied() {
        Some(value) => crate::abstract_operations::type_conversion::to_string(agent, value)?,
        None => JsString::EMPTY,
    };
    Ok(value.into())
}

fn this_string(agent: &mut Context, this: Value) -> JsResult<JsString> {
    if let Some(s) = this.as_js_string() {
        return Ok(s);
    }
    if let Value::Object(o) = this {
        if o.data(agent).kind == ObjectKind::StringObject {
            if let Some(value) = o.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<Value>()) {
                if let Some(s) = value.as_js_string() {
                    return Ok(s);
                }
            }
        }
    }
    Err(JsError::type_error(agent, "String method called on incompatible receiver"))
}

pub fn prototype_to_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    this_string(agent, this).map(Into::into)
}

pub fn prototype_char_at(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let index = match args.first().copied() {
        Some(v) => crate::abstract_operations::type_conversion::to_number(agent, v)?.value(agent),
        None => 0.0,
    };
    let wtf8 = s.as_wtf8(agent);
    let code_points: Vec<_> = wtf8.code_points().collect();
    let result = if index >= 0.0 && (index as usize) < code_points.len() {
        let mut buf = wtf8::Wtf8Buf::new();
        buf.push(code_points[index as usize]);
        agent.heap.find_or_create_string(buf)
    } else {
        JsString::EMPTY
    };
    Ok(result.into())
}

pub fn prototype_slice(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let code_points: Vec<_> = s.as_wtf8(agent).code_points().collect();
    let length = code_points.len() as i64;
    let start = relative_index(agent, args.first().copied(), length, 0)?;
    let end = relative_index(agent, args.get(1).copied(), length, length)?;
    let mut buf = wtf8::Wtf8Buf::new();
    let mut i = start;
    while i < end {
        buf.push(code_points[i as usize]);
        i += 1;
    }
    Ok(agent.heap.find_or_create_string(buf).into())
}

fn relative_index(agent: &mut Context, value: Option<Value>, length: i64, default: i64) -> JsResult<i64> {
    let Some(value) = value.filter(|v| !v.is_undefined()) else { return Ok(default) };
    let n = crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent);
    let n = if n.is_nan() { 0.0 } else { n.trunc() } as i64;
    Ok(if n < 0 { (length + n).max(0) } else { n.min(length) })
}

pub fn prototype_index_of(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let needle = match args.first().copied() {
        Some(v) => crate::abstract_operations::type_conversion::to_string(agent, v)?,
        None => JsString::EMPTY,
    };
    let mut scratch_s = String::new();
    let mut scratch_n = String::new();
    let haystack = s.as_str_buffered(agent, &mut scratch_s);
    let needle_str = needle.as_str_buffered(agent, &mut scratch_n);
    let index = haystack.find(needle_str).map(|byte_index| haystack[..byte_index].chars().count() as f64).unwrap_or(-1.0);
    Ok(crate::types::language::number::JsNumber::from_f64(agent, index).into())
}

pub fn prototype_concat(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let mut result = this_string(agent, this)?;
    for arg in args {
        let piece = crate::abstract_operations::type_conversion::to_string(agent, *arg)?;
        result = JsString::concat(agent, result, piece);
    }
    Ok(result.into())
}

pub fn prototype_to_upper_case(agent: &mut Context, this: Value) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let mut scratch = String::new();
    let upper = s.as_str_buffered(agent, &mut scratch).to_uppercase();
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(upper)).into())
}

pub fn prototype_to_lower_case(agent: &mut Context, this: Value) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let mut scratch = String::new();
    let lower = s.as_str_buffered(agent, &mut scratch).to_lowercase();
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(lower)).into())
}

pub fn prototype_trim(agent: &mut Context, this: Value) -> JsResult<Value> {
    let s = this_string(agent, this)?;
    let mut scratch = String::new();
    let trimmed = s.as_str_buffered(agent, &mut scratch).trim().to_string();
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(trimmed)).into())
}
