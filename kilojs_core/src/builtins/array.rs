// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1 Array Objects](https://tc39.es/ecma262/#sec-array-objects)
//!
//! Array instances are ordinary `ObjectKind::Array` objects whose elements
//! live in `ObjectHeapData::fast_array` until a non-default-attribute
//! write demotes them (`spec.md` §3.4 "fast arrays"); `length` itself is
//! tracked as an ordinary writable-but-special own property, matching how
//! the teacher keeps the length invariant out of the element storage.

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

const LENGTH_ATTRIBUTES: PropertyAttributes = PropertyAttributes { writable: true, enumerable: false, configurable: false };

pub fn create_array(agent: &mut Context, realm: RealmId) -> Object {
    let prototype = agent.realm(realm).intrinsics.get("%Array.prototype%");
    let array = agent.heap.create_object(prototype, ObjectKind::Array);
    set_length(agent, array, 0);
    array
}

pub fn create_array_from_elements(agent: &mut Context, realm: RealmId, elements: Vec<Value>) -> Object {
    let array = create_array(agent, realm);
    for (i, value) in elements.iter().enumerate() {
        array.data_mut(agent).define_property(
            PropertyKey::Index(i as u32),
            PropertyDescriptor::Data { value: *value, attributes: PropertyAttributes::DEFAULT_DATA },
        );
    }
    set_length(agent, array, elements.len() as u32);
    array
}

fn set_length(agent: &mut Context, array: Object, length: u32) {
    let length_value = crate::types::language::number::JsNumber::from_f64(agent, length as f64);
    let key = PropertyKey::from_str(agent, "length");
    array.data_mut(agent).define_property(key, PropertyDescriptor::Data { value: length_value.into(), attributes: LENGTH_ATTRIBUTES });
}

pub fn length_of(agent: &mut Context, array: Object) -> JsResult<usize> {
    let key = PropertyKey::from_str(agent, "length");
    let value = crate::abstract_operations::operations_on_objects::get(agent, array, key, Value::Object(array))?;
    crate::abstract_operations::type_conversion::to_length(agent, value)
}

/// Collects an array-like (anything with a numeric `length` and indexed
/// properties) into a plain `Vec<Value>`, used by `Function.prototype.apply`
/// and spread-call argument lists.
pub fn iterable_to_vec(agent: &mut Context, value: Value) -> JsResult<Vec<Value>> {
    let object = crate::abstract_operations::type_conversion::to_object(agent, value)?;
    let length = length_of(agent, object)?;
    let mut out = Vec::with_capacity(length);
    for i in 0..length {
        let key = PropertyKey::Index(i as u32);
        out.push(crate::abstract_operations::operations_on_objects::get(agent, object, key, value)?);
    }
    Ok(out)
}

fn this_array(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::Array)
        .ok_or_else(|| JsError::type_error(agent, "Array method called on non-array"))
}

/// `install` wires `Array`'s constructor and `Array.prototype`'s core
/// methods. Only the subset the bytecode's `NewArray`/iteration opcodes
/// actually exercise is implemented; the rest of 23.1 (`flatMap`, `sort`,
/// ...) is left for a follow-up pass, matching `spec.md`'s focus on engine
/// mechanics over exhaustive library coverage.
pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_ARRAY_CONSTRUCTOR, "Array", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Array.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "push", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_PUSH, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "pop", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_POP, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "join", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_JOIN, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "slice", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_SLICE, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "forEach", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_FOR_EACH, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "map", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_MAP, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "filter", crate::vm::builtins::ROUTING_ARRAY_PROTOTYPE_FILTER, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "isArray", crate::vm::builtins::ROUTING_ARRAY_IS_ARRAY, 1, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Array");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

pub fn array_constructor(agent: &mut Context, realm: RealmId, args: &[Value]) -> JsResult<Value> {
    if args.len() == 1 {
        if let Some(n) = args[0].as_number() {
            let length = n.value(agent);
            if length.fract() != 0.0 || length < 0.0 || length > u32::MAX as f64 {
                return Err(JsError::range_error(agent, "Invalid array length"));
            }
            let array = create_array(agent, realm);
            set_length(agent, array, length as u32);
            return Ok(Value::Object(array));
        }
    }
    Ok(Value::Object(create_array_from_elements(agent, realm, args.to_vec())))
}

pub fn prototype_push(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let mut length = length_of(agent, array)?;
    for value in args {
        let key = PropertyKey::Index(length as u32);
        array.data_mut(agent).define_property(key, PropertyDescriptor::Data { value: *value, attributes: PropertyAttributes::DEFAULT_DATA });
        length += 1;
    }
    set_length(agent, array, length as u32);
    Ok(crate::types::language::number::JsNumber::from_f64(agent, length as f64).into())
}

pub fn prototype_pop(agent: &mut Context, this: Value, _args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let length = length_of(agent, array)?;
    if length == 0 {
        return Ok(Value::Undefined);
    }
    let key = PropertyKey::Index((length - 1) as u32);
    let value = crate::abstract_operations::operations_on_objects::get(agent, array, key, this)?;
    crate::abstract_operations::operations_on_objects::delete(agent, array, key);
    set_length(agent, array, (length - 1) as u32);
    Ok(value)
}

pub fn prototype_join(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let separator = match args.first().copied() {
        Some(value) if !value.is_undefined() => crate::abstract_operations::type_conversion::to_string(agent, value)?,
        _ => agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(",")),
    };
    let length = length_of(agent, array)?;
    let mut parts = Vec::with_capacity(length);
    for i in 0..length {
        let element = crate::abstract_operations::operations_on_objects::get(agent, array, PropertyKey::Index(i as u32), this)?;
        parts.push(if element.is_nullish() {
            crate::types::language::JsString::EMPTY
        } else {
            crate::abstract_operations::type_conversion::to_string(agent, element)?
        });
    }
    let mut result = crate::types::language::JsString::EMPTY;
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            result = crate::types::language::JsString::concat(agent, result, separator);
        }
        result = crate::types::language::JsString::concat(agent, result, part);
    }
    Ok(result.into())
}

pub fn prototype_slice(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let length = length_of(agent, array)? as i64;
    let start = relative_index(agent, args.first().copied(), length, 0)?;
    let end = relative_index(agent, args.get(1).copied(), length, length)?;
    let mut elements = Vec::new();
    let mut i = start;
    while i < end {
        elements.push(crate::abstract_operations::operations_on_objects::get(agent, array, PropertyKey::Index(i as u32), this)?);
        i += 1;
    }
    let realm = agent.current_realm_id();
    Ok(Value::Object(create_array_from_elements(agent, realm, elements)))
}

fn relative_index(agent: &mut Context, value: Option<Value>, length: i64, default: i64) -> JsResult<i64> {
    let Some(value) = value.filter(|v| !v.is_undefined()) else { return Ok(default) };
    let n = crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent);
    let n = if n.is_nan() { 0.0 } else { n.trunc() } as i64;
    Ok(if n < 0 { (length + n).max(0) } else { n.min(length) })
}

pub fn prototype_for_each(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let callback = args.first().copied().and_then(Value::as_function).ok_or_else(|| JsError::type_error(agent, "callback is not a function"))?;
    let this_arg = args.get(1).copied().unwrap_or(Value::Undefined);
    let length = length_of(agent, array)?;
    for i in 0..length {
        let key = PropertyKey::Index(i as u32);
        if !array.data(agent).has_own_property(key) {
            continue;
        }
        let value = crate::abstract_operations::operations_on_objects::get(agent, array, key, this)?;
        let index_value = crate::types::language::number::JsNumber::from_f64(agent, i as f64);
        crate::vm::call_function(agent, callback, this_arg, &[value, index_value.into(), this])?;
    }
    Ok(Value::Undefined)
}

pub fn prototype_map(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let callback = args.first().copied().and_then(Value::as_function).ok_or_else(|| JsError::type_error(agent, "callback is not a function"))?;
    let this_arg = args.get(1).copied().unwrap_or(Value::Undefined);
    let length = length_of(agent, array)?;
    let mut mapped = Vec::with_capacity(length);
    for i in 0..length {
        let key = PropertyKey::Index(i as u32);
        let value = crate::abstract_operations::operations_on_objects::get(agent, array, key, this)?;
        let index_value = crate::types::language::number::JsNumber::from_f64(agent, i as f64);
        mapped.push(crate::vm::call_function(agent, callback, this_arg, &[value, index_value.into(), this])?);
    }
    let realm = agent.current_realm_id();
    Ok(Value::Object(create_array_from_elements(agent, realm, mapped)))
}

pub fn prototype_filter(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let array = this_array(agent, this)?;
    let callback = args.first().copied().and_then(Value::as_function).ok_or_else(|| JsError::type_error(agent, "callback is not a function"))?;
    let this_arg = args.get(1).copied().unwrap_or(Value::Undefined);
    let length = length_of(agent, array)?;
    let mut kept = Vec::new();
    for i in 0..length {
        let key = PropertyKey::Index(i as u32);
        if !array.data(agent).has_own_property(key) {
            continue;
        }
        let value = crate::abstract_operations::operations_on_objects::get(agent, array, key, this)?;
        let index_value = crate::types::language::number::JsNumber::from_f64(agent, i as f64);
        let keep = crate::vm::call_function(agent, callback, this_arg, &[value, index_value.into(), this])?;
        if crate::abstract_operations::type_conversion::to_boolean(agent, keep) {
            kept.push(value);
        }
    }
    let realm = agent.current_realm_id();
    Ok(Value::Object(create_array_from_elements(agent, realm, kept)))
}

pub fn is_array(agent: &Context, value: Value) -> bool {
    value.as_object().is_some_and(|o| o.data(agent).kind == ObjectKind::Array)
}
