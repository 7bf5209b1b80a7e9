// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.5 The JSON Object](https://tc39.es/ecma262/#sec-json-object)
//!
//! `parse`/`stringify` round-trip through `sonic_rs::Value` rather than
//! hand-rolling a JSON grammar — `sonic-rs` is already the crate this
//! workspace reaches for wherever a fast JSON document model is needed.
//! `reviver`/`replacer` callbacks (25.5.1 step 6, 25.5.2 step 4) are not
//! implemented; see DESIGN.md.

use sonic_rs::{JsonContainerTrait, JsonValueTrait};

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::PropertyKey;
use crate::types::language::{Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let json = agent.heap.create_object(prototype, crate::types::language::object::ObjectKind::Ordinary);

    crate::builtins::ordinary::define_builtin_method(agent, json, "parse", crate::vm::builtins::ROUTING_JSON_PARSE, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, json, "stringify", crate::vm::builtins::ROUTING_JSON_STRINGIFY, 3, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "JSON");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, Value::Object(json));
}

pub fn parse(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let text_value = args.first().copied().unwrap_or(Value::Undefined);
    let text = crate::abstract_operations::type_conversion::to_string(agent, text_value)?;
    let mut scratch = String::new();
    let text = text.as_str_buffered(agent, &mut scratch);
    let document: sonic_rs::Value = sonic_rs::from_str(text).map_err(|e| JsError::syntax_error(agent, format!("JSON.parse: {e}")))?;
    Ok(sonic_to_js(agent, &document))
}

pub fn stringify(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let value = args.first().copied().unwrap_or(Value::Undefined);
    let indent = match args.get(2).copied() {
        Some(v) if v.as_number().is_some() => crate::abstract_operations::type_conversion::to_number(agent, v)?.value(agent) as usize,
        _ => 0,
    };
    let Some(document) = js_to_sonic(agent, value)? else {
        return Ok(Value::Undefined);
    };
    let text = if indent > 0 {
        sonic_rs::to_string_pretty(&document)
    } else {
        sonic_rs::to_string(&document)
    }
    .map_err(|e| JsError::type_error(agent, format!("JSON.stringify: {e}")))?;
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text)).into())
}

fn sonic_to_js(agent: &mut Context, value: &sonic_rs::Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    if let Some(b) = value.as_bool() {
        return Value::Boolean(b);
    }
    if let Some(n) = value.as_f64() {
        return crate::types::language::number::JsNumber::from_f64(agent, n).into();
    }
    if let Some(s) = value.as_str() {
        return agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(s)).into();
    }
    if let Some(array) = value.as_array() {
        let elements = array.iter().map(|v| sonic_to_js(agent, v)).collect::<Vec<_>>();
        let realm = agent.current_realm_id();
        return Value::Object(crate::builtins::array::create_array_from_elements(agent, realm, elements));
    }
    if let Some(object) = value.as_object() {
        let realm = agent.current_realm_id();
        let prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
        let out = crate::builtins::ordinary::create(agent, prototype);
        for (k, v) in object.iter() {
            let js_value = sonic_to_js(agent, v);
            let key = PropertyKey::from_str(agent, k);
            out.data_mut(agent).define_property(key, crate::types::language::object::PropertyDescriptor::Data { value: js_value, attributes: crate::types::language::object::PropertyAttributes::DEFAULT_DATA });
        }
        return Value::Object(out);
    }
    Value::Null
}

/// `SerializeJSONProperty`: `undefined`, functions, and symbols serialize
/// to "nothing" (`None`) rather than an error outside of array position,
/// where the caller substitutes `null`.
fn js_to_sonic(agent: &mut Context, value: Value) -> JsResult<Option<sonic_rs::Value>> {
    Ok(Some(match value {
        Value::Undefined | Value::Symbol(_) => return Ok(None),
        Value::Null => sonic_rs::Value::new(),
        Value::Boolean(b) => sonic_rs::Value::from(b),
        _ if value.is_number() => sonic_rs::Value::from(value.as_number().unwrap().value(agent)),
        _ if value.is_string() => {
            let s = value.as_js_string().unwrap();
            let mut scratch = String::new();
            sonic_rs::Value::from(s.as_str_buffered(agent, &mut scratch))
        }
        Value::Object(o) if crate::builtins::array::is_array(agent, value) => {
            let length = crate::builtins::array::length_of(agent, o)?;
            let mut array = sonic_rs::Array::new();
            for i in 0..length {
                let key = PropertyKey::Index(i as u32);
                let element = crate::abstract_operations::operations_on_objects::get(agent, o, key, value)?;
                let serialized = js_to_sonic(agent, element)?.unwrap_or_else(sonic_rs::Value::new);
                array.push(serialized);
            }
            sonic_rs::Value::from(array)
        }
        Value::Object(o) if crate::abstract_operations::testing_and_comparison::is_callable(agent, value) => return Ok(None),
        Value::Object(o) => {
            let mut object = sonic_rs::Object::new();
            for key in crate::abstract_operations::operations_on_objects::own_property_keys(agent, o) {
                let PropertyKey::String(_) | PropertyKey::Index(_) = key else { continue };
                if !o.data(agent).get_own_property(key).is_some_and(|d| d.is_enumerable()) {
                    continue;
                }
                let property_value = crate::abstract_operations::operations_on_objects::get(agent, o, key, value)?;
                let Some(serialized) = js_to_sonic(agent, property_value)? else { continue };
                let name = match key {
                    PropertyKey::String(s) => {
                        let mut scratch = String::new();
                        s.as_str_buffered(agent, &mut scratch).to_string()
                    }
                    PropertyKey::Index(i) => i.to_string(),
                    PropertyKey::Symbol(_) => unreachable!(),
                };
                object.insert(&name, serialized);
            }
            sonic_rs::Value::from(object)
        }
        Value::BigInt(_) | Value::SmallBigInt(_) => return Err(JsError::type_error(agent, "Do not know how to serialize a BigInt")),
        Value::Empty | Value::Exception => unreachable!("transient value leaked into JSON.stringify"),
    }))
}
