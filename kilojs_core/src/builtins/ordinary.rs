// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)

use crate::context::Context;
use crate::types::language::function::{BuiltinFunctionData, BuiltinHandler};
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Function, Object, Value};

/// `OrdinaryObjectCreate`.
pub fn create(agent: &mut Context, prototype: Option<Value>) -> Object {
    agent.heap.create_object(prototype, ObjectKind::Ordinary)
}

/// Wraps a primitive value in its matching exotic wrapper object
/// (`Boolean`/`Number`/`String` object), used by `ToObject` and by
/// `new Boolean(...)`/`new Number(...)`/`new String(...)`.
pub fn wrap_primitive(agent: &mut Context, value: Value) -> Object {
    let (kind, prototype_name) = match value {
        Value::Boolean(_) => (ObjectKind::BooleanObject, "%Boolean.prototype%"),
        Value::SmallInteger(_) | Value::Number(_) => (ObjectKind::NumberObject, "%Number.prototype%"),
        Value::SmallString(_) | Value::String(_) => (ObjectKind::StringObject, "%String.prototype%"),
        _ => (ObjectKind::Ordinary, "%Object.prototype%"),
    };
    let prototype = agent.realm(agent.current_realm_id()).intrinsics.get(prototype_name);
    let object = agent.heap.create_object(prototype, kind);
    object.data_mut(agent).auxiliary = Some(Box::new(value));
    object
}

/// `CreateBuiltinFunction`: allocates a function object that routes calls
/// through the VM's builtin dispatch table by numeric id rather than
/// storing a raw function pointer on every such object (`spec.md` §4.8).
pub fn create_builtin_function(
    agent: &mut Context,
    routing_id: u32,
    name: &str,
    length: u8,
) -> Function {
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Function.prototype%");
    let object = agent.heap.create_object(prototype, ObjectKind::Function);
    let name_value = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(name));
    object.data_mut(agent).auxiliary = Some(Box::new(BuiltinFunctionData {
        routing_id,
        name: name_value,
        length,
        realm,
    }));
    let name_key = PropertyKey::from_str(agent, "name");
    object.data_mut(agent).define_property(
        name_key,
        PropertyDescriptor::Data {
            value: name_value.into(),
            attributes: PropertyAttributes { writable: false, enumerable: false, configurable: true },
        },
    );
    let length_key = PropertyKey::from_str(agent, "length");
    let length_value = crate::types::language::number::JsNumber::from_f64(agent, length as f64);
    object.data_mut(agent).define_property(
        length_key,
        PropertyDescriptor::Data {
            value: length_value.into(),
            attributes: PropertyAttributes { writable: false, enumerable: false, configurable: true },
        },
    );
    Function::from_object_unchecked(object)
}

pub fn define_builtin_method(agent: &mut Context, object: Object, name: &'static str, routing_id: u32, length: u8, handler: BuiltinHandler) {
    let _ = handler; // dispatch is by routing_id via vm::builtin_dispatch_table; kept for readability at call sites
    let function = create_builtin_function(agent, routing_id, name, length);
    let key = PropertyKey::from_str(agent, name);
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, object, key, function.into());
}
