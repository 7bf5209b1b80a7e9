// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.3 Boolean Objects](https://tc39.es/ecma262/#sec-boolean-objects)

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_BOOLEAN_CONSTRUCTOR, "Boolean", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Boolean.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toString", crate::vm::builtins::ROUTING_BOOLEAN_PROTOTYPE_TO_STRING, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "valueOf", crate::vm::builtins::ROUTING_BOOLEAN_PROTOTYPE_VALUE_OF, 0, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Boolean");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

pub fn boolean_constructor(agent: &Context, args: &[Value]) -> JsResult<Value> {
    let value = args.first().copied().unwrap_or(Value::Undefined);
    Ok(Value::Boolean(crate::abstract_operations::type_conversion::to_boolean(agent, value)))
}

fn this_boolean(agent: &mut Context, this: Value) -> JsResult<bool> {
    if let Value::Boolean(b) = this {
        return Ok(b);
    }
    if let Value::Object(o) = this {
        if o.data(agent).kind == ObjectKind::BooleanObject {
            if let Some(Value::Boolean(b)) = o.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<Value>()) {
                return Ok(*b);
            }
        }
    }
    Err(JsError::type_error(agent, "Boolean method called on incompatible receiver"))
}

pub fn prototype_value_of(agent: &mut Context, this: Value) -> JsResult<Value> {
    this_boolean(agent, this).map(Value::Boolean)
}

pub fn prototype_to_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    let b = this_boolean(agent, this)?;
    let text = if b { "true" } else { "false" };
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(text)).into())
}
