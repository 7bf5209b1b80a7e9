// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.2 Function Objects](https://tc39.es/ecma262/#sec-function-objects)
//!
//! `Function.prototype`'s own methods live here rather than on the VM's
//! already-builtin-dispatching `call`/`apply`/`bind` handlers in
//! `vm::builtins`, which this module just wires up; `Function` itself is
//! not constructible (dynamic source compilation is out of scope, see
//! DESIGN.md), so its constructor routing id always throws.

use crate::context::Context;
use crate::execution::realm::RealmId;
use crate::types::language::object::{PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_FUNCTION_CONSTRUCTOR, "Function", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Function.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "call", crate::vm::builtins::ROUTING_FUNCTION_PROTOTYPE_CALL, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "apply", crate::vm::builtins::ROUTING_FUNCTION_PROTOTYPE_APPLY, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "bind", crate::vm::builtins::ROUTING_FUNCTION_PROTOTYPE_BIND, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toString", crate::vm::builtins::ROUTING_FUNCTION_PROTOTYPE_TO_STRING, 0, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Function");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}
