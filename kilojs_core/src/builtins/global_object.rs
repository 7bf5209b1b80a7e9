// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [19.1-19.4 The Global Object](https://tc39.es/ecma262/#sec-global-object)
//!
//! `spec.md` §4.8: "Getter-only and side-effecting globals (`globalThis`,
//! `NaN`, `Infinity`, `undefined`) are ordinary properties with immutable
//! configuration." This module creates one realm's global object and wires
//! every intrinsic onto it; `execution::realm::Realm::new` calls it once
//! per realm.

use crate::context::Context;
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyKey};
use crate::types::language::Value;

const NON_CONFIGURABLE_DATA: PropertyAttributes = PropertyAttributes {
    writable: false,
    enumerable: false,
    configurable: false,
};

pub fn initialize(agent: &mut Context, realm: RealmId) {
    let object_prototype = agent.heap.create_object(None, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%Object.prototype%", Value::Object(object_prototype));

    let function_prototype = agent.heap.create_object(Some(Value::Object(object_prototype)), ObjectKind::Function);
    agent.realm_mut(realm).intrinsics.set("%Function.prototype%", Value::Object(function_prototype));

    for (name, prototype_key) in [
        ("%Error.prototype%", "%Object.prototype%"),
        ("%EvalError.prototype%", "%Error.prototype%"),
        ("%RangeError.prototype%", "%Error.prototype%"),
        ("%ReferenceError.prototype%", "%Error.prototype%"),
        ("%SyntaxError.prototype%", "%Error.prototype%"),
        ("%TypeError.prototype%", "%Error.prototype%"),
        ("%URIError.prototype%", "%Error.prototype%"),
        ("%Array.prototype%", "%Object.prototype%"),
        ("%Boolean.prototype%", "%Object.prototype%"),
        ("%Number.prototype%", "%Object.prototype%"),
        ("%String.prototype%", "%Object.prototype%"),
        ("%Promise.prototype%", "%Object.prototype%"),
        ("%RegExp.prototype%", "%Object.prototype%"),
    ] {
        let proto = agent.realm(realm).intrinsics.get(prototype_key);
        let object = agent.heap.create_object(proto, ObjectKind::Ordinary);
        agent.realm_mut(realm).intrinsics.set(name, Value::Object(object));
    }

    let global_object = agent.heap.create_object(Some(Value::Object(object_prototype)), ObjectKind::Global);
    agent.realm_mut(realm).global_object = global_object;

    install_object(agent, realm, global_object);
    crate::builtins::array::install(agent, realm, global_object);
    crate::builtins::string::install(agent, realm, global_object);
    crate::builtins::number::install(agent, realm, global_object);
    crate::builtins::boolean::install(agent, realm, global_object);
    crate::builtins::function_object::install(agent, realm, global_object);
    crate::builtins::error::install_constructors(agent, realm, global_object);
    crate::builtins::promise::install(agent, realm, global_object);
    #[cfg(feature = "math")]
    crate::builtins::math::install(agent, realm, global_object);
    #[cfg(feature = "json")]
    crate::builtins::json::install(agent, realm, global_object);
    #[cfg(feature = "regexp")]
    crate::builtins::regexp::install(agent, realm, global_object);
    #[cfg(feature = "set")]
    crate::builtins::map_set::install(agent, realm, global_object);
    #[cfg(feature = "array-buffer")]
    crate::builtins::array_buffer::install(agent, realm, global_object);
    #[cfg(feature = "array-buffer")]
    crate::builtins::typed_array::install(agent, realm, global_object);
    #[cfg(feature = "array-buffer")]
    crate::builtins::data_view::install(agent, realm, global_object);
    #[cfg(feature = "date")]
    crate::builtins::date::install(agent, realm, global_object);

    define_value_property(agent, global_object, "undefined", Value::Undefined);
    let nan = crate::types::language::number::JsNumber::from_f64(agent, f64::NAN);
    define_value_property(agent, global_object, "NaN", nan.into());
    let infinity = crate::types::language::number::JsNumber::from_f64(agent, f64::INFINITY);
    define_value_property(agent, global_object, "Infinity", infinity.into());
    define_value_property(agent, global_object, "globalThis", Value::Object(global_object));
}

/// Wires `Object`'s constructor, its static `keys`/`values`/`assign`, and
/// `Object.prototype`'s `toString`/`valueOf`/`hasOwnProperty`.
fn install_object(agent: &mut Context, realm: RealmId, global_object: crate::types::language::Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_OBJECT_CONSTRUCTOR, "Object", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Object.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        crate::types::language::object::PropertyDescriptor::Data { value: prototype, attributes: NON_CONFIGURABLE_DATA },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toString", crate::vm::builtins::ROUTING_OBJECT_PROTOTYPE_TO_STRING, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "valueOf", crate::vm::builtins::ROUTING_OBJECT_PROTOTYPE_VALUE_OF, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "hasOwnProperty", crate::vm::builtins::ROUTING_OBJECT_PROTOTYPE_HAS_OWN_PROPERTY, 1, |_, _, _| unreachable!("routed"));

    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "keys", crate::vm::builtins::ROUTING_OBJECT_KEYS, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "values", crate::vm::builtins::ROUTING_OBJECT_VALUES, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "assign", crate::vm::builtins::ROUTING_OBJECT_ASSIGN, 2, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Object");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

fn define_value_property(agent: &mut Context, object: crate::types::language::Object, name: &str, value: Value) {
    let key = PropertyKey::from_str(agent, name);
    object.data_mut(agent).define_property(
        key,
        crate::types::language::object::PropertyDescriptor::Data { value, attributes: NON_CONFIGURABLE_DATA },
    );
}
