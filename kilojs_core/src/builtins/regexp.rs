// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [22.2 RegExp (Regular Expression) Objects](https://tc39.es/ecma262/#sec-regexp-regular-expression-objects)
//!
//! Backed directly by `regex::Regex` rather than a hand-written engine;
//! ECMAScript regex syntax and Rust's `regex` crate diverge (no
//! backreferences, no lookaround), so patterns using those constructs fail
//! to compile here rather than running — an accepted gap, see DESIGN.md.

use regex::Regex;

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

/// `RegExpHeapData`'s compiled form plus the two string fields (`source`,
/// `flags`) user code can read back via the prototype's ordinary
/// properties; `lastIndex` for the `g`/`y` flags lives as one too.
struct RegExpData {
    regex: Regex,
    source: crate::types::language::JsString,
    flags: crate::types::language::JsString,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_REGEXP_CONSTRUCTOR, "RegExp", 2);
    let prototype = agent.realm(realm).intrinsics.get("%RegExp.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "test", crate::vm::builtins::ROUTING_REGEXP_PROTOTYPE_TEST, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "exec", crate::vm::builtins::ROUTING_REGEXP_PROTOTYPE_EXEC, 1, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "RegExp");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

/// Translates the handful of ECMAScript regex flags this engine supports
/// (`i`, `m`, `s`) into the inline `(?flags)` prefix Rust's `regex` crate
/// understands; `g`/`y`/`u`/`d` affect call-site iteration state, not
/// compilation, and are recorded in `flags` but not passed to `Regex::new`.
fn translate_flags(flags: &str) -> String {
    let mut inline = String::new();
    for c in flags.chars() {
        match c {
            'i' | 'm' | 's' => inline.push(c),
            _ => {}
        }
    }
    if inline.is_empty() { String::new() } else { format!("(?{inline})") }
}

pub fn constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let pattern_value = args.first().copied().unwrap_or(Value::Undefined);
    let pattern = crate::abstract_operations::type_conversion::to_string(agent, pattern_value)?;
    let flags_value = args.get(1).copied().unwrap_or(Value::Undefined);
    let flags = if flags_value.is_undefined() { crate::types::language::JsString::EMPTY } else { crate::abstract_operations::type_conversion::to_string(agent, flags_value)? };

    let mut pattern_scratch = String::new();
    let mut flags_scratch = String::new();
    let pattern_str = pattern.as_str_buffered(agent, &mut pattern_scratch);
    let flags_str = flags.as_str_buffered(agent, &mut flags_scratch);
    let full_pattern = format!("{}{}", translate_flags(flags_str), pattern_str);
    let regex = Regex::new(&full_pattern).map_err(|e| JsError::syntax_error(agent, format!("Invalid regular expression: {e}")))?;

    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%RegExp.prototype%");
    let object = agent.heap.create_object(prototype, ObjectKind::RegExp);
    object.data_mut(agent).auxiliary = Some(Box::new(RegExpData { regex, source: pattern, flags }));

    let last_index_key = PropertyKey::from_str(agent, "lastIndex");
    let zero = crate::types::language::number::JsNumber::from_f64(agent, 0.0);
    object.data_mut(agent).define_property(last_index_key, PropertyDescriptor::Data { value: zero.into(), attributes: PropertyAttributes { writable: true, enumerable: false, configurable: false } });

    Ok(Value::Object(object))
}

fn this_regexp(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::RegExp)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-RegExp receiver"))
}

fn data(agent: &Context, regexp: Object) -> &RegExpData {
    regexp.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<RegExpData>()).expect("RegExp object missing RegExpData")
}

fn is_global_or_sticky(agent: &mut Context, regexp: Object) -> bool {
    let flags = data(agent, regexp).flags;
    let mut scratch = String::new();
    let text = flags.as_str_buffered(agent, &mut scratch);
    text.contains('g') || text.contains('y')
}

pub fn prototype_test(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let result = prototype_exec(agent, this, args)?;
    Ok(Value::Boolean(!result.is_null()))
}

/// `RegExpBuiltinExec`: for a global/sticky regex, search starts at
/// `lastIndex` and advances it on both match and no-match (resetting to 0
/// on failure), matching 22.2.7.2.
pub fn prototype_exec(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let regexp = this_regexp(agent, this)?;
    let input_value = args.first().copied().unwrap_or(Value::Undefined);
    let input = crate::abstract_operations::type_conversion::to_string(agent, input_value)?;
    let mut scratch = String::new();
    let text = input.as_str_buffered(agent, &mut scratch).to_string();

    let sticky_or_global = is_global_or_sticky(agent, regexp);
    let last_index_key = PropertyKey::from_str(agent, "lastIndex");
    let start = if sticky_or_global {
        crate::abstract_operations::operations_on_objects::get(agent, regexp, last_index_key, this)
            .and_then(|v| crate::abstract_operations::type_conversion::to_length(agent, v))
            .unwrap_or(0)
    } else {
        0
    };

    if start > text.len() {
        if sticky_or_global {
            set_last_index(agent, regexp, this, 0)?;
        }
        return Ok(Value::Null);
    }

    let captures = data(agent, regexp).regex.captures(&text[start..]);
    let Some(captures) = captures else {
        if sticky_or_global {
            set_last_index(agent, regexp, this, 0)?;
        }
        return Ok(Value::Null);
    };
    let whole = captures.get(0).expect("capture group 0 always matches");
    let match_start = start + whole.start();
    let match_end = start + whole.end();

    if sticky_or_global {
        set_last_index(agent, regexp, this, match_end)?;
    }

    let mut elements = Vec::with_capacity(captures.len());
    for i in 0..captures.len() {
        elements.push(match captures.get(i) {
            Some(m) => agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(m.as_str())).into(),
            None => Value::Undefined,
        });
    }
    let realm = agent.current_realm_id();
    let result = crate::builtins::array::create_array_from_elements(agent, realm, elements);
    let index_key = PropertyKey::from_str(agent, "index");
    let index_value = crate::types::language::number::JsNumber::from_f64(agent, match_start as f64);
    result.data_mut(agent).define_property(index_key, PropertyDescriptor::Data { value: index_value.into(), attributes: PropertyAttributes::DEFAULT_DATA });
    let input_key = PropertyKey::from_str(agent, "input");
    result.data_mut(agent).define_property(input_key, PropertyDescriptor::Data { value: input.into(), attributes: PropertyAttributes::DEFAULT_DATA });
    Ok(Value::Object(result))
}

fn set_last_index(agent: &mut Context, regexp: Object, this: Value, index: usize) -> JsResult<()> {
    let key = PropertyKey::from_str(agent, "lastIndex");
    let value = crate::types::language::number::JsNumber::from_f64(agent, index as f64);
    crate::abstract_operations::operations_on_objects::set(agent, regexp, key, value.into(), this)?;
    Ok(())
}
