// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [21.1 Number Objects](https://tc39.es/ecma262/#sec-number-objects)

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::number::JsNumber;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_NUMBER_CONSTRUCTOR, "Number", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Number.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "toString", crate::vm::builtins::ROUTING_NUMBER_PROTOTYPE_TO_STRING, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "valueOf", crate::vm::builtins::ROUTING_NUMBER_PROTOTYPE_VALUE_OF, 0, |_, _, _| unreachable!("routed"));

    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "isInteger", crate::vm::builtins::ROUTING_NUMBER_IS_INTEGER, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "isFinite", crate::vm::builtins::ROUTING_NUMBER_IS_FINITE, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "isNaN", crate::vm::builtins::ROUTING_NUMBER_IS_NAN, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "parseFloat", crate::vm::builtins::ROUTING_NUMBER_PARSE_FLOAT, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "parseInt", crate::vm::builtins::ROUTING_NUMBER_PARSE_INT, 2, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Number");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
    // `parseFloat`/`parseInt` are also reachable as global functions per 19.2.
    let global_parse_float = PropertyKey::from_str(agent, "parseFloat");
    let parse_float_fn = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_NUMBER_PARSE_FLOAT, "parseFloat", 1);
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, global_parse_float, parse_float_fn.into());
    let global_parse_int = PropertyKey::from_str(agent, "parseInt");
    let parse_int_fn = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_NUMBER_PARSE_INT, "parseInt", 2);
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, global_parse_int, parse_int_fn.into());
}

pub fn number_constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let n = match args.first().copied() {
        Some(value) => crate::abstract_operations::type_conversion::to_number(agent, value)?,
        None => JsNumber::from_f64(agent, 0.0),
    };
    Ok(n.into())
}

fn this_number(agent: &mut Context, this: Value) -> JsResult<JsNumber> {
    if let Some(n) = this.as_number() {
        return Ok(n);
    }
    if let Value::Object(o) = this {
        if o.data(agent).kind == ObjectKind::NumberObject {
            if let Some(value) = o.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<Value>()) {
                if let Some(n) = value.as_number() {
                    return Ok(n);
                }
            }
        }
    }
    Err(JsError::type_error(agent, "Number method called on incompatible receiver"))
}

pub fn prototype_value_of(agent: &mut Context, this: Value) -> JsResult<Value> {
    this_number(agent, this).map(Into::into)
}

pub fn prototype_to_string(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let n = this_number(agent, this)?;
    let radix = match args.first().copied() {
        Some(v) if !v.is_undefined() => crate::abstract_operations::type_conversion::to_number(agent, v)?.value(agent) as u32,
        _ => 10,
    };
    let value = n.value(agent);
    let text = if radix == 10 {
        let mut buf = ryu_js::Buffer::new();
        buf.format(value).to_string()
    } else if value.fract() == 0.0 && value.is_finite() {
        format_radix(value as i64, radix)
    } else {
        return Err(JsError::range_error(agent, "toString() radix must be 10 for non-integer values"));
    };
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text)).into())
}

fn format_radix(mut n: i64, radix: u32) -> String {
    let negative = n < 0;
    if negative {
        n = -n;
    }
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let digit = (n % radix as i64) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap());
        n /= radix as i64;
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

pub fn is_integer(agent: &Context, value: Value) -> bool {
    value.as_number().is_some_and(|n| {
        let v = n.value(agent);
        v.is_finite() && v.fract() == 0.0
    })
}

pub fn is_finite(agent: &Context, value: Value) -> bool {
    value.as_number().is_some_and(|n| n.value(agent).is_finite())
}

pub fn is_nan(agent: &Context, value: Value) -> bool {
    value.as_number().is_some_and(|n| n.is_nan(agent))
}

pub fn parse_float(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let s = crate::abstract_operations::type_conversion::to_string(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    let mut scratch = String::new();
    let text = s.as_str_buffered(agent, &mut scratch).trim();
    let prefix_len = leading_float_len(text);
    let value = if prefix_len == 0 { f64::NAN } else { fast_float::parse::<f64, _>(&text[..prefix_len]).unwrap_or(f64::NAN) };
    Ok(JsNumber::from_f64(agent, value).into())
}

fn leading_float_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let start_digits = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i == start_digits {
        return 0;
    }
    let mantissa_end = i;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_digits_start {
            return j;
        }
    }
    mantissa_end
}

pub fn parse_int(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let s = crate::abstract_operations::type_conversion::to_string(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    let mut scratch = String::new();
    let text = s.as_str_buffered(agent, &mut scratch).trim();
    let radix_arg = match args.get(1).copied() {
        Some(v) if !v.is_undefined() => crate::abstract_operations::type_conversion::to_number(agent, v)?.value(agent) as i64 as u32,
        _ => 0,
    };
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if radix_arg == 16 || (radix_arg == 0 && (rest.starts_with("0x") || rest.starts_with("0X"))) {
        (16, rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")).unwrap_or(rest))
    } else {
        (if radix_arg == 0 { 10 } else { radix_arg }, rest)
    };
    if !(2..=36).contains(&radix) {
        return Ok(JsNumber::from_f64(agent, f64::NAN).into());
    }
    let valid_len = digits.chars().take_while(|c| c.to_digit(radix).is_some()).count();
    if valid_len == 0 {
        return Ok(JsNumber::from_f64(agent, f64::NAN).into());
    }
    let mut value: f64 = 0.0;
    for c in digits[..valid_len].chars() {
        value = value * radix as f64 + c.to_digit(radix).unwrap() as f64;
    }
    if negative {
        value = -value;
    }
    Ok(JsNumber::from_f64(agent, value).into())
}
