// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [21.3 The Math Object](https://tc39.es/ecma262/#sec-math-object)
//!
//! `Math` has no prototype chain of its own special-cased beyond
//! `%Object.prototype%` and is never constructed, so `install` just builds
//! one ordinary object and hangs every method/constant off it directly.

use rand::Rng;

use crate::context::Context;
use crate::execution::agent::JsResult;
use crate::execution::realm::RealmId;
use crate::types::language::number::JsNumber;
use crate::types::language::object::PropertyKey;
use crate::types::language::{Object, Value};

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let math = agent.heap.create_object(prototype, crate::types::language::object::ObjectKind::Ordinary);

    crate::builtins::ordinary::define_builtin_method(agent, math, "abs", crate::vm::builtins::ROUTING_MATH_ABS, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "floor", crate::vm::builtins::ROUTING_MATH_FLOOR, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "ceil", crate::vm::builtins::ROUTING_MATH_CEIL, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "round", crate::vm::builtins::ROUTING_MATH_ROUND, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "max", crate::vm::builtins::ROUTING_MATH_MAX, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "min", crate::vm::builtins::ROUTING_MATH_MIN, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "pow", crate::vm::builtins::ROUTING_MATH_POW, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "sqrt", crate::vm::builtins::ROUTING_MATH_SQRT, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, math, "random", crate::vm::builtins::ROUTING_MATH_RANDOM, 0, |_, _, _| unreachable!("routed"));

    for (name, value) in [("PI", std::f64::consts::PI), ("E", std::f64::consts::E), ("LN2", std::f64::consts::LN_2), ("LN10", std::f64::consts::LN_10), ("SQRT2", std::f64::consts::SQRT_2)] {
        let key = PropertyKey::from_str(agent, name);
        let number = JsNumber::from_f64(agent, value);
        math.data_mut(agent).define_property(key, crate::types::language::object::PropertyDescriptor::Data { value: number.into(), attributes: crate::types::language::object::PropertyAttributes { writable: false, enumerable: false, configurable: false } });
    }

    let key = PropertyKey::from_str(agent, "Math");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, Value::Object(math));
}

fn arg_as_f64(agent: &mut Context, args: &[Value], index: usize) -> JsResult<f64> {
    let value = args.get(index).copied().unwrap_or(Value::Undefined);
    Ok(crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent))
}

pub fn abs(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let x = arg_as_f64(agent, args, 0)?;
    Ok(JsNumber::from_f64(agent, x.abs()).into())
}

pub fn floor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let x = arg_as_f64(agent, args, 0)?;
    Ok(JsNumber::from_f64(agent, x.floor()).into())
}

pub fn ceil(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let x = arg_as_f64(agent, args, 0)?;
    Ok(JsNumber::from_f64(agent, x.ceil()).into())
}

/// `Math.round` rounds half-values toward `+Infinity`, unlike Rust's
/// round-half-away-from-zero `f64::round`.
pub fn round(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let x = arg_as_f64(agent, args, 0)?;
    let rounded = (x + 0.5).floor();
    Ok(JsNumber::from_f64(agent, rounded).into())
}

pub fn max(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let mut result = f64::NEG_INFINITY;
    for i in 0..args.len() {
        let x = arg_as_f64(agent, args, i)?;
        if x.is_nan() {
            return Ok(JsNumber::from_f64(agent, f64::NAN).into());
        }
        if x > result || (x == 0.0 && result == 0.0 && x.is_sign_positive()) {
            result = x;
        }
    }
    Ok(JsNumber::from_f64(agent, result).into())
}

pub fn min(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let mut result = f64::INFINITY;
    for i in 0..args.len() {
        let x = arg_as_f64(agent, args, i)?;
        if x.is_nan() {
            return Ok(JsNumber::from_f64(agent, f64::NAN).into());
        }
        if x < result || (x == 0.0 && result == 0.0 && x.is_sign_negative()) {
            result = x;
        }
    }
    Ok(JsNumber::from_f64(agent, result).into())
}

pub fn pow(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let base = arg_as_f64(agent, args, 0)?;
    let exponent = arg_as_f64(agent, args, 1)?;
    Ok(JsNumber::from_f64(agent, base.powf(exponent)).into())
}

pub fn sqrt(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let x = arg_as_f64(agent, args, 0)?;
    Ok(JsNumber::from_f64(agent, x.sqrt()).into())
}

pub fn random(agent: &mut Context) -> Value {
    let value: f64 = rand::rng().random_range(0.0..1.0);
    JsNumber::from_f64(agent, value).into()
}
