// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### Builtin routing table (`spec.md` §4.8)
//!
//! Every `BuiltinFunctionData` carries a numeric `routing_id` instead of a
//! raw function pointer, so the object header stays a fixed size across
//! every builtin (`spec.md` §3.4's "no per-object-kind-sized header").
//! [`dispatch`] is the single place that turns a `routing_id` back into
//! Rust code; new builtins are added here as a new constant plus a new
//! match arm, not a new field anywhere on the object. Ids are grouped by
//! builtin module in blocks of ten purely for readability; nothing depends
//! on the numeric value beyond uniqueness.

use crate::context::Context;
use crate::execution::agent::{ExceptionType, JsError, JsResult};
use crate::types::language::Value;

pub const ROUTING_ERROR_CONSTRUCTOR: u32 = 1;
pub const ROUTING_ERROR_PROTOTYPE_TO_STRING: u32 = 2;
pub const ROUTING_OBJECT_PROTOTYPE_TO_STRING: u32 = 3;
pub const ROUTING_OBJECT_PROTOTYPE_VALUE_OF: u32 = 4;
pub const ROUTING_OBJECT_PROTOTYPE_HAS_OWN_PROPERTY: u32 = 5;
pub const ROUTING_OBJECT_CONSTRUCTOR: u32 = 6;
pub const ROUTING_OBJECT_KEYS: u32 = 7;
pub const ROUTING_OBJECT_VALUES: u32 = 8;
pub const ROUTING_OBJECT_ASSIGN: u32 = 9;

pub const ROUTING_FUNCTION_PROTOTYPE_CALL: u32 = 10;
pub const ROUTING_FUNCTION_PROTOTYPE_APPLY: u32 = 11;
pub const ROUTING_FUNCTION_PROTOTYPE_BIND: u32 = 12;
pub const ROUTING_FUNCTION_PROTOTYPE_TO_STRING: u32 = 13;
pub const ROUTING_FUNCTION_CONSTRUCTOR: u32 = 14;

pub const ROUTING_ARRAY_CONSTRUCTOR: u32 = 20;
pub const ROUTING_ARRAY_PROTOTYPE_PUSH: u32 = 21;
pub const ROUTING_ARRAY_PROTOTYPE_POP: u32 = 22;
pub const ROUTING_ARRAY_PROTOTYPE_JOIN: u32 = 23;
pub const ROUTING_ARRAY_PROTOTYPE_SLICE: u32 = 24;
pub const ROUTING_ARRAY_PROTOTYPE_FOR_EACH: u32 = 25;
pub const ROUTING_ARRAY_PROTOTYPE_MAP: u32 = 26;
pub const ROUTING_ARRAY_PROTOTYPE_FILTER: u32 = 27;
pub const ROUTING_ARRAY_IS_ARRAY: u32 = 28;

pub const ROUTING_STRING_CONSTRUCTOR: u32 = 30;
pub const ROUTING_STRING_PROTOTYPE_TO_STRING: u32 = 31;
pub const ROUTING_STRING_PROTOTYPE_CHAR_AT: u32 = 32;
pub const ROUTING_STRING_PROTOTYPE_SLICE: u32 = 33;
pub const ROUTING_STRING_PROTOTYPE_INDEX_OF: u32 = 34;
pub const ROUTING_STRING_PROTOTYPE_CONCAT: u32 = 35;
pub const ROUTING_STRING_PROTOTYPE_TO_UPPER_CASE: u32 = 36;
pub const ROUTING_STRING_PROTOTYPE_TO_LOWER_CASE: u32 = 37;
pub const ROUTING_STRING_PROTOTYPE_TRIM: u32 = 38;

pub const ROUTING_NUMBER_CONSTRUCTOR: u32 = 40;
pub const ROUTING_NUMBER_PROTOTYPE_TO_STRING: u32 = 41;
pub const ROUTING_NUMBER_PROTOTYPE_VALUE_OF: u32 = 42;
pub const ROUTING_NUMBER_IS_INTEGER: u32 = 43;
pub const ROUTING_NUMBER_IS_FINITE: u32 = 44;
pub const ROUTING_NUMBER_IS_NAN: u32 = 45;
pub const ROUTING_NUMBER_PARSE_FLOAT: u32 = 46;
pub const ROUTING_NUMBER_PARSE_INT: u32 = 47;

pub const ROUTING_BOOLEAN_CONSTRUCTOR: u32 = 50;
pub const ROUTING_BOOLEAN_PROTOTYPE_TO_STRING: u32 = 51;
pub const ROUTING_BOOLEAN_PROTOTYPE_VALUE_OF: u32 = 52;

pub const ROUTING_PROMISE_CONSTRUCTOR: u32 = 60;
pub const ROUTING_PROMISE_PROTOTYPE_THEN: u32 = 61;
pub const ROUTING_PROMISE_PROTOTYPE_CATCH: u32 = 62;
pub const ROUTING_PROMISE_PROTOTYPE_FINALLY: u32 = 63;
pub const ROUTING_PROMISE_RESOLVE: u32 = 64;
pub const ROUTING_PROMISE_REJECT: u32 = 65;
pub const ROUTING_PROMISE_EXECUTOR_RESOLVE: u32 = 66;
pub const ROUTING_PROMISE_EXECUTOR_REJECT: u32 = 67;
pub const ROUTING_PROMISE_REACTION_JOB: u32 = 68;

#[cfg(feature = "math")]
pub const ROUTING_MATH_ABS: u32 = 80;
#[cfg(feature = "math")]
pub const ROUTING_MATH_FLOOR: u32 = 81;
#[cfg(feature = "math")]
pub const ROUTING_MATH_CEIL: u32 = 82;
#[cfg(feature = "math")]
pub const ROUTING_MATH_ROUND: u32 = 83;
#[cfg(feature = "math")]
pub const ROUTING_MATH_MAX: u32 = 84;
#[cfg(feature = "math")]
pub const ROUTING_MATH_MIN: u32 = 85;
#[cfg(feature = "math")]
pub const ROUTING_MATH_POW: u32 = 86;
#[cfg(feature = "math")]
pub const ROUTING_MATH_SQRT: u32 = 87;
#[cfg(feature = "math")]
pub const ROUTING_MATH_RANDOM: u32 = 88;

#[cfg(feature = "json")]
pub const ROUTING_JSON_PARSE: u32 = 90;
#[cfg(feature = "json")]
pub const ROUTING_JSON_STRINGIFY: u32 = 91;

#[cfg(feature = "regexp")]
pub const ROUTING_REGEXP_CONSTRUCTOR: u32 = 100;
#[cfg(feature = "regexp")]
pub const ROUTING_REGEXP_PROTOTYPE_TEST: u32 = 101;
#[cfg(feature = "regexp")]
pub const ROUTING_REGEXP_PROTOTYPE_EXEC: u32 = 102;

#[cfg(feature = "set")]
pub const ROUTING_MAP_CONSTRUCTOR: u32 = 110;
#[cfg(feature = "set")]
pub const ROUTING_MAP_PROTOTYPE_GET: u32 = 111;
#[cfg(feature = "set")]
pub const ROUTING_MAP_PROTOTYPE_SET: u32 = 112;
#[cfg(feature = "set")]
pub const ROUTING_MAP_PROTOTYPE_HAS: u32 = 113;
#[cfg(feature = "set")]
pub const ROUTING_MAP_PROTOTYPE_DELETE: u32 = 114;
#[cfg(feature = "set")]
pub const ROUTING_SET_CONSTRUCTOR: u32 = 115;
#[cfg(feature = "set")]
pub const ROUTING_SET_PROTOTYPE_ADD: u32 = 116;
#[cfg(feature = "set")]
pub const ROUTING_SET_PROTOTYPE_HAS: u32 = 117;
#[cfg(feature = "set")]
pub const ROUTING_SET_PROTOTYPE_DELETE: u32 = 118;

#[cfg(feature = "array-buffer")]
pub const ROUTING_ARRAY_BUFFER_CONSTRUCTOR: u32 = 120;
#[cfg(feature = "array-buffer")]
pub const ROUTING_ARRAY_BUFFER_PROTOTYPE_SLICE: u32 = 121;

#[cfg(feature = "array-buffer")]
pub const ROUTING_INT8_ARRAY_CONSTRUCTOR: u32 = 140;
#[cfg(feature = "array-buffer")]
pub const ROUTING_UINT8_ARRAY_CONSTRUCTOR: u32 = 141;
#[cfg(feature = "array-buffer")]
pub const ROUTING_UINT8_CLAMPED_ARRAY_CONSTRUCTOR: u32 = 142;
#[cfg(feature = "array-buffer")]
pub const ROUTING_INT16_ARRAY_CONSTRUCTOR: u32 = 143;
#[cfg(feature = "array-buffer")]
pub const ROUTING_UINT16_ARRAY_CONSTRUCTOR: u32 = 144;
#[cfg(feature = "array-buffer")]
pub const ROUTING_INT32_ARRAY_CONSTRUCTOR: u32 = 145;
#[cfg(feature = "array-buffer")]
pub const ROUTING_UINT32_ARRAY_CONSTRUCTOR: u32 = 146;
#[cfg(feature = "array-buffer")]
pub const ROUTING_FLOAT32_ARRAY_CONSTRUCTOR: u32 = 147;
#[cfg(feature = "array-buffer")]
pub const ROUTING_FLOAT64_ARRAY_CONSTRUCTOR: u32 = 148;
#[cfg(feature = "array-buffer")]
pub const ROUTING_TYPED_ARRAY_PROTOTYPE_SET: u32 = 149;
#[cfg(feature = "array-buffer")]
pub const ROUTING_TYPED_ARRAY_PROTOTYPE_SUBARRAY: u32 = 150;
#[cfg(feature = "array-buffer")]
pub const ROUTING_TYPED_ARRAY_PROTOTYPE_FILL: u32 = 151;

#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_CONSTRUCTOR: u32 = 160;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_INT8: u32 = 161;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_INT8: u32 = 162;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_UINT8: u32 = 163;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_UINT8: u32 = 164;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_INT16: u32 = 165;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_INT16: u32 = 166;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_UINT16: u32 = 167;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_UINT16: u32 = 168;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_INT32: u32 = 169;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_INT32: u32 = 170;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_UINT32: u32 = 171;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_UINT32: u32 = 172;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_FLOAT32: u32 = 173;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_FLOAT32: u32 = 174;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_GET_FLOAT64: u32 = 175;
#[cfg(feature = "array-buffer")]
pub const ROUTING_DATA_VIEW_SET_FLOAT64: u32 = 176;

#[cfg(feature = "date")]
pub const ROUTING_DATE_CONSTRUCTOR: u32 = 130;
#[cfg(feature = "date")]
pub const ROUTING_DATE_NOW: u32 = 131;
#[cfg(feature = "date")]
pub const ROUTING_DATE_PROTOTYPE_GET_TIME: u32 = 132;
#[cfg(feature = "date")]
pub const ROUTING_DATE_PROTOTYPE_TO_ISO_STRING: u32 = 133;

/// Dispatches a builtin call by its `routing_id`. `this`/`args` are already
/// ECMA-262 `[[Call]]`-normalized (no further `ToObject` coercion needed
/// here); each arm is free to call back into `abstract_operations` or
/// `crate::vm::call_function` for callbacks it receives as arguments.
pub fn dispatch(agent: &mut Context, routing_id: u32, this: Value, args: &[Value]) -> JsResult<Value> {
    match routing_id {
        ROUTING_ERROR_CONSTRUCTOR => error_constructor(agent, this, args),
        ROUTING_ERROR_PROTOTYPE_TO_STRING => error_prototype_to_string(agent, this),
        ROUTING_OBJECT_PROTOTYPE_TO_STRING => object_prototype_to_string(agent, this),
        ROUTING_OBJECT_PROTOTYPE_VALUE_OF => crate::abstract_operations::type_conversion::to_object(agent, this).map(Value::Object),
        ROUTING_OBJECT_PROTOTYPE_HAS_OWN_PROPERTY => object_prototype_has_own_property(agent, this, args),
        ROUTING_OBJECT_CONSTRUCTOR => object_constructor(agent, args),
        ROUTING_OBJECT_KEYS => object_keys(agent, args),
        ROUTING_OBJECT_VALUES => object_values(agent, args),
        ROUTING_OBJECT_ASSIGN => object_assign(agent, args),

        ROUTING_FUNCTION_PROTOTYPE_CALL => function_prototype_call(agent, this, args),
        ROUTING_FUNCTION_PROTOTYPE_APPLY => function_prototype_apply(agent, this, args),
        ROUTING_FUNCTION_PROTOTYPE_BIND => function_prototype_bind(agent, this, args),
        ROUTING_FUNCTION_PROTOTYPE_TO_STRING => function_prototype_to_string(agent, this),
        ROUTING_FUNCTION_CONSTRUCTOR => Err(JsError::throw(agent, ExceptionType::EvalError, "dynamic `new Function(...)` source compilation is not supported")),

        ROUTING_ARRAY_CONSTRUCTOR => {
            let realm = agent.current_realm_id();
            crate::builtins::array::array_constructor(agent, realm, args)
        }
        ROUTING_ARRAY_PROTOTYPE_PUSH => crate::builtins::array::prototype_push(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_POP => crate::builtins::array::prototype_pop(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_JOIN => crate::builtins::array::prototype_join(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_SLICE => crate::builtins::array::prototype_slice(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_FOR_EACH => crate::builtins::array::prototype_for_each(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_MAP => crate::builtins::array::prototype_map(agent, this, args),
        ROUTING_ARRAY_PROTOTYPE_FILTER => crate::builtins::array::prototype_filter(agent, this, args),
        ROUTING_ARRAY_IS_ARRAY => Ok(Value::Boolean(crate::builtins::array::is_array(agent, args.first().copied().unwrap_or(Value::Undefined)))),

        ROUTING_STRING_CONSTRUCTOR => crate::builtins::string::string_constructor(agent, args),
        ROUTING_STRING_PROTOTYPE_TO_STRING => crate::builtins::string::prototype_to_string(agent, this),
        ROUTING_STRING_PROTOTYPE_CHAR_AT => crate::builtins::string::prototype_char_at(agent, this, args),
        ROUTING_STRING_PROTOTYPE_SLICE => crate::builtins::string::prototype_slice(agent, this, args),
        ROUTING_STRING_PROTOTYPE_INDEX_OF => crate::builtins::string::prototype_index_of(agent, this, args),
        ROUTING_STRING_PROTOTYPE_CONCAT => crate::builtins::string::prototype_concat(agent, this, args),
        ROUTING_STRING_PROTOTYPE_TO_UPPER_CASE => crate::builtins::string::prototype_to_upper_case(agent, this),
        ROUTING_STRING_PROTOTYPE_TO_LOWER_CASE => crate::builtins::string::prototype_to_lower_case(agent, this),
        ROUTING_STRING_PROTOTYPE_TRIM => crate::builtins::string::prototype_trim(agent, this),

        ROUTING_NUMBER_CONSTRUCTOR => crate::builtins::number::number_constructor(agent, args),
        ROUTING_NUMBER_PROTOTYPE_TO_STRING => crate::builtins::number::prototype_to_string(agent, this, args),
        ROUTING_NUMBER_PROTOTYPE_VALUE_OF => crate::builtins::number::prototype_value_of(agent, this),
        ROUTING_NUMBER_IS_INTEGER => Ok(Value::Boolean(crate::builtins::number::is_integer(agent, args.first().copied().unwrap_or(Value::Undefined)))),
        ROUTING_NUMBER_IS_FINITE => Ok(Value::Boolean(crate::builtins::number::is_finite(agent, args.first().copied().unwrap_or(Value::Undefined)))),
        ROUTING_NUMBER_IS_NAN => Ok(Value::Boolean(crate::builtins::number::is_nan(agent, args.first().copied().unwrap_or(Value::Undefined)))),
        ROUTING_NUMBER_PARSE_FLOAT => crate::builtins::number::parse_float(agent, args),
        ROUTING_NUMBER_PARSE_INT => crate::builtins::number::parse_int(agent, args),

        ROUTING_BOOLEAN_CONSTRUCTOR => crate::builtins::boolean::boolean_constructor(agent, args),
        ROUTING_BOOLEAN_PROTOTYPE_TO_STRING => crate::builtins::boolean::prototype_to_string(agent, this),
        ROUTING_BOOLEAN_PROTOTYPE_VALUE_OF => crate::builtins::boolean::prototype_value_of(agent, this),

        ROUTING_PROMISE_CONSTRUCTOR => crate::builtins::promise::constructor(agent, args),
        ROUTING_PROMISE_PROTOTYPE_THEN => crate::builtins::promise::prototype_then(agent, this, args),
        ROUTING_PROMISE_PROTOTYPE_CATCH => crate::builtins::promise::prototype_catch(agent, this, args),
        ROUTING_PROMISE_PROTOTYPE_FINALLY => crate::builtins::promise::prototype_finally(agent, this, args),
        ROUTING_PROMISE_RESOLVE => crate::builtins::promise::static_resolve(agent, args),
        ROUTING_PROMISE_REJECT => crate::builtins::promise::static_reject(agent, args),
        ROUTING_PROMISE_EXECUTOR_RESOLVE => crate::builtins::promise::executor_resolve(agent, this, args),
        ROUTING_PROMISE_EXECUTOR_REJECT => crate::builtins::promise::executor_reject(agent, this, args),
        ROUTING_PROMISE_REACTION_JOB => crate::builtins::promise::reaction_job(agent, this, args),

        #[cfg(feature = "math")]
        ROUTING_MATH_ABS => crate::builtins::math::abs(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_FLOOR => crate::builtins::math::floor(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_CEIL => crate::builtins::math::ceil(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_ROUND => crate::builtins::math::round(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_MAX => crate::builtins::math::max(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_MIN => crate::builtins::math::min(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_POW => crate::builtins::math::pow(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_SQRT => crate::builtins::math::sqrt(agent, args),
        #[cfg(feature = "math")]
        ROUTING_MATH_RANDOM => Ok(crate::builtins::math::random(agent)),

        #[cfg(feature = "json")]
        ROUTING_JSON_PARSE => crate::builtins::json::parse(agent, args),
        #[cfg(feature = "json")]
        ROUTING_JSON_STRINGIFY => crate::builtins::json::stringify(agent, args),

        #[cfg(feature = "regexp")]
        ROUTING_REGEXP_CONSTRUCTOR => crate::builtins::regexp::constructor(agent, args),
        #[cfg(feature = "regexp")]
        ROUTING_REGEXP_PROTOTYPE_TEST => crate::builtins::regexp::prototype_test(agent, this, args),
        #[cfg(feature = "regexp")]
        ROUTING_REGEXP_PROTOTYPE_EXEC => crate::builtins::regexp::prototype_exec(agent, this, args),

        #[cfg(feature = "set")]
        ROUTING_MAP_CONSTRUCTOR => crate::builtins::map_set::map_constructor(agent, args),
        #[cfg(feature = "set")]
        ROUTING_MAP_PROTOTYPE_GET => crate::builtins::map_set::map_prototype_get(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_MAP_PROTOTYPE_SET => crate::builtins::map_set::map_prototype_set(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_MAP_PROTOTYPE_HAS => crate::builtins::map_set::map_prototype_has(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_MAP_PROTOTYPE_DELETE => crate::builtins::map_set::map_prototype_delete(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_SET_CONSTRUCTOR => crate::builtins::map_set::set_constructor(agent, args),
        #[cfg(feature = "set")]
        ROUTING_SET_PROTOTYPE_ADD => crate::builtins::map_set::set_prototype_add(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_SET_PROTOTYPE_HAS => crate::builtins::map_set::set_prototype_has(agent, this, args),
        #[cfg(feature = "set")]
        ROUTING_SET_PROTOTYPE_DELETE => crate::builtins::map_set::set_prototype_delete(agent, this, args),

        #[cfg(feature = "array-buffer")]
        ROUTING_ARRAY_BUFFER_CONSTRUCTOR => crate::builtins::array_buffer::constructor(agent, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_ARRAY_BUFFER_PROTOTYPE_SLICE => crate::builtins::array_buffer::prototype_slice(agent, this, args),

        #[cfg(feature = "array-buffer")]
        ROUTING_INT8_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Int8, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_UINT8_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Uint8, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_UINT8_CLAMPED_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Uint8Clamped, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_INT16_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Int16, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_UINT16_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Uint16, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_INT32_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Int32, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_UINT32_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Uint32, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_FLOAT32_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Float32, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_FLOAT64_ARRAY_CONSTRUCTOR => crate::builtins::typed_array::constructor(agent, crate::builtins::typed_array::TypedArrayKind::Float64, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_TYPED_ARRAY_PROTOTYPE_SET => crate::builtins::typed_array::prototype_set(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_TYPED_ARRAY_PROTOTYPE_SUBARRAY => crate::builtins::typed_array::prototype_subarray(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_TYPED_ARRAY_PROTOTYPE_FILL => crate::builtins::typed_array::prototype_fill(agent, this, args),

        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_CONSTRUCTOR => crate::builtins::data_view::constructor(agent, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_INT8 => crate::builtins::data_view::get_int8(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_INT8 => crate::builtins::data_view::set_int8(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_UINT8 => crate::builtins::data_view::get_uint8(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_UINT8 => crate::builtins::data_view::set_uint8(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_INT16 => crate::builtins::data_view::get_int16(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_INT16 => crate::builtins::data_view::set_int16(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_UINT16 => crate::builtins::data_view::get_uint16(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_UINT16 => crate::builtins::data_view::set_uint16(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_INT32 => crate::builtins::data_view::get_int32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_INT32 => crate::builtins::data_view::set_int32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_UINT32 => crate::builtins::data_view::get_uint32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_UINT32 => crate::builtins::data_view::set_uint32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_FLOAT32 => crate::builtins::data_view::get_float32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_FLOAT32 => crate::builtins::data_view::set_float32(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_GET_FLOAT64 => crate::builtins::data_view::get_float64(agent, this, args),
        #[cfg(feature = "array-buffer")]
        ROUTING_DATA_VIEW_SET_FLOAT64 => crate::builtins::data_view::set_float64(agent, this, args),

        #[cfg(feature = "date")]
        ROUTING_DATE_CONSTRUCTOR => crate::builtins::date::constructor(agent, args),
        #[cfg(feature = "date")]
        ROUTING_DATE_NOW => Ok(crate::builtins::date::now(agent)),
        #[cfg(feature = "date")]
        ROUTING_DATE_PROTOTYPE_GET_TIME => crate::builtins::date::prototype_get_time(agent, this),
        #[cfg(feature = "date")]
        ROUTING_DATE_PROTOTYPE_TO_ISO_STRING => crate::builtins::date::prototype_to_iso_string(agent, this),

        _ => unreachable!("builtin routing id {routing_id} has no dispatch entry"),
    }
}

/// `Error(message)` / `new Error(message)`: constructs a plain `Error`
/// object with `.message` set from the first argument, per ECMA-262
/// 20.5.1.1. The specific native-error subtype constructed is determined
/// by which `%*Error%` intrinsic the callee is — `install_constructors`
/// gives each subtype its own object, but they all route here, so we
/// fall back to plain `Error` rather than threading the callee through.
fn error_constructor(agent: &mut Context, _this: Value, args: &[Value]) -> JsResult<Value> {
    let message = match args.first().copied() {
        Some(value) if !value.is_undefined() => crate::abstract_operations::type_conversion::to_string(agent, value)?,
        _ => crate::types::language::JsString::EMPTY,
    };
    let mut scratch = std::string::String::new();
    let text = message.as_str_buffered(agent, &mut scratch).to_string();
    Ok(crate::builtins::error::create_native_error(agent, ExceptionType::Error, text))
}

fn error_prototype_to_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    let object = this.as_object().ok_or_else(|| JsError::type_error(agent, "Error.prototype.toString called on non-object"))?;
    let name_key = crate::types::language::object::PropertyKey::from_str(agent, "name");
    let message_key = crate::types::language::object::PropertyKey::from_str(agent, "message");
    let name = crate::abstract_operations::operations_on_objects::get(agent, object, name_key, this)?;
    let name = if name.is_undefined() {
        agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str("Error"))
    } else {
        crate::abstract_operations::type_conversion::to_string(agent, name)?
    };
    let message = crate::abstract_operations::operations_on_objects::get(agent, object, message_key, this)?;
    let message = if message.is_undefined() { crate::types::language::JsString::EMPTY } else { crate::abstract_operations::type_conversion::to_string(agent, message)? };
    let result = if name.is_empty_str(agent) {
        message
    } else if message.is_empty_str(agent) {
        name
    } else {
        let separator = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(": "));
        let with_separator = crate::types::language::JsString::concat(agent, name, separator);
        crate::types::language::JsString::concat(agent, with_separator, message)
    };
    Ok(result.into())
}

fn object_prototype_to_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    let tag = match this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Object(o) => {
            use crate::types::language::object::ObjectKind;
            match o.data(agent).kind {
                ObjectKind::Array => "Array",
                ObjectKind::Function | ObjectKind::BoundFunction => "Function",
                ObjectKind::Error => "Error",
                _ => "Object",
            }
        }
        _ => "Object",
    };
    let text = format!("[object {tag}]");
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text)).into())
}

fn object_prototype_has_own_property(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let object = crate::abstract_operations::type_conversion::to_object(agent, this)?;
    let key = crate::abstract_operations::type_conversion::to_property_key(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    Ok(Value::Boolean(object.data(agent).has_own_property(key)))
}

fn object_constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    match args.first().copied() {
        Some(value) if !value.is_nullish() => crate::abstract_operations::type_conversion::to_object(agent, value).map(Value::Object),
        _ => {
            let prototype = agent.realm(agent.current_realm_id()).intrinsics.get("%Object.prototype%");
            Ok(Value::Object(crate::builtins::ordinary::create(agent, prototype)))
        }
    }
}

fn object_keys(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    use crate::types::language::object::PropertyKey;
    let object = crate::abstract_operations::type_conversion::to_object(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    let own_keys = crate::abstract_operations::operations_on_objects::own_property_keys(agent, object);
    let mut values = Vec::new();
    for key in own_keys {
        if !matches!(key, PropertyKey::String(_) | PropertyKey::Index(_)) {
            continue;
        }
        if object.data(agent).get_own_property(key).is_some_and(|d| d.is_enumerable()) {
            values.push(property_key_display(agent, key));
        }
    }
    let realm = agent.current_realm_id();
    Ok(Value::Object(crate::builtins::array::create_array_from_elements(agent, realm, values)))
}

fn object_values(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let object = crate::abstract_operations::type_conversion::to_object(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    let keys = crate::abstract_operations::operations_on_objects::own_property_keys(agent, object);
    let mut values = Vec::new();
    for key in keys {
        if object.data(agent).get_own_property(key).is_some_and(|d| d.is_enumerable()) {
            values.push(crate::abstract_operations::operations_on_objects::get(agent, object, key, Value::Object(object))?);
        }
    }
    let realm = agent.current_realm_id();
    Ok(Value::Object(crate::builtins::array::create_array_from_elements(agent, realm, values)))
}

fn object_assign(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let target = crate::abstract_operations::type_conversion::to_object(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    for source in args.get(1..).unwrap_or(&[]) {
        if source.is_nullish() {
            continue;
        }
        let source_object = crate::abstract_operations::type_conversion::to_object(agent, *source)?;
        for key in crate::abstract_operations::operations_on_objects::own_property_keys(agent, source_object) {
            if source_object.data(agent).get_own_property(key).is_some_and(|d| d.is_enumerable()) {
                let value = crate::abstract_operations::operations_on_objects::get(agent, source_object, key, *source)?;
                crate::abstract_operations::operations_on_objects::set(agent, target, key, value, Value::Object(target))?;
            }
        }
    }
    Ok(Value::Object(target))
}

fn property_key_display(agent: &mut Context, key: crate::types::language::object::PropertyKey) -> Value {
    use crate::types::language::object::PropertyKey;
    match key {
        PropertyKey::String(s) => s.into(),
        PropertyKey::Index(i) => agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(i.to_string())).into(),
        PropertyKey::Symbol(s) => Value::Symbol(s),
    }
}

fn function_prototype_call(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let function = this.as_function().filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, this)).ok_or_else(|| JsError::type_error(agent, "Function.prototype.call called on non-callable"))?;
    let call_this = args.first().copied().unwrap_or(Value::Undefined);
    super::call_function(agent, function, call_this, args.get(1..).unwrap_or(&[]))
}

fn function_prototype_apply(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let function = this.as_function().filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, this)).ok_or_else(|| JsError::type_error(agent, "Function.prototype.apply called on non-callable"))?;
    let call_this = args.first().copied().unwrap_or(Value::Undefined);
    let array_like = args.get(1).copied().unwrap_or(Value::Undefined);
    let call_args = if array_like.is_nullish() { Vec::new() } else { crate::builtins::array::iterable_to_vec(agent, array_like)? };
    super::call_function(agent, function, call_this, &call_args)
}

fn function_prototype_bind(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let target = this.as_function().filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, this)).ok_or_else(|| JsError::type_error(agent, "Function.prototype.bind called on non-callable"))?;
    let bound_this = args.first().copied().unwrap_or(Value::Undefined);
    let bound_args = args.get(1..).unwrap_or(&[]).to_vec();
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Function.prototype%");
    let object = agent.heap.create_object(prototype, crate::types::language::object::ObjectKind::BoundFunction);
    object.data_mut(agent).auxiliary = Some(Box::new(crate::types::language::function::BoundFunctionData {
        target,
        bound_this,
        bound_args,
    }));
    Ok(crate::types::language::Function::from_object_unchecked(object).into())
}

fn function_prototype_to_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    let function = this.as_function().ok_or_else(|| JsError::type_error(agent, "Function.prototype.toString called on non-function"))?;
    let name_key = crate::types::language::object::PropertyKey::from_str(agent, "name");
    let name = crate::abstract_operations::operations_on_objects::get(agent, function.object(), name_key, this)?;
    let mut scratch = std::string::String::new();
    let name_str = name.as_js_string().map(|s| s.as_str_buffered(agent, &mut scratch).to_string()).unwrap_or_default();
    let text = format!("function {name_str}() {{ [native code] }}");
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text)).into())
}
