// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.3 DataView Objects](https://tc39.es/ecma262/#sec-dataview-objects)
//!
//! A `DataView` is a raw `byte_offset`/`byte_length` window onto an
//! `ArrayBuffer` (`builtins::array_buffer`) with no element-kind
//! alignment requirement, read through explicit `getXxx`/`setXxx` methods
//! that each take their own endianness flag — unlike `builtins::typed_array`,
//! where the element kind is fixed at construction and endianness is an
//! internal implementation detail.

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::number::JsNumber;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

struct DataViewData {
    buffer: Object,
    byte_offset: usize,
    byte_length: usize,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let object_prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%DataView.prototype%", Value::Object(prototype));

    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_DATA_VIEW_CONSTRUCTOR, "DataView", 1);
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data {
        value: Value::Object(prototype),
        attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false },
    });

    use crate::vm::builtins as routing;
    let methods: [(&'static str, u32, u8); 16] = [
        ("getInt8", routing::ROUTING_DATA_VIEW_GET_INT8, 1),
        ("setInt8", routing::ROUTING_DATA_VIEW_SET_INT8, 2),
        ("getUint8", routing::ROUTING_DATA_VIEW_GET_UINT8, 1),
        ("setUint8", routing::ROUTING_DATA_VIEW_SET_UINT8, 2),
        ("getInt16", routing::ROUTING_DATA_VIEW_GET_INT16, 1),
        ("setInt16", routing::ROUTING_DATA_VIEW_SET_INT16, 2),
        ("getUint16", routing::ROUTING_DATA_VIEW_GET_UINT16, 1),
        ("setUint16", routing::ROUTING_DATA_VIEW_SET_UINT16, 2),
        ("getInt32", routing::ROUTING_DATA_VIEW_GET_INT32, 1),
        ("setInt32", routing::ROUTING_DATA_VIEW_SET_INT32, 2),
        ("getUint32", routing::ROUTING_DATA_VIEW_GET_UINT32, 1),
        ("setUint32", routing::ROUTING_DATA_VIEW_SET_UINT32, 2),
        ("getFloat32", routing::ROUTING_DATA_VIEW_GET_FLOAT32, 1),
        ("setFloat32", routing::ROUTING_DATA_VIEW_SET_FLOAT32, 2),
        ("getFloat64", routing::ROUTING_DATA_VIEW_GET_FLOAT64, 1),
        ("setFloat64", routing::ROUTING_DATA_VIEW_SET_FLOAT64, 2),
    ];
    for (name, routing_id, length) in methods {
        crate::builtins::ordinary::define_builtin_method(agent, prototype, name, routing_id, length, |_, _, _| unreachable!("routed"));
    }

    let key = PropertyKey::from_str(agent, "DataView");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

fn this_data_view(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::DataView)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-DataView receiver"))
}

fn data(agent: &Context, view: Object) -> &DataViewData {
    view.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<DataViewData>()).expect("DataView object missing DataViewData")
}

pub fn constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let buffer_value = args.first().copied().unwrap_or(Value::Undefined);
    if !crate::builtins::array_buffer::is_array_buffer(agent, buffer_value) {
        return Err(JsError::type_error(agent, "DataView constructor requires an ArrayBuffer"));
    }
    let buffer = buffer_value.as_object().unwrap();
    let buffer_byte_length = crate::builtins::array_buffer::byte_length(agent, buffer);
    let byte_offset = match args.get(1).copied().filter(|v| !v.is_undefined()) {
        Some(v) => crate::abstract_operations::type_conversion::to_length(agent, v)?,
        None => 0,
    };
    if byte_offset > buffer_byte_length {
        return Err(JsError::range_error(agent, "start offset is out of bounds"));
    }
    let byte_length = match args.get(2).copied().filter(|v| !v.is_undefined()) {
        Some(v) => crate::abstract_operations::type_conversion::to_length(agent, v)?,
        None => buffer_byte_length - byte_offset,
    };
    if byte_offset + byte_length > buffer_byte_length {
        return Err(JsError::range_error(agent, "byte offset and length exceed the bounds of the buffer"));
    }

    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%DataView.prototype%");
    let object = agent.heap.create_object(prototype, ObjectKind::DataView);
    object.data_mut(agent).auxiliary = Some(Box::new(DataViewData { buffer, byte_offset, byte_length }));

    let non_writable = PropertyAttributes { writable: false, enumerable: false, configurable: true };
    let buffer_key = PropertyKey::from_str(agent, "buffer");
    object.data_mut(agent).define_property(buffer_key, PropertyDescriptor::Data { value: Value::Object(buffer), attributes: non_writable });
    let byte_offset_key = PropertyKey::from_str(agent, "byteOffset");
    let byte_offset_value = JsNumber::from_f64(agent, byte_offset as f64);
    object.data_mut(agent).define_property(byte_offset_key, PropertyDescriptor::Data { value: byte_offset_value.into(), attributes: non_writable });
    let byte_length_key = PropertyKey::from_str(agent, "byteLength");
    let byte_length_value = JsNumber::from_f64(agent, byte_length as f64);
    object.data_mut(agent).define_property(byte_length_key, PropertyDescriptor::Data { value: byte_length_value.into(), attributes: non_writable });

    Ok(Value::Object(object))
}

fn checked_range(agent: &mut Context, view: Object, byte_offset_arg: Value, element_size: usize) -> JsResult<(Object, usize)> {
    let requested_offset = crate::abstract_operations::type_conversion::to_length(agent, byte_offset_arg)?;
    let d = data(agent, view);
    if requested_offset + element_size > d.byte_length {
        return Err(JsError::range_error(agent, "offset is out of bounds"));
    }
    Ok((d.buffer, d.byte_offset + requested_offset))
}

fn is_little_endian(agent: &mut Context, value: Option<Value>) -> bool {
    value.is_some_and(|v| crate::abstract_operations::type_conversion::to_boolean(agent, v))
}

macro_rules! data_view_get {
    ($name:ident, $ty:ty, $size:expr) => {
        pub fn $name(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
            let view = this_data_view(agent, this)?;
            let offset_arg = args.first().copied().unwrap_or(Value::Undefined);
            let (buffer, start) = checked_range(agent, view, offset_arg, $size)?;
            let little_endian = is_little_endian(agent, args.get(1).copied());
            let bytes = crate::builtins::array_buffer::bytes(agent, buffer);
            let mut buf = [0u8; $size];
            buf.copy_from_slice(&bytes[start..start + $size]);
            let value = if little_endian { <$ty>::from_le_bytes(buf) } else { <$ty>::from_be_bytes(buf) };
            Ok(JsNumber::from_f64(agent, value as f64).into())
        }
    };
}

/// `ToInt32` wraps modulo 2^32, then truncating that to a narrower integer
/// type also truncates correctly (int-to-int `as` casts truncate bits; it's
/// only a float-to-int `as` cast that saturates instead of wrapping in
/// Rust, which is why the `ToNumber` result is routed through this first).
fn wrap_i32(n: f64) -> i32 {
    crate::abstract_operations::type_conversion::to_int32_from_f64(n)
}

fn wrap_u32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4294967296.0) as u32
}

macro_rules! data_view_set_int {
    ($name:ident, $ty:ty, $size:expr, $wrap:expr) => {
        pub fn $name(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
            let view = this_data_view(agent, this)?;
            let offset_arg = args.first().copied().unwrap_or(Value::Undefined);
            let value_arg = args.get(1).copied().unwrap_or(Value::Undefined);
            let n = crate::abstract_operations::type_conversion::to_number(agent, value_arg)?.value(agent);
            let (buffer, start) = checked_range(agent, view, offset_arg, $size)?;
            let little_endian = is_little_endian(agent, args.get(2).copied());
            let casted = ($wrap)(n) as $ty;
            let bytes = if little_endian { casted.to_le_bytes() } else { casted.to_be_bytes() };
            crate::builtins::array_buffer::bytes_mut(agent, buffer)[start..start + $size].copy_from_slice(&bytes);
            Ok(Value::Undefined)
        }
    };
}

macro_rules! data_view_set_float {
    ($name:ident, $ty:ty, $size:expr) => {
        pub fn $name(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
            let view = this_data_view(agent, this)?;
            let offset_arg = args.first().copied().unwrap_or(Value::Undefined);
            let value_arg = args.get(1).copied().unwrap_or(Value::Undefined);
            let n = crate::abstract_operations::type_conversion::to_number(agent, value_arg)?.value(agent);
            let (buffer, start) = checked_range(agent, view, offset_arg, $size)?;
            let little_endian = is_little_endian(agent, args.get(2).copied());
            let casted = n as $ty;
            let bytes = if little_endian { casted.to_le_bytes() } else { casted.to_be_bytes() };
            crate::builtins::array_buffer::bytes_mut(agent, buffer)[start..start + $size].copy_from_slice(&bytes);
            Ok(Value::Undefined)
        }
    };
}

data_view_get!(get_int8, i8, 1);
data_view_get!(get_uint8, u8, 1);
data_view_get!(get_int16, i16, 2);
data_view_get!(get_uint16, u16, 2);
data_view_get!(get_int32, i32, 4);
data_view_get!(get_uint32, u32, 4);
data_view_get!(get_float32, f32, 4);
data_view_get!(get_float64, f64, 8);

data_view_set_int!(set_int8, i8, 1, wrap_i32);
data_view_set_int!(set_uint8, u8, 1, wrap_i32);
data_view_set_int!(set_int16, i16, 2, wrap_i32);
data_view_set_int!(set_uint16, u16, 2, wrap_i32);
data_view_set_int!(set_int32, i32, 4, wrap_i32);
data_view_set_int!(set_uint32, u32, 4, wrap_u32);
data_view_set_float!(set_float32, f32, 4);
data_view_set_float!(set_float64, f64, 8);
