// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2 TypedArray Objects](https://tc39.es/ecma262/#sec-typedarray-objects)
//!
//! A typed array is a fixed-length, fixed-element-kind view onto an
//! `ArrayBuffer`'s bytes (`builtins::array_buffer`); it never owns its own
//! storage. Every concrete constructor (`Int8Array`, ..., `Float64Array`)
//! shares one `%TypedArray.prototype%` intrinsic for its non-indexed
//! methods and gets its own `.prototype` object beneath it, mirroring
//! `%Error%`'s native-error-subtype split in `builtins::error`. Indexed
//! element access (`ta[0]`, `ta[0] = 1`) is not a prototype method at all —
//! it's an exotic `[[Get]]`/`[[Set]]` hook dispatched by
//! `abstract_operations::operations_on_objects` on `ObjectKind::TypedArray`.
//!
//! Internal element storage is little-endian regardless of host byte
//! order, so behavior is deterministic across embedders; this is a
//! deliberate simplification (real engines use the platform's native
//! order) accepted because nothing in this engine crosses a byte-order
//! boundary with another process. `BigInt64Array`/`BigUint64Array` aren't
//! implemented (no BigInt-to-byte conversion path exists yet) — a
//! documented gap, not an oversight.

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::number::JsNumber;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

const ALL_KINDS: [TypedArrayKind; 9] = [
    TypedArrayKind::Int8,
    TypedArrayKind::Uint8,
    TypedArrayKind::Uint8Clamped,
    TypedArrayKind::Int16,
    TypedArrayKind::Uint16,
    TypedArrayKind::Int32,
    TypedArrayKind::Uint32,
    TypedArrayKind::Float32,
    TypedArrayKind::Float64,
];

impl TypedArrayKind {
    fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
        }
    }

    fn routing_id(self) -> u32 {
        match self {
            Self::Int8 => crate::vm::builtins::ROUTING_INT8_ARRAY_CONSTRUCTOR,
            Self::Uint8 => crate::vm::builtins::ROUTING_UINT8_ARRAY_CONSTRUCTOR,
            Self::Uint8Clamped => crate::vm::builtins::ROUTING_UINT8_CLAMPED_ARRAY_CONSTRUCTOR,
            Self::Int16 => crate::vm::builtins::ROUTING_INT16_ARRAY_CONSTRUCTOR,
            Self::Uint16 => crate::vm::builtins::ROUTING_UINT16_ARRAY_CONSTRUCTOR,
            Self::Int32 => crate::vm::builtins::ROUTING_INT32_ARRAY_CONSTRUCTOR,
            Self::Uint32 => crate::vm::builtins::ROUTING_UINT32_ARRAY_CONSTRUCTOR,
            Self::Float32 => crate::vm::builtins::ROUTING_FLOAT32_ARRAY_CONSTRUCTOR,
            Self::Float64 => crate::vm::builtins::ROUTING_FLOAT64_ARRAY_CONSTRUCTOR,
        }
    }
}

pub(crate) struct TypedArrayData {
    pub(crate) buffer: Object,
    pub(crate) byte_offset: usize,
    pub(crate) length: usize,
    pub(crate) kind: TypedArrayKind,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let object_prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let shared_prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%TypedArray.prototype%", Value::Object(shared_prototype));
    crate::builtins::ordinary::define_builtin_method(agent, shared_prototype, "set", crate::vm::builtins::ROUTING_TYPED_ARRAY_PROTOTYPE_SET, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, shared_prototype, "subarray", crate::vm::builtins::ROUTING_TYPED_ARRAY_PROTOTYPE_SUBARRAY, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, shared_prototype, "fill", crate::vm::builtins::ROUTING_TYPED_ARRAY_PROTOTYPE_FILL, 1, |_, _, _| unreachable!("routed"));

    for kind in ALL_KINDS {
        let prototype = agent.heap.create_object(Some(Value::Object(shared_prototype)), ObjectKind::Ordinary);
        let intrinsic_name: &'static str = match kind {
            TypedArrayKind::Int8 => "%Int8Array.prototype%",
            TypedArrayKind::Uint8 => "%Uint8Array.prototype%",
            TypedArrayKind::Uint8Clamped => "%Uint8ClampedArray.prototype%",
            TypedArrayKind::Int16 => "%Int16Array.prototype%",
            TypedArrayKind::Uint16 => "%Uint16Array.prototype%",
            TypedArrayKind::Int32 => "%Int32Array.prototype%",
            TypedArrayKind::Uint32 => "%Uint32Array.prototype%",
            TypedArrayKind::Float32 => "%Float32Array.prototype%",
            TypedArrayKind::Float64 => "%Float64Array.prototype%",
        };
        agent.realm_mut(realm).intrinsics.set(intrinsic_name, Value::Object(prototype));

        let constructor = crate::builtins::ordinary::create_builtin_function(agent, kind.routing_id(), kind.name(), 1);
        let prototype_key = PropertyKey::from_str(agent, "prototype");
        constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data {
            value: Value::Object(prototype),
            attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false },
        });
        let bytes_per_element_key = PropertyKey::from_str(agent, "BYTES_PER_ELEMENT");
        let bytes_per_element = JsNumber::from_f64(agent, kind.element_size() as f64);
        let non_configurable = PropertyAttributes { writable: false, enumerable: false, configurable: false };
        constructor.object().data_mut(agent).define_property(bytes_per_element_key, PropertyDescriptor::Data { value: bytes_per_element.into(), attributes: non_configurable });
        prototype.data_mut(agent).define_property(bytes_per_element_key, PropertyDescriptor::Data { value: bytes_per_element.into(), attributes: non_configurable });

        let key = PropertyKey::from_str(agent, kind.name());
        crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
    }
}

fn this_typed_array(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::TypedArray)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-TypedArray receiver"))
}

fn data(agent: &Context, typed_array: Object) -> &TypedArrayData {
    typed_array.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<TypedArrayData>()).expect("TypedArray object missing TypedArrayData")
}

/// Used by `own_property_keys` to enumerate the integer-indexed exotic keys
/// (ECMA-262 10.4.5.12) ahead of the view's own string/symbol properties.
pub(crate) fn length(agent: &Context, typed_array: Object) -> u32 {
    data(agent, typed_array).length as u32
}

fn define_view_properties(agent: &mut Context, object: Object, buffer: Object, byte_offset: usize, length: usize, kind: TypedArrayKind) {
    let non_writable = PropertyAttributes { writable: false, enumerable: false, configurable: true };
    let buffer_key = PropertyKey::from_str(agent, "buffer");
    object.data_mut(agent).define_property(buffer_key, PropertyDescriptor::Data { value: Value::Object(buffer), attributes: non_writable });
    let byte_offset_key = PropertyKey::from_str(agent, "byteOffset");
    let byte_offset_value = JsNumber::from_f64(agent, byte_offset as f64);
    object.data_mut(agent).define_property(byte_offset_key, PropertyDescriptor::Data { value: byte_offset_value.into(), attributes: non_writable });
    let byte_length_key = PropertyKey::from_str(agent, "byteLength");
    let byte_length_value = JsNumber::from_f64(agent, (length * kind.element_size()) as f64);
    object.data_mut(agent).define_property(byte_length_key, PropertyDescriptor::Data { value: byte_length_value.into(), attributes: non_writable });
    let length_key = PropertyKey::from_str(agent, "length");
    let length_value = JsNumber::from_f64(agent, length as f64);
    object.data_mut(agent).define_property(length_key, PropertyDescriptor::Data { value: length_value.into(), attributes: non_writable });
}

fn new_typed_array(agent: &mut Context, kind: TypedArrayKind, buffer: Object, byte_offset: usize, length: usize) -> Object {
    let realm = agent.current_realm_id();
    let intrinsic_name: &'static str = match kind {
        TypedArrayKind::Int8 => "%Int8Array.prototype%",
        TypedArrayKind::Uint8 => "%Uint8Array.prototype%",
        TypedArrayKind::Uint8Clamped => "%Uint8ClampedArray.prototype%",
        TypedArrayKind::Int16 => "%Int16Array.prototype%",
        TypedArrayKind::Uint16 => "%Uint16Array.prototype%",
        TypedArrayKind::Int32 => "%Int32Array.prototype%",
        TypedArrayKind::Uint32 => "%Uint32Array.prototype%",
        TypedArrayKind::Float32 => "%Float32Array.prototype%",
        TypedArrayKind::Float64 => "%Float64Array.prototype%",
    };
    let prototype = agent.realm(realm).intrinsics.get(intrinsic_name);
    let object = agent.heap.create_object(prototype, ObjectKind::TypedArray);
    object.data_mut(agent).auxiliary = Some(Box::new(TypedArrayData { buffer, byte_offset, length, kind }));
    define_view_properties(agent, object, buffer, byte_offset, length, kind);
    object
}

/// `new Int8Array(length)` / `new Int8Array(buffer[, byteOffset[, length]])`
/// / `new Int8Array(arrayLike)`, per ECMA-262 23.2.5.1's overload set.
pub(crate) fn constructor(agent: &mut Context, kind: TypedArrayKind, args: &[Value]) -> JsResult<Value> {
    let first = args.first().copied().unwrap_or(Value::Undefined);
    if crate::builtins::array_buffer::is_array_buffer(agent, first) {
        let buffer = first.as_object().unwrap();
        let element_size = kind.element_size();
        let byte_offset = match args.get(1).copied().filter(|v| !v.is_undefined()) {
            Some(v) => crate::abstract_operations::type_conversion::to_length(agent, v)?,
            None => 0,
        };
        if byte_offset % element_size != 0 {
            return Err(JsError::range_error(agent, "start offset is not aligned to the element size"));
        }
        let buffer_byte_length = crate::builtins::array_buffer::byte_length(agent, buffer);
        if byte_offset > buffer_byte_length {
            return Err(JsError::range_error(agent, "start offset is out of bounds"));
        }
        let remaining = buffer_byte_length - byte_offset;
        let length = match args.get(2).copied().filter(|v| !v.is_undefined()) {
            Some(v) => crate::abstract_operations::type_conversion::to_length(agent, v)?,
            None => {
                if remaining % element_size != 0 {
                    return Err(JsError::range_error(agent, "buffer length minus the byte offset is not a multiple of the element size"));
                }
                remaining / element_size
            }
        };
        if byte_offset + length * element_size > buffer_byte_length {
            return Err(JsError::range_error(agent, "byte offset and length exceed the bounds of the buffer"));
        }
        return Ok(Value::Object(new_typed_array(agent, kind, buffer, byte_offset, length)));
    }

    if let Value::Undefined | Value::Null = first {
        return Ok(Value::Object(new_typed_array(agent, kind, crate::builtins::array_buffer::create_buffer(agent, 0), 0, 0)));
    }
    if first.is_object() && first.as_object().is_some_and(|o| o.data(agent).kind == ObjectKind::TypedArray) {
        let source = first.as_object().unwrap();
        let source_length = data(agent, source).length;
        let mut values = Vec::with_capacity(source_length);
        for i in 0..source_length {
            values.push(get_element(agent, source, i as u32).unwrap_or(Value::Undefined));
        }
        return Ok(Value::Object(from_elements(agent, kind, &values)?));
    }
    if first.is_object() {
        let values = crate::builtins::array::iterable_to_vec(agent, first)?;
        return Ok(Value::Object(from_elements(agent, kind, &values)?));
    }

    let length = crate::abstract_operations::type_conversion::to_length(agent, first)?;
    let buffer = crate::builtins::array_buffer::create_buffer(agent, length * kind.element_size());
    Ok(Value::Object(new_typed_array(agent, kind, buffer, 0, length)))
}

fn from_elements(agent: &mut Context, kind: TypedArrayKind, values: &[Value]) -> JsResult<Object> {
    let buffer = crate::builtins::array_buffer::create_buffer(agent, values.len() * kind.element_size());
    let array = new_typed_array(agent, kind, buffer, 0, values.len());
    for (i, value) in values.iter().enumerate() {
        set_element(agent, array, i as u32, *value)?;
    }
    Ok(array)
}

/// The exotic `[[Get]]` integer-indexed override (ECMA-262 10.4.5.8): an
/// out-of-bounds index is simply not an own property (no prototype
/// fallback for a canonical numeric index on a typed array).
pub(crate) fn get_element(agent: &mut Context, typed_array: Object, index: u32) -> Option<Value> {
    let d = data(agent, typed_array);
    if index as usize >= d.length {
        return None;
    }
    let element_size = d.kind.element_size();
    let start = d.byte_offset + index as usize * element_size;
    let kind = d.kind;
    let buffer = d.buffer;
    let mut scratch = [0u8; 8];
    scratch[..element_size].copy_from_slice(&crate::builtins::array_buffer::bytes(agent, buffer)[start..start + element_size]);
    Some(read_element(agent, &scratch[..element_size], kind))
}

pub(crate) fn has_element(agent: &Context, typed_array: Object, index: u32) -> bool {
    (index as usize) < data(agent, typed_array).length
}

/// The exotic `[[Set]]` override. `value` is still converted with
/// `ToNumber` for an out-of-bounds index (observable coercion side
/// effects), the write itself is just dropped.
pub(crate) fn set_element(agent: &mut Context, typed_array: Object, index: u32, value: Value) -> JsResult<bool> {
    let n = crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent);
    let d = data(agent, typed_array);
    if index as usize >= d.length {
        return Ok(true);
    }
    let element_size = d.kind.element_size();
    let start = d.byte_offset + index as usize * element_size;
    let kind = d.kind;
    let buffer = d.buffer;
    let bytes = crate::builtins::array_buffer::bytes_mut(agent, buffer);
    write_element(&mut bytes[start..start + element_size], kind, n);
    Ok(true)
}

fn read_element(agent: &mut Context, bytes: &[u8], kind: TypedArrayKind) -> Value {
    let n = match kind {
        TypedArrayKind::Int8 => bytes[0] as i8 as f64,
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => bytes[0] as f64,
        TypedArrayKind::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        TypedArrayKind::Uint16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        TypedArrayKind::Int32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        TypedArrayKind::Uint32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        TypedArrayKind::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        TypedArrayKind::Float64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            f64::from_le_bytes(buf)
        }
    };
    JsNumber::from_f64(agent, n).into()
}

fn write_element(out: &mut [u8], kind: TypedArrayKind, n: f64) {
    match kind {
        TypedArrayKind::Int8 => out[0] = crate::abstract_operations::type_conversion::to_int32_from_f64(n) as i8 as u8,
        TypedArrayKind::Uint8 => out[0] = crate::abstract_operations::type_conversion::to_int32_from_f64(n) as u8,
        TypedArrayKind::Uint8Clamped => out[0] = to_uint8_clamped(n),
        TypedArrayKind::Int16 => out.copy_from_slice(&(crate::abstract_operations::type_conversion::to_int32_from_f64(n) as i16).to_le_bytes()),
        TypedArrayKind::Uint16 => out.copy_from_slice(&(crate::abstract_operations::type_conversion::to_int32_from_f64(n) as u16).to_le_bytes()),
        TypedArrayKind::Int32 => out.copy_from_slice(&crate::abstract_operations::type_conversion::to_int32_from_f64(n).to_le_bytes()),
        TypedArrayKind::Uint32 => out.copy_from_slice(&to_uint32_bits(n).to_le_bytes()),
        TypedArrayKind::Float32 => out.copy_from_slice(&(n as f32).to_le_bytes()),
        TypedArrayKind::Float64 => out.copy_from_slice(&n.to_le_bytes()),
    }
}

fn to_uint32_bits(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4294967296.0) as u32
}

/// `ToUint8Clamp` (ECMA-262 7.1.11): clamps to `[0, 255]`, rounding
/// halfway values to the nearest even integer.
fn to_uint8_clamped(n: f64) -> u8 {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    if n >= 255.0 {
        return 255;
    }
    let floor = n.floor();
    let diff = n - floor;
    let rounded = if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    };
    rounded as u8
}

pub fn prototype_set(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let target = this_typed_array(agent, this)?;
    let source = args.first().copied().unwrap_or(Value::Undefined);
    let offset = match args.get(1).copied().filter(|v| !v.is_undefined()) {
        Some(v) => crate::abstract_operations::type_conversion::to_length(agent, v)?,
        None => 0,
    };
    let values = if source.as_object().is_some_and(|o| o.data(agent).kind == ObjectKind::TypedArray) {
        let source = source.as_object().unwrap();
        let length = data(agent, source).length;
        (0..length).map(|i| get_element(agent, source, i as u32).unwrap_or(Value::Undefined)).collect::<Vec<_>>()
    } else {
        crate::builtins::array::iterable_to_vec(agent, source)?
    };
    let target_length = data(agent, target).length;
    if offset + values.len() > target_length {
        return Err(JsError::range_error(agent, "source is too large for the target typed array starting at the given offset"));
    }
    for (i, value) in values.into_iter().enumerate() {
        set_element(agent, target, (offset + i) as u32, value)?;
    }
    Ok(Value::Undefined)
}

pub fn prototype_subarray(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let source = this_typed_array(agent, this)?;
    let d = data(agent, source);
    let (kind, buffer, byte_offset, length) = (d.kind, d.buffer, d.byte_offset, d.length as i64);
    let start = relative_index(agent, args.first().copied(), length, 0)?;
    let end = relative_index(agent, args.get(1).copied(), length, length)?;
    let new_length = (end - start).max(0) as usize;
    let element_size = kind.element_size();
    let new_byte_offset = byte_offset + start as usize * element_size;
    Ok(Value::Object(new_typed_array(agent, kind, buffer, new_byte_offset, new_length)))
}

pub fn prototype_fill(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let target = this_typed_array(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    let length = data(agent, target).length as i64;
    let start = relative_index(agent, args.get(1).copied(), length, 0)?;
    let end = relative_index(agent, args.get(2).copied(), length, length)?;
    for i in start..end {
        set_element(agent, target, i as u32, value)?;
    }
    Ok(this)
}

fn relative_index(agent: &mut Context, value: Option<Value>, length: i64, default: i64) -> JsResult<i64> {
    let Some(value) = value.filter(|v| !v.is_undefined()) else { return Ok(default) };
    let n = crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent);
    let n = if n.is_nan() { 0.0 } else { n.trunc() } as i64;
    Ok(if n < 0 { (length + n).max(0) } else { n.min(length) })
}
