// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.1 ArrayBuffer Objects](https://tc39.es/ecma262/#sec-arraybuffer-objects)
//!
//! A fixed-length byte buffer. Views onto it (`TypedArray` in
//! `builtins::typed_array`, `DataView` in `builtins::data_view`) hold a
//! `byte_offset`/`length` pair into the same arena object rather than
//! copying its bytes, so writes through one view are visible through
//! another — matched by borrowing `bytes`/`bytes_mut` here instead of each
//! view keeping its own copy. Resizable buffers and `transfer`/detachment
//! aren't implemented (no embedder needs buffer transfer without worker
//! threads, and this engine is single-threaded per `spec.md` §1).

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

pub(crate) struct ArrayBufferData {
    bytes: Vec<u8>,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let object_prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%ArrayBuffer.prototype%", Value::Object(prototype));

    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_ARRAY_BUFFER_CONSTRUCTOR, "ArrayBuffer", 1);
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data { value: Value::Object(prototype), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } });
    crate::builtins::ordinary::define_builtin_method(agent, prototype, "slice", crate::vm::builtins::ROUTING_ARRAY_BUFFER_PROTOTYPE_SLICE, 2, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "ArrayBuffer");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

fn this_array_buffer(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::ArrayBuffer)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-ArrayBuffer receiver"))
}

fn data(agent: &Context, buffer: Object) -> &ArrayBufferData {
    buffer.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<ArrayBufferData>()).expect("ArrayBuffer object missing ArrayBufferData")
}

/// Used by `typed_array`/`data_view` to validate a `buffer` constructor
/// argument before computing a view's `byte_offset`/`length` against it.
pub(crate) fn is_array_buffer(agent: &Context, value: Value) -> bool {
    value.as_object().is_some_and(|o| o.data(agent).kind == ObjectKind::ArrayBuffer)
}

pub(crate) fn byte_length(agent: &Context, buffer: Object) -> usize {
    data(agent, buffer).bytes.len()
}

pub(crate) fn bytes(agent: &Context, buffer: Object) -> &[u8] {
    &data(agent, buffer).bytes
}

pub(crate) fn bytes_mut(agent: &mut Context, buffer: Object) -> &mut [u8] {
    &mut buffer.data_mut(agent).auxiliary.as_mut().and_then(|a| a.downcast_mut::<ArrayBufferData>()).expect("ArrayBuffer object missing ArrayBufferData").bytes
}

fn byte_length_property(agent: &mut Context, buffer: Object, length: usize) {
    let key = PropertyKey::from_str(agent, "byteLength");
    let value = crate::types::language::number::JsNumber::from_f64(agent, length as f64);
    buffer.data_mut(agent).define_property(key, PropertyDescriptor::Data { value: value.into(), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: true } });
}

/// Allocates a zeroed `ArrayBuffer` of `length` bytes, used directly by
/// `typed_array::constructor` when a typed array is constructed from a
/// length rather than handed an existing buffer.
pub(crate) fn create_buffer(agent: &mut Context, length: usize) -> Object {
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%ArrayBuffer.prototype%");
    let buffer = agent.heap.create_object(prototype, ObjectKind::ArrayBuffer);
    buffer.data_mut(agent).auxiliary = Some(Box::new(ArrayBufferData { bytes: vec![0u8; length] }));
    byte_length_property(agent, buffer, length);
    buffer
}

pub fn constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let length_value = args.first().copied().unwrap_or(Value::Undefined);
    let length = crate::abstract_operations::type_conversion::to_length(agent, length_value)?;
    Ok(Value::Object(create_buffer(agent, length)))
}

pub fn prototype_slice(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let buffer = this_array_buffer(agent, this)?;
    let length = data(agent, buffer).bytes.len() as i64;
    let start = relative_index(agent, args.first().copied(), length, 0)?;
    let end = relative_index(agent, args.get(1).copied(), length, length)?;
    let new_length = (end - start).max(0) as usize;
    let slice = data(agent, buffer).bytes[start as usize..(start as usize + new_length)].to_vec();

    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%ArrayBuffer.prototype%");
    let out = agent.heap.create_object(prototype, ObjectKind::ArrayBuffer);
    out.data_mut(agent).auxiliary = Some(Box::new(ArrayBufferData { bytes: slice }));
    byte_length_property(agent, out, new_length);
    Ok(Value::Object(out))
}

fn relative_index(agent: &mut Context, value: Option<Value>, length: i64, default: i64) -> JsResult<i64> {
    let Some(value) = value.filter(|v| !v.is_undefined()) else { return Ok(default) };
    let n = crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent);
    let n = if n.is_nan() { 0.0 } else { n.trunc() } as i64;
    Ok(if n < 0 { (length + n).max(0) } else { n.min(length) })
}
