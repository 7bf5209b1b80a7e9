// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [24.1-24.2 Map and Set Objects](https://tc39.es/ecma262/#sec-map-objects)
//!
//! Both are backed by an insertion-ordered `Vec`, scanned with
//! `SameValueZero` (24.1.3.1 `CanonicalizeKeyedCollectionKey`'s
//! equality) rather than `AHashMap`: `Value`'s heap-string/heap-number
//! variants don't hash to the same bucket for values `SameValueZero`
//! considers equal (e.g. two separately-boxed `NaN`s), and these
//! collections are not expected to hold enough entries for O(n) lookup to
//! matter (`spec.md` open question, resolved in DESIGN.md).

use crate::abstract_operations::testing_and_comparison::same_value_zero;
use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

#[derive(Debug, Default)]
struct MapData {
    entries: Vec<(Value, Value)>,
}

#[derive(Debug, Default)]
struct SetData {
    entries: Vec<Value>,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let object_prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let map_prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%Map.prototype%", Value::Object(map_prototype));
    let set_prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%Set.prototype%", Value::Object(set_prototype));

    let map_constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_MAP_CONSTRUCTOR, "Map", 0);
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    map_constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data { value: Value::Object(map_prototype), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } });
    crate::builtins::ordinary::define_builtin_method(agent, map_prototype, "get", crate::vm::builtins::ROUTING_MAP_PROTOTYPE_GET, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, map_prototype, "set", crate::vm::builtins::ROUTING_MAP_PROTOTYPE_SET, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, map_prototype, "has", crate::vm::builtins::ROUTING_MAP_PROTOTYPE_HAS, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, map_prototype, "delete", crate::vm::builtins::ROUTING_MAP_PROTOTYPE_DELETE, 1, |_, _, _| unreachable!("routed"));
    let map_key = PropertyKey::from_str(agent, "Map");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, map_key, map_constructor.into());

    let set_constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_SET_CONSTRUCTOR, "Set", 0);
    set_constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data { value: Value::Object(set_prototype), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } });
    crate::builtins::ordinary::define_builtin_method(agent, set_prototype, "add", crate::vm::builtins::ROUTING_SET_PROTOTYPE_ADD, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, set_prototype, "has", crate::vm::builtins::ROUTING_SET_PROTOTYPE_HAS, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, set_prototype, "delete", crate::vm::builtins::ROUTING_SET_PROTOTYPE_DELETE, 1, |_, _, _| unreachable!("routed"));
    let set_key = PropertyKey::from_str(agent, "Set");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, set_key, set_constructor.into());
}

fn this_map(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::Map)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-Map receiver"))
}

fn this_set(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::Set)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-Set receiver"))
}

fn map_data(agent: &Context, map: Object) -> &MapData {
    map.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<MapData>()).expect("Map object missing MapData")
}

fn map_data_mut(agent: &mut Context, map: Object) -> &mut MapData {
    map.data_mut(agent).auxiliary.as_mut().and_then(|a| a.downcast_mut::<MapData>()).expect("Map object missing MapData")
}

fn set_data(agent: &Context, set: Object) -> &SetData {
    set.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<SetData>()).expect("Set object missing SetData")
}

fn set_data_mut(agent: &mut Context, set: Object) -> &mut SetData {
    set.data_mut(agent).auxiliary.as_mut().and_then(|a| a.downcast_mut::<SetData>()).expect("Set object missing SetData")
}

fn set_size(agent: &mut Context, object: Object, size: usize) {
    let key = PropertyKey::from_str(agent, "size");
    let value = crate::types::language::number::JsNumber::from_f64(agent, size as f64);
    object.data_mut(agent).define_property(key, PropertyDescriptor::Data { value: value.into(), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: true } });
}

pub fn map_constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Map.prototype%");
    let map = agent.heap.create_object(prototype, ObjectKind::Map);
    map.data_mut(agent).auxiliary = Some(Box::new(MapData::default()));
    set_size(agent, map, 0);
    if let Some(iterable) = args.first().copied().filter(|v| !v.is_nullish()) {
        for pair in crate::builtins::array::iterable_to_vec(agent, iterable)? {
            let entry = crate::abstract_operations::type_conversion::to_object(agent, pair)?;
            let key = crate::abstract_operations::operations_on_objects::get(agent, entry, PropertyKey::Index(0), pair)?;
            let value = crate::abstract_operations::operations_on_objects::get(agent, entry, PropertyKey::Index(1), pair)?;
            map_set_entry(agent, map, key, value);
        }
    }
    Ok(Value::Object(map))
}

fn map_set_entry(agent: &mut Context, map: Object, key: Value, value: Value) {
    let existing = map_data(agent, map).entries.iter().position(|(k, _)| same_value_zero(agent, *k, key));
    match existing {
        Some(i) => map_data_mut(agent, map).entries[i].1 = value,
        None => map_data_mut(agent, map).entries.push((key, value)),
    }
    let size = map_data(agent, map).entries.len();
    set_size(agent, map, size);
}

pub fn map_prototype_get(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let map = this_map(agent, this)?;
    let key = args.first().copied().unwrap_or(Value::Undefined);
    Ok(map_data(agent, map).entries.iter().find(|(k, _)| same_value_zero(agent, *k, key)).map(|(_, v)| *v).unwrap_or(Value::Undefined))
}

pub fn map_prototype_set(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let map = this_map(agent, this)?;
    let key = args.first().copied().unwrap_or(Value::Undefined);
    let value = args.get(1).copied().unwrap_or(Value::Undefined);
    map_set_entry(agent, map, key, value);
    Ok(this)
}

pub fn map_prototype_has(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let map = this_map(agent, this)?;
    let key = args.first().copied().unwrap_or(Value::Undefined);
    Ok(Value::Boolean(map_data(agent, map).entries.iter().any(|(k, _)| same_value_zero(agent, *k, key))))
}

pub fn map_prototype_delete(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let map = this_map(agent, this)?;
    let key = args.first().copied().unwrap_or(Value::Undefined);
    let existing = map_data(agent, map).entries.iter().position(|(k, _)| same_value_zero(agent, *k, key));
    let found = existing.is_some();
    if let Some(i) = existing {
        map_data_mut(agent, map).entries.remove(i);
        let size = map_data(agent, map).entries.len();
        set_size(agent, map, size);
    }
    Ok(Value::Boolean(found))
}

pub fn set_constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Set.prototype%");
    let set = agent.heap.create_object(prototype, ObjectKind::Set);
    set.data_mut(agent).auxiliary = Some(Box::new(SetData::default()));
    set_size(agent, set, 0);
    if let Some(iterable) = args.first().copied().filter(|v| !v.is_nullish()) {
        for value in crate::builtins::array::iterable_to_vec(agent, iterable)? {
            set_add_entry(agent, set, value);
        }
    }
    Ok(Value::Object(set))
}

fn set_add_entry(agent: &mut Context, set: Object, value: Value) {
    if !set_data(agent, set).entries.iter().any(|v| same_value_zero(agent, *v, value)) {
        set_data_mut(agent, set).entries.push(value);
        let size = set_data(agent, set).entries.len();
        set_size(agent, set, size);
    }
}

pub fn set_prototype_add(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let set = this_set(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    set_add_entry(agent, set, value);
    Ok(this)
}

pub fn set_prototype_has(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let set = this_set(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    Ok(Value::Boolean(set_data(agent, set).entries.iter().any(|v| same_value_zero(agent, *v, value))))
}

pub fn set_prototype_delete(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let set = this_set(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    let existing = set_data(agent, set).entries.iter().position(|v| same_value_zero(agent, *v, value));
    let found = existing.is_some();
    if let Some(i) = existing {
        set_data_mut(agent, set).entries.remove(i);
        let size = set_data(agent, set).entries.len();
        set_size(agent, set, size);
    }
    Ok(Value::Boolean(found))
}
