// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.4 Operations on Iterator Objects](https://tc39.es/ecma262/#sec-operations-on-iterator-objects)

use crate::context::Context;
use crate::execution::agent::JsResult;
use crate::types::language::object::PropertyKey;
use crate::types::language::Value;

pub struct IteratorRecord {
    pub iterator: Value,
    pub next_method: Value,
    pub done: bool,
}

/// `GetIterator`: looks up `@@iterator`, calls it, and validates the result
/// is an object (ECMA-262 requires a `TypeError` otherwise).
pub fn get_iterator(agent: &mut Context, value: Value, iterator_symbol: crate::types::language::Symbol) -> JsResult<IteratorRecord> {
    let key = PropertyKey::Symbol(iterator_symbol);
    let method = crate::abstract_operations::operations_on_objects::get(
        agent,
        crate::abstract_operations::type_conversion::to_object(agent, value)?,
        key,
        value,
    )?;
    let iterator = crate::abstract_operations::operations_on_objects::call(agent, method, value, &[])?;
    if !iterator.is_object() {
        return Err(crate::execution::agent::JsError::type_error(agent, "Result of the Symbol.iterator method is not an object"));
    }
    let next_key = PropertyKey::from_str(agent, "next");
    let next_method = crate::abstract_operations::operations_on_objects::get(agent, iterator.as_object().unwrap(), next_key, iterator)?;
    Ok(IteratorRecord { iterator, next_method, done: false })
}

/// `IteratorStep`: calls `.next()` and returns `None` once `done` is true.
pub fn iterator_step(agent: &mut Context, record: &mut IteratorRecord) -> JsResult<Option<Value>> {
    if record.done {
        return Ok(None);
    }
    let result = crate::abstract_operations::operations_on_objects::call(agent, record.next_method, record.iterator, &[])?;
    if !result.is_object() {
        return Err(crate::execution::agent::JsError::type_error(agent, "Iterator result is not an object"));
    }
    let object = result.as_object().unwrap();
    let done_key = PropertyKey::from_str(agent, "done");
    let done = crate::abstract_operations::type_conversion::to_boolean(
        agent,
        crate::abstract_operations::operations_on_objects::get(agent, object, done_key, result)?,
    );
    if done {
        record.done = true;
        return Ok(None);
    }
    let value_key = PropertyKey::from_str(agent, "value");
    Ok(Some(crate::abstract_operations::operations_on_objects::get(agent, object, value_key, result)?))
}

/// `IteratorClose`: calls `.return()` if present, swallowing its result
/// (used for early-exit paths like `break` out of a `for-of`).
pub fn iterator_close(agent: &mut Context, record: &IteratorRecord) -> JsResult<()> {
    let return_key = PropertyKey::from_str(agent, "return");
    let object = record.iterator.as_object();
    let Some(object) = object else { return Ok(()) };
    let return_method = crate::abstract_operations::operations_on_objects::get(agent, object, return_key, record.iterator)?;
    if return_method.is_undefined() {
        return Ok(());
    }
    crate::abstract_operations::operations_on_objects::call(agent, return_method, record.iterator, &[])?;
    Ok(())
}
