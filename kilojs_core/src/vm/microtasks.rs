// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### Jobs (`spec.md` §6.5, [ECMA-262 §9.5](https://tc39.es/ecma262/#sec-jobs))
//!
//! A microtask is just a zero-argument callable queued by
//! `Context::enqueue_microtask` — `builtins::promise`'s reaction/resolve
//! jobs close over their resolved value and reaction record the same way
//! the teacher's own job closures do, so the queue itself only needs to
//! know how to invoke one.

use crate::context::Context;
use crate::execution::agent::JsResult;
use crate::types::language::Value;

/// Runs one queued job. A job that throws does not propagate past the
/// queue: `spec.md` §6.5 routes an uncaught job exception to
/// `HostHooks::on_unhandled_rejection` rather than aborting the drain,
/// matching how an unhandled promise rejection must not crash the host.
pub fn run_microtask(agent: &mut Context, job: Value) -> JsResult<()> {
    if let Some(function) = job.as_function() {
        if let Err(err) = crate::abstract_operations::operations_on_objects::call(agent, function.into(), Value::Undefined, &[]) {
            agent.host_hooks.on_unhandled_rejection(err.value);
        }
    }
    Ok(())
}
