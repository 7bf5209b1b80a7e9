// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.4 Execution Contexts](https://tc39.es/ecma262/#sec-execution-contexts)
//!
//! `spec.md` §4.6: the VM's call stack. One [`ExecutionContext`] per active
//! (possibly suspended — generators/async functions) call frame.

use super::environments::EnvironmentIndex;
use super::realm::RealmId;
use crate::bytecode::CompiledCodeId;
use crate::types::language::{Function, Value};

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub realm: RealmId,
    pub function: Option<Function>,
    pub code: CompiledCodeId,
    pub lexical_environment: EnvironmentIndex,
    pub variable_environment: EnvironmentIndex,
    pub this_value: Value,
    /// Instruction pointer within `code`; suspended on `await`/`yield` and
    /// resumed from here (`spec.md` §4.6 "Generators and async functions as
    /// resumable frames").
    pub ip: u32,
    /// Operand stack for this frame, saved across suspension.
    pub stack: Vec<Value>,
}

impl ExecutionContext {
    pub fn new(realm: RealmId, function: Option<Function>, code: CompiledCodeId, env: EnvironmentIndex, this_value: Value) -> Self {
        Self {
            realm,
            function,
            code,
            lexical_environment: env,
            variable_environment: env,
            this_value,
            ip: 0,
            stack: Vec::new(),
        }
    }
}
