// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.5 The Reference Record Specification Type](https://tc39.es/ecma262/#sec-reference-record-specification-type)
//!
//! Produced by identifier and member expression evaluation; consumed by
//! `GetValue`/`PutValue`/`typeof`/`delete`. The bytecode compiler lowers
//! most references away at compile time (`spec.md` §4.5 "no runtime
//! Reference objects for resolved local bindings"); this type only appears
//! for property references and unresolved global bindings, which the VM
//! materializes transiently on its operand stack.

use crate::execution::environments::EnvironmentIndex;
use crate::types::language::{PropertyKey, Value};

#[derive(Debug, Clone, Copy)]
pub enum ReferenceBase {
    Value(Value),
    Environment(EnvironmentIndex),
    Unresolvable,
}

#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub base: ReferenceBase,
    pub referenced_name: PropertyKey,
    pub strict: bool,
    pub this_value: Option<Value>,
}

impl Reference {
    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Value(_))
    }
}
