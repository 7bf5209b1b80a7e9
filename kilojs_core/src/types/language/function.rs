// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Function objects. `spec.md` §3.6's `status_flags` function-type
//! discriminant (script, normal, arrow, async, generator, async-arrow,
//! async-generator, accessor, method, constructor, static-block) lives here
//! as [`FunctionKind`]; the bytecode + captured environment an ECMAScript
//! function closes over lives in [`EcmaScriptFunctionData`].

use super::object::Object;
use super::value::Value;
use crate::bytecode::CompiledCodeId;
use crate::execution::environments::EnvironmentIndex;
use crate::execution::realm::RealmId;
use crate::heap::gc::{HeapMarkAndSweep, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Script,
    Normal,
    Arrow,
    Async,
    Generator,
    AsyncArrow,
    AsyncGenerator,
    Accessor,
    Method,
    Constructor,
    StaticBlock,
}

impl FunctionKind {
    pub fn is_async(self) -> bool {
        matches!(
            self,
            Self::Async | Self::AsyncArrow | Self::AsyncGenerator
        )
    }

    pub fn is_generator(self) -> bool {
        matches!(self, Self::Generator | Self::AsyncGenerator)
    }

    pub fn is_constructable(self) -> bool {
        matches!(self, Self::Normal | Self::Constructor)
    }
}

/// A host "built-in" function: the VM routes calls to it through a single
/// numeric `routing_id` (`spec.md` §4.8), avoiding a function-pointer field
/// on every builtin object.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFunctionData {
    pub routing_id: u32,
    pub name: super::string::JsString,
    pub length: u8,
    pub realm: RealmId,
}

pub type BuiltinHandler =
    fn(&mut crate::context::Context, Value, &[Value]) -> crate::execution::agent::JsResult<Value>;

/// An ordinary ECMAScript function: closes over compiled code, the
/// environment it was defined in, its `this`-binding mode, and (for
/// derived-class constructors) the field-initializer list.
#[derive(Debug, Clone)]
pub struct EcmaScriptFunctionData {
    pub code: CompiledCodeId,
    pub environment: EnvironmentIndex,
    pub kind: FunctionKind,
    pub is_strict: bool,
    pub home_object: Option<Object>,
    pub bound_this: Option<Value>,
    pub realm: RealmId,
}

/// A `Function.prototype.bind` result: an exotic object wrapping a target
/// callable plus fixed leading arguments and `this`.
#[derive(Debug, Clone)]
pub struct BoundFunctionData {
    pub target: Function,
    pub bound_this: Value,
    pub bound_args: Vec<Value>,
}

/// A callable [`Object`]. Functions are ordinary objects whose
/// `ObjectKind` is one of `Function`/`BoundFunction`, with the relevant
/// `*FunctionData` stored in `ObjectHeapData::auxiliary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Function(pub(crate) Object);

impl Function {
    pub fn object(self) -> Object {
        self.0
    }

    pub fn try_from_object(object: Object, agent: &crate::context::Context) -> Option<Self> {
        use super::object::ObjectKind;
        matches!(
            object.data(agent).kind,
            ObjectKind::Function | ObjectKind::BoundFunction
        )
        .then_some(Self(object))
    }
}

impl HeapMarkAndSweep for Function {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.push_object(self.0.0);
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Object(value.0)
    }
}
