// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1 Environment Records](https://tc39.es/ecma262/#sec-environment-records)
//!
//! `spec.md` §4.4: the scope-analysis pre-pass assigns most local bindings
//! a frame slot at compile time, so only bindings that escape into a
//! closure, a `with`, or the global scope need a heap-resident
//! [`EnvironmentHeapData`] at run time.

use ahash::AHashMap;

use crate::execution::agent::{JsError, JsResult};
use crate::heap::gc::{HeapMarkAndSweep, WorkQueues};
use crate::heap::indexes::Index;
use crate::types::language::{JsString, Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentIndex(pub(crate) Index<EnvironmentHeapData>);

impl EnvironmentIndex {
    pub(crate) fn new(index: Index<EnvironmentHeapData>) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index<EnvironmentHeapData> {
        self.0
    }

    pub fn data(self, agent: &crate::context::Context) -> &EnvironmentHeapData {
        agent.heap.environments[self.0.into_usize_index()]
            .as_ref()
            .expect("dangling EnvironmentIndex")
    }

    pub fn data_mut(self, agent: &mut crate::context::Context) -> &mut EnvironmentHeapData {
        agent.heap.environments[self.0.into_usize_index()]
            .as_mut()
            .expect("dangling EnvironmentIndex")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
    /// `let`/`class` bindings start uninitialized (temporal dead zone);
    /// reading one before its declaration executes is a `ReferenceError`.
    pub initialized: bool,
}

/// One environment record. `spec.md` §4.4 calls out three flavors
/// (declarative, object, global); function and module environments are
/// declarative environments with extra fields ECMA-262 bolts on, modeled
/// here as `Declarative` plus the extra fields inline rather than as
/// further enum variants, matching how narrowly they're actually used.
#[derive(Debug)]
pub enum EnvironmentHeapData {
    Declarative {
        outer: Option<EnvironmentIndex>,
        bindings: AHashMap<JsString, Binding>,
        this_value: Option<Value>,
    },
    Object {
        outer: Option<EnvironmentIndex>,
        binding_object: Object,
        with_environment: bool,
    },
    Global {
        object_record_target: Object,
        declarative_bindings: AHashMap<JsString, Binding>,
        var_names: Vec<JsString>,
    },
}

impl EnvironmentHeapData {
    pub fn new_declarative(outer: Option<EnvironmentIndex>) -> Self {
        Self::Declarative {
            outer,
            bindings: AHashMap::new(),
            this_value: None,
        }
    }

    pub fn new_function(outer: Option<EnvironmentIndex>, this_value: Option<Value>) -> Self {
        Self::Declarative {
            outer,
            bindings: AHashMap::new(),
            this_value,
        }
    }

    pub fn new_object(outer: Option<EnvironmentIndex>, binding_object: Object, with_environment: bool) -> Self {
        Self::Object {
            outer,
            binding_object,
            with_environment,
        }
    }

    fn outer(&self) -> Option<EnvironmentIndex> {
        match self {
            Self::Declarative { outer, .. } | Self::Object { outer, .. } => *outer,
            Self::Global { .. } => None,
        }
    }
}

impl HeapMarkAndSweep for EnvironmentHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            Self::Declarative { outer, bindings, this_value } => {
                if let Some(outer) = outer {
                    queues.push_environment(outer.0);
                }
                for binding in bindings.values() {
                    binding.value.mark_values(queues);
                }
                if let Some(this_value) = this_value {
                    this_value.mark_values(queues);
                }
            }
            Self::Object { outer, binding_object, .. } => {
                if let Some(outer) = outer {
                    queues.push_environment(outer.0);
                }
                queues.push_object(binding_object.index());
            }
            Self::Global { object_record_target, declarative_bindings, .. } => {
                queues.push_object(object_record_target.index());
                for binding in declarative_bindings.values() {
                    binding.value.mark_values(queues);
                }
            }
        }
    }
}

/// Walks the environment chain from `start` looking up `name`; returns the
/// environment it's bound in (`spec.md` §4.4's implicit `GetIdentifierReference`).
pub fn resolve_binding(
    agent: &crate::context::Context,
    start: EnvironmentIndex,
    name: JsString,
) -> Option<EnvironmentIndex> {
    use crate::types::language::object::PropertyKey;

    let mut current = Some(start);
    while let Some(env) = current {
        let data = env.data(agent);
        let has = match data {
            EnvironmentHeapData::Declarative { bindings, .. } => bindings.contains_key(&name),
            EnvironmentHeapData::Global { declarative_bindings, object_record_target, .. } => {
                declarative_bindings.contains_key(&name)
                    || object_record_target
                        .data(agent)
                        .has_own_property(PropertyKey::String(name))
            }
            EnvironmentHeapData::Object { binding_object, .. } => {
                binding_object.data(agent).has_own_property(PropertyKey::String(name))
            }
        };
        if has {
            return Some(env);
        }
        current = data.outer();
    }
    None
}

pub fn get_binding_value(
    agent: &crate::context::Context,
    env: EnvironmentIndex,
    name: JsString,
    strict: bool,
) -> JsResult<Value> {
    use crate::types::language::object::{PropertyDescriptor, PropertyKey};

    match env.data(agent) {
        EnvironmentHeapData::Declarative { bindings, .. }
        | EnvironmentHeapData::Global { declarative_bindings: bindings, .. } => {
            match bindings.get(&name) {
                Some(binding) if binding.initialized => Ok(binding.value),
                Some(_) => Err(JsError::reference_error(agent, "Cannot access binding before initialization")),
                None if strict => Err(JsError::reference_error(agent, "Binding is not defined")),
                None => Ok(Value::Undefined),
            }
        }
        EnvironmentHeapData::Object { binding_object, .. } => {
            match binding_object.data(agent).get_own_property(PropertyKey::String(name)) {
                Some(PropertyDescriptor::Data { value, .. }) => Ok(value),
                Some(PropertyDescriptor::Accessor { .. }) => Ok(Value::Undefined), // getter dispatch happens in abstract_operations
                None if strict => Err(JsError::reference_error(agent, "Binding is not defined")),
                None => Ok(Value::Undefined),
            }
        }
    }
}

pub fn set_mutable_binding(
    agent: &mut crate::context::Context,
    env: EnvironmentIndex,
    name: JsString,
    value: Value,
    strict: bool,
) -> JsResult<()> {
    use crate::types::language::object::{PropertyAttributes, PropertyDescriptor, PropertyKey};

    match env.data_mut(agent) {
        EnvironmentHeapData::Declarative { bindings, .. }
        | EnvironmentHeapData::Global { declarative_bindings: bindings, .. } => {
            match bindings.get_mut(&name) {
                Some(binding) if binding.mutable => {
                    binding.value = value;
                    binding.initialized = true;
                    Ok(())
                }
                Some(_) if strict => Err(JsError::type_error(agent, "Assignment to constant binding")),
                Some(_) => Ok(()),
                None if strict => Err(JsError::reference_error(agent, "Binding is not defined")),
                None => {
                    bindings.insert(name, Binding { value, mutable: true, initialized: true });
                    Ok(())
                }
            }
        }
        EnvironmentHeapData::Object { binding_object, .. } => {
            let binding_object = *binding_object;
            binding_object.data_mut(agent).define_property(
                PropertyKey::String(name),
                PropertyDescriptor::Data { value, attributes: PropertyAttributes::DEFAULT_DATA },
            );
            Ok(())
        }
    }
}

pub fn initialize_binding(agent: &mut crate::context::Context, env: EnvironmentIndex, name: JsString, value: Value, mutable: bool) {
    match env.data_mut(agent) {
        EnvironmentHeapData::Declarative { bindings, .. }
        | EnvironmentHeapData::Global { declarative_bindings: bindings, .. } => {
            bindings.insert(name, Binding { value, mutable, initialized: true });
        }
        EnvironmentHeapData::Object { .. } => {}
    }
}

pub fn create_mutable_binding(agent: &mut crate::context::Context, env: EnvironmentIndex, name: JsString) {
    match env.data_mut(agent) {
        EnvironmentHeapData::Declarative { bindings, .. }
        | EnvironmentHeapData::Global { declarative_bindings: bindings, .. } => {
            bindings.entry(name).or_insert(Binding {
                value: Value::Undefined,
                mutable: true,
                initialized: false,
            });
        }
        EnvironmentHeapData::Object { .. } => {}
    }
}
