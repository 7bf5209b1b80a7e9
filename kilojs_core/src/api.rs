// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### `spec.md` §6.1 "Embedding API surface"
//!
//! The thin surface an embedder links against: init a [`Context`], parse
//! and run scripts, call functions, read and write properties, drive
//! modules. Everything here is a direct forward to `execution`/`vm`/
//! `abstract_operations`/[`crate::scripts_and_modules`] plus the
//! `SPEC_FULL.md` §5 re-entrancy guard every entry point checks — it does
//! not duplicate any engine logic of its own.

use crate::abstract_operations::{operations_on_objects, testing_and_comparison, type_conversion};
use crate::context::{Context, EngineOptions};
use crate::execution::agent::{DefaultHostHooks, HostHooks, JsError, JsResult};
use crate::execution::realm::{Realm, RealmId};
use crate::scripts_and_modules::{Module, ModuleId, ModuleRegistry, ModuleStatus, NativeModuleEvaluator, Script};
use crate::types::language::object::PropertyKey;
use crate::types::language::{Function, JsString, Object, Value};

/// `SPEC_FULL.md` §4.11: parse-time flags mirroring
/// `jerry_parse_options_t`'s `JERRY_PARSE_*` bits — whether the source is a
/// module or a plain script, and (for `Function`-constructor-style parses)
/// an explicit parameter list prepended ahead of the function body.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub strict: bool,
    pub is_module: bool,
    /// Set for a `new Function(arg1, ..., body)`-style parse: the argument
    /// names become the synthesized function's parameter list instead of
    /// being parsed as program statements.
    pub argument_list: Option<Vec<String>>,
}

/// Owns one [`Context`] plus the realm and module registry an embedding
/// typically wants alongside it. `SPEC_FULL.md` §5's non-reentrancy
/// invariant is enforced here: every method below that touches the engine
/// runs through [`Context::with_entry`].
pub struct Engine {
    pub agent: Context,
    pub realm: RealmId,
    pub modules: ModuleRegistry,
}

impl Engine {
    /// `jerry_init`-equivalent: builds a fresh `Context`, its one realm,
    /// and an empty module registry.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_host_hooks(options, Box::new(DefaultHostHooks))
    }

    pub fn with_host_hooks(options: EngineOptions, host_hooks: Box<dyn HostHooks>) -> Self {
        let mut agent = Context::new(options, host_hooks);
        let realm = Realm::new(&mut agent);
        Self {
            agent,
            realm,
            modules: ModuleRegistry::new(),
        }
    }

    /// Parses `source` as a program. `options.argument_list` is folded into
    /// a synthesized `function anonymous(<args>) { <source> }` wrapper
    /// before parsing, the same trick `Function`/`GeneratorFunction`
    /// constructors use in ECMA-262 §20.2.1.1.1.
    pub fn parse(&mut self, source_name: &str, source: &str, options: &ParseOptions) -> JsResult<Script> {
        let realm = self.realm;
        self.agent.with_entry(|agent| {
            if options.is_module {
                return Err(JsError::throw(
                    agent,
                    crate::execution::agent::ExceptionType::Error,
                    "module source must go through define_source_module, not parse",
                ));
            }
            if let Some(params) = &options.argument_list {
                let wrapped = format!("(function anonymous({}) {{\n{source}\n}})", params.join(", "));
                Script::parse(agent, realm, source_name, &wrapped)
            } else {
                Script::parse(agent, realm, source_name, source)
            }
        })
    }

    /// Parses and immediately evaluates `source` in the engine's realm
    /// (`spec.md` §6.1 `run`/`eval`).
    pub fn eval(&mut self, source_name: &str, source: &str) -> JsResult<Value> {
        let script = self.parse(source_name, source, &ParseOptions::default())?;
        self.run(&script)
    }

    pub fn run(&mut self, script: &Script) -> JsResult<Value> {
        self.agent.with_entry(|agent| script.evaluate(agent))
    }

    pub fn call(&mut self, function: Value, this: Value, args: &[Value]) -> JsResult<Value> {
        self.agent.with_entry(|agent| operations_on_objects::call(agent, function, this, args))
    }

    pub fn construct(&mut self, function: Value, args: &[Value]) -> JsResult<Value> {
        self.agent.with_entry(|agent| {
            if !testing_and_comparison::is_constructor(agent, function) {
                return Err(JsError::type_error(agent, "not a constructor"));
            }
            let function = function
                .as_object()
                .and_then(|o| Function::try_from_object(o, agent))
                .ok_or_else(|| JsError::type_error(agent, "not a constructor"))?;
            crate::vm::construct(agent, function, args)
        })
    }

    pub fn get_property(&mut self, object: Value, key: &str) -> JsResult<Value> {
        self.agent.with_entry(|agent| {
            let object = value_as_object(agent, object)?;
            let key = PropertyKey::from_str(agent, key);
            operations_on_objects::get(agent, object, key, Value::Object(object))
        })
    }

    pub fn set_property(&mut self, object: Value, key: &str, value: Value) -> JsResult<bool> {
        self.agent.with_entry(|agent| {
            let object = value_as_object(agent, object)?;
            let key = PropertyKey::from_str(agent, key);
            operations_on_objects::set(agent, object, key, value, Value::Object(object))
        })
    }

    pub fn has_property(&mut self, object: Value, key: &str) -> JsResult<bool> {
        self.agent.with_entry(|agent| {
            let object = value_as_object(agent, object)?;
            let key = PropertyKey::from_str(agent, key);
            Ok(operations_on_objects::has_property(agent, object, key))
        })
    }

    pub fn delete_property(&mut self, object: Value, key: &str) -> JsResult<bool> {
        self.agent.with_entry(|agent| {
            let object = value_as_object(agent, object)?;
            let key = PropertyKey::from_str(agent, key);
            Ok(operations_on_objects::delete(agent, object, key))
        })
    }

    pub fn to_string(&mut self, value: Value) -> JsResult<JsString> {
        self.agent.with_entry(|agent| type_conversion::to_string(agent, value))
    }

    pub fn throw_error_value(&mut self, value: Value) -> JsError {
        self.agent.with_entry(|agent| agent.throw_error(JsError::new(value)))
    }

    /// `spec.md` §6.1 native-pointer ops: stashes an embedder-owned value
    /// behind an object's `auxiliary` slot. Exists for parity with the
    /// surface `spec.md` enumerates; most embeddings reach for
    /// `Object::data_mut(agent).auxiliary` directly instead.
    pub fn set_native_pointer(&mut self, object: Object, pointer: Box<dyn std::any::Any>) {
        self.agent.with_entry(|agent| {
            object.data_mut(agent).auxiliary = Some(pointer);
        })
    }

    pub fn native_pointer(&self, object: Object) -> Option<&dyn std::any::Any> {
        object.data(&self.agent).auxiliary.as_deref()
    }

    pub fn run_microtasks(&mut self) -> JsResult<()> {
        self.agent.with_entry(|agent| agent.run_microtasks())
    }

    pub fn collect_garbage(&mut self) {
        self.agent.with_entry(|agent| agent.collect_garbage())
    }

    /// Creates a second realm in the same `Context` (`spec.md` §6.1 realm
    /// ops); the two realms share a heap but never a global object or
    /// prototype chain.
    pub fn create_realm(&mut self) -> RealmId {
        self.agent.with_entry(Realm::new)
    }

    pub fn define_source_module(
        &mut self,
        realm: RealmId,
        key: impl Into<String>,
        source_name: impl Into<String>,
        source: String,
        requested_modules: Vec<String>,
    ) -> ModuleId {
        let modules = &mut self.modules;
        self.agent.with_entry(|agent| modules.define_source_module(agent, realm, key, source_name, source, requested_modules))
    }

    pub fn define_native_module(&mut self, realm: RealmId, key: impl Into<String>, exports: &[&str], evaluate: NativeModuleEvaluator) -> ModuleId {
        let modules = &mut self.modules;
        self.agent.with_entry(|agent| modules.define_native_module(agent, realm, key, exports, evaluate))
    }

    pub fn link_module(&mut self, id: ModuleId) -> JsResult<()> {
        let modules = &mut self.modules;
        self.agent.with_entry(|agent| modules.link(agent, id))
    }

    pub fn evaluate_module(&mut self, id: ModuleId) -> JsResult<Value> {
        let modules = &mut self.modules;
        self.agent.with_entry(|agent| modules.evaluate(agent, id))
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        self.modules.get(id)
    }

    pub fn module_status(&self, id: ModuleId) -> ModuleStatus {
        self.modules.get(id).status
    }
}

fn value_as_object(agent: &mut Context, value: Value) -> JsResult<Object> {
    value.as_object().ok_or_else(|| JsError::type_error(agent, "value is not an object"))
}
