// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### `spec.md` §3.7 "Script metadata", §6.2 "Module resolution protocol"
//!
//! A [`Script`] is one parsed, runnable top-level program: a source name
//! for diagnostics, the realm it's bound to, and the compiled code to run.
//! A [`Module`] is the same idea plus the linking state machine ECMA-262
//! §16.2.1.5 defines, driven through [`ModuleRegistry`].
//!
//! The parser has no `import`/`export` syntax support (a source file is
//! always parsed as an ordinary program), so `spec.md` §6.2's resolution
//! protocol is implemented here at the granularity the parser actually
//! offers: a module's `requested_modules` list is supplied by the caller at
//! definition time rather than scanned out of the source text. An embedder
//! driving `ModuleRegistry` from its own `import`-aware front end (or from
//! a `native_module`, which skips parsing entirely) gets the full
//! UNLINKED → LINKING → LINKED → EVALUATING → EVALUATED state machine;
//! what's not provided is extracting `requested_modules` from KiloJS source
//! text itself.

use ahash::AHashMap;

use crate::bytecode::CompiledCodeId;
use crate::context::Context;
use crate::execution::agent::{ExceptionType, JsError, JsResult};
use crate::execution::execution_context::ExecutionContext;
use crate::execution::realm::RealmId;
use crate::lexer::error::ParseError;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

/// Converts a parse failure into a thrown `SyntaxError`, the channel every
/// other fallible engine operation already uses (`spec.md` §7).
pub fn parse_error_to_js(agent: &mut Context, source_name: &str, error: &ParseError) -> JsError {
    JsError::syntax_error(agent, format!("{source_name}:{}:{}: {}", error.line, error.column, error.kind))
}

/// One parsed top-level program (`spec.md` §3.7): not yet a module, no
/// export/import linking, just source text compiled and bound to a realm.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub realm: RealmId,
    pub code: CompiledCodeId,
}

impl Script {
    /// Parses `source` as a program and binds the result to `realm`.
    /// Equivalent to ECMA-262 `ParseScript` followed by realm binding; the
    /// caller still has to call [`Script::evaluate`] to run it.
    pub fn parse(agent: &mut Context, realm: RealmId, source_name: &str, source: &str) -> JsResult<Self> {
        let code = crate::parser::parse_program(agent, source).map_err(|error| parse_error_to_js(agent, source_name, &error))?;
        Ok(Self { realm, code })
    }

    /// `ScriptEvaluation` (ECMA-262 §16.1.6): runs the program in its
    /// realm's global environment, with the global object as `this`.
    pub fn evaluate(&self, agent: &mut Context) -> JsResult<Value> {
        let realm = agent.realm(self.realm);
        let global_env = realm.global_env;
        let this_value = Value::Object(realm.global_object);
        let ctx = ExecutionContext::new(self.realm, None, self.code, global_env, this_value);
        agent.push_execution_context(ctx);
        let result = crate::vm::run(agent);
        agent.pop_execution_context();
        result
    }
}

/// `spec.md` §6.2: the module-record lifecycle, ECMA-262 §16.2.1.5's
/// `[[Status]]` restricted to the states this engine actually drives
/// through (no top-level-await `EVALUATING-ASYNC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Unlinked,
    Linking,
    Linked,
    Evaluating,
    Evaluated,
    Error,
}

pub type NativeModuleEvaluator = fn(&mut Context, ModuleId) -> JsResult<()>;

#[derive(Debug)]
enum ModuleBody {
    /// Parsed from source, not yet compiled (compilation is deferred to
    /// link time so a module that's never reached is never parsed twice).
    Source { source_name: String, source: String },
    /// Parsed and compiled, ready to evaluate.
    Compiled { code: CompiledCodeId },
    /// Embedder-supplied: skips parsing and linking entirely, and starts
    /// life already `Linked` (`spec.md` §6.2 "native module").
    Native { evaluate: NativeModuleEvaluator },
}

/// A single entry in a [`ModuleRegistry`]. `namespace` is the module's
/// namespace object (ECMA-262 §10.4.6): one non-writable, non-configurable
/// data property per export, backed by [`ObjectKind::Module`].
#[derive(Debug)]
pub struct Module {
    pub realm: RealmId,
    pub status: ModuleStatus,
    pub namespace: Object,
    /// Specifiers this module's (embedder-supplied, not source-scanned —
    /// see this file's module doc comment) dependency list, in requested
    /// order.
    pub requested_modules: Vec<String>,
    body: ModuleBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

/// Resolves and evaluates a graph of [`Module`]s (`spec.md` §6.2), keyed by
/// the canonical specifier `HostHooks::resolve_module` returns.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    by_key: AHashMap<String, ModuleId>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    pub fn lookup(&self, key: &str) -> Option<ModuleId> {
        self.by_key.get(key).copied()
    }

    /// Registers a module whose source hasn't been parsed yet. `requested_modules`
    /// must list every specifier this module's own `import`/dynamic
    /// `import()` would request, since the parser can't recover that list
    /// from `source` itself.
    pub fn define_source_module(
        &mut self,
        agent: &mut Context,
        realm: RealmId,
        key: impl Into<String>,
        source_name: impl Into<String>,
        source: String,
        requested_modules: Vec<String>,
    ) -> ModuleId {
        let namespace = agent.heap.create_object(None, ObjectKind::Module);
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            realm,
            status: ModuleStatus::Unlinked,
            namespace,
            requested_modules,
            body: ModuleBody::Source {
                source_name: source_name.into(),
                source,
            },
        });
        self.by_key.insert(key.into(), id);
        id
    }

    /// Registers a module with embedder-supplied exports and an evaluation
    /// callback instead of KiloJS source (`spec.md` §6.2 "native module").
    /// Starts `Linked`: there is no source to parse or link.
    pub fn define_native_module(
        &mut self,
        agent: &mut Context,
        realm: RealmId,
        key: impl Into<String>,
        exports: &[&str],
        evaluate: NativeModuleEvaluator,
    ) -> ModuleId {
        let namespace = agent.heap.create_object(None, ObjectKind::Module);
        for name in exports {
            let prop_key = PropertyKey::from_str(agent, name);
            namespace.data_mut(agent).define_property(
                prop_key,
                PropertyDescriptor::Data {
                    value: Value::Undefined,
                    attributes: PropertyAttributes {
                        writable: true,
                        enumerable: true,
                        configurable: false,
                    },
                },
            );
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            realm,
            status: ModuleStatus::Linked,
            namespace,
            requested_modules: Vec::new(),
            body: ModuleBody::Native { evaluate },
        });
        self.by_key.insert(key.into(), id);
        id
    }

    /// Sets the value of an already-declared export on `id`'s namespace
    /// object. Native modules use this from their `evaluate` callback;
    /// source modules use it once their compiled code populates exports
    /// (export binding is out of scope until the parser gains `export`
    /// syntax — see this file's module doc comment).
    pub fn set_export(&self, agent: &mut Context, id: ModuleId, name: &str, value: Value) {
        let namespace = self.modules[id.0 as usize].namespace;
        let key = PropertyKey::from_str(agent, name);
        namespace.data_mut(agent).define_property(
            key,
            PropertyDescriptor::Data {
                value,
                attributes: PropertyAttributes {
                    writable: true,
                    enumerable: true,
                    configurable: false,
                },
            },
        );
    }

    /// `Link` (ECMA-262 §16.2.1.5.1): depth-first, resolving and loading
    /// every transitive dependency through `HostHooks`, parsing each into
    /// compiled code, and marking every module reached `Linked`. A cycle is
    /// fine — a module already `Linking`/`Linked` on re-entry is skipped.
    pub fn link(&mut self, agent: &mut Context, id: ModuleId) -> JsResult<()> {
        match self.modules[id.0 as usize].status {
            ModuleStatus::Unlinked => {}
            ModuleStatus::Error => return Err(JsError::throw(agent, ExceptionType::Error, "cannot link a module that previously failed to link or evaluate")),
            _ => return Ok(()),
        }
        self.modules[id.0 as usize].status = ModuleStatus::Linking;

        let requested = self.modules[id.0 as usize].requested_modules.clone();
        let realm = self.modules[id.0 as usize].realm;
        let this_key = self
            .by_key
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.clone())
            .unwrap_or_default();

        for specifier in &requested {
            let resolved = agent
                .host_hooks
                .resolve_module(&this_key, specifier)
                .map_err(|message| JsError::throw(agent, ExceptionType::Error, message))?;
            let dep_id = match self.lookup(&resolved) {
                Some(existing) => existing,
                None => {
                    let source = agent
                        .host_hooks
                        .load_module_source(&resolved)
                        .map_err(|message| JsError::throw(agent, ExceptionType::Error, message))?;
                    self.define_source_module(agent, realm, resolved.clone(), resolved.clone(), source, Vec::new())
                }
            };
            if let Err(err) = self.link(agent, dep_id) {
                self.modules[id.0 as usize].status = ModuleStatus::Error;
                return Err(err);
            }
        }

        if let ModuleBody::Source { source_name, source } = &self.modules[id.0 as usize].body {
            let (source_name, source) = (source_name.clone(), source.clone());
            match crate::parser::parse_program(agent, &source) {
                Ok(code) => self.modules[id.0 as usize].body = ModuleBody::Compiled { code },
                Err(error) => {
                    let js_error = parse_error_to_js(agent, &source_name, &error);
                    self.modules[id.0 as usize].status = ModuleStatus::Error;
                    return Err(js_error);
                }
            }
        }

        self.modules[id.0 as usize].status = ModuleStatus::Linked;
        Ok(())
    }

    /// `Evaluate` (ECMA-262 §16.2.1.5.2): links if needed, evaluates every
    /// dependency before this module, then runs this module's own body.
    pub fn evaluate(&mut self, agent: &mut Context, id: ModuleId) -> JsResult<Value> {
        self.link(agent, id)?;
        match self.modules[id.0 as usize].status {
            ModuleStatus::Evaluated => return Ok(Value::Undefined),
            ModuleStatus::Evaluating => return Ok(Value::Undefined),
            ModuleStatus::Error => return Err(JsError::throw(agent, ExceptionType::Error, "module previously failed to evaluate")),
            _ => {}
        }
        self.modules[id.0 as usize].status = ModuleStatus::Evaluating;

        let requested = self.modules[id.0 as usize].requested_modules.clone();
        let realm = self.modules[id.0 as usize].realm;
        for specifier in &requested {
            let resolved = agent
                .host_hooks
                .resolve_module("", specifier)
                .map_err(|message| JsError::throw(agent, ExceptionType::Error, message))?;
            if let Some(dep_id) = self.lookup(&resolved) {
                if let Err(err) = self.evaluate(agent, dep_id) {
                    self.modules[id.0 as usize].status = ModuleStatus::Error;
                    return Err(err);
                }
            }
        }

        let result = match &self.modules[id.0 as usize].body {
            ModuleBody::Native { evaluate } => evaluate(agent, id),
            ModuleBody::Compiled { code } => {
                let code = *code;
                let global_env = agent.realm(realm).global_env;
                let this_value = Value::Undefined;
                let ctx = ExecutionContext::new(realm, None, code, global_env, this_value);
                agent.push_execution_context(ctx);
                let result = crate::vm::run(agent);
                agent.pop_execution_context();
                result.map(|_| Value::Undefined)
            }
            ModuleBody::Source { .. } => unreachable!("link() always compiles a Source body before Linked"),
        };

        match result {
            Ok(value) => {
                self.modules[id.0 as usize].status = ModuleStatus::Evaluated;
                Ok(value)
            }
            Err(err) => {
                self.modules[id.0 as usize].status = ModuleStatus::Error;
                Err(err)
            }
        }
    }
}
