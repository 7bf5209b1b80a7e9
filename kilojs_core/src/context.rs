// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine's central state, called "Agent" by ECMA-262 §9.7 and named
//! [`Context`] here (see `SPEC_FULL.md`'s glossary entry). Every abstract
//! operation in this crate takes `&Context`/`&mut Context` as its first
//! argument, the same way the teacher's own `Agent` threads through every
//! `ecmascript::*` function.

use ahash::AHashMap;

use crate::execution::agent::{DefaultHostHooks, HostHooks, JsError, JsResult};
use crate::execution::environments::EnvironmentIndex;
use crate::execution::execution_context::ExecutionContext;
use crate::execution::realm::{Realm, RealmId};
use crate::heap::gc::{self, WorkQueues};
use crate::heap::Heap;
use crate::types::language::{JsString, Symbol, Value};

/// Construction-time engine knobs (`SPEC_FULL.md` §4.10). Mirrors the
/// teacher's `agent::Options` in spirit: small, `Copy`-able where possible,
/// and defaulted so most embeddings never need to construct one by hand.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Disables collection entirely; for tests that want to assert on heap
    /// growth without a GC cycle disturbing arena indices mid-assertion.
    pub disable_gc: bool,
    /// Bytes of net new allocation since the last cycle that trigger an
    /// automatic collection (`spec.md` §4.7).
    pub gc_growth_watermark_bytes: usize,
    /// Above this element count, `Array`/`TypedArray` storage is never
    /// demoted back to a fast array representation even if it would
    /// otherwise qualify — open question resolved in DESIGN.md.
    pub typed_array_compact_limit: usize,
    pub enable_annex_b: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            disable_gc: false,
            gc_growth_watermark_bytes: 16 * 1024 * 1024,
            typed_array_compact_limit: 64,
            enable_annex_b: cfg!(feature = "annex-b"),
        }
    }
}

/// The ECMA-262 "Agent": one heap, one execution context stack, one
/// pending-exception slot, one set of host hooks. A single-threaded
/// embedding owns exactly one `Context`; the teacher's multi-agent
/// `GcAgent`/`RealmRoot` wrapper is intentionally not replicated here —
/// `spec.md` scopes concurrency to "single-threaded, re-entrant only
/// through host callbacks" (see DESIGN.md open-question resolution).
pub struct Context {
    pub heap: Heap,
    pub options: EngineOptions,
    pub host_hooks: Box<dyn HostHooks>,
    realms: Vec<Realm>,
    execution_context_stack: Vec<ExecutionContext>,
    /// `Symbol.for`/`Symbol.keyFor`'s global registry (`spec.md` §6.1.5).
    symbol_registry: AHashMap<JsString, Symbol>,
    microtasks: std::collections::VecDeque<Value>,
    bytes_allocated_since_gc: usize,
    /// `spec.md` §5's non-reentrancy invariant ("never enter the engine
    /// from inside a finalizer, a GC mark, or a native callback on the VM
    /// stack"), checked by every `api` entry point. A `debug_assert!` is
    /// the cheapest instrument for an invariant that must never fire in a
    /// correct embedding, not a recoverable `Result` condition.
    pub(crate) entered: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("realms", &self.realms.len())
            .field("execution_context_stack_depth", &self.execution_context_stack.len())
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(options: EngineOptions, host_hooks: Box<dyn HostHooks>) -> Self {
        Self {
            heap: Heap::new(),
            options,
            host_hooks,
            realms: Vec::new(),
            execution_context_stack: Vec::new(),
            symbol_registry: AHashMap::new(),
            microtasks: std::collections::VecDeque::new(),
            bytes_allocated_since_gc: 0,
            entered: false,
        }
    }

    /// Guards a public `api` entry point against reentrancy: panics in debug
    /// builds if the engine is already on the stack (a native callback or
    /// finalizer calling back into `api` functions), then flips `entered`
    /// for the duration of `f`.
    pub(crate) fn with_entry<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        debug_assert!(!self.entered, "re-entered kilojs_core::api while already inside the engine");
        self.entered = true;
        let result = f(self);
        self.entered = false;
        result
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self::new(EngineOptions::default(), Box::new(DefaultHostHooks))
    }

    pub fn current_realm_id(&self) -> RealmId {
        self.execution_context_stack
            .last()
            .map(|ctx| ctx.realm)
            .unwrap_or(RealmId(0))
    }

    pub fn realm(&self, id: RealmId) -> &Realm {
        &self.realms[id.0 as usize]
    }

    pub fn realm_mut(&mut self, id: RealmId) -> &mut Realm {
        &mut self.realms[id.0 as usize]
    }

    pub(crate) fn push_realm(&mut self, realm: Realm) -> RealmId {
        let id = RealmId(self.realms.len() as u32);
        self.realms.push(realm);
        id
    }

    pub fn current_lexical_environment(&self) -> EnvironmentIndex {
        self.execution_context_stack
            .last()
            .expect("no active execution context")
            .lexical_environment
    }

    pub fn push_execution_context(&mut self, ctx: ExecutionContext) {
        self.execution_context_stack.push(ctx);
    }

    pub fn pop_execution_context(&mut self) -> Option<ExecutionContext> {
        self.execution_context_stack.pop()
    }

    pub fn execution_context_depth(&self) -> usize {
        self.execution_context_stack.len()
    }

    pub fn symbol_for(&mut self, key: JsString) -> Symbol {
        if let Some(existing) = self.symbol_registry.get(&key) {
            return *existing;
        }
        let symbol = self.heap.create_symbol(Some(key));
        self.symbol_registry.insert(key, symbol);
        symbol
    }

    pub fn enqueue_microtask(&mut self, job: Value) {
        self.microtasks.push_back(job);
    }

    /// Drains the microtask queue to completion (`spec.md` §6.5): each job
    /// may itself enqueue further microtasks, which still run before this
    /// call returns, matching `NextJob`'s host-driven loop in ECMA-262 §9.5.
    pub fn run_microtasks(&mut self) -> JsResult<()> {
        while let Some(job) = self.microtasks.pop_front() {
            crate::vm::run_microtask(self, job)?;
        }
        Ok(())
    }

    pub fn note_allocation(&mut self, bytes: usize) {
        self.bytes_allocated_since_gc += bytes;
        if !self.options.disable_gc && self.bytes_allocated_since_gc >= self.options.gc_growth_watermark_bytes {
            self.collect_garbage();
        }
    }

    /// Runs one mark-and-sweep cycle, rooted at every realm (globals +
    /// intrinsics) and every live execution context's operand stack and
    /// scope chain (`spec.md` §4.7's root set).
    pub fn collect_garbage(&mut self) {
        let mut queues = WorkQueues::default();
        for realm in &self.realms {
            crate::heap::gc::HeapMarkAndSweep::mark_values(realm, &mut queues);
        }
        for ctx in &self.execution_context_stack {
            queues.push_environment(ctx.lexical_environment.index());
            queues.push_environment(ctx.variable_environment.index());
            for value in &ctx.stack {
                crate::heap::gc::HeapMarkAndSweep::mark_values(value, &mut queues);
            }
            crate::heap::gc::HeapMarkAndSweep::mark_values(&ctx.this_value, &mut queues);
        }
        for job in &self.microtasks {
            crate::heap::gc::HeapMarkAndSweep::mark_values(job, &mut queues);
        }
        gc::run(&mut self.heap, queues);
        self.bytes_allocated_since_gc = 0;
    }

    pub fn throw_error(&mut self, error: JsError) -> JsError {
        error
    }
}
