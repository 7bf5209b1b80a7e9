// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
//!
//! `spec.md` §7 "Exception channel": every fallible engine operation
//! returns [`JsResult<T>`], threading a thrown value (not a Rust panic)
//! back to the caller. `spec.md` §4.10: [`HostHooks`] is the seam the
//! embedder plugs into (module resolution, `import()`, promise rejection
//! tracking, time/randomness sourcing for `Date`/`Math.random`).

use thiserror::Error;

use crate::types::language::Value;

/// The ECMAScript exception channel: a thrown value wrapped so Rust's `?`
/// threads it through abstract operations without the engine ever turning
/// a JS `throw` into a Rust panic.
#[derive(Debug, Clone, Copy, Error)]
#[error("uncaught JavaScript exception")]
pub struct JsError {
    pub value: Value,
}

pub type JsResult<T> = Result<T, JsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

impl JsError {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Constructs and throws a native error of the given kind with a
    /// message string, the way every abstract operation in ECMA-262 does
    /// ("Throw a *TypeError* exception"). Message formatting and object
    /// construction live in `builtins::error`; this just routes there.
    pub fn throw(agent: &mut crate::context::Context, kind: ExceptionType, message: impl Into<String>) -> Self {
        let value = crate::builtins::error::create_native_error(agent, kind, message.into());
        Self { value }
    }

    pub fn type_error(agent: &mut crate::context::Context, message: impl Into<String>) -> Self {
        Self::throw(agent, ExceptionType::TypeError, message)
    }

    pub fn range_error(agent: &mut crate::context::Context, message: impl Into<String>) -> Self {
        Self::throw(agent, ExceptionType::RangeError, message)
    }

    pub fn reference_error(agent: &mut crate::context::Context, message: impl Into<String>) -> Self {
        Self::throw(agent, ExceptionType::ReferenceError, message)
    }

    pub fn syntax_error(agent: &mut crate::context::Context, message: impl Into<String>) -> Self {
        Self::throw(agent, ExceptionType::SyntaxError, message)
    }
}

/// Host integration points `spec.md` §4.10 requires the embedder to supply.
/// Every method has a sensible default so an embedder can override only
/// what it cares about, the way the teacher's `HostHooks` trait works.
pub trait HostHooks: std::fmt::Debug {
    /// Resolves a module specifier relative to a referencing module's
    /// identity. Returns the resolved module's canonical key.
    fn resolve_module(&self, referrer: &str, specifier: &str) -> Result<String, String> {
        let _ = referrer;
        Err(format!("module resolution not supported by host: {specifier}"))
    }

    /// Loads already-resolved module source text.
    fn load_module_source(&self, resolved: &str) -> Result<String, String> {
        Err(format!("module loading not supported by host: {resolved}"))
    }

    /// Called when a promise rejection is never handled by the time the
    /// microtask queue drains (`spec.md` §6.5).
    fn on_unhandled_rejection(&self, reason: Value) {
        let _ = reason;
    }

    /// Monotonic-enough wall clock reading backing `Date.now()`. Exists as
    /// a hook (rather than a direct `std::time` call) so embeddings that
    /// need deterministic replay can substitute their own clock.
    fn now_millis(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
pub struct DefaultHostHooks;

impl HostHooks for DefaultHostHooks {}
