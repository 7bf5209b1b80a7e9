// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! KiloJS: an embeddable ECMAScript engine.
//!
//! This crate is a from-scratch single-pass parser/bytecode-compiler/VM
//! stack: source text goes in, a [`context::Context`] ("Agent") holds every
//! live heap object, and [`api`] is the thin embedding surface most callers
//! should use instead of reaching into `execution`/`vm`/`builtins` directly.

pub mod abstract_operations;
pub mod api;
pub mod builtins;
pub mod bytecode;
pub mod context;
pub mod execution;
pub mod heap;
pub mod lexer;
pub mod parser;
pub mod scripts_and_modules;
pub mod types;
pub mod vm;

pub use context::{Context, EngineOptions};
pub use execution::agent::{JsError, JsResult};
pub use types::language::Value;
