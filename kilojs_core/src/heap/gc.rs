// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mark-and-sweep garbage collection (`spec.md` §4.7, §8 "GC soundness").
//!
//! The collector is non-moving: live slots are never relocated, so no
//! pointer-rewriting pass is needed after sweep. A freed slot's index is
//! pushed onto that kind's free list inside [`super::Heap`] and reused by a
//! later allocation. This diverges from a moving/compacting collector (the
//! teacher repository's `CompactionLists` machinery implies it supports
//! compaction); non-moving was chosen here because `spec.md` never requires
//! address stability to change, only that `alloc`/`free` work and that
//! sweep reclaims unreachable storage — see DESIGN.md.

use super::indexes::Index;
use crate::bytecode::CompiledCodeData;
use crate::types::language::{
    bigint::BigIntHeapData, number::NumberHeapData, object::ObjectHeapData,
    string::StringHeapData, symbol::SymbolHeapData,
};
use crate::execution::environments::EnvironmentHeapData;

/// Accumulates references discovered during the mark phase, grouped by
/// arena kind, so that each arena can be walked and marked independently of
/// the others (mirrors the teacher's `heap::WorkQueues`).
#[derive(Debug, Default)]
pub struct WorkQueues {
    pub(crate) objects: Vec<Index<ObjectHeapData>>,
    pub(crate) strings: Vec<Index<StringHeapData>>,
    pub(crate) numbers: Vec<Index<NumberHeapData>>,
    pub(crate) bigints: Vec<Index<BigIntHeapData>>,
    pub(crate) symbols: Vec<Index<SymbolHeapData>>,
    pub(crate) environments: Vec<Index<EnvironmentHeapData>>,
    pub(crate) compiled_codes: Vec<Index<CompiledCodeData>>,
}

impl WorkQueues {
    pub fn push_object(&mut self, index: Index<ObjectHeapData>) {
        self.objects.push(index);
    }
    pub fn push_string(&mut self, index: Index<StringHeapData>) {
        self.strings.push(index);
    }
    pub fn push_number(&mut self, index: Index<NumberHeapData>) {
        self.numbers.push(index);
    }
    pub fn push_bigint(&mut self, index: Index<BigIntHeapData>) {
        self.bigints.push(index);
    }
    pub fn push_symbol(&mut self, index: Index<SymbolHeapData>) {
        self.symbols.push(index);
    }
    pub fn push_environment(&mut self, index: Index<EnvironmentHeapData>) {
        self.environments.push(index);
    }
    pub fn push_compiled_code(&mut self, index: Index<CompiledCodeData>) {
        self.compiled_codes.push(index);
    }

    fn is_empty(&self) -> bool {
        self.objects.is_empty()
            && self.strings.is_empty()
            && self.numbers.is_empty()
            && self.bigints.is_empty()
            && self.symbols.is_empty()
            && self.environments.is_empty()
            && self.compiled_codes.is_empty()
    }
}

/// No-op placeholder for a moving collector's relocation tables. Kept as a
/// named type (rather than deleted outright) because every
/// [`HeapMarkAndSweep`] impl threads it through, matching the teacher's
/// `sweep_values(&mut self, compactions: &CompactionLists)` signature; a
/// future compacting collector would populate it instead of leaving it
/// empty.
#[derive(Debug, Default)]
pub struct CompactionLists;

/// Implemented by every heap-resident (or heap-referencing) type so the
/// collector can find its children without a giant `match` in the mark
/// loop — each kind owns the knowledge of what it points to.
pub trait HeapMarkAndSweep {
    /// Enqueues every heap reference reachable from `self` onto `queues`.
    fn mark_values(&self, queues: &mut WorkQueues);

    /// Rewrites any indices inside `self` that were invalidated by
    /// compaction. A non-moving collector never invalidates indices, so the
    /// default implementation of most impls is a no-op; it exists for
    /// interface parity with a future compacting collector.
    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let _ = compactions;
    }
}

/// Drives one full mark-and-sweep cycle over `heap`'s roots.
///
/// `roots` supplies every root enumerated in `spec.md` §4.7: the realm
/// globals (via each `Realm`'s own `HeapMarkAndSweep` impl, invoked by the
/// caller before this function runs — see `execution::agent::GcAgent::gc`),
/// active VM frames' operand stacks/register files/scope chains, the
/// microtask queue, and embedder-held values. This function performs only
/// the generic arena mark/sweep/finalize mechanics; the caller is
/// responsible for seeding `queues` with every root reference before
/// calling [`run`].
pub fn run(heap: &mut super::Heap, mut queues: WorkQueues) {
    // Mark phase: iterative worklist, never recursive (spec.md §4.7).
    while !queues.is_empty() {
        let objects = std::mem::take(&mut queues.objects);
        for index in objects {
            if heap.mark_object(index) {
                heap.objects[index.into_usize_index()]
                    .as_ref()
                    .expect("marked object must be live")
                    .mark_values(&mut queues);
            }
        }
        let strings = std::mem::take(&mut queues.strings);
        for index in strings {
            heap.mark_string(index);
        }
        let numbers = std::mem::take(&mut queues.numbers);
        for index in numbers {
            heap.mark_number(index);
        }
        let bigints = std::mem::take(&mut queues.bigints);
        for index in bigints {
            heap.mark_bigint(index);
        }
        let symbols = std::mem::take(&mut queues.symbols);
        for index in symbols {
            heap.mark_symbol(index);
        }
        let environments = std::mem::take(&mut queues.environments);
        for index in environments {
            if heap.mark_environment(index) {
                heap.environments[index.into_usize_index()]
                    .as_ref()
                    .expect("marked environment must be live")
                    .mark_values(&mut queues);
            }
        }
        let compiled_codes = std::mem::take(&mut queues.compiled_codes);
        for index in compiled_codes {
            if heap.mark_compiled_code(index) {
                heap.compiled_codes[index.into_usize_index()]
                    .as_ref()
                    .expect("marked compiled code must be live")
                    .mark_values(&mut queues);
            }
        }
    }

    // Sweep phase: every arena slot not marked this cycle is unreachable.
    // Finalizers run after marking is complete in its entirety (spec.md
    // §4.7 invariant); no allocation happens from inside a mark function,
    // so this ordering is safe by construction.
    heap.sweep_objects();
    heap.sweep_strings();
    heap.sweep_numbers();
    heap.sweep_bigints();
    heap.sweep_symbols();
    heap.sweep_environments();
    heap.sweep_compiled_codes();
    heap.clear_marks();
}
