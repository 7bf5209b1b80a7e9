// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)
//!
//! `spec.md` §6.3: a realm bundles one global object, one global
//! environment, and one table of 150+ intrinsic objects. Everything a
//! script sees ("the" `Array`, "the" `Object.prototype`) is looked up
//! through its realm, not a process-wide singleton, so that two realms
//! (e.g. an iframe and its parent, or two separate `Context`-owned realms
//! in an embedding) never observe each other's prototypes.

use ahash::AHashMap;

use super::environments::{EnvironmentHeapData, EnvironmentIndex};
use crate::context::Context;
use crate::heap::gc::{HeapMarkAndSweep, WorkQueues};
use crate::types::language::object::ObjectKind;
use crate::types::language::{Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RealmId(pub(crate) u32);

/// Well-known intrinsic objects, keyed by their `%Name%` spelling
/// (`spec.md` §6.3). A map rather than a giant struct of 150 fields keeps
/// `Realm` a manageable size and lets builtins look an intrinsic up by the
/// same string ECMA-262 itself uses in cross-references.
#[derive(Debug, Default)]
pub struct Intrinsics {
    table: AHashMap<&'static str, Value>,
}

impl Intrinsics {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.table.get(name).copied()
    }

    pub fn set(&mut self, name: &'static str, value: Value) {
        self.table.insert(name, value);
    }
}

#[derive(Debug)]
pub struct Realm {
    pub id: RealmId,
    pub global_object: Object,
    pub global_env: EnvironmentIndex,
    pub intrinsics: Intrinsics,
}

impl HeapMarkAndSweep for Realm {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.push_object(self.global_object.index());
        queues.push_environment(self.global_env.index());
        for value in self.intrinsics.table.values() {
            value.mark_values(queues);
        }
    }
}

impl Realm {
    /// `InitializeHostDefinedRealm`: allocates the realm's global
    /// environment and global object and wires every intrinsic onto it via
    /// `builtins::global_object::initialize`. The global object doesn't
    /// exist yet when the global environment record needs to be created
    /// (it targets that very object), so a placeholder object stands in
    /// and is patched into the environment once `initialize` has built the
    /// real one.
    pub fn new(agent: &mut Context) -> RealmId {
        let placeholder = agent.heap.create_object(None, ObjectKind::Ordinary);
        let global_env = agent.heap.create_environment(EnvironmentHeapData::Global {
            object_record_target: placeholder,
            declarative_bindings: AHashMap::new(),
            var_names: Vec::new(),
        });
        let realm = Realm {
            id: RealmId(0),
            global_object: placeholder,
            global_env,
            intrinsics: Intrinsics::default(),
        };
        let id = agent.push_realm(realm);
        agent.realm_mut(id).id = id;

        crate::builtins::global_object::initialize(agent, id);

        let global_object = agent.realm(id).global_object;
        if let EnvironmentHeapData::Global { object_record_target, .. } = global_env.data_mut(agent) {
            *object_record_target = global_object;
        }
        id
    }
}
