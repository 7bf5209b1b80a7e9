// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.5 The Symbol Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-symbol-type)

use super::string::JsString;
use crate::heap::indexes::Index;

#[derive(Debug, Clone)]
pub struct SymbolHeapData {
    pub descriptor: Option<JsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub(crate) Index<SymbolHeapData>);

impl Symbol {
    pub fn descriptor(self, agent: &crate::context::Context) -> Option<JsString> {
        agent.heap.symbols[self.0.into_usize_index()]
            .as_ref()
            .expect("dangling Symbol index")
            .descriptor
    }
}
