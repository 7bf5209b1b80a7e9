// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)

use crate::heap::indexes::Index;
use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigIntHeapData(pub BigInt);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapBigInt(pub(crate) Index<BigIntHeapData>);

impl HeapBigInt {
    pub fn value<'a>(self, agent: &'a crate::context::Context) -> &'a BigInt {
        &agent.heap.bigints[self.0.into_usize_index()]
            .as_ref()
            .expect("dangling HeapBigInt index")
            .0
    }
}
