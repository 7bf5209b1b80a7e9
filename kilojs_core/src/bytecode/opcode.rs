// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The VM's instruction set (`spec.md` §4.5, §4.6). Kept as a plain `enum`
//! rather than raw byte opcodes so the compiler and the dispatch loop share
//! one definition; `bytecode::emitter` is responsible for the actual
//! variable-length byte encoding into `CompiledCodeData::instructions`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    // --- stack manipulation ---
    PushUndefined,
    PushNull,
    PushTrue,
    PushFalse,
    PushEmptyString,
    PushConstantString { index: u16 },
    PushConstantNumber { index: u16 },
    PushSmallInteger { value: i32 },
    Pop,
    Dup,
    Swap,

    // --- bindings ---
    GetBinding { name: u16 },
    SetBinding { name: u16 },
    GetLocal { slot: u16 },
    SetLocal { slot: u16 },
    InitializeBinding { name: u16 },
    CreateMutableBinding { name: u16 },
    PushLexicalEnvironment,
    PopLexicalEnvironment,

    // --- properties ---
    GetProperty { key: u16 },
    SetProperty { key: u16 },
    GetPropertyComputed,
    SetPropertyComputed,
    DeleteProperty { key: u16 },
    DeletePropertyComputed,

    // --- operators (`spec.md` §4.6 "operator fusion") ---
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    Negate,
    Not,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    InstanceOf,
    In,
    TypeOf,

    // --- fused increment/decrement + binding/property update in one op,
    // the peephole-fusion pass `spec.md` §4.5 calls for ---
    IncrementLocal { slot: u16 },
    DecrementLocal { slot: u16 },

    // --- control flow ---
    Jump { offset: i32 },
    JumpIfTrue { offset: i32 },
    JumpIfFalse { offset: i32 },
    JumpIfNullish { offset: i32 },

    // --- calls ---
    Call { argument_count: u16 },
    CallSpread,
    New { argument_count: u16 },
    Return,
    MakeClosure { code_index: u16 },

    // --- objects/arrays ---
    NewObject,
    NewArray { element_count: u16 },
    NewArraySpread,

    // --- exceptions (`spec.md` §4.6 "exception dispatch table") ---
    Throw,
    PushExceptionHandler { catch_offset: i32, finally_offset: i32 },
    PopExceptionHandler,

    // --- iteration protocol ---
    GetIterator,
    IteratorNext,
    IteratorClose,

    // --- generators/async (`spec.md` §4.6 "Generators and async functions
    // as resumable frames") ---
    Yield,
    YieldStar,
    Await,

    // --- `with` ---
    PushWithEnvironment,

    Nop,
}
