// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### The parser/bytecode compiler (`spec.md` §4.4, §4.5)
//!
//! A single-pass recursive-descent compiler driving [`crate::lexer::Lexer`]
//! directly: there is no intermediate AST — every grammar production emits
//! [`OpCode`]s into the enclosing [`Scope`] as it's recognized, the same
//! "parse and emit in the same walk" shape as the teacher's own bytecode
//! compiler. [`hoist`] supplies the one pre-pass the single-pass design
//! still needs: discovering a block's `var`/`let`/`const` names before its
//! body compiles, so TDZ and `var`-before-declaration visibility hold.
//!
//! Known, deliberate scope limits (kept out of this pass rather than
//! half-implemented): no destructuring patterns (array/object binding or
//! assignment targets), no generator/async function bodies (they parse
//! but the VM has no resumable-frame support to run them on), no class
//! `extends`/static members/private fields/accessors, `const` compiles
//! identically to `let` (the VM's binding model has no separate
//! immutability enforcement path — see DESIGN.md).

pub mod expr;
pub mod hoist;

use ahash::AHashMap;

use crate::bytecode::opcode::OpCode;
use crate::bytecode::{CompiledCodeData, CompiledCodeId, DebugInfo, ParameterInfo};
use crate::context::Context;
use crate::lexer::error::{ParseError, ParseErrorKind, ParseResult};
use crate::lexer::{Lexer, Token};
use crate::types::language::JsString;

pub(crate) struct LoopContext {
    label: Option<String>,
    breaks: Vec<usize>,
    continues: Vec<usize>,
}

pub(crate) struct Scope {
    instructions: Vec<OpCode>,
    strings: Vec<JsString>,
    string_index: AHashMap<String, u16>,
    numbers: Vec<f64>,
    number_index: AHashMap<u64, u16>,
    nested: Vec<CompiledCodeId>,
    is_strict: bool,
    loops: Vec<LoopContext>,
}

impl Scope {
    fn new(is_strict: bool) -> Self {
        Scope {
            instructions: Vec::new(),
            strings: Vec::new(),
            string_index: AHashMap::new(),
            numbers: Vec::new(),
            number_index: AHashMap::new(),
            nested: Vec::new(),
            is_strict,
            loops: Vec::new(),
        }
    }
}

/// A single-pass compiler over one top-level script body. Nested function
/// bodies push and pop their own [`Scope`] on `scopes` but share the one
/// [`Lexer`] walking the whole source text.
pub struct Compiler<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    scopes: Vec<Scope>,
}

pub fn parse_program(agent: &mut Context, source: &str) -> ParseResult<CompiledCodeId> {
    let mut compiler = Compiler { lexer: Lexer::new(source), source, scopes: vec![Scope::new(false)] };
    compiler.lexer.next();
    compiler.compile_statement_list(agent, Token::Eof)?;
    compiler.finish(agent, Vec::new())
}

impl<'a> Compiler<'a> {
    fn scope(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("Compiler always has an active scope")
    }

    fn emit(&mut self, op: OpCode) -> usize {
        self.scope().instructions.push(op);
        self.scope().instructions.len() - 1
    }

    fn here(&mut self) -> usize {
        self.scope().instructions.len()
    }

    /// Patches a previously emitted jump/handler instruction's offset so it
    /// targets `target` (an absolute instruction index), relative to the
    /// instruction immediately following the jump (`ctx.ip` is incremented
    /// before dispatch, so offsets are deltas from there).
    fn patch_jump(&mut self, at: usize, target: usize) {
        let offset = target as i64 - (at as i64 + 1);
        let offset = offset as i32;
        let scope = self.scope();
        scope.instructions[at] = match scope.instructions[at] {
            OpCode::Jump { .. } => OpCode::Jump { offset },
            OpCode::JumpIfTrue { .. } => OpCode::JumpIfTrue { offset },
            OpCode::JumpIfFalse { .. } => OpCode::JumpIfFalse { offset },
            OpCode::JumpIfNullish { .. } => OpCode::JumpIfNullish { offset },
            other => other,
        };
    }

    fn string_const(&mut self, agent: &mut Context, text: &str) -> u16 {
        if let Some(&idx) = self.scope().string_index.get(text) {
            return idx;
        }
        let js = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(text));
        let scope = self.scope();
        let idx = scope.strings.len() as u16;
        scope.strings.push(js);
        scope.string_index.insert(text.to_string(), idx);
        idx
    }

    fn number_const(&mut self, value: f64) -> u16 {
        let bits = value.to_bits();
        if let Some(&idx) = self.scope().number_index.get(&bits) {
            return idx;
        }
        let scope = self.scope();
        let idx = scope.numbers.len() as u16;
        scope.numbers.push(value);
        scope.number_index.insert(bits, idx);
        idx
    }

    fn add_nested(&mut self, code: CompiledCodeId) -> u16 {
        let scope = self.scope();
        let idx = scope.nested.len() as u16;
        scope.nested.push(code);
        idx
    }

    fn finish(&mut self, agent: &mut Context, parameters: Vec<ParameterInfo>) -> ParseResult<CompiledCodeId> {
        let scope = self.scopes.pop().expect("finish() called with no active scope");
        let code = CompiledCodeData {
            instructions: scope.instructions.into_boxed_slice(),
            string_constants: scope.strings.into_boxed_slice(),
            number_constants: scope.numbers.into_boxed_slice(),
            nested_codes: scope.nested.into_boxed_slice(),
            parameters: parameters.into_boxed_slice(),
            is_strict: scope.is_strict,
            source_text_length: 0,
            debug_info: DebugInfo::default(),
        };
        Ok(agent.heap.create_compiled_code(code))
    }

    // --- token helpers ---

    fn tok(&self) -> Token {
        self.lexer.token
    }

    fn bump(&mut self) {
        self.lexer.next();
    }

    fn text(&self) -> &'a str {
        self.lexer.text()
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        let (line, column) = self.lexer.position();
        ParseError::new(self.source, self.lexer.start, self.lexer.index, line, column, kind)
    }

    fn expect(&mut self, token: Token, what: &'static str) -> ParseResult<()> {
        if self.tok() != token {
            return Err(self.err(ParseErrorKind::Expected { expected: what }));
        }
        self.bump();
        Ok(())
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.tok() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        if self.tok() != Token::Ident {
            return Err(self.err(ParseErrorKind::Expected { expected: "identifier" }));
        }
        let name = self.text().to_string();
        self.bump();
        Ok(name)
    }

    /// Accepts an identifier or a keyword used in property-name position
    /// (`obj.catch`, `{ class: 1 }`).
    fn expect_property_name(&mut self) -> ParseResult<String> {
        if self.tok() == Token::Ident || crate::lexer::token::KEYWORDS.get(self.text()).is_some() {
            let name = self.text().to_string();
            self.bump();
            Ok(name)
        } else {
            Err(self.err(ParseErrorKind::Expected { expected: "property name" }))
        }
    }

    fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.tok() == Token::Semi {
            self.bump();
            return Ok(());
        }
        if self.tok() == Token::RBrace || self.tok() == Token::Eof || self.lexer.has_newline_before {
            return Ok(());
        }
        Err(self.err(ParseErrorKind::Expected { expected: "';'" }))
    }

    // --- statements ---

    /// Compiles statements up to (not including) `end`. Emits block-entry
    /// hoisted `var`/`let`/`const` bindings first (`hoist::scan_block_declarations`).
    fn compile_statement_list(&mut self, agent: &mut Context, end: Token) -> ParseResult<()> {
        let remaining = &self.source[self.lexer.start..];
        let decls = hoist::scan_block_declarations(remaining);
        for decl in decls {
            let idx = self.string_const(agent, &decl.name);
            self.emit(OpCode::CreateMutableBinding { name: idx });
            if decl.kind == hoist::DeclKind::Var {
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::InitializeBinding { name: idx });
            }
        }
        while self.tok() != end {
            if self.tok() == Token::Eof {
                return Err(self.err(ParseErrorKind::Expected { expected: "'}'" }));
            }
            self.compile_statement(agent)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        match self.tok() {
            Token::Semi => {
                self.bump();
                Ok(())
            }
            Token::LBrace => self.compile_block(agent),
            Token::KeywordVar => self.compile_variable_statement(agent, hoist::DeclKind::Var),
            Token::KeywordLet => self.compile_variable_statement(agent, hoist::DeclKind::Let),
            Token::KeywordConst => self.compile_variable_statement(agent, hoist::DeclKind::Const),
            Token::KeywordFunction => self.compile_function_declaration(agent),
            Token::KeywordClass => self.compile_class_declaration(agent),
            Token::KeywordIf => self.compile_if_statement(agent),
            Token::KeywordWhile => self.compile_while_statement(agent, None),
            Token::KeywordDo => self.compile_do_while_statement(agent, None),
            Token::KeywordFor => self.compile_for_statement(agent, None),
            Token::KeywordReturn => self.compile_return_statement(agent),
            Token::KeywordBreak => self.compile_break_statement(),
            Token::KeywordContinue => self.compile_continue_statement(),
            Token::KeywordThrow => self.compile_throw_statement(agent),
            Token::KeywordTry => self.compile_try_statement(agent),
            Token::KeywordSwitch => self.compile_switch_statement(agent),
            Token::KeywordDebugger => {
                self.bump();
                self.consume_semicolon()
            }
            Token::Ident => {
                // Disambiguate `label: statement` from an expression statement.
                let save = self.lexer.clone();
                let name = self.text().to_string();
                self.bump();
                if self.tok() == Token::Colon {
                    self.bump();
                    return self.compile_labeled_statement(agent, name);
                }
                self.lexer = save;
                self.compile_expression_statement(agent)
            }
            _ => self.compile_expression_statement(agent),
        }
    }

    fn compile_block(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.expect(Token::LBrace, "'{'")?;
        self.emit(OpCode::PushLexicalEnvironment);
        self.compile_statement_list(agent, Token::RBrace)?;
        self.expect(Token::RBrace, "'}'")?;
        self.emit(OpCode::PopLexicalEnvironment);
        Ok(())
    }

    fn compile_expression_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.compile_expression(agent)?;
        self.emit(OpCode::Pop);
        self.consume_semicolon()
    }

    fn compile_variable_statement(&mut self, agent: &mut Context, kind: hoist::DeclKind) -> ParseResult<()> {
        self.bump(); // var/let/const
        loop {
            let name = self.expect_ident()?;
            let idx = self.string_const(agent, &name);
            if self.eat(Token::Equal) {
                self.compile_assignment_expression(agent)?;
                if kind == hoist::DeclKind::Var {
                    self.emit(OpCode::SetBinding { name: idx });
                    self.emit(OpCode::Pop);
                } else {
                    self.emit(OpCode::InitializeBinding { name: idx });
                }
            } else if kind != hoist::DeclKind::Var {
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::InitializeBinding { name: idx });
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.consume_semicolon()
    }

    fn compile_function_declaration(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // function
        let is_generator = self.eat(Token::Mul);
        let name = self.expect_ident()?;
        let name_idx = self.string_const(agent, &name);
        self.emit(OpCode::CreateMutableBinding { name: name_idx });
        let code_id = self.compile_function_body(agent, is_generator)?;
        let nested_idx = self.add_nested(code_id);
        self.emit(OpCode::MakeClosure { code_index: nested_idx });
        self.emit(OpCode::InitializeBinding { name: name_idx });
        Ok(())
    }

    /// Parses `(params) { body }` (the cursor is on `(`) and compiles it
    /// into a fresh nested [`CompiledCodeData`].
    fn compile_function_body(&mut self, agent: &mut Context, _is_generator: bool) -> ParseResult<CompiledCodeId> {
        self.expect(Token::LParen, "'('")?;
        let mut parameters = Vec::new();
        while self.tok() != Token::RParen {
            let is_rest = self.eat(Token::Spread);
            let pname = self.expect_ident()?;
            let has_default = self.eat(Token::Equal);
            if has_default {
                self.parse_and_discard_assignment_expression(agent)?;
            }
            let js_name = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(&pname));
            parameters.push(ParameterInfo { name: js_name, has_default, is_rest });
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        self.expect(Token::LBrace, "'{'")?;
        let outer_strict = self.scopes.last().map(|s| s.is_strict).unwrap_or(false);
        self.scopes.push(Scope::new(outer_strict));
        self.compile_statement_list(agent, Token::RBrace)?;
        self.expect(Token::RBrace, "'}'")?;
        self.finish(agent, parameters)
    }

    /// Parses a throwaway expression purely to keep the lexer in sync
    /// (default parameter values are accepted syntactically, per
    /// `bind_parameters`'s existing restriction that every parameter is
    /// bound from the call argument or `undefined` — see DESIGN.md).
    fn parse_and_discard_assignment_expression(&mut self, agent: &mut Context) -> ParseResult<()> {
        let saved = std::mem::take(&mut self.scope().instructions);
        self.compile_assignment_expression(agent)?;
        self.scope().instructions = saved;
        Ok(())
    }

    fn compile_if_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // if
        self.expect(Token::LParen, "'('")?;
        self.compile_expression(agent)?;
        self.expect(Token::RParen, "')'")?;
        let jmp_else = self.emit(OpCode::JumpIfFalse { offset: 0 });
        self.compile_statement(agent)?;
        if self.eat(Token::KeywordElse) {
            let jmp_end = self.emit(OpCode::Jump { offset: 0 });
            let else_start = self.here();
            self.patch_jump(jmp_else, else_start);
            self.compile_statement(agent)?;
            let end = self.here();
            self.patch_jump(jmp_end, end);
        } else {
            let end = self.here();
            self.patch_jump(jmp_else, end);
        }
        Ok(())
    }

    fn compile_while_statement(&mut self, agent: &mut Context, label: Option<String>) -> ParseResult<()> {
        self.bump(); // while
        self.expect(Token::LParen, "'('")?;
        let loop_start = self.here();
        self.compile_expression(agent)?;
        self.expect(Token::RParen, "')'")?;
        let jmp_end = self.emit(OpCode::JumpIfFalse { offset: 0 });
        self.scope().loops.push(LoopContext { label, breaks: Vec::new(), continues: Vec::new() });
        self.compile_statement(agent)?;
        self.emit(OpCode::Jump { offset: 0 });
        let back = self.here() - 1;
        self.patch_jump(back, loop_start);
        let end = self.here();
        self.patch_jump(jmp_end, end);
        self.finish_loop(end, loop_start);
        Ok(())
    }

    fn compile_do_while_statement(&mut self, agent: &mut Context, label: Option<String>) -> ParseResult<()> {
        self.bump(); // do
        let body_start = self.here();
        self.scope().loops.push(LoopContext { label, breaks: Vec::new(), continues: Vec::new() });
        self.compile_statement(agent)?;
        self.expect(Token::KeywordWhile, "'while'")?;
        self.expect(Token::LParen, "'('")?;
        let continue_target = self.here();
        self.compile_expression(agent)?;
        self.expect(Token::RParen, "')'")?;
        self.consume_semicolon()?;
        let jmp_back = self.emit(OpCode::JumpIfTrue { offset: 0 });
        self.patch_jump(jmp_back, body_start);
        let end = self.here();
        self.finish_loop(end, continue_target);
        Ok(())
    }

    fn finish_loop(&mut self, break_target: usize, continue_target: usize) {
        let loop_ctx = self.scope().loops.pop().expect("finish_loop without matching loop context");
        for at in loop_ctx.breaks {
            self.patch_jump(at, break_target);
        }
        for at in loop_ctx.continues {
            self.patch_jump(at, continue_target);
        }
    }

    fn compile_for_statement(&mut self, agent: &mut Context, label: Option<String>) -> ParseResult<()> {
        self.bump(); // for
        self.expect(Token::LParen, "'('")?;

        // Disambiguate classic `for (;;)` / `for (init; test; update)` from
        // `for (x in obj)` / `for (x of iterable)` by scanning ahead for a
        // top-level `in`/`of` keyword before the matching `)`.
        let save = self.lexer.clone();
        let is_for_in_of = self.scan_ahead_for_in_of();
        self.lexer = save;

        if is_for_in_of {
            return self.compile_for_in_of_statement(agent, label);
        }

        self.emit(OpCode::PushLexicalEnvironment);
        match self.tok() {
            Token::Semi => {}
            Token::KeywordVar => self.compile_variable_statement_no_semi(agent, hoist::DeclKind::Var)?,
            Token::KeywordLet => self.compile_variable_statement_no_semi(agent, hoist::DeclKind::Let)?,
            Token::KeywordConst => self.compile_variable_statement_no_semi(agent, hoist::DeclKind::Const)?,
            _ => {
                self.compile_expression(agent)?;
                self.emit(OpCode::Pop);
            }
        }
        self.expect(Token::Semi, "';'")?;

        let test_start = self.here();
        let jmp_end = if self.tok() != Token::Semi {
            self.compile_expression(agent)?;
            Some(self.emit(OpCode::JumpIfFalse { offset: 0 }))
        } else {
            None
        };
        self.expect(Token::Semi, "';'")?;

        // The update clause is parsed here but must run *after* the body;
        // compile it into a side buffer and splice it in after the body.
        let update_instructions = if self.tok() != Token::RParen {
            let saved = std::mem::take(&mut self.scope().instructions);
            self.compile_expression(agent)?;
            self.emit(OpCode::Pop);
            std::mem::replace(&mut self.scope().instructions, saved)
        } else {
            Vec::new()
        };
        self.expect(Token::RParen, "')'")?;

        self.scope().loops.push(LoopContext { label, breaks: Vec::new(), continues: Vec::new() });
        self.compile_statement(agent)?;
        let continue_target = self.here();
        self.scope().instructions.extend(update_instructions);
        let jmp_back = self.emit(OpCode::Jump { offset: 0 });
        self.patch_jump(jmp_back, test_start);
        let end = self.here();
        if let Some(jmp_end) = jmp_end {
            self.patch_jump(jmp_end, end);
        }
        self.finish_loop(end, continue_target);
        self.emit(OpCode::PopLexicalEnvironment);
        Ok(())
    }

    fn compile_variable_statement_no_semi(&mut self, agent: &mut Context, kind: hoist::DeclKind) -> ParseResult<()> {
        self.bump();
        loop {
            let name = self.expect_ident()?;
            let idx = self.string_const(agent, &name);
            self.emit(OpCode::CreateMutableBinding { name: idx });
            if self.eat(Token::Equal) {
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::InitializeBinding { name: idx });
            } else {
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::InitializeBinding { name: idx });
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(())
    }

    fn scan_ahead_for_in_of(&mut self) -> bool {
        let mut depth = 0i32;
        loop {
            match self.tok() {
                Token::Eof => return false,
                Token::LParen => {
                    depth += 1;
                    self.bump();
                }
                Token::RParen => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                    self.bump();
                }
                Token::Semi if depth == 0 => return false,
                Token::KeywordIn | Token::KeywordOf if depth == 0 => return true,
                _ => self.bump(),
            }
        }
    }

    /// `for (x in obj) body` / `for (let x in obj) body`: evaluates `obj`
    /// once, calls the global `Object.keys` builtin to get an array of own
    /// enumerable-ish keys, then walks it by index — real bytecode, no
    /// bespoke enumerator opcode (see DESIGN.md). `for (x of iterable)` uses
    /// the same array-walk shape directly against `iterable`, array-like
    /// (`length` + indexed `[]`) rather than the full iterator protocol,
    /// matching `builtins::array::iterable_to_vec`'s existing precedent —
    /// there is no `Symbol.iterator` table in this engine to drive a real
    /// iterator-protocol `for-of`.
    fn compile_for_in_of_statement(&mut self, agent: &mut Context, label: Option<String>) -> ParseResult<()> {
        let is_of = {
            let save = self.lexer.clone();
            let found_of = loop {
                match self.tok() {
                    Token::KeywordOf => break true,
                    Token::KeywordIn => break false,
                    Token::Eof => break false,
                    _ => self.bump(),
                }
            };
            self.lexer = save;
            found_of
        };

        self.emit(OpCode::PushLexicalEnvironment);
        let binding_name = match self.tok() {
            Token::KeywordVar | Token::KeywordLet | Token::KeywordConst => {
                self.bump();
                let name = self.expect_ident()?;
                let idx = self.string_const(agent, &name);
                self.emit(OpCode::CreateMutableBinding { name: idx });
                idx
            }
            _ => {
                let name = self.expect_ident()?;
                self.string_const(agent, &name)
            }
        };
        if is_of {
            self.expect(Token::KeywordOf, "'of'")?;
        } else {
            self.expect(Token::KeywordIn, "'in'")?;
        }
        self.compile_assignment_expression(agent)?; // object/iterable
        self.expect(Token::RParen, "')'")?;

        let subject_name = self.string_const(agent, "__for_subject");
        self.emit(OpCode::CreateMutableBinding { name: subject_name });
        self.emit(OpCode::InitializeBinding { name: subject_name });

        let keys_name = self.string_const(agent, "__for_keys");
        self.emit(OpCode::CreateMutableBinding { name: keys_name });
        if is_of {
            self.emit(OpCode::GetBinding { name: subject_name });
        } else {
            let object_ctor = self.string_const(agent, "Object");
            let keys_prop = self.string_const(agent, "keys");
            self.emit(OpCode::GetBinding { name: object_ctor });
            self.emit(OpCode::Dup);
            self.emit(OpCode::GetProperty { key: keys_prop });
            self.emit(OpCode::PushUndefined);
            self.emit(OpCode::Swap);
            self.emit(OpCode::GetBinding { name: subject_name });
            self.emit(OpCode::Call { argument_count: 1 });
        }
        self.emit(OpCode::InitializeBinding { name: keys_name });

        let idx_name = self.string_const(agent, "__for_index");
        self.emit(OpCode::CreateMutableBinding { name: idx_name });
        self.emit(OpCode::PushSmallInteger { value: 0 });
        self.emit(OpCode::InitializeBinding { name: idx_name });

        let length_prop = self.string_const(agent, "length");
        let test_start = self.here();
        self.emit(OpCode::GetBinding { name: idx_name });
        self.emit(OpCode::GetBinding { name: keys_name });
        self.emit(OpCode::GetProperty { key: length_prop });
        self.emit(OpCode::LessThan);
        let jmp_end = self.emit(OpCode::JumpIfFalse { offset: 0 });

        self.emit(OpCode::PushLexicalEnvironment);
        self.emit(OpCode::CreateMutableBinding { name: binding_name });
        self.emit(OpCode::GetBinding { name: keys_name });
        self.emit(OpCode::GetBinding { name: idx_name });
        self.emit(OpCode::GetPropertyComputed);
        self.emit(OpCode::InitializeBinding { name: binding_name });

        self.scope().loops.push(LoopContext { label, breaks: Vec::new(), continues: Vec::new() });
        self.compile_statement(agent)?;
        self.emit(OpCode::PopLexicalEnvironment);

        let continue_target = self.here();
        self.emit(OpCode::GetBinding { name: idx_name });
        self.emit(OpCode::PushSmallInteger { value: 1 });
        self.emit(OpCode::Add);
        self.emit(OpCode::SetBinding { name: idx_name });
        self.emit(OpCode::Pop);
        let jmp_back = self.emit(OpCode::Jump { offset: 0 });
        self.patch_jump(jmp_back, test_start);
        let end = self.here();
        self.patch_jump(jmp_end, end);
        self.finish_loop(end, continue_target);
        self.emit(OpCode::PopLexicalEnvironment);
        Ok(())
    }

    fn compile_return_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump();
        if self.tok() == Token::Semi || self.tok() == Token::RBrace || self.tok() == Token::Eof || self.lexer.has_newline_before {
            self.emit(OpCode::PushUndefined);
        } else {
            self.compile_expression(agent)?;
        }
        self.emit(OpCode::Return);
        self.consume_semicolon()
    }

    fn compile_break_statement(&mut self) -> ParseResult<()> {
        self.bump();
        let label = if !self.lexer.has_newline_before && self.tok() == Token::Ident { Some(self.expect_ident()?) } else { None };
        self.consume_semicolon()?;
        let at = self.emit(OpCode::Jump { offset: 0 });
        let depth = self.find_loop(&label).ok_or_else(|| self.err(ParseErrorKind::IllegalBreak))?;
        self.scope().loops[depth].breaks.push(at);
        Ok(())
    }

    fn compile_continue_statement(&mut self) -> ParseResult<()> {
        self.bump();
        let label = if !self.lexer.has_newline_before && self.tok() == Token::Ident { Some(self.expect_ident()?) } else { None };
        self.consume_semicolon()?;
        let at = self.emit(OpCode::Jump { offset: 0 });
        let depth = self.find_loop(&label).ok_or_else(|| self.err(ParseErrorKind::IllegalContinue))?;
        self.scope().loops[depth].continues.push(at);
        Ok(())
    }

    fn find_loop(&self, label: &Option<String>) -> Option<usize> {
        let loops = &self.scopes.last()?.loops;
        match label {
            None => (!loops.is_empty()).then_some(loops.len() - 1),
            Some(name) => loops.iter().rposition(|l| l.label.as_deref() == Some(name.as_str())),
        }
    }

    fn compile_labeled_statement(&mut self, agent: &mut Context, label: String) -> ParseResult<()> {
        match self.tok() {
            Token::KeywordWhile => self.compile_while_statement(agent, Some(label)),
            Token::KeywordDo => self.compile_do_while_statement(agent, Some(label)),
            Token::KeywordFor => self.compile_for_statement(agent, Some(label)),
            _ => self.compile_statement(agent),
        }
    }

    fn compile_throw_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump();
        self.compile_expression(agent)?;
        self.emit(OpCode::Throw);
        self.consume_semicolon()
    }

    /// `try`/`catch`/`finally` compiles to real bytecode shape
    /// (`PushExceptionHandler`/`PopExceptionHandler` bracket the try body)
    /// even though the VM's handler table isn't wired up yet
    /// (`find_exception_handler` always returns `None` — see
    /// `vm::mod::find_exception_handler`): an exception thrown inside the
    /// `try` body still propagates past this handler to the caller rather
    /// than running `catch`. `finally` only reliably runs on the
    /// no-exception path for the same reason. This is an existing VM
    /// limitation the parser can't paper over; tracked in DESIGN.md.
    fn compile_try_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // try
        let handler_at = self.emit(OpCode::PushExceptionHandler { catch_offset: 0, finally_offset: 0 });
        self.compile_block(agent)?;
        self.emit(OpCode::PopExceptionHandler);
        let catch_start = self.here();

        if self.eat(Token::KeywordCatch) {
            let param_name = if self.eat(Token::LParen) {
                let name = self.expect_ident()?;
                self.expect(Token::RParen, "')'")?;
                Some(name)
            } else {
                None
            };
            self.expect(Token::LBrace, "'{'")?;
            self.emit(OpCode::PushLexicalEnvironment);
            if let Some(name) = param_name {
                let idx = self.string_const(agent, &name);
                self.emit(OpCode::CreateMutableBinding { name: idx });
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::InitializeBinding { name: idx });
            }
            self.compile_statement_list(agent, Token::RBrace)?;
            self.expect(Token::RBrace, "'}'")?;
            self.emit(OpCode::PopLexicalEnvironment);
        }

        let finally_start = self.here();
        if self.eat(Token::KeywordFinally) {
            self.compile_block(agent)?;
        }

        if let OpCode::PushExceptionHandler { .. } = self.scope().instructions[handler_at] {
            self.scope().instructions[handler_at] = OpCode::PushExceptionHandler {
                catch_offset: (catch_start as i64 - (handler_at as i64 + 1)) as i32,
                finally_offset: (finally_start as i64 - (handler_at as i64 + 1)) as i32,
            };
        }
        Ok(())
    }

    /// Desugars to an if/else-if chain over `StrictEqual`, evaluating the
    /// discriminant once into a temporary binding.
    fn compile_switch_statement(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // switch
        self.expect(Token::LParen, "'('")?;
        self.emit(OpCode::PushLexicalEnvironment);
        let disc_name = self.string_const(agent, "__switch_disc");
        self.emit(OpCode::CreateMutableBinding { name: disc_name });
        self.compile_expression(agent)?;
        self.emit(OpCode::InitializeBinding { name: disc_name });
        self.expect(Token::RParen, "')'")?;
        self.expect(Token::LBrace, "'{'")?;

        self.scope().loops.push(LoopContext { label: None, breaks: Vec::new(), continues: Vec::new() });

        let mut end_jumps = Vec::new();
        let mut default_body: Option<usize> = None;
        let mut pending_miss_jump: Option<usize> = None;

        while self.tok() != Token::RBrace {
            if self.eat(Token::KeywordDefault) {
                self.expect(Token::Colon, "':'")?;
                default_body = Some(self.here());
                while !matches!(self.tok(), Token::KeywordCase | Token::KeywordDefault | Token::RBrace) {
                    self.compile_statement(agent)?;
                }
                continue;
            }
            self.expect(Token::KeywordCase, "'case'")?;
            if let Some(at) = pending_miss_jump.take() {
                let here = self.here();
                self.patch_jump(at, here);
            }
            self.emit(OpCode::GetBinding { name: disc_name });
            self.compile_expression(agent)?;
            self.emit(OpCode::StrictEqual);
            let miss = self.emit(OpCode::JumpIfFalse { offset: 0 });
            self.expect(Token::Colon, "':'")?;
            while !matches!(self.tok(), Token::KeywordCase | Token::KeywordDefault | Token::RBrace) {
                self.compile_statement(agent)?;
            }
            end_jumps.push(self.emit(OpCode::Jump { offset: 0 }));
            pending_miss_jump = Some(miss);
        }
        self.expect(Token::RBrace, "'}'")?;

        if let Some(at) = pending_miss_jump.take() {
            if let Some(default_at) = default_body {
                self.patch_jump(at, default_at);
            } else {
                let here = self.here();
                self.patch_jump(at, here);
            }
        }
        let end = self.here();
        for at in end_jumps {
            self.patch_jump(at, end);
        }
        self.finish_loop(end, end);
        self.emit(OpCode::PopLexicalEnvironment);
        Ok(())
    }

    /// Desugars `class Name { constructor(...) {...} method(...) {...} }`
    /// to a plain constructor function plus methods assigned onto its
    /// `.prototype` — no `extends`, static members, accessors, or private
    /// fields (see DESIGN.md). This mirrors how `spec.md`'s bytecode model
    /// has no dedicated class-definition opcode: classes are ordinary
    /// sugar over function + prototype assignment, same as real engines'
    /// desugaring, just without the `[[HomeObject]]`/`super` machinery.
    fn compile_class_declaration(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // class
        let name = self.expect_ident()?;
        let name_idx = self.string_const(agent, &name);
        self.emit(OpCode::CreateMutableBinding { name: name_idx });
        self.expect(Token::LBrace, "'{'")?;

        let mut ctor_code: Option<CompiledCodeId> = None;
        let mut methods: Vec<(String, CompiledCodeId)> = Vec::new();
        while self.tok() != Token::RBrace {
            if self.eat(Token::Semi) {
                continue;
            }
            let is_static = self.eat(Token::KeywordStatic);
            let method_name = self.expect_property_name()?;
            let is_generator = self.eat(Token::Mul);
            let code = self.compile_function_body(agent, is_generator)?;
            if is_static {
                continue; // static members are out of scope; parsed and discarded.
            }
            if method_name == "constructor" {
                ctor_code = Some(code);
            } else {
                methods.push((method_name, code));
            }
        }
        self.expect(Token::RBrace, "'}'")?;

        let ctor_code = match ctor_code {
            Some(code) => code,
            None => {
                // Synthesize an empty constructor.
                self.scopes.push(Scope::new(false));
                self.finish(agent, Vec::new())?
            }
        };
        let ctor_idx = self.add_nested(ctor_code);
        self.emit(OpCode::MakeClosure { code_index: ctor_idx });

        for (method_name, code) in methods {
            self.emit(OpCode::Dup); // constructor
            let proto_prop = self.string_const(agent, "prototype");
            self.emit(OpCode::GetProperty { key: proto_prop });
            let method_idx = self.add_nested(code);
            self.emit(OpCode::MakeClosure { code_index: method_idx });
            let name_prop = self.string_const(agent, &method_name);
            self.emit(OpCode::SetProperty { key: name_prop });
            self.emit(OpCode::Pop);
        }

        self.emit(OpCode::InitializeBinding { name: name_idx });
        Ok(())
    }

    fn compile_expression(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.compile_assignment_expression(agent)?;
        while self.eat(Token::Comma) {
            self.emit(OpCode::Pop);
            self.compile_assignment_expression(agent)?;
        }
        Ok(())
    }
}
