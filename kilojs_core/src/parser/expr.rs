// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Expression grammar: precedence-climbing binary/assignment parsing over
//! the member/call/new "left-hand-side expression" chain.
//!
//! Property and binding accesses are deferred as a [`Ref`] rather than
//! eagerly fetched — `a.b = 1`, `a.b += 1`, and plain `a.b` all start by
//! parsing the same member chain, and only decide which `Get`/`Set`
//! opcode to emit once the following token (`=`, `+=`, or anything else)
//! is known. This keeps every lvalue form to a single evaluation of its
//! object/key subexpressions without needing a stack-rotation opcode the
//! VM doesn't have (see the scope notes on compound/computed targets
//! below).

use crate::bytecode::{CompiledCodeId, ParameterInfo};
use crate::bytecode::opcode::OpCode;
use crate::context::Context;
use crate::lexer::error::{ParseErrorKind, ParseResult};
use crate::lexer::Token;

use super::{Compiler, Scope};

/// A not-yet-fetched place expression. The stack already holds whatever
/// component values the access needs (nothing for a binding, the receiver
/// for a non-computed member, the receiver and key for a computed one);
/// [`Compiler::finish_ref_as_value`] emits the `Get*` that turns it into a
/// value, and the assignment-operator compilers emit the matching `Set*`
/// instead.
#[derive(Debug, Clone, Copy)]
enum Ref {
    /// A value already sits on top of the stack; not an assignable target.
    None,
    Binding(u16),
    Member { computed: bool, key: u16 },
}

impl<'a> Compiler<'a> {
    // --- lvalue plumbing ---

    fn finish_ref_as_value(&mut self, r: Ref) {
        match r {
            Ref::None => {}
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
            }
            Ref::Member { computed: false, key } => {
                self.emit(OpCode::GetProperty { key });
            }
            Ref::Member { computed: true, .. } => {
                self.emit(OpCode::GetPropertyComputed);
            }
        }
    }

    fn compile_postfix_incdec(&mut self, r: Ref, is_inc: bool) -> ParseResult<()> {
        match r {
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
                self.emit(OpCode::Dup);
                self.emit(OpCode::PushSmallInteger { value: 1 });
                self.emit(if is_inc { OpCode::Add } else { OpCode::Subtract });
                self.emit(OpCode::SetBinding { name });
                self.emit(OpCode::Pop);
                Ok(())
            }
            Ref::Member { .. } => Err(self.err(ParseErrorKind::Expected {
                expected: "identifier (postfix '++'/'--' on member expressions is not supported)",
            })),
            Ref::None => Err(self.err(ParseErrorKind::Expected { expected: "reference before '++'/'--'" })),
        }
    }

    fn compile_prefix_incdec(&mut self, agent: &mut Context, is_inc: bool) -> ParseResult<()> {
        self.bump(); // ++ or --
        let r = self.parse_postfix(agent)?;
        match r {
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
                self.emit(OpCode::PushSmallInteger { value: 1 });
                self.emit(if is_inc { OpCode::Add } else { OpCode::Subtract });
                self.emit(OpCode::SetBinding { name });
                Ok(())
            }
            Ref::Member { computed: false, key } => {
                self.emit(OpCode::Dup);
                self.emit(OpCode::GetProperty { key });
                self.emit(OpCode::PushSmallInteger { value: 1 });
                self.emit(if is_inc { OpCode::Add } else { OpCode::Subtract });
                self.emit(OpCode::SetProperty { key });
                Ok(())
            }
            Ref::Member { computed: true, .. } => Err(self.err(ParseErrorKind::Expected {
                expected: "identifier (prefix '++'/'--' on computed member expressions is not supported)",
            })),
            Ref::None => Err(self.err(ParseErrorKind::Expected { expected: "reference after '++'/'--'" })),
        }
    }

    fn compile_delete(&mut self, agent: &mut Context) -> ParseResult<()> {
        self.bump(); // delete
        let r = self.parse_postfix(agent)?;
        match r {
            Ref::Member { computed: false, key } => {
                self.emit(OpCode::DeleteProperty { key });
            }
            Ref::Member { computed: true, .. } => {
                self.emit(OpCode::DeletePropertyComputed);
            }
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
                self.emit(OpCode::Pop);
                self.emit(OpCode::PushTrue);
            }
            Ref::None => {
                self.emit(OpCode::Pop);
                self.emit(OpCode::PushTrue);
            }
        }
        Ok(())
    }

    // --- unary ---

    fn is_unary_prefix_token(&self) -> bool {
        matches!(
            self.tok(),
            Token::Not
                | Token::BNot
                | Token::Sub
                | Token::Add
                | Token::KeywordTypeOf
                | Token::KeywordVoid
                | Token::KeywordDelete
                | Token::Inc
                | Token::Dec
        )
    }

    pub(super) fn parse_unary(&mut self, agent: &mut Context) -> ParseResult<()> {
        match self.tok() {
            Token::Not => {
                self.bump();
                self.parse_unary(agent)?;
                self.emit(OpCode::Not);
                Ok(())
            }
            Token::BNot => {
                self.bump();
                self.parse_unary(agent)?;
                self.emit(OpCode::BitNot);
                Ok(())
            }
            Token::Sub => {
                self.bump();
                self.parse_unary(agent)?;
                self.emit(OpCode::Negate);
                Ok(())
            }
            Token::Add => {
                self.bump();
                self.parse_unary(agent)?;
                // There's no dedicated ToNumber opcode; negating twice
                // performs the same numeric coercion unary `+` needs.
                self.emit(OpCode::Negate);
                self.emit(OpCode::Negate);
                Ok(())
            }
            Token::KeywordTypeOf => {
                self.bump();
                self.parse_unary(agent)?;
                self.emit(OpCode::TypeOf);
                Ok(())
            }
            Token::KeywordVoid => {
                self.bump();
                self.parse_unary(agent)?;
                self.emit(OpCode::Pop);
                self.emit(OpCode::PushUndefined);
                Ok(())
            }
            Token::KeywordDelete => self.compile_delete(agent),
            Token::Inc => self.compile_prefix_incdec(agent, true),
            Token::Dec => self.compile_prefix_incdec(agent, false),
            _ => self.parse_postfix_expression(agent),
        }
    }

    fn parse_postfix_expression(&mut self, agent: &mut Context) -> ParseResult<()> {
        let r = self.parse_postfix(agent)?;
        if !self.lexer.has_newline_before && matches!(self.tok(), Token::Inc | Token::Dec) {
            let is_inc = self.tok() == Token::Inc;
            self.bump();
            self.compile_postfix_incdec(r, is_inc)
        } else {
            self.finish_ref_as_value(r);
            Ok(())
        }
    }

    // --- member/call/new chain ---

    fn parse_postfix(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        let mut r = if self.tok() == Token::KeywordNew { self.parse_new_expression(agent)? } else { self.parse_primary(agent)? };
        loop {
            match self.tok() {
                Token::Dot => {
                    self.finish_ref_as_value(r);
                    self.bump();
                    let name = self.expect_property_name()?;
                    let key = self.string_const(agent, &name);
                    r = Ref::Member { computed: false, key };
                }
                Token::OptionalChain => {
                    // Parsed and compiled like plain member/call access —
                    // the short-circuit-on-nullish behavior isn't wired up
                    // (see DESIGN.md); `a?.b` still throws if `a` is
                    // nullish, same as `a.b`.
                    self.finish_ref_as_value(r);
                    self.bump();
                    if self.tok() == Token::LParen {
                        r = self.parse_call(agent, Ref::None)?;
                    } else if self.eat(Token::LBrack) {
                        self.compile_expression(agent)?;
                        self.expect(Token::RBrack, "']'")?;
                        r = Ref::Member { computed: true, key: 0 };
                    } else {
                        let name = self.expect_property_name()?;
                        let key = self.string_const(agent, &name);
                        r = Ref::Member { computed: false, key };
                    }
                }
                Token::LBrack => {
                    self.finish_ref_as_value(r);
                    self.bump();
                    self.compile_expression(agent)?;
                    self.expect(Token::RBrack, "']'")?;
                    r = Ref::Member { computed: true, key: 0 };
                }
                Token::LParen => {
                    r = self.parse_call(agent, r)?;
                }
                _ => break,
            }
        }
        Ok(r)
    }

    fn parse_arguments(&mut self, agent: &mut Context) -> ParseResult<(u16, bool)> {
        self.expect(Token::LParen, "'('")?;
        let mut count = 0u16;
        let mut has_spread = false;
        while self.tok() != Token::RParen {
            if self.eat(Token::Spread) {
                has_spread = true;
            }
            self.compile_assignment_expression(agent)?;
            count += 1;
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok((count, has_spread))
    }

    /// Emits whatever gets `[this, callee]` onto the stack for `r`, per the
    /// VM's `Call` convention (see `vm::mod::execute_one`'s `Call` arm),
    /// then the argument values, then the call itself. Non-computed method
    /// calls dup the receiver before fetching the method so it doubles as
    /// `this`; every other call form passes `undefined` as `this` — a
    /// `a[expr]()` computed-member call has no way to keep the receiver
    /// around for `this` without a 3-deep stack rotation the VM doesn't
    /// have (see DESIGN.md).
    fn parse_call(&mut self, agent: &mut Context, r: Ref) -> ParseResult<Ref> {
        match r {
            Ref::Member { computed: false, key } => {
                self.emit(OpCode::Dup);
                self.emit(OpCode::GetProperty { key });
            }
            Ref::Member { computed: true, .. } => {
                self.emit(OpCode::GetPropertyComputed);
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::Swap);
            }
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::Swap);
            }
            Ref::None => {
                self.emit(OpCode::PushUndefined);
                self.emit(OpCode::Swap);
            }
        }
        let (count, has_spread) = self.parse_arguments(agent)?;
        if has_spread {
            self.emit(OpCode::CallSpread);
        } else {
            self.emit(OpCode::Call { argument_count: count });
        }
        Ok(Ref::None)
    }

    /// `new` binds to the nearest member chain, not through any call
    /// parens (`new a.b.C(1)` constructs `a.b.C`, not `a.b.C(1)`'s result).
    fn parse_new_expression(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        self.bump(); // new
        if self.tok() == Token::Dot {
            return Err(self.err(ParseErrorKind::Expected { expected: "constructor expression ('new.target' is not supported)" }));
        }
        let callee = if self.tok() == Token::KeywordNew {
            self.parse_new_expression(agent)?
        } else {
            let mut r = self.parse_primary(agent)?;
            loop {
                match self.tok() {
                    Token::Dot => {
                        self.finish_ref_as_value(r);
                        self.bump();
                        let name = self.expect_property_name()?;
                        let key = self.string_const(agent, &name);
                        r = Ref::Member { computed: false, key };
                    }
                    Token::LBrack => {
                        self.finish_ref_as_value(r);
                        self.bump();
                        self.compile_expression(agent)?;
                        self.expect(Token::RBrack, "']'")?;
                        r = Ref::Member { computed: true, key: 0 };
                    }
                    _ => break,
                }
            }
            r
        };
        self.finish_ref_as_value(callee);
        let argument_count = if self.tok() == Token::LParen {
            let (count, has_spread) = self.parse_arguments(agent)?;
            if has_spread {
                return Err(self.err(ParseErrorKind::Expected { expected: "argument (spread arguments in 'new' expressions are not supported)" }));
            }
            count
        } else {
            0
        };
        self.emit(OpCode::New { argument_count });
        Ok(Ref::None)
    }

    // --- primary ---

    fn looks_like_arrow_params(&self) -> bool {
        let mut lexer = self.lexer;
        let mut depth = 0i32;
        loop {
            match lexer.token {
                Token::Eof => return false,
                Token::LParen => {
                    depth += 1;
                    lexer.next();
                }
                Token::RParen => {
                    depth -= 1;
                    lexer.next();
                    if depth == 0 {
                        return lexer.token == Token::Arrow;
                    }
                }
                _ => lexer.next(),
            }
        }
    }

    fn parse_primary(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        match self.tok() {
            Token::Number => {
                let value = parse_number_literal(self.text());
                self.bump();
                let idx = self.number_const(value);
                self.emit(OpCode::PushConstantNumber { index: idx });
                Ok(Ref::None)
            }
            Token::String => {
                let decoded = decode_string_literal(self.text());
                self.bump();
                let idx = self.string_const(agent, &decoded);
                self.emit(OpCode::PushConstantString { index: idx });
                Ok(Ref::None)
            }
            Token::KeywordTrue => {
                self.bump();
                self.emit(OpCode::PushTrue);
                Ok(Ref::None)
            }
            Token::KeywordFalse => {
                self.bump();
                self.emit(OpCode::PushFalse);
                Ok(Ref::None)
            }
            Token::KeywordNull => {
                self.bump();
                self.emit(OpCode::PushNull);
                Ok(Ref::None)
            }
            Token::KeywordThis => {
                self.bump();
                let idx = self.string_const(agent, "this");
                Ok(Ref::Binding(idx))
            }
            Token::Ident => {
                let name = self.text().to_string();
                self.bump();
                if self.tok() == Token::Arrow {
                    self.compile_arrow_function_single(agent, name)?;
                    return Ok(Ref::None);
                }
                let idx = self.string_const(agent, &name);
                Ok(Ref::Binding(idx))
            }
            Token::LParen => {
                if self.looks_like_arrow_params() {
                    self.compile_arrow_function_parenthesized(agent)?;
                    return Ok(Ref::None);
                }
                self.bump();
                self.compile_expression(agent)?;
                self.expect(Token::RParen, "')'")?;
                Ok(Ref::None)
            }
            Token::LBrack => self.compile_array_literal(agent),
            Token::LBrace => self.compile_object_literal(agent),
            Token::KeywordFunction => self.compile_function_expression(agent),
            Token::TemplateStart | Token::Template => {
                self.compile_template_literal(agent)?;
                Ok(Ref::None)
            }
            Token::BigInt => Err(self.err(ParseErrorKind::Expected { expected: "number (BigInt literals are not supported)" })),
            Token::KeywordClass => Err(self.err(ParseErrorKind::Expected { expected: "expression (class expressions are not supported)" })),
            _ => Err(self.err(ParseErrorKind::UnexpectedToken)),
        }
    }

    fn compile_array_literal(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        self.bump(); // [
        let mut count = 0u16;
        let mut has_spread = false;
        while self.tok() != Token::RBrack {
            if self.tok() == Token::Comma {
                self.emit(OpCode::PushUndefined);
                count += 1;
                self.bump();
                continue;
            }
            if self.eat(Token::Spread) {
                has_spread = true;
            }
            self.compile_assignment_expression(agent)?;
            count += 1;
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrack, "']'")?;
        if has_spread {
            self.emit(OpCode::NewArraySpread);
        } else {
            self.emit(OpCode::NewArray { element_count: count });
        }
        Ok(Ref::None)
    }

    /// `{ key: value, [computed]: value, shorthand, method() {} }`. No
    /// object spread and no accessor (`get`/`set`) properties — parsed as
    /// a hard error rather than silently dropped (see DESIGN.md).
    fn compile_object_literal(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        self.bump(); // {
        self.emit(OpCode::NewObject);
        while self.tok() != Token::RBrace {
            if self.tok() == Token::Spread {
                return Err(self.err(ParseErrorKind::Expected { expected: "property (object spread is not supported)" }));
            }
            self.emit(OpCode::Dup);
            if self.eat(Token::LBrack) {
                self.compile_assignment_expression(agent)?;
                self.expect(Token::RBrack, "']'")?;
                if self.tok() == Token::LParen {
                    let code = self.compile_function_body(agent, false)?;
                    let idx = self.add_nested(code);
                    self.emit(OpCode::MakeClosure { code_index: idx });
                } else {
                    self.expect(Token::Colon, "':'")?;
                    self.compile_assignment_expression(agent)?;
                }
                self.emit(OpCode::SetPropertyComputed);
            } else {
                let name = self.expect_property_name()?;
                if self.tok() == Token::LParen {
                    let code = self.compile_function_body(agent, false)?;
                    let idx = self.add_nested(code);
                    self.emit(OpCode::MakeClosure { code_index: idx });
                } else if self.eat(Token::Colon) {
                    self.compile_assignment_expression(agent)?;
                } else {
                    let name_idx = self.string_const(agent, &name);
                    self.emit(OpCode::GetBinding { name: name_idx });
                }
                let key = self.string_const(agent, &name);
                self.emit(OpCode::SetProperty { key });
            }
            self.emit(OpCode::Pop);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "'}'")?;
        Ok(Ref::None)
    }

    fn compile_function_expression(&mut self, agent: &mut Context) -> ParseResult<Ref> {
        self.bump(); // function
        let is_generator = self.eat(Token::Mul);
        if self.tok() == Token::Ident {
            self.bump(); // named function expressions don't bind their own name in scope
        }
        let code = self.compile_function_body(agent, is_generator)?;
        let idx = self.add_nested(code);
        self.emit(OpCode::MakeClosure { code_index: idx });
        Ok(Ref::None)
    }

    fn compile_arrow_function_single(&mut self, agent: &mut Context, param_name: String) -> ParseResult<()> {
        self.expect(Token::Arrow, "'=>'")?;
        let js_name = agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_str(&param_name));
        let parameters = vec![ParameterInfo { name: js_name, has_default: false, is_rest: false }];
        let code_id = self.compile_arrow_body(agent, parameters)?;
        let idx = self.add_nested(code_id);
        self.emit(OpCode::MakeClosure { code_index: idx });
        Ok(())
    }

    fn compile_arrow_function_parenthesized(&mut self, agent: &mut Context) -> ParseResult<()> {
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
        self.expect(Token::Arrow, "'=>'")?;
        let code_id = self.compile_arrow_body(agent, parameters)?;
        let idx = self.add_nested(code_id);
        self.emit(OpCode::MakeClosure { code_index: idx });
        Ok(())
    }

    /// An arrow body is compiled exactly like an ordinary function body
    /// (`MakeClosure` gives it its own `this` binding at call time — see
    /// `vm::mod::call_ecmascript_function` — rather than lexically
    /// inheriting the enclosing `this`, a known gap shared with every
    /// closure this compiler emits; tracked in DESIGN.md).
    fn compile_arrow_body(&mut self, agent: &mut Context, parameters: Vec<ParameterInfo>) -> ParseResult<CompiledCodeId> {
        let outer_strict = self.scopes.last().map(|s| s.is_strict).unwrap_or(false);
        self.scopes.push(Scope::new(outer_strict));
        if self.tok() == Token::LBrace {
            self.bump();
            self.compile_statement_list(agent, Token::RBrace)?;
            self.expect(Token::RBrace, "'}'")?;
        } else {
            self.compile_assignment_expression(agent)?;
            self.emit(OpCode::Return);
        }
        self.finish(agent, parameters)
    }

    fn template_chunk_text(&self) -> String {
        let raw = self.text();
        let trimmed = match self.tok() {
            Token::TemplateStart | Token::TemplatePart => &raw[1..raw.len() - 2],
            Token::TemplateEnd | Token::Template => &raw[1..raw.len() - 1],
            _ => raw,
        };
        decode_escapes(trimmed)
    }

    fn compile_template_literal(&mut self, agent: &mut Context) -> ParseResult<()> {
        let text = self.template_chunk_text();
        let idx = self.string_const(agent, &text);
        self.emit(OpCode::PushConstantString { index: idx });
        if self.tok() == Token::Template {
            self.bump();
            return Ok(());
        }
        self.bump(); // TemplateStart
        loop {
            self.compile_expression(agent)?;
            self.emit(OpCode::Add);
            match self.tok() {
                Token::TemplatePart => {
                    let text = self.template_chunk_text();
                    let idx = self.string_const(agent, &text);
                    self.emit(OpCode::PushConstantString { index: idx });
                    self.emit(OpCode::Add);
                    self.bump();
                }
                Token::TemplateEnd => {
                    let text = self.template_chunk_text();
                    let idx = self.string_const(agent, &text);
                    self.emit(OpCode::PushConstantString { index: idx });
                    self.emit(OpCode::Add);
                    self.bump();
                    break;
                }
                _ => return Err(self.err(ParseErrorKind::Expected { expected: "template continuation" })),
            }
        }
        Ok(())
    }

    // --- binary / assignment / conditional ---

    fn continue_binary(&mut self, agent: &mut Context, min_bp: u8) -> ParseResult<()> {
        loop {
            let token = self.tok();
            let bp = token.lbp();
            if bp < min_bp || bp <= 2 {
                break;
            }
            match token {
                Token::And => {
                    self.bump();
                    self.emit(OpCode::Dup);
                    let jmp = self.emit(OpCode::JumpIfFalse { offset: 0 });
                    self.emit(OpCode::Pop);
                    self.parse_binary(agent, bp + 1)?;
                    let end = self.here();
                    self.patch_jump(jmp, end);
                }
                Token::Or => {
                    self.bump();
                    self.emit(OpCode::Dup);
                    let jmp = self.emit(OpCode::JumpIfTrue { offset: 0 });
                    self.emit(OpCode::Pop);
                    self.parse_binary(agent, bp + 1)?;
                    let end = self.here();
                    self.patch_jump(jmp, end);
                }
                Token::Nullish => {
                    self.bump();
                    self.emit(OpCode::Dup);
                    let jmp_rhs = self.emit(OpCode::JumpIfNullish { offset: 0 });
                    let jmp_end = self.emit(OpCode::Jump { offset: 0 });
                    let rhs_start = self.here();
                    self.patch_jump(jmp_rhs, rhs_start);
                    self.emit(OpCode::Pop);
                    self.emit(OpCode::Pop);
                    self.parse_binary(agent, bp + 1)?;
                    let end = self.here();
                    self.patch_jump(jmp_end, end);
                }
                _ => {
                    let Some(op) = binop_for(token) else { break };
                    self.bump();
                    let next_min = if token.is_right_assoc() { bp } else { bp + 1 };
                    self.parse_binary(agent, next_min)?;
                    self.emit(op);
                }
            }
        }
        Ok(())
    }

    fn parse_binary(&mut self, agent: &mut Context, min_bp: u8) -> ParseResult<()> {
        self.parse_unary(agent)?;
        self.continue_binary(agent, min_bp)
    }

    fn compile_ternary_tail(&mut self, agent: &mut Context) -> ParseResult<()> {
        if self.eat(Token::Ternary) {
            let jmp_else = self.emit(OpCode::JumpIfFalse { offset: 0 });
            self.compile_assignment_expression(agent)?;
            let jmp_end = self.emit(OpCode::Jump { offset: 0 });
            let else_start = self.here();
            self.patch_jump(jmp_else, else_start);
            self.expect(Token::Colon, "':'")?;
            self.compile_assignment_expression(agent)?;
            let end = self.here();
            self.patch_jump(jmp_end, end);
        }
        Ok(())
    }

    fn compile_simple_assignment(&mut self, agent: &mut Context, r: Ref) -> ParseResult<()> {
        match r {
            Ref::Binding(name) => {
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetBinding { name });
            }
            Ref::Member { computed: false, key } => {
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetProperty { key });
            }
            Ref::Member { computed: true, .. } => {
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetPropertyComputed);
            }
            Ref::None => return Err(self.err(ParseErrorKind::Expected { expected: "assignment target" })),
        }
        Ok(())
    }

    fn compile_compound_assignment(&mut self, agent: &mut Context, r: Ref, op: OpCode) -> ParseResult<()> {
        match r {
            Ref::Binding(name) => {
                self.emit(OpCode::GetBinding { name });
                self.compile_assignment_expression(agent)?;
                self.emit(op);
                self.emit(OpCode::SetBinding { name });
            }
            Ref::Member { computed: false, key } => {
                self.emit(OpCode::Dup);
                self.emit(OpCode::GetProperty { key });
                self.compile_assignment_expression(agent)?;
                self.emit(op);
                self.emit(OpCode::SetProperty { key });
            }
            Ref::Member { computed: true, .. } => {
                return Err(self.err(ParseErrorKind::Expected {
                    expected: "identifier or non-computed member (compound assignment on computed member expressions is not supported)",
                }));
            }
            Ref::None => return Err(self.err(ParseErrorKind::Expected { expected: "assignment target" })),
        }
        Ok(())
    }

    fn compile_logical_assignment(&mut self, agent: &mut Context, r: Ref, kind: Token) -> ParseResult<()> {
        let name = match r {
            Ref::Binding(name) => name,
            _ => {
                return Err(self.err(ParseErrorKind::Expected {
                    expected: "identifier (logical assignment on member expressions is not supported)",
                }))
            }
        };
        self.emit(OpCode::GetBinding { name });
        match kind {
            Token::AndAssign => {
                self.emit(OpCode::Dup);
                let jmp = self.emit(OpCode::JumpIfFalse { offset: 0 });
                self.emit(OpCode::Pop);
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetBinding { name });
                self.emit(OpCode::Swap);
                self.emit(OpCode::Pop);
                let end = self.here();
                self.patch_jump(jmp, end);
            }
            Token::OrAssign => {
                self.emit(OpCode::Dup);
                let jmp = self.emit(OpCode::JumpIfTrue { offset: 0 });
                self.emit(OpCode::Pop);
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetBinding { name });
                self.emit(OpCode::Swap);
                self.emit(OpCode::Pop);
                let end = self.here();
                self.patch_jump(jmp, end);
            }
            Token::NullishAssign => {
                self.emit(OpCode::Dup);
                let jmp_rhs = self.emit(OpCode::JumpIfNullish { offset: 0 });
                let jmp_end = self.emit(OpCode::Jump { offset: 0 });
                let rhs_start = self.here();
                self.patch_jump(jmp_rhs, rhs_start);
                self.emit(OpCode::Pop);
                self.emit(OpCode::Pop);
                self.compile_assignment_expression(agent)?;
                self.emit(OpCode::SetBinding { name });
                let end = self.here();
                self.patch_jump(jmp_end, end);
            }
            _ => unreachable!("compile_logical_assignment called with a non-logical-assignment token"),
        }
        Ok(())
    }

    pub(super) fn compile_assignment_expression(&mut self, agent: &mut Context) -> ParseResult<()> {
        if self.is_unary_prefix_token() {
            self.parse_unary(agent)?;
            self.continue_binary(agent, 3)?;
            return self.compile_ternary_tail(agent);
        }

        let r = self.parse_postfix(agent)?;

        if !self.lexer.has_newline_before && matches!(self.tok(), Token::Inc | Token::Dec) {
            let is_inc = self.tok() == Token::Inc;
            self.bump();
            self.compile_postfix_incdec(r, is_inc)?;
            self.continue_binary(agent, 3)?;
            return self.compile_ternary_tail(agent);
        }

        match self.tok() {
            Token::Equal => {
                self.bump();
                self.compile_simple_assignment(agent, r)
            }
            Token::AndAssign | Token::OrAssign | Token::NullishAssign => {
                let kind = self.tok();
                self.bump();
                self.compile_logical_assignment(agent, r, kind)
            }
            tok if compound_binop_for(tok).is_some() => {
                let op = compound_binop_for(tok).expect("checked above");
                self.bump();
                self.compile_compound_assignment(agent, r, op)
            }
            _ => {
                self.finish_ref_as_value(r);
                self.continue_binary(agent, 3)?;
                self.compile_ternary_tail(agent)
            }
        }
    }
}

fn binop_for(token: Token) -> Option<OpCode> {
    Some(match token {
        Token::Pow => OpCode::Exponent,
        Token::Mul => OpCode::Multiply,
        Token::Mod => OpCode::Modulo,
        Token::Div => OpCode::Divide,
        Token::Add => OpCode::Add,
        Token::Sub => OpCode::Subtract,
        Token::ShiftLeft => OpCode::ShiftLeft,
        Token::ShiftRight => OpCode::ShiftRight,
        Token::UShiftRight => OpCode::ShiftRightUnsigned,
        Token::Lt => OpCode::LessThan,
        Token::Lte => OpCode::LessThanOrEqual,
        Token::Gt => OpCode::GreaterThan,
        Token::Gte => OpCode::GreaterThanOrEqual,
        Token::KeywordIn => OpCode::In,
        Token::KeywordInstanceOf => OpCode::InstanceOf,
        Token::Equality => OpCode::Equal,
        Token::Inequality => OpCode::NotEqual,
        Token::StrictEquality => OpCode::StrictEqual,
        Token::StrictInequality => OpCode::StrictNotEqual,
        Token::BAnd => OpCode::BitAnd,
        Token::Xor => OpCode::BitXor,
        Token::BOr => OpCode::BitOr,
        _ => return None,
    })
}

fn compound_binop_for(token: Token) -> Option<OpCode> {
    Some(match token {
        Token::AddAssign => OpCode::Add,
        Token::SubAssign => OpCode::Subtract,
        Token::MulAssign => OpCode::Multiply,
        Token::DivAssign => OpCode::Divide,
        Token::ModAssign => OpCode::Modulo,
        Token::PowAssign => OpCode::Exponent,
        Token::ShiftLeftAssign => OpCode::ShiftLeft,
        Token::ShiftRightAssign => OpCode::ShiftRight,
        Token::UShiftRightAssign => OpCode::ShiftRightUnsigned,
        Token::BAndAssign => OpCode::BitAnd,
        Token::BOrAssign => OpCode::BitOr,
        Token::XorAssign => OpCode::BitXor,
        _ => return None,
    })
}

fn parse_number_literal(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).unwrap_or(0) as f64;
    }
    if let Some(oct) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return u64::from_str_radix(oct, 8).unwrap_or(0) as f64;
    }
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).unwrap_or(0) as f64;
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

fn decode_string_literal(raw: &str) -> String {
    decode_escapes(&raw[1..raw.len() - 1])
}

fn decode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('u') => {
                if chars.as_str().starts_with('{') {
                    chars.next();
                    let mut hex = String::new();
                    for ch in chars.by_ref() {
                        if ch == '}' {
                            break;
                        }
                        hex.push(ch);
                    }
                    if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        out.push(ch);
                    }
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        out.push(ch);
                    }
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
