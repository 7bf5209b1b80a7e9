// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block-entry hoist discovery (`spec.md` §4.4/§4.5): before a block's
//! statements are compiled, a short independent token scan (its own
//! [`crate::lexer::Lexer`] over the same remaining source, thrown away
//! afterward) finds every `var`/`let`/`const` name declared directly in
//! that block — not inside a nested `{}` or function body — so the
//! compiler can pre-declare them (`CreateMutableBinding`) before any
//! statement runs. This gives `let`/`const` their temporal dead zone and
//! makes a `var` visible (as `undefined`) to code textually before its
//! declaration within the same block, without needing a full AST.
//!
//! Function declarations are deliberately not hoisted here: `kilojs_core`
//! compiles a single pass with no two-phase "collect declarations, then
//! compile" split for executable code, so `function` bindings are created
//! at the point their declaration is reached, same as any other statement.
//! A function called before its (textual) declaration in the same block
//! throws a `ReferenceError` rather than succeeding the way ECMA-262
//! hoisting would — a deliberate, documented simplification of the
//! single-pass architecture, not an oversight.
//!
//! Known imprecision: arrow function bodies aren't excluded from the scan
//! (only `function` keyword bodies are skipped over), so a `var` inside an
//! arrow function's block body is over-eagerly treated as belonging to the
//! enclosing scope. Harmless in practice — the arrow's own compile pass
//! re-declares and shadows it correctly in its own environment — but worth
//! knowing about.

use crate::lexer::{Lexer, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
}

pub fn scan_block_declarations(remaining_source: &str) -> Vec<Decl> {
    let mut lexer = Lexer::new(remaining_source);
    lexer.next();
    let mut out = Vec::new();
    let mut depth: i32 = 0;

    loop {
        match lexer.token {
            Token::Eof => break,
            Token::LBrace => {
                depth += 1;
                lexer.next();
            }
            Token::RBrace => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                lexer.next();
            }
            Token::KeywordFunction => {
                lexer.next();
                if lexer.token == Token::Mul {
                    lexer.next();
                }
                if lexer.token == Token::Ident {
                    lexer.next();
                }
                skip_balanced(&mut lexer); // parameter list
                skip_balanced(&mut lexer); // body
            }
            Token::KeywordVar => {
                lexer.next();
                collect_declarators(&mut lexer, &mut out, DeclKind::Var);
            }
            Token::KeywordLet | Token::KeywordConst if depth == 0 => {
                let kind = if lexer.token == Token::KeywordLet { DeclKind::Let } else { DeclKind::Const };
                lexer.next();
                collect_declarators(&mut lexer, &mut out, kind);
            }
            _ => lexer.next(),
        }
    }

    out
}

/// Consumes one bracketed group (`(...)`, `[...]`, or `{...}`) starting at
/// the current token, balancing nested brackets of any of the three kinds.
/// A no-op if the current token isn't an opening bracket.
fn skip_balanced(lexer: &mut Lexer) {
    if !matches!(lexer.token, Token::LParen | Token::LBrace | Token::LBrack) {
        return;
    }
    let mut depth = 0i32;
    loop {
        match lexer.token {
            Token::Eof => break,
            Token::LParen | Token::LBrace | Token::LBrack => {
                depth += 1;
                lexer.next();
            }
            Token::RParen | Token::RBrace | Token::RBrack => {
                depth -= 1;
                lexer.next();
                if depth <= 0 {
                    break;
                }
            }
            _ => lexer.next(),
        }
    }
}

fn collect_declarators(lexer: &mut Lexer, out: &mut Vec<Decl>, kind: DeclKind) {
    loop {
        if lexer.token == Token::Ident {
            out.push(Decl { name: lexer.text().to_string(), kind });
            lexer.next();
        }
        skip_declarator_tail(lexer);
        if lexer.token == Token::Comma {
            lexer.next();
            continue;
        }
        break;
    }
}

/// Skips a declarator's optional initializer up to the next top-level
/// comma/semicolon, balancing any nested brackets (so `var x = { a, b };`
/// doesn't mistake the object literal's comma for a second declarator).
fn skip_declarator_tail(lexer: &mut Lexer) {
    let mut depth = 0i32;
    loop {
        match lexer.token {
            Token::Eof | Token::Semi => break,
            Token::Comma if depth == 0 => break,
            Token::LParen | Token::LBrace | Token::LBrack => {
                depth += 1;
                lexer.next();
            }
            Token::RParen | Token::RBrack => {
                depth -= 1;
                lexer.next();
            }
            Token::RBrace => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                lexer.next();
            }
            _ => lexer.next(),
        }
    }
}
