// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### Lexer (`spec.md` §4.4)
//!
//! A hand-rolled scanner driven by a single look-ahead codepoint, same
//! shape as the teacher's own `nova_parser::lexer`: `next()` re-runs a
//! `'main` loop so whitespace/comments/template-brace bookkeeping can
//! `continue` back to the top without recursion. Unlike the teacher, each
//! token also carries its starting line/column so `ParseError` (see
//! `crate::lexer::error`) can build a `miette::SourceSpan`-backed
//! diagnostic instead of the teacher's `eprintln!`-only reporting.
//!
//! Numeric literals are scanned here only as a shape (integer part,
//! fractional part, exponent, radix prefixes, numeric separators, a
//! trailing `n` for BigInt); converting the matched text to an `f64` or
//! `BigInt` is the parser's job, using `fast-float`/`lexical`/`num-bigint`
//! the way `types::language::number` already does for runtime coercions.

pub mod error;
pub mod token;

pub use token::Token;

use boa_unicode::UnicodeProperties;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringKind {
    pub quote: char,
}

#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    pub source: &'a str,
    /// `Option<char>` costs only 4 bytes thanks to UTF-8 codepoint limits.
    pub codepoint: Option<char>,
    pub index: usize,
    pub token: Token,
    pub start: usize,
    pub has_newline_before: bool,
    pub open_template_count: usize,
    pub line: u32,
    pub line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            codepoint: source.chars().next(),
            index: 0,
            token: Token::Eof,
            start: 0,
            has_newline_before: true,
            open_template_count: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// 1-based line and 0-based column of `self.start`.
    pub fn position(&self) -> (u32, u32) {
        (self.line, (self.start - self.line_start) as u32)
    }

    pub fn text(&self) -> &'a str {
        &self.source[self.start..self.index]
    }

    /// Re-seeks the lexer to `index` (used for template continuation,
    /// which re-enters the source mid-expression after a `}`).
    pub fn reset(&mut self, index: usize) {
        self.index = index;
        self.codepoint = self.source[self.index..].chars().next();
        self.next();
    }

    fn step(&mut self) {
        let Some(cp) = self.codepoint else { return };
        if cp == '\n' {
            self.line += 1;
            self.line_start = self.index + 1;
        }
        self.index += cp.len_utf8();
        self.codepoint = self.source[self.index..].chars().next();
    }

    #[inline]
    fn continue_ident_fast(&mut self) {
        loop {
            match self.codepoint {
                Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$') => self.step(),
                Some(ch) => {
                    if ch.is_ascii() {
                        break;
                    }
                    return self.continue_ident_slow();
                }
                None => break,
            }
        }

        if let Some(keyword) = token::KEYWORDS.get(&self.source[self.start..self.index]) {
            self.token = *keyword;
        }
    }

    #[inline]
    fn continue_ident_slow(&mut self) {
        loop {
            let Some(ch) = self.codepoint else { break };
            if !ch.is_id_continue() {
                break;
            }
            self.step();
        }
    }

    #[inline]
    fn continue_digits(&mut self, radix_is_decimal: bool) {
        loop {
            match self.codepoint {
                Some('0'..='9') => self.step(),
                Some('a'..='f' | 'A'..='F') if !radix_is_decimal => self.step(),
                Some('_') => self.step(),
                _ => break,
            }
        }
    }

    /// Scans the remainder of a numeric literal starting after the first
    /// digit has already been consumed (`self.start` points at its first
    /// character). Handles `0x`/`0o`/`0b` radix prefixes, a decimal point,
    /// an exponent, `_` numeric separators, and a trailing `n` BigInt
    /// suffix; does not evaluate the literal's value.
    fn continue_number(&mut self) {
        self.token = Token::Number;
        let first_is_zero = self.source.as_bytes().get(self.start) == Some(&b'0');

        if first_is_zero {
            match self.codepoint {
                Some('x' | 'X') => {
                    self.step();
                    self.continue_digits(false);
                    self.finish_integer_suffix();
                    return;
                }
                Some('o' | 'O') => {
                    self.step();
                    self.continue_digits(true);
                    self.finish_integer_suffix();
                    return;
                }
                Some('b' | 'B') => {
                    self.step();
                    self.continue_digits(true);
                    self.finish_integer_suffix();
                    return;
                }
                _ => {}
            }
        }

        self.continue_digits(true);

        if let Some('.') = self.codepoint {
            self.step();
            self.continue_digits(true);
        }

        if let Some('e' | 'E') = self.codepoint {
            self.step();
            if let Some('+' | '-') = self.codepoint {
                self.step();
            }
            self.continue_digits(true);
        }

        self.finish_integer_suffix();
    }

    fn finish_integer_suffix(&mut self) {
        if let Some('n') = self.codepoint {
            self.step();
            self.token = Token::BigInt;
        }
        if matches!(self.codepoint, Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
            self.token = Token::InvalidNumber;
        }
    }

    #[inline]
    fn continue_string(&mut self, end: char) {
        let mut escaped = false;
        loop {
            match (escaped, self.codepoint) {
                (_, None | Some('\r' | '\n')) => {
                    self.token = Token::InvalidString;
                    break;
                }
                (false, ch) if ch == Some(end) => {
                    self.step();
                    break;
                }
                (false, Some('\\')) => escaped = true,
                _ => escaped = false,
            }
            self.step();
        }
    }

    #[inline]
    fn continue_template(&mut self) {
        let mut escaped = false;
        loop {
            match (escaped, self.codepoint) {
                (_, None) => {
                    self.token = Token::InvalidString;
                    break;
                }
                (false, Some('`')) => {
                    self.step();
                    self.token = if self.token == Token::TemplateStart { Token::Template } else { Token::TemplateEnd };
                    break;
                }
                (false, Some('$')) => {
                    self.step();
                    if let Some('{') = self.codepoint {
                        self.step();
                        self.open_template_count += 1;
                        break;
                    }
                }
                (false, Some('\\')) => {
                    self.step();
                    escaped = true;
                    continue;
                }
                _ => {}
            }
            escaped = false;
            self.step();
        }
    }

    pub fn next(&mut self) {
        self.has_newline_before = false;

        'main: loop {
            self.start = self.index;

            match self.codepoint {
                None => self.token = Token::Eof,
                Some(' ' | '\t') => {
                    self.step();
                    continue 'main;
                }
                Some('\r' | '\n') => {
                    self.step();
                    self.has_newline_before = true;
                    continue 'main;
                }
                Some('a'..='z' | 'A'..='Z' | '_' | '$') => {
                    self.step();
                    self.token = Token::Ident;
                    self.continue_ident_fast();
                }
                Some('#') => {
                    self.step();
                    self.token = Token::PrivateIdent;
                    self.continue_ident_fast();
                    self.token = if self.token == Token::Ident { Token::PrivateIdent } else { self.token };
                }
                Some('0'..='9') => {
                    self.step();
                    self.continue_number();
                }
                Some('\'') => {
                    self.step();
                    self.token = Token::String;
                    self.continue_string('\'');
                }
                Some('"') => {
                    self.step();
                    self.token = Token::String;
                    self.continue_string('"');
                }
                Some('`') => {
                    self.step();
                    self.token = Token::TemplateStart;
                    self.continue_template();
                }
                Some('[') => {
                    self.step();
                    self.token = Token::LBrack;
                }
                Some(']') => {
                    self.step();
                    self.token = Token::RBrack;
                }
                Some('(') => {
                    self.step();
                    self.token = Token::LParen;
                }
                Some(')') => {
                    self.step();
                    self.token = Token::RParen;
                }
                Some('{') => {
                    self.step();
                    self.token = Token::LBrace;
                }
                Some('}') => {
                    if self.open_template_count > 0 {
                        self.step();
                        self.token = Token::TemplatePart;
                        self.continue_template();
                        self.open_template_count -= 1;
                    } else {
                        self.step();
                        self.token = Token::RBrace;
                    }
                }
                Some('+') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('+') => {
                            self.step();
                            Token::Inc
                        }
                        Some('=') => {
                            self.step();
                            Token::AddAssign
                        }
                        _ => Token::Add,
                    };
                }
                Some('-') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('-') => {
                            self.step();
                            Token::Dec
                        }
                        Some('=') => {
                            self.step();
                            Token::SubAssign
                        }
                        _ => Token::Sub,
                    };
                }
                Some('*') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('*') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::PowAssign
                            } else {
                                Token::Pow
                            }
                        }
                        Some('=') => {
                            self.step();
                            Token::MulAssign
                        }
                        _ => Token::Mul,
                    };
                }
                Some('%') => {
                    self.step();
                    self.token = if let Some('=') = self.codepoint {
                        self.step();
                        Token::ModAssign
                    } else {
                        Token::Mod
                    };
                }
                Some('/') => 'blk: {
                    self.step();
                    self.token = match self.codepoint {
                        Some('/') => loop {
                            self.step();
                            match self.codepoint {
                                None | Some('\r' | '\n') => continue 'main,
                                _ => {}
                            }
                        },
                        Some('*') => loop {
                            self.step();
                            match self.codepoint {
                                None => {
                                    self.token = Token::InvalidComment;
                                    break 'blk;
                                }
                                Some('*') => {
                                    if self.source[self.index + 1..].starts_with('/') {
                                        self.step();
                                        self.step();
                                        continue 'main;
                                    }
                                }
                                _ => {}
                            }
                        },
                        Some('=') => {
                            self.step();
                            Token::DivAssign
                        }
                        _ => Token::Div,
                    };
                }
                Some('=') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('>') => {
                            self.step();
                            Token::Arrow
                        }
                        Some('=') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::StrictEquality
                            } else {
                                Token::Equality
                            }
                        }
                        _ => Token::Equal,
                    };
                }
                Some('!') => {
                    self.step();
                    self.token = if let Some('=') = self.codepoint {
                        self.step();
                        if let Some('=') = self.codepoint {
                            self.step();
                            Token::StrictInequality
                        } else {
                            Token::Inequality
                        }
                    } else {
                        Token::Not
                    };
                }
                Some('>') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('=') => {
                            self.step();
                            Token::Gte
                        }
                        Some('>') => {
                            self.step();
                            match self.codepoint {
                                Some('>') => {
                                    self.step();
                                    if let Some('=') = self.codepoint {
                                        self.step();
                                        Token::UShiftRightAssign
                                    } else {
                                        Token::UShiftRight
                                    }
                                }
                                Some('=') => {
                                    self.step();
                                    Token::ShiftRightAssign
                                }
                                _ => Token::ShiftRight,
                            }
                        }
                        _ => Token::Gt,
                    };
                }
                Some('<') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('=') => {
                            self.step();
                            Token::Lte
                        }
                        Some('<') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::ShiftLeftAssign
                            } else {
                                Token::ShiftLeft
                            }
                        }
                        _ => Token::Lt,
                    };
                }
                Some('|') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('|') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::OrAssign
                            } else {
                                Token::Or
                            }
                        }
                        Some('=') => {
                            self.step();
                            Token::BOrAssign
                        }
                        _ => Token::BOr,
                    };
                }
                Some('&') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('&') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::AndAssign
                            } else {
                                Token::And
                            }
                        }
                        Some('=') => {
                            self.step();
                            Token::BAndAssign
                        }
                        _ => Token::BAnd,
                    };
                }
                Some('^') => {
                    self.step();
                    self.token = if let Some('=') = self.codepoint {
                        self.step();
                        Token::XorAssign
                    } else {
                        Token::Xor
                    };
                }
                Some('~') => {
                    self.step();
                    self.token = Token::BNot;
                }
                Some('?') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('?') => {
                            self.step();
                            if let Some('=') = self.codepoint {
                                self.step();
                                Token::NullishAssign
                            } else {
                                Token::Nullish
                            }
                        }
                        Some('.') if !matches!(self.source[self.index + 1..].chars().next(), Some('0'..='9')) => {
                            self.step();
                            Token::OptionalChain
                        }
                        _ => Token::Ternary,
                    };
                }
                Some('.') => {
                    self.step();
                    self.token = match self.codepoint {
                        Some('.') if self.source[self.index + 1..].starts_with('.') => {
                            self.step();
                            self.step();
                            Token::Spread
                        }
                        Some('0'..='9') => {
                            self.continue_number();
                            continue 'main;
                        }
                        _ => Token::Dot,
                    };
                }
                Some(';') => {
                    self.step();
                    self.token = Token::Semi;
                }
                Some(':') => {
                    self.step();
                    self.token = Token::Colon;
                }
                Some(',') => {
                    self.step();
                    self.token = Token::Comma;
                }
                Some(ch) => 'blk: {
                    if ch.is_pattern_whitespace() {
                        self.step();
                        continue 'main;
                    }
                    if ch.is_id_start() {
                        self.step();
                        self.token = Token::Ident;
                        self.continue_ident_slow();
                        break 'blk;
                    }
                    self.step();
                    self.token = Token::Invalid;
                }
            }

            break;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! assert_tokens {
        ($source:expr, $tokens:expr) => {{
            let expected: &[Token] = $tokens;
            let mut out = Vec::<Token>::with_capacity(expected.len());
            let mut lexer = Lexer::new($source);
            loop {
                lexer.next();
                if lexer.token == Token::Eof {
                    break;
                }
                out.push(lexer.token);
            }
            assert_eq!(out.as_slice(), expected);
        }};
    }

    #[test]
    fn unicode_identifiers() {
        assert_tokens!("ሀ zቐ ኂd bꡅa", &[Token::Ident, Token::Ident, Token::Ident, Token::Ident]);
    }

    #[test]
    fn operators() {
        assert_tokens!(
            "+ += ++ - -= -- * *= % %= / /= ** **= . ...",
            &[
                Token::Add,
                Token::AddAssign,
                Token::Inc,
                Token::Sub,
                Token::SubAssign,
                Token::Dec,
                Token::Mul,
                Token::MulAssign,
                Token::Mod,
                Token::ModAssign,
                Token::Div,
                Token::DivAssign,
                Token::Pow,
                Token::PowAssign,
                Token::Dot,
                Token::Spread,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_tokens!(
            "0 0.5 1_000 1e10 0x1F 0o17 0b101 10n",
            &[
                Token::Number,
                Token::Number,
                Token::Number,
                Token::Number,
                Token::Number,
                Token::Number,
                Token::Number,
                Token::BigInt,
            ]
        );
    }

    #[test]
    fn keywords_vs_identifiers() {
        assert_tokens!("let letter", &[Token::KeywordLet, Token::Ident]);
    }

    #[test]
    fn line_tracking() {
        let mut lexer = Lexer::new("a\nbb\nccc");
        lexer.next();
        assert_eq!(lexer.position(), (1, 0));
        lexer.next();
        assert_eq!(lexer.position(), (2, 0));
        lexer.next();
        assert_eq!(lexer.position(), (3, 0));
    }
}
