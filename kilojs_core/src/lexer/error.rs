// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `SPEC_FULL.md` §4.9: parse diagnostics get a real span-aware type
//! instead of the teacher's `Result<T, ()>` + `eprintln!` pattern, via
//! `thiserror::Error` + `miette::Diagnostic`.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ParseErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("expected {expected}")]
    Expected { expected: &'static str },
    #[error("'{label}' is not a valid label for this statement")]
    InvalidLabel { label: String },
    #[error("illegal break statement")]
    IllegalBreak,
    #[error("illegal continue statement")]
    IllegalContinue,
    #[error("maximum call stack size exceeded while parsing")]
    TooDeep,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{kind}")]
pub struct ParseError {
    #[source_code]
    pub source: String,
    #[label("here")]
    pub span: SourceSpan,
    pub line: u32,
    pub column: u32,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(source: &str, start: usize, end: usize, line: u32, column: u32, kind: ParseErrorKind) -> Self {
        ParseError { source: source.to_string(), span: (start, end.saturating_sub(start).max(1)).into(), line, column, kind }
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
