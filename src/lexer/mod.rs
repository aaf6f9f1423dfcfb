//! # JG Lexer (C1)
//!
//! Produces the token stream C2 folds into Commands. Built to the same
//! standard as every other stage even though the grammar around it treats
//! it as an external collaborator, with a single left-to-right scan over
//! the source.
//!
//! ## Token alphabet
//!
//! Identifiers (`[A-Za-z_][A-Za-z0-9_]*`), integers (`[0-9]+`), strings
//! (`"…"`, no escapes processed at lex time — a `\n` inside stays a literal
//! two-character sequence, interpreted later by `PRINT`), single-character
//! symbolic terminals, leading-tab `Indent` tokens, and `Newline`.
//!
//! A tab that interrupts an identifier or number already being
//! accumulated (e.g. a stray tab mid-word) is a lex error; this aborts the
//! lex rather than being logged and skipped like every other stage's
//! diagnostics.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::Diagnostic;
use cursor::Cursor;
use token::{Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accumulating {
    None,
    Id,
    Number,
    Indent,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut lexeme = String::new();
    let mut state = Accumulating::None;
    let mut indent_count: u32 = 0;

    macro_rules! flush {
        () => {
            if !lexeme.is_empty() {
                let kind = match state {
                    Accumulating::Id => TokenKind::Id,
                    Accumulating::Number => TokenKind::Number,
                    Accumulating::Indent => TokenKind::Indent,
                    Accumulating::None => unreachable!("non-empty lexeme with no accumulation state"),
                };
                let count = indent_count;
                tokens.push(Token::new(kind, std::mem::take(&mut lexeme), count));
            }
            state = Accumulating::None;
            indent_count = 0;
        };
    }

    while let Some(ch) = cursor.advance() {
        match ch {
            '"' => {
                flush!();
                match lex_string(&mut cursor) {
                    Ok(content) => tokens.push(Token::new(TokenKind::String, content, 0)),
                    Err(diag) => return LexResult { tokens, diagnostics: vec![diag] },
                }
            }
            '\n' => {
                flush!();
                tokens.push(Token::new(TokenKind::Newline, "\n", 0));
            }
            '\r' => {
                flush!();
                if cursor.peek() == Some('\n') {
                    cursor.advance();
                }
                tokens.push(Token::new(TokenKind::Newline, "\n", 0));
            }
            '\t' => match state {
                Accumulating::Id | Accumulating::Number => {
                    return LexResult {
                        tokens,
                        diagnostics: vec![Diagnostic::lex_error(
                            "tab interrupted an identifier or number",
                        )],
                    };
                }
                Accumulating::Indent => {
                    lexeme.push('\t');
                    indent_count += 1;
                }
                Accumulating::None => {
                    state = Accumulating::Indent;
                    lexeme.push('\t');
                    indent_count = 1;
                }
            },
            ' ' => flush!(),
            c if c.is_ascii_digit() => match state {
                Accumulating::Id | Accumulating::Number => lexeme.push(c),
                Accumulating::Indent | Accumulating::None => {
                    flush!();
                    state = Accumulating::Number;
                    lexeme.push(c);
                }
            },
            c if c.is_ascii_alphabetic() || c == '_' => match state {
                Accumulating::Id => lexeme.push(c),
                Accumulating::Number | Accumulating::Indent | Accumulating::None => {
                    flush!();
                    state = Accumulating::Id;
                    lexeme.push(c);
                }
            },
            c => {
                flush!();
                tokens.push(Token::new(TokenKind::Terminal, c.to_string(), 0));
            }
        }
    }
    flush!();

    if !matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Newline)) {
        tokens.push(Token::new(TokenKind::Newline, "\n", 0));
    }

    LexResult {
        tokens,
        diagnostics: Vec::new(),
    }
}

fn lex_string(cursor: &mut Cursor) -> Result<String, Diagnostic> {
    let mut content = String::new();
    loop {
        match cursor.advance() {
            Some('"') => return Ok(content),
            Some('\n') | Some('\r') | None => {
                return Err(Diagnostic::lex_error("unterminated string literal"))
            }
            Some(c) => content.push(c),
        }
    }
}
