//! # Command Grouper (C2)
//!
//! Folds the flat token stream into a forest of `Command`s: one node per
//! logical line, nested by indentation. Built around owning vectors
//! rather than a mutate-in-place linked list — a command's children are
//! a `Vec<Command>` it owns outright, not a pointer into a shared chain
//! that gets spliced.


use crate::lexer::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub head_indent: u32,
    pub tokens: Vec<Token>,
    pub children: Vec<Command>,
}

impl Command {
    pub fn first_lexeme(&self) -> Option<&str> {
        self.tokens.first().map(|t| t.lexeme.as_str())
    }

    pub fn is_func_or_block(&self) -> bool {
        matches!(self.first_lexeme(), Some("func") | Some("block"))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, tok) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{tok}")?;
        }
        Ok(())
    }
}

/// A logical line: the indent it sits at, and its tokens with `Indent`
/// and `Newline` stripped out.
struct Line {
    indent: u32,
    tokens: Vec<Token>,
}

fn split_lines(tokens: &[Token]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current_indent: u32 = 0;
    let mut current: Vec<Token> = Vec::new();

    for tok in tokens {
        match tok.kind {
            TokenKind::Indent => current_indent = tok.indent,
            TokenKind::Newline => {
                if !current.is_empty() {
                    lines.push(Line {
                        indent: current_indent,
                        tokens: std::mem::take(&mut current),
                    });
                }
                current_indent = 0;
            }
            _ => current.push(tok.clone()),
        }
    }
    if !current.is_empty() {
        lines.push(Line {
            indent: current_indent,
            tokens: current,
        });
    }
    lines
}

fn strip_trailing_colon(mut tokens: Vec<Token>, is_func_or_block: bool) -> Vec<Token> {
    if is_func_or_block {
        return tokens;
    }
    if matches!(tokens.last(), Some(t) if t.kind == TokenKind::Terminal && t.lexeme == ":") {
        tokens.pop();
    }
    tokens
}

/// Groups `lines` into a forest: a line is a block header exactly when
/// its immediate successor sits at strictly greater indent, in which
/// case every following strictly-greater-indent line (until indent
/// drops back to the header's level or below) becomes one of its
/// children, recursively grouped the same way.
fn build_forest(lines: &[Line]) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let indent = lines[i].indent;
        let is_func_or_block = matches!(
            lines[i].tokens.first().map(|t| t.lexeme.as_str()),
            Some("func") | Some("block")
        );
        let tokens = strip_trailing_colon(lines[i].tokens.clone(), is_func_or_block);
        i += 1;

        let children_start = i;
        while i < lines.len() && lines[i].indent > indent {
            i += 1;
        }
        let children = if i > children_start {
            build_forest(&lines[children_start..i])
        } else {
            Vec::new()
        };

        commands.push(Command {
            head_indent: indent,
            tokens,
            children,
        });
    }
    commands
}

/// Folds a flat token stream (as produced by [`crate::lexer::tokenize`])
/// into a forest of top-level `Command`s. An empty or inconsistently
/// indented stream degrades to an empty (or partial) forest rather than
/// an error — `group` never fails.
pub fn group(tokens: &[Token]) -> Vec<Command> {
    let lines = split_lines(tokens);
    build_forest(&lines)
}
