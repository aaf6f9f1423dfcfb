//! # Diagnostics
//!
//! The toolchain surfaces problems as diagnostics rather than exceptions:
//! every stage collects a `Vec<Diagnostic>` and keeps going (skip the
//! offending command/line) instead of aborting. Source locations are
//! deliberately not part of a `Diagnostic` — this language carries no
//! line/column bookkeeping past the lexer's own cursor.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    LexError,
    NoMatchingProduction,
    UnknownOpcode,
    UnknownCondition,
    UnresolvedLabel,
    MalformedJgc,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn lex_error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::LexError, message)
    }

    pub fn no_matching_production(command: impl std::fmt::Display) -> Self {
        Self::new(
            DiagnosticKind::NoMatchingProduction,
            format!("no valid reductions {command}"),
        )
    }

    pub fn unknown_opcode(opcode: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::UnknownOpcode,
            format!("Command '{}' not recognized", opcode.into()),
        )
    }

    pub fn unknown_condition(mnemonic: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::UnknownCondition,
            format!("unknown comparison mnemonic '{}'", mnemonic.into()),
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ERROR: {}", self.message)
    }
}
