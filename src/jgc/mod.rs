//! # JGC (C5 — shared instruction vocabulary)
//!
//! The textual assembly both halves of the toolchain speak. `jg-compiler`
//! emits it; `jgc-interpreter` re-parses it independently — the two
//! stages share no runtime state, only this file format. Mnemonics are
//! matched to opcodes through a single table (`Opcode::from_mnemonic`),
//! the same shape an instruction encoder uses to match mnemonics to
//! encodings.

pub mod writer;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Func,
    Return,
    Insert,
    Assign,
    Copy,
    Iinput,
    Iadd,
    Isub,
    Print,
    Gt,
    Lt,
    Eq,
    Ge,
    Le,
    Ne,
    Br,
    Brgt,
    Brlt,
    Breq,
    Brge,
    Brle,
    Brne,
    Excon,
    Object,
    Attribute,
    Retrieve,
    Enterblock,
    Exitblock,
    Label,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Func => "FUNC",
            Opcode::Return => "RETURN",
            Opcode::Insert => "INSERT",
            Opcode::Assign => "ASSIGN",
            Opcode::Copy => "COPY",
            Opcode::Iinput => "IINPUT",
            Opcode::Iadd => "IADD",
            Opcode::Isub => "ISUB",
            Opcode::Print => "PRINT",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::Eq => "EQ",
            Opcode::Ge => "GE",
            Opcode::Le => "LE",
            Opcode::Ne => "NE",
            Opcode::Br => "BR",
            Opcode::Brgt => "BRGT",
            Opcode::Brlt => "BRLT",
            Opcode::Breq => "BREQ",
            Opcode::Brge => "BRGE",
            Opcode::Brle => "BRLE",
            Opcode::Brne => "BRNE",
            Opcode::Excon => "EXCON",
            Opcode::Object => "OBJECT",
            Opcode::Attribute => "ATTRIBUTE",
            Opcode::Retrieve => "RETRIEVE",
            Opcode::Enterblock => "ENTERBLOCK",
            Opcode::Exitblock => "EXITBLOCK",
            Opcode::Label => "LABEL",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s {
            "FUNC" => Opcode::Func,
            "RETURN" => Opcode::Return,
            "INSERT" => Opcode::Insert,
            "ASSIGN" => Opcode::Assign,
            "COPY" => Opcode::Copy,
            "IINPUT" => Opcode::Iinput,
            "IADD" => Opcode::Iadd,
            "ISUB" => Opcode::Isub,
            "PRINT" => Opcode::Print,
            "GT" => Opcode::Gt,
            "LT" => Opcode::Lt,
            "EQ" => Opcode::Eq,
            "GE" => Opcode::Ge,
            "LE" => Opcode::Le,
            "NE" => Opcode::Ne,
            "BR" => Opcode::Br,
            "BRGT" => Opcode::Brgt,
            "BRLT" => Opcode::Brlt,
            "BREQ" => Opcode::Breq,
            "BRGE" => Opcode::Brge,
            "BRLE" => Opcode::Brle,
            "BRNE" => Opcode::Brne,
            "EXCON" => Opcode::Excon,
            "OBJECT" => Opcode::Object,
            "ATTRIBUTE" => Opcode::Attribute,
            "RETRIEVE" => Opcode::Retrieve,
            "ENTERBLOCK" => Opcode::Enterblock,
            "EXITBLOCK" => Opcode::Exitblock,
            "LABEL" => Opcode::Label,
            _ => return None,
        })
    }

}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Runtime variable value. `Null` is the initial value of an
/// auto-created or freshly `INSERT`ed variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Map(BTreeMap<String, Value>),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Map(_) => write!(f, "<object>"),
            Value::Null => write!(f, "null"),
        }
    }
}

/// An operand as it appears in JGC text: either a literal value, or a
/// name with some number of leading `@`s — `derefs == 0` is a bare
/// name, `derefs == 1` is `@name`, and so on.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Name { name: String, derefs: u32 },
}

impl Operand {
    pub fn name(name: impl Into<String>) -> Self {
        Operand::Name {
            name: name.into(),
            derefs: 0,
        }
    }

    pub fn deref(name: impl Into<String>, derefs: u32) -> Self {
        Operand::Name {
            name: name.into(),
            derefs,
        }
    }

    pub fn int(value: i64) -> Self {
        Operand::Literal(Value::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Operand::Literal(Value::Str(value.into()))
    }

    /// Parses one comma-separated operand token from JGC text: a
    /// leading run of `@` is indirection depth, a token made entirely
    /// of digits (optionally signed) is an integer literal, a
    /// double-quoted token is a string literal, anything else is a
    /// bare name.
    pub fn parse(token: &str) -> Self {
        let derefs = token.chars().take_while(|&c| c == '@').count() as u32;
        let rest = &token[derefs as usize..];
        if derefs == 0 {
            if let Ok(n) = rest.parse::<i64>() {
                return Operand::Literal(Value::Int(n));
            }
            if rest.starts_with('"') && rest.ends_with('"') && rest.len() >= 2 {
                return Operand::Literal(Value::Str(rest[1..rest.len() - 1].to_string()));
            }
        }
        Operand::Name {
            name: rest.to_string(),
            derefs,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{v}"),
            Operand::Name { name, derefs } => {
                write!(f, "{}{}", "@".repeat(*derefs as usize), name)
            }
        }
    }
}

/// One JGC instruction. `label` names the function/label this
/// instruction is the first instruction of (the compiler sets it on
/// `FUNC`-declaration lines; plain instructions carry `None`).
/// `contents` is load-time bookkeeping the compiler never fills in —
/// only the interpreter's loader computes it from `ENTERBLOCK`/
/// `EXITBLOCK` markers, since the two stages share no runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub label: Option<String>,
    pub contents: Option<(usize, usize)>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            operands,
            label: None,
            contents: None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            writeln!(f, "{label}:")?;
        }
        write!(f, "{}", self.opcode)?;
        for (i, op) in self.operands.iter().enumerate() {
            write!(f, "{}{}", if i == 0 { " " } else { ", " }, op)?;
        }
        Ok(())
    }
}
