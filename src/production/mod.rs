//! # Function/Parameter Extractor (C3)
//!
//! Reads a `func`/`block` header `Command` into a `Production`: its
//! signature (a mix of literal terminals and typed parameter holes) and
//! its return type, if any. Signatures and parameters are kept in owning
//! `Vec`s, the same way [`crate::command`] owns its children outright.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::command::Command;
use crate::lexer::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub type_name: String,
    pub alias: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SigElem {
    Literal(String),
    Hole(Parameter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionKind {
    Statement,
    Expression,
    Cast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub name: String,
    pub return_type: Option<String>,
    pub signature: Vec<SigElem>,
    pub kind: ProductionKind,
}

impl Production {
    pub fn parameter_count(&self) -> usize {
        self.signature
            .iter()
            .filter(|e| matches!(e, SigElem::Hole(_)))
            .count()
    }
}

/// Hands out the monotone `F1, F2, …` names C3 assigns to every
/// function/block declaration that isn't `main`.
pub struct NameCounter(u32);

impl NameCounter {
    pub fn new() -> Self {
        Self(1)
    }

    pub fn next(&mut self) -> String {
        let name = format!("F{}", self.0);
        self.0 += 1;
        name
    }
}

impl Default for NameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Interprets a `func`/`block` header's tokens (after the leading
/// keyword) into a signature: `<type alias>` / `<type * alias>` opens a
/// parameter hole, `:` ends the signature and introduces an optional
/// return type, everything else is a literal terminal.
pub fn extract(command: &Command, counter: &mut NameCounter) -> Production {
    let name = if command.first_lexeme() == Some("main") {
        "main".to_string()
    } else {
        counter.next()
    };

    let mut signature = Vec::new();
    let mut return_type = None;

    let tokens: &[Token] = &command.tokens;
    let mut i = 1; // skip the leading `func`/`block`/`main` keyword
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.lexeme == "<" {
            let type_name = tokens[i + 1].lexeme.clone();
            if tokens.get(i + 2).map(|t| t.lexeme.as_str()) == Some("*") {
                let alias = tokens[i + 3].lexeme.clone();
                signature.push(SigElem::Hole(Parameter {
                    type_name,
                    alias,
                    indirect: true,
                }));
                i += 5; // <, type, *, alias, >
            } else {
                let alias = tokens[i + 2].lexeme.clone();
                signature.push(SigElem::Hole(Parameter {
                    type_name,
                    alias,
                    indirect: false,
                }));
                i += 4; // <, type, alias, >
            }
        } else if tok.lexeme == ":" {
            if let Some(ret) = tokens.get(i + 1) {
                return_type = Some(ret.lexeme.clone());
            }
            break;
        } else {
            signature.push(SigElem::Literal(tok.lexeme.clone()));
            i += 1;
        }
    }

    let kind = if signature.len() == 1 {
        match (&signature[0], &return_type) {
            (SigElem::Hole(p), Some(ret)) if &p.type_name != ret => ProductionKind::Cast,
            (_, Some(_)) => ProductionKind::Expression,
            (_, None) => ProductionKind::Statement,
        }
    } else if return_type.is_some() {
        ProductionKind::Expression
    } else {
        ProductionKind::Statement
    };

    Production {
        name,
        return_type,
        signature,
        kind,
    }
}

pub type ProductionId = usize;

/// The process-wide table C3 fills and C4 reads from. Productions are
/// keyed by return type (`None` for statements); casts are kept
/// separately, keyed by the *parameter* type of the cast production —
/// a cast registers itself by the type it converts from, not the type it
/// converts to.
#[derive(Debug, Default)]
pub struct ProductionRegistry {
    productions: Vec<Production>,
    by_return_type: HashMap<Option<String>, Vec<ProductionId>>,
    casts: HashMap<String, Vec<String>>,
}

impl ProductionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, production: Production) -> ProductionId {
        let id = self.productions.len();
        if production.kind == ProductionKind::Cast {
            let source_type = match &production.signature[0] {
                SigElem::Hole(p) => p.type_name.clone(),
                SigElem::Literal(_) => unreachable!("a cast's sole signature element is a hole"),
            };
            let target_type = production
                .return_type
                .clone()
                .expect("a cast always has a return type");
            self.casts.entry(source_type).or_default().push(target_type);
        } else {
            self.by_return_type
                .entry(production.return_type.clone())
                .or_default()
                .push(id);
        }
        self.productions.push(production);
        id
    }

    pub fn get(&self, id: ProductionId) -> &Production {
        &self.productions[id]
    }

    pub fn all(&self) -> &[Production] {
        &self.productions
    }

    /// Candidate productions for filling a parameter slot of type
    /// `var_type`: productions returning `var_type` directly, plus
    /// productions returning any type `var_type` is registered to cast
    /// into.
    pub fn production_list(&self, var_type: &str) -> Vec<ProductionId> {
        let mut ids = Vec::new();
        if let Some(targets) = self.casts.get(var_type) {
            for target in targets {
                if let Some(more) = self.by_return_type.get(&Some(target.clone())) {
                    ids.extend(more.iter().copied());
                }
            }
        }
        if let Some(direct) = self.by_return_type.get(&Some(var_type.to_string())) {
            ids.extend(direct.iter().copied());
        }
        ids
    }

    /// Statement productions (`return_type == None`) — candidates for
    /// reducing a bare top-level Command.
    pub fn statements(&self) -> &[ProductionId] {
        self.by_return_type
            .get(&None)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
