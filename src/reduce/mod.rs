//! # Reducer (C4)
//!
//! Matches each non-primitive Command against the registered Productions
//! and emits the JGC that realizes it. A parameter slot with more than
//! one matching production keeps only the first successful alternative —
//! ambiguity inside a sub-expression is never resolved beyond
//! declaration order.


use crate::command::Command;
use crate::error::Diagnostic;
use crate::jgc::{Instruction, Opcode, Operand};
use crate::lexer::token::{Token, TokenKind};
use crate::production::{extract, NameCounter, Parameter, ProductionId, ProductionRegistry, SigElem};

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(Token),
    Nested(Reduction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub production: ProductionId,
    pub arguments: Vec<Argument>,
}

/// Matches `tokens` against `production`'s signature in lockstep.
/// `is_statement` selects which of the two success conditions applies:
/// a statement must consume every token; a sub-expression may also
/// succeed by stopping just short of an unconsumed `)` (the caller owns
/// advancing past it). Parenthesized arguments recurse exactly one
/// level — nested parentheses are not matched specially and will simply
/// fail to find their close.
pub fn try_reduce(
    tokens: &[Token],
    production_id: ProductionId,
    is_statement: bool,
    registry: &ProductionRegistry,
) -> Option<Reduction> {
    let production = registry.get(production_id);
    let mut arguments = Vec::new();
    let mut ti = 0;
    let mut si = 0;

    while si < production.signature.len() {
        let at_close = tokens.get(ti).map(|t| t.lexeme == ")").unwrap_or(false);
        if ti >= tokens.len() || at_close {
            break;
        }
        match &production.signature[si] {
            SigElem::Literal(lit) => {
                if tokens[ti].lexeme != *lit {
                    return None;
                }
                ti += 1;
                si += 1;
            }
            SigElem::Hole(param) => {
                if tokens[ti].lexeme == "(" {
                    let close = find_close_paren(tokens, ti + 1)?;
                    let inner = &tokens[ti + 1..close];
                    let nested = registry
                        .production_list(&param.type_name)
                        .into_iter()
                        .find_map(|cand| try_reduce(inner, cand, false, registry))?;
                    arguments.push(Argument::Nested(nested));
                    ti = close + 1;
                    si += 1;
                } else {
                    let tok = &tokens[ti];
                    let satisfies = match tok.kind {
                        TokenKind::Id => true,
                        TokenKind::Number => param.type_name == "int",
                        TokenKind::String => param.type_name == "string",
                        _ => false,
                    } || param.type_name == "value";
                    if !satisfies {
                        return None;
                    }
                    arguments.push(Argument::Literal(tok.clone()));
                    ti += 1;
                    si += 1;
                }
            }
        }
    }

    let at_close = tokens.get(ti).map(|t| t.lexeme == ")").unwrap_or(false);
    if at_close {
        if is_statement {
            None
        } else {
            Some(Reduction {
                production: production_id,
                arguments,
            })
        }
    } else if ti == tokens.len() && si == production.signature.len() {
        Some(Reduction {
            production: production_id,
            arguments,
        })
    } else {
        None
    }
}

fn find_close_paren(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| tokens[j].lexeme == ")")
}

/// Walks the whole Command forest and emits its JGC. Commands are
/// processed in source order, so a production must be declared before
/// it is used in a call — the same restriction the source's single
/// top-to-bottom pass imposes.
pub fn reduce_program(
    commands: &[Command],
    registry: &mut ProductionRegistry,
    counter: &mut NameCounter,
) -> (Vec<Instruction>, Vec<Diagnostic>) {
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();
    let mut dummy = false;
    for command in commands {
        process_command(command, registry, counter, &mut out, &mut diagnostics, &mut dummy);
    }
    (out, diagnostics)
}

fn process_command(
    command: &Command,
    registry: &mut ProductionRegistry,
    counter: &mut NameCounter,
    out: &mut Vec<Instruction>,
    diagnostics: &mut Vec<Diagnostic>,
    return_flag: &mut bool,
) {
    match command.first_lexeme() {
        Some("func") | Some("block") => {
            let production = extract(command, counter);
            let name = production.name.clone();
            registry.register(production);

            let mut body = Vec::new();
            let mut local_return = false;
            for child in &command.children {
                process_command(child, registry, counter, &mut body, diagnostics, &mut local_return);
            }
            if !local_return {
                body.push(Instruction::new(Opcode::Return, Vec::new()));
            }

            out.push(function_entry(name));
            out.extend(body);
        }
        Some("main") => {
            out.push(function_entry("main".to_string()));
            let mut dummy = false;
            for child in &command.children {
                process_command(child, registry, counter, out, diagnostics, &mut dummy);
            }
        }
        Some("~") => {
            out.push(raw_instruction(&command.tokens, diagnostics));
            emit_block_wrapper(command, registry, counter, out, diagnostics, return_flag);
        }
        Some("return") => {
            let operands = command
                .tokens
                .get(1)
                .map(|t| vec![operand_from_token(t)])
                .unwrap_or_default();
            out.push(Instruction::new(Opcode::Return, operands));
            *return_flag = true;
        }
        _ => {
            let statement_ids = registry.statements().to_vec();
            let best = statement_ids
                .iter()
                .filter_map(|&pid| {
                    try_reduce(&command.tokens, pid, true, registry)
                        .map(|r| (registry.get(pid).parameter_count(), r))
                })
                .min_by_key(|(count, _)| *count);

            match best {
                Some((_, reduction)) => {
                    out.extend(emit_reduction(&reduction, false, registry));
                    emit_block_wrapper(command, registry, counter, out, diagnostics, return_flag);
                }
                None => diagnostics.push(Diagnostic::no_matching_production(command)),
            }
        }
    }
}

/// A harmless `LABEL` instruction carrying the function's/`main`'s
/// declaration label. `LABEL` is load-time-only bookkeeping, so this is
/// inert at runtime regardless of what it's attached to — unlike fusing
/// the label onto the first real body instruction, it never collides
/// with a function whose first statement happens to itself be a nested
/// declaration.
fn function_entry(name: String) -> Instruction {
    let mut entry = Instruction::new(Opcode::Label, vec![Operand::name("__entry")]);
    entry.label = Some(name);
    entry
}

fn emit_block_wrapper(
    command: &Command,
    registry: &mut ProductionRegistry,
    counter: &mut NameCounter,
    out: &mut Vec<Instruction>,
    diagnostics: &mut Vec<Diagnostic>,
    return_flag: &mut bool,
) {
    if command.children.is_empty() {
        return;
    }
    out.push(Instruction::new(Opcode::Enterblock, Vec::new()));
    for child in &command.children {
        process_command(child, registry, counter, out, diagnostics, return_flag);
    }
    out.push(Instruction::new(Opcode::Exitblock, Vec::new()));
}

fn operand_from_token(tok: &Token) -> Operand {
    match tok.kind {
        TokenKind::Number => Operand::int(tok.lexeme.parse().unwrap_or(0)),
        TokenKind::String => Operand::string(tok.lexeme.clone()),
        _ => Operand::name(tok.lexeme.clone()),
    }
}

fn raw_instruction(tokens: &[Token], diagnostics: &mut Vec<Diagnostic>) -> Instruction {
    let rest = &tokens[1..]; // tokens[0] is '~'
    let Some(head) = rest.first() else {
        diagnostics.push(Diagnostic::unknown_opcode(""));
        return Instruction::new(Opcode::Label, vec![Operand::name("__noop")]);
    };
    let mnemonic = head.lexeme.to_uppercase();
    let opcode = match Opcode::from_mnemonic(&mnemonic) {
        Some(op) => op,
        None => {
            diagnostics.push(Diagnostic::unknown_opcode(mnemonic));
            return Instruction::new(Opcode::Label, vec![Operand::name("__noop")]);
        }
    };

    let mut operands = Vec::new();
    let mut current = String::new();
    for tok in &rest[1..] {
        if tok.kind == TokenKind::Terminal && tok.lexeme == "," {
            if !current.is_empty() {
                operands.push(Operand::parse(&current));
                current.clear();
            }
        } else if tok.kind == TokenKind::String {
            current.push('"');
            current.push_str(&tok.lexeme);
            current.push('"');
        } else {
            current.push_str(&tok.lexeme);
        }
    }
    if !current.is_empty() {
        operands.push(Operand::parse(&current));
    }
    Instruction::new(opcode, operands)
}

/// The operand and its text form for a literal argument bound to
/// `param`. Identifier arguments bound to a `value`-carrying parameter
/// type (`int`/`bool`/`value`) are dereferenced so the callee receives
/// the variable's current value rather than its name; every other
/// parameter type receives the bare identifier text, because it names
/// an object the callee is meant to operate on by reference.
fn literal_operand(tok: &Token, param_type: &str) -> (Operand, String) {
    match tok.kind {
        TokenKind::Id => {
            if matches!(param_type, "int" | "bool" | "value") {
                (Operand::deref(tok.lexeme.clone(), 1), format!("@{}", tok.lexeme))
            } else {
                (Operand::name(tok.lexeme.clone()), tok.lexeme.clone())
            }
        }
        TokenKind::Number => {
            let n: i64 = tok.lexeme.parse().unwrap_or(0);
            (Operand::int(n), tok.lexeme.clone())
        }
        TokenKind::String => (
            Operand::string(tok.lexeme.clone()),
            format!("\"{}\"", tok.lexeme),
        ),
        _ => (Operand::name(tok.lexeme.clone()), tok.lexeme.clone()),
    }
}

/// Emits one Reduction's prelude (argument bindings, in reverse
/// signature order so evaluation precedes the call) followed by its
/// `FUNC` instruction. `is_parameter` appends the `, result` destination
/// a nested caller will immediately copy out of.
fn emit_reduction(reduction: &Reduction, is_parameter: bool, registry: &ProductionRegistry) -> Vec<Instruction> {
    let production = registry.get(reduction.production);
    let holes: Vec<&Parameter> = production
        .signature
        .iter()
        .filter_map(|e| match e {
            SigElem::Hole(p) => Some(p),
            SigElem::Literal(_) => None,
        })
        .collect();

    let mut chunks: Vec<Vec<Instruction>> = Vec::with_capacity(holes.len());
    for (param, arg) in holes.iter().zip(reduction.arguments.iter()) {
        let chunk = match arg {
            Argument::Literal(tok) => {
                let (operand, text) = literal_operand(tok, &param.type_name);
                if text == param.alias {
                    Vec::new()
                } else {
                    vec![Instruction::new(
                        Opcode::Assign,
                        vec![Operand::name(param.alias.clone()), operand],
                    )]
                }
            }
            Argument::Nested(nested) => {
                let mut chunk = emit_reduction(nested, true, registry);
                chunk.push(Instruction::new(
                    Opcode::Assign,
                    vec![Operand::name(param.alias.clone()), Operand::deref("result", 1)],
                ));
                chunk
            }
        };
        chunks.push(chunk);
    }

    let mut out = Vec::new();
    for chunk in chunks.into_iter().rev() {
        out.extend(chunk);
    }

    let mut func_operands = vec![Operand::name(production.name.clone())];
    if is_parameter {
        func_operands.push(Operand::name("result"));
    }
    out.push(Instruction::new(Opcode::Func, func_operands));
    out
}
