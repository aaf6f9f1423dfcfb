//! Independent JGC text loader: a label line ends in `:` and names the
//! function whose next instruction starts here, and every other
//! non-empty line is `OPCODE arg, arg...`. An unrecognized opcode pushes
//! a `Diagnostic` and the offending line is skipped without shifting any
//! other instruction's index, matching `jg_compiler::error`'s
//! diagnostics-not-exceptions convention.
//!
//! `ENTERBLOCK`/`EXITBLOCK` pairing and intra-function `LABEL`
//! registration also happen here, at load time, rather than in the VM's
//! execution loop — the VM trusts `functions`, `labels`, and each
//! instruction's `contents` to already be correct.

use std::collections::HashMap;

use jg_compiler::error::Diagnostic;
use jg_compiler::jgc::{Instruction, Opcode, Operand};

use crate::vm::Program;

/// One open `ENTERBLOCK`, waiting for its `EXITBLOCK`: the index of the
/// instruction it attaches its `contents` to (the call immediately
/// before it) and the index of the `ENTERBLOCK` line itself.
struct OpenBlock {
    head: usize,
    enter: usize,
}

pub fn load(text: &str) -> (Program, Vec<Diagnostic>) {
    let mut instructions = Vec::new();
    let mut functions = HashMap::new();
    let mut labels: HashMap<String, HashMap<String, usize>> = HashMap::new();
    let mut diagnostics = Vec::new();
    let mut current_function = String::new();
    let mut block_stack: Vec<OpenBlock> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if is_label_line(line) {
            let name = line[..line.len() - 1].to_string();
            functions.insert(name.clone(), instructions.len());
            current_function = name;
            continue;
        }

        let (mnemonic, rest) = match line.find(' ') {
            Some(space) => (&line[..space], line[space + 1..].trim()),
            None => (line, ""),
        };

        let opcode = match Opcode::from_mnemonic(mnemonic) {
            Some(opcode) => opcode,
            None => {
                diagnostics.push(Diagnostic::unknown_opcode(mnemonic));
                continue;
            }
        };

        let operands: Vec<Operand> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(|tok| Operand::parse(tok.trim())).collect()
        };

        if opcode == Opcode::Label {
            if let Some(Operand::Name { name, .. }) = operands.first() {
                labels
                    .entry(current_function.clone())
                    .or_default()
                    .insert(name.clone(), instructions.len() + 1);
            }
        }

        let index = instructions.len();
        instructions.push(Instruction::new(opcode, operands));

        match opcode {
            Opcode::Enterblock => {
                if index == 0 {
                    diagnostics.push(Diagnostic::new(
                        jg_compiler::error::DiagnosticKind::MalformedJgc,
                        "ENTERBLOCK has no preceding instruction to attach to",
                    ));
                } else {
                    block_stack.push(OpenBlock {
                        head: index - 1,
                        enter: index,
                    });
                }
            }
            Opcode::Exitblock => match block_stack.pop() {
                Some(open) => {
                    instructions[open.head].contents = Some((open.enter + 1, index));
                }
                None => diagnostics.push(Diagnostic::new(
                    jg_compiler::error::DiagnosticKind::MalformedJgc,
                    "EXITBLOCK with no matching ENTERBLOCK",
                )),
            },
            _ => {}
        }
    }

    for open in &block_stack {
        diagnostics.push(Diagnostic::new(
            jg_compiler::error::DiagnosticKind::MalformedJgc,
            format!("ENTERBLOCK at instruction {} is never closed", open.enter),
        ));
    }

    (
        Program {
            instructions,
            functions,
            labels,
        },
        diagnostics,
    )
}

fn is_label_line(line: &str) -> bool {
    line.len() > 1 && line.ends_with(':')
}

#[cfg(test)]
mod tests;
