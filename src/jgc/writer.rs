//! Serializes a compiled instruction sequence to the textual JGC format:
//! label lines followed by `OPCODE arg, arg` lines, one per logical line,
//! UTF-8, LF-separated.

use super::Instruction;

pub fn write(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instr in instructions {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}
