use std::env;
use std::fs;
use std::io::{self, Write};

use jgc_interpreter::loader;
use jgc_interpreter::vm::Interpreter;

const MODES: &[&str] = &["-none", "-lines", "-code"];

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: jgi <file.jgc> [mode]");
        eprintln!("Display modes: {}", MODES.join(", "));
        std::process::exit(1);
    }

    let mode = if args.len() == 3 { args[2].as_str() } else { "-none" };
    if !MODES.contains(&mode) {
        eprintln!("Unknown display mode '{mode}'. Options are {}", MODES.join(", "));
        std::process::exit(1);
    }

    let text = fs::read_to_string(&args[1]).unwrap_or_else(|err| {
        eprintln!("Failed to read {}: {err}", args[1]);
        std::process::exit(1);
    });

    let (program, diagnostics) = loader::load(&text);
    for diag in &diagnostics {
        eprintln!("{diag}");
    }

    if mode == "-code" {
        for (i, instr) in program.instructions.iter().enumerate() {
            println!("{i}\t{instr}");
        }
    }

    if !program.functions.contains_key("main") {
        eprintln!("ERROR: no 'main' function");
        std::process::exit(1);
    }

    let mut interpreter = Interpreter::new(program);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    if mode == "-lines" {
        run_traced(&mut interpreter, &mut lines, &mut out);
    } else {
        interpreter.run_with(&mut lines, &mut out).unwrap_or_else(|err| {
            eprintln!("Runtime error: {err}");
            std::process::exit(1);
        });
    }
}

/// `-lines` trace mode: print the instruction about to run before each
/// step.
fn run_traced<R, W>(interpreter: &mut Interpreter, input: &mut R, out: &mut W)
where
    R: Iterator<Item = io::Result<String>>,
    W: Write,
{
    while interpreter.pc < interpreter.program.instructions.len() {
        println!("{}", interpreter.program.instructions[interpreter.pc]);
        let more = interpreter.step_once(input, out).unwrap_or_else(|err| {
            eprintln!("Runtime error: {err}");
            std::process::exit(1);
        });
        if !more {
            break;
        }
    }
}
