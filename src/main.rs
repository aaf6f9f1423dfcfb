use std::env;
use std::fs;

use jg_compiler::command::{self, Command};
use jg_compiler::jgc::writer;
use jg_compiler::lexer::tokenize;
use jg_compiler::production::{NameCounter, ProductionRegistry};
use jg_compiler::reduce::reduce_program;

const MODES: &[&str] = &["-commands", "-blocks", "-productions", "-code"];

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: jgc <file.jg>... [mode]");
        eprintln!("Output modes: {}", MODES.join(", "));
        std::process::exit(1);
    }

    let mut files = &args[1..];
    let mut mode = "";
    if let Some(last) = files.last() {
        if let Some(&m) = MODES.iter().find(|&&m| m == last) {
            mode = m;
            files = &files[..files.len() - 1];
        } else if last.starts_with('-') {
            eprintln!("Unrecognized display mode: {last}");
            eprintln!("Valid display modes: {}", MODES.join(", "));
            std::process::exit(1);
        }
    }

    let mut source = String::new();
    for path in files {
        let contents = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("Failed to read {path}: {err}");
            std::process::exit(1);
        });
        source.push_str(&contents);
        if !source.ends_with('\n') {
            source.push('\n');
        }
    }

    let lexed = tokenize(&source);
    for diag in &lexed.diagnostics {
        eprintln!("{diag}");
    }

    let commands = command::group(&lexed.tokens);

    if mode == "-commands" {
        for cmd in &commands {
            println!("{cmd}");
        }
    } else if mode == "-blocks" {
        for cmd in &commands {
            print_block(cmd, 0);
        }
    }

    let mut registry = ProductionRegistry::new();
    let mut counter = NameCounter::new();
    let (instructions, diagnostics) = reduce_program(&commands, &mut registry, &mut counter);
    for diag in &diagnostics {
        eprintln!("{diag}");
    }

    if mode == "-productions" {
        for prod in registry.all() {
            println!(
                "{}: {} parameter(s), returns {:?}",
                prod.name,
                prod.parameter_count(),
                prod.return_type
            );
        }
    }

    let text = writer::write(&instructions);
    if mode == "-code" {
        println!("{text}");
    }

    fs::write("out.jgc", text).unwrap_or_else(|err| {
        eprintln!("Failed to write out.jgc: {err}");
        std::process::exit(1);
    });
}

fn print_block(command: &Command, depth: u32) {
    println!("{}{}", "\t".repeat(depth as usize), command);
    for child in &command.children {
        print_block(child, depth + 1);
    }
}
