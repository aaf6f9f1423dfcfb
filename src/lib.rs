//! # JG Compiler
//!
//! A two-stage toolchain for JG, an indentation-based surface language
//! that compiles to JGC, a line-oriented intermediate assembly. This
//! crate is the front end: it lexes JG source, folds it into a forest
//! of indentation-nested Commands, extracts user-declared `func`/`block`
//! productions, reduces every other Command against those productions,
//! and writes the resulting JGC text. The two stages share no runtime
//! state — [`jgc-interpreter`](../jgc_interpreter/index.html) loads and
//! executes the JGC text independently.
//!
//! ## Pipeline
//!
//! 1. **Lexer (C1)** — [`lexer::tokenize`] turns source text into a
//!    token stream.
//! 2. **Command grouper (C2)** — [`command::group`] folds tokens into a
//!    forest of `Command`s nested by indentation.
//! 3. **Function/parameter extractor (C3)** — [`production::extract`]
//!    reads a `func`/`block` header into a `Production` and registers it.
//! 4. **Reducer (C4)** — [`reduce::reduce_program`] matches every other
//!    Command against the registered Productions and emits JGC.
//! 5. **Writer (C5)** — [`jgc::writer::write`] serializes the emitted
//!    instructions to JGC text.
//!
//! ```rust,no_run
//! use jg_compiler::{command, lexer, production, reduce, jgc};
//!
//! let source = std::fs::read_to_string("program.jg").unwrap();
//! let lexed = lexer::tokenize(&source);
//! let commands = command::group(&lexed.tokens);
//! let mut registry = production::ProductionRegistry::new();
//! let mut counter = production::NameCounter::new();
//! let (instructions, diagnostics) = reduce::reduce_program(&commands, &mut registry, &mut counter);
//! for d in &diagnostics {
//!     eprintln!("{d}");
//! }
//! let text = jgc::writer::write(&instructions);
//! std::fs::write("out.jgc", text).unwrap();
//! ```

pub mod command;
pub mod error;
pub mod jgc;
pub mod lexer;
pub mod production;
pub mod reduce;
