//! # JGC Interpreter (C6)
//!
//! Loads and runs the textual JGC assembly `jg-compiler` emits. This
//! crate shares no runtime state with the compiler — only the
//! `jg_compiler::jgc` instruction vocabulary — and re-parses the JGC
//! text on its own terms: [`loader::load`] turns it into a
//! [`vm::Program`], [`vm::Interpreter::run`] executes it.
//!
//! ## Pipeline
//!
//! 1. **Loader (C6a)** — [`loader::load`] re-tokenizes JGC text into
//!    `Instruction`s, resolving function entry points and intra-function
//!    labels, and pairing every `ENTERBLOCK`/`EXITBLOCK` so the call
//!    instruction between them knows the body it carries.
//! 2. **VM (C6b)** — [`vm::Interpreter`] walks the loaded program one
//!    instruction at a time, maintaining a variable store and a call
//!    stack, until `pc` runs off the end.
//!
//! ```rust,no_run
//! use jgc_interpreter::{loader, vm};
//!
//! let text = std::fs::read_to_string("out.jgc").unwrap();
//! let (program, diagnostics) = loader::load(&text);
//! for d in &diagnostics {
//!     eprintln!("{d}");
//! }
//! let mut interpreter = vm::Interpreter::new(program);
//! interpreter.run().unwrap();
//! ```

pub mod loader;
pub mod vm;
