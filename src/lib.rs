//! A MIPS assembly lexer, parser, validator, assembler, and simulator.
//!
//! This is meant to be a general suite for MIPS assembly, usable both as a backend for
//! editor tooling (through the lexer, parser, and validator, which report diagnostics
//! instead of failing) and as a teaching simulator.
//!
//! # Usage
//!
//! Source code goes through five stages:
//! 1. [`lex`] splits the source into tokens.
//! 2. [`parse`] builds syntax nodes out of tokens.
//! 3. [`validate`] checks the nodes against the instruction set.
//! 4. [`generate`] assembles the nodes into a memory image.
//! 5. [`execute`] runs the memory image.
//!
//! The first three stages never fail outright: they collect [`Diagnostic`]s,
//! so that every problem in a file can be reported at once.
//!
//! ```
//! use mips_ensemble::{lex, parse, validate, generate};
//!
//! let code = "
//!     .data
//!     msg: .asciiz \"hello\"
//!     .text
//!     main:
//!         lui $a0, 4097
//!         li $v0, 4
//!         syscall
//!         li $v0, 10
//!         syscall
//! ";
//! let (tokens, lex_diags) = lex(code);
//! let (nodes, parse_diags) = parse(code, &tokens);
//! let diags = validate(code, &tokens, &nodes);
//! assert!(lex_diags.is_empty() && parse_diags.is_empty() && diags.is_empty());
//!
//! let image = generate(code, &tokens, &nodes).unwrap();
//! assert_eq!(image.symbol_table().lookup_label("main"), Some(0x0040_0000));
//! ```
//!
//! Once a memory image has been created, it can be executed with the simulator:
//! ```
//! # use mips_ensemble::{lex, parse, generate};
//! # let code = "li $v0, 17\nli $a0, 3\nsyscall";
//! # let (tokens, _) = lex(code);
//! # let (nodes, _) = parse(code, &tokens);
//! # let image = generate(code, &tokens, &nodes).unwrap();
//! use mips_ensemble::sim::{execute_with_io, io::BufferedIO};
//!
//! let summary = execute_with_io(&image, 1_000, BufferedIO::new()).unwrap();
//! assert_eq!(summary.exit_code, Some(3));
//! ```
//!
//! If more granularity is needed for simulation, there are also step and breakpoint functions.
//! See the [`sim`] module for more details.
//!
//! [`Diagnostic`]: err::Diagnostic
#![warn(missing_docs)]

pub mod err;
pub mod isa;
pub mod parse;
pub mod ast;
pub mod validate;
pub mod asm;
pub mod sim;

pub use parse::lex::lex;
pub use parse::parse;
pub use validate::validate;
pub use asm::generate;
pub use sim::execute;
