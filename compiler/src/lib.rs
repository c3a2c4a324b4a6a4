//! Provides for the tokenizing and compilation of a pattern into its
//! corresponding runtime program.
//!
//! # Example
//!
//! ```rust
//! // Compilation of a pattern into a runnable program is accomplished by a
//! // single function exposed in the `tiny_regex_compiler` crate.
//! use tiny_regex_compiler::compile;
//!
//! // Evaluating a given input against a program is accomplished via the
//! // `run` and `search` functions exposed in the `tiny_regex_runtime` crate.
//! use tiny_regex_runtime::{run, search};
//!
//! // A standard pattern to be compiled.
//! let pattern = "l+o";
//!
//! let program = compile(pattern).expect("failed to compile");
//!
//! let input = "hello\nworld";
//!
//! // `run` is anchored at the supplied offset, returning the number of bytes
//! // consumed on a match.
//! assert_eq!(None, run(&program, input, 0));
//! assert_eq!(Some(3), run(&program, input, 2));
//!
//! // `search` scans for the first offset that matches, returning the offset,
//! // the length of the match and the remainder of the input following it.
//! assert_eq!(Some((2, 3, "\nworld")), search(&program, input));
//! ```

pub mod bytecode;
pub mod compiler;
mod config;
mod error;
pub mod lexer;
pub mod suffix;

pub use bytecode::{to_binary, BytecodeSerializationError};
pub use compiler::{compile, compile_with_config};
pub use config::{Config, Flags, DEFAULT_MAX_NESTING_DEPTH};
pub use error::{ParseErr, ParseErrKind};
