//! # malang
//!
//! malang is an interpreter for Malang, a scripting language whose only
//! primitive is four-function arithmetic. Everything else (functions, loops,
//! conditionals written as arithmetic, text packed into integers) is lowered
//! into one eagerly evaluated tree of operations whose root holds the result.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{path::Path, rc::Rc};

use tracing::debug;

pub use crate::error::Error;
use crate::{
    interpreter::{
        evaluator::core::Context,
        lexer::{tokenize_file, tokenize_source},
        parser::core::parse_program,
        token::Token,
        value::operation::Operation,
    },
    options::RunOptions,
};

/// Defines the structure of parsed code.
///
/// This module declares the instruction and expression types that represent
/// a program as a tree. The tree is built by the parser and walked by the
/// evaluator.
///
/// # Responsibilities
/// - Defines instruction and expression types for all language constructs.
/// - Keeps the source tokens on every node for error reporting.
pub mod ast;
/// Provides unified error types for lexing, parsing and evaluation.
///
/// This module defines all errors that can stop a run. Every error is fatal
/// and carries the location of the offending token, rendered with the source
/// line and a pointer at the token.
///
/// # Responsibilities
/// - Defines one error type per phase, plus the crate-level `Error`.
/// - Formats messages with their category, pointer and location.
pub mod error;
/// Reading of results as booleans or text, and operation count reporting.
pub mod interpret;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation and the value
/// representations.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// Settings of a run: the standard library directory and the arguments of
/// `main`.
pub mod options;
/// General utilities.
pub mod util;

/// Runs a Malang file and returns the final operation.
///
/// The file is read as given, or with the `.mlg` extension appended.
///
/// # Errors
/// The first lexical, syntax, semantic or file error met.
pub fn run_file(path: &Path, options: &RunOptions) -> Result<Rc<Operation>, Error> {
    let tokens = tokenize_file(path, &options.std_lib_dir)?;
    run_tokens(&tokens, options)
}

/// Runs Malang source text and returns the final operation.
///
/// `path` names the source in error messages; includes are resolved from its
/// directory first.
///
/// # Errors
/// The first lexical, syntax, semantic or include error met.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use malang::{interpreter::value::number::Number, options::RunOptions, run_source};
///
/// let source = "def square(x) { ret x * x }\nres = square(3) + 1";
/// let program = run_source(Path::new("main.mlg"), source, &RunOptions::default()).unwrap();
/// assert_eq!(program.result(), &Number::from(10));
/// assert_eq!(program.show(), "(3 * 3) + 1");
///
/// // An unknown variable is reported with its location.
/// let err = run_source(Path::new("main.mlg"), "res = y + 1", &RunOptions::default()).unwrap_err();
/// assert!(err.to_string().starts_with("INVALID CODE: Unknown variable `y`"));
/// ```
pub fn run_source(path: &Path, source: &str, options: &RunOptions) -> Result<Rc<Operation>, Error> {
    let tokens = tokenize_source(path.to_path_buf(), source.to_string(), &options.std_lib_dir)?;
    run_tokens(&tokens, options)
}

fn run_tokens(tokens: &[Token], options: &RunOptions) -> Result<Rc<Operation>, Error> {
    let root = parse_program(tokens)?;
    let program = Context::new(options.arguments.clone()).evaluate_program(&root)?;
    debug!(operations = %program.operations_count(), "program computed");
    Ok(program)
}
