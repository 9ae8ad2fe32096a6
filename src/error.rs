use std::path::PathBuf;

use thiserror::Error;

use crate::interpreter::token::Location;

/// Arithmetic errors.
///
/// Raised by the Operation engine when an operator cannot produce a real
/// result: division by zero, even roots of negative numbers, and exact powers
/// too large to hold.
pub mod arithmetic_error;
/// Lexical errors.
///
/// Defines what can go wrong while tokenizing: malformed numbers, bad string
/// and character literals, unknown escapes and unexpected characters.
pub mod lex_error;
/// Semantic errors.
///
/// Contains the errors raised by the scope resolver: unknown names, duplicate
/// definitions, invalid `ext` targets, zero-step loops, `main` arity
/// mismatches, recursion, and arithmetic failures tied to their operator.
pub mod semantic_error;
/// Syntax errors.
pub mod syntax_error;

pub use arithmetic_error::ArithmeticError;
pub use lex_error::{LexError, LexErrorKind};
pub use semantic_error::{InvalidCodeError, InvalidCodeErrorKind};
pub use syntax_error::{SyntaxError, SyntaxErrorKind};

/// Any error that aborts a run.
///
/// Every variant is fatal; the first one raised stops the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),
    /// An `include` that resolves to no readable file.
    #[error("NO SUCH FILE: Couldn't locate this file `{path}` that you wanted to include in here\n{}\n{location}",
            .location.point_out())]
    NoSuchFile { path: String, location: Location },
    /// The entry file itself could not be read.
    #[error("FILE DOES NOT EXIST: `{}`", .path.display())]
    MissingFile { path: PathBuf },
}
