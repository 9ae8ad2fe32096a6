use thiserror::Error;

use crate::interpreter::token::Location;

/// What went wrong while turning source text into tokens.
///
/// This is also the error type of the `logos` lexer, hence `Default`: logos
/// produces the default kind for input no token pattern matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexErrorKind {
    #[default]
    #[error("Unexpected / unacceptable character")]
    UnexpectedCharacter,
    #[error("Couldn't parse this number: `{0}`")]
    InvalidNumber(String),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated character literal")]
    UnterminatedCharacter,
    /// A backslash followed by a character that is not a known escape.
    #[error("Unknown escape character `\\{0}`")]
    UnknownEscape(char),
    #[error("Strings can't be empty")]
    EmptyString,
    #[error("Characters must contain one single character")]
    InvalidCharacter,
}

/// A lexical error and the place it was found.
#[derive(Debug, Clone, Error)]
#[error("PARSING ERROR: {kind}\n{}\n{location}", .location.point_out())]
pub struct LexError {
    pub kind:     LexErrorKind,
    pub location: Location,
}
