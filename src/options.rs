use std::path::PathBuf;

use crate::interpreter::value::number::Number;

/// Default directory searched for included files not found next to the main
/// file.
pub const DEFAULT_STD_LIB_DIR: &str = "std_libs";

/// Settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Fallback directory for `include`.
    pub std_lib_dir: PathBuf,
    /// Values bound to the parameters of `main`.
    pub arguments:   Vec<Number>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { std_lib_dir: PathBuf::from(DEFAULT_STD_LIB_DIR),
               arguments:   Vec::new(), }
    }
}

impl RunOptions {
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<Number>) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn with_std_lib_dir(mut self, std_lib_dir: impl Into<PathBuf>) -> Self {
        self.std_lib_dir = std_lib_dir.into();
        self
    }
}

/// Parses an invocation argument with the same rules as a numeric literal.
///
/// # Example
/// ```
/// use malang::{interpreter::value::number::Number, options::parse_argument};
///
/// assert_eq!(parse_argument("1_000"), Ok(Number::from(1000)));
/// assert_eq!(parse_argument("-2.5"), Ok(Number::from(-2.5)));
/// assert!(parse_argument("two").is_err());
/// ```
pub fn parse_argument(text: &str) -> Result<Number, String> {
    Number::parse_literal(text).ok_or_else(|| format!("`{text}` is not a number"))
}
