use tracing::debug;

use crate::{
    ast::Root,
    error::{SyntaxError, SyntaxErrorKind},
    interpreter::{
        parser::statement::parse_instructions,
        token::{Location, Token, TokenKind},
    },
};

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Parses a whole program.
///
/// This is the entry point of the parser. The token stream must be framed by
/// the beginning- and end-of-content sentinels, as produced by
/// [`tokenize_source`](crate::interpreter::lexer::tokenize_source) and
/// [`tokenize_file`](crate::interpreter::lexer::tokenize_file); everything
/// between them is parsed as instructions.
///
/// # Parameters
/// - `tokens`: The full token stream.
///
/// # Returns
/// The program root.
///
/// # Errors
/// - `Unframed` when the stream does not start with the beginning-of-content
///   sentinel and end with the end-of-content one. The error points at the
///   first misplaced token.
/// - Any syntax error met while parsing the instructions.
///
/// # Example
/// ```
/// use std::path::{Path, PathBuf};
///
/// use malang::interpreter::{lexer::tokenize_source, parser::core::parse_program};
///
/// let tokens = tokenize_source(PathBuf::from("a.mlg"),
///                              "def f(x) { ret x * 2 }\ny = f(3)".into(),
///                              Path::new("std_libs")).unwrap();
/// let root = parse_program(&tokens).unwrap();
/// assert_eq!(root.content.len(), 2);
/// ```
pub fn parse_program(tokens: &[Token]) -> ParseResult<Root> {
    let [boc, content @ .., eoc] = tokens else {
        return Err(unframed(tokens.first()));
    };
    if boc.kind != TokenKind::Boc {
        return Err(unframed(Some(boc)));
    }
    if eoc.kind != TokenKind::Eoc {
        return Err(unframed(Some(eoc)));
    }

    let content = parse_instructions(content)?;
    debug!(instructions = content.len(), "parsed program");

    Ok(Root { boc: boc.clone(),
              content,
              eoc: eoc.clone() })
}

fn unframed(token: Option<&Token>) -> SyntaxError {
    SyntaxError { kind:     SyntaxErrorKind::Unframed,
                  location: token.map_or_else(Location::nowhere, |token| token.location.clone()), }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize_source;

    #[test]
    fn streams_without_sentinels_are_rejected() {
        let tokens =
            tokenize_source(PathBuf::from("test.mlg"), "x = 1".into(), Path::new("std_libs")).unwrap();
        assert!(parse_program(&tokens).is_ok());

        let err = parse_program(&tokens[1..]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unframed);
        assert_eq!(err.location.column, 1);

        let err = parse_program(&tokens[..tokens.len() - 1]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unframed);

        let err = parse_program(&[]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unframed);
        assert_eq!(err.location.line, 0);
    }
}
