use crate::{
    ast::Expr,
    error::{SyntaxError, SyntaxErrorKind},
    interpreter::{
        parser::{binary::parse_value_expression, core::ParseResult},
        token::{Token, TokenKind},
    },
};

/// Which tokens end a value expression, and whether line ends inside it are
/// ignored.
///
/// A terminator that is not accepted is a syntax error where it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminators {
    /// Skip `Eol` tokens instead of stopping at them.
    pub skip_eols: bool,
    pub semicolon: bool,
    pub comma:     bool,
    pub colon:     bool,
}

impl Terminators {
    /// The value of an assignment or `ret`: ends at a line end or `;`.
    pub const STATEMENT: Self = Self { skip_eols: false,
                                       semicolon: true,
                                       comma:     false,
                                       colon:     false, };
    /// Inside parentheses: spans lines, accepts no separator.
    pub const GROUP: Self = Self { skip_eols: true,
                                   semicolon: false,
                                   comma:     false,
                                   colon:     false, };
    /// A call argument: spans lines, ends at `,`.
    pub const ARGUMENT: Self = Self { skip_eols: true,
                                      semicolon: false,
                                      comma:     true,
                                      colon:     false, };
    /// A `for` loop parameter: spans lines, ends at `:`.
    pub const LOOP_PARAMETER: Self = Self { skip_eols: true,
                                            semicolon: false,
                                            comma:     false,
                                            colon:     true, };

    /// Whether `kind` ends the expression. `None` when `kind` is not a
    /// separator at all.
    pub(in crate::interpreter::parser) const fn accepts(self, kind: &TokenKind) -> Option<bool> {
        match kind {
            TokenKind::Semicolon => Some(self.semicolon),
            TokenKind::Comma => Some(self.comma),
            TokenKind::Colon => Some(self.colon),
            _ => None,
        }
    }
}

/// Builds a syntax error pointing at `token`.
pub(in crate::interpreter::parser) fn error(kind: SyntaxErrorKind, token: &Token) -> SyntaxError {
    SyntaxError { kind,
                  location: token.location.clone() }
}

/// Finds the token closing a group.
///
/// Scanning starts at `from`, just past the opening token `opener`, with a
/// depth of one. Every `opening` kind met increases the depth and every
/// `closing` kind decreases it.
///
/// # Parameters
/// - `tokens`: The token slice holding the group.
/// - `from`: Index of the first token inside the group.
/// - `opener`: The opening token, used for the error location.
///
/// # Returns
/// The index of the closing token.
///
/// # Errors
/// `MissingClosing` if the slice ends first.
pub(in crate::interpreter::parser) fn find_enclosing(tokens: &[Token],
                                                     from: usize,
                                                     opener: &Token)
                                                     -> ParseResult<usize> {
    let closing = match opener.kind {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBrace => TokenKind::RBrace,
        _ => unreachable!("only parentheses and braces open groups"),
    };

    let mut depth = 1usize;
    for (index, token) in tokens.iter().enumerate().skip(from) {
        if token.is(&opener.kind) {
            depth += 1;
        } else if token.is(&closing) {
            depth -= 1;
            if depth == 0 {
                return Ok(index);
            }
        }
    }

    Err(error(SyntaxErrorKind::MissingClosing, opener))
}

/// Returns the index of the first token at or after `from` that is not a
/// line end, if it has the given kind.
pub(in crate::interpreter::parser) fn next_token_index(tokens: &[Token],
                                                       kind: &TokenKind,
                                                       from: usize)
                                                       -> Option<usize> {
    tokens.iter()
          .enumerate()
          .skip(from)
          .find(|(_, token)| token.kind != TokenKind::Eol)
          .filter(|(_, token)| token.is(kind))
          .map(|(index, _)| index)
}

/// Parses the separated values of a group.
///
/// `group` starts with the opening parenthesis and stops right before the
/// closing one. Each value starts after the opener or the previous separator
/// and ends at the next accepted separator. A group holding only line ends
/// yields no values.
///
/// # Errors
/// Propagates errors from the value expressions; a trailing separator is an
/// `ExpectedValue` error on that separator.
pub(in crate::interpreter::parser) fn parse_separated(group: &[Token],
                                                      terminators: Terminators)
                                                      -> ParseResult<Vec<Expr>> {
    let mut values = Vec::new();
    if group.iter().skip(1).all(|token| token.kind == TokenKind::Eol) {
        return Ok(values);
    }

    let mut index = 0;
    while index < group.len() {
        let (value, next) = parse_value_expression(group, &group[index], index + 1, terminators)?;
        values.push(value);
        index = next;
    }

    Ok(values)
}
