use crate::{
    ast::{Callee, Expr, FunctionCall},
    error::SyntaxErrorKind,
    interpreter::{
        parser::{
            binary::parse_value_expression,
            block::parse_block,
            core::ParseResult,
            utils::{Terminators, error, find_enclosing, parse_separated},
        },
        token::{Token, TokenKind},
    },
    util::stack::ensure_sufficient_stack,
};

/// Parses a singleton: the operand of an operator.
///
/// ```text
/// singleton := number
///            | identifier
///            | identifier "(" arguments ")"
///            | "(" value ")"
///            | "{" instructions "}"
///            | unary_alias singleton
/// ```
///
/// A unary alias applies to the single singleton after it, so
/// `$neg 2 + 3` adds 3 to the negated 2.
///
/// # Parameters
/// - `tokens`: The token slice.
/// - `parent`: The token that asked for a value, used in error messages.
/// - `start`: Index where the singleton should begin.
/// - `skip_eols`: Skip line ends before the singleton.
///
/// # Returns
/// The singleton and the index of the token after it.
///
/// # Errors
/// - `ExpectedValue` if the slice ends first.
/// - `ValueRequired` if the token found cannot start a value.
pub fn parse_singleton(tokens: &[Token],
                       parent: &Token,
                       start: usize,
                       skip_eols: bool)
                       -> ParseResult<(Expr, usize)> {
    let mut index = start;
    if skip_eols {
        while tokens.get(index).is_some_and(|token| token.kind == TokenKind::Eol) {
            index += 1;
        }
    }

    let Some(token) = tokens.get(index) else {
        return Err(error(SyntaxErrorKind::ExpectedValue(parent.to_string()), parent));
    };

    match &token.kind {
        TokenKind::Number(_) => Ok((Expr::Number(token.clone()), index + 1)),
        TokenKind::Identifier(_) => {
            if tokens.get(index + 1).is_some_and(|next| next.kind == TokenKind::LParen) {
                let (call, next) = parse_call(tokens, index)?;
                Ok((Expr::Call(call), next))
            } else {
                Ok((Expr::Identifier(token.clone()), index + 1))
            }
        },
        TokenKind::LParen => {
            let close = find_enclosing(tokens, index + 1, token)?;
            let (inner, _) = parse_value_expression(&tokens[index..close], token, 1, Terminators::GROUP)?;
            Ok((Expr::Paren(Box::new(inner)), close + 1))
        },
        TokenKind::LBrace => {
            let (block, next) = parse_block(tokens, index)?;
            Ok((Expr::AnonymousFunction(block), next))
        },
        TokenKind::UnaryAlias(_) => {
            let (argument, next) =
                ensure_sufficient_stack(|| parse_singleton(tokens, token, index + 1, false))?;
            let call = FunctionCall { callee:    Callee::Alias(token.clone()),
                                      arguments: vec![argument], };
            Ok((Expr::Call(call), next))
        },
        _ => Err(error(SyntaxErrorKind::ValueRequired { after: parent.to_string(),
                                                        found: token.to_string(), },
                       token)),
    }
}

/// Parses `name(arguments)` where `tokens[name]` is the identifier and the
/// parenthesis follows it directly.
///
/// Arguments are comma-separated value expressions that may span lines.
/// `name()` has no arguments.
///
/// # Returns
/// The call and the index of the token after the closing parenthesis.
///
/// # Errors
/// - `MissingClosing` if the parenthesis is never closed.
/// - Any error from the argument expressions.
pub fn parse_call(tokens: &[Token], name: usize) -> ParseResult<(FunctionCall, usize)> {
    let open = name + 1;
    let close = find_enclosing(tokens, open + 1, &tokens[open])?;
    let arguments = parse_separated(&tokens[open..close], Terminators::ARGUMENT)?;

    Ok((FunctionCall { callee: Callee::Name(tokens[name].clone()),
                       arguments },
        close + 1))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize_source;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize_source(PathBuf::from("test.mlg"), source.into(), Path::new("std_libs")).unwrap()
    }

    fn singleton(source: &str) -> ParseResult<(Expr, usize)> {
        let tokens = tokens(source);
        parse_singleton(&tokens, &tokens[0], 1, false)
    }

    #[test]
    fn calls_collect_their_arguments() {
        let (expr, _) = singleton("f(1, x + 2,\n  g())").unwrap();
        let Expr::Call(call) = &expr else {
            panic!("expected a call, got {expr:?}")
        };
        assert_eq!(call.callee.token().to_string(), "f");
        assert_eq!(call.arguments.len(), 3);
        assert_eq!(call.arguments[1].to_string(), "x + 2");
        assert!(matches!(&call.arguments[2], Expr::Call(inner) if inner.arguments.is_empty()));
    }

    #[test]
    fn unary_alias_binds_one_singleton() {
        let tokens = tokens("$neg 2 + 3");
        let (expr, next) = parse_singleton(&tokens, &tokens[0], 1, false).unwrap();
        assert_eq!(expr.to_string(), "$neg 2");
        assert_eq!(tokens[next].to_string(), "+");
    }

    #[test]
    fn skips_line_ends_only_when_asked() {
        let tokens = tokens("\n7");
        assert!(parse_singleton(&tokens, &tokens[0], 1, true).is_ok());
        let err = parse_singleton(&tokens, &tokens[0], 1, false).unwrap_err();
        assert_eq!(err.kind,
                   SyntaxErrorKind::ValueRequired { after: "beginning of content".into(),
                                                    found: "end of line".into(), });
    }

    #[test]
    fn malformed_singletons() {
        let err = singleton("f(1,)").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedValue(",".into()));

        let err = singleton("(1 + 2").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingClosing);

        let err = singleton("()").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedValue("(".into()));

        let err = singleton("(1, 2)").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MisplacedTerminator(",".into()));
    }
}
