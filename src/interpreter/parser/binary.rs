use std::mem;

use crate::{
    ast::{Callee, Expr, FunctionCall},
    error::SyntaxErrorKind,
    interpreter::{
        parser::{
            core::ParseResult,
            unary::parse_singleton,
            utils::{Terminators, error},
        },
        token::{Token, TokenKind},
        value::operation::Operator,
    },
    util::stack::ensure_sufficient_stack,
};

/// Parses a value expression.
///
/// A value expression is a singleton followed by any number of
/// `operator singleton` or `@alias singleton` pairs:
///
/// ```text
/// value := singleton ((operator | binary_alias) singleton)*
/// ```
///
/// Operators are folded in with [`append_operator`], so precedence is
/// settled as the expression is read. A binary alias wraps everything read so
/// far as its left argument.
///
/// Parsing stops at the end of the slice, at a line end unless
/// `terminators.skip_eols` is set, or at an accepted separator.
///
/// # Parameters
/// - `tokens`: The token slice.
/// - `parent`: The token that asked for a value, used in error messages.
/// - `start`: Index of the first token of the expression.
/// - `terminators`: What may end the expression.
///
/// # Returns
/// The expression and the index of the token that ended it.
///
/// # Errors
/// - `MisplacedTerminator` for a separator that is not accepted.
/// - `UnexpectedInExpression` for anything else that is neither an operator
///   nor a binary alias.
pub fn parse_value_expression(tokens: &[Token],
                              parent: &Token,
                              start: usize,
                              terminators: Terminators)
                              -> ParseResult<(Expr, usize)> {
    ensure_sufficient_stack(|| {
        let (mut buffer, mut index) = parse_singleton(tokens, parent, start, terminators.skip_eols)?;

        while let Some(token) = tokens.get(index) {
            match &token.kind {
                TokenKind::Operator(op) => {
                    let (right, next) = parse_singleton(tokens, token, index + 1, terminators.skip_eols)?;
                    buffer = append_operator(buffer, token, *op, right);
                    index = next;
                },
                TokenKind::BinaryAlias(_) => {
                    let (second, next) =
                        parse_singleton(tokens, token, index + 1, terminators.skip_eols)?;
                    buffer = Expr::Call(FunctionCall { callee:    Callee::Alias(token.clone()),
                                                       arguments: vec![buffer, second], });
                    index = next;
                },
                TokenKind::Eol if terminators.skip_eols => index += 1,
                TokenKind::Eol => break,
                kind => match terminators.accepts(kind) {
                    Some(true) => break,
                    Some(false) => {
                        return Err(error(SyntaxErrorKind::MisplacedTerminator(token.to_string()), token));
                    },
                    None => {
                        return Err(error(SyntaxErrorKind::UnexpectedInExpression(token.to_string()),
                                         token));
                    },
                },
            }
        }

        Ok((buffer, index))
    })
}

/// Inserts `root <op> right` into an expression by precedence.
///
/// When `root` is an operation binding looser than `op`, the new operator
/// sinks into its right operand; otherwise `root` becomes the left operand of
/// a new operation. Operators of equal precedence therefore associate to the
/// left, and parenthesised groups are never entered.
///
/// # Example
/// ```
/// use std::path::{Path, PathBuf};
///
/// use malang::{
///     ast::Instruction,
///     interpreter::{lexer::tokenize_source, parser::core::parse_program},
/// };
///
/// let tokens = tokenize_source(PathBuf::from("a.mlg"),
///                              "x = 1 + 2 * 3 ^ 4 - 5".into(),
///                              Path::new("std_libs")).unwrap();
/// let root = parse_program(&tokens).unwrap();
/// let Instruction::Assign { value, .. } = &root.content[0] else {
///     unreachable!()
/// };
/// assert_eq!(format!("{value:?}").matches("BinaryOp").count(), 4);
/// assert_eq!(value.to_string(), "1 + 2 * 3 ^ 4 - 5");
/// ```
#[must_use]
pub fn append_operator(mut root: Expr, operator: &Token, op: Operator, right: Expr) -> Expr {
    if let Expr::BinaryOp { op: root_op,
                            right: root_right,
                            .. } = &mut root
    {
        if root_op.precedence() < op.precedence() {
            let placeholder = Expr::Identifier(operator.clone());
            let sunk = mem::replace(&mut **root_right, placeholder);
            **root_right = append_operator(sunk, operator, op, right);
            return root;
        }
    }

    Expr::BinaryOp { operator: operator.clone(),
                     op,
                     left: Box::new(root),
                     right: Box::new(right) }
}
