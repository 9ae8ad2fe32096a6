use crate::{
    ast::Expr,
    error::{InvalidCodeError, InvalidCodeErrorKind},
    interpreter::{
        evaluator::core::EvalResult,
        token::{Token, TokenKind},
        value::{number::Number, operation::Operator},
    },
};

/// Builds a semantic error pointing at `token`.
pub(in crate::interpreter::evaluator) fn invalid(kind: InvalidCodeErrorKind,
                                                 token: &Token)
                                                 -> InvalidCodeError {
    InvalidCodeError { kind,
                       location: token.location.clone() }
}

/// Computes a constant expression without building operations.
///
/// Only numeric literals, operators and parentheses are accepted; see
/// [`Expr::is_constant`].
///
/// # Errors
/// Arithmetic failures, attached to their operator token.
pub fn evaluate_constant(expr: &Expr) -> EvalResult<Number> {
    enum Task<'a> {
        Visit(&'a Expr),
        Apply(Operator, &'a Token),
    }

    let mut tasks = vec![Task::Visit(expr)];
    let mut values: Vec<Number> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(Expr::Number(token)) => match &token.kind {
                TokenKind::Number(n) => values.push(n.clone()),
                _ => unreachable!("number expressions hold number tokens"),
            },
            Task::Visit(Expr::BinaryOp { operator, op, left, right }) => {
                tasks.push(Task::Apply(*op, operator));
                tasks.push(Task::Visit(right));
                tasks.push(Task::Visit(left));
            },
            Task::Visit(Expr::Paren(inner)) => tasks.push(Task::Visit(inner)),
            Task::Visit(_) => unreachable!("constant expressions hold no names or calls"),
            Task::Apply(op, token) => {
                let (Some(right), Some(left)) = (values.pop(), values.pop()) else {
                    unreachable!("both operands are evaluated before their operator")
                };
                values.push(op.apply(&left, &right).map_err(|e| invalid(e.into(), token))?);
            },
        }
    }

    match values.pop() {
        Some(n) => Ok(n),
        None => unreachable!("an expression yields one value"),
    }
}
