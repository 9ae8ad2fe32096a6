use crate::{
    ast::{Expr, FunctionCall},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, Step},
            utils::invalid,
        },
        token::{Token, TokenKind},
        value::{
            core::Value,
            operation::{Operation, Operator},
        },
    },
};

/// Pending work while lowering an expression.
enum Task<'a> {
    /// Lower a subexpression and push its value.
    Visit(&'a Expr),
    /// Pop two values and push the operation combining them.
    Combine(Operator, &'a Token),
    /// Pop the call's arguments and push its result.
    Call(&'a FunctionCall),
}

impl Context {
    /// Lowers a value expression to a value.
    ///
    /// Numbers stay numbers, identifiers read their binding, operators build
    /// [`Operation`]s, groups lower their content, calls and anonymous
    /// functions yield their scope's value. Operands and arguments are
    /// lowered left to right.
    ///
    /// The tree is walked with an explicit work stack, so arbitrarily long
    /// operator chains do not grow the native stack.
    ///
    /// # Parameters
    /// - `expr`: The expression to lower.
    ///
    /// # Returns
    /// The expression's value.
    ///
    /// # Errors
    /// Unknown names, failing calls, and arithmetic failures attached to the
    /// operator that raised them.
    pub fn lower(&mut self, expr: &Expr) -> EvalResult<Value> {
        let mut tasks = vec![Task::Visit(expr)];
        let mut values: Vec<Value> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(Expr::Number(token)) => match &token.kind {
                    TokenKind::Number(n) => values.push(Value::Number(n.clone())),
                    _ => unreachable!("number expressions hold number tokens"),
                },
                Task::Visit(Expr::Identifier(token)) => values.push(self.resolve_variable(token)?),
                Task::Visit(Expr::BinaryOp { operator, op, left, right }) => {
                    tasks.push(Task::Combine(*op, operator));
                    tasks.push(Task::Visit(right));
                    tasks.push(Task::Visit(left));
                },
                Task::Visit(Expr::Paren(inner)) => tasks.push(Task::Visit(inner)),
                Task::Visit(Expr::Call(call)) => {
                    tasks.push(Task::Call(call));
                    tasks.extend(call.arguments.iter().rev().map(Task::Visit));
                },
                Task::Visit(Expr::AnonymousFunction(block)) => {
                    let steps = block.body.iter().map(Step::Run).collect();
                    values.push(self.evaluate_scope(steps, &block.starter)?);
                },
                Task::Combine(op, token) => {
                    let (Some(right), Some(left)) = (values.pop(), values.pop()) else {
                        unreachable!("both operands are lowered before their operator")
                    };
                    let operation = Operation::new(op, left, right).map_err(|e| invalid(e.into(), token))?;
                    values.push(operation.into());
                },
                Task::Call(call) => {
                    let arguments = values.split_off(values.len() - call.arguments.len());
                    values.push(self.call(call, arguments)?);
                },
            }
        }

        match values.pop() {
            Some(value) => Ok(value),
            None => unreachable!("an expression yields one value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use num_bigint::BigUint;

    use super::*;
    use crate::{
        error::{ArithmeticError, InvalidCodeErrorKind},
        interpreter::{lexer::tokenize_source, parser::core::parse_program, value::number::Number},
    };

    fn run(source: &str) -> EvalResult<Value> {
        let tokens = tokenize_source(PathBuf::from("test.mlg"), source.into(), Path::new("std_libs")).unwrap();
        let root = parse_program(&tokens).unwrap();
        Context::new(Vec::new()).evaluate_program(&root).map(Value::from)
    }

    #[test]
    fn operands_become_operations() {
        let value = run("a = 2\nres = (a + 3) * a").unwrap();
        assert_eq!(value.result(), &Number::from(10));
        let Value::Operation(operation) = value else {
            panic!("expected an operation")
        };
        assert_eq!(operation.to_string(), "((2 + 3) * 2)");
        assert_eq!(operation.operations_count(), &BigUint::from(2u32));
    }

    #[test]
    fn long_chains_lower_without_recursion() {
        let source = format!("res = 0{}", " + 1".repeat(5_000));
        assert_eq!(run(&source).unwrap().result(), &Number::from(5_000));
    }

    #[test]
    fn failures_point_at_their_token() {
        let err = run("x = 1\nres = x / (x - 1)").unwrap_err();
        assert_eq!(err.kind, InvalidCodeErrorKind::Arithmetic(ArithmeticError::DivisionByZero));
        assert_eq!((err.location.line, err.location.column), (2, 9));

        let err = run("res = y + 1").unwrap_err();
        assert_eq!(err.kind, InvalidCodeErrorKind::UnknownVariable("y".into()));
    }
}
