use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{Expr, FunctionCall, FunctionDef, Instruction},
    error::InvalidCodeErrorKind,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            scope::Scope,
            utils::invalid,
        },
        token::Token,
    },
    util::stack::ensure_sufficient_stack,
};

impl Context {
    /// Registers a function in the current frame.
    ///
    /// The definition is rejected when it collides with one already in the
    /// frame (same name and parameter count, or same alias). Its body is then
    /// validated in a temporary child frame: nested definitions register
    /// there, and every call must answer to a function visible at that
    /// point. The function itself is registered last, so it cannot call
    /// itself or anything defined after it.
    ///
    /// # Errors
    /// - `DuplicateFunction` for a collision.
    /// - `UnknownFunction` for a call the body could never make.
    pub fn define(&mut self, def: &Rc<FunctionDef>) -> EvalResult<()> {
        if let Some(existing) = self.current_scope().functions.iter().find(|f| f.collides_with(def)) {
            let kind = InvalidCodeErrorKind::DuplicateFunction { name:     def.name.to_string(),
                                                                 original: existing.name.location.to_string(), };
            return Err(invalid(kind, &def.name));
        }

        self.validate_body(&def.body, &def.name)?;

        debug!(function = %def.name, parameters = def.params.len(), "defined function");
        self.current_scope().functions.push(Rc::clone(def));
        Ok(())
    }

    fn validate_body(&mut self, body: &[Instruction], starter: &Token) -> EvalResult<()> {
        ensure_sufficient_stack(|| {
            self.scopes.push(Scope::new(starter));
            let result = self.validate_instructions(body);
            self.scopes.pop();
            result
        })
    }

    /// Checks the instructions of a body in order. Loop bodies are checked
    /// once, in place.
    fn validate_instructions(&mut self, body: &[Instruction]) -> EvalResult<()> {
        let mut work: Vec<&Instruction> = body.iter().rev().collect();

        while let Some(instruction) = work.pop() {
            match instruction {
                Instruction::Assign { value, .. } | Instruction::Return { value: Some(value), .. } => {
                    self.check_calls(value)?;
                },
                Instruction::Return { value: None, .. } => {},
                Instruction::FunctionDef(def) => self.define(def)?,
                Instruction::Call(call) => self.check_call(call)?,
                Instruction::AnonymousFunction(block) => self.validate_body(&block.body, &block.starter)?,
                Instruction::ForLoop(for_loop) => {
                    for bound in [&for_loop.begin, &for_loop.end, &for_loop.step] {
                        self.check_calls(bound)?;
                    }
                    work.extend(for_loop.body.iter().rev());
                },
            }
        }

        Ok(())
    }

    fn check_call(&mut self, call: &FunctionCall) -> EvalResult<()> {
        self.require_function(call)?;
        for argument in &call.arguments {
            self.check_calls(argument)?;
        }
        Ok(())
    }

    fn require_function(&self, call: &FunctionCall) -> EvalResult<()> {
        if self.find_function(&call.callee, call.arguments.len()).is_some() {
            return Ok(());
        }
        let callee = call.callee.token();
        Err(invalid(InvalidCodeErrorKind::UnknownFunction(callee.to_string()), callee))
    }

    fn check_calls(&mut self, expr: &Expr) -> EvalResult<()> {
        let mut pending = vec![expr];

        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Number(_) | Expr::Identifier(_) => {},
                Expr::BinaryOp { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                },
                Expr::Paren(inner) => pending.push(inner),
                Expr::Call(call) => {
                    self.require_function(call)?;
                    pending.extend(call.arguments.iter().rev());
                },
                Expr::AnonymousFunction(block) => self.validate_body(&block.body, &block.starter)?,
            }
        }

        Ok(())
    }
}
