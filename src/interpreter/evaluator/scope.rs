use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::FunctionDef,
    error::InvalidCodeErrorKind,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            utils::invalid,
        },
        token::Token,
        value::{core::Value, number::Number},
    },
};

/// Name of the variable holding a scope's value.
pub const RETURN_VARIABLE: &str = "res";

/// Reserved name reading the enclosing scope's return variable.
pub const EXTERNAL_RETURN_VARIABLE: &str = "ext_res";

/// One frame of the scope chain.
#[derive(Debug)]
pub struct Scope {
    /// Variables bound in this frame. Tokens compare by lexeme, so any
    /// occurrence of a name finds its binding.
    pub variables: HashMap<Token, Value>,
    /// Functions defined in this frame, in definition order.
    pub functions: Vec<Rc<FunctionDef>>,
    /// The synthesized `res` token.
    return_variable: Token,
}

impl Scope {
    /// Creates a frame whose `res` starts at 0.
    ///
    /// # Parameters
    /// - `starter`: The token that opened the frame; `res` is synthesized at
    ///   its location.
    #[must_use]
    pub fn new(starter: &Token) -> Self {
        let return_variable = Token::synthesize_identifier(RETURN_VARIABLE, starter);
        let mut variables = HashMap::new();
        variables.insert(return_variable.clone(), Value::Number(Number::zero()));

        Self { variables,
               functions: Vec::new(),
               return_variable }
    }

    pub fn bind(&mut self, var: &Token, value: Value) {
        self.variables.insert(var.clone(), value);
    }

    /// The current value of `res`.
    #[must_use]
    pub fn return_value(&self) -> Value {
        self.variables
            .get(&self.return_variable)
            .cloned()
            .unwrap_or_else(|| Value::Number(Number::zero()))
    }
}

impl Context {
    /// Reads a variable.
    ///
    /// The chain is searched from the innermost frame outward. An unbound
    /// `ext_res` reads the `res` of the frame enclosing the current one.
    ///
    /// # Errors
    /// - `UnknownVariable` when no frame binds the name.
    /// - `NoEnclosingScope` for `ext_res` in the main scope.
    pub fn resolve_variable(&self, var: &Token) -> EvalResult<Value> {
        if let Some(value) = self.scopes.iter().rev().find_map(|scope| scope.variables.get(var)) {
            return Ok(value.clone());
        }

        if var.identifier() == Some(EXTERNAL_RETURN_VARIABLE) {
            return match self.scopes.len().checked_sub(2).and_then(|index| self.scopes.get(index)) {
                Some(parent) => Ok(parent.return_value()),
                None => Err(invalid(InvalidCodeErrorKind::NoEnclosingScope, var)),
            };
        }

        Err(invalid(InvalidCodeErrorKind::UnknownVariable(var.to_string()), var))
    }

    /// Rebinds a variable of an enclosing frame.
    ///
    /// The search starts at the parent of the current frame and stops at the
    /// first frame that already binds the name.
    ///
    /// # Errors
    /// `UnknownExternal` when no enclosing frame binds the name.
    pub fn assign_external(&mut self, var: &Token, value: Value) -> EvalResult<()> {
        let parents = self.scopes.len().saturating_sub(1);
        let slot = self.scopes[..parents].iter_mut()
                                         .rev()
                                         .find_map(|scope| scope.variables.get_mut(var));
        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            },
            None => Err(invalid(InvalidCodeErrorKind::UnknownExternal(var.to_string()), var)),
        }
    }
}
