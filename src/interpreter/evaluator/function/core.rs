use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{Callee, FunctionCall, FunctionDef},
    error::InvalidCodeErrorKind,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, Step},
            utils::invalid,
        },
        value::core::Value,
    },
};

/// Whether `def` answers a call through `callee` with `count` arguments.
///
/// Names match together with the parameter count; aliases match alone, their
/// kind already fixing the count.
fn answers(def: &FunctionDef, callee: &Callee, count: usize) -> bool {
    match callee {
        Callee::Name(name) => def.name == *name && def.params.len() == count,
        Callee::Alias(alias) => def.alias.as_ref() == Some(alias),
    }
}

impl Context {
    /// Finds the visible function answering a call.
    ///
    /// Frames are searched from the innermost outward, so a definition in a
    /// nearer frame shadows one further out.
    #[must_use]
    pub fn find_function(&self, callee: &Callee, count: usize) -> Option<Rc<FunctionDef>> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.functions.iter())
            .find(|def| answers(def, callee, count))
            .cloned()
    }

    /// Calls a function with already lowered arguments.
    ///
    /// The body runs in a new frame on top of the calling scope, with each
    /// parameter bound to its argument.
    ///
    /// # Parameters
    /// - `call`: The call site.
    /// - `arguments`: The argument values, in order.
    ///
    /// # Returns
    /// The value of the function's frame.
    ///
    /// # Errors
    /// - `UnknownFunction` when no visible function answers the call.
    /// - `Recursion` when the function found is already executing.
    /// - Any error raised by the body.
    pub fn call(&mut self, call: &FunctionCall, arguments: Vec<Value>) -> EvalResult<Value> {
        let callee = call.callee.token();
        let Some(function) = self.find_function(&call.callee, arguments.len()) else {
            return Err(invalid(InvalidCodeErrorKind::UnknownFunction(callee.to_string()), callee));
        };
        if self.active_functions.iter().any(|active| Rc::ptr_eq(active, &function)) {
            return Err(invalid(InvalidCodeErrorKind::Recursion(function.name.to_string()), callee));
        }
        trace!(function = %function.name, arguments = arguments.len(), "call");

        let steps = function.params
                            .iter()
                            .zip(arguments)
                            .map(|(var, value)| Step::Bind { var, value })
                            .chain(function.body.iter().map(Step::Run))
                            .collect();

        self.active_functions.push(Rc::clone(&function));
        let result = self.evaluate_scope(steps, &function.name);
        self.active_functions.pop();
        result
    }
}
