use thiserror::Error;

use crate::{error::ArithmeticError, interpreter::token::Location};

/// Errors found while resolving and evaluating a well-formed program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCodeErrorKind {
    #[error("Unknown variable `{0}`")]
    UnknownVariable(String),
    /// `ext_res` used where there is no enclosing scope.
    #[error("This is the main scope. There is no scope above to reference its return variable")]
    NoEnclosingScope,
    #[error("Unknown function `{0}`")]
    UnknownFunction(String),
    #[error("The function `{name}` cannot be defined again as it's already defined in the same scope (same name and parameter count, or same alias) at {original}")]
    DuplicateFunction {
        name:     String,
        /// Where the existing definition lives.
        original: String,
    },
    #[error("The external variable `{0}` does not exist in any enclosing scope")]
    UnknownExternal(String),
    #[error("For loops can't have a zero step (infinite loop). This for loop step was evaluated and it was zero")]
    ZeroStep,
    #[error("{}", main_arity_message(.parameters, .arguments))]
    MainArity { parameters: usize, arguments: usize },
    /// A call that would re-enter a function that is still executing.
    #[error("The function `{0}` is already being executed. Recursion is not allowed")]
    Recursion(String),
    #[error("{0}")]
    Arithmetic(#[from] ArithmeticError),
}

fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn main_arity_message(parameters: &usize, arguments: &usize) -> String {
    let (parameters, arguments) = (*parameters, *arguments);
    let params = plural(parameters, "parameter", "parameters");
    let given = plural(arguments, "argument was", "arguments were");
    if arguments < parameters {
        let only = if arguments == 0 { "" } else { " only" };
        format!("This main function requires {parameters} {params}, yet{only} {arguments} {given} given")
    } else {
        let only = if parameters == 0 { "" } else { " only" };
        format!("{arguments} {given} given, but this main function{only} takes {parameters} {params}")
    }
}

/// A semantic error and the token it points at.
#[derive(Debug, Clone, Error)]
#[error("INVALID CODE: {kind}\n{}\n{location}", .location.point_out())]
pub struct InvalidCodeError {
    pub kind:     InvalidCodeErrorKind,
    pub location: Location,
}
