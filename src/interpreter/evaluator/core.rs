use std::rc::Rc;

use tracing::{debug, warn};

use crate::{
    ast::{FunctionDef, Instruction, Root},
    error::{InvalidCodeError, InvalidCodeErrorKind},
    interpreter::{
        evaluator::{
            for_loop::unroll_constant_loops,
            scope::Scope,
            utils::invalid,
        },
        token::Token,
        value::{
            core::Value,
            number::Number,
            operation::{Operation, Operator},
        },
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or an
/// `InvalidCodeError` pointing at the offending token.
pub type EvalResult<T> = Result<T, InvalidCodeError>;

/// Name of the function whose body becomes the top-level program.
pub const MAIN_FUNCTION_NAME: &str = "main";

/// One unit of work in a scope.
///
/// Scopes are evaluated from a flat list of steps. Loop unrolling and `main`
/// extraction splice new steps in place of the instruction they replace,
/// without touching the tree they were read from.
#[derive(Debug, Clone)]
pub enum Step<'a> {
    /// Evaluate an instruction from the tree.
    Run(&'a Instruction),
    /// Bind an already evaluated value: a loop index or a `main` argument.
    Bind {
        var:   &'a Token,
        value: Value,
    },
}

/// The runtime evaluation context.
///
/// Holds the scope stack, the functions currently executing and the
/// invocation arguments. Because a call creates its frame as a child of the
/// calling scope, the scope stack is the whole visible chain: lookups walk it
/// from the top down.
pub struct Context {
    /// Live frames, innermost last. The first one is the main scope.
    pub scopes:           Vec<Scope>,
    /// Definitions currently executing, to reject re-entry.
    pub active_functions: Vec<Rc<FunctionDef>>,
    /// Arguments bound to the parameters of `main`.
    pub arguments:        Vec<Number>,
}

impl Context {
    /// Creates a context with no frames.
    #[must_use]
    pub const fn new(arguments: Vec<Number>) -> Self {
        Self { scopes: Vec::new(),
               active_functions: Vec::new(),
               arguments }
    }

    /// Evaluates a whole program.
    ///
    /// Constant top-level loops are unrolled first. The content then runs in
    /// the main scope, whose value becomes the program result. The result is
    /// always an [`Operation`]: a plain number `n` is returned as `n + 0`.
    ///
    /// # Parameters
    /// - `root`: The parsed program.
    ///
    /// # Returns
    /// The final operation.
    ///
    /// # Example
    /// ```
    /// use std::path::{Path, PathBuf};
    ///
    /// use malang::interpreter::{
    ///     evaluator::core::Context,
    ///     lexer::tokenize_source,
    ///     parser::core::parse_program,
    ///     value::number::Number,
    /// };
    ///
    /// let tokens = tokenize_source(PathBuf::from("a.mlg"),
    ///                              "def main(x) { res = x * x }".into(),
    ///                              Path::new("std_libs")).unwrap();
    /// let root = parse_program(&tokens).unwrap();
    /// let result = Context::new(vec![Number::from(7)]).evaluate_program(&root).unwrap();
    /// assert_eq!(result.result(), &Number::from(49));
    /// assert_eq!(result.to_string(), "(7 * 7)");
    /// ```
    pub fn evaluate_program(&mut self, root: &Root) -> EvalResult<Rc<Operation>> {
        let steps = unroll_constant_loops(&root.content)?;
        debug!(steps = steps.len(), "evaluating main scope");

        let has_main = root.content.iter().any(|instruction| match instruction {
                                              Instruction::FunctionDef(def) => {
                                                  def.name.identifier() == Some(MAIN_FUNCTION_NAME)
                                              },
                                              _ => false,
                                          });
        if !has_main && !self.arguments.is_empty() {
            warn!(arguments = self.arguments.len(), "no main function, ignoring the arguments");
        }

        match self.evaluate_scope(steps, &root.boc)? {
            Value::Operation(operation) => Ok(operation),
            Value::Number(n) => {
                let operation = Operation::new(Operator::Add, n.into(), Value::from(0))
                    .map_err(|e| invalid(e.into(), &root.eoc))?;
                Ok(Rc::new(operation))
            },
        }
    }

    /// Evaluates `steps` in a new frame whose return variable is synthesized
    /// from `starter`, and returns the frame's value.
    pub fn evaluate_scope(&mut self, steps: Vec<Step<'_>>, starter: &Token) -> EvalResult<Value> {
        ensure_sufficient_stack(|| {
            self.scopes.push(Scope::new(starter));
            let result = self.run_steps(steps);
            self.scopes.pop();
            result
        })
    }

    /// Runs the steps of the current frame until the end or a `ret`.
    fn run_steps<'a>(&mut self, steps: Vec<Step<'a>>) -> EvalResult<Value> {
        let mut work: Vec<Step<'a>> = steps.into_iter().rev().collect();

        while let Some(step) = work.pop() {
            let instruction = match step {
                Step::Run(instruction) => instruction,
                Step::Bind { var, value } => {
                    self.current_scope().bind(var, value);
                    continue;
                },
            };

            match instruction {
                Instruction::Assign { ext, var, value } => {
                    let value = self.lower(value)?;
                    if *ext {
                        self.assign_external(var, value)?;
                    } else {
                        self.current_scope().bind(var, value);
                    }
                },
                Instruction::FunctionDef(def)
                    if self.scopes.len() == 1 && def.name.identifier() == Some(MAIN_FUNCTION_NAME) =>
                {
                    if def.params.len() != self.arguments.len() {
                        return Err(invalid(InvalidCodeErrorKind::MainArity { parameters: def.params.len(),
                                                                             arguments:  self.arguments.len(), },
                                           &def.name));
                    }
                    debug!(arguments = self.arguments.len(), "expanding main");
                    work.extend(def.body.iter().rev().map(Step::Run));
                    work.extend(def.params
                                   .iter()
                                   .zip(&self.arguments)
                                   .rev()
                                   .map(|(var, argument)| Step::Bind { var,
                                                                       value: argument.clone().into() }));
                },
                Instruction::FunctionDef(def) => self.define(def)?,
                Instruction::Call(call) => {
                    let arguments = call.arguments
                                        .iter()
                                        .map(|argument| self.lower(argument))
                                        .collect::<EvalResult<Vec<_>>>()?;
                    self.call(call, arguments)?;
                },
                Instruction::AnonymousFunction(block) => {
                    self.evaluate_scope(block.body.iter().map(Step::Run).collect(), &block.starter)?;
                },
                Instruction::Return { value: Some(value), .. } => return self.lower(value),
                Instruction::Return { value: None, .. } => break,
                Instruction::ForLoop(for_loop) => {
                    let expansion = self.expand_loop(for_loop)?;
                    work.extend(expansion.into_iter().rev());
                },
            }
        }

        Ok(self.current_scope().return_value())
    }

    /// The innermost frame.
    pub(in crate::interpreter::evaluator) fn current_scope(&mut self) -> &mut Scope {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => unreachable!("evaluation always runs inside a frame"),
        }
    }
}
