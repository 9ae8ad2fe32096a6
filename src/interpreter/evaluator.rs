/// Core evaluation logic and context management.
///
/// Contains the evaluation context, the step list every frame runs from,
/// `main` extraction and the program entry point.
pub mod core;

/// Scope frames.
///
/// Defines the frame type with its `res` return variable, and implements
/// variable lookup along the chain and `ext` assignment.
pub mod scope;

/// Lowering of value expressions to values.
pub mod expression;

/// Evaluation of `for` loops.
///
/// Loops are unrolled into copies of their body, either ahead of evaluation
/// when their bounds are constant, or when evaluation reaches them.
pub mod for_loop;

/// Utility functions for evaluation.
///
/// Provides error construction and the evaluation of constant expressions.
pub mod utils;

/// Function evaluation.
///
/// Handles definitions, their validation, lookup by signature or alias, and
/// calls.
pub mod function;
