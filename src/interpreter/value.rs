/// Numbers.
///
/// Defines the `Number` type: exact unbounded integers and `f64` reals, with
/// literal parsing, normalization of integral reals and cross-variant
/// comparison.
pub mod number;

/// The Operation engine.
///
/// Defines the operator set and the `Operation` node, an immutable binary
/// expression whose result is computed at construction. Also holds the
/// square-then-root rewrite and the iterative drop and rendering of deep trees.
pub mod operation;

/// The `Value` type shared by the evaluator and the Operation engine.
pub mod core;
