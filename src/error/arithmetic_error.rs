use thiserror::Error;

/// Failures raised by an operator while an `Operation` computes its result.
///
/// These carry no location; the evaluator attaches the operator token that
/// produced them when it turns them into an `InvalidCodeError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// Division, integer division or a negative power of zero.
    #[error("Division by zero")]
    DivisionByZero,
    /// A power whose result is not a real number, such as `(-8) ^ 0.5`.
    #[error("The result of this power is not a real number")]
    NotReal,
    /// An exact integer power whose result would not fit in memory.
    #[error("This exponent is too large to compute the power exactly")]
    ExponentTooLarge,
    /// A number, or the result of a real operation, beyond the range of a
    /// double.
    #[error("This number is too large to be used as a real number")]
    TooLargeForReal,
}
