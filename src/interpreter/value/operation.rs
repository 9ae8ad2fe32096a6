use std::{fmt, mem, rc::Rc};

use num_bigint::BigUint;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    error::ArithmeticError,
    interpreter::value::{core::Value, number::Number},
};

/// Upper bound, in bits, on the size of an exact integer power.
const MAX_POWER_BITS: u64 = 1 << 32;

/// The binary operators of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    IntDiv,
    /// `^`
    Pow,
}

impl Operator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IntDiv => "//",
            Self::Pow => "^",
        }
    }

    /// The symbol surrounded by single spaces, as used when rendering.
    #[must_use]
    pub const fn padded(self) -> &'static str {
        match self {
            Self::Add => " + ",
            Self::Sub => " - ",
            Self::Mul => " * ",
            Self::Div => " / ",
            Self::IntDiv => " // ",
            Self::Pow => " ^ ",
        }
    }

    /// Binding strength; all operators are left-associative.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div | Self::IntDiv => 2,
            Self::Pow => 3,
        }
    }

    /// Applies the operator to two resolved operands.
    ///
    /// Integer operands stay exact whenever the mathematical result is an
    /// integer: `7 / 2` is `3.5` but `8 / 2` is the integer `4`. Every real
    /// result that turns out integral is normalized with
    /// [`Number::from_real`]. An inexact integer division is rounded once,
    /// from the exact ratio.
    ///
    /// # Example
    /// ```
    /// use malang::interpreter::value::{number::Number, operation::Operator};
    ///
    /// let half = Operator::Div.apply(&Number::from(7), &Number::from(2)).unwrap();
    /// assert_eq!(half, Number::Real(3.5));
    ///
    /// let floor = Operator::IntDiv.apply(&Number::from(-7), &Number::from(2)).unwrap();
    /// assert_eq!(floor, Number::from(-4));
    /// ```
    pub fn apply(self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        use Number::Integer;

        match (self, left, right) {
            (Self::Add, Integer(l), Integer(r)) => Ok(Integer(l + r)),
            (Self::Sub, Integer(l), Integer(r)) => Ok(Integer(l - r)),
            (Self::Mul, Integer(l), Integer(r)) => Ok(Integer(l * r)),
            (Self::Add, ..) => finite(left.to_f64()? + right.to_f64()?),
            (Self::Sub, ..) => finite(left.to_f64()? - right.to_f64()?),
            (Self::Mul, ..) => finite(left.to_f64()? * right.to_f64()?),
            (Self::Div | Self::IntDiv, ..) if right.is_zero() => Err(ArithmeticError::DivisionByZero),
            (Self::Div, Integer(l), Integer(r)) => {
                let (quotient, remainder) = l.div_rem(r);
                if remainder.is_zero() {
                    return Ok(Integer(quotient));
                }
                let ratio = BigRational::new(l.clone(), r.clone());
                finite(ratio.to_f64().ok_or(ArithmeticError::TooLargeForReal)?)
            },
            (Self::Div, ..) => finite(left.to_f64()? / right.to_f64()?),
            (Self::IntDiv, Integer(l), Integer(r)) => Ok(Integer(l.div_floor(r))),
            (Self::IntDiv, ..) => finite((left.to_f64()? / right.to_f64()?).floor()),
            (Self::Pow, Integer(base), Integer(exponent)) if !exponent.is_negative() => {
                let exponent = exponent.to_u32().ok_or(ArithmeticError::ExponentTooLarge)?;
                if base.magnitude() > &BigUint::from(1u8)
                   && base.bits().saturating_mul(u64::from(exponent)) > MAX_POWER_BITS
                {
                    return Err(ArithmeticError::ExponentTooLarge);
                }
                Ok(Integer(base.pow(exponent)))
            },
            (Self::Pow, ..) => real_power(left.to_f64()?, right.to_f64()?),
        }
    }
}

/// Normalizes a real result, refusing one that overflowed `f64`.
fn finite(result: f64) -> Result<Number, ArithmeticError> {
    if result.is_infinite() {
        return Err(ArithmeticError::TooLargeForReal);
    }
    Ok(Number::from_real(result))
}

fn real_power(base: f64, exponent: f64) -> Result<Number, ArithmeticError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    let result = base.powf(exponent);
    if result.is_nan() && !base.is_nan() && !exponent.is_nan() {
        return Err(ArithmeticError::NotReal);
    }
    finite(result)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An eagerly evaluated binary expression node.
///
/// The result is computed once, in [`Operation::new`], and the node is
/// immutable afterwards. Operands are shared through `Rc`, so a variable bound
/// to an operation can be reused by many later operations without copying the
/// tree.
pub struct Operation {
    operator:         Operator,
    left:             Value,
    right:            Value,
    result:           Number,
    operations_count: BigUint,
}

impl Operation {
    /// Builds the node and computes its result.
    ///
    /// `pow(pow(x, 2), 0.5)` is recognised structurally and resolved as the
    /// exact absolute value of `x`, so huge integers survive the
    /// square-then-root idiom without a round trip through `f64`.
    ///
    /// # Errors
    /// Returns the [`ArithmeticError`] raised by the operator, if any.
    ///
    /// # Example
    /// ```
    /// use num_bigint::BigUint;
    /// use malang::interpreter::value::{
    ///     core::Value,
    ///     number::Number,
    ///     operation::{Operation, Operator},
    /// };
    ///
    /// let sum = Operation::new(Operator::Add, Value::from(2), Value::from(3)).unwrap();
    /// let product = Operation::new(Operator::Mul, Value::from(sum), Value::from(4)).unwrap();
    ///
    /// assert_eq!(product.result(), &Number::from(20));
    /// assert_eq!(product.operations_count(), &BigUint::from(2u32));
    /// assert_eq!(product.to_string(), "((2 + 3) * 4)");
    /// ```
    pub fn new(operator: Operator, left: Value, right: Value) -> Result<Self, ArithmeticError> {
        let result = match squared_base(operator, &left, &right) {
            Some(base) => base.abs(),
            None => operator.apply(left.result(), right.result())?,
        };
        let operations_count = left.operations_count() + right.operations_count() + 1u32;

        Ok(Self { operator,
                  left,
                  right,
                  result,
                  operations_count })
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub const fn left(&self) -> &Value {
        &self.left
    }

    #[must_use]
    pub const fn right(&self) -> &Value {
        &self.right
    }

    #[must_use]
    pub const fn result(&self) -> &Number {
        &self.result
    }

    /// Number of operation nodes in this tree, this one included.
    #[must_use]
    pub const fn operations_count(&self) -> &BigUint {
        &self.operations_count
    }

    /// The infix rendering without the outermost pair of parentheses.
    #[must_use]
    pub fn show(&self) -> String {
        let rendered = self.to_string();
        rendered.strip_prefix('(')
                .and_then(|inner| inner.strip_suffix(')'))
                .map_or_else(|| rendered.clone(), str::to_string)
    }
}

/// Matches `pow(pow(x, 2), 0.5)` and returns `x`'s resolved value.
fn squared_base<'a>(operator: Operator, left: &'a Value, right: &Value) -> Option<&'a Number> {
    if operator != Operator::Pow || !matches!(right, Value::Number(n) if *n == Number::Real(0.5)) {
        return None;
    }
    let Value::Operation(inner) = left else {
        return None;
    };
    if inner.operator != Operator::Pow
       || !matches!(&inner.right, Value::Number(n) if *n == Number::from(2))
    {
        return None;
    }

    Some(inner.left.result())
}

impl Drop for Operation {
    fn drop(&mut self) {
        // Deep trees would overflow the stack with the default recursive drop.
        let mut pending = Vec::new();
        detach_operands(self, &mut pending);
        while let Some(operation) = pending.pop() {
            if let Ok(mut operation) = Rc::try_unwrap(operation) {
                detach_operands(&mut operation, &mut pending);
            }
        }
    }
}

fn detach_operands(operation: &mut Operation, pending: &mut Vec<Rc<Operation>>) {
    for operand in [&mut operation.left, &mut operation.right] {
        if let Value::Operation(child) = mem::replace(operand, Value::Number(Number::zero())) {
            pending.push(child);
        }
    }
}

enum Piece<'a> {
    Text(&'static str),
    Number(&'a Number),
    Operation(&'a Operation),
}

impl<'a> From<&'a Value> for Piece<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n),
            Value::Operation(operation) => Self::Operation(operation),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Operation(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Number(n) => write!(f, "{n}")?,
                Piece::Operation(operation) => {
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::from(&operation.right));
                    stack.push(Piece::Text(operation.operator.padded()));
                    stack.push(Piece::from(&operation.left));
                    stack.push(Piece::Text("("));
                },
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
         .field("operator", &self.operator)
         .field("result", &self.result)
         .field("operations_count", &self.operations_count)
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn op(operator: Operator, left: impl Into<Value>, right: impl Into<Value>) -> Value {
        Value::from(Operation::new(operator, left.into(), right.into()).unwrap())
    }

    #[test]
    fn integral_division_stays_exact() {
        let huge = BigInt::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
        let doubled = op(Operator::Mul, Number::from(huge.clone()), 2);
        let halved = op(Operator::Div, doubled, 2);
        assert_eq!(halved.result(), &Number::from(huge));
        assert!(matches!(halved.result(), Number::Integer(_)));
    }

    #[test]
    fn multiplying_by_one_keeps_huge_integers() {
        let huge = BigInt::parse_bytes(b"98765432109876543210987654321", 10).unwrap();
        let real_one = op(Operator::Div, 3, 3);
        let product = op(Operator::Mul, Number::from(huge.clone()), real_one);
        assert_eq!(product.result(), &Number::from(huge));
    }

    #[test]
    fn square_then_root_is_exact_absolute_value() {
        let text = b"-31415926535897932384626433832795028841971";
        let x = BigInt::parse_bytes(text, 10).unwrap();
        let squared = op(Operator::Pow, Number::from(x.clone()), 2);
        let root = op(Operator::Pow, squared, 0.5);
        assert_eq!(root.result(), &Number::from(-x));
        assert_eq!(root.operations_count(), BigUint::from(2u8));
    }

    #[test]
    fn root_of_a_product_goes_through_floats() {
        let x = BigInt::parse_bytes(b"1000000000000000000000000000001", 10).unwrap();
        let product = op(Operator::Mul, Number::from(x.clone()), Number::from(x.clone()));
        let root = op(Operator::Pow, product, 0.5);
        assert_ne!(root.result(), &Number::from(x));
    }

    #[test]
    fn arithmetic_failures() {
        let zero = Number::zero();
        let one = Number::from(1);
        assert_eq!(Operator::Div.apply(&one, &zero), Err(ArithmeticError::DivisionByZero));
        assert_eq!(Operator::IntDiv.apply(&one, &Number::Real(0.0)),
                   Err(ArithmeticError::DivisionByZero));
        assert_eq!(Operator::Pow.apply(&zero, &Number::from(-1)),
                   Err(ArithmeticError::DivisionByZero));
        assert_eq!(Operator::Pow.apply(&Number::from(-8), &Number::Real(0.5)),
                   Err(ArithmeticError::NotReal));
        assert_eq!(Operator::Pow.apply(&Number::from(10), &Number::from(i64::from(u32::MAX) + 1)),
                   Err(ArithmeticError::ExponentTooLarge));
    }

    #[test]
    fn inexact_division_of_huge_integers_is_rounded_from_the_ratio() {
        let huge = BigInt::from(10).pow(400);
        let almost_one = Operator::Div.apply(&Number::from(&huge + 1), &Number::from(huge.clone()));
        assert_eq!(almost_one, Ok(Number::from(1)));

        let third = Operator::Div.apply(&Number::from(huge.clone()), &Number::from(huge * 3));
        assert_eq!(third, Ok(Number::Real(1.0 / 3.0)));
    }

    #[test]
    fn huge_integers_cannot_become_reals() {
        let huge = Number::from(BigInt::from(10).pow(400));
        assert_eq!(Operator::Mul.apply(&huge, &Number::Real(0.5)),
                   Err(ArithmeticError::TooLargeForReal));
        assert_eq!(Operator::Div.apply(&Operator::Add.apply(&huge, &Number::from(1)).unwrap(),
                                       &Number::from(3)),
                   Err(ArithmeticError::TooLargeForReal));
        assert_eq!(Operator::Pow.apply(&huge, &Number::Real(0.5)),
                   Err(ArithmeticError::TooLargeForReal));
        assert_eq!(Operator::Mul.apply(&Number::Real(1e308), &Number::from(10)),
                   Err(ArithmeticError::TooLargeForReal));
    }

    #[test]
    fn mixed_operands() {
        assert_eq!(Operator::Add.apply(&Number::Real(0.5), &Number::Real(0.5)),
                   Ok(Number::from(1)));
        assert_eq!(Operator::Pow.apply(&Number::from(2), &Number::from(-1)),
                   Ok(Number::Real(0.5)));
        assert_eq!(Operator::IntDiv.apply(&Number::Real(7.5), &Number::from(2)),
                   Ok(Number::from(3)));
    }

    #[test]
    fn rendering_and_counts() {
        let inner = op(Operator::Sub, 8, 3);
        let outer = op(Operator::Sub, inner, 2);
        let Value::Operation(outer) = outer else {
            panic!("expected an operation");
        };
        assert_eq!(outer.to_string(), "((8 - 3) - 2)");
        assert_eq!(outer.show(), "(8 - 3) - 2");
        assert_eq!(outer.result(), &Number::from(3));
        assert_eq!(outer.operations_count(), &BigUint::from(2u8));
    }

    #[test]
    fn deep_trees_drop_without_overflow() {
        let mut value = Value::from(0);
        for _ in 0..200_000 {
            value = op(Operator::Add, value, 1);
        }
        assert_eq!(value.result(), &Number::from(200_000));
        drop(value);
    }
}
