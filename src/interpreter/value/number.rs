use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use ordered_float::OrderedFloat;

use crate::error::ArithmeticError;

/// A numeric value in a Malang program.
///
/// Integers are exact and unbounded, so string literals packed into a single
/// number and long chains of integer arithmetic never lose digits. Reals are
/// plain `f64` values. Arithmetic that yields an integral real is normalized
/// back into an exact integer with [`Number::from_real`].
#[derive(Debug, Clone)]
pub enum Number {
    /// An exact integer of arbitrary size.
    Integer(BigInt),
    /// A double precision floating-point value.
    Real(f64),
}

impl Number {
    /// The integer zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::Integer(BigInt::zero())
    }

    /// Builds a number from a floating-point result, storing it as an exact
    /// integer whenever the value is finite and has no fractional part.
    ///
    /// # Example
    /// ```
    /// use malang::interpreter::value::number::Number;
    ///
    /// assert!(matches!(Number::from_real(4.0), Number::Integer(_)));
    /// assert!(matches!(Number::from_real(0.25), Number::Real(_)));
    /// ```
    #[must_use]
    pub fn from_real(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 {
            if let Some(integer) = BigInt::from_f64(value) {
                return Self::Integer(integer);
            }
        }
        Self::Real(value)
    }

    /// Converts the number to a finite `f64`.
    ///
    /// # Errors
    /// `TooLargeForReal` for an integer beyond the range of `f64`.
    pub fn to_f64(&self) -> Result<f64, ArithmeticError> {
        match self {
            Self::Integer(i) => i.to_f64()
                                 .filter(|real| real.is_finite())
                                 .ok_or(ArithmeticError::TooLargeForReal),
            Self::Real(r) => Ok(*r),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(i) => i.is_zero(),
            Self::Real(r) => *r == 0.0,
        }
    }

    /// Returns `true` when the number is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Integer(i) => i.is_positive(),
            Self::Real(r) => *r > 0.0,
        }
    }

    /// Absolute value, keeping integers exact.
    #[must_use]
    pub fn abs(&self) -> Self {
        match self {
            Self::Integer(i) => Self::Integer(i.abs()),
            Self::Real(r) => Self::from_real(r.abs()),
        }
    }

    /// Parses a numeric literal as written in source code.
    ///
    /// Digits may be grouped with `_`, but every underscore must sit between
    /// two digits. A literal containing `.` is a real, anything else an exact
    /// integer. A leading `-` is accepted.
    ///
    /// Returns `None` for malformed literals such as `1__0`, `1._5` or `1.2.3`,
    /// and for reals too long to be finite.
    ///
    /// # Example
    /// ```
    /// use malang::interpreter::value::number::Number;
    ///
    /// assert_eq!(Number::parse_literal("1_000"), Some(Number::from(1000)));
    /// assert_eq!(Number::parse_literal("-2.5"), Some(Number::Real(-2.5)));
    /// assert_eq!(Number::parse_literal("1__0"), None);
    /// ```
    #[must_use]
    pub fn parse_literal(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        let bytes = digits.as_bytes();

        for (index, byte) in bytes.iter().enumerate() {
            if *byte == b'_' {
                let before = index.checked_sub(1).and_then(|i| bytes.get(i));
                let after = bytes.get(index + 1);
                if !before.is_some_and(u8::is_ascii_digit) || !after.is_some_and(u8::is_ascii_digit)
                {
                    return None;
                }
            }
        }

        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        if cleaned.contains('.') {
            cleaned.parse::<f64>().ok().filter(|real| real.is_finite()).map(Self::Real)
        } else {
            BigInt::from_str(&cleaned).ok().map(Self::Integer)
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            _ => self.partial_cmp(other) == Some(Ordering::Equal),
        }
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(i), Self::Real(r)) => compare_integer_to_real(i, *r),
            (Self::Real(r), Self::Integer(i)) => {
                compare_integer_to_real(i, *r).map(Ordering::reverse)
            },
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
        }
    }
}

/// Compares exactly when the real is integral, so huge integers are not
/// rounded through `f64` first.
fn compare_integer_to_real(integer: &BigInt, real: f64) -> Option<Ordering> {
    if real.is_nan() {
        return None;
    }
    if real.is_finite() && real.fract() == 0.0 {
        return BigInt::from_f64(real).map(|r| integer.cmp(&r));
    }
    integer.to_f64().and_then(|i| i.partial_cmp(&real))
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral reals must hash like the equal integer.
        match self {
            Self::Integer(i) => i.hash(state),
            Self::Real(r) => match BigInt::from_f64(*r) {
                Some(i) if r.fract() == 0.0 => i.hash(state),
                _ => OrderedFloat(*r).hash(state),
            },
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r:?}"),
        }
    }
}
