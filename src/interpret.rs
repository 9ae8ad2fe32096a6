use std::fmt;

use num_bigint::{BigUint, Sign};
use num_traits::{One, Zero};

use crate::interpreter::value::number::Number;

/// Operation counts above 10 to this power are reported by order of
/// magnitude.
const EXACT_COUNT_MAGNITUDE: u32 = 100;

/// A program result read as something other than a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// 0 or 1.
    Boolean(bool),
    /// A positive integer read as big-endian bytes, one character each.
    Text(String),
    /// Anything else, unchanged.
    Raw(Number),
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(text) => f.write_str(text),
            Self::Raw(n) => write!(f, "{n}"),
        }
    }
}

/// Reads a result as a boolean or as text when possible.
///
/// # Example
/// ```
/// use malang::{
///     interpret::{Interpretation, interpret},
///     interpreter::value::number::Number,
/// };
///
/// assert_eq!(interpret(&Number::from(1)), Interpretation::Boolean(true));
/// assert_eq!(interpret(&Number::from(0x4869)), Interpretation::Text("Hi".into()));
/// assert_eq!(interpret(&Number::from(-3)), Interpretation::Raw(Number::from(-3)));
/// ```
#[must_use]
pub fn interpret(result: &Number) -> Interpretation {
    match result {
        Number::Integer(i) if i.is_zero() => Interpretation::Boolean(false),
        Number::Integer(i) if i.is_one() => Interpretation::Boolean(true),
        Number::Integer(i) if i.sign() == Sign::Plus => {
            let (_, bytes) = i.to_bytes_be();
            Interpretation::Text(bytes.into_iter().map(char::from).collect())
        },
        other => Interpretation::Raw(other.clone()),
    }
}

/// Renders an operation count, as `around 10^N` once it exceeds 10^100.
///
/// # Example
/// ```
/// use malang::interpret::describe_count;
/// use num_bigint::BigUint;
///
/// assert_eq!(describe_count(&BigUint::from(42u32)), "42");
/// assert_eq!(describe_count(&BigUint::from(10u32).pow(150)), "around 10^150");
/// ```
#[must_use]
pub fn describe_count(count: &BigUint) -> String {
    let digits = count.to_string();
    if *count > BigUint::from(10u32).pow(EXACT_COUNT_MAGNITUDE) {
        format!("around 10^{}", digits.len() - 1)
    } else {
        digits
    }
}
