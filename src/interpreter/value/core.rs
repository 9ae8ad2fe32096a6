use std::rc::Rc;

use num_bigint::BigUint;

use crate::interpreter::value::{number::Number, operation::Operation};

/// The state of a variable, an argument or a scope result.
///
/// Either a plain number (a literal that never went through an operator) or a
/// shared, already evaluated [`Operation`].
#[derive(Debug, Clone)]
pub enum Value {
    Number(Number),
    Operation(Rc<Operation>),
}

impl Value {
    /// The numeric value, computed eagerly for operations.
    #[must_use]
    pub fn result(&self) -> &Number {
        match self {
            Self::Number(n) => n,
            Self::Operation(operation) => operation.result(),
        }
    }

    /// Operation nodes behind this value; a plain number counts zero.
    #[must_use]
    pub fn operations_count(&self) -> BigUint {
        match self {
            Self::Number(_) => BigUint::default(),
            Self::Operation(operation) => operation.operations_count().clone(),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Operation> for Value {
    fn from(operation: Operation) -> Self {
        Self::Operation(Rc::new(operation))
    }
}

impl From<Rc<Operation>> for Value {
    fn from(operation: Rc<Operation>) -> Self {
        Self::Operation(operation)
    }
}
