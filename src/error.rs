use thiserror::Error;

use crate::fraction::Fraction;

/// Raised by the checked fraction arithmetic when a normalized result does
/// not fit into the `i64` numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("overflow in {lhs} {op} {rhs}")]
    Overflow {
        op: char,
        lhs: Fraction,
        rhs: Fraction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unbound variable: {0}")]
    UnboundVariable(String),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

impl EvalError {
    /// name of the missing variable, if that is what went wrong
    pub fn unbound_name(&self) -> Option<&str> {
        match self {
            EvalError::UnboundVariable(name) => Some(name),
            EvalError::Arithmetic(_) => None,
        }
    }
}
