//! Exact fractions and small symbolic arithmetic expressions.
//!
//! [Fraction] is an always-normalized `i64` rational, [Expr] a tree of
//! constants, variables, negations and the four binary operators that can be
//! evaluated against an environment and printed in fully parenthesized infix
//! form.

extern crate self as fracalc;
pub use fracalc_macros::expr;

pub mod env;
pub mod error;
pub mod expr;
pub mod fraction;

pub use env::{env, Bindings, Env};
pub use error::{ArithmeticError, EvalError};
pub use expr::{BinOp, Expr, Node, Var};
pub use fraction::Fraction;

pub mod prelude {
    pub use crate::{
        env::{env, Bindings, Env},
        error::{ArithmeticError, EvalError},
        expr,
        expr::{BinOp, Expr, Node, Var},
        fraction::Fraction,
    };
}
