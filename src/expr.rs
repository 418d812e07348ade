use std::{
    collections::BTreeSet,
    fmt::{self, Formatter},
    ops, slice,
};

use derive_more::{Display, From};

use crate::{
    env::Bindings,
    error::{ArithmeticError, EvalError},
    fraction::Fraction,
};

//pub(crate) type PTR<T> = std::rc::Rc<T>;
pub(crate) type PTR<T> = std::sync::Arc<T>;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Debug, From)]
#[from(&str, String)]
pub struct Var(pub(crate) PTR<str>);

impl Var {
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
}

impl BinOp {
    pub const fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }

    pub fn apply(self, lhs: Fraction, rhs: Fraction) -> Result<Fraction, ArithmeticError> {
        match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div => lhs.checked_div(rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Const(Fraction),
    Var(Var),
    Neg(Expr),
    Binary(BinOp, [Expr; 2]),
}

impl Node {
    pub fn operands(&self) -> &[Expr] {
        match self {
            Node::Const(_) | Node::Var(_) => &[],
            Node::Neg(e) => slice::from_ref(e),
            Node::Binary(_, args) => args,
        }
    }

    pub const fn is_atom(&self) -> bool {
        matches!(self, Node::Const(_) | Node::Var(_))
    }
}

/// Handle to an immutable expression node.
///
/// Cloning a handle is cheap and aliases the node, so one subexpression can
/// be the operand of several parents. Since nodes never change after they are
/// built, a structure can not contain cycles. Use [Expr::deep_clone] for a
/// copy that shares nothing with the source.
///
/// ```
/// use fracalc::{env, Expr, Fraction};
///
/// let x = Expr::var("x");
/// let e = (x + 3) * -Expr::constant(2);
/// assert_eq!(e.to_string(), "((x + 3/1) * (-2/1))");
/// assert_eq!(e.eval(&env([("x", 5)])), Ok(Fraction::from_int(-16)));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Expr(PTR<Node>);

impl Expr {
    pub fn constant(value: impl Into<Fraction>) -> Self {
        Node::Const(value.into()).into()
    }

    pub fn var(name: impl Into<Var>) -> Self {
        Node::Var(name.into()).into()
    }

    pub fn neg(operand: impl Into<Expr>) -> Self {
        Node::Neg(operand.into()).into()
    }

    pub fn binary(op: BinOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Node::Binary(op, [lhs.into(), rhs.into()]).into()
    }

    /// lhs + rhs
    pub fn add(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::binary(BinOp::Add, lhs, rhs)
    }

    /// lhs - rhs
    pub fn sub(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::binary(BinOp::Sub, lhs, rhs)
    }

    /// lhs * rhs
    pub fn mul(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::binary(BinOp::Mul, lhs, rhs)
    }

    /// lhs / rhs
    pub fn div(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::binary(BinOp::Div, lhs, rhs)
    }

    #[inline(always)]
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn operands(&self) -> &[Expr] {
        self.node().operands()
    }

    /// true if both handles point to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        PTR::ptr_eq(&self.0, &other.0)
    }

    pub fn as_const(&self) -> Option<Fraction> {
        match self.node() {
            Node::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// Evaluates the expression bottom up, left operand before right.
    ///
    /// Fails on the first variable missing from `env`, or if an intermediate
    /// value leaves the `i64` range. Division by zero is not an error, it
    /// produces a sentinel fraction.
    pub fn eval<B: Bindings + ?Sized>(&self, env: &B) -> Result<Fraction, EvalError> {
        match self.node() {
            Node::Const(c) => Ok(*c),
            Node::Var(v) => {
                let val = env
                    .lookup(v.name())
                    .ok_or_else(|| EvalError::UnboundVariable(v.name().to_owned()))?;
                log::trace!("{v} := {val}");
                Ok(val)
            }
            Node::Neg(e) => Ok(e.eval(env)?.checked_neg()?),
            Node::Binary(op, [lhs, rhs]) => {
                let l = lhs.eval(env)?;
                let r = rhs.eval(env)?;
                Ok(op.apply(l, r)?)
            }
        }
    }

    /// evaluate without any variable bindings
    pub fn eval_const(&self) -> Result<Fraction, EvalError> {
        self.eval(&())
    }

    /// Structural copy that shares no node (or variable name) with `self`.
    ///
    /// Shared operands are copied once per occurrence.
    pub fn deep_clone(&self) -> Expr {
        match self.node() {
            Node::Const(c) => Expr::constant(*c),
            Node::Var(v) => Expr::var(v.name()),
            Node::Neg(e) => Expr::neg(e.deep_clone()),
            Node::Binary(op, [lhs, rhs]) => Expr::binary(*op, lhs.deep_clone(), rhs.deep_clone()),
        }
    }

    /// replace every occurrence of the variable `name` with `with`
    ///
    /// subtrees without that variable are shared with `self`
    pub fn subs(&self, name: &str, with: &Expr) -> Expr {
        match self.node() {
            Node::Var(v) if v.name() == name => with.clone(),
            Node::Const(_) | Node::Var(_) => self.clone(),
            Node::Neg(e) => {
                let e_new = e.subs(name, with);
                if e_new.ptr_eq(e) {
                    self.clone()
                } else {
                    Expr::neg(e_new)
                }
            }
            Node::Binary(op, [lhs, rhs]) => {
                let (lhs_new, rhs_new) = (lhs.subs(name, with), rhs.subs(name, with));
                if lhs_new.ptr_eq(lhs) && rhs_new.ptr_eq(rhs) {
                    self.clone()
                } else {
                    Expr::binary(*op, lhs_new, rhs_new)
                }
            }
        }
    }

    pub fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<Var>) {
        match self.node() {
            Node::Var(v) => {
                vars.insert(v.clone());
            }
            n => n.operands().iter().for_each(|e| e.collect_vars(vars)),
        }
    }

    pub fn depth(&self) -> usize {
        1 + self
            .operands()
            .iter()
            .map(Expr::depth)
            .max()
            .unwrap_or(0)
    }

    /// number of nodes, shared nodes are counted once per occurrence
    pub fn node_count(&self) -> usize {
        1 + self.operands().iter().map(Expr::node_count).sum::<usize>()
    }
}

impl From<Node> for Expr {
    fn from(value: Node) -> Self {
        Expr(PTR::new(value))
    }
}
impl From<&Expr> for Expr {
    fn from(value: &Expr) -> Self {
        value.clone()
    }
}
impl From<Fraction> for Expr {
    fn from(value: Fraction) -> Self {
        Expr::constant(value)
    }
}
impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::constant(value)
    }
}
impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::constant(value)
    }
}
impl From<Var> for Expr {
    fn from(value: Var) -> Self {
        Expr::var(value)
    }
}
impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::var(value)
    }
}
impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::var(value)
    }
}

macro_rules! impl_expr_op {
    ($op_trait:ident, $op_fn:ident) => {
        impl<T: Into<Expr>> ops::$op_trait<T> for Expr {
            type Output = Expr;

            fn $op_fn(self, rhs: T) -> Self::Output {
                Expr::$op_fn(self, rhs)
            }
        }
        impl<T: Into<Expr>> ops::$op_trait<T> for &Expr {
            type Output = Expr;

            fn $op_fn(self, rhs: T) -> Self::Output {
                Expr::$op_fn(self, rhs)
            }
        }
    };
}

impl_expr_op!(Add, add);
impl_expr_op!(Sub, sub);
impl_expr_op!(Mul, mul);
impl_expr_op!(Div, div);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::neg(self)
    }
}
impl ops::Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::neg(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Const(c) => write!(f, "{c}"),
            Node::Var(v) => write!(f, "{v}"),
            Node::Neg(e) => write!(f, "(-{e})"),
            Node::Binary(op, [lhs, rhs]) => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}
