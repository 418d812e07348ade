use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    iter::{Product, Sum},
    ops,
};

use crate::error::ArithmeticError;

/// Exact rational number with an `i64` numerator and denominator.
///
/// Every value is kept normalized: lowest terms, sign on the numerator and a
/// non-negative denominator. A zero denominator is not an error, it collapses
/// the value to a sentinel `±1/0` (signed infinity) or `0/0` (undefined).
///
/// The arithmetic operators panic if a normalized result does not fit into
/// `i64`, the same way primitive integer arithmetic does in debug builds. Use
/// the `checked_*` methods to handle that case.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    num: i64,
    den: i64,
}

impl Fraction {
    pub const ZERO: Self = Fraction::from_int(0);
    pub const ONE: Self = Fraction::from_int(1);
    pub const MINUS_ONE: Self = Fraction::from_int(-1);

    pub const INFINITY: Self = Fraction { num: 1, den: 0 };
    pub const NEG_INFINITY: Self = Fraction { num: -1, den: 0 };
    pub const UNDEF: Self = Fraction { num: 0, den: 0 };

    #[inline]
    pub const fn from_int(n: i64) -> Self {
        Fraction { num: n, den: 1 }
    }

    /// n / d in lowest terms
    ///
    /// # Panics
    ///
    /// if the normalized value is not representable, e.g. `i64::MIN / -1`
    #[track_caller]
    pub fn new(n: i64, d: i64) -> Self {
        in_range(Self::try_new(n, d))
    }

    pub fn try_new(n: i64, d: i64) -> Result<Self, ArithmeticError> {
        Wide::normalized(n.into(), d.into())
            .narrow()
            .ok_or(ArithmeticError::Overflow {
                op: '/',
                lhs: Fraction::from_int(n),
                rhs: Fraction::from_int(d),
            })
    }

    #[inline(always)]
    pub const fn numerator(&self) -> i64 {
        self.num
    }

    #[inline(always)]
    pub const fn denominator(&self) -> i64 {
        self.den
    }

    /// floating point approximation, only meant for display and interop
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn to_int(&self) -> Option<i64> {
        self.is_int().then_some(self.num)
    }

    pub const fn is_zero(&self) -> bool {
        self.num == 0 && self.den == 1
    }
    pub const fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }
    pub const fn is_int(&self) -> bool {
        self.den == 1
    }
    pub const fn is_neg(&self) -> bool {
        self.num < 0
    }
    pub const fn is_pos(&self) -> bool {
        self.num > 0
    }
    pub const fn is_finite(&self) -> bool {
        self.den != 0
    }
    pub const fn is_sentinel(&self) -> bool {
        self.den == 0
    }
    pub const fn is_undef(&self) -> bool {
        self.num == 0 && self.den == 0
    }

    pub const fn signum(&self) -> i64 {
        self.num.signum()
    }

    /// # Panics
    ///
    /// for a numerator of `i64::MIN`
    #[track_caller]
    pub fn abs(self) -> Self {
        if self.is_neg() {
            -self
        } else {
            self
        }
    }

    /// swaps numerator and denominator, zero becomes `1/0`
    ///
    /// # Panics
    ///
    /// for a numerator of `i64::MIN`
    #[track_caller]
    pub fn recip(self) -> Self {
        in_range(self.checked_recip())
    }

    pub fn checked_recip(self) -> Result<Self, ArithmeticError> {
        Wide::from(self)
            .recip()
            .narrow()
            .ok_or(ArithmeticError::Overflow {
                op: '/',
                lhs: Fraction::ONE,
                rhs: self,
            })
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.combine(rhs, '+', |a, b| a + b)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.combine(rhs, '-', |a, b| a - b)
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Wide::from(self)
            .mul(rhs.into())
            .narrow()
            .ok_or(ArithmeticError::Overflow { op: '*', lhs: self, rhs })
    }

    /// `self * rhs.recip()`, so dividing by zero yields a sentinel
    pub fn checked_div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() && self.is_finite() {
            log::trace!("{self} / {rhs} collapses to a sentinel");
        }
        Wide::from(self)
            .mul(Wide::from(rhs).recip())
            .narrow()
            .ok_or(ArithmeticError::Overflow { op: '/', lhs: self, rhs })
    }

    /// `self * -1`
    pub fn checked_neg(self) -> Result<Self, ArithmeticError> {
        self.checked_mul(Fraction::MINUS_ONE)
    }

    /// shared implementation of addition and subtraction
    ///
    /// equal denominators combine the numerators directly, otherwise both sides
    /// are scaled to the least common multiple. A single sentinel operand
    /// dominates the result.
    fn combine(
        self,
        rhs: Self,
        op: char,
        apply: impl Fn(i128, i128) -> i128,
    ) -> Result<Self, ArithmeticError> {
        let (l, r) = (Wide::from(self), Wide::from(rhs));

        let res = if l.den == r.den {
            Wide::normalized(apply(l.num, r.num), l.den)
        } else if l.den == 0 {
            l
        } else if r.den == 0 {
            Wide::normalized(apply(0, r.num), 0)
        } else {
            let lcm = l.den / gcd(l.den, r.den) * r.den;
            Wide::normalized(apply(l.num * (lcm / l.den), r.num * (lcm / r.den)), lcm)
        };

        res.narrow()
            .ok_or(ArithmeticError::Overflow { op, lhs: self, rhs })
    }

    /// `self < other`, after cancelling the common factor of both denominators
    fn less_than(&self, other: &Self) -> bool {
        if self.is_undef() || other.is_undef() {
            return false;
        }

        let (l, r) = (Wide::from(*self), Wide::from(*other));
        let g = gcd(l.den, r.den);
        if g == 0 {
            // both are signed infinities
            return l.num < r.num;
        }

        r.num * (l.den / g) > l.num * (r.den / g)
    }
}

fn gcd(a: i128, b: i128) -> i128 {
    // the operands never reach i128::MIN, so the result always fits
    num::integer::gcd(a.unsigned_abs(), b.unsigned_abs()) as i128
}

#[track_caller]
fn in_range(res: Result<Fraction, ArithmeticError>) -> Fraction {
    match res {
        Ok(f) => f,
        Err(err) => panic!("fraction arithmetic: {err}"),
    }
}

/// Intermediate 128 bit representation.
///
/// Products and sums of two normalized `i64` fractions always fit, so the
/// arithmetic itself cannot overflow, only the final narrowing can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wide {
    num: i128,
    den: i128,
}

impl Wide {
    fn normalized(num: i128, den: i128) -> Self {
        if den == 0 {
            return Wide {
                num: num.signum(),
                den: 0,
            };
        }

        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num, den);
        Wide {
            num: num / g,
            den: den / g,
        }
    }

    fn recip(self) -> Self {
        Wide::normalized(self.den, self.num)
    }

    /// cross reduces before multiplying; any sentinel operand makes the
    /// product a sentinel carrying the product of both signs
    fn mul(self, rhs: Self) -> Self {
        if self.den == 0 || rhs.den == 0 {
            return Wide {
                num: self.num.signum() * rhs.num.signum(),
                den: 0,
            };
        }

        let g1 = gcd(self.den, rhs.num);
        let g2 = gcd(rhs.den, self.num);

        let num = (self.num / g2) * (rhs.num / g1);
        let den = (self.den / g1) * (rhs.den / g2);
        Wide::normalized(num, den)
    }

    fn narrow(self) -> Option<Fraction> {
        Some(Fraction {
            num: i64::try_from(self.num).ok()?,
            den: i64::try_from(self.den).ok()?,
        })
    }
}

impl From<Fraction> for Wide {
    fn from(value: Fraction) -> Self {
        Wide {
            num: value.num.into(),
            den: value.den.into(),
        }
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Fraction::ZERO
    }
}

impl PartialOrd for Fraction {
    /// `None` only when one side is `0/0` and the other is a different value
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.less_than(other) {
            Some(Ordering::Less)
        } else if other.less_than(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

macro_rules! impl_arith_op {
    ($op_trait:ident, $op_fn:ident, $assign_trait:ident, $assign_fn:ident, $checked:ident) => {
        impl ops::$op_trait for Fraction {
            type Output = Fraction;

            #[inline]
            #[track_caller]
            fn $op_fn(self, rhs: Self) -> Self::Output {
                in_range(self.$checked(rhs))
            }
        }
        impl ops::$op_trait<&Fraction> for Fraction {
            type Output = Fraction;

            #[inline]
            #[track_caller]
            fn $op_fn(self, rhs: &Fraction) -> Self::Output {
                in_range(self.$checked(*rhs))
            }
        }
        impl ops::$op_trait<Fraction> for &Fraction {
            type Output = Fraction;

            #[inline]
            #[track_caller]
            fn $op_fn(self, rhs: Fraction) -> Self::Output {
                in_range(self.$checked(rhs))
            }
        }
        impl ops::$op_trait<&Fraction> for &Fraction {
            type Output = Fraction;

            #[inline]
            #[track_caller]
            fn $op_fn(self, rhs: &Fraction) -> Self::Output {
                in_range(self.$checked(*rhs))
            }
        }
        impl ops::$op_trait<i64> for Fraction {
            type Output = Fraction;

            #[inline]
            #[track_caller]
            fn $op_fn(self, rhs: i64) -> Self::Output {
                in_range(self.$checked(Fraction::from_int(rhs)))
            }
        }
        impl ops::$assign_trait for Fraction {
            #[track_caller]
            fn $assign_fn(&mut self, rhs: Self) {
                *self = in_range(self.$checked(rhs));
            }
        }
        impl ops::$assign_trait<&Fraction> for Fraction {
            #[track_caller]
            fn $assign_fn(&mut self, rhs: &Self) {
                *self = in_range(self.$checked(*rhs));
            }
        }
    };
}

impl_arith_op!(Add, add, AddAssign, add_assign, checked_add);
impl_arith_op!(Sub, sub, SubAssign, sub_assign, checked_sub);
impl_arith_op!(Mul, mul, MulAssign, mul_assign, checked_mul);
impl_arith_op!(Div, div, DivAssign, div_assign, checked_div);

impl ops::Neg for Fraction {
    type Output = Fraction;

    #[track_caller]
    fn neg(self) -> Self::Output {
        in_range(self.checked_neg())
    }
}
impl ops::Neg for &Fraction {
    type Output = Fraction;

    #[track_caller]
    fn neg(self) -> Self::Output {
        in_range(self.checked_neg())
    }
}

impl Sum for Fraction {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fraction::ZERO, |acc, f| acc + f)
    }
}
impl<'a> Sum<&'a Fraction> for Fraction {
    fn sum<I: Iterator<Item = &'a Fraction>>(iter: I) -> Self {
        iter.fold(Fraction::ZERO, |acc, f| acc + f)
    }
}
impl Product for Fraction {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fraction::ONE, |acc, f| acc * f)
    }
}
impl<'a> Product<&'a Fraction> for Fraction {
    fn product<I: Iterator<Item = &'a Fraction>>(iter: I) -> Self {
        iter.fold(Fraction::ONE, |acc, f| acc * f)
    }
}

impl num::Zero for Fraction {
    fn zero() -> Self {
        Fraction::ZERO
    }

    fn is_zero(&self) -> bool {
        Fraction::is_zero(self)
    }
}
impl num::One for Fraction {
    fn one() -> Self {
        Fraction::ONE
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Fraction::from_int(value)
    }
}
impl From<i32> for Fraction {
    fn from(value: i32) -> Self {
        Fraction::from_int(value.into())
    }
}
impl From<(i64, i64)> for Fraction {
    #[track_caller]
    fn from((n, d): (i64, i64)) -> Self {
        Fraction::new(n, d)
    }
}
impl From<Fraction> for f64 {
    fn from(value: Fraction) -> Self {
        value.to_f64()
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
impl Debug for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod test_fraction {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    macro_rules! r {
        ($v: literal) => {
            Fraction::new($v, 1)
        };

        ($numer: literal / $denom: literal) => {
            Fraction::new($numer, $denom)
        };
    }

    #[test_case(6, -4,  -3, 2; "sign moves to numerator")]
    #[test_case(-6, -4,  3, 2; "double negative")]
    #[test_case(0, -5,   0, 1; "zero over negative")]
    #[test_case(0, 7,    0, 1; "zero")]
    #[test_case(12, 18,  2, 3; "reduce")]
    #[test_case(5, 0,    1, 0; "positive sentinel")]
    #[test_case(-5, 0,  -1, 0; "negative sentinel")]
    #[test_case(0, 0,    0, 0; "undefined")]
    fn normalize(n: i64, d: i64, num: i64, den: i64) {
        let f = Fraction::new(n, d);
        assert_eq!((f.numerator(), f.denominator()), (num, den));
    }

    #[test]
    fn construction() {
        assert_eq!(Fraction::default(), r!(0));
        assert_eq!(Fraction::from(7), r!(7));
        assert_eq!(Fraction::from((2, 4)), r!(1 / 2));
        assert_eq!(Fraction::new(i64::MIN, 2), Fraction::from_int(i64::MIN / 2));
        assert!(Fraction::try_new(i64::MIN, -1).is_err());
        assert!(Fraction::try_new(1, i64::MIN).is_err());
    }

    #[test]
    fn exprs() {
        assert_eq!(r!(1) + r!(1), r!(2));
        assert_eq!(r!(1 / 3) + r!(2 / 3), r!(1));
        assert_eq!(r!(1 / 2) + r!(1 / 2), r!(1));
        assert_eq!(r!(1 / 2) + r!(1 / 3), r!(5 / 6));
        assert_eq!(r!(1 / 6) + r!(1 / 3), r!(1 / 2));
        assert_eq!(r!(1 / 3) - r!(2 / 3), r!(-1 / 3));
        assert_eq!(r!(3 / 4) - r!(1 / 4), r!(1 / 2));
        assert_eq!(r!(1 / -3) * r!(3), r!(-1));
        assert_eq!(r!(2 / 3) * r!(9 / 4), r!(3 / 2));
        assert_eq!(r!(0) * r!(5 / 7), r!(0));
        assert_eq!(r!(1 / 2) / r!(1 / 4), r!(2));
        assert_eq!(-r!(3 / 5), r!(-3 / 5));
        assert_eq!(r!(7 / 2) * 2, r!(7));
    }

    #[test]
    fn assign_ops_normalize() {
        let mut f = r!(1 / 4);
        f += r!(1 / 4);
        assert_eq!((f.numerator(), f.denominator()), (1, 2));
        f *= &r!(4);
        assert_eq!(f, r!(2));
        f -= r!(5 / 2);
        assert_eq!(f, r!(-1 / 2));
        f /= r!(-1 / 4);
        assert_eq!(f, r!(2));
    }

    #[test_case(r!(1), r!(0),         Fraction::INFINITY;     "one over zero")]
    #[test_case(r!(-3), r!(0),        Fraction::NEG_INFINITY; "negative over zero")]
    #[test_case(r!(0), r!(0),         Fraction::UNDEF;        "zero over zero")]
    #[test_case(r!(1), Fraction::INFINITY, r!(0);             "over infinity")]
    #[test_case(Fraction::INFINITY, r!(2), Fraction::INFINITY; "infinity over two")]
    #[test_case(Fraction::INFINITY, r!(-2), Fraction::NEG_INFINITY; "infinity over minus two")]
    fn division_sentinels(lhs: Fraction, rhs: Fraction, res: Fraction) {
        assert_eq!(lhs / rhs, res);
    }

    #[test_case(Fraction::INFINITY, r!(5),               Fraction::INFINITY; "inf plus finite")]
    #[test_case(r!(5), Fraction::NEG_INFINITY,           Fraction::NEG_INFINITY; "finite plus neg inf")]
    #[test_case(Fraction::INFINITY, Fraction::INFINITY,  Fraction::INFINITY; "inf plus inf")]
    #[test_case(Fraction::INFINITY, Fraction::NEG_INFINITY, Fraction::UNDEF; "inf plus neg inf")]
    fn add_sentinels(lhs: Fraction, rhs: Fraction, res: Fraction) {
        assert_eq!(lhs + rhs, res);
    }

    #[test]
    fn sub_sentinels() {
        assert_eq!(r!(5) - Fraction::INFINITY, Fraction::NEG_INFINITY);
        assert_eq!(Fraction::INFINITY - Fraction::INFINITY, Fraction::UNDEF);
        assert_eq!(Fraction::NEG_INFINITY - r!(1 / 2), Fraction::NEG_INFINITY);
    }

    #[test]
    fn mul_sentinels() {
        assert_eq!(Fraction::INFINITY * r!(2 / 3), Fraction::INFINITY);
        assert_eq!(Fraction::INFINITY * r!(-2), Fraction::NEG_INFINITY);
        assert_eq!(Fraction::NEG_INFINITY * r!(-2), Fraction::INFINITY);
        assert_eq!(Fraction::INFINITY * r!(0), Fraction::UNDEF);
        assert_eq!(-Fraction::INFINITY, Fraction::NEG_INFINITY);
        assert_eq!(-Fraction::UNDEF, Fraction::UNDEF);
    }

    #[test]
    fn recip() {
        assert_eq!(r!(-2 / 3).recip(), r!(-3 / 2));
        assert_eq!(r!(0).recip(), Fraction::INFINITY);
        assert_eq!(Fraction::NEG_INFINITY.recip(), r!(0));
        assert_eq!(Fraction::UNDEF.recip(), Fraction::UNDEF);
    }

    #[test]
    fn cross_reduction_avoids_overflow() {
        let big = Fraction::new(i64::MAX, 2);
        assert_eq!(big * Fraction::new(2, i64::MAX), r!(1));
        assert_eq!(big / big, r!(1));
        assert_eq!(big - big, r!(0));
    }

    #[test]
    fn overflow_is_reported() {
        let max = Fraction::from_int(i64::MAX);
        assert!(matches!(
            max.checked_add(Fraction::ONE),
            Err(ArithmeticError::Overflow { op: '+', .. })
        ));
        assert!(max.checked_mul(Fraction::from_int(2)).is_err());
        assert!(Fraction::from_int(i64::MIN).checked_neg().is_err());
        assert!(Fraction::new(1, 3).checked_sub(Fraction::new(1, i64::MAX)).is_err());
        assert!(Fraction::new(1, 3).checked_sub(Fraction::new(1, 6)).is_ok());
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn overflow_panics_in_operators() {
        let _ = Fraction::from_int(i64::MAX) + Fraction::ONE;
    }

    #[test]
    fn ordering() {
        assert!(r!(2) > r!(1));
        assert!(r!(2) >= r!(2));
        assert!(r!(2 / 4) <= r!(4 / 8));
        assert!(r!(5 / 128) > r!(11 / 2516));
        assert!(r!(-1 / 2) < r!(1 / 3));
        assert!(r!(1 / 3) != r!(1 / 2));
        assert!(Fraction::from_int(i64::MAX) > Fraction::new(i64::MAX - 1, 1));
        assert!(Fraction::new(1, i64::MAX) < Fraction::new(1, i64::MAX - 1));
    }

    #[test]
    fn ordering_sentinels() {
        assert!(Fraction::INFINITY > Fraction::from_int(i64::MAX));
        assert!(Fraction::NEG_INFINITY < Fraction::from_int(i64::MIN));
        assert!(Fraction::NEG_INFINITY < Fraction::INFINITY);
        assert_eq!(Fraction::UNDEF.partial_cmp(&r!(1)), None);
        assert_eq!(Fraction::UNDEF.partial_cmp(&Fraction::UNDEF), Some(Ordering::Equal));
    }

    #[test]
    fn to_f64() {
        assert_eq!(r!(1 / 4).to_f64(), 0.25);
        assert_eq!(f64::from(r!(-3 / 2)), -1.5);
        assert!(Fraction::INFINITY.to_f64().is_infinite());
        assert!(Fraction::UNDEF.to_f64().is_nan());
    }

    #[test]
    fn iter_folds() {
        let parts = [r!(1 / 2), r!(1 / 3), r!(1 / 6)];
        assert_eq!(parts.iter().sum::<Fraction>(), r!(1));
        assert_eq!(parts.into_iter().product::<Fraction>(), r!(1 / 36));
    }

    #[test_case(r!(-3 / 2),          "-3/2")]
    #[test_case(r!(5),               "5/1")]
    #[test_case(r!(0),               "0/1")]
    #[test_case(Fraction::INFINITY,  "1/0")]
    #[test_case(Fraction::UNDEF,     "0/0")]
    fn display(f: Fraction, res: &str) {
        assert_eq!(f.to_string(), res);
        assert_eq!(format!("{f:?}"), res);
    }
}
