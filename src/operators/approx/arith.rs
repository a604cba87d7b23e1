use std::cmp::Ordering;

use itertools::iproduct;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::operators::eval::arith::{apply_binary, apply_unary};
use crate::operators::OpKind;
use crate::symbols::BaseSortKind;
use crate::terms::type_set::{NumElement, TypeSet};
use crate::terms::{Term, TermIndex};
use crate::util::as_integer;

use super::elements::{numeric_elements, Collector};

/// An integer or one of the infinities.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ext {
    NegInf,
    Fin(BigInt),
    PosInf,
}

impl Ext {
    fn neg(&self) -> Ext {
        match self {
            Ext::NegInf => Ext::PosInf,
            Ext::Fin(v) => Ext::Fin(-v),
            Ext::PosInf => Ext::NegInf,
        }
    }

    fn signum(&self) -> i32 {
        match self {
            Ext::NegInf => -1,
            Ext::Fin(v) if v.is_zero() => 0,
            Ext::Fin(v) if v.is_positive() => 1,
            Ext::Fin(_) => -1,
            Ext::PosInf => 1,
        }
    }

    /// Sums of bounds of the same side never mix infinities of opposite signs.
    fn add(&self, other: &Ext) -> Ext {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => Ext::Fin(a + b),
            (Ext::NegInf, _) | (_, Ext::NegInf) => Ext::NegInf,
            _ => Ext::PosInf,
        }
    }

    /// Zero times an infinity is zero: the infinities bound finite members.
    fn mul(&self, other: &Ext) -> Ext {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => Ext::Fin(a * b),
            _ => match self.signum() * other.signum() {
                0 => Ext::Fin(BigInt::zero()),
                s if s > 0 => Ext::PosInf,
                _ => Ext::NegInf,
            },
        }
    }
}

impl PartialOrd for Ext {
    fn partial_cmp(&self, other: &Ext) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ext {
    fn cmp(&self, other: &Ext) -> Ordering {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => a.cmp(b),
            (Ext::NegInf, Ext::NegInf) | (Ext::PosInf, Ext::PosInf) => Ordering::Equal,
            (Ext::NegInf, _) | (_, Ext::PosInf) => Ordering::Less,
            (_, Ext::NegInf) | (Ext::PosInf, _) => Ordering::Greater,
        }
    }
}

/// A closed integer interval.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lo: Ext,
    hi: Ext,
}

impl Interval {
    /// The interval covering an integral element. `None` for `Real` and non-integers.
    fn of_element(e: &NumElement) -> Option<Interval> {
        let fin = |v: i64| Ext::Fin(BigInt::from(v));
        let (lo, hi) = match e {
            NumElement::Value(v) => {
                let v = as_integer(v)?;
                (Ext::Fin(v.clone()), Ext::Fin(v))
            }
            NumElement::Sort(BaseSortKind::Natural) => (fin(0), Ext::PosInf),
            NumElement::Sort(BaseSortKind::PosInteger) => (fin(1), Ext::PosInf),
            NumElement::Sort(BaseSortKind::NegInteger) => (Ext::NegInf, fin(-1)),
            NumElement::Sort(BaseSortKind::Integer) => (Ext::NegInf, Ext::PosInf),
            NumElement::Sort(_) => return None,
        };
        Some(Interval { lo, hi })
    }

    fn neg(&self) -> Interval {
        Interval {
            lo: self.hi.neg(),
            hi: self.lo.neg(),
        }
    }

    fn add(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo.add(&other.lo),
            hi: self.hi.add(&other.hi),
        }
    }

    fn mul(&self, other: &Interval) -> Interval {
        let corners = [
            self.lo.mul(&other.lo),
            self.lo.mul(&other.hi),
            self.hi.mul(&other.lo),
            self.hi.mul(&other.hi),
        ];
        Interval {
            lo: corners.iter().min().cloned().unwrap_or(Ext::NegInf),
            hi: corners.iter().max().cloned().unwrap_or(Ext::PosInf),
        }
    }

    /// A type containing the interval: a range when bounded, otherwise the smallest enclosing sort.
    fn to_type_set(&self) -> TypeSet {
        match (&self.lo, &self.hi) {
            (Ext::Fin(lo), Ext::Fin(hi)) => TypeSet::of_range(lo.clone(), hi.clone()),
            (Ext::Fin(lo), Ext::PosInf) if lo >= &BigInt::one() => {
                TypeSet::of_sort(BaseSortKind::PosInteger)
            }
            (Ext::Fin(lo), Ext::PosInf) if lo.is_zero() => TypeSet::of_sort(BaseSortKind::Natural),
            (Ext::NegInf, Ext::Fin(hi)) if hi <= &-BigInt::one() => {
                TypeSet::of_sort(BaseSortKind::NegInteger)
            }
            _ => TypeSet::of_sort(BaseSortKind::Integer),
        }
    }
}

/// The coarse sign of an element, used by the quotient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignClass {
    /// Above zero.
    Pos,
    /// Zero or above.
    NonNeg,
    /// Below zero.
    Neg,
    /// Unknown.
    Any,
}

impl SignClass {
    fn of_element(e: &NumElement) -> SignClass {
        match e {
            NumElement::Value(v) if v.is_positive() => SignClass::Pos,
            NumElement::Value(v) if v.is_negative() => SignClass::Neg,
            NumElement::Value(_) => SignClass::NonNeg,
            NumElement::Sort(BaseSortKind::PosInteger) => SignClass::Pos,
            NumElement::Sort(BaseSortKind::Natural) => SignClass::NonNeg,
            NumElement::Sort(BaseSortKind::NegInteger) => SignClass::Neg,
            NumElement::Sort(_) => SignClass::Any,
        }
    }
}

/// The sign of `qtnt(x, y)` by the signs of `x` and `y`. A zero divisor is inapplicable, so a
/// non-negative divisor counts as positive.
fn quotient_signs(x: SignClass, y: SignClass) -> TypeSet {
    use SignClass::*;
    let mut res = TypeSet::new();
    match (x, y) {
        (Pos, Pos) | (Pos, NonNeg) | (NonNeg, Pos) | (NonNeg, NonNeg) => {
            res.add_sort(BaseSortKind::Natural)
        }
        (Pos, Neg) | (NonNeg, Neg) => {
            res.add_sort(BaseSortKind::NegInteger);
            res.add_rational(BigRational::zero());
        }
        (Neg, Pos) | (Neg, NonNeg) => res.add_sort(BaseSortKind::NegInteger),
        (Neg, Neg) => res.add_sort(BaseSortKind::PosInteger),
        _ => res.add_sort(BaseSortKind::Integer),
    }
    res
}

fn is_value(e: &NumElement, v: i64) -> bool {
    matches!(e, NumElement::Value(r) if *r == BigRational::from_integer(v.into()))
}

fn abs_bound(v: &BigRational) -> Option<BigInt> {
    as_integer(v).map(|i| i.abs())
}

/// The result type of a binary operator applied to one element pair.
fn point_binary(kind: OpKind, x: &NumElement, y: &NumElement) -> TypeSet {
    if let (NumElement::Value(a), NumElement::Value(b)) = (x, y) {
        return match apply_binary(kind, a, b) {
            Some(r) => TypeSet::of_rational(r),
            None => TypeSet::new(),
        };
    }
    let real = || TypeSet::of_sort(BaseSortKind::Real);
    let intervals = Interval::of_element(x).zip(Interval::of_element(y));
    match kind {
        OpKind::Add | OpKind::Sub | OpKind::Mul => {
            if kind == OpKind::Mul && (is_value(x, 0) || is_value(y, 0)) {
                return TypeSet::of_rational(BigRational::zero());
            }
            match intervals {
                Some((a, b)) => match kind {
                    OpKind::Add => a.add(&b).to_type_set(),
                    OpKind::Sub => a.add(&b.neg()).to_type_set(),
                    _ => a.mul(&b).to_type_set(),
                },
                None => real(),
            }
        }
        OpKind::Div => {
            if is_value(y, 0) {
                TypeSet::new()
            } else if is_value(x, 0) {
                TypeSet::of_rational(BigRational::zero())
            } else {
                real()
            }
        }
        OpKind::Mod => match (y, intervals.is_some()) {
            (NumElement::Value(d), _) if d.is_zero() => TypeSet::new(),
            (NumElement::Value(d), true) => match abs_bound(d) {
                Some(m) => TypeSet::of_range(BigInt::zero(), m - 1),
                None => real(),
            },
            (_, true) => TypeSet::of_sort(BaseSortKind::Natural),
            (_, false) => real(),
        },
        OpKind::Qtnt => {
            if is_value(y, 0) {
                TypeSet::new()
            } else if is_value(x, 0) {
                TypeSet::of_rational(BigRational::zero())
            } else {
                quotient_signs(SignClass::of_element(x), SignClass::of_element(y))
            }
        }
        OpKind::GCD => {
            let bounded = match (x, y) {
                (NumElement::Value(c), _) | (_, NumElement::Value(c)) if !c.is_zero() => {
                    abs_bound(c)
                }
                _ => None,
            };
            match bounded {
                Some(m) => TypeSet::of_range(BigInt::one(), m),
                None => TypeSet::of_sort(BaseSortKind::Natural),
            }
        }
        OpKind::LCM => TypeSet::of_sort(BaseSortKind::Natural),
        _ => unreachable!("{} is not a binary numeric operator", kind),
    }
}

/// The result type of a unary operator applied to one element.
fn point_unary(kind: OpKind, x: &NumElement) -> TypeSet {
    if let NumElement::Value(v) = x {
        return match apply_unary(kind, v) {
            Some(r) => TypeSet::of_rational(r),
            None => TypeSet::new(),
        };
    }
    let int = |v: i64| BigRational::from_integer(v.into());
    match kind {
        OpKind::Neg => {
            let mut set = TypeSet::new();
            set.add_element(x);
            set.negate_numeric()
        }
        OpKind::Sign => match x {
            NumElement::Sort(BaseSortKind::PosInteger) => TypeSet::of_rational(int(1)),
            NumElement::Sort(BaseSortKind::Natural) => TypeSet::of_range(0.into(), 1.into()),
            NumElement::Sort(BaseSortKind::NegInteger) => TypeSet::of_rational(int(-1)),
            _ => TypeSet::of_range((-1).into(), 1.into()),
        },
        _ => unreachable!("{} is not a unary numeric operator", kind),
    }
}

/// Upward approximation of the numeric operators over the cross product of widened elements.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    match (kind, args) {
        (OpKind::Max, [a, b]) | (OpKind::Min, [a, b]) => Some(index.mk_union(a, b)),
        (_, [a]) => {
            let mut res = Collector::new(index);
            for x in numeric_elements(index, a).iter() {
                res.add_set(&point_unary(kind, x));
            }
            res.finish()
        }
        (_, [a, b]) => {
            let xs = numeric_elements(index, a);
            let ys = numeric_elements(index, b);
            let mut res = Collector::new(index);
            for (x, y) in iproduct!(xs.iter(), ys.iter()) {
                res.add_set(&point_binary(kind, x, y));
            }
            res.finish()
        }
        _ => None,
    }
}

/// Downward approximation of the numeric operators.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    let expected_set = index.type_set(expected);
    if !expected_set.has_numeric() && !matches!(kind, OpKind::Max | OpKind::Min) {
        return None;
    }
    let sort = |k| index.mk_sort(k);
    match kind {
        OpKind::Neg => Some(vec![index.mk_type(&expected_set.numeric_part().negate_numeric())?]),
        OpKind::Sign => {
            let int = |v: i64| BigRational::from_integer(v.into());
            // fractions have a sign too, so only zero narrows
            if expected_set.contains_rational(&int(1)) || expected_set.contains_rational(&int(-1)) {
                Some(vec![sort(BaseSortKind::Real)])
            } else if expected_set.contains_rational(&int(0)) {
                Some(vec![index.zero_value().clone()])
            } else {
                None
            }
        }
        OpKind::Max | OpKind::Min => {
            let any = index.canonical_any_type().clone();
            Some(vec![any.clone(), any])
        }
        OpKind::GCD | OpKind::LCM | OpKind::Qtnt => {
            let integers = TypeSet::of_sort(BaseSortKind::Integer);
            if index.intersect_sets(&expected_set, &integers).is_empty() {
                return None;
            }
            let arg = if kind == OpKind::Qtnt {
                sort(BaseSortKind::Real)
            } else {
                sort(BaseSortKind::Integer)
            };
            Some(vec![arg.clone(), arg])
        }
        _ => {
            let real = sort(BaseSortKind::Real);
            Some(vec![real.clone(), real])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    fn up(index: &TermIndex, kind: OpKind, args: &[Term]) -> Option<String> {
        approximate_up(kind, index, args).map(|t| t.to_string())
    }

    #[test]
    fn addition_of_sorts() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        let pos = index.mk_sort(BaseSortKind::PosInteger);
        let neg = index.mk_sort(BaseSortKind::NegInteger);
        assert_eq!(up(&index, OpKind::Add, &[nat.clone(), nat.clone()]), Some("Natural".into()));
        assert_eq!(up(&index, OpKind::Add, &[pos.clone(), nat.clone()]), Some("PosInteger".into()));
        assert_eq!(
            up(&index, OpKind::Add, &[index.mk_int(3), index.mk_int(5)]),
            Some("8".into())
        );
        assert_eq!(up(&index, OpKind::Add, &[pos.clone(), neg.clone()]), Some("Integer".into()));
        assert_eq!(up(&index, OpKind::Sub, &[neg, pos]), Some("NegInteger".into()));
        assert_eq!(
            up(&index, OpKind::Add, &[nat, index.mk_sort(BaseSortKind::Real)]),
            Some("Real".into())
        );
    }

    #[test]
    fn ranges_stay_ranges() {
        let index = test_utils::sample_index();
        let r = index.mk_range(1.into(), 3.into());
        assert_eq!(up(&index, OpKind::Add, &[r.clone(), index.mk_int(10)]), Some("11..13".into()));
        assert_eq!(up(&index, OpKind::Mul, &[r.clone(), index.mk_int(0)]), Some("0".into()));
        assert_eq!(up(&index, OpKind::Neg, &[r]), Some("-3..-1".into()));
        assert_eq!(
            up(&index, OpKind::Mul, &[index.mk_sort(BaseSortKind::NegInteger), index.mk_int(2)]),
            Some("NegInteger".into())
        );
    }

    #[test]
    fn partial_operators() {
        let index = test_utils::sample_index();
        let int = index.mk_sort(BaseSortKind::Integer);
        assert_eq!(up(&index, OpKind::Div, &[int.clone(), index.mk_int(0)]), None);
        assert_eq!(up(&index, OpKind::Mod, &[int.clone(), index.mk_int(-3)]), Some("0..2".into()));
        assert_eq!(
            up(&index, OpKind::Qtnt, &[index.mk_sort(BaseSortKind::NegInteger), index.mk_sort(BaseSortKind::NegInteger)]),
            Some("PosInteger".into())
        );
        assert_eq!(
            up(&index, OpKind::Qtnt, &[index.mk_sort(BaseSortKind::Natural), index.mk_sort(BaseSortKind::NegInteger)]),
            Some("NegInteger + 0".into())
        );
        assert_eq!(up(&index, OpKind::GCD, &[int.clone(), index.mk_int(-4)]), Some("1..4".into()));
        assert_eq!(up(&index, OpKind::Sign, &[index.mk_sort(BaseSortKind::Natural)]), Some("0..1".into()));
        assert_eq!(up(&index, OpKind::Add, &[int, index.mk_string("a")]), None);
    }

    #[test]
    fn downward_narrowing() {
        let index = test_utils::sample_index();
        let down = |kind, expected: &Term| {
            approximate_down(kind, &index, expected)
                .map(|v| v.iter().map(|t| t.to_string()).collect::<Vec<_>>())
        };
        assert_eq!(
            down(OpKind::Neg, &index.mk_sort(BaseSortKind::PosInteger)),
            Some(vec!["NegInteger".to_string()])
        );
        assert_eq!(down(OpKind::Sign, &index.mk_int(0)), Some(vec!["0".to_string()]));
        assert_eq!(down(OpKind::Sign, &index.mk_int(5)), None);
        assert_eq!(down(OpKind::Add, &index.mk_string("x")), None);
        assert_eq!(down(OpKind::GCD, &index.mk_numeric(BigRational::new(1.into(), 2.into()))), None);
    }
}
