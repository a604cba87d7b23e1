use std::cmp::Ordering;

use num_rational::BigRational;
use num_traits::Zero;

use crate::operators::OpKind;
use crate::terms::{Term, TermIndex};
use crate::util;

/// Applies a binary numeric operator to rationals.
pub fn apply_binary(kind: OpKind, x: &BigRational, y: &BigRational) -> Option<BigRational> {
    match kind {
        OpKind::Add => Some(x + y),
        OpKind::Sub => Some(x - y),
        OpKind::Mul => Some(x * y),
        OpKind::Div => {
            if y.is_zero() {
                None
            } else {
                Some(x / y)
            }
        }
        OpKind::Mod => util::euclidean_remainder(x, y),
        OpKind::Qtnt => util::euclidean_quotient(x, y),
        OpKind::GCD => util::rational_gcd(x, y),
        OpKind::LCM => util::rational_lcm(x, y),
        OpKind::Max => Some(x.max(y).clone()),
        OpKind::Min => Some(x.min(y).clone()),
        _ => None,
    }
}

/// Applies a unary numeric operator to a rational.
pub fn apply_unary(kind: OpKind, x: &BigRational) -> Option<BigRational> {
    match kind {
        OpKind::Neg => Some(-x),
        OpKind::Sign => Some(BigRational::from_integer(util::sign_of(x).into())),
        _ => None,
    }
}

/// Evaluates the numeric operators. `Max` and `Min` compare arbitrary terms in the term order.
pub fn evaluate(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    match (kind, args) {
        (OpKind::Max, [a, b]) | (OpKind::Min, [a, b]) => {
            let a_is_less = index.lexicographic_compare(a, b) == Ordering::Less;
            let res = if a_is_less == (kind == OpKind::Max) { b } else { a };
            Some(res.clone())
        }
        (_, [a]) => apply_unary(kind, a.as_rational()?).map(|r| index.mk_numeric(r)),
        (_, [a, b]) => {
            apply_binary(kind, a.as_rational()?, b.as_rational()?).map(|r| index.mk_numeric(r))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{Bindable, EvalContext, Operator};
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    fn eval(index: &TermIndex, kind: OpKind, args: &[Term]) -> Option<Term> {
        let mut ctx = EvalContext::new(index);
        let args = args
            .iter()
            .cloned()
            .map(Bindable::Value)
            .collect::<Vec<_>>();
        kind.evaluate(&mut ctx, &args)
    }

    #[test]
    fn arithmetic() {
        let index = test_utils::sample_index();
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::Add, &[i(3), i(5)]), Some(i(8)));
        assert_eq!(eval(&index, OpKind::Sub, &[i(3), i(5)]), Some(i(-2)));
        assert_eq!(eval(&index, OpKind::Mul, &[i(3), i(-5)]), Some(i(-15)));
        assert_eq!(
            eval(&index, OpKind::Div, &[i(1), i(2)]),
            Some(index.mk_numeric(BigRational::new(1.into(), 2.into())))
        );
        assert_eq!(eval(&index, OpKind::Neg, &[i(4)]), Some(i(-4)));
        assert_eq!(eval(&index, OpKind::Sign, &[i(-4)]), Some(i(-1)));
        assert_eq!(eval(&index, OpKind::Sign, &[i(0)]), Some(i(0)));
    }

    #[test]
    fn division_by_zero_is_inapplicable() {
        let index = test_utils::sample_index();
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::Div, &[i(1), i(0)]), None);
        assert_eq!(eval(&index, OpKind::Mod, &[i(1), i(0)]), None);
        assert_eq!(eval(&index, OpKind::Qtnt, &[i(1), i(0)]), None);
    }

    #[test]
    fn euclidean_operators() {
        let index = test_utils::sample_index();
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::Qtnt, &[i(-7), i(2)]), Some(i(-4)));
        assert_eq!(eval(&index, OpKind::Mod, &[i(-7), i(2)]), Some(i(1)));
        assert_eq!(eval(&index, OpKind::Mod, &[i(-7), i(-2)]), Some(i(1)));
    }

    #[test]
    fn gcd_needs_integers() {
        let index = test_utils::sample_index();
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::GCD, &[i(12), i(-18)]), Some(i(6)));
        assert_eq!(eval(&index, OpKind::LCM, &[i(4), i(6)]), Some(i(12)));
        let half = index.mk_numeric(BigRational::new(1.into(), 2.into()));
        assert_eq!(eval(&index, OpKind::GCD, &[half, i(2)]), None);
    }

    #[test]
    fn non_numbers_are_inapplicable() {
        let index = test_utils::sample_index();
        assert_eq!(
            eval(&index, OpKind::Add, &[index.mk_int(1), index.mk_string("1")]),
            None
        );
    }

    #[test]
    fn max_and_min_use_the_term_order() {
        let index = test_utils::sample_index();
        let one = index.mk_int(1);
        let s = index.mk_string("a");
        assert_eq!(eval(&index, OpKind::Max, &[one.clone(), s.clone()]), Some(s.clone()));
        assert_eq!(eval(&index, OpKind::Min, &[one.clone(), s]), Some(one.clone()));
        assert_eq!(
            eval(&index, OpKind::Max, &[one.clone(), index.mk_int(7)]),
            Some(index.mk_int(7))
        );
        assert_eq!(eval(&index, OpKind::Min, &[one.clone(), one.clone()]), Some(one));
    }
}
