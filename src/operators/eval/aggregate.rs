use std::cmp::Ordering;

use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::operators::{Bindable, EvalContext, OpKind};
use crate::terms::{Term, TermIndex};
use crate::util::{self, from_usize};

use super::list;
use super::logic::as_bool;

/// The value an answer of a comprehension contributes: its last argument.
pub fn projection(answer: &Term) -> Term {
    answer.args().last().unwrap_or(answer).clone()
}

fn fold_numeric(
    index: &TermIndex,
    values: &[Term],
    default: &Term,
    init: BigRational,
    step: impl Fn(BigRational, &BigRational) -> Option<BigRational>,
) -> Option<Term> {
    let numbers = values.iter().filter_map(Term::as_rational).collect::<Vec<_>>();
    if numbers.is_empty() {
        return Some(default.clone());
    }
    let mut acc = init;
    for n in numbers.into_iter() {
        acc = step(acc, n)?;
    }
    Some(index.mk_numeric(acc))
}

fn fold_bool(index: &TermIndex, values: &[Term], default: &Term, all: bool) -> Option<Term> {
    let bools = values
        .iter()
        .filter_map(|v| as_bool(index, v))
        .collect::<Vec<_>>();
    if bools.is_empty() {
        return Some(default.clone());
    }
    let res = if all {
        bools.iter().all(|b| *b)
    } else {
        bools.iter().any(|b| *b)
    };
    Some(index.mk_bool(res))
}

fn sorted(index: &TermIndex, mut values: Vec<Term>) -> Vec<Term> {
    values.sort_by(|a, b| index.lexicographic_compare(a, b));
    values
}

/// Evaluates the aggregates. The comprehension is the last argument and is answered by the fact store of
/// the context; an empty answer set yields the supplied default. `toList` and `toOrdinal` also take a
/// single value in place of the comprehension.
pub fn evaluate(kind: OpKind, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term> {
    let index = ctx.index;
    let plain = args[..args.len().checked_sub(1)?]
        .iter()
        .map(|a| match a {
            Bindable::Value(t) => Some(t.clone()),
            Bindable::Comprehension(_) => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let (values, count) = match args.last()? {
        Bindable::Comprehension(c) => {
            let (answers, count) = ctx.facts?.query(c);
            (answers.iter().map(projection).collect::<Vec<_>>(), count)
        }
        Bindable::Value(v) if kind == OpKind::ToList || kind == OpKind::ToOrdinal => {
            (vec![v.clone()], 1)
        }
        Bindable::Value(_) => return None,
    };

    match (kind, &plain[..]) {
        (OpKind::Count, []) => Some(index.mk_numeric(from_usize(count))),
        (OpKind::No, []) => Some(index.mk_bool(count == 0)),
        (OpKind::Sum, [default]) => {
            fold_numeric(index, &values, default, BigRational::zero(), |a, n| Some(a + n))
        }
        (OpKind::Prod, [default]) => {
            fold_numeric(index, &values, default, BigRational::one(), |a, n| Some(a * n))
        }
        (OpKind::GCDAll, [default]) => fold_numeric(index, &values, default, BigRational::zero(), |a, n| {
            util::rational_gcd(&a, n)
        }),
        (OpKind::LCMAll, [default]) => fold_numeric(index, &values, default, BigRational::one(), |a, n| {
            util::rational_lcm(&a, n)
        }),
        (OpKind::AndAll, [default]) => fold_bool(index, &values, default, true),
        (OpKind::OrAll, [default]) => fold_bool(index, &values, default, false),
        (OpKind::MaxAll, [default]) | (OpKind::MinAll, [default]) => {
            let wanted = if kind == OpKind::MaxAll {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            let best = values.into_iter().fold(None, |best: Option<Term>, v| match best {
                Some(b) if index.lexicographic_compare(&v, &b) != wanted => Some(b),
                _ => Some(v),
            });
            Some(best.unwrap_or_else(|| default.clone()))
        }
        (OpKind::ToList, [ty, end]) => {
            let cons = list::cons_symbol(index, ty)?;
            Some(list::fold(index, &cons, &sorted(index, values), end.clone()))
        }
        (OpKind::ToOrdinal, [element, default]) => {
            match sorted(index, values).iter().position(|v| v == element) {
                Some(i) => Some(index.mk_numeric(from_usize(i))),
                None => Some(default.clone()),
            }
        }
        _ => None,
    }
}
