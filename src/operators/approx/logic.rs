use itertools::iproduct;

use crate::operators::eval::logic::apply_connective;
use crate::operators::OpKind;
use crate::terms::{Term, TermIndex};

/// The truth values a type admits, as `(true, false)`.
fn truths(index: &TermIndex, t: &Term) -> (bool, bool) {
    (
        index.is_member(index.true_value(), t),
        index.is_member(index.false_value(), t),
    )
}

fn values_of(index: &TermIndex, t: &Term) -> Vec<bool> {
    let (can_true, can_false) = truths(index, t);
    let mut res = Vec::new();
    if can_true {
        res.push(true);
    }
    if can_false {
        res.push(false);
    }
    res
}

/// The boolean type holding exactly the given truth values.
fn bool_type(index: &TermIndex, can_true: bool, can_false: bool) -> Option<Term> {
    match (can_true, can_false) {
        (true, true) => Some(index.canonical_boolean_type().clone()),
        (true, false) => Some(index.true_value().clone()),
        (false, true) => Some(index.false_value().clone()),
        (false, false) => None,
    }
}

fn decided(index: &TermIndex, res: Option<bool>) -> Option<Term> {
    match res {
        Some(b) => Some(index.mk_bool(b)),
        None => Some(index.canonical_boolean_type().clone()),
    }
}

/// `Some(true)` if `a < b` for all members, `Some(false)` if for none.
fn less_than(index: &TermIndex, a: &Term, b: &Term) -> Option<bool> {
    index.lexicographic_min_max_compare(a, b)
}

/// Upward approximation of the connectives and relations.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    match (kind, args) {
        (OpKind::Not, [a]) => {
            let (can_true, can_false) = truths(index, a);
            bool_type(index, can_false, can_true)
        }
        (OpKind::And, [a, b]) | (OpKind::Or, [a, b]) | (OpKind::Impl, [a, b]) => {
            let (mut can_true, mut can_false) = (false, false);
            for (x, y) in iproduct!(values_of(index, a), values_of(index, b)) {
                match apply_connective(kind, x, y) {
                    Some(true) => can_true = true,
                    Some(false) => can_false = true,
                    None => (),
                }
            }
            bool_type(index, can_true, can_false)
        }
        (OpKind::Eq, [a, b]) | (OpKind::Neq, [a, b]) => {
            let equal = if a.is_ground() && b.is_ground() {
                Some(a == b)
            } else if index.mk_intersection(a, b).is_none() {
                Some(false)
            } else {
                None
            };
            decided(index, equal.map(|e| e == (kind == OpKind::Eq)))
        }
        (OpKind::Lt, [a, b]) => decided(index, less_than(index, a, b)),
        (OpKind::Gt, [a, b]) => decided(index, less_than(index, b, a)),
        (OpKind::Le, [a, b]) => decided(index, less_than(index, b, a).map(|r| !r)),
        (OpKind::Ge, [a, b]) => decided(index, less_than(index, a, b).map(|r| !r)),
        _ => None,
    }
}

/// Downward approximation of the connectives and relations.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    let (can_true, can_false) = truths(index, expected);
    if !can_true && !can_false {
        return None;
    }
    let boolean = index.canonical_boolean_type().clone();
    let t = index.true_value().clone();
    let f = index.false_value().clone();
    match kind {
        OpKind::Not => Some(vec![bool_type(index, can_false, can_true)?]),
        OpKind::And if !can_false => Some(vec![t.clone(), t]),
        OpKind::Or if !can_true => Some(vec![f.clone(), f]),
        OpKind::Impl if !can_true => Some(vec![t, f]),
        OpKind::And | OpKind::Or | OpKind::Impl => Some(vec![boolean.clone(), boolean]),
        _ => {
            let any = index.canonical_any_type().clone();
            Some(vec![any.clone(), any])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::BaseSortKind;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn truth_tables() {
        let index = test_utils::sample_index();
        let t = index.true_value().clone();
        let f = index.false_value().clone();
        let b = index.canonical_boolean_type().clone();
        assert_eq!(approximate_up(OpKind::And, &index, &[t.clone(), b.clone()]), Some(b.clone()));
        assert_eq!(approximate_up(OpKind::And, &index, &[f.clone(), b.clone()]), Some(f.clone()));
        assert_eq!(approximate_up(OpKind::Or, &index, &[t.clone(), b.clone()]), Some(t.clone()));
        assert_eq!(approximate_up(OpKind::Impl, &index, &[f.clone(), b.clone()]), Some(t.clone()));
        assert_eq!(approximate_up(OpKind::Not, &index, &[t.clone()]), Some(f.clone()));
        assert_eq!(
            approximate_up(OpKind::Not, &index, &[index.mk_int(1)]),
            None
        );

        assert_eq!(
            approximate_down(OpKind::And, &index, &t),
            Some(vec![t.clone(), t.clone()])
        );
        assert_eq!(
            approximate_down(OpKind::Impl, &index, &f),
            Some(vec![t, f])
        );
        assert_eq!(approximate_down(OpKind::Or, &index, &index.mk_int(0)), None);
    }

    #[test]
    fn comparisons_use_extremes() {
        let index = test_utils::sample_index();
        let t = Some(index.true_value().clone());
        let f = Some(index.false_value().clone());
        let b = Some(index.canonical_boolean_type().clone());
        let low = index.mk_range(0.into(), 4.into());
        let high = index.mk_range(5.into(), 9.into());
        assert_eq!(approximate_up(OpKind::Lt, &index, &[low.clone(), high.clone()]), t);
        assert_eq!(approximate_up(OpKind::Ge, &index, &[low.clone(), high.clone()]), f);
        assert_eq!(approximate_up(OpKind::Gt, &index, &[high.clone(), low.clone()]), t);
        assert_eq!(approximate_up(OpKind::Le, &index, &[high.clone(), low.clone()]), f);
        assert_eq!(approximate_up(OpKind::Lt, &index, &[low.clone(), low.clone()]), b);

        // numbers are below strings
        let s = index.mk_sort(BaseSortKind::String);
        assert_eq!(approximate_up(OpKind::Lt, &index, &[low, s]), t);
    }

    #[test]
    fn equality_by_intersection() {
        let index = test_utils::sample_index();
        let t = Some(index.true_value().clone());
        let f = Some(index.false_value().clone());
        let b = Some(index.canonical_boolean_type().clone());
        let one = index.mk_int(1);
        let nat = index.mk_sort(BaseSortKind::Natural);
        let neg = index.mk_sort(BaseSortKind::NegInteger);
        assert_eq!(approximate_up(OpKind::Eq, &index, &[one.clone(), one.clone()]), t);
        assert_eq!(approximate_up(OpKind::Neq, &index, &[one.clone(), index.mk_int(2)]), t);
        assert_eq!(approximate_up(OpKind::Eq, &index, &[nat.clone(), neg]), f);
        assert_eq!(approximate_up(OpKind::Eq, &index, &[nat, one]), b);

        let any = index.canonical_any_type().clone();
        assert_eq!(
            approximate_down(OpKind::Eq, &index, index.true_value()),
            Some(vec![any.clone(), any])
        );
    }
}
