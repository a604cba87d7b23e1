use itertools::iproduct;

use crate::operators::eval::string::{str_after, str_before, str_find, str_get_at, str_reverse};
use crate::operators::OpKind;
use crate::symbols::BaseSortKind;
use crate::terms::type_set::{NumElement, StrElement, TypeSet, NUM_WIDENING_WIDTH};
use crate::terms::{Term, TermIndex};
use crate::util::{as_index, from_usize};

use super::elements::{enumerate_up, numeric_elements, string_elements, Collector};

fn prefixes(s: &str) -> Vec<String> {
    let n = s.chars().count();
    (0..=n).map(|i| str_before(s, i)).collect()
}

fn suffixes(s: &str) -> Vec<String> {
    let n = s.chars().count();
    (0..=n).map(|i| str_after(s, i)).collect()
}

/// Adds `values` if there are few enough of them, else every string.
fn add_bounded(res: &mut Collector<'_>, values: Vec<String>) {
    if values.len() >= NUM_WIDENING_WIDTH {
        res.add_sort(BaseSortKind::String);
    } else {
        for v in values.into_iter() {
            res.add_string(&StrElement::Value(v));
        }
    }
}

/// Applies a positional operator to a string element and an index element.
fn point_positional(res: &mut Collector<'_>, kind: OpKind, s: &StrElement, n: &NumElement) {
    let value = match s {
        StrElement::Value(v) => v,
        StrElement::Sort => return res.add_sort(BaseSortKind::String),
    };
    let at = |i: usize| match kind {
        OpKind::StrAfter => Some(str_after(value, i)),
        OpKind::StrBefore => Some(str_before(value, i)),
        _ => str_get_at(value, i),
    };
    match n {
        NumElement::Value(i) => {
            if let Some(r) = as_index(i).and_then(at) {
                res.add_string(&StrElement::Value(r));
            }
        }
        NumElement::Sort(BaseSortKind::NegInteger) | NumElement::Sort(BaseSortKind::String) => (),
        NumElement::Sort(k) => {
            let len = value.chars().count();
            let first = if *k == BaseSortKind::PosInteger { 1 } else { 0 };
            // past the end, `strAfter` is empty and `strBefore` is the whole string
            let values = if kind == OpKind::StrGetAt {
                (first..len).filter_map(at).collect::<Vec<_>>()
            } else {
                (first..=first.max(len)).filter_map(at).collect::<Vec<_>>()
            };
            add_bounded(res, values);
        }
    }
}

fn point_join(res: &mut Collector<'_>, a: &StrElement, b: &StrElement) {
    match (a, b) {
        (StrElement::Value(x), StrElement::Value(y)) => {
            res.add_string(&StrElement::Value(format!("{}{}", x, y)))
        }
        _ => res.add_sort(BaseSortKind::String),
    }
}

fn mapped(res: &mut Collector<'_>, s: &StrElement, f: impl Fn(&str) -> String) {
    match s {
        StrElement::Value(v) => res.add_string(&StrElement::Value(f(v))),
        StrElement::Sort => res.add_sort(BaseSortKind::String),
    }
}

/// Upward approximation of the string operators and conversions.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let mut res = Collector::new(index);
    match (kind, args) {
        (OpKind::StrJoin, [a, b]) => {
            let (xs, ys) = (string_elements(index, a), string_elements(index, b));
            for (x, y) in iproduct!(xs.iter(), ys.iter()) {
                point_join(&mut res, x, y);
            }
        }
        (OpKind::StrAfter, [s, n]) | (OpKind::StrBefore, [s, n]) | (OpKind::StrGetAt, [s, n]) => {
            let (xs, ns) = (string_elements(index, s), numeric_elements(index, n));
            for (x, i) in iproduct!(xs.iter(), ns.iter()) {
                point_positional(&mut res, kind, x, i);
            }
        }
        (OpKind::StrLength, [s]) => {
            for x in string_elements(index, s).iter() {
                match x {
                    StrElement::Value(v) => {
                        res.add_element(&NumElement::Value(from_usize(v.chars().count())))
                    }
                    StrElement::Sort => res.add_sort(BaseSortKind::Natural),
                }
            }
        }
        (OpKind::StrLower, [s]) => {
            for x in string_elements(index, s).iter() {
                mapped(&mut res, x, str::to_lowercase);
            }
        }
        (OpKind::StrUpper, [s]) => {
            for x in string_elements(index, s).iter() {
                mapped(&mut res, x, str::to_uppercase);
            }
        }
        (OpKind::StrReverse, [s]) => {
            for x in string_elements(index, s).iter() {
                mapped(&mut res, x, str_reverse);
            }
        }
        (OpKind::StrFind, [s, t, default]) => {
            let (xs, ys) = (string_elements(index, s), string_elements(index, t));
            for (x, y) in iproduct!(xs.iter(), ys.iter()) {
                match (x, y) {
                    (StrElement::Value(x), StrElement::Value(y)) => match str_find(x, y) {
                        Some(i) => res.add_element(&NumElement::Value(from_usize(i))),
                        None => res.add_type(default),
                    },
                    _ => {
                        res.add_sort(BaseSortKind::Natural);
                        res.add_type(default);
                    }
                }
            }
        }
        (OpKind::StrReplace, [s, old, new]) => {
            let xs = string_elements(index, s);
            let olds = string_elements(index, old);
            let news = string_elements(index, new);
            for (x, o, n) in iproduct!(xs.iter(), olds.iter(), news.iter()) {
                match (x, o, n) {
                    (StrElement::Value(x), StrElement::Value(o), StrElement::Value(n)) => {
                        res.add_string(&StrElement::Value(x.replacen(o.as_str(), n, 1)))
                    }
                    _ => res.add_sort(BaseSortKind::String),
                }
            }
        }
        (OpKind::IsSubstring, [a, b]) => {
            let (xs, ys) = (string_elements(index, a), string_elements(index, b));
            for (x, y) in iproduct!(xs.iter(), ys.iter()) {
                match (x, y) {
                    (StrElement::Value(x), StrElement::Value(y)) => {
                        res.add_type(&index.mk_bool(y.contains(x.as_str())))
                    }
                    _ => res.add_type(index.canonical_boolean_type()),
                }
            }
        }
        (OpKind::ToString, [_]) => {
            return enumerate_up(kind, index, args, Some(index.mk_sort(BaseSortKind::String)));
        }
        (OpKind::ToNatural, [t]) => {
            let set = index.type_set(t);
            let naturals = index.intersect_sets(&set, &TypeSet::of_sort(BaseSortKind::Natural));
            if naturals.is_empty() && !set.has_string() {
                return None;
            }
            return enumerate_up(kind, index, args, Some(index.mk_sort(BaseSortKind::Natural)));
        }
        _ => return None,
    }
    res.finish()
}

/// Downward approximation of the string operators and conversions.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    let expected_set = index.type_set(expected);
    let string = index.mk_sort(BaseSortKind::String);
    let natural = index.mk_sort(BaseSortKind::Natural);
    let meets = |sort: BaseSortKind| {
        !index
            .intersect_sets(&expected_set, &TypeSet::of_sort(sort))
            .is_empty()
    };

    match kind {
        OpKind::StrJoin => {
            let elements = string_elements(index, expected);
            if elements.is_empty() {
                return None;
            }
            let mut heads = Collector::new(index);
            let mut tails = Collector::new(index);
            for e in elements.iter() {
                match e {
                    StrElement::Value(v) => {
                        add_bounded(&mut heads, prefixes(v));
                        add_bounded(&mut tails, suffixes(v));
                    }
                    StrElement::Sort => return Some(vec![string.clone(), string]),
                }
            }
            Some(vec![heads.finish()?, tails.finish()?])
        }
        OpKind::StrReverse => {
            let mut res = Collector::new(index);
            for e in string_elements(index, expected).iter() {
                mapped(&mut res, e, str_reverse);
            }
            Some(vec![res.finish()?])
        }
        OpKind::StrAfter | OpKind::StrBefore | OpKind::StrGetAt if expected_set.has_string() => {
            Some(vec![string, natural])
        }
        OpKind::StrLower | OpKind::StrUpper if expected_set.has_string() => Some(vec![string]),
        OpKind::StrReplace if expected_set.has_string() => {
            Some(vec![string.clone(), string.clone(), string])
        }
        OpKind::StrLength if meets(BaseSortKind::Natural) => Some(vec![string]),
        OpKind::StrFind => Some(vec![
            string.clone(),
            string,
            index.canonical_any_type().clone(),
        ]),
        OpKind::IsSubstring => {
            let boolean = index.canonical_boolean_type();
            index.mk_intersection(expected, boolean)?;
            Some(vec![string.clone(), string])
        }
        OpKind::ToString if expected_set.has_string() => {
            Some(vec![index.canonical_any_type().clone()])
        }
        OpKind::ToNatural if meets(BaseSortKind::Natural) => {
            let mut arg = TypeSet::of_sort(BaseSortKind::Natural);
            arg.add_sort(BaseSortKind::String);
            Some(vec![index.mk_type(&arg)?])
        }
        _ => None,
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

    fn strings(index: &TermIndex, values: &[&str]) -> Term {
        let mut set = TypeSet::new();
        for v in values.iter() {
            set.add_string(v);
        }
        index.mk_type(&set).unwrap()
    }

    #[test]
    fn joins_of_finite_strings_are_exact() {
        let index = test_utils::sample_index();
        let a = strings(&index, &["a", "b"]);
        let c = index.mk_string("c");
        assert_eq!(up(&index, OpKind::StrJoin, &[a.clone(), c]), Some("\"ac\" + \"bc\"".into()));
        assert_eq!(
            up(&index, OpKind::StrJoin, &[a, index.mk_sort(BaseSortKind::String)]),
            Some("String".into())
        );
        assert_eq!(
            up(&index, OpKind::StrJoin, &[index.mk_int(1), index.mk_string("x")]),
            None
        );
    }

    #[test]
    fn positions_over_sorts() {
        let index = test_utils::sample_index();
        let abc = index.mk_string("abc");
        let nat = index.mk_sort(BaseSortKind::Natural);
        assert_eq!(
            up(&index, OpKind::StrGetAt, &[abc.clone(), nat.clone()]),
            Some("\"a\" + \"b\" + \"c\"".into())
        );
        assert_eq!(
            up(&index, OpKind::StrBefore, &[abc.clone(), index.mk_sort(BaseSortKind::PosInteger)]),
            Some("\"a\" + \"ab\" + \"abc\"".into())
        );
        assert_eq!(
            up(&index, OpKind::StrAfter, &[abc.clone(), index.mk_sort(BaseSortKind::NegInteger)]),
            None
        );
        assert_eq!(up(&index, OpKind::StrLength, &[abc]), Some("3".into()));

        let empty = index.mk_string("");
        let pos = index.mk_sort(BaseSortKind::PosInteger);
        assert_eq!(
            up(&index, OpKind::StrAfter, &[empty.clone(), pos.clone()]),
            Some("\"\"".into())
        );
        assert_eq!(
            up(&index, OpKind::StrBefore, &[empty.clone(), pos.clone()]),
            Some("\"\"".into())
        );
        assert_eq!(up(&index, OpKind::StrGetAt, &[empty, pos]), None);
        assert_eq!(
            up(&index, OpKind::StrLength, &[index.mk_sort(BaseSortKind::String)]),
            Some("Natural".into())
        );
    }

    #[test]
    fn find_includes_the_default() {
        let index = test_utils::sample_index();
        let res = up(
            &index,
            OpKind::StrFind,
            &[index.mk_string("abc"), strings(&index, &["c", "z"]), index.mk_int(-1)],
        );
        assert_eq!(res, Some("-1 + 2".into()));
    }

    #[test]
    fn join_downward_splits_expected_strings() {
        let index = test_utils::sample_index();
        let down = approximate_down(OpKind::StrJoin, &index, &index.mk_string("ab")).unwrap();
        assert_eq!(down[0], strings(&index, &["", "a", "ab"]));
        assert_eq!(down[1], strings(&index, &["", "b", "ab"]));
        assert_eq!(approximate_down(OpKind::StrJoin, &index, &index.mk_int(3)), None);
        assert_eq!(
            approximate_down(OpKind::StrLength, &index, &index.mk_int(-3)),
            None
        );
    }
}
