use num_bigint::BigInt;
use num_traits::Signed;

use crate::operators::OpKind;
use crate::terms::{Term, TermIndex};
use crate::util::{self, as_index, from_usize};

/// The suffix starting at character `n`.
pub fn str_after(s: &str, n: usize) -> String {
    s.chars().skip(n).collect()
}

/// The first `n` characters.
pub fn str_before(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// The character position of the first occurrence of `t` in `s`.
pub fn str_find(s: &str, t: &str) -> Option<usize> {
    s.find(t).map(|b| s[..b].chars().count())
}

/// The character at position `i`.
pub fn str_get_at(s: &str, i: usize) -> Option<String> {
    s.chars().nth(i).map(String::from)
}

/// Reverses by characters.
pub fn str_reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// The natural a term converts to: naturals themselves, decimal strings parsed.
pub fn to_natural(t: &Term) -> Option<BigInt> {
    if let Some(r) = t.as_rational() {
        return util::as_integer(r).filter(|i| !i.is_negative());
    }
    util::parse_natural(t.as_str()?)
}

/// The printed form of a term, strings unquoted.
pub fn to_string(t: &Term) -> String {
    match t.as_str() {
        Some(s) => s.to_owned(),
        None => t.to_string(),
    }
}

/// Evaluates the string operators and the conversions to strings and naturals.
pub fn evaluate(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let string = |s: String| Some(index.mk_string(&s));
    match (kind, args) {
        (OpKind::ToString, [t]) => string(to_string(t)),
        (OpKind::ToNatural, [t]) => Some(index.mk_int(to_natural(t)?)),
        (OpKind::StrLength, [s]) => Some(index.mk_numeric(from_usize(s.as_str()?.chars().count()))),
        (OpKind::StrLower, [s]) => string(s.as_str()?.to_lowercase()),
        (OpKind::StrUpper, [s]) => string(s.as_str()?.to_uppercase()),
        (OpKind::StrReverse, [s]) => string(str_reverse(s.as_str()?)),
        (OpKind::StrAfter, [s, n]) => string(str_after(s.as_str()?, as_index(n.as_rational()?)?)),
        (OpKind::StrBefore, [s, n]) => string(str_before(s.as_str()?, as_index(n.as_rational()?)?)),
        (OpKind::StrGetAt, [s, i]) => string(str_get_at(s.as_str()?, as_index(i.as_rational()?)?)?),
        (OpKind::StrJoin, [a, b]) => string(format!("{}{}", a.as_str()?, b.as_str()?)),
        (OpKind::IsSubstring, [a, b]) => Some(index.mk_bool(b.as_str()?.contains(a.as_str()?))),
        (OpKind::StrFind, [s, t, default]) => {
            match str_find(s.as_str()?, t.as_str()?) {
                Some(pos) => Some(index.mk_numeric(from_usize(pos))),
                None => Some(default.clone()),
            }
        }
        (OpKind::StrReplace, [s, old, new]) => {
            string(s.as_str()?.replacen(old.as_str()?, new.as_str()?, 1))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{Bindable, EvalContext, Operator};
    use crate::test_utils;
    use num_rational::BigRational;
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
    fn join_identity() {
        let index = test_utils::sample_index();
        let s = |v: &str| index.mk_string(v);
        assert_eq!(eval(&index, OpKind::StrJoin, &[s(""), s("abc")]), Some(s("abc")));
        assert_eq!(eval(&index, OpKind::StrJoin, &[s("abc"), s("")]), Some(s("abc")));
        assert_eq!(eval(&index, OpKind::StrJoin, &[s("ab"), s("cd")]), Some(s("abcd")));
        assert_eq!(eval(&index, OpKind::StrJoin, &[s("ab"), index.mk_int(1)]), None);
    }

    #[test]
    fn positions_count_characters() {
        let index = test_utils::sample_index();
        let s = |v: &str| index.mk_string(v);
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::StrLength, &[s("héllo")]), Some(i(5)));
        assert_eq!(eval(&index, OpKind::StrAfter, &[s("héllo"), i(2)]), Some(s("llo")));
        assert_eq!(eval(&index, OpKind::StrAfter, &[s("abc"), i(9)]), Some(s("")));
        assert_eq!(eval(&index, OpKind::StrBefore, &[s("héllo"), i(2)]), Some(s("hé")));
        assert_eq!(eval(&index, OpKind::StrGetAt, &[s("héllo"), i(1)]), Some(s("é")));
        assert_eq!(eval(&index, OpKind::StrGetAt, &[s("abc"), i(3)]), None);
        assert_eq!(eval(&index, OpKind::StrGetAt, &[s("abc"), i(-1)]), None);
        assert_eq!(
            eval(&index, OpKind::StrFind, &[s("héllo"), s("l"), i(-1)]),
            Some(i(2))
        );
        assert_eq!(
            eval(&index, OpKind::StrFind, &[s("abc"), s("z"), i(-1)]),
            Some(i(-1))
        );
    }

    #[test]
    fn case_and_replacement() {
        let index = test_utils::sample_index();
        let s = |v: &str| index.mk_string(v);
        assert_eq!(eval(&index, OpKind::StrUpper, &[s("aB")]), Some(s("AB")));
        assert_eq!(eval(&index, OpKind::StrLower, &[s("aB")]), Some(s("ab")));
        assert_eq!(eval(&index, OpKind::StrReverse, &[s("abc")]), Some(s("cba")));
        assert_eq!(
            eval(&index, OpKind::StrReplace, &[s("abab"), s("b"), s("x")]),
            Some(s("axab"))
        );
        assert_eq!(
            eval(&index, OpKind::IsSubstring, &[s("ba"), s("abab")]),
            Some(index.true_value().clone())
        );
    }

    #[test]
    fn conversions() {
        let index = test_utils::sample_index();
        let s = |v: &str| index.mk_string(v);
        let i = |v: i64| index.mk_int(v);
        assert_eq!(eval(&index, OpKind::ToString, &[i(-3)]), Some(s("-3")));
        assert_eq!(
            eval(
                &index,
                OpKind::ToString,
                &[index.mk_numeric(BigRational::new((-1).into(), 2.into()))]
            ),
            Some(s("-1/2"))
        );
        assert_eq!(eval(&index, OpKind::ToString, &[s("x")]), Some(s("x")));
        assert_eq!(eval(&index, OpKind::ToNatural, &[s("0042")]), Some(i(42)));
        assert_eq!(eval(&index, OpKind::ToNatural, &[i(-2)]), None);
        assert_eq!(eval(&index, OpKind::ToNatural, &[s("x1")]), None);
    }
}
