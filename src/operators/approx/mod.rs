//! Galois approximations of the built-in operators.
//!
//! The upward approximation maps argument types to a type containing every result; the downward
//! approximation maps an expected result type to argument types that every contributing argument tuple
//! lies in. Union arguments are split into their widened elements, a point approximation is applied to
//! each combination, and the point results are unioned.

use log::debug;

use crate::terms::{Term, TermIndex};

use super::OpKind;

mod aggregate;
mod arith;
mod list;
mod logic;
mod reflect;
mod select;
mod string;

/// Element extraction, enumeration and result accumulation shared by the approximations.
pub mod elements;

fn check_reserved(kind: OpKind) {
    if kind.is_reserved() {
        panic!("reserved operator {} reached type approximation", kind);
    }
}

/// The result type of `kind` over the argument types `args`, as a singleton. `None` if no argument tuple
/// has a result.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Vec<Term>> {
    check_reserved(kind);
    if args.len() != kind.arity() {
        return None;
    }
    let res = if kind.is_aggregate() {
        aggregate::approximate_up(kind, index, args)
    } else {
        match kind {
            OpKind::Add
            | OpKind::Sub
            | OpKind::Mul
            | OpKind::Div
            | OpKind::Mod
            | OpKind::Qtnt
            | OpKind::Neg
            | OpKind::Sign
            | OpKind::Max
            | OpKind::Min
            | OpKind::GCD
            | OpKind::LCM => arith::approximate_up(kind, index, args),
            OpKind::And
            | OpKind::Or
            | OpKind::Impl
            | OpKind::Not
            | OpKind::Eq
            | OpKind::Neq
            | OpKind::Lt
            | OpKind::Le
            | OpKind::Gt
            | OpKind::Ge => logic::approximate_up(kind, index, args),
            OpKind::Sel => select::approximate_up(index, &args[0], &args[1]),
            OpKind::StrAfter
            | OpKind::StrBefore
            | OpKind::StrFind
            | OpKind::StrGetAt
            | OpKind::StrJoin
            | OpKind::StrLength
            | OpKind::StrLower
            | OpKind::StrReplace
            | OpKind::StrReverse
            | OpKind::StrUpper
            | OpKind::IsSubstring
            | OpKind::ToString
            | OpKind::ToNatural => string::approximate_up(kind, index, args),
            OpKind::LstLength
            | OpKind::LstReverse
            | OpKind::LstFind
            | OpKind::LstFindAll
            | OpKind::LstFindAllNot
            | OpKind::LstGetAt => list::approximate_up(kind, index, args),
            OpKind::ToSymbol
            | OpKind::RflIsMember
            | OpKind::RflIsSubtype
            | OpKind::RflGetArgType
            | OpKind::RflGetArity => reflect::approximate_up(kind, index, args),
            _ => unreachable!("no upward approximation for {}", kind),
        }
    };
    match &res {
        Some(t) => debug!("{}{:?} approximated up to {}", kind, args, t),
        None => debug!("{}{:?} has no result", kind, args),
    }
    res.map(|t| vec![t])
}

/// The argument types necessary for `kind` to produce a member of `expected`. `args` are the argument
/// types known so far; only selection reads its label from them.
pub fn approximate_down(
    kind: OpKind,
    index: &TermIndex,
    expected: &Term,
    args: &[Term],
) -> Option<Vec<Term>> {
    check_reserved(kind);
    let res = if kind.is_aggregate() {
        aggregate::approximate_down(kind, index, expected)
    } else {
        match kind {
            OpKind::Add
            | OpKind::Sub
            | OpKind::Mul
            | OpKind::Div
            | OpKind::Mod
            | OpKind::Qtnt
            | OpKind::Neg
            | OpKind::Sign
            | OpKind::Max
            | OpKind::Min
            | OpKind::GCD
            | OpKind::LCM => arith::approximate_down(kind, index, expected),
            OpKind::And
            | OpKind::Or
            | OpKind::Impl
            | OpKind::Not
            | OpKind::Eq
            | OpKind::Neq
            | OpKind::Lt
            | OpKind::Le
            | OpKind::Gt
            | OpKind::Ge => logic::approximate_down(kind, index, expected),
            OpKind::Sel => select::approximate_down(index, expected, args),
            OpKind::StrAfter
            | OpKind::StrBefore
            | OpKind::StrFind
            | OpKind::StrGetAt
            | OpKind::StrJoin
            | OpKind::StrLength
            | OpKind::StrLower
            | OpKind::StrReplace
            | OpKind::StrReverse
            | OpKind::StrUpper
            | OpKind::IsSubstring
            | OpKind::ToString
            | OpKind::ToNatural => string::approximate_down(kind, index, expected),
            OpKind::LstLength
            | OpKind::LstReverse
            | OpKind::LstFind
            | OpKind::LstFindAll
            | OpKind::LstFindAllNot
            | OpKind::LstGetAt => list::approximate_down(kind, index, expected),
            OpKind::ToSymbol
            | OpKind::RflIsMember
            | OpKind::RflIsSubtype
            | OpKind::RflGetArgType
            | OpKind::RflGetArity => reflect::approximate_down(kind, index, expected),
            _ => unreachable!("no downward approximation for {}", kind),
        }
    };
    debug_assert!(res.as_ref().map_or(true, |r| r.len() == kind.arity()));
    debug!("{} approximated down from {} to {:?}", kind, expected, res);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use crate::symbols::BaseSortKind;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_scenarios() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        let pos = index.mk_sort(BaseSortKind::PosInteger);
        assert_eq!(
            OpKind::Add.approximate_up(&index, &[nat.clone(), nat.clone()]),
            Some(vec![nat.clone()])
        );
        assert_eq!(
            OpKind::Add.approximate_up(&index, &[pos.clone(), nat]),
            Some(vec![pos])
        );
        assert_eq!(
            OpKind::Add.approximate_up(&index, &[index.mk_int(3), index.mk_int(5)]),
            Some(vec![index.mk_int(8)])
        );
    }

    #[test]
    fn arity_mismatches_have_no_result() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        assert_eq!(OpKind::Add.approximate_up(&index, &[nat]), None);
    }

    #[test]
    fn every_operator_approximates_down_to_its_arity() {
        let index = test_utils::sample_index();
        let any = index.canonical_any_type().clone();
        let args = vec![any.clone(), index.mk_string("x"), any.clone(), any.clone()];
        for kind in OpKind::ALL.iter().filter(|k| !k.is_reserved()) {
            if let Some(res) = kind.approximate_down(&index, &any, &args[..kind.arity()]) {
                assert_eq!(res.len(), kind.arity(), "{}", kind);
            }
        }
    }

    #[test]
    #[should_panic]
    fn reserved_operators_panic() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        OpKind::TypeUnn.approximate_up(&index, &[nat.clone(), nat]);
    }
}
