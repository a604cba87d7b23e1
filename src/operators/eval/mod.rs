//! Ground evaluators. Each returns `None` when the operator does not apply to its bound arguments, which
//! the rule engine treats as "no result".

use crate::terms::Term;

use super::{Bindable, EvalContext, OpKind};

/// Comprehension folds.
pub mod aggregate;
/// Numeric operators.
pub mod arith;
/// Cons list operators.
pub mod list;
/// Boolean operators and relations.
pub mod logic;
/// Reflection over type constants.
pub mod reflect;
/// String operators and conversions.
pub mod string;
/// The symbolic path and application constraints.
pub mod symbolic;

fn bound_values(args: &[Bindable]) -> Option<Vec<Term>> {
    args.iter()
        .map(|a| match a {
            Bindable::Value(t) => Some(t.clone()),
            Bindable::Comprehension(_) => None,
        })
        .collect()
}

/// Evaluates a built-in operator. Reserved operators must never get here.
pub fn evaluate(kind: OpKind, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term> {
    if kind.is_reserved() {
        panic!("reserved operator {} reached evaluation", kind);
    }
    if args.len() != kind.arity() {
        return None;
    }
    if kind.is_aggregate() {
        return aggregate::evaluate(kind, ctx, args);
    }

    let values = bound_values(args)?;
    if values.iter().any(Term::is_symbolic_term) {
        return if kind.has_symbolic_path() {
            symbolic::evaluate(kind, ctx, &values)
        } else {
            None
        };
    }

    let index = ctx.index;
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
        | OpKind::LCM => arith::evaluate(kind, index, &values),
        OpKind::And
        | OpKind::Or
        | OpKind::Impl
        | OpKind::Not
        | OpKind::Eq
        | OpKind::Neq
        | OpKind::Lt
        | OpKind::Le
        | OpKind::Gt
        | OpKind::Ge => logic::evaluate(kind, index, &values),
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
        | OpKind::ToNatural => string::evaluate(kind, index, &values),
        OpKind::LstLength
        | OpKind::LstReverse
        | OpKind::LstFind
        | OpKind::LstFindAll
        | OpKind::LstFindAllNot
        | OpKind::LstGetAt => list::evaluate(kind, index, &values),
        OpKind::Sel
        | OpKind::ToSymbol
        | OpKind::RflIsMember
        | OpKind::RflIsSubtype
        | OpKind::RflGetArgType
        | OpKind::RflGetArity => reflect::evaluate(kind, index, &values),
        OpKind::Count
        | OpKind::No
        | OpKind::Sum
        | OpKind::Prod
        | OpKind::AndAll
        | OpKind::OrAll
        | OpKind::MaxAll
        | OpKind::MinAll
        | OpKind::GCDAll
        | OpKind::LCMAll
        | OpKind::ToList
        | OpKind::ToOrdinal
        | OpKind::TypeUnn
        | OpKind::Range
        | OpKind::Relabel
        | OpKind::Find
        | OpKind::Compr => unreachable!("{} is dispatched before the table", kind),
    }
}
