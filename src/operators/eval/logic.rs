use std::cmp::Ordering;

use crate::operators::OpKind;
use crate::terms::{Term, TermIndex};

/// The truth value of `TRUE` and `FALSE`.
pub fn as_bool(index: &TermIndex, t: &Term) -> Option<bool> {
    if t == index.true_value() {
        Some(true)
    } else if t == index.false_value() {
        Some(false)
    } else {
        None
    }
}

/// Applies a binary boolean connective.
pub fn apply_connective(kind: OpKind, a: bool, b: bool) -> Option<bool> {
    match kind {
        OpKind::And => Some(a && b),
        OpKind::Or => Some(a || b),
        OpKind::Impl => Some(!a || b),
        _ => None,
    }
}

/// Decides a comparison from the order of its operands.
pub fn holds(kind: OpKind, order: Ordering) -> Option<bool> {
    match kind {
        OpKind::Eq => Some(order == Ordering::Equal),
        OpKind::Neq => Some(order != Ordering::Equal),
        OpKind::Lt => Some(order == Ordering::Less),
        OpKind::Le => Some(order != Ordering::Greater),
        OpKind::Gt => Some(order == Ordering::Greater),
        OpKind::Ge => Some(order != Ordering::Less),
        _ => None,
    }
}

/// Evaluates the boolean connectives and the relations. Relations hold between arbitrary terms and use
/// the term order.
pub fn evaluate(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let res = match (kind, args) {
        (OpKind::Not, [a]) => !as_bool(index, a)?,
        (OpKind::And, [a, b]) | (OpKind::Or, [a, b]) | (OpKind::Impl, [a, b]) => {
            apply_connective(kind, as_bool(index, a)?, as_bool(index, b)?)?
        }
        (OpKind::Eq, [a, b]) => a == b,
        (OpKind::Neq, [a, b]) => a != b,
        (_, [a, b]) => holds(kind, index.lexicographic_compare(a, b))?,
        _ => return None,
    };
    Some(index.mk_bool(res))
}
