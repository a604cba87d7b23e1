use crate::operators::{EvalContext, OpKind, SideConstraint};
use crate::terms::{Term, TermIndex};

/// The constraints under which an application of `kind` to `args` is defined.
pub fn side_constraints(kind: OpKind, _index: &TermIndex, args: &[Term]) -> Vec<SideConstraint> {
    match (kind, args) {
        (OpKind::Div, [_, y]) | (OpKind::Mod, [_, y]) | (OpKind::Qtnt, [_, y]) => {
            vec![SideConstraint::NonZero(y.clone())]
        }
        (OpKind::GCD, [x, y]) | (OpKind::LCM, [x, y]) => vec![
            SideConstraint::IsInteger(x.clone()),
            SideConstraint::IsInteger(y.clone()),
        ],
        (OpKind::StrAfter, [_, n]) | (OpKind::StrBefore, [_, n]) | (OpKind::StrGetAt, [_, n]) => {
            vec![SideConstraint::IsNatural(n.clone())]
        }
        (OpKind::LstGetAt, [_, _, n]) => vec![SideConstraint::IsNatural(n.clone())],
        _ => Vec::new(),
    }
}

/// Builds the uninterpreted application of `kind` and hands it to the encoder with its side constraints.
/// Without an encoder there is nothing to evaluate to.
pub fn evaluate(kind: OpKind, ctx: &mut EvalContext<'_>, args: &[Term]) -> Option<Term> {
    let index = ctx.index;
    let encoder = ctx.encoder.as_mut()?;
    let (app, _) = index.mk_apply(index.op_symbol(kind), args);
    let constraints = side_constraints(kind, index, args);
    encoder.encode(&app, &constraints);
    Some(app)
}
