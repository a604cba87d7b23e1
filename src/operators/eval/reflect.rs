use crate::operators::OpKind;
use crate::terms::{Term, TermIndex};
use crate::util::{as_index, from_usize};

/// The argument of a constructor or map application labeled `label`.
pub fn select(target: &Term, label: &str) -> Option<Term> {
    let i = target.symbol().data_decl()?.label_index(label)?;
    target.args().get(i).cloned()
}

/// The type constant of the head of a data term. Other terms are their own symbol.
pub fn to_symbol(index: &TermIndex, t: &Term) -> Option<Term> {
    if t.is_type() {
        return None;
    }
    if t.args().is_empty() {
        return Some(t.clone());
    }
    t.symbol().data_decl()?;
    index.mk_type_cnst(t.symbol(), None)
}

/// Evaluates selection, `ToSymbol` and the reflection operators.
pub fn evaluate(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    match (kind, args) {
        (OpKind::Sel, [target, label]) => select(target, label.as_str()?),
        (OpKind::ToSymbol, [t]) => to_symbol(index, t),
        (OpKind::RflIsMember, [value, ty]) => {
            let ty = index.type_of_type_cnst(ty)?;
            Some(index.mk_bool(index.is_member(value, &ty)))
        }
        (OpKind::RflIsSubtype, [a, b]) => {
            let a = index.type_of_type_cnst(a)?;
            let b = index.type_of_type_cnst(b)?;
            Some(index.mk_bool(index.is_subset(&a, &b)))
        }
        (OpKind::RflGetArgType, [ty, i]) => match index.decode_type_cnst(ty)? {
            (symbol, None) => {
                let i = as_index(i.as_rational()?)?;
                if symbol.data_decl().is_none() || i >= symbol.arity() {
                    return None;
                }
                index.mk_type_cnst(&symbol, Some(i))
            }
            _ => None,
        },
        (OpKind::RflGetArity, [ty]) => {
            let arity = match index.decode_type_cnst(ty)? {
                (symbol, None) if symbol.data_decl().is_some() => symbol.arity(),
                _ => 0,
            };
            Some(index.mk_numeric(from_usize(arity)))
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
    fn argument_types_round_trip() {
        let index = test_utils::sample_index();
        let triple = test_utils::type_cnst(&index, "Geo.Triple");
        let symbol = index.symbols().resolve("Geo.Triple").unwrap();
        for k in 0..3 {
            let arg = eval(&index, OpKind::RflGetArgType, &[triple.clone(), index.mk_int(k)])
                .unwrap();
            assert_eq!(arg.to_string(), format!("Geo.#Triple[{}]", k));
            assert_eq!(
                index.decode_type_cnst(&arg),
                Some((symbol.clone(), Some(k as usize)))
            );
        }
        assert_eq!(
            eval(&index, OpKind::RflGetArgType, &[triple.clone(), index.mk_int(3)]),
            None
        );
        assert_eq!(
            eval(&index, OpKind::RflGetArgType, &[triple.clone(), index.mk_int(-1)]),
            None
        );
        assert_eq!(
            eval(&index, OpKind::RflGetArity, &[triple]),
            Some(index.mk_int(3))
        );
        assert_eq!(
            eval(&index, OpKind::RflGetArity, &[test_utils::type_cnst(&index, "Color")]),
            Some(index.mk_int(0))
        );
    }

    #[test]
    fn membership_and_subtypes() {
        let index = test_utils::sample_index();
        let color = test_utils::type_cnst(&index, "Color");
        let red = test_utils::constant(&index, "RED");
        let t = Some(index.true_value().clone());
        let f = Some(index.false_value().clone());
        assert_eq!(eval(&index, OpKind::RflIsMember, &[red, color.clone()]), t);
        assert_eq!(
            eval(&index, OpKind::RflIsMember, &[index.mk_int(1), color]),
            f
        );

        let point = test_utils::apply(&index, "Geo.Point", &[index.mk_int(1), index.mk_int(2)]);
        assert_eq!(
            eval(
                &index,
                OpKind::RflIsMember,
                &[point, test_utils::type_cnst(&index, "Geo.Point")]
            ),
            t
        );

        let pos = test_utils::type_cnst(&index, "PosInteger");
        let nat = test_utils::type_cnst(&index, "Natural");
        assert_eq!(eval(&index, OpKind::RflIsSubtype, &[pos.clone(), nat.clone()]), t);
        assert_eq!(eval(&index, OpKind::RflIsSubtype, &[nat, pos]), f);
    }

    #[test]
    fn selection_and_symbols() {
        let index = test_utils::sample_index();
        let p = test_utils::apply(&index, "Geo.Point", &[index.mk_int(1), index.mk_int(2)]);
        let q = test_utils::apply(&index, "Geo.Point", &[index.mk_int(3), index.mk_int(4)]);
        assert_eq!(
            eval(&index, OpKind::Sel, &[p.clone(), index.mk_string("y")]),
            Some(index.mk_int(2))
        );
        let d = test_utils::apply(&index, "Dist", &[p.clone(), q, index.mk_int(5)]);
        assert_eq!(
            eval(&index, OpKind::Sel, &[d, index.mk_string("d")]),
            Some(index.mk_int(5))
        );
        assert_eq!(
            eval(&index, OpKind::Sel, &[index.mk_int(1), index.mk_string("x")]),
            None
        );
        assert_eq!(
            eval(&index, OpKind::ToSymbol, &[p]),
            Some(test_utils::type_cnst(&index, "Geo.Point"))
        );
        let red = test_utils::constant(&index, "RED");
        assert_eq!(eval(&index, OpKind::ToSymbol, &[red.clone()]), Some(red));
    }
}
