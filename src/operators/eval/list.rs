use crate::operators::OpKind;
use crate::symbols::Symbol;
use crate::terms::{Term, TermIndex};
use crate::util::{as_index, from_usize};

/// The binary constructor a type constant `#Cons` names.
pub fn cons_symbol(index: &TermIndex, type_cnst: &Term) -> Option<Symbol> {
    match index.decode_type_cnst(type_cnst)? {
        (s, None) if s.data_decl().is_some() && s.arity() == 2 => Some(s),
        _ => None,
    }
}

/// The elements of a cons list and the term ending it.
pub fn unfold(cons: &Symbol, list: &Term) -> (Vec<Term>, Term) {
    let mut elements = Vec::new();
    let mut cur = list.clone();
    while cur.symbol() == cons {
        elements.push(cur.args()[0].clone());
        let next = cur.args()[1].clone();
        cur = next;
    }
    (elements, cur)
}

/// Builds the cons list of `elements` ending in `end`.
pub fn fold(index: &TermIndex, cons: &Symbol, elements: &[Term], end: Term) -> Term {
    elements
        .iter()
        .rev()
        .fold(end, |tail, e| index.mk_apply(cons, &[e.clone(), tail]).0)
}

fn positions(index: &TermIndex, elements: &[Term], wanted: &Term, equal: bool) -> Vec<Term> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| (*e == wanted) == equal)
        .map(|(i, _)| index.mk_numeric(from_usize(i)))
        .collect()
}

/// Evaluates the list operators. The first argument names the cons constructor.
pub fn evaluate(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let cons = cons_symbol(index, args.first()?)?;
    match (kind, args) {
        (OpKind::LstLength, [_, list]) => {
            let (elements, _) = unfold(&cons, list);
            Some(index.mk_numeric(from_usize(elements.len())))
        }
        (OpKind::LstReverse, [_, list]) => {
            let (mut elements, end) = unfold(&cons, list);
            elements.reverse();
            Some(fold(index, &cons, &elements, end))
        }
        (OpKind::LstGetAt, [_, list, i]) => {
            let (elements, _) = unfold(&cons, list);
            elements.get(as_index(i.as_rational()?)?).cloned()
        }
        (OpKind::LstFind, [_, list, wanted, default]) => {
            let (elements, _) = unfold(&cons, list);
            match elements.iter().position(|e| e == wanted) {
                Some(i) => Some(index.mk_numeric(from_usize(i))),
                None => Some(default.clone()),
            }
        }
        (OpKind::LstFindAll, [_, list, wanted, default])
        | (OpKind::LstFindAllNot, [_, list, wanted, default]) => {
            let (elements, end) = unfold(&cons, list);
            let found = positions(index, &elements, wanted, kind == OpKind::LstFindAll);
            if found.is_empty() {
                Some(default.clone())
            } else {
                Some(fold(index, &cons, &found, end))
            }
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
    fn length_and_double_reverse() {
        let index = test_utils::sample_index();
        let ty = test_utils::type_cnst(&index, "IntList");
        let list = test_utils::int_list(&index, &[1, 2, 3]);
        assert_eq!(
            eval(&index, OpKind::LstLength, &[ty.clone(), list.clone()]),
            Some(index.mk_int(3))
        );
        let rev = eval(&index, OpKind::LstReverse, &[ty.clone(), list.clone()]).unwrap();
        assert_eq!(rev, test_utils::int_list(&index, &[3, 2, 1]));
        let back = eval(&index, OpKind::LstReverse, &[ty, rev]).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn finding_elements() {
        let index = test_utils::sample_index();
        let ty = test_utils::type_cnst(&index, "IntList");
        let list = test_utils::int_list(&index, &[1, 2, 1]);
        let i = |v: i64| index.mk_int(v);
        assert_eq!(
            eval(&index, OpKind::LstFind, &[ty.clone(), list.clone(), i(2), i(-1)]),
            Some(i(1))
        );
        assert_eq!(
            eval(&index, OpKind::LstFind, &[ty.clone(), list.clone(), i(7), i(-1)]),
            Some(i(-1))
        );
        assert_eq!(
            eval(&index, OpKind::LstFindAll, &[ty.clone(), list.clone(), i(1), i(-1)]),
            Some(test_utils::int_list(&index, &[0, 2]))
        );
        assert_eq!(
            eval(&index, OpKind::LstFindAllNot, &[ty.clone(), list.clone(), i(1), i(-1)]),
            Some(test_utils::int_list(&index, &[1]))
        );
        assert_eq!(
            eval(&index, OpKind::LstFindAll, &[ty.clone(), list.clone(), i(9), i(-1)]),
            Some(i(-1))
        );
        assert_eq!(
            eval(&index, OpKind::LstGetAt, &[ty.clone(), list.clone(), i(1)]),
            Some(i(2))
        );
        assert_eq!(eval(&index, OpKind::LstGetAt, &[ty, list, i(3)]), None);
    }

    #[test]
    fn the_list_type_must_be_binary() {
        let index = test_utils::sample_index();
        let list = test_utils::int_list(&index, &[1]);
        let point = test_utils::type_cnst(&index, "Geo.Point");
        assert!(eval(&index, OpKind::LstLength, &[point, list.clone()]).is_some());
        let triple = test_utils::type_cnst(&index, "Geo.Triple");
        assert_eq!(eval(&index, OpKind::LstLength, &[triple, list]), None);
    }
}
