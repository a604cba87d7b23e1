use crate::operators::eval::list::cons_symbol;
use crate::operators::OpKind;
use crate::symbols::{BaseSortKind, Symbol};
use crate::terms::{Term, TermIndex};

use super::elements::{enumerate_up, Collector};

/// Adds the members of `list` that are not cells of `cons`: the terms a list can end in.
fn add_terminators(res: &mut Collector<'_>, index: &TermIndex, cons: &Symbol, list: &Term) {
    let cells = index.get_canonical_term(cons, None);
    let set = index.type_set(list);
    res.add_set(&set.without_data());
    for member in set.get_data().iter() {
        if member.symbol() != cons && Some(member) != cells.as_ref() {
            res.add_type(member);
        }
    }
}

/// The type of the lists `kind` builds over `cons`: its cells and the terminators of the input.
fn rebuilt(index: &TermIndex, cons: &Symbol, list: &Term) -> Option<Term> {
    let mut res = Collector::new(index);
    res.add_type(&index.get_canonical_term(cons, None)?);
    add_terminators(&mut res, index, cons, list);
    res.finish()
}

/// Upward approximation of the list operators. Lists of few values are evaluated; otherwise the result
/// is bounded by the declared cell type.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let ty = args.first()?;
    let cons = match cons_symbol(index, ty) {
        Some(c) => c,
        None if ty.is_ground() => return None,
        None => return Some(index.canonical_any_type().clone()),
    };
    let natural = index.mk_sort(BaseSortKind::Natural);
    let fallback = match (kind, args) {
        (OpKind::LstLength, [_, _]) => Some(natural),
        (OpKind::LstReverse, [_, list]) => rebuilt(index, &cons, list),
        (OpKind::LstGetAt, [_, _, _]) => index.get_canonical_term(&cons, Some(0)),
        (OpKind::LstFind, [_, _, _, default]) => Some(index.mk_union(&natural, default)),
        (OpKind::LstFindAll, [_, list, _, default])
        | (OpKind::LstFindAllNot, [_, list, _, default]) => {
            rebuilt(index, &cons, list).map(|t| index.mk_union(&t, default))
        }
        _ => return None,
    };
    enumerate_up(kind, index, args, fallback)
}

/// Downward approximation of the list operators.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    if kind == OpKind::LstLength {
        index.mk_intersection(expected, &index.mk_sort(BaseSortKind::Natural))?;
    }
    Some(vec![index.canonical_any_type().clone(); kind.arity()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn concrete_lists_are_evaluated() {
        let index = test_utils::sample_index();
        let ty = test_utils::type_cnst(&index, "IntList");
        let l = test_utils::int_list(&index, &[1, 2, 3]);
        assert_eq!(
            approximate_up(OpKind::LstLength, &index, &[ty.clone(), l.clone()]),
            Some(index.mk_int(3))
        );
        assert_eq!(
            approximate_up(OpKind::LstReverse, &index, &[ty, l]),
            Some(test_utils::int_list(&index, &[3, 2, 1]))
        );
    }

    #[test]
    fn open_lists_use_the_cell_type() {
        let index = test_utils::sample_index();
        let ty = test_utils::type_cnst(&index, "IntList");
        let cons = index.symbols().resolve("IntList").unwrap();
        let cells = index.get_canonical_term(&cons, None).unwrap();
        let nil = test_utils::constant(&index, "NIL");
        let list = index.mk_union(&cells, &nil);

        assert_eq!(
            approximate_up(OpKind::LstLength, &index, &[ty.clone(), list.clone()]),
            Some(index.mk_sort(BaseSortKind::Natural))
        );
        assert_eq!(
            approximate_up(OpKind::LstReverse, &index, &[ty.clone(), list.clone()]),
            Some(list.clone())
        );
        assert_eq!(
            approximate_up(
                OpKind::LstGetAt,
                &index,
                &[ty.clone(), list, index.mk_sort(BaseSortKind::Natural)]
            ),
            Some(index.mk_sort(BaseSortKind::Integer))
        );

        let not_a_list = test_utils::type_cnst(&index, "Color");
        assert_eq!(
            approximate_up(OpKind::LstLength, &index, &[not_a_list, nil]),
            None
        );
    }

    #[test]
    fn length_must_be_natural() {
        let index = test_utils::sample_index();
        assert_eq!(approximate_down(OpKind::LstLength, &index, &index.mk_int(-1)), None);
        assert_eq!(
            approximate_down(OpKind::LstFind, &index, &index.mk_int(-1)).map(|v| v.len()),
            Some(4)
        );
    }
}
