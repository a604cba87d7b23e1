use crate::operators::eval::list::cons_symbol;
use crate::operators::OpKind;
use crate::symbols::BaseSortKind;
use crate::terms::type_set::TypeSet;
use crate::terms::{Term, TermIndex};

use super::elements::Collector;

/// The smallest of `sorts` containing every number of `set`, `Real` if none does.
fn enclosing_sort(set: &TypeSet, sorts: &[BaseSortKind]) -> BaseSortKind {
    let numbers = set.numeric_part();
    sorts
        .iter()
        .copied()
        .find(|s| numbers.is_basic_subset(&TypeSet::of_sort(*s)))
        .unwrap_or(BaseSortKind::Real)
}

/// Upward approximation of the aggregates. The comprehension argument is typed by its projected values;
/// an empty comprehension yields the default, so it is always part of the result.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let mut res = Collector::new(index);
    let projected = index.type_set(args.last()?);
    match (kind, args) {
        (OpKind::Count, [_]) => res.add_sort(BaseSortKind::Natural),
        (OpKind::No, [_]) => res.add_type(index.canonical_boolean_type()),
        (OpKind::Sum, [default, _]) => {
            res.add_type(default);
            if projected.has_numeric() {
                res.add_sort(enclosing_sort(
                    &projected,
                    &[BaseSortKind::Natural, BaseSortKind::Integer],
                ));
            }
        }
        (OpKind::Prod, [default, _]) => {
            res.add_type(default);
            if projected.has_numeric() {
                res.add_sort(enclosing_sort(
                    &projected,
                    &[
                        BaseSortKind::PosInteger,
                        BaseSortKind::Natural,
                        BaseSortKind::Integer,
                    ],
                ));
            }
        }
        (OpKind::GCDAll, [default, _]) | (OpKind::LCMAll, [default, _]) => {
            res.add_type(default);
            if projected.has_numeric() {
                res.add_sort(BaseSortKind::Natural);
            }
        }
        (OpKind::AndAll, [default, c]) | (OpKind::OrAll, [default, c]) => {
            res.add_type(default);
            if let Some(bools) = index.mk_intersection(c, index.canonical_boolean_type()) {
                res.add_type(&bools);
            }
        }
        (OpKind::MaxAll, [default, c]) | (OpKind::MinAll, [default, c]) => {
            res.add_type(default);
            res.add_type(c);
        }
        (OpKind::ToList, [ty, end, _]) => {
            let cons = cons_symbol(index, ty)?;
            res.add_type(&index.get_canonical_term(&cons, None)?);
            res.add_type(end);
        }
        (OpKind::ToOrdinal, [_, default, _]) => {
            res.add_sort(BaseSortKind::Natural);
            res.add_type(default);
        }
        _ => return None,
    }
    res.finish()
}

/// Downward approximation of the aggregates: nothing narrows but the result sorts of counting.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    match kind {
        OpKind::Count => {
            index.mk_intersection(expected, &index.mk_sort(BaseSortKind::Natural))?;
        }
        OpKind::No => {
            index.mk_intersection(expected, index.canonical_boolean_type())?;
        }
        _ => (),
    }
    Some(vec![index.canonical_any_type().clone(); kind.arity()])
}
