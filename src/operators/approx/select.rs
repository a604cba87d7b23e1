use crate::symbols::{BaseSortKind, Symbol};
use crate::terms::type_set::StrElement;
use crate::terms::{Term, TermIndex};

use super::elements::{string_elements, Collector};

/// The declared type of the field `label` of a constructor or map.
fn field_type(index: &TermIndex, data: &Symbol, label: &str) -> Option<Term> {
    match data {
        Symbol::Con(_) | Symbol::Map(_) => {
            let i = data.data_decl()?.label_index(label)?;
            index.get_canonical_term(data, Some(i))
        }
        _ => None,
    }
}

/// The type of field `label` within one data member of the target type.
fn select_member(index: &TermIndex, member: &Term, label: &str) -> Option<Term> {
    match member.symbol() {
        Symbol::UserSort(sort) => field_type(index, &sort.get_data_symbol()?, label),
        Symbol::Con(_) | Symbol::Map(_) if !member.args().is_empty() => {
            let i = member.symbol().data_decl()?.label_index(label)?;
            member.args().get(i).cloned()
        }
        _ => None,
    }
}

/// Unions the field types of every data member of `target` that has the label. A label that is not a
/// single string selects any field.
pub fn approximate_up(index: &TermIndex, target: &Term, label: &Term) -> Option<Term> {
    let labels = string_elements(index, label);
    if labels.is_empty() {
        return None;
    }
    let mut res = Collector::new(index);
    let target_set = index.type_set(target);
    for l in labels.iter() {
        match l {
            StrElement::Value(l) => {
                for member in target_set.get_data().iter() {
                    if let Some(t) = select_member(index, member, l) {
                        res.add_type(&t);
                    }
                }
            }
            StrElement::Sort => {
                if target_set.get_data().is_empty() {
                    continue;
                }
                log::debug!("selection by an unknown label from {}", target);
                return Some(index.canonical_any_type().clone());
            }
        }
    }
    res.finish()
}

/// Reconstructs the targets whose field `label` can hold a value of the expected type: one type level
/// application per constructor or map declaring the label, with that field narrowed.
pub fn approximate_down(index: &TermIndex, expected: &Term, args: &[Term]) -> Option<Vec<Term>> {
    let any_field = || {
        Some(vec![
            index.canonical_any_type().clone(),
            index.mk_sort(BaseSortKind::String),
        ])
    };
    let label_term = match args.get(1) {
        Some(l) => l,
        None => return any_field(),
    };
    let label = match label_term.as_str() {
        Some(l) => l,
        None => return any_field(),
    };

    let mut res = Collector::new(index);
    for owner in index.get_label_owners(label).iter() {
        let decl = match owner.data_decl() {
            Some(d) => d,
            None => continue,
        };
        let (i, declared) = match (decl.label_index(label), decl.get_arg_types()) {
            (Some(i), Some(types)) => (i, types),
            _ => continue,
        };
        let narrowed = match index.mk_intersection(&declared[i], expected) {
            Some(t) => t,
            None => continue,
        };
        let mut field_types = declared.to_vec();
        field_types[i] = narrowed;
        let (candidate, _) = index.mk_apply(owner, &field_types);
        res.add_type(&candidate);
    }
    Some(vec![res.finish()?, label_term.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    fn sort_of(index: &TermIndex, name: &str) -> Term {
        let symbol = index.symbols().resolve(name).unwrap();
        index.get_canonical_term(&symbol, None).unwrap()
    }

    #[test]
    fn constructors_and_maps_are_selected() {
        let index = test_utils::sample_index();
        let real = index.mk_sort(BaseSortKind::Real);
        let point = sort_of(&index, "Geo.Point");
        let dist = sort_of(&index, "Dist");
        assert_eq!(
            approximate_up(&index, &point, &index.mk_string("y")),
            Some(real.clone())
        );
        assert_eq!(
            approximate_up(&index, &dist, &index.mk_string("d")),
            Some(real.clone())
        );

        let both = index.mk_union(&point, &sort_of(&index, "IntList"));
        assert_eq!(
            approximate_up(&index, &both, &index.mk_string("head")),
            Some(index.mk_sort(BaseSortKind::Integer))
        );
        assert_eq!(approximate_up(&index, &both, &index.mk_string("nope")), None);
        assert_eq!(
            approximate_up(&index, &index.mk_sort(BaseSortKind::Integer), &index.mk_string("x")),
            None
        );
    }

    #[test]
    fn applications_select_their_argument_types() {
        let index = test_utils::sample_index();
        let point = index.symbols().resolve("Geo.Point").unwrap();
        let x = index.mk_range(1.into(), 2.into());
        let (app, _) = index.mk_apply(&point, &[x.clone(), index.mk_int(3)]);
        assert_eq!(approximate_up(&index, &app, &index.mk_string("x")), Some(x));
    }

    #[test]
    fn downward_narrows_the_labeled_field() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        let label = index.mk_string("d");
        let res = approximate_down(&index, &nat, &[index.canonical_any_type().clone(), label.clone()])
            .unwrap();
        assert_eq!(res[1], label);
        let dist = index.symbols().resolve("Dist").unwrap();
        assert!(res[0].symbol() == &dist);
        assert_eq!(res[0].args()[2], nat);
        assert_eq!(res[0].args()[0], sort_of(&index, "Geo.Point"));

        assert_eq!(
            approximate_down(
                &index,
                &index.mk_string("abc"),
                &[index.canonical_any_type().clone(), index.mk_string("head")]
            ),
            None
        );
    }

    #[test]
    fn unknown_labels_exclude_nothing() {
        let index = test_utils::sample_index();
        let any = index.canonical_any_type().clone();
        let string = index.mk_sort(BaseSortKind::String);
        let nat = index.mk_sort(BaseSortKind::Natural);
        assert_eq!(
            approximate_down(&index, &nat, &[]),
            Some(vec![any.clone(), string.clone()])
        );
        assert_eq!(
            approximate_down(&index, &nat, &[any.clone(), string.clone()]),
            Some(vec![any, string])
        );
    }
}
