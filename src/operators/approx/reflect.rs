use crate::operators::OpKind;
use crate::symbols::BaseSortKind;
use crate::terms::{Term, TermIndex};

use super::elements::{enumerate, enumerate_up, Collector};

/// `rflIsMember` decided per named type: members of the widened value type always belong, a disjoint
/// type never does.
fn is_member_up(index: &TermIndex, value: &Term, types: &Term) -> Option<Term> {
    let boolean = index.canonical_boolean_type().clone();
    let names = match enumerate(index, types) {
        Some(n) => n,
        None => return Some(boolean),
    };
    let mut res = Collector::new(index);
    for name in names.iter() {
        let ty = match index.type_of_type_cnst(name) {
            Some(t) => t,
            None => continue,
        };
        if index.is_subtype_widened(value, &ty) {
            res.add_type(index.true_value());
        } else if index.mk_intersection(value, &ty).is_none() {
            res.add_type(index.false_value());
        } else {
            res.add_type(&boolean);
        }
    }
    res.finish()
}

/// Upward approximation of `toSymbol` and the reflection operators. Few values are evaluated, larger
/// types give the return sort.
pub fn approximate_up(kind: OpKind, index: &TermIndex, args: &[Term]) -> Option<Term> {
    let any = index.canonical_any_type().clone();
    let boolean = index.canonical_boolean_type().clone();
    match (kind, args) {
        (OpKind::RflIsMember, [value, types]) => is_member_up(index, value, types),
        (OpKind::RflIsSubtype, _) => enumerate_up(kind, index, args, Some(boolean)),
        (OpKind::RflGetArity, _) => {
            enumerate_up(kind, index, args, Some(index.mk_sort(BaseSortKind::Natural)))
        }
        (OpKind::RflGetArgType, _) | (OpKind::ToSymbol, _) => {
            enumerate_up(kind, index, args, Some(any))
        }
        _ => None,
    }
}

/// Downward approximation of `toSymbol` and the reflection operators.
pub fn approximate_down(kind: OpKind, index: &TermIndex, expected: &Term) -> Option<Vec<Term>> {
    let any = index.canonical_any_type().clone();
    match kind {
        OpKind::RflIsMember | OpKind::RflIsSubtype => {
            index.mk_intersection(expected, index.canonical_boolean_type())?;
        }
        OpKind::RflGetArity => {
            index.mk_intersection(expected, &index.mk_sort(BaseSortKind::Natural))?;
        }
        OpKind::RflGetArgType => {
            return Some(vec![any, index.mk_sort(BaseSortKind::Natural)]);
        }
        _ => (),
    }
    Some(vec![any; kind.arity()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::type_set::TypeSet;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn membership_is_decided_by_widened_types() {
        let index = test_utils::sample_index();
        let color = test_utils::type_cnst(&index, "Color");
        let point = test_utils::type_cnst(&index, "Geo.Point");
        let red = test_utils::constant(&index, "RED");
        let t = Some(index.true_value().clone());
        let f = Some(index.false_value().clone());
        let b = Some(index.canonical_boolean_type().clone());

        assert_eq!(approximate_up(OpKind::RflIsMember, &index, &[red.clone(), color.clone()]), t);
        assert_eq!(approximate_up(OpKind::RflIsMember, &index, &[red.clone(), point.clone()]), f);

        let p = index.symbols().resolve("Geo.Point").unwrap();
        let (app, _) = index.mk_apply(&p, &[index.mk_int(1), index.mk_int(2)]);
        assert_eq!(approximate_up(OpKind::RflIsMember, &index, &[app, point.clone()]), t);

        let mixed = index.mk_union(&red, &index.mk_int(1));
        assert_eq!(approximate_up(OpKind::RflIsMember, &index, &[mixed, color]), b);
        assert_eq!(
            approximate_up(OpKind::RflIsMember, &index, &[red, index.mk_sort(BaseSortKind::String)]),
            b
        );
    }

    #[test]
    fn small_type_constant_sets_are_evaluated() {
        let index = test_utils::sample_index();
        let mut names = TypeSet::new();
        names.add_data(test_utils::type_cnst(&index, "Geo.Point"));
        names.add_data(test_utils::type_cnst(&index, "Geo.Triple"));
        let names = index.mk_type(&names).unwrap();
        assert_eq!(
            approximate_up(OpKind::RflGetArity, &index, &[names]).map(|t| t.to_string()),
            Some("2..3".to_string())
        );
        assert_eq!(
            approximate_up(OpKind::RflGetArity, &index, &[index.canonical_any_type().clone()]),
            Some(index.mk_sort(BaseSortKind::Natural))
        );
    }
}
