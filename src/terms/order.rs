use std::cmp::Ordering;

use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::symbols::{BaseSortKind, Symbol};

use super::type_set::TypeSet;
use super::{Term, TermIndex};

/// One end of the interval of a type under the lexicographic order. The first component is the class of
/// the term: numbers, strings, user constants, applications.
type Point = (u8, Bound);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Bound {
    NegInf,
    Num(BigRational),
    Str(String),
    Name(String),
    PosInf,
}

const NUMBERS: u8 = 0;
const STRINGS: u8 = 1;
const CONSTANTS: u8 = 2;
const APPLICATIONS: u8 = 3;
const TYPES: u8 = 4;

fn class_of(t: &Term) -> u8 {
    if t.is_type() {
        return TYPES;
    }
    match t.symbol() {
        Symbol::BaseCnst(_) if t.as_rational().is_some() => NUMBERS,
        Symbol::BaseCnst(_) => STRINGS,
        _ if t.args().is_empty() => CONSTANTS,
        _ => APPLICATIONS,
    }
}

fn sort_bounds(kind: BaseSortKind) -> (Point, Point) {
    let zero = || BigRational::zero();
    match kind {
        BaseSortKind::Natural => ((NUMBERS, Bound::Num(zero())), (NUMBERS, Bound::PosInf)),
        BaseSortKind::PosInteger => (
            (NUMBERS, Bound::Num(BigRational::one())),
            (NUMBERS, Bound::PosInf),
        ),
        BaseSortKind::NegInteger => (
            (NUMBERS, Bound::NegInf),
            (NUMBERS, Bound::Num(-BigRational::one())),
        ),
        BaseSortKind::Integer | BaseSortKind::Real => {
            ((NUMBERS, Bound::NegInf), (NUMBERS, Bound::PosInf))
        }
        BaseSortKind::String => (
            (STRINGS, Bound::Str(String::new())),
            (STRINGS, Bound::PosInf),
        ),
    }
}

fn set_bounds(set: &TypeSet) -> Option<(Point, Point)> {
    let mut points: Vec<(Point, Point)> = Vec::new();
    points.extend(set.get_sorts().iter().map(|k| sort_bounds(*k)));
    points.extend(set.get_ranges().iter().map(|r| {
        (
            (NUMBERS, Bound::Num(BigRational::from_integer(r.lo.clone()))),
            (NUMBERS, Bound::Num(BigRational::from_integer(r.hi.clone()))),
        )
    }));
    points.extend(set.get_fractions().iter().map(|f| {
        let p = (NUMBERS, Bound::Num(f.clone()));
        (p.clone(), p)
    }));
    points.extend(set.get_strings().iter().map(|s| {
        let p = (STRINGS, Bound::Str(s.clone()));
        (p.clone(), p)
    }));
    points.extend(set.get_data().iter().map(|d| match d.symbol() {
        Symbol::UserCnst(_) => {
            let p = (CONSTANTS, Bound::Name(d.symbol().full_name().into_owned()));
            (p.clone(), p)
        }
        _ => ((APPLICATIONS, Bound::NegInf), (APPLICATIONS, Bound::PosInf)),
    }));

    points.into_iter().fold(None, |acc, (lo, hi)| match acc {
        None => Some((lo, hi)),
        Some((alo, ahi)) => Some((alo.min(lo), ahi.max(hi))),
    })
}

impl TermIndex {
    /// The total order on terms: numbers, then strings, then user constants by name, then applications
    /// by head name, arity and arguments. Types come last, in interning order.
    pub fn lexicographic_compare(&self, a: &Term, b: &Term) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (ca, cb) = (class_of(a), class_of(b));
        if ca != cb {
            return ca.cmp(&cb);
        }
        match ca {
            NUMBERS => a.as_rational().cmp(&b.as_rational()),
            STRINGS => a.as_str().cmp(&b.as_str()),
            CONSTANTS => a
                .symbol()
                .full_name()
                .cmp(&b.symbol().full_name())
                .then_with(|| a.symbol().try_id().cmp(&b.symbol().try_id())),
            APPLICATIONS => a
                .symbol()
                .full_name()
                .cmp(&b.symbol().full_name())
                .then_with(|| a.args().len().cmp(&b.args().len()))
                .then_with(|| {
                    a.args()
                        .iter()
                        .zip(b.args().iter())
                        .map(|(x, y)| self.lexicographic_compare(x, y))
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                }),
            _ => a.uid().cmp(&b.uid()),
        }
    }

    /// Compares the types `a` and `b` by their extremes. `Some(true)` if every member of `a` is below
    /// every member of `b`, `Some(false)` if none is, `None` if the intervals overlap.
    pub fn lexicographic_min_max_compare(&self, a: &Term, b: &Term) -> Option<bool> {
        let (amin, amax) = set_bounds(&self.type_set(a))?;
        let (bmin, bmax) = set_bounds(&self.type_set(b))?;
        if amax < bmin {
            Some(true)
        } else if amin >= bmax {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn classes_are_ordered() {
        let index = test_utils::sample_index();
        let one = index.mk_int(1);
        let a = index.mk_string("a");
        let red = test_utils::constant(&index, "RED");
        let point = index.symbols().resolve("Geo.Point").unwrap();
        let p = index.mk_apply(&point, &[one.clone(), one.clone()]).0;
        assert_eq!(index.lexicographic_compare(&one, &a), Ordering::Less);
        assert_eq!(index.lexicographic_compare(&a, &red), Ordering::Less);
        assert_eq!(index.lexicographic_compare(&red, &p), Ordering::Less);
        assert_eq!(index.lexicographic_compare(&p, &red), Ordering::Greater);
    }

    #[test]
    fn applications_compare_by_arguments() {
        let index = test_utils::sample_index();
        let point = index.symbols().resolve("Geo.Point").unwrap();
        let p12 = index.mk_apply(&point, &[index.mk_int(1), index.mk_int(2)]).0;
        let p13 = index.mk_apply(&point, &[index.mk_int(1), index.mk_int(3)]).0;
        assert_eq!(index.lexicographic_compare(&p12, &p13), Ordering::Less);
        assert_eq!(index.lexicographic_compare(&p12, &p12), Ordering::Equal);
        assert_eq!(
            index.lexicographic_compare(&index.mk_int(-3), &index.mk_int(2)),
            Ordering::Less
        );
    }

    #[test]
    fn min_max_of_types() {
        let index = test_utils::sample_index();
        let nat = index.mk_sort(BaseSortKind::Natural);
        let string = index.mk_sort(BaseSortKind::String);
        let int = index.mk_sort(BaseSortKind::Integer);
        assert_eq!(index.lexicographic_min_max_compare(&nat, &string), Some(true));
        assert_eq!(index.lexicographic_min_max_compare(&string, &nat), Some(false));
        assert_eq!(index.lexicographic_min_max_compare(&nat, &int), None);

        let low = index.mk_range(1.into(), 2.into());
        let high = index.mk_range(3.into(), 4.into());
        assert_eq!(index.lexicographic_min_max_compare(&low, &high), Some(true));
        assert_eq!(index.lexicographic_min_max_compare(&high, &low), Some(false));

        let neg = index.mk_sort(BaseSortKind::NegInteger);
        let zero = index.zero_value().clone();
        assert_eq!(index.lexicographic_min_max_compare(&neg, &zero), Some(true));
    }
}
