use std::collections::BTreeSet;

use alga::general::MeetSemilattice;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::sorts::SortElement;
use super::Term;
use crate::symbols::BaseSortKind;

/// An enumeration of this many numeric or string elements is collapsed to base sorts.
pub const NUM_WIDENING_WIDTH: usize = 101;

/// The integers from `lo` to `hi` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntRange {
    /// The smallest member.
    pub lo: BigInt,
    /// The largest member.
    pub hi: BigInt,
}

impl IntRange {
    /// Creates a range. `lo` must not exceed `hi`.
    pub fn new(lo: BigInt, hi: BigInt) -> IntRange {
        debug_assert!(lo <= hi);
        IntRange { lo, hi }
    }

    /// The number of members.
    pub fn len(&self) -> BigInt {
        &self.hi - &self.lo + 1
    }

    /// Ranges are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Membership.
    pub fn contains(&self, v: &BigInt) -> bool {
        &self.lo <= v && v <= &self.hi
    }

    /// The smallest base sort containing the whole range.
    pub fn widen(&self) -> BaseSortKind {
        if self.lo >= BigInt::one() {
            BaseSortKind::PosInteger
        } else if self.lo.is_zero() {
            BaseSortKind::Natural
        } else if self.hi <= -BigInt::one() {
            BaseSortKind::NegInteger
        } else {
            BaseSortKind::Integer
        }
    }

    /// The overlap of two ranges.
    pub fn intersect(&self, other: &IntRange) -> Option<IntRange> {
        let lo = std::cmp::max(&self.lo, &other.lo).clone();
        let hi = std::cmp::min(&self.hi, &other.hi).clone();
        if lo <= hi {
            Some(IntRange { lo, hi })
        } else {
            None
        }
    }

    /// The part of the range inside a sort.
    pub fn clip_to_sort(&self, sort: BaseSortKind) -> Option<IntRange> {
        if sort == BaseSortKind::Real {
            return Some(self.clone());
        }
        let (lo, hi) = sort.int_bounds()?;
        let lo = match lo {
            Some(l) if l > self.lo => l,
            _ => self.lo.clone(),
        };
        let hi = match hi {
            Some(h) if h < self.hi => h,
            _ => self.hi.clone(),
        };
        if lo <= hi {
            Some(IntRange { lo, hi })
        } else {
            None
        }
    }

    /// The part of the range not covered by any of the sorts.
    fn remove_sorts(&self, sorts: &BTreeSet<BaseSortKind>) -> Option<IntRange> {
        if sorts.contains(&BaseSortKind::Real) || sorts.contains(&BaseSortKind::Integer) {
            return None;
        }
        let mut lo = self.lo.clone();
        let mut hi = self.hi.clone();
        if sorts.contains(&BaseSortKind::Natural) {
            hi = std::cmp::min(hi, -BigInt::one());
        }
        if sorts.contains(&BaseSortKind::PosInteger) {
            hi = std::cmp::min(hi, BigInt::zero());
        }
        if sorts.contains(&BaseSortKind::NegInteger) {
            lo = std::cmp::max(lo, BigInt::zero());
        }
        if lo <= hi {
            Some(IntRange { lo, hi })
        } else {
            None
        }
    }
}

/// A member of the widened numeric enumeration of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumElement {
    /// Every member of a numeric base sort.
    Sort(BaseSortKind),
    /// A single rational.
    Value(BigRational),
}

/// A member of the widened string enumeration of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StrElement {
    /// Every string.
    Sort,
    /// A single string.
    Value(String),
}

/// The canonical form of a union type.
///
/// Numeric members are base sorts, merged integer ranges not covered by those sorts, and non-integer
/// rationals. String members are the `String` sort or individual strings. Data members are terms
/// (user sorts, user constants, and applications of constructors to values or types).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet {
    sorts: BTreeSet<BaseSortKind>,
    ranges: Vec<IntRange>,
    fractions: BTreeSet<BigRational>,
    strings: BTreeSet<String>,
    data: Vec<Term>,
}

impl TypeSet {
    /// The empty type.
    pub fn new() -> TypeSet {
        TypeSet::default()
    }

    /// A single base sort.
    pub fn of_sort(kind: BaseSortKind) -> TypeSet {
        let mut res = TypeSet::new();
        res.add_sort(kind);
        res
    }

    /// A single rational.
    pub fn of_rational(r: BigRational) -> TypeSet {
        let mut res = TypeSet::new();
        res.add_rational(r);
        res
    }

    /// A single string.
    pub fn of_string(s: &str) -> TypeSet {
        let mut res = TypeSet::new();
        res.add_string(s);
        res
    }

    /// A single integer range.
    pub fn of_range(lo: BigInt, hi: BigInt) -> TypeSet {
        let mut res = TypeSet::new();
        res.add_range(lo, hi);
        res
    }

    /// Adds a base sort.
    pub fn add_sort(&mut self, kind: BaseSortKind) {
        self.sorts.insert(kind);
        self.normalize();
    }

    /// Adds the integers from `lo` to `hi`. Nothing is added if `lo > hi`.
    pub fn add_range(&mut self, lo: BigInt, hi: BigInt) {
        if lo <= hi {
            self.ranges.push(IntRange { lo, hi });
            self.normalize();
        }
    }

    /// Adds a rational.
    pub fn add_rational(&mut self, r: BigRational) {
        self.insert_rational(r);
        self.normalize();
    }

    fn insert_rational(&mut self, r: BigRational) {
        if r.is_integer() {
            let v = r.to_integer();
            self.ranges.push(IntRange {
                lo: v.clone(),
                hi: v,
            });
        } else {
            self.fractions.insert(r);
        }
    }

    /// Adds a string.
    pub fn add_string(&mut self, s: &str) {
        self.strings.insert(s.to_owned());
        self.normalize();
    }

    /// Adds a data member.
    pub fn add_data(&mut self, t: Term) {
        self.data.push(t);
        self.normalize();
    }

    /// Adds every member of `other`.
    pub fn union_with(&mut self, other: &TypeSet) {
        self.sorts.extend(other.sorts.iter().copied());
        self.ranges.extend(other.ranges.iter().cloned());
        self.fractions.extend(other.fractions.iter().cloned());
        self.strings.extend(other.strings.iter().cloned());
        self.data.extend(other.data.iter().cloned());
        self.normalize();
    }

    /// The union of two sets.
    pub fn union(&self, other: &TypeSet) -> TypeSet {
        let mut res = self.clone();
        res.union_with(other);
        res
    }

    fn has_zero(&self) -> bool {
        let zero = BigInt::zero();
        self.ranges.iter().any(|r| r.contains(&zero))
    }

    fn normalize_sorts(&mut self) {
        use BaseSortKind::*;
        loop {
            let before = self.sorts.clone();
            if self.sorts.contains(&Real) {
                for s in [Natural, PosInteger, NegInteger, Integer].iter() {
                    self.sorts.remove(s);
                }
            }
            if self.sorts.contains(&Integer) {
                for s in [Natural, PosInteger, NegInteger].iter() {
                    self.sorts.remove(s);
                }
            }
            if self.sorts.contains(&Natural) {
                self.sorts.remove(&PosInteger);
            }
            if self.sorts.contains(&PosInteger) && self.has_zero() {
                self.sorts.remove(&PosInteger);
                self.sorts.insert(Natural);
            }
            if self.sorts.contains(&Natural) && self.sorts.contains(&NegInteger) {
                self.sorts.remove(&Natural);
                self.sorts.remove(&NegInteger);
                self.sorts.insert(Integer);
            }
            if before == self.sorts {
                break;
            }
        }
    }

    fn normalize(&mut self) {
        self.normalize_sorts();

        let sorts = &self.sorts;
        let mut ranges = self
            .ranges
            .drain(..)
            .filter_map(|r| r.remove_sorts(sorts))
            .collect::<Vec<_>>();
        ranges.sort_by(|a, b| a.lo.cmp(&b.lo));
        let mut merged: Vec<IntRange> = Vec::with_capacity(ranges.len());
        for r in ranges.into_iter() {
            match merged.last_mut() {
                Some(last) if r.lo <= &last.hi + 1 => {
                    if r.hi > last.hi {
                        last.hi = r.hi;
                    }
                }
                _ => merged.push(r),
            }
        }
        self.ranges = merged;

        if self.sorts.contains(&BaseSortKind::Real) {
            self.fractions.clear();
        }
        if self.sorts.contains(&BaseSortKind::String) {
            self.strings.clear();
        }

        self.data.sort_by_key(|t| t.uid());
        self.data.dedup();
        let sort_ids = self
            .data
            .iter()
            .filter_map(|t| t.user_sort_id())
            .collect::<BTreeSet<_>>();
        if !sort_ids.is_empty() {
            self.data.retain(|t| match t.data_sort_id() {
                Some(id) => !sort_ids.contains(&id),
                None => true,
            });
        }
    }

    /// True if the type has no members.
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
            && self.ranges.is_empty()
            && self.fractions.is_empty()
            && self.strings.is_empty()
            && self.data.is_empty()
    }

    /// The base sorts.
    pub fn get_sorts(&self) -> &BTreeSet<BaseSortKind> {
        &self.sorts
    }

    /// The integer ranges, sorted and disjoint.
    pub fn get_ranges(&self) -> &[IntRange] {
        &self.ranges
    }

    /// The non-integer rationals.
    pub fn get_fractions(&self) -> &BTreeSet<BigRational> {
        &self.fractions
    }

    /// The string constants.
    pub fn get_strings(&self) -> &BTreeSet<String> {
        &self.strings
    }

    /// The data members, ordered by term uid.
    pub fn get_data(&self) -> &[Term] {
        &self.data
    }

    /// True if some member is a number.
    pub fn has_numeric(&self) -> bool {
        self.sorts.iter().any(|s| s.is_numeric())
            || !self.ranges.is_empty()
            || !self.fractions.is_empty()
    }

    /// True if some member is a string.
    pub fn has_string(&self) -> bool {
        self.sorts.contains(&BaseSortKind::String) || !self.strings.is_empty()
    }

    /// Only the numeric members.
    pub fn numeric_part(&self) -> TypeSet {
        TypeSet {
            sorts: self.sorts.iter().copied().filter(|s| s.is_numeric()).collect(),
            ranges: self.ranges.clone(),
            fractions: self.fractions.clone(),
            strings: BTreeSet::new(),
            data: Vec::new(),
        }
    }

    /// Only the string members.
    pub fn string_part(&self) -> TypeSet {
        TypeSet {
            sorts: self
                .sorts
                .iter()
                .copied()
                .filter(|s| !s.is_numeric())
                .collect(),
            ranges: Vec::new(),
            fractions: BTreeSet::new(),
            strings: self.strings.clone(),
            data: Vec::new(),
        }
    }

    /// Membership of a rational.
    pub fn contains_rational(&self, r: &BigRational) -> bool {
        if self.sorts.iter().any(|s| s.contains_rational(r)) {
            return true;
        }
        if r.is_integer() {
            let v = r.to_integer();
            self.ranges.iter().any(|rg| rg.contains(&v))
        } else {
            self.fractions.contains(r)
        }
    }

    /// Membership of a string.
    pub fn contains_string(&self, s: &str) -> bool {
        self.sorts.contains(&BaseSortKind::String) || self.strings.contains(s)
    }

    /// The number of members, `None` if the set is infinite or has non-ground data members.
    pub fn finite_size(&self) -> Option<BigInt> {
        if !self.sorts.is_empty() || self.data.iter().any(|d| !d.is_ground()) {
            return None;
        }
        let mut count = BigInt::from(self.fractions.len() + self.strings.len() + self.data.len());
        for r in self.ranges.iter() {
            count += r.len();
        }
        Some(count)
    }

    /// The numeric members as a list of fewer than [NUM_WIDENING_WIDTH] elements. Enumerations that would
    /// reach the width collapse to base sorts by a sign case split.
    pub fn numeric_elements(&self) -> Vec<NumElement> {
        let numeric_sorts = self
            .sorts
            .iter()
            .copied()
            .filter(|s| s.is_numeric())
            .collect::<Vec<_>>();
        let mut count = BigInt::from(numeric_sorts.len() + self.fractions.len());
        for r in self.ranges.iter() {
            count += r.len();
        }

        if count >= BigInt::from(NUM_WIDENING_WIDTH) {
            let mut widened = TypeSet::new();
            widened.sorts.extend(numeric_sorts.into_iter());
            widened
                .sorts
                .extend(self.ranges.iter().map(IntRange::widen));
            if !self.fractions.is_empty() {
                widened.sorts.insert(BaseSortKind::Real);
            }
            widened.normalize();
            log::debug!("widened {} numeric elements to {:?}", count, widened.sorts);
            return widened.sorts.into_iter().map(NumElement::Sort).collect();
        }

        let mut res = numeric_sorts
            .into_iter()
            .map(NumElement::Sort)
            .collect::<Vec<_>>();
        for r in self.ranges.iter() {
            let mut v = r.lo.clone();
            while v <= r.hi {
                res.push(NumElement::Value(BigRational::from_integer(v.clone())));
                v += 1;
            }
        }
        res.extend(self.fractions.iter().cloned().map(NumElement::Value));
        res
    }

    /// The string members as a list of fewer than [NUM_WIDENING_WIDTH] elements.
    pub fn string_elements(&self) -> Vec<StrElement> {
        if self.sorts.contains(&BaseSortKind::String) || self.strings.len() >= NUM_WIDENING_WIDTH {
            return vec![StrElement::Sort];
        }
        self.strings.iter().cloned().map(StrElement::Value).collect()
    }

    /// Intersects the numeric and string parts. Data members are intersected by the term index.
    pub(crate) fn intersect_basic(&self, other: &TypeSet) -> TypeSet {
        let mut res = TypeSet::new();
        for s in self.sorts.iter() {
            for t in other.sorts.iter() {
                if let Some(m) = SortElement::from(*s)
                    .meet(&SortElement::from(*t))
                    .to_base_sort()
                {
                    res.sorts.insert(m);
                }
            }
        }

        for r in self.ranges.iter() {
            for q in other.ranges.iter() {
                res.ranges.extend(r.intersect(q));
            }
            for t in other.sorts.iter() {
                res.ranges.extend(r.clip_to_sort(*t));
            }
        }
        for q in other.ranges.iter() {
            for s in self.sorts.iter() {
                res.ranges.extend(q.clip_to_sort(*s));
            }
        }

        let self_real = self.sorts.contains(&BaseSortKind::Real);
        let other_real = other.sorts.contains(&BaseSortKind::Real);
        res.fractions.extend(
            self.fractions
                .iter()
                .filter(|f| other_real || other.fractions.contains(*f))
                .cloned(),
        );
        if self_real {
            res.fractions.extend(other.fractions.iter().cloned());
        }

        res.strings.extend(
            self.strings
                .iter()
                .filter(|s| other.contains_string(s))
                .cloned(),
        );
        res.strings.extend(
            other
                .strings
                .iter()
                .filter(|s| self.contains_string(s))
                .cloned(),
        );

        res.normalize();
        res
    }

    /// Checks the numeric and string parts of `self` are contained in `other`.
    pub(crate) fn is_basic_subset(&self, other: &TypeSet) -> bool {
        let sorts_ok = self.sorts.iter().all(|s| {
            other
                .sorts
                .iter()
                .any(|t| SortElement::from(*s) <= SortElement::from(*t))
        });
        let ranges_ok = self.ranges.iter().all(|r| match r.remove_sorts(&other.sorts) {
            None => true,
            Some(rest) => other
                .ranges
                .iter()
                .any(|q| q.lo <= rest.lo && rest.hi <= q.hi),
        });
        let fractions_ok = other.sorts.contains(&BaseSortKind::Real)
            || self.fractions.is_subset(&other.fractions);
        let strings_ok = other.sorts.contains(&BaseSortKind::String)
            || self.strings.is_subset(&other.strings);
        sorts_ok && ranges_ok && fractions_ok && strings_ok
    }

    /// The numeric members negated.
    pub fn negate_numeric(&self) -> TypeSet {
        let mut res = TypeSet::new();
        for s in self.sorts.iter() {
            match s {
                BaseSortKind::PosInteger => {
                    res.sorts.insert(BaseSortKind::NegInteger);
                }
                BaseSortKind::NegInteger => {
                    res.sorts.insert(BaseSortKind::PosInteger);
                }
                BaseSortKind::Natural => {
                    res.sorts.insert(BaseSortKind::NegInteger);
                    res.ranges.push(IntRange::new(BigInt::zero(), BigInt::zero()));
                }
                BaseSortKind::Integer | BaseSortKind::Real => {
                    res.sorts.insert(*s);
                }
                BaseSortKind::String => (),
            }
        }
        res.ranges.extend(
            self.ranges
                .iter()
                .map(|r| IntRange::new(-&r.hi, -&r.lo)),
        );
        res.fractions
            .extend(self.fractions.iter().map(|f| -f.clone()));
        res.normalize();
        res
    }

    /// Replaces the data members.
    pub(crate) fn set_data(&mut self, data: Vec<Term>) {
        self.data = data;
        self.normalize();
    }

    /// Removes the data members.
    pub(crate) fn without_data(&self) -> TypeSet {
        let mut res = self.clone();
        res.data.clear();
        res
    }

    /// Inserts members without normalizing. Callers finish with [TypeSet::union_with] or another adder.
    pub(crate) fn insert_element(&mut self, e: &NumElement) {
        match e {
            NumElement::Sort(s) => {
                self.sorts.insert(*s);
            }
            NumElement::Value(v) => self.insert_rational(v.clone()),
        }
    }

    /// Adds a widened numeric element.
    pub fn add_element(&mut self, e: &NumElement) {
        self.insert_element(e);
        self.normalize();
    }
}
