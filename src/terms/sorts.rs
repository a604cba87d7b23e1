use std::cmp::Ordering;

use alga::general::{JoinSemilattice, Lattice, MeetSemilattice};

use crate::symbols::BaseSortKind;

/// The base sorts closed under join and meet.
///
/// ```text
///              Any
///            /     \
///         Real    String
///          |        |
///       Integer     |
///       /     \     |
///   Natural    |    |
///      |       |    |
/// PosInteger NegInteger
///        \     |    /
///          Empty
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortElement {
    /// No values.
    Empty,
    /// Integers above zero.
    PosInteger,
    /// Integers below zero.
    NegInteger,
    /// Integers from zero.
    Natural,
    /// All integers.
    Integer,
    /// All rationals.
    Real,
    /// All strings.
    String,
    /// Numbers and strings.
    Any,
}

impl From<BaseSortKind> for SortElement {
    fn from(k: BaseSortKind) -> Self {
        match k {
            BaseSortKind::Natural => SortElement::Natural,
            BaseSortKind::PosInteger => SortElement::PosInteger,
            BaseSortKind::NegInteger => SortElement::NegInteger,
            BaseSortKind::Integer => SortElement::Integer,
            BaseSortKind::Real => SortElement::Real,
            BaseSortKind::String => SortElement::String,
        }
    }
}

impl SortElement {
    /// The base sort this element stands for, if any.
    pub fn to_base_sort(self) -> Option<BaseSortKind> {
        match self {
            SortElement::Natural => Some(BaseSortKind::Natural),
            SortElement::PosInteger => Some(BaseSortKind::PosInteger),
            SortElement::NegInteger => Some(BaseSortKind::NegInteger),
            SortElement::Integer => Some(BaseSortKind::Integer),
            SortElement::Real => Some(BaseSortKind::Real),
            SortElement::String => Some(BaseSortKind::String),
            SortElement::Empty | SortElement::Any => None,
        }
    }

    fn strictly_above(self) -> &'static [SortElement] {
        match self {
            SortElement::Empty => &[
                SortElement::PosInteger,
                SortElement::NegInteger,
                SortElement::Natural,
                SortElement::Integer,
                SortElement::Real,
                SortElement::String,
                SortElement::Any,
            ],
            SortElement::PosInteger => &[
                SortElement::Natural,
                SortElement::Integer,
                SortElement::Real,
                SortElement::Any,
            ],
            SortElement::NegInteger | SortElement::Natural => {
                &[SortElement::Integer, SortElement::Real, SortElement::Any]
            }
            SortElement::Integer => &[SortElement::Real, SortElement::Any],
            SortElement::Real | SortElement::String => &[SortElement::Any],
            SortElement::Any => &[],
        }
    }

    fn is_below(self, other: SortElement) -> bool {
        self == other || self.strictly_above().contains(&other)
    }
}

impl PartialOrd for SortElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_below(*other) {
            Some(Ordering::Less)
        } else if other.is_below(*self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl JoinSemilattice for SortElement {
    fn join(&self, other: &Self) -> Self {
        if self.is_below(*other) {
            return *other;
        }
        if other.is_below(*self) {
            return *self;
        }
        // Every upper set is a chain, so the first common bound is the least one.
        *self
            .strictly_above()
            .iter()
            .find(|x| other.is_below(**x))
            .unwrap_or(&SortElement::Any)
    }
}

impl MeetSemilattice for SortElement {
    fn meet(&self, other: &Self) -> Self {
        if self.is_below(*other) {
            return *self;
        }
        if other.is_below(*self) {
            return *other;
        }
        // Incomparable sorts are disjoint.
        SortElement::Empty
    }
}

impl Lattice for SortElement {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins() {
        assert_eq!(
            SortElement::PosInteger.join(&SortElement::NegInteger),
            SortElement::Integer
        );
        assert_eq!(
            SortElement::Natural.join(&SortElement::PosInteger),
            SortElement::Natural
        );
        assert_eq!(
            SortElement::String.join(&SortElement::Natural),
            SortElement::Any
        );
        assert_eq!(
            SortElement::Real.join(&SortElement::NegInteger),
            SortElement::Real
        );
    }

    #[test]
    fn meets() {
        assert_eq!(
            SortElement::Natural.meet(&SortElement::NegInteger),
            SortElement::Empty
        );
        assert_eq!(
            SortElement::Integer.meet(&SortElement::Natural),
            SortElement::Natural
        );
        assert_eq!(
            SortElement::String.meet(&SortElement::Real),
            SortElement::Empty
        );
        assert_eq!(
            SortElement::PosInteger.meet(&SortElement::Natural),
            SortElement::PosInteger
        );
    }

    #[test]
    fn order() {
        assert!(SortElement::PosInteger < SortElement::Real);
        assert_eq!(
            SortElement::String.partial_cmp(&SortElement::Integer),
            None
        );
    }
}
