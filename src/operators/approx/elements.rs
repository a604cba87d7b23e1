use itertools::Itertools;
use num_bigint::BigInt;

use crate::operators::{Bindable, EvalContext, OpKind, Operator};
use crate::symbols::BaseSortKind;
use crate::terms::type_set::{NumElement, StrElement, TypeSet, NUM_WIDENING_WIDTH};
use crate::terms::{Term, TermIndex};

/// The widened numeric elements of a type.
pub fn numeric_elements(index: &TermIndex, t: &Term) -> Vec<NumElement> {
    index.type_set(t).numeric_elements()
}

/// The widened string elements of a type. Empty if the type has no strings.
pub fn string_elements(index: &TermIndex, t: &Term) -> Vec<StrElement> {
    let set = index.type_set(t);
    if set.has_string() {
        set.string_elements()
    } else {
        Vec::new()
    }
}

/// Accumulates point results into a single canonical type.
pub struct Collector<'a> {
    index: &'a TermIndex,
    set: TypeSet,
}

impl<'a> Collector<'a> {
    /// An empty accumulator.
    pub fn new(index: &'a TermIndex) -> Collector<'a> {
        Collector {
            index,
            set: TypeSet::new(),
        }
    }

    /// Adds every member of a set.
    pub fn add_set(&mut self, set: &TypeSet) {
        self.set.union_with(set);
    }

    /// Adds a base sort.
    pub fn add_sort(&mut self, kind: BaseSortKind) {
        self.set.add_sort(kind);
    }

    /// Adds a numeric element.
    pub fn add_element(&mut self, e: &NumElement) {
        self.set.add_element(e);
    }

    /// Adds a string element.
    pub fn add_string(&mut self, e: &StrElement) {
        match e {
            StrElement::Sort => self.set.add_sort(BaseSortKind::String),
            StrElement::Value(s) => self.set.add_string(s),
        }
    }

    /// Adds every member of a type term.
    pub fn add_type(&mut self, t: &Term) {
        let set = self.index.type_set(t);
        self.set.union_with(&set);
    }

    /// True if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The collected type, `None` if nothing was collected.
    pub fn finish(self) -> Option<Term> {
        self.index.mk_type(&self.set)
    }
}

/// The members of a type if there are fewer than [NUM_WIDENING_WIDTH] of them and all are values.
pub fn enumerate(index: &TermIndex, t: &Term) -> Option<Vec<Term>> {
    let set = index.type_set(t);
    if set.finite_size()? >= BigInt::from(NUM_WIDENING_WIDTH) {
        return None;
    }
    let mut res = Vec::new();
    for e in set.numeric_elements().into_iter() {
        match e {
            NumElement::Value(v) => res.push(index.mk_numeric(v)),
            NumElement::Sort(_) => return None,
        }
    }
    res.extend(set.get_strings().iter().map(|s| index.mk_string(s)));
    res.extend(set.get_data().iter().cloned());
    Some(res)
}

/// Enumerates every tuple of argument values, `None` if some argument is not enumerable or there are too
/// many tuples.
pub fn enumerate_tuples(index: &TermIndex, args: &[Term]) -> Option<Vec<Vec<Term>>> {
    let columns = args
        .iter()
        .map(|a| enumerate(index, a))
        .collect::<Option<Vec<_>>>()?;
    let mut total = 1usize;
    for c in columns.iter() {
        total = total.saturating_mul(c.len());
    }
    if total >= NUM_WIDENING_WIDTH {
        return None;
    }
    Some(
        columns
            .into_iter()
            .multi_cartesian_product()
            .collect(),
    )
}

/// Evaluates `kind` on every tuple of argument values and unions the results. Falls back to `fallback`
/// when the arguments cannot be enumerated.
pub fn enumerate_up(
    kind: OpKind,
    index: &TermIndex,
    args: &[Term],
    fallback: Option<Term>,
) -> Option<Term> {
    let tuples = match enumerate_tuples(index, args) {
        Some(t) => t,
        None => {
            log::debug!("{} falls back to its return type", kind);
            return fallback;
        }
    };
    // a nullary cartesian product yields no tuples
    let tuples = if args.is_empty() { vec![Vec::new()] } else { tuples };

    let mut collector = Collector::new(index);
    let mut ctx = EvalContext::new(index);
    for tuple in tuples.into_iter() {
        let bound = tuple.into_iter().map(Bindable::Value).collect::<Vec<_>>();
        if let Some(r) = kind.evaluate(&mut ctx, &bound) {
            collector.add_type(&r);
        }
    }
    collector.finish()
}
