//! # Term Algebra and Galois Type Approximation for a Constraint-Logic Language

#![warn(missing_docs)]

/// Diagnostics reported while declaring symbols and checking applications.
pub mod diagnostics;
pub mod operators;
pub mod plugins;
/// Symbols, namespaces and the symbol table.
pub mod symbols;
/// Hash-consed terms and the type lattice over them.
pub mod terms;

#[cfg(test)]
pub(crate) mod test_utils;

/// Rational arithmetic helpers.
pub mod util;
