use num_rational::BigRational;
use num_traits::{pow, Signed, ToPrimitive, Zero};

use crate::symbols::BaseSortKind;
use crate::util::as_integer;

use super::loader::PluginCatalog;
use super::OperatorPlugin;

/// Largest exponent magnitude `pow` accepts.
pub const MAX_EXPONENT: usize = 4096;

/// Absolute value.
pub struct Abs;

impl OperatorPlugin for Abs {
    fn name(&self) -> &str {
        "abs"
    }

    fn arg_sorts(&self) -> &[BaseSortKind] {
        &[BaseSortKind::Real]
    }

    fn return_sort(&self) -> BaseSortKind {
        BaseSortKind::Real
    }

    fn evaluate(&self, args: &[BigRational]) -> Option<BigRational> {
        Some(args.first()?.abs())
    }
}

/// Largest integer not above the argument.
pub struct Floor;

impl OperatorPlugin for Floor {
    fn name(&self) -> &str {
        "floor"
    }

    fn arg_sorts(&self) -> &[BaseSortKind] {
        &[BaseSortKind::Real]
    }

    fn return_sort(&self) -> BaseSortKind {
        BaseSortKind::Integer
    }

    fn evaluate(&self, args: &[BigRational]) -> Option<BigRational> {
        Some(args.first()?.floor())
    }
}

/// Smallest integer not below the argument.
pub struct Ceiling;

impl OperatorPlugin for Ceiling {
    fn name(&self) -> &str {
        "ceiling"
    }

    fn arg_sorts(&self) -> &[BaseSortKind] {
        &[BaseSortKind::Real]
    }

    fn return_sort(&self) -> BaseSortKind {
        BaseSortKind::Integer
    }

    fn evaluate(&self, args: &[BigRational]) -> Option<BigRational> {
        Some(args.first()?.ceil())
    }
}

/// A rational raised to an integer power.
pub struct Pow;

impl OperatorPlugin for Pow {
    fn name(&self) -> &str {
        "pow"
    }

    fn arg_sorts(&self) -> &[BaseSortKind] {
        &[BaseSortKind::Real, BaseSortKind::Integer]
    }

    fn return_sort(&self) -> BaseSortKind {
        BaseSortKind::Real
    }

    fn evaluate(&self, args: &[BigRational]) -> Option<BigRational> {
        let base = args.get(0)?;
        let exp = as_integer(args.get(1)?)?;
        let magnitude = exp.abs().to_usize().filter(|m| *m <= MAX_EXPONENT)?;
        let res = pow(base.clone(), magnitude);
        if exp.is_negative() {
            if res.is_zero() {
                None
            } else {
                Some(res.recip())
            }
        } else {
            Some(res)
        }
    }
}

/// The catalog of stock plugins.
pub fn catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with("abs", || -> Box<dyn OperatorPlugin> { Box::new(Abs) })
        .with("floor", || -> Box<dyn OperatorPlugin> { Box::new(Floor) })
        .with("ceiling", || -> Box<dyn OperatorPlugin> { Box::new(Ceiling) })
        .with("pow", || -> Box<dyn OperatorPlugin> { Box::new(Pow) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn rounding() {
        assert_eq!(Floor.evaluate(&[q(-3, 2)]), Some(q(-2, 1)));
        assert_eq!(Ceiling.evaluate(&[q(-3, 2)]), Some(q(-1, 1)));
        assert_eq!(Abs.evaluate(&[q(-3, 2)]), Some(q(3, 2)));
    }

    #[test]
    fn powers() {
        assert_eq!(Pow.evaluate(&[q(2, 1), q(10, 1)]), Some(q(1024, 1)));
        assert_eq!(Pow.evaluate(&[q(2, 1), q(-2, 1)]), Some(q(1, 4)));
        assert_eq!(Pow.evaluate(&[q(0, 1), q(-1, 1)]), None);
        assert_eq!(Pow.evaluate(&[q(2, 1), q(1, 2)]), None);
        assert_eq!(Pow.evaluate(&[q(1, 1), q(5000, 1)]), None);
        assert_eq!(Pow.evaluate(&[q(3, 1), q(0, 1)]), Some(q(1, 1)));
    }

    #[test]
    fn catalog_names() {
        let names = catalog().names().map(str::to_owned).collect::<Vec<_>>();
        assert_eq!(names, vec!["abs", "ceiling", "floor", "pow"]);
    }
}
