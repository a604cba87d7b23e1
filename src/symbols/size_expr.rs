use std::fmt::{self, Display};

use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::{BaseSortKind, ConSymb, TypeAtom};

/// The cardinality of a generated sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeExpr {
    /// Unbounded.
    Infinity,
    /// A constant plus the sizes of the children.
    Sum(BigInt, Vec<SizeExpr>),
    /// The product of the children.
    Prod(Vec<SizeExpr>),
    /// The number of values of the named sort.
    Count(String),
}

impl SizeExpr {
    /// A constant size.
    pub fn constant<T: Into<BigInt>>(c: T) -> SizeExpr {
        SizeExpr::Sum(c.into(), Vec::new())
    }

    /// True if the expression is unbounded regardless of counts.
    pub fn is_infinite(&self) -> bool {
        match self {
            SizeExpr::Infinity => true,
            SizeExpr::Sum(_, kids) => kids.iter().any(SizeExpr::is_infinite),
            SizeExpr::Prod(kids) => kids.iter().any(SizeExpr::is_infinite),
            SizeExpr::Count(_) => false,
        }
    }

    /// Clones the expression, renaming every counted sort under the prefix `from` to live under `to`.
    pub fn clone_renamed(&self, from: &str, to: &str) -> SizeExpr {
        match self {
            SizeExpr::Infinity => SizeExpr::Infinity,
            SizeExpr::Sum(c, kids) => SizeExpr::Sum(
                c.clone(),
                kids.iter().map(|k| k.clone_renamed(from, to)).collect(),
            ),
            SizeExpr::Prod(kids) => {
                SizeExpr::Prod(kids.iter().map(|k| k.clone_renamed(from, to)).collect())
            }
            SizeExpr::Count(name) => SizeExpr::Count(rename(name, from, to)),
        }
    }

    /// Computes the size given the count of every named sort. `None` for unbounded or unknown sizes.
    pub fn evaluate(&self, count: &mut dyn FnMut(&str) -> Option<BigInt>) -> Option<BigInt> {
        match self {
            SizeExpr::Infinity => None,
            SizeExpr::Sum(c, kids) => {
                let mut total = c.clone();
                for k in kids.iter() {
                    total += k.evaluate(count)?;
                }
                Some(total)
            }
            SizeExpr::Prod(kids) => {
                let mut total = BigInt::one();
                for k in kids.iter() {
                    total *= k.evaluate(count)?;
                }
                Some(total)
            }
            SizeExpr::Count(name) => count(name),
        }
    }

    /// The size of the values a constructor can build from its declared field types.
    pub fn of_constructor(con: &ConSymb) -> SizeExpr {
        let fields = con.data().get_fields();
        if fields.is_empty() {
            return SizeExpr::constant(1);
        }

        let factors = fields
            .iter()
            .map(|f| {
                if f.is_any {
                    SizeExpr::Infinity
                } else {
                    size_of_atoms(&f.ty)
                }
            })
            .collect::<Vec<_>>();

        if factors.iter().any(SizeExpr::is_infinite) {
            SizeExpr::Infinity
        } else if factors.len() == 1 {
            factors.into_iter().next().unwrap_or(SizeExpr::Infinity)
        } else {
            SizeExpr::Prod(factors)
        }
    }
}

fn rename(name: &str, from: &str, to: &str) -> String {
    if name == from {
        to.to_owned()
    } else if let Some(rest) = name.strip_prefix(from).and_then(|r| r.strip_prefix('.')) {
        if to.is_empty() {
            rest.to_owned()
        } else {
            format!("{}.{}", to, rest)
        }
    } else {
        name.to_owned()
    }
}

fn size_of_atoms(atoms: &[TypeAtom]) -> SizeExpr {
    let mut constant = BigInt::zero();
    let mut counts = Vec::new();
    for a in atoms.iter() {
        match a {
            TypeAtom::Cnst(_) => constant += 1,
            TypeAtom::Range(lo, hi) => {
                if hi >= lo {
                    constant += hi - lo + 1;
                }
            }
            TypeAtom::Name(n) => {
                if BaseSortKind::from_name(n).is_some() {
                    return SizeExpr::Infinity;
                }
                counts.push(SizeExpr::Count(n.clone()));
            }
        }
    }
    SizeExpr::Sum(constant, counts)
}

impl Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeExpr::Infinity => f.write_str("infinity"),
            SizeExpr::Count(name) => write!(f, "count({{x | x is {}}})", name),
            SizeExpr::Sum(c, kids) => {
                if kids.is_empty() {
                    return write!(f, "{}", c);
                }
                let mut first = true;
                if !c.is_zero() {
                    write!(f, "{}", c)?;
                    first = false;
                }
                for k in kids.iter() {
                    if !first {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", k)?;
                    first = false;
                }
                Ok(())
            }
            SizeExpr::Prod(kids) => {
                for (i, k) in kids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    match k {
                        SizeExpr::Sum(_, sub) if !sub.is_empty() => write!(f, "({})", k)?,
                        _ => write!(f, "{}", k)?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Cnst, FieldDecl};
    use pretty_assertions::assert_eq;

    #[test]
    fn constructor_sizes() {
        let con = ConSymb::new(
            "Pair",
            vec![
                FieldDecl::new(vec![TypeAtom::Range(1.into(), 3.into())]),
                FieldDecl::new(vec![TypeAtom::name("Color"), TypeAtom::Cnst(Cnst::int(0))]),
            ],
            true,
        );
        let size = SizeExpr::of_constructor(&con);
        assert_eq!(size.to_string(), "3 * (1 + count({x | x is Color}))");
        assert_eq!(
            size.evaluate(&mut |n| if n == "Color" {
                Some(BigInt::from(2))
            } else {
                None
            }),
            Some(BigInt::from(9))
        );

        let unbounded = ConSymb::new(
            "Box",
            vec![FieldDecl::new(vec![TypeAtom::name("Integer")])],
            true,
        );
        assert!(SizeExpr::of_constructor(&unbounded).is_infinite());
    }

    #[test]
    fn renaming_moves_counted_sorts() {
        let e = SizeExpr::Prod(vec![
            SizeExpr::Count("M.Color".to_owned()),
            SizeExpr::Count("Other".to_owned()),
        ]);
        assert_eq!(
            e.clone_renamed("M", "N"),
            SizeExpr::Prod(vec![
                SizeExpr::Count("N.Color".to_owned()),
                SizeExpr::Count("Other".to_owned()),
            ])
        );
    }
}
