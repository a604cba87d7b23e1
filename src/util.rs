use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// The Euclidean quotient `q` with `x = q * y + r` and `0 <= r < |y|`. `None` when `y` is zero.
pub fn euclidean_quotient(x: &BigRational, y: &BigRational) -> Option<BigRational> {
    if y.is_zero() {
        return None;
    }
    let exact = x / y;
    Some(if y.is_positive() {
        exact.floor()
    } else {
        exact.ceil()
    })
}

/// The Euclidean remainder, always in `[0, |y|)`. `None` when `y` is zero.
pub fn euclidean_remainder(x: &BigRational, y: &BigRational) -> Option<BigRational> {
    let q = euclidean_quotient(x, y)?;
    Some(x - q * y)
}

/// The integer value of an integral rational.
pub fn as_integer(r: &BigRational) -> Option<BigInt> {
    if r.is_integer() {
        Some(r.to_integer())
    } else {
        None
    }
}

/// A natural rational as a position.
pub fn as_index(r: &BigRational) -> Option<usize> {
    as_integer(r)?.to_usize()
}

/// Wraps a count.
pub fn from_usize(n: usize) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// The non-negative greatest common divisor of two integers.
pub fn rational_gcd(a: &BigRational, b: &BigRational) -> Option<BigRational> {
    Some(BigRational::from_integer(
        as_integer(a)?.gcd(&as_integer(b)?),
    ))
}

/// The non-negative least common multiple of two integers.
pub fn rational_lcm(a: &BigRational, b: &BigRational) -> Option<BigRational> {
    Some(BigRational::from_integer(
        as_integer(a)?.lcm(&as_integer(b)?),
    ))
}

/// Parses an unsigned decimal numeral.
pub fn parse_natural(s: &str) -> Option<BigInt> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigInt::parse_bytes(s.as_bytes(), 10)
}

/// `-1`, `0` or `1`.
pub fn sign_of(r: &BigRational) -> i32 {
    match r.numer().sign() {
        Sign::Minus => -1,
        Sign::NoSign => 0,
        Sign::Plus => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(v: i64) -> BigRational {
        BigRational::from_integer(v.into())
    }

    #[test]
    fn euclidean_division() {
        for (x, y, q, r) in [(7, 2, 3, 1), (-7, 2, -4, 1), (7, -2, -3, 1), (-7, -2, 4, 1)].iter() {
            assert_eq!(euclidean_quotient(&int(*x), &int(*y)), Some(int(*q)));
            assert_eq!(euclidean_remainder(&int(*x), &int(*y)), Some(int(*r)));
        }
        assert_eq!(euclidean_quotient(&int(1), &int(0)), None);
        assert_eq!(euclidean_remainder(&int(1), &int(0)), None);
    }

    #[test]
    fn gcd_of_integers_only() {
        assert_eq!(rational_gcd(&int(-12), &int(18)), Some(int(6)));
        assert_eq!(rational_lcm(&int(4), &int(6)), Some(int(12)));
        assert_eq!(rational_gcd(&int(0), &int(0)), Some(int(0)));
        assert_eq!(
            rational_gcd(&BigRational::new(1.into(), 2.into()), &int(2)),
            None
        );
    }

    #[test]
    fn naturals_parse() {
        assert_eq!(parse_natural("0042"), Some(BigInt::from(42)));
        assert_eq!(parse_natural("-1"), None);
        assert_eq!(parse_natural(""), None);
        assert_eq!(parse_natural("1.5"), None);
    }
}
