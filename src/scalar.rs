//! Exact scalar arithmetic over rationals, square roots, the imaginary unit
//! and free symbols.
//!
//! A `Scalar` is a finite sum `∑ cᵢ uᵢ` where each coefficient `cᵢ` is a
//! rational number and each unit `uᵢ` is a product `i^ε √r ∏ xₖ^eₖ` with
//! `ε ∈ {0, 1}`, `r` a square-free positive integer and `xₖ` free symbols.
//! Keeping the radicand square-free makes the representation canonical, so
//! structural equality is numeric equality.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use num::{BigInt, BigRational, Integer, One, Signed, Zero};
use serde::{Serialize, Serializer};
use super::isqrt::{split_square, split_square_u64};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit {
    /// Free symbols with their (positive) exponents.
    pub symbols: BTreeMap<String, u32>,
    /// Whether the imaginary unit is present.
    pub imag: bool,
    /// Square-free radicand.
    pub radicand: BigInt,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            symbols: Default::default(),
            imag: false,
            radicand: BigInt::one(),
        }
    }
}

impl Unit {
    pub fn is_trivial(&self) -> bool {
        self.symbols.is_empty() && !self.imag && self.radicand == BigInt::one()
    }

    /// Multiply two units.  The result is `factor × unit`.
    fn mul(&self, other: &Unit) -> (BigRational, Unit) {
        let g = self.radicand.gcd(&other.radicand);
        let radicand = (&self.radicand / &g) * (&other.radicand / &g);
        let mut factor = BigRational::from_integer(g);
        let imag = match (self.imag, other.imag) {
            (true, true) => {
                factor = -factor;
                false
            }
            (a, b) => a || b,
        };
        let mut symbols = self.symbols.clone();
        for (name, e) in &other.symbols {
            *symbols.entry(name.clone()).or_insert(0) += *e;
        }
        (factor, Unit { symbols, imag, radicand })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scalar(BTreeMap<Unit, BigRational>);

impl Scalar {
    pub fn from_integer(n: i64) -> Self {
        Self::from_rational(BigRational::from_integer(n.into()))
    }

    /// `n / d`.  Panics if `d` is zero.
    pub fn from_ratio(n: i64, d: i64) -> Self {
        Self::from_rational(BigRational::new(n.into(), d.into()))
    }

    pub fn from_rational(r: BigRational) -> Self {
        Self::from_surd(r, BigInt::one())
    }

    /// `c √r`.  The radicand must already be square-free and positive.
    pub fn from_surd(c: BigRational, radicand: BigInt) -> Self {
        debug_assert!(radicand.is_positive());
        let mut terms = BTreeMap::new();
        if !c.is_zero() {
            terms.insert(Unit { radicand, ..Default::default() }, c);
        }
        Scalar(terms)
    }

    /// `√n`
    pub fn sqrt(n: u64) -> Self {
        let (s, r) = split_square_u64(n);
        Self::from_surd(BigRational::from_integer(s.into()), r.into())
    }

    /// `√(n / d)`.  Panics if `d` is zero.
    pub fn sqrt_ratio(n: u64, d: u64) -> Self {
        assert!(d != 0, "division by zero");
        // √(n/d) = √(n d) / d
        let (s1, r1) = split_square_u64(n);
        let (s2, r2) = split_square_u64(d);
        Self::from_surd(
            BigRational::new(s1.into(), (s2 * r2).into()),
            BigInt::from(r1),
        ) * Self::sqrt(r2)
    }

    /// `√r` for a non-negative rational `r`.
    pub fn sqrt_rational(r: &BigRational) -> Self {
        debug_assert!(!r.is_negative());
        // √(n/d) = √(n d) / d
        let d = r.denom().clone();
        let (s, radicand) = split_square(&(r.numer() * &d));
        Self::from_surd(BigRational::new(s, d), radicand)
    }

    /// `(2 j + 1)^(e / 2)` for a non-negative doubled angular momentum `tj`.
    pub fn hat(tj: i32, e: i32) -> Self {
        debug_assert!(tj >= 0);
        let n = (tj + 1) as u64;
        let p = e.abs() as u32;
        if e >= 0 {
            Self::sqrt_ratio(n.pow(p), 1)
        } else {
            Self::sqrt_ratio(1, n.pow(p))
        }
    }

    pub fn symbol(name: &str) -> Self {
        let mut symbols = BTreeMap::new();
        symbols.insert(name.to_owned(), 1);
        let mut terms = BTreeMap::new();
        terms.insert(Unit { symbols, ..Default::default() }, BigRational::one());
        Scalar(terms)
    }

    /// The imaginary unit `i`.
    pub fn imag() -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(Unit { imag: true, ..Default::default() }, BigRational::one());
        Scalar(terms)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Unit, &BigRational)> {
        self.0.iter()
    }

    pub fn num_terms(&self) -> usize {
        self.0.len()
    }

    fn add_term(&mut self, unit: Unit, c: BigRational) {
        let remove = {
            let entry = self.0.entry(unit.clone()).or_insert_with(Zero::zero);
            *entry = &*entry + c;
            entry.is_zero()
        };
        if remove {
            self.0.remove(&unit);
        }
    }
}

impl Zero for Scalar {
    fn zero() -> Self {
        Scalar(Default::default())
    }
    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl One for Scalar {
    fn one() -> Self {
        Self::from_integer(1)
    }
}

impl<'a> Add<&'a Scalar> for Scalar {
    type Output = Scalar;
    fn add(mut self, other: &'a Scalar) -> Self::Output {
        for (u, c) in &other.0 {
            self.add_term(u.clone(), c.clone());
        }
        self
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, other: Scalar) -> Self::Output {
        self + &other
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, other: Scalar) -> Self::Output {
        self + &-other
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Self::Output {
        Scalar(self.0.into_iter().map(|(u, c)| (u, -c)).collect())
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn mul(self, other: &'b Scalar) -> Self::Output {
        let mut r = Scalar::zero();
        for (u1, c1) in &self.0 {
            for (u2, c2) in &other.0 {
                let (f, u) = u1.mul(u2);
                r.add_term(u, f * c1 * c2);
            }
        }
        r
    }
}

impl<'a> Mul<&'a Scalar> for Scalar {
    type Output = Scalar;
    fn mul(self, other: &'a Scalar) -> Self::Output {
        &self * other
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, other: Scalar) -> Self::Output {
        &self * &other
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter| {
            if first {
                first = false;
                Ok(())
            } else {
                write!(f, "*")
            }
        };
        if self.imag {
            sep(f)?;
            write!(f, "I")?;
        }
        if self.radicand != BigInt::one() {
            sep(f)?;
            write!(f, "sqrt({})", self.radicand)?;
        }
        for (name, &e) in &self.symbols {
            sep(f)?;
            if e == 1 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}**{}", name, e)?;
            }
        }
        Ok(())
    }
}

fn fmt_term(f: &mut fmt::Formatter, u: &Unit, c: &BigRational) -> fmt::Result {
    let n = c.numer().abs();
    let d = c.denom();
    if u.is_trivial() {
        write!(f, "{}", n)?;
    } else if n == BigInt::one() {
        write!(f, "{}", u)?;
    } else {
        write!(f, "{}*{}", n, u)?;
    }
    if *d != BigInt::one() {
        write!(f, "/{}", d)?;
    }
    Ok(())
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "0");
        }
        for (i, (u, c)) in self.0.iter().enumerate() {
            match (i, c.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            fmt_term(f, u, c)?;
        }
        Ok(())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radicals() {
        assert_eq!(Scalar::sqrt(3) * Scalar::sqrt(3), Scalar::from_integer(3));
        assert_eq!(Scalar::sqrt(12), Scalar::from_integer(2) * Scalar::sqrt(3));
        assert_eq!(Scalar::sqrt(6) * Scalar::sqrt(10),
                   Scalar::from_integer(2) * Scalar::sqrt(15));
        assert_eq!(Scalar::sqrt_ratio(1, 5) * Scalar::sqrt(5),
                   Scalar::from_integer(1));
        assert_eq!(Scalar::hat(4, 1), Scalar::sqrt(5));
        assert_eq!(Scalar::hat(4, -2), Scalar::from_ratio(1, 5));
        assert_eq!(Scalar::hat(1, 3), Scalar::from_integer(2) * Scalar::sqrt(2));
        let r = BigRational::new(5.into(), 252.into());
        assert_eq!(Scalar::sqrt_rational(&r), Scalar::sqrt_ratio(5, 252));
        assert_eq!(Scalar::sqrt_rational(&r).to_string(), "sqrt(35)/42");
        assert!(Scalar::sqrt_rational(&BigRational::zero()).is_zero());
    }

    #[test]
    fn test_sums() {
        let x = Scalar::sqrt(2) + Scalar::sqrt(3);
        assert_eq!(x.num_terms(), 2);
        let y = x.clone() - Scalar::sqrt(2);
        assert_eq!(y, Scalar::sqrt(3));
        assert!((x.clone() - x).is_zero());
        let g = Scalar::symbol("g");
        assert_eq!((g.clone() + Scalar::from_integer(1)).num_terms(), 2);
        assert_eq!(Scalar::from_ratio(2, 4), Scalar::from_ratio(1, 2));
        assert_eq!(g.clone() * Scalar::sqrt(2) - Scalar::sqrt(2) * g, Scalar::zero());
    }

    #[test]
    fn test_imag() {
        let i = Scalar::imag();
        assert_eq!(&i * &i, Scalar::from_integer(-1));
        let v = -(i * Scalar::sqrt(2));
        assert_eq!(&v * &v, Scalar::from_integer(-2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::sqrt(5).to_string(), "sqrt(5)");
        assert_eq!(Scalar::from_ratio(-1, 3).to_string(), "-1/3");
        assert_eq!((Scalar::from_ratio(-2, 3) * Scalar::sqrt(3)).to_string(),
                   "-2*sqrt(3)/3");
        assert_eq!((-(Scalar::imag() * Scalar::sqrt(2))).to_string(),
                   "-I*sqrt(2)");
        assert_eq!((Scalar::symbol("g") * Scalar::symbol("g")).to_string(),
                   "g**2");
        assert_eq!((Scalar::from_integer(1) - Scalar::sqrt(2)).to_string(),
                   "1 - sqrt(2)");
        assert_eq!(Scalar::zero().to_string(), "0");
    }
}
