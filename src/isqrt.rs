//! Integer square roots and square-free splitting of integers.
use num::{BigInt, One, ToPrimitive, Zero};

/// Calculate the integer square root `⌊√n⌋`.
pub fn isqrt_u64(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    // use floating-point calculations to get an initial guess
    let mut r = (n as f64).sqrt() as u64;
    if r == 0 {
        r = 1;
    }
    // apply integer variant of Newton's method to refine guess
    loop { // [invariant] n > 0 && r > 0
        let r_new = (r + n / r) / 2;
        // either no change or a +1 increase means we have converged (the
        // latter avoids nonconverging cycles)
        if r == r_new || r == r_new - 1 {
            break;
        }
        r = r_new;
    }
    // the float guess may overshoot by one for huge n
    while r.checked_mul(r).map(|rr| rr > n).unwrap_or(true) {
        r -= 1;
    }
    r
}

/// Prime factorization `n = ∏ p^e` by trial division, in ascending order of
/// `p`.  Returns an empty list for `n ≤ 1`.
pub fn factorize_u64(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut p = 2;
    while p <= isqrt_u64(n) {
        let mut e = 0;
        while n % p == 0 {
            n /= p;
            e += 1;
        }
        if e > 0 {
            factors.push((p, e));
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Split `n` into `(s, r)` such that `n = s² r` with `r` square-free.
pub fn split_square_u64(n: u64) -> (u64, u64) {
    if n == 0 {
        return (0, 1);
    }
    let mut s = 1;
    let mut r = 1;
    for (p, e) in factorize_u64(n) {
        s *= p.pow(e / 2);
        if e % 2 == 1 {
            r *= p;
        }
    }
    (s, r)
}

/// Split `n ≥ 0` into `(s, r)` such that `n = s² r` with `r` square-free.
pub fn split_square(n: &BigInt) -> (BigInt, BigInt) {
    if let Some(n) = n.to_u64() {
        let (s, r) = split_square_u64(n);
        return (s.into(), r.into());
    }
    let mut n = n.clone();
    let mut s = BigInt::one();
    let mut r = BigInt::one();
    let mut p = BigInt::from(2);
    while &p * &p <= n {
        let mut e = 0;
        while (&n % &p).is_zero() {
            n = &n / &p;
            e += 1;
        }
        s = s * num::pow(p.clone(), e / 2);
        if e % 2 == 1 {
            r = r * &p;
        }
        p = if p == BigInt::from(2) { p + BigInt::one() } else { p + BigInt::from(2) };
    }
    if n > BigInt::one() {
        r = r * n;
    }
    (s, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isqrt() {
        for n in 0 .. 65535 {
            let r = isqrt_u64(n);
            assert!(r * r <= n, "⌊√{n}⌋^2 ≤ {n}", n = n);
            assert!((r + 1) * (r + 1) > n, "(⌊√{n}⌋ + 1)^2 > {n}", n = n);
        }
        for r in 4294967000 .. 4294967296 {
            assert_eq!(isqrt_u64(r * r), r, "⌊√{}⌋ == {}", r * r, r);
            assert_eq!(isqrt_u64(r * r - 1), r - 1);
        }
        assert_eq!(isqrt_u64(u64::max_value()), 0xffffffff);
    }

    #[test]
    fn test_split_square() {
        assert_eq!(split_square_u64(1), (1, 1));
        assert_eq!(split_square_u64(12), (2, 3));
        assert_eq!(split_square_u64(45), (3, 5));
        assert_eq!(split_square_u64(30), (1, 30));
        assert_eq!(split_square_u64(3600), (60, 1));
        assert_eq!(factorize_u64(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factorize_u64(97), vec![(97, 1)]);
        // beyond u64: 2^70 · 3 · 7^2
        let n = num::pow(BigInt::from(2), 70) * BigInt::from(3 * 49);
        let (s, r) = split_square(&n);
        assert_eq!(s, num::pow(BigInt::from(2), 35) * BigInt::from(7));
        assert_eq!(r, BigInt::from(3));
        assert_eq!(split_square(&BigInt::from(72)), (BigInt::from(6), BigInt::from(2)));
    }
}
