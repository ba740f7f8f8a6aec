//! Angular momentum coupling.
use std::cell::RefCell;
use fnv::FnvHashMap;
use num::{BigRational, One, Signed, Zero};
use wigner_symbols::{SignedSqrt, Wigner6j, Wigner9j};
use super::half::Half;
use super::scalar::Scalar;

/// Returns `(-1)^φ`
#[inline]
pub fn phase(phi: i32) -> Scalar {
    if phi % 2 == 0 {
        Scalar::one()
    } else {
        -Scalar::one()
    }
}

/// Returns `(2 * j + 1)^(e / 2)`.
#[inline]
pub fn jweight(j: Half<i32>, e: i32) -> Scalar {
    Scalar::hat(j.twice(), e)
}

/// Exact evaluator of recoupling coefficients.  Arguments are doubled
/// angular momenta.  Symbols that violate a triangular condition vanish.
pub trait Wigner {
    /// `{j1 j2 j3; j4 j5 j6}`
    fn wigner_6j(&self, tj: [i32; 6]) -> Scalar;

    /// `{j1 j2 j3; j4 j5 j6; j7 j8 j9}`
    fn wigner_9j(&self, tj: [i32; 9]) -> Scalar;
}

/// Memoizing evaluator backed by `wigner-symbols`.  Results are converted
/// into exact scalars and cached per argument tuple.
#[derive(Debug, Default)]
pub struct WignerCtx {
    w6j: RefCell<FnvHashMap<[i32; 6], Scalar>>,
    w9j: RefCell<FnvHashMap<[i32; 9], Scalar>>,
}

impl Wigner for WignerCtx {
    fn wigner_6j(&self, tj: [i32; 6]) -> Scalar {
        if let Some(w) = self.w6j.borrow().get(&tj) {
            return w.clone();
        }
        let [tj1, tj2, tj3, tj4, tj5, tj6] = tj;
        let triads = [[tj1, tj2, tj3], [tj1, tj5, tj6], [tj4, tj2, tj6], [tj4, tj5, tj3]];
        let w = if triads.iter().all(|t| triangle(*t)) {
            from_signed_sqrt(Wigner6j { tj1, tj2, tj3, tj4, tj5, tj6 }.value())
        } else {
            Scalar::zero()
        };
        self.w6j.borrow_mut().insert(tj, w.clone());
        w
    }

    fn wigner_9j(&self, tj: [i32; 9]) -> Scalar {
        if let Some(w) = self.w9j.borrow().get(&tj) {
            return w.clone();
        }
        let [tj1, tj2, tj3, tj4, tj5, tj6, tj7, tj8, tj9] = tj;
        let triads = [
            [tj1, tj2, tj3], [tj4, tj5, tj6], [tj7, tj8, tj9],
            [tj1, tj4, tj7], [tj2, tj5, tj8], [tj3, tj6, tj9],
        ];
        let w = if triads.iter().all(|t| triangle(*t)) {
            from_signed_sqrt(Wigner9j {
                tj1, tj2, tj3, tj4, tj5, tj6, tj7, tj8, tj9,
            }.value())
        } else {
            Scalar::zero()
        };
        self.w9j.borrow_mut().insert(tj, w.clone());
        w
    }
}

fn triangle([a, b, c]: [i32; 3]) -> bool {
    Half::triangle(Half(a), Half(b), Half(c))
}

/// `sign(x) √|x|` as an exact scalar.
fn from_signed_sqrt(w: SignedSqrt) -> Scalar {
    let sq: BigRational = w.signed_sq().to_string().parse()
        .expect("GMP rationals always print as n/d");
    if sq.is_negative() {
        -Scalar::sqrt_rational(&-sq)
    } else {
        Scalar::sqrt_rational(&sq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_6j() {
        let ctx = WignerCtx::default();
        assert_eq!(ctx.wigner_6j([2, 2, 4, 2, 2, 4]), Scalar::from_ratio(1, 30));
        assert_eq!(ctx.wigner_6j([2, 2, 4, 2, 2, 0]), Scalar::from_ratio(1, 3));
        assert_eq!(ctx.wigner_6j([1, 1, 2, 1, 1, 0]), Scalar::from_ratio(1, 2));
        assert_eq!(ctx.wigner_6j([1, 1, 2, 1, 1, 2]), Scalar::from_ratio(1, 6));
        assert_eq!(ctx.wigner_6j([4, 4, 4, 4, 4, 4]), Scalar::from_ratio(-3, 70));
        assert_eq!(ctx.wigner_6j([3, 2, 1, 1, 2, 3]),
                   Scalar::from_ratio(1, 12) * Scalar::sqrt(10));
        // triangle violations
        assert!(ctx.wigner_6j([2, 2, 6, 2, 2, 0]).is_zero());
        assert!(ctx.wigner_6j([1, 2, 2, 2, 2, 2]).is_zero());
        // cached value is the same
        assert_eq!(ctx.wigner_6j([2, 2, 4, 2, 2, 4]), Scalar::from_ratio(1, 30));
    }

    #[test]
    fn test_6j_symmetry() {
        let ctx = WignerCtx::default();
        let [a, b, c, d, e, f] = [3, 2, 1, 1, 2, 3];
        let w = ctx.wigner_6j([a, b, c, d, e, f]);
        assert_eq!(ctx.wigner_6j([b, a, c, e, d, f]), w);
        assert_eq!(ctx.wigner_6j([a, e, f, d, b, c]), w);
        assert_eq!(ctx.wigner_6j([c, a, b, f, d, e]), w);
    }

    #[test]
    fn test_9j() {
        let ctx = WignerCtx::default();
        assert_eq!(ctx.wigner_9j([2, 2, 0, 2, 2, 0, 4, 4, 0]),
                   Scalar::from_ratio(1, 15) * Scalar::sqrt(5));
        assert_eq!(ctx.wigner_9j([1, 1, 2, 1, 1, 2, 2, 2, 4]),
                   Scalar::from_ratio(1, 9));
        assert_eq!(ctx.wigner_9j([1, 1, 0, 1, 1, 0, 2, 2, 0]),
                   Scalar::from_ratio(1, 6) * Scalar::sqrt(3));
        assert!(ctx.wigner_9j([2, 2, 2, 2, 2, 2, 2, 2, 2]).is_zero());
        assert_eq!(ctx.wigner_9j([2, 2, 4, 2, 2, 4, 4, 4, 4]),
                   Scalar::from_ratio(-1, 150));
    }

    #[test]
    fn test_weights() {
        assert_eq!(phase(3), Scalar::from_integer(-1));
        assert_eq!(jweight(Half(4), 1), Scalar::sqrt(5));
        assert_eq!(jweight(Half(1), -2), Scalar::from_ratio(1, 2));
    }
}
