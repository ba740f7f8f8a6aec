//! Recoupling of operator trees.
//!
//! An operator tree is rewritten into a target coupling scheme, a binary
//! tree over subspaces, by splitting every node into a part acting in the
//! left half of the scheme and a part acting in the right half.  Each split
//! is a finite sum over intermediate ranks weighted by 6j or 9j symbols:
//!
//! ```text
//! [[A × B]^ab × C]^K  = ∑[bc] (−1)^(a+b+c+K) [ab] [bc] {a b ab; c K bc}
//!                             [A × [B × C]^bc]^K
//! [[A × B]^ab × C]^K  = ∑[ac] (−1)^(b+c+ab+ac) [ab] [ac] {b a ab; c K ac}
//!                             [[A × C]^ac × B]^K
//! [A × [B × C]^bc]^K  = ∑[y] (−1)^(a+b+bc+y) [bc] [y] {a c y; b K bc}
//!                             [B × [A × C]^y]^K
//! [[A × B]^ab × [C × D]^cd]^K
//!                     = ∑[x y] [ab] [cd] [x] [y] {a b ab; c d cd; x y K}
//!                             [[A × C]^x × [B × D]^y]^K
//! ```
//!
//! where `[x] = √(2 x + 1)`.  Operators are only ever reordered across
//! different subspaces.
use std::collections::BTreeSet;
use std::fmt;
use num::One;
use super::ang_mom::{jweight, phase, Wigner, WignerCtx};
use super::error::{Error, Result};
use super::half::Half;
use super::scalar::Scalar;
use super::space::{Registry, Scheme, Space};
use super::tensor::{Expr, Tensor};

/// Configuration for recoupling.
#[derive(Clone, Copy, Debug)]
pub struct Conf {
    /// Report progress on stdout.
    pub verbose: bool,
}

/// `{ verbose: false }`
impl Default for Conf {
    fn default() -> Self {
        Self {
            verbose: false,
        }
    }
}

/// Bring `expr` into canonical form: at every node that spans several
/// subspaces, the left child acts only in subspaces that precede, in
/// registry order, all of those of the right child.  Trees that already
/// satisfy this are returned untouched; other nodes are rewritten into
/// `{{{T_a × T_b} × T_c} × …}`.
pub fn recouple(registry: &Registry, expr: &Expr) -> Result<Expr> {
    Recoupler::new(registry, &WignerCtx::default()).recouple(expr)
}

/// Rewrite `expr` into the coupling scheme `scheme`.
pub fn recouple_to(
    registry: &Registry,
    expr: &Expr,
    scheme: &Scheme,
) -> Result<Expr> {
    Recoupler::new(registry, &WignerCtx::default()).recouple_to(expr, scheme)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Both,
}

fn side(t: &Tensor, left: &BTreeSet<Space>) -> Side {
    let span = t.span();
    if span.is_subset(left) {
        Side::Left
    } else if span.is_disjoint(left) {
        Side::Right
    } else {
        Side::Both
    }
}

/// Every subspace of `x` comes before every subspace of `y`.
fn precedes(x: &BTreeSet<Space>, y: &BTreeSet<Space>) -> bool {
    match (x.iter().next_back(), y.iter().next()) {
        (Some(p), Some(q)) => p < q,
        _ => false,
    }
}

fn parts(t: &Tensor) -> (&Tensor, &Tensor, Half<i32>) {
    match *t {
        Tensor::Composite { ref left, ref right, rank } => (left, right, rank),
        Tensor::Leaf { .. } => unreachable!("a leaf acts in a single subspace"),
    }
}

/// `(−1)^j` for integral `j`.
fn sign(j: Half<i32>) -> Scalar {
    phase(j.twice() / 2)
}

fn hat(j: Half<i32>) -> Scalar {
    jweight(j, 1)
}

fn couple(a: &Tensor, b: &Tensor, k: Half<i32>) -> Result<Tensor> {
    Tensor::couple_half(a.clone(), b.clone(), k)
}

pub struct Recoupler<'a, W: 'a> {
    pub conf: Conf,
    registry: &'a Registry,
    wigner: &'a W,
}

impl<'a, W: Wigner> Recoupler<'a, W> {
    pub fn new(registry: &'a Registry, wigner: &'a W) -> Self {
        Self {
            conf: Default::default(),
            registry,
            wigner,
        }
    }

    pub fn with_conf(mut self, conf: Conf) -> Self {
        self.conf = conf;
        self
    }

    pub fn recouple(&self, expr: &Expr) -> Result<Expr> {
        if self.conf.verbose {
            println!("recouple:");
        }
        let mut out = Expr::new();
        for (i, (c, t)) in expr.terms().iter().enumerate() {
            self.check(t)?;
            let r = self.canonical(t)?.scale(c);
            self.report(i, "canonical", &r);
            out = out + r;
        }
        Ok(out)
    }

    pub fn recouple_to(&self, expr: &Expr, scheme: &Scheme) -> Result<Expr> {
        if self.conf.verbose {
            println!("recouple_to:");
        }
        let covered = scheme.span();
        for s in &covered {
            self.registry.check(s)?;
        }
        let mut out = Expr::new();
        for (i, (c, t)) in expr.terms().iter().enumerate() {
            self.check(t)?;
            if let Some(s) = t.span().difference(&covered).next() {
                return Err(Error::ShapeMismatch {
                    reason: format!("{} is not part of the scheme {}", s, scheme),
                });
            }
            let r = self.shape(t, scheme)?.scale(c);
            self.report(i, scheme, &r);
            out = out + r;
        }
        Ok(out)
    }

    fn report<S: fmt::Display>(&self, term: usize, scheme: S, r: &Expr) {
        if self.conf.verbose {
            println!("- {{term: {}, scheme: '{}', terms_out: {}}}",
                     term, scheme, r.len());
        }
    }

    fn check(&self, t: &Tensor) -> Result<()> {
        for s in &t.span() {
            self.registry.check(s)?;
        }
        Ok(())
    }

    fn w6j(&self, j: [Half<i32>; 6]) -> Scalar {
        self.wigner.wigner_6j([j[0].0, j[1].0, j[2].0, j[3].0, j[4].0, j[5].0])
    }

    fn w9j(&self, j: [Half<i32>; 9]) -> Scalar {
        self.wigner.wigner_9j([
            j[0].0, j[1].0, j[2].0,
            j[3].0, j[4].0, j[5].0,
            j[6].0, j[7].0, j[8].0,
        ])
    }

    fn canonical(&self, t: &Tensor) -> Result<Expr> {
        let span = t.span();
        let (a, b, k) = match *t {
            Tensor::Composite { ref left, ref right, rank } if span.len() > 1 => {
                (left, right, rank)
            }
            _ => return Ok(Expr::from(t.clone())),
        };
        let (sa, sb) = (a.span(), b.span());
        let eb = self.canonical(b)?;
        let mut out = Expr::new();
        for (ca, a) in self.canonical(a)?.terms() {
            for (cb, b) in eb.terms() {
                let t = couple(a, b, k)?;
                let r = if precedes(&sa, &sb) {
                    Expr::from(t)
                } else if precedes(&sb, &sa) {
                    let mut r = Expr::new();
                    if let Some((c, t)) = t.commute() {
                        r.push(c, t);
                    }
                    r
                } else {
                    match Scheme::left_nested(span.iter().cloned()) {
                        Some(scheme) => self.shape(&t, &scheme)?,
                        None => Expr::from(t),
                    }
                };
                out = out + r.scale(&(ca * cb));
            }
        }
        Ok(out)
    }

    /// Rewrite `t` to follow `scheme` restricted to the span of `t`.
    fn shape(&self, t: &Tensor, scheme: &Scheme) -> Result<Expr> {
        let (sl, sr) = match scheme.restrict(&t.span()) {
            Some(Scheme::Pair(sl, sr)) => (sl, sr),
            _ => return Ok(Expr::from(t.clone())),
        };
        let (left, right) = (sl.span(), sr.span());
        let mut out = Expr::new();
        for (c, t) in self.split(t, &left, &right)?.terms() {
            let (x, y, k) = parts(t);
            let x = self.shape(x, &sl)?;
            let y = self.shape(y, &sr)?;
            out = out + x.couple_half(&y, k)?.scale(c);
        }
        Ok(out)
    }

    /// Rewrite `t` as `∑ c [X × Y]^K` with `X` acting in `left` and `Y`
    /// acting in `right`.
    fn split(
        &self,
        t: &Tensor,
        left: &BTreeSet<Space>,
        right: &BTreeSet<Space>,
    ) -> Result<Expr> {
        let (a, b, k) = parts(t);
        let mut out = Expr::new();
        match (side(a, left), side(b, left)) {
            (Side::Left, Side::Right) => out.push(Scalar::one(), t.clone()),
            (Side::Right, Side::Left) => {
                if let Some((c, t)) = t.commute() {
                    out.push(c, t);
                }
            }
            (Side::Both, sb) => {
                for (c, a) in self.split(a, left, right)?.terms() {
                    let (a1, a2, ka) = parts(a);
                    let r = match sb {
                        Side::Left => self.exchange_right(a1, a2, ka, b, k)?,
                        Side::Right => self.associate_right(a1, a2, ka, b, k)?,
                        Side::Both => {
                            let mut r = Expr::new();
                            for (d, b) in self.split(b, left, right)?.terms() {
                                let (b1, b2, kb) = parts(b);
                                let s = self.transpose(a1, a2, ka, b1, b2, kb, k)?;
                                r = r + s.scale(d);
                            }
                            r
                        }
                    };
                    out = out + r.scale(c);
                }
            }
            (sa, Side::Both) => {
                for (c, b) in self.split(b, left, right)?.terms() {
                    let (b1, b2, kb) = parts(b);
                    let r = if sa == Side::Left {
                        self.associate_left(a, b1, b2, kb, k)?
                    } else {
                        self.exchange_left(a, b1, b2, kb, k)?
                    };
                    out = out + r.scale(c);
                }
            }
            (Side::Left, Side::Left) | (Side::Right, Side::Right) => {
                unreachable!("{} does not straddle the split", t)
            }
        }
        Ok(out)
    }

    /// `[[A × B]^ab × C]^K → ∑ [A × [B × C]^bc]^K`
    fn associate_right(
        &self,
        ta: &Tensor,
        tb: &Tensor,
        ab: Half<i32>,
        tc: &Tensor,
        k: Half<i32>,
    ) -> Result<Expr> {
        let (a, b, c) = (ta.rank(), tb.rank(), tc.rank());
        let mut r = Expr::new();
        for bc in Half::tri_range(b, c) {
            if !Half::triangle(a, bc, k) {
                continue;
            }
            let coeff = sign(a + b + c + k) * hat(ab) * hat(bc)
                * self.w6j([a, b, ab, c, k, bc]);
            r.push(coeff, couple(ta, &couple(tb, tc, bc)?, k)?);
        }
        Ok(r)
    }

    /// `[A × [B × C]^bc]^K → ∑ [[A × B]^ab × C]^K`
    fn associate_left(
        &self,
        ta: &Tensor,
        tb: &Tensor,
        tc: &Tensor,
        bc: Half<i32>,
        k: Half<i32>,
    ) -> Result<Expr> {
        let (a, b, c) = (ta.rank(), tb.rank(), tc.rank());
        let mut r = Expr::new();
        for ab in Half::tri_range(a, b) {
            if !Half::triangle(ab, c, k) {
                continue;
            }
            let coeff = sign(a + b + c + k) * hat(ab) * hat(bc)
                * self.w6j([a, b, ab, c, k, bc]);
            r.push(coeff, couple(&couple(ta, tb, ab)?, tc, k)?);
        }
        Ok(r)
    }

    /// `[[A × B]^ab × C]^K → ∑ [[A × C]^ac × B]^K`
    fn exchange_right(
        &self,
        ta: &Tensor,
        tb: &Tensor,
        ab: Half<i32>,
        tc: &Tensor,
        k: Half<i32>,
    ) -> Result<Expr> {
        let (a, b, c) = (ta.rank(), tb.rank(), tc.rank());
        let mut r = Expr::new();
        for ac in Half::tri_range(a, c) {
            if !Half::triangle(ac, b, k) {
                continue;
            }
            let coeff = sign(b + c + ab + ac) * hat(ab) * hat(ac)
                * self.w6j([b, a, ab, c, k, ac]);
            r.push(coeff, couple(&couple(ta, tc, ac)?, tb, k)?);
        }
        Ok(r)
    }

    /// `[A × [B × C]^bc]^K → ∑ [B × [A × C]^y]^K`
    fn exchange_left(
        &self,
        ta: &Tensor,
        tb: &Tensor,
        tc: &Tensor,
        bc: Half<i32>,
        k: Half<i32>,
    ) -> Result<Expr> {
        let (a, b, c) = (ta.rank(), tb.rank(), tc.rank());
        let mut r = Expr::new();
        for y in Half::tri_range(a, c) {
            if !Half::triangle(b, y, k) {
                continue;
            }
            let coeff = sign(a + b + bc + y) * hat(bc) * hat(y)
                * self.w6j([a, c, y, b, k, bc]);
            r.push(coeff, couple(tb, &couple(ta, tc, y)?, k)?);
        }
        Ok(r)
    }

    /// `[[A × B]^ab × [C × D]^cd]^K → ∑ [[A × C]^x × [B × D]^y]^K`
    fn transpose(
        &self,
        ta: &Tensor,
        tb: &Tensor,
        ab: Half<i32>,
        tc: &Tensor,
        td: &Tensor,
        cd: Half<i32>,
        k: Half<i32>,
    ) -> Result<Expr> {
        let (a, b, c, d) = (ta.rank(), tb.rank(), tc.rank(), td.rank());
        let mut r = Expr::new();
        for x in Half::tri_range(a, c) {
            for y in Half::tri_range(b, d) {
                if !Half::triangle(x, y, k) {
                    continue;
                }
                let coeff = hat(ab) * hat(cd) * hat(x) * hat(y)
                    * self.w9j([a, b, ab, c, d, cd, x, y, k]);
                r.push(coeff, couple(&couple(ta, tc, x)?, &couple(tb, td, y)?, k)?);
            }
        }
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::vector::{scalar_product, tensor_product};

    #[test]
    fn test_scenario() {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let spin = reg.declare("spin");
        let q = Tensor::leaf("q", 1, &rel);
        let s1 = Tensor::leaf("sig1", 1, &spin);
        let s2 = Tensor::leaf("sig2", 1, &spin);
        let op = tensor_product(
            scalar_product(q.clone(), s1).unwrap(),
            scalar_product(q.clone(), s2).unwrap(),
            0,
        ).unwrap();
        let r = recouple(&reg, &op).unwrap();
        assert_eq!(
            r.to_string(),
            "1 * {{q_1 × q_1}_0 × {sig1_1 × sig2_1}_0}_0 \
             + sqrt(5) * {{q_1 × q_1}_2 × {sig1_1 × sig2_1}_2}_0",
        );
        assert_eq!(recouple(&reg, &r).unwrap(), r);
    }

    #[test]
    fn test_canonical_is_fixed() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let t = Tensor::couple(
            Tensor::leaf("x", 1, &a),
            Tensor::leaf("y", 2, &b),
            2,
        ).unwrap();
        let e = Expr::from(t.clone()).scale(&Scalar::sqrt(7));
        assert_eq!(recouple(&reg, &e).unwrap(), e);
        let flipped = Tensor::couple(
            Tensor::leaf("y", 2, &b),
            Tensor::leaf("x", 1, &a),
            2,
        ).unwrap();
        let r = recouple(&reg, &Expr::from(flipped)).unwrap();
        assert_eq!(r, Expr::from(t).scale(&Scalar::from_integer(-1)));
    }

    #[test]
    fn test_ordered_trees_are_kept() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let c = reg.declare("c");
        let (x, y, z) = (
            Tensor::leaf("x", 1, &a),
            Tensor::leaf("y", 1, &b),
            Tensor::leaf("z", 1, &c),
        );
        let yz = Tensor::couple(y.clone(), z.clone(), 1).unwrap();
        let right = Expr::from(Tensor::couple(x.clone(), yz, 1).unwrap());
        assert_eq!(recouple(&reg, &right).unwrap(), right);
        assert_eq!(recouple(&reg, &right).unwrap().to_string(),
                   "1 * {x_1 × {y_1 × z_1}_1}_1");

        // {z × {x × y}} only needs the outer node swapped
        let xy = Tensor::couple(x.clone(), y.clone(), 1).unwrap();
        let t = Tensor::couple(z.clone(), xy.clone(), 1).unwrap();
        let swapped = Tensor::couple(xy, z.clone(), 1).unwrap();
        let r = recouple(&reg, &Expr::from(t)).unwrap();
        assert_eq!(r, Expr::from(swapped).scale(&Scalar::from_integer(-1)));

        // {{x × z} × y} interleaves and is rewritten
        let xz = Tensor::couple(x, z, 1).unwrap();
        let t = Expr::from(Tensor::couple(xz, y, 1).unwrap());
        let r = recouple(&reg, &t).unwrap();
        assert!(r.len() > 1);
        let left = Scheme::left_nested(vec![a, b, c]).unwrap();
        assert_eq!(r, recouple_to(&reg, &t, &left).unwrap());
    }

    #[test]
    fn test_unregistered() {
        let mut reg = Registry::new();
        let mut other = Registry::new();
        let a = reg.declare("a");
        let z = other.declare("z");
        let t = Tensor::couple(
            Tensor::leaf("x", 1, &a),
            Tensor::leaf("y", 1, &z),
            0,
        ).unwrap();
        match recouple(&reg, &Expr::from(t)) {
            Err(Error::UnregisteredSubspace { name }) => assert_eq!(name, "z"),
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn test_round_trip_6j() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let c = reg.declare("c");
        let t = Tensor::couple(
            Tensor::couple(
                Tensor::leaf("x", 1, &a),
                Tensor::leaf("y", 2, &b),
                2,
            ).unwrap(),
            Tensor::leaf("z", 1, &c),
            1,
        ).unwrap();
        let e = Expr::from(t);
        let right = Scheme::pair(
            Scheme::Space(a.clone()),
            Scheme::pair(Scheme::Space(b.clone()), Scheme::Space(c.clone())),
        );
        let r = recouple_to(&reg, &e, &right).unwrap();
        assert!(r.len() > 1);
        // already ordered, so canonical as it stands
        assert_eq!(recouple(&reg, &r).unwrap(), r);
        let left = Scheme::left_nested(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(recouple_to(&reg, &r, &left).unwrap(), e);

        let exchanged = Scheme::pair(
            Scheme::pair(Scheme::Space(a.clone()), Scheme::Space(c.clone())),
            Scheme::Space(b.clone()),
        );
        let r = recouple_to(&reg, &e, &exchanged).unwrap();
        assert!(r.len() > 1);
        assert_eq!(recouple(&reg, &r).unwrap(), e);
    }

    #[test]
    fn test_round_trip_9j() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let c = reg.declare("c");
        let d = reg.declare("d");
        let t = Tensor::couple(
            Tensor::couple(
                Tensor::leaf("w", 1, &a),
                Tensor::leaf("x", 1, &b),
                1,
            ).unwrap(),
            Tensor::couple(
                Tensor::leaf("y", 1, &c),
                Tensor::leaf("z", 2, &d),
                2,
            ).unwrap(),
            2,
        ).unwrap();
        let e = Expr::from(t);
        let transposed = Scheme::pair(
            Scheme::pair(Scheme::Space(a.clone()), Scheme::Space(c.clone())),
            Scheme::pair(Scheme::Space(b.clone()), Scheme::Space(d.clone())),
        );
        let r = recouple_to(&reg, &e, &transposed).unwrap();
        assert!(r.len() > 1);
        let paired = Scheme::pair(
            Scheme::pair(Scheme::Space(a), Scheme::Space(b)),
            Scheme::pair(Scheme::Space(c), Scheme::Space(d)),
        );
        assert_eq!(recouple_to(&reg, &r, &paired).unwrap(), e);
    }

    #[test]
    fn test_scheme_must_cover() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let t = Tensor::couple(
            Tensor::leaf("x", 1, &a),
            Tensor::leaf("y", 1, &b),
            0,
        ).unwrap();
        let r = recouple_to(&reg, &Expr::from(t), &Scheme::Space(a));
        assert!(r.is_err());
    }
}
