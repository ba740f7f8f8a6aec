//! Coupled spherical tensor operators and symbolic sums of them.
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;
use num::{One, Zero};
use super::ang_mom::phase;
use super::error::{Error, Result};
use super::half::Half;
use super::scalar::Scalar;
use super::space::Space;

/// Tree of couplings.  Leaves act in exactly one subspace; composites span
/// the union of their leaves' subspaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tensor {
    Leaf {
        name: String,
        rank: Half<i32>,
        space: Space,
        /// Whether the Cartesian components commute among themselves.
        commutes: bool,
    },
    Composite {
        left: Box<Tensor>,
        right: Box<Tensor>,
        rank: Half<i32>,
    },
}

impl Tensor {
    pub fn leaf(name: &str, rank: u16, space: &Space) -> Self {
        Tensor::Leaf {
            name: name.to_owned(),
            rank: Half::from(i32::from(rank)),
            space: space.clone(),
            commutes: true,
        }
    }

    /// Mark a leaf as having non-commuting components.
    pub fn noncommuting(self) -> Self {
        match self {
            Tensor::Leaf { name, rank, space, .. } => {
                Tensor::Leaf { name, rank, space, commutes: false }
            }
            t => t,
        }
    }

    /// `[left × right]^k`
    pub fn couple(left: Tensor, right: Tensor, k: u16) -> Result<Self> {
        Self::couple_half(left, right, Half::from(i32::from(k)))
    }

    pub(crate) fn couple_half(
        left: Tensor,
        right: Tensor,
        rank: Half<i32>,
    ) -> Result<Self> {
        let (k1, k2) = (left.rank(), right.rank());
        if !Half::triangle(k1, k2, rank) {
            return Err(Error::InvalidCoupling { k1, k2, k: rank });
        }
        Ok(Tensor::Composite {
            left: Box::new(left),
            right: Box::new(right),
            rank,
        })
    }

    pub fn rank(&self) -> Half<i32> {
        match *self {
            Tensor::Leaf { rank, .. } => rank,
            Tensor::Composite { rank, .. } => rank,
        }
    }

    pub fn span(&self) -> BTreeSet<Space> {
        let mut span = BTreeSet::new();
        self.collect_span(&mut span);
        span
    }

    fn collect_span(&self, span: &mut BTreeSet<Space>) {
        match *self {
            Tensor::Leaf { ref space, .. } => {
                span.insert(space.clone());
            }
            Tensor::Composite { ref left, ref right, .. } => {
                left.collect_span(span);
                right.collect_span(span);
            }
        }
    }

    pub fn commutes(&self) -> bool {
        match *self {
            Tensor::Leaf { commutes, .. } => commutes,
            Tensor::Composite { ref left, ref right, .. } => {
                left.commutes() && right.commutes()
            }
        }
    }

    /// Whether the tree vanishes identically: somewhere a commuting tensor
    /// of rank `k` is coupled with itself to a rank `K` with `2 k − K` odd.
    pub fn is_null(&self) -> bool {
        match *self {
            Tensor::Leaf { .. } => false,
            Tensor::Composite { ref left, ref right, rank } => {
                if left.is_null() || right.is_null() {
                    return true;
                }
                if left != right || !left.commutes() {
                    return false;
                }
                match (left.rank() + left.rank() - rank).try_get() {
                    Ok(n) => n % 2 != 0,
                    Err(_) => false,
                }
            }
        }
    }

    /// `[A × B]^K = (−1)^(a + b − K) [B × A]^K` for `A`, `B` acting in
    /// disjoint subspaces.
    pub fn commute(&self) -> Option<(Scalar, Tensor)> {
        match *self {
            Tensor::Leaf { .. } => None,
            Tensor::Composite { ref left, ref right, rank } => {
                if !left.span().is_disjoint(&right.span()) {
                    return None;
                }
                let phi = left.rank() + right.rank() - rank;
                let coeff = phase(phi.twice() / 2);
                Some((coeff, Tensor::Composite {
                    left: right.clone(),
                    right: left.clone(),
                    rank,
                }))
            }
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tensor::Leaf { ref name, rank, .. } => write!(f, "{}_{}", name, rank),
            Tensor::Composite { ref left, ref right, rank } => {
                write!(f, "{{{} × {}}}_{}", left, right, rank)
            }
        }
    }
}

/// Symbolic sum `∑ cᵢ Tᵢ`.  Identical trees are merged, vanishing terms
/// are dropped, and the order of first appearance is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expr {
    terms: Vec<(Scalar, Tensor)>,
}

impl Expr {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn terms(&self) -> &[(Scalar, Tensor)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn push(&mut self, coeff: Scalar, tensor: Tensor) {
        if coeff.is_zero() || tensor.is_null() {
            return;
        }
        match self.terms.iter().position(|&(_, ref t)| *t == tensor) {
            Some(i) => {
                let sum = self.terms[i].0.clone() + coeff;
                if sum.is_zero() {
                    self.terms.remove(i);
                } else {
                    self.terms[i].0 = sum;
                }
            }
            None => self.terms.push((coeff, tensor)),
        }
    }

    pub fn scale(&self, coeff: &Scalar) -> Expr {
        let mut r = Expr::new();
        for (c, t) in &self.terms {
            r.push(c * coeff, t.clone());
        }
        r
    }

    /// Couple every pair of terms, `[∑ aᵢ Aᵢ × ∑ bⱼ Bⱼ]^k`.
    pub fn couple(&self, other: &Expr, k: u16) -> Result<Expr> {
        self.couple_half(other, Half::from(i32::from(k)))
    }

    pub(crate) fn couple_half(&self, other: &Expr, rank: Half<i32>) -> Result<Expr> {
        let mut r = Expr::new();
        for (c1, t1) in &self.terms {
            for (c2, t2) in &other.terms {
                let t = Tensor::couple_half(t1.clone(), t2.clone(), rank)?;
                r.push(c1 * c2, t);
            }
        }
        Ok(r)
    }

    /// Ranks of the terms, if they all agree.
    pub fn rank(&self) -> Option<Half<i32>> {
        let mut ranks = self.terms.iter().map(|&(_, ref t)| t.rank());
        let k = ranks.next()?;
        if ranks.all(|r| r == k) {
            Some(k)
        } else {
            None
        }
    }

    pub fn span(&self) -> BTreeSet<Space> {
        self.terms.iter().flat_map(|&(_, ref t)| t.span()).collect()
    }
}

impl From<Tensor> for Expr {
    fn from(t: Tensor) -> Self {
        let mut r = Expr::new();
        r.push(Scalar::one(), t);
        r
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(mut self, other: Expr) -> Self::Output {
        for (c, t) in other.terms {
            self.push(c, t);
        }
        self
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (c, t)) in self.terms.iter().enumerate() {
            if i != 0 {
                write!(f, " + ")?;
            }
            if c.num_terms() > 1 {
                write!(f, "({}) * {}", c, t)?;
            } else {
                write!(f, "{} * {}", c, t)?;
            }
        }
        Ok(())
    }
}
