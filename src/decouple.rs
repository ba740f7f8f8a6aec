//! Decoupling of matrix elements via the Wigner–Eckart theorem.
//!
//! The operator is first recoupled into the coupling scheme of the states.
//! Then bra, ket and operator are walked in parallel.  At the root, a scalar
//! operator `[T^k(1) × U^k(2)]^0` yields
//!
//! ```text
//! (−1)^(j1 + j2' + J' + k) / [k] δ(J, J') {j1' j2' J'; j2 j1 k}
//!     ⟨j1'‖T^k‖j1⟩ ⟨j2'‖U^k‖j2⟩
//! ```
//!
//! and below the root, reduced matrix elements of `[X^k1 × Y^k2]^K` factor
//! as
//!
//! ```text
//! [J] [J'] [K] {j1' j1 k1; j2' j2 k2; J' J K} ⟨j1'‖X^k1‖j1⟩ ⟨j2'‖Y^k2‖j2⟩
//! ```
//!
//! Subspaces in which the operator does not act receive the identity.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use num::{One, Zero};
use once_cell::unsync::OnceCell;
use super::ang_mom::{jweight, Wigner, WignerCtx};
use super::error::{Error, Result};
use super::evaluate::{self, Assignment, Evaluated};
use super::half::Half;
use super::label::{Phase, QLabel};
use super::recouple::{self, Recoupler};
use super::scalar::Scalar;
use super::space::{Registry, Space};
use super::state::{CoupledState, State};
use super::tensor::{Expr, Tensor};

/// A 6j or 9j symbol whose arguments may be symbolic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Recoupling {
    SixJ([QLabel; 6]),
    NineJ([QLabel; 9]),
}

impl Recoupling {
    pub fn labels(&self) -> &[QLabel] {
        match *self {
            Recoupling::SixJ(ref j) => j,
            Recoupling::NineJ(ref j) => j,
        }
    }

    /// Evaluate if every argument is a fixed value.
    pub fn value<W: Wigner>(&self, wigner: &W) -> Option<Scalar> {
        let tj = self.labels()
            .iter()
            .map(|j| j.value().map(Half::twice))
            .collect::<Option<Vec<_>>>()?;
        Some(eval_symbol(&tj, wigner))
    }
}

/// Evaluate a 6j or 9j symbol from its doubled arguments.
pub(crate) fn eval_symbol<W: Wigner>(tj: &[i32], wigner: &W) -> Scalar {
    match tj.len() {
        6 => wigner.wigner_6j([tj[0], tj[1], tj[2], tj[3], tj[4], tj[5]]),
        9 => wigner.wigner_9j([
            tj[0], tj[1], tj[2],
            tj[3], tj[4], tj[5],
            tj[6], tj[7], tj[8],
        ]),
        n => unreachable!("symbol with {} arguments", n),
    }
}

impl fmt::Display for Recoupling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (name, j) = match *self {
            Recoupling::SixJ(ref j) => ("SixJ", &j[..]),
            Recoupling::NineJ(ref j) => ("NineJ", &j[..]),
        };
        write!(f, "{}(", name)?;
        for (i, x) in j.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", if i % 3 == 0 { "; " } else { " " })?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, ")")
    }
}

/// Reduced matrix element `⟨bra‖op‖ket⟩` within a single subspace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReducedElement {
    pub bra: QLabel,
    pub ket: QLabel,
    pub bra_linear: Option<QLabel>,
    pub ket_linear: Option<QLabel>,
    /// `None` stands for the identity operator.
    pub op: Option<Tensor>,
}

impl ReducedElement {
    /// Replace every assigned symbol by its value.
    pub fn substitute(&self, assignment: &Assignment) -> Self {
        Self {
            bra: assignment.substitute(&self.bra),
            ket: assignment.substitute(&self.ket),
            bra_linear: self.bra_linear.as_ref().map(|p| assignment.substitute(p)),
            ket_linear: self.ket_linear.as_ref().map(|p| assignment.substitute(p)),
            op: self.op.clone(),
        }
    }
}

impl fmt::Display for ReducedElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<")?;
        if let Some(ref p) = self.bra_linear {
            write!(f, "{}", p)?;
        }
        write!(f, "{}||", self.bra)?;
        match self.op {
            Some(ref op) => write!(f, "{}", op)?,
            None => write!(f, "1")?,
        }
        write!(f, "||")?;
        if let Some(ref p) = self.ket_linear {
            write!(f, "{}", p)?;
        }
        write!(f, "{}>", self.ket)
    }
}

/// One term of a decoupled matrix element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    pub coeff: Scalar,
    pub phase: Phase,
    /// Kronecker deltas `δ(ket, bra)`.
    pub deltas: Vec<(QLabel, QLabel)>,
    /// Symbolic factors `(2 j + 1)^(e / 2)`.
    pub hats: BTreeMap<QLabel, i32>,
    pub wigners: Vec<Recoupling>,
    pub elements: BTreeMap<Space, ReducedElement>,
}

impl Term {
    fn unit() -> Self {
        Term {
            coeff: Scalar::one(),
            phase: Phase::new(),
            deltas: Vec::new(),
            hats: BTreeMap::new(),
            wigners: Vec::new(),
            elements: BTreeMap::new(),
        }
    }

    fn scale(mut self, c: &Scalar) -> Self {
        self.coeff = self.coeff * c;
        self
    }

    fn phase(mut self, label: &QLabel) -> Self {
        self.phase.add_label(label, 1);
        self
    }

    /// Returns `None` if the delta fails identically.
    fn delta(mut self, ket: &QLabel, bra: &QLabel) -> Option<Self> {
        if ket == bra {
            return Some(self);
        }
        if ket.value().is_some() && bra.value().is_some() {
            return None;
        }
        let known = self.deltas.iter().any(|&(ref a, ref b)| {
            (a == ket && b == bra) || (a == bra && b == ket)
        });
        if !known {
            self.deltas.push((ket.clone(), bra.clone()));
        }
        Some(self)
    }

    fn hat(mut self, j: &QLabel, e: i32) -> Self {
        match j.value() {
            Some(v) => self.coeff = self.coeff * jweight(v, e),
            None => {
                let n = {
                    let n = self.hats.entry(j.clone()).or_insert(0);
                    *n += e;
                    *n
                };
                if n == 0 {
                    self.hats.remove(j);
                }
            }
        }
        self
    }

    /// Returns `None` if the symbol vanishes.
    fn wigner<W: Wigner>(mut self, w: Recoupling, wigner: &W) -> Option<Self> {
        match w.value(wigner) {
            Some(v) => {
                if v.is_zero() {
                    return None;
                }
                self.coeff = self.coeff * v;
            }
            None => self.wigners.push(w),
        }
        Some(self)
    }

    fn mul(mut self, other: Term) -> Self {
        self.coeff = self.coeff * other.coeff;
        self.phase.add(&other.phase);
        for (a, b) in other.deltas {
            if !self.deltas.contains(&(a.clone(), b.clone())) {
                self.deltas.push((a, b));
            }
        }
        for (j, e) in other.hats {
            self = self.hat(&j, e);
        }
        self.wigners.extend(other.wigners);
        self.elements.extend(other.elements);
        self
    }

    /// Symbols required to evaluate the geometric part.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut labels: Vec<&QLabel> = Vec::new();
        for &(ref a, ref b) in &self.deltas {
            labels.push(a);
            labels.push(b);
        }
        labels.extend(self.hats.keys());
        for w in &self.wigners {
            labels.extend(w.labels());
        }
        let mut symbols: BTreeSet<String> = labels.into_iter()
            .filter_map(|j| j.symbol())
            .map(|s| s.to_owned())
            .collect();
        symbols.extend(self.phase.symbols().map(|s| s.to_owned()));
        symbols
    }

    fn same_factors(&self, other: &Term) -> bool {
        self.phase == other.phase
            && self.deltas == other.deltas
            && self.hats == other.hats
            && self.wigners == other.wigners
            && self.elements == other.elements
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.coeff.num_terms() > 1 {
            write!(f, "({})", self.coeff)?;
        } else {
            write!(f, "{}", self.coeff)?;
        }
        if !self.phase.is_trivial() {
            write!(f, " * {}", self.phase)?;
        }
        for &(ref a, ref b) in &self.deltas {
            write!(f, " * δ({}, {})", a, b)?;
        }
        for (j, &e) in &self.hats {
            match e {
                1 => write!(f, " * sqrt(2*{} + 1)", j)?,
                -1 => write!(f, " * 1/sqrt(2*{} + 1)", j)?,
                _ => write!(f, " * (2*{} + 1)^({}/2)", j, e)?,
            }
        }
        for w in &self.wigners {
            write!(f, " * {}", w)?;
        }
        for e in self.elements.values() {
            write!(f, " * {}", e)?;
        }
        Ok(())
    }
}

/// Decoupled form of a matrix element: a sum of terms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoupled {
    terms: Vec<Term>,
}

impl Decoupled {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Add a term, merging it with an existing one that differs only in the
    /// coefficient.
    pub fn push(&mut self, term: Term) {
        if term.coeff.is_zero() {
            return;
        }
        match self.terms.iter().position(|t| t.same_factors(&term)) {
            Some(i) => {
                let sum = self.terms[i].coeff.clone() + term.coeff;
                if sum.is_zero() {
                    self.terms.remove(i);
                } else {
                    self.terms[i].coeff = sum;
                }
            }
            None => self.terms.push(term),
        }
    }

    /// Symbols required to evaluate the geometric part of every term.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.terms.iter().flat_map(|t| t.symbols()).collect()
    }
}

impl fmt::Display for Decoupled {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            if i != 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

/// Split `op` into the parts acting in `left` and in `right`.  Missing
/// parts are the identity.
fn align(
    op: &Tensor,
    left: &BTreeSet<Space>,
    right: &BTreeSet<Space>,
) -> Result<(Scalar, Option<Tensor>, Option<Tensor>)> {
    let span = op.span();
    if span.is_subset(left) {
        return Ok((Scalar::one(), Some(op.clone()), None));
    }
    if span.is_subset(right) {
        return Ok((Scalar::one(), None, Some(op.clone())));
    }
    if let Tensor::Composite { left: ref x, right: ref y, .. } = *op {
        if x.span().is_subset(left) && y.span().is_subset(right) {
            return Ok((Scalar::one(), Some((**x).clone()), Some((**y).clone())));
        }
        if x.span().is_subset(right) && y.span().is_subset(left) {
            if let Some((c, swapped)) = op.commute() {
                if let (_, Some(x), Some(y)) = align(&swapped, left, right)? {
                    return Ok((c, Some(x), Some(y)));
                }
            }
        }
    }
    Err(Error::ShapeMismatch {
        reason: format!("{} does not follow the coupling of the states", op),
    })
}

fn rank_of(op: &Option<Tensor>) -> QLabel {
    QLabel::Val(op.as_ref().map(Tensor::rank).unwrap_or(Half(0)))
}

struct Decoupler<'a, W: 'a> {
    wigner: &'a W,
}

impl<'a, W: Wigner> Decoupler<'a, W> {
    /// Decouple `⟨bra|op|ket⟩` for a single recoupled operator tree.
    fn root(
        &self,
        bra: &State,
        ket: &State,
        op: &Tensor,
    ) -> Result<Option<Term>> {
        if !op.rank().is_zero() {
            return self.reduce(bra, ket, Some(op));
        }
        match (bra, ket) {
            (&State::Composite { left: ref b1, right: ref b2, j: ref jb },
             &State::Composite { left: ref t1, right: ref t2, j: ref jt }) => {
                let (c, x, y) = align(op, &t1.span(), &t2.span())?;
                let k = rank_of(&x);
                let term = Term::unit()
                    .scale(&c)
                    .phase(t1.j())
                    .phase(b2.j())
                    .phase(jb)
                    .phase(&k)
                    .hat(&k, -1)
                    .delta(jt, jb)
                    .and_then(|t| t.wigner(Recoupling::SixJ([
                        b1.j().clone(), b2.j().clone(), jb.clone(),
                        t2.j().clone(), t1.j().clone(), k.clone(),
                    ]), self.wigner));
                let term = match term {
                    Some(term) => term,
                    None => return Ok(None),
                };
                let r1 = match self.reduce(b1, t1, x.as_ref())? {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let r2 = match self.reduce(b2, t2, y.as_ref())? {
                    Some(r) => r,
                    None => return Ok(None),
                };
                Ok(Some(term.mul(r1).mul(r2)))
            }
            _ => {
                let term = match Term::unit()
                    .hat(ket.j(), -1)
                    .delta(ket.j(), bra.j())
                {
                    Some(term) => term,
                    None => return Ok(None),
                };
                Ok(self.reduce(bra, ket, Some(op))?.map(|r| term.mul(r)))
            }
        }
    }

    /// Decouple the reduced matrix element `⟨bra‖op‖ket⟩`.
    fn reduce(
        &self,
        bra: &State,
        ket: &State,
        op: Option<&Tensor>,
    ) -> Result<Option<Term>> {
        match (bra, ket) {
            (&State::Leaf { j: ref jb, linear: ref pb, ref space },
             &State::Leaf { j: ref jt, linear: ref pt, .. }) => {
                let mut term = Term::unit();
                term.elements.insert(space.clone(), ReducedElement {
                    bra: jb.clone(),
                    ket: jt.clone(),
                    bra_linear: pb.clone(),
                    ket_linear: pt.clone(),
                    op: op.cloned(),
                });
                Ok(Some(term))
            }
            (&State::Composite { left: ref b1, right: ref b2, j: ref jb },
             &State::Composite { left: ref t1, right: ref t2, j: ref jt }) => {
                let (c, x, y) = match op {
                    Some(op) => align(op, &t1.span(), &t2.span())?,
                    None => (Scalar::one(), None, None),
                };
                let k = QLabel::Val(op.map(Tensor::rank).unwrap_or(Half(0)));
                let (k1, k2) = (rank_of(&x), rank_of(&y));
                let term = Term::unit()
                    .scale(&c)
                    .hat(jt, 1)
                    .hat(jb, 1)
                    .hat(&k, 1)
                    .wigner(Recoupling::NineJ([
                        b1.j().clone(), t1.j().clone(), k1,
                        b2.j().clone(), t2.j().clone(), k2,
                        jb.clone(), jt.clone(), k,
                    ]), self.wigner);
                let term = match term {
                    Some(term) => term,
                    None => return Ok(None),
                };
                let r1 = match self.reduce(b1, t1, x.as_ref())? {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let r2 = match self.reduce(b2, t2, y.as_ref())? {
                    Some(r) => r,
                    None => return Ok(None),
                };
                Ok(Some(term.mul(r1).mul(r2)))
            }
            _ => Err(Error::ShapeMismatch {
                reason: format!("{} and {} differ in shape", bra, ket),
            }),
        }
    }
}

/// Matrix element `⟨bra|op|ket⟩` whose decoupled form is computed on first
/// use.
#[derive(Debug)]
pub struct MatrixElement<W = WignerCtx> {
    pub conf: recouple::Conf,
    registry: Registry,
    bra: CoupledState,
    ket: CoupledState,
    op: Expr,
    wigner: W,
    decoupled: OnceCell<Decoupled>,
}

impl MatrixElement {
    pub fn new<B, K, O>(registry: &Registry, bra: B, ket: K, op: O) -> Result<Self>
        where B: Into<CoupledState>, K: Into<CoupledState>, O: Into<Expr>
    {
        let (bra, ket, op) = (bra.into(), ket.into(), op.into());
        validate(registry, &bra.tree, &ket.tree, &op)?;
        Ok(Self {
            conf: Default::default(),
            registry: registry.clone(),
            bra,
            ket,
            op,
            wigner: Default::default(),
            decoupled: OnceCell::new(),
        })
    }
}

impl<W: Wigner> MatrixElement<W> {
    /// Use a different evaluator for 6j and 9j symbols.
    pub fn with_wigner<V: Wigner>(self, wigner: V) -> MatrixElement<V> {
        MatrixElement {
            conf: self.conf,
            registry: self.registry,
            bra: self.bra,
            ket: self.ket,
            op: self.op,
            wigner,
            decoupled: OnceCell::new(),
        }
    }

    pub fn with_conf(mut self, conf: recouple::Conf) -> Self {
        self.conf = conf;
        self
    }

    pub fn bra(&self) -> &CoupledState {
        &self.bra
    }

    pub fn ket(&self) -> &CoupledState {
        &self.ket
    }

    pub fn operator(&self) -> &Expr {
        &self.op
    }

    pub fn decoupled(&self) -> Result<&Decoupled> {
        if let Some(d) = self.decoupled.get() {
            return Ok(d);
        }
        let d = self.decouple()?;
        Ok(self.decoupled.get_or_init(|| d))
    }

    /// Substitute quantum numbers into the geometric part.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<Evaluated> {
        evaluate::evaluate(self.decoupled()?, assignment, &self.wigner)
    }

    fn decouple(&self) -> Result<Decoupled> {
        let scheme = self.ket.tree.scheme();
        let op = Recoupler::new(&self.registry, &self.wigner)
            .with_conf(self.conf)
            .recouple_to(&self.op, &scheme)?;
        let decoupler = Decoupler { wigner: &self.wigner };
        let mut d = Decoupled::default();
        for (c, t) in op.terms() {
            if let Some(term) = decoupler.root(&self.bra.tree, &self.ket.tree, t)? {
                d.push(term.scale(c));
            }
        }
        if self.conf.verbose {
            println!("decouple:");
            println!("- {{terms_in: {}, terms_out: {}}}", op.len(), d.len());
        }
        Ok(d)
    }
}

impl<W> fmt::Display for MatrixElement<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}|{}|{}>", self.bra, self.op, self.ket)
    }
}

fn validate(
    registry: &Registry,
    bra: &State,
    ket: &State,
    op: &Expr,
) -> Result<()> {
    for s in bra.span().iter().chain(ket.span().iter()).chain(op.span().iter()) {
        registry.check(s)?;
    }
    if !bra.same_shape(ket) {
        return Err(Error::ShapeMismatch {
            reason: format!("{} and {} differ in shape", bra, ket),
        });
    }
    let span = ket.span();
    if span.len() != ket.leaves().len() {
        return Err(Error::ShapeMismatch {
            reason: format!("a subspace occurs twice in {}", ket),
        });
    }
    if let Some(s) = op.span().difference(&span).next() {
        return Err(Error::ShapeMismatch {
            reason: format!("operator acts in {}, which the states lack", s),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::vector::{scalar_product, tensor_product};

    fn scenario() -> (Registry, State, State, Expr) {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let spin = reg.declare("spin");
        let q = Tensor::leaf("q", 1, &rel);
        let s1 = Tensor::leaf("sig1", 1, &spin);
        let s2 = Tensor::leaf("sig2", 1, &spin);
        let op = tensor_product(
            scalar_product(q.clone(), s1).unwrap(),
            scalar_product(q, s2).unwrap(),
            0,
        ).unwrap();
        let bra = State::leaf(&rel, "l'").with_linear("p'")
            .couple(State::leaf(&spin, "s'"), "j'")
            .unwrap();
        let ket = State::leaf(&rel, "l").with_linear("p")
            .couple(State::leaf(&spin, "s"), "j")
            .unwrap();
        (reg, bra, ket, op)
    }

    #[test]
    fn test_scenario() {
        let (reg, bra, ket, op) = scenario();
        let me = MatrixElement::new(&reg, bra, ket, op).unwrap();
        assert_eq!(
            me.to_string(),
            "<p' j'(l' s') m_j'|3 * {{q_1 × sig1_1}_0 × {q_1 × sig2_1}_0}_0|\
             p j(l s) m_j>",
        );
        let d = me.decoupled().unwrap();
        assert_eq!(d.len(), 2);
        for t in d.terms() {
            assert_eq!(t.wigners.len(), 1);
            assert_eq!(t.deltas, vec![(QLabel::sym("j"), QLabel::sym("j'"))]);
            assert_eq!(t.elements.len(), 2);
            assert_eq!(t.phase.symbols().collect::<Vec<_>>(),
                       vec!["j'", "l", "s'"]);
        }
        let (t0, t1) = (&d.terms()[0], &d.terms()[1]);
        assert_eq!(t1.phase.constant - t0.phase.constant, Half::from(2));
        assert_eq!(
            t0.to_string(),
            "1 * (-1)^(j' + l + s') * δ(j, j') * SixJ(l' s' j'; s l 0) \
             * <p'l'||{q_1 × q_1}_0||pl> * <s'||{sig1_1 × sig2_1}_0||s>",
        );
        assert_eq!(
            t1.to_string(),
            "1 * (-1)^(j' + l + s' + 2) * δ(j, j') * SixJ(l' s' j'; s l 2) \
             * <p'l'||{q_1 × q_1}_2||pl> * <s'||{sig1_1 × sig2_1}_2||s>",
        );
        // cached
        assert!(std::ptr::eq(d, me.decoupled().unwrap()));
    }

    #[test]
    fn test_identity_and_rank() {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let spin = reg.declare("spin");
        let bra = State::leaf(&rel, "l'").couple(State::leaf(&spin, "s'"), "j'")
            .unwrap();
        let ket = State::leaf(&rel, "l").couple(State::leaf(&spin, "s"), "j")
            .unwrap();

        // scalar acting in one subspace only
        let r2 = Tensor::leaf("r2", 0, &rel);
        let me = MatrixElement::new(&reg, bra.clone(), ket.clone(), r2).unwrap();
        let d = me.decoupled().unwrap();
        assert_eq!(d.len(), 1);
        let t = &d.terms()[0];
        assert_eq!(t.elements[&spin].op, None);
        assert_eq!(t.elements[&spin].to_string(), "<s'||1||s>");

        // vector operator: only the reduced matrix element remains
        let s = Tensor::leaf("s", 1, &spin);
        let me = MatrixElement::new(&reg, bra.clone(), ket.clone(), s).unwrap();
        let d = me.decoupled().unwrap();
        assert_eq!(d.len(), 1);
        let t = &d.terms()[0];
        assert!(t.deltas.is_empty());
        assert_eq!(t.wigners.len(), 1);
        assert_eq!(t.wigners[0].to_string(), "NineJ(l' l 0; s' s 1; j' j 1)");
        assert_eq!(t.hats.len(), 2);
        assert_eq!(t.coeff, Scalar::sqrt(3));
    }

    #[test]
    fn test_single_space() {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let q = Tensor::leaf("q", 1, &rel);
        let op = scalar_product(q.clone(), q).unwrap();
        let bra = State::leaf(&rel, "l'");
        let ket = State::leaf(&rel, "l");
        let me = MatrixElement::new(&reg, bra, ket, op).unwrap();
        let d = me.decoupled().unwrap();
        assert_eq!(d.to_string(),
                   "sqrt(3) * δ(l, l') * 1/sqrt(2*l + 1) \
                    * <l'||{q_1 × q_1}_0||l>");
    }

    #[test]
    fn test_shape_mismatch() {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let spin = reg.declare("spin");
        let cm = reg.declare("cm");
        let bra = State::leaf(&rel, "l'").couple(State::leaf(&spin, "s'"), "j'")
            .unwrap();
        let ket = State::leaf(&spin, "s").couple(State::leaf(&rel, "l"), "j")
            .unwrap();
        let op = Tensor::leaf("r2", 0, &rel);
        match MatrixElement::new(&reg, bra.clone(), ket, op.clone()) {
            Err(Error::ShapeMismatch { .. }) => {}
            r => panic!("unexpected: {:?}", r.map(|m| m.to_string())),
        }
        let ket = State::leaf(&rel, "l").couple(State::leaf(&spin, "s"), "j")
            .unwrap();
        let p = Tensor::leaf("P", 1, &cm);
        assert!(MatrixElement::new(&reg, bra.clone(), ket.clone(), p).is_err());
        assert!(MatrixElement::new(&reg, bra, ket, op).is_ok());
    }
}
