//! Numeric substitution of quantum numbers into decoupled matrix elements.
use std::collections::BTreeMap;
use std::fmt;
use num::Zero;
use super::ang_mom::{jweight, phase, Wigner};
use super::decouple::{eval_symbol, Decoupled, ReducedElement, Term};
use super::error::{Error, Result};
use super::half::Half;
use super::label::QLabel;
use super::scalar::Scalar;
use super::space::Space;

/// Values of quantum-number symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment(BTreeMap<String, Half<i32>>);

impl Assignment {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, name: &str, value: Half<i32>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: Half<i32>) {
        self.0.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<Half<i32>> {
        self.0.get(name).cloned()
    }

    pub fn resolve(&self, label: &QLabel) -> Result<Half<i32>> {
        match *label {
            QLabel::Val(v) => Ok(v),
            QLabel::Sym(ref s) => self.get(s).ok_or_else(|| {
                Error::IncompleteAssignment { symbol: s.clone() }
            }),
        }
    }

    /// Replace the label by its value if it has one.
    pub fn substitute(&self, label: &QLabel) -> QLabel {
        match *label {
            QLabel::Sym(ref s) => match self.get(s) {
                Some(v) => QLabel::Val(v),
                None => label.clone(),
            },
            QLabel::Val(_) => label.clone(),
        }
    }
}

/// Numeric coefficient times a product of reduced matrix elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatedTerm {
    pub coeff: Scalar,
    pub elements: BTreeMap<Space, ReducedElement>,
}

impl fmt::Display for EvaluatedTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.coeff.num_terms() > 1 {
            write!(f, "({})", self.coeff)?;
        } else {
            write!(f, "{}", self.coeff)?;
        }
        for e in self.elements.values() {
            write!(f, " * {}", e)?;
        }
        Ok(())
    }
}

/// Sum of evaluated terms with distinct reduced matrix elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluated {
    terms: Vec<EvaluatedTerm>,
}

impl Evaluated {
    pub fn terms(&self) -> &[EvaluatedTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn push(&mut self, term: EvaluatedTerm) {
        if term.coeff.is_zero() {
            return;
        }
        match self.terms.iter().position(|t| t.elements == term.elements) {
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
}

impl fmt::Display for Evaluated {
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

/// Substitute `assignment` into the geometric part of `decoupled`.  Every
/// symbol the deltas, phases, weights and 6j/9j symbols need must be
/// assigned; otherwise nothing is evaluated.
pub fn evaluate<W: Wigner>(
    decoupled: &Decoupled,
    assignment: &Assignment,
    wigner: &W,
) -> Result<Evaluated> {
    if let Some(s) = decoupled.symbols()
        .into_iter()
        .find(|s| assignment.get(s).is_none())
    {
        return Err(Error::IncompleteAssignment { symbol: s });
    }
    let mut r = Evaluated::default();
    for term in decoupled.terms() {
        if let Some(t) = evaluate_term(term, assignment, wigner)? {
            r.push(t);
        }
    }
    Ok(r)
}

fn evaluate_term<W: Wigner>(
    term: &Term,
    assignment: &Assignment,
    wigner: &W,
) -> Result<Option<EvaluatedTerm>> {
    for &(ref a, ref b) in &term.deltas {
        if assignment.resolve(a)? != assignment.resolve(b)? {
            return Ok(None);
        }
    }
    let mut coeff = term.coeff.clone();
    for w in &term.wigners {
        let tj = w.labels()
            .iter()
            .map(|j| assignment.resolve(j).map(Half::twice))
            .collect::<Result<Vec<_>>>()?;
        let v = eval_symbol(&tj, wigner);
        if v.is_zero() {
            return Ok(None);
        }
        coeff = coeff * v;
    }
    for (j, &e) in &term.hats {
        let j = assignment.resolve(j)?;
        // no multiplet with negative angular momentum
        if j.twice() < 0 {
            return Ok(None);
        }
        coeff = coeff * jweight(j, e);
    }
    let mut phi = term.phase.constant;
    for (s, &c) in &term.phase.terms {
        let v = assignment.resolve(&QLabel::Sym(s.clone()))?;
        phi = phi + Half(c * v.twice());
    }
    match phi.try_get() {
        Ok(n) => coeff = coeff * phase(n),
        Err(phi) => {
            return Err(Error::NonIntegralPhase {
                phase: format!("{} = (-1)^({})", term.phase, phi),
            });
        }
    }
    Ok(Some(EvaluatedTerm {
        coeff,
        elements: term.elements.iter()
            .map(|(s, e)| (s.clone(), e.substitute(assignment)))
            .collect(),
    }))
}
