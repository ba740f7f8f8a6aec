//! Quantum-number labels and phase exponents.
use std::collections::BTreeMap;
use std::fmt;
use num::Zero;
use serde::{Serialize, Serializer};
use super::half::Half;

/// A quantum number: either a free symbol such as `l` or `j'`, or a fixed
/// (half-)integer value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QLabel {
    Sym(String),
    Val(Half<i32>),
}

impl QLabel {
    pub fn sym(name: &str) -> Self {
        QLabel::Sym(name.to_owned())
    }

    pub fn symbol(&self) -> Option<&str> {
        match *self {
            QLabel::Sym(ref s) => Some(s),
            QLabel::Val(_) => None,
        }
    }

    pub fn value(&self) -> Option<Half<i32>> {
        match *self {
            QLabel::Sym(_) => None,
            QLabel::Val(v) => Some(v),
        }
    }
}

impl<'a> From<&'a str> for QLabel {
    fn from(s: &'a str) -> Self {
        QLabel::sym(s)
    }
}

impl From<Half<i32>> for QLabel {
    fn from(v: Half<i32>) -> Self {
        QLabel::Val(v)
    }
}

impl fmt::Display for QLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QLabel::Sym(ref s) => write!(f, "{}", s),
            QLabel::Val(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for QLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Exponent of a phase `(-1)^(∑ cᵢ xᵢ + c₀)`, linear in the symbols `xᵢ`.
///
/// The constant is kept as accumulated, without reduction modulo 2.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phase {
    pub terms: BTreeMap<String, i32>,
    pub constant: Half<i32>,
}

impl Phase {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add `coeff × label` to the exponent.
    pub fn add_label(&mut self, label: &QLabel, coeff: i32) {
        match *label {
            QLabel::Val(v) => {
                self.constant = self.constant + Half(coeff * v.twice());
            }
            QLabel::Sym(ref s) => {
                let c = {
                    let c = self.terms.entry(s.clone()).or_insert(0);
                    *c += coeff;
                    *c
                };
                if c == 0 {
                    self.terms.remove(s);
                }
            }
        }
    }

    pub fn with_label(mut self, label: &QLabel, coeff: i32) -> Self {
        self.add_label(label, coeff);
        self
    }

    pub fn add(&mut self, other: &Phase) {
        for (s, &c) in &other.terms {
            self.add_label(&QLabel::Sym(s.clone()), c);
        }
        self.constant = self.constant + other.constant;
    }

    pub fn is_trivial(&self) -> bool {
        self.terms.is_empty() && self.constant.is_zero()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(|s| s.as_str())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(-1)^(")?;
        let mut first = true;
        for (s, &c) in &self.terms {
            match (first, c < 0) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            if c.abs() != 1 {
                write!(f, "{}*", c.abs())?;
            }
            write!(f, "{}", s)?;
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)?;
        } else if self.constant.twice() < 0 {
            write!(f, " - {}", -self.constant)?;
        } else if self.constant.twice() > 0 {
            write!(f, " + {}", self.constant)?;
        }
        write!(f, ")")
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
