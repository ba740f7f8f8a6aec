//! Coupled angular-momentum states.
use std::collections::BTreeSet;
use std::fmt;
use super::error::{Error, Result};
use super::half::Half;
use super::label::QLabel;
use super::space::{Scheme, Space};

/// Tree of angular-momentum couplings without a projection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Leaf {
        j: QLabel,
        /// Linear quantum number such as a momentum.
        linear: Option<QLabel>,
        space: Space,
    },
    Composite {
        left: Box<State>,
        right: Box<State>,
        j: QLabel,
    },
}

impl State {
    pub fn leaf<J: Into<QLabel>>(space: &Space, j: J) -> Self {
        State::Leaf { j: j.into(), linear: None, space: space.clone() }
    }

    /// Attach a linear quantum number to a leaf.
    pub fn with_linear<P: Into<QLabel>>(self, p: P) -> Self {
        match self {
            State::Leaf { j, space, .. } => {
                State::Leaf { j, linear: Some(p.into()), space }
            }
            s => s,
        }
    }

    /// `|(left right) j⟩`
    pub fn couple<J: Into<QLabel>>(self, right: State, j: J) -> Result<Self> {
        let j = j.into();
        if let Some(s) = self.span().intersection(&right.span()).next() {
            return Err(Error::IncompatibleSpaces { name: s.name().to_owned() });
        }
        if let (Some(j1), Some(j2), Some(j3)) =
            (self.j().value(), right.j().value(), j.value())
        {
            if !Half::triangle(j1, j2, j3) {
                return Err(Error::InvalidCoupling { k1: j1, k2: j2, k: j3 });
            }
        }
        Ok(State::Composite {
            left: Box::new(self),
            right: Box::new(right),
            j,
        })
    }

    pub fn j(&self) -> &QLabel {
        match *self {
            State::Leaf { ref j, .. } => j,
            State::Composite { ref j, .. } => j,
        }
    }

    pub fn span(&self) -> BTreeSet<Space> {
        self.leaves().into_iter()
            .filter_map(|s| match *s {
                State::Leaf { ref space, .. } => Some(space.clone()),
                _ => None,
            })
            .collect()
    }

    /// Leaves in construction order.
    pub fn leaves(&self) -> Vec<&State> {
        match *self {
            State::Leaf { .. } => vec![self],
            State::Composite { ref left, ref right, .. } => {
                let mut v = left.leaves();
                v.extend(right.leaves());
                v
            }
        }
    }

    /// The coupling scheme followed by this state.
    pub fn scheme(&self) -> Scheme {
        match *self {
            State::Leaf { ref space, .. } => Scheme::Space(space.clone()),
            State::Composite { ref left, ref right, .. } => {
                Scheme::pair(left.scheme(), right.scheme())
            }
        }
    }

    /// Whether `self` and `other` have the same shape with the same space
    /// at every leaf.
    pub fn same_shape(&self, other: &State) -> bool {
        match (self, other) {
            (&State::Leaf { space: ref s1, .. },
             &State::Leaf { space: ref s2, .. }) => s1 == s2,
            (&State::Composite { left: ref l1, right: ref r1, .. },
             &State::Composite { left: ref l2, right: ref r2, .. }) => {
                l1.same_shape(l2) && r1.same_shape(r2)
            }
            _ => false,
        }
    }

    /// Attach the projection label.
    pub fn project<M: Into<QLabel>>(self, m: M) -> CoupledState {
        CoupledState { tree: self, projection: m.into() }
    }

    fn fmt_linear(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for s in self.leaves() {
            if let State::Leaf { linear: Some(ref p), .. } = *s {
                write!(f, "{} ", p)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            State::Leaf { ref j, .. } => write!(f, "{}", j),
            State::Composite { ref left, ref right, ref j } => {
                write!(f, "{}({} {})", j, left, right)
            }
        }
    }
}

/// A state tree together with the projection of its total angular
/// momentum, which exists only at the root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoupledState {
    pub tree: State,
    pub projection: QLabel,
}

/// Projection defaults to `m_J` for a root labeled `J`.
impl From<State> for CoupledState {
    fn from(tree: State) -> Self {
        let m = format!("m_{}", tree.j());
        tree.project(QLabel::Sym(m))
    }
}

impl fmt::Display for CoupledState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.tree.fmt_linear(f)?;
        write!(f, "{} {}", self.tree, self.projection)
    }
}
