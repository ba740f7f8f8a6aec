//! Subspaces, the registry that orders them, and coupling schemes over them.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use fnv::FnvHashMap;
use super::error::{Error, Result};

/// A named physical degree of freedom, e.g. the relative coordinate or the
/// spin.  Equality is by name; ordering is by the rank at which the space
/// was declared.
#[derive(Clone, Debug, Serialize)]
pub struct Space {
    name: String,
    order: usize,
}

impl Space {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

impl PartialEq for Space {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Space {}

impl Hash for Space {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialOrd for Space {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Space {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.name == other.name {
            return Ordering::Equal;
        }
        self.order.cmp(&other.order)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Declared subspaces in canonical order.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    spaces: Vec<Space>,
    index: FnvHashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Declare a subspace at the next rank.  Re-declaring an existing name
    /// returns the existing space.
    pub fn declare(&mut self, name: &str) -> Space {
        if let Some(&i) = self.index.get(name) {
            return self.spaces[i].clone();
        }
        let space = Space { name: name.to_owned(), order: self.spaces.len() };
        self.index.insert(space.name.clone(), space.order);
        self.spaces.push(space.clone());
        space
    }

    pub fn space(&self, name: &str) -> Result<Space> {
        self.index.get(name)
            .map(|&i| self.spaces[i].clone())
            .ok_or_else(|| Error::UnregisteredSubspace { name: name.to_owned() })
    }

    /// Reject spaces that were not declared in this registry.
    pub fn check(&self, space: &Space) -> Result<()> {
        match self.index.get(&space.name) {
            Some(&i) if i == space.order => Ok(()),
            _ => Err(Error::UnregisteredSubspace { name: space.name.clone() }),
        }
    }
}

/// Binary coupling tree over subspaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Space(Space),
    Pair(Box<Scheme>, Box<Scheme>),
}

impl Scheme {
    pub fn pair(left: Scheme, right: Scheme) -> Self {
        Scheme::Pair(Box::new(left), Box::new(right))
    }

    /// `{{{a b} c} …}` over the given spaces, in registry order.
    pub fn left_nested<I: IntoIterator<Item = Space>>(spaces: I) -> Option<Self> {
        let spaces: BTreeSet<_> = spaces.into_iter().collect();
        let mut iter = spaces.into_iter();
        let first = Scheme::Space(iter.next()?);
        Some(iter.fold(first, |acc, s| Scheme::pair(acc, Scheme::Space(s))))
    }

    pub fn span(&self) -> BTreeSet<Space> {
        let mut span = BTreeSet::new();
        self.collect_span(&mut span);
        span
    }

    fn collect_span(&self, span: &mut BTreeSet<Space>) {
        match *self {
            Scheme::Space(ref s) => {
                span.insert(s.clone());
            }
            Scheme::Pair(ref l, ref r) => {
                l.collect_span(span);
                r.collect_span(span);
            }
        }
    }

    /// Drop the spaces outside of `spaces`, collapsing pairs that lose a
    /// side.  Returns `None` if nothing is left.
    pub fn restrict(&self, spaces: &BTreeSet<Space>) -> Option<Self> {
        match *self {
            Scheme::Space(ref s) => {
                if spaces.contains(s) {
                    Some(self.clone())
                } else {
                    None
                }
            }
            Scheme::Pair(ref l, ref r) => {
                match (l.restrict(spaces), r.restrict(spaces)) {
                    (Some(l), Some(r)) => Some(Scheme::pair(l, r)),
                    (Some(s), None) | (None, Some(s)) => Some(s),
                    (None, None) => None,
                }
            }
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Scheme::Space(ref s) => write!(f, "{}", s),
            Scheme::Pair(ref l, ref r) => write!(f, "({} {})", l, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        let mut reg = Registry::new();
        let rel = reg.declare("rel");
        let spin = reg.declare("spin");
        assert!(rel < spin);
        assert_eq!(reg.declare("rel"), rel);
        assert_eq!(reg.declare("rel").order(), 0);
        assert_eq!(reg.space("spin").unwrap(), spin);
        match reg.space("cm") {
            Err(Error::UnregisteredSubspace { name }) => assert_eq!(name, "cm"),
            r => panic!("unexpected: {:?}", r),
        }
        let mut other = Registry::new();
        let foreign = other.declare("spin");
        assert!(reg.check(&spin).is_ok());
        assert!(reg.check(&foreign).is_err());
    }

    #[test]
    fn test_scheme() {
        let mut reg = Registry::new();
        let a = reg.declare("a");
        let b = reg.declare("b");
        let c = reg.declare("c");
        let scheme = Scheme::left_nested(vec![c.clone(), a.clone(), b.clone()])
            .unwrap();
        assert_eq!(scheme.to_string(), "((a b) c)");
        let ac: BTreeSet<_> = vec![a.clone(), c.clone()].into_iter().collect();
        assert_eq!(scheme.restrict(&ac).unwrap().to_string(), "(a c)");
        let only_b: BTreeSet<_> = vec![b.clone()].into_iter().collect();
        assert_eq!(scheme.restrict(&only_b), Some(Scheme::Space(b)));
        assert_eq!(scheme.span().len(), 3);
        assert_eq!(Scheme::left_nested(Vec::new()), None);
    }
}
