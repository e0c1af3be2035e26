use crate::symbol::Symbol;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An unordered bag of `(variable, positive power)` pairs; the empty bag
/// is the multiplicative identity. Represented as a sorted map so
/// structural equality is bag equality "for free" and canonical
/// ordering (needed by `Polynomial`'s term list) comes along with it.
/// Shared via `Arc` since monomials are immutable once built and get
/// cloned constantly while assembling polynomials; `Arc` (rather than
/// `Rc`) lets bit-width-indexed constant tables live in ordinary
/// process-wide statics (see `bitwidth.rs`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Monomial(Arc<BTreeMap<Symbol, u32>>);

impl Monomial {
    pub fn one() -> Monomial {
        Monomial(Arc::new(BTreeMap::new()))
    }

    pub fn var(name: Symbol) -> Monomial {
        let mut m = BTreeMap::new();
        m.insert(name, 1);
        Monomial(Arc::new(m))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn power(&self, var: Symbol) -> u32 {
        self.0.get(&var).copied().unwrap_or(0)
    }

    pub fn variables(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.keys().copied()
    }

    pub fn is_univariate_linear(&self) -> bool {
        self.0.len() == 1 && *self.0.values().next().unwrap() == 1
    }

    /// The lone variable of a univariate monomial (panics otherwise;
    /// callers are expected to have checked `is_univariate_linear` or
    /// know from context that this monomial has exactly one factor).
    pub fn sole_variable(&self) -> Symbol {
        assert_eq!(self.0.len(), 1, "sole_variable on a non-univariate monomial");
        *self.0.keys().next().unwrap()
    }

    /// `self * other`, with powers of shared variables added.
    pub fn mult(&self, other: &Monomial) -> Monomial {
        let mut m = (*self.0).clone();
        for (&var, &pow) in other.0.iter() {
            *m.entry(var).or_insert(0) += pow;
        }
        Monomial(Arc::new(m))
    }

    /// Peel one factor off the first (lowest-ordered) variable: for
    /// `x*y^2` returns `y^2`; for a univariate `x` returns the empty
    /// monomial. Used by `Polynomial::instantiate` when substituting a
    /// single variable occurrence at a time.
    pub fn lower_first(&self) -> Monomial {
        let mut iter = self.0.iter();
        let Some((&first_var, &first_pow)) = iter.next() else {
            return Monomial::one();
        };
        let mut m = BTreeMap::new();
        if first_pow > 1 {
            m.insert(first_var, first_pow - 1);
        }
        for (&var, &pow) in iter {
            m.insert(var, pow);
        }
        Monomial(Arc::new(m))
    }

    pub fn first_variable(&self) -> Option<Symbol> {
        self.0.keys().next().copied()
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical ordering: shorter (lower-degree) monomials first, then
/// lexicographically by `(variable, power)` pairs. Gives `Polynomial` a
/// stable term order independent of construction order, which is what
/// makes `PartialEq`/`Hash` on a canonicalized `Polynomial` agree with
/// mathematical equality.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.iter().cmp(other.0.iter()))
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "1");
        }
        let mut first = true;
        for (var, pow) in self.0.iter() {
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if *pow == 1 {
                write!(f, "{}", var)?;
            } else {
                write!(f, "{}^{}", var, pow)?;
            }
        }
        Ok(())
    }
}
