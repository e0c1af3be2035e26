use crate::monomial::Monomial;
use crate::symbol::Symbol;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash)]
struct PolyData {
    /// Invariant 1: every entry has a nonzero coefficient, and no two
    /// entries share a `Monomial`. Kept sorted by `Monomial`'s canonical
    /// order so structurally-equal polynomials compare equal via
    /// `#[derive(PartialEq)]` without a normalization pass at every
    /// comparison site.
    terms: Vec<(BigInt, Monomial)>,
    constant: BigInt,
}

/// A constant integer term plus a canonical sequence of
/// `(coefficient, monomial)` pairs. Value-like: built only through the
/// smart constructors below (`add`, `sub`, `mult`, `from_var`, ...),
/// shared cheaply via `Arc`, never mutated in place. `Arc` over `Rc` so
/// the bit-width-indexed constant tables (`bitwidth.rs`) can live in a
/// plain process-wide `static`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Polynomial(Arc<PolyData>);

fn normalize(mut terms: Vec<(BigInt, Monomial)>, constant: BigInt) -> Polynomial {
    // Combine duplicate monomials (can arise from `add`/`sub` merges),
    // drop zero coefficients, then sort into canonical order.
    let mut merged: HashMap<Monomial, BigInt> = HashMap::new();
    for (coeff, mono) in terms.drain(..) {
        *merged.entry(mono).or_insert_with(BigInt::zero) += coeff;
    }
    let mut out: Vec<(BigInt, Monomial)> = merged
        .into_iter()
        .filter(|(_, c)| !c.is_zero())
        .map(|(m, c)| (c, m))
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    Polynomial(Arc::new(PolyData { terms: out, constant }))
}

impl Polynomial {
    pub fn constant<T: Into<BigInt>>(c: T) -> Polynomial {
        normalize(Vec::new(), c.into())
    }

    pub fn zero() -> Polynomial {
        Self::constant(0)
    }

    pub fn one() -> Polynomial {
        Self::constant(1)
    }

    pub fn negative_one() -> Polynomial {
        Self::constant(-1)
    }

    pub fn from_var(name: Symbol) -> Polynomial {
        normalize(vec![(BigInt::one(), Monomial::var(name))], BigInt::zero())
    }

    pub fn from_monomial(mono: Monomial) -> Polynomial {
        if mono.is_empty() {
            Polynomial::one()
        } else {
            normalize(vec![(BigInt::one(), mono)], BigInt::zero())
        }
    }

    pub fn const_term(&self) -> &BigInt {
        &self.0.constant
    }

    pub fn terms(&self) -> &[(BigInt, Monomial)] {
        &self.0.terms
    }

    pub fn is_zero(&self) -> bool {
        self.0.terms.is_empty() && self.0.constant.is_zero()
    }

    pub fn is_constant(&self) -> bool {
        self.0.terms.is_empty()
    }

    pub fn is_var(&self) -> bool {
        self.0.constant.is_zero()
            && self.0.terms.len() == 1
            && self.0.terms[0].0.is_one()
            && self.0.terms[0].1.is_univariate_linear()
    }

    pub fn as_var(&self) -> Option<Symbol> {
        if self.is_var() {
            Some(self.0.terms[0].1.sole_variable())
        } else {
            None
        }
    }

    pub fn as_const(&self) -> Option<&BigInt> {
        if self.is_constant() {
            Some(&self.0.constant)
        } else {
            None
        }
    }

    pub fn is_single_variable_linear(&self) -> bool {
        self.0.terms.len() == 1 && self.0.terms[0].1.is_univariate_linear()
    }

    pub fn is_linear(&self) -> bool {
        self.0.terms.iter().all(|(_, m)| m.is_univariate_linear())
    }

    pub fn variables(&self) -> Vec<Symbol> {
        let mut vars: Vec<Symbol> = self
            .0
            .terms
            .iter()
            .flat_map(|(_, m)| m.variables())
            .collect();
        vars.sort();
        vars.dedup();
        vars
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut terms = self.0.terms.clone();
        terms.extend(other.0.terms.iter().cloned());
        normalize(terms, &self.0.constant + &other.0.constant)
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        let mut terms = self.0.terms.clone();
        terms.extend(other.0.terms.iter().map(|(c, m)| (-c, m.clone())));
        normalize(terms, &self.0.constant - &other.0.constant)
    }

    pub fn negate(&self) -> Polynomial {
        Polynomial::zero().sub(self)
    }

    pub fn const_mult(&self, k: &BigInt) -> Polynomial {
        if k.is_zero() {
            return Polynomial::zero();
        }
        let terms = self
            .0
            .terms
            .iter()
            .map(|(c, m)| (c * k, m.clone()))
            .collect();
        normalize(terms, &self.0.constant * k)
    }

    /// Exact polynomial multiplication — every `(monomial_a, monomial_b)`
    /// cross product is formed; no approximation is taken for
    /// non-linear products, matching the "must be exact" contract.
    pub fn mult(&self, other: &Polynomial) -> Polynomial {
        let mut terms = Vec::new();
        for (ca, ma) in &self.0.terms {
            for (cb, mb) in &other.0.terms {
                terms.push((ca * cb, ma.mult(mb)));
            }
            if !other.0.constant.is_zero() {
                terms.push((ca * &other.0.constant, ma.clone()));
            }
        }
        if !self.0.constant.is_zero() {
            for (cb, mb) in &other.0.terms {
                terms.push((&self.0.constant * cb, mb.clone()));
            }
        }
        let constant = &self.0.constant * &other.0.constant;
        normalize(terms, constant)
    }

    /// Substitute every variable occurrence per `sigma`; variables absent
    /// from `sigma` map to themselves. Re-normalises the result.
    pub fn instantiate(&self, sigma: &HashMap<Symbol, Polynomial>) -> Polynomial {
        let mut result = Polynomial::constant(self.0.constant.clone());
        for (coeff, mono) in &self.0.terms {
            let mut term_poly = Polynomial::constant(coeff.clone());
            // Multiply in one factor at a time, substituting each
            // variable through `sigma` as it is peeled off.
            let mut remaining = mono.clone();
            while !remaining.is_empty() {
                let var = remaining.first_variable().unwrap();
                let factor = sigma
                    .get(&var)
                    .cloned()
                    .unwrap_or_else(|| Polynomial::from_var(var));
                term_poly = term_poly.mult(&factor);
                remaining = remaining.lower_first();
            }
            result = result.add(&term_poly);
        }
        result
    }

    /// `self == other` decided by subtraction, per spec: `p ≡ q` iff
    /// `p - q` is the zero constant.
    pub fn equals(&self, other: &Polynomial) -> bool {
        self.sub(other).is_zero()
    }

    /// Cost, in add/subtract-`2^w` steps, of bringing a univariate
    /// linear polynomial `c1*x + c0` back into range. Returns -1 when
    /// the polynomial is non-linear or a coefficient doesn't fit a
    /// native integer width — see SPEC_FULL §11 for the exact formula,
    /// recovered from the original implementation.
    pub fn norm_steps_needed(&self) -> i64 {
        if self.is_constant() || self.is_var() {
            return 0;
        }
        let mut steps: i64 = 0;
        for (coeff, mono) in &self.0.terms {
            if !mono.is_univariate_linear() {
                return -1;
            }
            let Some(c) = to_i64(coeff) else {
                return -1;
            };
            if c >= 0 {
                steps += c;
            } else {
                steps += -c + 1;
            }
        }
        if !self.0.constant.is_zero() {
            steps += 1;
        }
        steps - 1
    }
}

fn to_i64(v: &BigInt) -> Option<i64> {
    use num_traits::ToPrimitive;
    v.to_i64()
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.terms.is_empty() {
            return write!(f, "{}", self.0.constant);
        }
        let mut first = true;
        for (coeff, mono) in &self.0.terms {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if coeff.is_one() {
                write!(f, "{:?}", mono)?;
            } else if *coeff == -BigInt::one() {
                write!(f, "-{:?}", mono)?;
            } else {
                write!(f, "{}*{:?}", coeff, mono)?;
            }
        }
        if !self.0.constant.is_zero() {
            if self.0.constant.is_positive() {
                write!(f, " + {}", self.0.constant)?;
            } else {
                write!(f, " - {}", -&self.0.constant)?;
            }
        }
        Ok(())
    }
}
