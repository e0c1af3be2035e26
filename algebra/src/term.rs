use crate::constraint::Constraint;
use crate::polynomial::Polynomial;
use crate::symbol::Symbol;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(PartialEq, Eq, Hash)]
struct TermData {
    head: Symbol,
    args: Vec<Polynomial>,
}

/// A program location applied to its argument vector: `f(p1, ..., pn)`.
/// The function symbol is a program location (§2's `FunctionId`, or a
/// derived per-block/per-loop location minted by the converter); the
/// arguments are the polynomials carrying that location's live integer
/// state. `Arc`-shared for the same reason `Polynomial` is: rules get
/// cloned freely while passes rewrite the rule list.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term(Arc<TermData>);

impl Term {
    pub fn new(head: Symbol, args: Vec<Polynomial>) -> Term {
        Term(Arc::new(TermData { head, args }))
    }

    pub fn head(&self) -> Symbol {
        self.0.head
    }

    pub fn args(&self) -> &[Polynomial] {
        &self.0.args
    }

    pub fn arity(&self) -> usize {
        self.0.args.len()
    }

    pub fn variables(&self) -> Vec<Symbol> {
        let mut vars: Vec<Symbol> = self.0.args.iter().flat_map(|p| p.variables()).collect();
        vars.sort();
        vars.dedup();
        vars
    }

    pub fn instantiate(&self, sigma: &HashMap<Symbol, Polynomial>) -> Term {
        Term::new(
            self.0.head,
            self.0.args.iter().map(|a| a.instantiate(sigma)).collect(),
        )
    }

    /// Remove the arguments at the given (sorted, deduplicated) indices.
    /// Used by the Slicer, which drops an argument position across every
    /// rule at once and so must keep every `Term` naming that head at
    /// the same reduced arity (invariant: "dropping argument `i` from
    /// one call site drops it everywhere that head appears").
    pub fn drop_args(&self, indices: &[usize]) -> Term {
        let args = self
            .0
            .args
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, a)| a.clone())
            .collect();
        Term::new(self.0.head, args)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.0.head)?;
        for (i, a) in self.0.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", a)?;
        }
        write!(f, ")")
    }
}

/// A rewrite rule `lhs -> rhs [guard]`. The guard defaults to `True` and
/// is expected to be a conjunction of atoms once past the Kittelizer
/// (spec invariant 4); earlier in the pipeline it may still carry
/// disjunction and negation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rule {
    pub lhs: Term,
    pub rhs: Term,
    pub guard: Constraint,
}

impl Rule {
    pub fn new(lhs: Term, rhs: Term, guard: Constraint) -> Rule {
        Rule { lhs, rhs, guard }
    }

    pub fn unguarded(lhs: Term, rhs: Term) -> Rule {
        Rule::new(lhs, rhs, Constraint::tru())
    }

    pub fn variables(&self) -> Vec<Symbol> {
        let mut vars = self.lhs.variables();
        vars.extend(self.rhs.variables());
        vars.extend(self.guard.variables());
        vars.sort();
        vars.dedup();
        vars
    }

    pub fn instantiate(&self, sigma: &HashMap<Symbol, Polynomial>) -> Rule {
        Rule {
            lhs: self.lhs.instantiate(sigma),
            rhs: self.rhs.instantiate(sigma),
            guard: self.guard.instantiate(sigma),
        }
    }

    /// Drop the given argument indices from both sides' `Term`s whenever
    /// their head matches `head` (a no-op side if the head doesn't
    /// match). Used by the Slicer to shrink one program location's
    /// arity across the whole rule set in one pass.
    pub fn drop_args_for(&self, head: Symbol, indices: &[usize]) -> Rule {
        let lhs = if self.lhs.head() == head {
            self.lhs.drop_args(indices)
        } else {
            self.lhs.clone()
        };
        let rhs = if self.rhs.head() == head {
            self.rhs.drop_args(indices)
        } else {
            self.rhs.clone()
        };
        Rule::new(lhs, rhs, self.guard.clone())
    }
}
