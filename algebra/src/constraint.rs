use crate::polynomial::Polynomial;
use crate::symbol::Symbol;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RelOp {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl RelOp {
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Ne,
            RelOp::Ne => RelOp::Eq,
            RelOp::Ge => RelOp::Lt,
            RelOp::Gt => RelOp::Le,
            RelOp::Le => RelOp::Gt,
            RelOp::Lt => RelOp::Ge,
        }
    }

    /// `a R b` iff `b R' a` for the returned `R'` — used when a
    /// comparison needs its operands swapped (e.g. building the dual
    /// `or` case from an `and` case).
    pub fn flip_sides(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Eq,
            RelOp::Ne => RelOp::Ne,
            RelOp::Ge => RelOp::Le,
            RelOp::Gt => RelOp::Lt,
            RelOp::Le => RelOp::Ge,
            RelOp::Lt => RelOp::Gt,
        }
    }

    pub fn eval(self, a: &num_bigint::BigInt, b: &num_bigint::BigInt) -> bool {
        match self {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            RelOp::Ge => a >= b,
            RelOp::Gt => a > b,
            RelOp::Le => a <= b,
            RelOp::Lt => a < b,
        }
    }

    pub fn kittel_str(self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Ne => "!=",
            RelOp::Ge => ">=",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Lt => "<",
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum Node {
    True,
    False,
    /// Unknown/unmodelled condition (e.g. a floating-point predicate).
    /// Preserved through every rewrite rather than collapsed, and
    /// treated conservatively (as an unconstrained guard) by consumers.
    Nondef,
    Atom(Polynomial, Polynomial, RelOp),
    Not(Constraint),
    And(Constraint, Constraint),
    Or(Constraint, Constraint),
}

/// Algebraic data type over atomic comparisons. Value-like and
/// `Arc`-shared like `Polynomial`; built only through the canonicalizing
/// constructors below, which fold the trivial cases spec §3 names
/// (`True ∧ x = x`, `False ∧ x = False`, double negation, constant
/// atoms evaluated eagerly) so a constraint tree never carries
/// structurally-removable redundancy.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Constraint(Arc<Node>);

impl Constraint {
    pub fn tru() -> Constraint {
        Constraint(Arc::new(Node::True))
    }

    pub fn fals() -> Constraint {
        Constraint(Arc::new(Node::False))
    }

    pub fn nondef() -> Constraint {
        Constraint(Arc::new(Node::Nondef))
    }

    pub fn is_true(&self) -> bool {
        matches!(&*self.0, Node::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(&*self.0, Node::False)
    }

    pub fn is_nondef(&self) -> bool {
        matches!(&*self.0, Node::Nondef)
    }

    pub fn atom(lhs: Polynomial, rhs: Polynomial, op: RelOp) -> Constraint {
        if let (Some(a), Some(b)) = (lhs.as_const(), rhs.as_const()) {
            return if op.eval(a, b) {
                Constraint::tru()
            } else {
                Constraint::fals()
            };
        }
        Constraint(Arc::new(Node::Atom(lhs, rhs, op)))
    }

    pub fn not(c: Constraint) -> Constraint {
        match &*c.0 {
            Node::True => Constraint::fals(),
            Node::False => Constraint::tru(),
            Node::Nondef => Constraint::nondef(),
            Node::Not(inner) => inner.clone(),
            _ => Constraint(Arc::new(Node::Not(c))),
        }
    }

    pub fn and(a: Constraint, b: Constraint) -> Constraint {
        if a.is_true() {
            return b;
        }
        if b.is_true() {
            return a;
        }
        if a.is_false() || b.is_false() {
            return Constraint::fals();
        }
        Constraint(Arc::new(Node::And(a, b)))
    }

    pub fn or(a: Constraint, b: Constraint) -> Constraint {
        if a.is_true() || b.is_true() {
            return Constraint::tru();
        }
        if a.is_false() {
            return b;
        }
        if b.is_false() {
            return a;
        }
        Constraint(Arc::new(Node::Or(a, b)))
    }

    /// Right-associate an n-ary conjunction, per spec §3's representation
    /// note for `And`.
    pub fn conjunction(atoms: impl IntoIterator<Item = Constraint>) -> Constraint {
        let mut atoms: Vec<Constraint> = atoms.into_iter().collect();
        let mut acc = Constraint::tru();
        while let Some(a) = atoms.pop() {
            acc = Constraint::and(a, acc);
        }
        acc
    }

    pub fn disjunction(atoms: impl IntoIterator<Item = Constraint>) -> Constraint {
        let mut atoms: Vec<Constraint> = atoms.into_iter().collect();
        let mut acc = Constraint::fals();
        while let Some(a) = atoms.pop() {
            acc = Constraint::or(a, acc);
        }
        acc
    }

    /// Push negation through `And`/`Or` (De Morgan), flip atom relops,
    /// flip `True`/`False`, leave `Nondef` untouched.
    pub fn to_nnf(&self, negate: bool) -> Constraint {
        match &*self.0 {
            Node::True => {
                if negate {
                    Constraint::fals()
                } else {
                    Constraint::tru()
                }
            }
            Node::False => {
                if negate {
                    Constraint::tru()
                } else {
                    Constraint::fals()
                }
            }
            Node::Nondef => Constraint::nondef(),
            Node::Atom(l, r, op) => {
                let op = if negate { op.negate() } else { *op };
                Constraint::atom(l.clone(), r.clone(), op)
            }
            Node::Not(inner) => inner.to_nnf(!negate),
            Node::And(a, b) => {
                if negate {
                    Constraint::or(a.to_nnf(true), b.to_nnf(true))
                } else {
                    Constraint::and(a.to_nnf(false), b.to_nnf(false))
                }
            }
            Node::Or(a, b) => {
                if negate {
                    Constraint::and(a.to_nnf(true), b.to_nnf(true))
                } else {
                    Constraint::or(a.to_nnf(false), b.to_nnf(false))
                }
            }
        }
    }

    /// Replace every `a != b` atom with `(a < b) ∨ (a > b)`.
    pub fn eliminate_neq(&self) -> Constraint {
        match &*self.0 {
            Node::Atom(l, r, RelOp::Ne) => Constraint::or(
                Constraint::atom(l.clone(), r.clone(), RelOp::Lt),
                Constraint::atom(l.clone(), r.clone(), RelOp::Gt),
            ),
            Node::True | Node::False | Node::Nondef | Node::Atom(..) => self.clone(),
            Node::Not(c) => Constraint::not(c.eliminate_neq()),
            Node::And(a, b) => Constraint::and(a.eliminate_neq(), b.eliminate_neq()),
            Node::Or(a, b) => Constraint::or(a.eliminate_neq(), b.eliminate_neq()),
        }
    }

    /// Re-evaluate every atom whose both sides are constants; a no-op if
    /// every atom was already built through `Constraint::atom` (which
    /// evaluates eagerly), but idempotent and safe to call on a tree
    /// assembled without going through the smart constructor, e.g. after
    /// raw substitution.
    pub fn evaluate_trivial_atoms(&self) -> Constraint {
        match &*self.0 {
            Node::True | Node::False | Node::Nondef => self.clone(),
            Node::Atom(l, r, op) => Constraint::atom(l.clone(), r.clone(), *op),
            Node::Not(c) => Constraint::not(c.evaluate_trivial_atoms()),
            Node::And(a, b) => {
                Constraint::and(a.evaluate_trivial_atoms(), b.evaluate_trivial_atoms())
            }
            Node::Or(a, b) => Constraint::or(a.evaluate_trivial_atoms(), b.evaluate_trivial_atoms()),
        }
    }

    /// Flatten an existing `Or`-tree (as produced by `to_dnf`) into its
    /// top-level disjuncts, without distributing `And` over `Or`.
    pub fn add_dual_clauses_to_list(&self) -> Vec<Constraint> {
        match &*self.0 {
            Node::Or(a, b) => {
                let mut v = a.add_dual_clauses_to_list();
                v.extend(b.add_dual_clauses_to_list());
                v
            }
            Node::False => vec![],
            _ => vec![self.clone()],
        }
    }

    /// Distribute `And` over `Or` into a flat list of conjunctive
    /// clauses, pruning any clause the oracle reports unsatisfiable.
    /// Requires NNF input (no stray `Not` reaching here after `to_nnf`).
    pub fn to_dnf_clauses(&self, elim: &dyn ShouldEliminate) -> Vec<Constraint> {
        self.dnf_raw()
            .into_iter()
            .filter(|c| !elim.should_eliminate(c))
            .collect()
    }

    pub fn to_dnf(&self, elim: &dyn ShouldEliminate) -> Constraint {
        Constraint::disjunction(self.to_dnf_clauses(elim))
    }

    fn dnf_raw(&self) -> Vec<Constraint> {
        match &*self.0 {
            Node::False => vec![],
            Node::True | Node::Nondef | Node::Atom(..) => vec![self.clone()],
            Node::Not(inner) => inner.to_nnf(true).dnf_raw(),
            Node::Or(a, b) => {
                let mut v = a.dnf_raw();
                v.extend(b.dnf_raw());
                v
            }
            Node::And(a, b) => {
                let left = a.dnf_raw();
                let right = b.dnf_raw();
                let mut out = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        out.push(Constraint::and(l.clone(), r.clone()));
                    }
                }
                out
            }
        }
    }

    /// Collect every atom leaf, in left-to-right traversal order.
    pub fn add_atomics_to_list(&self) -> Vec<(Polynomial, Polynomial, RelOp)> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut Vec<(Polynomial, Polynomial, RelOp)>) {
        match &*self.0 {
            Node::True | Node::False | Node::Nondef => {}
            Node::Atom(l, r, op) => out.push((l.clone(), r.clone(), *op)),
            Node::Not(c) => c.collect_atoms(out),
            Node::And(a, b) | Node::Or(a, b) => {
                a.collect_atoms(out);
                b.collect_atoms(out);
            }
        }
    }

    pub fn variables(&self) -> Vec<Symbol> {
        let mut vars = Vec::new();
        for (l, r, _) in self.add_atomics_to_list() {
            vars.extend(l.variables());
            vars.extend(r.variables());
        }
        vars.sort();
        vars.dedup();
        vars
    }

    pub fn instantiate(&self, sigma: &HashMap<Symbol, Polynomial>) -> Constraint {
        match &*self.0 {
            Node::True | Node::False | Node::Nondef => self.clone(),
            Node::Atom(l, r, op) => {
                Constraint::atom(l.instantiate(sigma), r.instantiate(sigma), *op)
            }
            Node::Not(c) => Constraint::not(c.instantiate(sigma)),
            Node::And(a, b) => Constraint::and(a.instantiate(sigma), b.instantiate(sigma)),
            Node::Or(a, b) => Constraint::or(a.instantiate(sigma), b.instantiate(sigma)),
        }
    }

    /// True only for a conjunction (possibly trivial) of atoms — the
    /// shape every guard must have after the Kittelizer (invariant 4).
    pub fn is_conjunction_of_atoms(&self) -> bool {
        match &*self.0 {
            Node::True | Node::Atom(..) => true,
            Node::And(a, b) => a.is_conjunction_of_atoms() && b.is_conjunction_of_atoms(),
            Node::False | Node::Nondef | Node::Not(_) | Node::Or(..) => false,
        }
    }
}

/// External SMT-solver capability Kittelizer's DNF step consults to drop
/// unsatisfiable disjuncts. The default `NoSolver` always returns
/// `false`, which keeps the pipeline functional (if less precise)
/// without an external process.
pub trait ShouldEliminate {
    fn should_eliminate(&self, c: &Constraint) -> bool;
}

pub struct NoSolver;

impl ShouldEliminate for NoSolver {
    fn should_eliminate(&self, _c: &Constraint) -> bool {
        false
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::True => write!(f, "True"),
            Node::False => write!(f, "False"),
            Node::Nondef => write!(f, "Nondef"),
            Node::Atom(l, r, op) => write!(f, "{:?} {} {:?}", l, op.kittel_str(), r),
            Node::Not(c) => write!(f, "!({:?})", c),
            Node::And(a, b) => write!(f, "({:?} /\\ {:?})", a, b),
            Node::Or(a, b) => write!(f, "({:?} \\/ {:?})", a, b),
        }
    }
}
