//! Kittelizer (spec §4.F): flatten each rule's guard into a list of
//! conjunctive clauses and emit one rule per surviving clause, so every
//! rule that comes out the other end has a guard that is a plain
//! conjunction of atoms (no `Or`, no `Not`, no `!=`, no `False`).

use algebra::{Constraint, Rule, ShouldEliminate};

/// Run a single rule's guard through the three-step reduction and
/// return the surviving (guard, original lhs/rhs unchanged) clauses.
fn clauses_for(guard: &Constraint, elim: &dyn ShouldEliminate) -> Vec<Constraint> {
    let reduced = guard.evaluate_trivial_atoms().eliminate_neq();
    reduced
        .to_dnf(elim)
        .add_dual_clauses_to_list()
        .into_iter()
        .filter(|c| !c.is_false())
        .map(|c| {
            if c.add_atomics_to_list().is_empty() {
                Constraint::tru()
            } else {
                c
            }
        })
        .collect()
}

pub fn kittelize(rules: &[Rule], elim: &dyn ShouldEliminate) -> Vec<Rule> {
    let mut out = Vec::new();
    for r in rules {
        for guard in clauses_for(&r.guard, elim) {
            out.push(Rule::new(r.lhs.clone(), r.rhs.clone(), guard));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{NoSolver, Polynomial, RelOp, Symbol, Term};

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    fn rule_with_guard(guard: Constraint) -> Rule {
        let lhs = Term::new(sym("f"), vec![Polynomial::from_var(sym("x"))]);
        let rhs = Term::new(sym("g"), vec![Polynomial::from_var(sym("x"))]);
        Rule::new(lhs, rhs, guard)
    }

    #[test]
    fn or_guard_splits_into_two_rules() {
        let x = Polynomial::from_var(sym("x"));
        let a = Constraint::atom(x.clone(), Polynomial::zero(), RelOp::Gt);
        let b = Constraint::atom(x, Polynomial::zero(), RelOp::Lt);
        let r = rule_with_guard(Constraint::or(a, b));
        let out = kittelize(&[r], &NoSolver);
        assert_eq!(out.len(), 2);
        for rule in &out {
            assert!(rule.guard.is_conjunction_of_atoms());
        }
    }

    #[test]
    fn neq_atom_is_eliminated_before_splitting() {
        let x = Polynomial::from_var(sym("x"));
        let r = rule_with_guard(Constraint::atom(x, Polynomial::zero(), RelOp::Ne));
        let out = kittelize(&[r], &NoSolver);
        assert_eq!(out.len(), 2);
        for rule in &out {
            assert!(rule.guard.is_conjunction_of_atoms());
        }
    }

    #[test]
    fn nondef_only_clause_becomes_true() {
        let r = rule_with_guard(Constraint::nondef());
        let out = kittelize(&[r], &NoSolver);
        assert_eq!(out.len(), 1);
        assert!(out[0].guard.is_true());
    }

    #[test]
    fn false_clause_is_dropped() {
        let r = rule_with_guard(Constraint::fals());
        let out = kittelize(&[r], &NoSolver);
        assert!(out.is_empty());
    }

    #[test]
    fn already_conjunctive_guard_is_preserved() {
        let x = Polynomial::from_var(sym("x"));
        let guard = Constraint::atom(x, Polynomial::zero(), RelOp::Ge);
        let r = rule_with_guard(guard.clone());
        let out = kittelize(&[r], &NoSolver);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].guard, guard);
    }
}
