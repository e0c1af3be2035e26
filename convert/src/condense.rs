//! `get_condensed_rules` (spec §4.E): collapse the per-instruction chain
//! down to rules between control points only, by repeatedly
//! instantiating intermediate rules and conjoining their guards.

use algebra::{Constraint, Polynomial, Rule, Symbol, Term};
use std::collections::{HashMap, HashSet};

fn build_sigma(formal: &Term, actual: &Term) -> HashMap<Symbol, Polynomial> {
    formal
        .args()
        .iter()
        .zip(actual.args().iter())
        .filter_map(|(f, a)| f.as_var().map(|sym| (sym, a.clone())))
        .collect()
}

fn walk(
    lhs: &Term,
    term: &Term,
    guard: &Constraint,
    rules_by_head: &HashMap<Symbol, Vec<Rule>>,
    control_points: &HashSet<Symbol>,
    out: &mut Vec<Rule>,
) {
    if control_points.contains(&term.head()) {
        out.push(Rule::new(lhs.clone(), term.clone(), guard.clone()));
        return;
    }
    let Some(candidates) = rules_by_head.get(&term.head()) else {
        return;
    };
    for r in candidates {
        let sigma = build_sigma(&r.lhs, term);
        let new_guard = Constraint::and(guard.clone(), r.guard.instantiate(&sigma));
        let new_rhs = r.rhs.instantiate(&sigma);
        walk(lhs, &new_rhs, &new_guard, rules_by_head, control_points, out);
    }
}

/// Split `rules` by whether the lhs head is a control point; walk every
/// starting rule's successor chain through the non-control-point
/// ("intermediate") rules until a control point is reached, producing
/// one condensed rule per surviving path.
pub fn get_condensed_rules(rules: &[Rule], control_points: &HashSet<Symbol>) -> Vec<Rule> {
    let mut starting = Vec::new();
    let mut rules_by_head: HashMap<Symbol, Vec<Rule>> = HashMap::new();
    for r in rules {
        if control_points.contains(&r.lhs.head()) {
            starting.push(r.clone());
        } else {
            rules_by_head.entry(r.lhs.head()).or_default().push(r.clone());
        }
    }

    let mut out = Vec::new();
    for r in &starting {
        walk(&r.lhs, &r.rhs, &r.guard, &rules_by_head, control_points, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::RelOp;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    fn var_term(head: &str, vars: &[&str]) -> Term {
        Term::new(sym(head), vars.iter().map(|v| Polynomial::from_var(sym(v))).collect())
    }

    #[test]
    fn chains_through_a_single_intermediate_rule() {
        let cps: HashSet<Symbol> = [sym("start"), sym("stop")].into_iter().collect();
        let r0 = Rule::unguarded(var_term("start", &["x"]), var_term("p0", &["x"]));
        let r1 = Rule::new(
            var_term("p0", &["x"]),
            Term::new(sym("stop"), vec![Polynomial::from_var(sym("x")).add(&Polynomial::one())]),
            Constraint::atom(Polynomial::from_var(sym("x")), Polynomial::zero(), RelOp::Gt),
        );
        let condensed = get_condensed_rules(&[r0, r1], &cps);
        assert_eq!(condensed.len(), 1);
        assert_eq!(condensed[0].lhs.head(), sym("start"));
        assert_eq!(condensed[0].rhs.head(), sym("stop"));
    }

    #[test]
    fn branches_at_a_case_split() {
        let cps: HashSet<Symbol> = [sym("start"), sym("stop")].into_iter().collect();
        let r0 = Rule::unguarded(var_term("start", &["x"]), var_term("p0", &["x"]));
        let guard_pos = Constraint::atom(Polynomial::from_var(sym("x")), Polynomial::zero(), RelOp::Ge);
        let guard_neg = Constraint::atom(Polynomial::from_var(sym("x")), Polynomial::zero(), RelOp::Lt);
        let r1 = Rule::new(var_term("p0", &["x"]), var_term("stop", &["x"]), guard_pos);
        let r2 = Rule::new(var_term("p0", &["x"]), var_term("stop", &["x"]), guard_neg);
        let condensed = get_condensed_rules(&[r0, r1, r2], &cps);
        assert_eq!(condensed.len(), 2);
    }

    #[test]
    fn idempotent_on_already_condensed_rules() {
        let cps: HashSet<Symbol> = [sym("start"), sym("stop")].into_iter().collect();
        let r0 = Rule::unguarded(var_term("start", &["x"]), var_term("stop", &["x"]));
        let once = get_condensed_rules(&[r0], &cps);
        let twice = get_condensed_rules(&once, &cps);
        assert_eq!(once, twice);
    }
}
