//! T2 format (spec §6, renaming algorithm from SPEC_FULL §11): numeric
//! block labels, each rule a `FROM: n;` … `TO: m;` block with
//! `assume(...)`, `var := expr;`, and `var := nondet();` lines.
//!
//! Write-before-read hazard: a position `i` that is being redefined
//! (`rhs.args()[i] != lhs.args()[i]`) whose old value is also read by
//! some *other* redefined position's expression or by the guard must
//! be snapshotted to `old_<name>` before any assignment is emitted, and
//! every such read substituted accordingly.

use algebra::{Polynomial, Rule, Symbol};
use std::collections::{HashMap, HashSet};

type Sigma = HashMap<Symbol, Polynomial>;

fn block_ids(rules: &[Rule]) -> (HashMap<Symbol, u32>, Vec<Symbol>) {
    let mut ids = HashMap::new();
    let mut order = Vec::new();
    let mut next = 0u32;
    for r in rules {
        for h in [r.lhs.head(), r.rhs.head()] {
            if !ids.contains_key(&h) {
                ids.insert(h, next);
                order.push(h);
                next += 1;
            }
        }
    }
    (ids, order)
}

fn format_poly(p: &Polynomial) -> String {
    format!("{:?}", p)
}

fn rename_poly(p: &Polynomial, sigma: &Sigma) -> Polynomial {
    if sigma.is_empty() {
        p.clone()
    } else {
        p.instantiate(sigma)
    }
}

fn print_block(r: &Rule, ids: &HashMap<Symbol, u32>) -> String {
    let n = r.lhs.arity().min(r.rhs.arity());
    let changed: Vec<usize> = (0..n).filter(|&i| r.rhs.args()[i] != r.lhs.args()[i]).collect();

    let mut read_vars: HashSet<Symbol> = r.guard.variables().into_iter().collect();
    for &i in &changed {
        read_vars.extend(r.rhs.args()[i].variables());
    }

    let mut sigma: Sigma = HashMap::new();
    let mut snapshots = Vec::new();
    for &i in &changed {
        if let Some(v) = r.lhs.args()[i].as_var() {
            if read_vars.contains(&v) {
                let old = Symbol::intern(&format!("old_{v}"));
                sigma.insert(v, Polynomial::from_var(old));
                snapshots.push((old, v));
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("FROM: {};\n", ids[&r.lhs.head()]));
    for (old, v) in &snapshots {
        out.push_str(&format!("  {old} := {v};\n"));
    }
    if !r.guard.is_true() {
        for (l, rhs, op) in r.guard.add_atomics_to_list() {
            let l = rename_poly(&l, &sigma);
            let rhs = rename_poly(&rhs, &sigma);
            out.push_str(&format!("  assume({} {} {});\n", format_poly(&l), op.kittel_str(), format_poly(&rhs)));
        }
    }
    for &i in &changed {
        let Some(target) = r.lhs.args().get(i).and_then(|p| p.as_var()) else {
            continue;
        };
        let expr = &r.rhs.args()[i];
        if let Some(v) = expr.as_var() {
            if !r.lhs.variables().contains(&v) {
                out.push_str(&format!("  {target} := nondet();\n"));
                continue;
            }
        }
        let renamed = rename_poly(expr, &sigma);
        out.push_str(&format!("  {target} := {};\n", format_poly(&renamed)));
    }
    out.push_str(&format!("TO: {};\n", ids[&r.rhs.head()]));
    out
}

pub fn print_t2(rules: &[Rule], start: Symbol) -> String {
    let (ids, order) = block_ids(rules);
    let mut out = String::new();
    out.push_str(&format!("START: {};\n", ids.get(&start).copied().unwrap_or(0)));
    for h in &order {
        out.push_str(&format!("; location {} = {}\n", ids[h], h));
    }
    for r in rules {
        out.push_str(&print_block(r, &ids));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{Constraint, RelOp, Term};

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn emits_assignment_for_a_redefined_position() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("f"), vec![x.add(&Polynomial::one())]);
        let r = Rule::unguarded(lhs, rhs);
        let out = print_t2(&[r], sym("f"));
        assert!(out.contains("x :="));
    }

    #[test]
    fn emits_nondet_for_a_fresh_havoc_variable() {
        let x = Polynomial::from_var(sym("x"));
        let z = Polynomial::from_var(sym("z0"));
        let lhs = Term::new(sym("f"), vec![x]);
        let rhs = Term::new(sym("f"), vec![z]);
        let r = Rule::unguarded(lhs, rhs);
        let out = print_t2(&[r], sym("f"));
        assert!(out.contains("nondet()"));
    }

    #[test]
    fn snapshots_a_variable_read_after_being_overwritten() {
        let x = Polynomial::from_var(sym("x"));
        let y = Polynomial::from_var(sym("y"));
        let lhs = Term::new(sym("f"), vec![x.clone(), y.clone()]);
        // x := y; y := x;  (a swap) — both reads need the pre-rule value.
        let rhs = Term::new(sym("f"), vec![y, x]);
        let r = Rule::unguarded(lhs, rhs);
        let out = print_t2(&[r], sym("f"));
        assert!(out.contains("old_x") || out.contains("old_y"));
    }

    #[test]
    fn guard_atoms_become_assume_statements() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("f"), vec![x.clone()]);
        let guard = Constraint::atom(x, Polynomial::zero(), RelOp::Gt);
        let r = Rule::new(lhs, rhs, guard);
        let out = print_t2(&[r], sym("f"));
        assert!(out.contains("assume("));
    }
}
