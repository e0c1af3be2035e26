//! Bound-Constrainer (spec §4.H): under bounded-integer encoding, every
//! rule argument that is not already a bare variable or constant must
//! be re-wrapped into `[low, high]`. The simple case just conjoins
//! bound atoms onto the guard; the normalising case routes the rule
//! through a short chain of auxiliary symbols so the wrap itself is
//! expressed as rewrite steps rather than evaluated in place.

use algebra::bitwidth::{self, Signedness};
use algebra::{Constraint, FreshNames, Polynomial, RelOp, Rule, Symbol, Term};
use std::collections::HashMap;

pub struct BoundConstrainerOptions {
    pub signedness: Signedness,
}

fn is_var_or_const(p: &Polynomial) -> bool {
    p.is_var() || p.is_constant()
}

fn bound_atom(v: Symbol, w: u32, signedness: Signedness) -> Constraint {
    let (low, high) = bitwidth::range(w, signedness);
    let poly = Polynomial::from_var(v);
    Constraint::and(
        Constraint::atom(poly.clone(), low, RelOp::Ge),
        Constraint::atom(poly, high, RelOp::Le),
    )
}

fn bounds_for(vars: &[Symbol], widths: &HashMap<Symbol, u32>, signedness: Signedness) -> Constraint {
    let atoms = vars
        .iter()
        .filter_map(|v| widths.get(v).map(|&w| bound_atom(*v, w, signedness)));
    Constraint::conjunction(atoms)
}

fn is_simple_case(rule: &Rule) -> bool {
    let rhs_ok = rule.rhs.args().iter().all(is_var_or_const);
    let guard_ok = rule
        .guard
        .add_atomics_to_list()
        .iter()
        .all(|(l, r, _)| is_var_or_const(l) && is_var_or_const(r));
    rhs_ok && guard_ok
}

/// Wrap an out-of-range linear polynomial back into `[low, high]` by
/// repeatedly adding/subtracting `2^w`, bounded by
/// `Polynomial::norm_steps_needed`. Non-linear or otherwise
/// unresolvable shapes (`norm_steps_needed() < 0`) are left as-is and
/// reported via `have_to_keep`, matching the spec's "exhaustive wrap
/// cannot be statically unrolled" bookkeeping.
fn normalize_arg(
    p: &Polynomial,
    w: u32,
    signedness: Signedness,
    have_to_keep: &mut bool,
) -> Polynomial {
    let steps = p.norm_steps_needed();
    if steps < 0 {
        *have_to_keep = true;
        return p.clone();
    }
    let (low, high) = bitwidth::range(w, signedness);
    let modulus = bitwidth::power_of_two(w);
    let mut cur = p.clone();
    let cap = steps.max(0) as u64 + 1;
    for _ in 0..cap {
        if let (Some(c), Some(lo), Some(hi)) = (cur.as_const(), low.as_const(), high.as_const()) {
            if c < lo {
                cur = cur.add(&modulus);
                continue;
            }
            if c > hi {
                cur = cur.sub(&modulus);
                continue;
            }
            break;
        }
        // Symbolic (non-constant) shape: the wrap is expressed as a
        // rewrite step on the auxiliary symbol rather than resolved
        // here; leave the polynomial for the chain below to correct.
        break;
    }
    cur
}

fn normalizing_chain(
    rule: &Rule,
    widths: &HashMap<Symbol, u32>,
    opts: &BoundConstrainerOptions,
    fresh: &mut FreshNames,
    have_to_keep: &mut bool,
) -> Vec<Rule> {
    let bounds_l = bounds_for(&rule.lhs.variables(), widths, opts.signedness);
    let bounds_r = bounds_for(&rule.rhs.variables(), widths, opts.signedness);

    let f_cond_norm = fresh.next();
    let f_block = fresh.next();
    let f_rule_norm = fresh.next();

    let mut out = Vec::new();

    let cond_norm_entry = Term::new(f_cond_norm, rule.lhs.args().to_vec());
    out.push(Rule::new(rule.lhs.clone(), cond_norm_entry.clone(), bounds_l));

    let renamed_guard = rule.guard.clone();
    let block_entry = Term::new(f_block, rule.lhs.args().to_vec());
    out.push(Rule::new(cond_norm_entry, block_entry.clone(), renamed_guard));

    let normalized_rhs: Vec<Polynomial> = rule
        .rhs
        .args()
        .iter()
        .map(|a| {
            if is_var_or_const(a) {
                a.clone()
            } else {
                let w = a
                    .variables()
                    .iter()
                    .filter_map(|v| widths.get(v))
                    .max()
                    .copied()
                    .unwrap_or(64);
                normalize_arg(a, w, opts.signedness, have_to_keep)
            }
        })
        .collect();
    let rule_norm_entry = Term::new(f_rule_norm, normalized_rhs);
    out.push(Rule::unguarded(block_entry, rule_norm_entry.clone()));
    out.push(Rule::new(rule_norm_entry, rule.rhs.clone(), bounds_r));

    out
}

/// Run the bound constrainer over one SCC's rule list. Returns the
/// rewritten rules; `have_to_keep` reports whether any rule hit a
/// non-linear shape whose wrap could not be statically resolved, in
/// which case its auxiliary chain must be kept (not collapsed by a
/// later trimming pass).
pub fn constrain_bounds(
    rules: &[Rule],
    widths: &HashMap<Symbol, u32>,
    opts: &BoundConstrainerOptions,
    fresh: &mut FreshNames,
) -> (Vec<Rule>, bool) {
    let mut out = Vec::new();
    let mut have_to_keep = false;
    for r in rules {
        if is_simple_case(r) {
            let vars: Vec<Symbol> = r
                .lhs
                .variables()
                .into_iter()
                .chain(r.rhs.variables())
                .collect();
            let bounds = bounds_for(&vars, widths, opts.signedness);
            out.push(Rule::new(r.lhs.clone(), r.rhs.clone(), Constraint::and(r.guard.clone(), bounds)));
        } else {
            out.extend(normalizing_chain(r, widths, opts, fresh, &mut have_to_keep));
        }
    }
    (out, have_to_keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::Symbol as Sym;

    fn sym(s: &str) -> Sym {
        Sym::intern(s)
    }

    #[test]
    fn simple_case_adds_bound_guard() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("f"), vec![x]);
        let r = Rule::unguarded(lhs, rhs);
        let mut widths = HashMap::new();
        widths.insert(sym("x"), 32);
        let opts = BoundConstrainerOptions { signedness: Signedness::Signed };
        let mut fresh = FreshNames::new("b");
        let (out, keep) = constrain_bounds(&[r], &widths, &opts, &mut fresh);
        assert_eq!(out.len(), 1);
        assert!(!keep);
        assert!(out[0].guard.is_conjunction_of_atoms());
    }

    #[test]
    fn non_variable_rhs_goes_through_normalizing_chain() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("f"), vec![x.add(&Polynomial::one())]);
        let r = Rule::unguarded(lhs, rhs);
        let mut widths = HashMap::new();
        widths.insert(sym("x"), 8);
        let opts = BoundConstrainerOptions { signedness: Signedness::Unsigned };
        let mut fresh = FreshNames::new("b");
        let (out, _keep) = constrain_bounds(&[r], &widths, &opts, &mut fresh);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].lhs.head(), sym("f"));
        assert_eq!(out.last().unwrap().rhs.head(), sym("f"));
    }
}
