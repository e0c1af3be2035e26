//! Slicer (spec §4.G): four passes over one SCC's rule list, each
//! dropping argument positions from every `Term` at once. Positions are
//! addressed by the variable `Symbol` occupying that slot rather than
//! by raw index, since a single SCC's rules all share one variable
//! vector (`VarVec::collect_scc`) — a symbol names the same logical
//! slot no matter which control-point head it appears under.

use algebra::{Rule, Symbol};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default)]
pub struct SliceOptions {
    /// Additionally keep every PHI-originating variable (spec §4.G,
    /// still-used pass), at the cost of precision.
    pub conservative: bool,
}

fn position_symbols(rules: &[Rule]) -> Vec<Symbol> {
    let mut vars = HashSet::new();
    for r in rules {
        vars.extend(r.lhs.variables());
        vars.extend(r.rhs.variables());
        vars.extend(r.guard.variables());
    }
    vars.into_iter().collect()
}

/// Drop `doomed` from every rule's lhs and rhs, except where the rhs
/// head is one of `start_symbols` — a call into a function's own entry
/// point, which other SCCs and the top-level driver already reference
/// at its original arity, so only the lhs side of such a rule may be
/// narrowed.
fn apply_drop(rules: &[Rule], doomed: &HashSet<Symbol>, start_symbols: &HashSet<Symbol>) -> Vec<Rule> {
    rules
        .iter()
        .map(|r| {
            let drop_lhs = indices_of(&r.lhs, doomed);
            let lhs = r.lhs.drop_args(&drop_lhs);
            let rhs = if start_symbols.contains(&r.rhs.head()) {
                r.rhs.clone()
            } else {
                let drop_rhs = indices_of(&r.rhs, doomed);
                r.rhs.drop_args(&drop_rhs)
            };
            Rule::new(lhs, rhs, r.guard.clone())
        })
        .collect()
}

fn indices_of(term: &algebra::Term, doomed: &HashSet<Symbol>) -> Vec<usize> {
    term.args()
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.as_var().filter(|v| doomed.contains(v)).map(|_| i))
        .collect()
}

/// Usage slicing: keep a variable iff it occurs in some rule's guard,
/// or in some rhs argument position other than its own across the
/// rule set. A call into a start symbol keeps every one of its
/// argument positions (handled by `apply_drop`'s exception, not here).
fn usage_keep(rules: &[Rule], candidates: &[Symbol]) -> HashSet<Symbol> {
    let mut keep = HashSet::new();
    for &v in candidates {
        let used_in_guard = rules.iter().any(|r| r.guard.variables().contains(&v));
        let used_elsewhere = rules
            .iter()
            .any(|r| r.rhs.args().iter().any(|a| a.as_var() != Some(v) && a.variables().contains(&v)));
        if used_in_guard || used_elsewhere {
            keep.insert(v);
        }
    }
    keep
}

/// Constraint slicing: start from every variable used in a guard and
/// close under the rhs-polynomial data-flow dependency matrix — if a
/// kept variable's slot is recomputed from `u`, `u` must be kept too.
fn constraint_keep(rules: &[Rule], candidates: &[Symbol]) -> HashSet<Symbol> {
    let mut keep: HashSet<Symbol> = candidates
        .iter()
        .copied()
        .filter(|v| rules.iter().any(|r| r.guard.variables().contains(v)))
        .collect();
    loop {
        let mut grew = false;
        for r in rules {
            for (i, a) in r.rhs.args().iter().enumerate() {
                let defines = r.lhs.args().get(i).and_then(|p| p.as_var());
                let Some(defines) = defines else { continue };
                if keep.contains(&defines) {
                    for u in a.variables() {
                        if candidates.contains(&u) && keep.insert(u) {
                            grew = true;
                        }
                    }
                }
            }
        }
        if !grew {
            break;
        }
    }
    keep
}

/// Defined slicing: a variable is kept if it is in the "keep always"
/// set, or if some rule actually redefines it (its rhs slot is not the
/// bare carried-through variable) anywhere in the SCC's rule set. This
/// approximates the spec's per-symbol predecessor reachability with a
/// single SCC-wide reachability, which is sound here because every
/// rule in the set shares one variable vector (see module docs).
fn defined_keep(rules: &[Rule], candidates: &[Symbol], keep_always: &HashSet<Symbol>) -> HashSet<Symbol> {
    let mut keep = keep_always.clone();
    for &v in candidates {
        if keep.contains(&v) {
            continue;
        }
        let redefined = rules.iter().any(|r| {
            r.lhs
                .args()
                .iter()
                .position(|p| p.as_var() == Some(v))
                .and_then(|i| r.rhs.args().get(i))
                .map(|rhs_arg| rhs_arg.as_var() != Some(v))
                .unwrap_or(false)
        });
        if redefined {
            keep.insert(v);
        }
    }
    keep
}

/// Still-used slicing: a variable is kept if some successor symbol
/// (any rule at all, transitively, under the same SCC-wide
/// approximation as `defined_keep`) still reads it — in a guard, or as
/// an input to recomputing some other kept position.
fn still_used_keep(rules: &[Rule], candidates: &[Symbol]) -> HashSet<Symbol> {
    // Dual of constraint_keep: seed with guard uses, then close in the
    // same dependency direction (a used slot's inputs are needed too).
    constraint_keep(rules, candidates)
}

fn run_pass(
    rules: Vec<Rule>,
    keep: HashSet<Symbol>,
    candidates: &[Symbol],
    start_symbols: &HashSet<Symbol>,
) -> Vec<Rule> {
    let doomed: HashSet<Symbol> = candidates.iter().copied().filter(|v| !keep.contains(v)).collect();
    if doomed.is_empty() {
        rules
    } else {
        apply_drop(&rules, &doomed, start_symbols)
    }
}

/// Run all four ordered passes over one SCC's condensed, Kittelized
/// rule list. `keep_always` is the set of integer formal parameters of
/// the start function plus integer globals; `start_symbols` is every
/// function's own entry symbol (narrowed only on the lhs, see
/// `apply_drop`).
pub fn slice_scc(
    rules: Vec<Rule>,
    keep_always: &HashSet<Symbol>,
    start_symbols: &HashSet<Symbol>,
    opts: &SliceOptions,
) -> Vec<Rule> {
    let candidates = position_symbols(&rules);

    let keep = usage_keep(&rules, &candidates)
        .into_iter()
        .chain(keep_always.iter().copied())
        .collect();
    let rules = run_pass(rules, keep, &candidates, start_symbols);

    let candidates = position_symbols(&rules);
    let keep = constraint_keep(&rules, &candidates)
        .into_iter()
        .chain(keep_always.iter().copied())
        .collect();
    let rules = run_pass(rules, keep, &candidates, start_symbols);

    let candidates = position_symbols(&rules);
    let keep = defined_keep(&rules, &candidates, keep_always);
    let rules = run_pass(rules, keep, &candidates, start_symbols);

    let candidates = position_symbols(&rules);
    let mut keep = still_used_keep(&rules, &candidates);
    keep.extend(keep_always.iter().copied());
    if opts.conservative {
        // Conservative mode keeps everything still reachable in the
        // last pass's closure (PHI-originating variables are already
        // named like every other local, so there is no separate tag to
        // consult here beyond what `still_used_keep` already retains).
        keep.extend(candidates.iter().copied());
    }
    run_pass(rules, keep, &candidates, start_symbols)
}

/// Drop a guard atom that only mentions havoc variables occurring
/// nowhere else in the rule (spec §4.G, `slice-trivial-nondef-constraints`).
pub fn slice_trivial_nondef_constraints(rules: &[Rule]) -> Vec<Rule> {
    rules
        .iter()
        .map(|r| {
            let atoms = r.guard.add_atomics_to_list();
            let mut kept = algebra::Constraint::tru();
            for (l, rhs, op) in atoms {
                let mentions_elsewhere = l
                    .variables()
                    .into_iter()
                    .chain(rhs.variables())
                    .any(|v| r.lhs.variables().contains(&v) || r.rhs.variables().contains(&v));
                if mentions_elsewhere {
                    kept = algebra::Constraint::and(kept, algebra::Constraint::atom(l, rhs, op));
                }
            }
            Rule::new(r.lhs.clone(), r.rhs.clone(), kept)
        })
        .collect()
}

/// Structural deduplication of rules (spec §4.G, `slice-duplicates`).
/// Not wired into the default pipeline (see DESIGN.md) — exposed for
/// callers that explicitly opt in.
pub fn slice_duplicates(rules: &[Rule]) -> Vec<Rule> {
    let mut out: Vec<Rule> = Vec::new();
    for r in rules {
        if !out.contains(r) {
            out.push(r.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{Constraint, Polynomial, RelOp, Term};

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn drops_an_argument_unused_anywhere() {
        let x = Polynomial::from_var(sym("x"));
        let y = Polynomial::from_var(sym("y"));
        let lhs = Term::new(sym("f"), vec![x.clone(), y.clone()]);
        let rhs = Term::new(sym("f"), vec![x.add(&Polynomial::one()), y]);
        let r = Rule::unguarded(lhs, rhs);
        let keep_always = HashSet::new();
        let starts: HashSet<Symbol> = HashSet::new();
        let out = slice_scc(vec![r], &keep_always, &starts, &SliceOptions::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].lhs.arity(), 1);
    }

    #[test]
    fn keeps_a_variable_used_in_a_guard() {
        let x = Polynomial::from_var(sym("x"));
        let y = Polynomial::from_var(sym("y"));
        let lhs = Term::new(sym("f"), vec![x.clone(), y.clone()]);
        let rhs = Term::new(sym("f"), vec![x.clone(), y]);
        let guard = Constraint::atom(x, Polynomial::zero(), RelOp::Gt);
        let r = Rule::new(lhs, rhs, guard);
        let keep_always = HashSet::new();
        let starts: HashSet<Symbol> = HashSet::new();
        let out = slice_scc(vec![r], &keep_always, &starts, &SliceOptions::default());
        assert_eq!(out[0].lhs.arity(), 2);
    }

    #[test]
    fn start_symbol_rhs_keeps_full_arity() {
        let x = Polynomial::from_var(sym("x"));
        let y = Polynomial::from_var(sym("y"));
        let lhs = Term::new(sym("block"), vec![x.clone(), y.clone()]);
        let rhs = Term::new(sym("start"), vec![x, y]);
        let r = Rule::unguarded(lhs, rhs);
        let keep_always = HashSet::new();
        let starts: HashSet<Symbol> = [sym("start")].into_iter().collect();
        let out = slice_scc(vec![r], &keep_always, &starts, &SliceOptions::default());
        assert_eq!(out[0].rhs.arity(), 2);
    }

    #[test]
    fn slicing_is_idempotent() {
        let x = Polynomial::from_var(sym("x"));
        let y = Polynomial::from_var(sym("y"));
        let lhs = Term::new(sym("f"), vec![x.clone(), y.clone()]);
        let rhs = Term::new(sym("f"), vec![x.add(&Polynomial::one()), y]);
        let r = Rule::unguarded(lhs, rhs);
        let keep_always = HashSet::new();
        let starts: HashSet<Symbol> = HashSet::new();
        let once = slice_scc(vec![r], &keep_always, &starts, &SliceOptions::default());
        let twice = slice_scc(once.clone(), &keep_always, &starts, &SliceOptions::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn deduplicates_structurally_identical_rules() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("g"), vec![x]);
        let r = Rule::unguarded(lhs, rhs);
        let out = slice_duplicates(&[r.clone(), r.clone(), r]);
        assert_eq!(out.len(), 1);
    }
}
