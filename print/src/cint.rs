//! CInt / complexity-tuple format (spec §6): header block `(GOAL
//! COMPLEXITY)(STARTTERM …)(VAR …)(RULES …)`, rules grouped by lhs head
//! and wrapped `lhs -> Com_n(rhs1, …, rhsn)` — the guard is dropped (a
//! sound over-approximation for an upper-bound complexity analysis).
//! The "uniform" variant additionally renames every symbol's argument
//! vector to a canonical `x0..xn` sequence (SPEC_FULL §11's internal
//! consistency check: every occurrence of a head must agree on arity).

use algebra::{Polynomial, Rule, Symbol, Term};
use core_error::{CoreError, CoreResult};
use std::collections::HashMap;

fn format_term(t: &Term) -> String {
    format!("{:?}", t)
}

pub fn print_cint(rules: &[Rule], start: Symbol, uniform: bool) -> CoreResult<String> {
    let mut order: Vec<Symbol> = Vec::new();
    let mut groups: HashMap<Symbol, Vec<&Rule>> = HashMap::new();
    for r in rules {
        let h = r.lhs.head();
        if !groups.contains_key(&h) {
            order.push(h);
        }
        groups.entry(h).or_default().push(r);
    }

    let mut canonical: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
    for h in &order {
        let rs = &groups[h];
        let arity = rs[0].lhs.arity();
        for r in rs {
            if r.lhs.arity() != arity {
                return Err(CoreError::UnexpectedAlgebraicShape(format!(
                    "symbol {h} printed with inconsistent arity ({} vs {arity})",
                    r.lhs.arity()
                )));
            }
        }
        let names: Vec<Symbol> = if uniform {
            (0..arity).map(|i| Symbol::intern(&format!("{h}_{i}"))).collect()
        } else {
            rs[0]
                .lhs
                .args()
                .iter()
                .enumerate()
                .map(|(i, a)| a.as_var().unwrap_or_else(|| Symbol::intern(&format!("{h}_{i}"))))
                .collect()
        };
        canonical.insert(*h, names);
    }

    let mut vars: Vec<Symbol> = canonical.values().flatten().copied().collect();
    vars.sort();
    vars.dedup();

    let mut out = String::new();
    out.push_str("(GOAL COMPLEXITY)\n");
    out.push_str(&format!("(STARTTERM (FUNCTIONSYMBOLS {start}))\n"));
    out.push_str(&format!(
        "(VAR {})\n",
        vars.iter().map(Symbol::to_string).collect::<Vec<_>>().join(" ")
    ));
    out.push_str("(RULES\n");
    for h in &order {
        let names = &canonical[h];
        let lhs_args: Vec<Polynomial> = names.iter().map(|s| Polynomial::from_var(*s)).collect();
        let lhs_str = format_term(&Term::new(*h, lhs_args));

        let rs = &groups[h];
        let sigma: HashMap<Symbol, Polynomial> = if uniform {
            rs[0]
                .lhs
                .args()
                .iter()
                .zip(names.iter())
                .filter_map(|(a, n)| a.as_var().map(|v| (v, Polynomial::from_var(*n))))
                .collect()
        } else {
            HashMap::new()
        };

        let mut rhss: Vec<Term> = Vec::new();
        for r in rs {
            let rhs = if uniform { r.rhs.instantiate(&sigma) } else { r.rhs.clone() };
            if !rhss.contains(&rhs) {
                rhss.push(rhs);
            }
        }
        let rhs_strs: Vec<String> = rhss.iter().map(format_term).collect();
        out.push_str(&format!("  {} -> Com_{}({})\n", lhs_str, rhss.len(), rhs_strs.join(", ")));
    }
    out.push_str(")\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{Constraint, RelOp};

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn groups_branching_rules_under_one_com_n() {
        let x = Polynomial::from_var(sym("x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let r1 = Rule::new(
            lhs.clone(),
            Term::new(sym("g"), vec![x.clone()]),
            Constraint::atom(x.clone(), Polynomial::zero(), RelOp::Ge),
        );
        let r2 = Rule::new(
            lhs,
            Term::new(sym("h"), vec![x.clone()]),
            Constraint::atom(x, Polynomial::zero(), RelOp::Lt),
        );
        let out = print_cint(&[r1, r2], sym("f"), false).unwrap();
        assert!(out.contains("Com_2("));
    }

    #[test]
    fn uniform_variant_renames_arguments() {
        let x = Polynomial::from_var(sym("main@x"));
        let lhs = Term::new(sym("f"), vec![x.clone()]);
        let rhs = Term::new(sym("f"), vec![x.add(&Polynomial::one())]);
        let r = Rule::unguarded(lhs, rhs);
        let out = print_cint(&[r], sym("f"), true).unwrap();
        assert!(out.contains("f_0"));
        assert!(!out.contains("main@x"));
    }

    #[test]
    fn inconsistent_arity_is_rejected() {
        let lhs1 = Term::new(sym("f"), vec![Polynomial::from_var(sym("x"))]);
        let lhs2 = Term::new(sym("f"), vec![]);
        let r1 = Rule::unguarded(lhs1, Term::new(sym("g"), vec![]));
        let r2 = Rule::unguarded(lhs2, Term::new(sym("g"), vec![]));
        assert!(print_cint(&[r1, r2], sym("f"), false).is_err());
    }
}
