//! KITTeL text format: `lhs -> rhs [guard]`, guard omitted if `True`,
//! each atom printed with its relop and conjunctions joined by `/\`.

use algebra::Rule;

pub fn print_kittel(rules: &[Rule]) -> String {
    let mut out = String::new();
    for r in rules {
        if r.guard.is_true() {
            out.push_str(&format!("{:?} -> {:?}\n", r.lhs, r.rhs));
        } else {
            let atoms = r.guard.add_atomics_to_list();
            let guard_str = atoms
                .iter()
                .map(|(l, rhs, op)| format!("{:?} {} {:?}", l, op.kittel_str(), rhs))
                .collect::<Vec<_>>()
                .join(" /\\ ");
            out.push_str(&format!("{:?} -> {:?} [{}]\n", r.lhs, r.rhs, guard_str));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{Constraint, Polynomial, RelOp, Symbol, Term};

    #[test]
    fn omits_a_true_guard() {
        let x = Polynomial::from_var(Symbol::intern("x"));
        let r = Rule::unguarded(
            Term::new(Symbol::intern("f"), vec![x.clone()]),
            Term::new(Symbol::intern("g"), vec![x]),
        );
        let out = print_kittel(&[r]);
        assert!(!out.contains('['));
    }

    #[test]
    fn prints_a_conjunction_of_atoms() {
        let x = Polynomial::from_var(Symbol::intern("x"));
        let guard = Constraint::and(
            Constraint::atom(x.clone(), Polynomial::zero(), RelOp::Gt),
            Constraint::atom(x.clone(), Polynomial::constant(10), RelOp::Lt),
        );
        let r = Rule::new(
            Term::new(Symbol::intern("f"), vec![x.clone()]),
            Term::new(Symbol::intern("g"), vec![x]),
            guard,
        );
        let out = print_kittel(&[r]);
        assert!(out.contains("/\\"));
        assert!(out.contains('>'));
        assert!(out.contains('<'));
    }
}
