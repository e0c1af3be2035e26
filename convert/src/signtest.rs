//! The "is this polynomial on the negative / non-negative half" test
//! div/rem and bitwise encoding need. Under ordinary (unbounded or
//! bounded-signed) arithmetic this is a plain `≥ 0` / `< 0` comparison;
//! under bounded-unsigned encoding the same question becomes "≤
//! simax(w)" / "> simax(w)" per spec §4.E's "unsigned bounding ... using
//! the unsigned/signed-dual comparisons" note, reusing the exact split
//! the three-case comparison encoding already performs.

use algebra::{bitwidth, Constraint, Polynomial, RelOp};

#[derive(Debug, Clone, Copy)]
pub enum SignTest {
    Plain,
    BoundedUnsigned(u32),
}

impl SignTest {
    pub fn nonneg(&self, p: &Polynomial) -> Constraint {
        match self {
            SignTest::Plain => Constraint::atom(p.clone(), Polynomial::zero(), RelOp::Ge),
            SignTest::BoundedUnsigned(w) => {
                Constraint::atom(p.clone(), bitwidth::signed_max(*w), RelOp::Le)
            }
        }
    }

    pub fn neg(&self, p: &Polynomial) -> Constraint {
        match self {
            SignTest::Plain => Constraint::atom(p.clone(), Polynomial::zero(), RelOp::Lt),
            SignTest::BoundedUnsigned(w) => {
                Constraint::atom(p.clone(), bitwidth::signed_max(*w), RelOp::Gt)
            }
        }
    }
}
