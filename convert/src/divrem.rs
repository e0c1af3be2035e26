//! Div/Rem constraint builders (spec §4.E). `sdiv`/`udiv`/`srem`/`urem`
//! lower to a fresh havoc variable `z` guarded by one of these
//! disjunctions rather than a direct polynomial (division isn't
//! polynomial).

use crate::signtest::SignTest;
use algebra::{Constraint, Polynomial, RelOp};

fn eq(a: &Polynomial, b: &Polynomial) -> Constraint {
    Constraint::atom(a.clone(), b.clone(), RelOp::Eq)
}
fn gt(a: &Polynomial, b: &Polynomial) -> Constraint {
    Constraint::atom(a.clone(), b.clone(), RelOp::Gt)
}
fn lt(a: &Polynomial, b: &Polynomial) -> Constraint {
    Constraint::atom(a.clone(), b.clone(), RelOp::Lt)
}
fn ge(a: &Polynomial, b: &Polynomial) -> Constraint {
    Constraint::atom(a.clone(), b.clone(), RelOp::Ge)
}
fn le(a: &Polynomial, b: &Polynomial) -> Constraint {
    Constraint::atom(a.clone(), b.clone(), RelOp::Le)
}

/// Exact (Euclidean) division: `x − y·z ≥ 0 ∧ x − y·z < |y|`, split into
/// the two linear cases since `|y|` itself isn't a polynomial.
fn exact_div_constraint(x: &Polynomial, y: &Polynomial, z: &Polynomial) -> Constraint {
    let zero = Polynomial::zero();
    let rem = x.sub(&y.mult(z));
    let nonneg = ge(&rem, &zero);
    let case_pos = Constraint::and(gt(y, &zero), lt(&rem, y));
    let case_neg = Constraint::and(lt(y, &zero), lt(&rem, &y.negate()));
    Constraint::and(nonneg, Constraint::or(case_pos, case_neg))
}

/// `sdiv`/`udiv` guard. `signed` selects whether the `y = -1` case and
/// the negative-operand cases are included (unsigned div never sees a
/// negative operand, per spec "Unsigned is the subset without the
/// negative cases").
pub fn div_constraint(
    x: &Polynomial,
    y: &Polynomial,
    z: &Polynomial,
    signed: bool,
    exact: bool,
    sign: SignTest,
) -> Constraint {
    if exact {
        return exact_div_constraint(x, y, z);
    }
    let zero = Polynomial::zero();
    let one = Polynomial::one();
    let mut cases = vec![
        Constraint::and(eq(x, &zero), eq(z, &zero)),
        Constraint::and(eq(y, &one), eq(z, x)),
    ];
    if signed {
        let neg_one = Polynomial::negative_one();
        cases.push(Constraint::and(eq(y, &neg_one), eq(z, &x.negate())));
    }
    cases.push(Constraint::conjunction([
        gt(y, &one),
        sign.nonneg(x),
        ge(z, &zero),
        lt(z, x),
    ]));
    if signed {
        cases.push(Constraint::conjunction([
            gt(y, &one),
            sign.neg(x),
            lt(x, z),
            le(z, &zero),
        ]));
        cases.push(Constraint::conjunction([
            lt(y, &one.negate()),
            sign.nonneg(x),
            lt(&x.negate(), z),
            le(z, &zero),
        ]));
        cases.push(Constraint::conjunction([
            lt(y, &one.negate()),
            sign.neg(x),
            ge(z, &zero),
            lt(z, &x.negate()),
        ]));
    }
    Constraint::disjunction(cases)
}

/// `srem`/`urem` guard: the analogue of `div_constraint` with `z`
/// ranging over the remainder interval determined by `y`, per spec's
/// "Rem constraint is the analogue" note — derived here by the same
/// sign-magnitude case split as division, with `z` truncated-toward-
/// zero remainder semantics (`sign(z) = sign(x)`, `|z| < |y|`).
pub fn rem_constraint(
    x: &Polynomial,
    y: &Polynomial,
    z: &Polynomial,
    signed: bool,
    sign: SignTest,
) -> Constraint {
    let zero = Polynomial::zero();
    let one = Polynomial::one();
    let mut cases = vec![
        Constraint::and(eq(x, &zero), eq(z, &zero)),
        Constraint::and(eq(y, &one), eq(z, &zero)),
    ];
    if signed {
        let neg_one = Polynomial::negative_one();
        cases.push(Constraint::and(eq(y, &neg_one), eq(z, &zero)));
    }
    cases.push(Constraint::conjunction([
        gt(y, &one),
        sign.nonneg(x),
        ge(z, &zero),
        lt(z, y),
    ]));
    if signed {
        cases.push(Constraint::conjunction([
            gt(y, &one),
            sign.neg(x),
            lt(&y.negate(), z),
            le(z, &zero),
        ]));
        cases.push(Constraint::conjunction([
            lt(y, &one.negate()),
            sign.nonneg(x),
            ge(z, &zero),
            lt(z, &y.negate()),
        ]));
        cases.push(Constraint::conjunction([
            lt(y, &one.negate()),
            sign.neg(x),
            lt(y, z),
            le(z, &zero),
        ]));
    }
    Constraint::disjunction(cases)
}
