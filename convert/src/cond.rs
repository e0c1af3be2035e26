//! `cond_of_value` and the comparison/bitwise encodings (spec §4.E).

use crate::config::ConverterOptions;
use crate::signtest::SignTest;
use crate::varvec::VarVec;
use algebra::{bitwidth, Constraint, Polynomial, RelOp};
use ir::{Function, ICmpPred, InstKind, Module, Ty, ValueId};

pub fn poly_of(v: &ValueId, func: &Function, vv: &VarVec) -> Option<Polynomial> {
    match v {
        ValueId::Param(i) => vv.symbol_of_param(func.id, *i).map(Polynomial::from_var),
        ValueId::Local(loc) => vv
            .symbol_of_local(func.id, *loc)
            .map(Polynomial::from_var),
        ValueId::Global(g) => vv.symbol_of_global(*g).map(Polynomial::from_var),
        ValueId::ConstInt(n, _) => Some(Polynomial::constant(n.clone())),
        ValueId::ConstBool(_) | ValueId::Opaque => None,
    }
}

fn value_ty(v: &ValueId, func: &Function, module: &Module) -> Ty {
    match v {
        ValueId::Param(i) => func.params[*i as usize].ty,
        ValueId::Local(loc) => func.block(loc.block).inst_at(loc.idx).ty,
        ValueId::Global(g) => module.global(*g).ty,
        ValueId::ConstInt(_, ty) => *ty,
        ValueId::ConstBool(_) => Ty::Bool,
        ValueId::Opaque => Ty::Other,
    }
}

fn base_relop(pred: ICmpPred) -> RelOp {
    match pred {
        ICmpPred::Eq => RelOp::Eq,
        ICmpPred::Ne => RelOp::Ne,
        ICmpPred::SignedLt | ICmpPred::UnsignedLt => RelOp::Lt,
        ICmpPred::SignedLe | ICmpPred::UnsignedLe => RelOp::Le,
        ICmpPred::SignedGt | ICmpPred::UnsignedGt => RelOp::Gt,
        ICmpPred::SignedGe | ICmpPred::UnsignedGe => RelOp::Ge,
    }
}

/// `x >_u y` / `x ≥_u y` (and symmetric `<_u`/`≤_u`) expanded for a
/// signed-bounded encoding: same-sign-half comparisons agree with the
/// signed order; crossing the sign boundary is decided outright.
fn three_case_unsigned_under_signed(pl: &Polynomial, pr: &Polynomial, relop: RelOp) -> Constraint {
    let zero = Polynomial::zero();
    let ge0_l = Constraint::atom(pl.clone(), zero.clone(), RelOp::Ge);
    let ge0_r = Constraint::atom(pr.clone(), zero.clone(), RelOp::Ge);
    let lt0_l = Constraint::atom(pl.clone(), zero.clone(), RelOp::Lt);
    let lt0_r = Constraint::atom(pr.clone(), zero.clone(), RelOp::Lt);
    let direct = Constraint::atom(pl.clone(), pr.clone(), relop);
    let same_pos = Constraint::conjunction([ge0_l.clone(), ge0_r.clone(), direct.clone()]);
    let same_neg = Constraint::conjunction([lt0_l.clone(), lt0_r.clone(), direct]);
    let cross = match relop {
        RelOp::Gt | RelOp::Ge => Constraint::and(lt0_l, ge0_r),
        RelOp::Lt | RelOp::Le => Constraint::and(ge0_l, lt0_r),
        _ => Constraint::fals(),
    };
    Constraint::disjunction([same_pos, same_neg, cross])
}

/// Signed comparison under unsigned-bounded encoding: the dual split,
/// on `≤ simax(w)` vs `> simax(w)` instead of `≥ 0` vs `< 0`.
fn three_case_signed_under_unsigned(
    pl: &Polynomial,
    pr: &Polynomial,
    relop: RelOp,
    w: u32,
) -> Constraint {
    let simax = bitwidth::signed_max(w);
    let low_l = Constraint::atom(pl.clone(), simax.clone(), RelOp::Le);
    let low_r = Constraint::atom(pr.clone(), simax.clone(), RelOp::Le);
    let high_l = Constraint::atom(pl.clone(), simax.clone(), RelOp::Gt);
    let high_r = Constraint::atom(pr.clone(), simax.clone(), RelOp::Gt);
    let direct = Constraint::atom(pl.clone(), pr.clone(), relop);
    let same_low = Constraint::conjunction([low_l.clone(), low_r.clone(), direct.clone()]);
    let same_high = Constraint::conjunction([high_l.clone(), high_r.clone(), direct]);
    let cross = match relop {
        RelOp::Gt | RelOp::Ge => Constraint::and(low_l, high_r),
        RelOp::Lt | RelOp::Le => Constraint::and(high_l, low_r),
        _ => Constraint::fals(),
    };
    Constraint::disjunction([same_low, same_high, cross])
}

fn comparison(
    pred: ICmpPred,
    lhs: &ValueId,
    rhs: &ValueId,
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
) -> Constraint {
    let (Some(pl), Some(pr)) = (poly_of(lhs, func, vv), poly_of(rhs, func, vv)) else {
        return Constraint::nondef();
    };
    let relop = base_relop(pred);
    if !opts.bounded_integers {
        return Constraint::atom(pl, pr, relop);
    }
    let w = value_ty(lhs, func, module)
        .bit_width()
        .or_else(|| value_ty(rhs, func, module).bit_width());
    let Some(w) = w else {
        return Constraint::atom(pl, pr, relop);
    };
    if pred.is_unsigned() && !opts.unsigned_encoding {
        three_case_unsigned_under_signed(&pl, &pr, relop)
    } else if pred.is_signed() && opts.unsigned_encoding {
        three_case_signed_under_unsigned(&pl, &pr, relop, w)
    } else {
        Constraint::atom(pl, pr, relop)
    }
}

pub fn sign_test_for(opts: &ConverterOptions, w: Option<u32>) -> SignTest {
    match (opts.bounded_integers, opts.unsigned_encoding, w) {
        (true, true, Some(w)) => SignTest::BoundedUnsigned(w),
        _ => SignTest::Plain,
    }
}

/// `and`/`or` as the four-case sign-split bitwise constraint (spec
/// §4.E), under bounded + bitwise-conditions; collapses to the plain
/// monotone bound under unsigned bounding.
pub fn bitwise_and_constraint(
    x: &Polynomial,
    y: &Polynomial,
    z: &Polynomial,
    opts: &ConverterOptions,
) -> Constraint {
    if opts.unsigned_encoding {
        return Constraint::and(
            Constraint::atom(z.clone(), x.clone(), RelOp::Le),
            Constraint::atom(z.clone(), y.clone(), RelOp::Le),
        );
    }
    let zero = Polynomial::zero();
    let ge0 = |p: &Polynomial| Constraint::atom(p.clone(), zero.clone(), RelOp::Ge);
    let lt0 = |p: &Polynomial| Constraint::atom(p.clone(), zero.clone(), RelOp::Lt);
    let le = |a: &Polynomial, b: &Polynomial| Constraint::atom(a.clone(), b.clone(), RelOp::Le);
    let case1 = Constraint::conjunction([ge0(x), ge0(y), ge0(z), le(z, x), le(z, y)]);
    let case2 = Constraint::conjunction([ge0(x), lt0(y), ge0(z), le(z, x)]);
    let case3 = Constraint::conjunction([lt0(x), ge0(y), ge0(z), le(z, y)]);
    let case4 = Constraint::conjunction([lt0(x), lt0(y), lt0(z), le(z, x), le(z, y)]);
    Constraint::disjunction([case1, case2, case3, case4])
}

pub fn bitwise_or_constraint(
    x: &Polynomial,
    y: &Polynomial,
    z: &Polynomial,
    opts: &ConverterOptions,
) -> Constraint {
    if opts.unsigned_encoding {
        return Constraint::and(
            Constraint::atom(z.clone(), x.clone(), RelOp::Ge),
            Constraint::atom(z.clone(), y.clone(), RelOp::Ge),
        );
    }
    let zero = Polynomial::zero();
    let ge0 = |p: &Polynomial| Constraint::atom(p.clone(), zero.clone(), RelOp::Ge);
    let lt0 = |p: &Polynomial| Constraint::atom(p.clone(), zero.clone(), RelOp::Lt);
    let ge = |a: &Polynomial, b: &Polynomial| Constraint::atom(a.clone(), b.clone(), RelOp::Ge);
    let case1 = Constraint::conjunction([ge0(x), ge0(y), ge0(z), ge(z, x), ge(z, y)]);
    let case2 = Constraint::conjunction([ge0(x), lt0(y), lt0(z), ge(z, y)]);
    let case3 = Constraint::conjunction([lt0(x), ge0(y), lt0(z), ge(z, x)]);
    let case4 = Constraint::conjunction([lt0(x), lt0(y), lt0(z), ge(z, x), ge(z, y)]);
    Constraint::disjunction([case1, case2, case3, case4])
}

fn fallback_atom(v: &ValueId, func: &Function, vv: &VarVec) -> Constraint {
    match poly_of(v, func, vv) {
        Some(p) => Constraint::atom(p, Polynomial::zero(), RelOp::Ne),
        None => Constraint::nondef(),
    }
}

/// Public wrapper used to encode an `ExplicitLoopCondition` (an `icmp`
/// outside the instruction stream proper, recovered by the loop-
/// condition analysis) the same way an ordinary `icmp` instruction is
/// encoded.
pub fn icmp_constraint(
    pred: ICmpPred,
    lhs: &ValueId,
    rhs: &ValueId,
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
) -> Constraint {
    comparison(pred, lhs, rhs, func, module, vv, opts)
}

/// Interpret a boolean-typed value as a `Constraint`, per spec §4.E's
/// `cond_of_value` table.
pub fn cond_of_value(
    v: &ValueId,
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
) -> Constraint {
    match v {
        ValueId::ConstBool(b) => {
            if *b {
                Constraint::tru()
            } else {
                Constraint::fals()
            }
        }
        ValueId::Local(loc) => {
            let inst = &func.block(loc.block).inst_at(loc.idx).kind;
            match inst {
                InstKind::BoolAnd(a, b) => Constraint::and(
                    cond_of_value(a, func, module, vv, opts),
                    cond_of_value(b, func, module, vv, opts),
                ),
                InstKind::BoolOr(a, b) => Constraint::or(
                    cond_of_value(a, func, module, vv, opts),
                    cond_of_value(b, func, module, vv, opts),
                ),
                InstKind::BoolNot(a) => Constraint::not(cond_of_value(a, func, module, vv, opts)),
                InstKind::ZExtFromBool(src) => cond_of_value(src, func, module, vv, opts),
                InstKind::ICmp { pred, lhs, rhs } => {
                    comparison(*pred, lhs, rhs, func, module, vv, opts)
                }
                InstKind::Select {
                    cond,
                    if_true,
                    if_false,
                } => match (if_true, if_false) {
                    (ValueId::ConstBool(true), _) => Constraint::or(
                        cond_of_value(cond, func, module, vv, opts),
                        cond_of_value(if_false, func, module, vv, opts),
                    ),
                    (ValueId::ConstBool(false), _) => Constraint::and(
                        Constraint::not(cond_of_value(cond, func, module, vv, opts)),
                        cond_of_value(if_false, func, module, vv, opts),
                    ),
                    (_, ValueId::ConstBool(true)) => Constraint::or(
                        Constraint::not(cond_of_value(cond, func, module, vv, opts)),
                        cond_of_value(if_true, func, module, vv, opts),
                    ),
                    (_, ValueId::ConstBool(false)) => Constraint::and(
                        cond_of_value(cond, func, module, vv, opts),
                        cond_of_value(if_true, func, module, vv, opts),
                    ),
                    _ => fallback_atom(v, func, vv),
                },
                _ => fallback_atom(v, func, vv),
            }
        }
        _ => fallback_atom(v, func, vv),
    }
}
