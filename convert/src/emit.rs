//! Component E, phase 2: per-function rule emission (spec §4.E).
//!
//! Every rule in a function's output shares the same left-hand argument
//! vector — the SCC-shared `V` — so a rule only ever needs to say which
//! slots change; `VarVec::substituted_args` does the rest. Chaining is
//! therefore purely nominal: control points and intermediate
//! instruction points are connected by symbol, not by threading a
//! mutated argument list through the block walk.

use crate::cond::{
    bitwise_and_constraint, bitwise_or_constraint, cond_of_value, icmp_constraint, poly_of,
    sign_test_for,
};
use crate::config::ConverterOptions;
use crate::divrem::{div_constraint, rem_constraint};
use crate::varvec::VarVec;
use algebra::{bitwidth, Constraint, FreshNames, Polynomial, RelOp, Rule, Symbol, Term};
use analysis::{CallGraph, ExplicitLoopCondition, MayMustMap, TrueFalseMap};
use core_error::{CoreError, CoreResult};
use ir::cfg::Dominators;
use ir::loops::has_back_edge;
use ir::{
    BasicBlock, BlockId, Callee, Function, FunctionId, GlobalId, InstKind, InstLoc, Instruction,
    Module, Terminator, Ty, ValueId,
};
use std::collections::{HashMap, HashSet};

pub fn start_symbol(func_name: &str) -> Symbol {
    Symbol::intern(&format!("eval_{}_start", func_name))
}

pub fn stop_symbol(func_name: &str) -> Symbol {
    Symbol::intern(&format!("eval_{}_stop", func_name))
}

fn block_in_symbol(func_name: &str, block_name: &str) -> Symbol {
    Symbol::intern(&format!("eval_{}_{}_in", func_name, block_name))
}

fn block_out_symbol(func_name: &str, block_name: &str) -> Symbol {
    Symbol::intern(&format!("eval_{}_{}_out", func_name, block_name))
}

fn point_symbol(func_name: &str, block_name: &str, idx: usize) -> Symbol {
    Symbol::intern(&format!("eval_{}_{}_{}", func_name, block_name, idx))
}

/// A function is trivial when it has no loops and none of its (direct
/// or indirect) callees are in its own SCC — straight-line code with no
/// recursion through the component it belongs to.
pub fn is_trivial(
    func: &Function,
    module: &Module,
    doms: &Dominators,
    scc: &HashSet<FunctionId>,
    call_graph: &CallGraph,
) -> bool {
    if has_back_edge(func, doms) {
        return false;
    }
    for bb in &func.blocks {
        for inst in &bb.insts {
            if let InstKind::Call { callee, .. } = &inst.kind {
                for candidate in call_graph.resolve(module, callee) {
                    if scc.contains(&candidate) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Instructions kept as predicates (spec: "icmp, boolean-typed
/// instructions ... never emit rules directly") are excluded by either
/// their `InstKind` or, for a boolean-typed `Select`, by their type.
fn instruction_emits_rule(inst: &Instruction) -> bool {
    if inst.ty == Ty::Bool {
        return false;
    }
    !matches!(
        inst.kind,
        InstKind::Phi(_)
            | InstKind::ICmp { .. }
            | InstKind::BoolAnd(..)
            | InstKind::BoolOr(..)
            | InstKind::BoolNot(..)
    )
}

pub struct FunctionRules {
    pub rules: Vec<Rule>,
    pub control_points: HashSet<Symbol>,
    pub start: Symbol,
    pub stop: Symbol,
}

/// One instruction's contribution to the chain: the guarded
/// continuations to the next point (more than one for a case split like
/// `zext i1` or `select`), plus any standalone targets that leave the
/// chain entirely (a call's edges to callee-start points — the caller
/// supplies the shared lhs, this instruction's own point).
struct InstructionEmission {
    continuations: Vec<(Constraint, HashMap<Symbol, Polynomial>)>,
    side_targets: Vec<(Symbol, Vec<Polynomial>)>,
    /// Set when the point *after* this instruction should join the
    /// caller's control-point set (the `assume-is-control` option).
    mark_next_as_control: bool,
}

impl InstructionEmission {
    fn single(overrides: HashMap<Symbol, Polynomial>) -> Self {
        InstructionEmission {
            continuations: vec![(Constraint::tru(), overrides)],
            side_targets: Vec::new(),
            mark_next_as_control: false,
        }
    }

    fn guarded(guard: Constraint, overrides: HashMap<Symbol, Polynomial>) -> Self {
        InstructionEmission {
            continuations: vec![(guard, overrides)],
            side_targets: Vec::new(),
            mark_next_as_control: false,
        }
    }
}

fn one(sym: Symbol, poly: Polynomial) -> HashMap<Symbol, Polynomial> {
    let mut m = HashMap::new();
    m.insert(sym, poly);
    m
}

fn result_symbol(func: &Function, vv: &VarVec, loc: InstLoc) -> Option<Symbol> {
    vv.symbol_of_local(func.id, loc)
}

fn havoc_emission(func: &Function, vv: &VarVec, loc: InstLoc, fresh: &mut FreshNames) -> InstructionEmission {
    let overrides = match result_symbol(func, vv, loc) {
        Some(sym) => one(sym, Polynomial::from_var(fresh.next())),
        None => HashMap::new(),
    };
    InstructionEmission::single(overrides)
}

#[allow(clippy::too_many_arguments)]
fn emit_instruction(
    inst: &Instruction,
    loc: InstLoc,
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
    alias: &MayMustMap,
    call_graph: &CallGraph,
    var_vecs: &HashMap<FunctionId, VarVec>,
    zap_sets: &HashMap<FunctionId, HashSet<GlobalId>>,
    fresh: &mut FreshNames,
) -> CoreResult<InstructionEmission> {
    let result_sym = result_symbol(func, vv, loc);
    let missing = |what: &str| CoreError::MissingAnalysisFact {
        function: func.name.clone(),
        instruction: format!("{what} at {:?}", loc),
    };
    let p = |v: &ValueId| -> CoreResult<Polynomial> {
        poly_of(v, func, vv).ok_or_else(|| missing("operand value"))
    };

    Ok(match &inst.kind {
        InstKind::Add(a, b) => InstructionEmission::single(match result_sym {
            Some(s) => one(s, p(a)?.add(&p(b)?)),
            None => HashMap::new(),
        }),
        InstKind::Sub(a, b) => InstructionEmission::single(match result_sym {
            Some(s) => one(s, p(a)?.sub(&p(b)?)),
            None => HashMap::new(),
        }),
        InstKind::Mul(a, b) => InstructionEmission::single(match result_sym {
            Some(s) => one(s, p(a)?.mult(&p(b)?)),
            None => HashMap::new(),
        }),
        InstKind::SDiv(a, b) | InstKind::UDiv(a, b) => {
            let signed = matches!(inst.kind, InstKind::SDiv(..));
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let zp = Polynomial::from_var(fresh.next());
            let w = inst.ty.bit_width();
            let sign = sign_test_for(opts, w);
            let guard = div_constraint(&p(a)?, &p(b)?, &zp, signed, opts.exact_division, sign);
            InstructionEmission::guarded(guard, one(s, zp))
        }
        InstKind::SRem(a, b) | InstKind::URem(a, b) => {
            let signed = matches!(inst.kind, InstKind::SRem(..));
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let zp = Polynomial::from_var(fresh.next());
            let w = inst.ty.bit_width();
            let sign = sign_test_for(opts, w);
            let guard = rem_constraint(&p(a)?, &p(b)?, &zp, signed, sign);
            InstructionEmission::guarded(guard, one(s, zp))
        }
        InstKind::And(a, b) | InstKind::Or(a, b) => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let zp = Polynomial::from_var(fresh.next());
            if opts.bounded_integers && opts.bitwise_conditions {
                let guard = if matches!(inst.kind, InstKind::And(..)) {
                    bitwise_and_constraint(&p(a)?, &p(b)?, &zp, opts)
                } else {
                    bitwise_or_constraint(&p(a)?, &p(b)?, &zp, opts)
                };
                InstructionEmission::guarded(guard, one(s, zp))
            } else {
                InstructionEmission::single(one(s, zp))
            }
        }
        InstKind::Xor(a, b) => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let neg_one_operand = match (a, b) {
                (ValueId::ConstInt(n, _), _) if *n == num_bigint::BigInt::from(-1) => Some(b),
                (_, ValueId::ConstInt(n, _)) if *n == num_bigint::BigInt::from(-1) => Some(a),
                _ => None,
            };
            match neg_one_operand {
                Some(other) => {
                    InstructionEmission::single(one(s, p(other)?.negate().sub(&Polynomial::one())))
                }
                None => InstructionEmission::single(one(s, Polynomial::from_var(fresh.next()))),
            }
        }
        InstKind::ZExtFromBool(src) => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let cond = cond_of_value(src, func, module, vv, opts);
            InstructionEmission {
                continuations: vec![
                    (Constraint::not(cond.clone()).to_nnf(false), one(s, Polynomial::zero())),
                    (cond, one(s, Polynomial::one())),
                ],
                side_targets: Vec::new(),
                mark_next_as_control: false,
            }
        }
        InstKind::ZExtFromInt { src, src_width } => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let srcp = p(src)?;
            if opts.bounded_integers && !opts.unsigned_encoding {
                let shift = bitwidth::power_of_two(*src_width);
                InstructionEmission {
                    continuations: vec![
                        (
                            Constraint::atom(srcp.clone(), Polynomial::zero(), RelOp::Ge),
                            one(s, srcp.clone()),
                        ),
                        (
                            Constraint::atom(srcp.clone(), Polynomial::zero(), RelOp::Lt),
                            one(s, srcp.add(&shift)),
                        ),
                    ],
                    side_targets: Vec::new(),
                    mark_next_as_control: false,
                }
            } else {
                InstructionEmission::single(one(s, srcp))
            }
        }
        InstKind::SExt { src, src_width } => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let srcp = p(src)?;
            if opts.bounded_integers && opts.unsigned_encoding {
                let simax = bitwidth::signed_max(*src_width);
                let w_new = inst.ty.bit_width().ok_or_else(|| missing("sext target width"))?;
                let correction =
                    bitwidth::power_of_two(w_new).sub(&bitwidth::power_of_two(*src_width));
                InstructionEmission {
                    continuations: vec![
                        (
                            Constraint::atom(srcp.clone(), simax.clone(), RelOp::Le),
                            one(s, srcp.clone()),
                        ),
                        (
                            Constraint::atom(srcp.clone(), simax, RelOp::Gt),
                            one(s, correction.add(&srcp)),
                        ),
                    ],
                    side_targets: Vec::new(),
                    mark_next_as_control: false,
                }
            } else {
                InstructionEmission::single(one(s, srcp))
            }
        }
        InstKind::Trunc(src) => {
            let overrides = match result_sym {
                Some(s) => {
                    if opts.bounded_integers {
                        one(s, Polynomial::from_var(fresh.next()))
                    } else {
                        one(s, p(src)?)
                    }
                }
                None => HashMap::new(),
            };
            InstructionEmission::single(overrides)
        }
        InstKind::BitCastIntToInt(src) => InstructionEmission::single(match result_sym {
            Some(s) => one(s, p(src)?),
            None => HashMap::new(),
        }),
        InstKind::PtrToInt(_) | InstKind::IntToPtr(_) | InstKind::FpToSi(_) | InstKind::FpToUi(_) => {
            havoc_emission(func, vv, loc, fresh)
        }
        InstKind::Select {
            cond,
            if_true,
            if_false,
        } => {
            let Some(s) = result_sym else {
                return Ok(InstructionEmission::single(HashMap::new()));
            };
            let c = cond_of_value(cond, func, module, vv, opts);
            InstructionEmission {
                continuations: vec![
                    (c.clone().to_nnf(false), one(s, p(if_true)?)),
                    (Constraint::not(c).to_nnf(false), one(s, p(if_false)?)),
                ],
                side_targets: Vec::new(),
                mark_next_as_control: opts.select_is_control,
            }
        }
        InstKind::Phi(_) => InstructionEmission::single(HashMap::new()),
        InstKind::Load { ptr: _ } => {
            let mm = alias.get(loc).ok_or_else(|| missing("load alias fact"))?;
            if mm.must.len() == 1 && mm.may.is_empty() {
                let g = *mm.must.iter().next().unwrap();
                let sym = vv.symbol_of_global(g).ok_or_else(|| missing("global slot"))?;
                InstructionEmission::single(match result_sym {
                    Some(s) => one(s, Polynomial::from_var(sym)),
                    None => HashMap::new(),
                })
            } else {
                havoc_emission(func, vv, loc, fresh)
            }
        }
        InstKind::Store { value, ptr: _ } => {
            let mm = alias.get(loc).ok_or_else(|| missing("store alias fact"))?;
            if mm.must.len() == 1 && mm.may.is_empty() {
                let g = *mm.must.iter().next().unwrap();
                let sym = vv.symbol_of_global(g).ok_or_else(|| missing("global slot"))?;
                InstructionEmission::single(one(sym, p(value)?))
            } else {
                let mut overrides = HashMap::new();
                for g in mm.may.iter().chain(mm.must.iter()) {
                    if let Some(sym) = vv.symbol_of_global(*g) {
                        overrides.insert(sym, Polynomial::from_var(fresh.next()));
                    }
                }
                InstructionEmission::single(overrides)
            }
        }
        InstKind::Call { callee, args } => {
            if let Callee::Direct(fid) = callee {
                let target = module.function(*fid);
                match ir::recognize_intrinsic(&target.name) {
                    Some(ir::Intrinsic::Assume) => {
                        let c = args
                            .first()
                            .map(|a| cond_of_value(a, func, module, vv, opts))
                            .unwrap_or_else(Constraint::tru);
                        return Ok(InstructionEmission {
                            continuations: vec![(c.to_nnf(false), HashMap::new())],
                            side_targets: Vec::new(),
                            mark_next_as_control: opts.assume_is_control,
                        });
                    }
                    Some(ir::Intrinsic::Nondef) => return Ok(havoc_emission(func, vv, loc, fresh)),
                    None => {}
                }
            }
            let candidates = call_graph.resolve(module, callee);
            let mut side_targets = Vec::new();
            let mut zapped: HashSet<GlobalId> = HashSet::new();
            for fid in &candidates {
                let callee_func = module.function(*fid);
                let callee_vv = var_vecs
                    .get(fid)
                    .ok_or_else(|| missing("callee variable vector"))?;
                let mut overrides = HashMap::new();
                for (pidx, _) in callee_func.integer_params() {
                    if let Some(arg) = args.get(pidx as usize) {
                        if let (Some(poly), Some(sym)) =
                            (poly_of(arg, func, vv), callee_vv.symbol_of_param(*fid, pidx))
                        {
                            overrides.insert(sym, poly);
                        }
                    }
                }
                side_targets.push((
                    start_symbol(&callee_func.name),
                    callee_vv.substituted_args(&overrides),
                ));
                if let Some(z) = zap_sets.get(fid) {
                    zapped.extend(z.iter().copied());
                }
            }
            let mut overrides = HashMap::new();
            for g in &zapped {
                if let Some(sym) = vv.symbol_of_global(*g) {
                    overrides.insert(sym, Polynomial::from_var(fresh.next()));
                }
            }
            if let Some(s) = result_sym {
                overrides.insert(s, Polynomial::from_var(fresh.next()));
            }
            InstructionEmission {
                continuations: vec![(Constraint::tru(), overrides)],
                side_targets,
                mark_next_as_control: false,
            }
        }
        InstKind::ICmp { .. } | InstKind::BoolAnd(..) | InstKind::BoolOr(..) | InstKind::BoolNot(..) => {
            unreachable!("predicate instructions never reach emit_instruction")
        }
        InstKind::Opaque => havoc_emission(func, vv, loc, fresh),
    })
}

fn guard_for_block(
    block: BlockId,
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
    tf: &TrueFalseMap,
    loop_conditions: &HashMap<BlockId, Vec<ExplicitLoopCondition>>,
) -> Constraint {
    let mut atoms = Vec::new();
    if opts.propagate_conditions {
        for v in tf.true_set(block) {
            atoms.push(cond_of_value(v, func, module, vv, opts).to_nnf(false));
        }
        for v in tf.false_set(block) {
            atoms.push(Constraint::not(cond_of_value(v, func, module, vv, opts)).to_nnf(false));
        }
    }
    if opts.explicitize_loop_conditions {
        if let Some(conds) = loop_conditions.get(&block) {
            for c in conds {
                atoms.push(icmp_constraint(c.pred, &c.lhs, &c.rhs, func, module, vv, opts));
            }
        }
    }
    Constraint::conjunction(atoms)
}

/// PHI substitution when branching from `from` into `to`: every PHI at
/// the head of `to` contributes `(dest_symbol, poly(incoming value for
/// `from`))`.
fn phi_overrides(
    from: BlockId,
    to: &BasicBlock,
    func: &Function,
    vv: &VarVec,
) -> CoreResult<HashMap<Symbol, Polynomial>> {
    let mut overrides = HashMap::new();
    for (idx, inst) in to.insts.iter().enumerate() {
        let InstKind::Phi(incoming) = &inst.kind else {
            continue;
        };
        if inst.ty == Ty::Bool || !inst.ty.is_integer() {
            continue;
        }
        let loc = to.loc(idx as u32);
        let Some(sym) = vv.symbol_of_local(func.id, loc) else {
            continue;
        };
        let value = incoming
            .iter()
            .find(|(b, _)| *b == from)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| CoreError::MissingAnalysisFact {
                function: func.name.clone(),
                instruction: format!("phi at {:?} missing incoming edge from {:?}", loc, from),
            })?;
        let poly = poly_of(&value, func, vv).ok_or_else(|| CoreError::MissingAnalysisFact {
            function: func.name.clone(),
            instruction: format!("phi at {:?} incoming value not symbolic", loc),
        })?;
        overrides.insert(sym, poly);
    }
    Ok(overrides)
}

#[allow(clippy::too_many_arguments)]
pub fn emit_function(
    func: &Function,
    module: &Module,
    vv: &VarVec,
    opts: &ConverterOptions,
    scc: &HashSet<FunctionId>,
    call_graph: &CallGraph,
    var_vecs: &HashMap<FunctionId, VarVec>,
    zap_sets: &HashMap<FunctionId, HashSet<GlobalId>>,
    alias: &MayMustMap,
    tf: &TrueFalseMap,
    loop_conditions: &HashMap<BlockId, Vec<ExplicitLoopCondition>>,
    doms: &Dominators,
    fresh: &mut FreshNames,
) -> CoreResult<FunctionRules> {
    let start = start_symbol(&func.name);
    let stop = stop_symbol(&func.name);
    let mut control_points = HashSet::new();
    control_points.insert(start);
    control_points.insert(stop);

    if is_trivial(func, module, doms, scc, call_graph) {
        return Ok(FunctionRules {
            rules: vec![Rule::unguarded(
                Term::new(start, vv.as_args()),
                Term::new(stop, vv.as_args()),
            )],
            control_points,
            start,
            stop,
        });
    }

    for bb in &func.blocks {
        let is_cp = if opts.multi_pred_control {
            func.predecessors(bb.id).len() > 1
        } else {
            true
        };
        if is_cp {
            control_points.insert(block_in_symbol(&func.name, &bb.name));
        }
    }

    let mut rules = Vec::new();
    let mut return_rules: Vec<Rule> = Vec::new();

    for bb in &func.blocks {
        let b_in = block_in_symbol(&func.name, &bb.name);
        let b_out = block_out_symbol(&func.name, &bb.name);

        if bb.id == func.entry {
            rules.push(Rule::unguarded(
                Term::new(start, vv.as_args()),
                Term::new(b_in, vv.as_args()),
            ));
        }

        let guard_b = guard_for_block(bb.id, func, module, vv, opts, tf, loop_conditions);

        let emitting: Vec<usize> = bb
            .insts
            .iter()
            .enumerate()
            .filter(|(_, i)| instruction_emits_rule(i))
            .map(|(i, _)| i)
            .collect();

        if emitting.is_empty() {
            rules.push(Rule::new(
                Term::new(b_in, vv.as_args()),
                Term::new(b_out, vv.as_args()),
                guard_b,
            ));
        } else {
            let first = emitting[0];
            rules.push(Rule::new(
                Term::new(b_in, vv.as_args()),
                Term::new(point_symbol(&func.name, &bb.name, first), vv.as_args()),
                guard_b,
            ));
            for (k, &idx) in emitting.iter().enumerate() {
                let loc = bb.loc(idx as u32);
                let next_idx = emitting.get(k + 1).copied().unwrap_or(idx + 1);
                let cur_sym = point_symbol(&func.name, &bb.name, idx);
                let next_sym = point_symbol(&func.name, &bb.name, next_idx);
                let emission = emit_instruction(
                    &bb.insts[idx],
                    loc,
                    func,
                    module,
                    vv,
                    opts,
                    alias,
                    call_graph,
                    var_vecs,
                    zap_sets,
                    fresh,
                )?;
                for (guard, overrides) in &emission.continuations {
                    rules.push(Rule::new(
                        Term::new(cur_sym, vv.as_args()),
                        Term::new(next_sym, vv.substituted_args(overrides)),
                        guard.clone(),
                    ));
                }
                for (target_sym, target_args) in emission.side_targets {
                    rules.push(Rule::unguarded(
                        Term::new(cur_sym, vv.as_args()),
                        Term::new(target_sym, target_args),
                    ));
                }
                if emission.mark_next_as_control {
                    control_points.insert(next_sym);
                }
            }
            let last = point_symbol(&func.name, &bb.name, emitting[emitting.len() - 1] + 1);
            rules.push(Rule::unguarded(
                Term::new(last, vv.as_args()),
                Term::new(b_out, vv.as_args()),
            ));
        }

        match &bb.terminator {
            Terminator::Ret(_) => {
                return_rules.push(Rule::unguarded(
                    Term::new(b_out, vv.as_args()),
                    Term::new(stop, vv.as_args()),
                ));
            }
            Terminator::Unreachable => {
                rules.push(Rule::unguarded(
                    Term::new(b_out, vv.as_args()),
                    Term::new(stop, vv.as_args()),
                ));
            }
            Terminator::Br(c) => {
                let target = func.block(*c);
                let overrides = phi_overrides(bb.id, target, func, vv)?;
                rules.push(Rule::unguarded(
                    Term::new(b_out, vv.as_args()),
                    Term::new(
                        block_in_symbol(&func.name, &target.name),
                        vv.substituted_args(&overrides),
                    ),
                ));
            }
            Terminator::CondBr {
                cond,
                if_true,
                if_false,
            } => {
                let c = cond_of_value(cond, func, module, vv, opts);
                let t_target = func.block(*if_true);
                let f_target = func.block(*if_false);
                let t_overrides = phi_overrides(bb.id, t_target, func, vv)?;
                let f_overrides = phi_overrides(bb.id, f_target, func, vv)?;
                rules.push(Rule::new(
                    Term::new(b_out, vv.as_args()),
                    Term::new(
                        block_in_symbol(&func.name, &t_target.name),
                        vv.substituted_args(&t_overrides),
                    ),
                    c.clone().to_nnf(false),
                ));
                rules.push(Rule::new(
                    Term::new(b_out, vv.as_args()),
                    Term::new(
                        block_in_symbol(&func.name, &f_target.name),
                        vv.substituted_args(&f_overrides),
                    ),
                    Constraint::not(c).to_nnf(false),
                ));
            }
        }
    }

    rules.extend(return_rules);

    Ok(FunctionRules {
        rules,
        control_points,
        start,
        stop,
    })
}
