//! LoopConditionBlocks and ExplicitLoopConditionMap (spec §4.C).

use ir::loops::NaturalLoop;
use ir::{BlockId, Function, ICmpPred, InstKind, Terminator, ValueId};
use num_bigint::BigInt;
use std::collections::{HashMap, HashSet};

/// The header (if it has an edge leaving the loop) and the latch
/// (likewise), for every natural loop in a function.
pub fn loop_condition_blocks(func: &Function, loops: &[NaturalLoop]) -> HashSet<BlockId> {
    let mut blocks = HashSet::new();
    for lp in loops {
        let exiting = lp.exiting_blocks(func);
        if exiting.contains(&lp.header) {
            blocks.insert(lp.header);
        }
        if exiting.contains(&lp.latch) {
            blocks.insert(lp.latch);
        }
    }
    blocks
}

#[derive(Debug, Clone)]
pub struct ExplicitLoopCondition {
    pub lhs: ValueId,
    pub pred: ICmpPred,
    pub rhs: ValueId,
}

/// A canonical induction variable: a header PHI whose loop-latch
/// incoming value is `phi + step` for a constant `step`.
fn canonical_induction_var(func: &Function, lp: &NaturalLoop) -> Option<(ValueId, BigInt)> {
    let header = func.block(lp.header);
    for (idx, inst) in header.insts.iter().enumerate() {
        let InstKind::Phi(incoming) = &inst.kind else {
            continue;
        };
        let phi_value = ValueId::Local(header.loc(idx as u32));
        let Some((_, latch_val)) = incoming.iter().find(|(pred, _)| *pred == lp.latch) else {
            continue;
        };
        let ValueId::Local(latch_loc) = latch_val else {
            continue;
        };
        let latch_inst = &func.block(latch_loc.block).inst_at(latch_loc.idx).kind;
        if let InstKind::Add(a, b) = latch_inst {
            let step = match (a, b) {
                (x, ValueId::ConstInt(c, _)) if *x == phi_value => Some(c.clone()),
                (ValueId::ConstInt(c, _), x) if *x == phi_value => Some(c.clone()),
                _ => None,
            };
            if let Some(step) = step {
                return Some((phi_value, step));
            }
        }
    }
    None
}

/// For a loop with a canonical induction variable, a single exiting
/// edge, and an `icmp`-conditioned branch at the exit, the comparison
/// that bounds the induction variable on every iteration.
pub fn explicit_loop_condition_for(func: &Function, lp: &NaturalLoop) -> Option<ExplicitLoopCondition> {
    let (induction, _step) = canonical_induction_var(func, lp)?;
    let (exit_block, _target) = lp.single_exiting_edge(func)?;
    let bb = func.block(exit_block);
    let Terminator::CondBr { cond, .. } = &bb.terminator else {
        return None;
    };
    let ValueId::Local(cond_loc) = cond else {
        return None;
    };
    let InstKind::ICmp { pred, lhs, rhs } = &func.block(cond_loc.block).inst_at(cond_loc.idx).kind
    else {
        return None;
    };
    if *lhs != induction && *rhs != induction {
        return None;
    }
    Some(ExplicitLoopCondition {
        lhs: lhs.clone(),
        pred: *pred,
        rhs: rhs.clone(),
    })
}

pub fn explicit_loop_condition_map(
    func: &Function,
    loops: &[NaturalLoop],
) -> HashMap<BlockId, Vec<ExplicitLoopCondition>> {
    let mut map: HashMap<BlockId, Vec<ExplicitLoopCondition>> = HashMap::new();
    for lp in loops {
        if let Some(cond) = explicit_loop_condition_for(func, lp) {
            for &b in &lp.body {
                map.entry(b).or_default().push(cond.clone());
            }
        }
    }
    map
}
