//! Control-flow queries the feeders of component C rely on: reverse
//! postorder, dominance, and natural-loop recovery. The LLIR parser is
//! out of scope, but dominator/loop information it would otherwise hand
//! us has to come from somewhere — this module computes it directly
//! from the `Function`'s blocks so the rest of the core has a single,
//! consistent source for it.

use crate::function::Function;
use crate::ids::BlockId;
use std::collections::{HashMap, HashSet};

pub fn reverse_postorder(func: &Function) -> Vec<BlockId> {
    let mut visited = HashSet::new();
    let mut postorder = Vec::new();
    let mut stack = vec![(func.entry, false)];
    while let Some((b, processed)) = stack.pop() {
        if processed {
            postorder.push(b);
            continue;
        }
        if !visited.insert(b) {
            continue;
        }
        stack.push((b, true));
        for s in func.block(b).successors() {
            if !visited.contains(&s) {
                stack.push((s, false));
            }
        }
    }
    postorder.reverse();
    postorder
}

/// Immediate dominators, computed by the classic iterative fixpoint over
/// dominator sets (simple rather than Lengauer-Tarjan; functions in this
/// domain are small enough that the asymptotic difference never matters).
pub struct Dominators {
    idom: HashMap<BlockId, BlockId>,
    doms: HashMap<BlockId, HashSet<BlockId>>,
}

impl Dominators {
    pub fn compute(func: &Function) -> Self {
        let all_blocks: Vec<BlockId> = func.blocks.iter().map(|b| b.id).collect();
        let all_set: HashSet<BlockId> = all_blocks.iter().copied().collect();
        let mut doms: HashMap<BlockId, HashSet<BlockId>> = HashMap::new();
        for &b in &all_blocks {
            if b == func.entry {
                let mut s = HashSet::new();
                s.insert(b);
                doms.insert(b, s);
            } else {
                doms.insert(b, all_set.clone());
            }
        }

        let rpo = reverse_postorder(func);
        let mut changed = true;
        while changed {
            changed = false;
            for &b in &rpo {
                if b == func.entry {
                    continue;
                }
                let preds = func.predecessors(b);
                let mut new_doms: Option<HashSet<BlockId>> = None;
                for p in &preds {
                    let pd = doms.get(p).cloned().unwrap_or_default();
                    new_doms = Some(match new_doms {
                        None => pd,
                        Some(acc) => acc.intersection(&pd).copied().collect(),
                    });
                }
                let mut new_doms = new_doms.unwrap_or_default();
                new_doms.insert(b);
                if doms.get(&b) != Some(&new_doms) {
                    doms.insert(b, new_doms);
                    changed = true;
                }
            }
        }

        let mut idom = HashMap::new();
        for &b in &all_blocks {
            if b == func.entry {
                continue;
            }
            let bdoms = &doms[&b];
            // The immediate dominator is the strict dominator that is
            // dominated by every other strict dominator of b.
            let strict: Vec<BlockId> = bdoms.iter().copied().filter(|&d| d != b).collect();
            for &cand in &strict {
                let cand_doms = &doms[&cand];
                let is_idom = strict
                    .iter()
                    .all(|&other| other == cand || cand_doms.contains(&other));
                if is_idom {
                    idom.insert(b, cand);
                    break;
                }
            }
        }

        Dominators { idom, doms }
    }

    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.doms.get(&b).map(|s| s.contains(&a)).unwrap_or(false)
    }

    pub fn immediate_dominator(&self, b: BlockId) -> Option<BlockId> {
        self.idom.get(&b).copied()
    }
}
