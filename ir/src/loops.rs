use crate::cfg::Dominators;
use crate::function::Function;
use crate::ids::BlockId;
use std::collections::HashSet;

/// A single natural loop: a back edge `latch -> header` where `header`
/// dominates `latch`, plus the set of blocks that reach `latch` without
/// passing back through `header`.
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    pub header: BlockId,
    pub latch: BlockId,
    pub body: HashSet<BlockId>,
}

impl NaturalLoop {
    pub fn contains(&self, b: BlockId) -> bool {
        self.body.contains(&b)
    }

    /// Blocks inside the loop with at least one successor outside it —
    /// the candidate set for §4.C's `LoopConditionBlocks`.
    pub fn exiting_blocks(&self, func: &Function) -> Vec<BlockId> {
        self.body
            .iter()
            .copied()
            .filter(|&b| {
                func.block(b)
                    .successors()
                    .into_iter()
                    .any(|s| !self.body.contains(&s))
            })
            .collect()
    }

    /// True when the loop has exactly one edge leaving it (the shape
    /// `ExplicitLoopConditionMap` requires).
    pub fn single_exiting_edge(&self, func: &Function) -> Option<(BlockId, BlockId)> {
        let mut exits = Vec::new();
        for &b in &self.body {
            for s in func.block(b).successors() {
                if !self.body.contains(&s) {
                    exits.push((b, s));
                }
            }
        }
        if exits.len() == 1 {
            Some(exits[0])
        } else {
            None
        }
    }
}

pub fn find_natural_loops(func: &Function, doms: &Dominators) -> Vec<NaturalLoop> {
    let mut loops = Vec::new();
    for bb in &func.blocks {
        for succ in bb.successors() {
            if doms.dominates(succ, bb.id) {
                // back edge bb.id -> succ, header = succ, latch = bb.id
                loops.push(natural_loop_for(func, succ, bb.id));
            }
        }
    }
    loops
}

fn natural_loop_for(func: &Function, header: BlockId, latch: BlockId) -> NaturalLoop {
    let mut body = HashSet::new();
    body.insert(header);
    let mut worklist = vec![latch];
    while let Some(b) = worklist.pop() {
        if body.insert(b) {
            for p in func.predecessors(b) {
                worklist.push(p);
            }
        }
    }
    NaturalLoop { header, latch, body }
}

/// CFG back-edges (not necessarily natural-loop latches in malformed
/// CFGs, but coincide with them for the reducible CFGs this core
/// assumes, matching the upstream LLIR→LLIR simplification passes' CFG
/// simplification guarantee).
pub fn has_back_edge(func: &Function, doms: &Dominators) -> bool {
    func.blocks
        .iter()
        .any(|bb| bb.successors().into_iter().any(|s| doms.dominates(s, bb.id)))
}
