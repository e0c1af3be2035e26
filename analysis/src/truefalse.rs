//! TrueFalseMap (spec §4.C): for each basic block, the sets of
//! predicate-valued instructions known to be true / known to be false
//! on entry, by forward dataflow over the acyclic part of the CFG
//! (back-edges excluded), meet = intersection.

use ir::cfg::{reverse_postorder, Dominators};
use ir::{BlockId, Callee, Function, InstKind, Intrinsic, Module, Terminator, ValueId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct TrueFalseMap {
    t: HashMap<BlockId, HashSet<ValueId>>,
    f: HashMap<BlockId, HashSet<ValueId>>,
}

impl TrueFalseMap {
    pub fn true_set(&self, b: BlockId) -> &HashSet<ValueId> {
        static EMPTY: std::sync::OnceLock<HashSet<ValueId>> = std::sync::OnceLock::new();
        self.t
            .get(&b)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    pub fn false_set(&self, b: BlockId) -> &HashSet<ValueId> {
        static EMPTY: std::sync::OnceLock<HashSet<ValueId>> = std::sync::OnceLock::new();
        self.f
            .get(&b)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// `only_loop_conditions`: when given, a predecessor's branch
    /// condition is only propagated into blocks in this set (spec's
    /// "only loop conditions" configuration option).
    pub fn compute(
        func: &Function,
        module: &Module,
        doms: &Dominators,
        only_loop_conditions: Option<&HashSet<BlockId>>,
    ) -> Self {
        let rpo = reverse_postorder(func);
        let mut t: HashMap<BlockId, HashSet<ValueId>> = HashMap::new();
        let mut f: HashMap<BlockId, HashSet<ValueId>> = HashMap::new();

        for &b in &rpo {
            if b == func.entry {
                t.insert(b, HashSet::new());
                f.insert(b, HashSet::new());
                continue;
            }
            let acyclic_preds: Vec<BlockId> = func
                .predecessors(b)
                .into_iter()
                .filter(|&p| !doms.dominates(b, p))
                .collect();
            if acyclic_preds.is_empty() {
                t.insert(b, HashSet::new());
                f.insert(b, HashSet::new());
                continue;
            }

            let mut t_sets = Vec::new();
            let mut f_sets = Vec::new();
            for &p in &acyclic_preds {
                let mut tp = t.get(&p).cloned().unwrap_or_default();
                let mut fp = f.get(&p).cloned().unwrap_or_default();

                let propagate_here = match only_loop_conditions {
                    Some(set) => set.contains(&b),
                    None => true,
                };
                if propagate_here {
                    let pb = func.block(p);
                    if let Terminator::CondBr {
                        cond,
                        if_true,
                        if_false,
                    } = &pb.terminator
                    {
                        if *if_true == b {
                            tp.insert(cond.clone());
                        } else if *if_false == b {
                            fp.insert(cond.clone());
                        }
                    }
                    for inst in &pb.insts {
                        if let InstKind::Call { callee, args } = &inst.kind {
                            if is_assume_call(module, callee) {
                                if let Some(c) = args.first() {
                                    tp.insert(c.clone());
                                }
                            }
                        }
                    }
                }
                t_sets.push(tp);
                f_sets.push(fp);
            }

            t.insert(b, intersect_all(t_sets));
            f.insert(b, intersect_all(f_sets));
        }

        TrueFalseMap { t, f }
    }
}

fn is_assume_call(module: &Module, callee: &Callee) -> bool {
    match callee {
        Callee::Direct(fid) => {
            let target = module.function(*fid);
            matches!(
                ir::recognize_intrinsic(&target.name),
                Some(Intrinsic::Assume)
            )
        }
        Callee::Indirect { .. } => false,
    }
}

fn intersect_all(sets: Vec<HashSet<ValueId>>) -> HashSet<ValueId> {
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return HashSet::new();
    };
    iter.fold(first, |acc, s| acc.intersection(&s).cloned().collect())
}
