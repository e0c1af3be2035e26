//! MayMustMap (spec §4.C): per memory-accessing instruction, the set of
//! global cells it must touch and the set it may touch. Real pointer
//! alias analysis is an external capability this core consumes through
//! `AliasOracle` — the same "model it as a capability" treatment §9
//! gives the SMT oracle.

use ir::{Function, GlobalId, InstKind, InstLoc, Module, ValueId};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Must,
    /// Aliases part, but not all, of the cell (e.g. a sub-object store);
    /// per spec contributes to `may` for loads and to `must` for stores.
    Partial,
    May,
}

pub trait AliasOracle {
    fn aliases(&self, ptr: &ValueId, module: &Module) -> Vec<(GlobalId, AliasKind)>;
}

/// The oracle used when no real alias analysis is plugged in: a pointer
/// that is literally a global's address is a `Must`-alias of that
/// global and nothing else; any other pointer (a loaded pointer, a
/// parameter, an opaque value) is conservatively a `May`-alias of every
/// integer global, since nothing here can rule it out.
pub struct ConservativeOracle;

impl AliasOracle for ConservativeOracle {
    fn aliases(&self, ptr: &ValueId, module: &Module) -> Vec<(GlobalId, AliasKind)> {
        match ptr {
            ValueId::Global(g) => vec![(*g, AliasKind::Must)],
            _ => module
                .integer_globals()
                .map(|g| (g.id, AliasKind::May))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MayMust {
    pub may: HashSet<GlobalId>,
    pub must: HashSet<GlobalId>,
}

#[derive(Debug, Clone, Default)]
pub struct MayMustMap {
    per_inst: Vec<(InstLoc, MayMust)>,
}

impl MayMustMap {
    pub fn compute(func: &Function, module: &Module, oracle: &dyn AliasOracle) -> Self {
        let mut per_inst = Vec::new();
        for bb in &func.blocks {
            for (idx, inst) in bb.insts.iter().enumerate() {
                let loc = bb.loc(idx as u32);
                let mm = match &inst.kind {
                    InstKind::Load { ptr } => {
                        let mut mm = MayMust::default();
                        for (g, kind) in oracle.aliases(ptr, module) {
                            match kind {
                                AliasKind::Must => {
                                    mm.must.insert(g);
                                }
                                AliasKind::Partial | AliasKind::May => {
                                    mm.may.insert(g);
                                }
                            }
                        }
                        Some(mm)
                    }
                    InstKind::Store { ptr, .. } => {
                        let mut mm = MayMust::default();
                        for (g, kind) in oracle.aliases(ptr, module) {
                            match kind {
                                AliasKind::Must | AliasKind::Partial => {
                                    mm.must.insert(g);
                                }
                                AliasKind::May => {
                                    mm.may.insert(g);
                                }
                            }
                        }
                        Some(mm)
                    }
                    _ => None,
                };
                if let Some(mm) = mm {
                    per_inst.push((loc, mm));
                }
            }
        }
        MayMustMap { per_inst }
    }

    pub fn get(&self, loc: InstLoc) -> Option<&MayMust> {
        self.per_inst
            .iter()
            .find(|(l, _)| *l == loc)
            .map(|(_, mm)| mm)
    }

    /// Union of `may(i) ∪ must(i)` over every store in the function —
    /// the set of globals a call to this function might clobber.
    pub fn may_zap(&self, func: &Function) -> HashSet<GlobalId> {
        let mut zap = HashSet::new();
        for bb in &func.blocks {
            for (idx, inst) in bb.insts.iter().enumerate() {
                if matches!(inst.kind, InstKind::Store { .. }) {
                    let loc = bb.loc(idx as u32);
                    if let Some(mm) = self.get(loc) {
                        zap.extend(mm.may.iter().copied());
                        zap.extend(mm.must.iter().copied());
                    }
                }
            }
        }
        zap
    }
}
