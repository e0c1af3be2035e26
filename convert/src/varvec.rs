//! Phase 1 of the Converter (spec §4.E): collect the shared variable
//! vector `V`, in the fixed order the spec mandates — integer params,
//! then integer globals, then integer locals in program order. Phase 2
//! (rule emission, `emit.rs`) re-traverses the same instruction order
//! but never changes `V` again.

use algebra::{Polynomial, Symbol};
use ir::{Function, FunctionId, GlobalId, InstLoc, Module, Ty};
use std::collections::HashMap;

/// `Param`/`Local` pair the owning function's id with the per-function
/// id (`u32` parameter index / `InstLoc`), since an SCC-shared `VarVec`
/// (`collect_scc`) holds slots from more than one function and block
/// ids are only unique within a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOrigin {
    Param(FunctionId, u32),
    Global(GlobalId),
    Local(FunctionId, InstLoc),
}

#[derive(Debug, Clone)]
pub struct VarSlot {
    pub symbol: Symbol,
    pub origin: VarOrigin,
}

#[derive(Debug, Clone)]
pub struct VarVec {
    slots: Vec<VarSlot>,
    param_symbol: HashMap<(FunctionId, u32), Symbol>,
    global_symbol: HashMap<GlobalId, Symbol>,
    local_symbol: HashMap<(FunctionId, InstLoc), Symbol>,
}

impl VarVec {
    pub fn collect(func: &Function, module: &Module) -> VarVec {
        Self::collect_scc(&[func], module)
    }

    /// Phase 1 for a whole SCC at once (spec: "for the whole SCC, a
    /// shared variable vector V is assembled"): every function in the
    /// component contributes its integer params, then the module's
    /// integer globals are added once, then every function contributes
    /// its integer locals in program order. Functions in the same SCC
    /// can therefore call each other without any argument-vector
    /// remapping — a call's actual arguments simply override the
    /// callee's param slots of this same `V` (see `emit.rs`).
    pub fn collect_scc(funcs: &[&Function], module: &Module) -> VarVec {
        let mut slots = Vec::new();
        let mut param_symbol = HashMap::new();
        let mut global_symbol = HashMap::new();
        let mut local_symbol = HashMap::new();

        for func in funcs {
            for (idx, param) in func.integer_params() {
                let sym = Symbol::intern(&format!("{}@{}", func.name, param.name));
                param_symbol.insert((func.id, idx), sym);
                slots.push(VarSlot {
                    symbol: sym,
                    origin: VarOrigin::Param(func.id, idx),
                });
            }
        }

        for g in module.integer_globals() {
            let sym = Symbol::intern(&format!("g:{}", g.name));
            global_symbol.insert(g.id, sym);
            slots.push(VarSlot {
                symbol: sym,
                origin: VarOrigin::Global(g.id),
            });
        }

        for func in funcs {
            for bb in &func.blocks {
                for (idx, inst) in bb.insts.iter().enumerate() {
                    if inst.ty == Ty::Bool || !inst.ty.is_integer() {
                        continue;
                    }
                    let loc = bb.loc(idx as u32);
                    let label = if inst.name.is_empty() {
                        format!("{}@_t{}_{}", func.name, loc.block.0, loc.idx.0)
                    } else {
                        format!("{}@{}", func.name, inst.name)
                    };
                    let sym = Symbol::intern(&label);
                    local_symbol.insert((func.id, loc), sym);
                    slots.push(VarSlot {
                        symbol: sym,
                        origin: VarOrigin::Local(func.id, loc),
                    });
                }
            }
        }

        VarVec {
            slots,
            param_symbol,
            global_symbol,
            local_symbol,
        }
    }

    pub fn slots(&self) -> &[VarSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.slots.iter().map(|s| s.symbol).collect()
    }

    /// `V` itself, as the polynomial argument vector of a control-point
    /// `Term`.
    pub fn as_args(&self) -> Vec<Polynomial> {
        self.slots
            .iter()
            .map(|s| Polynomial::from_var(s.symbol))
            .collect()
    }

    pub fn index_of_local(&self, f: FunctionId, loc: InstLoc) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.origin == VarOrigin::Local(f, loc))
    }

    pub fn symbol_of_param(&self, f: FunctionId, idx: u32) -> Option<Symbol> {
        self.param_symbol.get(&(f, idx)).copied()
    }

    pub fn symbol_of_global(&self, g: GlobalId) -> Option<Symbol> {
        self.global_symbol.get(&g).copied()
    }

    pub fn symbol_of_local(&self, f: FunctionId, loc: InstLoc) -> Option<Symbol> {
        self.local_symbol.get(&(f, loc)).copied()
    }

    /// `V` with the slots named in `overrides` replaced by the given
    /// polynomial; every other slot stays `from_var(slot.symbol)`. This
    /// is the "new-args" vector construction used both for a single
    /// instruction's result slot and for a PHI/call-result multi-slot
    /// substitution at a branch edge.
    pub fn substituted_args(&self, overrides: &HashMap<Symbol, Polynomial>) -> Vec<Polynomial> {
        self.slots
            .iter()
            .map(|s| {
                overrides
                    .get(&s.symbol)
                    .cloned()
                    .unwrap_or_else(|| Polynomial::from_var(s.symbol))
            })
            .collect()
    }
}
