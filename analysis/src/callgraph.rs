//! Call-hierarchy analyser (spec §4.D): adjacency matrix over defined
//! functions, transitively closed (Warshall), then split into SCCs
//! (Tarjan) in reverse topological order.

use ir::{Callee, FunctionId, InstKind, Module, Ty};
use std::collections::{HashMap, HashSet};

pub struct CallGraph {
    /// Defined functions, indexed in enumeration order (spec: "index
    /// them" — matrix rows/columns are this order).
    functions: Vec<FunctionId>,
    index: HashMap<FunctionId, usize>,
    /// `adj[i][j]` = true iff function `i` may directly call function `j`.
    adj: Vec<Vec<bool>>,
}

impl CallGraph {
    pub fn build(module: &Module) -> Self {
        let functions: Vec<FunctionId> = module.defined_functions().map(|f| f.id).collect();
        let index: HashMap<FunctionId, usize> = functions
            .iter()
            .enumerate()
            .map(|(i, &f)| (f, i))
            .collect();
        let n = functions.len();
        let mut adj = vec![vec![false; n]; n];

        for &caller in &functions {
            let ci = index[&caller];
            let func = module.function(caller);
            for bb in &func.blocks {
                for inst in &bb.insts {
                    let InstKind::Call { callee, .. } = &inst.kind else {
                        continue;
                    };
                    match callee {
                        Callee::Direct(callee_id) => {
                            if let Some(&cj) = index.get(callee_id) {
                                adj[ci][cj] = true;
                            }
                        }
                        Callee::Indirect { fn_ty, arity } => {
                            for candidate in indirect_candidates(module, fn_ty, *arity) {
                                if let Some(&cj) = index.get(&candidate) {
                                    adj[ci][cj] = true;
                                }
                            }
                        }
                    }
                }
            }
        }

        CallGraph {
            functions,
            index,
            adj,
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn function_at(&self, i: usize) -> FunctionId {
        self.functions[i]
    }

    /// The defined functions `callee` may resolve to at runtime: the
    /// single target for a direct call, or the over-approximated
    /// candidate set for an indirect one. Used by the converter to emit
    /// a call rule per potential callee.
    pub fn resolve(&self, module: &Module, callee: &Callee) -> Vec<FunctionId> {
        match callee {
            Callee::Direct(f) => vec![*f],
            Callee::Indirect { fn_ty, arity } => indirect_candidates(module, fn_ty, *arity),
        }
    }

    /// Whether function `a` directly (not transitively) calls `b`.
    pub fn directly_calls(&self, a: FunctionId, b: FunctionId) -> bool {
        match (self.idx(a), self.idx(b)) {
            (Some(i), Some(j)) => self.adj[i][j],
            _ => false,
        }
    }

    fn idx(&self, f: FunctionId) -> Option<usize> {
        self.index.get(&f).copied()
    }

    /// Warshall's algorithm: `closure[i][j]` = true iff `j` is
    /// transitively reachable from `i`.
    pub fn transitive_closure(&self) -> Vec<Vec<bool>> {
        let n = self.len();
        let mut closure = self.adj.clone();
        for k in 0..n {
            for i in 0..n {
                if closure[i][k] {
                    for j in 0..n {
                        if closure[k][j] {
                            closure[i][j] = true;
                        }
                    }
                }
            }
        }
        closure
    }

    /// Every function transitively callable from `f` (excluding `f`
    /// itself unless it is reachable via recursion).
    pub fn transitively_called(&self, f: FunctionId) -> HashSet<FunctionId> {
        let closure = self.transitive_closure();
        let Some(i) = self.idx(f) else {
            return HashSet::new();
        };
        closure[i]
            .iter()
            .enumerate()
            .filter(|(_, &reachable)| reachable)
            .map(|(j, _)| self.functions[j])
            .collect()
    }

    /// Strongly-connected components, in reverse topological order —
    /// the order Tarjan's algorithm naturally produces them in as it
    /// completes them. Recursive (spec allows either); function counts
    /// in this domain are small enough for stack depth to never matter.
    pub fn sccs(&self) -> Vec<Vec<FunctionId>> {
        let n = self.len();
        let mut state = TarjanState {
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            sccs: Vec::new(),
        };
        for i in 0..n {
            if state.index[i].is_none() {
                self.strongconnect(i, &mut state);
            }
        }
        state
            .sccs
            .into_iter()
            .map(|scc| {
                let mut scc = scc;
                scc.sort();
                scc.into_iter().map(|i| self.functions[i]).collect()
            })
            .collect()
    }

    fn strongconnect(&self, v: usize, state: &mut TarjanState) {
        state.index[v] = Some(state.next_index);
        state.lowlink[v] = state.next_index;
        state.next_index += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for w in 0..self.len() {
            if !self.adj[v][w] {
                continue;
            }
            match state.index[w] {
                None => {
                    self.strongconnect(w, state);
                    state.lowlink[v] = state.lowlink[v].min(state.lowlink[w]);
                }
                Some(wi) if state.on_stack[w] => {
                    state.lowlink[v] = state.lowlink[v].min(wi);
                }
                _ => {}
            }
        }

        if state.lowlink[v] == state.index[v].unwrap() {
            let mut scc = Vec::new();
            loop {
                let w = state.stack.pop().unwrap();
                state.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            state.sccs.push(scc);
        }
    }
}

struct TarjanState {
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    sccs: Vec<Vec<usize>>,
}

/// Over-approximation for an indirect call: every defined function
/// whose arity matches and whose return type matches `fn_ty`. `ir::Ty`
/// has no dedicated function-pointer-type component (no structural
/// parameter-list type), so the return type is the closest available
/// discriminator — documented in DESIGN.md as a deliberate
/// simplification of the real pointer-type check.
fn indirect_candidates(module: &Module, fn_ty: &Ty, arity: usize) -> Vec<FunctionId> {
    module
        .defined_functions()
        .filter(|f| f.params.len() == arity && f.return_ty == *fn_ty)
        .map(|f| f.id)
        .collect()
}
