//! The Converter (spec §4.E) end to end: per-SCC phase 1/phase 2 rule
//! emission followed by condensation, driven by the call-hierarchy
//! analyser's reverse-topological SCC order so a callee's `VarVec` is
//! always on hand by the time its caller needs it.

pub mod cond;
pub mod condense;
pub mod config;
pub mod divrem;
pub mod emit;
pub mod signtest;
pub mod varvec;

pub use config::ConverterOptions;
pub use emit::{start_symbol, stop_symbol, FunctionRules};
pub use varvec::VarVec;

use algebra::{FreshNames, Rule, Symbol};
use analysis::{
    explicit_loop_condition_map, loop_condition_blocks, AliasOracle, CallGraph, MayMustMap,
    TrueFalseMap,
};
use core_error::CoreResult;
use ir::cfg::Dominators;
use ir::loops::find_natural_loops;
use ir::{Function, FunctionId, GlobalId, Module};
use std::collections::{HashMap, HashSet};

/// The full rule set produced for a module: every SCC's condensed rules
/// concatenated, plus the union of all control-point symbols and each
/// defined function's `eval_f_start` symbol (the driver picks one as
/// the analysis start term).
pub struct ConvertedModule {
    pub rules: Vec<Rule>,
    /// `rules`, grouped by the SCC that produced them (reverse
    /// topological order, matching `CallGraph::sccs`). Downstream passes
    /// (F/G/H) run per SCC since a `VarVec` is shared within one but not
    /// across SCCs; this is the boundary information that grouping
    /// needs, without the caller having to rediscover it from rule
    /// contents.
    pub rule_groups: Vec<Vec<Rule>>,
    pub control_points: HashSet<Symbol>,
    pub start_symbols: HashMap<FunctionId, Symbol>,
    pub stop_symbols: HashMap<FunctionId, Symbol>,
}

/// `mayZap(f)` widened to every function transitively reachable from
/// `f`: the set of global cells a call to `f` might clobber, used to
/// havoc the caller's globals at a call site without re-walking the
/// callee's body.
fn build_zap_sets(
    module: &Module,
    call_graph: &CallGraph,
    alias_maps: &HashMap<FunctionId, MayMustMap>,
) -> HashMap<FunctionId, HashSet<GlobalId>> {
    let mut own_zap: HashMap<FunctionId, HashSet<GlobalId>> = HashMap::new();
    for func in module.defined_functions() {
        let mm = &alias_maps[&func.id];
        own_zap.insert(func.id, mm.may_zap(func));
    }
    let mut zap_sets = HashMap::new();
    for func in module.defined_functions() {
        let mut z = own_zap.get(&func.id).cloned().unwrap_or_default();
        for callee in call_graph.transitively_called(func.id) {
            if let Some(cz) = own_zap.get(&callee) {
                z.extend(cz.iter().copied());
            }
        }
        zap_sets.insert(func.id, z);
    }
    zap_sets
}

pub fn convert_module(
    module: &Module,
    opts: &ConverterOptions,
    oracle: &dyn AliasOracle,
) -> CoreResult<ConvertedModule> {
    let call_graph = CallGraph::build(module);
    let sccs = call_graph.sccs();

    let mut alias_maps: HashMap<FunctionId, MayMustMap> = HashMap::new();
    for func in module.defined_functions() {
        alias_maps.insert(func.id, MayMustMap::compute(func, module, oracle));
    }
    let zap_sets = build_zap_sets(module, &call_graph, &alias_maps);

    let mut var_vecs: HashMap<FunctionId, VarVec> = HashMap::new();
    let mut rules = Vec::new();
    let mut rule_groups = Vec::new();
    let mut control_points = HashSet::new();
    let mut start_symbols = HashMap::new();
    let mut stop_symbols = HashMap::new();
    let mut fresh = FreshNames::new("z");

    for scc in &sccs {
        let scc_set: HashSet<FunctionId> = scc.iter().copied().collect();
        let funcs: Vec<&Function> = scc.iter().map(|&id| module.function(id)).collect();
        let vv = VarVec::collect_scc(&funcs, module);
        for &id in scc {
            var_vecs.insert(id, vv.clone());
        }

        let mut scc_rules = Vec::new();
        let mut scc_control_points: HashSet<Symbol> = HashSet::new();

        for &fid in scc {
            let func = module.function(fid);
            let doms = Dominators::compute(func);
            let loops = find_natural_loops(func, &doms);
            let loop_cond_blocks = loop_condition_blocks(func, &loops);
            let only_loop_conditions = opts.only_loop_conditions.then_some(&loop_cond_blocks);
            let tf = TrueFalseMap::compute(func, module, &doms, only_loop_conditions);
            let loop_conditions = explicit_loop_condition_map(func, &loops);
            let alias = &alias_maps[&fid];

            let fr = emit::emit_function(
                func,
                module,
                &vv,
                opts,
                &scc_set,
                &call_graph,
                &var_vecs,
                &zap_sets,
                alias,
                &tf,
                &loop_conditions,
                &doms,
                &mut fresh,
            )?;

            start_symbols.insert(fid, fr.start);
            stop_symbols.insert(fid, fr.stop);
            scc_rules.extend(fr.rules);
            scc_control_points.extend(fr.control_points);
        }

        let condensed = condense::get_condensed_rules(&scc_rules, &scc_control_points);
        rules.extend(condensed.iter().cloned());
        rule_groups.push(condensed);
        control_points.extend(scc_control_points);
    }

    Ok(ConvertedModule {
        rules,
        rule_groups,
        control_points,
        start_symbols,
        stop_symbols,
    })
}
