//! The driver pipeline as a library: wires `ir` → `analysis` →
//! `convert` → `passes` → `print` together (spec §1/§10.1) and maps
//! the result onto the §6/§7 exit codes. Kept separate from
//! `src/main.rs` so the integration tests in `tests/` can drive it
//! against `ir::Builder`-built modules without a real LLIR parser.

pub mod config;

use algebra::{FreshNames, Symbol};
use analysis::CallGraph;
pub use config::Config;
use convert::convert_module;
use core_error::{CoreError, CoreResult};
use ir::{Function, InstKind, Module, Ty};
use passes::{constrain_bounds, kittelize, slice_scc};
use print::render;
use std::collections::{HashMap, HashSet};

/// §7 kind 3: an instruction whose result type the converter has no
/// symbolic model for is meant to become an unguarded havoc
/// (`InstKind::Opaque` is documented as "always a havoc"). A `ty ==
/// Ty::Other` paired with any *other* kind means the module disagrees
/// with its own instructions about what they produce — the one case
/// the exhaustive `InstKind` match can't safely paper over.
fn find_unsupported_instructions(module: &Module) -> Vec<String> {
    let mut out = Vec::new();
    for func in module.defined_functions() {
        for block in &func.blocks {
            for (idx, inst) in block.insts.iter().enumerate() {
                if inst.ty == Ty::Other && !matches!(inst.kind, InstKind::Opaque) {
                    out.push(format!(
                        "{}:{}:{} ({:?}, ty=Other)",
                        func.name, block.name, idx, inst.kind
                    ));
                }
            }
        }
    }
    out
}

fn resolve_start_function<'a>(module: &'a Module, name: &str) -> CoreResult<&'a Function> {
    let func = module
        .function_by_name(name)
        .ok_or_else(|| CoreError::StartFunctionNotFound(name.to_string()))?;
    if func.is_declaration {
        return Err(CoreError::StartFunctionIsDeclaration(name.to_string()));
    }
    for param in &func.params {
        if !param.ty.is_integer() && param.ty != Ty::Void {
            return Err(CoreError::StartFunctionWrongSignature(format!(
                "{} has a non-integer parameter `{}` of type {:?}",
                name, param.name, param.ty
            )));
        }
    }
    Ok(func)
}

fn collect_widths(module: &Module) -> HashMap<Symbol, u32> {
    let mut widths = HashMap::new();
    for func in module.defined_functions() {
        for (_, param) in func.integer_params() {
            if let Some(w) = param.ty.bit_width() {
                widths.insert(Symbol::intern(&param.name), w);
            }
        }
    }
    widths
}

/// Runs the full pipeline against an already-built `Module` and
/// renders it in `cfg.output_format`. Parsing an on-disk module is out
/// of scope (spec §1); callers (tests, or a real driver with a parser
/// plugged in) build the `Module` themselves.
pub fn run(cfg: &Config, module: &Module) -> CoreResult<String> {
    cfg.validate()?;

    let start_func = resolve_start_function(module, &cfg.start_function_name)?;

    let unsupported = find_unsupported_instructions(module);
    if !unsupported.is_empty() {
        return Err(CoreError::UnsupportedInstructions(unsupported));
    }

    let call_graph = CallGraph::build(module);
    if cfg.eager_inline {
        let has_cycle = call_graph
            .sccs()
            .iter()
            .any(|scc| scc.len() > 1 || call_graph.directly_calls(scc[0], scc[0]));
        if has_cycle {
            return Err(CoreError::CyclicCallGraphWithEagerInline);
        }
    }

    let opts = cfg.converter_options();
    let oracle = cfg.alias_oracle();
    let converted = convert_module(module, &opts, &oracle)?;

    let mut fresh = FreshNames::new("bc");
    let mut final_rules = Vec::new();
    let elim = algebra::NoSolver;
    let slice_opts = cfg.slice_options();
    let bc_opts = cfg.bound_constrainer_options();
    let start_syms: HashSet<Symbol> = converted.start_symbols.values().copied().collect();
    let widths = collect_widths(module);

    for scc_rules in &converted.rule_groups {
        let kitteled = kittelize(scc_rules, &elim);
        let sliced = if cfg.no_slicing {
            kitteled
        } else {
            slice_scc(kitteled, &converted.control_points, &start_syms, &slice_opts)
        };
        let bounded = if opts.bounded_integers {
            let (rules, _have_to_keep) = constrain_bounds(&sliced, &widths, &bc_opts, &mut fresh);
            rules
        } else {
            sliced
        };
        final_rules.extend(bounded);
    }

    let start_symbol = converted
        .start_symbols
        .get(&start_func.id)
        .copied()
        .unwrap_or_else(|| convert::start_symbol(&start_func.name));

    render(&final_rules, start_symbol, cfg.output_format.into())
}
