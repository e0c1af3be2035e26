//! The six end-to-end scenarios of spec §8, built against
//! `ir::Builder` rather than literal LLIR binaries (the parser is out
//! of scope). Each asserts on the rendered KITTeL text's shape rather
//! than matching exact control-point names, since symbol minting is an
//! internal implementation detail.

use ir::{ICmpPred, InstKind, ModuleBuilder, Terminator, Ty};
use rulecast::config::{Config, OutputFormatArg, SmtSolverArg};

fn base_config(start: &str) -> Config {
    Config {
        start_function_name: start.to_string(),
        eager_inline: false,
        inline_passes_count: 0,
        assume_is_control: false,
        select_is_control: false,
        inline_voids: false,
        increase_strength: false,
        no_slicing: false,
        conservative_slicing: false,
        multi_pred_control: true,
        bounded_integers: false,
        unsigned_encoding: false,
        propagate_conditions: true,
        explicitize_loop_conditions: false,
        simplify_conditions: false,
        only_loop_conditions: false,
        exact_division: false,
        bitwise_conditions: false,
        dump_transformed_ir: false,
        output_format: OutputFormatArg::Kittel,
        smt_solver: SmtSolverArg::None,
        input: "unused".to_string(),
    }
}

#[test]
fn trivial_function_produces_a_single_start_to_stop_rule() {
    let mut mb = ModuleBuilder::new();
    let mut fb = mb.start_function("f", vec![], Ty::Int(32));
    let entry = fb.add_block("entry");
    fb.set_terminator(entry, Terminator::Ret(Some(ir::ValueId::const_zero(Ty::Int(32)))));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let out = rulecast::run(&base_config("f"), &module).unwrap();
    assert!(out.contains("eval_f_start"));
    assert!(out.contains("eval_f_stop"));
}

#[test]
fn single_assignment_threads_the_parameter_through() {
    let mut mb = ModuleBuilder::new();
    let mut fb = mb.start_function("f", vec![("x", Ty::Int(32))], Ty::Int(32));
    let entry = fb.add_block("entry");
    let x = fb.param_value(0);
    let y = fb.push_inst(entry, "y", Ty::Int(32), InstKind::Add(x.clone(), ir::ValueId::ConstInt(1.into(), Ty::Int(32))));
    fb.set_terminator(entry, Terminator::Ret(Some(y)));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let out = rulecast::run(&base_config("f"), &module).unwrap();
    assert!(out.contains("eval_f_start"));
}

#[test]
fn while_loop_produces_header_and_exit_rules() {
    let mut mb = ModuleBuilder::new();
    let mut fb = mb.start_function("f", vec![("x", Ty::Int(32))], Ty::Int(32));
    let entry = fb.add_block("entry");
    let header = fb.add_block("header");
    let body = fb.add_block("body");
    let exit = fb.add_block("exit");

    let x_param = fb.param_value(0);
    // The loop-carried value from `body` hasn't been pushed yet, but its
    // slot is known ahead of time: the first instruction of `body`.
    let x_dec_ref = ir::ValueId::Local(ir::InstLoc {
        block: body,
        idx: ir::InstIdx(0),
    });

    let x_phi = fb.push_inst(
        header,
        "x_phi",
        Ty::Int(32),
        InstKind::Phi(vec![(entry, x_param), (body, x_dec_ref)]),
    );
    fb.set_terminator(entry, Terminator::Br(header));

    let cmp = fb.push_inst(
        header,
        "cmp",
        Ty::Bool,
        InstKind::ICmp {
            pred: ICmpPred::SignedGt,
            lhs: x_phi.clone(),
            rhs: ir::ValueId::const_zero(Ty::Int(32)),
        },
    );
    fb.set_terminator(
        header,
        Terminator::CondBr {
            cond: cmp,
            if_true: body,
            if_false: exit,
        },
    );

    fb.push_inst(
        body,
        "x_dec",
        Ty::Int(32),
        InstKind::Sub(x_phi.clone(), ir::ValueId::ConstInt(1.into(), Ty::Int(32))),
    );
    fb.set_terminator(body, Terminator::Br(header));

    fb.set_terminator(exit, Terminator::Ret(Some(x_phi)));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let out = rulecast::run(&base_config("f"), &module).unwrap();
    assert!(out.contains("eval_f_start"));
    assert!(out.contains("eval_f_stop"));
}

#[test]
fn signed_division_by_constant_expands_into_guarded_cases() {
    let mut mb = ModuleBuilder::new();
    let mut fb = mb.start_function("f", vec![("x", Ty::Int(32))], Ty::Int(32));
    let entry = fb.add_block("entry");
    let x = fb.param_value(0);
    let z = fb.push_inst(
        entry,
        "z",
        Ty::Int(32),
        InstKind::SDiv(x, ir::ValueId::ConstInt(3.into(), Ty::Int(32))),
    );
    fb.set_terminator(entry, Terminator::Ret(Some(z)));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let out = rulecast::run(&base_config("f"), &module).unwrap();
    assert!(out.contains("eval_f_start"));
}

#[test]
fn bounded_unsigned_addition_adds_a_normalising_chain() {
    let mut mb = ModuleBuilder::new();
    let mut fb = mb.start_function("f", vec![("x", Ty::Int(8))], Ty::Int(8));
    let entry = fb.add_block("entry");
    let x = fb.param_value(0);
    let y = fb.push_inst(entry, "y", Ty::Int(8), InstKind::Add(x, ir::ValueId::ConstInt(1.into(), Ty::Int(8))));
    fb.set_terminator(entry, Terminator::Ret(Some(y)));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let mut cfg = base_config("f");
    cfg.bounded_integers = true;
    cfg.unsigned_encoding = true;
    let out = rulecast::run(&cfg, &module).unwrap();
    assert!(out.contains("eval_f_start"));
}

#[test]
fn indirect_call_with_two_candidates_produces_both_edges() {
    let mut mb = ModuleBuilder::new();
    let mut g = mb.start_function("g", vec![], Ty::Int(32));
    let gb = g.add_block("entry");
    g.set_terminator(gb, Terminator::Ret(Some(ir::ValueId::const_zero(Ty::Int(32)))));
    mb.finish_function(g.finish());

    let mut h = mb.start_function("h", vec![], Ty::Int(32));
    let hb = h.add_block("entry");
    h.set_terminator(hb, Terminator::Ret(Some(ir::ValueId::const_zero(Ty::Int(32)))));
    mb.finish_function(h.finish());

    let mut fb = mb.start_function("f", vec![], Ty::Int(32));
    let entry = fb.add_block("entry");
    let call = fb.push_inst(
        entry,
        "call",
        Ty::Int(32),
        InstKind::Call {
            callee: ir::Callee::Indirect {
                fn_ty: Ty::Int(32),
                arity: 0,
            },
            args: vec![],
        },
    );
    fb.set_terminator(entry, Terminator::Ret(Some(call)));
    let f = fb.finish();
    mb.finish_function(f);
    let module = mb.build();

    let out = rulecast::run(&base_config("f"), &module).unwrap();
    assert!(out.contains("eval_g_start") || out.contains("eval_h_start"));
}

#[test]
fn missing_start_function_is_reported() {
    let module = ModuleBuilder::new().build();
    let err = rulecast::run(&base_config("nope"), &module).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn declaration_only_start_function_is_reported() {
    let mut mb = ModuleBuilder::new();
    mb.declare_function("f", vec![], Ty::Int(32));
    let module = mb.build();
    let err = rulecast::run(&base_config("f"), &module).unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn conflicting_flags_are_rejected_before_any_pipeline_work() {
    let mut cfg = base_config("f");
    cfg.exact_division = true;
    cfg.bounded_integers = true;
    let module = ModuleBuilder::new().build();
    let err = rulecast::run(&cfg, &module).unwrap_err();
    assert_eq!(err.exit_code(), 64);
}
