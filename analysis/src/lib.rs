//! Component C (alias/condition feeders) and component D (call-hierarchy
//! analyser): pure, read-only producers consumed by the converter.

pub mod alias;
pub mod callgraph;
pub mod loop_conditions;
pub mod truefalse;

pub use alias::{AliasKind, AliasOracle, ConservativeOracle, MayMust, MayMustMap};
pub use callgraph::CallGraph;
pub use loop_conditions::{
    explicit_loop_condition_for, explicit_loop_condition_map, loop_condition_blocks,
    ExplicitLoopCondition,
};
pub use truefalse::TrueFalseMap;
