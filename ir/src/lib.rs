//! In-memory model of a typed, SSA-form, low-level intermediate
//! representation module: functions made of basic blocks of
//! instructions, with integer arithmetic, memory loads/stores, calls,
//! and PHI nodes.
//!
//! This crate does not parse an on-disk LLIR encoding — that parser is
//! an out-of-scope external collaborator (see spec §1/§6). What it
//! provides instead is the abstract capability surface §6 lists
//! (enumerate functions/globals/blocks/instructions, query opcode,
//! operands, successors, PHI incoming values, dominator/loop info) plus
//! a `Builder` to construct modules programmatically.

pub mod block;
pub mod builder;
pub mod cfg;
pub mod function;
pub mod ids;
pub mod instr;
pub mod loops;
pub mod module;
pub mod transform;
pub mod types;
pub mod value;

pub use block::BasicBlock;
pub use builder::{FunctionBuilder, ModuleBuilder};
pub use function::{Function, Param};
pub use ids::{BlockId, FunctionId, GlobalId, InstIdx, InstLoc};
pub use instr::{Callee, ICmpPred, InstKind, Instruction, Intrinsic, Terminator, recognize_intrinsic};
pub use module::{Global, Module};
pub use types::{BitWidth, Ty};
pub use value::ValueId;
