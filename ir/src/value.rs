use crate::ids::{GlobalId, InstLoc};
use crate::types::Ty;
use num_bigint::BigInt;

/// A use-site reference to a value: an instruction result, a formal
/// parameter, a global cell, or a literal constant. Blocks never store
/// `Value`s directly — instructions reference their operands through
/// `ValueId`, the way an SSA use-list works.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueId {
    Param(u32),
    Local(InstLoc),
    Global(GlobalId),
    ConstInt(BigInt, Ty),
    ConstBool(bool),
    /// A value the core cannot model symbolically (e.g. `undef`, a
    /// floating-point literal). Always treated as Nondef/havoc.
    Opaque,
}

impl ValueId {
    pub fn const_zero(ty: Ty) -> Self {
        ValueId::ConstInt(BigInt::from(0), ty)
    }
}
