use crate::ids::{BlockId, FunctionId};
use crate::types::Ty;
use crate::value::ValueId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ICmpPred {
    Eq,
    Ne,
    SignedLt,
    SignedLe,
    SignedGt,
    SignedGe,
    UnsignedLt,
    UnsignedLe,
    UnsignedGt,
    UnsignedGe,
}

impl ICmpPred {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ICmpPred::SignedLt | ICmpPred::SignedLe | ICmpPred::SignedGt | ICmpPred::SignedGe
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ICmpPred::UnsignedLt
                | ICmpPred::UnsignedLe
                | ICmpPred::UnsignedGt
                | ICmpPred::UnsignedGe
        )
    }

    pub fn negate(self) -> ICmpPred {
        match self {
            ICmpPred::Eq => ICmpPred::Ne,
            ICmpPred::Ne => ICmpPred::Eq,
            ICmpPred::SignedLt => ICmpPred::SignedGe,
            ICmpPred::SignedLe => ICmpPred::SignedGt,
            ICmpPred::SignedGt => ICmpPred::SignedLe,
            ICmpPred::SignedGe => ICmpPred::SignedLt,
            ICmpPred::UnsignedLt => ICmpPred::UnsignedGe,
            ICmpPred::UnsignedLe => ICmpPred::UnsignedGt,
            ICmpPred::UnsignedGt => ICmpPred::UnsignedLe,
            ICmpPred::UnsignedGe => ICmpPred::UnsignedLt,
        }
    }
}

/// What a `call` instruction targets. Indirect calls carry the static
/// pointer type used by the call-hierarchy analyser (component D) to
/// over-approximate candidate callees: every defined function whose
/// signature matches `fn_ty` is a possible callee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callee {
    Direct(FunctionId),
    Indirect { fn_ty: Ty, arity: usize },
}

/// Well-known intrinsic names the converter special-cases (§4.E). These
/// are recognised by the declared (bodyless) function's name; the LLIR
/// verifier (out of scope) is assumed to have already rejected any
/// mismatched-signature use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Assume,
    Nondef,
}

pub fn recognize_intrinsic(name: &str) -> Option<Intrinsic> {
    if name == "assume" {
        Some(Intrinsic::Assume)
    } else if name == "nondef" || name.starts_with("nondef.") || name.starts_with("__nondef") {
        Some(Intrinsic::Nondef)
    } else {
        None
    }
}

/// The per-opcode payload of one non-terminator instruction. Deliberately
/// flat (no visitor hierarchy) per the design notes: exhaustive matching
/// on this enum is the per-opcode handler table of §4.E.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstKind {
    Add(ValueId, ValueId),
    Sub(ValueId, ValueId),
    Mul(ValueId, ValueId),
    SDiv(ValueId, ValueId),
    UDiv(ValueId, ValueId),
    SRem(ValueId, ValueId),
    URem(ValueId, ValueId),
    And(ValueId, ValueId),
    Or(ValueId, ValueId),
    Xor(ValueId, ValueId),
    /// zext of an i1 source to an integer type.
    ZExtFromBool(ValueId),
    /// zext of an iM source (M = `src_width`) to a wider integer type.
    ZExtFromInt { src: ValueId, src_width: u32 },
    /// sext of an iM source to a wider integer type.
    SExt { src: ValueId, src_width: u32 },
    Trunc(ValueId),
    BitCastIntToInt(ValueId),
    PtrToInt(ValueId),
    IntToPtr(ValueId),
    FpToSi(ValueId),
    FpToUi(ValueId),
    Select {
        cond: ValueId,
        if_true: ValueId,
        if_false: ValueId,
    },
    /// `(predecessor block, incoming value)` pairs. Emits no rule of its
    /// own — consumed at the branch that enters this block (§4.E step 5).
    Phi(Vec<(BlockId, ValueId)>),
    Load {
        ptr: ValueId,
    },
    Store {
        value: ValueId,
        ptr: ValueId,
    },
    Call {
        callee: Callee,
        args: Vec<ValueId>,
    },
    ICmp {
        pred: ICmpPred,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// Boolean `and`/`or`/`xor c, 1` on i1-typed operands, tracked
    /// separately from the integer bitwise ops above so `cond_of_value`
    /// can route them structurally instead of re-deriving booleanness
    /// from type information at every call site.
    BoolAnd(ValueId, ValueId),
    BoolOr(ValueId, ValueId),
    BoolNot(ValueId),
    /// Anything the converter has no symbolic model for: floating-point
    /// arithmetic, vector ops, aggregates. Always a havoc / Nondef.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: InstKind,
    /// The type of the value this instruction defines. `Ty::Void` for
    /// instructions with no result (`store`, void `call`).
    pub ty: Ty,
    /// Human-readable name, used only for symbol/variable display; not
    /// load-bearing for correctness.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminator {
    Ret(Option<ValueId>),
    Br(BlockId),
    CondBr {
        cond: ValueId,
        if_true: BlockId,
        if_false: BlockId,
    },
    Unreachable,
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Ret(_) | Terminator::Unreachable => vec![],
            Terminator::Br(b) => vec![*b],
            Terminator::CondBr {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
        }
    }
}
