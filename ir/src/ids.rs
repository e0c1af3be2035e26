//! Opaque handles into a `Module`. Kept as plain indexed newtypes rather
//! than pointers/references so a `Module` stays trivially `Clone`/`Send`
//! and the analysis crate can cache maps keyed by them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Index of an instruction within its block's instruction list (not
/// globally unique by itself; always paired with a `BlockId` via
/// `InstLoc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstIdx(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstLoc {
    pub block: BlockId,
    pub idx: InstIdx,
}
