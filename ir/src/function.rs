use crate::block::BasicBlock;
use crate::ids::{BlockId, FunctionId};
use crate::types::Ty;

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Ty,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: Ty,
    pub blocks: Vec<BasicBlock>,
    pub entry: BlockId,
    /// A declaration (no body) — e.g. `assume`, `nondef`, or an external
    /// function. The converter never emits rules for one of these.
    pub is_declaration: bool,
}

impl Function {
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .expect("BlockId not present in this function")
    }

    pub fn block_index(&self, id: BlockId) -> usize {
        self.blocks
            .iter()
            .position(|b| b.id == id)
            .expect("BlockId not present in this function")
    }

    pub fn entry_block(&self) -> &BasicBlock {
        self.block(self.entry)
    }

    pub fn integer_params(&self) -> impl Iterator<Item = (u32, &Param)> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u32, p))
            .filter(|(_, p)| p.ty.is_integer())
    }

    /// Predecessor blocks of `target`, in block-list order.
    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.successors().contains(&target))
            .map(|b| b.id)
            .collect()
    }
}
