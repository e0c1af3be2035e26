//! Programmatic construction of a `Module`. Stands in for the
//! out-of-scope LLIR parser/verifier when embedding this crate or
//! writing tests: rather than decoding a binary module, callers build
//! one directly.

use crate::block::BasicBlock;
use crate::function::{Function, Param};
use crate::ids::{BlockId, FunctionId, GlobalId, InstIdx, InstLoc};
use crate::instr::{Instruction, InstKind, Terminator};
use crate::module::{Global, Module};
use crate::types::Ty;
use crate::value::ValueId;

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        ModuleBuilder {
            module: Module::default(),
        }
    }

    pub fn add_global(&mut self, name: &str, ty: Ty) -> GlobalId {
        let id = GlobalId(self.module.globals.len() as u32);
        self.module.globals.push(Global {
            id,
            name: name.to_string(),
            ty,
        });
        id
    }

    /// Registers a bodyless declaration (an intrinsic, or an external
    /// function a call may indirectly target).
    pub fn declare_function(
        &mut self,
        name: &str,
        params: Vec<(&str, Ty)>,
        return_ty: Ty,
    ) -> FunctionId {
        let id = FunctionId(self.module.functions.len() as u32);
        self.module.functions.push(Function {
            id,
            name: name.to_string(),
            params: params
                .into_iter()
                .map(|(n, t)| Param {
                    ty: t,
                    name: n.to_string(),
                })
                .collect(),
            return_ty,
            blocks: Vec::new(),
            entry: BlockId(0),
            is_declaration: true,
        });
        id
    }

    pub fn start_function(
        &mut self,
        name: &str,
        params: Vec<(&str, Ty)>,
        return_ty: Ty,
    ) -> FunctionBuilder {
        FunctionBuilder {
            func: Function {
                id: FunctionId(self.module.functions.len() as u32),
                name: name.to_string(),
                params: params
                    .into_iter()
                    .map(|(n, t)| Param {
                        ty: t,
                        name: n.to_string(),
                    })
                    .collect(),
                return_ty,
                blocks: Vec::new(),
                entry: BlockId(0),
                is_declaration: false,
            },
            entry_set: false,
        }
    }

    pub fn finish_function(&mut self, func: Function) -> FunctionId {
        let id = FunctionId(self.module.functions.len() as u32);
        let mut func = func;
        func.id = id;
        self.module.functions.push(func);
        id
    }

    pub fn build(self) -> Module {
        self.module
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FunctionBuilder {
    func: Function,
    entry_set: bool,
}

impl FunctionBuilder {
    pub fn param_value(&self, idx: u32) -> ValueId {
        assert!((idx as usize) < self.func.params.len());
        ValueId::Param(idx)
    }

    pub fn add_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.func.blocks.len() as u32);
        self.func.blocks.push(BasicBlock {
            id,
            name: name.to_string(),
            insts: Vec::new(),
            // placeholder; every block must get a real terminator via
            // `set_terminator` before `finish()`.
            terminator: Terminator::Unreachable,
        });
        if !self.entry_set {
            self.func.entry = id;
            self.entry_set = true;
        }
        id
    }

    pub fn set_entry(&mut self, block: BlockId) {
        self.func.entry = block;
    }

    fn block_mut(&mut self, block: BlockId) -> &mut BasicBlock {
        let idx = self
            .func
            .blocks
            .iter()
            .position(|b| b.id == block)
            .expect("unknown block in this function");
        &mut self.func.blocks[idx]
    }

    pub fn push_inst(&mut self, block: BlockId, name: &str, ty: Ty, kind: InstKind) -> ValueId {
        let bb = self.block_mut(block);
        let idx = bb.insts.len() as u32;
        bb.insts.push(Instruction {
            kind,
            ty,
            name: name.to_string(),
        });
        ValueId::Local(InstLoc {
            block,
            idx: InstIdx(idx),
        })
    }

    pub fn set_terminator(&mut self, block: BlockId, term: Terminator) {
        self.block_mut(block).terminator = term;
    }

    pub fn finish(self) -> Function {
        self.func
    }
}
