//! The fixed sequence of LLIR-to-LLIR rewrites (inlining, mem2reg, CFG
//! simplification, dead-code elimination, constant-expression
//! flattening, strength adjustment, block reordering) is, per spec,
//! external to the core and applied before lowering. This trait is the
//! interface boundary: a real driver plugs in an implementation; this
//! crate ships only the identity pipeline.

use crate::module::Module;

pub trait IrTransform {
    /// Human-readable name, surfaced in `--dump-transformed-ir` output.
    fn name(&self) -> &'static str;
    fn apply(&self, module: Module) -> Module;
}

pub struct NoopTransform;

impl IrTransform for NoopTransform {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn apply(&self, module: Module) -> Module {
        module
    }
}

/// Runs a fixed list of transforms in order, mirroring the "fixed
/// sequence of black-box rewrites" §1 describes.
pub struct TransformPipeline {
    stages: Vec<Box<dyn IrTransform>>,
}

impl TransformPipeline {
    pub fn new(stages: Vec<Box<dyn IrTransform>>) -> Self {
        TransformPipeline { stages }
    }

    pub fn noop() -> Self {
        TransformPipeline {
            stages: vec![Box::new(NoopTransform)],
        }
    }

    pub fn run(&self, mut module: Module, mut trace: impl FnMut(&str)) -> Module {
        for stage in &self.stages {
            trace(stage.name());
            module = stage.apply(module);
        }
        module
    }
}
