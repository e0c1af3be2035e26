//! The fatal error kinds of spec §7, shared by every core crate so a
//! failure can propagate with `?` from wherever it's detected up to
//! `cli::main`, which maps it to the process exit code §6 names.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// §7 kind 1. Not one of §6's explicitly numbered codes; treated as
    /// an internal/configuration code distinct from 0-7 (see
    /// `exit_code`, and DESIGN.md for the reasoning).
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    /// §6 code 3: `start-function-name` names no function in the module.
    #[error("start function not found: {0}")]
    StartFunctionNotFound(String),

    /// §6 code 4: the named start function is a declaration with no body.
    #[error("start function has no body: {0}")]
    StartFunctionIsDeclaration(String),

    /// §6 code 5: the named start function's signature can't be lowered
    /// (e.g. a non-integer, non-void parameter the converter can't model).
    #[error("start function has an unsupported signature: {0}")]
    StartFunctionWrongSignature(String),

    /// §6 code 6. §7 kind 3: collected up front, reported together.
    #[error("unsupported instruction(s): {0:?}")]
    UnsupportedInstructions(Vec<String>),

    /// §6 code 7. §7 kind 4.
    #[error("cyclic call graph incompatible with eager-inline")]
    CyclicCallGraphWithEagerInline,

    /// §7 kind 2: a lookup into an alias or condition map returned
    /// absent where the converter expected a value — a programming bug
    /// inside the core, not a malformed-input condition.
    #[error("missing analysis fact for instruction {instruction} in function {function}")]
    MissingAnalysisFact {
        function: String,
        instruction: String,
    },

    /// §7 kind 5.
    #[error("SMT subprocess failure: {0}")]
    SmtSubprocessFailure(String),

    /// §7 kind 6: a `Negation`/`Or` reaching a printer or pass that
    /// only accepts a conjunction of atoms.
    #[error("unexpected algebraic shape: {0}")]
    UnexpectedAlgebraicShape(String),
}

impl CoreError {
    /// The §6 exit code for this error kind. §6 only assigns explicit
    /// numbers to input handling (1, 2), function selection (3-5),
    /// unsupported instructions (6), and cyclic-call-graph (7);
    /// everything else is "a non-zero internal code for invariant
    /// violations" and gets one here, above the explicit 0-7 range.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::StartFunctionNotFound(_) => 3,
            CoreError::StartFunctionIsDeclaration(_) => 4,
            CoreError::StartFunctionWrongSignature(_) => 5,
            CoreError::UnsupportedInstructions(_) => 6,
            CoreError::CyclicCallGraphWithEagerInline => 7,
            CoreError::ConfigurationConflict(_) => 64,
            CoreError::MissingAnalysisFact { .. } => 65,
            CoreError::SmtSubprocessFailure(_) => 66,
            CoreError::UnexpectedAlgebraicShape(_) => 67,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
