//! CLI flags (spec §6), translated into the plain structs the core
//! crates consume. `clap` only appears in this crate — every other
//! crate takes its options as ordinary values so it stays usable as a
//! library.

use algebra::Signedness;
use analysis::ConservativeOracle;
use clap::{Parser, ValueEnum};
use convert::ConverterOptions;
use core_error::{CoreError, CoreResult};
use passes::{BoundConstrainerOptions, SliceOptions};
use print::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Kittel,
    Cint,
    UniformCint,
    T2,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(f: OutputFormatArg) -> Self {
        match f {
            OutputFormatArg::Kittel => OutputFormat::Kittel,
            OutputFormatArg::Cint => OutputFormat::Cint,
            OutputFormatArg::UniformCint => OutputFormat::UniformCint,
            OutputFormatArg::T2 => OutputFormat::T2,
        }
    }
}

/// Only `none` is implemented in this crate (`ConservativeOracle`'s
/// over-approximation never needs a solver); the other variants are
/// accepted so a driver's command line is stable, and rejected at
/// `validate` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmtSolverArg {
    None,
    Cvc4,
    Mathsat5,
    Yices2,
    Z3,
}

#[derive(Debug, Parser)]
#[command(name = "rulecast", about = "Lowers typed SSA low-level IR to an integer term rewriting system")]
pub struct Config {
    /// Name of the function the analysis starts from; defaults to "main".
    #[arg(long, default_value = "main")]
    pub start_function_name: String,

    #[arg(long)]
    pub eager_inline: bool,

    #[arg(long, default_value_t = 0)]
    pub inline_passes_count: u32,

    #[arg(long)]
    pub assume_is_control: bool,

    #[arg(long)]
    pub select_is_control: bool,

    #[arg(long)]
    pub inline_voids: bool,

    #[arg(long)]
    pub increase_strength: bool,

    #[arg(long)]
    pub no_slicing: bool,

    #[arg(long)]
    pub conservative_slicing: bool,

    #[arg(long, default_value_t = true)]
    pub multi_pred_control: bool,

    #[arg(long)]
    pub bounded_integers: bool,

    #[arg(long)]
    pub unsigned_encoding: bool,

    #[arg(long, default_value_t = true)]
    pub propagate_conditions: bool,

    #[arg(long)]
    pub explicitize_loop_conditions: bool,

    #[arg(long)]
    pub simplify_conditions: bool,

    #[arg(long)]
    pub only_loop_conditions: bool,

    #[arg(long)]
    pub exact_division: bool,

    #[arg(long)]
    pub bitwise_conditions: bool,

    #[arg(long)]
    pub dump_transformed_ir: bool,

    #[arg(long, value_enum, default_value_t = OutputFormatArg::Kittel)]
    pub output_format: OutputFormatArg,

    #[arg(long, value_enum, default_value_t = SmtSolverArg::None)]
    pub smt_solver: SmtSolverArg,

    /// Path to the LLIR module. Parsing that module is out of scope
    /// (spec §1) — left for a caller to plug in; this binary's own
    /// `main` treats the path as opaque and never opens it.
    pub input: String,
}

impl Config {
    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            assume_is_control: self.assume_is_control,
            select_is_control: self.select_is_control,
            multi_pred_control: self.multi_pred_control,
            bounded_integers: self.bounded_integers,
            unsigned_encoding: self.unsigned_encoding,
            propagate_conditions: self.propagate_conditions,
            explicitize_loop_conditions: self.explicitize_loop_conditions,
            only_loop_conditions: self.only_loop_conditions,
            exact_division: self.exact_division,
            bitwise_conditions: self.bitwise_conditions,
        }
    }

    pub fn slice_options(&self) -> SliceOptions {
        SliceOptions {
            conservative: self.conservative_slicing,
        }
    }

    pub fn bound_constrainer_options(&self) -> BoundConstrainerOptions {
        let signedness = if self.unsigned_encoding {
            Signedness::Unsigned
        } else {
            Signedness::Signed
        };
        BoundConstrainerOptions { signedness }
    }

    pub fn alias_oracle(&self) -> ConservativeOracle {
        ConservativeOracle
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.converter_options()
            .validate()
            .map_err(CoreError::ConfigurationConflict)?;
        if self.eager_inline && self.inline_passes_count == 0 {
            return Err(CoreError::ConfigurationConflict(
                "eager-inline requires at least one inline pass".into(),
            ));
        }
        if !matches!(self.smt_solver, SmtSolverArg::None) {
            return Err(CoreError::ConfigurationConflict(format!(
                "smt-solver {:?} is not wired up; only `none` is supported",
                self.smt_solver
            )));
        }
        Ok(())
    }
}
