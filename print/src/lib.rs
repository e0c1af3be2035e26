//! The three textual output formats of spec §6: KITTeL, CInt
//! (complexity tuples, plain or uniform), and T2. Each SCC's rule list
//! is rendered independently — the driver prints once per SCC.

pub mod cint;
pub mod kittel;
pub mod t2;

use algebra::{Rule, Symbol};
use core_error::CoreResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Kittel,
    Cint,
    UniformCint,
    T2,
}

pub fn render(rules: &[Rule], start: Symbol, format: OutputFormat) -> CoreResult<String> {
    match format {
        OutputFormat::Kittel => Ok(kittel::print_kittel(rules)),
        OutputFormat::Cint => cint::print_cint(rules, start, false),
        OutputFormat::UniformCint => cint::print_cint(rules, start, true),
        OutputFormat::T2 => Ok(t2::print_t2(rules, start)),
    }
}
