use algebra::Signedness;

/// The subset of the CLI's configuration flags (spec §6) the converter
/// itself consults. The `cli` crate's `Config` (clap-derived) maps down
/// to this plain struct so `convert` doesn't depend on `clap`.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub assume_is_control: bool,
    pub select_is_control: bool,
    pub multi_pred_control: bool,
    pub bounded_integers: bool,
    pub unsigned_encoding: bool,
    pub propagate_conditions: bool,
    pub explicitize_loop_conditions: bool,
    pub only_loop_conditions: bool,
    pub exact_division: bool,
    pub bitwise_conditions: bool,
}

impl ConverterOptions {
    /// "Mathematical integers" mode: no bit-width bounding, ordinary
    /// exact-precision arithmetic. The default end-to-end scenario mode
    /// spec §8 describes.
    pub fn mathematical() -> Self {
        ConverterOptions {
            assume_is_control: false,
            select_is_control: false,
            multi_pred_control: true,
            bounded_integers: false,
            unsigned_encoding: false,
            propagate_conditions: true,
            explicitize_loop_conditions: false,
            only_loop_conditions: false,
            exact_division: false,
            bitwise_conditions: false,
        }
    }

    pub fn signedness(&self) -> Signedness {
        if self.unsigned_encoding {
            Signedness::Unsigned
        } else {
            Signedness::Signed
        }
    }

    /// Configuration-conflict check (spec §7 error kind 1); the `cli`
    /// crate calls this before doing any work.
    pub fn validate(&self) -> Result<(), String> {
        if self.exact_division && self.bounded_integers {
            return Err("exact-division is mutually exclusive with bounded-integers".into());
        }
        if self.bitwise_conditions && !self.bounded_integers {
            return Err("bitwise-conditions requires bounded-integers".into());
        }
        if self.unsigned_encoding && !self.bounded_integers {
            return Err("unsigned-encoding is only meaningful with bounded-integers".into());
        }
        Ok(())
    }
}
