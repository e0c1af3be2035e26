//! The rewrite passes run after Condensation (spec §4.F-H): Kittelizer
//! flattens guards to conjunctions of atoms, Slicer drops dead argument
//! positions, Bound-Constrainer re-injects width bounds under
//! bounded-integer encoding.

pub mod bound_constrainer;
pub mod kittelizer;
pub mod slicer;

pub use bound_constrainer::{constrain_bounds, BoundConstrainerOptions};
pub use kittelizer::kittelize;
pub use slicer::{slice_scc, SliceOptions};
