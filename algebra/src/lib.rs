pub mod bitwidth;
pub mod constraint;
pub mod monomial;
pub mod polynomial;
pub mod symbol;
pub mod term;

pub use bitwidth::Signedness;
pub use constraint::{Constraint, NoSolver, RelOp, ShouldEliminate};
pub use monomial::Monomial;
pub use polynomial::Polynomial;
pub use symbol::{FreshNames, Symbol};
pub use term::{Rule, Term};
