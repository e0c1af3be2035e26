//! Process-wide string interning for variable names and function
//! symbols. Per the design notes, interning isn't required for
//! semantic correctness but pays for itself given how often the same
//! few hundred names get hashed and compared while rules accumulate
//! across an SCC — exactly the "repeated map lookups" the design notes
//! call out. The static cache is the same `OnceLock`-backed singleton
//! shape the converter's bit-width constant tables use.

use lasso::{Spur, ThreadedRodeo};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();

fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::new)
}

/// An interned name — a variable (program location argument) or a
/// function symbol (program location). `Copy` and cheap to compare;
/// ordering is by resolved string content rather than intern order so
/// output stays deterministic independent of traversal-order accidents.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    pub fn intern(s: &str) -> Symbol {
        Symbol(interner().get_or_intern(s))
    }

    pub fn as_str(&self) -> &'static str {
        interner().resolve(&self.0)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::intern(&s)
    }
}

/// A process-wide counter for fresh havoc/nondef variable names, the
/// same `fresh_var` pattern the teacher's semantic compiler uses for
/// fresh existential variables, generalized from a per-compiler counter
/// to a global one so names stay unique across every function lowered
/// in a process, matching the Nondef invariant that a havoc name
/// appears nowhere else.
pub struct FreshNames {
    prefix: &'static str,
    next: u64,
}

impl FreshNames {
    pub fn new(prefix: &'static str) -> Self {
        FreshNames { prefix, next: 0 }
    }

    pub fn next(&mut self) -> Symbol {
        let n = self.next;
        self.next += 1;
        Symbol::intern(&format!("{}{}", self.prefix, n))
    }
}
