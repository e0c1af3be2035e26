//! The five bit-width-indexed constants the converter and
//! bound-constrainer consult: `signed_max`, `signed_min_as_unsigned`,
//! `signed_min`, `unsigned_max`, and `2^w`. Memoised per bit width in a
//! process-wide, read-mostly cache, initialised on first use and never
//! torn down — the same shape as the 0/1/-1 polynomial singletons and
//! the teacher's `static EGRAPH: OnceLock<Mutex<EGraph>>` cache.

use crate::polynomial::Polynomial;
use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Signedness {
    Signed,
    Unsigned,
}

fn pow2(w: u32) -> BigInt {
    BigInt::one() << w
}

struct Tables {
    simax: HashMap<u32, Polynomial>,
    simin_as_ui: HashMap<u32, Polynomial>,
    simin: HashMap<u32, Polynomial>,
    uimax: HashMap<u32, Polynomial>,
    power_of_two: HashMap<u32, Polynomial>,
}

impl Tables {
    fn new() -> Self {
        Tables {
            simax: HashMap::new(),
            simin_as_ui: HashMap::new(),
            simin: HashMap::new(),
            uimax: HashMap::new(),
            power_of_two: HashMap::new(),
        }
    }
}

static TABLES: OnceLock<Mutex<Tables>> = OnceLock::new();

fn tables() -> &'static Mutex<Tables> {
    TABLES.get_or_init(|| Mutex::new(Tables::new()))
}

fn memo(
    cache: &mut HashMap<u32, Polynomial>,
    w: u32,
    compute: impl FnOnce() -> BigInt,
) -> Polynomial {
    cache
        .entry(w)
        .or_insert_with(|| Polynomial::constant(compute()))
        .clone()
}

/// `2^(w-1) - 1`, the largest value representable in a signed `w`-bit
/// integer.
pub fn signed_max(w: u32) -> Polynomial {
    let mut t = tables().lock().unwrap();
    memo(&mut t.simax, w, || pow2(w - 1) - BigInt::one())
}

/// `2^(w-1)`, the bit pattern of signed-min interpreted as unsigned.
pub fn signed_min_as_unsigned(w: u32) -> Polynomial {
    let mut t = tables().lock().unwrap();
    memo(&mut t.simin_as_ui, w, || pow2(w - 1))
}

/// `-2^(w-1)`, the smallest value representable in a signed `w`-bit
/// integer.
pub fn signed_min(w: u32) -> Polynomial {
    let mut t = tables().lock().unwrap();
    memo(&mut t.simin, w, || -pow2(w - 1))
}

/// `2^w - 1`, the largest value representable in an unsigned `w`-bit
/// integer.
pub fn unsigned_max(w: u32) -> Polynomial {
    let mut t = tables().lock().unwrap();
    memo(&mut t.uimax, w, || pow2(w) - BigInt::one())
}

/// `2^w`, the modulus of `w`-bit wraparound arithmetic.
pub fn power_of_two(w: u32) -> Polynomial {
    let mut t = tables().lock().unwrap();
    memo(&mut t.power_of_two, w, || pow2(w))
}

/// The representable range `[low, high]` for a `w`-bit integer under
/// the given encoding.
pub fn range(w: u32, signedness: Signedness) -> (Polynomial, Polynomial) {
    match signedness {
        Signedness::Signed => (signed_min(w), signed_max(w)),
        Signedness::Unsigned => (Polynomial::zero(), unsigned_max(w)),
    }
}

pub fn zero_big() -> BigInt {
    BigInt::zero()
}
