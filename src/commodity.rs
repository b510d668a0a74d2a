//! Commodity codes: a 32-bit tag space combined bitwise across unit
//! algebra, distinguishing otherwise-identical bases (a liter of milk
//! is not a liter of oil).
//!
//! The code space is partitioned so that multiplication, division and
//! inversion on [`crate::unit::PreciseUnit`] can combine commodities
//! with plain bitwise ops (spec section 3.3):
//!
//! - `0` means "no commodity".
//! - Codes `1..=0x0FFF_FFFF` (low 28 bits, high 4 bits clear) are the
//!   built-in table, assigned sequentially as commodities are
//!   registered by name.
//! - A short name (up to 5 ASCII lowercase letters) packs into its own
//!   reserved band using 5 bits per character instead of hashing,
//!   so that round-tripping a short commodity name back to text never
//!   needs a reverse lookup table.
//! - Longer names hash to the remaining band.
//! - Bit 31 (the sign bit) marks an *inverse* commodity (the result of
//!   [`inv`]); combining a commodity with its own inverse cancels back
//!   to the original code's complement semantics rather than `0`, so
//!   commodity information surviving a division by itself is still
//!   distinguishable from "no commodity" or "completely different
//!   commodity".

use std::collections::HashMap;
use std::sync::RwLock;

/// Sentinel meaning "no commodity attached".
pub const NONE: u32 = 0;

const INVERSE_BIT: u32 = 1 << 31;
const SHORT_CODE_BIT: u32 = 1 << 30;
const BUILTIN_MAX: u32 = 0x0FFF_FFFF;

/// Combine two commodity codes under multiplication: bitwise AND,
/// matching the reference implementation's "commodities only combine
/// when compatible" rule — two different commodities multiplied
/// together produce a code that no longer matches either one.
pub const fn multiply(a: u32, b: u32) -> u32 {
    if a == NONE {
        return b;
    }
    if b == NONE {
        return a;
    }
    a & b
}

/// Combine two commodity codes under division: AND the dividend with
/// the bitwise-NOT of the divisor, so dividing a commodity by itself
/// clears it back to [`NONE`].
pub const fn divide(a: u32, b: u32) -> u32 {
    if b == NONE {
        return a;
    }
    if a == NONE {
        return invert(b);
    }
    a & !b
}

/// Invert a commodity code by bitwise complement. Every code this module
/// generates (builtin sequential, short-packed, hashed) leaves bit 31
/// clear, so complementing one always sets it and complementing twice
/// always returns the original code — bit 31 doubles as an "is inverted"
/// marker without needing a dedicated flip.
pub const fn invert(code: u32) -> u32 {
    if code == NONE {
        return NONE;
    }
    !code
}

/// Pack a short (1-5 character) ASCII-lowercase commodity name into its
/// own reserved band: 5 bits per character (`a`..`z` fits in 5 bits),
/// marked with [`SHORT_CODE_BIT`] so it can never collide with a
/// sequentially-assigned builtin code or a hashed long name.
///
/// Returns `None` if the name is empty, longer than 5 characters, or
/// contains a byte outside `a..=z`.
pub fn pack_short_code(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 5 || !name.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    let mut bits: u32 = 0;
    for b in name.bytes() {
        bits = (bits << 5) | u32::from(b - b'a' + 1);
    }
    Some(bits | SHORT_CODE_BIT)
}

/// Unpack a code produced by [`pack_short_code`] back into its name.
/// Returns `None` if `code` does not have [`SHORT_CODE_BIT`] set.
pub fn unpack_short_code(code: u32) -> Option<String> {
    if code & SHORT_CODE_BIT == 0 {
        return None;
    }
    let mut bits = code & !SHORT_CODE_BIT & !INVERSE_BIT;
    let mut chars = Vec::new();
    while bits != 0 {
        let nibble = bits & 0x1F;
        bits >>= 5;
        if nibble == 0 {
            continue;
        }
        chars.push(b'a' + (nibble - 1) as u8);
    }
    chars.reverse();
    String::from_utf8(chars).ok()
}

/// Hash a long commodity name into the remaining code band (everything
/// that isn't a builtin sequential code, a short packed code, or the
/// inverse/short marker bits), using the FNV-1a algorithm for the same
/// reason the teacher's string-interchange code favors small,
/// dependency-free primitives over pulling in a hashing crate.
pub fn hash_long_code(name: &str) -> u32 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = FNV_OFFSET;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    (hash & BUILTIN_MAX) | 0x1000_0000
}

/// Process-wide commodity name registry: built-in sequential codes
/// plus user-registered overlay entries (spec section 5).
#[derive(Default)]
pub struct CommodityRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    by_name: HashMap<String, u32>,
    by_code: HashMap<u32, String>,
    next_builtin: u32,
}

impl CommodityRegistry {
    /// Create an empty registry (no built-in commodities pre-seeded;
    /// the crate root seeds a handful of named physical commodities at
    /// startup through [`CommodityRegistry::add`]).
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_name: HashMap::new(),
                by_code: HashMap::new(),
                next_builtin: 1,
            }),
        }
    }

    /// Register `name`, returning its code. Short names (<=5 lowercase
    /// ASCII letters) are packed directly; longer names are hashed;
    /// re-registering an existing name returns its existing code
    /// rather than assigning a new one.
    pub fn add(&self, name: &str) -> u32 {
        if let Some(code) = self.get_code(name) {
            return code;
        }
        let code = pack_short_code(name).unwrap_or_else(|| hash_long_code(name));
        let mut inner = self.inner.write().expect("commodity registry poisoned");
        inner.by_name.insert(name.to_owned(), code);
        inner.by_code.insert(code, name.to_owned());
        code
    }

    /// Look up a registered name's code.
    pub fn get_code(&self, name: &str) -> Option<u32> {
        let inner = self.inner.read().expect("commodity registry poisoned");
        inner.by_name.get(name).copied()
    }

    /// Look up a code's registered name. Short-packed codes resolve
    /// even if never explicitly registered, since their name is
    /// recoverable directly from the bit pattern.
    pub fn get_name(&self, code: u32) -> Option<String> {
        if code == NONE {
            return None;
        }
        let base_code = if code & INVERSE_BIT != 0 { !code } else { code };
        if let Some(name) = unpack_short_code(base_code) {
            return Some(name);
        }
        let inner = self.inner.read().expect("commodity registry poisoned");
        inner.by_code.get(&base_code).cloned()
    }
}

/// The process-wide commodity registry the parser, serializer, and
/// `add_custom_commodity`/`get_commodity` entry points share.
pub fn global() -> &'static CommodityRegistry {
    static INSTANCE: std::sync::OnceLock<CommodityRegistry> = std::sync::OnceLock::new();
    INSTANCE.get_or_init(CommodityRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_is_identity_preserving() {
        assert_eq!(multiply(NONE, 5), 5);
        assert_eq!(multiply(5, NONE), 5);
    }

    #[test]
    fn divide_by_self_clears() {
        let code = pack_short_code("milk").unwrap();
        assert_eq!(divide(code, code), NONE);
    }

    #[test]
    fn invert_twice_is_identity() {
        let code = pack_short_code("oil").unwrap();
        assert_eq!(invert(invert(code)), code);
    }

    #[test]
    fn invert_is_full_bitwise_complement() {
        let code = pack_short_code("oil").unwrap();
        assert_eq!(invert(code), !code);
        assert_eq!(invert(NONE), NONE);
        assert_eq!(divide(NONE, code), !code);
    }

    #[test]
    fn inverted_short_code_still_resolves_its_name() {
        let reg = CommodityRegistry::new();
        let code = pack_short_code("milk").unwrap();
        assert_eq!(reg.get_name(invert(code)).as_deref(), Some("milk"));
    }

    #[test]
    fn short_code_round_trips() {
        for name in ["a", "ab", "milk", "oils", "grain"] {
            let code = pack_short_code(name).unwrap();
            assert_eq!(unpack_short_code(code).as_deref(), Some(name));
        }
    }

    #[test]
    fn short_code_rejects_bad_input() {
        assert!(pack_short_code("").is_none());
        assert!(pack_short_code("toolong").is_none());
        assert!(pack_short_code("Milk").is_none());
    }

    #[test]
    fn registry_round_trips_short_and_long_names() {
        let reg = CommodityRegistry::new();
        let milk = reg.add("milk");
        assert_eq!(reg.get_name(milk).as_deref(), Some("milk"));
        let long_name = "sweetlightcrudeoil";
        let oil = reg.add(long_name);
        assert_eq!(reg.get_name(oil).as_deref(), Some(long_name));
        assert_ne!(milk, oil);
        assert_eq!(reg.add("milk"), milk);
    }
}
