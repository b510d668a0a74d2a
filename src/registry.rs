//! Process-wide shared-mutable state (spec section 5): the active
//! domain tag, the default match-flags word, and the enable/disable
//! gates for the user-defined unit and custom-commodity overlays.
//!
//! Per spec section 5, readers (every parse/serialize call) must be
//! safe under concurrent access while writers (registration calls) are
//! assumed to be serialized or quiescent. The reference implementation
//! gets away with an unguarded map plus an atomic bool gate; Rust's
//! aliasing rules don't let this crate expose that unsoundly, so the
//! gates are plain atomics and the domain/flags words are also atomics
//! — single scalars, no lock needed. The overlay maps themselves (in
//! `dictionary.rs`) go behind an `RwLock`, the option spec section 9
//! explicitly sanctions.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::flags::MatchFlags;

static ACTIVE_DOMAIN: AtomicU32 = AtomicU32::new(0);
static DEFAULT_FLAGS: AtomicU64 = AtomicU64::new(0);
static USER_UNITS_ENABLED: AtomicBool = AtomicBool::new(true);
static CUSTOM_COMMODITIES_ENABLED: AtomicBool = AtomicBool::new(true);

/// Domain tag selecting a small table of shadowing dictionary entries
/// (spec section 3.4). `0` is the "no domain" default.
pub type Domain = u32;

/// The currently active domain.
pub fn active_domain() -> Domain {
    ACTIVE_DOMAIN.load(Ordering::Acquire)
}

/// Set the active domain, returning the previous value
/// (`set_units_domain` in spec section 6.1).
pub fn set_units_domain(domain: Domain) -> Domain {
    ACTIVE_DOMAIN.swap(domain, Ordering::AcqRel)
}

/// The process-wide default match-flags word used when callers don't
/// supply one explicitly.
pub fn default_flags() -> MatchFlags {
    let bits = DEFAULT_FLAGS.load(Ordering::Acquire);
    if bits == 0 {
        MatchFlags::DEFAULT
    } else {
        MatchFlags::from_bits(bits)
    }
}

/// Set the process-wide default match-flags word, returning the
/// previous value.
pub fn set_default_flags(flags: MatchFlags) -> MatchFlags {
    let previous = DEFAULT_FLAGS.swap(flags.to_bits(), Ordering::AcqRel);
    if previous == 0 {
        MatchFlags::DEFAULT
    } else {
        MatchFlags::from_bits(previous)
    }
}

/// Is registering new user-defined units currently allowed? Existing
/// entries remain readable regardless.
pub fn user_defined_units_enabled() -> bool {
    USER_UNITS_ENABLED.load(Ordering::Acquire)
}

/// Allow new user-defined unit registrations.
pub fn enable_user_defined_units() {
    USER_UNITS_ENABLED.store(true, Ordering::Release);
}

/// Block new user-defined unit registrations (existing entries remain
/// in the overlay and are still consulted by parsing/serialization).
pub fn disable_user_defined_units() {
    USER_UNITS_ENABLED.store(false, Ordering::Release);
}

/// Is registering new custom commodities currently allowed?
pub fn custom_commodities_enabled() -> bool {
    CUSTOM_COMMODITIES_ENABLED.load(Ordering::Acquire)
}

/// Allow new custom commodity registrations.
pub fn enable_custom_commodities() {
    CUSTOM_COMMODITIES_ENABLED.store(true, Ordering::Release);
}

/// Block new custom commodity registrations.
pub fn disable_custom_commodities() {
    CUSTOM_COMMODITIES_ENABLED.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The registries below are genuinely process-wide statics; a mutex
    // keeps this test module's own test threads from interleaving.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn domain_swap_returns_previous() {
        let _guard = TEST_LOCK.lock().unwrap();
        let prev = set_units_domain(5);
        assert_eq!(active_domain(), 5);
        let prev2 = set_units_domain(prev);
        assert_eq!(prev2, 5);
        assert_eq!(active_domain(), prev);
    }

    #[test]
    fn gates_default_enabled_and_toggle() {
        let _guard = TEST_LOCK.lock().unwrap();
        assert!(user_defined_units_enabled());
        disable_user_defined_units();
        assert!(!user_defined_units_enabled());
        enable_user_defined_units();
        assert!(user_defined_units_enabled());
    }

    #[test]
    fn default_flags_round_trip() {
        let _guard = TEST_LOCK.lock().unwrap();
        let custom = MatchFlags::DEFAULT.with_strict(true);
        let prev = set_default_flags(custom);
        assert!(default_flags().strict());
        set_default_flags(prev);
    }
}
