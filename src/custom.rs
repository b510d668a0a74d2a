//! Custom (opaque) units and custom count units (spec section 3.2,
//! component J).
//!
//! A custom unit is a placeholder for "some unit nobody has registered
//! a proper dimension for yet" — callers can mint up to
//! [`CUSTOM_UNIT_SLOTS`] of them and [`CUSTOM_COUNT_UNIT_SLOTS`] custom
//! *counting* units (things like "widgets" that should behave like the
//! `count` dimension rather than being fully opaque), addressed by a
//! small integer slot number. They round-trip through [`BaseUnit`] via
//! the equation-flag reserved-pattern space, the same space
//! `equation.rs` uses for logarithmic scales, distinguished from those
//! by [`BaseUnit::has_i_flag`].

use crate::base::BaseUnit;

/// Number of distinct opaque custom unit slots.
pub const CUSTOM_UNIT_SLOTS: u16 = 1024;
/// Number of distinct custom counting-unit slots.
pub const CUSTOM_COUNT_UNIT_SLOTS: u8 = 16;

/// Construct the base tuple for opaque custom unit number `slot`
/// (`0..CUSTOM_UNIT_SLOTS`). The slot number is spread across the
/// meter, second and kilogram fields (16 * 16 * 4 = 1024 distinct
/// combinations), none of which [`crate::equation::EqType`] touches
/// (it lives in radian/currency with the e-flag set), so the two
/// reserved-pattern namespaces never collide.
pub fn custom_unit(slot: u16) -> BaseUnit {
    debug_assert!(slot < CUSTOM_UNIT_SLOTS);
    let slot = slot as i32;
    let meter = slot % 16 - 8;
    let second = (slot / 16) % 16 - 8;
    let kilogram = (slot / 256) % 4 - 4;
    BaseUnit::new(
        meter, second, kilogram, 0, 0, 0, 0, 0, 0, 0, false, false, false, true,
    )
}

/// Is `base` a custom unit produced by [`custom_unit`]?
pub fn is_custom_unit(base: BaseUnit) -> bool {
    base.is_equation() && !base.has_i_flag() && !base.has_e_flag()
}

/// Recover the slot number passed to [`custom_unit`]. Returns `None`
/// if `base` is not a custom unit.
pub fn custom_unit_number(base: BaseUnit) -> Option<u16> {
    if !is_custom_unit(base) {
        return None;
    }
    let meter = (base.meter() + 8).rem_euclid(16);
    let second = (base.second() + 8).rem_euclid(16);
    let kilogram = (base.kilogram() + 4).rem_euclid(4);
    Some((kilogram * 256 + second * 16 + meter) as u16)
}

/// Is this custom unit inverted (i.e. `1 / custom_unit(n)`)?
///
/// Inversion negates every exponent, so the slot-carrying fields above
/// flip sign; a custom unit is "inverted" when it no longer decodes to
/// the same slot as its un-negated form would, which in practice means
/// checking whether the base equals the negation of a forward-encoded
/// tuple for the recovered slot.
pub fn is_custom_unit_inverted(base: BaseUnit) -> bool {
    match custom_unit_number(base) {
        Some(slot) => base.inv() == custom_unit(slot).inv() && base != custom_unit(slot),
        None => false,
    }
}

/// Construct the base tuple for custom counting unit number `slot`
/// (`0..CUSTOM_COUNT_UNIT_SLOTS`). The `count` field is only 2 bits
/// (4 values) and too narrow for 16 slots, so this reuses `second`
/// (4 bits, 16 values) the way [`custom_unit`] reuses `meter`; the
/// `i_flag` (no `e_flag`) distinguishes it from a plain custom unit
/// regardless of which numeric field carries the slot.
pub fn custom_count_unit(slot: u8) -> BaseUnit {
    debug_assert!(slot < CUSTOM_COUNT_UNIT_SLOTS);
    let second = slot as i32 - 8;
    BaseUnit::new(
        0, second, 0, 0, 0, 0, 0, 0, 0, 0, false, true, false, true,
    )
}

/// Is `base` a custom counting unit produced by [`custom_count_unit`]?
pub fn is_custom_count_unit(base: BaseUnit) -> bool {
    base.is_equation() && base.has_i_flag() && !base.has_e_flag()
}

/// Recover the slot number passed to [`custom_count_unit`].
pub fn custom_count_unit_number(base: BaseUnit) -> Option<u8> {
    if !is_custom_count_unit(base) {
        return None;
    }
    Some((base.second() + 8).rem_euclid(16) as u8)
}

/// Is this custom count unit inverted?
pub fn is_custom_count_unit_inverted(base: BaseUnit) -> bool {
    match custom_count_unit_number(base) {
        Some(slot) => base.inv() == custom_count_unit(slot).inv() && base != custom_count_unit(slot),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_unit_round_trips_every_slot() {
        for slot in 0..CUSTOM_UNIT_SLOTS {
            let base = custom_unit(slot);
            assert!(is_custom_unit(base));
            assert_eq!(custom_unit_number(base), Some(slot));
            assert!(!is_custom_unit_inverted(base));
        }
    }

    #[test]
    fn custom_count_unit_round_trips() {
        for slot in 0..CUSTOM_COUNT_UNIT_SLOTS {
            let base = custom_count_unit(slot);
            assert!(is_custom_count_unit(base));
            assert_eq!(custom_count_unit_number(base), Some(slot));
        }
    }

    #[test]
    fn custom_unit_and_equation_unit_namespaces_do_not_collide() {
        let custom = custom_unit(3);
        assert!(!is_custom_count_unit(custom));
    }
}
