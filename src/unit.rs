//! Unit values: a multiplier paired with a [`BaseUnit`] dimensional
//! tuple, closed under multiplication, division, inversion, integer
//! powers and roots (spec section 3.2).
//!
//! Two flavors are provided, matching the fast/precise split the
//! reference implementation uses throughout:
//!
//! - [`Unit`] carries an `f32` multiplier and no commodity; it is the
//!   cheap, `Copy`, everyday type.
//! - [`PreciseUnit`] carries an `f64` multiplier and an optional
//!   commodity code (see `commodity.rs`); conversions between the two
//!   are explicit and lossy in the commodity-dropping direction.

use crate::base::BaseUnit;
use crate::commodity;
use crate::round::{compare_round_equals, compare_round_equals_precise, cround, cround_precise};

/// A fast unit: an `f32` multiplier and a dimensional base, no
/// commodity. `Copy` because both fields are.
#[derive(Copy, Clone, Debug)]
pub struct Unit {
    multiplier: f32,
    base: BaseUnit,
}

impl Unit {
    /// Construct directly from a multiplier and base.
    pub const fn new(multiplier: f32, base: BaseUnit) -> Self {
        Self { multiplier, base }
    }

    /// The dimensionless unit `1`.
    pub const ONE: Unit = Unit::new(1.0, BaseUnit::DIMENSIONLESS);

    /// Sentinel for "failed to parse" (spec section 7): a NaN
    /// multiplier paired with the dimensionless base.
    pub const INVALID: Unit = Unit::new(f32::NAN, BaseUnit::DIMENSIONLESS);

    /// Sentinel for "algebra overflowed" (spec section 7): any finite
    /// multiplier paired with [`BaseUnit::ERROR`].
    pub const ERROR: Unit = Unit::new(1.0, BaseUnit::ERROR);

    /// This unit's multiplier.
    pub const fn multiplier(self) -> f32 {
        self.multiplier
    }

    /// This unit's dimensional base.
    pub const fn base_unit(self) -> BaseUnit {
        self.base
    }

    /// True if the multiplier is NaN (the "invalid" sentinel family;
    /// spec section 7 reserves NaN exclusively for "could not parse").
    pub fn is_invalid(self) -> bool {
        self.multiplier.is_nan()
    }

    /// True if the base tuple is the all-saturated error tuple (the
    /// "algebra overflowed" sentinel family).
    pub fn is_error(self) -> bool {
        self.base == BaseUnit::ERROR
    }

    /// Multiplier equal to `1` and base empty with no flags: the
    /// unadorned default unit.
    pub fn is_default(self) -> bool {
        self.base.is_empty() && !self.base.has_e_flag() && self.multiplier == 1.0
    }

    /// Round this unit's multiplier to tolerance, as
    /// [`crate::round::cround`] does.
    pub fn round(self) -> Unit {
        Unit::new(cround(self.multiplier), self.base)
    }

    /// Promote to a [`PreciseUnit`] with no commodity attached.
    pub fn to_precise(self) -> PreciseUnit {
        PreciseUnit::new(f64::from(self.multiplier), self.base, commodity::NONE)
    }
}

impl std::ops::Mul for Unit {
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit {
        if self.base.mul_would_overflow(rhs.base) {
            return Unit::ERROR;
        }
        Unit::new(self.multiplier * rhs.multiplier, self.base.mul(rhs.base))
    }
}

impl std::ops::Div for Unit {
    type Output = Unit;
    fn div(self, rhs: Unit) -> Unit {
        if self.base.div_would_overflow(rhs.base) {
            return Unit::ERROR;
        }
        Unit::new(self.multiplier / rhs.multiplier, self.base.div(rhs.base))
    }
}

impl Unit {
    /// Multiplicative inverse.
    pub fn inv(self) -> Unit {
        Unit::new(1.0 / self.multiplier, self.base.inv())
    }

    /// Raise to an integer power.
    pub fn pow(self, power: i32) -> Unit {
        if self.base.pow_would_overflow(power) {
            return Unit::ERROR;
        }
        Unit::new(self.multiplier.powi(power), self.base.pow(power))
    }

    /// Take an integer root.
    pub fn root(self, power: i32) -> Unit {
        if power == 0 {
            return Unit::ONE;
        }
        if self.multiplier < 0.0 && power % 2 == 0 {
            return Unit::ERROR;
        }
        let base = self.base.root(power);
        if base == BaseUnit::ERROR {
            return Unit::ERROR;
        }
        Unit::new(self.multiplier.powf(1.0 / power as f32), base)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && compare_round_equals(self.multiplier, other.multiplier)
    }
}

/// A precise unit: an `f64` multiplier, a dimensional base, and an
/// optional commodity code.
#[derive(Copy, Clone, Debug)]
pub struct PreciseUnit {
    multiplier: f64,
    base: BaseUnit,
    commodity: u32,
}

impl PreciseUnit {
    /// Construct directly from a multiplier, base and commodity code
    /// (`0`/[`commodity::NONE`] for "no commodity").
    pub const fn new(multiplier: f64, base: BaseUnit, commodity: u32) -> Self {
        Self {
            multiplier,
            base,
            commodity,
        }
    }

    /// The dimensionless unit `1`, no commodity.
    pub const ONE: PreciseUnit = PreciseUnit::new(1.0, BaseUnit::DIMENSIONLESS, commodity::NONE);

    /// Sentinel for "failed to parse".
    pub const INVALID: PreciseUnit =
        PreciseUnit::new(f64::NAN, BaseUnit::DIMENSIONLESS, commodity::NONE);

    /// Sentinel for "algebra overflowed".
    pub const ERROR: PreciseUnit = PreciseUnit::new(1.0, BaseUnit::ERROR, commodity::NONE);

    /// This unit's multiplier.
    pub const fn multiplier(self) -> f64 {
        self.multiplier
    }

    /// This unit's dimensional base.
    pub const fn base_unit(self) -> BaseUnit {
        self.base
    }

    /// This unit's commodity code, or [`commodity::NONE`].
    pub const fn commodity(self) -> u32 {
        self.commodity
    }

    /// True if the multiplier is NaN.
    pub fn is_invalid(self) -> bool {
        self.multiplier.is_nan()
    }

    /// True if the base tuple is the all-saturated error tuple.
    pub fn is_error(self) -> bool {
        self.base == BaseUnit::ERROR
    }

    /// Multiplier equal to `1`, base empty with no e-flag, no
    /// commodity.
    pub fn is_default(self) -> bool {
        self.base.is_empty()
            && !self.base.has_e_flag()
            && self.multiplier == 1.0
            && self.commodity == commodity::NONE
    }

    /// Round this unit's multiplier to tolerance.
    pub fn round(self) -> PreciseUnit {
        PreciseUnit::new(cround_precise(self.multiplier), self.base, self.commodity)
    }

    /// Demote to a fast [`Unit`], dropping the commodity code and
    /// narrowing the multiplier to `f32`.
    pub fn to_fast(self) -> Unit {
        Unit::new(self.multiplier as f32, self.base)
    }

    /// Return a copy with a different commodity code attached,
    /// discarding whatever commodity (if any) this unit already had.
    pub fn with_commodity(self, commodity: u32) -> PreciseUnit {
        PreciseUnit::new(self.multiplier, self.base, commodity)
    }
}

impl std::ops::Mul for PreciseUnit {
    type Output = PreciseUnit;
    fn mul(self, rhs: PreciseUnit) -> PreciseUnit {
        if self.base.mul_would_overflow(rhs.base) {
            return PreciseUnit::ERROR;
        }
        PreciseUnit::new(
            self.multiplier * rhs.multiplier,
            self.base.mul(rhs.base),
            commodity::multiply(self.commodity, rhs.commodity),
        )
    }
}

impl std::ops::Div for PreciseUnit {
    type Output = PreciseUnit;
    fn div(self, rhs: PreciseUnit) -> PreciseUnit {
        if self.base.div_would_overflow(rhs.base) {
            return PreciseUnit::ERROR;
        }
        PreciseUnit::new(
            self.multiplier / rhs.multiplier,
            self.base.div(rhs.base),
            commodity::divide(self.commodity, rhs.commodity),
        )
    }
}

impl PreciseUnit {
    /// Multiplicative inverse; inverts the commodity code as well (see
    /// `commodity.rs`).
    pub fn inv(self) -> PreciseUnit {
        PreciseUnit::new(1.0 / self.multiplier, self.base.inv(), commodity::invert(self.commodity))
    }

    /// Raise to an integer power. The commodity code is left
    /// unchanged: squaring a quantity of a commodity still measures
    /// that commodity.
    pub fn pow(self, power: i32) -> PreciseUnit {
        if self.base.pow_would_overflow(power) {
            return PreciseUnit::ERROR;
        }
        PreciseUnit::new(self.multiplier.powi(power), self.base.pow(power), self.commodity)
    }

    /// Take an integer root.
    pub fn root(self, power: i32) -> PreciseUnit {
        if power == 0 {
            return PreciseUnit::ONE;
        }
        if self.multiplier < 0.0 && power % 2 == 0 {
            return PreciseUnit::INVALID;
        }
        let base = self.base.root(power);
        if base == BaseUnit::ERROR {
            return PreciseUnit::ERROR;
        }
        PreciseUnit::new(self.multiplier.powf(1.0 / power as f64), base, self.commodity)
    }
}

impl PartialEq for PreciseUnit {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.commodity == other.commodity
            && compare_round_equals_precise(self.multiplier, other.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_then_divide_is_identity() {
        let meter = Unit::new(1.0, BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        let second = Unit::new(1.0, BaseUnit::new(0, 1, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        let speed = meter / second;
        assert_eq!((speed * second).base_unit(), meter.base_unit());
    }

    #[test]
    fn inv_twice_is_identity() {
        let u = Unit::new(2.0, BaseUnit::new(1, -2, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        let back = u.inv().inv();
        assert_eq!(back.base_unit(), u.base_unit());
        assert!(compare_round_equals(back.multiplier(), u.multiplier()));
    }

    #[test]
    fn equality_tolerates_multiplier_noise() {
        let base = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let a = Unit::new(1.0, base);
        let b = Unit::new(1.0 + 1e-8, base);
        assert_eq!(a, b);
    }

    #[test]
    fn precise_commodity_cancels_on_self_division() {
        let reg = crate::commodity::CommodityRegistry::new();
        let milk = reg.add("milk");
        let gallon_milk = PreciseUnit::new(3.785_411_784, BaseUnit::DIMENSIONLESS, milk);
        let ratio = gallon_milk / gallon_milk;
        assert_eq!(ratio.commodity(), commodity::NONE);
    }

    #[test]
    fn root_of_zero_power_is_dimensionless_one() {
        let m = Unit::new(2.0, BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        assert_eq!(m.root(0), Unit::ONE);

        let pm = PreciseUnit::new(2.0, m.base_unit(), commodity::NONE);
        assert_eq!(pm.root(0), PreciseUnit::ONE);
    }

    #[test]
    fn even_root_of_negative_multiplier_is_an_error() {
        let neg = Unit::new(-4.0, BaseUnit::new(2, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        assert!(neg.root(2).is_error());
        // odd roots of negative multipliers are fine
        assert!(!neg.root(3).is_error());

        let neg_precise =
            PreciseUnit::new(-4.0, BaseUnit::new(2, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false), commodity::NONE);
        assert!(neg_precise.root(2).is_invalid());
        assert!(!neg_precise.root(3).is_invalid());
    }

    #[test]
    fn multiply_overflowing_exponent_field_yields_error_sentinel() {
        let m7 = Unit::new(1.0, BaseUnit::new(7, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        let m = Unit::new(1.0, BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
        assert!((m7 * m).is_error());
        assert!(!(m7 * Unit::ONE).is_error());
    }

    #[test]
    fn invalid_and_error_sentinels_are_distinguishable() {
        assert!(Unit::INVALID.is_invalid());
        assert!(!Unit::INVALID.is_error());
        assert!(Unit::ERROR.is_error());
        assert!(!Unit::ERROR.is_invalid());
    }
}
