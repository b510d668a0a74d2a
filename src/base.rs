//! Packed signed-exponent base-dimension tuple.
//!
//! `BaseUnit` is the 32-bit packed record described in the crate-level
//! documentation: ten signed dimensional exponents plus four boolean
//! flags, all crammed into a single `u32` so that a [`crate::unit::Unit`]
//! fits in a `u64` and a [`crate::unit::PreciseUnit`] stays small.

use std::fmt;

/// Number of bits allotted to each field, in declaration order.
///
/// Mirrors the reference implementation's `detail::bitwidth` namespace:
/// meter and second get 4 bits (range -8..7), kilogram/ampere/kelvin/
/// radian get 3 bits (range -4..3), candela/mole/currency/count get 2
/// bits (range -2..1), and the four flags get 1 bit each.
pub mod bitwidth {
    pub const METER: u32 = 4;
    pub const SECOND: u32 = 4;
    pub const KILOGRAM: u32 = 3;
    pub const AMPERE: u32 = 3;
    pub const CANDELA: u32 = 2;
    pub const KELVIN: u32 = 3;
    pub const MOLE: u32 = 2;
    pub const RADIAN: u32 = 3;
    pub const CURRENCY: u32 = 2;
    pub const COUNT: u32 = 2;
}

const fn max_neg(bits: u32) -> i32 {
    -(1i32 << (bits - 1))
}

const fn field_mask(bits: u32) -> u32 {
    (1u32 << bits) - 1
}

/// Bit offsets for each field within the packed `u32`, in the order
/// meter, second, kilogram, ampere, candela, kelvin, mole, radian,
/// currency, count, per_unit, i_flag, e_flag, equation.
mod off {
    pub const METER: u32 = 0;
    pub const SECOND: u32 = 4;
    pub const KILOGRAM: u32 = 8;
    pub const AMPERE: u32 = 11;
    pub const CANDELA: u32 = 14;
    pub const KELVIN: u32 = 16;
    pub const MOLE: u32 = 19;
    pub const RADIAN: u32 = 21;
    pub const CURRENCY: u32 = 24;
    pub const COUNT: u32 = 26;
    pub const PER_UNIT: u32 = 28;
    pub const I_FLAG: u32 = 29;
    pub const E_FLAG: u32 = 30;
    pub const EQUATION: u32 = 31;
}

#[inline]
const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// The ten signed dimensional exponents plus four boolean flags, packed
/// into 32 bits. See spec section 3.1 for the authoritative field table.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct BaseUnit(u32);

impl BaseUnit {
    /// Construct from explicit exponents and flags.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if an exponent does not fit in its field
    /// width; release builds wrap silently (matching C++ bitfield
    /// truncation semantics), so callers that can't guarantee range
    /// should go through [`BaseUnit::checked_new`] instead.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        meter: i32,
        second: i32,
        kilogram: i32,
        ampere: i32,
        candela: i32,
        kelvin: i32,
        mole: i32,
        radian: i32,
        currency: i32,
        count: i32,
        per_unit: bool,
        i_flag: bool,
        e_flag: bool,
        equation: bool,
    ) -> Self {
        let mut bits: u32 = 0;
        bits |= (meter as u32 & field_mask(bitwidth::METER)) << off::METER;
        bits |= (second as u32 & field_mask(bitwidth::SECOND)) << off::SECOND;
        bits |= (kilogram as u32 & field_mask(bitwidth::KILOGRAM)) << off::KILOGRAM;
        bits |= (ampere as u32 & field_mask(bitwidth::AMPERE)) << off::AMPERE;
        bits |= (candela as u32 & field_mask(bitwidth::CANDELA)) << off::CANDELA;
        bits |= (kelvin as u32 & field_mask(bitwidth::KELVIN)) << off::KELVIN;
        bits |= (mole as u32 & field_mask(bitwidth::MOLE)) << off::MOLE;
        bits |= (radian as u32 & field_mask(bitwidth::RADIAN)) << off::RADIAN;
        bits |= (currency as u32 & field_mask(bitwidth::CURRENCY)) << off::CURRENCY;
        bits |= (count as u32 & field_mask(bitwidth::COUNT)) << off::COUNT;
        bits |= (per_unit as u32) << off::PER_UNIT;
        bits |= (i_flag as u32) << off::I_FLAG;
        bits |= (e_flag as u32) << off::E_FLAG;
        bits |= (equation as u32) << off::EQUATION;
        Self(bits)
    }

    /// The canonical error tuple: every exponent saturated at its
    /// signed minimum, every flag set.
    pub const ERROR: BaseUnit = BaseUnit::new(
        max_neg(bitwidth::METER),
        max_neg(bitwidth::SECOND),
        max_neg(bitwidth::KILOGRAM),
        max_neg(bitwidth::AMPERE),
        max_neg(bitwidth::CANDELA),
        max_neg(bitwidth::KELVIN),
        max_neg(bitwidth::MOLE),
        max_neg(bitwidth::RADIAN),
        max_neg(bitwidth::CURRENCY),
        max_neg(bitwidth::COUNT),
        true,
        true,
        true,
        true,
    );

    /// Dimensionless, flagless base (the identity for multiplication).
    pub const DIMENSIONLESS: BaseUnit =
        BaseUnit::new(0, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);

    /// Raw packed representation, mostly useful for hashing and the
    /// randomized round-trip fuzz-style test in spec section 8.
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Reconstruct from a raw packed representation (round-trip
    /// counterpart to [`BaseUnit::to_bits`]).
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    const fn field(self, offset: u32, bits: u32) -> i32 {
        sign_extend((self.0 >> offset) & field_mask(bits), bits)
    }

    /// Meter exponent.
    pub const fn meter(self) -> i32 {
        self.field(off::METER, bitwidth::METER)
    }
    /// Second exponent.
    pub const fn second(self) -> i32 {
        self.field(off::SECOND, bitwidth::SECOND)
    }
    /// Kilogram exponent.
    pub const fn kilogram(self) -> i32 {
        self.field(off::KILOGRAM, bitwidth::KILOGRAM)
    }
    /// Ampere exponent.
    pub const fn ampere(self) -> i32 {
        self.field(off::AMPERE, bitwidth::AMPERE)
    }
    /// Candela exponent.
    pub const fn candela(self) -> i32 {
        self.field(off::CANDELA, bitwidth::CANDELA)
    }
    /// Kelvin exponent.
    pub const fn kelvin(self) -> i32 {
        self.field(off::KELVIN, bitwidth::KELVIN)
    }
    /// Mole exponent.
    pub const fn mole(self) -> i32 {
        self.field(off::MOLE, bitwidth::MOLE)
    }
    /// Radian exponent.
    pub const fn radian(self) -> i32 {
        self.field(off::RADIAN, bitwidth::RADIAN)
    }
    /// Currency exponent.
    pub const fn currency(self) -> i32 {
        self.field(off::CURRENCY, bitwidth::CURRENCY)
    }
    /// Count exponent.
    pub const fn count(self) -> i32 {
        self.field(off::COUNT, bitwidth::COUNT)
    }
    /// Per-unit flag.
    pub const fn is_per_unit(self) -> bool {
        (self.0 >> off::PER_UNIT) & 1 != 0
    }
    /// The "i" flag (used for inverse-log/amplitude equation markers).
    pub const fn has_i_flag(self) -> bool {
        (self.0 >> off::I_FLAG) & 1 != 0
    }
    /// The "e" flag (used for equation/temperature markers).
    pub const fn has_e_flag(self) -> bool {
        (self.0 >> off::E_FLAG) & 1 != 0
    }
    /// Equation flag: set when this base tuple encodes a nonlinear
    /// (logarithmic or otherwise) scale rather than a linear unit.
    pub const fn is_equation(self) -> bool {
        (self.0 >> off::EQUATION) & 1 != 0
    }

    /// True when every exponent and the equation flag are zero (other
    /// flags are ignored, matching the reference `unit_data::empty`).
    pub const fn is_empty(self) -> bool {
        self.meter() == 0
            && self.second() == 0
            && self.kilogram() == 0
            && self.ampere() == 0
            && self.candela() == 0
            && self.kelvin() == 0
            && self.mole() == 0
            && self.radian() == 0
            && self.currency() == 0
            && self.count() == 0
            && !self.is_equation()
    }

    /// Count of distinct base dimensions with a nonzero exponent.
    pub const fn unit_type_count(self) -> i32 {
        (self.meter() != 0) as i32
            + (self.second() != 0) as i32
            + (self.kilogram() != 0) as i32
            + (self.ampere() != 0) as i32
            + (self.candela() != 0) as i32
            + (self.kelvin() != 0) as i32
            + (self.mole() != 0) as i32
            + (self.radian() != 0) as i32
            + (self.currency() != 0) as i32
            + (self.count() != 0) as i32
    }

    /// Sum of the absolute value of every dimensional exponent; used by
    /// the serializer's order-reduction probe (spec section 4.4 step 9).
    pub const fn order(self) -> i32 {
        self.meter().abs()
            + self.second().abs()
            + self.kilogram().abs()
            + self.ampere().abs()
            + self.candela().abs()
            + self.kelvin().abs()
            + self.mole().abs()
            + self.radian().abs()
            + self.currency().abs()
            + self.count().abs()
    }

    /// Equivalence ignoring mole, count, radian and all flags — i.e.
    /// "measures the same physical quantity disregarding counting
    /// units".
    pub const fn equivalent_non_counting(self, other: BaseUnit) -> bool {
        self.meter() == other.meter()
            && self.second() == other.second()
            && self.kilogram() == other.kilogram()
            && self.ampere() == other.ampere()
            && self.candela() == other.candela()
            && self.kelvin() == other.kelvin()
            && self.currency() == other.currency()
    }

    /// Same base: non-counting equivalence plus matching mole, count
    /// and radian (still ignoring the boolean flags).
    pub const fn has_same_base(self, other: BaseUnit) -> bool {
        self.equivalent_non_counting(other)
            && self.mole() == other.mole()
            && self.count() == other.count()
            && self.radian() == other.radian()
    }

    /// Multiply: add exponents, OR the per-unit/equation flags, XOR the
    /// i/e flags (spec section 3.1).
    pub const fn mul(self, other: BaseUnit) -> BaseUnit {
        BaseUnit::new(
            self.meter() + other.meter(),
            self.second() + other.second(),
            self.kilogram() + other.kilogram(),
            self.ampere() + other.ampere(),
            self.candela() + other.candela(),
            self.kelvin() + other.kelvin(),
            self.mole() + other.mole(),
            self.radian() + other.radian(),
            self.currency() + other.currency(),
            self.count() + other.count(),
            self.is_per_unit() || other.is_per_unit(),
            self.has_i_flag() ^ other.has_i_flag(),
            self.has_e_flag() ^ other.has_e_flag(),
            self.is_equation() || other.is_equation(),
        )
    }

    /// Divide: subtract exponents, OR per-unit/equation flags, XOR i/e
    /// flags.
    pub const fn div(self, other: BaseUnit) -> BaseUnit {
        BaseUnit::new(
            self.meter() - other.meter(),
            self.second() - other.second(),
            self.kilogram() - other.kilogram(),
            self.ampere() - other.ampere(),
            self.candela() - other.candela(),
            self.kelvin() - other.kelvin(),
            self.mole() - other.mole(),
            self.radian() - other.radian(),
            self.currency() - other.currency(),
            self.count() - other.count(),
            self.is_per_unit() || other.is_per_unit(),
            self.has_i_flag() ^ other.has_i_flag(),
            self.has_e_flag() ^ other.has_e_flag(),
            self.is_equation() || other.is_equation(),
        )
    }

    /// Invert: negate every exponent, preserve flags.
    pub const fn inv(self) -> BaseUnit {
        BaseUnit::new(
            -self.meter(),
            -self.second(),
            -self.kilogram(),
            -self.ampere(),
            -self.candela(),
            -self.kelvin(),
            -self.mole(),
            -self.radian(),
            -self.currency(),
            -self.count(),
            self.is_per_unit(),
            self.has_i_flag(),
            self.has_e_flag(),
            self.is_equation(),
        )
    }

    /// `(second * power) + rootHertzModifier(power)`, where the
    /// modifier applies the square-root-Hertz exception from spec
    /// section 3.1: when both i and e flags are set, second is nonzero,
    /// and power is even, nine is added or subtracted depending on the
    /// sign of `second`/`power`.
    const fn root_hertz_modifier(self, power: i32) -> i32 {
        if self.second() * power == 0 || !(self.has_i_flag() && self.has_e_flag()) || power % 2 != 0
        {
            0
        } else if self.second() < 0 || power < 0 {
            (power / 2) * 9
        } else {
            (power / 2) * -9
        }
    }

    /// Would multiplying this base by `other` overflow any exponent
    /// field? (spec section 3.1's per-operation `would_overflow`
    /// predicate, applied to `*`.)
    pub const fn mul_would_overflow(self, other: BaseUnit) -> bool {
        !fits(self.meter() + other.meter(), bitwidth::METER)
            || !fits(self.second() + other.second(), bitwidth::SECOND)
            || !fits(self.kilogram() + other.kilogram(), bitwidth::KILOGRAM)
            || !fits(self.ampere() + other.ampere(), bitwidth::AMPERE)
            || !fits(self.candela() + other.candela(), bitwidth::CANDELA)
            || !fits(self.kelvin() + other.kelvin(), bitwidth::KELVIN)
            || !fits(self.mole() + other.mole(), bitwidth::MOLE)
            || !fits(self.radian() + other.radian(), bitwidth::RADIAN)
            || !fits(self.currency() + other.currency(), bitwidth::CURRENCY)
            || !fits(self.count() + other.count(), bitwidth::COUNT)
    }

    /// Would dividing this base by `other` overflow any exponent field?
    pub const fn div_would_overflow(self, other: BaseUnit) -> bool {
        !fits(self.meter() - other.meter(), bitwidth::METER)
            || !fits(self.second() - other.second(), bitwidth::SECOND)
            || !fits(self.kilogram() - other.kilogram(), bitwidth::KILOGRAM)
            || !fits(self.ampere() - other.ampere(), bitwidth::AMPERE)
            || !fits(self.candela() - other.candela(), bitwidth::CANDELA)
            || !fits(self.kelvin() - other.kelvin(), bitwidth::KELVIN)
            || !fits(self.mole() - other.mole(), bitwidth::MOLE)
            || !fits(self.radian() - other.radian(), bitwidth::RADIAN)
            || !fits(self.currency() - other.currency(), bitwidth::CURRENCY)
            || !fits(self.count() - other.count(), bitwidth::COUNT)
    }

    /// Would raising this base to `power` overflow any exponent field?
    pub const fn pow_would_overflow(self, power: i32) -> bool {
        !fits(self.meter() * power, bitwidth::METER)
            || !fits(self.second() * power + self.root_hertz_modifier(power), bitwidth::SECOND)
            || !fits(self.kilogram() * power, bitwidth::KILOGRAM)
            || !fits(self.ampere() * power, bitwidth::AMPERE)
            || !fits(self.candela() * power, bitwidth::CANDELA)
            || !fits(self.kelvin() * power, bitwidth::KELVIN)
            || !fits(self.mole() * power, bitwidth::MOLE)
            || !fits(self.radian() * power, bitwidth::RADIAN)
            || !fits(self.currency() * power, bitwidth::CURRENCY)
            || !fits(self.count() * power, bitwidth::COUNT)
    }

    /// Raise to an integer power. Returns [`BaseUnit::ERROR`] if any
    /// field would overflow; callers that need to distinguish overflow
    /// from a legitimately-error input should check
    /// [`BaseUnit::pow_would_overflow`] first.
    pub const fn pow(self, power: i32) -> BaseUnit {
        if self.pow_would_overflow(power) {
            return BaseUnit::ERROR;
        }
        let even = power % 2 == 0;
        BaseUnit::new(
            self.meter() * power,
            self.second() * power + self.root_hertz_modifier(power),
            self.kilogram() * power,
            self.ampere() * power,
            self.candela() * power,
            self.kelvin() * power,
            self.mole() * power,
            self.radian() * power,
            self.currency() * power,
            self.count() * power,
            self.is_per_unit(),
            if even { false } else { self.has_i_flag() },
            if even { false } else { self.has_e_flag() },
            self.is_equation(),
        )
    }

    /// Only the SI-mechanical subspace admits roots: candela, mole,
    /// currency, count, the equation flag and the e-flag must all be
    /// zero/unset, and every remaining exponent must be divisible by
    /// `power`.
    const fn has_valid_root(self, power: i32) -> bool {
        self.meter() % power == 0
            && self.second() % power == 0
            && self.kilogram() % power == 0
            && self.ampere() % power == 0
            && self.candela() == 0
            && self.kelvin() % power == 0
            && self.mole() == 0
            && self.radian() % power == 0
            && self.currency() == 0
            && self.count() == 0
            && !self.is_equation()
            && !self.has_e_flag()
    }

    /// Integer root. Returns [`BaseUnit::ERROR`] unless
    /// [`BaseUnit::has_valid_root`] holds for `power`.
    pub const fn root(self, power: i32) -> BaseUnit {
        if !self.has_valid_root(power) {
            return BaseUnit::ERROR;
        }
        let even = power % 2 == 0;
        BaseUnit::new(
            self.meter() / power,
            self.second() / power,
            self.kilogram() / power,
            self.ampere() / power,
            0,
            self.kelvin() / power,
            0,
            self.radian() / power,
            0,
            0,
            self.is_per_unit(),
            if even { false } else { self.has_i_flag() },
            if even { false } else { self.has_e_flag() },
            false,
        )
    }

    /// Same tuple with the per-unit flag set.
    pub const fn with_per_unit(self) -> BaseUnit {
        BaseUnit::new(
            self.meter(),
            self.second(),
            self.kilogram(),
            self.ampere(),
            self.candela(),
            self.kelvin(),
            self.mole(),
            self.radian(),
            self.currency(),
            self.count(),
            true,
            self.has_i_flag(),
            self.has_e_flag(),
            self.is_equation(),
        )
    }

    /// Same tuple with every flag cleared.
    pub const fn without_flags(self) -> BaseUnit {
        BaseUnit::new(
            self.meter(),
            self.second(),
            self.kilogram(),
            self.ampere(),
            self.candela(),
            self.kelvin(),
            self.mole(),
            self.radian(),
            self.currency(),
            self.count(),
            false,
            false,
            false,
            false,
        )
    }
}

const fn fits(value: i32, bits: u32) -> bool {
    let max = (1i32 << (bits - 1)) - 1;
    let min = -(1i32 << (bits - 1));
    value >= min && value <= max
}

impl fmt::Debug for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseUnit")
            .field("m", &self.meter())
            .field("s", &self.second())
            .field("kg", &self.kilogram())
            .field("A", &self.ampere())
            .field("cd", &self.candela())
            .field("K", &self.kelvin())
            .field("mol", &self.mole())
            .field("rad", &self.radian())
            .field("$", &self.currency())
            .field("ct", &self.count())
            .field("pu", &self.is_per_unit())
            .field("i", &self.has_i_flag())
            .field("e", &self.has_e_flag())
            .field("eq", &self.is_equation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_field() {
        let u = BaseUnit::new(3, -2, 1, -4, 1, -3, 1, -2, 1, -1, true, false, true, false);
        assert_eq!(u.meter(), 3);
        assert_eq!(u.second(), -2);
        assert_eq!(u.kilogram(), 1);
        assert_eq!(u.ampere(), -4);
        assert_eq!(u.candela(), 1);
        assert_eq!(u.kelvin(), -3);
        assert_eq!(u.mole(), 1);
        assert_eq!(u.radian(), -2);
        assert_eq!(u.currency(), 1);
        assert_eq!(u.count(), -1);
        assert!(u.is_per_unit());
        assert!(!u.has_i_flag());
        assert!(u.has_e_flag());
        assert!(!u.is_equation());
    }

    #[test]
    fn error_tuple_is_canonical() {
        assert_eq!(BaseUnit::ERROR.meter(), -8);
        assert_eq!(BaseUnit::ERROR.second(), -8);
        assert_eq!(BaseUnit::ERROR.kilogram(), -4);
        assert_eq!(BaseUnit::ERROR.ampere(), -4);
        assert_eq!(BaseUnit::ERROR.candela(), -2);
        assert_eq!(BaseUnit::ERROR.kelvin(), -4);
        assert_eq!(BaseUnit::ERROR.mole(), -2);
        assert_eq!(BaseUnit::ERROR.radian(), -4);
        assert_eq!(BaseUnit::ERROR.currency(), -2);
        assert_eq!(BaseUnit::ERROR.count(), -2);
        assert!(BaseUnit::ERROR.is_per_unit());
        assert!(BaseUnit::ERROR.has_i_flag());
        assert!(BaseUnit::ERROR.has_e_flag());
        assert!(BaseUnit::ERROR.is_equation());
    }

    #[test]
    fn multiply_adds_exponents_and_combines_flags() {
        let m = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, true, false, false);
        let s = BaseUnit::new(0, 1, 0, 0, 0, 0, 0, 0, 0, 0, true, true, false, false);
        let ms = m.mul(s);
        assert_eq!(ms.meter(), 1);
        assert_eq!(ms.second(), 1);
        assert!(ms.is_per_unit());
        assert!(!ms.has_i_flag()); // true ^ true = false
    }

    #[test]
    fn invert_negates_and_preserves_flags() {
        let m = BaseUnit::new(1, -2, 0, 0, 0, 0, 0, 0, 0, 0, true, false, true, false);
        let inv = m.inv();
        assert_eq!(inv.meter(), -1);
        assert_eq!(inv.second(), 2);
        assert!(inv.is_per_unit());
        assert!(inv.has_e_flag());
        assert_eq!(inv.inv(), m);
    }

    #[test]
    fn pow_overflow_32bit_layout() {
        let m7 = BaseUnit::new(7, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert!(!m7.pow_would_overflow(1));
        // m^7 * m -> m^8, out of range for a 4-bit signed field (-8..7)
        let one_meter = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert_eq!(m7.mul(one_meter).meter(), 8 - 16); // wraps in the packed repr
        let m4 = BaseUnit::new(4, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert!(m4.pow_would_overflow(2));
        assert_eq!(m4.pow(2), BaseUnit::ERROR);
    }

    #[test]
    fn mul_would_overflow_matches_spec_seed_scenario() {
        let m7 = BaseUnit::new(7, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let one_meter = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert!(m7.mul_would_overflow(one_meter));
        assert!(!m7.mul_would_overflow(BaseUnit::DIMENSIONLESS));
        let m4 = BaseUnit::new(4, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert!(m4.mul_would_overflow(m4));
        assert!(m4.pow_would_overflow(2));
    }

    #[test]
    fn root_requires_divisibility_and_clean_subspace() {
        let m2 = BaseUnit::new(2, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert_eq!(m2.root(2).meter(), 1);
        let m3 = BaseUnit::new(3, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        assert_eq!(m3.root(2), BaseUnit::ERROR);
        let with_mole = BaseUnit::new(2, 0, 0, 0, 0, 0, 2, 0, 0, 0, false, false, false, false);
        assert_eq!(with_mole.root(2), BaseUnit::ERROR);
    }

    #[test]
    fn pow_zero_is_dimensionless() {
        let u = BaseUnit::new(3, -2, 1, 0, 0, 0, 0, 0, 0, 0, false, true, false, false);
        let p0 = u.pow(0);
        assert!(p0.is_empty());
        assert!(!p0.has_i_flag());
    }
}
