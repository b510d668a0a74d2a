//! Scalar conversion between units (spec section 4.1/4.2).
//!
//! [`convert`] is the three-argument form; [`convert_pu`] is the
//! four-argument power-system form that additionally takes a base
//! power and base voltage for per-unit conversions whose base can't be
//! inferred from a hard-coded assumption (60 Hz, 100 MVA, 341.25 m/s
//! for mach). Both return `f64::NAN` on an unrelatable pair of units,
//! matching spec section 7's "invalid conversion surfaces as NaN".

use crate::base::BaseUnit;
use crate::equation;
use crate::unit::PreciseUnit;

const AVOGADRO: f64 = 6.022_140_76e23;
const PI: f64 = std::f64::consts::PI;

fn degf() -> PreciseUnit {
    // 1 degF in Kelvin, e-flagged to mark the temperature scale.
    PreciseUnit::new(5.0 / 9.0, kelvin_eflag(), crate::commodity::NONE)
}

fn kelvin_eflag() -> BaseUnit {
    BaseUnit::new(0, 0, 0, 0, 0, 1, 0, 0, 0, 0, false, false, true, false)
}

fn is_temperature(u: PreciseUnit) -> bool {
    u.base_unit().kelvin() != 0 && u.base_unit().has_e_flag() && !u.base_unit().is_equation()
}

fn is_fahrenheit(u: PreciseUnit) -> bool {
    is_temperature(u) && crate::round::compare_round_equals_precise(u.multiplier(), degf().multiplier())
}

/// Assumed base for the generic per-unit unit (`pu`): bare dimensionless
/// with the per-unit flag set.
fn generic_pu() -> BaseUnit {
    BaseUnit::DIMENSIONLESS.with_per_unit()
}

/// Convert `value` from `from` to `to`. Returns `NaN` when the two
/// units cannot be related (spec section 7, mode 3).
pub fn convert(value: f64, from: PreciseUnit, to: PreciseUnit) -> f64 {
    if from == to || from.is_default() || to.is_default() {
        return value;
    }

    // Temperature branch (spec section 4.1 step 2).
    if is_temperature(from) || is_temperature(to) {
        return convert_temperature(value, from, to);
    }

    // Equation branch (spec section 4.1 step 3).
    if from.base_unit().is_equation() || to.base_unit().is_equation() {
        if !from.base_unit().equivalent_non_counting(to.base_unit()) {
            return f64::NAN;
        }
        let (Some(from_eq), Some(to_eq)) =
            (equation::eq_type_of(from.base_unit()), equation::eq_type_of(to.base_unit()))
        else {
            return f64::NAN;
        };
        let linear = equation::to_linear(from_eq, value) * from.multiplier() / to.multiplier();
        return equation::from_linear(to_eq, linear);
    }

    // Identical base (spec section 4.1 step 4).
    if from.base_unit() == to.base_unit() {
        return value * from.multiplier() / to.multiplier();
    }

    // Per-unit branch, no external base available (spec section 4.1 step 5).
    if from.base_unit().is_per_unit() && to.base_unit().is_per_unit() {
        if from.base_unit() == generic_pu() || to.base_unit() == generic_pu() {
            return value;
        }
        return f64::NAN;
    }
    if from.base_unit().is_per_unit() != to.base_unit().is_per_unit() {
        // Mixed per-unit/absolute with no base supplied: only the
        // hard-coded assumed bases (60 Hz, 100 MVA, mach) are safe;
        // anything else is an invalid conversion per spec section 9's
        // documented open question.
        return convert_pu_assumed(value, from, to);
    }

    convert_same_kind(value, from, to)
}

/// Everything that doesn't need a base value: same non-per-unit base
/// handling, counting reconciliation, and reciprocal base (spec
/// section 4.1 steps 4, 6, 7).
fn convert_same_kind(value: f64, from: PreciseUnit, to: PreciseUnit) -> f64 {
    let (bf, bt) = (from.base_unit(), to.base_unit());

    if bf.has_same_base(bt) {
        return value * from.multiplier() / to.multiplier();
    }

    // Counting reconciliation (spec section 4.1 step 6): radian <-> count
    // via powers of 2*pi, mole <-> count via powers of Avogadro's number.
    if bf.equivalent_non_counting(bt) {
        let (r1, r2) = (bf.radian(), bt.radian());
        let (c1, c2) = (bf.count(), bt.count());
        let (m1, m2) = (bf.mole(), bt.mole());

        if m1 == m2 && r1 == r2 && (c1 == 0 || c2 == 0) {
            return value * from.multiplier() / to.multiplier();
        }

        if m1 == m2 && ((r1 == 0 && (c1 == r1 || c1 == 0)) || (r2 == 0 && (c2 == r1 || c2 == 0))) {
            const MUX: [f64; 5] =
                [1.0 / (4.0 * PI * PI), 1.0 / (2.0 * PI), 0.0, 2.0 * PI, 4.0 * PI * PI];
            let idx = r2 - r1 + 2;
            if !(0..=4).contains(&idx) {
                return f64::NAN;
            }
            return value * MUX[idx as usize] * from.multiplier() / to.multiplier();
        }

        if r1 == r2 && ((m1 == 0 && (c1 == m1 || c1 == 0)) || (m2 == 0 && (c2 == m1 || c2 == 0))) {
            const MUXMOL: [f64; 3] = [AVOGADRO, 0.0, 1.0 / AVOGADRO];
            let idx = m2 - m1 + 1;
            if !(0..=2).contains(&idx) {
                return f64::NAN;
            }
            return value * MUXMOL[idx as usize] * from.multiplier() / to.multiplier();
        }
    }

    // Reciprocal base (spec section 4.1 step 7).
    if bf.has_same_base(bt.inv()) {
        return to.multiplier() / (value * from.multiplier());
    }

    f64::NAN
}

/// Temperature path: every temperature-flagged unit routes through
/// Kelvin with a `+273.15`/`-273.15` offset; Fahrenheit additionally
/// gets the `-32, *5/9` (input) or `*9/5, +32` (output) affine step
/// before/after that offset. Celsius needs no extra scaling since its
/// multiplier is already `1.0` relative to Kelvin.
fn convert_temperature(value: f64, from: PreciseUnit, to: PreciseUnit) -> f64 {
    let mut kelvin = if is_temperature(from) {
        let scaled = if is_fahrenheit(from) {
            (value - 32.0) * 5.0 / 9.0
        } else if from.multiplier() != 1.0 {
            value * from.multiplier()
        } else {
            value
        };
        scaled + 273.15
    } else {
        value * from.multiplier()
    };

    if is_temperature(to) {
        kelvin -= 273.15;
        if is_fahrenheit(to) {
            return kelvin * 9.0 / 5.0 + 32.0;
        }
        if to.multiplier() != 1.0 {
            return kelvin / to.multiplier();
        }
        return kelvin;
    }
    kelvin / to.multiplier()
}

/// Mixed per-unit/absolute conversion with no caller-supplied base:
/// only succeeds for the hard-coded assumed bases spec section 4.2
/// names (60 Hz for `puHz`, 100 MVA for `puMW`, 341.25 m/s for mach).
fn convert_pu_assumed(value: f64, from: PreciseUnit, to: PreciseUnit) -> f64 {
    use crate::unit::Unit;

    let hertz = BaseUnit::new(0, -1, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let pu_hz = PreciseUnit::new(1.0, hertz.with_per_unit(), crate::commodity::NONE).to_fast();
    let mw = BaseUnit::new(2, -3, 1, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let pu_mw = PreciseUnit::new(1e6, mw.with_per_unit(), crate::commodity::NONE).to_fast();
    let mach = BaseUnit::new(1, -1, 0, 0, 0, 0, 0, 0, 0, 0, true, false, false, false);
    let mach_unit = Unit::new(1.0, mach);

    let matches = |u: PreciseUnit, seed: Unit| u.to_fast() == seed;

    if matches(from, pu_hz) || matches(to, pu_hz) {
        return convert_pu(value, from, to, 60.0, 1.0);
    }
    if matches(from, pu_mw) || matches(to, pu_mw) {
        return convert_pu(value, from, to, 100.0, 1.0);
    }
    if matches(from, mach_unit) || matches(to, mach_unit) {
        return convert_pu(value, from, to, 341.25, 1.0);
    }
    f64::NAN
}

/// Derive a base value for `base`'s dimensional kind from a base power
/// and base voltage, per the standard electrical relations
/// `P`, `V`, `I = P/V`, `R = V^2/P`, `G = P/V^2` (spec section 4.2,
/// "generate_base").
fn generate_base(base: BaseUnit, base_power: f64, base_voltage: f64) -> f64 {
    let watt = BaseUnit::new(2, -3, 1, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let volt = BaseUnit::new(2, -3, 1, -1, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let ampere = BaseUnit::new(0, 0, 0, 1, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let ohm = BaseUnit::new(2, -3, 1, -2, 0, 0, 0, 0, 0, 0, false, false, false, false);
    let siemens = BaseUnit::new(-2, 3, -1, 2, 0, 0, 0, 0, 0, 0, false, false, false, false);

    if base.has_same_base(watt) {
        return base_power;
    }
    if base.has_same_base(volt) {
        return base_voltage;
    }
    if base.has_same_base(ampere) {
        return base_power / base_voltage;
    }
    if base.has_same_base(ohm) {
        return base_voltage * base_voltage / base_power;
    }
    if base.has_same_base(siemens) {
        return base_power / (base_voltage * base_voltage);
    }
    f64::NAN
}

/// Four-argument conversion for power-system per-unit quantities: a
/// `basePower` and `baseVoltage` resolve the implicit base when one (or
/// both) sides is per-unit and the hard-coded assumed bases don't apply
/// (spec section 4.1 step 9's four-argument overload, section 4.2).
pub fn convert_pu(value: f64, from: PreciseUnit, to: PreciseUnit, base_power: f64, base_voltage: f64) -> f64 {
    if from.is_default() || to.is_default() {
        return value;
    }
    let (bf, bt) = (from.base_unit(), to.base_unit());

    if bf.is_per_unit() == bt.is_per_unit() {
        let base = generate_base(bf, base_power, base_voltage);
        if base.is_nan() {
            if bf.is_per_unit() && from == to {
                return value * base_power / base_voltage;
            }
            if bf.is_per_unit() && bf.has_same_base(bt) {
                return value * base_power * from.multiplier() / base_voltage / to.multiplier();
            }
        }
        return convert(value, from, to);
    }

    if bf.has_same_base(bt) {
        // `generate_base` only knows the electrical P/V/I/R/G relations;
        // a non-electrical per-unit quantity (e.g. mach) has no derivable
        // base, so the caller-supplied `base_power` *is* the base
        // magnitude in that case (this is what `convert_pu_assumed`
        // passes 60/100/341.25 in for).
        let base = generate_base(bt, base_power, base_voltage);
        let base = if base.is_nan() { base_power } else { base };
        let mut v = value;
        if bf.is_per_unit() {
            v *= base;
        }
        v = v * from.multiplier() / to.multiplier();
        if bt.is_per_unit() {
            v /= base;
        }
        return v;
    }

    if bt.is_per_unit() {
        let base = generate_base(bf, base_power, base_voltage);
        let pu_val = value / base;
        if bt == generic_pu() {
            return pu_val * from.multiplier();
        }
        return convert(pu_val, PreciseUnit::new(from.multiplier(), bf.with_per_unit(), from.commodity()), to)
            / to.multiplier();
    }

    let base = generate_base(bt, base_power, base_voltage) * from.multiplier();
    if bf == generic_pu() {
        return value * base;
    }
    convert(value, from, PreciseUnit::new(to.multiplier(), bt.with_per_unit(), to.commodity())) * base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseUnit;

    fn pu_mw() -> PreciseUnit {
        let mw = BaseUnit::new(2, -3, 1, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        PreciseUnit::new(1e6, mw.with_per_unit(), crate::commodity::NONE)
    }

    fn ohm() -> PreciseUnit {
        let base = BaseUnit::new(2, -3, 1, -2, 0, 0, 0, 0, 0, 0, false, false, false, false);
        PreciseUnit::new(1.0, base, crate::commodity::NONE)
    }

    fn kv() -> PreciseUnit {
        let volt = BaseUnit::new(2, -3, 1, -1, 0, 0, 0, 0, 0, 0, false, false, false, false);
        PreciseUnit::new(1000.0, volt, crate::commodity::NONE)
    }

    fn pu_v() -> PreciseUnit {
        let volt = BaseUnit::new(2, -3, 1, -1, 0, 0, 0, 0, 0, 0, false, false, false, false);
        PreciseUnit::new(1.0, volt.with_per_unit(), crate::commodity::NONE)
    }

    #[test]
    fn puMW_to_ohm_seed_scenario() {
        // convert(1, puMW, ohm, basePower=10000, baseVoltage=100) == 1
        let v = convert_pu(1.0, pu_mw(), ohm(), 10_000.0, 100.0);
        assert!((v - 1.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn kv_to_puV_seed_scenario() {
        // convert(136, kV, puV, basePower=500, baseVoltage=138000) ~= 0.9855
        let v = convert_pu(136.0, kv(), pu_v(), 500.0, 138_000.0);
        assert!((v - 0.9855).abs() < 1e-4, "got {v}");
    }

    #[test]
    fn mach_seed_scenario() {
        let mach = BaseUnit::new(1, -1, 0, 0, 0, 0, 0, 0, 0, 0, true, false, false, false);
        let m_per_s = BaseUnit::new(1, -1, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let v = convert(
            1.0,
            PreciseUnit::new(1.0, mach, crate::commodity::NONE),
            PreciseUnit::new(1.0, m_per_s, crate::commodity::NONE),
        );
        assert!((v - 341.25).abs() < 1e-4, "got {v}");
    }

    #[test]
    fn identical_base_scales_by_multiplier_ratio() {
        let meter = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let m = PreciseUnit::new(1.0, meter, crate::commodity::NONE);
        let km = PreciseUnit::new(1000.0, meter, crate::commodity::NONE);
        assert!((convert(5.0, km, m) - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn incompatible_bases_are_nan() {
        let meter = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let second = BaseUnit::new(0, 1, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let m = PreciseUnit::new(1.0, meter, crate::commodity::NONE);
        let s = PreciseUnit::new(1.0, second, crate::commodity::NONE);
        assert!(convert(1.0, m, s).is_nan());
    }

    #[test]
    fn radian_to_count_uses_tau() {
        let radian = BaseUnit::new(0, 0, 0, 0, 0, 0, 0, 1, 0, 0, false, false, false, false);
        let count = BaseUnit::new(0, 0, 0, 0, 0, 0, 0, 0, 0, 1, false, false, false, false);
        let rad = PreciseUnit::new(1.0, radian, crate::commodity::NONE);
        let rev = PreciseUnit::new(1.0, count, crate::commodity::NONE);
        let v = convert(2.0 * PI, rad, rev);
        assert!((v - 1.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn mole_to_count_uses_avogadro() {
        let mole = BaseUnit::new(0, 0, 0, 0, 0, 0, 1, 0, 0, 0, false, false, false, false);
        let count = BaseUnit::new(0, 0, 0, 0, 0, 0, 0, 0, 0, 1, false, false, false, false);
        let mol = PreciseUnit::new(1.0, mole, crate::commodity::NONE);
        let items = PreciseUnit::new(1.0, count, crate::commodity::NONE);
        let v = convert(1.0, mol, items);
        assert!((v - AVOGADRO).abs() / AVOGADRO < 1e-9, "got {v}");
    }

    #[test]
    fn fahrenheit_round_trips_through_plain_kelvin() {
        // Plain "K" (no e-flag) is the absolute-temperature SI base unit;
        // only Celsius/Fahrenheit carry the e-flag that selects the
        // offset path (spec section 3.1, 4.1 step 2).
        let f = degf();
        let plain_k = BaseUnit::new(0, 0, 0, 0, 0, 1, 0, 0, 0, 0, false, false, false, false);
        let k = PreciseUnit::new(1.0, plain_k, crate::commodity::NONE);
        let v = convert(32.0, f, k);
        assert!((v - 273.15).abs() < 1e-6, "got {v}");
        let back = convert(v, k, f);
        assert!((back - 32.0).abs() < 1e-6, "got {back}");
    }

    #[test]
    fn celsius_offsets_by_273_15() {
        let celsius = PreciseUnit::new(1.0, kelvin_eflag(), crate::commodity::NONE);
        let plain_k = BaseUnit::new(0, 0, 0, 0, 0, 1, 0, 0, 0, 0, false, false, false, false);
        let k = PreciseUnit::new(1.0, plain_k, crate::commodity::NONE);
        let v = convert(0.0, celsius, k);
        assert!((v - 273.15).abs() < 1e-9, "got {v}");
        let back = convert(v, k, celsius);
        assert!(back.abs() < 1e-9, "got {back}");
    }
}
