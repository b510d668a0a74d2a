//! Logarithmic and other nonlinear "equation units" (spec section 3.2,
//! component I): decibels, nepers, Richter-style magnitude scales, and
//! similar units whose relationship to a linear base is a named
//! function rather than a multiplier.
//!
//! Each scale is assigned a small `eq_type` index, carried on a
//! [`BaseUnit`] with [`BaseUnit::is_equation`] set and
//! [`BaseUnit::has_e_flag`] set (custom units, `custom.rs`, reuse the
//! same equation-flag bit but clear the e-flag, so the two namespaces
//! never collide). [`to_linear`]/[`from_linear`] apply the scale's
//! forward/inverse transform to a raw numeric value. The index values
//! themselves are load-bearing: `EQXUN[n]` in the string grammar names
//! a scale by this exact number (spec section 9), so they are taken
//! directly from the reference table rather than assigned sequentially.
//!
//! The reference implementation gives three of these scales (neper,
//! bel, decibel) an "auto" flavor whose power-vs-amplitude factor
//! depends on whether the composed unit is itself a power quantity.
//! This crate does not track that context and always resolves the auto
//! indices (1, 2, 3) to their amplitude factor; the explicit power
//! variants (11, 12, 15) remain available and exact. See `DESIGN.md`.

use crate::base::BaseUnit;

/// Which nonlinear scale an equation-unit base tuple selects. Variant
/// names follow the reference table; `index()` returns that table's
/// number rather than a sequential position.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum EqType {
    Log10,
    Neper,
    Bel,
    Decibel,
    NegLog10,
    NegLog100,
    NegLog1000,
    NegLog50000,
    Log2,
    Ln,
    DecibelPower,
    BelPower,
    DecibelAmplitude,
    Trit,
    NeperPower,
    SaffirSimpson,
    Beaufort,
    Fujita,
    PrismDiopter,
    MomentMagnitude,
    EnergyMagnitude,
}

const VARIANTS: &[EqType] = &[
    EqType::Log10,
    EqType::Neper,
    EqType::Bel,
    EqType::Decibel,
    EqType::NegLog10,
    EqType::NegLog100,
    EqType::NegLog1000,
    EqType::NegLog50000,
    EqType::Log2,
    EqType::Ln,
    EqType::DecibelPower,
    EqType::BelPower,
    EqType::DecibelAmplitude,
    EqType::Trit,
    EqType::NeperPower,
    EqType::SaffirSimpson,
    EqType::Beaufort,
    EqType::Fujita,
    EqType::PrismDiopter,
    EqType::MomentMagnitude,
    EqType::EnergyMagnitude,
];

impl EqType {
    /// The scale's reference-table index (spec section 4.5), the same
    /// number that appears in an `EQXUN[n]` token.
    const fn index(self) -> i32 {
        match self {
            EqType::Log10 => 0,
            EqType::Neper => 1,
            EqType::Bel => 2,
            EqType::Decibel => 3,
            EqType::NegLog10 => 4,
            EqType::NegLog100 => 5,
            EqType::NegLog1000 => 6,
            EqType::NegLog50000 => 7,
            EqType::Log2 => 8,
            EqType::Ln => 9,
            EqType::DecibelPower => 11,
            EqType::BelPower => 12,
            EqType::DecibelAmplitude => 13,
            EqType::Trit => 14,
            EqType::NeperPower => 15,
            EqType::SaffirSimpson => 22,
            EqType::Beaufort => 23,
            EqType::Fujita => 24,
            EqType::PrismDiopter => 27,
            EqType::MomentMagnitude => 29,
            EqType::EnergyMagnitude => 30,
        }
    }

    pub(crate) const fn from_index(index: i32) -> Option<EqType> {
        Some(match index {
            0 | 10 => EqType::Log10,
            1 => EqType::Neper,
            2 => EqType::Bel,
            3 => EqType::Decibel,
            4 => EqType::NegLog10,
            5 => EqType::NegLog100,
            6 => EqType::NegLog1000,
            7 => EqType::NegLog50000,
            8 => EqType::Log2,
            9 => EqType::Ln,
            11 => EqType::DecibelPower,
            12 => EqType::BelPower,
            13 => EqType::DecibelAmplitude,
            14 => EqType::Trit,
            15 => EqType::NeperPower,
            22 => EqType::SaffirSimpson,
            23 => EqType::Beaufort,
            24 => EqType::Fujita,
            27 => EqType::PrismDiopter,
            29 => EqType::MomentMagnitude,
            30 => EqType::EnergyMagnitude,
            _ => return None,
        })
    }

    /// The [`BaseUnit`] that selects this scale, with radian/currency
    /// carrying the scale index (the two narrow signed fields otherwise
    /// unused by equation units), `e_flag` and `equation` both set.
    pub const fn base_unit(self) -> BaseUnit {
        let idx = self.index();
        BaseUnit::new(
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            idx % 8 - 4,
            idx / 8 - 2,
            0,
            false,
            false,
            true,
            true,
        )
    }
}

/// Recover the [`EqType`] a base tuple selects, if it is an equation
/// unit at all.
pub fn eq_type_of(base: BaseUnit) -> Option<EqType> {
    if !(base.is_equation() && base.has_e_flag()) {
        return None;
    }
    let idx = (base.radian() + 4) + (base.currency() + 2) * 8;
    EqType::from_index(idx)
}

/// Apply the scale's forward transform: the equation unit's stored
/// scale value to the raw linear physical value (e.g. decibels back to
/// a power ratio).
pub fn to_linear(eq: EqType, value: f64) -> f64 {
    match eq {
        EqType::Log10 => 10f64.powf(value),
        EqType::Neper => value.exp(),
        EqType::Bel => 10f64.powf(value / 2.0),
        EqType::Decibel => 10f64.powf(value / 20.0),
        EqType::NegLog10 => 10f64.powf(-value),
        EqType::NegLog100 => 100f64.powf(-value),
        EqType::NegLog1000 => 1000f64.powf(-value),
        EqType::NegLog50000 => 50000f64.powf(-value),
        EqType::Log2 => value.exp2(),
        EqType::Ln => value.exp(),
        EqType::DecibelPower => 10f64.powf(value / 10.0),
        EqType::BelPower => 10f64.powf(value / 2.0),
        EqType::DecibelAmplitude => 10f64.powf(value / 20.0),
        EqType::Trit => 3f64.powf(value),
        EqType::NeperPower => (value / 0.5).exp(),
        EqType::SaffirSimpson => saffir_simpson_to_speed(value),
        EqType::Beaufort => beaufort_to_speed(value),
        EqType::Fujita => 14.1 * (value + 2.0).powf(1.5),
        EqType::PrismDiopter => (value / 100.0).atan(),
        EqType::MomentMagnitude => 10f64.powf((value + 10.7) * 1.5),
        EqType::EnergyMagnitude => 10f64.powf((value + 3.2) * 1.5),
    }
}

/// Apply the scale's inverse transform: a raw linear physical value to
/// the equation unit's stored scale value.
pub fn from_linear(eq: EqType, value: f64) -> f64 {
    match eq {
        EqType::Log10 => value.log10(),
        EqType::Neper => value.ln(),
        EqType::Bel => 2.0 * value.log10(),
        EqType::Decibel => 20.0 * value.log10(),
        EqType::NegLog10 => -value.log10(),
        EqType::NegLog100 => -value.log10() / 2.0,
        EqType::NegLog1000 => -value.log10() / 3.0,
        EqType::NegLog50000 => -value.log10() / 50000f64.log10(),
        EqType::Log2 => value.log2(),
        EqType::Ln => value.ln(),
        EqType::DecibelPower => 10.0 * value.log10(),
        EqType::BelPower => 2.0 * value.log10(),
        EqType::DecibelAmplitude => 20.0 * value.log10(),
        EqType::Trit => value.log(3.0),
        EqType::NeperPower => 0.5 * value.ln(),
        EqType::SaffirSimpson => speed_to_saffir_simpson(value),
        EqType::Beaufort => speed_to_beaufort(value),
        EqType::Fujita => (value / 14.1).powf(2.0 / 3.0) - 2.0,
        EqType::PrismDiopter => 100.0 * value.tan(),
        EqType::MomentMagnitude => (2.0 / 3.0) * value.log10() - 10.7,
        EqType::EnergyMagnitude => (2.0 / 3.0) * value.log10() - 3.2,
    }
}

/// Beaufort force (0..=12) to wind speed in m/s, a quintic polynomial
/// fit (Horner's method, coefficients from the reference implementation).
fn beaufort_to_speed(n: f64) -> f64 {
    let mut out = 0.001_773_961_33;
    out = out.mul_add(n, -0.058_600_713_01);
    out = out.mul_add(n, 0.936_214_520_77);
    out = out.mul_add(n, 0.242_460_970_40);
    out = out.mul_add(n, -0.124_757_595_35);
    out
}

fn speed_to_beaufort(speed_ms: f64) -> f64 {
    let val = speed_ms;
    let mut out = 2.188_828_964_25e-8;
    out = out.mul_add(val, -4.782_363_137_69e-6);
    out = out.mul_add(val, 3.911_218_400_61e-4);
    out = out.mul_add(val, -1.524_273_671_62e-2);
    out = out.mul_add(val, 4.240_895_850_61e-1);
    out = out.mul_add(val, 4.992_416_893_70e-1);
    out
}

/// Saffir-Simpson category (0..=5) to sustained wind speed in m/s, a
/// quartic polynomial fit (Horner's method, reference coefficients).
fn saffir_simpson_to_speed(category: f64) -> f64 {
    let mut out = -0.176_136_363_64;
    out = out.mul_add(category, 2.885_101_010_10);
    out = out.mul_add(category, -14.952_651_515_15);
    out = out.mul_add(category, 47.851_911_976_91);
    out = out.mul_add(category, 38.901_515_151_52);
    out
}

fn speed_to_saffir_simpson(speed_ms: f64) -> f64 {
    let val = speed_ms;
    let mut out = 1.757_485_695_29e-10;
    out = out.mul_add(val, -9.092_043_038_33e-8);
    out = out.mul_add(val, 1.522_744_557_80e-5);
    out = out.mul_add(val, -7.737_879_732_77e-4);
    out = out.mul_add(val, 2.819_786_821_67e-2);
    out = out.mul_add(val, -6.675_634_814_38e-1);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decibel_power_round_trips() {
        let linear = to_linear(EqType::DecibelPower, 20.0);
        assert!((linear - 100.0).abs() < 1e-9);
        let back = from_linear(EqType::DecibelPower, linear);
        assert!((back - 20.0).abs() < 1e-9);
    }

    #[test]
    fn decibel_amplitude_is_twice_power_scale() {
        let power_db = from_linear(EqType::DecibelPower, 4.0);
        let amp_db = from_linear(EqType::DecibelAmplitude, 2.0);
        assert!((power_db - amp_db).abs() < 1e-9);
    }

    #[test]
    fn neper_round_trips() {
        let v = from_linear(EqType::Neper, to_linear(EqType::Neper, 1.5));
        assert!((v - 1.5).abs() < 1e-9);
    }

    #[test]
    fn neg_log10_matches_ph_style_definition() {
        let stored = from_linear(EqType::NegLog10, 1e-7);
        assert!((stored - 7.0).abs() < 1e-9);
        let back = to_linear(EqType::NegLog10, stored);
        assert!((back - 1e-7).abs() < 1e-16);
    }

    #[test]
    fn base_unit_round_trips_every_variant() {
        for &eq in VARIANTS {
            let base = eq.base_unit();
            assert_eq!(eq_type_of(base), Some(eq));
        }
    }

    #[test]
    fn eqxun_index_matches_reference_table_number() {
        assert_eq!(EqType::DecibelPower.index(), 11);
        assert_eq!(EqType::BelPower.index(), 12);
        assert_eq!(EqType::PrismDiopter.index(), 27);
        assert_eq!(EqType::EnergyMagnitude.index(), 30);
    }

    #[test]
    fn moment_magnitude_round_trips() {
        let value = 5.5;
        let back = from_linear(EqType::MomentMagnitude, to_linear(EqType::MomentMagnitude, value));
        assert!((back - value).abs() < 1e-6);
    }

    #[test]
    fn energy_magnitude_round_trips() {
        let value = 4.0;
        let back = from_linear(EqType::EnergyMagnitude, to_linear(EqType::EnergyMagnitude, value));
        assert!((back - value).abs() < 1e-6);
    }

    #[test]
    fn prism_diopter_matches_atan_tan_definition() {
        let linear = to_linear(EqType::PrismDiopter, 50.0);
        assert!((linear - (0.5f64).atan()).abs() < 1e-9);
        let back = from_linear(EqType::PrismDiopter, linear);
        assert!((back - 50.0).abs() < 1e-9);
    }

    #[test]
    fn fujita_round_trips() {
        let f = 3.0;
        let speed = to_linear(EqType::Fujita, f);
        let back = from_linear(EqType::Fujita, speed);
        assert!((back - f).abs() < 1e-6);
    }
}
