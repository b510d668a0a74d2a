//! Scalar value + unit pairs (spec section 3.6, component H).
//!
//! [`Measurement`] (`f32`) and [`PreciseMeasurement`] (`f64`) carry a
//! value alongside a [`crate::unit::Unit`]/[`crate::unit::PreciseUnit`];
//! [`UncertainMeasurement`] adds a scalar uncertainty with RSS
//! propagation through multiplication and division. Arithmetic is a
//! thin projection of unit algebra onto the scalar: `*`/`/` combine
//! units the way [`crate::unit::Unit`] does, while `+`/`-`/`%` require
//! the two operands to share a dimensional base and convert the right
//! operand into the left operand's units first.
//!
//! The reference implementation additionally distinguishes a
//! *fixed-unit* flavor of each type (whose unit can't be reassigned
//! after construction) from the default mutable flavor. Rust's
//! ownership model already gives callers that guarantee for free — a
//! `let m = measurement; // never reassigned` binding has no mutable
//! unit to begin with — so this crate does not duplicate the type
//! family; see `DESIGN.md`.

use std::ops::{Add, Div, Mul, Rem, Sub};

use crate::convert::convert;
use crate::flags::MatchFlags;
use crate::parser::unit_from_string;
use crate::round::{compare_round_equals, compare_round_equals_precise};
use crate::unit::{PreciseUnit, Unit};

/// A single-precision (value, unit) pair.
#[derive(Copy, Clone, Debug)]
pub struct Measurement {
    value: f32,
    unit: Unit,
}

impl Measurement {
    /// Construct directly.
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// The scalar value, in `unit()`'s terms.
    pub const fn value(self) -> f32 {
        self.value
    }

    /// The unit this measurement's value is expressed in.
    pub const fn unit(self) -> Unit {
        self.unit
    }

    /// Re-express this measurement in `target`, converting the value
    /// by `crate::convert::convert` (spec section 4.1). The result is
    /// a NaN value if the bases are not convertible.
    pub fn convert_to(self, target: Unit) -> Measurement {
        let converted = convert(
            f64::from(self.value),
            self.unit.to_precise(),
            target.to_precise(),
        );
        Measurement::new(converted as f32, target)
    }
}

impl Mul for Measurement {
    type Output = Measurement;
    fn mul(self, rhs: Measurement) -> Measurement {
        Measurement::new(self.value * rhs.value, self.unit * rhs.unit)
    }
}

impl Div for Measurement {
    type Output = Measurement;
    fn div(self, rhs: Measurement) -> Measurement {
        Measurement::new(self.value / rhs.value, self.unit / rhs.unit)
    }
}

impl Add for Measurement {
    type Output = Measurement;
    fn add(self, rhs: Measurement) -> Measurement {
        let rhs = rhs.convert_to(self.unit);
        Measurement::new(self.value + rhs.value, self.unit)
    }
}

impl Sub for Measurement {
    type Output = Measurement;
    fn sub(self, rhs: Measurement) -> Measurement {
        let rhs = rhs.convert_to(self.unit);
        Measurement::new(self.value - rhs.value, self.unit)
    }
}

impl Rem for Measurement {
    type Output = Measurement;
    fn rem(self, rhs: Measurement) -> Measurement {
        let rhs = rhs.convert_to(self.unit);
        Measurement::new(self.value % rhs.value, self.unit)
    }
}

impl PartialEq for Measurement {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && compare_round_equals(self.value, other.value)
    }
}

/// A double-precision (value, unit) pair, with an optional commodity
/// carried on the unit.
#[derive(Copy, Clone, Debug)]
pub struct PreciseMeasurement {
    value: f64,
    unit: PreciseUnit,
}

impl PreciseMeasurement {
    /// Construct directly.
    pub const fn new(value: f64, unit: PreciseUnit) -> Self {
        Self { value, unit }
    }

    /// The scalar value, in `unit()`'s terms.
    pub const fn value(self) -> f64 {
        self.value
    }

    /// The unit this measurement's value is expressed in.
    pub const fn unit(self) -> PreciseUnit {
        self.unit
    }

    /// Re-express this measurement in `target`.
    pub fn convert_to(self, target: PreciseUnit) -> PreciseMeasurement {
        let converted = convert(self.value, self.unit, target);
        PreciseMeasurement::new(converted, target)
    }
}

impl Mul for PreciseMeasurement {
    type Output = PreciseMeasurement;
    fn mul(self, rhs: PreciseMeasurement) -> PreciseMeasurement {
        PreciseMeasurement::new(self.value * rhs.value, self.unit * rhs.unit)
    }
}

impl Div for PreciseMeasurement {
    type Output = PreciseMeasurement;
    fn div(self, rhs: PreciseMeasurement) -> PreciseMeasurement {
        PreciseMeasurement::new(self.value / rhs.value, self.unit / rhs.unit)
    }
}

impl Add for PreciseMeasurement {
    type Output = PreciseMeasurement;
    fn add(self, rhs: PreciseMeasurement) -> PreciseMeasurement {
        let rhs = rhs.convert_to(self.unit);
        PreciseMeasurement::new(self.value + rhs.value, self.unit)
    }
}

impl Sub for PreciseMeasurement {
    type Output = PreciseMeasurement;
    fn sub(self, rhs: PreciseMeasurement) -> PreciseMeasurement {
        let rhs = rhs.convert_to(self.unit);
        PreciseMeasurement::new(self.value - rhs.value, self.unit)
    }
}

impl Rem for PreciseMeasurement {
    type Output = PreciseMeasurement;
    fn rem(self, rhs: PreciseMeasurement) -> PreciseMeasurement {
        let rhs = rhs.convert_to(self.unit);
        PreciseMeasurement::new(self.value % rhs.value, self.unit)
    }
}

impl PartialEq for PreciseMeasurement {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && compare_round_equals_precise(self.value, other.value)
    }
}

/// A value with a scalar uncertainty and a unit. `×`/`÷` propagate
/// uncertainty by root-sum-of-squares of the relative uncertainties;
/// [`UncertainMeasurement::simple_product`]/[`UncertainMeasurement::simple_divide`]
/// instead propagate linearly (spec section 3.6).
#[derive(Copy, Clone, Debug)]
pub struct UncertainMeasurement {
    value: f64,
    uncertainty: f64,
    unit: PreciseUnit,
}

impl UncertainMeasurement {
    /// Construct directly from a value, an absolute uncertainty, and a
    /// unit.
    pub const fn new(value: f64, uncertainty: f64, unit: PreciseUnit) -> Self {
        Self { value, uncertainty, unit }
    }

    /// The central value.
    pub const fn value(self) -> f64 {
        self.value
    }

    /// The absolute uncertainty, in the same unit as `value()`.
    pub const fn uncertainty(self) -> f64 {
        self.uncertainty
    }

    /// The unit both `value()` and `uncertainty()` are expressed in.
    pub const fn unit(self) -> PreciseUnit {
        self.unit
    }

    /// `uncertainty() / value().abs()`, or `0.0` for an exact zero
    /// value.
    pub fn relative_uncertainty(self) -> f64 {
        if self.value == 0.0 {
            0.0
        } else {
            self.uncertainty / self.value.abs()
        }
    }

    /// Re-express in `target`, scaling both the value and the
    /// uncertainty by the same conversion ratio.
    pub fn convert_to(self, target: PreciseUnit) -> UncertainMeasurement {
        let value = convert(self.value, self.unit, target);
        let ratio = if self.value == 0.0 { 0.0 } else { value / self.value };
        UncertainMeasurement::new(value, self.uncertainty * ratio.abs(), target)
    }

    /// Multiply, propagating uncertainty linearly rather than by RSS:
    /// `result.relative_uncertainty() == self.rel + rhs.rel`.
    pub fn simple_product(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let value = self.value * rhs.value;
        let rel = self.relative_uncertainty() + rhs.relative_uncertainty();
        UncertainMeasurement::new(value, value.abs() * rel, self.unit * rhs.unit)
    }

    /// Divide, propagating uncertainty linearly.
    pub fn simple_divide(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let value = self.value / rhs.value;
        let rel = self.relative_uncertainty() + rhs.relative_uncertainty();
        UncertainMeasurement::new(value, value.abs() * rel, self.unit / rhs.unit)
    }
}

impl Mul for UncertainMeasurement {
    type Output = UncertainMeasurement;
    fn mul(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let value = self.value * rhs.value;
        let rel = self.relative_uncertainty().hypot(rhs.relative_uncertainty());
        UncertainMeasurement::new(value, value.abs() * rel, self.unit * rhs.unit)
    }
}

impl Div for UncertainMeasurement {
    type Output = UncertainMeasurement;
    fn div(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let value = self.value / rhs.value;
        let rel = self.relative_uncertainty().hypot(rhs.relative_uncertainty());
        UncertainMeasurement::new(value, value.abs() * rel, self.unit / rhs.unit)
    }
}

impl Add for UncertainMeasurement {
    type Output = UncertainMeasurement;
    fn add(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let rhs = rhs.convert_to(self.unit);
        UncertainMeasurement::new(
            self.value + rhs.value,
            self.uncertainty.hypot(rhs.uncertainty),
            self.unit,
        )
    }
}

impl Sub for UncertainMeasurement {
    type Output = UncertainMeasurement;
    fn sub(self, rhs: UncertainMeasurement) -> UncertainMeasurement {
        let rhs = rhs.convert_to(self.unit);
        UncertainMeasurement::new(
            self.value - rhs.value,
            self.uncertainty.hypot(rhs.uncertainty),
            self.unit,
        )
    }
}

/// Known uncertainty-notation markers (spec section 6.2), longest
/// first so e.g. `+/-` isn't partially matched as a bare `+`.
const UNCERTAINTY_MARKERS: &[&str] =
    &["&plusmn;", "&#xB1;", "<u>+</u>", "+/-", " \\pm ", "&pm;", "+-", "\u{00b1}"];

const MARKER_SENTINEL: &str = "\u{1}\u{1}\u{1}";

fn normalize_uncertainty_marker(text: &str) -> String {
    for marker in UNCERTAINTY_MARKERS {
        if let Some(idx) = text.find(marker) {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..idx]);
            out.push_str(MARKER_SENTINEL);
            out.push_str(&text[idx + marker.len()..]);
            return out;
        }
    }
    text.to_owned()
}

/// A parsed leading numeric literal: its value, an optional concise
/// trailing uncertainty, and the unparsed remainder of the string.
struct LeadingNumber<'a> {
    value: f64,
    uncertainty: f64,
    rest: &'a str,
}

/// Consume a leading numeric literal from `s`: an optional sign, a
/// decimal mantissa, an optional parenthesized concise uncertainty
/// (`(UU)`, spec section 6.2), and an optional exponent written either
/// as `e±N`/`E±N` or the concise form's `x10^±N`.
fn consume_number(s: &str) -> Option<LeadingNumber<'_>> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mantissa_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut decimal_places = 0usize;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        decimal_places = i - frac_start;
    }
    if i == mantissa_start {
        return None;
    }
    let mantissa: f64 = s[..i].parse().ok()?;

    let mut uncertainty_digits: Option<&str> = None;
    if i < bytes.len() && bytes[i] == b'(' {
        let close = s[i..].find(')').map(|p| p + i)?;
        let digits = &s[i + 1..close];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            uncertainty_digits = Some(digits);
            i = close + 1;
        }
    }

    let mut exponent: i32 = 0;
    if let Some(rest) = s[i..].strip_prefix("x10^").or_else(|| s[i..].strip_prefix("X10^")) {
        let exp_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'+' || *b == b'-')
            .count();
        if exp_len > 0 {
            exponent = rest[..exp_len].parse().ok()?;
            i += 4 + exp_len;
        }
    } else if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let rest = &s[i + 1..];
        let exp_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'+' || *b == b'-')
            .count();
        if exp_len > 0 {
            exponent = rest[..exp_len].parse().ok()?;
            i += 1 + exp_len;
        }
    }

    let scale = 10f64.powi(exponent);
    let value = mantissa * scale;
    let uncertainty = match uncertainty_digits {
        Some(digits) => {
            let digits_value: f64 = digits.parse().ok()?;
            digits_value * 10f64.powi(-(decimal_places as i32)) * scale
        }
        None => 0.0,
    };

    Some(LeadingNumber { value, uncertainty, rest: &s[i..] })
}

/// Parse a `"<number>[ ]<unit>"` literal into a [`PreciseMeasurement`]
/// (spec section 6.1's `measurement_from_string`). A bare unit (no
/// leading number) is given a value of `1`.
pub fn measurement_from_string(text: &str, flags: MatchFlags) -> PreciseMeasurement {
    let text = text.trim();
    match consume_number(text) {
        Some(LeadingNumber { value, rest, .. }) => {
            let unit = unit_from_string(rest.trim_start(), flags);
            PreciseMeasurement::new(value, unit)
        }
        None => {
            let unit = unit_from_string(text, flags);
            PreciseMeasurement::new(1.0, unit)
        }
    }
}

/// Parse a `"<number> <uncertainty-marker> <number> <unit>"` or
/// concise `"X.XXX(UU)x10^N <unit>"` literal into an
/// [`UncertainMeasurement`] (spec section 6.1's
/// `uncertain_measurement_from_string`).
pub fn uncertain_measurement_from_string(text: &str, flags: MatchFlags) -> UncertainMeasurement {
    let normalized = normalize_uncertainty_marker(text.trim());
    let normalized = normalized.trim();

    if let Some(marker_idx) = normalized.find(MARKER_SENTINEL) {
        let value_part = normalized[..marker_idx].trim();
        let rest = normalized[marker_idx + MARKER_SENTINEL.len()..].trim_start();
        let Some(LeadingNumber { value, .. }) = consume_number(value_part) else {
            return UncertainMeasurement::new(f64::NAN, f64::NAN, PreciseUnit::INVALID);
        };
        let Some(LeadingNumber { value: uncertainty, rest: unit_text, .. }) = consume_number(rest)
        else {
            return UncertainMeasurement::new(f64::NAN, f64::NAN, PreciseUnit::INVALID);
        };
        let unit = unit_from_string(unit_text.trim_start(), flags);
        return UncertainMeasurement::new(value, uncertainty, unit);
    }

    match consume_number(normalized) {
        Some(LeadingNumber { value, uncertainty, rest }) => {
            let unit = unit_from_string(rest.trim_start(), flags);
            UncertainMeasurement::new(value, uncertainty, unit)
        }
        None => {
            let unit = unit_from_string(normalized, flags);
            UncertainMeasurement::new(1.0, 0.0, unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseUnit;

    #[test]
    fn measurement_from_string_parses_value_and_unit() {
        let m = measurement_from_string("10.7 meters per second", MatchFlags::DEFAULT);
        assert!((m.value() - 10.7).abs() < 1e-9);
        assert!(!m.unit().is_invalid());
    }

    #[test]
    fn bare_unit_defaults_value_to_one() {
        let m = measurement_from_string("kg", MatchFlags::DEFAULT);
        assert_eq!(m.value(), 1.0);
    }

    #[test]
    fn concise_uncertainty_notation_splits_value_and_error() {
        let u = uncertain_measurement_from_string("4.56323(45)x10^-12 kg", MatchFlags::DEFAULT);
        assert!((u.value() - 4.56323e-12).abs() < 1e-18);
        assert!((u.uncertainty() - 4.5e-16).abs() < 1e-19);
    }

    #[test]
    fn plus_minus_marker_is_recognized() {
        let u = uncertain_measurement_from_string("5.0 +/- 0.1 m", MatchFlags::DEFAULT);
        assert!((u.value() - 5.0).abs() < 1e-9);
        assert!((u.uncertainty() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn unicode_plus_minus_symbol_is_recognized() {
        let u = uncertain_measurement_from_string("5.0 \u{00b1} 0.1 m", MatchFlags::DEFAULT);
        assert!((u.uncertainty() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn addition_converts_right_operand_into_left_units() {
        let cm = BaseUnit::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let a = Measurement::new(1.0, Unit::new(1.0, cm));
        let b = Measurement::new(100.0, Unit::new(0.01, cm));
        let sum = a + b;
        assert!((sum.value() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn uncertain_product_propagates_by_rss() {
        let cm = BaseUnit::DIMENSIONLESS;
        let a = UncertainMeasurement::new(2.0, 0.2, PreciseUnit::new(1.0, cm, 0));
        let b = UncertainMeasurement::new(3.0, 0.3, PreciseUnit::new(1.0, cm, 0));
        let product = a * b;
        assert!((product.value() - 6.0).abs() < 1e-9);
        let expected_rel = (0.1f64).hypot(0.1);
        assert!((product.relative_uncertainty() - expected_rel).abs() < 1e-9);
    }

    #[test]
    fn simple_product_propagates_linearly() {
        let cm = BaseUnit::DIMENSIONLESS;
        let a = UncertainMeasurement::new(2.0, 0.2, PreciseUnit::new(1.0, cm, 0));
        let b = UncertainMeasurement::new(3.0, 0.3, PreciseUnit::new(1.0, cm, 0));
        let product = a.simple_product(b);
        assert!((product.relative_uncertainty() - 0.2).abs() < 1e-9);
    }
}
