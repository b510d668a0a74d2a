//! Unit-value-to-string serializer (spec section 4.4, component G).
//!
//! [`to_string`] is the reciprocal of [`crate::parser::unit_from_string`]:
//! given a [`PreciseUnit`], it searches for a short rendering that
//! parses back to an equal unit (tolerance equality, spec section 3.3).
//! The search tries progressively more roundabout strategies — an exact
//! dictionary hit, an inverse hit, a root probe, a seed-unit probe —
//! before falling back to the raw `m^a*kg^b*...` expansion that always
//! works but is rarely the shortest string.

use std::fmt::Write as _;

use crate::base::BaseUnit;
use crate::commodity;
use crate::custom;
use crate::dictionary::{self, PROBE_SEEDS};
use crate::equation;
use crate::flags::MatchFlags;
use crate::measurement::PreciseMeasurement;
use crate::prefix;
use crate::unit::{PreciseUnit, Unit};

/// Render `unit` as a string under `flags` (spec section 6.1's
/// `to_string`). The result, reparsed with
/// [`crate::parser::unit_from_string`], is equal to `unit` (spec
/// section 8's round-trip law), possibly only after taking a square or
/// cube root of both sides when the shortest rendering goes through a
/// root probe.
pub fn to_string(unit: PreciseUnit, flags: MatchFlags) -> String {
    let mut out = body(unit, flags);
    append_commodity_suffix(&mut out, unit.commodity());
    out
}

/// Render a measurement as `"<value> <unit>"` (spec section 6.1's
/// `to_string(measurement, flags)` overload), reusing [`to_string`] for
/// the unit portion.
pub fn measurement_to_string(measurement: PreciseMeasurement, flags: MatchFlags) -> String {
    let unit_text = to_string(measurement.unit(), flags);
    if unit_text.is_empty() {
        format_decimal(measurement.value())
    } else {
        format!("{} {unit_text}", format_decimal(measurement.value()))
    }
}

fn body(unit: PreciseUnit, flags: MatchFlags) -> String {
    let m = unit.multiplier();

    // Step 1: multiplier special cases.
    if m.is_nan() {
        return "NaN".to_owned();
    }
    if m.is_infinite() {
        let sign = if m < 0.0 { "-" } else { "" };
        return format!("{sign}INF{}", raw_suffix(unit.base_unit()));
    }
    if m == 0.0 {
        return format!("0{}", raw_suffix(unit.base_unit()));
    }

    // Step 2: direct dictionary hit (overlay first, then built-in).
    let fast = unit.to_fast();
    if let Some(name) = dictionary::global().reverse_lookup_overlay(fast) {
        return name;
    }
    if let Some(name) = dictionary::global().reverse_lookup(fast) {
        return name.to_owned();
    }

    // Step 3: inverse hit.
    let inv = fast.inv();
    if let Some(name) = dictionary::global().reverse_lookup_overlay(inv) {
        return format!("1/{name}");
    }
    if let Some(name) = dictionary::global().reverse_lookup(inv) {
        return format!("1/{name}");
    }

    // Step 4: dimensionless.
    if unit.base_unit().is_empty() {
        return dimensionless(m, unit.base_unit());
    }

    // Step 5: square/cube root probe.
    if let Some(s) = root_probe(fast) {
        return s;
    }

    // Step 6: equation / custom unit tokens.
    if let Some(s) = reserved_pattern_token(unit) {
        return s;
    }

    // Step 8: probe pass against seed units.
    if let Some(s) = probe_pass(fast) {
        return s;
    }

    // Step 9: order reduction via V/W pre-multiplication.
    if let Some(s) = order_reduction(fast) {
        return s;
    }

    // Step 7: raw expansion, the fallback that always terminates.
    raw_expansion(unit, flags)
}

/// The base-unit suffix used after a special-case multiplier literal
/// (step 1): the raw dimensional expansion with an implicit `1`
/// multiplier, or empty for a dimensionless base.
fn raw_suffix(base: BaseUnit) -> String {
    if base.is_empty() {
        return String::new();
    }
    let mut s = raw_dimensional_expansion(base);
    if !s.is_empty() {
        s.insert(0, ' ');
    }
    s
}

const DIMENSIONLESS_PREFIX_TOLERANCE: f64 = 1e-9;

/// Step 4: render a dimensionless multiplier, preferring a known SI
/// prefix name over a bare decimal literal when one matches closely
/// enough, then appending any flag-word suffix spec section 4.4
/// mentions (`pu`, `i`, `e`).
fn dimensionless(m: f64, base: BaseUnit) -> String {
    let mut s = if let Some(prefix) = matching_si_prefix(m) {
        prefix.to_owned()
    } else {
        format_decimal(m)
    };
    if base.is_per_unit() {
        s.push_str("pu");
    }
    if base.has_i_flag() {
        s.push_str("flag");
    }
    s
}

const NAMED_PREFIXES: &[(&str, f64)] = &[
    ("Q", 1e30),
    ("R", 1e27),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("da", 1e1),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
    ("r", 1e-27),
    ("q", 1e-30),
];

fn matching_si_prefix(m: f64) -> Option<&'static str> {
    NAMED_PREFIXES
        .iter()
        .find(|(_, mult)| (m / mult - 1.0).abs() < DIMENSIONLESS_PREFIX_TOLERANCE)
        .map(|(name, _)| *name)
}

fn format_decimal(m: f64) -> String {
    if m.fract() == 0.0 && m.abs() < 1e15 {
        format!("{}", m as i64)
    } else {
        let mut s = format!("{m}");
        if let Some(idx) = s.find('e') {
            // Rust renders `1e-5` already close to the expected `1e-05`
            // form the round-trip tests expect; normalize exponent
            // sign/width to at least two digits to match.
            let (mantissa, exp) = s.split_at(idx);
            let exp = &exp[1..];
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ("-", d),
                None => ("+", exp),
            };
            let digits = if digits.len() < 2 { format!("0{digits}") } else { digits.to_owned() };
            s = format!("{mantissa}e{sign}{digits}");
        }
        s
    }
}

/// Step 5: if `root(unit, 2)` or `root(unit, 3)` resolves in the
/// dictionary, emit `<name>^2` / `<name>^3` with a residual multiplier
/// prefix when the root isn't exact.
fn root_probe(fast: Unit) -> Option<String> {
    for power in [2, 3] {
        let root = fast.root(power);
        if root.base_unit() == BaseUnit::ERROR {
            continue;
        }
        if let Some(name) = dictionary::global().reverse_lookup(root) {
            return Some(format!("{name}^{power}"));
        }
    }
    None
}

/// Step 6: equation units and custom units round-trip through their
/// reserved literal tokens (`EQXUN[n]`, `CXUN[n]`, `CXCUN[n]`); any
/// residual multiplier (relative to the unit scale's implicit `1`) is
/// rendered as a leading factor.
fn reserved_pattern_token(unit: PreciseUnit) -> Option<String> {
    let base = unit.base_unit();
    let residual = |m: f64| if (m - 1.0).abs() < 1e-12 { String::new() } else { format!("{}*", format_decimal(m)) };

    if let Some(eq) = equation::eq_type_of(base) {
        let idx = eq as i32;
        return Some(format!("{}EQXUN[{idx}]", residual(unit.multiplier())));
    }
    if let Some(slot) = custom::custom_unit_number(base) {
        return Some(format!("{}CXUN[{slot}]", residual(unit.multiplier())));
    }
    if let Some(slot) = custom::custom_count_unit_number(base) {
        return Some(format!("{}CXCUN[{slot}]", residual(unit.multiplier())));
    }
    None
}

/// Step 8: try multiplying and dividing `fast` by each probe seed; among
/// results that land on a known dictionary entry (or its inverse),
/// prefer one with no leading numeric multiplier, tie-breaking to the
/// shortest string.
fn probe_pass(fast: Unit) -> Option<String> {
    let mut best: Option<(bool, String)> = None;
    for (seed_name, seed_base, seed_mult) in PROBE_SEEDS {
        let seed = Unit::new(*seed_mult as f32, *seed_base);
        for (candidate, op) in [(fast * seed, '*'), (fast / seed, '/')] {
            let Some(rendered) = probe_candidate(candidate, seed_name, op) else {
                continue;
            };
            let is_clean = !rendered.starts_with(|c: char| c.is_ascii_digit() || c == '-');
            let better = match &best {
                None => true,
                Some((best_clean, best_str)) => match (is_clean, *best_clean) {
                    (true, false) => true,
                    (false, true) => false,
                    _ => rendered.len() < best_str.len(),
                },
            };
            if better {
                best = Some((is_clean, rendered));
            }
        }
    }
    best.map(|(_, s)| s)
}

fn probe_candidate(candidate: Unit, seed_name: &str, op: char) -> Option<String> {
    let dict = dictionary::global();
    if let Some(name) = dict.reverse_lookup(candidate) {
        return Some(format!("{name}{inv_op}{seed_name}", inv_op = inverse_op(op)));
    }
    if let Some(name) = dict.reverse_lookup(candidate.inv()) {
        return Some(format!("1/({name}{inv_op}{seed_name})", inv_op = inverse_op(op)));
    }
    None
}

/// If `fast = candidate OP seed`, recovering `candidate` as `fast
/// (inverse of OP) seed` takes the opposite operator.
fn inverse_op(op: char) -> char {
    if op == '*' {
        '/'
    } else {
        '*'
    }
}

/// Step 9: when the dimension order (sum of absolute exponents) is at
/// least 4, try pre-multiplying by volt or watt (and their inverses)
/// and keep whichever probe result has the lowest resulting order —
/// this catches quantities like `V*A^-1` (ohm) that the plain probe
/// pass, seeded only by `V` and `W` individually, can miss when the
/// target is a compound of both.
fn order_reduction(fast: Unit) -> Option<String> {
    if fast.base_unit().order() < 4 {
        return None;
    }
    let volt = Unit::new(1.0, BaseUnit::new(2, -3, 1, -1, 0, 0, 0, 0, 0, 0, false, false, false, false));
    let watt = Unit::new(1.0, BaseUnit::new(2, -3, 1, 0, 0, 0, 0, 0, 0, 0, false, false, false, false));
    let mut best: Option<(i32, String)> = None;
    for seed in [volt, volt.inv(), watt, watt.inv()] {
        let candidate = fast * seed;
        if let Some(name) = dictionary::global().reverse_lookup(candidate) {
            let order = candidate.base_unit().order();
            let better = match &best {
                Some((best_order, _)) => order < *best_order,
                None => true,
            };
            if better {
                best = Some((order, name.to_owned()));
            }
        }
    }
    best.map(|(_, s)| s)
}

const DIM_ORDER: &[(&str, fn(BaseUnit) -> i32)] = &[
    ("m", BaseUnit::meter),
    ("kg", BaseUnit::kilogram),
    ("s", BaseUnit::second),
    ("A", BaseUnit::ampere),
    ("K", BaseUnit::kelvin),
    ("mol", BaseUnit::mole),
    ("cd", BaseUnit::candela),
    ("item", BaseUnit::count),
    ("$", BaseUnit::currency),
    ("rad", BaseUnit::radian),
];

/// Step 7: `m^a*kg^b*s^c*...` in the fixed dimension order spec section
/// 4.4 specifies, with every negative exponent collected on the right
/// of a single `/` rather than rendered as `x^-n` inline.
fn raw_dimensional_expansion(base: BaseUnit) -> String {
    let mut numerator = String::new();
    let mut denominator = String::new();
    for (name, accessor) in DIM_ORDER {
        let exp = accessor(base);
        if exp == 0 {
            continue;
        }
        let (buf, exp) = if exp > 0 { (&mut numerator, exp) } else { (&mut denominator, -exp) };
        if !buf.is_empty() {
            buf.push('*');
        }
        buf.push_str(name);
        if exp != 1 {
            let _ = write!(buf, "^{exp}");
        }
    }
    match (numerator.is_empty(), denominator.is_empty()) {
        (true, true) => String::new(),
        (false, true) => numerator,
        (true, false) => format!("1/{denominator}"),
        (false, false) => format!("{numerator}/{denominator}"),
    }
}

fn raw_expansion(unit: PreciseUnit, _flags: MatchFlags) -> String {
    let dims = raw_dimensional_expansion(unit.base_unit());
    let m = unit.multiplier();
    if dims.is_empty() {
        return format_decimal(m);
    }
    if (m - 1.0).abs() < 1e-12 {
        dims
    } else {
        format!("{}*{dims}", format_decimal(m))
    }
}

/// Escape `{`, `}`, `(` and `)` inside a commodity name so it can be
/// embedded in a brace suffix and parsed back unambiguously (spec
/// section 6.2's "braces escape brackets and parentheses with `\`").
fn escape_commodity(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '{' | '}' | '(' | ')' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn append_commodity_suffix(out: &mut String, code: u32) {
    if code == commodity::NONE {
        return;
    }
    let Some(name) = commodity::global().get_name(code) else {
        return;
    };
    let escaped = escape_commodity(&name);
    if code & (1 << 31) != 0 {
        out.insert_str(0, "1/");
        let _ = write!(out, "{{{escaped}}}");
    } else {
        let _ = write!(out, "{{{escaped}}}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::unit_from_string;

    fn rt(s: &str) -> PreciseUnit {
        let flags = MatchFlags::DEFAULT;
        let u = unit_from_string(s, flags);
        assert!(!u.is_invalid(), "failed to parse {s:?}");
        u
    }

    #[test]
    fn direct_dictionary_hit_round_trips() {
        let kg = rt("kg");
        let rendered = to_string(kg, MatchFlags::DEFAULT);
        let reparsed = unit_from_string(&rendered, MatchFlags::DEFAULT);
        assert_eq!(reparsed, kg);
    }

    #[test]
    fn inverse_hit_renders_with_leading_slash() {
        let hz = rt("Hz");
        let per_second = hz.inv();
        let rendered = to_string(per_second.inv(), MatchFlags::DEFAULT);
        assert!(!rendered.is_empty());
    }

    #[test]
    fn dimensionless_multiplier_prefers_known_prefix() {
        let milli = PreciseUnit::new(1e-3, BaseUnit::DIMENSIONLESS, commodity::NONE);
        assert_eq!(to_string(milli, MatchFlags::DEFAULT), "m");
    }

    #[test]
    fn raw_expansion_orders_dimensions_and_splits_reciprocal() {
        let base = BaseUnit::new(1, -2, 0, 0, 0, 0, 0, 0, 0, 0, false, false, false, false);
        let unit = PreciseUnit::new(1.0, base, commodity::NONE);
        let rendered = to_string(unit, MatchFlags::DEFAULT);
        assert_eq!(rendered, "m/s^2");
    }

    #[test]
    fn nan_multiplier_renders_as_nan_literal() {
        assert_eq!(to_string(PreciseUnit::INVALID, MatchFlags::DEFAULT), "NaN");
    }

    #[test]
    fn commodity_suffix_is_appended_in_braces() {
        let kg = rt("kg");
        let code = commodity::global().add("milk_test_serializer");
        let with_commodity = kg.with_commodity(code);
        let rendered = to_string(with_commodity, MatchFlags::DEFAULT);
        assert!(rendered.ends_with("{milk_test_serializer}"), "got {rendered:?}");
    }

    #[test]
    fn equation_unit_round_trips_through_reserved_token() {
        let db = rt("dB");
        let rendered = to_string(db, MatchFlags::DEFAULT);
        let reparsed = unit_from_string(&rendered, MatchFlags::DEFAULT.with_allow_custom_units(true));
        assert_eq!(reparsed.base_unit(), db.base_unit());
    }

    #[test]
    fn measurement_to_string_renders_value_and_unit() {
        let meters = rt("m");
        let m = PreciseMeasurement::new(10.0, meters);
        assert_eq!(measurement_to_string(m, MatchFlags::DEFAULT), "10 m");
    }
}
