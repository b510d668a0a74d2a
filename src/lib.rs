//! Physical-units algebra and string-interchange: parse, convert, and
//! format [units](unit::PreciseUnit) and [measurements](measurement::PreciseMeasurement).
//!
//! A unit is a 32-bit tuple of SI base-quantity exponents (component A)
//! plus a multiplier (component B/C) and an optional commodity tag
//! (component D). Dimensional algebra (`*`, `/`, `pow`, `root`) combines
//! exponent tuples directly; [`convert`] rescales a value between two
//! units sharing a dimension. A heuristic recursive-descent parser
//! (component F) turns free-form text such as `"5.2 kWh"` or
//! `"12.3 ft/s^2"` into a [`unit::PreciseUnit`] or
//! [`measurement::PreciseMeasurement`]; a matching serializer
//! (component G) turns either back into text.
//!
//! # Examples
//!
//! ```
//! use unitize::{unit_from_string, convert, to_string, MatchFlags};
//!
//! let km = unit_from_string("km", MatchFlags::DEFAULT);
//! let mi = unit_from_string("mi", MatchFlags::DEFAULT);
//! let miles = convert(5.0, km, mi);
//! assert!((miles - 3.106_855_96).abs() < 1e-6);
//! assert_eq!(to_string(km, MatchFlags::DEFAULT), "km");
//! ```
//!
//! ```
//! use unitize::{measurement_from_string, MatchFlags};
//!
//! let m = measurement_from_string("9.8 m/s^2", MatchFlags::DEFAULT);
//! assert!((m.value() - 9.8).abs() < 1e-9);
//! ```
//!
//! # Features
//! - No precision loss on the dimensional exponents (component A is an
//!   exact bit-packed tuple, not a floating-point approximation)
//! - A single string grammar covers SI units, commodities, logarithmic
//!   scales (dB, neper, Richter-style magnitudes), custom opaque units,
//!   and user-defined overlay units
//! - `serde` support (measurements round-trip through their string form)
//!
//! # Limitations
//! - The string parser is heuristic, not a formal grammar; pathological
//!   inputs are bounded by a recursion/partition depth budget rather
//!   than rejected outright
//! - Per-unit conversions (`convert_pu`) only cover the electrical
//!   relations a base power and base voltage are defined for

#![warn(
    clippy::all,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::if_let_mutex,
    clippy::mismatched_target_os,
    clippy::await_holding_lock,
    clippy::match_on_vec_items,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    clippy::str_to_string,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_debug_implementations,
    missing_docs
)]
#![deny(unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub mod base;
pub mod commodity;
pub mod convert;
pub mod custom;
pub mod dictionary;
pub mod equation;
mod error;
pub mod flags;
pub mod format;
pub mod measurement;
mod parser;
pub mod prefix;
pub mod registry;
mod round;
#[cfg(feature = "serde")]
mod serde;
pub mod udefs;
pub mod unit;

pub use base::BaseUnit;
pub use convert::{convert, convert_pu};
pub use dictionary::default_unit;
pub use error::Error;
pub use flags::MatchFlags;
pub use format::{measurement_to_string, to_string};
pub use measurement::{
    measurement_from_string, uncertain_measurement_from_string, Measurement, PreciseMeasurement,
    UncertainMeasurement,
};
pub use parser::unit_from_string;
pub use registry::{
    active_domain, custom_commodities_enabled, default_flags, disable_custom_commodities,
    disable_user_defined_units, enable_custom_commodities, enable_user_defined_units,
    set_default_flags, set_units_domain, user_defined_units_enabled, Domain,
};
pub use udefs::{defined_units_from_file, defined_units_from_string};
pub use unit::{PreciseUnit, Unit};

/// `root(unit, n)` (spec section 6.1): the unit whose `n`th power is
/// `unit`, e.g. `root(m^2, 2) == m`.
///
/// # Examples
///
/// ```
/// use unitize::{root, unit_from_string, MatchFlags};
/// let sq_m = unit_from_string("m^2", MatchFlags::DEFAULT);
/// let m = unit_from_string("m", MatchFlags::DEFAULT);
/// assert_eq!(root(sq_m, 2).base_unit(), m.base_unit());
/// ```
pub fn root(unit: PreciseUnit, n: i32) -> PreciseUnit {
    unit.root(n)
}

/// `pow(unit, n)` (spec section 6.1): `unit` raised to the `n`th power.
pub fn pow(unit: PreciseUnit, n: i32) -> PreciseUnit {
    unit.pow(n)
}

/// Register a user-defined unit under `name`, visible for both parsing
/// and serialization (spec section 6.1's `add_user_defined_unit`).
pub fn add_user_defined_unit(name: &str, unit: PreciseUnit) {
    dictionary::global().add_user_defined_unit(name, unit, dictionary::Visibility::Both);
}

/// Remove a previously registered user-defined unit, if any.
pub fn remove_user_defined_unit(name: &str) {
    dictionary::global().remove_user_defined_unit(name);
}

/// Remove every user-defined unit registered so far.
pub fn clear_user_defined_units() {
    dictionary::global().clear_user_defined_units();
}

/// Register `name` as a custom commodity, returning its packed code
/// (spec section 6.1's `add_custom_commodity`).
pub fn add_custom_commodity(name: &str) -> u32 {
    commodity::global().add(name)
}

/// Look up a previously registered commodity's code by name.
pub fn get_commodity(name: &str) -> Option<u32> {
    commodity::global().get_code(name)
}

/// Look up a commodity code's registered name.
pub fn get_commodity_name(code: u32) -> Option<String> {
    commodity::global().get_name(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_convert_matches_dictionary_units() {
        let km = unit_from_string("km", MatchFlags::DEFAULT);
        let m = unit_from_string("m", MatchFlags::DEFAULT);
        assert!((convert(1.0, km, m) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn root_and_pow_are_inverse() {
        let m = unit_from_string("m", MatchFlags::DEFAULT);
        let cubed = pow(m, 3);
        assert_eq!(root(cubed, 3).base_unit(), m.base_unit());
    }

    #[test]
    fn user_defined_unit_round_trips_through_the_dictionary() {
        enable_user_defined_units();
        let m = unit_from_string("m", MatchFlags::DEFAULT);
        add_user_defined_unit("smoot", PreciseUnit::new(1.7018, m.base_unit(), commodity::NONE));
        let looked_up = unit_from_string("smoot", MatchFlags::DEFAULT.with_allow_custom_units(true));
        assert!(!looked_up.is_invalid());
        remove_user_defined_unit("smoot");
    }

    #[test]
    fn custom_commodity_round_trips_through_the_registry() {
        let code = add_custom_commodity("frobnitz-lib-root-test");
        assert_eq!(get_commodity("frobnitz-lib-root-test"), Some(code));
        assert_eq!(get_commodity_name(code).as_deref(), Some("frobnitz-lib-root-test"));
    }
}
