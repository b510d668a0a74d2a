//! `serde` support (spec section 6.1 ambient stack), gated behind the
//! `serde` feature like the rest of the crate's optional dependencies.
//!
//! [`PreciseMeasurement`] round-trips through its string form (the same
//! grammar [`crate::measurement_from_string`]/[`crate::to_string`]
//! use) rather than through its raw fields, so a serialized measurement
//! reads the same in a config file as it would typed by hand.
//!
//! # Examples
//!
//! ```
//! # use indoc::indoc;
//! # use serde::{Deserialize, Serialize};
//! use unitize::PreciseMeasurement;
//!
//! #[derive(Serialize, Deserialize, Debug)]
//! #[serde(rename_all = "kebab-case")]
//! struct Config {
//!     max_payload: PreciseMeasurement,
//!     idle_timeout: PreciseMeasurement,
//! }
//!
//! let config: Config = toml::from_str(indoc! {r#"
//!     max-payload = "64 MB"
//!     idle-timeout = "30 s"
//! "#}).unwrap();
//! assert!((config.max_payload.value() - 64.0).abs() < 1e-9);
//! assert!((config.idle_timeout.value() - 30.0).abs() < 1e-9);
//!
//! let back = toml::to_string(&config).unwrap();
//! let reparsed: Config = toml::from_str(&back).unwrap();
//! assert!((reparsed.max_payload.value() - config.max_payload.value()).abs() < 1e-9);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::measurement_to_string;
use crate::measurement::{measurement_from_string, PreciseMeasurement};
use crate::registry::default_flags;

impl Serialize for PreciseMeasurement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&measurement_to_string(*self, default_flags()))
    }
}

impl<'de> Deserialize<'de> for PreciseMeasurement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let measurement = measurement_from_string(&text, default_flags());
        if measurement.unit().is_invalid() {
            return Err(D::Error::custom(format!("{text} is not a valid measurement")));
        }
        Ok(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_round_trips_through_its_string_form() {
        let unit = crate::parser::unit_from_string("m", default_flags());
        let original = PreciseMeasurement::new(10.0, unit);
        let text = measurement_to_string(original, default_flags());
        let reparsed = measurement_from_string(&text, default_flags());
        assert!(!reparsed.unit().is_invalid());
        assert!((reparsed.value() - 10.0).abs() < 1e-9);
        assert_eq!(reparsed.unit().base_unit(), unit.base_unit());
    }

    #[test]
    fn invalid_text_is_rejected() {
        let bad = measurement_from_string("not a unit at all !!", default_flags());
        assert!(bad.unit().is_invalid());
    }
}
