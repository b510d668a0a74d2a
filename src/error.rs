//! The crate's convenience error surface.
//!
//! Core algebra and parsing never panic and never return `Result`: per
//! the three error modes this crate distinguishes, they return sentinel
//! *values* instead (a NaN multiplier, the all-exponents-saturated
//! [`crate::base::BaseUnit::ERROR`] tuple, or a NaN measurement value).
//! `Error` exists for the handful of entry points where a `Result` is
//! the idiomatic surface over one of those sentinels: `TryFrom<&str>`
//! impls and the user-defined-units file loader.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::num::ParseFloatError;

/// Everything that can go wrong turning text into a unit, measurement,
/// or user-defined-units file into registry entries.
#[derive(Debug)]
pub enum Error {
    /// Input contained a non-ASCII byte; the parser only ever accepts
    /// ASCII unit strings (spec section 4.3).
    NotAscii,
    /// The string did not resolve to any known or constructible unit.
    InvalidUnit(String),
    /// The unit resolved, but the resulting quantity cannot be
    /// represented in the target type (for example, an operation that
    /// overflowed the packed exponent tuple).
    NonRepresentable(String),
    /// Two quantities could not be converted between one another
    /// (incompatible bases with no known conversion path).
    InvalidConversion {
        /// Text of the unit converted from.
        from: String,
        /// Text of the unit converted to.
        to: String,
    },
    /// A numeric portion of the input could not be parsed.
    ParseFloat(ParseFloatError),
    /// A user-defined-units file could not be read.
    Io(io::Error),
    /// A line of a user-defined-units file did not match the expected
    /// `name = definition` (or `name = definition, commodity`) shape.
    MalformedDefinition {
        /// 1-based line number within the source file.
        line: usize,
        /// The offending line, kept for display purposes.
        text: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAscii => write!(f, "input must be ascii"),
            Error::InvalidUnit(input) => write!(f, r#"invalid unit "{input}""#),
            Error::NonRepresentable(input) => {
                write!(f, r#"unit "{input}" is not representable"#)
            }
            Error::InvalidConversion { from, to } => {
                write!(f, r#"cannot convert "{from}" to "{to}""#)
            }
            Error::ParseFloat(err) => write!(f, "invalid number: {err}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::MalformedDefinition { line, text } => {
                write!(f, "malformed definition on line {line}: {text:?}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ParseFloat(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::NotAscii
            | Error::InvalidUnit(_)
            | Error::NonRepresentable(_)
            | Error::InvalidConversion { .. }
            | Error::MalformedDefinition { .. } => None,
        }
    }
}

impl From<ParseFloatError> for Error {
    fn from(err: ParseFloatError) -> Self {
        Error::ParseFloat(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
