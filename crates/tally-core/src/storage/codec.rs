//! Field-level text codec
//!
//! Converts single typed values to and from the tokens stored in a record
//! line. Tokens are later joined with [`DELIMITER`]; a literal delimiter
//! inside a text token is written as the [`ESCAPE`] sequence and restored on
//! read.
//!
//! Known limitation: a text field that already contains the literal escape
//! sequence `\x3A` decodes back to `:`. The sequence is assumed not to occur
//! in user data; the format has no way to distinguish the two.
//!
//! Numeric decoding strips thousands-separator commas and spaces before
//! parsing. Files written by older releases used locale-dependent number
//! formatting; current writers never emit separators.

use chrono::NaiveDate;

use super::error::{DecodeError, EncodeError};
use crate::money::Money;

/// Field separator within a record line
pub const DELIMITER: char = ':';

/// On-disk stand-in for a literal delimiter inside a text field
pub const ESCAPE: &str = "\\x3A";

/// Calendar dates are stored as `YYYY-MM-DD`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Replace literal delimiters with the escape sequence
pub fn escape(token: &str) -> String {
    token.replace(DELIMITER, ESCAPE)
}

/// Restore escaped delimiters, exact inverse of [`escape`]
pub fn unescape(token: &str) -> String {
    token.replace(ESCAPE, ":")
}

/// Strip legacy thousands separators from a numeric token
///
/// Read-side tolerance only; see the module docs.
fn pre_clean_number(token: &str) -> String {
    token.chars().filter(|c| *c != ',' && *c != ' ').collect()
}

fn invalid(token: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidFormat {
        position: 0,
        token: token.to_string(),
        expected,
    }
}

/// A value that can be stored as one field of a record
///
/// Encoding then decoding yields an equal value for every supported type;
/// the only asymmetry is the legacy separator cleanup on numeric reads.
pub trait Field: Sized {
    /// Type name used in decode error messages
    const EXPECTED: &'static str;

    fn encode_field(&self) -> Result<String, EncodeError>;

    fn decode_field(token: &str) -> Result<Self, DecodeError>;
}

impl Field for bool {
    const EXPECTED: &'static str = "bool";

    fn encode_field(&self) -> Result<String, EncodeError> {
        Ok(if *self { "1".to_string() } else { "0".to_string() })
    }

    fn decode_field(token: &str) -> Result<Self, DecodeError> {
        let cleaned = pre_clean_number(token);
        let value: u64 = cleaned
            .parse()
            .map_err(|_| invalid(token, Self::EXPECTED))?;
        Ok(value != 0)
    }
}

macro_rules! impl_int_field {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Field for $ty {
                const EXPECTED: &'static str = $name;

                fn encode_field(&self) -> Result<String, EncodeError> {
                    Ok(self.to_string())
                }

                fn decode_field(token: &str) -> Result<Self, DecodeError> {
                    pre_clean_number(token)
                        .parse()
                        .map_err(|_| invalid(token, Self::EXPECTED))
                }
            }
        )*
    };
}

impl_int_field! {
    u32 => "u32",
    u64 => "u64",
    i32 => "i32",
    i64 => "i64",
}

impl Field for f64 {
    const EXPECTED: &'static str = "number";

    fn encode_field(&self) -> Result<String, EncodeError> {
        if !self.is_finite() {
            return Err(EncodeError::NotRepresentable {
                value: self.to_string(),
                expected: Self::EXPECTED,
            });
        }
        Ok(self.to_string())
    }

    /// The whole cleaned token must parse; trailing characters are an error
    fn decode_field(token: &str) -> Result<Self, DecodeError> {
        pre_clean_number(token)
            .parse()
            .map_err(|_| invalid(token, Self::EXPECTED))
    }
}

impl Field for String {
    const EXPECTED: &'static str = "string";

    fn encode_field(&self) -> Result<String, EncodeError> {
        Ok(self.clone())
    }

    fn decode_field(token: &str) -> Result<Self, DecodeError> {
        Ok(token.to_string())
    }
}

impl Field for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn encode_field(&self) -> Result<String, EncodeError> {
        Ok(self.format(DATE_FORMAT).to_string())
    }

    fn decode_field(token: &str) -> Result<Self, DecodeError> {
        NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| invalid(token, Self::EXPECTED))
    }
}

impl Field for Money {
    const EXPECTED: &'static str = "amount";

    fn encode_field(&self) -> Result<String, EncodeError> {
        Ok(self.to_string())
    }

    fn decode_field(token: &str) -> Result<Self, DecodeError> {
        token.parse().map_err(|_| invalid(token, Self::EXPECTED))
    }
}
