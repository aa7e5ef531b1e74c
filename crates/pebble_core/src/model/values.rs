//! Small validated scalar wrappers shared by every aggregate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("valid hex color regex"));

/// Human-facing name of an aggregate.
pub type Name = String;
/// Free-form description text.
pub type Description = String;
/// Free-form note attached to a habit instance.
pub type Note = String;

/// Opaque identifier assigned by the backing store on first save.
///
/// The core never interprets the content; it only compares ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Raised when a color string is not a `#rgb` / `#rrggbb` hex literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorError(pub String);

impl Display for ColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color format `{}`", self.0)
    }
}

impl Error for ColorError {}

/// Hex color literal, validated on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    hex: String,
}

impl Color {
    /// Validates and wraps a hex color string.
    ///
    /// # Errors
    /// - Returns [`ColorError`] when `hex` does not match `#rgb` or `#rrggbb`.
    pub fn new(hex: impl Into<String>) -> Result<Self, ColorError> {
        let hex = hex.into();
        if !Self::is_valid_hex(&hex) {
            return Err(ColorError(hex));
        }
        Ok(Self { hex })
    }

    pub fn is_valid_hex(value: &str) -> bool {
        HEX_COLOR_RE.is_match(value)
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.hex
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorError, Id};

    #[test]
    fn color_accepts_short_and_long_hex() {
        assert_eq!(Color::new("#fff").unwrap().hex(), "#fff");
        assert_eq!(Color::new("#00FF7a").unwrap().hex(), "#00FF7a");
    }

    #[test]
    fn color_rejects_malformed_values() {
        for value in ["invalid color", "fff", "#ffff", "#gggggg", "#fffffff", ""] {
            assert_eq!(
                Color::new(value).unwrap_err(),
                ColorError(value.to_string()),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn color_deserialize_validates() {
        let err = serde_json::from_str::<Color>("\"blue\"").unwrap_err();
        assert!(err.to_string().contains("invalid color format"));
    }

    #[test]
    fn id_is_transparent_on_the_wire() {
        let id = Id::new("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), "abc");
    }
}
