use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An 8-bit RGB triple.
///
/// Displays as `"r, g, b"` so it can be dropped straight into a CSS
/// `rgba(...)` expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

/// Convert a `#rrggbb` string into its RGB components.
///
/// A single leading `#` is optional. Anything other than exactly six hex
/// digits after it is rejected.
pub fn hex_to_rgb(value: &str) -> Result<Rgb, TypeError> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    let invalid = || TypeError::InvalidColor {
        value: value.to_string(),
    };
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    Ok(Rgb {
        r: bytes[0],
        g: bytes[1],
        b: bytes[2],
    })
}

/// A validated theme color, always stored as lowercase `#rrggbb`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalize a color string.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let rgb = hex_to_rgb(value.trim())?;
        Ok(Self::from_rgb(rgb))
    }

    /// Wrap a literal that is already lowercase `#rrggbb`.
    pub(crate) fn known(hex: &'static str) -> Self {
        debug_assert!(hex_to_rgb(hex).is_ok());
        Self(hex.to_string())
    }

    /// Build a color from its components.
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self(format!("#{}", hex::encode([rgb.r, rgb.g, rgb.b])))
    }

    /// The `#rrggbb` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The RGB components of this color.
    pub fn rgb(&self) -> Rgb {
        // The inner string is validated on construction.
        hex_to_rgb(&self.0).unwrap_or(Rgb { r: 0, g: 0, b: 0 })
    }
}

impl fmt::Debug for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexColor({})", self.0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn converts_known_colors() {
        assert_eq!(hex_to_rgb("#667eea").unwrap().to_string(), "102, 126, 234");
        assert_eq!(hex_to_rgb("#000000").unwrap().to_string(), "0, 0, 0");
        assert_eq!(hex_to_rgb("ffffff").unwrap(), Rgb { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "#", "#fff", "#12345", "#1234567", "#gg0000", "##667eea", "#66 7ee"] {
            assert!(
                matches!(hex_to_rgb(bad), Err(TypeError::InvalidColor { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_normalizes_case_and_prefix() {
        let color = HexColor::parse("  667EEA ").unwrap();
        assert_eq!(color.as_str(), "#667eea");
        assert_eq!(color.to_string(), "#667eea");
    }

    #[test]
    fn serde_uses_plain_string() {
        let color = HexColor::parse("#764ba2").unwrap();
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#764ba2\"");
        let back: HexColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<HexColor>("\"blue\"").is_err());
    }

    proptest! {
        #[test]
        fn components_survive_formatting(r: u8, g: u8, b: u8) {
            let rgb = Rgb { r, g, b };
            let color = HexColor::from_rgb(rgb);
            prop_assert_eq!(color.rgb(), rgb);
            prop_assert_eq!(hex_to_rgb(&color.as_str().to_uppercase()).unwrap(), rgb);
        }
    }
}
