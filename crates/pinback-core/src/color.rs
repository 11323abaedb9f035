use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbHex {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color is empty")]
    Empty,
    #[error("expected 6 hex digits, got {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

impl RgbHex {
    pub const BLACK: RgbHex = RgbHex { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// HSL hue in degrees, `0.0..360.0`. Greys have hue 0.
    pub fn hue(&self) -> f64 {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == min {
            return 0.0;
        }
        let d = max - min;
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h / 6.0 * 360.0
    }
}

/// Circular distance between two hues in degrees, at most 180.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

impl FromStr for RgbHex {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(ColorParseError::Empty);
        }
        let hex = t.strip_prefix('#').unwrap_or(t);
        if hex.len() != 6 {
            return Err(ColorParseError::BadLength(t.to_string()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(t.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigit(t.to_string()))
        };
        Ok(RgbHex::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for RgbHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for RgbHex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RgbHex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!("#FF8000".parse::<RgbHex>().unwrap(), RgbHex::new(255, 128, 0));
        assert_eq!("ff8000".parse::<RgbHex>().unwrap(), RgbHex::new(255, 128, 0));
        assert_eq!(RgbHex::new(255, 128, 0).to_string(), "#ff8000");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<RgbHex>(), Err(ColorParseError::Empty));
        assert!(matches!("#fff".parse::<RgbHex>(), Err(ColorParseError::BadLength(_))));
        assert!(matches!("#gg0000".parse::<RgbHex>(), Err(ColorParseError::BadDigit(_))));
        // multi-byte chars must not slice mid-codepoint
        assert!("#ééé".parse::<RgbHex>().is_err());
    }

    #[test]
    fn hue_of_primaries() {
        assert_eq!(RgbHex::new(255, 0, 0).hue(), 0.0);
        assert!((RgbHex::new(0, 255, 0).hue() - 120.0).abs() < 1e-9);
        assert!((RgbHex::new(0, 0, 255).hue() - 240.0).abs() < 1e-9);
        assert_eq!(RgbHex::new(128, 128, 128).hue(), 0.0);
    }

    #[test]
    fn hue_distance_wraps() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_eq!(hue_distance(0.0, 180.0), 180.0);
    }
}
