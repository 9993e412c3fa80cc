use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Pixel dimensions of an ad placement (e.g. a 300x600 half-page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdSize {
    pub width: u32,
    pub height: u32,
}

impl AdSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The placements whose layouts get centered logos and wide call-to-action rows.
pub const DEFAULT_STANDARD_SIZES: [AdSize; 3] = [
    AdSize::new(300, 600),
    AdSize::new(320, 520),
    AdSize::new(160, 600),
];

#[derive(Debug, Error)]
pub enum AdSizeParseError {
    #[error("Invalid ad size format: expected WIDTHxHEIGHT (e.g., 300x600)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Width must be positive")]
    ZeroWidth,
    #[error("Height must be positive")]
    ZeroHeight,
}

impl FromStr for AdSize {
    type Err = AdSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(AdSizeParseError::InvalidFormat);
        }

        let width: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| AdSizeParseError::InvalidWidth(parts[0].to_string()))?;

        let height: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| AdSizeParseError::InvalidHeight(parts[1].to_string()))?;

        if width == 0 {
            return Err(AdSizeParseError::ZeroWidth);
        }
        if height == 0 {
            return Err(AdSizeParseError::ZeroHeight);
        }

        Ok(AdSize { width, height })
    }
}

impl std::fmt::Display for AdSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// Config files spell sizes the same way the CLI does: "300x600".
impl Serialize for AdSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AdSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
