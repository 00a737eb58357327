//! Display mode for presenting images
//!
//! Numeric codes follow the order users know from the configuration:
//! 0 = metadata only, 1 = metadata and image, 2 = image only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How an image is presented by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Print the metadata block only
    MetadataOnly,

    /// Print the metadata block, then open the image
    #[default]
    MetadataAndImage,

    /// Open the image only
    ImageOnly,
}

impl DisplayMode {
    /// Whether this mode prints the metadata block
    pub fn shows_metadata(&self) -> bool {
        matches!(self, DisplayMode::MetadataOnly | DisplayMode::MetadataAndImage)
    }

    /// Whether this mode opens the image file
    pub fn shows_image(&self) -> bool {
        matches!(self, DisplayMode::MetadataAndImage | DisplayMode::ImageOnly)
    }

    /// Numeric code (0, 1, 2)
    pub fn code(&self) -> u8 {
        match self {
            DisplayMode::MetadataOnly => 0,
            DisplayMode::MetadataAndImage => 1,
            DisplayMode::ImageOnly => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DisplayMode::MetadataOnly),
            1 => Some(DisplayMode::MetadataAndImage),
            2 => Some(DisplayMode::ImageOnly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::MetadataOnly => "metadata_only",
            DisplayMode::MetadataAndImage => "metadata_and_image",
            DisplayMode::ImageOnly => "image_only",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = Error;

    /// Accepts the snake_case name or the numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return DisplayMode::from_code(code)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown display mode code: {}", code)));
        }
        match s.to_lowercase().replace('-', "_").as_str() {
            "metadata_only" => Ok(DisplayMode::MetadataOnly),
            "metadata_and_image" => Ok(DisplayMode::MetadataAndImage),
            "image_only" => Ok(DisplayMode::ImageOnly),
            other => Err(Error::InvalidInput(format!("Unknown display mode: {}", other))),
        }
    }
}
