//! Panel mounting orientation.
//!
//! The SSD1306 mirrors its output through two opcodes: segment re-map
//! (columns) and COM output scan direction (rows). Flipping both rotates the
//! picture by 180°, so no software rotation of the framebuffer is needed.

use crate::{Error, Result};
use std::str::FromStr;

/// Panel orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Column 127 mapped to SEG0, COM scan remapped. Most breakout boards
    /// mount the glass this way.
    #[default]
    Normal,
    /// Rotated 180° relative to [`Orientation::Normal`].
    UpsideDown,
}

impl Orientation {
    /// Returns the segment re-map opcode.
    pub fn segment_remap(&self) -> u8 {
        match self {
            Orientation::Normal => 0xA1,
            Orientation::UpsideDown => 0xA0,
        }
    }

    /// Returns the COM output scan direction opcode.
    pub fn com_scan_direction(&self) -> u8 {
        match self {
            Orientation::Normal => 0xC8,
            Orientation::UpsideDown => 0xC0,
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Orientation::Normal),
            "upside-down" | "upside_down" => Ok(Orientation::UpsideDown),
            _ => Err(Error::InvalidOrientation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Normal => write!(f, "normal"),
            Orientation::UpsideDown => write!(f, "upside-down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes() {
        assert_eq!(Orientation::Normal.segment_remap(), 0xA1);
        assert_eq!(Orientation::Normal.com_scan_direction(), 0xC8);
        assert_eq!(Orientation::UpsideDown.segment_remap(), 0xA0);
        assert_eq!(Orientation::UpsideDown.com_scan_direction(), 0xC0);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "normal".parse::<Orientation>().unwrap(),
            Orientation::Normal
        );
        assert_eq!(
            "Upside-Down".parse::<Orientation>().unwrap(),
            Orientation::UpsideDown
        );
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for orientation in [Orientation::Normal, Orientation::UpsideDown] {
            assert_eq!(
                orientation.to_string().parse::<Orientation>().unwrap(),
                orientation
            );
        }
    }
}
