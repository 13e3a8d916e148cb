//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssd1306_panel_hw::oled::DEFAULT_HEADER;
use ssd1306_panel_hw::{
    Geometry, Orientation, PanelOptions, DEFAULT_I2C_ADDRESS, DEFAULT_I2C_BUS, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use std::path::Path;
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// I2C bus configuration
    #[serde(default)]
    pub i2c: I2cConfig,

    /// Panel configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// I2C bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I2cConfig {
    /// Bus number, opened as /dev/i2c-<bus>
    #[serde(default = "default_bus")]
    pub bus: u8,

    /// 7-bit slave address (usually 0x3C or 0x3D)
    #[serde(default = "default_address")]
    pub address: u16,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            address: default_address(),
        }
    }
}

/// Panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Panel width in pixels
    #[serde(default = "default_width")]
    pub width: u16,

    /// Panel height in pixels (16, 24, ..., 64)
    #[serde(default = "default_height")]
    pub height: u16,

    /// "normal" or "upside-down"
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// Text shown on the top line
    #[serde(default = "default_header")]
    pub header: String,

    /// Contrast override (0-255); the init sequence sets 255
    #[serde(default)]
    pub contrast: Option<u8>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            orientation: default_orientation(),
            header: default_header(),
            contrast: None,
        }
    }
}

// Default value functions
fn default_bus() -> u8 {
    DEFAULT_I2C_BUS
}

fn default_address() -> u16 {
    DEFAULT_I2C_ADDRESS
}

fn default_width() -> u16 {
    SCREEN_WIDTH
}

fn default_height() -> u16 {
    SCREEN_HEIGHT
}

fn default_orientation() -> String {
    "normal".to_string()
}

fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults when the file is missing.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Builds attach options, validating geometry and orientation.
    pub fn panel_options(&self) -> Result<PanelOptions> {
        let geometry = Geometry::new(self.display.width, self.display.height)
            .context("Invalid display size")?;
        let orientation: Orientation = self
            .display
            .orientation
            .parse()
            .context("Invalid display orientation")?;
        let options = PanelOptions {
            geometry,
            orientation,
            header: self.display.header.clone(),
            ..PanelOptions::default()
        };
        options
            .validate()
            .context("Display too short for a text line")?;
        Ok(options)
    }
}
