//! SSD1306 Panel Hardware Library
//!
//! Drives 128x64 (and smaller) SSD1306 OLED panels over I2C: a page-packed
//! framebuffer, a fixed-size glyph renderer, the controller's command/data
//! framing, and a line-oriented text console.

pub mod error;
pub mod oled;
pub mod orientation;
pub mod transport;

pub use error::{Error, Result};
pub use oled::{DetachError, Framebuffer, Geometry, Panel, PanelOptions, Ssd1306, WriteReport};
pub use orientation::Orientation;
pub use transport::{TraceTransport, Transport};

#[cfg(target_os = "linux")]
pub use transport::I2cDevTransport;

/// Default panel dimensions.
pub const SCREEN_WIDTH: u16 = 128;
pub const SCREEN_HEIGHT: u16 = 64;

/// Controller limits: 128 segment drivers, multiplex ratio 16..=64.
pub const MAX_WIDTH: u16 = 128;
pub const MIN_HEIGHT: u16 = 16;
pub const MAX_HEIGHT: u16 = 64;

/// I2C bus and 7-bit slave address the panel is usually wired to.
pub const DEFAULT_I2C_BUS: u8 = 3;
pub const DEFAULT_I2C_ADDRESS: u16 = 0x3C;
