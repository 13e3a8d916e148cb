//! Error types for the SSD1306 panel library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the panel.
#[derive(Error, Debug)]
pub enum Error {
    /// I2C character device not found or could not be opened.
    #[error("I2C device not found at {0}")]
    DeviceNotFound(String),

    /// Slave address outside the 7-bit range.
    #[error("Invalid I2C address: {0:#04X}")]
    InvalidAddress(u16),

    /// Transport I/O error.
    #[error("I2C I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data payload does not fit the transaction buffer.
    #[error("Data payload too large: {len} bytes, capacity {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },

    /// Panel dimensions the controller cannot address.
    #[error("Invalid panel geometry: {width}x{height}")]
    InvalidGeometry { width: u16, height: u16 },

    /// Invalid orientation value.
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Framebuffer size mismatch.
    #[error("Framebuffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },
}
