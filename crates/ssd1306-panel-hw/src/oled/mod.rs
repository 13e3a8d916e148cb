//! OLED display module.
//!
//! Provides framebuffer, glyph rendering and the I2C command protocol for
//! SSD1306 panels, plus a text console that turns raw writes into screen
//! updates.

mod device;
mod panel;
mod renderer;

pub mod font;
pub mod framebuffer;
pub mod protocol;

pub use device::Ssd1306;
pub use font::{Font, FONT_6X8};
pub use framebuffer::{Framebuffer, Geometry};
pub use panel::{
    DetachError, Panel, PanelOptions, WriteReport, BANNER_ROW, DEFAULT_HEADER, INTAKE_CAPACITY,
    LINE_HEIGHT, TERMINATOR, TEXT_TOP,
};
pub use renderer::{Cursor, Renderer};
