//! Text console on top of an SSD1306.
//!
//! Screen layout, by row:
//! - `0..8`: header text, drawn once at attach
//! - `8..16`: solid banner strip, drawn once at attach
//! - `16..height`: text region, one line per write
//!
//! A write of a single NUL byte blanks the text region. Any other write is
//! drawn on the current line, the whole screen is pushed, and the cursor
//! moves to the start of the next line, wrapping back to the top of the text
//! region at the bottom. Nothing scrolls: text that does not fit is dropped.

use crate::orientation::Orientation;
use crate::transport::Transport;
use crate::{Error, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::device::Ssd1306;
use super::font::{Font, FONT_6X8};
use super::framebuffer::{Framebuffer, Geometry};
use super::renderer::Cursor;

/// Top row of the banner strip.
pub const BANNER_ROW: u16 = 8;

/// Top row of the text region.
pub const TEXT_TOP: u16 = 16;

/// Vertical advance per line.
pub const LINE_HEIGHT: u16 = 8;

/// Byte that, written on its own, clears the text region.
pub const TERMINATOR: u8 = 0;

/// Intake capacity per write, including the terminator.
pub const INTAKE_CAPACITY: usize = 256;

/// Default header line.
pub const DEFAULT_HEADER: &str = "SSD1306 OLED";

/// Attach-time settings.
#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub geometry: Geometry,
    pub orientation: Orientation,
    pub header: String,
    pub font: &'static Font,
}

impl PanelOptions {
    /// Checks that the panel has room for at least one text line below the
    /// banner.
    pub fn validate(&self) -> Result<()> {
        if self.geometry.height() <= TEXT_TOP {
            return Err(Error::InvalidGeometry {
                width: self.geometry.width(),
                height: self.geometry.height(),
            });
        }
        Ok(())
    }
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            orientation: Orientation::default(),
            header: DEFAULT_HEADER.to_string(),
            font: &FONT_6X8,
        }
    }
}

/// Outcome of one [`Panel::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Input bytes taken in; longer writes are truncated to the intake capacity.
    pub accepted: usize,
    /// Transactions that failed while pushing the screen.
    pub failed_transactions: usize,
}

/// Returned by [`Panel::detach`] when the display could not be powered off.
///
/// The transport is handed back either way.
#[derive(Debug)]
pub struct DetachError<T> {
    pub transport: T,
    pub error: Error,
}

/// An attached panel.
///
/// All drawing and pushing for one write happens under a single lock, so
/// concurrent writers never interleave their page pushes.
pub struct Panel<T> {
    device: Mutex<Ssd1306<T>>,
    attach_failures: usize,
}

impl<T: Transport> Panel<T> {
    /// Initialises the controller, draws the header and banner, and pushes
    /// the first frame.
    ///
    /// Fails only for panels too short to hold a text line. Transport
    /// failures do not abort attach; they are logged and reported by
    /// [`Panel::attach_failures`].
    pub fn attach(transport: T, options: &PanelOptions) -> Result<Self> {
        options.validate()?;

        let mut device = Ssd1306::new(transport, options.geometry, options.font)
            .with_orientation(options.orientation);
        let mut failed = device.init();

        let width = options.geometry.width();
        let renderer = device.renderer_mut();
        renderer.set_cursor(0, 0);
        renderer.write_str(options.header.as_bytes());
        renderer.fill_region(0, BANNER_ROW, width, LINE_HEIGHT, true);
        renderer.set_cursor(0, TEXT_TOP);
        failed += device.update_screen();

        if failed > 0 {
            warn!("Panel attached with {} failed transactions", failed);
        } else {
            info!(
                "Panel attached ({}x{}, {})",
                width,
                options.geometry.height(),
                options.orientation
            );
        }

        Ok(Self {
            device: Mutex::new(device),
            attach_failures: failed,
        })
    }

    /// Transactions that failed during [`Panel::attach`].
    pub fn attach_failures(&self) -> usize {
        self.attach_failures
    }

    fn lock(&self) -> MutexGuard<'_, Ssd1306<T>> {
        // A panicked writer can leave half-drawn pixels but never an invalid
        // framebuffer, so the state is still usable.
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feeds one raw write into the console.
    pub fn write(&self, bytes: &[u8]) -> WriteReport {
        let mut device = self.lock();

        if bytes == [TERMINATOR] {
            let failed = clear_text_region(&mut device);
            return WriteReport {
                accepted: 1,
                failed_transactions: failed,
            };
        }

        let accepted = bytes.len().min(INTAKE_CAPACITY - 1);
        let height = device.geometry().height();
        let renderer = device.renderer_mut();
        renderer.write_str(&bytes[..accepted]);
        let failed = device.update_screen();

        let row = device.renderer().cursor().y + LINE_HEIGHT;
        let row = if row >= height { TEXT_TOP } else { row };
        device.renderer_mut().set_cursor(0, row);
        debug!("Wrote {} bytes, next line at row {}", accepted, row);

        WriteReport {
            accepted,
            failed_transactions: failed,
        }
    }

    /// Blanks the text region and pushes the screen.
    pub fn clear(&self) -> WriteReport {
        self.write(&[TERMINATOR])
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Cursor {
        self.lock().renderer().cursor()
    }

    /// Copy of the current framebuffer.
    pub fn snapshot(&self) -> Framebuffer {
        self.lock().framebuffer().clone()
    }

    /// Sets display contrast.
    pub fn set_contrast(&self, contrast: u8) -> Result<()> {
        self.lock().set_contrast(contrast)
    }

    /// Powers the display off and returns the transport.
    pub fn detach(self) -> std::result::Result<T, DetachError<T>> {
        let mut device = self
            .device
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let result = device.display_off();
        let transport = device.into_transport();
        match result {
            Ok(()) => {
                info!("Panel detached");
                Ok(transport)
            }
            Err(error) => {
                warn!("Failed to turn off display: {}", error);
                Err(DetachError { transport, error })
            }
        }
    }
}

fn clear_text_region<T: Transport>(device: &mut Ssd1306<T>) -> usize {
    let geometry = device.geometry();
    let renderer = device.renderer_mut();
    renderer.fill_region(
        0,
        TEXT_TOP,
        geometry.width(),
        geometry.height().saturating_sub(TEXT_TOP),
        false,
    );
    let failed = device.update_screen();
    device.renderer_mut().set_cursor(0, TEXT_TOP);
    debug!("Text region cleared");
    failed
}
