//! SSD1306 controller: owns the transport and the drawing state.

use crate::orientation::Orientation;
use crate::transport::Transport;
use crate::Result;
use tracing::{debug, warn};

use super::font::Font;
use super::framebuffer::{Framebuffer, Geometry};
use super::protocol::{
    build_command, build_data, cmd, init_sequence, page_start, INIT_TRANSACTION_COUNT,
    WORK_BUFFER_SIZE,
};
use super::renderer::Renderer;

/// One physical panel.
///
/// Aggregate operations ([`Ssd1306::init`], [`Ssd1306::update_screen`]) never
/// stop at a failed transaction. They try every step and return how many
/// failed, so `0` means the panel got everything.
pub struct Ssd1306<T> {
    transport: T,
    renderer: Renderer,
    orientation: Orientation,
}

impl<T: Transport> Ssd1306<T> {
    /// Wraps a transport. Nothing is sent until [`Ssd1306::init`].
    pub fn new(transport: T, geometry: Geometry, font: &'static Font) -> Self {
        Self {
            transport,
            renderer: Renderer::new(geometry, font),
            orientation: Orientation::default(),
        }
    }

    /// Sets the orientation used by the next [`Ssd1306::init`].
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.renderer.framebuffer()
    }

    pub fn geometry(&self) -> Geometry {
        self.renderer.framebuffer().geometry()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Gives the transport back.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Clears the framebuffer, homes the cursor and runs the power-up sequence.
    ///
    /// Returns the number of failed transactions.
    pub fn init(&mut self) -> usize {
        self.renderer.clear();
        self.renderer.set_cursor(0, 0);

        let sequence = init_sequence(self.geometry(), self.orientation);
        let failed = sequence
            .iter()
            .filter(|&&opcode| self.write_command(opcode).is_err())
            .count();

        if failed > 0 {
            warn!(
                "{} of {} init transactions failed",
                failed, INIT_TRANSACTION_COUNT
            );
        } else {
            debug!("Init sequence sent ({} transactions)", INIT_TRANSACTION_COUNT);
        }
        failed
    }

    /// Sends the whole framebuffer, page by page.
    ///
    /// Each page costs one page-address command and one data transaction of
    /// exactly `width` bytes. Returns the number of failed transactions.
    pub fn update_screen(&mut self) -> usize {
        let mut failed = 0;
        for page in 0..self.geometry().pages() {
            failed += self.write_command(page_start(page)).is_err() as usize;
            failed += self.write_page(page).is_err() as usize;
        }

        if failed > 0 {
            warn!("Screen update: {} transactions failed", failed);
        } else {
            debug!("Screen update sent ({} pages)", self.geometry().pages());
        }
        failed
    }

    fn write_page(&mut self, page: u16) -> Result<usize> {
        let mut buffer = [0u8; WORK_BUFFER_SIZE];
        let data = self.renderer.framebuffer().page(page).unwrap_or_default();
        let packet = build_data(data, &mut buffer)?;
        self.transport.write(packet)
    }

    /// Sends one command byte.
    pub fn write_command(&mut self, opcode: u8) -> Result<usize> {
        self.transport.write(&build_command(opcode))
    }

    /// Sends a run of GDDRAM data.
    ///
    /// Payloads larger than one page row are rejected without touching the
    /// transport.
    pub fn write_data(&mut self, data: &[u8]) -> Result<usize> {
        let mut buffer = [0u8; WORK_BUFFER_SIZE];
        let packet = build_data(data, &mut buffer)?;
        self.transport.write(packet)
    }

    /// Puts the panel to sleep.
    pub fn display_off(&mut self) -> Result<()> {
        self.write_command(cmd::DISPLAY_OFF)?;
        Ok(())
    }

    /// Wakes the panel.
    pub fn display_on(&mut self) -> Result<()> {
        self.write_command(cmd::DISPLAY_ON)?;
        Ok(())
    }

    /// Sets display contrast (0-255).
    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        self.write_command(cmd::SET_CONTRAST)?;
        self.write_command(contrast)?;
        debug!("Set contrast to {}", contrast);
        Ok(())
    }

    /// Inverts display colours in hardware; the framebuffer is untouched.
    pub fn set_inverted(&mut self, inverted: bool) -> Result<()> {
        if inverted {
            self.write_command(cmd::SET_INVERSE_DISPLAY)?;
        } else {
            self.write_command(cmd::SET_NORMAL_DISPLAY)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oled::font::FONT_6X8;
    use crate::oled::protocol::{CONTROL_CMD_SINGLE, CONTROL_DATA_STREAM};
    use crate::transport::testing::RecordingTransport;
    use crate::Error;

    fn device(transport: RecordingTransport) -> Ssd1306<RecordingTransport> {
        Ssd1306::new(transport, Geometry::default(), &FONT_6X8)
    }

    #[test]
    fn test_init_frames_each_byte_as_command() {
        let recorder = RecordingTransport::new();
        let mut dev = device(recorder.clone());
        assert_eq!(dev.init(), 0);

        let sent = recorder.transactions();
        assert_eq!(sent.len(), INIT_TRANSACTION_COUNT);
        assert!(sent.iter().all(|t| t.len() == 2 && t[0] == CONTROL_CMD_SINGLE));
        assert_eq!(sent.first().unwrap()[1], cmd::DISPLAY_OFF);
        assert_eq!(sent.last().unwrap()[1], cmd::DISPLAY_ON);
    }

    #[test]
    fn test_init_counts_failures_without_aborting() {
        let recorder = RecordingTransport::failing();
        let mut dev = device(recorder.clone());
        assert_eq!(dev.init(), INIT_TRANSACTION_COUNT);
        assert_eq!(recorder.transactions().len(), INIT_TRANSACTION_COUNT);
    }

    #[test]
    fn test_init_resets_drawing_state() {
        let mut dev = device(RecordingTransport::new());
        dev.renderer_mut().fill_region(0, 0, 10, 10, true);
        dev.renderer_mut().set_cursor(30, 30);
        dev.init();
        assert!(dev.framebuffer().data().iter().all(|&b| b == 0));
        assert_eq!(dev.renderer().cursor().x, 0);
        assert_eq!(dev.renderer().cursor().y, 0);
    }

    #[test]
    fn test_update_screen_sends_every_page() {
        let recorder = RecordingTransport::new();
        let mut dev = device(recorder.clone());
        dev.renderer_mut().fill_region(0, 8, 128, 8, true);
        assert_eq!(dev.update_screen(), 0);

        let sent = recorder.transactions();
        assert_eq!(sent.len(), 16);
        for (page, pair) in sent.chunks(2).enumerate() {
            assert_eq!(pair[0], vec![CONTROL_CMD_SINGLE, 0xB0 | page as u8]);
            assert_eq!(pair[1].len(), 129);
            assert_eq!(pair[1][0], CONTROL_DATA_STREAM);
            let fill = if page == 1 { 0xFF } else { 0x00 };
            assert!(pair[1][1..].iter().all(|&b| b == fill));
        }
    }

    #[test]
    fn test_update_screen_narrow_panel() {
        let recorder = RecordingTransport::new();
        let geometry = Geometry::new(64, 32).unwrap();
        let mut dev = Ssd1306::new(recorder.clone(), geometry, &FONT_6X8);
        dev.update_screen();

        let sent = recorder.transactions();
        assert_eq!(sent.len(), 8);
        assert!(sent.iter().skip(1).step_by(2).all(|t| t.len() == 65));
    }

    #[test]
    fn test_update_screen_counts_failures() {
        let recorder = RecordingTransport::failing();
        let mut dev = device(recorder.clone());
        assert_eq!(dev.update_screen(), 16);
        assert_eq!(recorder.transactions().len(), 16);
    }

    #[test]
    fn test_write_data_overflow_skips_transport() {
        let recorder = RecordingTransport::new();
        let mut dev = device(recorder.clone());
        let result = dev.write_data(&[0u8; WORK_BUFFER_SIZE]);
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
        assert!(recorder.transactions().is_empty());

        assert!(dev.write_data(&[0u8; WORK_BUFFER_SIZE - 1]).is_ok());
        assert_eq!(recorder.transactions().len(), 1);
    }

    #[test]
    fn test_single_commands() {
        let recorder = RecordingTransport::new();
        let mut dev = device(recorder.clone());
        dev.set_contrast(0x7F).unwrap();
        dev.set_inverted(true).unwrap();
        dev.set_inverted(false).unwrap();
        dev.display_off().unwrap();
        dev.display_on().unwrap();

        let opcodes: Vec<u8> = recorder.transactions().iter().map(|t| t[1]).collect();
        assert_eq!(opcodes, vec![0x81, 0x7F, 0xA7, 0xA6, 0xAE, 0xAF]);
    }

    #[test]
    fn test_single_command_reports_failure() {
        let mut dev = device(RecordingTransport::failing());
        assert!(dev.display_off().is_err());
    }

    #[test]
    fn test_orientation_reaches_init() {
        let recorder = RecordingTransport::new();
        let mut dev = device(recorder.clone()).with_orientation(Orientation::UpsideDown);
        dev.init();
        let opcodes: Vec<u8> = recorder.transactions().iter().map(|t| t[1]).collect();
        assert!(opcodes.contains(&0xA0));
        assert!(opcodes.contains(&0xC0));
        assert!(!opcodes.contains(&0xC8));
    }
}
