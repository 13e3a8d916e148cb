//! SSD1306 I2C protocol definitions and encoding.
//!
//! Every I2C write starts with a control byte:
//! - `0x80` (Co=1, D/C#=0): exactly one command byte follows
//! - `0x40` (Co=0, D/C#=1): the rest of the write is GDDRAM data
//!
//! Commands with a parameter are sent as two single-command writes.

use super::framebuffer::Geometry;
use crate::orientation::Orientation;
use crate::{Error, Result, MAX_WIDTH};

/// Control byte announcing a single command byte.
pub const CONTROL_CMD_SINGLE: u8 = 0x80;

/// Control byte announcing a run of data bytes.
pub const CONTROL_DATA_STREAM: u8 = 0x40;

/// Capacity of a data transaction: control byte plus one full page row.
pub const WORK_BUFFER_SIZE: usize = MAX_WIDTH as usize + 1;

/// Number of command transactions in the power-up sequence.
pub const INIT_TRANSACTION_COUNT: usize = 28;

/// SSD1306 opcodes.
pub mod cmd {
    pub const SET_LOWER_COL_ADDR: u8 = 0x00;
    pub const SET_HIGHER_COL_ADDR: u8 = 0x10;
    pub const SET_MEM_ADDR_MODE: u8 = 0x20;
    pub const SET_DISPLAY_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP_SETTING: u8 = 0x8D;
    pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
    pub const SET_NORMAL_DISPLAY: u8 = 0xA6;
    pub const SET_INVERSE_DISPLAY: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE_START_ADDR: u8 = 0xB0;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_DISPLAY_CLOCK_DIVIDE: u8 = 0xD5;
    pub const SET_PRECHARGE_PERIOD: u8 = 0xD9;
    pub const SET_COM_PINS_HW_CONFIG: u8 = 0xDA;
    pub const SET_VCOMH_DESELECT_LEVEL: u8 = 0xDB;

    /// Parameter for `SET_MEM_ADDR_MODE`.
    pub const PAGE_ADDR_MODE: u8 = 0x02;
    /// Parameter for `CHARGE_PUMP_SETTING`.
    pub const CHARGE_PUMP_ENABLED: u8 = 0x14;
}

/// Builds a single-command packet.
pub fn build_command(opcode: u8) -> [u8; 2] {
    [CONTROL_CMD_SINGLE, opcode]
}

/// Frames `payload` as a data packet inside `buffer`.
///
/// Fails before touching the buffer if the payload does not fit.
pub fn build_data<'a>(
    payload: &[u8],
    buffer: &'a mut [u8; WORK_BUFFER_SIZE],
) -> Result<&'a [u8]> {
    let len = payload.len() + 1;
    if len > WORK_BUFFER_SIZE {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            capacity: WORK_BUFFER_SIZE - 1,
        });
    }
    buffer[0] = CONTROL_DATA_STREAM;
    buffer[1..len].copy_from_slice(payload);
    Ok(&buffer[..len])
}

/// Returns the page-start opcode for `page`.
pub fn page_start(page: u16) -> u8 {
    cmd::SET_PAGE_START_ADDR | (page as u8 & 0x07)
}

/// Builds the power-up sequence, one opcode or parameter per transaction.
///
/// Follows the SSD1306 application note: display off, geometry and
/// addressing, analogue settings, charge pump, display on.
pub fn init_sequence(
    geometry: Geometry,
    orientation: Orientation,
) -> [u8; INIT_TRANSACTION_COUNT] {
    [
        cmd::DISPLAY_OFF,
        cmd::SET_MUX_RATIO,
        (geometry.height() - 1) as u8,
        cmd::SET_MEM_ADDR_MODE,
        cmd::PAGE_ADDR_MODE,
        cmd::SET_LOWER_COL_ADDR,
        cmd::SET_HIGHER_COL_ADDR,
        page_start(0),
        cmd::SET_DISPLAY_OFFSET,
        0x00,
        cmd::SET_DISPLAY_START_LINE,
        orientation.segment_remap(),
        orientation.com_scan_direction(),
        // Alternative COM pin configuration, no left/right remap.
        cmd::SET_COM_PINS_HW_CONFIG,
        0x12,
        cmd::SET_CONTRAST,
        0xFF,
        cmd::ENTIRE_DISPLAY_RESUME,
        cmd::SET_NORMAL_DISPLAY,
        cmd::SET_DISPLAY_CLOCK_DIVIDE,
        0xF0,
        cmd::SET_PRECHARGE_PERIOD,
        0x22,
        // ~0.77 x Vcc
        cmd::SET_VCOMH_DESELECT_LEVEL,
        0x20,
        cmd::CHARGE_PUMP_SETTING,
        cmd::CHARGE_PUMP_ENABLED,
        cmd::DISPLAY_ON,
    ]
}
