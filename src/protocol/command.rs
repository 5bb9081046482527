//! The command catalog: one encodable variant per user-facing command.

use rand::Rng;

use crate::color::{Hsl, PaletteColor, PALETTE};
use crate::grid::{self, PIXEL_COUNT};

use super::{packet, ProtocolError};

// Power on/off and pause share a tag; the payload tells them apart.
const TYPE_POWER: u8 = 0x02;
const TYPE_PRESET: u8 = 0x03;
const TYPE_PIXEL_SINGLE: u8 = 0xD1;
const TYPE_PIXEL_MODE: u8 = 0xD0;
const TYPE_PIXEL_FILL: u8 = 0xDA;

/// Most pixel slots one fill payload can carry: 3 bytes per slot times 77
/// plus the 3 lead-in bytes is 234, inside the one-byte length field.
pub const MAX_FILL_SLOTS: usize = 77;

/// Animation speed used when a preset does not name one.
pub const DEFAULT_PRESET_SPEED: u8 = 10;

/// One outbound command. Built once, encoded once, discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Power { on: bool },
    Pause,
    Preset { id: u8, brightness: u8, speed: u8 },
    FullColor { hue: u16, saturation: u16, lightness: u16 },
    PixelSingle { x: u8, y: u8, color: PaletteColor },
    PixelClear,
    PixelDraw,
    PixelFill { colors: Vec<u8>, offset: u16 },
    PixelFillRandom { offset: u16 },
}

impl Command {
    /// FullColor from an RGB triple, converted through HSL.
    pub fn full_color(r: u8, g: u8, b: u8) -> Self {
        let hsl = Hsl::from_rgb(r, g, b);
        Command::FullColor {
            hue: hsl.hue,
            saturation: hsl.saturation,
            lightness: hsl.lightness,
        }
    }

    /// A one-frame solid fill starting at `offset`, clamped so no slot
    /// addresses a cell past the end of the buffer.
    pub fn solid_fill(color: PaletteColor, offset: u16) -> Result<Self, ProtocolError> {
        let count = fill_span(offset)?;
        Ok(Command::PixelFill {
            colors: vec![color.device_byte(); count],
            offset,
        })
    }

    pub fn packet_type(&self) -> u8 {
        match self {
            Command::Power { .. } | Command::Pause => TYPE_POWER,
            Command::Preset { .. } | Command::FullColor { .. } => TYPE_PRESET,
            Command::PixelSingle { .. } => TYPE_PIXEL_SINGLE,
            Command::PixelClear | Command::PixelDraw => TYPE_PIXEL_MODE,
            Command::PixelFill { .. } | Command::PixelFillRandom { .. } => TYPE_PIXEL_FILL,
        }
    }

    /// Build the command's payload. `rng` feeds random fills; every other
    /// variant ignores it.
    pub fn payload<R: Rng>(&self, rng: &mut R) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Command::Power { on } => Ok(vec![if *on { 0x01 } else { 0x00 }]),
            Command::Pause => Ok(vec![0x02, 0x00]),
            Command::Preset { id, brightness, speed } => {
                Ok(vec![0x02, *id, *brightness, *speed])
            }
            Command::FullColor { hue, saturation, lightness } => {
                let mut payload = vec![0x01];
                payload.extend_from_slice(&hue.to_be_bytes());
                payload.extend_from_slice(&saturation.to_be_bytes());
                payload.extend_from_slice(&lightness.to_be_bytes());
                Ok(payload)
            }
            Command::PixelSingle { x, y, color } => {
                let index = grid::pixel_index(*x, *y)?;
                let mut payload = index.to_be_bytes().to_vec();
                payload.push(color.device_byte());
                Ok(payload)
            }
            Command::PixelClear => Ok(vec![0x00, 0x64, 0x64, 0x03]),
            Command::PixelDraw => Ok(vec![0x00, 0x64, 0x64, 0x00]),
            Command::PixelFill { colors, offset } => {
                check_fill(*offset, colors.len())?;
                let mut payload = fill_lead_in(colors.len());
                for (i, &color) in colors.iter().enumerate() {
                    push_slot(&mut payload, color, offset + i as u16);
                }
                Ok(payload)
            }
            Command::PixelFillRandom { offset } => {
                let count = fill_span(*offset)?;
                let mut payload = fill_lead_in(count);
                for i in 0..count {
                    // A fresh draw per slot; nothing is memoized.
                    let color = PALETTE[rng.gen_range(0..PALETTE.len())];
                    push_slot(&mut payload, color.device_byte(), offset + i as u16);
                }
                Ok(payload)
            }
        }
    }

    /// Encode the command as a complete wire frame.
    pub fn encode<R: Rng>(&self, rng: &mut R) -> Result<Vec<u8>, ProtocolError> {
        packet::build_frame(self.packet_type(), &self.payload(rng)?)
    }
}

/// Lead-in bytes shared by every fill payload.
fn fill_lead_in(slots: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(3 + 3 * slots);
    payload.extend_from_slice(&[0x01, 0x00, 0x00]);
    payload
}

fn push_slot(payload: &mut Vec<u8>, color: u8, index: u16) {
    payload.push(color);
    payload.extend_from_slice(&index.to_be_bytes());
}

/// How many slots a fill starting at `offset` may carry without leaving
/// the pixel buffer.
fn fill_span(offset: u16) -> Result<usize, ProtocolError> {
    if !grid::index_in_bounds(offset) {
        return Err(ProtocolError::FillOffsetOutOfRange { offset });
    }
    Ok(MAX_FILL_SLOTS.min(PIXEL_COUNT - offset as usize))
}

fn check_fill(offset: u16, count: usize) -> Result<(), ProtocolError> {
    if count > MAX_FILL_SLOTS {
        return Err(ProtocolError::TooManyFillSlots { count });
    }
    if offset as usize + count > PIXEL_COUNT {
        return Err(ProtocolError::FillOutOfRange { offset, count });
    }
    Ok(())
}
