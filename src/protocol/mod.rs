pub mod command;
pub mod packet;

pub use command::{Command, DEFAULT_PRESET_SPEED, MAX_FILL_SLOTS};
pub use packet::render_hex;

use thiserror::Error;

/// Errors raised while building commands and frames. All of them are
/// caller mistakes caught before anything touches the wire; none are
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame's length field is a single byte.
    #[error("payload is {len} bytes; a frame carries at most 255")]
    PayloadTooLong { len: usize },

    #[error("pixel ({x}, {y}) is outside the 20x20 grid")]
    CoordinateOutOfRange { x: u8, y: u8 },

    #[error("fill offset {offset} is past the last pixel index 399")]
    FillOffsetOutOfRange { offset: u16 },

    #[error("fill of {count} slots at offset {offset} runs past the 400-pixel buffer")]
    FillOutOfRange { offset: u16, count: usize },

    #[error("{count} fill slots will not fit in one frame; the limit is 77")]
    TooManyFillSlots { count: usize },

    #[error("image is {width}x{height}; the panel takes exactly 20x20")]
    BadImageDimensions { width: u32, height: u32 },

    #[error("unknown color name {0:?}")]
    UnknownColor(String),
}
