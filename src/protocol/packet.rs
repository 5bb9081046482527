//! Byte-frame assembly for the curtain controller's wire protocol.

use super::ProtocolError;

/// Every frame starts with this byte.
pub const FRAME_HEADER: u8 = 0xAA;

/// The length field is one byte, so payloads cap out at 255.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Checksum over the header byte and the payload, mod 256.
///
/// The type and length bytes never enter the sum. That is what the
/// firmware computes, not an oversight; change it and the device drops
/// every frame.
pub fn checksum(payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(FRAME_HEADER as u32, |sum, &byte| (sum + byte as u32) % 256) as u8
}

/// Assemble `header | type | length | payload | checksum`.
pub fn build_frame(packet_type: u8, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLong { len: payload.len() });
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(FRAME_HEADER);
    frame.push(packet_type);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(checksum(payload));

    Ok(frame)
}

/// Render a frame as `0xAA 0x02 ...` for dry runs and debug dumps. Not
/// part of the wire contract.
pub fn render_hex(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|byte| format!("0x{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
