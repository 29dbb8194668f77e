//! Command frame and report block encoding.
//!
//! The device speaks two wire shapes:
//! - 8-byte command frames carried by vendor control transfers, closed by a
//!   checksum byte equal to `0xFF - (sum of the first seven bytes mod 256)`;
//! - 32-byte raw blocks written to the output endpoint with no framing and
//!   no checksum.
//!
//! Protocol knowledge reverse-engineered from USB captures of the vendor
//! Windows tool.

use crate::color::{Color, DECORATIVE_PALETTE};
use crate::error::{Error, Result};

/// Command frame length, checksum included.
pub const FRAME_LEN: usize = 8;

/// Raw report block length.
pub const BLOCK_LEN: usize = 32;

/// Color triples carried by one color-table block.
pub const COLOR_SLOTS: usize = 7;

/// Trailer bytes following the seven triples in a color-table block.
pub const TRAILER_LEN: usize = BLOCK_LEN - 3 * COLOR_SLOTS;

/// Checksum closing an 8-byte command frame.
///
/// The device accepts a frame iff its final byte equals
/// `0xFF - (sum of bytes[0..7] mod 256)`, i.e. the bitwise complement of
/// the low byte of the prefix sum.
pub fn checksum_of(prefix: &[u8; FRAME_LEN - 1]) -> u8 {
    let sum = prefix.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

/// An 8-byte checksummed command frame.
///
/// Layout: `[opcode, mode_code, p0, p1, p2, p3, p4, checksum]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    /// Build a frame from an opcode, a mode code, and five parameter bytes.
    ///
    /// The checksum is always computed here; externally supplied checksums
    /// are never accepted, so every constructed frame is well-formed.
    pub fn new(opcode: u8, mode_code: u8, params: [u8; 5]) -> Self {
        let mut prefix = [0u8; FRAME_LEN - 1];
        prefix[0] = opcode;
        prefix[1] = mode_code;
        prefix[2..].copy_from_slice(&params);

        let mut bytes = [0u8; FRAME_LEN];
        bytes[..FRAME_LEN - 1].copy_from_slice(&prefix);
        bytes[FRAME_LEN - 1] = checksum_of(&prefix);
        Self(bytes)
    }

    /// Frame opcode (first byte).
    pub fn opcode(&self) -> u8 {
        self.0[0]
    }

    /// Raw wire bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

/// A 32-byte unchecksummed report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock([u8; BLOCK_LEN]);

impl RawBlock {
    /// Wrap a fixed 32-byte payload.
    pub const fn from_bytes(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw wire bytes.
    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }
}

/// Pack a color-table block: up to seven RGB triples followed by an
/// 11-byte trailer.
///
/// Each channel is capped at the maximum device intensity before packing.
/// Slots not covered by `colors` are filled positionally from
/// [`DECORATIVE_PALETTE`].
///
/// Fails with [`Error::InvalidLength`] if the packed triples plus trailer
/// would not total exactly 32 bytes (more than seven colors, or a trailer
/// that is not 11 bytes).
pub fn make_color_block(colors: &[Color], trailer: &[u8]) -> Result<RawBlock> {
    let total = 3 * colors.len().max(COLOR_SLOTS) + trailer.len();
    if total != BLOCK_LEN {
        return Err(Error::InvalidLength {
            expected: BLOCK_LEN,
            actual: total,
        });
    }

    let mut bytes = [0u8; BLOCK_LEN];
    for (slot, chunk) in bytes[..3 * COLOR_SLOTS].chunks_exact_mut(3).enumerate() {
        let color = colors
            .get(slot)
            .copied()
            .unwrap_or(DECORATIVE_PALETTE[slot])
            .clamped();
        chunk.copy_from_slice(&[color.r, color.g, color.b]);
    }
    bytes[3 * COLOR_SLOTS..].copy_from_slice(trailer);
    Ok(RawBlock(bytes))
}
