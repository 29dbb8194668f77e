//! Transport abstraction for device writes.
//!
//! The session core performs no USB I/O of its own; callers supply a
//! transport with the two write primitives the protocol needs, so real
//! devices and mocks share the same interface.

use crate::error::Result;
use crate::frame::{CommandFrame, RawBlock};

/// Abstraction over the two device write primitives.
///
/// `control_write` issues one 8-byte command frame as a vendor-class
/// control transfer; `report_write` pushes one 32-byte block to the given
/// OUT endpoint.
///
/// The transport is exclusively borrowed for the duration of one session.
/// Sessions must not be interleaved against the same device; callers
/// running sessions from multiple threads serialize them externally (a
/// single mutex around the transport is sufficient).
pub trait Transport: Send {
    /// Write one command frame over the control channel.
    fn control_write(&self, frame: &CommandFrame) -> Result<()>;

    /// Write one raw block to an output endpoint.
    fn report_write(&self, endpoint: u8, block: &RawBlock) -> Result<()>;
}
