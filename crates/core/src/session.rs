//! Lighting session: the ordered protocol exchange applying one mode.
//!
//! Every mode change has the same five-phase shape: open the control
//! channel, select the mode, commit the timing table, push the color
//! table, close the channel. The device is a stateful endpoint that
//! expects exactly this order; reordering or interleaving phases yields
//! undefined device behavior.
//!
//! There is no retry and no resume. A failed write aborts the session,
//! the error propagates verbatim, and the device may be left in an
//! indeterminate intermediate state — the caller recovers by re-applying
//! or issuing [`factory_reset`].

use tracing::{debug, trace};

use crate::color::{Color, DECORATIVE_PALETTE};
use crate::error::Result;
use crate::frame::{make_color_block, CommandFrame, RawBlock, BLOCK_LEN, TRAILER_LEN};
use crate::mode::{Direction, LightingMode, SPEED_MAX};
use crate::transport::Transport;
use crate::OUT_ENDPOINT;

/// An immutable lighting change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingRequest {
    pub mode: LightingMode,
    pub color: Color,
}

/// Block sent while opening the control channel.
const CHANNEL_SETUP: RawBlock = RawBlock::from_bytes([
    0x01, 0x02, 0x03, 0x04, 0x05, 0x80, 0x80, 0x80, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
]);

/// Header block announcing the palette data that follows.
const PALETTE_HEADER: RawBlock = RawBlock::from_bytes([
    0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
]);

/// Baseline device timing/mode table.
///
/// Only offsets 6..=9 vary between sessions: sub-mode, mode-select, and
/// (floating mode only) speed and direction. The factory default leaves
/// the table untouched.
const MODE_PARAMS: [u8; BLOCK_LEN] = [
    0x0F, 0x04, 0x0A, 0x0A, 0x19, 0x19, 0x05, 0x03, //
    0x05, 0x00, 0x64, 0x64, 0x01, 0xC0, 0xF0, 0x03, //
    0x01, 0x01, 0x64, 0x00, 0x02, 0x03, 0x04, 0x05, //
    0x06, 0x07, 0x07, 0x07, 0x02, 0x03, 0x04, 0x05,
];

/// Offset of the sub-mode byte within the mode-parameter block.
const SUB_MODE_OFFSET: usize = 6;
/// Offset of the mode-select byte.
const MODE_SELECT_OFFSET: usize = 7;
/// Offset of the floating-animation speed level.
const SPEED_OFFSET: usize = 8;
/// Offset of the floating-animation direction flag.
const DIRECTION_OFFSET: usize = 9;

/// Blocks restoring the device event/report bindings as the channel closes.
const CLOSE_BINDINGS: [RawBlock; 2] = [
    RawBlock::from_bytes([
        0x01, 0x00, 0xF0, 0x00, 0x01, 0x00, 0xF1, 0x00, //
        0x01, 0x00, 0xF2, 0x00, 0x01, 0x00, 0xF3, 0x00, //
        0x01, 0x00, 0xF4, 0x00, 0x07, 0x00, 0x03, 0x00, //
        0x0A, 0xF0, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00,
    ]),
    RawBlock::from_bytes([
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x04, 0x00, 0x02, 0x00, 0x04, 0x00, 0x01, 0x00,
    ]),
];

/// Mode code announcing "color table follows" for a regular apply.
const SELECT_APPLY: u8 = 0x01;
/// Mode code for the factory-default flow.
const SELECT_FACTORY: u8 = 0x02;

/// Offset of the marker byte distinguishing the neon trailer from the
/// breathe trailer. Opaque; its device-side meaning is not established.
const NEON_TRAILER_OFFSET: usize = 3;
const NEON_TRAILER_MARK: u8 = 0x01;

/// Everything that varies between sessions, resolved before any write.
struct SessionPlan {
    select_code: u8,
    mode_code: u8,
    sub_code: u8,
    /// Speed and direction, floating mode only.
    floating: Option<(u8, Direction)>,
    colors: Vec<Color>,
    trailer: [u8; TRAILER_LEN],
}

fn plan(request: &LightingRequest) -> SessionPlan {
    let mode = request.mode;

    // Off is solid with all channels dark; the requested color is ignored.
    let color = match mode {
        LightingMode::Off => Color::BLACK,
        _ => request.color.clamped(),
    };

    // Solid fills two triples with the user color, the animated modes four;
    // the rest of the table stays decorative.
    let user_slots = match mode {
        LightingMode::Off | LightingMode::Solid => 2,
        LightingMode::Breathe | LightingMode::Floating { .. } | LightingMode::Neon => 4,
    };

    let mut trailer = [0u8; TRAILER_LEN];
    match mode {
        LightingMode::Breathe | LightingMode::Floating { .. } => {
            trailer[..3].copy_from_slice(&[color.r, color.g, color.b]);
        }
        LightingMode::Neon => trailer[NEON_TRAILER_OFFSET] = NEON_TRAILER_MARK,
        LightingMode::Off | LightingMode::Solid => {}
    }

    SessionPlan {
        select_code: SELECT_APPLY,
        mode_code: mode.code(),
        sub_code: mode.sub_code(),
        floating: match mode {
            LightingMode::Floating { speed, direction } => {
                Some((speed.min(SPEED_MAX), direction))
            }
            _ => None,
        },
        colors: vec![color; user_slots],
        trailer,
    }
}

fn factory_plan() -> SessionPlan {
    SessionPlan {
        select_code: SELECT_FACTORY,
        mode_code: MODE_PARAMS[MODE_SELECT_OFFSET],
        sub_code: MODE_PARAMS[SUB_MODE_OFFSET],
        floating: None,
        colors: DECORATIVE_PALETTE.to_vec(),
        trailer: [0u8; TRAILER_LEN],
    }
}

fn mode_param_block(plan: &SessionPlan) -> RawBlock {
    let mut bytes = MODE_PARAMS;
    bytes[SUB_MODE_OFFSET] = plan.sub_code;
    bytes[MODE_SELECT_OFFSET] = plan.mode_code;
    if let Some((speed, direction)) = plan.floating {
        bytes[SPEED_OFFSET] = speed;
        bytes[DIRECTION_OFFSET] = direction.code();
    }
    RawBlock::from_bytes(bytes)
}

/// Apply a lighting mode to the device.
///
/// Runs the full five-phase exchange in order:
/// 1. open the control channel
/// 2. select the mode
/// 3. commit the timing table
/// 4. push the color table
/// 5. close the channel
///
/// Success means all five phases completed; there is no partial-success
/// state. A transport failure aborts immediately — see the module docs for
/// the recovery path.
pub fn apply(transport: &dyn Transport, request: &LightingRequest) -> Result<()> {
    debug!(
        mode = request.mode.label(),
        color = %request.color,
        "Applying lighting mode"
    );
    run(transport, &plan(request))
}

/// Restore the factory-default lighting configuration.
///
/// Same five-phase exchange as [`apply`] with the reset mode code and the
/// full decorative palette in place of a user color.
pub fn factory_reset(transport: &dyn Transport) -> Result<()> {
    debug!("Resetting lighting to factory default");
    run(transport, &factory_plan())
}

fn run(transport: &dyn Transport, plan: &SessionPlan) -> Result<()> {
    open_channel(transport)?;
    select_mode(transport, plan)?;
    commit_timing(transport, plan)?;
    push_color_table(transport, plan)?;
    close_channel(transport)
}

fn send_frame(transport: &dyn Transport, frame: CommandFrame) -> Result<()> {
    trace!(frame_hex = format_args!("{:02X?}", frame.as_bytes()), "control TX");
    transport.control_write(&frame)
}

fn send_block(transport: &dyn Transport, block: &RawBlock) -> Result<()> {
    trace!(block_hex = format_args!("{:02X?}", block.as_bytes()), "report TX");
    transport.report_write(OUT_ENDPOINT, block)
}

fn open_channel(transport: &dyn Transport) -> Result<()> {
    debug!("Opening control channel");
    send_frame(transport, CommandFrame::new(0x03, 0x01, [0x0F, 0xD8, 0x40, 0x00, 0x00]))?;
    send_frame(transport, CommandFrame::new(0x01, 0x02, [0x00; 5]))?;
    send_frame(transport, CommandFrame::new(0x11, 0x05, [0x08, 0x00, 0x00, 0x00, 0x00]))?;
    send_block(transport, &CHANNEL_SETUP)?;
    send_frame(transport, CommandFrame::new(0x0B, 0x02, [0x08, 0x00, 0x00, 0x00, 0x00]))
}

fn select_mode(transport: &dyn Transport, plan: &SessionPlan) -> Result<()> {
    debug!(
        mode_code = plan.mode_code,
        sub_code = plan.sub_code,
        "Selecting mode"
    );
    send_frame(transport, CommandFrame::new(0x0C, plan.select_code, [0x08, 0x00, 0x00, 0x00, 0x00]))?;
    send_block(transport, &PALETTE_HEADER)?;
    send_block(transport, &mode_param_block(plan))
}

fn commit_timing(transport: &dyn Transport, plan: &SessionPlan) -> Result<()> {
    debug!("Committing timing table");
    send_frame(transport, CommandFrame::new(0x0D, plan.mode_code, [plan.sub_code, 0x00, 0x00, 0x00, 0x00]))?;
    send_frame(transport, CommandFrame::new(0x10, 0x01, [0x18, 0x00, 0x00, 0x00, 0x00]))
}

fn push_color_table(transport: &dyn Transport, plan: &SessionPlan) -> Result<()> {
    debug!(user_slots = plan.colors.len(), "Pushing color table");
    let block = make_color_block(&plan.colors, &plan.trailer)?;
    send_block(transport, &block)
}

fn close_channel(transport: &dyn Transport) -> Result<()> {
    debug!("Closing control channel");
    send_frame(transport, CommandFrame::new(0x12, 0x01, [0x40, 0x00, 0x00, 0x00, 0x00]))?;
    for block in &CLOSE_BINDINGS {
        send_block(transport, block)?;
    }
    Ok(())
}
