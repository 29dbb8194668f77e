//! open-vmouse-rgb CLI: command-line lighting control.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rusb::{DeviceHandle, GlobalContext};
use tracing::{debug, info};

use open_vmouse_rgb_core::color::{grid_color, Color};
use open_vmouse_rgb_core::error::Error;
use open_vmouse_rgb_core::frame::{CommandFrame, RawBlock};
use open_vmouse_rgb_core::mode::{Direction, LightingMode, DEFAULT_SPEED};
use open_vmouse_rgb_core::profile::{self, Profile};
use open_vmouse_rgb_core::session::{self, LightingRequest};
use open_vmouse_rgb_core::transport::Transport;
use open_vmouse_rgb_core::{CONTROL_INTERFACE, JTECH_VID, VMOUSE_PID};

/// Control transfer constants for the lighting interface (HID SET_REPORT,
/// feature report, interface 2).
const CTRL_REQUEST_TYPE: u8 = 0x21;
const CTRL_REQUEST: u8 = 0x09;
const CTRL_VALUE: u16 = 0x0300;
const CTRL_INDEX: u16 = 0x0002;

const IO_TIMEOUT: Duration = Duration::from_secs(1);

/// rusb-backed transport owning the claimed lighting interface.
struct UsbTransport {
    handle: DeviceHandle<GlobalContext>,
    reattach_kernel_driver: bool,
}

impl UsbTransport {
    /// Open the mouse and claim its lighting interface.
    ///
    /// An active kernel driver is detached first and reattached on drop.
    fn open() -> Result<Self, Error> {
        let handle = rusb::open_device_with_vid_pid(JTECH_VID, VMOUSE_PID).ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "no USB device {JTECH_VID:04x}:{VMOUSE_PID:04x}; is the mouse plugged in?"
            ))
        })?;

        let mut transport = Self {
            handle,
            reattach_kernel_driver: false,
        };

        if transport
            .handle
            .kernel_driver_active(CONTROL_INTERFACE)
            .unwrap_or(false)
        {
            debug!(interface = CONTROL_INTERFACE, "Detaching kernel driver");
            transport
                .handle
                .detach_kernel_driver(CONTROL_INTERFACE)
                .map_err(|e| Error::ChannelClaim(format!("detach kernel driver: {e}")))?;
            transport.reattach_kernel_driver = true;
        }

        transport
            .handle
            .claim_interface(CONTROL_INTERFACE)
            .map_err(|e| Error::ChannelClaim(format!("claim interface {CONTROL_INTERFACE}: {e}")))?;
        transport
            .handle
            .set_alternate_setting(CONTROL_INTERFACE, 0)
            .map_err(|e| Error::ChannelClaim(format!("set alternate setting: {e}")))?;

        info!("Mouse found, control interface claimed");
        Ok(transport)
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        let _ = self.handle.release_interface(CONTROL_INTERFACE);
        if self.reattach_kernel_driver {
            let _ = self.handle.attach_kernel_driver(CONTROL_INTERFACE);
        }
    }
}

impl Transport for UsbTransport {
    fn control_write(&self, frame: &CommandFrame) -> open_vmouse_rgb_core::error::Result<()> {
        self.handle
            .write_control(
                CTRL_REQUEST_TYPE,
                CTRL_REQUEST,
                CTRL_VALUE,
                CTRL_INDEX,
                frame.as_bytes(),
                IO_TIMEOUT,
            )
            .map_err(|e| Error::Transport(format!("control write: {e}")))?;
        Ok(())
    }

    fn report_write(&self, endpoint: u8, block: &RawBlock) -> open_vmouse_rgb_core::error::Result<()> {
        self.handle
            .write_interrupt(endpoint, block.as_bytes(), IO_TIMEOUT)
            .map_err(|e| Error::Transport(format!("write endpoint 0x{endpoint:02x}: {e}")))?;
        Ok(())
    }
}

#[derive(Parser)]
#[command(
    name = "open-vmouse-rgb",
    version,
    about = "RGB lighting control for J-Tech style vertical mice"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected vertical mice.
    List,
    /// Apply a lighting mode.
    Set {
        /// Mode: off, solid, breathe, floating, neon.
        mode: String,
        /// Color as 0xRRGGBB (each channel capped at 0x33).
        #[arg(default_value_t = Color::new(0, 51, 0))]
        color: Color,
        /// Animation speed level (floating mode only).
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: u8,
        /// Animate upward instead of downward (floating mode only).
        #[arg(long)]
        up: bool,
    },
    /// Turn the lighting off.
    Off,
    /// Restore the factory default configuration.
    Reset,
    /// Print the 8x8 picker palette as hex colors.
    Grid,
    /// Save a mode and color to the profile file without touching the device.
    Save {
        /// Mode: off, solid, breathe, floating, neon.
        mode: String,
        /// Color as 0xRRGGBB (each channel capped at 0x33).
        #[arg(default_value_t = Color::new(0, 51, 0))]
        color: Color,
        /// Animation speed level (floating mode only).
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: u8,
        /// Animate upward instead of downward (floating mode only).
        #[arg(long)]
        up: bool,
    },
    /// Load the saved profile and apply it.
    Load,
}

/// Resolve a mode name plus the floating flags into a concrete mode.
fn parse_mode(name: &str, speed: u8, up: bool) -> Result<LightingMode> {
    let mode = LightingMode::from_name(name).ok_or_else(|| {
        anyhow::anyhow!("unknown mode '{name}'; expected off, solid, breathe, floating, or neon")
    })?;
    Ok(match mode {
        LightingMode::Floating { .. } => LightingMode::Floating {
            speed,
            direction: if up { Direction::Up } else { Direction::Down },
        },
        other => other,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let devices = rusb::devices().map_err(|e| anyhow::anyhow!("enumerate USB: {e}"))?;
            let mut found = 0;
            for device in devices.iter() {
                let descriptor = match device.device_descriptor() {
                    Ok(d) => d,
                    Err(_) => continue,
                };
                if descriptor.vendor_id() == JTECH_VID && descriptor.product_id() == VMOUSE_PID {
                    println!(
                        "Vertical mouse at bus {:03} device {:03} (VID 0x{:04X}, PID 0x{:04X})",
                        device.bus_number(),
                        device.address(),
                        descriptor.vendor_id(),
                        descriptor.product_id()
                    );
                    found += 1;
                }
            }
            if found == 0 {
                println!("No vertical mouse found.");
                println!("Ensure the mouse is plugged in and udev permissions allow access.");
            }
        }
        Commands::Set { mode, color, speed, up } => {
            let mode = parse_mode(&mode, speed, up)?;
            let transport = UsbTransport::open()?;
            session::apply(&transport, &LightingRequest { mode, color })?;
            println!("Applied {mode} ({color})");
        }
        Commands::Off => {
            let transport = UsbTransport::open()?;
            session::apply(
                &transport,
                &LightingRequest {
                    mode: LightingMode::Off,
                    color: Color::BLACK,
                },
            )?;
            println!("Lighting off");
        }
        Commands::Reset => {
            let transport = UsbTransport::open()?;
            session::factory_reset(&transport)?;
            println!("Factory default restored");
        }
        Commands::Grid => {
            for i in 0..8 {
                let row: Vec<String> = (0..8).map(|j| grid_color(i, j).to_string()).collect();
                println!("{}", row.join(" "));
            }
        }
        Commands::Save { mode, color, speed, up } => {
            let mode = parse_mode(&mode, speed, up)?;
            let saved = Profile {
                name: mode.label().to_string(),
                mode,
                color,
            };
            profile::save_profile(&saved)?;
            println!("Profile saved to {}", profile::profile_path()?.display());
        }
        Commands::Load => {
            let saved = profile::load_profile()?;
            let transport = UsbTransport::open()?;
            session::apply(
                &transport,
                &LightingRequest {
                    mode: saved.mode,
                    color: saved.color,
                },
            )?;
            println!("Applied profile '{}'", saved.name);
        }
    }

    Ok(())
}
