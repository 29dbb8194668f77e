//! Color model: device intensity levels and the picker grid.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum per-channel intensity the device accepts.
pub const INTENSITY_MAX: u8 = 51;

/// The four per-channel brightness steps supported by the hardware.
pub const INTENSITY_LEVELS: [u8; 4] = [0, 17, 33, 51];

/// An RGB color with independent channels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Palette filling the color-table slots no mode overrides.
///
/// These are the seven triples the factory default programs into the device.
pub const DECORATIVE_PALETTE: [Color; 7] = [
    Color { r: 0, g: 51, b: 0 },
    Color { r: 0, g: 0, b: 51 },
    Color { r: 51, g: 0, b: 0 },
    Color { r: 51, g: 0, b: 51 },
    Color { r: 0, g: 51, b: 51 },
    Color { r: 51, g: 51, b: 0 },
    Color { r: 51, g: 51, b: 51 },
];

impl Color {
    /// All channels off.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Cap every channel at the maximum device intensity.
    ///
    /// Only an upper clamp is applied; channels are not rounded to the
    /// nearest supported level, matching device firmware behavior.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.min(INTENSITY_MAX),
            g: self.g.min(INTENSITY_MAX),
            b: self.b.min(INTENSITY_MAX),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse a `0xRRGGBB` hex color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .filter(|d| d.len() == 6)
            .ok_or_else(|| format!("expected a color of the form 0xRRGGBB, got '{s}'"))?;

        let packed =
            u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex color '{s}': {e}"))?;
        Ok(Color {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        })
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Map an 8×8 picker coordinate to a device color.
///
/// Red follows a quadrant rule (the grid splits at index 4 on both axes),
/// green tracks `i mod 4`, blue tracks `j mod 4`, each indexing the four
/// intensity levels. Coordinates past the grid saturate at 7.
///
/// This is a presentation convenience for palette-picker front ends, not
/// part of the wire contract.
pub fn grid_color(i: u8, j: u8) -> Color {
    let i = i.min(7) as usize;
    let j = j.min(7) as usize;
    Color {
        r: INTENSITY_LEVELS[(i / 4) * 2 + j / 4],
        g: INTENSITY_LEVELS[i % 4],
        b: INTENSITY_LEVELS[j % 4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_caps_each_channel_at_max() {
        let c = Color::new(255, 52, 128).clamped();
        assert_eq!(c, Color::new(51, 51, 51));
    }

    #[test]
    fn clamp_leaves_low_channels_unchanged() {
        let c = Color::new(0, 17, 51).clamped();
        assert_eq!(c, Color::new(0, 17, 51));
        // No rounding toward a level: 18 stays 18.
        assert_eq!(Color::new(18, 34, 50).clamped(), Color::new(18, 34, 50));
    }

    #[test]
    fn parse_hex_color() {
        assert_eq!("0x330033".parse::<Color>().unwrap(), Color::new(0x33, 0x00, 0x33));
        assert_eq!("0x000000".parse::<Color>().unwrap(), Color::BLACK);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("330033".parse::<Color>().is_err());
        assert!("0x33003".parse::<Color>().is_err());
        assert!("0x33003344".parse::<Color>().is_err());
        assert!("0xgg0033".parse::<Color>().is_err());
    }

    #[test]
    fn display_roundtrips() {
        let c = Color::new(51, 0, 17);
        assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
    }

    #[test]
    fn grid_origin_is_black() {
        assert_eq!(grid_color(0, 0), Color::BLACK);
    }

    #[test]
    fn grid_far_corner_is_full_intensity() {
        assert_eq!(grid_color(7, 7), Color::new(51, 51, 51));
    }

    #[test]
    fn grid_red_follows_quadrants() {
        assert_eq!(grid_color(0, 0).r, 0);
        assert_eq!(grid_color(0, 4).r, 17);
        assert_eq!(grid_color(4, 0).r, 33);
        assert_eq!(grid_color(4, 4).r, 51);
    }

    #[test]
    fn grid_green_blue_cycle_every_four() {
        for i in 0..8u8 {
            for j in 0..8u8 {
                let c = grid_color(i, j);
                assert_eq!(c.g, INTENSITY_LEVELS[(i % 4) as usize]);
                assert_eq!(c.b, INTENSITY_LEVELS[(j % 4) as usize]);
            }
        }
    }

    #[test]
    fn grid_saturates_out_of_range() {
        assert_eq!(grid_color(8, 200), grid_color(7, 7));
    }
}
