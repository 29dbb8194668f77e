//! Lighting modes and their wire encoding.

use serde::{Deserialize, Serialize};

/// Animation direction for the floating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction flag as encoded in the mode-parameter block.
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Up => 0x01,
            Self::Down => 0x00,
        }
    }
}

/// Floating-animation speed programmed by the factory default.
pub const DEFAULT_SPEED: u8 = 5;

/// Highest speed level accepted by the encoder; larger requests are capped.
pub const SPEED_MAX: u8 = 8;

/// Device lighting behaviors.
///
/// Only `Floating` carries parameters: a speed level and a direction flag.
/// `Off` is realized as `Solid` with all channels dark; the device exposes
/// no distinct off command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingMode {
    Off,
    Solid,
    Breathe,
    Floating { speed: u8, direction: Direction },
    Neon,
}

impl LightingMode {
    /// Mode-select byte carried in the mode-parameter block and echoed by
    /// the timing-commit frame.
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Off | Self::Solid => 0x01,
            Self::Breathe | Self::Neon => 0x02,
            Self::Floating { .. } => 0x03,
        }
    }

    /// Sub-mode byte paired with the mode-select byte.
    ///
    /// This is the byte distinguishing neon from breathe; its device-side
    /// meaning is not established, so it is carried as an opaque constant.
    pub(crate) fn sub_code(self) -> u8 {
        match self {
            Self::Neon => 0x06,
            _ => 0x05,
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Solid => "Solid",
            Self::Breathe => "Breathe",
            Self::Floating { .. } => "Floating",
            Self::Neon => "Neon",
        }
    }

    /// Parse a mode from a CLI-friendly string (case-insensitive).
    ///
    /// `Floating` is returned with the factory speed and downward
    /// direction; front ends override those from their own flags.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "off" => Some(Self::Off),
            "solid" | "static" => Some(Self::Solid),
            "breathe" | "breathing" => Some(Self::Breathe),
            "floating" | "float" => Some(Self::Floating {
                speed: DEFAULT_SPEED,
                direction: Direction::Down,
            }),
            "neon" => Some(Self::Neon),
            _ => None,
        }
    }
}

impl std::fmt::Display for LightingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_shares_the_solid_code() {
        assert_eq!(LightingMode::Off.code(), LightingMode::Solid.code());
    }

    #[test]
    fn neon_differs_from_breathe_only_in_sub_code() {
        assert_eq!(LightingMode::Breathe.code(), LightingMode::Neon.code());
        assert_ne!(LightingMode::Breathe.sub_code(), LightingMode::Neon.sub_code());
    }

    #[test]
    fn from_name_accepts_variants() {
        assert_eq!(LightingMode::from_name("off"), Some(LightingMode::Off));
        assert_eq!(LightingMode::from_name("Solid"), Some(LightingMode::Solid));
        assert_eq!(LightingMode::from_name("static"), Some(LightingMode::Solid));
        assert_eq!(LightingMode::from_name("BREATHING"), Some(LightingMode::Breathe));
        assert_eq!(LightingMode::from_name("neon"), Some(LightingMode::Neon));
        assert!(matches!(
            LightingMode::from_name("float"),
            Some(LightingMode::Floating { .. })
        ));
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(LightingMode::from_name("rainbow"), None);
        assert_eq!(LightingMode::from_name(""), None);
    }

    #[test]
    fn labels_non_empty() {
        for mode in [
            LightingMode::Off,
            LightingMode::Solid,
            LightingMode::Breathe,
            LightingMode::Floating { speed: 1, direction: Direction::Up },
            LightingMode::Neon,
        ] {
            assert!(!mode.label().is_empty());
        }
    }
}
