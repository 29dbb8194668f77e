//! Saved lighting profiles.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::mode::LightingMode;

/// A saved lighting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Profile display name.
    pub name: String,
    /// Lighting mode, including any floating parameters.
    pub mode: LightingMode,
    /// User color (ignored for `Off`).
    pub color: Color,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            mode: LightingMode::Solid,
            color: Color::new(0, 51, 0),
        }
    }
}

/// Profile storage location:
/// `$XDG_CONFIG_HOME/open-vmouse-rgb/profile.json`, falling back to
/// `~/.config`.
pub fn profile_path() -> Result<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok_or_else(|| Error::Profile("neither XDG_CONFIG_HOME nor HOME is set".to_string()))?;
    Ok(base.join("open-vmouse-rgb").join("profile.json"))
}

/// Save a profile to the default location, creating parent directories.
pub fn save_profile(profile: &Profile) -> Result<()> {
    let path = profile_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Profile(format!("create {}: {e}", parent.display())))?;
    }
    let json = serde_json::to_string_pretty(profile)
        .map_err(|e| Error::Profile(format!("serialize profile: {e}")))?;
    fs::write(&path, json).map_err(|e| Error::Profile(format!("write {}: {e}", path.display())))
}

/// Load the saved profile.
pub fn load_profile() -> Result<Profile> {
    let path = profile_path()?;
    let json = fs::read_to_string(&path)
        .map_err(|e| Error::Profile(format!("read {}: {e}", path.display())))?;
    serde_json::from_str(&json).map_err(|e| Error::Profile(format!("parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Direction;

    #[test]
    fn profile_serialization_roundtrip() {
        let profile = Profile {
            name: "night".into(),
            mode: LightingMode::Floating {
                speed: 3,
                direction: Direction::Up,
            },
            color: Color::new(0, 17, 33),
        };
        let json = serde_json::to_string(&profile).expect("serialize profile");
        let back: Profile = serde_json::from_str(&json).expect("deserialize profile");
        assert_eq!(back.name, profile.name);
        assert_eq!(back.mode, profile.mode);
        assert_eq!(back.color, profile.color);
    }

    #[test]
    fn default_profile_is_solid_green() {
        let p = Profile::default();
        assert_eq!(p.mode, LightingMode::Solid);
        assert_eq!(p.color, Color::new(0, 51, 0));
    }

    #[test]
    fn profile_path_is_under_the_config_dir() {
        if std::env::var_os("XDG_CONFIG_HOME").is_none() && std::env::var_os("HOME").is_none() {
            return;
        }
        let path = profile_path().unwrap();
        assert!(path.ends_with("open-vmouse-rgb/profile.json"));
    }
}
