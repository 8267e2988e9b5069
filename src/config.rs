//! Configuration persistence for occlude settings

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Serializable RGBA color for config storage (0.0-1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl TapeColor {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels plus a float alpha
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// `#rrggbb` form, used in SVG text fills
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Colors of the three tape styles plus the drag preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapePalette {
    pub hidden_fill: TapeColor,
    pub hidden_border: TapeColor,
    pub selected_fill: TapeColor,
    pub selected_border: TapeColor,
    pub revealed_outline: TapeColor,
    pub preview_fill: TapeColor,
    pub preview_border: TapeColor,
    pub label: TapeColor,
}

impl Default for TapePalette {
    fn default() -> Self {
        Self {
            // Blue tape
            hidden_fill: TapeColor::from_rgb8(59, 130, 246, 0.9),
            hidden_border: TapeColor::from_rgb8(37, 99, 235, 1.0),
            // Red tape for the tape being edited
            selected_fill: TapeColor::from_rgb8(239, 68, 68, 0.9),
            selected_border: TapeColor::from_rgb8(220, 38, 38, 1.0),
            // Green outline once dealt with
            revealed_outline: TapeColor::from_rgb8(34, 197, 94, 0.7),
            // Translucent green while dragging
            preview_fill: TapeColor::from_rgb8(34, 197, 94, 0.5),
            preview_border: TapeColor::from_rgb8(22, 163, 74, 1.0),
            label: TapeColor::rgba(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccludeConfig {
    /// Tapes must be strictly larger than this on both sides (image pixels)
    #[serde(default = "default_min_tape_size")]
    pub min_tape_size: f32,
    #[serde(default)]
    pub palette: TapePalette,
    /// Border width of hidden tapes
    #[serde(default = "default_border_width")]
    pub border_width: f32,
    /// Border width of the selected tape while authoring
    #[serde(default = "default_selected_border_width")]
    pub selected_border_width: f32,
    /// Outline width of revealed tapes
    #[serde(default = "default_revealed_width")]
    pub revealed_width: f32,
    /// Label font size in image pixels
    #[serde(default = "default_label_size")]
    pub label_size: f32,
    /// Where artifacts and uploaded images live (None = platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_min_tape_size() -> f32 {
    10.0
}

fn default_border_width() -> f32 {
    2.0
}

fn default_selected_border_width() -> f32 {
    3.0
}

fn default_revealed_width() -> f32 {
    3.0
}

fn default_label_size() -> f32 {
    16.0
}

impl Default for OccludeConfig {
    fn default() -> Self {
        Self {
            min_tape_size: default_min_tape_size(),
            palette: TapePalette::default(),
            border_width: default_border_width(),
            selected_border_width: default_selected_border_width(),
            revealed_width: default_revealed_width(),
            label_size: default_label_size(),
            data_dir: None,
        }
    }
}

impl OccludeConfig {
    /// Application directory name under the platform config/data roots
    pub const ID: &'static str = "occlude";

    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory on this platform, not saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(Self::ID)))
            .unwrap_or_else(|| PathBuf::from(".").join(Self::ID))
    }
}
