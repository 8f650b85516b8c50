//! Configuration schema types for `pxe.toml`
//!
//! Every section is optional; missing keys take the editor defaults.
//!
//! ```toml
//! [brush]
//! tool = "brush"
//! size = 3
//! blur = 1
//!
//! [color]
//! primary = "#ff0044"
//! opacity = 0.8
//!
//! [dither]
//! color1 = "#000000"
//! color2 = "#ffffff"
//! density = 5
//! pattern = "checkerboard"
//! mode = "draw"
//!
//! [mirror]
//! axis = "x"
//!
//! [history]
//! max = 50
//!
//! [export]
//! scale = 4
//!
//! [onion]
//! count = 1
//! opacity = 0.3
//! ```

use serde::{Deserialize, Serialize};

use crate::color::parse_color;
use crate::dither::{DitherMode, DitherPattern};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::mirror::MirrorAxis;
use crate::onion::OnionConfig;
use crate::output::MAX_SCALE;
use crate::tools::{Tool, ToolSettings};

/// Brush section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    /// Tool selected at startup
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Brush diameter in pixels
    #[serde(default = "default_size")]
    pub size: u32,
    /// Soft edge width
    #[serde(default)]
    pub blur: u32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self { tool: default_tool(), size: default_size(), blur: 0 }
    }
}

fn default_tool() -> String {
    "pencil".to_string()
}

fn default_size() -> u32 {
    1
}

fn default_opacity() -> f32 {
    1.0
}

/// Primary color section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { primary: default_primary(), opacity: default_opacity() }
    }
}

fn default_primary() -> String {
    "#000000".to_string()
}

/// Dither section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DitherConfig {
    #[serde(default = "default_primary")]
    pub color1: String,
    #[serde(default = "default_opacity")]
    pub opacity1: f32,
    #[serde(default = "default_dither_color2")]
    pub color2: String,
    #[serde(default = "default_opacity")]
    pub opacity2: f32,
    /// 1 (sparse) to 10 (dense)
    #[serde(default = "default_density")]
    pub density: u8,
    #[serde(default)]
    pub pattern: DitherPattern,
    #[serde(default)]
    pub mode: DitherMode,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            color1: default_primary(),
            opacity1: default_opacity(),
            color2: default_dither_color2(),
            opacity2: default_opacity(),
            density: default_density(),
            pattern: DitherPattern::default(),
            mode: DitherMode::default(),
        }
    }
}

fn default_dither_color2() -> String {
    "#ffffff".to_string()
}

fn default_density() -> u8 {
    5
}

/// Mirror section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub axis: MirrorAxis,
}

/// History section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots
    #[serde(default = "default_max_history")]
    pub max: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max: default_max_history() }
    }
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

/// PNG export section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default integer upscale factor
    #[serde(default = "default_scale")]
    pub scale: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { scale: default_scale() }
    }
}

fn default_scale() -> u8 {
    1
}

/// Onion skin section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnionSection {
    #[serde(default = "default_onion_count")]
    pub count: u32,
    #[serde(default = "default_onion_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub fade: bool,
}

impl Default for OnionSection {
    fn default() -> Self {
        Self { count: default_onion_count(), opacity: default_onion_opacity(), fade: false }
    }
}

fn default_onion_count() -> u32 {
    1
}

fn default_onion_opacity() -> f32 {
    0.3
}

/// Root of `pxe.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub dither: DitherConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub onion: OnionSection,
}

/// Validation error for config
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "dither.density")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pxe.toml: '{}' {}", self.field, self.message)
    }
}

impl EditorConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message });
        };

        if Tool::from_str(&self.brush.tool, self.dither.mode).is_none() {
            push("brush.tool", format!("unknown tool '{}'", self.brush.tool));
        }
        if self.brush.size == 0 {
            push("brush.size", "must be a positive integer".to_string());
        }

        for (field, value) in [
            ("color.primary", &self.color.primary),
            ("dither.color1", &self.dither.color1),
            ("dither.color2", &self.dither.color2),
        ] {
            if let Err(e) = parse_color(value) {
                push(field, format!("is not a valid color: {}", e));
            }
        }

        for (field, value) in [
            ("color.opacity", self.color.opacity),
            ("dither.opacity1", self.dither.opacity1),
            ("dither.opacity2", self.dither.opacity2),
            ("onion.opacity", self.onion.opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                push(field, "must be between 0.0 and 1.0".to_string());
            }
        }

        if !(1..=10).contains(&self.dither.density) {
            push("dither.density", "must be between 1 and 10".to_string());
        }
        if self.history.max == 0 {
            push("history.max", "must be a positive integer".to_string());
        }
        if self.export.scale == 0 || self.export.scale > MAX_SCALE {
            push("export.scale", format!("must be between 1 and {}", MAX_SCALE));
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Runtime tool settings described by this configuration.
    ///
    /// Unparseable values fall back to the defaults; run [`validate`] first
    /// to report them.
    ///
    /// [`validate`]: EditorConfig::validate
    pub fn tool_settings(&self) -> ToolSettings {
        let defaults = ToolSettings::default();
        ToolSettings {
            tool: Tool::from_str(&self.brush.tool, self.dither.mode).unwrap_or(defaults.tool),
            brush_size: self.brush.size.max(1),
            blur: self.brush.blur,
            color: parse_color(&self.color.primary).unwrap_or(defaults.color),
            opacity: self.color.opacity.clamp(0.0, 1.0),
            dither_color1: parse_color(&self.dither.color1).unwrap_or(defaults.dither_color1),
            dither_opacity1: self.dither.opacity1.clamp(0.0, 1.0),
            dither_color2: parse_color(&self.dither.color2).unwrap_or(defaults.dither_color2),
            dither_opacity2: self.dither.opacity2.clamp(0.0, 1.0),
            dither_density: self.dither.density.clamp(1, 10),
            dither_pattern: self.dither.pattern,
            mirror_axis: self.mirror.axis,
            max_history: self.history.max.max(1),
        }
    }

    /// Onion skin settings for previews.
    pub fn onion_config(&self) -> OnionConfig {
        OnionConfig {
            count: self.onion.count,
            opacity: self.onion.opacity.clamp(0.0, 1.0),
            fade: self.onion.fade,
            ..OnionConfig::default()
        }
    }
}
