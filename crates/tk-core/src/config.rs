//! Editor configuration.
//!
//! Every field has a default, so hosts may pass a partial JSON object (or
//! none at all). Keys are camelCase.

use crate::model::{Color, Decoration};
use serde::{Deserialize, Deserializer, Serialize};

/// Ranges and constants the editing operations enforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    /// Smallest width or height a resize proposal may have.
    pub min_box_size: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Added to each axis of a measured text box.
    pub text_padding: f32,
    /// Offset applied to both axes of a duplicated element.
    pub duplicate_offset: f32,
    /// Longer axis of a freshly inserted picture.
    pub picture_max_size: f32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_box_size: 10.0,
            min_font_size: 8.0,
            max_font_size: 120.0,
            text_padding: 2.0,
            duplicate_offset: 20.0,
            picture_max_size: 300.0,
        }
    }
}

impl Limits {
    pub fn clamp_font_size(&self, size: f32) -> f32 {
        size.max(self.min_font_size).min(self.max_font_size)
    }

    /// Reject limits the editing operations cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("minBoxSize", self.min_box_size),
            ("minFontSize", self.min_font_size),
            ("maxFontSize", self.max_font_size),
            ("textPadding", self.text_padding),
            ("duplicateOffset", self.duplicate_offset),
            ("pictureMaxSize", self.picture_max_size),
        ];
        if let Some(&(key, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::invalid(key, "must be finite"));
        }
        for (key, v) in [
            ("minBoxSize", self.min_box_size),
            ("minFontSize", self.min_font_size),
            ("pictureMaxSize", self.picture_max_size),
        ] {
            if v <= 0.0 {
                return Err(ConfigError::invalid(key, "must be positive"));
            }
        }
        if self.text_padding < 0.0 {
            return Err(ConfigError::invalid("textPadding", "must not be negative"));
        }
        if self.min_font_size > self.max_font_size {
            return Err(ConfigError::invalid(
                "minFontSize",
                format!(
                    "{} exceeds maxFontSize {}",
                    self.min_font_size, self.max_font_size
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("`{key}` {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// How a text resize proposal is turned into a font size ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextResizeMode {
    /// `new.width / intrinsic.width`.
    #[default]
    WidthDriven,
    /// `min(width ratio, height ratio)`.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecorationConfig {
    pub enabled: bool,
    /// Fraction of the canvas width covered by the backdrop, from the right.
    pub backdrop_fraction: f32,
    #[serde(deserialize_with = "color_from_str", serialize_with = "color_to_str")]
    pub backdrop_color: Color,
    pub label_text: String,
    pub label_font_family: String,
    pub label_font_size: f32,
    #[serde(deserialize_with = "color_from_str", serialize_with = "color_to_str")]
    pub label_color: Color,
    /// Distance of the label from the left and bottom canvas edges.
    pub label_inset: f32,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backdrop_fraction: 0.35,
            backdrop_color: Color::WHITE,
            label_text: "Thumbkit".into(),
            label_font_family: "Arial".into(),
            label_font_size: 14.0,
            label_color: Color::rgba(0.0, 0.0, 0.0, 0.35),
            label_inset: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandleConfig {
    /// Side length of a resize anchor square.
    pub anchor_size: f32,
    /// Distance of the rotation anchor above the top edge.
    pub rotate_offset: f32,
    /// Rotation step when snapping is requested.
    pub rotation_snap: f32,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            anchor_size: 8.0,
            rotate_offset: 30.0,
            rotation_snap: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    #[serde(deserialize_with = "color_from_str", serialize_with = "color_to_str")]
    pub background: Color,
    pub limits: Limits,
    pub text_resize_mode: TextResizeMode,
    pub decorations: DecorationConfig,
    pub handle: HandleConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 640.0,
            canvas_height: 415.0,
            background: Color::rgba(221.0 / 255.0, 221.0 / 255.0, 221.0 / 255.0, 1.0),
            limits: Limits::default(),
            text_resize_mode: TextResizeMode::default(),
            decorations: DecorationConfig::default(),
            handle: HandleConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a partial JSON config and check its limits.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.limits.validate()?;
        if !(config.canvas_width > 0.0 && config.canvas_height > 0.0) {
            return Err(ConfigError::invalid("canvasWidth", "canvas must have a positive size"));
        }
        Ok(config)
    }

    /// The fixed decorations laid out for this canvas size.
    pub fn build_decorations(&self) -> Vec<Decoration> {
        let d = &self.decorations;
        if !d.enabled {
            return Vec::new();
        }
        let backdrop_width = self.canvas_width * d.backdrop_fraction;
        vec![
            Decoration::Backdrop {
                x: self.canvas_width - backdrop_width,
                y: 0.0,
                width: backdrop_width,
                height: self.canvas_height,
                fill: d.backdrop_color,
            },
            Decoration::Label {
                x: d.label_inset,
                y: self.canvas_height - d.label_inset - d.label_font_size,
                text: d.label_text.clone(),
                font_family: d.label_font_family.clone(),
                font_size: d.label_font_size,
                color: d.label_color,
            },
        ]
    }
}

fn color_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    let raw = String::deserialize(deserializer)?;
    crate::attr::parse_color(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{raw}`")))
}

fn color_to_str<S: serde::Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_css())
}
