//! Element data model for thumbnail compositions.
//!
//! An element is plain data: a position, rotation, lock flag, optional
//! shadow, and one of a closed set of kinds. Nothing here knows how an
//! element is drawn or measured; renderers project from this model and the
//! transform engine writes derived text metrics back into it.

use crate::config::Limits;
use crate::error::EditError;
use crate::id::ElementId;
use serde::{Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a float alpha, as in CSS `rgba()`.
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        let (r, g, b, a) = match bytes.len() {
            3 => (short(0)?, short(1)?, short(2)?, 255),
            4 => (short(0)?, short(1)?, short(2)?, short(3)?),
            6 => (long(0)?, long(2)?, long(4)?, 255),
            8 => (long(0)?, long(2)?, long(4)?, long(6)?),
            _ => return None,
        };
        Some(Self::from_rgb8(r, g, b, a as f32 / 255.0))
    }

    fn channels8(&self) -> (u8, u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b), q(self.a))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when translucent.
    pub fn to_hex(&self) -> String {
        let (r, g, b, a) = self.channels8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS color string: hex when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        let (r, g, b, a) = self.channels8();
        if a == 255 {
            self.to_hex()
        } else {
            let alpha = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
            format!("rgba({r}, {g}, {b}, {alpha})")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// The box the transform handle is bound to. `rotation` is in degrees,
/// around the top-left corner `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, rotation: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
    }

    /// Whether both boxes have the same width and height (within `eps`).
    pub fn same_size(&self, other: &BoundingBox, eps: f32) -> bool {
        (self.width - other.width).abs() <= eps && (self.height - other.height).abs() <= eps
    }

    /// Axis-aligned containment test, ignoring rotation.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Transient scale carried by an element during a drag gesture.
/// Always `(1, 1)` once a gesture has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ─── Shadow / Text styling ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::rgba(0.0, 0.0, 0.0, 0.5),
            blur: 10.0,
            offset_x: 5.0,
            offset_y: 5.0,
        }
    }
}

/// Independent bold / italic flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    /// CSS `font` shorthand prefix, e.g. `"italic bold"` or `"normal"`.
    pub fn css_prefix(&self) -> &'static str {
        match (self.italic, self.bold) {
            (false, false) => "normal",
            (false, true) => "bold",
            (true, false) => "italic",
            (true, true) => "italic bold",
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Display wrap mode. Measurement never reads it: text is always measured
/// unwrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWrap {
    #[default]
    Word,
    None,
}

// ─── Element kinds ───────────────────────────────────────────────────────

/// Tag for the closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Text,
    Line,
    Picture,
}

impl ShapeKind {
    /// Prefix for freshly minted IDs.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Rectangle => "rect",
            Self::Ellipse => "ellipse",
            Self::Text => "text",
            Self::Line => "line",
            Self::Picture => "picture",
        }
    }

    /// Human-readable name used in the layers list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rectangle => "Rectangle",
            Self::Ellipse => "Ellipse",
            Self::Text => "Text",
            Self::Line => "Line",
            Self::Picture => "Image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rect" | "rectangle" => Some(Self::Rectangle),
            "ellipse" | "circle" => Some(Self::Ellipse),
            "text" => Some(Self::Text),
            "line" => Some(Self::Line),
            "picture" | "image" => Some(Self::Picture),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleShape {
    pub width: f32,
    pub height: f32,
    pub fill: Color,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseShape {
    pub radius_x: f32,
    pub radius_y: f32,
    pub fill: Color,
}

/// A text element. `content_width` / `content_height` are derived from the
/// measured intrinsic size plus padding and can only be written through
/// [`TextBox::set_content_box`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    pub font_style: FontStyle,
    pub color: Color,
    pub align: TextAlign,
    pub wrap: TextWrap,
    content_width: f32,
    content_height: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
            font_size,
            font_style: FontStyle::default(),
            color: Color::BLACK,
            align: TextAlign::default(),
            wrap: TextWrap::default(),
            content_width: 0.0,
            content_height: 0.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Store a freshly measured footprint (already padded).
    pub fn set_content_box(&mut self, width: f32, height: f32) {
        self.content_width = width;
        self.content_height = height;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    /// Endpoints relative to the element position.
    pub points: [Point; 2],
    pub stroke: Color,
    pub stroke_width: f32,
}

/// Reference to decoded pixels owned by the host (a browser image, a
/// texture, ...). Only the key and pixel size are known to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub key: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureShape {
    pub image: ImageRef,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
    Text(TextBox),
    Line(LineShape),
    Picture(PictureShape),
}

impl ElementKind {
    pub fn shape_kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle(_) => ShapeKind::Rectangle,
            Self::Ellipse(_) => ShapeKind::Ellipse,
            Self::Text(_) => ShapeKind::Text,
            Self::Line(_) => ShapeKind::Line,
            Self::Picture(_) => ShapeKind::Picture,
        }
    }

    /// Check the ranges every kind must satisfy. Font size is clamped
    /// rather than rejected.
    pub fn validate(&mut self, limits: &Limits) -> Result<(), EditError> {
        match self {
            Self::Rectangle(r) => {
                non_negative("width", r.width)?;
                non_negative("height", r.height)?;
                non_negative("cornerRadius", r.corner_radius)?;
            }
            Self::Ellipse(e) => {
                non_negative("radiusX", e.radius_x)?;
                non_negative("radiusY", e.radius_y)?;
            }
            Self::Text(t) => {
                finite("fontSize", t.font_size)?;
                t.font_size = limits.clamp_font_size(t.font_size);
            }
            Self::Line(l) => {
                positive("strokeWidth", l.stroke_width)?;
                for p in &l.points {
                    finite("points", p.x)?;
                    finite("points", p.y)?;
                }
            }
            Self::Picture(p) => {
                non_negative("width", p.width)?;
                non_negative("height", p.height)?;
                non_negative("cornerRadius", p.corner_radius)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn finite(key: &str, v: f32) -> Result<f32, EditError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EditError::InvalidValue {
            key: key.to_string(),
            reason: format!("{v} is not a finite number"),
        })
    }
}

pub(crate) fn non_negative(key: &str, v: f32) -> Result<f32, EditError> {
    if finite(key, v)? < 0.0 {
        return Err(EditError::InvalidValue {
            key: key.to_string(),
            reason: format!("{v} must not be negative"),
        });
    }
    Ok(v)
}

pub(crate) fn positive(key: &str, v: f32) -> Result<f32, EditError> {
    if finite(key, v)? <= 0.0 {
        return Err(EditError::InvalidValue {
            key: key.to_string(),
            reason: format!("{v} must be greater than zero"),
        });
    }
    Ok(v)
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A user-placed element. IDs and the lock flag are owned by the
/// [`SceneStore`](crate::scene::SceneStore); everything else is public data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: ElementId,
    locked: bool,
    pub position: Point,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub scale: Scale,
    pub shadow: Option<Shadow>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub(crate) fn from_draft(id: ElementId, draft: NewElement) -> Self {
        Self {
            id,
            locked: false,
            position: draft.position,
            rotation: draft.rotation,
            scale: Scale::IDENTITY,
            shadow: draft.shadow,
            kind: draft.kind,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn with_id(&self, id: ElementId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.locked = false;
        copy.bake_scale();
        copy
    }

    /// Fold the transient resize scale into the intrinsic size, leaving
    /// `scale` at identity. Text never carries scale at rest.
    pub fn bake_scale(&mut self) {
        let Scale { x: sx, y: sy } = self.scale;
        if self.scale.is_identity() {
            return;
        }
        match &mut self.kind {
            ElementKind::Rectangle(r) => {
                r.width *= sx;
                r.height *= sy;
            }
            ElementKind::Ellipse(e) => {
                e.radius_x *= sx;
                e.radius_y *= sy;
            }
            ElementKind::Picture(p) => {
                p.width *= sx;
                p.height *= sy;
            }
            ElementKind::Line(l) => {
                for p in &mut l.points {
                    p.x *= sx;
                    p.y *= sy;
                }
            }
            ElementKind::Text(_) => {}
        }
        self.scale = Scale::IDENTITY;
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.kind.shape_kind()
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match &mut self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Name shown in the layers list: the first 15 characters of a text
    /// element, or the kind name.
    pub fn display_name(&self) -> String {
        match &self.kind {
            ElementKind::Text(t) if !t.text.trim().is_empty() => t.text.chars().take(15).collect(),
            _ => self.shape_kind().label().to_string(),
        }
    }
}

/// An element before it has been added to a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    pub position: Point,
    pub rotation: f32,
    pub shadow: Option<Shadow>,
    pub kind: ElementKind,
}

impl NewElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            position: Point::default(),
            rotation: 0.0,
            shadow: None,
            kind,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Check the common attributes, then the kind's own (see
    /// [`ElementKind::validate`]).
    pub fn validate(&mut self, limits: &Limits) -> Result<(), EditError> {
        finite("x", self.position.x)?;
        finite("y", self.position.y)?;
        finite("rotation", self.rotation)?;
        if let Some(shadow) = &self.shadow {
            non_negative("shadowBlur", shadow.blur)?;
            finite("shadowOffsetX", shadow.offset_x)?;
            finite("shadowOffsetY", shadow.offset_y)?;
        }
        self.kind.validate(limits)
    }
}

// ─── Decorations ─────────────────────────────────────────────────────────

/// Non-editable branding drawn beneath every element. Never selectable,
/// lockable, or listed as a layer, but always part of the render surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decoration {
    #[serde(rename_all = "camelCase")]
    Backdrop {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Color,
    },
    #[serde(rename_all = "camelCase")]
    Label {
        x: f32,
        y: f32,
        text: String,
        font_family: String,
        font_size: f32,
        color: Color,
    },
}
