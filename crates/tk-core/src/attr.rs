//! Typed element attributes and their string grammar.
//!
//! Panels send `(key, raw value)` pairs. Values are parsed with `winnow`
//! into an [`Attribute`], which is then applied to an element with kind
//! and range checks. Application is all-or-nothing.

use crate::config::Limits;
use crate::error::EditError;
use crate::model::*;
use winnow::ascii::space0;
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// A single parsed attribute assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    X(f32),
    Y(f32),
    Rotation(f32),
    Fill(Color),
    CornerRadius(f32),
    Width(f32),
    Height(f32),
    RadiusX(f32),
    RadiusY(f32),
    Text(String),
    FontFamily(String),
    FontSize(f32),
    Bold(bool),
    Italic(bool),
    TextColor(Color),
    Align(TextAlign),
    Wrap(TextWrap),
    StrokeColor(Color),
    StrokeWidth(f32),
    /// Enable (with default parameters) or disable the shadow.
    Shadow(bool),
    ShadowColor(Color),
    ShadowBlur(f32),
    ShadowOffsetX(f32),
    ShadowOffsetY(f32),
}

impl Attribute {
    /// Parse a raw panel value for `key`.
    pub fn parse(key: &str, raw: &str) -> Result<Self, EditError> {
        let value = raw.trim();
        let attr = match key {
            "x" => Self::X(number(key, value)?),
            "y" => Self::Y(number(key, value)?),
            "rotation" => Self::Rotation(number(key, value)?),
            "fill" => Self::Fill(color(key, value)?),
            "cornerRadius" => Self::CornerRadius(number(key, value)?),
            "width" => Self::Width(number(key, value)?),
            "height" => Self::Height(number(key, value)?),
            "radiusX" => Self::RadiusX(number(key, value)?),
            "radiusY" => Self::RadiusY(number(key, value)?),
            // Text content keeps its whitespace.
            "text" => Self::Text(raw.to_string()),
            "fontFamily" => {
                if value.is_empty() {
                    return Err(invalid(key, "font family must not be empty"));
                }
                Self::FontFamily(value.to_string())
            }
            "fontSize" => Self::FontSize(number(key, value)?),
            "bold" => Self::Bold(boolean(key, value)?),
            "italic" => Self::Italic(boolean(key, value)?),
            "textColor" => Self::TextColor(color(key, value)?),
            "align" => Self::Align(
                TextAlign::parse(value)
                    .ok_or_else(|| invalid(key, "expected left, center or right"))?,
            ),
            "wrap" => Self::Wrap(match value {
                "word" => TextWrap::Word,
                "none" => TextWrap::None,
                _ => return Err(invalid(key, "expected word or none")),
            }),
            "strokeColor" => Self::StrokeColor(color(key, value)?),
            "strokeWidth" => Self::StrokeWidth(number(key, value)?),
            "shadow" => Self::Shadow(match value {
                "none" | "off" | "false" => false,
                "on" | "true" => true,
                _ => return Err(invalid(key, "expected none or on")),
            }),
            "shadowColor" => Self::ShadowColor(color(key, value)?),
            "shadowBlur" => Self::ShadowBlur(number(key, value)?),
            "shadowOffsetX" => Self::ShadowOffsetX(number(key, value)?),
            "shadowOffsetY" => Self::ShadowOffsetY(number(key, value)?),
            other => return Err(EditError::UnknownAttribute(other.to_string())),
        };
        Ok(attr)
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::X(_) => "x",
            Self::Y(_) => "y",
            Self::Rotation(_) => "rotation",
            Self::Fill(_) => "fill",
            Self::CornerRadius(_) => "cornerRadius",
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::RadiusX(_) => "radiusX",
            Self::RadiusY(_) => "radiusY",
            Self::Text(_) => "text",
            Self::FontFamily(_) => "fontFamily",
            Self::FontSize(_) => "fontSize",
            Self::Bold(_) => "bold",
            Self::Italic(_) => "italic",
            Self::TextColor(_) => "textColor",
            Self::Align(_) => "align",
            Self::Wrap(_) => "wrap",
            Self::StrokeColor(_) => "strokeColor",
            Self::StrokeWidth(_) => "strokeWidth",
            Self::Shadow(_) => "shadow",
            Self::ShadowColor(_) => "shadowColor",
            Self::ShadowBlur(_) => "shadowBlur",
            Self::ShadowOffsetX(_) => "shadowOffsetX",
            Self::ShadowOffsetY(_) => "shadowOffsetY",
        }
    }

    /// Whether a text element must be re-measured after this change.
    pub fn affects_text_metrics(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::FontFamily(_)
                | Self::FontSize(_)
                | Self::Bold(_)
                | Self::Italic(_)
                | Self::Align(_)
        )
    }
}

impl Element {
    /// Apply a parsed attribute. On error the element is unchanged.
    ///
    /// Lock state is not consulted here; the scene store gates mutations.
    pub fn apply(&mut self, attr: &Attribute, limits: &Limits) -> Result<(), EditError> {
        let kind = self.shape_kind();
        let inapplicable = || EditError::InapplicableAttribute {
            key: attr.key(),
            kind,
        };

        match attr {
            Attribute::X(v) => self.position.x = finite("x", *v)?,
            Attribute::Y(v) => self.position.y = finite("y", *v)?,
            Attribute::Rotation(v) => self.rotation = finite("rotation", *v)?,
            Attribute::Shadow(on) => {
                self.shadow = on.then(|| self.shadow.unwrap_or_default());
            }
            Attribute::ShadowColor(_)
            | Attribute::ShadowBlur(_)
            | Attribute::ShadowOffsetX(_)
            | Attribute::ShadowOffsetY(_) => {
                let key = attr.key();
                let Some(shadow) = self.shadow.as_mut() else {
                    return Err(invalid(key, "shadow is disabled"));
                };
                match attr {
                    Attribute::ShadowColor(c) => shadow.color = *c,
                    Attribute::ShadowBlur(v) => shadow.blur = non_negative(key, *v)?,
                    Attribute::ShadowOffsetX(v) => shadow.offset_x = finite(key, *v)?,
                    Attribute::ShadowOffsetY(v) => shadow.offset_y = finite(key, *v)?,
                    _ => unreachable!("outer match admits shadow parameters only"),
                }
            }
            _ => match (&mut self.kind, attr) {
                (ElementKind::Rectangle(r), Attribute::Fill(c)) => r.fill = *c,
                (ElementKind::Ellipse(e), Attribute::Fill(c)) => e.fill = *c,
                (ElementKind::Rectangle(r), Attribute::CornerRadius(v)) => {
                    r.corner_radius = non_negative("cornerRadius", *v)?
                }
                (ElementKind::Picture(p), Attribute::CornerRadius(v)) => {
                    p.corner_radius = non_negative("cornerRadius", *v)?
                }
                (ElementKind::Rectangle(r), Attribute::Width(v)) => {
                    r.width = non_negative("width", *v)?
                }
                (ElementKind::Rectangle(r), Attribute::Height(v)) => {
                    r.height = non_negative("height", *v)?
                }
                (ElementKind::Picture(p), Attribute::Width(v)) => {
                    p.width = non_negative("width", *v)?
                }
                (ElementKind::Picture(p), Attribute::Height(v)) => {
                    p.height = non_negative("height", *v)?
                }
                (ElementKind::Ellipse(e), Attribute::RadiusX(v)) => {
                    e.radius_x = non_negative("radiusX", *v)?
                }
                (ElementKind::Ellipse(e), Attribute::RadiusY(v)) => {
                    e.radius_y = non_negative("radiusY", *v)?
                }
                (ElementKind::Text(t), Attribute::Text(s)) => t.text = s.clone(),
                (ElementKind::Text(t), Attribute::FontFamily(s)) => t.font_family = s.clone(),
                (ElementKind::Text(t), Attribute::FontSize(v)) => {
                    t.font_size = limits.clamp_font_size(finite("fontSize", *v)?)
                }
                (ElementKind::Text(t), Attribute::Bold(b)) => t.font_style.bold = *b,
                (ElementKind::Text(t), Attribute::Italic(b)) => t.font_style.italic = *b,
                (ElementKind::Text(t), Attribute::TextColor(c)) => t.color = *c,
                (ElementKind::Text(t), Attribute::Align(a)) => t.align = *a,
                (ElementKind::Text(t), Attribute::Wrap(w)) => t.wrap = *w,
                (ElementKind::Line(l), Attribute::StrokeColor(c)) => l.stroke = *c,
                (ElementKind::Line(l), Attribute::StrokeWidth(v)) => {
                    l.stroke_width = positive("strokeWidth", *v)?
                }
                _ => return Err(inapplicable()),
            },
        }
        Ok(())
    }
}

// ─── Value grammar ───────────────────────────────────────────────────────

/// Parse a color value: hex, `rgb()` / `rgba()`, or a named color.
pub fn parse_color(input: &str) -> Option<Color> {
    parse_color_value.parse(input.trim()).ok()
}

fn parse_color_value(input: &mut &str) -> ModalResult<Color> {
    alt((parse_hex_color, parse_rgb_function, parse_named_color)).parse_next(input)
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

fn parse_rgb_function(input: &mut &str) -> ModalResult<Color> {
    let has_alpha = alt(("rgba".value(true), "rgb".value(false))).parse_next(input)?;
    let _ = (space0, '(', space0).parse_next(input)?;
    let r = parse_channel.parse_next(input)?;
    let g = preceded(comma, parse_channel).parse_next(input)?;
    let b = preceded(comma, parse_channel).parse_next(input)?;
    let a = if has_alpha {
        let a = preceded(comma, parse_number).parse_next(input)?;
        if !(0.0..=1.0).contains(&a) {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        a
    } else {
        1.0
    };
    let _ = (space0, ')').parse_next(input)?;
    Ok(Color::from_rgb8(r, g, b, a))
}

fn parse_named_color(input: &mut &str) -> ModalResult<Color> {
    alt((
        "black".value(Color::BLACK),
        "white".value(Color::WHITE),
        "red".value(Color::rgba(1.0, 0.0, 0.0, 1.0)),
        "green".value(Color::rgba(0.0, 128.0 / 255.0, 0.0, 1.0)),
        "blue".value(Color::rgba(0.0, 0.0, 1.0, 1.0)),
        "transparent".value(Color::TRANSPARENT),
    ))
    .parse_next(input)
}

fn comma(input: &mut &str) -> ModalResult<()> {
    (space0, ',', space0).void().parse_next(input)
}

fn parse_channel(input: &mut &str) -> ModalResult<u8> {
    let v = parse_number.parse_next(input)?;
    if (0.0..=255.0).contains(&v) {
        Ok(v.round() as u8)
    } else {
        Err(ErrMode::Backtrack(ContextError::new()))
    }
}

fn parse_number(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    let _ = opt(alt(('-', '+'))).parse_next(input)?;
    let _ = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f32>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

fn parse_bool(input: &mut &str) -> ModalResult<bool> {
    alt(("true".value(true), "false".value(false))).parse_next(input)
}

fn number(key: &str, value: &str) -> Result<f32, EditError> {
    parse_number
        .parse(value)
        .map_err(|_| invalid(key, &format!("`{value}` is not a number")))
}

fn boolean(key: &str, value: &str) -> Result<bool, EditError> {
    parse_bool
        .parse(value)
        .map_err(|_| invalid(key, &format!("`{value}` is not true or false")))
}

fn color(key: &str, value: &str) -> Result<Color, EditError> {
    parse_color(value).ok_or_else(|| invalid(key, &format!("`{value}` is not a color")))
}

fn invalid(key: &str, reason: &str) -> EditError {
    EditError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;
    use pretty_assertions::assert_eq;

    fn rect() -> Element {
        Element::from_draft(
            ElementId::fresh("rect"),
            NewElement::new(ElementKind::Rectangle(RectangleShape {
                width: 150.0,
                height: 100.0,
                fill: Color::BLACK,
                corner_radius: 0.0,
            })),
        )
    }

    #[test]
    fn parse_colors() {
        assert_eq!(parse_color("#fff"), Some(Color::WHITE));
        assert_eq!(parse_color("#00000080").map(|c| c.to_hex()), Some("#00000080".into()));
        assert_eq!(
            parse_color("rgb(255, 0, 0)"),
            Some(Color::rgba(1.0, 0.0, 0.0, 1.0))
        );
        assert_eq!(
            parse_color("rgba(0,0,0,0.5)").map(|c| c.a),
            Some(0.5)
        );
        assert_eq!(parse_color(" transparent "), Some(Color::TRANSPARENT));
        assert_eq!(parse_color("rgb(300,0,0)"), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("purple"), None);
    }

    #[test]
    fn parse_numbers_and_flags() {
        assert_eq!(Attribute::parse("x", " 12.5 ").unwrap(), Attribute::X(12.5));
        assert_eq!(Attribute::parse("y", "-3").unwrap(), Attribute::Y(-3.0));
        assert_eq!(Attribute::parse("bold", "true").unwrap(), Attribute::Bold(true));
        assert_eq!(
            Attribute::parse("align", "center").unwrap(),
            Attribute::Align(TextAlign::Center)
        );
        assert_eq!(Attribute::parse("shadow", "none").unwrap(), Attribute::Shadow(false));
        assert!(Attribute::parse("x", "12px").is_err());
        assert!(Attribute::parse("x", "").is_err());
        assert!(matches!(
            Attribute::parse("opacity", "1"),
            Err(EditError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn text_keeps_whitespace() {
        assert_eq!(
            Attribute::parse("text", "  two\nlines ").unwrap(),
            Attribute::Text("  two\nlines ".into())
        );
    }

    #[test]
    fn inapplicable_attribute_leaves_element_unchanged() {
        let limits = Limits::default();
        let mut el = rect();
        let before = el.clone();
        let err = el.apply(&Attribute::FontSize(20.0), &limits).unwrap_err();
        assert_eq!(
            err,
            EditError::InapplicableAttribute {
                key: "fontSize",
                kind: ShapeKind::Rectangle
            }
        );
        assert_eq!(el, before);

        assert!(el.apply(&Attribute::Width(-5.0), &limits).is_err());
        assert_eq!(el, before);
    }

    #[test]
    fn shadow_toggle_and_parameters() {
        let limits = Limits::default();
        let mut el = rect();
        assert!(el.apply(&Attribute::ShadowBlur(4.0), &limits).is_err());

        el.apply(&Attribute::Shadow(true), &limits).unwrap();
        el.apply(&Attribute::ShadowBlur(4.0), &limits).unwrap();
        assert_eq!(el.shadow.map(|s| s.blur), Some(4.0));

        // Re-enabling keeps the configured parameters.
        el.apply(&Attribute::Shadow(true), &limits).unwrap();
        assert_eq!(el.shadow.map(|s| s.blur), Some(4.0));

        el.apply(&Attribute::Shadow(false), &limits).unwrap();
        assert_eq!(el.shadow, None);
    }

    #[test]
    fn font_size_is_clamped() {
        let limits = Limits::default();
        let mut el = Element::from_draft(
            ElementId::fresh("text"),
            NewElement::new(ElementKind::Text(TextBox::new("Hi", "Arial", 40.0))),
        );
        el.apply(&Attribute::FontSize(2.0), &limits).unwrap();
        assert_eq!(el.as_text().map(|t| t.font_size), Some(8.0));
        el.apply(&Attribute::FontSize(999.0), &limits).unwrap();
        assert_eq!(el.as_text().map(|t| t.font_size), Some(120.0));
    }
}
