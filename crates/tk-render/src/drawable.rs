//! Element → drawable projection.
//!
//! Produces backend-neutral paint commands: kurbo paths in a local frame
//! plus the affine that places them on the canvas. The Canvas2D bridge
//! consumes these; nothing here touches a live display surface.

use crate::bounds::{element_transform, local_rect};
use kurbo::{Affine, BezPath, Ellipse, Line, Rect, RoundedRect, Shape};
use tk_core::model::*;
use tk_core::scene::SceneSnapshot;

/// Flattening tolerance for curved outlines.
const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// A filled and/or stroked outline.
    Path {
        path: BezPath,
        transform: Affine,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        shadow: Option<Shadow>,
    },
    /// Source lines of text, top-aligned in a box of `width`. With
    /// [`TextWrap::Word`] the backend breaks them with [`wrap_words`].
    Text {
        lines: Vec<String>,
        font: String,
        line_height: f32,
        color: Color,
        align: TextAlign,
        width: f32,
        wrap: TextWrap,
        transform: Affine,
        shadow: Option<Shadow>,
    },
    /// A host-owned image stretched over `rect`, clipped to rounded corners.
    Image {
        key: String,
        rect: Rect,
        corner_radius: f32,
        transform: Affine,
        shadow: Option<Shadow>,
    },
}

impl Drawable {
    pub fn transform(&self) -> Affine {
        match self {
            Self::Path { transform, .. }
            | Self::Text { transform, .. }
            | Self::Image { transform, .. } => *transform,
        }
    }
}

/// CSS `font` shorthand for a text element.
pub fn font_css(style: FontStyle, size: f32, family: &str) -> String {
    format!("{} {}px \"{}\", sans-serif", style.css_prefix(), size, family)
}

/// Break each line at spaces so no line measures wider than `width`.
/// `measure` returns the advance of a candidate line in the active font.
/// A single word wider than `width` stays on its own line.
pub fn wrap_words(lines: &[String], width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let mut current = String::new();
        for (i, word) in line.split(' ').enumerate() {
            if i == 0 {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= width {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        out.push(current);
    }
    out
}

/// Project a single element.
pub fn drawable(el: &Element) -> Drawable {
    let transform = element_transform(el);
    let rect = local_rect(el);
    let shadow = el.shadow;

    match &el.kind {
        ElementKind::Rectangle(r) => Drawable::Path {
            path: RoundedRect::from_rect(rect, r.corner_radius as f64).to_path(TOLERANCE),
            transform,
            fill: Some(r.fill),
            stroke: None,
            shadow,
        },
        ElementKind::Ellipse(e) => Drawable::Path {
            path: Ellipse::from_rect(rect).to_path(TOLERANCE),
            transform,
            fill: Some(e.fill),
            stroke: None,
            shadow,
        },
        ElementKind::Line(l) => {
            let [a, b] = l.points;
            Drawable::Path {
                path: Line::new((a.x as f64, a.y as f64), (b.x as f64, b.y as f64))
                    .to_path(TOLERANCE),
                transform,
                fill: None,
                stroke: Some(Stroke {
                    color: l.stroke,
                    width: l.stroke_width,
                }),
                shadow,
            }
        }
        ElementKind::Text(t) => Drawable::Text {
            lines: t.text.split('\n').map(str::to_string).collect(),
            font: font_css(t.font_style, t.font_size, &t.font_family),
            line_height: t.font_size,
            color: t.color,
            align: t.align,
            width: t.content_width(),
            wrap: t.wrap,
            transform,
            shadow,
        },
        ElementKind::Picture(p) => Drawable::Image {
            key: p.image.key.clone(),
            rect,
            corner_radius: p.corner_radius,
            transform,
            shadow,
        },
    }
}

fn decoration_drawable(d: &Decoration) -> Drawable {
    match d {
        Decoration::Backdrop {
            x,
            y,
            width,
            height,
            fill,
        } => Drawable::Path {
            path: Rect::new(0.0, 0.0, *width as f64, *height as f64).to_path(TOLERANCE),
            transform: Affine::translate((*x as f64, *y as f64)),
            fill: Some(*fill),
            stroke: None,
            shadow: None,
        },
        Decoration::Label {
            x,
            y,
            text,
            font_family,
            font_size,
            color,
        } => Drawable::Text {
            lines: vec![text.clone()],
            font: font_css(FontStyle::default(), *font_size, font_family),
            line_height: *font_size,
            color: *color,
            align: TextAlign::Left,
            width: 0.0,
            wrap: TextWrap::None,
            transform: Affine::translate((*x as f64, *y as f64)),
            shadow: None,
        },
    }
}

/// Everything that makes up a rendered frame or export, in paint order:
/// background, decorations, then elements bottom to top.
pub fn scene_drawables(snapshot: &SceneSnapshot) -> Vec<Drawable> {
    let mut out = Vec::with_capacity(1 + snapshot.decorations.len() + snapshot.elements.len());
    out.push(Drawable::Path {
        path: Rect::new(0.0, 0.0, snapshot.width as f64, snapshot.height as f64).to_path(TOLERANCE),
        transform: Affine::IDENTITY,
        fill: Some(snapshot.background),
        stroke: None,
        shadow: None,
    });
    out.extend(snapshot.decorations.iter().map(decoration_drawable));
    for el in &snapshot.elements {
        log::trace!("PAINT {:?} {}", el.id(), el.shape_kind());
        out.push(drawable(el));
    }
    out
}
