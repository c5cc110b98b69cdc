//! Default elements inserted by the "add" buttons.

use crate::picture::{ImageInfo, initial_size};
use tk_core::config::Limits;
use tk_core::model::*;

pub const DEFAULT_TEXT: &str = "Type your text here!";

pub fn text() -> NewElement {
    let mut t = TextBox::new(DEFAULT_TEXT, "Arial", 40.0);
    t.color = Color::from_rgb8(0x33, 0x33, 0x33, 1.0);
    t.align = TextAlign::Left;
    t.wrap = TextWrap::Word;
    NewElement::new(ElementKind::Text(t)).at(200.0, 100.0)
}

pub fn rectangle() -> NewElement {
    NewElement::new(ElementKind::Rectangle(RectangleShape {
        width: 150.0,
        height: 100.0,
        fill: Color::from_rgb8(0x4a, 0x90, 0xe2, 1.0),
        corner_radius: 0.0,
    }))
    .at(50.0, 50.0)
}

pub fn ellipse() -> NewElement {
    NewElement::new(ElementKind::Ellipse(EllipseShape {
        radius_x: 60.0,
        radius_y: 40.0,
        fill: Color::from_rgb8(0xe2, 0x4a, 0x4a, 1.0),
    }))
    .at(100.0, 100.0)
}

pub fn line() -> NewElement {
    NewElement::new(ElementKind::Line(LineShape {
        points: [Point::new(0.0, 0.0), Point::new(200.0, 0.0)],
        stroke: Color::BLACK,
        stroke_width: 5.0,
    }))
    .at(50.0, 150.0)
}

/// A picture sized to fit the configured maximum, keeping aspect ratio.
pub fn picture(key: &str, info: &ImageInfo, limits: &Limits) -> NewElement {
    let (width, height) = initial_size(info.pixel_width, info.pixel_height, limits.picture_max_size);
    NewElement::new(ElementKind::Picture(PictureShape {
        image: ImageRef {
            key: key.to_string(),
            pixel_width: info.pixel_width,
            pixel_height: info.pixel_height,
        },
        width,
        height,
        corner_radius: 0.0,
    }))
    .at(50.0, 50.0)
}

/// Template for kinds that need no external resource.
pub fn for_kind(kind: ShapeKind) -> Option<NewElement> {
    match kind {
        ShapeKind::Text => Some(text()),
        ShapeKind::Rectangle => Some(rectangle()),
        ShapeKind::Ellipse => Some(ellipse()),
        ShapeKind::Line => Some(line()),
        ShapeKind::Picture => None,
    }
}
