//! Hit testing: point → element lookup.
//!
//! Walks the scene top to bottom (last drawn = topmost) and tests the point
//! in each element's local frame, so rotated and mid-gesture elements hit
//! where they are drawn. Decorations are never candidates.

use crate::bounds::{element_transform, local_rect};
use kurbo::{Ellipse, Line, ParamCurveNearest, Point, RoundedRect, Shape};
use tk_core::id::ElementId;
use tk_core::model::{Element, ElementKind};

/// Thin lines stay clickable within this distance of the stroke.
const LINE_TOLERANCE: f64 = 3.0;

/// Find the topmost element at canvas position `(px, py)`.
/// Returns `None` when only the background (or a decoration) is hit.
pub fn hit_test<'a, I>(elements: I, px: f32, py: f32) -> Option<ElementId>
where
    I: IntoIterator<Item = &'a Element>,
    I::IntoIter: DoubleEndedIterator,
{
    let p = Point::new(px as f64, py as f64);
    elements
        .into_iter()
        .rev()
        .find(|el| contains(el, p))
        .map(Element::id)
}

/// Whether canvas point `p` lies on the element.
pub fn contains(el: &Element, p: Point) -> bool {
    let xf = element_transform(el);
    if xf.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = xf.inverse() * p;
    let rect = local_rect(el);

    match &el.kind {
        ElementKind::Rectangle(r) => {
            RoundedRect::from_rect(rect, r.corner_radius as f64).contains(local)
        }
        ElementKind::Picture(pic) => {
            RoundedRect::from_rect(rect, pic.corner_radius as f64).contains(local)
        }
        ElementKind::Ellipse(_) => Ellipse::from_rect(rect).contains(local),
        ElementKind::Text(_) => rect.contains(local),
        ElementKind::Line(l) => {
            let [a, b] = l.points;
            let seg = Line::new((a.x as f64, a.y as f64), (b.x as f64, b.y as f64));
            let reach = (l.stroke_width as f64 / 2.0).max(LINE_TOLERANCE);
            seg.nearest(local, 1e-6).distance_sq <= reach * reach
        }
    }
}
