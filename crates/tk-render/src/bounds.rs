//! Local frames and bounding boxes.
//!
//! Every element draws in a local frame: origin at `position`, rotated by
//! `rotation` degrees, scaled by the transient gesture scale. The content
//! rect in that frame starts at the origin for every kind except lines,
//! whose endpoints may sit anywhere around it.

use kurbo::{Affine, Point, Rect, Vec2};
use tk_core::model::{BoundingBox, Element, ElementKind};

/// Unscaled content rect in the element's local frame.
///
/// Lines are inflated by half the stroke width on every side.
pub fn local_rect(el: &Element) -> Rect {
    match &el.kind {
        ElementKind::Rectangle(r) => Rect::new(0.0, 0.0, r.width as f64, r.height as f64),
        ElementKind::Ellipse(e) => {
            Rect::new(0.0, 0.0, 2.0 * e.radius_x as f64, 2.0 * e.radius_y as f64)
        }
        ElementKind::Text(t) => {
            Rect::new(0.0, 0.0, t.content_width() as f64, t.content_height() as f64)
        }
        ElementKind::Picture(p) => Rect::new(0.0, 0.0, p.width as f64, p.height as f64),
        ElementKind::Line(l) => {
            let [a, b] = l.points;
            let half = l.stroke_width as f64 / 2.0;
            Rect::from_points((a.x as f64, a.y as f64), (b.x as f64, b.y as f64)).inflate(half, half)
        }
    }
}

/// Local frame → canvas.
pub fn element_transform(el: &Element) -> Affine {
    Affine::translate((el.position.x as f64, el.position.y as f64))
        * Affine::rotate((el.rotation as f64).to_radians())
        * Affine::scale_non_uniform(el.scale.x as f64, el.scale.y as f64)
}

/// The scaled, rotated canvas box of `local`, a rect in `el`'s local frame.
pub fn frame_box(el: &Element, local: Rect) -> BoundingBox {
    let origin = element_transform(el) * Point::new(local.x0, local.y0);
    BoundingBox::new(
        origin.x as f32,
        origin.y as f32,
        (local.width() * el.scale.x as f64) as f32,
        (local.height() * el.scale.y as f64) as f32,
        el.rotation,
    )
}

/// Box frame → canvas: translate to the box origin, rotate about it.
pub fn box_transform(b: &BoundingBox) -> Affine {
    Affine::translate((b.x as f64, b.y as f64)) * Affine::rotate((b.rotation as f64).to_radians())
}

/// The element position that puts a content rect with local offset
/// `offset` (already scaled) at the origin of box `b`.
pub fn position_for_box(b: &BoundingBox, offset: Vec2) -> tk_core::model::Point {
    let rotated = Affine::rotate((b.rotation as f64).to_radians()) * offset.to_point();
    tk_core::model::Point::new(b.x - rotated.x as f32, b.y - rotated.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::*;

    fn element(kind: ElementKind) -> Element {
        let mut store = SceneStore::new(&EditorConfig::default());
        let id = store.add(NewElement::new(kind).at(10.0, 20.0));
        store.get(id).cloned().unwrap()
    }

    #[test]
    fn ellipse_box_spans_both_radii() {
        let el = element(ElementKind::Ellipse(EllipseShape {
            radius_x: 60.0,
            radius_y: 40.0,
            fill: Color::BLACK,
        }));
        assert_eq!(
            frame_box(&el, local_rect(&el)),
            BoundingBox::new(10.0, 20.0, 120.0, 80.0, 0.0)
        );
    }

    #[test]
    fn line_box_is_inflated_by_stroke() {
        let el = element(ElementKind::Line(LineShape {
            points: [model::Point::new(0.0, 0.0), model::Point::new(200.0, 0.0)],
            stroke: Color::BLACK,
            stroke_width: 6.0,
        }));
        assert_eq!(
            frame_box(&el, local_rect(&el)),
            BoundingBox::new(7.0, 17.0, 206.0, 6.0, 0.0)
        );
    }

    #[test]
    fn position_for_box_inverts_frame_box() {
        let mut el = element(ElementKind::Line(LineShape {
            points: [model::Point::new(0.0, 0.0), model::Point::new(100.0, 50.0)],
            stroke: Color::BLACK,
            stroke_width: 4.0,
        }));
        el.rotation = 30.0;
        let local = local_rect(&el);
        let b = frame_box(&el, local);
        let pos = position_for_box(&b, Vec2::new(local.x0, local.y0));
        assert!((pos.x - el.position.x).abs() < 1e-3);
        assert!((pos.y - el.position.y).abs() < 1e-3);
    }
}
