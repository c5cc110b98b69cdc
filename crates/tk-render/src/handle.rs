//! Transform handle geometry: anchor placement, anchor hit testing, and the
//! boxes produced by dragging an anchor.

use crate::bounds::box_transform;
use kurbo::{Affine, Point, Rect, Vec2};
use tk_core::config::HandleConfig;
use tk_core::model::BoundingBox;

/// One of the eight resize anchors, or the rotation anchor above the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Right,
        Anchor::BottomRight,
        Anchor::Bottom,
        Anchor::BottomLeft,
        Anchor::Left,
        Anchor::Rotate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top-center",
            Self::TopRight => "top-right",
            Self::Right => "middle-right",
            Self::BottomRight => "bottom-right",
            Self::Bottom => "bottom-center",
            Self::BottomLeft => "bottom-left",
            Self::Left => "middle-left",
            Self::Rotate => "rotater",
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft
        )
    }

    fn moves_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    /// Anchor position in the box frame.
    fn local(&self, w: f64, h: f64, cfg: &HandleConfig) -> Point {
        match self {
            Self::TopLeft => Point::new(0.0, 0.0),
            Self::Top => Point::new(w / 2.0, 0.0),
            Self::TopRight => Point::new(w, 0.0),
            Self::Right => Point::new(w, h / 2.0),
            Self::BottomRight => Point::new(w, h),
            Self::Bottom => Point::new(w / 2.0, h),
            Self::BottomLeft => Point::new(0.0, h),
            Self::Left => Point::new(0.0, h / 2.0),
            Self::Rotate => Point::new(w / 2.0, -(cfg.rotate_offset as f64)),
        }
    }
}

/// Canvas positions of every anchor of `b`.
pub fn anchor_positions(b: &BoundingBox, cfg: &HandleConfig) -> Vec<(Anchor, Point)> {
    let xf = box_transform(b);
    let (w, h) = (b.width as f64, b.height as f64);
    Anchor::ALL
        .iter()
        .map(|a| (*a, xf * a.local(w, h, cfg)))
        .collect()
}

/// The anchor under canvas point `(px, py)`, if any. The rotation anchor
/// wins over resize anchors when they overlap.
pub fn hit_test_handle(b: &BoundingBox, px: f32, py: f32, cfg: &HandleConfig) -> Option<Anchor> {
    let p = box_transform(b).inverse() * Point::new(px as f64, py as f64);
    let (w, h) = (b.width as f64, b.height as f64);
    let half = cfg.anchor_size as f64 / 2.0;
    Anchor::ALL.iter().rev().copied().find(|a| {
        let c = a.local(w, h, cfg);
        Rect::new(c.x - half, c.y - half, c.x + half, c.y + half).contains(p)
    })
}

/// The box produced by dragging `anchor` of `start` by the canvas-space
/// `delta`. With `keep_ratio`, corner drags preserve the aspect ratio of
/// `start`. The opposite edge or corner stays fixed.
pub fn resize_box(start: &BoundingBox, anchor: Anchor, delta: Vec2, keep_ratio: bool) -> BoundingBox {
    if anchor == Anchor::Rotate {
        return *start;
    }
    let d = Affine::rotate(-(start.rotation as f64).to_radians()) * delta.to_point();
    let (w, h) = (start.width as f64, start.height as f64);

    let mut new_w = w;
    let mut new_h = h;
    if anchor.moves_left() {
        new_w = w - d.x;
    } else if anchor.moves_right() {
        new_w = w + d.x;
    }
    if anchor.moves_top() {
        new_h = h - d.y;
    } else if anchor.moves_bottom() {
        new_h = h + d.y;
    }

    if keep_ratio && anchor.is_corner() && w > 0.0 && h > 0.0 {
        let sx = new_w / w;
        let sy = new_h / h;
        let s = if (sx - 1.0).abs() >= (sy - 1.0).abs() { sx } else { sy };
        new_w = w * s;
        new_h = h * s;
    }

    let x0 = if anchor.moves_left() { w - new_w } else { 0.0 };
    let y0 = if anchor.moves_top() { h - new_h } else { 0.0 };
    let origin = box_transform(start) * Point::new(x0, y0);

    BoundingBox::new(
        origin.x as f32,
        origin.y as f32,
        new_w as f32,
        new_h as f32,
        start.rotation,
    )
}

/// The box produced by dragging the rotation anchor to canvas point
/// `pointer`. Rotation happens about the box center; with `snap`, the
/// angle is rounded to a multiple of `cfg.rotation_snap` degrees.
pub fn rotate_box(start: &BoundingBox, pointer: Point, snap: bool, cfg: &HandleConfig) -> BoundingBox {
    let (w, h) = (start.width as f64, start.height as f64);
    let center = box_transform(start) * Point::new(w / 2.0, h / 2.0);
    let v = pointer - center;
    // The anchor sits straight above the center at rotation 0.
    let mut degrees = v.y.atan2(v.x).to_degrees() + 90.0;
    if snap && cfg.rotation_snap > 0.0 {
        let step = cfg.rotation_snap as f64;
        degrees = (degrees / step).round() * step;
    }
    degrees = degrees.rem_euclid(360.0);

    let offset = Affine::rotate(degrees.to_radians()) * Point::new(w / 2.0, h / 2.0);
    BoundingBox::new(
        (center.x - offset.x) as f32,
        (center.y - offset.y) as f32,
        start.width,
        start.height,
        degrees as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn anchors_hit_at_their_positions() {
        let cfg = HandleConfig::default();
        let b = BoundingBox::new(100.0, 100.0, 200.0, 100.0, 0.0);
        assert_eq!(hit_test_handle(&b, 100.0, 100.0, &cfg), Some(Anchor::TopLeft));
        assert_eq!(hit_test_handle(&b, 302.0, 150.0, &cfg), Some(Anchor::Right));
        assert_eq!(hit_test_handle(&b, 200.0, 70.0, &cfg), Some(Anchor::Rotate));
        assert_eq!(hit_test_handle(&b, 200.0, 150.0, &cfg), None);
    }

    #[test]
    fn rotated_anchor_positions_follow_rotation() {
        let cfg = HandleConfig::default();
        let b = BoundingBox::new(0.0, 0.0, 100.0, 50.0, 90.0);
        let positions = anchor_positions(&b, &cfg);
        let (_, top_right) = positions[2];
        assert!(close(top_right.x as f32, 0.0) && close(top_right.y as f32, 100.0));
        assert_eq!(
            hit_test_handle(&b, top_right.x as f32, top_right.y as f32, &cfg),
            Some(Anchor::TopRight)
        );
    }

    #[test]
    fn left_drag_keeps_right_edge() {
        let start = BoundingBox::new(100.0, 100.0, 200.0, 100.0, 0.0);
        let b = resize_box(&start, Anchor::Left, Vec2::new(50.0, 30.0), false);
        assert_eq!(b, BoundingBox::new(150.0, 100.0, 150.0, 100.0, 0.0));
    }

    #[test]
    fn corner_drag_with_ratio() {
        let start = BoundingBox::new(0.0, 0.0, 200.0, 100.0, 0.0);
        let b = resize_box(&start, Anchor::BottomRight, Vec2::new(200.0, 10.0), true);
        assert!(close(b.width, 400.0) && close(b.height, 200.0));

        let b = resize_box(&start, Anchor::TopLeft, Vec2::new(100.0, 0.0), true);
        assert!(close(b.width, 100.0) && close(b.height, 50.0));
        assert!(close(b.x, 100.0) && close(b.y, 50.0));
    }

    #[test]
    fn rotate_snaps_about_center() {
        let cfg = HandleConfig::default();
        let start = BoundingBox::new(0.0, 0.0, 100.0, 100.0, 0.0);
        // Pointer to the right of the center means a quarter turn.
        let b = rotate_box(&start, Point::new(200.0, 52.0), true, &cfg);
        assert!(close(b.rotation, 90.0));
        assert!(close(b.x, 100.0) && close(b.y, 0.0));
    }
}
