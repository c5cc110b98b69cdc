//! Transform engine: turns handle proposals into applied boxes.
//!
//! A gesture is a sequence of `propose` calls followed by one `commit`.
//! Proposals are absolute (relative to the unscaled element), so calling
//! `propose` repeatedly with the same box is idempotent.
//!
//! Non-text elements carry a transient scale during the gesture, baked into
//! their intrinsic size on commit. Text elements never carry scale: each
//! proposal is converted into a new font size and a re-measured content
//! box immediately.

use crate::metrics::{FontQuery, MeasureError, TextExtent, TextMeasure};
use kurbo::{Rect, Vec2};
use tk_core::config::{Limits, TextResizeMode};
use tk_core::error::EditError;
use tk_core::id::ElementId;
use tk_core::model::*;
use tk_render::bounds::{frame_box, local_rect, position_for_box};

/// Size comparisons treat differences below this as equal.
const SIZE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct TransformEngine {
    attached: Option<ElementId>,
    limits: Limits,
    mode: TextResizeMode,
}

impl TransformEngine {
    pub fn new(limits: Limits, mode: TextResizeMode) -> Self {
        Self {
            attached: None,
            limits,
            mode,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ─── Handle binding ──────────────────────────────────────────────────

    pub fn attach(&mut self, id: ElementId) {
        self.attached = Some(id);
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    pub fn attached(&self) -> Option<ElementId> {
        self.attached
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Unscaled local rect the handle binds to. Lines are padded up to the
    /// minimum box size on each axis so their handle stays resizable.
    pub fn handle_rect(&self, el: &Element) -> Rect {
        let rect = local_rect(el);
        match el.kind {
            ElementKind::Line(_) => {
                let min = self.limits.min_box_size as f64;
                let grow_x = ((min - rect.width()) / 2.0).max(0.0);
                let grow_y = ((min - rect.height()) / 2.0).max(0.0);
                rect.inflate(grow_x, grow_y)
            }
            _ => rect,
        }
    }

    /// The current handle box of `el`, transient scale included.
    pub fn element_box(&self, el: &Element) -> BoundingBox {
        frame_box(el, self.handle_rect(el))
    }

    // ─── Gesture ─────────────────────────────────────────────────────────

    /// Apply a proposed box to `el` and return the box actually applied.
    ///
    /// Returns `old` unchanged (and leaves `el` untouched) for locked
    /// elements, non-finite proposals, and proposals below the minimum size.
    pub fn propose(
        &self,
        el: &mut Element,
        old: &BoundingBox,
        new: &BoundingBox,
        measure: &dyn TextMeasure,
    ) -> BoundingBox {
        match self.try_propose(el, old, new, measure) {
            Ok(applied) => applied,
            Err(e) => {
                log::debug!("keeping old box of {:?}: {e}", el.id());
                *old
            }
        }
    }

    /// Like [`propose`](Self::propose), but reports why a proposal was
    /// rejected. `el` is untouched on `Err`.
    pub fn try_propose(
        &self,
        el: &mut Element,
        old: &BoundingBox,
        new: &BoundingBox,
        measure: &dyn TextMeasure,
    ) -> Result<BoundingBox, EditError> {
        if el.is_locked() {
            return Err(EditError::Locked(el.id()));
        }
        let min = self.limits.min_box_size;
        if !new.is_finite() || new.width < min || new.height < min {
            return Err(EditError::DegenerateGeometry(format!(
                "proposed box {}x{} is below the minimum {min}",
                new.width, new.height
            )));
        }

        log::trace!("propose {:?} -> {new:?}", el.id());
        if el.as_text().is_some() {
            self.propose_text(el, old, new, measure)
        } else {
            self.propose_scaled(el, new)
        }
    }

    fn propose_scaled(&self, el: &mut Element, new: &BoundingBox) -> Result<BoundingBox, EditError> {
        let rect = self.handle_rect(el);
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Err(EditError::DegenerateGeometry(format!(
                "{} has an empty extent",
                el.id()
            )));
        }
        let sx = new.width / rect.width() as f32;
        let sy = new.height / rect.height() as f32;
        let offset = Vec2::new(rect.x0 * sx as f64, rect.y0 * sy as f64);

        el.scale = Scale { x: sx, y: sy };
        el.rotation = new.rotation;
        el.position = position_for_box(new, offset);
        Ok(*new)
    }

    fn propose_text(
        &self,
        el: &mut Element,
        old: &BoundingBox,
        new: &BoundingBox,
        measure: &dyn TextMeasure,
    ) -> Result<BoundingBox, EditError> {
        let padding = self.limits.text_padding;

        // Same size: a move or rotation only. The font size must not drift.
        if new.same_size(old, SIZE_EPSILON) {
            el.position = Point::new(new.x, new.y);
            el.rotation = new.rotation;
            el.scale = Scale::IDENTITY;
            return Ok(BoundingBox::new(
                new.x,
                new.y,
                old.width,
                old.height,
                new.rotation,
            ));
        }

        let id = el.id();
        let Some(text) = el.as_text() else {
            return Ok(*old);
        };
        let intrinsic = measure
            .measure(&FontQuery::for_text(text, text.font_size))
            .map_err(|e| measure_failed(id, e))?;
        if intrinsic.is_empty() {
            return Err(EditError::DegenerateGeometry(format!(
                "{id} has no intrinsic extent"
            )));
        }

        let ratio = match self.mode {
            TextResizeMode::WidthDriven => new.width / intrinsic.width,
            TextResizeMode::Uniform => {
                (new.width / intrinsic.width).min(new.height / intrinsic.height)
            }
        };
        let font_size = self.limits.clamp_font_size(text.font_size * ratio);
        if !font_size.is_finite() {
            return Err(EditError::DegenerateGeometry(format!(
                "font size for {id} is not finite"
            )));
        }

        let measured = measure
            .measure(&FontQuery::for_text(text, font_size))
            .map_err(|e| measure_failed(id, e))?;

        let (width, height) = (measured.width + padding, measured.height + padding);
        if let Some(t) = el.as_text_mut() {
            t.font_size = font_size;
            t.set_content_box(width, height);
        }
        el.scale = Scale::IDENTITY;
        el.position = Point::new(new.x, new.y);
        el.rotation = new.rotation;
        Ok(BoundingBox::new(new.x, new.y, width, height, new.rotation))
    }

    /// End a gesture: bake the transient scale into intrinsic sizes so the
    /// stored scale is `(1, 1)` again.
    pub fn commit(&self, el: &mut Element) {
        if el.scale.is_identity() {
            return;
        }
        el.bake_scale();
        log::debug!("committed transform of {:?}", el.id());
    }

    /// Re-measure a text element at its current font size and store the
    /// padded content box. Used after every non-resize text mutation. On
    /// failure the last measured box is kept.
    pub fn refit_text(&self, el: &mut Element, measure: &dyn TextMeasure) -> Option<TextExtent> {
        let padding = self.limits.text_padding;
        let id = el.id();
        let t = el.as_text_mut()?;
        match measure.measure(&FontQuery::for_text(t, t.font_size)) {
            Ok(e) => {
                t.set_content_box(e.width + padding, e.height + padding);
                el.scale = Scale::IDENTITY;
                Some(e)
            }
            Err(e) => {
                log::warn!("measuring {id:?} failed: {e}; keeping last size");
                None
            }
        }
    }
}

fn measure_failed(id: ElementId, e: MeasureError) -> EditError {
    log::warn!("measuring {id:?} failed: {e}; keeping last size");
    EditError::DegenerateGeometry(format!("measuring {id} failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMeasure;
    use tk_core::{EditorConfig, SceneStore};

    struct Failing;

    impl TextMeasure for Failing {
        fn measure(&self, q: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
            Err(MeasureError::UnavailableFont(q.family.to_string()))
        }
    }

    fn engine() -> TransformEngine {
        TransformEngine::new(Limits::default(), TextResizeMode::WidthDriven)
    }

    fn element(kind: ElementKind) -> Element {
        let mut store = SceneStore::new(&EditorConfig::default());
        let id = store.add(NewElement::new(kind).at(10.0, 10.0));
        store.get(id).cloned().unwrap()
    }

    fn text(s: &str, size: f32) -> Element {
        let mut el = element(ElementKind::Text(TextBox::new(s, "Arial", size)));
        engine().refit_text(&mut el, &ApproxMeasure::default());
        el
    }

    #[test]
    fn text_resize_scales_font_by_width_ratio() {
        let m = ApproxMeasure::default();
        let e = engine();
        // "Hello" at 20px: 5 × 20 × 0.5 = 50 wide, 20 high; padded 52 × 22.
        let mut el = text("Hello", 20.0);
        let old = e.element_box(&el);
        assert_eq!(old, BoundingBox::new(10.0, 10.0, 52.0, 22.0, 0.0));

        let new = BoundingBox::new(10.0, 10.0, 100.0, 22.0, 0.0);
        let applied = e.propose(&mut el, &old, &new, &m);
        let t = el.as_text().unwrap();
        assert!((t.font_size - 40.0).abs() < 1e-3);
        assert!((applied.width - 102.0).abs() < 1e-3);
        assert!((applied.height - 42.0).abs() < 1e-3);
        assert_eq!(el.scale, Scale::IDENTITY);
    }

    #[test]
    fn same_size_proposal_keeps_font() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = text("Hello", 20.0);
        let old = e.element_box(&el);
        assert_eq!(e.propose(&mut el, &old, &old, &m), old);
        assert_eq!(el.as_text().unwrap().font_size, 20.0);
    }

    #[test]
    fn too_small_proposal_returns_old() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = text("Hello", 20.0);
        let before = el.clone();
        let old = e.element_box(&el);
        let tiny = BoundingBox::new(10.0, 10.0, 9.0, 30.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &tiny, &m), old);
        let nan = BoundingBox::new(10.0, 10.0, f32::NAN, 30.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &nan, &m), old);
        assert_eq!(el, before);
    }

    #[test]
    fn empty_text_returns_old() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = text("", 20.0);
        let old = BoundingBox::new(10.0, 10.0, 20.0, 22.0, 0.0);
        let new = BoundingBox::new(10.0, 10.0, 80.0, 22.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &new, &m), old);
    }

    #[test]
    fn try_propose_reports_the_reason() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = text("", 20.0);
        let old = BoundingBox::new(10.0, 10.0, 20.0, 22.0, 0.0);
        let new = BoundingBox::new(10.0, 10.0, 80.0, 22.0, 0.0);
        let err = e.try_propose(&mut el, &old, &new, &m).unwrap_err();
        assert_eq!(err.kind(), tk_core::ErrorKind::DegenerateGeometry);
    }

    #[test]
    fn measurement_failure_keeps_last_size() {
        let e = engine();
        let mut el = text("Hello", 20.0);
        let before = el.clone();
        let old = e.element_box(&el);
        let new = BoundingBox::new(10.0, 10.0, 200.0, 22.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &new, &Failing), old);
        assert_eq!(el, before);
        assert_eq!(e.refit_text(&mut el, &Failing), None);
        assert_eq!(el, before);
    }

    #[test]
    fn font_size_is_clamped_during_resize() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = text("Hello", 100.0);
        let old = e.element_box(&el);
        let huge = BoundingBox::new(10.0, 10.0, 5000.0, 22.0, 0.0);
        e.propose(&mut el, &old, &huge, &m);
        assert_eq!(el.as_text().unwrap().font_size, 120.0);
    }

    #[test]
    fn uniform_mode_uses_smaller_ratio() {
        let m = ApproxMeasure::default();
        let e = TransformEngine::new(Limits::default(), TextResizeMode::Uniform);
        let mut el = text("Hello", 20.0);
        let old = e.element_box(&el);
        // Width ratio 4, height ratio 2.
        let new = BoundingBox::new(10.0, 10.0, 200.0, 40.0, 0.0);
        e.propose(&mut el, &old, &new, &m);
        assert!((el.as_text().unwrap().font_size - 40.0).abs() < 1e-3);
    }

    #[test]
    fn rectangle_scale_is_baked_on_commit() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = element(ElementKind::Rectangle(RectangleShape {
            width: 150.0,
            height: 100.0,
            fill: Color::BLACK,
            corner_radius: 0.0,
        }));
        let old = e.element_box(&el);
        let new = BoundingBox::new(0.0, 5.0, 300.0, 50.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &new, &m), new);
        assert_eq!(el.scale, Scale { x: 2.0, y: 0.5 });
        assert_eq!(e.element_box(&el), new);

        e.commit(&mut el);
        assert_eq!(el.scale, Scale::IDENTITY);
        assert_eq!(e.element_box(&el), new);
        match &el.kind {
            ElementKind::Rectangle(r) => assert_eq!((r.width, r.height), (300.0, 50.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn line_endpoints_follow_box() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut el = element(ElementKind::Line(LineShape {
            points: [Point::new(0.0, 0.0), Point::new(200.0, 0.0)],
            stroke: Color::BLACK,
            stroke_width: 5.0,
        }));
        let old = e.element_box(&el);
        // A horizontal line's handle is padded to the minimum height.
        assert_eq!(old.height, 10.0);

        let new = BoundingBox::new(old.x, old.y, old.width * 0.5, old.height, 0.0);
        e.propose(&mut el, &old, &new, &m);
        e.commit(&mut el);
        match &el.kind {
            ElementKind::Line(l) => {
                assert!((l.points[1].x - 100.0).abs() < 1e-3);
                assert_eq!(l.points[0], Point::new(0.0, 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn locked_element_is_never_transformed() {
        let m = ApproxMeasure::default();
        let e = engine();
        let mut store = SceneStore::new(&EditorConfig::default());
        let id = store.add(NewElement::new(ElementKind::Ellipse(EllipseShape {
            radius_x: 60.0,
            radius_y: 40.0,
            fill: Color::BLACK,
        })));
        store.set_locked(id, true).unwrap();
        let mut el = store.get(id).cloned().unwrap();
        let before = el.clone();
        let old = e.element_box(&el);
        let new = BoundingBox::new(0.0, 0.0, 300.0, 300.0, 0.0);
        assert_eq!(e.propose(&mut el, &old, &new, &m), old);
        assert_eq!(el, before);
    }
}
