//! Text metrics from the browser's Canvas2D `measureText`.

use tk_editor::{FontQuery, MeasureError, TextExtent, TextMeasure};
use tk_render::drawable::font_css;
use web_sys::CanvasRenderingContext2d;

/// Measures unwrapped text with a canvas context. Line height is one em,
/// matching the renderer.
pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasure {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure {
    fn measure(&self, q: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
        self.ctx.save();
        self.ctx.set_font(&font_css(q.style, q.size, q.family));
        let mut width = 0.0f64;
        let mut lines = 0usize;
        let mut failed = false;
        for line in q.text.split('\n') {
            lines += 1;
            match self.ctx.measure_text(line) {
                Ok(m) => width = width.max(m.width()),
                Err(_) => failed = true,
            }
        }
        self.ctx.restore();

        if failed {
            return Err(MeasureError::UnavailableFont(q.family.to_string()));
        }
        let extent = TextExtent {
            width: width as f32,
            height: lines as f32 * q.size,
        };
        if extent.width.is_finite() && extent.height.is_finite() {
            Ok(extent)
        } else {
            Err(MeasureError::NonFinite)
        }
    }
}
