//! Text metrics collaborator.
//!
//! Text is always measured unwrapped: each `\n`-separated line at its
//! natural width, stacked at one line height per line. The display wrap
//! mode of a text element is never an input here.

use tk_core::model::{FontStyle, TextBox};

/// What to measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontQuery<'a> {
    pub text: &'a str,
    pub family: &'a str,
    pub size: f32,
    pub style: FontStyle,
}

impl<'a> FontQuery<'a> {
    /// Query for a text element at an explicit font size.
    pub fn for_text(t: &'a TextBox, size: f32) -> Self {
        Self {
            text: &t.text,
            family: &t.font_family,
            size,
            style: t.font_style,
        }
    }
}

/// Unpadded intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

impl TextExtent {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("no metrics available for font `{0}`")]
    UnavailableFont(String),
    #[error("measurement produced a non-finite extent")]
    NonFinite,
}

/// Measures unwrapped text. Implementations must be deterministic for a
/// given query.
pub trait TextMeasure {
    fn measure(&self, query: &FontQuery<'_>) -> Result<TextExtent, MeasureError>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, query: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
        (**self).measure(query)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for Box<T> {
    fn measure(&self, query: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
        (**self).measure(query)
    }
}

/// Deterministic glyph-advance model: every character advances by a fixed
/// fraction of the font size, bold glyphs a little wider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxMeasure {
    /// Advance per character, in ems.
    pub advance: f32,
    /// Multiplier applied to the advance of bold text.
    pub bold_factor: f32,
    /// Line height, in ems.
    pub line_height: f32,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self {
            advance: 0.5,
            bold_factor: 1.1,
            line_height: 1.0,
        }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&self, q: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
        let lines = q.text.split('\n');
        let mut longest = 0usize;
        let mut count = 0usize;
        for line in lines {
            longest = longest.max(line.chars().count());
            count += 1;
        }
        let advance = if q.style.bold {
            self.advance * self.bold_factor
        } else {
            self.advance
        };
        let extent = TextExtent {
            width: longest as f32 * q.size * advance,
            height: count as f32 * q.size * self.line_height,
        };
        if extent.width.is_finite() && extent.height.is_finite() {
            Ok(extent)
        } else {
            Err(MeasureError::NonFinite)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str, size: f32, bold: bool) -> FontQuery<'_> {
        FontQuery {
            text,
            family: "Arial",
            size,
            style: FontStyle {
                bold,
                italic: false,
            },
        }
    }

    #[test]
    fn approx_measures_longest_line() {
        let m = ApproxMeasure::default();
        let e = m.measure(&query("ab\nabcd", 10.0, false)).unwrap();
        assert!((e.width - 20.0).abs() < 1e-4);
        assert!((e.height - 20.0).abs() < 1e-4);

        let bold = m.measure(&query("ab\nabcd", 10.0, true)).unwrap();
        assert!(bold.width > e.width);
    }

    #[test]
    fn empty_text_has_no_width() {
        let e = ApproxMeasure::default().measure(&query("", 40.0, false)).unwrap();
        assert!(e.is_empty());
    }
}
