//! Image header decoding and initial picture sizing.
//!
//! Only the header is read: pixel data stays with the host, which keeps
//! the decoded image under the key stored in the picture element.

use image::ImageReader;
use std::io::Cursor;
use tk_core::error::EditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub mime_type: &'static str,
}

/// Read format and dimensions from encoded image bytes.
pub fn decode_image(bytes: &[u8]) -> Result<ImageInfo, EditError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EditError::ImageDecode(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| EditError::ImageDecode("unrecognized image format".into()))?;
    let (pixel_width, pixel_height) = reader
        .into_dimensions()
        .map_err(|e| EditError::ImageDecode(e.to_string()))?;
    if pixel_width == 0 || pixel_height == 0 {
        return Err(EditError::ImageDecode("image has no pixels".into()));
    }
    Ok(ImageInfo {
        pixel_width,
        pixel_height,
        mime_type: format.to_mime_type(),
    })
}

/// Scale a pixel size down so the longer axis fits `max`, keeping the
/// aspect ratio. Smaller images keep their size.
pub fn initial_size(pixel_width: u32, pixel_height: u32, max: f32) -> (f32, f32) {
    let (w, h) = (pixel_width as f32, pixel_height as f32);
    let longest = w.max(h);
    if longest <= max || longest <= 0.0 {
        return (w, h);
    }
    let s = max / longest;
    (w * s, h * s)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A complete 4×2 RGBA PNG.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02, 0x08, 0x06, 0x00, 0x00, 0x00, 0x7f,
        0xa8, 0x7d, 0x63, 0x00, 0x00, 0x00, 0x12, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xf8,
        0xcf, 0xc0, 0xf0, 0x1f, 0x19, 0x33, 0xa0, 0x0b, 0x00, 0x00, 0x0f, 0x21, 0x0f, 0xf1, 0xfe,
        0x45, 0x14, 0x63, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn reads_png_dimensions() {
        let info = decode_image(TINY_PNG).unwrap();
        assert_eq!((info.pixel_width, info.pixel_height), (4, 2));
        assert_eq!(info.mime_type, "image/png");
    }

    #[test]
    fn garbage_is_a_resource_failure() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), tk_core::ErrorKind::ResourceLoadFailure);
    }

    #[test]
    fn initial_size_caps_longer_axis() {
        assert_eq!(initial_size(640, 320, 300.0), (300.0, 150.0));
        assert_eq!(initial_size(100, 400, 300.0), (75.0, 300.0));
        assert_eq!(initial_size(120, 80, 300.0), (120.0, 80.0));
    }
}
