//! Canvas2D software renderer.
//!
//! Paints the drawables produced by `tk-render` onto an HTML `<canvas>`
//! via `CanvasRenderingContext2d`, plus the transform handle overlay.
//! Export reuses the same path without the overlay.

use kurbo::{Affine, BezPath, RoundedRect, Shape};
use std::collections::HashMap;
use tk_core::config::HandleConfig;
use tk_core::model::{BoundingBox, Shadow, TextAlign, TextWrap};
use tk_render::{Anchor, Drawable, anchor_positions, box_transform, wrap_words};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, Path2d};

const HANDLE_STROKE: &str = "#4FC3F7";
const HANDLE_FILL: &str = "#FFFFFF";

/// Decoded images by picture key.
pub type ImageCache = HashMap<String, HtmlImageElement>;

/// Paint every drawable in order, scaled by `zoom`.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    drawables: &[Drawable],
    images: &ImageCache,
    zoom: f64,
) {
    ctx.save();
    let _ = ctx.set_transform(zoom, 0.0, 0.0, zoom, 0.0, 0.0);
    for d in drawables {
        ctx.save();
        apply_transform(ctx, d.transform());
        match d {
            Drawable::Path {
                path,
                fill,
                stroke,
                shadow,
                ..
            } => draw_path(ctx, path, fill.map(|c| c.to_css()), stroke.as_ref(), shadow),
            Drawable::Text {
                lines,
                font,
                line_height,
                color,
                align,
                width,
                wrap,
                shadow,
                ..
            } => {
                apply_shadow(ctx, shadow);
                ctx.set_font(font);
                ctx.set_fill_style_str(&color.to_css());
                ctx.set_text_baseline("top");
                let (x, css_align) = match align {
                    TextAlign::Left => (0.0, "left"),
                    TextAlign::Center => (*width as f64 / 2.0, "center"),
                    TextAlign::Right => (*width as f64, "right"),
                };
                ctx.set_text_align(css_align);
                let lines = match wrap {
                    TextWrap::Word => wrap_words(lines, *width as f64, |s| {
                        ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0)
                    }),
                    TextWrap::None => lines.clone(),
                };
                for (i, line) in lines.iter().enumerate() {
                    let _ = ctx.fill_text(line, x, i as f64 * *line_height as f64);
                }
            }
            Drawable::Image {
                key,
                rect,
                corner_radius,
                shadow,
                ..
            } => match images.get(key) {
                Some(img) => {
                    apply_shadow(ctx, shadow);
                    if *corner_radius > 0.0 {
                        let clip = RoundedRect::from_rect(*rect, *corner_radius as f64);
                        if let Some(p) = path2d(&clip.to_path(0.1)) {
                            ctx.clip_with_path_2d(&p);
                        }
                    }
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height(),
                    );
                }
                None => log::warn!("image `{key}` is not loaded"),
            },
        }
        ctx.restore();
    }
    ctx.restore();
}

fn draw_path(
    ctx: &CanvasRenderingContext2d,
    path: &BezPath,
    fill: Option<String>,
    stroke: Option<&tk_render::Stroke>,
    shadow: &Option<Shadow>,
) {
    let Some(p) = path2d(path) else {
        return;
    };
    apply_shadow(ctx, shadow);
    if let Some(fill) = fill {
        ctx.set_fill_style_str(&fill);
        ctx.fill_with_path_2d(&p);
    }
    if let Some(stroke) = stroke {
        ctx.set_stroke_style_str(&stroke.color.to_css());
        ctx.set_line_width(stroke.width as f64);
        ctx.stroke_with_path(&p);
    }
}

/// Draw the handle box with its anchors. Sizes stay constant on screen
/// regardless of zoom.
pub fn draw_handle(
    ctx: &CanvasRenderingContext2d,
    b: &BoundingBox,
    cfg: &HandleConfig,
    zoom: f64,
) {
    ctx.save();
    let _ = ctx.set_transform(zoom, 0.0, 0.0, zoom, 0.0, 0.0);
    ctx.set_stroke_style_str(HANDLE_STROKE);
    ctx.set_fill_style_str(HANDLE_FILL);
    ctx.set_line_width(1.5 / zoom);

    ctx.save();
    apply_transform(ctx, box_transform(b));
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0 / zoom),
        &JsValue::from_f64(3.0 / zoom),
    ));
    ctx.stroke_rect(0.0, 0.0, b.width as f64, b.height as f64);
    ctx.begin_path();
    ctx.move_to(b.width as f64 / 2.0, 0.0);
    ctx.line_to(b.width as f64 / 2.0, -(cfg.rotate_offset as f64));
    ctx.stroke();
    ctx.restore();

    let size = cfg.anchor_size as f64 / zoom;
    for (anchor, p) in anchor_positions(b, cfg) {
        ctx.begin_path();
        if anchor == Anchor::Rotate {
            let _ = ctx.arc(p.x, p.y, size / 2.0, 0.0, std::f64::consts::TAU);
        } else {
            ctx.rect(p.x - size / 2.0, p.y - size / 2.0, size, size);
        }
        ctx.fill();
        ctx.stroke();
    }
    ctx.restore();
}

fn apply_transform(ctx: &CanvasRenderingContext2d, xf: Affine) {
    let [a, b, c, d, e, f] = xf.as_coeffs();
    let _ = ctx.transform(a, b, c, d, e, f);
}

fn path2d(path: &BezPath) -> Option<Path2d> {
    Path2d::new_with_path_string(&path.to_svg()).ok()
}

/// Apply a CSS drop shadow, or clear it.
fn apply_shadow(ctx: &CanvasRenderingContext2d, shadow: &Option<Shadow>) {
    match shadow {
        Some(s) => {
            ctx.set_shadow_blur(s.blur as f64);
            ctx.set_shadow_offset_x(s.offset_x as f64);
            ctx.set_shadow_offset_y(s.offset_y as f64);
            ctx.set_shadow_color(&s.color.to_css());
        }
        None => {
            ctx.set_shadow_blur(0.0);
            ctx.set_shadow_offset_x(0.0);
            ctx.set_shadow_offset_y(0.0);
            ctx.set_shadow_color("transparent");
        }
    }
}
