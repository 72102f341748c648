//! Watermark overlay: fixed label anchored bottom-right, drawn after the
//! scene so it sits on top of every variant.

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::glyphs;
use crate::paint::rgba;

pub const WATERMARK_TEXT: &str = "ANIME VIDEO GENERATOR \u{2022} WEBM/VP9";

const INSET_PX: f32 = 20.0;
const MIN_FONT_PX: f32 = 14.0;
const FONT_WIDTH_FACTOR: f64 = 0.018;
/// Shadow offsets in glyph-atlas pixels; several translucent passes stand in
/// for the blurred drop shadow of the original.
const SHADOW_OFFSETS: [(f32, f32); 3] = [(1.0, 1.0), (2.0, 2.0), (1.0, 2.0)];

/// Draws the watermark label. `_elapsed_seconds` is part of the overlay
/// contract even though this label does not animate.
pub fn apply(pixmap: &mut Pixmap, _elapsed_seconds: f64, width: u32, height: u32) {
    let font_px = ((width as f64 * FONT_WIDTH_FACTOR).round() as f32).max(MIN_FONT_PX);
    let scale = font_px / glyphs::GLYPH_HEIGHT as f32;

    let text_width = glyphs::text_advance(WATERMARK_TEXT) as f32 * scale;
    let origin_x = width as f32 - text_width - INSET_PX;
    // The inset is measured to the text baseline, like the original canvas
    // fillText call.
    let origin_y = height as f32 - INSET_PX - font_px;

    for (dx, dy) in SHADOW_OFFSETS {
        draw_text(
            pixmap,
            origin_x + dx * scale,
            origin_y + dy * scale,
            scale,
            rgba(0, 0, 0, 0.25),
        );
    }
    draw_text(pixmap, origin_x, origin_y, scale, rgba(255, 255, 255, 0.72));
}

fn draw_text(pixmap: &mut Pixmap, origin_x: f32, origin_y: f32, scale: f32, color: tiny_skia::Color) {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(color);

    for (index, character) in WATERMARK_TEXT.chars().enumerate() {
        let glyph_x = origin_x + (index as u32 * glyphs::GLYPH_ADVANCE) as f32 * scale;
        for y in 0..glyphs::GLYPH_HEIGHT {
            for x in 0..glyphs::GLYPH_WIDTH {
                if !glyphs::sample(character, x, y) {
                    continue;
                }
                let rect = Rect::from_xywh(
                    glyph_x + x as f32 * scale,
                    origin_y + y as f32 * scale,
                    scale,
                    scale,
                );
                if let Some(rect) = rect {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::fill_vertical_gradient;
    use crate::paint::rgb;

    #[test]
    fn watermark_changes_bottom_right_corner() {
        let mut plain = Pixmap::new(640, 360).unwrap();
        fill_vertical_gradient(&mut plain, rgb(10, 10, 10), rgb(10, 10, 10));
        let mut marked = plain.clone();
        apply(&mut marked, 0.0, 640, 360);

        assert_ne!(plain.data(), marked.data());

        // All changed pixels live in the bottom band near the right inset.
        let width = plain.width() as usize;
        for (index, (before, after)) in plain
            .pixels()
            .iter()
            .zip(marked.pixels().iter())
            .enumerate()
        {
            if before != after {
                let x = index % width;
                let y = index / width;
                assert!(y >= 300, "pixel ({x},{y}) changed outside anchor band");
                assert!(x >= 200, "pixel ({x},{y}) changed outside anchor band");
            }
        }
    }

    #[test]
    fn font_floor_applies_at_minimum_canvas() {
        // Just ensure the overlay draws without panicking at 320x180 and
        // still lands inside the surface.
        let mut pixmap = Pixmap::new(320, 180).unwrap();
        fill_vertical_gradient(&mut pixmap, rgb(0, 0, 0), rgb(0, 0, 0));
        apply(&mut pixmap, 3.5, 320, 180);
        assert!(pixmap.pixels().iter().any(|p| p.red() > 0));
    }
}
