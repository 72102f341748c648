//! Shared tiny-skia painting helpers for the scene renderers.

use tiny_skia::{
    Color, GradientStop, LinearGradient, Paint, Pixmap, Point, RadialGradient, Rect, SpreadMode,
    Transform,
};

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(r, g, b, a)
}

/// `hsla()` in CSS terms: hue in degrees, saturation/lightness in [0, 100].
pub fn hsla(hue: f64, saturation: f64, lightness: f64, alpha: f32) -> Color {
    let h = hue.rem_euclid(360.0) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    rgba(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        alpha,
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Fills the whole surface with a top-to-bottom linear gradient. Every scene
/// opens with this, so surfaces never carry pixels over from a prior frame.
pub fn fill_vertical_gradient(pixmap: &mut Pixmap, top: Color, bottom: Color) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;

    let mut paint = Paint::default();
    paint.anti_alias = false;
    let shader = LinearGradient::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(0.0, height),
        vec![
            GradientStop::new(0.0, top),
            GradientStop::new(1.0, bottom),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    match shader {
        Some(shader) => paint.shader = shader,
        // Degenerate gradient geometry; a flat fill keeps the invariant that
        // the background covers every pixel.
        None => paint.set_color(top),
    }

    if let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

/// Radial gradient shader centered on `(cx, cy)` with the given stops.
pub fn radial_shader(
    cx: f32,
    cy: f32,
    radius: f32,
    stops: Vec<GradientStop>,
) -> Option<tiny_skia::Shader<'static>> {
    RadialGradient::new(
        Point::from_xy(cx, cy),
        Point::from_xy(cx, cy),
        radius.max(1.0),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Element counts scale with canvas area so density stays constant across
/// resolutions; the floor keeps tiny canvases from rounding a scene empty.
pub fn area_scaled_count(width: u32, height: u32, per_pixels: u32, baseline: u32) -> u32 {
    let area = u64::from(width) * u64::from(height);
    let scaled = (area / u64::from(per_pixels.max(1))) as u32;
    (scaled + baseline).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsla_hits_primary_hues() {
        let red = hsla(0.0, 100.0, 50.0, 1.0);
        assert_eq!(red.to_color_u8().red(), 255);
        assert_eq!(red.to_color_u8().green(), 0);

        let green = hsla(120.0, 100.0, 50.0, 1.0);
        assert_eq!(green.to_color_u8().green(), 255);

        let blue = hsla(240.0, 100.0, 50.0, 1.0);
        assert_eq!(blue.to_color_u8().blue(), 255);
    }

    #[test]
    fn area_scaled_count_never_zero_and_monotone() {
        assert!(area_scaled_count(320, 180, 120_000, 0) >= 1);

        let small = area_scaled_count(320, 180, 16_000, 0);
        let medium = area_scaled_count(1280, 720, 16_000, 0);
        let large = area_scaled_count(1920, 1080, 16_000, 0);
        assert!(small <= medium && medium <= large);
    }

    #[test]
    fn vertical_gradient_touches_every_row() {
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        fill_vertical_gradient(&mut pixmap, rgb(255, 0, 0), rgb(0, 0, 255));
        for pixel in pixmap.pixels() {
            assert_eq!(pixel.alpha(), 255);
        }
    }
}
