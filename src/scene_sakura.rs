//! Sakura Drift: dusk gradient, oscillating skyline silhouette, a field of
//! drifting petals and soft rotating light rays.
//!
//! Everything is a closed-form function of `(t, width, height)` plus the
//! deterministic hash field; there is no per-petal state between frames.

use std::f64::consts::PI;

use tiny_skia::{
    BlendMode, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, Rect,
    SpreadMode, Transform,
};

use crate::field::hash;
use crate::paint::{area_scaled_count, fill_vertical_gradient, rgb, rgba};

const SKY_TOP: (u8, u8, u8) = (12, 16, 42);
const SKY_BOTTOM: (u8, u8, u8) = (245, 115, 255);
const SKYLINE_SEGMENTS: u32 = 8;
const PETAL_AREA_DIVISOR: u32 = 40_000;
const PETAL_BASELINE: u32 = 40;
const PETAL_SEED_STRIDE: i64 = 999_983;
const RAY_COUNT: u32 = 16;

pub fn petal_count(width: u32, height: u32) -> u32 {
    area_scaled_count(width, height, PETAL_AREA_DIVISOR, PETAL_BASELINE)
}

pub fn render(pixmap: &mut Pixmap, t: f64, width: u32, height: u32) {
    let w = width as f64;
    let h = height as f64;

    fill_vertical_gradient(
        pixmap,
        rgb(SKY_TOP.0, SKY_TOP.1, SKY_TOP.2),
        rgb(SKY_BOTTOM.0, SKY_BOTTOM.1, SKY_BOTTOM.2),
    );

    draw_skyline(pixmap, t, w, h);

    for i in 0..petal_count(width, height) {
        let seed = i64::from(i) * PETAL_SEED_STRIDE;
        let drift_x = t * (30.0 + hash(seed + 7) * 50.0);
        let px = (hash(seed + 13) * w + drift_x.rem_euclid(w)).rem_euclid(w);
        let py = (hash(seed + 29) * h + t * (40.0 + hash(seed + 3) * 80.0)).rem_euclid(h);
        let size = 4.0 + hash(seed + 5) * 10.0 * (w / 1280.0);
        let rotation = t * (1.0 + hash(seed + 11) * 2.0) + hash(seed + 19) * PI;

        draw_petal(pixmap, px, py, size, rotation);
    }

    draw_sun_rays(pixmap, t, w, h);
}

/// Jagged silhouette whose vertex heights oscillate with a phase shift per
/// horizontal index, alternating tall and short peaks.
fn draw_skyline(pixmap: &mut Pixmap, t: f64, w: f64, h: f64) {
    let mut pb = PathBuilder::new();
    pb.move_to(0.0, (h * 0.7) as f32);
    for i in 0..=SKYLINE_SEGMENTS {
        let x = f64::from(i) / f64::from(SKYLINE_SEGMENTS) * w;
        let tall = if i % 2 == 0 { 40.0 } else { 0.0 };
        let y = h * 0.7 - (f64::from(i) * 0.9 + t * 0.4).sin() * 20.0 - tall;
        pb.line_to(x as f32, y as f32);
    }
    pb.line_to(w as f32, h as f32);
    pb.line_to(0.0, h as f32);
    pb.close();

    let Some(path) = pb.finish() else { return };
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(rgb(0x12, 0x16, 0x2a));
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

/// Four-lobe curved outline centered on the petal position, rotated and
/// backed by a wider translucent pass that stands in for the original's glow.
fn draw_petal(pixmap: &mut Pixmap, x: f64, y: f64, size: f64, rotation: f64) {
    let transform =
        Transform::from_rotate(rotation.to_degrees() as f32).post_translate(x as f32, y as f32);

    if let Some(glow) = petal_path(size * 1.35) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(rgba(255, 105, 180, 0.3));
        pixmap.fill_path(&glow, &paint, FillRule::Winding, transform, None);
    }

    if let Some(petal) = petal_path(size) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(rgba(255, 182, 193, 0.8));
        pixmap.fill_path(&petal, &paint, FillRule::Winding, transform, None);
    }
}

fn petal_path(s: f64) -> Option<tiny_skia::Path> {
    let s = s as f32;
    let mut pb = PathBuilder::new();
    pb.move_to(0.0, -s * 0.5);
    pb.quad_to(s * 0.8, -s * 0.8, s * 0.5, 0.0);
    pb.quad_to(s * 0.8, s * 0.8, 0.0, s * 0.5);
    pb.quad_to(-s * 0.8, s * 0.8, -s * 0.5, 0.0);
    pb.quad_to(-s * 0.8, -s * 0.8, 0.0, -s * 0.5);
    pb.close();
    pb.finish()
}

/// Sixteen beams swinging slowly around a point above the horizon. The
/// rotation accumulates per ray, as in the original, so the fan breathes
/// instead of spinning rigidly. Lighten blending brightens without washing
/// out the sky.
fn draw_sun_rays(pixmap: &mut Pixmap, t: f64, w: f64, h: f64) {
    let cx = (w * 0.5) as f32;
    let cy = (h * 0.2) as f32;
    let Some(rect) = Rect::from_xywh(0.0, -2.0, w as f32, 4.0) else {
        return;
    };

    let mut angle = 0.0_f64;
    for i in 0..RAY_COUNT {
        angle += 2.0 * PI / f64::from(RAY_COUNT) + (t * 0.2 + f64::from(i)).sin() * 0.005;

        let shader = LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(w as f32, 0.0),
            vec![
                GradientStop::new(0.0, rgba(255, 255, 255, 0.0)),
                GradientStop::new(0.3, rgba(255, 255, 255, 0.07)),
                GradientStop::new(1.0, rgba(255, 255, 255, 0.0)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );
        let Some(shader) = shader else { continue };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.shader = shader;
        paint.blend_mode = BlendMode::Lighten;

        let transform =
            Transform::from_rotate(angle.to_degrees() as f32).post_translate(cx, cy);
        pixmap.fill_rect(rect, &paint, transform, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn petal_count_scales_with_area() {
        let small = petal_count(320, 180);
        let hd = petal_count(1280, 720);
        let fhd = petal_count(1920, 1080);
        assert!(small >= 1);
        assert!(small <= hd && hd <= fhd);
        assert_eq!(hd, (1280 * 720) / PETAL_AREA_DIVISOR + PETAL_BASELINE);
    }

    #[test]
    fn renders_at_minimum_canvas() {
        let mut pixmap = Pixmap::new(320, 180).unwrap();
        render(&mut pixmap, 1.25, 320, 180);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 255));
    }
}
