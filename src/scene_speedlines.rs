//! Speedlines: horizontal motion-blur streaks racing across a dark purple
//! gradient, framed by a radial vignette.

use tiny_skia::{
    GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, Rect, SpreadMode, Stroke,
    Transform,
};

use crate::field::hash;
use crate::paint::{area_scaled_count, fill_vertical_gradient, hsla, radial_shader, rgb, rgba};

const STREAK_AREA_DIVISOR: u32 = 16_000;
const STREAK_SEED_STRIDE: i64 = 92_821;
const HUE_BASE: f64 = 260.0;
const HUE_BAND: f64 = 100.0;

pub fn streak_count(width: u32, height: u32) -> u32 {
    area_scaled_count(width, height, STREAK_AREA_DIVISOR, 0)
}

pub fn render(pixmap: &mut Pixmap, t: f64, width: u32, height: u32) {
    let w = width as f64;
    let h = height as f64;

    fill_vertical_gradient(pixmap, rgb(0x0b, 0x0d, 0x16), rgb(0x1a, 0x10, 0x40));

    for i in 0..streak_count(width, height) {
        let seed = i64::from(i) * STREAK_SEED_STRIDE;
        let travel = t * (400.0 + hash(seed + 5) * 600.0);
        let base_x = (hash(seed + 1) * w + travel.rem_euclid(w)).rem_euclid(w);
        let y = hash(seed + 3) * h;
        let length = 60.0 + hash(seed + 7) * (w * 0.4);
        let thickness = 1.0 + hash(seed + 11) * 6.0;
        let hue = HUE_BASE + (hash(seed + 13) * HUE_BAND).floor();

        draw_streak(pixmap, base_x, y, length, thickness, hue);
    }

    draw_vignette(pixmap, w, h);
}

/// One streak: a horizontal line stroked with a transparent-opaque-transparent
/// gradient, which reads as motion blur.
fn draw_streak(pixmap: &mut Pixmap, base_x: f64, y: f64, length: f64, thickness: f64, hue: f64) {
    let x0 = (base_x - length) as f32;
    let x1 = (base_x + length) as f32;
    let y = y as f32;

    let shader = LinearGradient::new(
        Point::from_xy(x0, y),
        Point::from_xy(x1, y),
        vec![
            GradientStop::new(0.0, hsla(hue, 100.0, 60.0, 0.0)),
            GradientStop::new(0.5, hsla(hue, 100.0, 60.0, 0.9)),
            GradientStop::new(1.0, hsla(hue, 100.0, 60.0, 0.0)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    let Some(shader) = shader else { return };

    let mut pb = PathBuilder::new();
    pb.move_to(x0, y);
    pb.line_to(x1, y);
    let Some(path) = pb.finish() else { return };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = shader;

    let stroke = Stroke {
        width: thickness as f32,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Darkens the frame edges: clear out to 20% of the width, then falling to
/// 45% black at 80% of the width.
fn draw_vignette(pixmap: &mut Pixmap, w: f64, h: f64) {
    let outer = (w * 0.8) as f32;
    let inner_stop = 0.25; // (w * 0.2) / (w * 0.8)
    let shader = radial_shader(
        (w / 2.0) as f32,
        (h / 2.0) as f32,
        outer,
        vec![
            GradientStop::new(0.0, rgba(0, 0, 0, 0.0)),
            GradientStop::new(inner_stop, rgba(0, 0, 0, 0.0)),
            GradientStop::new(1.0, rgba(0, 0, 0, 0.45)),
        ],
    );
    let Some(shader) = shader else { return };

    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.shader = shader;

    if let Some(rect) = Rect::from_xywh(0.0, 0.0, w as f32, h as f32) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_count_is_denser_than_sakura_petals() {
        // Finer area divisor means more streaks than petals before baselines.
        let streaks = streak_count(1280, 720);
        assert_eq!(streaks, (1280 * 720) / STREAK_AREA_DIVISOR);
        assert!(streaks > (1280 * 720) / 40_000);
    }

    #[test]
    fn streak_count_floors_at_one() {
        assert!(streak_count(320, 180) >= 1);
    }

    #[test]
    fn renders_at_minimum_canvas() {
        let mut pixmap = Pixmap::new(320, 180).unwrap();
        render(&mut pixmap, 0.0, 320, 180);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 255));
    }
}
