//! Neon Grid: a scrolling grid over a near-black teal-to-violet gradient with
//! drifting radial glow blobs.

use tiny_skia::{GradientStop, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::field::hash;
use crate::paint::{area_scaled_count, fill_vertical_gradient, hsla, radial_shader, rgb, rgba};

const GRID_SIZE: f64 = 40.0;
const GRID_SCROLL_PX_PER_SECOND: f64 = 40.0;
const GLOW_AREA_DIVISOR: u32 = 120_000;
const GLOW_BASELINE: u32 = 12;
const GLOW_SEED_STRIDE: i64 = 81_173;

pub fn glow_count(width: u32, height: u32) -> u32 {
    area_scaled_count(width, height, GLOW_AREA_DIVISOR, GLOW_BASELINE)
}

pub fn render(pixmap: &mut Pixmap, t: f64, width: u32, height: u32) {
    let w = width as f64;
    let h = height as f64;

    fill_vertical_gradient(pixmap, rgb(0x00, 0x12, 0x19), rgb(0x05, 0x01, 0x0f));

    draw_grid(pixmap, t, w, h);

    for i in 0..glow_count(width, height) {
        let seed = i64::from(i) * GLOW_SEED_STRIDE;
        let x = (hash(seed + 2) * w + t * (20.0 + hash(seed + 9) * 80.0)).rem_euclid(w);
        let y = (hash(seed + 4) * h + (t * 0.8 + f64::from(i)).sin() * 60.0 + h).rem_euclid(h);
        let radius = 20.0 + hash(seed + 6) * 120.0 * (w / 1280.0);
        let hue = 180.0 + (hash(seed + 8) * 180.0).floor();

        draw_glow(pixmap, x, y, radius, hue);
    }
}

/// Uniform square grid whose offset advances with time and wraps at the cell
/// size, so the scroll loops seamlessly.
fn draw_grid(pixmap: &mut Pixmap, t: f64, w: f64, h: f64) {
    let offset = (t * GRID_SCROLL_PX_PER_SECOND).rem_euclid(GRID_SIZE);

    let mut pb = PathBuilder::new();
    let mut x = -GRID_SIZE;
    while x < w + GRID_SIZE {
        pb.move_to((x + offset) as f32, 0.0);
        pb.line_to((x + offset) as f32, h as f32);
        x += GRID_SIZE;
    }
    let mut y = -GRID_SIZE;
    while y < h + GRID_SIZE {
        pb.move_to(0.0, (y + offset) as f32);
        pb.line_to(w as f32, (y + offset) as f32);
        y += GRID_SIZE;
    }

    let Some(path) = pb.finish() else { return };
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(rgba(0, 231, 255, 0.35));

    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn draw_glow(pixmap: &mut Pixmap, x: f64, y: f64, radius: f64, hue: f64) {
    let shader = radial_shader(
        x as f32,
        y as f32,
        radius as f32,
        vec![
            GradientStop::new(0.0, hsla(hue, 100.0, 60.0, 0.9)),
            GradientStop::new(1.0, hsla(hue, 100.0, 60.0, 0.0)),
        ],
    );
    let Some(shader) = shader else { return };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = shader;

    let rect = Rect::from_xywh(
        (x - radius) as f32,
        (y - radius) as f32,
        (radius * 2.0) as f32,
        (radius * 2.0) as f32,
    );
    if let Some(rect) = rect {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}
