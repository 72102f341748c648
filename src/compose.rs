//! Frame Composer: the single frame-drawing entry point shared by the
//! preview driver and the capture session.

use tiny_skia::Pixmap;

use crate::schema::{RenderConfig, Variant};
use crate::{scene_neon, scene_sakura, scene_speedlines, watermark};

/// Paints one complete frame: the scene selected by `config.variant`, then
/// the watermark on top. This is the only place that knows the variant enum.
///
/// Rendering is a pure function of `(variant, elapsed_seconds, width,
/// height)`; the same inputs always reproduce the same pixels.
pub fn compose_frame(pixmap: &mut Pixmap, elapsed_seconds: f64, config: &RenderConfig) {
    let width = config.width;
    let height = config.height;

    match config.variant {
        Variant::Sakura => scene_sakura::render(pixmap, elapsed_seconds, width, height),
        Variant::Speedlines => scene_speedlines::render(pixmap, elapsed_seconds, width, height),
        Variant::Neon => scene_neon::render(pixmap, elapsed_seconds, width, height),
    }

    watermark::apply(pixmap, elapsed_seconds, width, height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RenderConfig, Resolution, Variant};

    fn config(variant: Variant) -> RenderConfig {
        RenderConfig::new(variant, Resolution::parse_or_default("320x180"))
    }

    #[test]
    fn every_variant_fully_overwrites_the_surface() {
        for variant in [Variant::Sakura, Variant::Speedlines, Variant::Neon] {
            let mut pixmap = Pixmap::new(320, 180).unwrap();
            compose_frame(&mut pixmap, 0.5, &config(variant));
            assert!(
                pixmap.pixels().iter().all(|p| p.alpha() == 255),
                "{variant:?} left untouched pixels"
            );
        }
    }

    #[test]
    fn variants_produce_distinct_frames() {
        let mut sakura = Pixmap::new(320, 180).unwrap();
        let mut neon = Pixmap::new(320, 180).unwrap();
        compose_frame(&mut sakura, 1.0, &config(Variant::Sakura));
        compose_frame(&mut neon, 1.0, &config(Variant::Neon));
        assert_ne!(sakura.data(), neon.data());
    }
}
