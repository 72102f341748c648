//! animegen: a headless generator of short looping anime-style motion
//! graphics, captured to WebM through an external encoder.
//!
//! Rendering is CPU-only and deterministic: every frame is a pure function of
//! the selected variant, the canvas size, and elapsed seconds.

pub mod capture;
pub mod clock;
pub mod compose;
pub mod driver;
pub mod encoding;
pub mod field;
pub mod glyphs;
pub mod paint;
pub mod recipe;
pub mod scene_neon;
pub mod scene_sakura;
pub mod scene_speedlines;
pub mod schema;
pub mod watermark;

#[cfg(feature = "play")]
pub mod play;
