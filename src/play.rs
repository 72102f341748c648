#![cfg(feature = "play")]
//! Windowed preview of the animation loop. Keys 1/2/3 switch the variant,
//! Space pauses, R restarts the loop clock, Escape quits.

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tiny_skia::Pixmap;

use crate::clock::MonotonicClock;
use crate::driver::{AnimationDriver, FixedCadence, TickScheduler};
use crate::schema::{RenderConfig, Variant, CAPTURE_FPS};

/// Scheduler for a driver whose ticks are paced by the window loop itself;
/// it always grants the next tick immediately.
struct HostPaced;

impl TickScheduler for HostPaced {
    fn next_tick(&mut self) -> bool {
        true
    }
}

pub fn run_play(config: RenderConfig) -> Result<()> {
    config.validate()?;
    let width = config.width as usize;
    let height = config.height as usize;

    let mut window = Window::new(
        &format!("animegen - {}", config.variant.label()),
        width,
        height,
        WindowOptions::default(),
    )
    .map_err(|error| anyhow!("failed to create preview window: {error}"))?;

    let mut surface = Pixmap::new(config.width, config.height)
        .ok_or_else(|| anyhow!("failed to allocate {}x{} surface", config.width, config.height))?;
    let mut framebuffer = vec![0_u32; width * height];

    // The window loop below is the one cadence source; the driver itself is
    // host-paced.
    let mut cadence = FixedCadence::new(CAPTURE_FPS);
    let mut driver = AnimationDriver::new(
        Box::new(MonotonicClock::new()),
        Box::new(HostPaced),
        config,
    );
    driver.start();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if driver.tick(&mut surface).is_some() {
            pack_0rgb(&surface, &mut framebuffer);
        }
        window
            .update_with_buffer(&framebuffer, width, height)
            .map_err(|error| anyhow!("failed to present preview frame: {error}"))?;

        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            // Pausing freezes the loop clock; resuming restarts it from the
            // top of the loop rather than mid-phrase.
            match driver.elapsed_seconds() {
                Some(_) => driver.stop(),
                None => driver.start(),
            }
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            driver.start();
        }
        for (key, variant) in [
            (Key::Key1, Variant::Sakura),
            (Key::Key2, Variant::Speedlines),
            (Key::Key3, Variant::Neon),
        ] {
            if window.is_key_pressed(key, KeyRepeat::No) {
                let mut next = *driver.config();
                next.variant = variant;
                driver.set_config(next);
                window.set_title(&format!("animegen - {}", variant.label()));
            }
        }

        cadence.next_tick();
    }

    Ok(())
}

fn pack_0rgb(surface: &Pixmap, framebuffer: &mut [u32]) {
    for (slot, pixel) in framebuffer.iter_mut().zip(surface.pixels()) {
        let p = pixel.demultiply();
        *slot = (u32::from(p.red()) << 16) | (u32::from(p.green()) << 8) | u32::from(p.blue());
    }
}
