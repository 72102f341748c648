use anyhow::{bail, Result};
use serde::Deserialize;

pub const MIN_WIDTH: u32 = 320;
pub const MIN_HEIGHT: u32 = 180;
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

pub const MIN_DURATION_SECONDS: f64 = 1.0;
pub const MAX_DURATION_SECONDS: f64 = 20.0;
pub const DEFAULT_DURATION_SECONDS: f64 = 5.0;

pub const DEFAULT_BITRATE: u32 = 6_000_000;
pub const CAPTURE_FPS: u32 = 60;

/// One of the three selectable scene renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum Variant {
    Sakura,
    Speedlines,
    Neon,
}

impl Variant {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Sakura => "sakura",
            Self::Speedlines => "speedlines",
            Self::Neon => "neon",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sakura => "Sakura Drift",
            Self::Speedlines => "Speedlines",
            Self::Neon => "Neon Grid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Parses a `"WxH"` string defensively: malformed input falls back to the
    /// default 1280x720 and both axes are floored to the minimum supported
    /// canvas size. There is no fail state for a purely visual default.
    pub fn parse_or_default(raw: &str) -> Self {
        let mut parts = raw.trim().splitn(2, ['x', 'X']);
        let width = parts
            .next()
            .and_then(|part| part.trim().parse::<u32>().ok())
            .filter(|&value| value > 0)
            .unwrap_or(DEFAULT_WIDTH);
        let height = parts
            .next()
            .and_then(|part| part.trim().parse::<u32>().ok())
            .filter(|&value| value > 0)
            .unwrap_or(DEFAULT_HEIGHT);

        Self {
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Immutable per-frame rendering configuration. May be swapped between ticks;
/// the next frame simply renders under the new value, no carry-over state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub variant: Variant,
    pub width: u32,
    pub height: u32,
}

impl RenderConfig {
    pub fn new(variant: Variant, resolution: Resolution) -> Self {
        Self {
            variant,
            width: resolution.width,
            height: resolution.height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            bail!(
                "canvas must be at least {}x{}, got {}x{}",
                MIN_WIDTH,
                MIN_HEIGHT,
                self.width,
                self.height
            );
        }
        Ok(())
    }
}

/// Clamps a requested capture duration to the supported [1, 20] second range.
/// Non-finite or missing values fall back to the 5 second default.
pub fn normalize_duration(requested: Option<f64>) -> f64 {
    match requested {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
            seconds.clamp(MIN_DURATION_SECONDS, MAX_DURATION_SECONDS)
        }
        _ => DEFAULT_DURATION_SECONDS,
    }
}
