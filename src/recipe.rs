//! JSON capture recipes: a small on-disk description of one capture job, so
//! repeated renders do not depend on remembering CLI flags.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::schema::{normalize_duration, RenderConfig, Resolution, Variant, DEFAULT_BITRATE};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    pub style: Variant,
    /// `"WxH"`, parsed with the same fallbacks as the CLI flag.
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub bitrate: Option<u32>,
}

impl Recipe {
    pub fn render_config(&self) -> RenderConfig {
        let resolution = self
            .resolution
            .as_deref()
            .map(Resolution::parse_or_default)
            .unwrap_or_default();
        RenderConfig::new(self.style, resolution)
    }

    pub fn duration(&self) -> f64 {
        normalize_duration(self.duration_seconds)
    }

    pub fn bitrate(&self) -> u32 {
        self.bitrate.unwrap_or(DEFAULT_BITRATE)
    }
}

pub fn load_recipe(path: &Path) -> Result<Recipe> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read recipe {}", path.display()))?;
    let recipe: Recipe = serde_json::from_str(&contents).map_err(|error| {
        anyhow!(
            "failed to parse json in {} at line {}, column {}: {}",
            path.display(),
            error.line(),
            error.column(),
            error
        )
    })?;
    recipe.render_config().validate()?;
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_recipe_uses_defaults() {
        let recipe: Recipe = serde_json::from_str(r#"{"style": "neon"}"#).unwrap();
        assert_eq!(recipe.style, Variant::Neon);
        let config = recipe.render_config();
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(recipe.duration(), 5.0);
        assert_eq!(recipe.bitrate(), DEFAULT_BITRATE);
    }

    #[test]
    fn full_recipe_round_trips_fields() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"style": "sakura", "resolution": "1920x1080", "duration_seconds": 8.0, "bitrate": 4000000}"#,
        )
        .unwrap();
        let config = recipe.render_config();
        assert_eq!(config.variant, Variant::Sakura);
        assert_eq!((config.width, config.height), (1920, 1080));
        assert_eq!(recipe.duration(), 8.0);
        assert_eq!(recipe.bitrate(), 4_000_000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<Recipe>(r#"{"style": "neon", "fps": 30}"#);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_duration_is_clamped() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"style": "speedlines", "duration_seconds": 90.0}"#).unwrap();
        assert_eq!(recipe.duration(), 20.0);
    }
}
