//! End-to-end configuration handling: resolution fallbacks, duration
//! clamping, and recipe files on disk.

use std::fs;

use animegen::recipe::load_recipe;
use animegen::schema::{normalize_duration, Resolution, Variant};
use tempfile::TempDir;

#[test]
fn malformed_resolution_strings_never_fail() {
    for raw in ["", "abc", "x720", "1280x", "-5x-5", "1280×720", "99999999999x2"] {
        let resolution = Resolution::parse_or_default(raw);
        assert!(resolution.width >= 320, "raw {raw:?}");
        assert!(resolution.height >= 180, "raw {raw:?}");
    }
}

#[test]
fn duration_edge_cases() {
    assert_eq!(normalize_duration(Some(0.0)), 5.0);
    assert_eq!(normalize_duration(Some(-3.0)), 5.0);
    assert_eq!(normalize_duration(Some(f64::INFINITY)), 5.0);
    assert_eq!(normalize_duration(Some(1.0)), 1.0);
    assert_eq!(normalize_duration(Some(20.0)), 20.0);
    assert_eq!(normalize_duration(Some(20.01)), 20.0);
}

#[test]
fn recipe_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.json");
    fs::write(
        &path,
        r#"{"style": "neon", "resolution": "640x360", "duration_seconds": 3.0}"#,
    )
    .unwrap();

    let recipe = load_recipe(&path).unwrap();
    assert_eq!(recipe.style, Variant::Neon);
    let config = recipe.render_config();
    assert_eq!((config.width, config.height), (640, 360));
    assert_eq!(recipe.duration(), 3.0);
}

#[test]
fn recipe_with_invalid_json_names_the_location() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"style\": \"neon\",\n  \"resolution\": }").unwrap();

    let error = load_recipe(&path).unwrap_err();
    let message = format!("{error}");
    assert!(message.contains("line 2"), "{message}");
}

#[test]
fn missing_recipe_file_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");
    let error = load_recipe(&path).unwrap_err();
    assert!(format!("{error:#}").contains("nope.json"));
}

#[test]
fn recipe_with_unknown_style_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.json");
    fs::write(&path, r#"{"style": "vaporwave"}"#).unwrap();
    assert!(load_recipe(&path).is_err());
}
