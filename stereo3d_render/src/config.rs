// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Options from TOML.
//!
//! Every key is optional and falls back to the [`StereoOptions`] default:
//!
//! ```toml
//! mode = "interlaced-row"
//! fov = 60.0
//! max_disparity = 15.0
//! depth = 0.5
//! lighting_strength = 0.5
//! edges_strength = 0.5
//! invert_eyes = false
//! draw_mouse = true
//! window_match = "type=Normal | class=Firefox"
//! ```
//!
//! Out-of-range numbers are repaired with a warning rather than rejected.
//! Match expressions that do not parse are rejected.

use std::path::Path;

use stereo3d_core::matching::{MatchError, MatchExpr, WindowMatchSet};
use stereo3d_core::options::StereoOptions;

use crate::error::ConfigError;

/// Parses options from TOML text, then sanitizes and validates them.
pub fn from_toml_str(text: &str) -> Result<StereoOptions, ConfigError> {
    let mut options: StereoOptions = toml::from_str(text)?;
    sanitize(&mut options);
    match_set(&options).map_err(|(which, source)| ConfigError::Match { which, source })?;
    Ok(options)
}

/// Reads options from a TOML file.
pub fn load(path: &Path) -> Result<StereoOptions, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_toml_str(&text)
}

/// Reads options from `path` if it names an existing file, otherwise
/// returns the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<StereoOptions, ConfigError> {
    match path {
        Some(path) if path.exists() => load(path),
        _ => Ok(StereoOptions::default()),
    }
}

/// Brings numeric options back into their valid ranges.
///
/// Depth must be positive and the field of view strictly between 0 and 180
/// degrees; invalid values are replaced by the defaults. Disparity is at
/// least 0 and strengths are clamped to `[0, 1]`.
pub fn sanitize(options: &mut StereoOptions) {
    let defaults = StereoOptions::default();
    if !(options.depth.is_finite() && options.depth > 0.0) {
        log::warn!("depth {} is not positive, using {}", options.depth, defaults.depth);
        options.depth = defaults.depth;
    }
    if !(options.fov > 0.0 && options.fov < 180.0) {
        log::warn!("fov {} is out of range, using {}", options.fov, defaults.fov);
        options.fov = defaults.fov;
    }
    if !(options.max_disparity.is_finite() && options.max_disparity >= 0.0) {
        log::warn!(
            "max_disparity {} is invalid, using {}",
            options.max_disparity,
            defaults.max_disparity
        );
        options.max_disparity = defaults.max_disparity;
    }
    clamp_unit("lighting_strength", &mut options.lighting_strength);
    clamp_unit("edges_strength", &mut options.edges_strength);
}

fn clamp_unit(name: &str, value: &mut f64) {
    if (0.0..=1.0).contains(&*value) {
        return;
    }
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    log::warn!("{name} {value} is outside [0, 1], using {clamped}");
    *value = clamped;
}

/// Parses the three match expressions, naming the one that failed.
pub(crate) fn match_set(
    options: &StereoOptions,
) -> Result<WindowMatchSet, (&'static str, MatchError)> {
    let parse = |which: &'static str, src: &str| MatchExpr::parse(src).map_err(|e| (which, e));
    Ok(WindowMatchSet {
        desktop: parse("desktop", &options.desktop_match)?,
        dock: parse("dock", &options.dock_match)?,
        window: parse("window", &options.window_match)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo3d_core::options::StereoMode;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(from_toml_str("").unwrap(), StereoOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let options = from_toml_str(
            r#"
            mode = "interlaced-column"
            invert_eyes = true
            dock_match = "type=Dock | class=Plank"
            "#,
        )
        .unwrap();
        assert_eq!(options.mode, StereoMode::InterlacedColumn);
        assert!(options.invert_eyes);
        assert_eq!(options.dock_match, "type=Dock | class=Plank");
        assert_eq!(options.fov, StereoOptions::default().fov);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = from_toml_str(r#"mode = "hologram""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn bad_match_names_the_expression() {
        let err = from_toml_str(r#"window_match = "type=Normal |""#).unwrap_err();
        match err {
            ConfigError::Match { which, .. } => assert_eq!(which, "window"),
            other => panic!("expected a match error, got {other:?}"),
        }
    }

    #[test]
    fn sanitize_repairs_ranges() {
        let mut options = StereoOptions {
            depth: -1.0,
            fov: 180.0,
            max_disparity: -3.0,
            lighting_strength: 1.5,
            edges_strength: -0.25,
            ..StereoOptions::default()
        };
        sanitize(&mut options);
        let defaults = StereoOptions::default();
        assert_eq!(options.depth, defaults.depth);
        assert_eq!(options.fov, defaults.fov);
        assert_eq!(options.max_disparity, defaults.max_disparity);
        assert_eq!(options.lighting_strength, 1.0);
        assert_eq!(options.edges_strength, 0.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/stereo3d.toml");
        assert_eq!(
            load_or_default(Some(path)).unwrap(),
            StereoOptions::default()
        );
        assert!(matches!(load(path), Err(ConfigError::Read { .. })));
    }
}
