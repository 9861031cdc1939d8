use std::{fs, io::ErrorKind, path::Path};

use anyhow::{ensure, Context, Result};
use gridcast_system_path_finding::Connectivity;
use gridcast_system_ray_casting::{RayCastConfig, DEFAULT_MAX_DISTANCE};
use serde::Deserialize;
use tracing::debug;

/// User-tunable settings read from a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Horizontal field of view, in degrees.
    pub(crate) fov_degrees: f32,
    /// Rays longer than this report no wall.
    pub(crate) max_ray_distance: f32,
    /// Rendered frame width in characters.
    pub(crate) screen_columns: u32,
    /// Rendered frame height in lines.
    pub(crate) screen_rows: u32,
    /// Neighbourhood used by the path finder.
    pub(crate) connectivity: Connectivity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            max_ray_distance: DEFAULT_MAX_DISTANCE,
            screen_columns: 80,
            screen_rows: 24,
            connectivity: Connectivity::Eight,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read settings at {}", path.display()));
            }
        };
        let settings = Self::from_toml_str(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        debug!(path = %path.display(), ?settings, "settings loaded");
        Ok(settings)
    }

    fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        ensure!(
            settings.fov_degrees > 0.0 && settings.fov_degrees < 180.0,
            "fov_degrees must lie in (0, 180), got {}",
            settings.fov_degrees
        );
        ensure!(
            settings.max_ray_distance > 0.0,
            "max_ray_distance must be positive, got {}",
            settings.max_ray_distance
        );
        Ok(settings)
    }

    /// Field of view in radians.
    pub(crate) fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Ray caster configuration derived from these settings.
    pub(crate) fn ray_cast_config(&self) -> RayCastConfig {
        RayCastConfig {
            max_distance: self.max_ray_distance,
        }
    }
}
