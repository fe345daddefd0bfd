//! Viewer configuration
//!
//! Every field has a default matching the classic room viewer, so a missing
//! config file (or a partial one) is never an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowSettings,
    pub paths: PathSettings,
    pub controls: ControlSettings,
    pub camera: CameraSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Room Viewer".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub model_dir: PathBuf,
    pub texture_dir: PathBuf,
    /// JSON scene file; the built-in room is used when unset
    pub scene: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            texture_dir: PathBuf::from("models/textures"),
            scene: None,
        }
    }
}

/// Step sizes for keyboard editing
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub move_step: f32,
    /// Degrees
    pub rotate_step: f32,
    pub scale_step: f32,
    /// Degrees per animation tick
    pub spin_step: f32,
    /// Radians
    pub orbit_step: f32,
    pub zoom_step: f32,
    pub height_step: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            move_step: 0.2,
            rotate_step: 5.0,
            scale_step: 0.05,
            spin_step: 0.1,
            orbit_step: 0.1,
            zoom_step: 0.5,
            height_step: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub angle: f32,
    pub height: f32,
    pub distance: f32,
    /// Radians per second while the automatic orbit is on
    pub spin_speed: f32,
    pub mouse_rotate_speed: f32,
    /// Height change per pixel of vertical drag
    pub mouse_raise_speed: f32,
    pub mouse_zoom_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            angle: 0.0,
            height: 5.0,
            distance: 15.0,
            spin_speed: 0.3,
            mouse_rotate_speed: 0.005,
            mouse_raise_speed: 0.02,
            mouse_zoom_speed: 0.5,
        }
    }
}

/// How the selected node is tinted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    /// Yellow tint that brightens and dims over time
    #[default]
    Pulse,
    /// Constant yellow
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub clear_color: [f32; 3],
    pub show_grid: bool,
    pub highlight: HighlightStyle,
    pub show_inspector: bool,
    pub animate_on_start: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.15],
            show_grid: true,
            highlight: HighlightStyle::Pulse,
            show_inspector: true,
            animate_on_start: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.paths.model_dir, PathBuf::from("models"));
        assert_relative_eq!(config.controls.move_step, 0.2);
        assert_relative_eq!(config.camera.distance, 15.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [controls]
            move_step = 0.1
            rotate_step = 2.0

            [render]
            highlight = "solid"
            show_grid = false

            [paths]
            scene = "scene.json"
            "#,
        )
        .unwrap();

        assert_relative_eq!(config.controls.move_step, 0.1);
        assert_relative_eq!(config.controls.rotate_step, 2.0);
        assert_relative_eq!(config.controls.scale_step, 0.05);
        assert_eq!(config.render.highlight, HighlightStyle::Solid);
        assert!(!config.render.show_grid);
        assert!(config.render.show_inspector);
        assert_eq!(config.paths.scene, Some(PathBuf::from("scene.json")));
        assert_eq!(config.window.width, 1024);
    }

    #[test]
    fn mouse_speeds_are_configurable() {
        let config = ViewerConfig::from_toml_str("[camera]\nmouse_raise_speed = 0.05").unwrap();
        assert_relative_eq!(config.camera.mouse_raise_speed, 0.05);
        assert_relative_eq!(config.camera.mouse_rotate_speed, 0.005);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = ViewerConfig::from_toml_str("[window]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ViewerConfig::load("/no/such/roomview.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
