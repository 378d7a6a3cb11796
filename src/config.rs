/// Runtime configuration, optionally read from a JSON file
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use serde::Deserialize;
use tracing::info;

use crate::samples::DesiredSettings;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Sync presentation to the display refresh rate
    pub vsync: bool,
    /// Prefer an sRGB surface format. When false (or unavailable) samples convert to gamma
    /// space themselves.
    pub srgb_surface: bool,
    /// Run the samples' UI callbacks
    pub show_ui: bool,
    /// Overrides the window size requested by the sample
    pub window: Option<WindowSize>,
    pub shader_dir: PathBuf,
    pub asset_dir: PathBuf,
    /// File opened by the text editor sample. Defaults to the cube's fragment shader.
    pub editor_file: Option<PathBuf>,
    pub screenshot_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            srgb_surface: true,
            show_ui: true,
            window: None,
            shader_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"),
            asset_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            editor_file: None,
            screenshot_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&contents)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        info!(target = "config", "Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn shader_path(&self, name: &str) -> PathBuf {
        self.shader_dir.join(name)
    }

    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.asset_dir.join(name)
    }

    pub fn editor_file(&self) -> PathBuf {
        self.editor_file
            .clone()
            .unwrap_or_else(|| self.shader_path("texture_cube.frag.wgsl"))
    }

    /// The sample's window request, with the configured size taking precedence.
    pub fn apply_window_override(&self, desired: DesiredSettings) -> DesiredSettings {
        match self.window {
            Some(WindowSize { width, height }) => DesiredSettings {
                window_width: Some(width),
                window_height: Some(height),
            },
            None => desired,
        }
    }
}
