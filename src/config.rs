use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::color::Color;

/// Render settings, read from TOML. Every key is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Path-tracing samples per pixel per pass.
    pub samples_per_frame: u32,
    pub max_depth: u32,
    /// First bounce at which Russian roulette may end a path.
    pub russian_roulette_depth: u32,
    /// Base seed of the per-pixel random streams.
    pub seed: u64,
    pub background: [f32; 3],
    /// Scale on the material ambient term in direct ray tracing.
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples_per_frame: 1,
            max_depth: 8,
            russian_roulette_depth: 3,
            seed: 0,
            background: [0.0, 0.0, 0.0],
            ambient: 1.0,
        }
    }
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml(&text)?;
        log::debug!("Loaded render config {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(text)?;
        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidArgument(format!(
                "canvas size must be non-zero, got {}x{}",
                config.width, config.height
            )));
        }
        Ok(config)
    }

    pub fn background(&self) -> Color {
        Color::new(self.background[0], self.background[1], self.background[2])
    }
}
