use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::light::Light;
use crate::model::Model;

pub mod cornell;

/// Built-in scene that needs no files on disk.
pub trait Scene {
    fn build_model() -> Model;
    fn build_light() -> Light;
    fn build_camera() -> Camera;
}

/// What a scene file stores, line by line: model path, light record, camera record.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    pub model_path: PathBuf,
    pub light: Light,
    pub camera: Camera,
}

impl SceneDescription {
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.model_path.display(),
            self.light,
            self.camera
        )
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let mut next_line = |line: usize, what: &str| {
            lines.next().ok_or_else(|| Error::MalformedScene {
                line,
                reason: format!("missing {}", what),
            })
        };

        let model_path = next_line(1, "model path")?.trim();
        if model_path.is_empty() {
            return Err(Error::MalformedScene {
                line: 1,
                reason: "empty model path".to_string(),
            });
        }
        let model_path = PathBuf::from(model_path);

        let light = next_line(2, "light record")?
            .parse::<Light>()
            .map_err(|reason| Error::MalformedScene { line: 2, reason })?;
        let camera = next_line(3, "camera record")?
            .parse::<Camera>()
            .map_err(|reason| Error::MalformedScene { line: 3, reason })?;

        Ok(Self {
            model_path,
            light,
            camera,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text()).map_err(|e| Error::io(path, e))?;
        log::info!("Wrote scene file {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let scene = Self::from_text(&text)?;
        log::info!("Read scene file {}", path.display());
        Ok(scene)
    }
}
