use std::path::{Path, PathBuf};

use na::Point3;

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::debug::{bvh_boxes, node_triangles, DebugBox};
use crate::error::{Error, Result};
use crate::light::Light;
use crate::model::Model;
use crate::renderer::Renderer;
use crate::scenes::SceneDescription;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// The display layer draws the model itself; the canvas is not touched.
    Raster,
    RayTrace,
    PathTrace,
}

impl RenderMode {
    pub fn next(self) -> Self {
        match self {
            RenderMode::Raster => RenderMode::RayTrace,
            RenderMode::RayTrace => RenderMode::PathTrace,
            RenderMode::PathTrace => RenderMode::Raster,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugMode {
    None,
    DebugRayTrace,
    DebugPathTrace,
}

impl DebugMode {
    pub fn next(self) -> Self {
        match self {
            DebugMode::None => DebugMode::DebugRayTrace,
            DebugMode::DebugRayTrace => DebugMode::DebugPathTrace,
            DebugMode::DebugPathTrace => DebugMode::None,
        }
    }
}

/// Everything the viewer keeps between frames. Any change that invalidates the image
/// (model, light, camera, mode, canvas size) drops the accumulated passes and reseeds the
/// per-pixel streams.
pub struct Session {
    model: Model,
    // Absolute path of the loaded model file; `None` for built-in scenes
    model_path: Option<PathBuf>,
    light: Light,
    camera: Camera,
    canvas: Canvas,
    renderer: Renderer,
    mode: RenderMode,
    debug_mode: DebugMode,
    debug_pixel: (u32, u32),
    debug_points: Vec<Point3<f32>>,
    // `0..node_count` picks one node, `node_count` means all of them
    selected_box: usize,
}

impl Session {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_scene(Model::empty(), Light::default(), Camera::default(), config)
    }

    pub fn with_scene(model: Model, light: Light, camera: Camera, config: RenderConfig) -> Self {
        let canvas = Canvas::new(config.width, config.height);
        let selected_box = model.bvh().nodes().len();
        Self {
            model_path: None,
            model,
            light,
            camera,
            canvas,
            renderer: Renderer::new(config),
            mode: RenderMode::Raster,
            debug_mode: DebugMode::None,
            debug_pixel: (0, 0),
            debug_points: Vec::new(),
            selected_box,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    /// Sample points of the inspected pixel's path, eye first.
    pub fn debug_points(&self) -> &[Point3<f32>] {
        &self.debug_points
    }

    fn reset_accumulation(&mut self) {
        self.canvas.clear();
        self.renderer.reset();
        self.refresh_debug_points();
    }

    /// Loads and builds a new model. On failure the error is logged and returned and the
    /// current model stays in place.
    pub fn load_model(&mut self, path: &Path) -> Result<()> {
        match Model::load(path) {
            Ok(model) => {
                log::info!(
                    "Loaded {}: {} triangles, {} materials",
                    path.display(),
                    model.triangles().len(),
                    model.materials().len()
                );
                self.replace_model(model, absolute(path));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load model {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    fn replace_model(&mut self, model: Model, path: PathBuf) {
        self.model = model;
        self.model_path = Some(path);
        self.selected_box = self.node_count();
        self.reset_accumulation();
    }

    /// Restores model, light and camera from a scene file. A relative model path is taken
    /// relative to the scene file. Nothing changes unless the whole scene loads.
    pub fn load_scene_file(&mut self, path: &Path) -> Result<()> {
        let result = SceneDescription::load(path).and_then(|scene| {
            let model_path = match path.parent() {
                Some(dir) if scene.model_path.is_relative() => dir.join(&scene.model_path),
                _ => scene.model_path.clone(),
            };
            let model = Model::load(&model_path)?;
            Ok((scene, model, absolute(&model_path)))
        });

        match result {
            Ok((scene, model, model_path)) => {
                self.light = scene.light;
                self.camera = scene.camera;
                self.replace_model(model, model_path);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load scene {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Writes the current view. The model is recorded by absolute path so the file loads
    /// from any directory; built-in scenes have no model file and cannot be saved.
    pub fn save_scene_file(&self, path: &Path) -> Result<()> {
        let model_path = self.model_path.clone().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "model '{}' was not loaded from a file",
                self.model.file_name()
            ))
        })?;
        SceneDescription {
            model_path,
            light: self.light,
            camera: self.camera,
        }
        .save(path)
    }

    /// Puts an enabled light at the camera, facing where it looks.
    pub fn add_light(&mut self) {
        self.light = Light::from_camera(&self.camera);
        log::info!("Light placed at {}", self.light.position);
        self.reset_accumulation();
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
        self.reset_accumulation();
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.reset_accumulation();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.renderer.reset();
        self.refresh_debug_points();
    }

    pub fn cycle_render_mode(&mut self) -> RenderMode {
        self.set_render_mode(self.mode.next());
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
        log::debug!("Render mode: {:?}", self.mode);
        self.reset_accumulation();
    }

    /// One pass of the active mode into the canvas.
    pub fn render_frame(&mut self) {
        match self.mode {
            RenderMode::Raster => {}
            RenderMode::RayTrace => {
                self.renderer
                    .ray_trace_to_canvas(&mut self.canvas, &self.camera, &self.model, &self.light)
            }
            RenderMode::PathTrace => {
                self.renderer
                    .path_trace_to_canvas(&mut self.canvas, &self.camera, &self.model, &self.light)
            }
        }
    }

    /// Advances the debug mode and traces `pixel` in the new mode.
    pub fn cycle_debug_mode(&mut self, pixel: (u32, u32)) -> DebugMode {
        self.debug_mode = self.debug_mode.next();
        self.debug_pixel = pixel;
        self.refresh_debug_points();
        self.debug_mode
    }

    fn refresh_debug_points(&mut self) {
        let size = (self.canvas.width(), self.canvas.height());
        self.debug_points = match self.debug_mode {
            DebugMode::None => Vec::new(),
            DebugMode::DebugRayTrace => self.renderer.debug_ray_trace(
                self.debug_pixel,
                size,
                &self.camera,
                &self.model,
                &self.light,
            ),
            DebugMode::DebugPathTrace => self.renderer.debug_path_trace(
                self.debug_pixel,
                size,
                &self.camera,
                &self.model,
                &self.light,
            ),
        };
    }

    fn node_count(&self) -> usize {
        self.model.bvh().nodes().len()
    }

    /// Selected node, or `None` when every box is shown.
    pub fn selected_box(&self) -> Option<usize> {
        (self.selected_box < self.node_count()).then_some(self.selected_box)
    }

    pub fn select_next_box(&mut self) {
        self.selected_box = (self.selected_box + 1) % (self.node_count() + 1);
    }

    pub fn select_previous_box(&mut self) {
        let n = self.node_count() + 1;
        self.selected_box = (self.selected_box + n - 1) % n;
    }

    /// Boxes the overlay should draw for the current selection.
    pub fn selected_boxes(&self) -> Vec<DebugBox> {
        let boxes = bvh_boxes(self.model.bvh());
        match self.selected_box() {
            Some(node) => vec![boxes[node]],
            None => boxes,
        }
    }

    pub fn selected_triangles(&self) -> Vec<u32> {
        node_triangles(self.model.bvh(), self.selected_box().unwrap_or(0))
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
