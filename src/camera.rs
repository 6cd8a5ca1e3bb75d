use std::fmt;
use std::str::FromStr;

use crate::types::ray::Ray;
use na::{Point3, Vector2, Vector3};

const MOVE_SPEED: f32 = 2.0;
const ROTATE_SPEED: f32 = 0.5;
const FOV_STEP: f32 = 5.0;
const MIN_FOV: f32 = 10.0;
const MAX_FOV: f32 = 120.0;
// Keeps the view basis well defined
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Pinhole camera. `yaw = pitch = 0` looks down -z with +y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    yaw: f32,
    pitch: f32,
    // Vertical, degrees
    fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 5.0), 0.0, 0.0, 45.0)
    }
}

impl Camera {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32, fov: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            fov: fov.clamp(MIN_FOV, MAX_FOV),
        }
    }

    pub fn look_at(from: Point3<f32>, target: Point3<f32>, fov: f32) -> Self {
        let d = (target - from)
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(|| -Vector3::z());
        Self::new(from, d.x.atan2(-d.z), d.y.clamp(-1.0, 1.0).asin(), fov)
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// (right, up, forward)
    pub fn view_basis(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        (right, up, forward)
    }

    /// Ray through continuous image coordinates `(x, y)`, origin top-left, `y` down.
    /// `(w / 2, h / 2)` is the optical axis.
    pub fn primary_ray(&self, x: f32, y: f32, width: u32, height: u32) -> Ray {
        let (right, up, forward) = self.view_basis();
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        let aspect = width / height;
        let tan_half = (self.fov.to_radians() * 0.5).tan();

        let px = (2.0 * x / width - 1.0) * aspect * tan_half;
        let py = (1.0 - 2.0 * y / height) * tan_half;

        Ray::new(self.position, forward + px * right + py * up)
    }

    /// Move along the local (right, up, forward) axes.
    pub fn translate(&mut self, direction: Vector3<f32>, dt: f32) {
        let (right, up, forward) = self.view_basis();
        let step = right * direction.x + up * direction.y + forward * direction.z;
        self.position += step * MOVE_SPEED * dt;
    }

    /// `delta` is (horizontal, vertical), e.g. a mouse drag in pixels.
    pub fn rotate(&mut self, delta: Vector2<f32>, dt: f32) {
        self.yaw += delta.x * ROTATE_SPEED * dt;
        self.pitch = (self.pitch - delta.y * ROTATE_SPEED * dt).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn increase_fov(&mut self) {
        self.fov = (self.fov + FOV_STEP).min(MAX_FOV);
    }

    pub fn decrease_fov(&mut self) {
        self.fov = (self.fov - FOV_STEP).max(MIN_FOV);
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera {} {} {} {} {} {}",
            self.position.x, self.position.y, self.position.z, self.yaw, self.pitch, self.fov
        )
    }
}

impl FromStr for Camera {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        if fields.next() != Some("camera") {
            return Err("expected a 'camera' record".to_string());
        }
        let values = fields
            .map(|v| v.parse::<f32>().map_err(|e| format!("bad camera field '{}': {}", v, e)))
            .collect::<Result<Vec<f32>, String>>()?;
        match values[..] {
            [x, y, z, yaw, pitch, fov] => Ok(Camera::new(Point3::new(x, y, z), yaw, pitch, fov)),
            _ => Err(format!("camera record needs 6 values, got {}", values.len())),
        }
    }
}
