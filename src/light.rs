use std::fmt;
use std::str::FromStr;

use crate::camera::Camera;
use crate::types::color::{Color, ColorOps};
use crate::types::onb::OrthonormalBasis;
use crate::types::sampler::{DiskSampler, Sampler, SquareSampler};
use na::{Point3, Vector3};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightShape {
    /// `size` is the radius.
    Disk,
    /// `size` is the half edge length.
    Quad,
}

impl LightShape {
    fn name(&self) -> &'static str {
        match self {
            LightShape::Disk => "disk",
            LightShape::Quad => "quad",
        }
    }
}

/// One-sided area emitter facing along `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub emission: Color,
    pub size: f32,
    pub shape: LightShape,
    pub enabled: bool,
}

impl Default for Light {
    /// Disabled placeholder until the user places a light.
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 1.0, 0.0),
            normal: -Vector3::y(),
            emission: Color::gray(10.0),
            size: 0.25,
            shape: LightShape::Disk,
            enabled: false,
        }
    }
}

impl Light {
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        emission: Color,
        size: f32,
        shape: LightShape,
    ) -> Self {
        Self {
            position,
            normal: normal
                .try_normalize(f32::MIN_POSITIVE)
                .unwrap_or_else(Vector3::zeros),
            emission,
            size: size.max(0.0),
            shape,
            enabled: true,
        }
    }

    /// Light sitting at the camera and shining where it looks.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position(),
            normal: camera.forward(),
            enabled: true,
            ..Default::default()
        }
    }

    pub fn area(&self) -> f32 {
        match self.shape {
            LightShape::Disk => std::f32::consts::PI * self.size * self.size,
            LightShape::Quad => 4.0 * self.size * self.size,
        }
    }

    /// Whether the light can contribute anything at all. Zero normals or areas are treated
    /// as "no light" rather than producing NaN downstream.
    pub fn is_active(&self) -> bool {
        self.enabled
            && self.area() > 0.0
            && self.normal.norm_squared() > 0.0
            && self.emission.max_channel() > 0.0
            && self.emission.is_finite()
    }

    pub fn basis(&self) -> OrthonormalBasis {
        OrthonormalBasis::new(&self.normal)
    }

    /// Uniform point on the emitting surface (pdf `1 / area`).
    pub fn sample_point(&self, rng: &mut impl Rng) -> Point3<f32> {
        let (a, b) = match self.shape {
            LightShape::Disk => DiskSampler::new((0.0, 0.0), self.size).sample(rng),
            LightShape::Quad => SquareSampler::new((0.0, 0.0), self.size).sample(rng),
        };
        let onb = self.basis();
        self.position + onb.u() * a + onb.w() * b
    }

    /// Emitted radiance toward `direction` (pointing away from the light).
    pub fn emitted(&self, direction: &Vector3<f32>) -> Color {
        if self.normal.dot(direction) > 0.0 {
            self.emission
        } else {
            Color::zeros()
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "light {} {} {} {} {} {} {} {} {} {} {} {}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.emission.x,
            self.emission.y,
            self.emission.z,
            self.size,
            self.shape.name(),
            u8::from(self.enabled)
        )
    }
}

impl FromStr for Light {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [tag, numbers @ .., shape, enabled] = fields.as_slice() else {
            return Err("empty light record".to_string());
        };
        if *tag != "light" {
            return Err("expected a 'light' record".to_string());
        }
        let values = numbers
            .iter()
            .map(|v| v.parse::<f32>().map_err(|e| format!("bad light field '{}': {}", v, e)))
            .collect::<Result<Vec<f32>, String>>()?;
        let [px, py, pz, nx, ny, nz, er, eg, eb, size] = values[..] else {
            return Err(format!("light record needs 10 numbers, got {}", values.len()));
        };
        let shape = match *shape {
            "disk" => LightShape::Disk,
            "quad" => LightShape::Quad,
            other => return Err(format!("unknown light shape '{}'", other)),
        };
        let enabled = match *enabled {
            "1" => true,
            "0" => false,
            other => return Err(format!("bad light enabled flag '{}'", other)),
        };

        let mut light = Light::new(
            Point3::new(px, py, pz),
            Vector3::new(nx, ny, nz),
            Color::new(er, eg, eb),
            size,
            shape,
        );
        light.enabled = enabled;
        Ok(light)
    }
}
