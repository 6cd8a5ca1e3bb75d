use na::{Point3, Vector3};

/// Offset used to keep secondary rays from re-hitting the surface they start on.
pub const RAY_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    /// Ray over `[0, inf)`. The direction is normalized; a zero direction is kept as is and
    /// simply never hits anything.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self::with_interval(origin, direction, 0.0, f32::INFINITY)
    }

    pub fn with_interval(
        origin: Point3<f32>,
        direction: Vector3<f32>,
        t_min: f32,
        t_max: f32,
    ) -> Self {
        let direction = direction
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or(direction);

        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// Secondary ray leaving a surface point, pushed off along `normal`.
    pub fn spawn(p: Point3<f32>, normal: &Vector3<f32>, direction: Vector3<f32>) -> Self {
        let offset = if normal.dot(&direction) < 0.0 {
            -normal * RAY_EPSILON
        } else {
            normal * RAY_EPSILON
        };
        Self::with_interval(p + offset, direction, RAY_EPSILON, f32::INFINITY)
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }
}
