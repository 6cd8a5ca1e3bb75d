use na::{Matrix3, Vector3};

/// Right-handed frame with `v` along the given normal (y up in local space).
pub struct OrthonormalBasis {
    transform: Matrix3<f32>,
}

impl OrthonormalBasis {
    pub fn new(n: &Vector3<f32>) -> Self {
        let v = n
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(Vector3::y);
        let a = if v.x.abs() > 0.9 {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };
        let w = v.cross(&a).normalize();
        let u = v.cross(&w);

        let transform = Matrix3::from_columns(&[u, v, w]);

        Self { transform }
    }

    pub fn u(&self) -> Vector3<f32> {
        self.transform.column(0).into()
    }

    pub fn v(&self) -> Vector3<f32> {
        self.transform.column(1).into()
    }

    pub fn w(&self) -> Vector3<f32> {
        self.transform.column(2).into()
    }

    // World -> local
    pub fn to_local(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.transform.transpose() * v
    }

    // Local -> world
    pub fn to_world(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.transform * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basis_is_orthonormal() {
        let onb = OrthonormalBasis::new(&Vector3::new(0.3, -2.0, 0.5));
        assert_relative_eq!(onb.u().norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(onb.w().norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(onb.u().dot(&onb.v()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(onb.v().dot(&onb.w()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(onb.u().dot(&onb.w()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn local_world_round_trip() {
        let onb = OrthonormalBasis::new(&Vector3::new(1.0, 0.0, 0.0));
        let d = Vector3::new(0.2, 0.7, -0.1);
        assert_relative_eq!(onb.to_local(&onb.to_world(&d)), d, epsilon = 1e-5);
    }

    #[test]
    fn zero_normal_falls_back_to_y() {
        let onb = OrthonormalBasis::new(&Vector3::zeros());
        assert_eq!(onb.v(), Vector3::y());
    }
}
