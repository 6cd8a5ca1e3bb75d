use na::Vector3;
use rand::Rng;

use super::onb::OrthonormalBasis;

pub trait PDF {
    fn value(&self, direction: &Vector3<f32>) -> f32;
    fn generate(&self, rng: &mut impl Rng) -> Vector3<f32>;
}

pub struct CosineWeightedHemispherePDF {
    pub uvw: OrthonormalBasis,
}

impl CosineWeightedHemispherePDF {
    pub fn new(n: &Vector3<f32>) -> Self {
        Self {
            uvw: OrthonormalBasis::new(n),
        }
    }
}

impl PDF for CosineWeightedHemispherePDF {
    fn value(&self, direction: &Vector3<f32>) -> f32 {
        match direction.try_normalize(f32::MIN_POSITIVE) {
            Some(d) => (d.dot(&self.uvw.v()) / std::f32::consts::PI).max(0.0),
            None => 0.0,
        }
    }

    fn generate(&self, rng: &mut impl Rng) -> Vector3<f32> {
        let r1: f32 = rng.gen_range(0.0..1.0);
        let r2: f32 = rng.gen_range(0.0..1.0);

        let phi = 2.0 * std::f32::consts::PI * r1;
        let x = phi.cos() * r2.sqrt();
        let z = phi.sin() * r2.sqrt();
        let y = (1.0 - r2).sqrt();

        self.uvw.to_world(&Vector3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn samples_stay_in_the_upper_hemisphere() {
        let n = Vector3::new(0.0, 0.0, -1.0);
        let pdf = CosineWeightedHemispherePDF::new(&n);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let d = pdf.generate(&mut rng);
            assert!(d.dot(&n) >= -1e-6);
            assert!((d.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn value_is_zero_below_the_surface() {
        let pdf = CosineWeightedHemispherePDF::new(&Vector3::y());
        assert_eq!(pdf.value(&Vector3::new(0.0, -1.0, 0.0)), 0.0);
        assert_eq!(pdf.value(&Vector3::zeros()), 0.0);
        assert!((pdf.value(&Vector3::y()) - 1.0 / std::f32::consts::PI).abs() < 1e-6);
    }
}
