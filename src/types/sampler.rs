use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait Sampler<T> {
    fn sample(&self, rng: &mut impl Rng) -> T;
}

/// Random stream for one independent unit of work (a pixel, usually). The same `(seed, key)`
/// always yields the same sequence.
pub fn stream(seed: u64, key: u64) -> SmallRng {
    SmallRng::seed_from_u64(splitmix64(seed ^ splitmix64(key)))
}

// Spreads consecutive keys over the whole seed space.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub struct SquareSampler {
    center: (f32, f32),
    apothem: f32,
}

impl SquareSampler {
    pub fn new(center: (f32, f32), apothem: f32) -> Self {
        Self { center, apothem }
    }

    /// Jitter within a pixel footprint, centred on the pixel centre.
    pub fn pixel() -> Self {
        Self::new((0.5, 0.5), 0.5)
    }
}

impl Sampler<(f32, f32)> for SquareSampler {
    fn sample(&self, rng: &mut impl Rng) -> (f32, f32) {
        let x = self.center.0 + self.apothem * rng.gen_range(-1.0..1.0_f32);
        let y = self.center.1 + self.apothem * rng.gen_range(-1.0..1.0_f32);

        (x, y)
    }
}

pub struct DiskSampler {
    center: (f32, f32),
    radius: f32,
}

impl DiskSampler {
    pub fn new(center: (f32, f32), radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Sampler<(f32, f32)> for DiskSampler {
    // Uniform by area
    fn sample(&self, rng: &mut impl Rng) -> (f32, f32) {
        let r = self.radius * rng.gen_range(0.0..1.0_f32).sqrt();
        let phi = 2.0 * std::f32::consts::PI * rng.gen_range(0.0..1.0_f32);

        (self.center.0 + r * phi.cos(), self.center.1 + r * phi.sin())
    }
}
