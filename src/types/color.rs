use image::Rgb;

pub type Color = na::Vector3<f32>;

pub trait ColorOps {
    fn gray(val: f32) -> Self;
    fn get_r(&self) -> f32;
    fn get_g(&self) -> f32;
    fn get_b(&self) -> f32;
    fn max_channel(&self) -> f32;
    fn is_finite(&self) -> bool;
    fn to_rgb(&self) -> Rgb<u8>;
}

impl ColorOps for Color {
    fn gray(val: f32) -> Self {
        Color::new(val, val, val)
    }

    fn get_r(&self) -> f32 {
        self.x
    }

    fn get_g(&self) -> f32 {
        self.y
    }

    fn get_b(&self) -> f32 {
        self.z
    }

    fn max_channel(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    // Linear [0, 1] -> 8 bit, clamped
    fn to_rgb(&self) -> Rgb<u8> {
        let ir = (255.999 * self.get_r()).clamp(0.0, 255.0) as u8;
        let ig = (255.999 * self.get_g()).clamp(0.0, 255.0) as u8;
        let ib = (255.999 * self.get_b()).clamp(0.0, 255.0) as u8;

        Rgb([ir, ig, ib])
    }
}
