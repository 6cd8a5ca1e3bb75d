use image::{ImageBuffer, RgbImage};
use rayon::iter::ParallelIterator;

use crate::types::color::{Color, ColorOps};

/// Per-pixel running mean of rendered radiance, row-major from the top-left pixel.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    passes: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zeros(); (width as usize) * (height as usize)],
            passes: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Number of passes folded into the current mean.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Color::zeros());
        self.passes = 0;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Folds one full-frame estimate into the running mean.
    pub fn accumulate(&mut self, pass: &[Color]) {
        debug_assert_eq!(pass.len(), self.pixels.len());
        let n = self.passes as f32 + 1.0;
        for (mean, sample) in self.pixels.iter_mut().zip(pass) {
            *mean += (sample - *mean) / n;
        }
        self.passes += 1;
    }

    /// Replaces the image with a single pass.
    pub fn overwrite(&mut self, pass: Vec<Color>) {
        debug_assert_eq!(pass.len(), self.pixels.len());
        self.pixels = pass;
        self.passes = 1;
    }

    pub fn to_rgb8(&self) -> RgbImage {
        let mut buffer: RgbImage = ImageBuffer::new(self.width, self.height);
        buffer.par_enumerate_pixels_mut().for_each(|(x, y, pixel)| {
            *pixel = self.pixel(x, y).to_rgb();
        });
        buffer
    }
}
