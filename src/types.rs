pub mod color;
pub mod onb;
pub mod pdf;
pub mod ray;
pub mod sampler;
