extern crate nalgebra as na;

pub mod bvh;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod debug;
pub mod error;
pub mod export;
pub mod light;
pub mod materials;
pub mod model;
pub mod objects;
pub mod renderer;
pub mod scenes;
pub mod session;
pub mod types;

pub use error::{Error, Result};
