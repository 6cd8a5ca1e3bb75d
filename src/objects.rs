pub mod quad_mesh;
pub mod tri_mesh;

use crate::bvh::BBox;
use crate::types::ray::Ray;
use na::{Point3, Vector3};

/// Parametric distance and barycentric `(u, v)` of a ray/primitive intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Nearest (or any) hit found by BVH traversal. `triangle` is the index into the triangle
/// array the BVH was built over, not into the BVH's sorted order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    t: f32,
    u: f32,
    v: f32,
    triangle: u32,
}

impl HitRecord {
    pub fn new(hit: Intersection, triangle: u32) -> Self {
        Self {
            t: hit.t,
            u: hit.u,
            v: hit.v,
            triangle,
        }
    }

    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn u(&self) -> f32 {
        self.u
    }

    pub fn v(&self) -> f32 {
        self.v
    }

    pub fn triangle(&self) -> usize {
        self.triangle as usize
    }

    /// Weights for vertices 0, 1, 2.
    pub fn bary(&self) -> Vector3<f32> {
        Vector3::new(1.0 - self.u - self.v, self.u, self.v)
    }

    pub fn p(&self, ray: &Ray) -> Point3<f32> {
        ray.at(self.t)
    }
}

// Anything the BVH can be built over and traversed against.
pub trait Hittable {
    fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Intersection>;
    fn bbox(&self) -> BBox;
    fn centroid(&self) -> Point3<f32>;
}
