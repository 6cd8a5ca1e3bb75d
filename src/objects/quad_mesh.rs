use na::{Point3, Vector3};

use super::tri_mesh::Triangle;

/// Parallelogram `origin + a*u + b*v`, `a, b in [0, 1]`, facing `u x v`.
#[derive(Clone, Debug)]
pub struct Quad {
    origin: Point3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
}

impl Quad {
    pub fn new(origin: &Point3<f32>, u: &Vector3<f32>, v: &Vector3<f32>) -> Self {
        Self {
            origin: *origin,
            u: *u,
            v: *v,
        }
    }

    /// Six outward-facing sides of the axis-aligned box spanned by `a` and `b`.
    pub fn new_box(a: &Point3<f32>, b: &Point3<f32>) -> Vec<Quad> {
        let min = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));

        let dx = Vector3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vector3::new(0.0, max.y - min.y, 0.0);
        let dz = Vector3::new(0.0, 0.0, max.z - min.z);

        vec![
            Quad::new(&Point3::new(min.x, min.y, max.z), &dx, &dy), // front
            Quad::new(&Point3::new(max.x, min.y, max.z), &-dz, &dy), // right
            Quad::new(&Point3::new(max.x, min.y, min.z), &-dx, &dy), // back
            Quad::new(&Point3::new(min.x, min.y, min.z), &dz, &dy), // left
            Quad::new(&Point3::new(min.x, max.y, max.z), &dx, &-dz), // top
            Quad::new(&Point3::new(min.x, min.y, min.z), &dx, &dz), // bottom
        ]
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.u
            .cross(&self.v)
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn to_triangles(&self) -> Vec<Triangle> {
        let t1 = Triangle::new(
            [self.origin, self.origin + self.u, self.origin + self.v],
            None,
        );
        let t2 = Triangle::new(
            [
                self.origin + self.u,
                self.origin + self.u + self.v,
                self.origin + self.v,
            ],
            None,
        );
        vec![t1, t2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Hittable;
    use approx::assert_relative_eq;

    #[test]
    fn box_sides_face_outward() {
        let sides = Quad::new_box(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 2.0, 2.0));
        assert_eq!(sides.len(), 6);
        let center = Point3::new(1.0, 1.0, 1.0);
        for side in &sides {
            for tri in side.to_triangles() {
                let outward = tri.centroid() - center;
                assert!(tri.face_normal().dot(&outward) > 0.0);
                assert_relative_eq!(tri.face_normal(), side.normal(), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn triangles_cover_the_quad() {
        let quad = Quad::new(
            &Point3::new(0.0, 0.0, 0.0),
            &Vector3::new(3.0, 0.0, 0.0),
            &Vector3::new(0.0, 2.0, 0.0),
        );
        let area: f32 = quad.to_triangles().iter().map(|t| t.area()).sum();
        assert_relative_eq!(area, 6.0);
    }
}
