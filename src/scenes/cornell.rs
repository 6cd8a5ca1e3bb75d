use na::{Point3, Vector3};

use super::Scene;
use crate::camera::Camera;
use crate::light::{Light, LightShape};
use crate::materials::{Material, MaterialRegistry};
use crate::model::Model;
use crate::objects::quad_mesh::Quad;
use crate::objects::tri_mesh::ImportedMesh;
use crate::types::color::{Color, ColorOps};

/// Unit Cornell box: walls span `[0, 1]^3`, open toward +z.
pub struct Cornell;

impl Cornell {
    fn add(mesh: &mut ImportedMesh, quads: &[Quad], material: u32) {
        for quad in quads {
            for tri in quad.to_triangles() {
                mesh.triangles.push(tri);
                mesh.triangle_material_ids.push(material);
            }
        }
    }
}

impl Scene for Cornell {
    fn build_model() -> Model {
        let mut materials = MaterialRegistry::new();
        let red = materials.create_material(Material::lambertian("red", Color::new(0.65, 0.05, 0.05)));
        let green = materials.create_material(Material::lambertian("green", Color::new(0.12, 0.45, 0.15)));
        let white = materials.create_material(Material::lambertian("white", Color::gray(0.73)));

        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        let z = Vector3::new(0.0, 0.0, 1.0);
        let origin = Point3::origin();

        let mut mesh = ImportedMesh::default();
        let walls = [
            Quad::new(&origin, &z, &x),                    // floor
            Quad::new(&Point3::new(0.0, 1.0, 0.0), &x, &z), // ceiling
            Quad::new(&origin, &x, &y),                    // back
        ];
        Self::add(&mut mesh, &walls, white);
        Self::add(&mut mesh, &[Quad::new(&origin, &y, &z)], red);
        Self::add(&mut mesh, &[Quad::new(&Point3::new(1.0, 0.0, 0.0), &z, &y)], green);

        let tall = Quad::new_box(&Point3::new(0.55, 0.0, 0.15), &Point3::new(0.85, 0.6, 0.45));
        let short = Quad::new_box(&Point3::new(0.15, 0.0, 0.5), &Point3::new(0.45, 0.3, 0.8));
        Self::add(&mut mesh, &tall, white);
        Self::add(&mut mesh, &short, white);

        mesh.materials = materials.into_materials();
        Model::new("cornell", mesh)
    }

    fn build_light() -> Light {
        Light::new(
            Point3::new(0.5, 0.999, 0.5),
            -Vector3::y(),
            Color::gray(15.0),
            0.12,
            LightShape::Quad,
        )
    }

    fn build_camera() -> Camera {
        Camera::look_at(Point3::new(0.5, 0.5, 2.2), Point3::new(0.5, 0.5, 0.5), 40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::HitMode;
    use crate::objects::Hittable;

    #[test]
    fn walls_face_into_the_box() {
        let model = Cornell::build_model();
        // 5 walls and two 12-triangle boxes
        assert_eq!(model.triangles().len(), 10 + 24);
        let center = Point3::new(0.5, 0.5, 0.5);
        for tri in &model.triangles()[..10] {
            assert!(tri.face_normal().dot(&(center - tri.centroid())) > 0.0);
        }
        assert_eq!(model.mesh_descriptors().len(), 4);
    }

    #[test]
    fn camera_looks_into_the_box() {
        let model = Cornell::build_model();
        let camera = Cornell::build_camera();
        let ray = camera.primary_ray(0.5, 0.05, 1, 1);
        let hit = model
            .bvh()
            .intersect(&ray, model.triangles(), HitMode::Nearest)
            .unwrap();
        assert_eq!(model.material_of(hit.triangle()).name, "white");
        assert!(Cornell::build_light().is_active());
    }
}
