// Wavefront OBJ only; tobj does the parsing.

use std::path::Path;

use crate::bvh::BBox;
use crate::error::{Error, Result};
use crate::materials::Material;
use crate::objects::{Hittable, Intersection};
use crate::types::ray::Ray;
use na::{Matrix6x3, Point3, Vector3, Vector6};

// Determinants below this are treated as a ray parallel to the triangle plane.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Rows 0..3 are positions, rows 3..6 normals; one column per vertex.
type TriangleData = Matrix6x3<f32>;
type VertexData = Vector6<f32>;

fn get_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
    (v1 - v0)
        .cross(&(v2 - v0))
        .try_normalize(f32::MIN_POSITIVE)
        .unwrap_or_else(Vector3::zeros)
}

#[repr(align(32))]
#[derive(Clone, Debug)]
pub struct Triangle {
    data: TriangleData,
    centroid: Point3<f32>,
    bbox: BBox,
}

impl Triangle {
    /// Without vertex normals every vertex gets the face normal.
    pub fn new(vertices: [Point3<f32>; 3], normals: Option<[Vector3<f32>; 3]>) -> Self {
        let face = get_normal(&vertices[0], &vertices[1], &vertices[2]);
        let normals = normals.unwrap_or([face, face, face]);

        let data = TriangleData::from_row_slice(&[
            vertices[0].x,
            vertices[1].x,
            vertices[2].x,
            vertices[0].y,
            vertices[1].y,
            vertices[2].y,
            vertices[0].z,
            vertices[1].z,
            vertices[2].z,
            normals[0].x,
            normals[1].x,
            normals[2].x,
            normals[0].y,
            normals[1].y,
            normals[2].y,
            normals[0].z,
            normals[1].z,
            normals[2].z,
        ]);

        let centroid = Point3::from((vertices[0].coords + vertices[1].coords + vertices[2].coords) / 3.0);
        let bbox = BBox::new(vertices[0], vertices[1]).grow(&vertices[2]);

        Self {
            data,
            centroid,
            bbox,
        }
    }

    pub fn position(&self, vertex: usize) -> Point3<f32> {
        Point3::new(
            self.data[(0, vertex)],
            self.data[(1, vertex)],
            self.data[(2, vertex)],
        )
    }

    pub fn normal(&self, vertex: usize) -> Vector3<f32> {
        Vector3::new(
            self.data[(3, vertex)],
            self.data[(4, vertex)],
            self.data[(5, vertex)],
        )
    }

    pub fn face_normal(&self) -> Vector3<f32> {
        get_normal(&self.position(0), &self.position(1), &self.position(2))
    }

    pub fn area(&self) -> f32 {
        let e1 = self.position(1) - self.position(0);
        let e2 = self.position(2) - self.position(0);
        0.5 * e1.cross(&e2).norm()
    }

    pub fn bary_interpolate(&self, bary_coords: &Vector3<f32>) -> Vertex {
        Vertex {
            data: self.data * bary_coords,
        }
    }

    /// Interpolated unit normal at the given barycentrics. Falls back to the face normal
    /// when the vertex normals cancel out; zero only for degenerate triangles.
    pub fn shading_normal(&self, bary_coords: &Vector3<f32>) -> Vector3<f32> {
        self.bary_interpolate(bary_coords)
            .normal()
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(|| self.face_normal())
    }
}

pub struct Vertex {
    data: VertexData,
}

impl Vertex {
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.data[0], self.data[1], self.data[2])
    }

    pub fn normal(&self) -> Vector3<f32> {
        Vector3::new(self.data[3], self.data[4], self.data[5])
    }
}

impl Hittable for Triangle {
    // Moller-Trumbore
    fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Intersection> {
        let v0 = self.position(0);
        let e1 = self.position(1) - v0;
        let e2 = self.position(2) - v0;
        let d = &ray.direction;

        let p = d.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - v0;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&e1);
        let v = d.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&q) * inv_det;
        if t_min <= t && t <= t_max {
            Some(Intersection { t, u, v })
        } else {
            None
        }
    }

    fn bbox(&self) -> BBox {
        self.bbox
    }

    fn centroid(&self) -> Point3<f32> {
        self.centroid
    }
}

/// Flat triangle soup as handed over by the importer.
#[derive(Default)]
pub struct ImportedMesh {
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
    pub triangle_material_ids: Vec<u32>,
}

/// One OBJ object: indexed positions, optional indexed normals, one material.
pub struct TriMesh {
    positions: (Vec<Point3<f32>>, Vec<u32>),
    normals: Option<(Vec<Vector3<f32>>, Vec<u32>)>,
    material_id: Option<usize>,
}

impl TriMesh {
    pub fn new(
        positions: (Vec<Point3<f32>>, Vec<u32>),
        normals: Option<(Vec<Vector3<f32>>, Vec<u32>)>,
        material_id: Option<usize>,
    ) -> Self {
        Self {
            positions,
            normals,
            material_id,
        }
    }

    pub fn material_id(&self) -> Option<usize> {
        self.material_id
    }

    pub fn load_as_vec(path: &Path) -> Result<(Vec<Self>, Vec<tobj::Material>)> {
        let is_obj = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
        if !is_obj {
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }

        log::debug!("Loading mesh: {}...", path.display());
        let options = tobj::LoadOptions {
            triangulate: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options).map_err(|e| match e {
            tobj::LoadError::OpenFileFailed | tobj::LoadError::ReadError => Error::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
            _ => Error::UnsupportedFormat(path.to_path_buf()),
        })?;

        let materials = match materials {
            Ok(mat) => mat,
            Err(e) => {
                log::warn!(
                    "Failed to load materials: {}... Using default material instead...",
                    e
                );
                vec![]
            }
        };

        log::debug!(
            "Found {} models and {} materials",
            models.len(),
            materials.len()
        );

        let meshes = models
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mesh_obj = &m.mesh;
                log::debug!(
                    "Model {} has {} vertices, {} normals and {} triangles",
                    i,
                    mesh_obj.positions.len() / 3,
                    mesh_obj.normals.len() / 3,
                    mesh_obj.indices.len() / 3
                );

                let normals = if !mesh_obj.normals.is_empty()
                    && mesh_obj.normal_indices.len() == mesh_obj.indices.len()
                {
                    Some((
                        mesh_obj
                            .normals
                            .chunks_exact(3)
                            .map(|v| Vector3::new(v[0], v[1], v[2]))
                            .collect(),
                        mesh_obj.normal_indices.clone(),
                    ))
                } else {
                    None
                };

                TriMesh::new(
                    (
                        mesh_obj
                            .positions
                            .chunks_exact(3)
                            .map(|v| Point3::new(v[0], v[1], v[2]))
                            .collect(),
                        mesh_obj.indices.clone(),
                    ),
                    normals,
                    mesh_obj.material_id,
                )
            })
            .collect();

        Ok((meshes, materials))
    }

    /// Faces with out-of-range indices are dropped.
    pub fn to_triangles(&self) -> Vec<Triangle> {
        let (points, indices) = &self.positions;
        let lookup = |i: usize| points.get(*indices.get(i)? as usize).copied();
        let lookup_normal = |i: usize| {
            let (normals, normal_indices) = self.normals.as_ref()?;
            normals.get(*normal_indices.get(i)? as usize).copied()
        };

        (0..indices.len() / 3)
            .filter_map(|face| {
                let i = face * 3;
                let vertices = [lookup(i)?, lookup(i + 1)?, lookup(i + 2)?];
                let normals = match (lookup_normal(i), lookup_normal(i + 1), lookup_normal(i + 2)) {
                    (Some(a), Some(b), Some(c)) => Some([a, b, c]),
                    _ => None,
                };
                Some(Triangle::new(vertices, normals))
            })
            .collect()
    }
}

/// Import an OBJ file into a flat triangle list with per-triangle material ids.
pub fn import_obj(path: &Path) -> Result<ImportedMesh> {
    let (meshes, obj_materials) = TriMesh::load_as_vec(path)?;

    let mut materials: Vec<Material> = obj_materials.iter().map(Material::from).collect();
    // Objects without a usable material share one trailing default.
    let default_id = materials.len() as u32;
    let mut needs_default = false;

    let mut imported = ImportedMesh::default();
    for mesh in &meshes {
        let material_id = match mesh.material_id() {
            Some(id) if id < obj_materials.len() => id as u32,
            _ => {
                needs_default = true;
                default_id
            }
        };
        let triangles = mesh.to_triangles();
        imported
            .triangle_material_ids
            .extend(std::iter::repeat(material_id).take(triangles.len()));
        imported.triangles.extend(triangles);
    }

    if needs_default {
        materials.push(Material::default());
    }
    imported.materials = materials;

    if imported.triangles.is_empty() {
        return Err(Error::EmptyScene(path.to_path_buf()));
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        )
    }

    #[test]
    fn precomputes_centroid_bbox_and_face_normal() {
        let tri = unit_triangle();
        assert_relative_eq!(tri.centroid(), Point3::new(1.0 / 3.0, 1.0 / 3.0, 0.0));
        assert_eq!(tri.bbox().min(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(tri.bbox().max(), Point3::new(1.0, 1.0, 0.0));
        assert_eq!(tri.normal(2), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(tri.area(), 0.5);
    }

    #[test]
    fn hit_reports_distance_and_barycentrics() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.5, 2.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = tri.hit(&ray, 0.0, f32::INFINITY).unwrap();
        assert_relative_eq!(hit.t, 2.0);
        assert_relative_eq!(hit.u, 0.25);
        assert_relative_eq!(hit.v, 0.5);
    }

    #[test]
    fn respects_the_ray_interval() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, 2.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, 0.0, 1.5).is_none());
        assert!(tri.hit(&ray, 2.5, 10.0).is_none());
    }

    #[test]
    fn misses_outside_and_parallel() {
        let tri = unit_triangle();
        let outside = Ray::new(Point3::new(0.9, 0.9, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&outside, 0.0, f32::INFINITY).is_none());
        let parallel = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(tri.hit(&parallel, 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let tri = Triangle::new([Point3::new(1.0, 1.0, 1.0); 3], None);
        assert_eq!(tri.face_normal(), Vector3::zeros());
        let ray = Ray::new(Point3::new(1.0, 1.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn interpolates_vertex_normals() {
        let tri = Triangle::new(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Some([Vector3::x(), Vector3::y(), Vector3::z()]),
        );
        let n = tri.shading_normal(&Vector3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0));
        let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-5);
        let p = tri.bary_interpolate(&Vector3::new(0.0, 1.0, 0.0)).position();
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn to_triangles_drops_faces_with_bad_indices() {
        let mesh = TriMesh::new(
            (
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                ],
                vec![0, 1, 2, 0, 1, 9],
            ),
            None,
            None,
        );
        assert_eq!(mesh.to_triangles().len(), 1);
    }

    #[test]
    fn rejects_non_obj_extensions() {
        let err = import_obj(Path::new("scene.fbx")).err().unwrap();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = import_obj(Path::new("/definitely/not/here.obj")).err().unwrap();
        assert!(matches!(err, Error::Unreadable { .. }));
    }
}
