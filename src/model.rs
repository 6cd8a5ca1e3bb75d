use std::path::Path;
use std::time::Instant;

use crate::bvh::{BBox, Bvh};
use crate::error::Result;
use crate::materials::Material;
use crate::objects::tri_mesh::{import_obj, ImportedMesh, Triangle};
use crate::objects::Hittable;

/// Contiguous run of triangles sharing one material; lets the display layer draw per batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshDescriptor {
    pub material_id: u32,
    pub first_triangle: u32,
    pub triangle_count: u32,
}

/// Loaded geometry plus its acceleration structure. Immutable once built; loading another
/// model means building a new `Model`.
pub struct Model {
    file_name: String,
    triangles: Vec<Triangle>,
    materials: Vec<Material>,
    triangle_material_ids: Vec<u32>,
    mesh_descriptors: Vec<MeshDescriptor>,
    bbox: BBox,
    bvh: Bvh,
    fallback_material: Material,
}

impl Model {
    pub fn empty() -> Self {
        Self::new("", ImportedMesh::default())
    }

    pub fn new(file_name: &str, mesh: ImportedMesh) -> Self {
        let ImportedMesh {
            triangles,
            materials,
            mut triangle_material_ids,
        } = mesh;
        // Ids must line up with triangles one to one
        triangle_material_ids.resize(triangles.len(), u32::MAX);

        let bbox = triangles
            .iter()
            .fold(BBox::empty(), |acc, t| acc.merge(&t.bbox()));
        let mesh_descriptors = Self::build_descriptors(&triangle_material_ids);

        let now = Instant::now();
        let bvh = Bvh::build(&triangles);
        if !triangles.is_empty() {
            log::info!(
                "BVH built in {:?}: {} triangles, {} nodes, {} leaves",
                now.elapsed(),
                triangles.len(),
                bvh.nodes().len(),
                bvh.leaf_count()
            );
        }

        Self {
            file_name: file_name.to_string(),
            triangles,
            materials,
            triangle_material_ids,
            mesh_descriptors,
            bbox,
            bvh,
            fallback_material: Material::default(),
        }
    }

    /// Import + build. Errors are the importer's; an empty file is `Error::EmptyScene`.
    pub fn load(path: &Path) -> Result<Self> {
        let mesh = import_obj(path)?;
        Ok(Self::new(&path.to_string_lossy(), mesh))
    }

    fn build_descriptors(ids: &[u32]) -> Vec<MeshDescriptor> {
        let mut descriptors: Vec<MeshDescriptor> = Vec::new();
        for (i, &id) in ids.iter().enumerate() {
            match descriptors.last_mut() {
                Some(last) if last.material_id == id => last.triangle_count += 1,
                _ => descriptors.push(MeshDescriptor {
                    material_id: id,
                    first_triangle: i as u32,
                    triangle_count: 1,
                }),
            }
        }
        descriptors
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn triangle_material_ids(&self) -> &[u32] {
        &self.triangle_material_ids
    }

    pub fn mesh_descriptors(&self) -> &[MeshDescriptor] {
        &self.mesh_descriptors
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Material of a triangle; dangling ids get a grey diffuse default.
    pub fn material_of(&self, triangle: usize) -> &Material {
        self.triangle_material_ids
            .get(triangle)
            .and_then(|&id| self.materials.get(id as usize))
            .unwrap_or(&self.fallback_material)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::empty()
    }
}
