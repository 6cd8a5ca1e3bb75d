use std::collections::BTreeMap;

use crate::types::color::{Color, ColorOps};
use na::Vector3;

pub fn reflect(v: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    v - 2.0 * v.dot(n) * n
}

/// Phong-style reflectance constants as they come out of the importer.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: Color::zeros(),
            diffuse: Color::gray(0.5),
            specular: Color::zeros(),
            shininess: 1.0,
        }
    }
}

impl Material {
    pub fn lambertian(name: &str, albedo: Color) -> Self {
        Self {
            name: name.to_string(),
            diffuse: albedo,
            ..Default::default()
        }
    }

    /// Lambertian BRDF value, `kd / pi`.
    pub fn diffuse_brdf(&self) -> Color {
        self.diffuse / std::f32::consts::PI
    }

    /// Diffuse plus Phong highlight for light direction `l` and view direction `v` (both
    /// pointing away from the surface), scaled by `n . l`.
    pub fn phong(&self, n: &Vector3<f32>, l: &Vector3<f32>, v: &Vector3<f32>) -> Color {
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            return Color::zeros();
        }
        let r = reflect(&-l, n);
        let highlight = r.dot(v).max(0.0).powf(self.shininess.max(1.0));

        self.diffuse * n_dot_l + self.specular * highlight
    }
}

impl From<&tobj::Material> for Material {
    fn from(mat: &tobj::Material) -> Self {
        let rgb = |c: Option<[f32; 3]>, fallback: Color| {
            c.map(|[r, g, b]| Color::new(r, g, b)).unwrap_or(fallback)
        };
        let fallback = Material::default();

        Self {
            name: mat.name.clone(),
            ambient: rgb(mat.ambient, fallback.ambient),
            diffuse: rgb(mat.diffuse, fallback.diffuse),
            specular: rgb(mat.specular, fallback.specular),
            shininess: mat.shininess.unwrap_or(fallback.shininess),
        }
    }
}

/// Name -> index table used while assembling procedural scenes.
pub struct MaterialRegistry {
    materials: Vec<Material>,
    by_name: BTreeMap<String, u32>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        MaterialRegistry {
            materials: Vec::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) a material and returns its index.
    pub fn create_material(&mut self, material: Material) -> u32 {
        match self.by_name.get(&material.name) {
            Some(&id) => {
                self.materials[id as usize] = material;
                id
            }
            None => {
                let id = self.materials.len() as u32;
                self.by_name.insert(material.name.clone(), id);
                self.materials.push(material);
                id
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        match self.by_name.get(name) {
            Some(id) => Some(*id),
            None => {
                log::error!("Material not found: {}", name);
                None
            }
        }
    }

    pub fn into_materials(self) -> Vec<Material> {
        self.materials
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}
