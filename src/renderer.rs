use na::{Point3, Vector3};
use rand::Rng;
use rayon::prelude::*;

use crate::bvh::HitMode;
use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::light::Light;
use crate::materials::Material;
use crate::model::Model;
use crate::types::color::{Color, ColorOps};
use crate::types::pdf::{CosineWeightedHemispherePDF, PDF};
use crate::types::ray::{Ray, RAY_EPSILON};
use crate::types::sampler::{stream, Sampler, SquareSampler};

// Light samples closer than this contribute nothing (avoids the 1/d^2 blow-up).
const MIN_LIGHT_DISTANCE: f32 = 1e-3;
const MIN_SURVIVAL: f32 = 0.05;
const MAX_SURVIVAL: f32 = 0.95;

struct SurfacePoint<'a> {
    p: Point3<f32>,
    // Unit, flipped to face the incoming ray
    n: Vector3<f32>,
    material: &'a Material,
}

/// Read-only view of everything a render pass traces against. Shared by all pixels.
pub struct Tracer<'a> {
    model: &'a Model,
    light: &'a Light,
    config: &'a RenderConfig,
}

impl<'a> Tracer<'a> {
    pub fn new(model: &'a Model, light: &'a Light, config: &'a RenderConfig) -> Self {
        Self {
            model,
            light,
            config,
        }
    }

    fn surface(&self, ray: &Ray) -> Option<SurfacePoint<'a>> {
        let model = self.model;
        let hit = model
            .bvh()
            .intersect(ray, model.triangles(), HitMode::Nearest)?;
        let tri = &model.triangles()[hit.triangle()];

        let n = tri.shading_normal(&hit.bary());
        if n.norm_squared() == 0.0 {
            return None;
        }
        let n = if n.dot(&ray.direction) > 0.0 { -n } else { n };

        Some(SurfacePoint {
            p: hit.p(ray),
            n,
            material: model.material_of(hit.triangle()),
        })
    }

    fn visible(&self, p: &Point3<f32>, n: &Vector3<f32>, target: &Point3<f32>) -> bool {
        let to_target = target - p;
        let dist = to_target.norm();
        let mut shadow = Ray::spawn(*p, n, to_target);
        shadow.t_max = dist - RAY_EPSILON;
        shadow.t_max > shadow.t_min && !self.model.bvh().occluded(&shadow, self.model.triangles())
    }

    /// Geometry term `cos_x * cos_l * A / d^2` for light point `y` seen from `p`, or `None`
    /// when the pair cannot exchange light.
    fn light_geometry(&self, p: &Point3<f32>, n: &Vector3<f32>, y: &Point3<f32>) -> Option<(Vector3<f32>, f32)> {
        let w = y - p;
        let d2 = w.norm_squared();
        if d2 < MIN_LIGHT_DISTANCE * MIN_LIGHT_DISTANCE {
            return None;
        }
        let l = w / d2.sqrt();
        let cos_x = n.dot(&l);
        let cos_l = -self.light.normal.dot(&l);
        if cos_x <= 0.0 || cos_l <= 0.0 {
            return None;
        }
        Some((l, cos_x * cos_l * self.light.area() / d2))
    }

    /// Whitted-style shading: ambient plus Phong against the light's centre, shadowed.
    pub fn trace_direct(&self, ray: &Ray, path: &mut Vec<Point3<f32>>) -> Color {
        let Some(s) = self.surface(ray) else {
            return self.config.background();
        };
        path.push(s.p);

        let mut color = s.material.ambient * self.config.ambient;
        let light = self.light;
        if light.is_active() {
            if let Some((l, g)) = self.light_geometry(&s.p, &s.n, &light.position) {
                if self.visible(&s.p, &s.n, &light.position) {
                    path.push(light.position);
                    // phong weights its diffuse half by n.l itself; the highlight stays
                    // unweighted by n.l, as in classic Phong
                    let cos_x = s.n.dot(&l);
                    let shade = s.material.phong(&s.n, &l, &-ray.direction) / std::f32::consts::PI;
                    color += shade.component_mul(&light.emitted(&-l)) * (g / cos_x);
                }
            }
        }

        if color.is_finite() {
            color
        } else {
            Color::zeros()
        }
    }

    /// One path sample: next-event estimation at every vertex, cosine-weighted diffuse
    /// bounces, Russian roulette past the configured depth. Visited vertices go to `path`.
    pub fn trace_path(&self, ray: &Ray, rng: &mut impl Rng, path: &mut Vec<Point3<f32>>) -> Color {
        let mut radiance = Color::zeros();
        let mut throughput = Color::gray(1.0);
        let mut ray = *ray;
        let light = self.light;

        for depth in 0..self.config.max_depth {
            let Some(s) = self.surface(&ray) else {
                if depth == 0 {
                    radiance = self.config.background();
                }
                break;
            };
            path.push(s.p);
            let brdf = s.material.diffuse_brdf();

            if light.is_active() {
                let y = light.sample_point(rng);
                if let Some((l, g)) = self.light_geometry(&s.p, &s.n, &y) {
                    if self.visible(&s.p, &s.n, &y) {
                        let le = light.emitted(&-l);
                        radiance += throughput.component_mul(&brdf).component_mul(&le) * g;
                    }
                }
            }

            let pdf = CosineWeightedHemispherePDF::new(&s.n);
            let direction = pdf.generate(rng);
            let pdf_value = pdf.value(&direction);
            if pdf_value <= 0.0 {
                break;
            }
            throughput = throughput.component_mul(&brdf) * (s.n.dot(&direction).max(0.0) / pdf_value);

            if depth + 1 >= self.config.russian_roulette_depth {
                let survival = throughput.max_channel().clamp(MIN_SURVIVAL, MAX_SURVIVAL);
                if rng.gen::<f32>() >= survival {
                    break;
                }
                throughput /= survival;
            }
            if throughput.max_channel() <= 0.0 || !throughput.is_finite() {
                break;
            }

            ray = Ray::spawn(s.p, &s.n, direction);
        }

        if radiance.is_finite() {
            radiance
        } else {
            Color::zeros()
        }
    }
}

/// Stream key of sample `sample` of pixel `pixel`. Every (pixel, sample) pair gets its own
/// stream, so a sample's value never depends on how passes were batched.
fn sample_key(pixel: usize, sample: u64) -> u64 {
    (sample << 32) | (pixel as u64 & 0xffff_ffff)
}

/// Drives tracing over a canvas. Tracks how many path samples each pixel has taken so far;
/// `reset` starts the sequence over.
pub struct Renderer {
    config: RenderConfig,
    samples_taken: u64,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            samples_taken: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Path samples per pixel accumulated since the last reset.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    pub fn reset(&mut self) {
        self.samples_taken = 0;
    }

    /// Deterministic single-sample pass; replaces the canvas contents.
    pub fn ray_trace_to_canvas(&self, canvas: &mut Canvas, camera: &Camera, model: &Model, light: &Light) {
        let tracer = Tracer::new(model, light, &self.config);
        let (w, h) = (canvas.width(), canvas.height());

        let pass: Vec<Color> = (0..canvas.len())
            .into_par_iter()
            .map(|i| {
                let (x, y) = ((i as u32 % w) as f32, (i as u32 / w) as f32);
                let ray = camera.primary_ray(x + 0.5, y + 0.5, w, h);
                tracer.trace_direct(&ray, &mut Vec::new())
            })
            .collect();

        canvas.overwrite(pass);
    }

    /// One progressive path-tracing pass (`samples_per_frame` paths per pixel) folded into
    /// the canvas mean.
    pub fn path_trace_to_canvas(&mut self, canvas: &mut Canvas, camera: &Camera, model: &Model, light: &Light) {
        let tracer = Tracer::new(model, light, &self.config);
        let (w, h) = (canvas.width(), canvas.height());
        let spp = self.config.samples_per_frame.max(1) as u64;
        let seed = self.config.seed;
        let first = self.samples_taken;

        let pass: Vec<Color> = (0..canvas.len())
            .into_par_iter()
            .map(|i| {
                let (x, y) = ((i as u32 % w) as f32, (i as u32 / w) as f32);
                let sampler = SquareSampler::pixel();
                let mut path = Vec::new();
                (first..first + spp)
                    .map(|sample| {
                        let mut rng = stream(seed, sample_key(i, sample));
                        let (dx, dy) = sampler.sample(&mut rng);
                        let ray = camera.primary_ray(x + dx, y + dy, w, h);
                        path.clear();
                        tracer.trace_path(&ray, &mut rng, &mut path)
                    })
                    .sum::<Color>()
                    / spp as f32
            })
            .collect();

        self.samples_taken += spp;
        canvas.accumulate(&pass);
    }

    /// Points visited by the direct-lighting ray through `pixel`: eye, hit, and the light if
    /// the hit is lit.
    pub fn debug_ray_trace(
        &self,
        pixel: (u32, u32),
        size: (u32, u32),
        camera: &Camera,
        model: &Model,
        light: &Light,
    ) -> Vec<Point3<f32>> {
        let tracer = Tracer::new(model, light, &self.config);
        let ray = camera.primary_ray(pixel.0 as f32 + 0.5, pixel.1 as f32 + 0.5, size.0, size.1);
        let mut path = vec![ray.origin];
        tracer.trace_direct(&ray, &mut path);
        path
    }

    /// Vertices of the first path sample through `pixel`.
    pub fn debug_path_trace(
        &self,
        pixel: (u32, u32),
        size: (u32, u32),
        camera: &Camera,
        model: &Model,
        light: &Light,
    ) -> Vec<Point3<f32>> {
        let tracer = Tracer::new(model, light, &self.config);
        let index = pixel.1 as usize * size.0 as usize + pixel.0 as usize;
        let mut rng = stream(self.config.seed, sample_key(index, 0));
        let (dx, dy) = SquareSampler::pixel().sample(&mut rng);
        let ray = camera.primary_ray(pixel.0 as f32 + dx, pixel.1 as f32 + dy, size.0, size.1);
        let mut path = vec![ray.origin];
        tracer.trace_path(&ray, &mut rng, &mut path);
        path
    }
}
