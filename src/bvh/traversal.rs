use smallvec::SmallVec;

use super::{Bvh, NodeKind};
use crate::objects::{HitRecord, Hittable};
use crate::types::ray::Ray;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitMode {
    /// Closest hit along the ray.
    Nearest,
    /// First hit found; for occlusion queries.
    Any,
}

// (node, entry distance); deep enough for any tree this builder makes without spilling.
type Stack = SmallVec<[(u32, f32); 64]>;

impl Bvh {
    /// Intersects `ray` over `[ray.t_min, ray.t_max]` with the primitives this hierarchy was
    /// built over. `None` means the ray escapes (or, in `Any` mode, is unoccluded).
    pub fn intersect<P: Hittable>(
        &self,
        ray: &Ray,
        primitives: &[P],
        mode: HitMode,
    ) -> Option<HitRecord> {
        let root = self.nodes.first()?;
        let entry = root.bbox.hit(ray, ray.t_min, ray.t_max)?;

        let mut best: Option<HitRecord> = None;
        let mut best_t = ray.t_max;
        let mut stack: Stack = SmallVec::new();
        stack.push((0, entry));

        while let Some((index, entry)) = stack.pop() {
            // Something closer turned up after this node was pushed
            if entry > best_t {
                continue;
            }

            match self.nodes[index as usize].kind {
                NodeKind::Leaf { start, count } => {
                    for &tri in self.leaf_triangles(start, count) {
                        if let Some(hit) = primitives[tri as usize].hit(ray, ray.t_min, best_t) {
                            best_t = hit.t;
                            best = Some(HitRecord::new(hit, tri));
                            if mode == HitMode::Any {
                                return best;
                            }
                        }
                    }
                }
                NodeKind::Internal { left, right } => {
                    let hit_left = self.nodes[left as usize].bbox.hit(ray, ray.t_min, best_t);
                    let hit_right = self.nodes[right as usize].bbox.hit(ray, ray.t_min, best_t);

                    // Nearer child goes on top so it is visited first
                    match (hit_left, hit_right) {
                        (Some(tl), Some(tr)) => {
                            if tl <= tr {
                                stack.push((right, tr));
                                stack.push((left, tl));
                            } else {
                                stack.push((left, tl));
                                stack.push((right, tr));
                            }
                        }
                        (Some(tl), None) => stack.push((left, tl)),
                        (None, Some(tr)) => stack.push((right, tr)),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }

    /// Shadow-ray query.
    pub fn occluded<P: Hittable>(&self, ray: &Ray, primitives: &[P]) -> bool {
        self.intersect(ray, primitives, HitMode::Any).is_some()
    }
}
