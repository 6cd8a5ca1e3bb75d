pub mod morton;
pub mod traversal;

use crate::objects::Hittable;
use crate::types::ray::Ray;
use na::Point3;

pub use traversal::HitMode;

/// Leaves never hold more triangles than this.
pub const MAX_TRIS_PER_LEAF: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl BBox {
    // a, b are opposite corners
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        let min = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));

        Self { min, max }
    }

    /// Inverted box; the identity of `merge`.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn merge(&self, other: &Self) -> Self {
        let min = Point3::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.min.z.min(other.min.z),
        );
        let max = Point3::new(
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
            self.max.z.max(other.max.z),
        );
        Self { min, max }
    }

    pub fn grow(&self, p: &Point3<f32>) -> Self {
        self.merge(&Self { min: *p, max: *p })
    }

    pub fn center(&self) -> Point3<f32> {
        na::center(&self.min, &self.max)
    }

    pub fn get_surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let extent = self.max - self.min;
        2.0 * extent.x * extent.y + 2.0 * extent.x * extent.z + 2.0 * extent.y * extent.z
    }

    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }

    /// The 8 corners, for wireframe drawing.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }

    fn get_interval(&self, axis: usize) -> (f32, f32) {
        (self.min[axis], self.max[axis])
    }

    /// Slab test. Returns the entry distance clipped to `[t_min, t_max]`, or `None` when the
    /// ray misses the box inside that interval. An axis the ray runs parallel to constrains
    /// nothing as long as the origin lies within that slab.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<f32> {
        let orig = ray.origin;
        let dir = ray.direction;

        let mut t_min: f32 = t_min;
        let mut t_max: f32 = t_max;

        // Find intersection of interval for each axis
        for axis in 0..3 {
            let (min, max) = self.get_interval(axis);

            if dir[axis] == 0.0 {
                if orig[axis] < min || orig[axis] > max {
                    return None;
                }
                continue;
            }

            let adinv: f32 = 1.0_f32 / dir[axis];
            let t0 = (min - orig[axis]) * adinv;
            let t1 = (max - orig[axis]) * adinv;
            let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            if near > t_min {
                t_min = near;
            }
            if far < t_max {
                t_max = far;
            }

            if t_max < t_min {
                return None;
            }
        }
        Some(t_min)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Internal { left: u32, right: u32 },
    /// `start..start + count` indexes `Bvh::triangle_order`.
    Leaf { start: u32, count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub bbox: BBox,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Flat, index-linked hierarchy over a triangle array. Node 0 is the root; children always
/// come after their parent. The triangles themselves stay where they are; leaves address
/// them through `triangle_order`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<Node>,
    triangle_order: Vec<u32>,
}

impl Bvh {
    /// Morton-ordered LBVH build. Total and deterministic: the same input always gives the
    /// same node sequence and triangle order.
    pub fn build<P: Hittable>(primitives: &[P]) -> Self {
        if primitives.is_empty() {
            return Self::default();
        }

        let bboxes: Vec<BBox> = primitives.iter().map(|p| p.bbox()).collect();
        let centroids: Vec<Point3<f32>> = primitives.iter().map(|p| p.centroid()).collect();
        let codes = morton::encode_centroids(&centroids);

        let mut triangle_order: Vec<u32> = (0..primitives.len() as u32).collect();
        // Stable, so equal keys keep their input order.
        triangle_order.sort_by_key(|&i| codes[i as usize]);
        let sorted_codes: Vec<u32> = triangle_order.iter().map(|&i| codes[i as usize]).collect();

        let mut nodes: Vec<Node> = Vec::with_capacity(2 * primitives.len() / MAX_TRIS_PER_LEAF + 1);
        nodes.push(Node {
            bbox: BBox::empty(),
            kind: NodeKind::Leaf {
                start: 0,
                count: primitives.len() as u32,
            },
        });

        // Top-down split over a work list of (node, start, end) ranges.
        let mut work = vec![(0_usize, 0_usize, primitives.len())];
        while let Some((node, start, end)) = work.pop() {
            if end - start <= MAX_TRIS_PER_LEAF {
                let bbox = triangle_order[start..end]
                    .iter()
                    .fold(BBox::empty(), |acc, &i| acc.merge(&bboxes[i as usize]));
                nodes[node] = Node {
                    bbox,
                    kind: NodeKind::Leaf {
                        start: start as u32,
                        count: (end - start) as u32,
                    },
                };
                continue;
            }

            let mid = morton::find_split(&sorted_codes, start, end);
            let left = nodes.len();
            let right = left + 1;
            let placeholder = Node {
                bbox: BBox::empty(),
                kind: NodeKind::Leaf { start: 0, count: 0 },
            };
            nodes.push(placeholder);
            nodes.push(placeholder);
            nodes[node].kind = NodeKind::Internal {
                left: left as u32,
                right: right as u32,
            };

            work.push((right, mid, end));
            work.push((left, start, mid));
        }

        // Children sit after parents, so one reverse sweep fixes every internal box.
        for i in (0..nodes.len()).rev() {
            if let NodeKind::Internal { left, right } = nodes[i].kind {
                nodes[i].bbox = nodes[left as usize].bbox.merge(&nodes[right as usize].bbox);
            }
        }

        let bvh = Self {
            nodes,
            triangle_order,
        };
        log::debug!(
            "Built BVH over {} triangles: {} nodes, {} leaves",
            primitives.len(),
            bvh.nodes.len(),
            bvh.leaf_count()
        );
        bvh
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn triangle_order(&self) -> &[u32] {
        &self.triangle_order
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn bbox(&self) -> BBox {
        self.nodes.first().map_or_else(BBox::empty, |root| root.bbox)
    }

    /// Original triangle indices stored in a leaf's range.
    pub fn leaf_triangles(&self, start: u32, count: u32) -> &[u32] {
        &self.triangle_order[start as usize..(start + count) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::tri_mesh::Triangle;
    use na::Vector3;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    pub(crate) fn random_triangles(n: usize, seed: u64) -> Vec<Triangle> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let c = Point3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let mut jitter = || {
                    Vector3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    )
                };
                Triangle::new([c + jitter(), c + jitter(), c + jitter()], None)
            })
            .collect()
    }

    fn depth_first_leaves(bvh: &Bvh, node: usize, out: &mut Vec<(u32, u32)>) {
        match bvh.nodes()[node].kind {
            NodeKind::Leaf { start, count } => out.push((start, count)),
            NodeKind::Internal { left, right } => {
                depth_first_leaves(bvh, left as usize, out);
                depth_first_leaves(bvh, right as usize, out);
            }
        }
    }

    #[test]
    fn empty_box_is_absorbed_by_merge() {
        let b = BBox::new(Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.0, 5.0));
        assert_eq!(BBox::empty().merge(&b), b);
        assert_eq!(b.merge(&BBox::empty()), b);
        assert!(BBox::empty().is_empty());
        assert_eq!(BBox::empty().get_surface_area(), 0.0);
        assert_eq!(b.min(), Point3::new(-1.0, 0.0, 3.0));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = BBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(b.get_surface_area(), 6.0);
    }

    #[test]
    fn slab_test_handles_axis_parallel_rays() {
        let b = BBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let inside_slab = Ray::new(Point3::new(0.5, 0.5, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(b.hit(&inside_slab, 0.0, f32::INFINITY), Some(4.0));
        let outside_slab = Ray::new(Point3::new(2.0, 0.5, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(b.hit(&outside_slab, 0.0, f32::INFINITY), None);
        // Origin exactly on a face plane, running along it
        let on_face = Ray::new(Point3::new(1.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(b.hit(&on_face, 0.0, f32::INFINITY), Some(4.0));
    }

    #[test]
    fn slab_test_respects_interval() {
        let b = BBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(b.hit(&ray, 0.0, 3.0), None);
        assert_eq!(b.hit(&ray, 4.5, 10.0), Some(4.5));
        let behind = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(b.hit(&behind, 0.0, f32::INFINITY), None);
    }

    #[test]
    fn zero_triangles_build_an_empty_tree() {
        let bvh = Bvh::build::<Triangle>(&[]);
        assert!(bvh.is_empty());
        assert!(bvh.triangle_order().is_empty());
        assert!(bvh.bbox().is_empty());
    }

    #[test]
    fn one_triangle_is_a_single_leaf() {
        let tris = random_triangles(1, 1);
        let bvh = Bvh::build(&tris);
        assert_eq!(bvh.nodes().len(), 1);
        assert_eq!(bvh.nodes()[0].kind, NodeKind::Leaf { start: 0, count: 1 });
        assert_eq!(bvh.bbox(), tris[0].bbox());
    }

    #[test]
    fn every_triangle_lands_in_exactly_one_small_leaf() {
        for (n, seed) in [(9, 2), (100, 3), (1000, 4), (4097, 5)] {
            let tris = random_triangles(n, seed);
            let bvh = Bvh::build(&tris);

            let mut leaves = Vec::new();
            depth_first_leaves(&bvh, 0, &mut leaves);
            let mut seen = vec![0_u32; n];
            for (start, count) in leaves {
                assert!(count as usize <= MAX_TRIS_PER_LEAF);
                assert!(count > 0);
                for &t in bvh.leaf_triangles(start, count) {
                    seen[t as usize] += 1;
                }
            }
            assert!(seen.iter().all(|&c| c == 1), "n = {}", n);
        }
    }

    #[test]
    fn internal_boxes_are_exact_unions_of_children() {
        let tris = random_triangles(2000, 6);
        let bvh = Bvh::build(&tris);
        for node in bvh.nodes() {
            match node.kind {
                NodeKind::Internal { left, right } => {
                    let l = bvh.nodes()[left as usize].bbox;
                    let r = bvh.nodes()[right as usize].bbox;
                    assert_eq!(node.bbox, l.merge(&r));
                }
                NodeKind::Leaf { start, count } => {
                    let expected = bvh
                        .leaf_triangles(start, count)
                        .iter()
                        .fold(BBox::empty(), |acc, &t| acc.merge(&tris[t as usize].bbox()));
                    assert_eq!(node.bbox, expected);
                }
            }
        }
        let scene = tris.iter().fold(BBox::empty(), |acc, t| acc.merge(&t.bbox()));
        assert_eq!(bvh.bbox(), scene);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let tris = random_triangles(3000, 7);
        assert_eq!(Bvh::build(&tris), Bvh::build(&tris));
    }

    #[test]
    fn colocated_triangles_still_terminate() {
        let tri = Triangle::new(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        );
        let tris = vec![tri; 100];
        let bvh = Bvh::build(&tris);
        assert!(bvh.nodes().iter().all(|n| match n.kind {
            NodeKind::Leaf { count, .. } => count as usize <= MAX_TRIS_PER_LEAF,
            NodeKind::Internal { .. } => true,
        }));
        // Equal keys keep input order
        assert_eq!(bvh.triangle_order(), (0..100).collect::<Vec<u32>>().as_slice());
    }
}
