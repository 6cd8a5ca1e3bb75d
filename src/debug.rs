use na::Point3;

use crate::bvh::{BBox, Bvh, NodeKind};
use crate::types::color::Color;

/// One hierarchy box as the overlay draws it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugBox {
    pub node: u32,
    pub bbox: BBox,
    pub depth: u32,
    pub is_leaf: bool,
}

impl DebugBox {
    /// The 12 box edges as line segments.
    pub fn edges(&self) -> [(Point3<f32>, Point3<f32>); 12] {
        let c = self.bbox.corners();
        std::array::from_fn(|i| match i {
            0..=3 => (c[i], c[(i + 1) % 4]),
            4..=7 => (c[i], c[4 + (i + 1) % 4]),
            _ => (c[i - 8], c[i - 4]),
        })
    }
}

/// Every node box in node order, tagged with its depth below the root.
pub fn bvh_boxes(bvh: &Bvh) -> Vec<DebugBox> {
    let nodes = bvh.nodes();
    let mut depths = vec![0_u32; nodes.len()];
    // Parents precede children, so one forward sweep settles every depth.
    for (i, node) in nodes.iter().enumerate() {
        if let NodeKind::Internal { left, right } = node.kind {
            depths[left as usize] = depths[i] + 1;
            depths[right as usize] = depths[i] + 1;
        }
    }

    nodes
        .iter()
        .zip(depths)
        .enumerate()
        .map(|(i, (node, depth))| DebugBox {
            node: i as u32,
            bbox: node.bbox,
            depth,
            is_leaf: node.is_leaf(),
        })
        .collect()
}

/// Blue at the root through green to red at `max_depth`.
pub fn depth_color(depth: u32, max_depth: u32) -> Color {
    let t = if max_depth == 0 {
        0.0
    } else {
        (depth.min(max_depth) as f32) / max_depth as f32
    };
    if t < 0.5 {
        let s = t * 2.0;
        Color::new(0.0, s, 1.0 - s)
    } else {
        let s = (t - 0.5) * 2.0;
        Color::new(s, 1.0 - s, 0.0)
    }
}

/// Triangles (original indices) under `node`, in leaf order. Out-of-range nodes give none.
pub fn node_triangles(bvh: &Bvh, node: usize) -> Vec<u32> {
    let mut triangles = Vec::new();
    if node >= bvh.nodes().len() {
        return triangles;
    }

    let mut stack = vec![node];
    while let Some(i) = stack.pop() {
        match bvh.nodes()[i].kind {
            NodeKind::Leaf { start, count } => {
                triangles.extend_from_slice(bvh.leaf_triangles(start, count))
            }
            NodeKind::Internal { left, right } => {
                stack.push(right as usize);
                stack.push(left as usize);
            }
        }
    }
    triangles
}
