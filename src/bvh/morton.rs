use crate::bvh::BBox;
use na::Point3;

/// Bits per axis; keys use the low 30 bits.
pub const BITS_PER_AXIS: u32 = 10;
const GRID: f32 = (1 << BITS_PER_AXIS) as f32;

// Spreads the low 10 bits of `v` so there are two zero bits between each.
fn expand_bits(v: u32) -> u32 {
    let mut v = v & 0x3ff;
    v = v.wrapping_mul(0x0001_0001) & 0xff00_00ff;
    v = v.wrapping_mul(0x0000_0101) & 0x0f00_f00f;
    v = v.wrapping_mul(0x0000_0011) & 0xc30c_30c3;
    v = v.wrapping_mul(0x0000_0005) & 0x4924_9249;
    v
}

/// Interleaves three grid coordinates in `[0, 1024)` as `..x2y2z2 x1y1z1 x0y0z0`.
pub fn morton3(x: u32, y: u32, z: u32) -> u32 {
    (expand_bits(x) << 2) | (expand_bits(y) << 1) | expand_bits(z)
}

fn quantize(value: f32, min: f32, extent: f32) -> u32 {
    if extent <= 0.0 {
        return 0;
    }
    // NaN casts to 0
    ((value - min) / extent * GRID).clamp(0.0, GRID - 1.0) as u32
}

/// Morton keys of the centroids on a grid stretched over their bounding box. Flat axes
/// collapse to coordinate 0.
pub fn encode_centroids(centroids: &[Point3<f32>]) -> Vec<u32> {
    let bounds = centroids
        .iter()
        .fold(BBox::empty(), |acc, c| acc.grow(c));
    let min = bounds.min();
    let extent = bounds.max() - min;

    centroids
        .iter()
        .map(|c| {
            morton3(
                quantize(c.x, min.x, extent.x),
                quantize(c.y, min.y, extent.y),
                quantize(c.z, min.z, extent.z),
            )
        })
        .collect()
}

/// Split point for the sorted range `start..end` (at least two keys): the first key whose
/// highest bit differing across the range is set. Ranges of identical keys are halved.
/// The result always lies strictly inside the range.
pub fn find_split(sorted_codes: &[u32], start: usize, end: usize) -> usize {
    let first = sorted_codes[start];
    let last = sorted_codes[end - 1];

    if first == last {
        return start + (end - start) / 2;
    }

    let prefix = (first ^ last).leading_zeros();
    start
        + sorted_codes[start..end].partition_point(|&code| (code ^ first).leading_zeros() > prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_bits() {
        assert_eq!(morton3(0, 0, 0), 0);
        assert_eq!(morton3(1, 0, 0), 0b100);
        assert_eq!(morton3(0, 1, 0), 0b010);
        assert_eq!(morton3(0, 0, 1), 0b001);
        assert_eq!(morton3(3, 0, 0), 0b100100);
        assert_eq!(morton3(1023, 1023, 1023), (1 << 30) - 1);
    }

    #[test]
    fn nearby_points_get_nearby_keys() {
        let codes = encode_centroids(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.01, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ]);
        assert!(codes[1] - codes[0] < codes[2] - codes[1]);
        assert_eq!(codes[2], (1 << 30) - 1);
    }

    #[test]
    fn flat_and_colocated_inputs_are_finite_keys() {
        let codes = encode_centroids(&[Point3::new(2.0, 2.0, 2.0); 4]);
        assert_eq!(codes, vec![0; 4]);
        assert!(encode_centroids(&[]).is_empty());
    }

    #[test]
    fn split_falls_on_highest_differing_bit() {
        let codes = [0b0001, 0b0011, 0b0100, 0b0110, 0b0111];
        assert_eq!(find_split(&codes, 0, 5), 2);
        assert_eq!(find_split(&codes, 2, 5), 3);
    }

    #[test]
    fn split_of_equal_keys_is_the_median() {
        let codes = [5; 9];
        assert_eq!(find_split(&codes, 0, 9), 4);
        assert_eq!(find_split(&codes, 3, 5), 4);
    }
}
