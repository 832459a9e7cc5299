//! # Corner Occlusion and Light
//!
//! Turns a voxel's 3x3x3 neighborhood into per-corner ambient occlusion and
//! light for each of its six faces.
//!
//! Neighborhood samples are indexed `(dx + 1) * 9 + (dy + 1) * 3 + (dz + 1)`,
//! so index 13 is the voxel itself. Faces follow
//! [`BlockSide`](crate::engine_state::voxels::block::block_side::BlockSide)
//! order and corners follow the corner order of the face tables in
//! [`super::geometry`].

/// For every face corner: the diagonal neighbor, then the two edge neighbors.
const CORNER_NEIGHBORS: [[[usize; 3]; 4]; 6] = [
    [[0, 1, 3], [2, 1, 5], [6, 3, 7], [8, 5, 7]],
    [[18, 19, 21], [20, 19, 23], [24, 21, 25], [26, 23, 25]],
    [[6, 7, 15], [8, 7, 17], [24, 15, 25], [26, 17, 25]],
    [[0, 1, 9], [2, 1, 11], [18, 9, 19], [20, 11, 19]],
    [[0, 3, 9], [6, 3, 15], [18, 9, 21], [24, 15, 21]],
    [[2, 5, 11], [8, 5, 17], [20, 11, 23], [26, 17, 23]],
];

/// For every face corner: the four cells whose shade and light are averaged.
const CORNER_SAMPLES: [[[usize; 4]; 4]; 6] = [
    [[0, 1, 3, 4], [1, 2, 4, 5], [3, 4, 6, 7], [4, 5, 7, 8]],
    [[18, 19, 21, 22], [19, 20, 22, 23], [21, 22, 24, 25], [22, 23, 25, 26]],
    [[6, 7, 15, 16], [7, 8, 16, 17], [15, 16, 24, 25], [16, 17, 25, 26]],
    [[0, 1, 9, 10], [1, 2, 10, 11], [9, 10, 18, 19], [10, 11, 19, 20]],
    [[0, 3, 9, 12], [3, 6, 12, 15], [9, 12, 18, 21], [12, 15, 21, 24]],
    [[2, 5, 11, 14], [5, 8, 14, 17], [11, 14, 20, 23], [14, 17, 23, 26]],
];

/// Darkening for 0..=3 occluding neighbors.
const CURVE: [f32; 4] = [0.0, 0.25, 0.5, 0.75];

/// Index of the voxel itself among its 27 samples.
pub const SELF_SAMPLE: usize = 13;

/// Index of offset (dx, dy, dz) among the 27 samples.
pub fn sample_index(dx: i32, dy: i32, dz: i32) -> usize {
    ((dx + 1) * 9 + (dy + 1) * 3 + (dz + 1)) as usize
}

/// Per-face, per-corner shading of one voxel.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CornerShading {
    /// Ambient occlusion, 0..=1.
    pub ao: [[f32; 4]; 6],
    /// Light, 0..=1.
    pub light: [[f32; 4]; 6],
}

impl CornerShading {
    /// Darkest occlusion over every corner.
    pub fn min_ao(&self) -> f32 {
        self.ao.iter().flatten().copied().fold(1.0, f32::min)
    }

    /// Brightest light over every corner.
    pub fn max_light(&self) -> f32 {
        self.light.iter().flatten().copied().fold(0.0, f32::max)
    }
}

/// Computes corner shading from 27 opacity, light and shade samples.
///
/// A corner with both edge neighbors opaque is fully occluded regardless of
/// the diagonal. A voxel whose own cell holds full light is drawn saturated.
///
/// Light is normalized to `0.0..=1.0`. A saturated corner gets `1.0`, the
/// top of that range, not an overbright value above it.
pub fn occlusion(neighbors: &[bool; 27], lights: &[u8; 27], shades: &[f32; 27]) -> CornerShading {
    let saturated = i32::from(lights[SELF_SAMPLE]) == super::light::MAX_LIGHT;
    let mut shading = CornerShading::default();
    for face in 0..6 {
        for corner in 0..4 {
            let [diagonal, edge1, edge2] = CORNER_NEIGHBORS[face][corner].map(|i| neighbors[i]);
            let level = if edge1 && edge2 {
                3
            } else {
                usize::from(diagonal) + usize::from(edge1) + usize::from(edge2)
            };
            let samples = CORNER_SAMPLES[face][corner];
            let shade_sum: f32 = samples.iter().map(|&i| shades[i]).sum();
            let light_sum: f32 = samples.iter().map(|&i| f32::from(lights[i])).sum();

            shading.ao[face][corner] = (CURVE[level] + shade_sum / 4.0).min(1.0);
            shading.light[face][corner] = if saturated {
                1.0
            } else {
                light_sum / 15.0 / 4.0
            };
        }
    }
    shading
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_surroundings_are_unshaded() {
        let shading = occlusion(&[false; 27], &[0; 27], &[0.0; 27]);
        assert_eq!(shading, CornerShading::default());
    }

    #[test]
    fn two_edges_fully_occlude_a_corner() {
        let mut neighbors = [false; 27];
        // -x face, corner 0: edges are samples 1 and 3
        neighbors[1] = true;
        neighbors[3] = true;
        let shading = occlusion(&neighbors, &[0; 27], &[0.0; 27]);
        assert_eq!(shading.ao[0][0], 0.75);
        assert_eq!(shading.ao[0][3], 0.0);
    }

    #[test]
    fn diagonal_alone_occludes_one_step() {
        let mut neighbors = [false; 27];
        neighbors[sample_index(1, 1, 1)] = true;
        let shading = occlusion(&neighbors, &[0; 27], &[0.0; 27]);
        // +x face, corner 3 and +y face, corner 3 both touch (1, 1, 1)
        assert_eq!(shading.ao[1][3], 0.25);
        assert_eq!(shading.ao[2][3], 0.25);
    }

    #[test]
    fn occlusion_is_clamped() {
        let shading = occlusion(&[true; 27], &[0; 27], &[1.0; 27]);
        assert!(shading.ao.iter().flatten().all(|&ao| ao == 1.0));
    }

    #[test]
    fn light_averages_four_samples() {
        let mut lights = [0u8; 27];
        for i in CORNER_SAMPLES[2][0] {
            lights[i] = 6;
        }
        let shading = occlusion(&[false; 27], &lights, &[0.0; 27]);
        assert!((shading.light[2][0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn full_light_on_the_voxel_saturates_every_corner() {
        let mut lights = [0u8; 27];
        lights[SELF_SAMPLE] = 15;
        let shading = occlusion(&[false; 27], &lights, &[0.0; 27]);
        assert_eq!(shading.max_light(), 1.0);
        assert!(shading.light.iter().flatten().all(|&l| l == 1.0));
    }

    #[test]
    fn sample_index_centers_on_the_voxel() {
        assert_eq!(sample_index(0, 0, 0), SELF_SAMPLE);
        assert_eq!(sample_index(-1, -1, -1), 0);
        assert_eq!(sample_index(1, 1, 1), 26);
    }
}
