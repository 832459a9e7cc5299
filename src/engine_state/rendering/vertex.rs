//! Vertex records produced by the mesher.
//!
//! Every face is written as two triangles, six vertices, with no index buffer,
//! so a face always occupies the same number of bytes. The door index relies on
//! that to patch a face range in place.

/// Vertices written per face.
pub const VERTICES_PER_FACE: usize = 6;

/// A vertex of block geometry.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Atlas coordinates: 2x f32 (8 bytes)
/// - Ambient occlusion: f32 (4 bytes)
/// - Light: f32 (4 bytes)
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Texture atlas coordinates.
    pub uv: [f32; 2],
    /// Occlusion darkening, 0 (open) to 1 (fully occluded).
    pub ao: f32,
    /// Local light, 0 (dark) to 1 (saturated).
    pub light: f32,
}

/// A vertex of sign text geometry.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Font atlas coordinates: 2x f32 (8 bytes)
/// - Color: 3x f32 (12 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SignVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Font atlas coordinates.
    pub uv: [f32; 2],
    /// Text color.
    pub color: [f32; 3],
}

/// Side of one tile in a 16x16 atlas.
const TILE: f32 = 1.0 / 16.0;
/// Inset keeping samples off the tile edge.
const INSET: f32 = 1.0 / 2048.0;

/// Atlas coordinates of a unit-square corner `(u, v)` in tile `tile`.
pub fn atlas_uv(tile: u32, u: bool, v: bool) -> [f32; 2] {
    let du = (tile % 16) as f32 * TILE;
    let dv = (tile / 16) as f32 * TILE;
    let pick = |high: bool| if high { TILE - INSET } else { INSET };
    [du + pick(u), dv + pick(v)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn layouts_have_no_padding() {
        assert_eq!(size_of::<Vertex>(), 40);
        assert_eq!(size_of::<SignVertex>(), 32);
    }

    #[test]
    fn atlas_coordinates_stay_inside_their_tile() {
        let [u0, v0] = atlas_uv(17, false, false);
        let [u1, v1] = atlas_uv(17, true, true);
        assert!(u0 > TILE && u1 < 2.0 * TILE);
        assert!(v0 > TILE && v1 < 2.0 * TILE);
    }
}
