//! # Shape Geometry
//!
//! Writes the vertices of one voxel. Every shape except plants is built from
//! axis-aligned boxes; rotations are quarter turns, so a rotated box is still
//! axis-aligned and its faces keep their world-space direction. That lets each
//! box face use the voxel's shading for the same world face.

use cgmath::{Deg, Matrix3, Point3, Vector3};

use super::occlusion::CornerShading;
use crate::engine_state::rendering::vertex::{atlas_uv, Vertex};
use crate::engine_state::voxels::block::{
    block_side::BlockSide,
    get_texture_indices_from_int,
    shape::{Shape, Transform, EXTRA_OPEN},
};
use crate::engine_state::voxels::chunk::doors::DoorEntry;

/// Corner signs of every face, per axis, in corner order.
const FACE_CORNERS: [[[i8; 3]; 4]; 6] = [
    [[-1, -1, -1], [-1, -1, 1], [-1, 1, -1], [-1, 1, 1]],
    [[1, -1, -1], [1, -1, 1], [1, 1, -1], [1, 1, 1]],
    [[-1, 1, -1], [-1, 1, 1], [1, 1, -1], [1, 1, 1]],
    [[-1, -1, -1], [-1, -1, 1], [1, -1, -1], [1, -1, 1]],
    [[-1, -1, -1], [-1, 1, -1], [1, -1, -1], [1, 1, -1]],
    [[-1, -1, 1], [-1, 1, 1], [1, -1, 1], [1, 1, 1]],
];

/// Which tile edge (u, v) each face corner maps to.
const FACE_UVS: [[[bool; 2]; 4]; 6] = [
    [[false, false], [true, false], [false, true], [true, true]],
    [[true, false], [false, false], [true, true], [false, true]],
    [[false, true], [false, false], [true, true], [true, false]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[true, false], [true, true], [false, false], [false, true]],
];

/// Triangle corner order for even and odd faces.
const TRIANGLES: [[usize; 6]; 2] = [[0, 3, 2, 0, 1, 3], [0, 3, 1, 0, 2, 3]];
/// Triangle order with the quad split along the other diagonal.
const FLIPPED: [[usize; 6]; 2] = [[0, 1, 2, 1, 3, 2], [0, 2, 1, 2, 3, 1]];

/// Corner positions of the four plant quads, scaled by half a block.
const PLANT_CORNERS: [[[i8; 3]; 4]; 4] = [
    [[0, -1, -1], [0, -1, 1], [0, 1, -1], [0, 1, 1]],
    [[0, -1, -1], [0, -1, 1], [0, 1, -1], [0, 1, 1]],
    [[-1, -1, 0], [-1, 1, 0], [1, -1, 0], [1, 1, 0]],
    [[-1, -1, 0], [-1, 1, 0], [1, -1, 0], [1, 1, 0]],
];

const PLANT_NORMALS: [[f32; 3]; 4] = [
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
];

const PLANT_UVS: [[[bool; 2]; 4]; 4] = [
    [[false, false], [true, false], [false, true], [true, true]],
    [[true, false], [false, false], [true, true], [false, true]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[true, false], [true, true], [false, false], [false, true]],
];

/// An axis-aligned box relative to the voxel center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vector3<f32>,
    /// Maximum corner.
    pub max: Vector3<f32>,
}

impl Bounds {
    /// A box from its two corners.
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// The full voxel.
    pub fn unit() -> Self {
        Self::new([-0.5; 3], [0.5; 3])
    }

    /// Mirrors along x if asked, then turns `quarter_turns` times from +x towards +z.
    pub fn oriented(self, mirrored: bool, quarter_turns: u8) -> Self {
        let (mut min, mut max) = (self.min, self.max);
        if mirrored {
            (min.x, max.x) = (-max.x, -min.x);
        }
        for _ in 0..quarter_turns % 4 {
            (min.x, max.x, min.z, max.z) = (-max.z, -min.z, min.x, max.x);
        }
        Self { min, max }
    }
}

fn voxel_center(position: Point3<i32>) -> Vector3<f32> {
    Vector3::new(position.x as f32, position.y as f32, position.z as f32)
}

/// Writes the visible faces of one box.
fn emit_box(
    out: &mut Vec<Vertex>,
    center: Vector3<f32>,
    bounds: Bounds,
    tiles: [u32; 6],
    faces: [bool; 6],
    shading: &CornerShading,
) {
    for (face, side) in BlockSide::all().into_iter().enumerate() {
        if !faces[face] {
            continue;
        }
        let ao = shading.ao[face];
        let light = shading.light[face];
        let order = if ao[0] + ao[3] > ao[1] + ao[2] {
            FLIPPED[face % 2]
        } else {
            TRIANGLES[face % 2]
        };
        let normal = side.normal();
        for corner in order {
            let signs = FACE_CORNERS[face][corner];
            let pick = |sign: i8, lo: f32, hi: f32| if sign < 0 { lo } else { hi };
            let position = center
                + Vector3::new(
                    pick(signs[0], bounds.min.x, bounds.max.x),
                    pick(signs[1], bounds.min.y, bounds.max.y),
                    pick(signs[2], bounds.min.z, bounds.max.z),
                );
            let [u, v] = FACE_UVS[face][corner];
            out.push(Vertex {
                position: position.into(),
                normal: normal.into(),
                uv: atlas_uv(tiles[face], u, v),
                ao: ao[corner],
                light: light[corner],
            });
        }
    }
}

/// Writes a full cube.
pub fn emit_cube(
    out: &mut Vec<Vertex>,
    position: Point3<i32>,
    w: i32,
    faces: [bool; 6],
    shading: &CornerShading,
) {
    let tiles = get_texture_indices_from_int(w);
    emit_box(out, voxel_center(position), Bounds::unit(), tiles, faces, shading);
}

/// Writes a slab resting on the bottom of its voxel.
pub fn emit_slab(
    out: &mut Vec<Vertex>,
    position: Point3<i32>,
    w: i32,
    faces: [bool; 6],
    shading: &CornerShading,
    shape: Shape,
) {
    let top = -0.5 + shape.height();
    let bounds = Bounds::new([-0.5, -0.5, -0.5], [0.5, top, 0.5]);
    let tiles = get_texture_indices_from_int(w);
    emit_box(out, voxel_center(position), bounds, tiles, faces, shading);
}

/// Writes a door half: a thin panel against one side, swung a quarter turn when open.
pub fn emit_door(
    out: &mut Vec<Vertex>,
    position: Point3<i32>,
    w: i32,
    faces: [bool; 6],
    shading: &CornerShading,
    extra: i32,
    transform: i32,
) {
    let transform = Transform::from_id(transform);
    let open = u8::from(extra & EXTRA_OPEN != 0);
    let panel = Bounds::new([-0.5, -0.5, -0.5], [-0.3125, 0.5, 0.5])
        .oriented(transform.mirrored, transform.quarter_turns + open);
    let tiles = get_texture_indices_from_int(w);
    emit_box(out, voxel_center(position), panel, tiles, faces, shading);
}

/// The boxes making up a fence piece or gate, before the transform.
fn fence_boxes(shape: Shape, open: bool) -> Vec<Bounds> {
    const RAILS: [(f32, f32); 2] = [(-0.125, 0.0625), (0.1875, 0.375)];
    let mut boxes = Vec::new();
    match shape {
        Shape::Fence(kind) => {
            boxes.push(Bounds::new([-0.125, -0.5, -0.125], [0.125, 0.5, 0.125]));
            for &arm in kind.arms() {
                for (lo, hi) in RAILS {
                    boxes.push(
                        Bounds::new([0.125, lo, -0.0625], [0.5, hi, 0.0625]).oriented(false, arm),
                    );
                }
            }
        }
        Shape::Gate => {
            let turn = u8::from(open);
            boxes.push(Bounds::new([-0.5, -0.5, -0.0625], [-0.375, 0.3125, 0.0625]).oriented(false, turn));
            boxes.push(Bounds::new([0.375, -0.5, -0.0625], [0.5, 0.3125, 0.0625]).oriented(false, turn));
            for (lo, hi) in RAILS {
                boxes.push(Bounds::new([-0.375, lo, -0.0625], [0.375, hi, 0.0625]).oriented(false, turn));
            }
        }
        _ => {}
    }
    boxes
}

/// Writes a fence piece or gate. Every face of every box is drawn.
pub fn emit_fence(
    out: &mut Vec<Vertex>,
    position: Point3<i32>,
    w: i32,
    shading: &CornerShading,
    shape: Shape,
    extra: i32,
    transform: i32,
) {
    let transform = Transform::from_id(transform);
    let tiles = get_texture_indices_from_int(w);
    let center = voxel_center(position);
    for bounds in fence_boxes(shape, extra & EXTRA_OPEN != 0) {
        let bounds = bounds.oriented(transform.mirrored, transform.quarter_turns);
        emit_box(out, center, bounds, tiles, [true; 6], shading);
    }
}

/// Redraws a door or gate from its index entry.
pub fn emit_openable(out: &mut Vec<Vertex>, position: Point3<i32>, entry: &DoorEntry) {
    if entry.shape.is_door() {
        emit_door(
            out,
            position,
            entry.w,
            entry.faces,
            &entry.shading,
            entry.extra,
            entry.transform,
        );
    } else {
        emit_fence(
            out,
            position,
            entry.w,
            &entry.shading,
            entry.shape,
            entry.extra,
            entry.transform,
        );
    }
}

/// Writes a plant as two crossed double-sided quads turned by `rotation`.
pub fn emit_plant(
    out: &mut Vec<Vertex>,
    position: Point3<i32>,
    w: i32,
    ao: f32,
    light: f32,
    rotation: Deg<f32>,
) {
    let turn = Matrix3::from_angle_y(rotation);
    let center = voxel_center(position);
    let tile = get_texture_indices_from_int(w)[0];
    for quad in 0..4 {
        let normal = turn * Vector3::from(PLANT_NORMALS[quad]);
        for corner in TRIANGLES[quad % 2] {
            let [x, y, z] = PLANT_CORNERS[quad][corner].map(|s| f32::from(s) * 0.5);
            let offset = turn * Vector3::new(x, y, z);
            let [u, v] = PLANT_UVS[quad][corner];
            out.push(Vertex {
                position: (center + offset).into(),
                normal: normal.into(),
                uv: atlas_uv(tile, u, v),
                ao,
                light,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::vertex::VERTICES_PER_FACE;
    use crate::engine_state::voxels::block::shape::FenceKind;
    use cgmath::InnerSpace;

    const ORIGIN: Point3<i32> = Point3::new(0, 0, 0);

    fn bounds_of(vertices: &[Vertex]) -> ([f32; 3], [f32; 3]) {
        let mut lo = [f32::MAX; 3];
        let mut hi = [f32::MIN; 3];
        for v in vertices {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v.position[axis]);
                hi[axis] = hi[axis].max(v.position[axis]);
            }
        }
        (lo, hi)
    }

    #[test]
    fn cube_writes_six_vertices_per_visible_face() {
        let mut out = Vec::new();
        let faces = [true, false, true, false, false, true];
        emit_cube(&mut out, ORIGIN, 3, faces, &CornerShading::default());
        assert_eq!(out.len(), 3 * VERTICES_PER_FACE);
        assert_eq!(out[0].normal, [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn cube_is_centered_on_the_voxel() {
        let mut out = Vec::new();
        emit_cube(&mut out, Point3::new(4, 10, -2), 3, [true; 6], &CornerShading::default());
        assert_eq!(bounds_of(&out), ([3.5, 9.5, -2.5], [4.5, 10.5, -1.5]));
    }

    #[test]
    fn occluded_diagonal_flips_the_quad_split() {
        let mut shading = CornerShading::default();
        shading.ao[0] = [0.75, 0.0, 0.0, 0.5];
        let mut out = Vec::new();
        emit_cube(&mut out, ORIGIN, 3, [true, false, false, false, false, false], &shading);
        let aos: Vec<f32> = out.iter().map(|v| v.ao).collect();
        assert_eq!(aos, vec![0.75, 0.0, 0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn slab_top_follows_height() {
        let mut out = Vec::new();
        emit_slab(&mut out, ORIGIN, 3, [true; 6], &CornerShading::default(), Shape::Slab(8));
        let (lo, hi) = bounds_of(&out);
        assert_eq!(lo[1], -0.5);
        assert_eq!(hi[1], 0.0);
    }

    #[test]
    fn opening_a_door_moves_the_panel_but_keeps_the_vertex_count() {
        let faces = [true, true, false, false, true, true];
        let mut closed = Vec::new();
        emit_door(&mut closed, ORIGIN, 8, faces, &CornerShading::default(), 0, 0);
        let mut open = Vec::new();
        emit_door(&mut open, ORIGIN, 8, faces, &CornerShading::default(), EXTRA_OPEN, 0);
        assert_eq!(closed.len(), open.len());
        assert_ne!(bounds_of(&closed), bounds_of(&open));
        assert_eq!(bounds_of(&closed).1[0], -0.3125);
        assert_eq!(bounds_of(&open).1[2], -0.3125);
    }

    #[test]
    fn fence_vertex_counts_match_face_counts() {
        for shape in [
            Shape::Fence(FenceKind::Post),
            Shape::Fence(FenceKind::Corner),
            Shape::Fence(FenceKind::Tee),
            Shape::Fence(FenceKind::Cross),
            Shape::Fence(FenceKind::Half),
            Shape::Gate,
        ] {
            let mut out = Vec::new();
            emit_fence(&mut out, ORIGIN, 5, &CornerShading::default(), shape, 0, 3);
            let faces = shape.fence_face_count().unwrap_or_default();
            assert_eq!(out.len(), faces * VERTICES_PER_FACE, "{shape:?}");
        }
    }

    #[test]
    fn half_fence_arm_follows_transform() {
        let mut out = Vec::new();
        emit_fence(&mut out, ORIGIN, 5, &CornerShading::default(), Shape::Fence(FenceKind::Half), 0, 2);
        let (lo, hi) = bounds_of(&out);
        assert_eq!(lo[0], -0.5);
        assert_eq!(hi[0], 0.125);
    }

    #[test]
    fn oriented_bounds_turn_x_into_z() {
        let arm = Bounds::new([0.125, 0.0, -0.0625], [0.5, 1.0, 0.0625]).oriented(false, 1);
        assert_eq!(arm.min, Vector3::new(-0.0625, 0.0, 0.125));
        assert_eq!(arm.max, Vector3::new(0.0625, 1.0, 0.5));
        let mirrored = Bounds::new([0.125, 0.0, 0.0], [0.5, 1.0, 1.0]).oriented(true, 0);
        assert_eq!(mirrored.min.x, -0.5);
    }

    #[test]
    fn plants_are_four_quads_around_the_center() {
        let mut out = Vec::new();
        emit_plant(&mut out, Point3::new(2, 2, 2), 18, 0.5, 0.25, Deg(33.0));
        assert_eq!(out.len(), 4 * VERTICES_PER_FACE);
        for v in &out {
            let offset = Vector3::from(v.position) - Vector3::new(2.0, 2.0, 2.0);
            let horizontal = Vector3::new(offset.x, 0.0, offset.z).magnitude();
            assert!((horizontal - 0.5).abs() < 1e-5);
            assert_eq!(v.ao, 0.5);
            assert_eq!(v.light, 0.25);
        }
    }
}
