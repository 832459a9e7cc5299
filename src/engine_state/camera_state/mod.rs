//! # Camera State Management
//!
//! This module supplies what the scheduler needs to know about a viewer:
//! - which chunk it stands in
//! - which chunks its view frustum can see
//!
//! ## Core Components
//! - `Viewpoint`: a camera plus its projection
//! - `Frustum`: six normalized clip planes extracted from the view-projection matrix
//!
//! Planes are stored as `(a, b, c, d)` with the normal pointing inward, so a
//! point is inside when `a*x + b*y + c*z + d >= 0`.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Rad, Vector4};

use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_SIZE, WORLD_HEIGHT};

pub mod camera;

use camera::{Camera, Projection};

/// A viewer the world is streamed around.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewpoint {
    /// Position and orientation.
    pub camera: Camera,
    /// Lens settings.
    pub projection: Projection,
}

impl Viewpoint {
    /// Creates a viewpoint.
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `yaw` - Horizontal angle; zero looks along +x
    /// * `pitch` - Vertical angle; positive looks up
    /// * `fovy` - Vertical field of view
    /// * `aspect` - Viewport width divided by height
    /// * `near` - Near clipping distance
    /// * `far` - Far clipping distance
    #[allow(clippy::too_many_arguments)]
    pub fn new<Y: Into<Rad<f32>>, P: Into<Rad<f32>>, F: Into<Rad<f32>>>(
        position: Point3<f32>,
        yaw: Y,
        pitch: P,
        fovy: F,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            camera: Camera::new(position, yaw, pitch),
            projection: Projection::new(aspect, fovy, near, far),
        }
    }

    /// The chunk the viewpoint stands in.
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord::from_position(self.camera.position.x, self.camera.position.z)
    }

    /// Combined view and projection matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// The viewpoint's current frustum.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.view_projection())
    }
}

/// Six inward-facing clip planes: left, right, bottom, top, near, far.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Normalized plane equations.
    pub planes: [Vector4<f32>; 6],
}

impl Frustum {
    /// Extracts the planes of a view-projection matrix with `0..=1` clip depth.
    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        let row = |i: usize| matrix.row(i);
        let planes = [
            row(3) + row(0),
            row(3) - row(0),
            row(3) + row(1),
            row(3) - row(1),
            row(2),
            row(3) - row(2),
        ]
        .map(|plane| {
            let length = plane.truncate().magnitude();
            if length > 0.0 {
                plane / length
            } else {
                plane
            }
        });
        Self { planes }
    }

    /// Whether any part of a chunk's box can be on screen.
    ///
    /// See [`chunk_visible`].
    pub fn chunk_visible(&self, coord: ChunkCoord, miny: i32, maxy: i32) -> bool {
        chunk_visible(&self.planes, coord.p, coord.q, miny, maxy)
    }
}

/// Tests the padded box of chunk (p, q) between `miny` and `maxy` against
/// six clip planes.
///
/// The chunk is rejected only when all eight corners are outside one plane.
/// A chunk without geometry (`miny > maxy`) is tested at full height.
pub fn chunk_visible(planes: &[Vector4<f32>; 6], p: i32, q: i32, miny: i32, maxy: i32) -> bool {
    let (miny, maxy) = if miny > maxy {
        (0, WORLD_HEIGHT)
    } else {
        (miny, maxy)
    };
    let x = (p * CHUNK_SIZE - 1) as f32;
    let z = (q * CHUNK_SIZE - 1) as f32;
    let d = (CHUNK_SIZE + 1) as f32;
    let corners = [
        [x, miny as f32, z],
        [x + d, miny as f32, z],
        [x, miny as f32, z + d],
        [x + d, miny as f32, z + d],
        [x, maxy as f32, z],
        [x + d, maxy as f32, z],
        [x, maxy as f32, z + d],
        [x + d, maxy as f32, z + d],
    ];
    planes.iter().all(|plane| {
        corners
            .iter()
            .any(|c| plane.x * c[0] + plane.y * c[1] + plane.z * c[2] + plane.w >= 0.0)
    })
}
