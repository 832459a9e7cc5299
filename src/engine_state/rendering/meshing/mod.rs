//! # Mesh Compute Engine
//!
//! Turns the 3x3 chunk neighborhood around a chunk into that chunk's block
//! geometry. The computation is a pure function of its input, so it runs the
//! same on a worker thread over owned snapshots and on the main thread over
//! borrowed chunks.
//!
//! ## Passes
//!
//! 1. **Opacity**: every block map of the neighborhood is merged into a padded
//!    grid covering the center chunk plus one voxel on every side. Shaped
//!    voxels never occlude.
//! 2. **Light**: when lights are shown and any of the nine chunks has an
//!    emitter, light is flooded through the grid.
//! 3. **Faces**: each positive block of the center chunk shows the faces whose
//!    neighbor is open, adjusted per shape.
//! 4. **Shading**: per-corner occlusion and light from the 3x3x3 samples.
//! 5. **Geometry**: vertices are written by the shape's emitter. Doors and
//!    gates are recorded in the door index for in-place toggling.
//!
//! Blocks are visited in a fixed order, so the output is identical for
//! identical input.

use std::collections::HashSet;

use cgmath::{Deg, Point3};
use log::trace;

use crate::engine_state::rendering::vertex::{Vertex, VERTICES_PER_FACE};
use crate::engine_state::voxels::{
    block::{is_plant, is_transparent, shape::Shape},
    chunk::{
        doors::{DoorEntry, DoorMap},
        neighborhood::Neighborhood,
        ChunkCoord, VoxelSource, CHUNK_SIZE, WORLD_HEIGHT,
    },
    generation::FractalNoise,
};

pub mod geometry;
pub mod grid;
pub mod light;
pub mod occlusion;
pub mod sign;

use grid::PaddedGrid;
use light::{LightSource, LightWindow};
use occlusion::{occlusion, sample_index};

/// Grid extent along x and z: three chunks plus a voxel on either side.
const XZ_SIZE: usize = (CHUNK_SIZE * 3 + 2) as usize;
/// Grid extent along y: the world plus a voxel above and below.
const Y_SIZE: usize = (WORLD_HEIGHT + 2) as usize;
/// Grid x and z range whose light can reach the center chunk's voxels.
const LIGHT_WINDOW: LightWindow = LightWindow {
    lo: CHUNK_SIZE,
    hi: CHUNK_SIZE * 2 + 1,
};

/// Options that change the computed geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshSettings {
    /// Flood light from emitters. When off, every voxel is unlit.
    pub show_lights: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self { show_lights: true }
    }
}

/// Block geometry of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    /// Vertices, six per face.
    pub vertices: Vec<Vertex>,
    /// Number of faces.
    pub faces: usize,
    /// Lowest y with geometry, or `WORLD_HEIGHT` when there is none.
    pub miny: i32,
    /// Highest y with geometry, or 0 when there is none.
    pub maxy: i32,
    /// Door and gate entries pointing into `vertices`.
    pub doors: DoorMap,
}

impl ChunkMesh {
    fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            faces: 0,
            miny: WORLD_HEIGHT,
            maxy: 0,
            doors: DoorMap::default(),
        }
    }

    /// Raw vertex bytes, ready for upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Noise sampled for plant rotation.
fn plant_noise() -> FractalNoise {
    FractalNoise::new(0, 4, 0.5, 2.0)
}

/// Computes the block geometry of the neighborhood's center chunk.
///
/// Missing neighbors count as empty. A neighborhood without a center yields
/// an empty mesh.
pub fn compute_chunk<T: VoxelSource>(
    neighborhood: &Neighborhood<T>,
    settings: &MeshSettings,
) -> ChunkMesh {
    let coord = neighborhood.center_coord();
    let Some(center) = neighborhood.center() else {
        return ChunkMesh::empty();
    };
    let origin = grid_origin(coord);
    let to_grid = |p: Point3<i32>| (p.x - origin.x, p.y - origin.y, p.z - origin.z);

    let mut grid = PaddedGrid::new(XZ_SIZE, Y_SIZE, XZ_SIZE);
    for (_, _, chunk) in neighborhood.iter() {
        for (position, w) in chunk.layers().block.iter() {
            let (x, y, z) = to_grid(position);
            grid.set_opaque(x, y, z, !is_transparent(w));
        }
    }
    for (_, _, chunk) in neighborhood.iter() {
        for (position, _) in chunk.layers().shape.iter() {
            let (x, y, z) = to_grid(position);
            grid.set_opaque(x, y, z, false);
        }
    }

    let has_light =
        settings.show_lights && neighborhood.iter().any(|(_, _, c)| !c.layers().light.is_empty());
    if has_light {
        let sources: Vec<LightSource> = neighborhood
            .iter()
            .flat_map(|(_, _, chunk)| chunk.layers().light.iter())
            .map(|(position, intensity)| {
                let (x, y, z) = to_grid(position);
                LightSource { x, y, z, intensity }
            })
            .collect();
        grid.flood_light(sources, Some(LIGHT_WINDOW));
    }

    let layers = center.layers();
    let noise = plant_noise();
    let mut mesh = ChunkMesh::empty();
    mesh.doors = center.doors().clone();
    let mut openables = HashSet::new();

    for (position, w) in layers.block.sorted_entries() {
        if w <= 0 {
            continue;
        }
        let (x, y, z) = to_grid(position);
        let mut faces = [
            !grid.is_opaque(x - 1, y, z),
            !grid.is_opaque(x + 1, y, z),
            !grid.is_opaque(x, y + 1, z),
            !grid.is_opaque(x, y - 1, z) && position.y > 0,
            !grid.is_opaque(x, y, z - 1),
            !grid.is_opaque(x, y, z + 1),
        ];
        if !faces.contains(&true) {
            continue;
        }
        let plant = is_plant(w);
        let shape = Shape::from_id(layers.shape.get(position.x, position.y, position.z));
        if !plant {
            match shape {
                Shape::Slab(_) => faces[2] = true,
                Shape::UpperDoor | Shape::LowerDoor => {
                    faces[0] = true;
                    faces[1] = true;
                    faces[4] = true;
                    faces[5] = true;
                }
                Shape::Fence(_) | Shape::Gate => faces = [true; 6],
                Shape::Cube => {}
            }
        }

        let mut opaque = [false; 27];
        let mut lights = [0u8; 27];
        let mut shades = [0f32; 27];
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let i = sample_index(dx, dy, dz);
                    opaque[i] = grid.is_opaque(x + dx, y + dy, z + dz);
                    lights[i] = grid.light(x + dx, y + dy, z + dz);
                    shades[i] = grid.shade(x + dx, y + dy, z + dz);
                }
            }
        }
        let shading = occlusion(&opaque, &lights, &shades);

        let start = mesh.vertices.len();
        if plant {
            let rotation = noise.sample2(f64::from(position.x), f64::from(position.z)) * 360.0;
            geometry::emit_plant(
                &mut mesh.vertices,
                position,
                w,
                shading.min_ao(),
                shading.max_light(),
                Deg(rotation as f32),
            );
        } else {
            match shape {
                Shape::Cube => geometry::emit_cube(&mut mesh.vertices, position, w, faces, &shading),
                Shape::Slab(_) => {
                    geometry::emit_slab(&mut mesh.vertices, position, w, faces, &shading, shape)
                }
                _ if shape.is_openable() => {
                    let entry = DoorEntry {
                        w,
                        shape,
                        extra: layers.extra.get(position.x, position.y, position.z),
                        transform: layers.transform.get(position.x, position.y, position.z),
                        faces,
                        shading,
                        offset: start,
                        vertex_count: 0,
                    };
                    geometry::emit_openable(&mut mesh.vertices, position, &entry);
                    let vertex_count = mesh.vertices.len() - start;
                    mesh.doors.set(
                        position,
                        DoorEntry {
                            vertex_count,
                            ..entry
                        },
                    );
                    openables.insert(position);
                }
                _ => geometry::emit_fence(
                    &mut mesh.vertices,
                    position,
                    w,
                    &shading,
                    shape,
                    layers.extra.get(position.x, position.y, position.z),
                    layers.transform.get(position.x, position.y, position.z),
                ),
            }
        }

        mesh.miny = mesh.miny.min(position.y);
        mesh.maxy = mesh.maxy.max(position.y);
    }

    mesh.doors.retain(|position, _| openables.contains(&position));
    mesh.faces = mesh.vertices.len() / VERTICES_PER_FACE;
    trace!(
        "Meshed chunk ({}, {}): {} faces, {} doors",
        coord.p,
        coord.q,
        mesh.faces,
        mesh.doors.len()
    );
    mesh
}

/// World position of grid cell (0, 0, 0) for the neighborhood around `coord`.
fn grid_origin(coord: ChunkCoord) -> Point3<i32> {
    Point3::new(
        coord.p * CHUNK_SIZE - CHUNK_SIZE - 1,
        -1,
        coord.q * CHUNK_SIZE - CHUNK_SIZE - 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::shape::{EXTRA_OPEN, LOWER_DOOR_ID};
    use crate::engine_state::voxels::chunk::{Chunk, ChunkSnapshot};

    fn lone_chunk(fill: impl FnOnce(&mut Chunk)) -> Neighborhood<ChunkSnapshot> {
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new(coord);
        fill(&mut chunk);
        let mut snapshot = Some(chunk.snapshot());
        Neighborhood::build(coord, |c| if c == coord { snapshot.take() } else { None })
    }

    #[test]
    fn empty_chunk_has_no_faces() {
        let mesh = compute_chunk(&lone_chunk(|_| {}), &MeshSettings::default());
        assert_eq!(mesh.faces, 0);
        assert!(mesh.vertices.is_empty());
        assert!(mesh.miny > mesh.maxy);
    }

    #[test]
    fn single_block_shows_every_face() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 3);
            }),
            &MeshSettings::default(),
        );
        assert_eq!(mesh.faces, 6);
        assert_eq!((mesh.miny, mesh.maxy), (10, 10));
    }

    #[test]
    fn bottom_face_is_hidden_at_ground_level() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 0, 5, 3);
            }),
            &MeshSettings::default(),
        );
        assert_eq!(mesh.faces, 5);
    }

    #[test]
    fn touching_blocks_hide_shared_faces() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 3);
                c.layers.block.set(6, 10, 5, 3);
            }),
            &MeshSettings::default(),
        );
        assert_eq!(mesh.faces, 10);
    }

    #[test]
    fn glass_does_not_hide_neighbors() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 3);
                c.layers.block.set(6, 10, 5, 10);
            }),
            &MeshSettings::default(),
        );
        // Stone keeps its face toward the glass; the glass face toward the
        // stone is culled.
        assert_eq!(mesh.faces, 11);
    }

    #[test]
    fn padding_copies_occlude_but_are_not_drawn() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(0, 10, 5, 3);
                c.layers.block.set(-1, 10, 5, -3);
            }),
            &MeshSettings::default(),
        );
        assert_eq!(mesh.faces, 5);
    }

    #[test]
    fn plants_are_four_faces() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 18);
            }),
            &MeshSettings::default(),
        );
        assert_eq!(mesh.faces, 4);
    }

    #[test]
    fn buried_slab_still_shows_its_top() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 3);
                c.layers.shape.set(5, 10, 5, 8);
                c.layers.block.set(5, 11, 5, 3);
            }),
            &MeshSettings::default(),
        );
        // The slab keeps 5 side and bottom faces plus its top; the block above
        // sees through the slab and shows all 6.
        assert_eq!(mesh.faces, 12);
    }

    #[test]
    fn doors_are_indexed_with_their_vertex_range() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(5, 10, 5, 3);
                c.layers.block.set(6, 10, 5, 8);
                c.layers.shape.set(6, 10, 5, LOWER_DOOR_ID);
                c.layers.extra.set(6, 10, 5, EXTRA_OPEN);
            }),
            &MeshSettings::default(),
        );
        let entry = mesh.doors.get(Point3::new(6, 10, 5)).cloned();
        let entry = entry.expect("door entry");
        assert!(entry.is_open());
        assert_eq!(entry.vertex_count, 6 * VERTICES_PER_FACE);
        // the stone block comes first and shows all six faces past the open door
        assert_eq!(entry.offset, 6 * VERTICES_PER_FACE);
        assert_eq!(mesh.doors.len(), 1);
    }

    #[test]
    fn stale_door_entries_are_dropped() {
        let mesh = compute_chunk(
            &lone_chunk(|c| {
                c.layers.block.set(2, 3, 2, 8);
                c.doors.set(
                    Point3::new(9, 9, 9),
                    DoorEntry {
                        w: 8,
                        shape: Shape::UpperDoor,
                        extra: 0,
                        transform: 0,
                        faces: [true; 6],
                        shading: Default::default(),
                        offset: 0,
                        vertex_count: 36,
                    },
                );
            }),
            &MeshSettings::default(),
        );
        assert!(mesh.doors.is_empty());
    }

    #[test]
    fn lights_brighten_nearby_faces() {
        let block = |c: &mut Chunk| {
            c.layers.block.set(5, 10, 5, 3);
        };
        let dark = compute_chunk(&lone_chunk(block), &MeshSettings::default());
        let lit = compute_chunk(
            &lone_chunk(|c| {
                block(c);
                c.layers.light.set(5, 10, 7, 15);
            }),
            &MeshSettings::default(),
        );
        let brightest = |mesh: &ChunkMesh| mesh.vertices.iter().map(|v| v.light).fold(0.0, f32::max);
        assert_eq!(brightest(&dark), 0.0);
        assert!(brightest(&lit) > 0.5);

        let hidden = compute_chunk(
            &lone_chunk(|c| {
                block(c);
                c.layers.light.set(5, 10, 7, 15);
            }),
            &MeshSettings { show_lights: false },
        );
        assert_eq!(brightest(&hidden), 0.0);
    }

    #[test]
    fn meshing_is_repeatable() {
        let neighborhood = lone_chunk(|c| {
            for x in 0..16 {
                for z in 0..16 {
                    c.layers.block.set(x, (x * z) % 7, z, 1 + (x + z) % 15);
                }
            }
            c.layers.light.set(8, 9, 8, 12);
        });
        let first = compute_chunk(&neighborhood, &MeshSettings::default());
        let second = compute_chunk(&neighborhood, &MeshSettings::default());
        assert_eq!(first, second);
    }
}
