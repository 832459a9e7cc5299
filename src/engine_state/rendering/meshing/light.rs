//! # Light Propagation
//!
//! Breadth-first flood fill of emitted light over a [`PaddedGrid`].
//!
//! A source of intensity `w` lights its own cell with `w`, even when that cell
//! is opaque, and every transparent cell reachable in `k` axis steps with
//! `w - k`. A cell only takes a value larger than the one it holds, so the
//! result is the per-cell maximum over all sources and paths, whatever order
//! the sources are processed in.

use std::collections::VecDeque;

use super::grid::PaddedGrid;

/// Brightest light a voxel can emit.
pub const MAX_LIGHT: i32 = 15;

/// One emitting cell, in grid coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightSource {
    /// Grid x.
    pub x: i32,
    /// Grid y.
    pub y: i32,
    /// Grid z.
    pub z: i32,
    /// Intensity, clamped to `1..=MAX_LIGHT`.
    pub intensity: i32,
}

/// Horizontal region whose light values matter, in grid coordinates.
///
/// Propagation that can no longer reach it with a positive value is cut off.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightWindow {
    /// Lowest x and z of interest.
    pub lo: i32,
    /// Highest x and z of interest.
    pub hi: i32,
}

const STEPS: [(i32, i32, i32); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

impl PaddedGrid {
    /// Floods light from every source into the grid.
    pub fn flood_light(
        &mut self,
        sources: impl IntoIterator<Item = LightSource>,
        window: Option<LightWindow>,
    ) {
        let mut queue = VecDeque::new();
        for source in sources {
            let intensity = source.intensity.min(MAX_LIGHT);
            if intensity > 0 {
                queue.push_back((source.x, source.y, source.z, intensity, true));
            }
        }

        while let Some((x, y, z, w, force)) = queue.pop_front() {
            if let Some(window) = window {
                if x + w < window.lo || z + w < window.lo || x - w > window.hi || z - w > window.hi {
                    continue;
                }
            }
            let Some(index) = self.index(x, y, z) else {
                continue;
            };
            if i32::from(self.light_at(index)) >= w {
                continue;
            }
            if !force && self.opaque_at(index) {
                continue;
            }
            self.set_light_at(index, w as u8);
            if w > 1 {
                for (dx, dy, dz) in STEPS {
                    queue.push_back((x + dx, y + dy, z + dz, w - 1, false));
                }
            }
        }
    }
}
