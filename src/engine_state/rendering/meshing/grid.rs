//! # Padded Voxel Grid
//!
//! Dense scratch storage for one meshing pass: opacity bits, a light byte per
//! cell, and the highest opaque cell of every column. Grid coordinates are
//! non-negative; the caller maps world coordinates onto them.

use bitvec::prelude::BitVec;

/// Dense opacity, light and skyline storage.
#[derive(Clone, Debug)]
pub struct PaddedGrid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    opaque: BitVec,
    light: Vec<u8>,
    highest: Vec<i32>,
}

impl PaddedGrid {
    /// An all-transparent, unlit grid.
    pub fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        let cells = size_x * size_y * size_z;
        Self {
            size_x,
            size_y,
            size_z,
            opaque: BitVec::repeat(false, cells),
            light: vec![0; cells],
            highest: vec![-1; size_x * size_z],
        }
    }

    /// Extent along x, y and z.
    pub fn size(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Flat index of a cell, or `None` outside the grid.
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.size_x || y >= self.size_y || z >= self.size_z {
            return None;
        }
        Some((y * self.size_x + x) * self.size_z + z)
    }

    /// Whether the cell blocks light and hides faces. Outside the grid is open.
    pub fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        self.index(x, y, z).is_some_and(|i| self.opaque[i])
    }

    /// Sets a cell's opacity. Opaque cells raise the column skyline.
    pub fn set_opaque(&mut self, x: i32, y: i32, z: i32, opaque: bool) {
        if let Some(i) = self.index(x, y, z) {
            self.opaque.set(i, opaque);
            if opaque {
                let column = x as usize * self.size_z + z as usize;
                self.highest[column] = self.highest[column].max(y);
            }
        }
    }

    /// Light level of a cell. Outside the grid is dark.
    pub fn light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.index(x, y, z).map_or(0, |i| self.light[i])
    }

    pub(crate) fn light_at(&self, index: usize) -> u8 {
        self.light[index]
    }

    pub(crate) fn set_light_at(&mut self, index: usize, value: u8) {
        self.light[index] = value;
    }

    pub(crate) fn opaque_at(&self, index: usize) -> bool {
        self.opaque[index]
    }

    /// Highest y ever marked opaque in column (x, z), or -1.
    pub fn highest(&self, x: i32, z: i32) -> i32 {
        if x < 0 || z < 0 || x as usize >= self.size_x || z as usize >= self.size_z {
            return -1;
        }
        self.highest[x as usize * self.size_z + z as usize]
    }

    /// Sky shading of a cell.
    ///
    /// Cells at or below their column's skyline look up to 8 cells upward for
    /// the first opaque cell; finding one `k` cells up gives `1 - k / 8`. Cells
    /// above the skyline, or with nothing opaque close enough, get 0.
    pub fn shade(&self, x: i32, y: i32, z: i32) -> f32 {
        if y > self.highest(x, z) {
            return 0.0;
        }
        (0..8)
            .find(|&k| self.is_opaque(x, y + k, z))
            .map_or(0.0, |k| 1.0 - k as f32 * 0.125)
    }
}
