//! A chunk together with its eight neighbors.

use super::ChunkCoord;

/// A fixed 3x3 block of per-chunk values centered on one chunk.
///
/// Cells are addressed by offsets `dp, dq` in `-1..=1`; missing neighbors are
/// `None`. Whether the values are borrowed views or owned snapshots is chosen
/// by `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighborhood<T> {
    center: ChunkCoord,
    cells: [[Option<T>; 3]; 3],
}

impl<T> Neighborhood<T> {
    /// Builds the neighborhood of `center` by asking `cell` for every coordinate.
    pub fn build(center: ChunkCoord, mut cell: impl FnMut(ChunkCoord) -> Option<T>) -> Self {
        let cells = std::array::from_fn(|a| {
            std::array::from_fn(|b| cell(center.offset(a as i32 - 1, b as i32 - 1)))
        });
        Self { center, cells }
    }

    /// Coordinate of the center cell.
    pub fn center_coord(&self) -> ChunkCoord {
        self.center
    }

    /// The cell at offset (dp, dq); `None` when out of range or absent.
    pub fn get(&self, dp: i32, dq: i32) -> Option<&T> {
        let (a, b) = Self::index(dp, dq)?;
        self.cells[a][b].as_ref()
    }

    /// Mutable cell at offset (dp, dq).
    pub fn get_mut(&mut self, dp: i32, dq: i32) -> Option<&mut T> {
        let (a, b) = Self::index(dp, dq)?;
        self.cells[a][b].as_mut()
    }

    /// The center cell.
    pub fn center(&self) -> Option<&T> {
        self.get(0, 0)
    }

    /// Mutable center cell.
    pub fn center_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0, 0)
    }

    /// Moves the center cell out, leaving `None` behind.
    pub fn take_center(&mut self) -> Option<T> {
        self.cells[1][1].take()
    }

    /// Puts `value` in the center cell, returning what was there.
    pub fn replace_center(&mut self, value: T) -> Option<T> {
        self.cells[1][1].replace(value)
    }

    /// Present cells with their offsets.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> {
        self.cells.iter().enumerate().flat_map(|(a, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(b, cell)| cell.as_ref().map(|v| (a as i32 - 1, b as i32 - 1, v)))
        })
    }

    fn index(dp: i32, dq: i32) -> Option<(usize, usize)> {
        if (-1..=1).contains(&dp) && (-1..=1).contains(&dq) {
            Some(((dp + 1) as usize, (dq + 1) as usize))
        } else {
            None
        }
    }
}
