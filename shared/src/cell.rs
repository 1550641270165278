//! Spatial hash cell helpers.
//!
//! This module centralizes the mapping from world XZ coordinates to hash cells so the
//! collision grid and any debug tooling agree on it.
//!
//! # Model
//! - A [`CellCoord`] is a pair of signed integers; the grid is unbounded in both axes.
//! - Cells are square with side [`HASH_CELL_SIZE`] world units.
//! - `cx = floor(x / HASH_CELL_SIZE)`, `cz = floor(z / HASH_CELL_SIZE)`.
//!
//! # Neighbourhood
//! [`neighbourhood`] returns the 3x3 block around a center cell. A body smaller than a
//! cell that overlaps the car's cell is always registered in one of those nine cells.

use crate::collision::settings::HASH_CELL_SIZE;

/// Integer coordinates of a spatial hash cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World-space position of the cell's minimum corner.
    #[inline]
    pub fn min_corner(&self) -> (f32, f32) {
        (
            self.x as f32 * HASH_CELL_SIZE,
            self.z as f32 * HASH_CELL_SIZE,
        )
    }
}

/// Cell containing the world position `(x, z)`.
#[inline]
pub fn cell_of(x: f32, z: f32) -> CellCoord {
    CellCoord::new(axis_cell(x), axis_cell(z))
}

#[inline]
fn axis_cell(v: f32) -> i32 {
    // `as` saturates, so absurd coordinates land on the grid edge instead of wrapping.
    (v / HASH_CELL_SIZE).floor() as i32
}

/// Inclusive cell range `(min, max)` covered by an XZ rectangle.
#[inline]
pub fn cell_span(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> (CellCoord, CellCoord) {
    (cell_of(min_x, min_z), cell_of(max_x, max_z))
}

/// Returns the 9 cells forming a 3x3 block around `center`.
///
/// Layout (top-down view, +Z = North):
///
/// [0] North-West | [1] North     | [2] North-East
/// ------------------------------------------------
/// [3] West       | [4] Center    | [5] East
/// ------------------------------------------------
/// [6] South-West | [7] South     | [8] South-East
#[inline]
pub fn neighbourhood(center: CellCoord) -> [CellCoord; 9] {
    let CellCoord { x, z } = center;
    let west = x.saturating_sub(1);
    let east = x.saturating_add(1);
    let north = z.saturating_add(1);
    let south = z.saturating_sub(1);

    [
        CellCoord::new(west, north),
        CellCoord::new(x, north),
        CellCoord::new(east, north),
        CellCoord::new(west, z),
        center,
        CellCoord::new(east, z),
        CellCoord::new(west, south),
        CellCoord::new(x, south),
        CellCoord::new(east, south),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coordinates_floor_toward_negative_infinity() {
        assert_eq!(cell_of(0.0, 0.0), CellCoord::new(0, 0));
        assert_eq!(cell_of(49.9, 49.9), CellCoord::new(0, 0));
        assert_eq!(cell_of(50.0, -0.1), CellCoord::new(1, -1));
        assert_eq!(cell_of(-50.0, -50.1), CellCoord::new(-1, -2));
    }

    #[test]
    fn min_corner_matches_cell_size_grid() {
        let a = CellCoord::new(3, -2);
        let (ax, az) = a.min_corner();
        assert!((ax - 3.0 * HASH_CELL_SIZE).abs() < 1.0e-6);
        assert!((az + 2.0 * HASH_CELL_SIZE).abs() < 1.0e-6);
        assert_eq!(cell_of(ax + 0.01, az + 0.01), a);
    }

    #[test]
    fn span_covers_straddling_rectangle() {
        let (lo, hi) = cell_span(-10.0, 40.0, 60.0, 120.0);
        assert_eq!(lo, CellCoord::new(-1, 0));
        assert_eq!(hi, CellCoord::new(1, 2));
    }

    #[test]
    fn neighbourhood_center_is_input_and_cells_are_distinct() {
        let center = CellCoord::new(7, -4);
        let block = neighbourhood(center);
        assert_eq!(block[4], center);
        let mut sorted = block.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 9);
        assert_eq!(block[0], CellCoord::new(6, -3));
        assert_eq!(block[8], CellCoord::new(8, -5));
    }

    #[test]
    fn huge_coordinates_saturate() {
        let c = cell_of(1.0e30, -1.0e30);
        assert_eq!(c, CellCoord::new(i32::MAX, i32::MIN));
        let block = neighbourhood(c);
        assert_eq!(block[4], c);
    }
}
