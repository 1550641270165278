use hashbrown::HashMap;

use crate::cell::{CellCoord, cell_of, cell_span, neighbourhood};

use super::{settings::MAX_CELLS_PER_BODY, types::Aabb2};

/// Uniform grid over the XZ plane mapping each cell to the bodies that overlap it.
///
/// Notes:
/// - A body is registered in every cell its rectangle touches, so large bodies (bank walls,
///   bridge barriers) appear in many cells.
/// - Indices refer to the owner's body list; the hash never stores bodies itself.
/// - Cell vectors are kept on `clear` so a map swap reuses their allocations.
#[derive(Default)]
pub struct SpatialHash {
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl SpatialHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `index` in every cell overlapped by `bounds`.
    ///
    /// Returns the number of cells touched, or `None` without registering anything when
    /// the bounds cover more than [`MAX_CELLS_PER_BODY`] cells.
    pub fn insert(&mut self, index: usize, bounds: &Aabb2) -> Option<usize> {
        let (lo, hi) = cell_span(bounds.min_x, bounds.min_z, bounds.max_x, bounds.max_z);
        if span_cells(lo, hi) > MAX_CELLS_PER_BODY {
            return None;
        }
        let mut touched = 0;
        for cx in lo.x..=hi.x {
            for cz in lo.z..=hi.z {
                self.cells
                    .entry(CellCoord::new(cx, cz))
                    .or_default()
                    .push(index);
                touched += 1;
            }
        }
        Some(touched)
    }

    /// Drop every registration while keeping cell allocations.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    /// Bodies registered in a single cell (empty slice for unknown cells).
    pub fn cell(&self, coord: CellCoord) -> &[usize] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of cells with at least one registration.
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|b| !b.is_empty()).count()
    }
}

/// Cells in the inclusive range `lo..=hi`, without overflow.
fn span_cells(lo: CellCoord, hi: CellCoord) -> u64 {
    let x = (i64::from(hi.x) - i64::from(lo.x) + 1).max(0) as u64;
    let z = (i64::from(hi.z) - i64::from(lo.z) + 1).max(0) as u64;
    x.saturating_mul(z)
}

/// Reusable buffers for candidate gathering so the per-step query does not allocate.
///
/// Dedup uses a per-body stamp: a body is a candidate once per query even if it is
/// registered in several of the nine cells.
pub struct CandidateScratch {
    pub candidates: Vec<usize>,
    stamps: Vec<u32>,
    epoch: u32,
}

impl CandidateScratch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
            stamps: Vec::new(),
            epoch: 0,
        }
    }

    /// Forget all stamps, e.g. after the body list was cleared.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.stamps.clear();
        self.epoch = 0;
    }

    fn begin(&mut self, body_count: usize) {
        self.candidates.clear();
        if self.stamps.len() < body_count {
            self.stamps.resize(body_count, 0);
        }
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped: old stamps could alias the new epoch.
            self.stamps.iter_mut().for_each(|s| *s = 0);
            self.epoch = 1;
        }
    }

    fn push_unique(&mut self, index: usize) {
        if let Some(stamp) = self.stamps.get_mut(index)
            && *stamp != self.epoch
        {
            *stamp = self.epoch;
            self.candidates.push(index);
        }
    }
}

/// Gather the distinct bodies registered in the 3x3 block of cells around `(x, z)`.
///
/// Results land in `scratch.candidates` in first-seen order.
pub fn gather_candidates(
    hash: &SpatialHash,
    body_count: usize,
    x: f32,
    z: f32,
    scratch: &mut CandidateScratch,
) {
    scratch.begin(body_count);
    for coord in neighbourhood(cell_of(x, z)) {
        for &index in hash.cell(coord) {
            scratch.push_unique(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_registers_every_overlapped_cell() {
        let mut hash = SpatialHash::new();
        // Straddles x cells -1..=1 and z cell 0.
        let touched = hash.insert(0, &Aabb2::new(-10.0, 5.0, 60.0, 20.0));
        assert_eq!(touched, Some(3));
        assert_eq!(hash.cell(CellCoord::new(-1, 0)), &[0]);
        assert_eq!(hash.cell(CellCoord::new(0, 0)), &[0]);
        assert_eq!(hash.cell(CellCoord::new(1, 0)), &[0]);
        assert!(hash.cell(CellCoord::new(2, 0)).is_empty());
        assert_eq!(hash.occupied_cells(), 3);
    }

    #[test]
    fn oversized_bounds_are_refused() {
        let mut hash = SpatialHash::new();
        let huge = Aabb2::new(-1.0e7, -1.0e7, 1.0e7, 1.0e7);
        assert_eq!(hash.insert(0, &huge), None);
        assert_eq!(hash.occupied_cells(), 0);

        // A whole city is still fine.
        let city = Aabb2::new(-1500.0, -1500.0, 1500.0, 1500.0);
        assert_eq!(hash.insert(1, &city), Some(61 * 61));
    }

    #[test]
    fn clear_empties_cells() {
        let mut hash = SpatialHash::new();
        hash.insert(0, &Aabb2::new(0.0, 0.0, 1.0, 1.0));
        hash.clear();
        assert!(hash.cell(CellCoord::new(0, 0)).is_empty());
        assert_eq!(hash.occupied_cells(), 0);
    }

    #[test]
    fn gather_dedups_bodies_spanning_many_cells() {
        let mut hash = SpatialHash::new();
        hash.insert(0, &Aabb2::new(-60.0, -60.0, 60.0, 60.0));
        hash.insert(1, &Aabb2::new(10.0, 10.0, 12.0, 12.0));
        hash.insert(2, &Aabb2::new(500.0, 500.0, 510.0, 510.0));

        let mut scratch = CandidateScratch::with_capacity(8);
        gather_candidates(&hash, 3, 5.0, 5.0, &mut scratch);
        let mut found = scratch.candidates.clone();
        found.sort();
        assert_eq!(found, vec![0, 1]);

        // A second query starts fresh.
        gather_candidates(&hash, 3, 505.0, 505.0, &mut scratch);
        assert_eq!(scratch.candidates, vec![2]);
    }

    #[test]
    fn gather_reaches_neighbouring_cells_only() {
        let mut hash = SpatialHash::new();
        // Two cells east of the origin cell: outside the 3x3 block.
        hash.insert(0, &Aabb2::new(101.0, 1.0, 102.0, 2.0));
        hash.insert(1, &Aabb2::new(51.0, 1.0, 52.0, 2.0));
        let mut scratch = CandidateScratch::with_capacity(8);
        gather_candidates(&hash, 2, 1.0, 1.0, &mut scratch);
        assert_eq!(scratch.candidates, vec![1]);
    }
}
