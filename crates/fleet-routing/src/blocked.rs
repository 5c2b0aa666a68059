//! Temporarily blocked floor cells.
//!
//! Positions are snapped to a square grid (`grid_size` metres, rounded to
//! the nearest cell) so that nearby reports of the same obstruction share
//! one entry.  Each entry carries the elapsed time at which it lapses; a
//! cell is blocked while `now < expiry`.

use fleet_core::Point;

#[cfg(feature = "fx-hash")]
type CellMap = rustc_hash::FxHashMap<GridCell, f64>;
#[cfg(not(feature = "fx-hash"))]
type CellMap = std::collections::HashMap<GridCell, f64>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn snap(p: Point, grid_size: f32) -> Self {
        Self {
            x: (p.x / grid_size).round() as i32,
            y: (p.y / grid_size).round() as i32,
        }
    }
}

#[derive(Debug)]
pub struct BlockedAreas {
    cells:     CellMap,
    grid_size: f32,
}

impl BlockedAreas {
    pub fn new(grid_size: f32) -> Self {
        Self { cells: CellMap::default(), grid_size }
    }

    pub fn cell_of(&self, p: Point) -> GridCell {
        GridCell::snap(p, self.grid_size)
    }

    /// Block the cell containing `p` until `expiry`.  Re-marking replaces
    /// the previous expiry.
    pub fn mark(&mut self, p: Point, expiry: f64) -> GridCell {
        let cell = self.cell_of(p);
        self.cells.insert(cell, expiry);
        cell
    }

    pub fn unmark(&mut self, p: Point) -> bool {
        let cell = self.cell_of(p);
        self.cells.remove(&cell).is_some()
    }

    /// Lookup with lazy eviction of a lapsed entry.
    pub fn is_blocked(&mut self, p: Point, now: f64) -> bool {
        let cell = self.cell_of(p);
        match self.cells.get(&cell) {
            Some(&expiry) if now < expiry => true,
            Some(_) => {
                self.cells.remove(&cell);
                false
            }
            None => false,
        }
    }

    /// Drop every lapsed entry.  Returns how many were removed.
    pub fn sweep(&mut self, now: f64) -> usize {
        let before = self.cells.len();
        self.cells.retain(|_, expiry| now < *expiry);
        before - self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Currently stored cells, sorted for stable output.
    pub fn cells(&self) -> Vec<(GridCell, f64)> {
        let mut v: Vec<_> = self.cells.iter().map(|(&c, &e)| (c, e)).collect();
        v.sort_by_key(|(c, _)| *c);
        v
    }
}
