//! Occupancy-grid navigator with A* search.
//!
//! # Layout
//!
//! The floor is divided into square cells of `cell_size` metres starting at
//! `origin`.  Cell `(col, row)` covers
//!
//! ```text
//! [origin.x + col·size, origin.x + (col+1)·size) × [origin.y + row·size, …)
//! ```
//!
//! and `blocked[row * width + col]` marks walls and fixed obstacles.
//!
//! # Search
//!
//! 8-connected A* with integer costs (10 straight, 14 diagonal) and the
//! octile heuristic.  Diagonal moves may not cut a blocked corner.  The cell
//! path is reduced to its turning points, and the first and last corners
//! are replaced by the exact query points.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fleet_core::Point;

use crate::navigator::{NavPath, Navigator};
use crate::{NavError, NavResult};

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0), (-1, 0), (0, 1), (0, -1),
    (1, 1), (-1, 1), (1, -1), (-1, -1),
];

// ── GridNavigator ─────────────────────────────────────────────────────────────

/// Static occupancy grid.  Build with [`GridNavigatorBuilder`].
#[derive(Debug, Clone)]
pub struct GridNavigator {
    origin:    Point,
    cell_size: f32,
    width:     u32,
    height:    u32,
    blocked:   Vec<bool>,
}

impl GridNavigator {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The cell containing `p`, or `None` outside the grid.
    pub fn cell_of(&self, p: Point) -> Option<(u32, u32)> {
        let fx = (p.x - self.origin.x) / self.cell_size;
        let fy = (p.y - self.origin.y) / self.cell_size;
        if !(fx.is_finite() && fy.is_finite()) || fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (col, row) = (fx.floor() as u32, fy.floor() as u32);
        (col < self.width && row < self.height).then_some((col, row))
    }

    pub fn center_of(&self, (col, row): (u32, u32)) -> Point {
        Point::new(
            self.origin.x + (col as f32 + 0.5) * self.cell_size,
            self.origin.y + (row as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn is_cell_free(&self, (col, row): (u32, u32)) -> bool {
        col < self.width && row < self.height && !self.blocked[self.idx(col, row)]
    }

    #[inline]
    fn idx(&self, col: u32, row: u32) -> usize {
        (row * self.width + col) as usize
    }

    fn free_at(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && self.is_cell_free((col as u32, row as u32))
    }

    fn astar(&self, start: (u32, u32), goal: (u32, u32)) -> Option<Vec<(u32, u32)>> {
        let n = (self.width * self.height) as usize;
        let mut best = vec![u32::MAX; n];
        let mut prev = vec![u32::MAX; n];

        let h = |(c, r): (u32, u32)| {
            let dx = c.abs_diff(goal.0);
            let dy = r.abs_diff(goal.1);
            STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
        };

        let start_idx = self.idx(start.0, start.1);
        best[start_idx] = 0;
        // (f, g, cell index).  Index as final key keeps ties deterministic.
        let mut heap: BinaryHeap<Reverse<(u32, u32, u32)>> = BinaryHeap::new();
        heap.push(Reverse((h(start), 0, start_idx as u32)));

        while let Some(Reverse((_, g, idx))) = heap.pop() {
            let cell = (idx % self.width, idx / self.width);
            if cell == goal {
                return Some(self.reconstruct(&prev, idx));
            }
            if g > best[idx as usize] {
                continue;
            }
            for (dc, dr) in NEIGHBOURS {
                let (nc, nr) = (cell.0 as i32 + dc, cell.1 as i32 + dr);
                if !self.free_at(nc, nr) {
                    continue;
                }
                let diagonal = dc != 0 && dr != 0;
                if diagonal
                    && !(self.free_at(cell.0 as i32 + dc, cell.1 as i32)
                        && self.free_at(cell.0 as i32, cell.1 as i32 + dr))
                {
                    continue;
                }
                let step = if diagonal { DIAGONAL_COST } else { STRAIGHT_COST };
                let ng = g + step;
                let next = (nc as u32, nr as u32);
                let nidx = self.idx(next.0, next.1);
                if ng < best[nidx] {
                    best[nidx] = ng;
                    prev[nidx] = idx;
                    heap.push(Reverse((ng + h(next), ng, nidx as u32)));
                }
            }
        }
        None
    }

    fn reconstruct(&self, prev: &[u32], goal_idx: u32) -> Vec<(u32, u32)> {
        let mut cells = Vec::new();
        let mut cur = goal_idx;
        loop {
            cells.push((cur % self.width, cur / self.width));
            let p = prev[cur as usize];
            if p == u32::MAX {
                break;
            }
            cur = p;
        }
        cells.reverse();
        cells
    }
}

impl Navigator for GridNavigator {
    fn is_reachable(&self, p: Point) -> bool {
        self.cell_of(p).is_some_and(|c| self.is_cell_free(c))
    }

    fn find_path(&self, from: Point, to: Point) -> NavResult<NavPath> {
        let start = self
            .cell_of(from)
            .filter(|&c| self.is_cell_free(c))
            .ok_or(NavError::Unreachable(from))?;
        let goal = self
            .cell_of(to)
            .filter(|&c| self.is_cell_free(c))
            .ok_or(NavError::Unreachable(to))?;

        if start == goal {
            return Ok(NavPath::direct(from, to));
        }

        let cells = self.astar(start, goal).ok_or(NavError::NoPath { from, to })?;
        let mut corners = Vec::with_capacity(cells.len());
        corners.push(from);
        for w in cells.windows(3) {
            let d1 = (w[1].0 as i64 - w[0].0 as i64, w[1].1 as i64 - w[0].1 as i64);
            let d2 = (w[2].0 as i64 - w[1].0 as i64, w[2].1 as i64 - w[1].1 as i64);
            if d1 != d2 {
                corners.push(self.center_of(w[1]));
            }
        }
        corners.push(to);
        Ok(NavPath { corners })
    }
}

// ── GridNavigatorBuilder ──────────────────────────────────────────────────────

/// Incrementally mark obstacles, then call [`build`](Self::build).
///
/// ```rust
/// use fleet_core::Point;
/// use fleet_nav::{GridNavigatorBuilder, Navigator};
///
/// let grid = GridNavigatorBuilder::new(Point::ZERO, 20, 10, 1.0)
///     .block_rect(Point::new(8.0, 0.0), Point::new(9.0, 7.0))
///     .build()
///     .unwrap();
/// assert!(!grid.is_reachable(Point::new(8.5, 3.0)));
/// ```
pub struct GridNavigatorBuilder {
    origin:    Point,
    cell_size: f32,
    width:     u32,
    height:    u32,
    blocked:   Vec<bool>,
}

impl GridNavigatorBuilder {
    pub fn new(origin: Point, width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            origin,
            cell_size,
            width,
            height,
            blocked: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn block_cell(mut self, col: u32, row: u32) -> Self {
        if col < self.width && row < self.height {
            self.blocked[(row * self.width + col) as usize] = true;
        }
        self
    }

    /// Block every cell whose centre lies inside the rectangle `a`–`b`.
    pub fn block_rect(mut self, a: Point, b: Point) -> Self {
        let (lo, hi) = (
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        );
        for row in 0..self.height {
            for col in 0..self.width {
                let c = Point::new(
                    self.origin.x + (col as f32 + 0.5) * self.cell_size,
                    self.origin.y + (row as f32 + 0.5) * self.cell_size,
                );
                if c.x >= lo.x && c.x <= hi.x && c.y >= lo.y && c.y <= hi.y {
                    self.blocked[(row * self.width + col) as usize] = true;
                }
            }
        }
        self
    }

    pub fn build(self) -> NavResult<GridNavigator> {
        if self.width == 0 || self.height == 0 {
            return Err(NavError::Grid("grid must have at least one cell".into()));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(NavError::Grid(format!("cell_size must be positive, got {}", self.cell_size)));
        }
        Ok(GridNavigator {
            origin:    self.origin,
            cell_size: self.cell_size,
            width:     self.width,
            height:    self.height,
            blocked:   self.blocked,
        })
    }
}
