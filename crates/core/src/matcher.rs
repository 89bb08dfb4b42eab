//! Match detection
//!
//! Scans each row and column once for maximal runs of three or more equal
//! kinds. Empty cells break runs. Pure over any grid value.

use crate::grid::{CoordSet, Grid};
use crate::types::{Coord, TileKind, GRID_SIZE, MIN_MATCH_LEN};

/// A maximal run of one kind along a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: Coord,
    pub len: usize,
    pub horizontal: bool,
    pub kind: TileKind,
}

impl Run {
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let Run {
            start,
            len,
            horizontal,
            ..
        } = *self;
        (0..len).map(move |i| {
            if horizontal {
                Coord::new(start.x + i as u8, start.y)
            } else {
                Coord::new(start.x, start.y + i as u8)
            }
        })
    }

    /// Middle tile; for even lengths the one nearer the start.
    pub fn centre(&self) -> Coord {
        let mid = ((self.len - 1) / 2) as u8;
        if self.horizontal {
            Coord::new(self.start.x + mid, self.start.y)
        } else {
            Coord::new(self.start.x, self.start.y + mid)
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        let end = self.len as u8;
        if self.horizontal {
            c.y == self.start.y && c.x >= self.start.x && c.x < self.start.x + end
        } else {
            c.x == self.start.x && c.y >= self.start.y && c.y < self.start.y + end
        }
    }
}

fn scan_line(grid: &Grid, horizontal: bool, line: usize, out: &mut Vec<Run>) {
    let at = |i: usize| {
        if horizontal {
            Coord::new(i as u8, line as u8)
        } else {
            Coord::new(line as u8, i as u8)
        }
    };

    let mut i = 0;
    while i < GRID_SIZE {
        let Some(kind) = grid.kind_at(at(i)) else {
            i += 1;
            continue;
        };
        let mut end = i + 1;
        while end < GRID_SIZE && grid.kind_at(at(end)) == Some(kind) {
            end += 1;
        }
        if end - i >= MIN_MATCH_LEN {
            out.push(Run {
                start: at(i),
                len: end - i,
                horizontal,
                kind,
            });
        }
        i = end;
    }
}

/// Every maximal run, rows first (top to bottom) then columns (left to right).
pub fn find_runs(grid: &Grid) -> Vec<Run> {
    let mut runs = Vec::new();
    for y in 0..GRID_SIZE {
        scan_line(grid, true, y, &mut runs);
    }
    for x in 0..GRID_SIZE {
        scan_line(grid, false, x, &mut runs);
    }
    runs
}

/// Union of all run members, deduplicated.
pub fn find_matches(grid: &Grid) -> CoordSet {
    find_runs(grid).iter().flat_map(Run::coords).collect()
}
