//! Screen geometry of the grid and pointer events in grid terms.

use crate::types::{Coord, GRID_SIZE};

/// Where the grid sits on screen, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub origin_col: u16,
    pub origin_row: u16,
    /// Terminal columns per tile.
    pub tile_w: u16,
    /// Terminal rows per tile.
    pub tile_h: u16,
}

impl GridGeometry {
    pub const fn new(origin_col: u16, origin_row: u16, tile_w: u16, tile_h: u16) -> Self {
        Self {
            origin_col,
            origin_row,
            tile_w,
            tile_h,
        }
    }

    pub fn width(&self) -> u16 {
        self.tile_w * GRID_SIZE as u16
    }

    pub fn height(&self) -> u16 {
        self.tile_h * GRID_SIZE as u16
    }

    /// Tile under a terminal cell, if any.
    pub fn cell_at(&self, col: u16, row: u16) -> Option<Coord> {
        if self.tile_w == 0 || self.tile_h == 0 {
            return None;
        }
        let dx = col.checked_sub(self.origin_col)?;
        let dy = row.checked_sub(self.origin_row)?;
        let c = Coord::new((dx / self.tile_w) as u8, (dy / self.tile_h) as u8);
        if dx < self.width() && dy < self.height() {
            Some(c)
        } else {
            None
        }
    }

    /// Top-left terminal cell of a tile.
    pub fn tile_origin(&self, c: Coord) -> (u16, u16) {
        (
            self.origin_col + c.x as u16 * self.tile_w,
            self.origin_row + c.y as u16 * self.tile_h,
        )
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(2, 2, 4, 2)
    }
}

/// Left-button pointer activity, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { col: u16, row: u16 },
    Drag { col: u16, row: u16 },
    Up { col: u16, row: u16 },
}
