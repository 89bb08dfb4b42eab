//! Grid module - owns the 8x8 tile matrix
//!
//! Cells are stored in a flat array, column-major (`x * GRID_SIZE + y`), so a
//! column is a contiguous slice and gravity can work on it in place.
//! Coordinates: (x, y) where x is the column (0..7, left to right) and y the
//! row (0..7, top to bottom). Tiles fall toward larger y.

use arrayvec::ArrayVec;

use crate::error::GridError;
use crate::matcher::find_matches;
use crate::rng::TileSource;
use crate::types::{
    CellView, Coord, Direction, SpecialKind, TileKind, FALL_CELLS_PER_SEC, GRID_CELLS, GRID_SIZE,
    MAX_GENERATION_ATTEMPTS,
};

/// Special flag on a tile plus the time it was set (bomb fuses count from it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Special {
    pub kind: SpecialKind,
    pub flagged_at_ms: u64,
}

/// One game piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    /// Vertical render offset in cells; negative while the tile is still falling.
    pub fall_offset: f32,
    pub special: Option<Special>,
    pub spawned_at_ms: u64,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            fall_offset: 0.0,
            special: None,
            spawned_at_ms: 0,
        }
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        self.special.map(|s| s.kind)
    }

    pub fn is_special(&self) -> bool {
        self.special.is_some()
    }
}

/// A cell is either empty or holds exactly one tile.
pub type Cell = Option<Tile>;

/// Set of grid coordinates as a 64-bit mask (one bit per cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoordSet(u64);

const _: () = assert!(GRID_CELLS <= 64, "CoordSet needs one bit per cell");

impl CoordSet {
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline(always)]
    fn bit(c: Coord) -> u64 {
        1u64 << (c.y as usize * GRID_SIZE + c.x as usize)
    }

    /// Returns false if the coordinate was already present or is off the grid.
    pub fn insert(&mut self, c: Coord) -> bool {
        if !c.in_bounds() {
            return false;
        }
        let had = self.contains(c);
        self.0 |= Self::bit(c);
        !had
    }

    pub fn remove(&mut self, c: Coord) {
        if c.in_bounds() {
            self.0 &= !Self::bit(c);
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.in_bounds() && self.0 & Self::bit(c) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(&self, other: CoordSet) -> CoordSet {
        CoordSet(self.0 | other.0)
    }

    pub fn difference(&self, other: CoordSet) -> CoordSet {
        CoordSet(self.0 & !other.0)
    }

    /// Row-major order (top row first).
    pub fn iter(&self) -> impl Iterator<Item = Coord> {
        let bits = self.0;
        (0..GRID_CELLS)
            .filter(move |i| bits & (1u64 << i) != 0)
            .map(|i| Coord::new((i % GRID_SIZE) as u8, (i / GRID_SIZE) as u8))
    }
}

impl FromIterator<Coord> for CoordSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = CoordSet::new();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl Extend<Coord> for CoordSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for c in iter {
            self.insert(c);
        }
    }
}

/// Result of one gravity pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compaction {
    /// Columns where at least one tile moved or was spawned, ascending.
    pub columns: ArrayVec<u8, GRID_SIZE>,
    /// Fresh tiles placed at the top of their columns.
    pub spawned: ArrayVec<Coord, GRID_CELLS>,
}

impl Compaction {
    pub fn changed(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// The game grid - 8x8 cells using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: [Cell; GRID_CELLS],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_CELLS],
        }
    }

    /// Random grid with no initial matches.
    ///
    /// Regenerates the whole grid until the matcher finds nothing. With six
    /// kinds on 8x8 that takes a handful of attempts; the cap only guards
    /// against a broken palette.
    pub fn generate(source: &mut TileSource, now_ms: u64) -> Result<Self, GridError> {
        let mut grid = Self::new();
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            grid.fill_random(source, now_ms);
            if find_matches(&grid).is_empty() {
                if attempt > 1 {
                    tracing::debug!(attempt, "generated match-free grid");
                }
                return Ok(grid);
            }
        }
        tracing::error!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "grid generation exhausted"
        );
        Err(GridError::GenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Overwrite every cell with a random tile (matches allowed).
    pub fn fill_random(&mut self, source: &mut TileSource, now_ms: u64) {
        for cell in &mut self.cells {
            *cell = Some(Tile {
                spawned_at_ms: now_ms,
                ..Tile::new(source.next_kind())
            });
        }
    }

    /// Build from rows of kinds, `rows[y][x]`.
    pub fn from_rows(rows: [[TileKind; GRID_SIZE]; GRID_SIZE]) -> Self {
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, kind) in row.iter().enumerate() {
                grid.cells[Self::index(x, y)] = Some(Tile::new(*kind));
            }
        }
        grid
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: usize, y: usize) -> usize {
        x * GRID_SIZE + y
    }

    #[inline(always)]
    fn slot(c: Coord) -> Option<usize> {
        if c.in_bounds() {
            Some(Self::index(c.x as usize, c.y as usize))
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        GRID_SIZE
    }

    /// Tile at `c`; `None` when empty or out of bounds.
    pub fn get(&self, c: Coord) -> Option<&Tile> {
        Self::slot(c).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, c: Coord) -> Option<&mut Tile> {
        Self::slot(c).and_then(move |i| self.cells[i].as_mut())
    }

    pub fn kind_at(&self, c: Coord) -> Option<TileKind> {
        self.get(c).map(|t| t.kind)
    }

    /// Set cell at `c`. Returns false if out of bounds.
    pub fn set(&mut self, c: Coord, cell: Cell) -> bool {
        match Self::slot(c) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, c: Coord) -> bool {
        self.get(c).is_some()
    }

    /// Manhattan distance of exactly one.
    pub fn is_adjacent(a: Coord, b: Coord) -> bool {
        a.is_adjacent(b)
    }

    /// Exchange two adjacent occupied tiles, fall offsets included.
    ///
    /// Returns false (and leaves the grid untouched) for anything else.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        if !Self::is_adjacent(a, b) || !self.is_occupied(a) || !self.is_occupied(b) {
            return false;
        }
        let (Some(ia), Some(ib)) = (Self::slot(a), Self::slot(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        true
    }

    /// Empty every listed cell. Returns how many tiles were removed.
    pub fn clear(&mut self, coords: &CoordSet) -> usize {
        let mut removed = 0;
        for c in coords.iter() {
            if let Some(i) = Self::slot(c) {
                if self.cells[i].take().is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Gravity plus refill.
    ///
    /// Per column, a two-pointer pass moves tiles down over the gaps without
    /// reordering them, then the cells left at the top get fresh tiles. Moved
    /// tiles get `fall_offset = -distance`, new ones `-(row + 1)` so they
    /// appear to drop in from above the grid.
    pub fn compact(&mut self, source: &mut TileSource, now_ms: u64) -> Compaction {
        let mut report = Compaction::default();

        for x in 0..GRID_SIZE {
            let base = x * GRID_SIZE;
            let column = &mut self.cells[base..base + GRID_SIZE];
            let mut changed = false;
            let mut write_y = GRID_SIZE;

            for read_y in (0..GRID_SIZE).rev() {
                if let Some(mut tile) = column[read_y].take() {
                    write_y -= 1;
                    if write_y != read_y {
                        tile.fall_offset = -((write_y - read_y) as f32);
                        changed = true;
                    }
                    column[write_y] = Some(tile);
                }
            }

            for y in (0..write_y).rev() {
                column[y] = Some(Tile {
                    fall_offset: -((y + 1) as f32),
                    spawned_at_ms: now_ms,
                    ..Tile::new(source.next_kind())
                });
                report.spawned.push(Coord::new(x as u8, y as u8));
                changed = true;
            }

            if changed {
                report.columns.push(x as u8);
            }
        }

        report
    }

    /// Cyclic one-step shift of row `row`. `dir` must be Left or Right.
    pub fn slide_row(&mut self, row: usize, dir: Direction) -> bool {
        if row >= GRID_SIZE || !dir.is_horizontal() {
            return false;
        }
        let mut line: [Cell; GRID_SIZE] = [None; GRID_SIZE];
        for (x, slot) in line.iter_mut().enumerate() {
            *slot = self.cells[Self::index(x, row)];
        }
        match dir {
            Direction::Left => line.rotate_left(1),
            _ => line.rotate_right(1),
        }
        for (x, cell) in line.into_iter().enumerate() {
            self.cells[Self::index(x, row)] = cell.map(|t| Tile {
                fall_offset: 0.0,
                ..t
            });
        }
        true
    }

    /// Cyclic one-step shift of column `col`. `dir` must be Up or Down.
    pub fn slide_column(&mut self, col: usize, dir: Direction) -> bool {
        if col >= GRID_SIZE || dir.is_horizontal() {
            return false;
        }
        let column = &mut self.cells[col * GRID_SIZE..(col + 1) * GRID_SIZE];
        match dir {
            Direction::Up => column.rotate_left(1),
            _ => column.rotate_right(1),
        }
        for tile in column.iter_mut().flatten() {
            tile.fall_offset = 0.0;
        }
        true
    }

    /// Shift the row (horizontal `dir`) or column (vertical `dir`) through `at`.
    pub fn slide(&mut self, at: Coord, dir: Direction) -> bool {
        if !at.in_bounds() {
            return false;
        }
        if dir.is_horizontal() {
            self.slide_row(at.y as usize, dir)
        } else {
            self.slide_column(at.x as usize, dir)
        }
    }

    /// Move every falling tile toward rest. Returns true while any is still moving.
    pub fn settle_offsets(&mut self, elapsed_ms: u32) -> bool {
        let step = FALL_CELLS_PER_SEC * elapsed_ms as f32 / 1000.0;
        let mut moving = false;
        for tile in self.cells.iter_mut().flatten() {
            if tile.fall_offset < 0.0 {
                tile.fall_offset = (tile.fall_offset + step).min(0.0);
                moving |= tile.fall_offset < 0.0;
            }
        }
        moving
    }

    pub fn is_settled(&self) -> bool {
        self.cells.iter().flatten().all(|t| t.fall_offset >= 0.0)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_count(&self) -> usize {
        GRID_CELLS - self.occupied_count()
    }

    /// Occupied cells with their tiles, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.as_ref()
                .map(|t| (Coord::new((i / GRID_SIZE) as u8, (i % GRID_SIZE) as u8), t))
        })
    }

    /// Coordinates holding a special tile.
    pub fn specials(&self) -> impl Iterator<Item = (Coord, Special)> + '_ {
        self.tiles().filter_map(|(c, t)| t.special.map(|s| (c, s)))
    }

    /// Renderer view, `view[y][x]`.
    pub fn view(&self) -> [[CellView; GRID_SIZE]; GRID_SIZE] {
        let mut out = [[None; GRID_SIZE]; GRID_SIZE];
        for (c, t) in self.tiles() {
            out[c.y as usize][c.x as usize] = Some((t.kind, t.special_kind()));
        }
        out
    }

    /// Kinds of one row, left to right (for tests and debugging).
    pub fn row_kinds(&self, y: usize) -> [Option<TileKind>; GRID_SIZE] {
        let mut out = [None; GRID_SIZE];
        if y < GRID_SIZE {
            for (x, slot) in out.iter_mut().enumerate() {
                *slot = self.cells[Self::index(x, y)].map(|t| t.kind);
            }
        }
        out
    }

    /// Kinds of one column, top to bottom.
    pub fn column_kinds(&self, x: usize) -> [Option<TileKind>; GRID_SIZE] {
        let mut out = [None; GRID_SIZE];
        if x < GRID_SIZE {
            for (y, slot) in out.iter_mut().enumerate() {
                *slot = self.cells[Self::index(x, y)].map(|t| t.kind);
            }
        }
        out
    }

    /// Same kinds in the same places, ignoring offsets, specials and timestamps.
    pub fn same_layout(&self, other: &Grid) -> bool {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .all(|(a, b)| a.map(|t| t.kind) == b.map(|t| t.kind))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
