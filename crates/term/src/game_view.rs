//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Phase};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::input::GridGeometry;
use crate::types::{Coord, Mode, SpecialKind, TileKind, GRID_SIZE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Frontend state drawn next to the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudView<'a> {
    pub cursor: Option<Coord>,
    /// One-line message (submission result, validation errors).
    pub status: Option<&'a str>,
    /// Preformatted leaderboard lines.
    pub leaderboard: &'a [String],
}

const PANEL_W: u16 = 28;
const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const HELP: [&str; 5] = [
    "arrows/hjkl move  space pick",
    "shift+arrows slide (SLIDERS)",
    "1-4 mode  n new  e end",
    "x discard  q quit",
    "mouse: click / drag",
];

pub struct GameView {
    /// Tile width in terminal columns.
    tile_w: u16,
    /// Tile height in terminal rows.
    tile_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 4x2 keeps tiles roughly square in most terminal fonts.
        Self {
            tile_w: 4,
            tile_h: 2,
        }
    }
}

impl GameView {
    pub fn new(tile_w: u16, tile_h: u16) -> Self {
        Self {
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
        }
    }

    fn frame_size(&self) -> (u16, u16) {
        (
            self.tile_w * GRID_SIZE as u16 + 2,
            self.tile_h * GRID_SIZE as u16 + 2,
        )
    }

    /// Where the grid lands for this viewport; used to map mouse input back.
    pub fn geometry(&self, viewport: Viewport) -> GridGeometry {
        let (frame_w, frame_h) = self.frame_size();
        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;
        GridGeometry::new(start_x + 1, start_y + 1, self.tile_w, self.tile_h)
    }

    pub fn render(&self, snap: &GameSnapshot, hud: &HudView<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        hud: &HudView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear();

        let (frame_w, frame_h) = self.frame_size();
        if viewport.width < frame_w || viewport.height < frame_h {
            fb.put_str(0, 0, "terminal too small", CellStyle::default().bold());
            return;
        }

        let geo = self.geometry(viewport);
        let board = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG);
        fb.fill_rect(geo.origin_col, geo.origin_row, geo.width(), geo.height(), ' ', board);
        draw_border(
            fb,
            geo.origin_col - 1,
            geo.origin_row - 1,
            frame_w,
            frame_h,
            CellStyle::default(),
        );

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let c = Coord::new(x as u8, y as u8);
                if let Some((kind, special)) = snap.cells[y][x] {
                    self.draw_tile(fb, &geo, c, kind, special, snap.offsets[y][x]);
                }
            }
        }

        if let Some(sel) = snap.selection {
            self.draw_marker(fb, &geo, sel, '[', ']');
        }
        if let Some(cursor) = hud.cursor.filter(|c| Some(*c) != snap.selection) {
            self.draw_marker(fb, &geo, cursor, '>', '<');
        }

        self.draw_panel(fb, snap, hud, geo.origin_col + frame_w + 1, geo.origin_row - 1);

        match snap.phase {
            Phase::Ended => draw_centered(fb, &geo, "GAME OVER"),
            Phase::Idle => draw_centered(fb, &geo, "READY"),
            _ => {}
        }
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        geo: &GridGeometry,
        c: Coord,
        kind: TileKind,
        special: Option<SpecialKind>,
        fall_offset: f32,
    ) {
        let (px, py) = geo.tile_origin(c);
        let shift = (fall_offset * self.tile_h as f32).round() as i32;
        let style = CellStyle::new(Rgb::new(10, 10, 10), tile_color(kind));
        let glyph = special.map(special_glyph).unwrap_or(' ');

        for r in 0..self.tile_h {
            let row = py as i32 + r as i32 + shift;
            if row < geo.origin_row as i32 {
                continue;
            }
            let row = row as u16;
            fb.fill_rect(px, row, self.tile_w, 1, ' ', style);
            if r == self.tile_h / 2 {
                fb.put_char(px + self.tile_w / 2, row, glyph, style.bold());
            }
        }
    }

    fn draw_marker(&self, fb: &mut FrameBuffer, geo: &GridGeometry, c: Coord, left: char, right: char) {
        let (px, py) = geo.tile_origin(c);
        let row = py + self.tile_h / 2;
        let style = fb
            .get(px, row)
            .map(|cell| cell.style)
            .unwrap_or_default()
            .bold();
        fb.put_char(px, row, left, style);
        fb.put_char(px + self.tile_w - 1, row, right, style);
    }

    fn draw_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &HudView<'_>,
        x: u16,
        top: u16,
    ) {
        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = CellStyle::new(Rgb::new(120, 120, 130), Rgb::new(0, 0, 0));

        let mut y = top;
        let mut line = |fb: &mut FrameBuffer, text: &str, style: CellStyle| {
            fb.put_str(x, y, text, style);
            y = y.saturating_add(1);
        };

        line(fb, &format!("MODE  {}", snap.mode), label);
        line(fb, &format!("SCORE {}", snap.score), value);
        line(fb, &format!("MULTI x{}", snap.display_multiplier()), value);
        if snap.mode == Mode::Timed {
            let secs = snap.time_remaining_secs.unwrap_or(0);
            line(fb, &format!("TIME  {}:{:02}", secs / 60, secs % 60), value);
        }
        if snap.locked() {
            line(fb, "...", dim);
        } else {
            line(fb, "", dim);
        }
        line(fb, "", dim);
        for help in HELP {
            line(fb, help, dim);
        }
        line(fb, "", dim);
        if let Some(status) = hud.status {
            line(fb, status, label);
            line(fb, "", dim);
        }
        for entry in hud.leaderboard {
            line(fb, entry, value);
        }
    }
}

fn tile_color(kind: TileKind) -> Rgb {
    match kind {
        TileKind::Red => Rgb::new(220, 70, 70),
        TileKind::Green => Rgb::new(90, 200, 110),
        TileKind::Blue => Rgb::new(80, 130, 230),
        TileKind::Gold => Rgb::new(240, 210, 80),
        TileKind::Violet => Rgb::new(180, 110, 220),
        TileKind::Amber => Rgb::new(255, 150, 40),
    }
}

fn special_glyph(kind: SpecialKind) -> char {
    match kind {
        SpecialKind::Bomb => '*',
        SpecialKind::LineH => '=',
        SpecialKind::LineV => '|',
        SpecialKind::LineBoth => '+',
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }
    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_centered(fb: &mut FrameBuffer, geo: &GridGeometry, text: &str) {
    let len = text.chars().count() as u16;
    let x = geo.origin_col + geo.width().saturating_sub(len) / 2;
    let y = geo.origin_row + geo.height() / 2;
    fb.put_str(x, y, text, CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold());
}
