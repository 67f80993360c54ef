/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. `begin_frame` clears the `front` buffer (array of Cell)
///   2. The session's draw pass stamps sprites through `SpriteRenderer`
///   3. `draw_hud` adds the status bar, overlay and help line
///   4. `present` compares each cell with `back` (previous frame) and
///      only emits terminal commands for cells that changed, batched
///      with `queue!` and flushed once
///   5. Swap front/back
///
/// World pixels map onto terminal cells at half a tile per column and a
/// full tile per row, so a 40x32 tile is two columns wide.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::Vec2;
use crate::domain::tile::{TILE_HEIGHT, TILE_WIDTH};
use crate::sim::ports::{AssetHandle, SpriteRenderer};
use crate::sim::session::{Hud, Overlay};
use super::assets::{Anchor, Art, Catalog};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const CELL_PX_W: f32 = TILE_WIDTH as f32 / 2.0;
const CELL_PX_H: f32 = TILE_HEIGHT as f32;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TIMER_FG: Color = Color::Yellow;
const WARNING_FG: Color = Color::Red;

/// Top-left map cell covered by `art` drawn at world/screen `position`.
fn art_origin(art: &Art, position: Vec2) -> (i32, i32) {
    let w = art.width() as i32;
    let h = art.height() as i32;
    let col = (position.x / CELL_PX_W).floor() as i32;
    match art.anchor {
        Anchor::TopLeft => (col, (position.y / CELL_PX_H).floor() as i32),
        Anchor::Center => (col - w / 2, (position.y / CELL_PX_H).floor() as i32 - h / 2),
        Anchor::BottomCenter => (col - w / 2, (position.y / CELL_PX_H).ceil() as i32 - h),
    }
}

fn mirror_char(c: char) -> char {
    match c {
        '/' => '\\',
        '\\' => '/',
        '<' => '>',
        '>' => '<',
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        other => other,
    }
}

fn mirror_row(row: &str) -> String {
    row.chars().rev().map(mirror_char).collect()
}

// ── Renderer ──

pub struct Renderer<'a> {
    catalog: &'a Catalog,
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Map viewport in cells.
    map_cols: usize,
    map_rows: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Renderer {
            catalog,
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            map_cols: 0,
            map_rows: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    /// Start a frame. `viewport_width` is in world pixels, `level_rows`
    /// is the level height in tiles.
    pub fn begin_frame(&mut self, viewport_width: f32, level_rows: usize) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.layout(viewport_width, level_rows);
        self.front.clear();
        Ok(())
    }

    fn layout(&mut self, viewport_width: f32, level_rows: usize) {
        let reserved_rows = MAP_ROW + 2; // HUD + gap + help
        let wanted_cols = (viewport_width / CELL_PX_W).ceil() as usize;
        self.map_cols = wanted_cols.min(self.term_w);
        self.map_rows = level_rows.min(self.term_h.saturating_sub(reserved_rows));
    }

    /// Stamp `art` into the map area; spaces are transparent and cells
    /// outside the viewport are clipped.
    fn stamp(&mut self, art: &Art, position: Vec2, frame: usize, flip: bool) {
        let (col0, row0) = art_origin(art, position);
        for (dy, row) in art.frame(frame).iter().enumerate() {
            let row: String = if flip { mirror_row(row) } else { row.to_string() };
            let y = row0 + dy as i32;
            if y < 0 || y as usize >= self.map_rows { continue; }
            for (dx, ch) in row.chars().enumerate() {
                let x = col0 + dx as i32;
                if ch == ' ' || x < 0 || x as usize >= self.map_cols { continue; }
                let (x, y) = (x as usize, MAP_ROW + y as usize);
                let bg = art.bg.unwrap_or(self.front.get(x, y).bg);
                self.front.set(x, y, Cell::new(ch, art.fg, bg));
            }
        }
    }

    // ── HUD ──

    pub fn draw_hud(&mut self, hud: &Hud) {
        let secs = hud.time_remaining.as_secs();
        let time = format!("TIME {:02}:{:02}", secs / 60, secs % 60);
        let time_fg = if hud.warning { WARNING_FG } else { TIMER_FG };
        let name = format!(" {}  ", hud.level_name);
        let score = format!("  SCORE {}", hud.score);

        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &name, Color::White, HUD_BG);
        let time_x = name.chars().count();
        self.front.put_str(time_x, HUD_ROW, &time, time_fg, HUD_BG);
        self.front.put_str(time_x + time.chars().count(), HUD_ROW, &score, Color::White, HUD_BG);

        if let Some(overlay) = hud.overlay {
            self.draw_overlay(overlay);
        }

        let help_row = MAP_ROW + self.map_rows + 1;
        if help_row < self.front.height {
            let help = " ←/→ A/D:Run  Space/W/↑:Jump  X/J:Attack  Enter:Continue  Esc:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Cell::BASE_BG);
        }
    }

    fn draw_overlay(&mut self, overlay: Overlay) {
        let (text, bg) = match overlay {
            Overlay::YouWin => ("  YOU WIN!  Press Enter  ", Color::Rgb { r: 30, g: 140, b: 60 }),
            Overlay::TimeUp => ("  TIME UP  Press Enter  ", Color::Rgb { r: 200, g: 140, b: 30 }),
            Overlay::YouDied => ("  YOU DIED  Press Enter  ", Color::Rgb { r: 170, g: 30, b: 30 }),
        };
        let len = text.chars().count();
        let x = self.map_cols.saturating_sub(len) / 2;
        let y = MAP_ROW + self.map_rows / 2;
        self.front.put_str(x, y, text, Color::White, bg);
    }

    // ── Diff flush: only write changed cells ──

    pub fn present(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at start of frame, never ResetColor
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

impl SpriteRenderer for Renderer<'_> {
    fn draw_sprite(&mut self, sprite: AssetHandle, position: Vec2, frame: usize, flip: bool) {
        if let Some(art) = self.catalog.art(sprite) {
            self.stamp(&art, position, frame, flip);
        }
    }
}
