/// Drawing surface: the only thing the renderer talks to.
///
/// The renderer issues immediate-mode calls in logical units; [`CellCanvas`]
/// rasterises them onto a grid of terminal cells and [`CellCanvas::present`]
/// writes the grid out with crossterm.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `self` drawn over `under` at opacity `alpha`.
    pub fn over(self, under: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| (top as f32 * a + bottom as f32 * (1.0 - a)).round() as u8;
        Rgb(mix(self.0, under.0), mix(self.1, under.1), mix(self.2, under.2))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Color {
        Color::Rgb { r: c.0, g: c.1, b: c.2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Immediate-mode 2D drawing calls.
pub trait Surface {
    /// Opacity applied to every following call until changed.
    fn set_alpha(&mut self, alpha: f32);
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb);
    fn fill_polygon(&mut self, points: &[(f32, f32)], fill: Rgb, outline: Option<Rgb>);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb);
    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgb, align: Align);
}

// ── Cell raster ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

const BLANK: Cell = Cell {
    ch: ' ',
    fg: Rgb(255, 255, 255),
    bg: Rgb(0, 0, 0),
};

/// A `cols × rows` grid standing in for a `width × height` logical canvas.
pub struct CellCanvas {
    width: f32,
    height: f32,
    cols: u16,
    rows: u16,
    alpha: f32,
    cells: Vec<Cell>,
}

impl CellCanvas {
    pub fn new(width: f32, height: f32, cols: u16, rows: u16) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        CellCanvas {
            width,
            height,
            cols,
            rows,
            alpha: 1.0,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    /// Match a new terminal size, discarding the current contents.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = CellCanvas::new(self.width, self.height, cols, rows);
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        if col < self.cols && row < self.rows {
            self.cells.get(row as usize * self.cols as usize + col as usize)
        } else {
            None
        }
    }

    /// The characters of one row, for tests and debugging.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.cols)
            .filter_map(|c| self.cell(c, row).map(|cell| cell.ch))
            .collect()
    }

    /// Write the whole grid to the terminal.
    pub fn present<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut last: Option<(Rgb, Rgb)> = None;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let mut run = String::new();
            for col in 0..self.cols {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if last != Some((cell.fg, cell.bg)) {
                    if !run.is_empty() {
                        out.queue(Print(std::mem::take(&mut run)))?;
                    }
                    out.queue(style::SetForegroundColor(cell.fg.into()))?;
                    out.queue(style::SetBackgroundColor(cell.bg.into()))?;
                    last = Some((cell.fg, cell.bg));
                }
                run.push(cell.ch);
            }
            out.queue(Print(run))?;
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }

    // ── Coordinate mapping ──────────────────────────────────────────────────

    fn col_of(&self, x: f32) -> i32 {
        (x / self.width * self.cols as f32).floor() as i32
    }

    fn row_of(&self, y: f32) -> i32 {
        (y / self.height * self.rows as f32).floor() as i32
    }

    /// Logical centre of a cell.
    fn center_of(&self, col: i32, row: i32) -> (f32, f32) {
        (
            (col as f32 + 0.5) * self.width / self.cols as f32,
            (row as f32 + 0.5) * self.height / self.rows as f32,
        )
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        self.cells
            .get_mut(row as usize * self.cols as usize + col as usize)
    }

    fn plot(&mut self, col: i32, row: i32, ch: char, color: Rgb) {
        let alpha = self.alpha;
        if let Some(cell) = self.cell_mut(col, row) {
            cell.fg = color.over(cell.bg, alpha);
            cell.ch = ch;
        }
    }

    fn shade(&mut self, col: i32, row: i32, color: Rgb) {
        let alpha = self.alpha;
        if let Some(cell) = self.cell_mut(col, row) {
            cell.bg = color.over(cell.bg, alpha);
            if alpha >= 1.0 {
                cell.ch = ' ';
            }
        }
    }

    /// Plot every cell whose centre satisfies `inside`; when the shape is
    /// smaller than a cell, plot the cell holding `anchor` instead.
    fn fill_where<F>(
        &mut self,
        bounds: (f32, f32, f32, f32),
        anchor: (f32, f32),
        ch: char,
        color: Rgb,
        inside: F,
    ) where
        F: Fn(f32, f32) -> bool,
    {
        let (x0, y0, x1, y1) = bounds;
        let mut hit = false;
        for row in self.row_of(y0)..=self.row_of(y1) {
            for col in self.col_of(x0)..=self.col_of(x1) {
                let (cx, cy) = self.center_of(col, row);
                if inside(cx, cy) {
                    self.plot(col, row, ch, color);
                    hit = true;
                }
            }
        }
        if !hit {
            let (col, row) = (self.col_of(anchor.0), self.row_of(anchor.1));
            self.plot(col, row, ch, color);
        }
    }
}

/// Even-odd point-in-polygon test.
fn contains(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl Surface for CellCanvas {
    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn clear(&mut self, color: Rgb) {
        for cell in &mut self.cells {
            *cell = Cell { bg: color, ..BLANK };
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (c0, r0) = (self.col_of(x), self.row_of(y));
        let c1 = self.col_of(x + w).max(c0 + 1);
        let r1 = self.row_of(y + h).max(r0 + 1);
        for row in r0..r1 {
            for col in c0..c1 {
                self.shade(col, row, color);
            }
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let (c0, r0) = (self.col_of(x), self.row_of(y));
        let c1 = self.col_of(x + w).max(c0 + 1);
        let r1 = self.row_of(y + h).max(r0 + 1);
        for col in c0 + 1..c1 {
            self.plot(col, r0, '─', color);
            self.plot(col, r1, '─', color);
        }
        for row in r0 + 1..r1 {
            self.plot(c0, row, '│', color);
            self.plot(c1, row, '│', color);
        }
        self.plot(c0, r0, '┌', color);
        self.plot(c1, r0, '┐', color);
        self.plot(c0, r1, '└', color);
        self.plot(c1, r1, '┘', color);
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let (c0, r0) = (self.col_of(x0), self.row_of(y0));
        let (c1, r1) = (self.col_of(x1), self.row_of(y1));
        let steps = (c1 - c0).abs().max((r1 - r0).abs()).max(1);
        let ch = if c0 == c1 {
            '│'
        } else if r0 == r1 {
            '─'
        } else {
            '·'
        };
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let col = (c0 as f32 + (c1 - c0) as f32 * t).round() as i32;
            let row = (r0 as f32 + (r1 - r0) as f32 * t).round() as i32;
            self.plot(col, row, ch, color);
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], fill: Rgb, outline: Option<Rgb>) {
        if points.is_empty() {
            return;
        }
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for &(x, y) in points {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        let n = points.len() as f32;
        let anchor = (
            points.iter().map(|p| p.0).sum::<f32>() / n,
            points.iter().map(|p| p.1).sum::<f32>() / n,
        );
        self.fill_where((x0, y0, x1, y1), anchor, '█', fill, |x, y| contains(points, x, y));
        if let Some(edge) = outline {
            // Vertices only; full edges would swallow small shapes.
            for &(vx, vy) in points {
                let (col, row) = (self.col_of(vx), self.row_of(vy));
                self.plot(col, row, '▪', edge);
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb) {
        let r2 = radius * radius;
        self.fill_where(
            (x - radius, y - radius, x + radius, y + radius),
            (x, y),
            '●',
            color,
            |cx, cy| (cx - x) * (cx - x) + (cy - y) * (cy - y) <= r2,
        );
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgb, align: Align) {
        let len = text.chars().count() as i32;
        let start = match align {
            Align::Left => self.col_of(x),
            Align::Center => self.col_of(x) - len / 2,
        };
        let row = self.row_of(y);
        for (i, ch) in text.chars().enumerate() {
            self.plot(start + i as i32, row, ch, color);
        }
    }
}
