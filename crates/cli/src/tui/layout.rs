//! Terminal geometry for the interactive grid.
//!
//! Maps terminal cells to grid cells (hit-testing) and to the layout units
//! the tooltip engine works in. One terminal cell counts as 8×16 units.

use duudl_core::CellKey;
use duudl_grid::edit::{CellPart, HitTarget};
use duudl_grid::measure::{ElementMetrics, FontMetrics};
use duudl_grid::render::RenderedGrid;
use duudl_grid::{Point, Rect, Size};

use crate::util;

pub const UNIT_W: f32 = 8.0;
pub const UNIT_H: f32 = 16.0;

pub const FONT: FontMetrics = FontMetrics { char_width: UNIT_W, line_height: UNIT_H };

/// Terminal position (column, row), zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermPos {
    pub col: u16,
    pub row: u16,
}

impl TermPos {
    pub fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }

    /// Center of the terminal cell in layout units.
    pub fn to_point(self) -> Point {
        Point::new(
            self.col as f32 * UNIT_W + UNIT_W / 2.0,
            self.row as f32 * UNIT_H + UNIT_H / 2.0,
        )
    }
}

pub fn viewport(width: u16, height: u16) -> Size {
    Size::new(width as f32 * UNIT_W, height as f32 * UNIT_H)
}

/// Where the grid sits on screen.
///
/// Row 0 of the grid area is the day header; each participant then takes
/// `cell_lines` rows. Each day column is `column_width` wide: text, then
/// the edit affordance column, then a one-column gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub name_width: u16,
    pub column_width: u16,
    pub cell_lines: u16,
    pub first_day: usize,
    pub first_row: usize,
}

impl GridLayout {
    /// Text columns inside a cell.
    pub fn text_width(&self) -> u16 {
        self.column_width.saturating_sub(2).max(1)
    }

    /// Day columns that fit.
    pub fn visible_days(&self) -> usize {
        let avail = self.width.saturating_sub(self.name_width);
        (avail / self.column_width.max(1)) as usize
    }

    /// Participant rows that fit under the header.
    pub fn visible_rows(&self) -> usize {
        (self.height.saturating_sub(1) / self.cell_lines.max(1)) as usize
    }

    pub fn contains(&self, pos: TermPos) -> bool {
        pos.col >= self.x && pos.col < self.x + self.width && pos.row >= self.y && pos.row < self.y + self.height
    }

    /// Screen rect of a cell given absolute row/day indices.
    pub fn cell_area(&self, row: usize, day: usize) -> Option<(u16, u16)> {
        if row < self.first_row || day < self.first_day {
            return None;
        }
        let (r, d) = (row - self.first_row, day - self.first_day);
        if r >= self.visible_rows() || d >= self.visible_days() {
            return None;
        }
        let col = self.x + self.name_width + d as u16 * self.column_width;
        let line = self.y + 1 + r as u16 * self.cell_lines;
        Some((col, line))
    }

    /// Cell rect in layout units (text area plus affordance).
    pub fn cell_rect(&self, row: usize, day: usize) -> Option<Rect> {
        let (col, line) = self.cell_area(row, day)?;
        Some(Rect::new(
            col as f32 * UNIT_W,
            line as f32 * UNIT_H,
            (self.column_width - 1) as f32 * UNIT_W,
            self.cell_lines as f32 * UNIT_H,
        ))
    }

    /// Absolute (row, day) index under `pos`, and the column offset inside the cell.
    fn locate(&self, pos: TermPos) -> Option<(usize, usize, u16)> {
        if !self.contains(pos) || pos.row == self.y || pos.col < self.x + self.name_width {
            return None;
        }
        let rel_col = pos.col - self.x - self.name_width;
        let rel_row = pos.row - self.y - 1;
        let day = self.first_day + (rel_col / self.column_width) as usize;
        let row = self.first_row + (rel_row / self.cell_lines.max(1)) as usize;
        Some((row, day, rel_col % self.column_width))
    }

    /// Interaction target under `pos`.
    pub fn hit(&self, grid: &RenderedGrid, pos: TermPos) -> HitTarget {
        if !self.contains(pos) {
            return HitTarget::OutsideGrid;
        }
        let Some((row, day, offset)) = self.locate(pos) else {
            return HitTarget::GridChrome;
        };
        let Some(cell) = grid.rows.get(row).and_then(|r| r.cells.get(day)) else {
            return HitTarget::GridChrome;
        };
        if offset == self.column_width - 1 {
            return HitTarget::GridChrome;
        }
        let part = if cell.editing {
            CellPart::InlineEditor
        } else if cell.editable && offset == self.column_width - 2 {
            CellPart::EditAffordance
        } else {
            CellPart::Body
        };
        HitTarget::cell(&cell.key, part)
    }

    /// Cell key under `pos`, if any.
    pub fn key_at(&self, grid: &RenderedGrid, pos: TermPos) -> Option<CellKey> {
        self.hit(grid, pos).key()
    }

    /// What a browser would report for a cell showing `text`.
    ///
    /// Single-line cells overflow horizontally, so their scroll width is the
    /// text width. Multi-line cells are line-clamped: scroll extents match
    /// the visible box and only measuring the text can tell.
    pub fn element_metrics(&self, text: &str) -> ElementMetrics {
        let content_width = self.text_width() as f32 * UNIT_W;
        let clamped_height = self.cell_lines as f32 * UNIT_H;
        if self.cell_lines <= 1 {
            ElementMetrics {
                scroll_width: util::display_width(text.trim()) as f32 * UNIT_W,
                client_width: content_width,
                scroll_height: clamped_height,
                client_height: clamped_height,
                content_width,
                clamped_height,
                line_clamp: None,
                font: FONT,
            }
        } else {
            ElementMetrics {
                scroll_width: content_width,
                client_width: content_width,
                scroll_height: clamped_height,
                client_height: clamped_height,
                content_width,
                clamped_height,
                line_clamp: Some(self.cell_lines),
                font: FONT,
            }
        }
    }

    /// Absolute (row, day) of a key in the rendered grid.
    pub fn index_of(grid: &RenderedGrid, key: &CellKey) -> Option<(usize, usize)> {
        let row = grid.rows.iter().position(|r| r.participant == key.participant)?;
        let day = grid.header.iter().position(|h| h.day == key.day)?;
        Some((row, day))
    }
}
