//! The visible grid: a fixed `rows x cols` viewport backed by a scrollback
//! [`Ring`], cursor tracking, and the handful of cursor-movement primitives
//! every CSI/ESC handler is built from.

use crate::cell::{Cell, CellWidth, GraphemeArena, Style};
use crate::ring::Ring;
use crate::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: u16,
    pub col: u16,
    /// The "xn" deferred-autowrap flag: set when a printed character landed
    /// exactly on the right margin. The *next* printable character is what
    /// triggers the wrap, not the one that filled the margin.
    pub pending_wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRegion {
    /// Inclusive, 0-based.
    pub top: u16,
    pub bottom: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct SavedCursor {
    pub cursor: Cursor,
    pub pen: Style,
    pub origin_mode: bool,
}

/// One screen buffer (primary or alternate). Owns its own scrollback; the
/// alternate screen's `Ring` is simply never grown past zero rows by policy
/// in `vtterm`, matching real terminals where switching to the alt screen
/// does not contribute to scrollback.
#[derive(Debug, Clone)]
pub struct Screen {
    viewport: Vec<Row>,
    scrollback: Ring,
    cols: u16,
    rows: u16,
    cursor: Cursor,
    scroll_region: ScrollRegion,
    pen: Style,
    origin_mode: bool,
    autowrap_mode: bool,
    insert_mode: bool,
    graphemes: GraphemeArena,
}

impl Screen {
    #[must_use]
    pub fn new(cols: u16, rows: u16, scrollback_capacity: usize) -> Self {
        let viewport = (0..rows).map(|_| Row::blank(cols, Style::default())).collect();
        Screen {
            viewport,
            scrollback: Ring::with_capacity(scrollback_capacity),
            cols,
            rows,
            cursor: Cursor::default(),
            scroll_region: ScrollRegion { top: 0, bottom: rows.saturating_sub(1) },
            pen: Style::default(),
            origin_mode: false,
            autowrap_mode: true,
            insert_mode: false,
            graphemes: GraphemeArena::new(),
        }
    }

    /// Resolve a cell's combining-mark tail, if it has one.
    #[must_use]
    pub fn grapheme(&self, handle: std::num::NonZeroU32) -> &[char] {
        self.graphemes.get(handle)
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn scroll_region(&self) -> ScrollRegion {
        self.scroll_region
    }

    #[must_use]
    pub fn pen(&self) -> Style {
        self.pen
    }

    pub fn set_pen(&mut self, pen: Style) {
        self.pen = pen;
    }

    #[must_use]
    pub fn autowrap_mode(&self) -> bool {
        self.autowrap_mode
    }

    pub fn set_autowrap_mode(&mut self, on: bool) {
        self.autowrap_mode = on;
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn set_insert_mode(&mut self, on: bool) {
        self.insert_mode = on;
    }

    #[must_use]
    pub fn origin_mode(&self) -> bool {
        self.origin_mode
    }

    pub fn set_origin_mode(&mut self, on: bool) {
        self.origin_mode = on;
        self.cursor.row = self.origin_row_base();
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
    }

    fn origin_row_base(&self) -> u16 {
        if self.origin_mode { self.scroll_region.top } else { 0 }
    }

    #[must_use]
    pub fn row(&self, index: u16) -> Option<&Row> {
        self.viewport.get(index as usize)
    }

    #[must_use]
    pub fn scrollback(&self) -> &Ring {
        &self.scrollback
    }

    #[must_use]
    pub fn save_cursor(&self) -> SavedCursor {
        SavedCursor { cursor: self.cursor, pen: self.pen, origin_mode: self.origin_mode }
    }

    pub fn restore_cursor(&mut self, saved: SavedCursor) {
        self.cursor = saved.cursor;
        self.pen = saved.pen;
        self.origin_mode = saved.origin_mode;
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.cursor.row = self.cursor.row.min(self.rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(self.cols.saturating_sub(1));
    }

    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let top = top.min(self.rows.saturating_sub(1));
        let bottom = bottom.min(self.rows.saturating_sub(1));
        if top < bottom {
            self.scroll_region = ScrollRegion { top, bottom };
        } else {
            self.scroll_region = ScrollRegion { top: 0, bottom: self.rows.saturating_sub(1) };
        }
        self.cursor.row = self.origin_row_base();
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
    }

    /// Move the cursor to an absolute position. `row`/`col` are 0-based and
    /// relative to the scroll region's top when origin mode is set.
    pub fn cursor_to(&mut self, row: u16, col: u16) {
        let row_base = self.origin_row_base();
        let row_limit = if self.origin_mode { self.scroll_region.bottom } else { self.rows.saturating_sub(1) };
        self.cursor.row = (row_base + row).min(row_limit);
        self.cursor.col = col.min(self.cols.saturating_sub(1));
        self.cursor.pending_wrap = false;
    }

    pub fn cursor_left(&mut self, n: u16) {
        self.cursor.col = self.cursor.col.saturating_sub(n);
        self.cursor.pending_wrap = false;
    }

    pub fn cursor_right(&mut self, n: u16) {
        self.cursor.col = (self.cursor.col + n).min(self.cols.saturating_sub(1));
        self.cursor.pending_wrap = false;
    }

    /// `CUU`-family: move up, clamped to the screen top. Unlike
    /// [`Screen::cursor_down`] this never scrolls.
    pub fn cursor_up(&mut self, n: u16) {
        self.cursor.row = self.cursor.row.saturating_sub(n);
        self.cursor.pending_wrap = false;
    }

    /// `CUD`/index-down semantics, including the asymmetric scroll-region
    /// rule: a cursor that starts *on* the bottom margin scrolls the region
    /// content up; a cursor below the bottom margin (possible when the
    /// region doesn't reach the screen bottom) instead walks freely down to
    /// the last screen row without ever scrolling.
    pub fn cursor_down(&mut self, n: u16) {
        for _ in 0..n {
            if self.cursor.row == self.scroll_region.bottom {
                self.scroll_up(1);
            } else if self.cursor.row < self.rows.saturating_sub(1) {
                self.cursor.row += 1;
            }
        }
        self.cursor.pending_wrap = false;
    }

    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
    }

    pub fn linefeed(&mut self) {
        self.cursor_down(1);
    }

    pub fn reverse_linefeed(&mut self) {
        if self.cursor.row == self.scroll_region.top {
            self.scroll_down(1);
        } else {
            self.cursor.row = self.cursor.row.saturating_sub(1);
        }
        self.cursor.pending_wrap = false;
    }

    /// Scroll the scroll region content up by `n` rows. Rows pushed off the
    /// top of a region anchored at the screen top are archived to
    /// scrollback; rows from any other region boundary are discarded, which
    /// matches how real terminals treat a `DECSTBM`-restricted scroll.
    pub fn scroll_up(&mut self, n: u16) {
        let top = self.scroll_region.top as usize;
        let bottom = self.scroll_region.bottom as usize;
        for _ in 0..n.min(self.scroll_region.bottom - self.scroll_region.top + 1) {
            if top == 0 {
                let evicted = self.viewport.remove(0);
                self.scrollback.push(evicted);
                self.viewport.insert(bottom, Row::blank(self.cols, self.pen));
            } else {
                let evicted = self.viewport.remove(top);
                drop(evicted);
                self.viewport.insert(bottom, Row::blank(self.cols, self.pen));
            }
        }
    }

    pub fn scroll_down(&mut self, n: u16) {
        let top = self.scroll_region.top as usize;
        let bottom = self.scroll_region.bottom as usize;
        for _ in 0..n.min(self.scroll_region.bottom - self.scroll_region.top + 1) {
            self.viewport.remove(bottom);
            self.viewport.insert(top, Row::blank(self.cols, self.pen));
        }
    }

    /// Print one grapheme's base scalar at the cursor, honoring insert mode,
    /// wide-character fragmentation, and the deferred-autowrap quirk.
    pub fn insert_char(&mut self, ch: char, width: u8, grapheme: Option<std::num::NonZeroU32>) {
        if width == 0 {
            self.apply_combining_mark(ch);
            return;
        }
        if self.cursor.pending_wrap {
            if let Some(row) = self.viewport.get_mut(self.cursor.row as usize) {
                row.wrapped = true;
            }
            self.carriage_return();
            self.cursor_down(1);
        }
        let col = self.cursor.col;
        let pen = self.pen;
        if self.insert_mode {
            if let Some(row) = self.viewport.get_mut(self.cursor.row as usize) {
                row.insert_blanks(col, u16::from(width), pen);
            }
        }
        if let Some(row) = self.viewport.get_mut(self.cursor.row as usize) {
            row.set(col, Cell { ch, style: pen, width: CellWidth::Narrow, grapheme });
            if width == 2 && col + 1 < self.cols {
                row.set(col + 1, Cell { ch: '\0', style: pen, width: CellWidth::WideTrail, grapheme: None });
            }
            if let Some(lead) = row.cell_mut(col) {
                if width == 2 {
                    lead.width = CellWidth::WideLead;
                }
            }
        }

        let advance = u16::from(width);
        if col + advance >= self.cols {
            self.cursor.col = self.cols.saturating_sub(1);
            self.cursor.pending_wrap = self.autowrap_mode;
        } else {
            self.cursor.col = col + advance;
            self.cursor.pending_wrap = false;
        }
    }

    /// Fold a zero-width combining scalar onto the cell that holds the
    /// grapheme base it decorates: the one immediately to the cursor's left,
    /// or (when the cursor sits in column 0 after a soft wrap) the last cell
    /// of the previous row. Dropped silently if no base cell is found.
    fn apply_combining_mark(&mut self, mark: char) {
        let mut row = self.cursor.row;
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if self.cursor.col == 0 {
            if row == 0 {
                return;
            }
            row -= 1;
            if !self.viewport.get(row as usize).is_some_and(|r| r.wrapped) {
                return;
            }
            self.cols.saturating_sub(1)
        } else {
            self.cursor.col - 1
        };
        loop {
            let Some(r) = self.viewport.get(row as usize) else { return };
            match r.cell(col).map(|c| c.width) {
                Some(CellWidth::WideTrail) if col > 0 => col -= 1,
                Some(_) => break,
                _ => return,
            }
        }
        let Some(r) = self.viewport.get_mut(row as usize) else { return };
        let Some(cell) = r.cell_mut(col) else { return };
        if cell.ch == '\0' {
            return;
        }
        cell.grapheme = Some(self.graphemes.push_mark(cell.grapheme, mark));
    }

    /// `IL`: insert `n` blank lines at the cursor row, pushing rows at or
    /// below it down within the scroll region. Rows shifted off the
    /// region's bottom are discarded (never archived to scrollback), unlike
    /// `SU`/`SD` which always act on the whole region regardless of cursor
    /// position.
    pub fn insert_lines(&mut self, n: u16) {
        if self.cursor.row < self.scroll_region.top || self.cursor.row > self.scroll_region.bottom {
            return;
        }
        let at = self.cursor.row as usize;
        let bottom = self.scroll_region.bottom as usize;
        for _ in 0..n.min(self.scroll_region.bottom - self.cursor.row + 1) {
            self.viewport.remove(bottom);
            self.viewport.insert(at, Row::blank(self.cols, self.pen));
        }
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
    }

    /// `DL`: delete `n` lines at the cursor row, pulling rows below it up
    /// within the scroll region and filling the vacated bottom with blanks.
    pub fn delete_lines(&mut self, n: u16) {
        if self.cursor.row < self.scroll_region.top || self.cursor.row > self.scroll_region.bottom {
            return;
        }
        let at = self.cursor.row as usize;
        let bottom = self.scroll_region.bottom as usize;
        for _ in 0..n.min(self.scroll_region.bottom - self.cursor.row + 1) {
            self.viewport.remove(at);
            self.viewport.insert(bottom, Row::blank(self.cols, self.pen));
        }
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
    }

    /// `ECH`: erase `n` characters starting at the cursor, without moving it
    /// or touching any other row.
    pub fn erase_chars(&mut self, n: u16) {
        let pen = self.pen;
        let (row, col) = (self.cursor.row, self.cursor.col);
        if let Some(r) = self.viewport.get_mut(row as usize) {
            r.erase_range(col, col.saturating_add(n), pen);
        }
    }

    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let pen = self.pen;
        if let Some(row) = self.viewport.get_mut(self.cursor.row as usize) {
            match mode {
                EraseMode::ToEnd => row.erase_range(self.cursor.col, self.cols, pen),
                EraseMode::ToStart => row.erase_range(0, self.cursor.col + 1, pen),
                EraseMode::All => row.erase_range(0, self.cols, pen),
            }
        }
    }

    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let pen = self.pen;
        match mode {
            EraseMode::ToEnd => {
                self.erase_in_line(EraseMode::ToEnd);
                for r in (self.cursor.row as usize + 1)..self.viewport.len() {
                    self.viewport[r] = Row::blank(self.cols, pen);
                }
            }
            EraseMode::ToStart => {
                self.erase_in_line(EraseMode::ToStart);
                for r in &mut self.viewport[..self.cursor.row as usize] {
                    *r = Row::blank(self.cols, pen);
                }
            }
            EraseMode::All => {
                for r in &mut self.viewport {
                    *r = Row::blank(self.cols, pen);
                }
            }
        }
    }

    /// DECALN: fill every viewport cell with 'E', reset the scroll region to
    /// the full screen, and home the cursor, per the VT100 screen-alignment
    /// test pattern.
    pub fn fill_alignment_pattern(&mut self) {
        for row in &mut self.viewport {
            *row = Row::blank(self.cols, Style::default());
            for col in 0..self.cols {
                row.set(col, Cell { ch: 'E', width: CellWidth::Narrow, style: Style::default(), grapheme: None });
            }
        }
        self.scroll_region = ScrollRegion { top: 0, bottom: self.rows.saturating_sub(1) };
        self.cursor = Cursor::default();
    }

    /// Resize the viewport in place. Rows are truncated/extended on the
    /// bottom and blank-filled; existing content is never reflowed, matching
    /// spec.md's "Screen" scope (line reflow is explicitly not part of this
    /// core).
    pub fn resize(&mut self, cols: u16, rows: u16) {
        for row in &mut self.viewport {
            row.resize(cols, self.pen);
        }
        if rows as usize > self.viewport.len() {
            self.viewport.resize_with(rows as usize, || Row::blank(cols, self.pen));
        } else {
            self.viewport.truncate(rows as usize);
        }
        self.cols = cols;
        self.rows = rows;
        self.scroll_region = ScrollRegion { top: 0, bottom: rows.saturating_sub(1) };
        self.clamp_cursor();
    }

    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.scrollback.set_capacity(capacity);
    }

    /// Mutate one viewport row directly. For the `ICH`/`DCH` family, which
    /// edit a row's cells without moving the cursor or touching any other
    /// row, going through a screen-level op would add nothing.
    pub fn with_row_mut(&mut self, row: u16, f: impl FnOnce(&mut Row)) {
        if let Some(r) = self.viewport.get_mut(row as usize) {
            f(r);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    ToEnd,
    ToStart,
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_char_sets_pending_wrap_at_right_margin() {
        let mut s = Screen::new(4, 3, 100);
        for ch in "abcd".chars() {
            s.insert_char(ch, 1, None);
        }
        assert_eq!(s.cursor().col, 3);
        assert!(s.cursor().pending_wrap);
        // The wrap only takes effect on the *next* printable character.
        s.insert_char('e', 1, None);
        assert_eq!(s.cursor().row, 1);
        assert_eq!(s.cursor().col, 1);
    }

    #[test]
    fn cursor_down_scrolls_only_at_region_bottom() {
        let mut s = Screen::new(4, 5, 100);
        s.set_scroll_region(0, 2);
        s.cursor_to(2, 0);
        s.cursor_down(1);
        assert_eq!(s.scrollback().len(), 1);
        assert_eq!(s.cursor().row, 2);
    }

    #[test]
    fn cursor_down_below_region_does_not_scroll() {
        let mut s = Screen::new(4, 5, 100);
        s.set_scroll_region(0, 2);
        s.cursor_to(0, 0);
        s.cursor.row = 3;
        s.cursor_down(1);
        assert_eq!(s.scrollback().len(), 0);
        assert_eq!(s.cursor().row, 4);
    }

    #[test]
    fn combining_mark_folds_onto_previous_base_cell() {
        let mut s = Screen::new(10, 3, 10);
        s.insert_char('a', 1, None);
        s.insert_char('\u{0301}', 0, None);
        assert_eq!(s.cursor().col, 1);
        let cell = s.row(0).unwrap().cell(0).unwrap();
        assert_eq!(cell.ch, 'a');
        let handle = cell.grapheme.expect("combining mark should be recorded");
        assert_eq!(s.grapheme(handle), &['\u{0301}']);
    }

    #[test]
    fn insert_lines_pushes_rows_down_within_region() {
        let mut s = Screen::new(4, 4, 10);
        for (i, ch) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            s.cursor_to(i as u16, 0);
            s.insert_char(ch, 1, None);
        }
        s.cursor_to(1, 0);
        s.insert_lines(1);
        assert!(s.row(1).unwrap().is_blank());
        assert_eq!(s.row(2).unwrap().cell(0).unwrap().ch, 'b');
        assert_eq!(s.scrollback().len(), 0);
    }

    #[test]
    fn delete_lines_pulls_rows_up_within_region() {
        let mut s = Screen::new(4, 4, 10);
        for (i, ch) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            s.cursor_to(i as u16, 0);
            s.insert_char(ch, 1, None);
        }
        s.cursor_to(1, 0);
        s.delete_lines(1);
        assert_eq!(s.row(1).unwrap().cell(0).unwrap().ch, 'c');
        assert!(s.row(3).unwrap().is_blank());
    }

    #[test]
    fn scroll_up_outside_top_region_discards_row() {
        let mut s = Screen::new(4, 5, 100);
        s.set_scroll_region(1, 3);
        s.scroll_up(1);
        assert_eq!(s.scrollback().len(), 0);
    }
}
