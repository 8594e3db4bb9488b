//! Selection state machine: anchor/extend in character, word, or line mode,
//! and extraction of the selected text as a plain string.

use vtgrid::Screen;

/// A position addressed the same way a [`Screen`] addresses its rows: a
/// delta into history-plus-viewport space. `0` is the oldest row still held
/// by scrollback; rows at or above `scrollback.len()` are in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pos {
    pub line: u64,
    pub col: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Character,
    Word,
    Line,
    /// Rectangular selection: the column range applies independently to
    /// every row in `[start.line, end.line]`, ignoring soft-wrap joins.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    anchor: Pos,
    head: Pos,
}

impl Range {
    fn ordered(self) -> (Pos, Pos) {
        if self.anchor <= self.head { (self.anchor, self.head) } else { (self.head, self.anchor) }
    }
}

/// Owns the selection anchor/head and extraction logic. Holds no reference
/// to the screen it was built against; every method that needs grid content
/// takes it as a parameter, since the selection must keep working across a
/// screen resize or a scrollback-eviction event without going stale.
#[derive(Debug, Default)]
pub struct Selection {
    range: Option<Range>,
    mode: Option<SelectionMode>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, at: Pos, mode: SelectionMode) {
        self.range = Some(Range { anchor: at, head: at });
        self.mode = Some(mode);
    }

    pub fn extend(&mut self, to: Pos) {
        if let Some(range) = &mut self.range {
            range.head = to;
        }
    }

    pub fn clear(&mut self) {
        self.range = None;
        self.mode = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.range.is_some()
    }

    #[must_use]
    pub fn mode(&self) -> Option<SelectionMode> {
        self.mode
    }

    /// The selection's bounds, widened to whole words/lines per `mode`, or
    /// `None` if nothing is selected. `Word` mode consults `screen` (via
    /// `viewport_base`) to find where the word under each endpoint starts
    /// and ends; the other modes are pure arithmetic.
    #[must_use]
    pub fn bounds(
        &self,
        screen: &Screen,
        viewport_base: u64,
        word_class: &dyn Fn(char) -> u8,
    ) -> Option<(Pos, Pos)> {
        let range = self.range?;
        let (start, end) = range.ordered();
        match self.mode? {
            SelectionMode::Character | SelectionMode::Block => Some((start, end)),
            SelectionMode::Line => Some((
                Pos { line: start.line, col: 0 },
                Pos { line: end.line, col: screen.cols().saturating_sub(1) },
            )),
            SelectionMode::Word => {
                let widened_start = expand_word_left(screen, viewport_base, start, word_class);
                let widened_end = expand_word_right(screen, viewport_base, end, word_class);
                Some((widened_start, widened_end))
            }
        }
    }

    /// Extract the selected text from `screen`'s viewport (history rows not
    /// addressable through `Screen` directly are the caller's
    /// responsibility to splice in via a combined line source).
    #[must_use]
    pub fn extract(&self, screen: &Screen, viewport_base: u64, word_class: &dyn Fn(char) -> u8) -> String {
        let Some((start, end)) = self.bounds(screen, viewport_base, word_class) else {
            return String::new();
        };
        let block = self.mode == Some(SelectionMode::Block);
        let mut out = String::new();
        for line in start.line..=end.line {
            let Some(row_index) = line.checked_sub(viewport_base) else { continue };
            let Some(row) = screen.row(row_index as u16) else { break };
            let (from, to) = if block {
                (start.col, end.col + 1)
            } else {
                let from = if line == start.line { start.col } else { 0 };
                let to = if line == end.line { end.col + 1 } else { row.cols() };
                (from, to)
            };
            for cell in &row.cells()[from as usize..(to as usize).min(row.cells().len())] {
                if !matches!(cell.width, vtgrid::CellWidth::WideTrail) && cell.ch != '\0' {
                    out.push(cell.ch);
                    if let Some(handle) = cell.grapheme {
                        out.extend(screen.grapheme(handle));
                    }
                }
            }
            if line != end.line && (block || !row.wrapped) {
                out.push('\n');
            }
        }
        out
    }

    /// Point-in-selection test, honoring block mode's independent column
    /// range per row.
    #[must_use]
    pub fn cell_is_selected(&self, screen: &Screen, viewport_base: u64, pos: Pos, word_class: &dyn Fn(char) -> u8) -> bool {
        let Some((start, end)) = self.bounds(screen, viewport_base, word_class) else { return false };
        if pos.line < start.line || pos.line > end.line {
            return false;
        }
        if self.mode == Some(SelectionMode::Block) {
            return pos.col >= start.col && pos.col <= end.col;
        }
        if pos.line == start.line && pos.col < start.col {
            return false;
        }
        if pos.line == end.line && pos.col > end.col {
            return false;
        }
        true
    }
}

/// A cell's word class, or `None` if it is blank (never part of a word).
fn class_at(screen: &Screen, viewport_base: u64, pos: Pos, word_class: &dyn Fn(char) -> u8) -> Option<u8> {
    let row_index = pos.line.checked_sub(viewport_base)?;
    let row = screen.row(u16::try_from(row_index).ok()?)?;
    let cell = row.cell(pos.col)?;
    if cell.ch == '\0' || matches!(cell.width, vtgrid::CellWidth::WideTrail) {
        return None;
    }
    Some(word_class(cell.ch))
}

fn expand_word_left(screen: &Screen, viewport_base: u64, mut pos: Pos, word_class: &dyn Fn(char) -> u8) -> Pos {
    let Some(class) = class_at(screen, viewport_base, pos, word_class) else { return pos };
    loop {
        if pos.col > 0 {
            let candidate = Pos { line: pos.line, col: pos.col - 1 };
            if class_at(screen, viewport_base, candidate, word_class) == Some(class) {
                pos = candidate;
                continue;
            }
        } else if pos.line > 0 {
            let Some(row_index) = (pos.line - 1).checked_sub(viewport_base) else { break };
            let Some(prev_row) = screen.row(u16::try_from(row_index).ok().unwrap_or(u16::MAX)) else { break };
            if prev_row.wrapped {
                let candidate = Pos { line: pos.line - 1, col: prev_row.cols().saturating_sub(1) };
                if class_at(screen, viewport_base, candidate, word_class) == Some(class) {
                    pos = candidate;
                    continue;
                }
            }
        }
        break;
    }
    pos
}

fn expand_word_right(screen: &Screen, viewport_base: u64, mut pos: Pos, word_class: &dyn Fn(char) -> u8) -> Pos {
    let Some(class) = class_at(screen, viewport_base, pos, word_class) else { return pos };
    loop {
        let Some(row_index) = pos.line.checked_sub(viewport_base) else { break };
        let Some(row) = screen.row(u16::try_from(row_index).ok().unwrap_or(u16::MAX)) else { break };
        if pos.col + 1 < row.cols() {
            let candidate = Pos { line: pos.line, col: pos.col + 1 };
            if class_at(screen, viewport_base, candidate, word_class) == Some(class) {
                pos = candidate;
                continue;
            }
        } else if row.wrapped {
            let candidate = Pos { line: pos.line + 1, col: 0 };
            if class_at(screen, viewport_base, candidate, word_class) == Some(class) {
                pos = candidate;
                continue;
            }
        }
        break;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtgrid::Screen;

    #[test]
    fn extracts_a_single_line_range() {
        let mut screen = Screen::new(10, 3, 100);
        for ch in "hello".chars() {
            screen.insert_char(ch, 1, None);
        }
        let mut sel = Selection::new();
        sel.begin(Pos { line: 0, col: 0 }, SelectionMode::Character);
        sel.extend(Pos { line: 0, col: 4 });
        assert_eq!(sel.extract(&screen, 0, &|_| 0), "hello");
    }

    #[test]
    fn line_mode_widens_to_full_row() {
        let mut screen = Screen::new(10, 3, 100);
        for ch in "hi".chars() {
            screen.insert_char(ch, 1, None);
        }
        let mut sel = Selection::new();
        sel.begin(Pos { line: 0, col: 3 }, SelectionMode::Line);
        let (start, end) = sel.bounds(&screen, 0, &|_| 0).unwrap();
        assert_eq!(start.col, 0);
        assert_eq!(end.col, 9);
    }

    fn alnum_class(c: char) -> u8 {
        if c.is_alphanumeric() { 1 } else { 0 }
    }

    #[test]
    fn word_mode_expands_to_word_boundaries() {
        let mut screen = Screen::new(20, 3, 100);
        for ch in "foo bar baz".chars() {
            screen.insert_char(ch, 1, None);
        }
        let mut sel = Selection::new();
        // Click in the middle of "bar" (columns 4..=6).
        sel.begin(Pos { line: 0, col: 5 }, SelectionMode::Word);
        let (start, end) = sel.bounds(&screen, 0, &alnum_class).unwrap();
        assert_eq!((start.col, end.col), (4, 6));
        assert_eq!(sel.extract(&screen, 0, &alnum_class), "bar");
    }

    #[test]
    fn word_mode_crosses_a_soft_wrap() {
        let mut screen = Screen::new(4, 3, 100);
        for ch in "abcdef".chars() {
            screen.insert_char(ch, 1, None);
        }
        // Row 0 = "abcd" (wrapped), row 1 = "ef": one logical word "abcdef".
        let mut sel = Selection::new();
        sel.begin(Pos { line: 1, col: 0 }, SelectionMode::Word);
        let (start, end) = sel.bounds(&screen, 0, &alnum_class).unwrap();
        assert_eq!(start, Pos { line: 0, col: 0 });
        assert_eq!(end, Pos { line: 1, col: 1 });
    }

    #[test]
    fn block_mode_selects_independent_column_range_per_row() {
        let mut screen = Screen::new(10, 3, 100);
        for (row, text) in ["abcdef", "ghijkl"].iter().enumerate() {
            screen.cursor_to(row as u16, 0);
            for ch in text.chars() {
                screen.insert_char(ch, 1, None);
            }
        }
        let mut sel = Selection::new();
        sel.begin(Pos { line: 0, col: 1 }, SelectionMode::Block);
        sel.extend(Pos { line: 1, col: 3 });
        assert!(sel.cell_is_selected(&screen, 0, Pos { line: 0, col: 2 }, &|_| 0));
        assert!(!sel.cell_is_selected(&screen, 0, Pos { line: 0, col: 0 }, &|_| 0));
        assert_eq!(sel.extract(&screen, 0, &|_| 0), "bcd\nhij");
    }
}
