//! Pattern search over "extended lines": a soft-wrapped paragraph is joined
//! into a single string before matching, so a pattern that happens to
//! straddle a wrap point is still found.

use regex::Regex;
use vtgrid::Row;

/// A single logical line in delta-address space, already joined across
/// soft-wrap continuations, with a byte-offset-to-column map so regex match
/// positions can be translated back onto the grid.
pub struct ExtendedLine {
    pub first_line: u64,
    pub last_line: u64,
    text: String,
    /// `offsets[i]` is the `(line, col)` the i-th *character* of `text` came
    /// from.
    offsets: Vec<(u64, u16)>,
}

impl ExtendedLine {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Translate a character offset in `text()` to a grid position.
    #[must_use]
    pub fn position_at(&self, char_offset: usize) -> Option<(u64, u16)> {
        self.offsets.get(char_offset).copied()
    }
}

/// Join consecutive rows (oldest first) into extended lines, splitting a new
/// extended line every time a row's `wrapped` flag is false (i.e. it ends a
/// logical line rather than continuing into the next).
#[must_use]
pub fn build_extended_lines<'a>(rows: impl Iterator<Item = (u64, &'a Row)>) -> Vec<ExtendedLine> {
    let mut lines = Vec::new();
    let mut text = String::new();
    let mut offsets = Vec::new();
    let mut first_line = None;
    let mut last_line = 0;

    for (delta, row) in rows {
        if first_line.is_none() {
            first_line = Some(delta);
        }
        last_line = delta;
        for (col, cell) in row.cells().iter().enumerate() {
            if matches!(cell.width, vtgrid::CellWidth::WideTrail) {
                continue;
            }
            if cell.ch == '\0' {
                continue;
            }
            text.push(cell.ch);
            offsets.push((delta, col as u16));
        }
        if !row.wrapped {
            lines.push(ExtendedLine {
                first_line: first_line.unwrap_or(delta),
                last_line,
                text: std::mem::take(&mut text),
                offsets: std::mem::take(&mut offsets),
            });
            first_line = None;
        }
    }
    if !text.is_empty() || first_line.is_some() {
        lines.push(ExtendedLine {
            first_line: first_line.unwrap_or(last_line),
            last_line,
            text,
            offsets,
        });
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: (u64, u16),
    pub end: (u64, u16),
}

/// Find every match of `pattern` across `lines`, in order. Wrap-around (the
/// host asking to keep searching from the top once the bottom is reached) is
/// the caller's responsibility: this returns all matches and lets the
/// caller pick the first one after/before a cursor position, cycling with
/// `%` arithmetic over the returned `Vec`.
///
/// # Errors
///
/// Returns the `regex` compile error if `pattern` is not a valid regex.
pub fn find_all(lines: &[ExtendedLine], pattern: &str) -> Result<Vec<SearchMatch>, regex::Error> {
    let re = Regex::new(pattern)?;
    let mut matches = Vec::new();
    for line in lines {
        for m in re.find_iter(line.text()) {
            let start_char = line.text()[..m.start()].chars().count();
            let end_char = line.text()[..m.end()].chars().count().saturating_sub(1).max(start_char);
            let Some(start) = line.position_at(start_char) else { continue };
            let end = line.position_at(end_char).unwrap_or(start);
            matches.push(SearchMatch { start, end });
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtgrid::{Cell, CellWidth, Style};

    fn row_with(text: &str, wrapped: bool, cols: u16) -> Row {
        let mut row = Row::blank(cols, Style::default());
        for (i, ch) in text.chars().enumerate() {
            row.set(i as u16, Cell { ch, style: Style::default(), width: CellWidth::Narrow, grapheme: None });
        }
        row.wrapped = wrapped;
        row
    }

    #[test]
    fn joins_wrapped_rows_into_one_extended_line() {
        let a = row_with("hello ", true, 6);
        let b = row_with("world", false, 6);
        let rows = vec![(0u64, &a), (1u64, &b)];
        let lines = build_extended_lines(rows.into_iter());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "hello world");
    }

    #[test]
    fn finds_match_spanning_a_wrap_point() {
        let a = row_with("hel", true, 3);
        let b = row_with("lo!", false, 3);
        let rows = vec![(0u64, &a), (1u64, &b)];
        let lines = build_extended_lines(rows.into_iter());
        let matches = find_all(&lines, "hello").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, (0, 0));
        assert_eq!(matches[0].end, (1, 1));
    }
}
