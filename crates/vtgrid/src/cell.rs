//! The styled unit cell and the side table for multi-scalar grapheme clusters.

use std::num::NonZeroU32;

/// A terminal color: the pen default, a 256-color palette index, or truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

bitflags::bitflags! {
    /// SGR attribute flags orthogonal to color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attrs: u16 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const REVERSE       = 1 << 5;
        const INVISIBLE     = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
        const DOUBLE_UNDERLINE = 1 << 8;
        const PROTECTED     = 1 << 9;
    }
}

/// The current "pen": the style applied to the next inserted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

/// How many display columns a cell occupies, and its role in a wide-character pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellWidth {
    /// Ordinary single-column cell.
    #[default]
    Narrow,
    /// The leading column of a two-column wide character.
    WideLead,
    /// The trailing column of a two-column wide character; holds no glyph of
    /// its own and is never addressed directly by `insert_char`.
    WideTrail,
}

/// A single addressable position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Base scalar value. `'\0'` denotes an erased/blank cell.
    pub ch: char,
    pub style: Style,
    pub width: CellWidth,
    /// Handle into a [`GraphemeArena`] when `ch` carries trailing combining
    /// marks; `None` for the common single-scalar case.
    pub grapheme: Option<NonZeroU32>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: '\0',
        style: Style {
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::empty(),
        },
        width: CellWidth::Narrow,
        grapheme: None,
    };

    #[must_use]
    pub fn blank_with(style: Style) -> Self {
        Cell { style, ..Cell::BLANK }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.ch == '\0' && self.grapheme.is_none()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

/// Side table holding the combining-mark tail of cells whose grapheme cluster
/// spans more than one Unicode scalar. Indexed by a 1-based handle so that
/// `Option<NonZeroU32>` fits in the same word as a null handle.
#[derive(Debug, Clone, Default)]
pub struct GraphemeArena {
    clusters: Vec<smallvec::SmallVec<[char; 4]>>,
}

impl GraphemeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the combining marks that follow a cell's base scalar and return
    /// a handle suitable for [`Cell::grapheme`].
    pub fn insert(&mut self, marks: &[char]) -> NonZeroU32 {
        self.clusters.push(marks.iter().copied().collect());
        let idx = u32::try_from(self.clusters.len())
            .expect("grapheme arena should not exceed u32::MAX entries");
        NonZeroU32::new(idx).expect("len() is always >= 1 after push")
    }

    #[must_use]
    pub fn get(&self, handle: NonZeroU32) -> &[char] {
        &self.clusters[(handle.get() - 1) as usize]
    }

    /// Append one combining mark to an existing cluster (when `handle` is
    /// `Some`) or start a new one. Used when a zero-width combining scalar
    /// arrives after a base character has already been written.
    pub fn push_mark(&mut self, handle: Option<NonZeroU32>, mark: char) -> NonZeroU32 {
        match handle {
            Some(h) => {
                self.clusters[(h.get() - 1) as usize].push(mark);
                h
            }
            None => self.insert(&[mark]),
        }
    }
}
