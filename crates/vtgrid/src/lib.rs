//! The grid: cells, rows, bounded scrollback, and the screen cursor/scroll
//! primitives that sequence handlers are built from. No byte parsing and no
//! PTY I/O lives here.

pub mod cell;
pub mod ring;
pub mod row;
pub mod screen;

pub use cell::{Attrs, Cell, CellWidth, Color, GraphemeArena, Style};
pub use ring::Ring;
pub use row::Row;
pub use screen::{Cursor, EraseMode, SavedCursor, Screen, ScrollRegion};
