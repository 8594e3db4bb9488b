//! Selection, search, and view projection over a [`vtgrid::Screen`]'s grid.

pub mod search;
pub mod selection;
pub mod view;

pub use search::{build_extended_lines, find_all, ExtendedLine, SearchMatch};
pub use selection::{Pos, Selection, SelectionMode};
pub use view::{MouseEncoding, MouseTrackingMode, View};
