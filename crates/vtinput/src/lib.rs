#![warn(clippy::pedantic)]

pub mod encode;
pub mod event;
mod macros;
pub use encode::Encode;
pub use event::{
    KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, KeyboardEnhancementFlags,
    MouseButton, MouseEvent, MouseEventKind, TerminalInputEvent, TerminalInputEventOwned,
    TerseDisplay,
};
pub use vt_push_parser::event::{VTEvent, VTOwnedEvent};
