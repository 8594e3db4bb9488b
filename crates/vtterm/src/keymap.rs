//! Keyboard-to-PTY output encoding. The heavy lifting — xterm modifier
//! parameters, `CSI u` forms, the tilde-sequence function-key families — is
//! already implemented by [`vtinput`]'s `Encode for KeyEvent`; this module
//! adds the things that are terminal-*session* concerns rather than
//! per-key ones: bracketed-paste wrapping (depends on whether the host
//! asked for it via `DECSET 2004`), application-cursor-keys mode (DECCKM),
//! application-keypad mode (DECKPAM/DECKPNM), and the negotiated
//! function-key flavor.

use vtinput::encode::{write_str_into, Encode, EncodeError};
use vtinput::event::{DisableBracketedPaste, EnableBracketedPaste};
use vtinput::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use vtselect::MouseEncoding;

/// The F1-F4/function-key wire format a session has negotiated via DECSET
/// 1051 (Sun)/1052 (HP)/1060 (xterm)/1061 (VT220), grounded in the DEC
/// private-mode numbers `vte`'s own `dumpkeys` diagnostic tool uses
/// (`MODE_SUN_FUNCTION_KEYS`/`MODE_HP_FUNCTION_KEYS`/
/// `MODE_XTERM_FUNCTION_KEYS`/`MODE_VT220_FUNCTION_KEYS`). This core doesn't
/// have a grounded source for Sun/HP's vendor-exact byte sequences, so both
/// collapse onto the same well-documented `Legacy` tilde encoding
/// (`CSI 11~`..`CSI 14~`, the linux-console/rxvt convention) rather than
/// fabricating vendor-specific codes; xterm and VT220 share `Vt220`'s SS3
/// encoding, which is what terminals actually send by default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKeyFlavor {
    #[default]
    Vt220,
    Legacy,
}

impl FunctionKeyFlavor {
    /// Chooses a starting flavor from a `TERM` name, the way a host's
    /// terminfo lookup would before any DECSET has been observed.
    #[must_use]
    pub fn from_term_name(term: &str) -> Self {
        if term.contains("linux") || term.contains("rxvt") {
            FunctionKeyFlavor::Legacy
        } else {
            FunctionKeyFlavor::Vt220
        }
    }
}

/// Per-session keyboard output state: bracketed paste, application
/// cursor-keys mode (DECCKM), application keypad mode (DECKPAM/DECKPNM),
/// and the negotiated function-key flavor. These are reported to the
/// encoder by the core via [`KeyEncoder::set_application_cursor_keys`],
/// [`KeyEncoder::set_keypad_application_mode`], and
/// [`KeyEncoder::set_function_key_flavor`] as the corresponding
/// `DECSET`/`DECRST`/`ESC =`/`ESC >` sequences are observed, grounded in the
/// same handler dispatch that updates the grid.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEncoder {
    bracketed_paste: bool,
    cursor_keys_application: bool,
    keypad_application: bool,
    function_key_flavor: FunctionKeyFlavor,
}

impl KeyEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bracketed_paste(&mut self, on: bool) {
        self.bracketed_paste = on;
    }

    /// Report DECCKM (`CSI ?1h`/`CSI ?1l`): selects SS3 (`ESC O X`) instead
    /// of normal mode (`ESC [ X`) for unmodified cursor keys.
    pub fn set_application_cursor_keys(&mut self, on: bool) {
        self.cursor_keys_application = on;
    }

    /// Report DECKPAM/DECKPNM (`ESC =`/`ESC >`). Tracked for completeness
    /// and for a host that wants to query the current mode; this core has
    /// no distinct `KeyCode` for numeric-keypad keys, so it does not yet
    /// change what `encode_key` emits.
    pub fn set_keypad_application_mode(&mut self, on: bool) {
        self.keypad_application = on;
    }

    #[must_use]
    pub fn keypad_application_mode(&self) -> bool {
        self.keypad_application
    }

    pub fn set_function_key_flavor(&mut self, flavor: FunctionKeyFlavor) {
        self.function_key_flavor = flavor;
    }

    #[must_use]
    pub fn function_key_flavor(&self) -> FunctionKeyFlavor {
        self.function_key_flavor
    }

    /// Encode a key press into the bytes a PTY write should carry.
    pub fn encode_key(&self, key: &KeyEvent, buf: &mut [u8]) -> Result<usize, EncodeError> {
        if let (FunctionKeyFlavor::Legacy, KeyCode::F(n @ 1..=4)) = (self.function_key_flavor, key.code) {
            return write_str_into(buf, &format!("\x1b[{}~", 10 + n));
        }
        key.clone().encode_with_modes(buf, self.cursor_keys_application)
    }

    /// Wrap pasted text in `ESC[200~ ... ESC[201~` when the host has
    /// requested bracketed-paste mode; otherwise pass it through untouched.
    #[must_use]
    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        if !self.bracketed_paste {
            return text.as_bytes().to_vec();
        }
        let mut out = Vec::with_capacity(text.len() + 12);
        out.extend_from_slice(b"\x1b[200~");
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(b"\x1b[201~");
        out
    }

    /// The sequence a host writes once to turn bracketed-paste reporting on
    /// at the terminal (not to be confused with `encode_paste`'s wrapping of
    /// pasted content).
    pub fn enable_sequence(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        EnableBracketedPaste.encode(buf)
    }

    pub fn disable_sequence(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        DisableBracketedPaste.encode(buf)
    }

    /// Encode a mouse event per `encoding`. `vtinput`'s `Encode for
    /// MouseEvent` only implements the SGR wire form (`CSI < ... M`); the
    /// legacy/X10 form (`ESC [ M Cb Cx Cy`, one byte per field, capped at
    /// 223 so no field collides with a C0 control) is a terminal-session
    /// concern layered on top here, the same way bracketed-paste wrapping
    /// is.
    #[must_use]
    pub fn encode_mouse(&self, event: &MouseEvent, encoding: MouseEncoding) -> Vec<u8> {
        match encoding {
            MouseEncoding::Sgr => {
                let mut buf = [0u8; 32];
                let n = event.clone().encode(&mut buf).unwrap_or(0);
                buf[..n].to_vec()
            }
            MouseEncoding::Legacy => encode_mouse_legacy(event),
        }
    }
}

/// `base_button` follows the same mapping `vtinput`'s SGR encoder uses
/// (left/middle/right = 0/1/2, +32 for drag, +64 for scroll), since legacy
/// and SGR share a button-code space and differ only in how the three
/// fields are packed onto the wire.
fn encode_mouse_legacy(event: &MouseEvent) -> Vec<u8> {
    let base_button = match event.kind {
        MouseEventKind::Down(button) => button_code(button),
        MouseEventKind::Up(_) => 3,
        MouseEventKind::Drag(button) => button_code(button) + 32,
        MouseEventKind::Moved => 3 + 32,
        MouseEventKind::ScrollUp => 1 << 6,
        MouseEventKind::ScrollDown => (1 << 6) | 1,
        MouseEventKind::ScrollLeft => (1 << 6) | 2,
        MouseEventKind::ScrollRight => (1 << 6) | 3,
    };
    let mut mod_offset = 0u16;
    if event.modifiers.contains(vtinput::KeyModifiers::SHIFT) {
        mod_offset += 4;
    }
    if event.modifiers.contains(vtinput::KeyModifiers::ALT) {
        mod_offset += 8;
    }
    if event.modifiers.contains(vtinput::KeyModifiers::CONTROL) {
        mod_offset += 16;
    }
    let button = (base_button + mod_offset).min(255 - 32) as u8 + 32;
    // Legacy coordinates are 1-based cell positions, capped at 223 so
    // `col/row + 32` never exceeds 255.
    let col = (event.column + 1).min(223);
    let row = (event.row + 1).min(223);
    vec![0x1b, b'[', b'M', button, (col as u8).wrapping_add(32), (row as u8).wrapping_add(32)]
}

fn button_code(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtinput::{KeyCode, KeyModifiers};

    #[test]
    fn plain_char_encodes_as_utf8() {
        let enc = KeyEncoder::new();
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let mut buf = [0u8; 8];
        let n = enc.encode_key(&key, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"a");
    }

    #[test]
    fn ctrl_c_encodes_as_etx() {
        let enc = KeyEncoder::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let mut buf = [0u8; 8];
        let n = enc.encode_key(&key, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x03]);
    }

    #[test]
    fn legacy_mouse_report_matches_exact_wire_bytes() {
        use vtinput::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
        let enc = KeyEncoder::new();
        // 0-based column 4 / row 2 is cell (5, 3) in 1-based terminal coordinates.
        let event = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        let bytes = enc.encode_mouse(&event, MouseEncoding::Legacy);
        assert_eq!(bytes, vec![0x1b, b'[', b'M', 0x20, 0x25, 0x23]);
    }

    #[test]
    fn paste_wraps_only_when_bracketed_mode_is_on() {
        let mut enc = KeyEncoder::new();
        assert_eq!(enc.encode_paste("hi"), b"hi");
        enc.set_bracketed_paste(true);
        assert_eq!(enc.encode_paste("hi"), b"\x1b[200~hi\x1b[201~");
    }
}
