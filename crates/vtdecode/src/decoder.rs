//! Streaming byte decoder: UTF-8 in the common case, ISO-2022 G0..G3
//! national/graphics sets when designated, with C0 controls always pulled
//! out of an in-progress multi-byte sequence rather than corrupting it.

use crate::charset::{translate_94, translate_96, Charset94, Charset96};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GSet {
    G94(Charset94),
    G96(Charset96),
}

impl Default for GSet {
    fn default() -> Self {
        GSet::G94(Charset94::Ascii)
    }
}

/// Result of feeding one input byte to the [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A complete, displayable scalar. `width` is its terminal column width
    /// (0 for combining marks, which the caller should fold into the
    /// previous cell's grapheme cluster rather than advancing the cursor).
    Scalar { ch: char, width: u8 },
    /// A C0 control byte (`0x00..=0x1F` or `0x7F`), pulled out per the
    /// interleaving rule below even when it arrives mid-sequence.
    Control(u8),
    /// More bytes are needed before a scalar can be produced.
    Incomplete,
    /// The byte sequence was not valid UTF-8; a replacement character has
    /// already been produced in its place.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Utf8Accum {
    None,
    Pending { need: u8, have: u8, value: u32 },
}

/// Owns the ISO-2022 G0..G3 designation/shift state and the UTF-8
/// multi-byte accumulator.
#[derive(Debug, Clone)]
pub struct Decoder {
    g: [GSet; 4],
    gl: usize,
    gr: usize,
    single_shift: Option<usize>,
    utf8_mode: bool,
    accum: Utf8Accum,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder {
            g: [GSet::default(); 4],
            gl: 0,
            gr: 1,
            single_shift: None,
            utf8_mode: true,
            accum: Utf8Accum::None,
        }
    }
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn designate(&mut self, slot: usize, set: GSet) {
        if let Some(g) = self.g.get_mut(slot) {
            *g = set;
        }
    }

    #[must_use]
    pub fn designated(&self, slot: usize) -> Option<GSet> {
        self.g.get(slot).copied()
    }

    pub fn shift_out(&mut self) {
        self.gl = 1;
    }

    pub fn shift_in(&mut self) {
        self.gl = 0;
    }

    pub fn locking_shift(&mut self, slot: usize) {
        self.gl = slot;
    }

    pub fn locking_shift_right(&mut self, slot: usize) {
        self.gr = slot;
    }

    pub fn single_shift(&mut self, slot: usize) {
        self.single_shift = Some(slot);
    }

    pub fn set_utf8_mode(&mut self, on: bool) {
        self.utf8_mode = on;
        self.accum = Utf8Accum::None;
    }

    #[must_use]
    pub fn utf8_mode(&self) -> bool {
        self.utf8_mode
    }

    fn active_gset(&mut self) -> GSet {
        let slot = self.single_shift.take().unwrap_or(self.gl);
        self.g[slot]
    }

    /// Feed one input byte. C0 control bytes (`0x00..=0x1F`, `0x7F`) are
    /// always reported immediately via [`DecodeOutcome::Control`] and never
    /// disturb a UTF-8 accumulation already in progress: a control byte
    /// arriving between the lead byte and a continuation byte of a
    /// multi-byte scalar is "pulled out" ahead of it, and the accumulator
    /// resumes expecting the same continuation byte next. This matches how
    /// real terminals keep a raw `Ctrl-G` from corrupting wide text that
    /// happens to straddle the same `write()` boundary.
    pub fn feed(&mut self, byte: u8) -> DecodeOutcome {
        if is_c0(byte) {
            return DecodeOutcome::Control(byte);
        }

        let set = self.active_gset();
        if self.utf8_mode && set == GSet::G94(Charset94::Ascii) {
            return self.feed_utf8(byte);
        }
        let ch = match set {
            GSet::G94(s) => translate_94(s, byte & 0x7F),
            GSet::G96(s) => translate_96(s, byte & 0x7F),
        };
        DecodeOutcome::Scalar { ch, width: display_width(ch) }
    }

    fn feed_utf8(&mut self, byte: u8) -> DecodeOutcome {
        match self.accum {
            Utf8Accum::None => {
                if byte < 0x80 {
                    let ch = byte as char;
                    return DecodeOutcome::Scalar { ch, width: display_width(ch) };
                }
                let (need, value) = if byte & 0xE0 == 0xC0 {
                    (1, u32::from(byte & 0x1F))
                } else if byte & 0xF0 == 0xE0 {
                    (2, u32::from(byte & 0x0F))
                } else if byte & 0xF8 == 0xF0 {
                    (3, u32::from(byte & 0x07))
                } else {
                    return DecodeOutcome::Invalid;
                };
                self.accum = Utf8Accum::Pending { need, have: 0, value };
                DecodeOutcome::Incomplete
            }
            Utf8Accum::Pending { need, have, value } => {
                if byte & 0xC0 != 0x80 {
                    self.accum = Utf8Accum::None;
                    tracing::debug!(byte, "invalid UTF-8 continuation byte");
                    return DecodeOutcome::Invalid;
                }
                let value = (value << 6) | u32::from(byte & 0x3F);
                let have = have + 1;
                if have == need {
                    self.accum = Utf8Accum::None;
                    match char::from_u32(value) {
                        Some(ch) => DecodeOutcome::Scalar { ch, width: display_width(ch) },
                        None => DecodeOutcome::Invalid,
                    }
                } else {
                    self.accum = Utf8Accum::Pending { need, have, value };
                    DecodeOutcome::Incomplete
                }
            }
        }
    }
}

#[must_use]
fn is_c0(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7F
}

#[must_use]
fn display_width(ch: char) -> u8 {
    match unicode_width::UnicodeWidthChar::width(ch) {
        Some(0) | None => 0,
        Some(1) => 1,
        Some(_) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passthrough() {
        let mut d = Decoder::new();
        assert_eq!(d.feed(b'A'), DecodeOutcome::Scalar { ch: 'A', width: 1 });
    }

    #[test]
    fn utf8_multibyte() {
        let mut d = Decoder::new();
        let bytes = "é".as_bytes(); // 2-byte UTF-8
        assert_eq!(d.feed(bytes[0]), DecodeOutcome::Incomplete);
        assert_eq!(d.feed(bytes[1]), DecodeOutcome::Scalar { ch: 'é', width: 1 });
    }

    #[test]
    fn wide_char_width() {
        let mut d = Decoder::new();
        let bytes = "中".as_bytes();
        d.feed(bytes[0]);
        d.feed(bytes[1]);
        assert_eq!(d.feed(bytes[2]), DecodeOutcome::Scalar { ch: '中', width: 2 });
    }

    #[test]
    fn c0_pulled_out_of_multibyte_sequence() {
        let mut d = Decoder::new();
        let bytes = "é".as_bytes();
        assert_eq!(d.feed(bytes[0]), DecodeOutcome::Incomplete);
        // A bell arrives mid-sequence (e.g. split across two PTY reads).
        assert_eq!(d.feed(0x07), DecodeOutcome::Control(0x07));
        // The accumulator is untouched and still expects the continuation byte.
        assert_eq!(d.feed(bytes[1]), DecodeOutcome::Scalar { ch: 'é', width: 1 });
    }

    #[test]
    fn dec_special_graphics_line_drawing() {
        let mut d = Decoder::new();
        d.designate(0, GSet::G94(Charset94::DecSpecialGraphic));
        // 'q' draws a horizontal line in the VT100 graphics set.
        assert_eq!(d.feed(b'q'), DecodeOutcome::Scalar { ch: '\u{2500}', width: 1 });
    }

    #[test]
    fn shift_out_invokes_g1() {
        let mut d = Decoder::new();
        d.designate(1, GSet::G94(Charset94::British));
        d.shift_out();
        assert_eq!(d.feed(b'#'), DecodeOutcome::Scalar { ch: '\u{00A3}', width: 1 });
        d.shift_in();
        assert_eq!(d.feed(b'#'), DecodeOutcome::Scalar { ch: '#', width: 1 });
    }
}
