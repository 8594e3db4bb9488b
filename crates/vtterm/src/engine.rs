//! The integration point: owns primary/alternate [`Screen`]s, the byte
//! [`Decoder`], and a [`VTPushParser`] matcher, and turns a PTY read into
//! grid mutations plus a stream of [`CoreEvent`]s for the host.

use vt_push_parser::event::VTEvent;
use vt_push_parser::VTPushParser;
use vtdecode::{DecodeOutcome, Decoder};
use vtgrid::{SavedCursor, Screen};
use vtselect::{Selection, View};

use crate::config::BufferConfig;
use crate::event::{CoreEvent, ScreenId};
use crate::handlers::{self, HandlerContext};
use crate::keymap::{FunctionKeyFlavor, KeyEncoder};

/// The set of columns (0-based) a horizontal tab stops at. Owned at the
/// `Buffer` level, not the `Screen`, since tab stops are a terminal-session
/// concept independent of which screen (primary/alternate) is active.
#[derive(Debug, Clone)]
pub struct TabStops {
    stops: std::collections::BTreeSet<u16>,
}

impl TabStops {
    #[must_use]
    pub fn new(cols: u16) -> Self {
        let mut stops = std::collections::BTreeSet::new();
        let mut col = 8;
        while col < cols {
            stops.insert(col);
            col += 8;
        }
        TabStops { stops }
    }

    pub fn set(&mut self, col: u16) {
        self.stops.insert(col);
    }

    pub fn clear(&mut self, col: u16) {
        self.stops.remove(&col);
    }

    pub fn clear_all(&mut self) {
        self.stops.clear();
    }

    /// The next stop strictly after `from`, or `last_col` if none remain.
    #[must_use]
    pub fn next_stop(&self, from: u16, last_col: u16) -> u16 {
        self.stops.range((from + 1)..).next().copied().unwrap_or(last_col).min(last_col)
    }
}

/// Owns both screen buffers and the parser/decoder state needed to drive
/// them from a raw PTY byte stream.
pub struct Buffer {
    primary: Screen,
    alternate: Screen,
    active: ScreenId,
    decoder: Decoder,
    parser: VTPushParser,
    saved_primary: Option<SavedCursor>,
    saved_alternate: Option<SavedCursor>,
    pub selection: Selection,
    pub view: View,
    osc: OscCollector,
    tab_stops: TabStops,
    keymap: KeyEncoder,
    word_characters: String,
}

#[derive(Default)]
struct OscCollector {
    active: Option<u16>,
    text: String,
}

impl Buffer {
    #[must_use]
    pub fn new(config: &BufferConfig) -> Self {
        let mut primary = Screen::new(config.cols, config.rows, config.scrollback_lines);
        let mut alternate = Screen::new(config.cols, config.rows, 0);
        primary.set_autowrap_mode(config.emulation.autowrap);
        alternate.set_autowrap_mode(config.emulation.autowrap);

        let mut keymap = KeyEncoder::new();
        keymap.set_function_key_flavor(FunctionKeyFlavor::from_term_name(&config.term));

        Buffer {
            primary,
            alternate,
            active: ScreenId::Primary,
            decoder: Decoder::new(),
            parser: VTPushParser::new(),
            saved_primary: None,
            saved_alternate: None,
            selection: Selection::new(),
            view: View::new(),
            osc: OscCollector::default(),
            tab_stops: TabStops::new(config.cols),
            keymap,
            word_characters: config.word_characters.clone(),
        }
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyEncoder {
        &self.keymap
    }

    /// The word-selection class an extract/expand should use for `ch`:
    /// alphanumerics and the configured `word_characters` are "word" (1),
    /// everything else is a boundary (0). Passed to [`Selection`] as the
    /// `word_class` closure its methods already take.
    #[must_use]
    pub fn word_class(&self, ch: char) -> u8 {
        if ch.is_alphanumeric() || self.word_characters.contains(ch) {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        match self.active {
            ScreenId::Primary => &self.primary,
            ScreenId::Alternate => &self.alternate,
        }
    }

    #[must_use]
    pub fn active_screen_id(&self) -> ScreenId {
        self.active
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.primary.resize(cols, rows);
        self.alternate.resize(cols, rows);
        self.tab_stops = TabStops::new(cols);
    }

    /// Feed a chunk of bytes read from the PTY, applying it to whichever
    /// screen is active and emitting host-facing events as they occur. The
    /// closure owns no allocation across calls; the parser's own header
    /// buffers are the only state carried between chunks, matching how a
    /// PTY read naturally arrives in arbitrary fragments.
    pub fn feed(&mut self, bytes: &[u8], emit: &mut dyn FnMut(CoreEvent)) {
        let mut current = self.active;
        let mut dirty: Option<(u16, u16)> = None;

        let Buffer {
            primary,
            alternate,
            decoder,
            saved_primary,
            saved_alternate,
            osc,
            tab_stops,
            view,
            keymap,
            ..
        } = self;

        {
            let mut handle = |event: VTEvent<'_>| {
                let screen: &mut Screen = match current {
                    ScreenId::Primary => primary,
                    ScreenId::Alternate => alternate,
                };
                match &event {
                    VTEvent::Raw(raw) => {
                        for &byte in raw.iter() {
                            apply_decoded(screen, decoder.feed(byte), &mut dirty);
                        }
                    }
                    VTEvent::OscStart => {
                        osc.active = None;
                        osc.text.clear();
                    }
                    VTEvent::OscData(data) => {
                        osc.text.push_str(&String::from_utf8_lossy(data));
                    }
                    VTEvent::OscEnd { data, .. } => {
                        osc.text.push_str(&String::from_utf8_lossy(data));
                        handle_osc(&osc.text, emit);
                        osc.text.clear();
                    }
                    VTEvent::OscCancel => osc.text.clear(),
                    _ => {
                        let saved = match current {
                            ScreenId::Primary => &mut *saved_primary,
                            ScreenId::Alternate => &mut *saved_alternate,
                        };
                        let mut switch_screen = None;
                        let mut ctx = HandlerContext {
                            screen,
                            decoder,
                            screen_id: current,
                            saved,
                            tab_stops,
                            view,
                            keymap,
                            switch_screen: &mut switch_screen,
                        };
                        let recognized = handlers::dispatch(&mut ctx, &event, emit);
                        if !recognized {
                            tracing::debug!(?event, "unrecognized sequence");
                        }
                        if let Some(entering_alt) = switch_screen {
                            current = if entering_alt { ScreenId::Alternate } else { ScreenId::Primary };
                        }
                        mark_dirty(&mut dirty, screen.cursor().row);
                    }
                }
            };
            self.parser.feed_with(bytes, &mut handle);
        }

        self.active = current;

        if let Some((first, last)) = dirty {
            self.view.mark_dirty_range(first, last);
            emit(CoreEvent::RowsDirty { screen: self.active, first, last });
        }
        let cursor = self.screen().cursor();
        emit(CoreEvent::CursorMoved { screen: self.active, row: cursor.row, col: cursor.col });
    }
}

fn apply_decoded(screen: &mut Screen, outcome: DecodeOutcome, dirty: &mut Option<(u16, u16)>) {
    match outcome {
        DecodeOutcome::Scalar { ch, width } => {
            screen.insert_char(ch, width, None);
            mark_dirty(dirty, screen.cursor().row);
        }
        DecodeOutcome::Control(byte) => {
            match byte {
                0x0A | 0x0B | 0x0C => screen.linefeed(),
                0x0D => screen.carriage_return(),
                0x08 => screen.cursor_left(1),
                _ => {}
            }
            mark_dirty(dirty, screen.cursor().row);
        }
        DecodeOutcome::Incomplete | DecodeOutcome::Invalid => {}
    }
}

fn mark_dirty(dirty: &mut Option<(u16, u16)>, row: u16) {
    *dirty = Some(match *dirty {
        Some((first, last)) => (first.min(row), last.max(row)),
        None => (row, row),
    });
}

fn handle_osc(text: &str, emit: &mut dyn FnMut(CoreEvent)) {
    let Some((kind, payload)) = text.split_once(';') else { return };
    match kind {
        "0" | "2" => emit(CoreEvent::TitleChanged(payload.to_string())),
        "1" => emit(CoreEvent::IconNameChanged(payload.to_string())),
        "7" => emit(CoreEvent::CurrentDirectoryChanged(payload.to_string())),
        "52" => {
            if let Some((selection, data)) = payload.split_once(';') {
                emit(CoreEvent::ClipboardSet { selection: selection.to_string(), data: data.to_string() });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_text_advances_cursor() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"hi", &mut |e| events.push(e));
        assert_eq!(buf.screen().cursor().col, 2);
    }

    #[test]
    fn csi_cursor_position_moves_cursor() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"\x1b[5;10H", &mut |e| events.push(e));
        let cursor = buf.screen().cursor();
        assert_eq!((cursor.row, cursor.col), (4, 9));
    }

    #[test]
    fn osc_title_emits_title_changed() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"\x1b]0;hello\x07", &mut |e| events.push(e));
        assert!(events.contains(&CoreEvent::TitleChanged("hello".to_string())));
    }

    #[test]
    fn osc_7_emits_current_directory_changed() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"\x1b]7;file://host/home/user\x07", &mut |e| events.push(e));
        assert!(events.contains(&CoreEvent::CurrentDirectoryChanged("file://host/home/user".to_string())));
    }

    #[test]
    fn osc_52_emits_clipboard_set() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"\x1b]52;c;aGVsbG8=\x07", &mut |e| events.push(e));
        assert!(events.contains(&CoreEvent::ClipboardSet {
            selection: "c".to_string(),
            data: "aGVsbG8=".to_string(),
        }));
    }

    #[test]
    fn alternate_screen_toggle_switches_active_buffer() {
        let mut buf = Buffer::new(&BufferConfig::default());
        let mut events = Vec::new();
        buf.feed(b"\x1b[?1049h", &mut |e| events.push(e));
        assert_eq!(buf.active_screen_id(), ScreenId::Alternate);
        assert_eq!(
            events.iter().filter(|e| matches!(e, CoreEvent::AlternateScreenChanged { .. })).count(),
            1
        );
        assert!(events.contains(&CoreEvent::AlternateScreenChanged { active: true }));
    }

    /// Feeding `?1049h` followed by text in one chunk must land the text on
    /// the alternate screen, identically to feeding the same bytes split
    /// across two `feed()` calls — the switch must apply at the moment the
    /// sequence is dispatched, not at the end of whatever chunk it arrived in.
    #[test]
    fn alt_screen_switch_is_chunking_independent() {
        let mut whole = Buffer::new(&BufferConfig::default());
        whole.feed(b"\x1b[?1049hworld", &mut |_| {});

        let mut split = Buffer::new(&BufferConfig::default());
        split.feed(b"\x1b[?1049h", &mut |_| {});
        split.feed(b"world", &mut |_| {});

        assert_eq!(whole.active_screen_id(), ScreenId::Alternate);
        assert_eq!(split.active_screen_id(), ScreenId::Alternate);
        assert_eq!(whole.screen().cursor().col, 5);
        assert_eq!(split.screen().cursor().col, 5);

        let primary_row = |b: &Buffer| b.primary.row(0).map(|r| r.cell(0).map(|c| c.ch));
        assert_ne!(primary_row(&whole), Some(Some('w')));
        assert_ne!(primary_row(&split), Some(Some('w')));
    }

    #[test]
    fn word_class_recognizes_configured_word_characters() {
        let config = BufferConfig { word_characters: "_-".to_string(), ..BufferConfig::default() };
        let buf = Buffer::new(&config);
        assert_eq!(buf.word_class('_'), 1);
        assert_eq!(buf.word_class('a'), 1);
        assert_eq!(buf.word_class('.'), 0);
    }

    #[test]
    fn autowrap_config_seeds_both_screens() {
        let config = BufferConfig { emulation: crate::config::EmulationFlags { autowrap: false, ..Default::default() }, ..BufferConfig::default() };
        let buf = Buffer::new(&config);
        assert!(!buf.primary.autowrap_mode());
        assert!(!buf.alternate.autowrap_mode());
    }
}
