//! Construction-time configuration for a [`crate::engine::Buffer`].

/// Emulation flag defaults, named after the classic termcap/terminfo
/// capability letters they correspond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulationFlags {
    /// `am`: automatic margins (autowrap) starts enabled.
    pub autowrap: bool,
    /// `bw`: backspace wraps from column 0 to the previous line's end.
    pub back_wrap: bool,
    /// `LP`: the terminal supports meta-as-eighth-bit input.
    pub meta_eighth_bit: bool,
    /// `ul`: underline is distinguishable from normal text without color.
    pub underline_capable: bool,
    /// `xn`: the deferred-autowrap ("newline glitch") behavior is modeled
    /// (see [`vtgrid::Cursor::pending_wrap`]). This is always `true` in
    /// practice; kept as a flag because it is named explicitly as a quirk
    /// to preserve, not simplify away.
    pub deferred_autowrap: bool,
}

impl Default for EmulationFlags {
    fn default() -> Self {
        EmulationFlags {
            autowrap: true,
            back_wrap: false,
            meta_eighth_bit: false,
            underline_capable: true,
            deferred_autowrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    pub cols: u16,
    pub rows: u16,
    pub scrollback_lines: usize,
    pub emulation: EmulationFlags,
    /// Selects the keymap's function-key terminfo flavor.
    pub term: String,
    /// Characters, beyond alphanumerics, a word-selection considers part of
    /// a word (e.g. `_`, `-` for identifiers; `/` for paths).
    pub word_characters: String,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            cols: 80,
            rows: 24,
            scrollback_lines: 10_000,
            emulation: EmulationFlags::default(),
            term: "xterm-256color".to_string(),
            word_characters: "_-./".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_80x24_with_autowrap() {
        let cfg = BufferConfig::default();
        assert_eq!((cfg.cols, cfg.rows), (80, 24));
        assert!(cfg.emulation.autowrap);
    }
}
