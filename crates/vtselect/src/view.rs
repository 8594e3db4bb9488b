//! Translates between the combined scrollback+viewport "delta" address space
//! and the physical rows a host renders, and coalesces per-row dirty
//! tracking into the smallest range the host needs to redraw.

/// Which mouse events the host-side encoder should report to the child
/// process, as selected by `DECSET`/`DECRST` 1000/1002/1003.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseTrackingMode {
    #[default]
    Off,
    /// 1000: report button press/release only.
    Press,
    /// 1002: also report motion while a button is held.
    ButtonEvent,
    /// 1003: report all motion, button held or not.
    AnyEvent,
}

/// The wire encoding a mouse report uses, as selected by `DECSET`/`DECRST`
/// 1005/1006/1015.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseEncoding {
    /// `CSI M Cb Cx Cy`, coordinates packed as `value + 32`.
    #[default]
    Legacy,
    /// `CSI < Cb ; Cx ; Cy M`/`m`, decimal coordinates (no 223-column cap).
    Sgr,
}

/// How far back into scrollback the view is currently scrolled, in rows.
/// `0` means pinned to the live viewport (the common case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct View {
    scroll_back: u64,
    dirty: Option<(u16, u16)>,
    mouse_tracking: MouseTrackingMode,
    mouse_encoding: MouseEncoding,
}

impl View {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scroll_back(&self) -> u64 {
        self.scroll_back
    }

    #[must_use]
    pub fn is_pinned_to_bottom(&self) -> bool {
        self.scroll_back == 0
    }

    /// Scroll up (into history) or down (towards live) by `lines`, clamped
    /// to `[0, max_scroll_back]`.
    pub fn scroll_by(&mut self, lines: i64, max_scroll_back: u64) {
        let current = i64::try_from(self.scroll_back).unwrap_or(i64::MAX);
        let target = current.saturating_add(lines).max(0);
        self.scroll_back = (target as u64).min(max_scroll_back);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    /// The delta index (see [`vtgrid::Ring`]) the first physical row of the
    /// viewport should display, given the total number of delta-addressable
    /// lines (`scrollback.len() + viewport_rows`) and the viewport height.
    #[must_use]
    pub fn top_delta(&self, total_lines: u64, viewport_rows: u16) -> u64 {
        let bottom_aligned = total_lines.saturating_sub(u64::from(viewport_rows));
        bottom_aligned.saturating_sub(self.scroll_back)
    }

    /// Mark a single physical row dirty, widening any already-pending dirty
    /// range rather than tracking a list.
    pub fn mark_dirty(&mut self, row: u16) {
        self.dirty = Some(match self.dirty {
            Some((lo, hi)) => (lo.min(row), hi.max(row)),
            None => (row, row),
        });
    }

    pub fn mark_dirty_range(&mut self, from: u16, to: u16) {
        self.mark_dirty(from);
        self.mark_dirty(to);
    }

    /// Take the coalesced dirty range, clearing it.
    pub fn take_dirty(&mut self) -> Option<(u16, u16)> {
        self.dirty.take()
    }

    #[must_use]
    pub fn mouse_tracking(&self) -> MouseTrackingMode {
        self.mouse_tracking
    }

    pub fn set_mouse_tracking(&mut self, mode: MouseTrackingMode) {
        self.mouse_tracking = mode;
    }

    #[must_use]
    pub fn mouse_encoding(&self) -> MouseEncoding {
        self.mouse_encoding
    }

    pub fn set_mouse_encoding(&mut self, encoding: MouseEncoding) {
        self.mouse_encoding = encoding;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_by_clamps_to_history_depth() {
        let mut view = View::new();
        view.scroll_by(100, 10);
        assert_eq!(view.scroll_back(), 10);
        view.scroll_by(-5, 10);
        assert_eq!(view.scroll_back(), 5);
        view.scroll_to_bottom();
        assert!(view.is_pinned_to_bottom());
    }

    #[test]
    fn top_delta_follows_bottom_when_pinned() {
        let view = View::new();
        assert_eq!(view.top_delta(100, 24), 76);
    }

    #[test]
    fn dirty_ranges_coalesce() {
        let mut view = View::new();
        view.mark_dirty(3);
        view.mark_dirty(5);
        view.mark_dirty(1);
        assert_eq!(view.take_dirty(), Some((1, 5)));
        assert_eq!(view.take_dirty(), None);
    }
}
