//! End-to-end scenarios driving a [`vtterm::Buffer`] the way a host would:
//! feed raw PTY bytes in, read grid/event state back out.

use vtgrid::{CellWidth, Color};
use vtterm::{Buffer, BufferConfig, CoreEvent, ScreenId};

fn config(cols: u16, rows: u16) -> BufferConfig {
    let mut cfg = BufferConfig::default();
    cfg.cols = cols;
    cfg.rows = rows;
    cfg
}

#[test]
fn s1_sgr_and_erase() {
    let mut buf = Buffer::new(&config(10, 3));
    buf.feed(b"A\x1b[31mB\x1b[0mC\x1b[2K", &mut |_| {});

    let row = buf.screen().row(0).unwrap();
    assert_eq!(row.cell(0).unwrap().ch, '\0');
    assert_eq!(row.cell(1).unwrap().ch, '\0');
    assert_eq!(row.cell(2).unwrap().ch, '\0');
    for col in 0..row.cols() {
        let cell = row.cell(col).unwrap();
        assert_eq!(cell.ch, '\0', "EL 2 must blank every column, not just what was printed");
        assert_eq!(cell.style.fg, Color::Default);
    }
    assert_eq!(buf.screen().cursor().col, 3);
}

#[test]
fn s1_colors_before_the_erase_are_set_correctly() {
    // Same input, checked one step earlier (before the final `CSI 2 K`) so
    // the per-cell SGR state itself is exercised, not just the erase.
    let mut buf = Buffer::new(&config(10, 3));
    buf.feed(b"A\x1b[31mB\x1b[0mC", &mut |_| {});
    let row = buf.screen().row(0).unwrap();
    assert_eq!(row.cell(0).unwrap().ch, 'A');
    assert_eq!(row.cell(0).unwrap().style.fg, Color::Default);
    assert_eq!(row.cell(1).unwrap().ch, 'B');
    assert_eq!(row.cell(1).unwrap().style.fg, Color::Indexed(1));
    assert_eq!(row.cell(2).unwrap().ch, 'C');
    assert_eq!(row.cell(2).unwrap().style.fg, Color::Default);
}

#[test]
fn s2_autowrap_and_soft_wrap() {
    let mut buf = Buffer::new(&config(5, 3));
    buf.feed(b"abcdef", &mut |_| {});

    let row0 = buf.screen().row(0).unwrap();
    let text0: String = row0.cells().iter().map(|c| c.ch).collect();
    assert_eq!(text0, "abcde");
    assert!(row0.wrapped);

    let row1 = buf.screen().row(1).unwrap();
    assert_eq!(row1.cell(0).unwrap().ch, 'f');

    let cursor = buf.screen().cursor();
    assert_eq!((cursor.row, cursor.col), (1, 1));
}

#[test]
fn s3_combining_marks() {
    let mut buf = Buffer::new(&config(10, 3));
    buf.feed("a\u{0301}".as_bytes(), &mut |_| {});

    let row = buf.screen().row(0).unwrap();
    let cell = row.cell(0).unwrap();
    assert_eq!(cell.ch, 'a');
    assert_eq!(cell.width, CellWidth::Narrow);
    let marks = buf.screen().grapheme(cell.grapheme.expect("combining mark should be recorded"));
    assert_eq!(marks, ['\u{0301}']);
    assert_eq!(buf.screen().cursor().col, 1);
}

#[test]
fn s4_alternate_screen_round_trip() {
    let mut buf = Buffer::new(&config(10, 5));
    let mut events = Vec::new();
    buf.feed(b"hello\r\n", &mut |e| events.push(e));
    buf.feed(b"\x1b[?1049h", &mut |e| events.push(e));
    assert_eq!(buf.active_screen_id(), ScreenId::Alternate);
    buf.feed(b"world", &mut |e| events.push(e));
    buf.feed(b"\x1b[?1049l", &mut |e| events.push(e));

    assert_eq!(buf.active_screen_id(), ScreenId::Primary);
    let row0 = buf.screen().row(0).unwrap();
    let text: String = row0.cells().iter().map(|c| c.ch).take(5).collect();
    assert_eq!(text, "hello");
    let cursor = buf.screen().cursor();
    assert_eq!((cursor.row, cursor.col), (1, 0));
    assert!(events.contains(&CoreEvent::AlternateScreenChanged { active: true }));
    assert!(events.contains(&CoreEvent::AlternateScreenChanged { active: false }));
}

#[test]
fn s5_legacy_mouse_report_format() {
    use vtselect::MouseEncoding;
    use vtterm::keymap::KeyEncoder;
    use vtinput::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

    let encoder = KeyEncoder::new();
    let event = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 4,
        row: 2,
        modifiers: KeyModifiers::NONE,
    };
    let bytes = encoder.encode_mouse(&event, MouseEncoding::Legacy);
    assert_eq!(bytes, vec![0x1b, b'[', b'M', 0x20, 0x25, 0x23]);
}

#[test]
fn s6_search_with_soft_wrap() {
    let mut buf = Buffer::new(&config(4, 4));
    buf.feed(b"aaaaaaaaaa", &mut |_| {});

    let rows: Vec<(u64, &vtgrid::Row)> =
        (0..3u64).map(|i| (i, buf.screen().row(i as u16).unwrap())).collect();
    assert!(rows[0].1.wrapped);
    assert!(rows[1].1.wrapped);
    assert!(!rows[2].1.wrapped);

    let lines = vtselect::build_extended_lines(rows.into_iter());
    let matches = vtselect::find_all(&lines, "a{10}").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start, (0, 0));
    assert_eq!(matches[0].end, (2, 1));
}
