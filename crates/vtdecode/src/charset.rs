//! Identities for the 94- and 96-character "G-set" tables a `SCS` sequence
//! can designate into G0..G3, and the code point translation each identity
//! implies for bytes in the `0x20..=0x7E` (94-set) or `0xA0..=0xFF` (96-set)
//! range.

/// A 94-character set identity, named after the classic DEC/ISO-2022 final
/// bytes used to designate it (`ESC ( <final>` for G0, `ESC ) <final>` for
/// G1, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset94 {
    #[default]
    Ascii,
    British,
    DecSpecialGraphic,
    DecSupplemental,
    Dutch,
    Finnish,
    French,
    FrenchCanadian,
    German,
    Italian,
    NorwegianDanish,
    Spanish,
    Swedish,
    Swiss,
}

/// A 96-character set identity (designated with an intermediate of `-`,
/// `.`, or `/` depending on slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset96 {
    #[default]
    Latin1Supplemental,
    GreekSupplemental,
    HebrewSupplemental,
    LatinCyrillic,
    Latin5,
}

/// Map a 94-set byte (`0x20..=0x7E`) to the Unicode scalar the designated
/// national replacement set implies. Only the handful of code points each
/// set actually remaps differ from ASCII; everything else passes through
/// unchanged.
#[must_use]
pub fn translate_94(set: Charset94, byte: u8) -> char {
    if set == Charset94::DecSpecialGraphic {
        return dec_special_graphics(byte);
    }
    let remap: &[(u8, char)] = match set {
        Charset94::Ascii | Charset94::DecSpecialGraphic => &[],
        Charset94::British => &[(b'#', '\u{00A3}')],
        Charset94::DecSupplemental => &[],
        Charset94::Dutch => &[
            (b'#', '\u{00A3}'), (b'@', '\u{00BE}'), (b'[', '\u{0133}'),
            (b'\\', '\u{00BD}'), (b']', '|'), (b'{', '\u{00A8}'),
            (b'|', '\u{0192}'), (b'}', '\u{00BC}'), (b'~', '\u{00B4}'),
        ],
        Charset94::Finnish => &[
            (b'[', '\u{00C4}'), (b'\\', '\u{00D6}'), (b']', '\u{00C5}'),
            (b'^', '\u{00DC}'), (b'`', '\u{00E9}'), (b'{', '\u{00E4}'),
            (b'|', '\u{00F6}'), (b'}', '\u{00E5}'), (b'~', '\u{00FC}'),
        ],
        Charset94::French => &[
            (b'#', '\u{00A3}'), (b'@', '\u{00E0}'), (b'[', '\u{00B0}'),
            (b'\\', '\u{00E7}'), (b']', '\u{00A7}'), (b'{', '\u{00E9}'),
            (b'|', '\u{00F9}'), (b'}', '\u{00E8}'), (b'~', '\u{00A8}'),
        ],
        Charset94::FrenchCanadian => &[
            (b'@', '\u{00E0}'), (b'[', '\u{00E2}'), (b'\\', '\u{00E7}'),
            (b']', '\u{00EA}'), (b'^', '\u{00EE}'), (b'`', '\u{00F4}'),
            (b'{', '\u{00E9}'), (b'|', '\u{00F9}'), (b'}', '\u{00E8}'),
            (b'~', '\u{00FB}'),
        ],
        Charset94::German => &[
            (b'@', '\u{00A7}'), (b'[', '\u{00C4}'), (b'\\', '\u{00D6}'),
            (b']', '\u{00DC}'), (b'{', '\u{00E4}'), (b'|', '\u{00F6}'),
            (b'}', '\u{00FC}'), (b'~', '\u{00DF}'),
        ],
        Charset94::Italian => &[
            (b'#', '\u{00A3}'), (b'@', '\u{00A7}'), (b'[', '\u{00B0}'),
            (b'\\', '\u{00E7}'), (b']', '\u{00E9}'), (b'`', '\u{00F9}'),
            (b'{', '\u{00E0}'), (b'|', '\u{00F2}'), (b'}', '\u{00E8}'),
            (b'~', '\u{00EC}'),
        ],
        Charset94::NorwegianDanish => &[
            (b'@', '\u{00C4}'), (b'[', '\u{00C6}'), (b'\\', '\u{00D8}'),
            (b']', '\u{00C5}'), (b'^', '\u{00DC}'), (b'`', '\u{00E4}'),
            (b'{', '\u{00E6}'), (b'|', '\u{00F8}'), (b'}', '\u{00E5}'),
            (b'~', '\u{00FC}'),
        ],
        Charset94::Spanish => &[
            (b'#', '\u{00A3}'), (b'@', '\u{00A7}'), (b'[', '\u{00A1}'),
            (b'\\', '\u{00D1}'), (b']', '\u{00BF}'), (b'{', '\u{00B0}'),
            (b'|', '\u{00F1}'), (b'}', '\u{00E7}'),
        ],
        Charset94::Swedish => &[
            (b'@', '\u{00C9}'), (b'[', '\u{00C4}'), (b'\\', '\u{00D6}'),
            (b']', '\u{00C5}'), (b'^', '\u{00DC}'), (b'`', '\u{00E9}'),
            (b'{', '\u{00E4}'), (b'|', '\u{00F6}'), (b'}', '\u{00E5}'),
            (b'~', '\u{00FC}'),
        ],
        Charset94::Swiss => &[
            (b'#', '\u{00F9}'), (b'@', '\u{00E0}'), (b'[', '\u{00E9}'),
            (b'\\', '\u{00E7}'), (b']', '\u{00EA}'), (b'^', '\u{00EE}'),
            (b'_', '\u{00E8}'), (b'`', '\u{00F4}'), (b'{', '\u{00E4}'),
            (b'|', '\u{00F6}'), (b'}', '\u{00FC}'), (b'~', '\u{00FB}'),
        ],
    };
    remap
        .iter()
        .find(|&&(k, _)| k == byte)
        .map_or(byte as char, |&(_, v)| v)
}

/// DEC Special Graphics: `0x5F..=0x7E` become the VT100 line-drawing glyphs;
/// everything else is plain ASCII.
fn dec_special_graphics(byte: u8) -> char {
    match byte {
        0x5F => '\u{00A0}',
        0x60 => '\u{25C6}',
        0x61 => '\u{2592}',
        0x62 => '\u{2409}',
        0x63 => '\u{240C}',
        0x64 => '\u{240D}',
        0x65 => '\u{240A}',
        0x66 => '\u{00B0}',
        0x67 => '\u{00B1}',
        0x68 => '\u{2424}',
        0x69 => '\u{240B}',
        0x6A => '\u{2518}',
        0x6B => '\u{2510}',
        0x6C => '\u{250C}',
        0x6D => '\u{2514}',
        0x6E => '\u{253C}',
        0x6F => '\u{23BA}',
        0x70 => '\u{23BB}',
        0x71 => '\u{2500}',
        0x72 => '\u{23BC}',
        0x73 => '\u{23BD}',
        0x74 => '\u{251C}',
        0x75 => '\u{2524}',
        0x76 => '\u{2534}',
        0x77 => '\u{252C}',
        0x78 => '\u{2502}',
        0x79 => '\u{2264}',
        0x7A => '\u{2265}',
        0x7B => '\u{03C0}',
        0x7C => '\u{2260}',
        0x7D => '\u{00A3}',
        0x7E => '\u{00B7}',
        other => other as char,
    }
}

/// Map a 96-set byte (`0xA0..=0xFF`, here already masked to `0x20..=0x7F`
/// since callers pass the low 7 bits) to its Unicode scalar.
#[must_use]
pub fn translate_96(set: Charset96, byte: u8) -> char {
    let codepoint = 0xA0u32 + u32::from(byte.saturating_sub(0x20));
    match set {
        Charset96::Latin1Supplemental => {
            char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
        }
        // Approximate: a faithful Greek/Hebrew/Cyrillic/Latin-5 remap table
        // is large; fall back to Latin-1 supplemental positions, which is
        // what a terminal with no matching font would show anyway.
        Charset96::GreekSupplemental
        | Charset96::HebrewSupplemental
        | Charset96::LatinCyrillic
        | Charset96::Latin5 => {
            char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
        }
    }
}
