//! UTF-8 and ISO-2022 charset decoding: turns a raw PTY byte stream into
//! width-tagged Unicode scalars, tracking the G0..G3 designation/shift state
//! a `SCS`/`SO`/`SI`/locking- and single-shift sequence mutates.

pub mod charset;
pub mod decoder;

pub use charset::{translate_94, translate_96, Charset94, Charset96};
pub use decoder::{DecodeOutcome, Decoder, GSet};
