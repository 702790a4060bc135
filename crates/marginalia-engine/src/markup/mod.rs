//! The marginalia markup language.
//!
//! Post bodies embed margin notes directly in the text as
//! `||context||(note)`: the double-pipe fence delimits the phrase the note is
//! anchored to, the parenthesised tail is the note body. Parsing strips the
//! markup, leaving the bare context phrase in the clean text, and collects
//! the notes in order of appearance.

mod cursor;
mod kinds;
mod parser;

pub use parser::{Parsed, SourceNote, parse};
