//! Rendering clean post text to HTML with inline note triggers.
//!
//! Clean content goes through `pulldown-cmark`; trigger injection is a pure
//! transform over the event stream. Each `Event::Text` is a single text node,
//! so a context phrase split by inline markup is never matched, and injected
//! markup is emitted as fresh events that are never re-scanned.

mod annotate;
mod matcher;

pub use annotate::{Annotator, TextVisit, annotate_events, render_article};
pub use matcher::{ContextMatch, ContextMatcher, TRAILING_PUNCTUATION};
