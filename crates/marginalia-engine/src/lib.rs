pub mod layout;
pub mod markup;
pub mod models;
pub mod render;
pub mod store;

// Re-export key types for easier usage
pub use layout::{MeasureState, MeasureTicket, PositionTracker, TriggerMeasure};
pub use markup::{Parsed, SourceNote, parse};
pub use models::{DateFormat, Note, NoteId, Post, format_date, slugify};
pub use render::{Annotator, TextVisit, annotate_events, render_article};
pub use store::{PostStore, StoreError};
