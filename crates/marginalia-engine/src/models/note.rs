use serde::{Deserialize, Serialize};

use crate::markup::SourceNote;

/// Identifier for a note, unique within one post's note set.
///
/// The file-backed store assigns ids by order of discovery during parsing, so
/// reloading unchanged raw content reproduces the same ids. There is no note
/// identity across edits: every save tears the set down and rebuilds it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A margin note attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// The exact phrase this note is anchored to. `None` for notes that
    /// predate anchoring or were entered by hand; those still belong to the
    /// post but are never rendered inline.
    pub context: Option<String>,
    pub content: String,
}

impl Note {
    pub fn from_source(id: NoteId, source: SourceNote) -> Self {
        Self {
            id,
            context: Some(source.context),
            content: source.content,
        }
    }

    /// The phrase this note can be anchored to in rendered text, if any.
    ///
    /// Zero-length contexts are preserved in storage but are not anchorable:
    /// an empty string occurs everywhere and nowhere, so such notes behave
    /// like contextless ones for rendering purposes.
    pub fn anchor(&self) -> Option<&str> {
        self.context.as_deref().filter(|context| !context.is_empty())
    }
}
