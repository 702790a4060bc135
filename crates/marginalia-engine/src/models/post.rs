use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markup::{self, Parsed};
use crate::models::{Note, NoteId};

/// Longest excerpt shown on index pages, in characters.
const EXCERPT_LIMIT: usize = 180;

/// A piece of writing, with its margin notes.
///
/// `content` is always the deterministic clean rendering of `raw_content`:
/// both it and the note set are regenerated from the raw text whenever a post
/// is built, so the three can never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    /// Markup-free text served to readers.
    pub content: String,
    /// The author's original text, kept verbatim for re-editing.
    pub raw_content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Vec<Note>,
}

impl Post {
    /// Builds a post from raw authored text, running the markup parser and
    /// assigning note ids by order of discovery.
    pub fn from_raw(
        slug: impl Into<String>,
        raw_content: impl Into<String>,
        published: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let slug = slug.into();
        let raw_content = raw_content.into();
        let Parsed {
            clean_content,
            notes,
        } = markup::parse(&raw_content);
        let notes = notes
            .into_iter()
            .enumerate()
            .map(|(i, source)| Note::from_source(NoteId(i as i64 + 1), source))
            .collect();
        let title = derive_title(&clean_content).unwrap_or_else(|| slug.clone());
        let excerpt = derive_excerpt(&clean_content);

        Self {
            slug,
            title,
            excerpt,
            content: clean_content,
            raw_content,
            published,
            created_at,
            updated_at,
            notes,
        }
    }

    /// Notes that can be anchored into the rendered article.
    pub fn anchorable_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| note.anchor().is_some())
    }
}

/// First ATX heading of the clean content, if there is one.
fn derive_title(clean_content: &str) -> Option<String> {
    clean_content.lines().find_map(|line| {
        let line = line.trim_start();
        let text = line.trim_start_matches('#');
        let hashes = line.len() - text.len();
        if (1..=6).contains(&hashes) && text.starts_with(' ') {
            let title = text.trim();
            (!title.is_empty()).then(|| title.to_string())
        } else {
            None
        }
    })
}

/// First non-heading paragraph of the clean content, flattened and truncated
/// on a character boundary.
fn derive_excerpt(clean_content: &str) -> Option<String> {
    let paragraph = clean_content
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#'))?;
    let flat = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_LIMIT {
        Some(flat)
    } else {
        let cut: String = flat.chars().take(EXCERPT_LIMIT).collect();
        Some(format!("{}…", cut.trim_end()))
    }
}

/// Turns a post title into a URL-safe slug: lowercase, whitespace runs to a
/// single dash, everything outside `[a-z0-9_-]` dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = false;
    for ch in text.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !prev_dash && !slug.is_empty() {
                slug.push('-');
            }
            prev_dash = true;
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
            prev_dash = false;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// "5 Aug"
    Short,
    /// "5 August 2026"
    Long,
    /// "August 2026"
    MonthYear,
}

pub fn format_date(timestamp: DateTime<Utc>, format: DateFormat) -> String {
    let pattern = match format {
        DateFormat::Short => "%-d %b",
        DateFormat::Long => "%-d %B %Y",
        DateFormat::MonthYear => "%B %Y",
    };
    timestamp.format(pattern).to_string()
}
