use serde::Serialize;

use super::{cursor::Cursor, kinds::Annotation};

/// A note extracted from raw markup, before storage assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceNote {
    /// The anchor phrase, left behind verbatim in the clean text.
    pub context: String,
    /// The note body shown in the margin.
    pub content: String,
}

/// Result of stripping markup from raw post text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed {
    pub clean_content: String,
    /// Notes in order of appearance in the raw text.
    pub notes: Vec<SourceNote>,
}

/// Extracts `||context||(note)` annotations from raw post text.
///
/// Matching is non-greedy on both delimited groups and never crosses a line
/// break. Unmatched delimiters pass through as literal text, which makes this
/// a total function over any input: parsing never fails, and re-parsing the
/// clean output returns it unchanged with no notes.
pub fn parse(raw_content: &str) -> Parsed {
    let mut cur = Cursor::new(raw_content);
    let mut clean_content = String::with_capacity(raw_content.len());
    let mut notes = Vec::new();
    let mut literal_start = 0;

    while !cur.eof() {
        if cur.starts_with(Annotation::FENCE)
            && let Some(found) = try_parse_annotation(&mut cur, raw_content)
        {
            clean_content.push_str(&raw_content[literal_start..found.start]);
            clean_content.push_str(&found.context);
            literal_start = cur.pos();
            notes.push(SourceNote {
                context: found.context,
                content: found.content,
            });
            continue;
        }
        cur.bump();
    }
    clean_content.push_str(&raw_content[literal_start..]);

    Parsed {
        clean_content,
        notes,
    }
}

struct Found {
    start: usize,
    context: String,
    content: String,
}

/// Attempts to parse one annotation at the cursor (which sits on `||`).
///
/// The closing fence is the nearest `||` immediately followed by `(`, so a
/// context may itself contain stray pipes. On failure the cursor is restored
/// and the caller treats the opening fence as literal text.
fn try_parse_annotation(cur: &mut Cursor<'_>, src: &str) -> Option<Found> {
    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(Annotation::FENCE.len());
    let context_start = cur.pos();

    // Nearest closing fence on the same line.
    loop {
        match cur.peek() {
            None | Some(b'\n') | Some(b'\r') => {
                *cur = saved;
                return None;
            }
            _ => {}
        }
        if cur.starts_with(Annotation::FENCE)
            && src.as_bytes().get(cur.pos() + Annotation::FENCE.len())
                == Some(&Annotation::NOTE_OPEN)
        {
            break;
        }
        cur.bump();
    }
    let context_end = cur.pos();
    cur.bump_n(Annotation::FENCE.len() + 1); // closing fence and (

    let content_start = cur.pos();
    loop {
        match cur.peek() {
            None | Some(b'\n') | Some(b'\r') => {
                *cur = saved;
                return None;
            }
            Some(Annotation::NOTE_CLOSE) => break,
            Some(_) => {
                cur.bump();
            }
        }
    }
    let content_end = cur.pos();
    cur.bump(); // )

    Some(Found {
        start,
        context: src[context_start..context_end].to_string(),
        content: src[content_start..content_end].to_string(),
    })
}
