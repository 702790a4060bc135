use std::collections::HashMap;

use regex::Regex;

use crate::models::{Note, NoteId};

/// Punctuation that may trail a matched context phrase. A run of these (plus
/// whitespace) is captured alongside the match and re-emitted outside the
/// trigger so it is not styled as part of the highlighted phrase. Includes
/// CJK closing brackets since contexts are author-chosen prose in any script.
pub const TRAILING_PUNCTUATION: &str = ".,;:!?'\"）】」』";

/// Compiled matcher over every anchorable context in a note set.
///
/// One alternation regex covers all contexts so each text node is scanned in
/// a single pass. Contexts are escaped and matched byte-for-byte, never
/// approximately.
pub struct ContextMatcher {
    regex: Regex,
    by_context: HashMap<String, NoteId>,
}

/// One context occurrence inside a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMatch<'t> {
    /// Byte offset of the context within the scanned text.
    pub start: usize,
    /// Byte offset just past the trailing punctuation run.
    pub end: usize,
    pub context: &'t str,
    pub trailing: &'t str,
    pub note: NoteId,
}

impl ContextMatcher {
    /// Builds a matcher for the anchorable notes in `notes`, or `None` when
    /// there is nothing to anchor. For a duplicated context the last note
    /// wins, mirroring map construction order in the reader.
    pub fn new(notes: &[Note], trailing_punctuation: &str) -> Option<Self> {
        let anchorable: Vec<(&str, NoteId)> = notes
            .iter()
            .filter_map(|note| note.anchor().map(|context| (context, note.id)))
            .collect();
        if anchorable.is_empty() {
            return None;
        }

        let alternation = anchorable
            .iter()
            .map(|(context, _)| regex::escape(context))
            .collect::<Vec<_>>()
            .join("|");
        let trailing_class: String = trailing_punctuation
            .chars()
            .map(|ch| regex::escape(&ch.to_string()))
            .collect();
        let pattern = format!("({alternation})([{trailing_class}\\s]*)");
        // An enormous note set can exceed the regex size limit; treat that
        // as unanchorable rather than failing the whole render.
        let regex = Regex::new(&pattern).ok()?;

        let by_context = anchorable
            .into_iter()
            .map(|(context, id)| (context.to_string(), id))
            .collect();

        Some(Self { regex, by_context })
    }

    /// Non-overlapping matches in scan order. The regex engine resumes
    /// strictly after each match, so a consumed region is never re-matched.
    pub fn matches_in<'t>(&self, text: &'t str) -> Vec<ContextMatch<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let context = caps.get(1)?;
                let trailing = caps.get(2)?;
                let note = *self.by_context.get(context.as_str())?;
                Some(ContextMatch {
                    start: context.start(),
                    end: trailing.end(),
                    context: context.as_str(),
                    trailing: trailing.as_str(),
                    note,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn anchored(id: i64, context: &str) -> Note {
        Note {
            id: NoteId(id),
            context: Some(context.to_string()),
            content: format!("note {id}"),
        }
    }

    #[test]
    fn no_anchorable_notes_means_no_matcher() {
        let notes = vec![
            Note {
                id: NoteId(1),
                context: None,
                content: "manual".to_string(),
            },
            Note {
                id: NoteId(2),
                context: Some(String::new()),
                content: "empty".to_string(),
            },
        ];
        assert!(ContextMatcher::new(&notes, TRAILING_PUNCTUATION).is_none());
    }

    #[test]
    fn finds_context_with_trailing_punctuation() {
        let notes = vec![anchored(1, "cats")];
        let matcher = ContextMatcher::new(&notes, TRAILING_PUNCTUATION).unwrap();

        let matches = matcher.matches_in("I like cats, a lot");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].context, "cats");
        assert_eq!(matches[0].trailing, ", ");
        assert_eq!(matches[0].note, NoteId(1));
        assert_eq!(&"I like cats, a lot"[matches[0].start..matches[0].end], "cats, ");
    }

    #[test]
    fn regex_metacharacters_in_contexts_are_literal() {
        let notes = vec![anchored(1, "f(x) = x+1")];
        let matcher = ContextMatcher::new(&notes, TRAILING_PUNCTUATION).unwrap();

        assert_eq!(matcher.matches_in("so f(x) = x+1 holds").len(), 1);
        assert!(matcher.matches_in("so fx = x1 holds").is_empty());
    }

    #[test]
    fn matches_do_not_overlap_within_a_node() {
        let notes = vec![anchored(1, "aa")];
        let matcher = ContextMatcher::new(&notes, "").unwrap();

        // "aaa" yields one match at the start, scanning resumes after it.
        let matches = matcher.matches_in("aaa");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[0].end, 2);
    }

    #[test]
    fn duplicate_context_resolves_to_the_last_note() {
        let notes = vec![anchored(1, "twice"), anchored(2, "twice")];
        let matcher = ContextMatcher::new(&notes, TRAILING_PUNCTUATION).unwrap();

        let matches = matcher.matches_in("said twice");
        assert_eq!(matches[0].note, NoteId(2));
    }
}
