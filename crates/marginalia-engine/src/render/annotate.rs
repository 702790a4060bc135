use std::collections::{HashMap, HashSet};

use pulldown_cmark::{Event, Options, Parser, html};

use crate::models::{Note, NoteId};

use super::matcher::{ContextMatcher, TRAILING_PUNCTUATION};

/// Outcome of visiting one text node: leave it alone, or splice in a
/// replacement sequence of events.
pub enum TextVisit {
    Unchanged,
    Replaced(Vec<Event<'static>>),
}

/// Injects note triggers into the text nodes of a rendered post.
///
/// Each matched context phrase is wrapped in a `<mark>` trigger carrying the
/// note id, followed by any trailing punctuation (outside the trigger, so it
/// is not styled), followed by an invisible duplicate of the note body for
/// print and no-script readers.
pub struct Annotator {
    matcher: Option<ContextMatcher>,
    contents: HashMap<NoteId, String>,
    placed: HashSet<NoteId>,
}

impl Annotator {
    pub fn new(notes: &[Note]) -> Self {
        Self::with_trailing_punctuation(notes, TRAILING_PUNCTUATION)
    }

    pub fn with_trailing_punctuation(notes: &[Note], trailing_punctuation: &str) -> Self {
        Self {
            matcher: ContextMatcher::new(notes, trailing_punctuation),
            contents: notes
                .iter()
                .map(|note| (note.id, note.content.clone()))
                .collect(),
            placed: HashSet::new(),
        }
    }

    /// Note ids that have had a trigger injected so far.
    pub fn placed(&self) -> &HashSet<NoteId> {
        &self.placed
    }

    /// Visits one text node.
    ///
    /// Only the first-encountered occurrence of each note's context gets a
    /// trigger; later occurrences stay literal text. Scanning resumes
    /// strictly after each consumed match, so matches never overlap within a
    /// node.
    pub fn visit_text(&mut self, text: &str) -> TextVisit {
        let Some(matcher) = &self.matcher else {
            return TextVisit::Unchanged;
        };

        let mut events: Vec<Event<'static>> = Vec::new();
        let mut literal_start = 0;
        for m in matcher.matches_in(text) {
            if !self.placed.insert(m.note) {
                continue;
            }
            if m.start > literal_start {
                events.push(Event::Text(text[literal_start..m.start].to_string().into()));
            }
            events.push(Event::InlineHtml(
                format!(r#"<mark class="note-trigger" data-note-id="{}">"#, m.note).into(),
            ));
            events.push(Event::Text(m.context.to_string().into()));
            events.push(Event::InlineHtml("</mark>".into()));
            if !m.trailing.is_empty() {
                events.push(Event::Text(m.trailing.to_string().into()));
            }
            if let Some(content) = self.contents.get(&m.note) {
                events.push(Event::InlineHtml(
                    format!(
                        r#"<small class="note-inline">{}</small>"#,
                        html_escape::encode_text(content)
                    )
                    .into(),
                ));
            }
            literal_start = m.end;
        }

        if events.is_empty() {
            return TextVisit::Unchanged;
        }
        if literal_start < text.len() {
            events.push(Event::Text(text[literal_start..].to_string().into()));
        }
        TextVisit::Replaced(events)
    }
}

/// Maps a markdown event stream through the annotator, expanding text nodes
/// into trigger-wrapped replacements where contexts match.
pub fn annotate_events<'a>(
    events: impl Iterator<Item = Event<'a>>,
    annotator: &mut Annotator,
) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    for event in events {
        match event {
            Event::Text(text) => match annotator.visit_text(&text) {
                TextVisit::Unchanged => out.push(Event::Text(text)),
                TextVisit::Replaced(replacement) => out.extend(replacement),
            },
            other => out.push(other),
        }
    }
    out
}

/// Renders a post's clean content to HTML with note triggers injected.
pub fn render_article(clean_content: &str, notes: &[Note]) -> String {
    let mut annotator = Annotator::new(notes);
    let parser = Parser::new_ext(clean_content, Options::empty());
    let events = annotate_events(parser, &mut annotator);

    let mut out = String::with_capacity(clean_content.len() * 2);
    html::push_html(&mut out, events.into_iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteId;
    use pretty_assertions::assert_eq;

    fn anchored(id: i64, context: &str, content: &str) -> Note {
        Note {
            id: NoteId(id),
            context: Some(context.to_string()),
            content: content.to_string(),
        }
    }

    #[test]
    fn wraps_the_context_in_a_trigger() {
        let notes = vec![anchored(1, "world", "a note")];
        let html = render_article("Hello world today", &notes);
        assert_eq!(
            html,
            "<p>Hello <mark class=\"note-trigger\" data-note-id=\"1\">world</mark> \
             <small class=\"note-inline\">a note</small>today</p>\n"
        );
    }

    #[test]
    fn trailing_punctuation_stays_outside_the_trigger() {
        let notes = vec![anchored(1, "cats", "they know")];
        let html = render_article("I like cats, a lot", &notes);
        assert!(html.contains(">cats</mark>, "));
        assert!(!html.contains("cats,</mark>"));
    }

    #[test]
    fn absent_context_injects_nothing() {
        let notes = vec![anchored(1, "zebra", "never seen")];
        let html = render_article("Hello world", &notes);
        assert_eq!(html, "<p>Hello world</p>\n");
    }

    #[test]
    fn context_split_by_inline_markup_is_not_matched() {
        let notes = vec![anchored(1, "hello", "split")];
        let html = render_article("he**ll**o world", &notes);
        assert!(!html.contains("note-trigger"));
        assert!(html.contains("<strong>ll</strong>"));
    }

    #[test]
    fn only_the_first_occurrence_gets_a_trigger() {
        let notes = vec![anchored(1, "echo", "once")];
        let html = render_article("echo and echo again", &notes);
        assert_eq!(html.matches("note-trigger").count(), 1);
        assert!(html.contains("and echo again"));
    }

    #[test]
    fn first_occurrence_wins_across_blocks() {
        let notes = vec![anchored(1, "echo", "once")];
        let html = render_article("First echo.\n\nSecond echo.", &notes);
        assert_eq!(html.matches("note-trigger").count(), 1);
        assert!(html.starts_with("<p>First "));
    }

    #[test]
    fn notes_without_context_are_skipped_entirely() {
        let notes = vec![
            Note {
                id: NoteId(1),
                context: None,
                content: "manual note".to_string(),
            },
            Note {
                id: NoteId(2),
                context: Some(String::new()),
                content: "empty anchor".to_string(),
            },
        ];
        let html = render_article("Plain text body", &notes);
        assert_eq!(html, "<p>Plain text body</p>\n");
    }

    #[test]
    fn two_notes_in_one_text_node() {
        let notes = vec![anchored(1, "first", "n1"), anchored(2, "second", "n2")];
        let html = render_article("The first and the second.", &notes);
        assert!(html.contains("data-note-id=\"1\">first</mark>"));
        assert!(html.contains("data-note-id=\"2\">second</mark>"));
    }

    #[test]
    fn inline_duplicate_is_escaped() {
        let notes = vec![anchored(1, "target", "<b>bold</b> & co")];
        let html = render_article("A target here", &notes);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; co"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn punctuation_class_is_configurable() {
        let notes = vec![anchored(1, "cats", "they know")];
        let mut annotator = Annotator::with_trailing_punctuation(&notes, "!");
        let parser = Parser::new_ext("I like cats, a lot", Options::empty());
        let events = annotate_events(parser, &mut annotator);

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        // The comma is not in the configured class, so it is plain literal
        // text after the inline duplicate rather than a captured trailer.
        assert!(html.contains("</small>, a lot"));
    }

    #[test]
    fn placed_reports_injected_notes() {
        let notes = vec![anchored(1, "found", "n1"), anchored(2, "missing", "n2")];
        let mut annotator = Annotator::new(&notes);
        let parser = Parser::new_ext("Only found here.", Options::empty());
        let _ = annotate_events(parser, &mut annotator);

        assert!(annotator.placed().contains(&NoteId(1)));
        assert!(!annotator.placed().contains(&NoteId(2)));
    }
}
