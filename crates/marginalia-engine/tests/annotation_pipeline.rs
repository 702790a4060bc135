use chrono::{TimeZone, Utc};
use marginalia_engine::{
    Note, NoteId, Post, PositionTracker, TriggerMeasure, parse, render_article,
};
use pretty_assertions::assert_eq;

fn anchored(id: i64, context: &str, content: &str) -> Note {
    Note {
        id: NoteId(id),
        context: Some(context.to_string()),
        content: content.to_string(),
    }
}

#[test]
fn save_time_parse_feeds_read_time_render() {
    let raw = "# On Margins\n\nWide ||margins||(room to think) invite writing.";
    let post = Post::from_raw(
        "on-margins",
        raw,
        true,
        Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap(),
    );

    // The stored clean content carries the context phrase, not the markup.
    assert_eq!(
        post.content,
        "# On Margins\n\nWide margins invite writing."
    );

    let html = render_article(&post.content, &post.notes);
    assert!(html.contains("<mark class=\"note-trigger\" data-note-id=\"1\">margins</mark>"));
    assert!(html.contains("<small class=\"note-inline\">room to think</small>"));
}

#[test]
fn annotated_article_snapshot() {
    let notes = vec![
        anchored(
            1,
            "commonplace books",
            "Collections of quotations and reflections.",
        ),
        anchored(2, "conversation", "A dialogue with the author."),
    ];
    let clean = "# The Commonplace Book\n\n\
                 Writers kept commonplace books for centuries.\n\n\
                 Marginalia turn reading into conversation.";

    let html = render_article(clean, &notes);
    insta::assert_snapshot!("annotated_article", html.trim_end());
}

#[test]
fn position_mapping_has_one_entry_per_matched_note() {
    // Five notes, three of which occur in the text.
    let notes = vec![
        anchored(1, "alpha", "n1"),
        anchored(2, "beta", "n2"),
        anchored(3, "gamma", "n3"),
        anchored(4, "nowhere", "n4"),
        Note {
            id: NoteId(5),
            context: None,
            content: "manual".to_string(),
        },
    ];
    let html = render_article("alpha, then beta, then gamma.", &notes);

    // The host finds one trigger per injected note and reads its geometry.
    let matched: Vec<NoteId> = [1, 2, 3]
        .iter()
        .map(|&id| NoteId(id))
        .filter(|id| html.contains(&format!("data-note-id=\"{id}\"")))
        .collect();
    assert_eq!(matched.len(), 3);

    let mut tracker = PositionTracker::new();
    let ticket = tracker.schedule();
    let column_top = 12.0;
    tracker.complete(
        ticket,
        column_top,
        matched.iter().enumerate().map(|(i, &note)| TriggerMeasure {
            note,
            top: column_top + 48.0 * i as f64,
        }),
    );

    assert_eq!(tracker.positions().len(), 3);
    assert_eq!(tracker.offset(NoteId(1)), Some(0.0));
    assert_eq!(tracker.offset(NoteId(2)), Some(48.0));
    assert_eq!(tracker.offset(NoteId(3)), Some(96.0));
    // Unmatched and contextless notes are simply absent.
    assert_eq!(tracker.offset(NoteId(4)), None);
    assert_eq!(tracker.offset(NoteId(5)), None);
}

#[test]
fn dropped_note_is_absent_from_both_html_and_positions() {
    let notes = vec![anchored(1, "present", "n1"), anchored(2, "absent", "n2")];
    let html = render_article("Only the present phrase occurs.", &notes);
    assert!(html.contains("data-note-id=\"1\""));
    assert!(!html.contains("data-note-id=\"2\""));

    let mut tracker = PositionTracker::new();
    let ticket = tracker.schedule();
    tracker.complete(
        ticket,
        0.0,
        vec![TriggerMeasure {
            note: NoteId(1),
            top: 31.5,
        }],
    );
    assert_eq!(tracker.offset(NoteId(2)), None);
}

#[test]
fn editing_a_post_rebuilds_notes_from_scratch() {
    let first = parse("Keep ||this||(old note).");
    assert_eq!(first.notes.len(), 1);

    // The author rewrites the sentence; the old note set is gone entirely.
    let second = parse("Keep ||that||(new note) instead.");
    assert_eq!(second.notes.len(), 1);
    assert_eq!(second.notes[0].context, "that");
    assert_eq!(second.notes[0].content, "new note");
}
