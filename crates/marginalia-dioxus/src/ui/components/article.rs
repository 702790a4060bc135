use dioxus::document;
use dioxus::prelude::*;
use marginalia_engine::{NoteId, PositionTracker, Post, TriggerMeasure, render_article};

use super::MarginColumn;

/// Reads the column's top edge and every trigger's top edge once layout has
/// settled. Returns `[column_top, [[note_id, trigger_top], ...]]`.
const MEASURE_JS: &str = r#"
    const column = document.getElementById("article-content");
    if (!column) return [0, []];
    const triggers = [];
    for (const el of column.querySelectorAll("[data-note-id]")) {
        triggers.push([parseInt(el.dataset.noteId, 10), el.getBoundingClientRect().top]);
    }
    return [column.getBoundingClientRect().top, triggers];
"#;

/// One post's clean content beside its margin notes.
///
/// The content column renders the annotated HTML; the margin column places
/// each note at its trigger's measured offset. Measurement re-runs whenever
/// the rendered content changes or the wrapper is resized, and a newer pass
/// always supersedes a pending one.
#[component]
pub fn Article(post: ReadOnlySignal<Post>) -> Element {
    let html = use_memo(move || {
        let post = post.read();
        render_article(&post.content, &post.notes)
    });
    let tracker = use_signal(PositionTracker::new);

    use_effect(move || {
        // Subscribe to the rendered content so any change re-measures.
        let _ = html.read();
        schedule_measure(tracker);
    });

    rsx! {
        div {
            class: "article-wrapper",
            onresize: move |_| schedule_measure(tracker),
            div {
                class: "article-content",
                id: "article-content",
                dangerous_inner_html: "{html}",
            }
            MarginColumn {
                notes: post.read().notes.clone(),
                positions: tracker.read().positions().clone(),
            }
        }
    }
}

/// Schedules a measurement pass for after the webview's next layout.
///
/// The ticket taken here is only honoured if no newer pass has been
/// scheduled by the time the geometry comes back.
fn schedule_measure(mut tracker: Signal<PositionTracker>) {
    let ticket = tracker.write().schedule();
    spawn(async move {
        let value = match document::eval(MEASURE_JS).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("trigger measurement failed: {e:?}");
                return;
            }
        };
        match serde_json::from_value::<(f64, Vec<(i64, f64)>)>(value) {
            Ok((column_top, pairs)) => {
                let triggers: Vec<TriggerMeasure> = pairs
                    .into_iter()
                    .map(|(id, top)| TriggerMeasure {
                        note: NoteId(id),
                        top,
                    })
                    .collect();
                tracker.write().complete(ticket, column_top, triggers);
            }
            Err(e) => log::warn!("unexpected measurement payload: {e}"),
        }
    });
}
