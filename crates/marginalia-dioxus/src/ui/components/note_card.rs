use dioxus::prelude::*;
use marginalia_engine::Note;

#[component]
pub fn NoteCard(note: Note, offset: f64) -> Element {
    rsx! {
        div {
            class: "note-card",
            style: "top: {offset}px",
            "data-note-id": "{note.id}",
            "{note.content}"
        }
    }
}
