use dioxus::prelude::*;
use marginalia_engine::{Note, NoteId};
use std::collections::HashMap;

use super::NoteCard;

/// The side column of note cards, aligned to their triggers.
///
/// Only notes with a measured position appear: a missing entry means the
/// note's context was never found in the rendered text. Cards are emitted in
/// offset order; overlapping neighbours are left where they land.
#[component]
pub fn MarginColumn(notes: Vec<Note>, positions: HashMap<NoteId, f64>) -> Element {
    let mut placed: Vec<(Note, f64)> = notes
        .into_iter()
        .filter_map(|note| positions.get(&note.id).copied().map(|offset| (note, offset)))
        .collect();
    placed.sort_by(|a, b| a.1.total_cmp(&b.1));

    rsx! {
        aside {
            class: "margin-column",
            aria_label: "Marginalia",
            for (note, offset) in placed {
                NoteCard { key: "{note.id}", note, offset }
            }
        }
    }
}
