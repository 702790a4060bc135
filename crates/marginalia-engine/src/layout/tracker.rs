use std::collections::HashMap;

use crate::models::NoteId;

/// Measurement lifecycle for one rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureState {
    #[default]
    Unmeasured,
    Scheduled,
    Measured,
}

/// Handle for one scheduled measurement pass.
///
/// Scheduling again invalidates any outstanding ticket, so a stale pass can
/// never overwrite the results of a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureTicket(u64);

/// One trigger's top edge, as read by the host once layout has settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerMeasure {
    pub note: NoteId,
    pub top: f64,
}

/// Owns the note-id-to-vertical-offset mapping for one rendered view.
///
/// The tracker never touches the host's layout engine. The host schedules a
/// pass whenever the content, the note set, or the viewport changes, reads
/// trigger geometry after the next layout, and completes the ticket it was
/// handed. Offsets are relative to the top of the containing column and may
/// be fractional.
///
/// A note with no trigger in the view has no entry; consumers treat a missing
/// entry as "do not place this note in the margin". Adjacent notes are not
/// pushed apart: overlap avoidance is left to consumers that want it.
#[derive(Debug, Default)]
pub struct PositionTracker {
    state: MeasureState,
    generation: u64,
    positions: HashMap<NoteId, f64>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MeasureState {
        self.state
    }

    /// Schedules a measurement pass, superseding any pending one.
    pub fn schedule(&mut self) -> MeasureTicket {
        self.generation += 1;
        self.state = MeasureState::Scheduled;
        MeasureTicket(self.generation)
    }

    /// Whether `ticket` is still the pass the tracker is waiting on.
    pub fn is_current(&self, ticket: MeasureTicket) -> bool {
        self.state == MeasureState::Scheduled && ticket.0 == self.generation
    }

    /// Completes a measurement pass.
    ///
    /// Offsets become trigger tops relative to `column_top`; when a note id
    /// repeats, the first measurement wins (first occurrence in document
    /// order). Returns `false` and changes nothing for a superseded ticket.
    pub fn complete(
        &mut self,
        ticket: MeasureTicket,
        column_top: f64,
        triggers: impl IntoIterator<Item = TriggerMeasure>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.positions.clear();
        for trigger in triggers {
            self.positions
                .entry(trigger.note)
                .or_insert(trigger.top - column_top);
        }
        self.state = MeasureState::Measured;
        true
    }

    /// Vertical offset for a note, if its trigger was found in the view.
    pub fn offset(&self, note: NoteId) -> Option<f64> {
        self.positions.get(&note).copied()
    }

    pub fn positions(&self) -> &HashMap<NoteId, f64> {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(id: i64, top: f64) -> TriggerMeasure {
        TriggerMeasure {
            note: NoteId(id),
            top,
        }
    }

    #[test]
    fn starts_unmeasured_with_no_positions() {
        let tracker = PositionTracker::new();
        assert_eq!(tracker.state(), MeasureState::Unmeasured);
        assert!(tracker.positions().is_empty());
    }

    #[test]
    fn schedule_then_complete_reaches_measured() {
        let mut tracker = PositionTracker::new();
        let ticket = tracker.schedule();
        assert_eq!(tracker.state(), MeasureState::Scheduled);

        assert!(tracker.complete(ticket, 100.0, vec![measure(1, 140.5)]));
        assert_eq!(tracker.state(), MeasureState::Measured);
        assert_eq!(tracker.offset(NoteId(1)), Some(40.5));
    }

    #[test]
    fn a_new_schedule_supersedes_a_pending_ticket() {
        let mut tracker = PositionTracker::new();
        let stale = tracker.schedule();
        let current = tracker.schedule();

        assert!(!tracker.complete(stale, 0.0, vec![measure(1, 10.0)]));
        assert_eq!(tracker.state(), MeasureState::Scheduled);
        assert!(tracker.positions().is_empty());

        assert!(tracker.complete(current, 0.0, vec![measure(1, 20.0)]));
        assert_eq!(tracker.offset(NoteId(1)), Some(20.0));
    }

    #[test]
    fn completing_twice_with_the_same_ticket_is_rejected() {
        let mut tracker = PositionTracker::new();
        let ticket = tracker.schedule();
        assert!(tracker.complete(ticket, 0.0, vec![measure(1, 5.0)]));
        assert!(!tracker.complete(ticket, 0.0, vec![measure(1, 99.0)]));
        assert_eq!(tracker.offset(NoteId(1)), Some(5.0));
    }

    #[test]
    fn rescheduling_after_a_content_change_replaces_positions() {
        let mut tracker = PositionTracker::new();
        let first = tracker.schedule();
        tracker.complete(first, 0.0, vec![measure(1, 10.0), measure(2, 50.0)]);

        // Content changed: note 2's trigger is gone.
        let second = tracker.schedule();
        assert_eq!(tracker.state(), MeasureState::Scheduled);
        tracker.complete(second, 0.0, vec![measure(1, 12.0)]);

        assert_eq!(tracker.offset(NoteId(1)), Some(12.0));
        assert_eq!(tracker.offset(NoteId(2)), None);
    }

    #[test]
    fn one_entry_per_note_id_first_measurement_wins() {
        let mut tracker = PositionTracker::new();
        let ticket = tracker.schedule();
        tracker.complete(
            ticket,
            10.0,
            vec![measure(1, 30.0), measure(1, 90.0), measure(2, 55.25)],
        );

        assert_eq!(tracker.positions().len(), 2);
        assert_eq!(tracker.offset(NoteId(1)), Some(20.0));
        assert_eq!(tracker.offset(NoteId(2)), Some(45.25));
    }

    #[test]
    fn missing_triggers_simply_have_no_entry() {
        let mut tracker = PositionTracker::new();
        let ticket = tracker.schedule();
        tracker.complete(ticket, 0.0, vec![measure(3, 7.0)]);

        assert_eq!(tracker.offset(NoteId(1)), None);
        assert_eq!(tracker.positions().len(), 1);
    }
}
