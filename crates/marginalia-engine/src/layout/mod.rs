//! Vertical placement of margin notes beside their triggers.

mod tracker;

pub use tracker::{MeasureState, MeasureTicket, PositionTracker, TriggerMeasure};
