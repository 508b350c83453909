//! Order resolution.
//!
//! Movement orders are adjudicated all at once (`adjudicator`), dislodged
//! units retreat (`retreat`), and winter brings builds and disbands
//! (`adjustment`). `phase` ties the three together and advances the calendar.

pub mod adjudicator;
pub mod adjustment;
pub mod outcome;
pub mod phase;
pub mod retreat;

pub use adjudicator::{apply_adjudication, Adjudication, Adjudicator, Decision, Displacement};
pub use adjustment::{adjustment_for, adjustment_needed, civil_disorder, free_home_centers, Adjustment};
pub use outcome::{OrderOutcome, PhaseReport, Rejection, UnitFate, UnitStatus, Verdict};
pub use phase::{resolve_phase, solo_winner, update_sc_ownership};
pub use retreat::retreat_options;
