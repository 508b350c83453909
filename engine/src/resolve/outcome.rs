//! Per-phase results: order verdicts, unit fates and the phase report.

use serde::{Deserialize, Serialize};

use crate::board::order::{IssuedOrder, Location};
use crate::board::province::{Power, Province};
use crate::board::state::Phase;
use crate::board::unit::UnitType;

/// What happened to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Succeeded,
    Failed,
    /// The order broke a rule and was replaced by a hold (or dropped).
    Invalid,
}

/// An order and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub order: IssuedOrder,
    pub verdict: Verdict,
}

impl OrderOutcome {
    pub fn new(order: IssuedOrder, verdict: Verdict) -> Self {
        OrderOutcome { order, verdict }
    }
}

/// Where a unit ended up after a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UnitStatus {
    Stayed,
    Moved { to: Location },
    Dislodged { by: Province, retreats: Vec<Location> },
    Destroyed,
    Built,
}

/// The fate of one unit in a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFate {
    pub power: Power,
    pub unit_type: UnitType,
    pub from: Location,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// An order string that was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub power: Power,
    pub order: String,
    pub reason: String,
}

/// Everything that happened in one resolved phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub year: u16,
    pub phase: Phase,
    pub results: Vec<OrderOutcome>,
    pub units: Vec<UnitFate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejection>,
}

impl PhaseReport {
    pub fn new(year: u16, phase: Phase) -> Self {
        PhaseReport { year, phase, results: Vec::new(), units: Vec::new(), rejected: Vec::new() }
    }

    /// The verdict of the first order given to the unit at `province`.
    pub fn verdict_at(&self, province: Province) -> Option<Verdict> {
        self.results
            .iter()
            .find(|o| o.order.order.unit().is_some_and(|u| u.province() == province))
            .map(|o| o.verdict)
    }

    /// The fate of the unit that started the phase at `province`.
    pub fn fate_at(&self, province: Province) -> Option<&UnitStatus> {
        self.units.iter().find(|f| f.from.province == province).map(|f| &f.status)
    }
}
