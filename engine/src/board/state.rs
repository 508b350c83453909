//! Game state representation.
//!
//! Holds the authoritative snapshot of one game between phases: unit
//! positions, supply-center ownership, the current phase and year, and the
//! units waiting to retreat.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::{Location, OrderKind};
use super::province::{Coast, Power, Province, ALL_PROVINCES, PROVINCE_COUNT};
use super::unit::{Unit, UnitType};
use crate::error::EngineInvariantError;

/// A phase of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SpringMovement,
    SpringRetreat,
    FallMovement,
    FallRetreat,
    WinterAdjustment,
    /// A power reached the victory threshold; no further orders are taken.
    Completed,
}

impl Phase {
    /// The order family accepted in this phase, or `None` once the game is over.
    pub const fn kind(self) -> Option<OrderKind> {
        match self {
            Phase::SpringMovement | Phase::FallMovement => Some(OrderKind::Movement),
            Phase::SpringRetreat | Phase::FallRetreat => Some(OrderKind::Retreat),
            Phase::WinterAdjustment => Some(OrderKind::Adjustment),
            Phase::Completed => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::SpringMovement => "spring movement",
            Phase::SpringRetreat => "spring retreat",
            Phase::FallMovement => "fall movement",
            Phase::FallRetreat => "fall retreat",
            Phase::WinterAdjustment => "winter adjustment",
            Phase::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit forced out of its province, waiting for a retreat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dislodged {
    pub unit: Unit,
    /// Province the successful attack came from.
    pub attacker_from: Province,
    /// Legal retreat destinations, fixed when the unit was dislodged.
    pub retreats: Vec<Location>,
}

/// Complete board state at a point in time.
///
/// Units and owners live in fixed arrays indexed by `Province as usize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub year: u16,
    pub phase: Phase,
    pub units: [Option<Unit>; PROVINCE_COUNT],
    /// Supply-center owner; `None` for neutral centers and non-centers.
    pub sc_owner: [Option<Power>; PROVINCE_COUNT],
    /// Dislodged units in province order. Only non-empty during retreat phases.
    pub dislodged: Vec<Dislodged>,
}

const STARTING_UNITS: [(Power, UnitType, Province, Option<Coast>); 22] = [
    (Power::Austria, UnitType::Army, Province::Vie, None),
    (Power::Austria, UnitType::Army, Province::Bud, None),
    (Power::Austria, UnitType::Fleet, Province::Tri, None),
    (Power::England, UnitType::Fleet, Province::Lon, None),
    (Power::England, UnitType::Fleet, Province::Edi, None),
    (Power::England, UnitType::Army, Province::Lvp, None),
    (Power::France, UnitType::Fleet, Province::Bre, None),
    (Power::France, UnitType::Army, Province::Par, None),
    (Power::France, UnitType::Army, Province::Mar, None),
    (Power::Germany, UnitType::Fleet, Province::Kie, None),
    (Power::Germany, UnitType::Army, Province::Ber, None),
    (Power::Germany, UnitType::Army, Province::Mun, None),
    (Power::Italy, UnitType::Fleet, Province::Nap, None),
    (Power::Italy, UnitType::Army, Province::Rom, None),
    (Power::Italy, UnitType::Army, Province::Ven, None),
    (Power::Russia, UnitType::Army, Province::Mos, None),
    (Power::Russia, UnitType::Army, Province::War, None),
    (Power::Russia, UnitType::Fleet, Province::Sev, None),
    (Power::Russia, UnitType::Fleet, Province::Stp, Some(Coast::South)),
    (Power::Turkey, UnitType::Fleet, Province::Ank, None),
    (Power::Turkey, UnitType::Army, Province::Con, None),
    (Power::Turkey, UnitType::Army, Province::Smy, None),
];

impl GameState {
    /// Creates an empty board with no units or owners.
    pub fn empty(year: u16, phase: Phase) -> Self {
        GameState { year, phase, units: [None; PROVINCE_COUNT], sc_owner: [None; PROVINCE_COUNT], dislodged: Vec::new() }
    }

    /// The standard 1901 opening position, starting in the given year.
    pub fn standard(year: u16) -> Self {
        let mut state = GameState::empty(year, Phase::SpringMovement);
        for (power, unit_type, province, coast) in STARTING_UNITS {
            state.units[province as usize] = Some(Unit::new(power, unit_type, Location { province, coast }));
        }
        for p in ALL_PROVINCES {
            state.sc_owner[p as usize] = p.home_power();
        }
        state
    }

    #[inline]
    pub fn unit_at(&self, province: Province) -> Option<&Unit> {
        self.units[province as usize].as_ref()
    }

    /// Places a unit. Returns false if its province is already occupied.
    pub fn place_unit(&mut self, unit: Unit) -> bool {
        let slot = &mut self.units[unit.location.province as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(unit);
        true
    }

    pub fn remove_unit(&mut self, province: Province) -> Option<Unit> {
        self.units[province as usize].take()
    }

    pub fn set_sc_owner(&mut self, province: Province, owner: Option<Power>) {
        self.sc_owner[province as usize] = owner;
    }

    /// All units on the board in province order.
    pub fn all_units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().flatten()
    }

    pub fn units_of(&self, power: Power) -> impl Iterator<Item = &Unit> + '_ {
        self.all_units().filter(move |u| u.power == power)
    }

    pub fn unit_count(&self, power: Power) -> usize {
        self.units_of(power).count()
    }

    /// Supply centers currently owned by a power.
    pub fn centers_of(&self, power: Power) -> impl Iterator<Item = Province> + '_ {
        ALL_PROVINCES.into_iter().filter(move |p| self.sc_owner[*p as usize] == Some(power))
    }

    pub fn center_count(&self, power: Power) -> usize {
        self.centers_of(power).count()
    }

    pub fn dislodged_at(&self, province: Province) -> Option<&Dislodged> {
        self.dislodged.iter().find(|d| d.unit.location.province == province)
    }

    /// Checks the between-phase invariants: each unit sits in the slot of its
    /// own province, and no dislodged unit shares a province with another
    /// dislodged unit.
    pub fn check_invariants(&self) -> Result<(), EngineInvariantError> {
        for (idx, slot) in self.units.iter().enumerate() {
            if let Some(unit) = slot {
                if unit.location.province as usize != idx {
                    let recorded = Province::from_index(idx).unwrap_or(unit.location.province);
                    return Err(EngineInvariantError::MisplacedUnit { recorded, actual: unit.location.province });
                }
            }
        }
        let mut seen = [false; PROVINCE_COUNT];
        for d in &self.dislodged {
            let idx = d.unit.location.province as usize;
            if seen[idx] {
                return Err(EngineInvariantError::DoubleOccupancy(d.unit.location.province));
            }
            seen[idx] = true;
        }
        Ok(())
    }

    /// A serializable view of the board.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            year: self.year,
            phase: self.phase,
            units: self.all_units().copied().collect(),
            centers: ALL_PROVINCES
                .into_iter()
                .filter_map(|p| self.sc_owner[p as usize].map(|owner| (p, owner)))
                .collect(),
            dislodged: self.dislodged.clone(),
        }
    }
}

/// JSON view of a `GameState`, as returned by the `board` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub year: u16,
    pub phase: Phase,
    pub units: Vec<Unit>,
    pub centers: BTreeMap<Province, Power>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dislodged: Vec<Dislodged>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::ALL_POWERS;

    #[test]
    fn standard_position() {
        let state = GameState::standard(1901);
        assert_eq!(state.phase, Phase::SpringMovement);
        assert_eq!(state.all_units().count(), 22);
        assert_eq!(state.unit_count(Power::Russia), 4);
        assert_eq!(state.center_count(Power::Russia), 4);
        for power in ALL_POWERS {
            assert_eq!(state.unit_count(power), state.center_count(power), "{:?}", power);
        }
        let stp = state.unit_at(Province::Stp).unwrap();
        assert_eq!(stp.location.coast, Some(Coast::South));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn place_unit_rejects_occupied() {
        let mut state = GameState::empty(1901, Phase::SpringMovement);
        let unit = Unit::new(Power::France, UnitType::Army, Location::new(Province::Par));
        assert!(state.place_unit(unit));
        assert!(!state.place_unit(Unit::new(Power::Germany, UnitType::Army, Location::new(Province::Par))));
        assert_eq!(state.remove_unit(Province::Par), Some(unit));
        assert!(state.unit_at(Province::Par).is_none());
    }

    #[test]
    fn misplaced_unit_is_caught() {
        let mut state = GameState::empty(1901, Phase::SpringMovement);
        state.units[Province::Par as usize] = Some(Unit::new(Power::France, UnitType::Army, Location::new(Province::Bur)));
        assert!(matches!(state.check_invariants(), Err(EngineInvariantError::MisplacedUnit { .. })));
    }

    #[test]
    fn phase_kinds() {
        assert_eq!(Phase::SpringMovement.kind(), Some(OrderKind::Movement));
        assert_eq!(Phase::FallRetreat.kind(), Some(OrderKind::Retreat));
        assert_eq!(Phase::WinterAdjustment.kind(), Some(OrderKind::Adjustment));
        assert_eq!(Phase::Completed.kind(), None);
    }

    #[test]
    fn snapshot_serializes() {
        let state = GameState::standard(1901);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["phase"], "spring_movement");
        assert_eq!(json["centers"]["mos"], "RUS");
        assert_eq!(json["units"].as_array().unwrap().len(), 22);
        assert!(json.get("dislodged").is_none());
    }
}
