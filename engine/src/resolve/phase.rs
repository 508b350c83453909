//! Phase sequencing.
//!
//! Resolves the orders of the current phase, commits the result to the
//! game state and moves the state to the next phase:
//!
//! - Spring Movement -> Spring Retreat (if a unit can retreat) or Fall Movement
//! - Spring Retreat  -> Fall Movement
//! - Fall Movement   -> Fall Retreat (if a unit can retreat), else year end
//! - Fall Retreat    -> year end
//! - year end        -> Completed (solo), Winter Adjustment (counts differ) or next Spring
//! - Winter Adjustment -> next Spring Movement

use tracing::info;

use crate::board::order::IssuedOrder;
use crate::board::province::{Power, ALL_POWERS, ALL_PROVINCES};
use crate::board::state::{Dislodged, GameState, Phase};
use crate::config::EngineConfig;
use crate::error::EngineInvariantError;

use super::adjudicator::{apply_adjudication, Adjudicator};
use super::adjustment::{adjustment_needed, apply_adjustments, resolve_adjustments};
use super::outcome::{OrderOutcome, PhaseReport, UnitFate, UnitStatus};
use super::retreat::{apply_retreats, resolve_retreats, retreat_options};

/// Captures supply centers: each center takes the owner of the unit standing in it.
pub fn update_sc_ownership(state: &mut GameState) {
    for p in ALL_PROVINCES {
        if !p.is_supply_center() {
            continue;
        }
        if let Some(unit) = state.unit_at(p) {
            state.sc_owner[p as usize] = Some(unit.power);
        }
    }
}

/// The power holding at least `victory_centers` supply centers, if any.
pub fn solo_winner(state: &GameState, victory_centers: usize) -> Option<Power> {
    ALL_POWERS.into_iter().find(|&p| state.center_count(p) >= victory_centers)
}

/// Resolves the current phase with the given orders and advances the state.
///
/// `orders` must be validated for the current phase. The state is only
/// modified once resolution has fully succeeded.
pub fn resolve_phase(
    state: &mut GameState,
    orders: &[IssuedOrder],
    config: &EngineConfig,
) -> Result<PhaseReport, EngineInvariantError> {
    let mut next = state.clone();
    let mut report = PhaseReport::new(state.year, state.phase);

    match state.phase {
        Phase::SpringMovement | Phase::FallMovement => resolve_movement(&mut next, orders, config, &mut report)?,
        Phase::SpringRetreat | Phase::FallRetreat => {
            let res = resolve_retreats(&next, orders);
            apply_retreats(&mut next, &res)?;
            report.results = res.outcomes;
            report.units = res.fates;
        }
        Phase::WinterAdjustment => {
            let res = resolve_adjustments(&next, orders);
            apply_adjustments(&mut next, &res)?;
            report.results = res.outcomes;
            report.units = res.fates;
        }
        Phase::Completed => return Ok(report),
    }

    next.check_invariants()?;
    advance(&mut next, config);
    info!(year = report.year, from = %report.phase, to = %next.phase, "phase resolved");
    *state = next;
    Ok(report)
}

fn resolve_movement(
    state: &mut GameState,
    orders: &[IssuedOrder],
    config: &EngineConfig,
    report: &mut PhaseReport,
) -> Result<(), EngineInvariantError> {
    let adj = Adjudicator::new(config.max_resolution_passes).adjudicate(state, orders)?;
    let before = state.clone();
    apply_adjudication(state, &adj)?;

    report.results = adj.verdicts.iter().map(|&(order, verdict)| OrderOutcome::new(order, verdict)).collect();

    for unit in before.all_units() {
        let from = unit.location;
        let status = if let Some(d) = adj.dislodged.iter().find(|d| d.unit.location == from) {
            let retreats = retreat_options(state, d, &adj.contested);
            if retreats.is_empty() {
                info!(unit = %unit, "dislodged with nowhere to go, disbanded");
                UnitStatus::Destroyed
            } else {
                state.dislodged.push(Dislodged { unit: *unit, attacker_from: d.attacker_from, retreats: retreats.clone() });
                UnitStatus::Dislodged { by: d.attacker_from, retreats }
            }
        } else if let Some(&(_, to)) = adj.moves.iter().find(|(origin, _)| *origin == from.province) {
            UnitStatus::Moved { to }
        } else {
            UnitStatus::Stayed
        };
        report.units.push(UnitFate { power: unit.power, unit_type: unit.unit_type, from, status });
    }
    Ok(())
}

/// Moves a freshly resolved state to its next phase.
fn advance(state: &mut GameState, config: &EngineConfig) {
    state.phase = match state.phase {
        Phase::SpringMovement if !state.dislodged.is_empty() => Phase::SpringRetreat,
        Phase::SpringMovement | Phase::SpringRetreat => Phase::FallMovement,
        Phase::FallMovement if !state.dislodged.is_empty() => Phase::FallRetreat,
        Phase::FallMovement | Phase::FallRetreat => {
            update_sc_ownership(state);
            if let Some(winner) = solo_winner(state, config.victory_centers) {
                info!(power = %winner, year = state.year, "solo victory");
                Phase::Completed
            } else if adjustment_needed(state) {
                Phase::WinterAdjustment
            } else {
                state.year += 1;
                Phase::SpringMovement
            }
        }
        Phase::WinterAdjustment => {
            state.year += 1;
            Phase::SpringMovement
        }
        Phase::Completed => Phase::Completed,
    };
}
