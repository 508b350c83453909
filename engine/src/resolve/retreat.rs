//! Retreat-phase resolution.
//!
//! Retreat destinations are fixed when a unit is dislodged. During the
//! retreat phase two units retreating to the same province are both
//! destroyed, and dislodged units left without an order are disbanded.

use tracing::info;

use crate::board::adjacency::map;
use crate::board::order::{IssuedOrder, Location, Order, OrderUnit};
use crate::board::province::PROVINCE_COUNT;
use crate::board::state::GameState;
use crate::board::unit::Unit;
use crate::error::EngineInvariantError;

use super::adjudicator::Displacement;
use super::outcome::{OrderOutcome, UnitFate, UnitStatus, Verdict};

/// Where a dislodged unit may go, given the board after movement.
///
/// Excluded: occupied provinces, provinces where a move bounced, and the
/// attacker's origin unless the attack came by convoy.
pub fn retreat_options(after: &GameState, d: &Displacement, contested: &[bool; PROVINCE_COUNT]) -> Vec<Location> {
    map()
        .reachable(d.unit.unit_type, d.unit.location)
        .into_iter()
        .filter(|loc| {
            let p = loc.province;
            after.unit_at(p).is_none()
                && !contested[p as usize]
                && (d.by_convoy || p != d.attacker_from)
        })
        .collect()
}

/// The outcome of a retreat phase, ready to apply.
#[derive(Debug, Clone, Default)]
pub struct RetreatResolution {
    pub outcomes: Vec<OrderOutcome>,
    pub fates: Vec<UnitFate>,
    /// Units that reach their retreat destination.
    pub arrivals: Vec<Unit>,
}

/// Resolves retreat orders against the dislodged units of `state`.
///
/// `orders` must already be validated: each names a dislodged unit and, for a
/// retreat, one of its recorded destinations.
pub fn resolve_retreats(state: &GameState, orders: &[IssuedOrder]) -> RetreatResolution {
    let mut res = RetreatResolution::default();
    let mut target_count = [0u8; PROVINCE_COUNT];
    for o in orders {
        if let Order::Retreat { dest, .. } = o.order {
            target_count[dest.province as usize] += 1;
        }
    }

    for d in &state.dislodged {
        let unit = d.unit;
        let from = unit.location;
        let order = orders
            .iter()
            .find(|o| o.order.unit().is_some_and(|u| u.province() == from.province));
        let fate = |status| UnitFate { power: unit.power, unit_type: unit.unit_type, from, status };

        match order {
            Some(o) => match o.order {
                Order::Retreat { dest, .. } if target_count[dest.province as usize] == 1 => {
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Succeeded));
                    res.arrivals.push(Unit { location: dest, ..unit });
                    res.fates.push(fate(UnitStatus::Moved { to: dest }));
                }
                Order::Retreat { .. } => {
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Failed));
                    res.fates.push(fate(UnitStatus::Destroyed));
                }
                _ => {
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Succeeded));
                    res.fates.push(fate(UnitStatus::Destroyed));
                }
            },
            None => {
                info!(unit = %unit, "no retreat order, unit disbanded");
                let disband = Order::Disband { unit: OrderUnit::new(unit.unit_type, from) };
                res.outcomes.push(OrderOutcome::new(IssuedOrder::new(unit.power, disband), Verdict::Succeeded));
                res.fates.push(fate(UnitStatus::Destroyed));
            }
        }
    }
    res
}

/// Places every arriving unit and clears the dislodged set.
pub fn apply_retreats(state: &mut GameState, res: &RetreatResolution) -> Result<(), EngineInvariantError> {
    for unit in &res.arrivals {
        if !state.place_unit(*unit) {
            return Err(EngineInvariantError::DoubleOccupancy(unit.location.province));
        }
    }
    state.dislodged.clear();
    Ok(())
}
