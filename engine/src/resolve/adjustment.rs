//! Winter adjustment: builds, disbands and civil disorder.
//!
//! A power with more supply centers than units may build in its free owned
//! home centers; a power with more units than centers must disband. Missing
//! disbands are chosen automatically, farthest from home first.

use std::cmp::Reverse;

use tracing::info;

use crate::board::adjacency::map;
use crate::board::order::{IssuedOrder, Order, OrderUnit};
use crate::board::province::{Power, Province, ALL_POWERS, ALL_PROVINCES};
use crate::board::state::GameState;
use crate::board::unit::{Unit, UnitType};
use crate::error::EngineInvariantError;

use super::outcome::{OrderOutcome, UnitFate, UnitStatus, Verdict};

/// What a power must or may do in the adjustment phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Builds(usize),
    Disbands(usize),
    Settled,
}

impl Adjustment {
    pub fn count(self) -> usize {
        match self {
            Adjustment::Builds(n) | Adjustment::Disbands(n) => n,
            Adjustment::Settled => 0,
        }
    }
}

/// Home centers of `power` it owns and nobody occupies.
pub fn free_home_centers(state: &GameState, power: Power) -> Vec<Province> {
    ALL_PROVINCES
        .into_iter()
        .filter(|&p| {
            p.home_power() == Some(power) && state.sc_owner[p as usize] == Some(power) && state.unit_at(p).is_none()
        })
        .collect()
}

/// The adjustment a power faces. Builds are capped by free owned home centers.
pub fn adjustment_for(state: &GameState, power: Power) -> Adjustment {
    let centers = state.center_count(power);
    let units = state.unit_count(power);
    if centers > units {
        match (centers - units).min(free_home_centers(state, power).len()) {
            0 => Adjustment::Settled,
            n => Adjustment::Builds(n),
        }
    } else if units > centers {
        Adjustment::Disbands(units - centers)
    } else {
        Adjustment::Settled
    }
}

/// Whether any power's unit count differs from its center count.
pub fn adjustment_needed(state: &GameState) -> bool {
    ALL_POWERS.into_iter().any(|p| state.center_count(p) != state.unit_count(p))
}

/// Picks `count` units of `power` to remove, skipping `spared`.
///
/// Units farthest from an owned home center go first (any home center if the
/// power owns none), then fleets before armies, then province order.
pub fn civil_disorder(state: &GameState, power: Power, count: usize, spared: &[Province]) -> Vec<Province> {
    let owns_home = ALL_PROVINCES
        .into_iter()
        .any(|p| p.home_power() == Some(power) && state.sc_owner[p as usize] == Some(power));
    let is_home = |p: Province| p.home_power() == Some(power) && (!owns_home || state.sc_owner[p as usize] == Some(power));

    let mut candidates: Vec<(u32, bool, Province)> = state
        .units_of(power)
        .map(|u| u.location.province)
        .filter(|p| !spared.contains(p))
        .map(|p| {
            let distance = map().distance_to(p, &is_home).unwrap_or(u32::MAX);
            let is_fleet = state.unit_at(p).is_some_and(|u| u.unit_type == UnitType::Fleet);
            (distance, is_fleet, p)
        })
        .collect();
    candidates.sort_by_key(|&(distance, is_fleet, p)| (Reverse(distance), Reverse(is_fleet), p));
    candidates.into_iter().take(count).map(|(_, _, p)| p).collect()
}

/// The outcome of an adjustment phase, ready to apply.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentResolution {
    pub outcomes: Vec<OrderOutcome>,
    pub fates: Vec<UnitFate>,
    pub builds: Vec<Unit>,
    pub removals: Vec<Province>,
}

/// Resolves validated adjustment orders for every power.
///
/// Orders beyond a power's allowance fail. Short disbands are filled in by
/// civil disorder; short builds are simply forfeited.
pub fn resolve_adjustments(state: &GameState, orders: &[IssuedOrder]) -> AdjustmentResolution {
    let mut res = AdjustmentResolution::default();

    for power in ALL_POWERS {
        let adjustment = adjustment_for(state, power);
        let mut used = 0;
        for o in orders.iter().filter(|o| o.power == power) {
            let allowed = used < adjustment.count();
            match (o.order, adjustment) {
                (Order::Build { unit }, Adjustment::Builds(_)) if allowed => {
                    let built = Unit::new(power, unit.unit_type, unit.location);
                    res.builds.push(built);
                    res.fates.push(UnitFate {
                        power,
                        unit_type: unit.unit_type,
                        from: unit.location,
                        status: UnitStatus::Built,
                    });
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Succeeded));
                    used += 1;
                }
                (Order::Waive, Adjustment::Builds(_)) if allowed => {
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Succeeded));
                    used += 1;
                }
                (Order::Disband { unit }, Adjustment::Disbands(_)) if allowed => {
                    push_removal(&mut res, state, unit.province());
                    res.outcomes.push(OrderOutcome::new(*o, Verdict::Succeeded));
                    used += 1;
                }
                _ => res.outcomes.push(OrderOutcome::new(*o, Verdict::Failed)),
            }
        }

        if let Adjustment::Disbands(needed) = adjustment {
            if used < needed {
                let picked = civil_disorder(state, power, needed - used, &res.removals);
                info!(power = %power, count = picked.len(), "civil disorder disbands");
                for p in picked {
                    if let Some(unit) = state.unit_at(p) {
                        let order = Order::Disband { unit: OrderUnit::new(unit.unit_type, unit.location) };
                        res.outcomes.push(OrderOutcome::new(IssuedOrder::new(power, order), Verdict::Succeeded));
                    }
                    push_removal(&mut res, state, p);
                }
            }
        }
    }
    res
}

fn push_removal(res: &mut AdjustmentResolution, state: &GameState, p: Province) {
    if let Some(unit) = state.unit_at(p) {
        res.fates.push(UnitFate {
            power: unit.power,
            unit_type: unit.unit_type,
            from: unit.location,
            status: UnitStatus::Destroyed,
        });
    }
    res.removals.push(p);
}

/// Removes disbanded units and places new builds.
pub fn apply_adjustments(state: &mut GameState, res: &AdjustmentResolution) -> Result<(), EngineInvariantError> {
    for &p in &res.removals {
        state.remove_unit(p).ok_or(EngineInvariantError::MissingUnit(p))?;
    }
    for unit in &res.builds {
        if !state.place_unit(*unit) {
            return Err(EngineInvariantError::DoubleOccupancy(unit.location.province));
        }
    }
    Ok(())
}
