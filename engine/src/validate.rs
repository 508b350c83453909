//! Order validation.
//!
//! Checks parsed orders against the board of the current phase and
//! normalizes them: unit coasts are taken from the board, a fleet's
//! destination coast is filled in when only one is reachable, and a plain
//! move given during a retreat phase becomes a retreat.

use crate::board::adjacency::map;
use crate::board::order::{IssuedOrder, Location, Order, OrderKind, OrderUnit};
use crate::board::province::{Power, Province, ProvinceType};
use crate::board::state::GameState;
use crate::board::unit::UnitType;
use crate::error::{IllegalOrder, OrderError};
use crate::notation::parse_order;
use crate::resolve::adjustment::{adjustment_for, Adjustment};

/// An order accepted for the current phase, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub order: IssuedOrder,
    pub text: String,
}

/// The verdict on one power's list of order strings.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub accepted: Vec<ValidatedOrder>,
    /// Rejected strings with the reason. `parsed` is set when the string was
    /// well-formed but broke a rule.
    pub rejected: Vec<RejectedOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOrder {
    pub text: String,
    pub parsed: Option<IssuedOrder>,
    pub error: OrderError,
}

impl Submission {
    /// Whether any order was given for the wrong kind of phase.
    pub fn phase_mismatch(&self) -> Option<&RejectedOrder> {
        self.rejected.iter().find(|r| matches!(r.error, OrderError::PhaseMismatch { .. }))
    }
}

/// Validates orders of one power against a game state.
pub struct Validator<'a> {
    state: &'a GameState,
    submitter: Power,
}

impl<'a> Validator<'a> {
    pub fn new(state: &'a GameState, submitter: Power) -> Self {
        Validator { state, submitter }
    }

    /// Parses and validates a whole submission.
    ///
    /// Later orders for a unit already ordered are rejected, as are
    /// adjustment orders beyond the power's allowance.
    pub fn submission(&self, lines: &[String]) -> Submission {
        let mut out = Submission::default();
        let allowance = adjustment_for(self.state, self.submitter);
        let mut adjustments_used = 0;

        for text in lines {
            let parsed = match parse_order(text) {
                Ok(o) => o,
                Err(e) => {
                    out.rejected.push(RejectedOrder { text: text.clone(), parsed: None, error: e.into() });
                    continue;
                }
            };
            let checked = self.validate(parsed).and_then(|order| {
                if let Some(p) = order_key(&order.order) {
                    if out.accepted.iter().any(|v| order_key(&v.order.order) == Some(p)) {
                        return Err(IllegalOrder::DuplicateOrder(p).into());
                    }
                }
                let counted = self.state.phase.kind() == Some(OrderKind::Adjustment)
                    && matches!(order.order, Order::Build { .. } | Order::Waive | Order::Disband { .. });
                if counted {
                    if adjustments_used >= allowance.count() {
                        return Err(IllegalOrder::QuotaExceeded { power: self.submitter, allowed: allowance.count() }.into());
                    }
                    adjustments_used += 1;
                }
                Ok(order)
            });
            match checked {
                Ok(order) => out.accepted.push(ValidatedOrder { order, text: text.clone() }),
                Err(error) => out.rejected.push(RejectedOrder { text: text.clone(), parsed: Some(parsed), error }),
            }
        }
        out
    }

    /// Validates a single parsed order and returns its normalized form.
    pub fn validate(&self, issued: IssuedOrder) -> Result<IssuedOrder, OrderError> {
        if issued.power != self.submitter {
            return Err(IllegalOrder::NotYourOrder { issuer: issued.power, submitter: self.submitter }.into());
        }
        let kind = match self.state.phase.kind() {
            Some(kind) => kind,
            None => return Err(self.mismatch(&issued)),
        };
        let order = match (kind, issued.order) {
            (OrderKind::Retreat, Order::Move { unit, dest }) => Order::Retreat { unit, dest },
            (_, order) => order,
        };
        if !order.allowed_in(kind) {
            return Err(self.mismatch(&issued));
        }

        let order = match kind {
            OrderKind::Movement => self.movement(order)?,
            OrderKind::Retreat => self.retreat(order)?,
            OrderKind::Adjustment => self.adjustment(order)?,
        };
        Ok(IssuedOrder::new(issued.power, order))
    }

    fn mismatch(&self, issued: &IssuedOrder) -> OrderError {
        OrderError::PhaseMismatch { phase: self.state.phase, order: issued.to_string() }
    }

    /// The submitter's unit matching `unit`, with the coast the board records.
    fn own_unit(&self, unit: OrderUnit) -> Result<OrderUnit, IllegalOrder> {
        let actual = self.board_unit(unit)?;
        let found = self.state.unit_at(unit.province()).map(|u| u.power);
        match found {
            Some(owner) if owner != self.submitter => Err(IllegalOrder::ForeignUnit { unit: actual, owner }),
            _ => Ok(actual),
        }
    }

    /// Any unit on the board matching `unit`.
    fn board_unit(&self, unit: OrderUnit) -> Result<OrderUnit, IllegalOrder> {
        let found = self.state.unit_at(unit.province()).ok_or(IllegalOrder::NoSuchUnit(unit.location))?;
        if found.unit_type != unit.unit_type {
            return Err(IllegalOrder::WrongUnitType(unit.province(), unit.unit_type));
        }
        if unit.location.coast.is_some() && unit.location.coast != found.location.coast {
            return Err(IllegalOrder::BadCoast(unit.location));
        }
        Ok(OrderUnit::new(found.unit_type, found.location))
    }

    fn movement(&self, order: Order) -> Result<Order, IllegalOrder> {
        match order {
            Order::Hold { unit } => Ok(Order::Hold { unit: self.own_unit(unit)? }),
            Order::Move { unit, dest } => {
                let unit = self.own_unit(unit)?;
                let dest = self.move_destination(unit, dest)?;
                Ok(Order::Move { unit, dest })
            }
            Order::SupportHold { unit, supported } => {
                let unit = self.own_unit(unit)?;
                let supported = self.board_unit(supported)?;
                if supported.province() == unit.province() {
                    return Err(IllegalOrder::SupportSelf);
                }
                self.support_reach(unit, supported.province())?;
                Ok(Order::SupportHold { unit, supported })
            }
            Order::SupportMove { unit, supported, dest } => {
                let unit = self.own_unit(unit)?;
                let supported = self.board_unit(supported)?;
                if supported.province() == unit.province() {
                    return Err(IllegalOrder::SupportSelf);
                }
                self.support_reach(unit, dest.province)?;
                Ok(Order::SupportMove { unit, supported, dest: Location::new(dest.province) })
            }
            Order::Convoy { unit, convoyed_from, convoyed_to } => {
                let unit = self.own_unit(unit)?;
                if unit.unit_type != UnitType::Fleet || !unit.province().is_sea() {
                    return Err(IllegalOrder::ConvoyNotAtSea(unit));
                }
                let army = self.board_unit(OrderUnit::new(UnitType::Army, convoyed_from))?;
                let to = Location::new(convoyed_to.province);
                if !self.has_fleet_route(army.province(), to.province) {
                    return Err(IllegalOrder::NoConvoyRoute { unit: army, dest: to });
                }
                Ok(Order::Convoy { unit, convoyed_from: army.location, convoyed_to: to })
            }
            other => Ok(other),
        }
    }

    fn move_destination(&self, unit: OrderUnit, dest: Location) -> Result<Location, IllegalOrder> {
        if dest.province == unit.province() {
            return Err(IllegalOrder::Unreachable { unit, dest });
        }
        match unit.unit_type {
            UnitType::Army => {
                if dest.coast.is_some() {
                    return Err(IllegalOrder::BadCoast(dest));
                }
                if map().can_move(UnitType::Army, unit.location, dest) {
                    return Ok(dest);
                }
                let coastal = |p: Province| p.province_type() == ProvinceType::Coastal;
                if !coastal(unit.province()) || !coastal(dest.province) {
                    return Err(IllegalOrder::Unreachable { unit, dest });
                }
                if !self.has_fleet_route(unit.province(), dest.province) {
                    return Err(IllegalOrder::NoConvoyRoute { unit, dest });
                }
                Ok(dest)
            }
            UnitType::Fleet => {
                let dest = self.fleet_coast(unit, dest)?;
                if map().can_move(UnitType::Fleet, unit.location, dest) {
                    Ok(dest)
                } else {
                    Err(IllegalOrder::Unreachable { unit, dest })
                }
            }
        }
    }

    /// Fills in or checks the coast of a fleet's destination.
    fn fleet_coast(&self, unit: OrderUnit, dest: Location) -> Result<Location, IllegalOrder> {
        let province = dest.province;
        match dest.coast {
            Some(coast) if !province.coasts().contains(&coast) => Err(IllegalOrder::BadCoast(dest)),
            Some(_) => Ok(dest),
            None if !province.has_coasts() => Ok(dest),
            None => match map().fleet_coasts_toward(unit.location, province).as_slice() {
                [] => Err(IllegalOrder::Unreachable { unit, dest }),
                [only] => Ok(Location::with_coast(province, *only)),
                _ => Err(IllegalOrder::CoastRequired(province)),
            },
        }
    }

    fn support_reach(&self, unit: OrderUnit, target: Province) -> Result<(), IllegalOrder> {
        if map().can_reach_province(unit.unit_type, unit.location, target) {
            Ok(())
        } else {
            Err(IllegalOrder::SupportUnreachable { unit, target })
        }
    }

    /// Whether fleets standing at sea could carry an army from `from` to `to`.
    fn has_fleet_route(&self, from: Province, to: Province) -> bool {
        map().convoy_route_exists(from, to, |p| {
            self.state.unit_at(p).is_some_and(|u| u.unit_type == UnitType::Fleet)
        })
    }

    fn retreat(&self, order: Order) -> Result<Order, IllegalOrder> {
        let unit = match order.unit() {
            Some(unit) => unit,
            None => return Ok(order),
        };
        let dislodged = self.state.dislodged_at(unit.province()).ok_or(IllegalOrder::NotDislodged(unit.location))?;
        let actual = OrderUnit::new(dislodged.unit.unit_type, dislodged.unit.location);
        if dislodged.unit.unit_type != unit.unit_type {
            return Err(IllegalOrder::WrongUnitType(unit.province(), unit.unit_type));
        }
        if dislodged.unit.power != self.submitter {
            return Err(IllegalOrder::ForeignUnit { unit: actual, owner: dislodged.unit.power });
        }
        match order {
            Order::Retreat { dest, .. } => {
                let mut options = dislodged.retreats.iter().filter(|l| {
                    l.province == dest.province && (dest.coast.is_none() || l.coast == dest.coast)
                });
                match (options.next(), options.next()) {
                    (Some(&to), None) => Ok(Order::Retreat { unit: actual, dest: to }),
                    (Some(_), Some(_)) => Err(IllegalOrder::CoastRequired(dest.province)),
                    (None, _) => Err(IllegalOrder::RetreatNotAllowed { unit: actual, dest }),
                }
            }
            _ => Ok(Order::Disband { unit: actual }),
        }
    }

    fn adjustment(&self, order: Order) -> Result<Order, IllegalOrder> {
        let power = self.submitter;
        let allowance = adjustment_for(self.state, power);
        match order {
            Order::Build { unit } => {
                if !matches!(allowance, Adjustment::Builds(_)) {
                    return Err(IllegalOrder::NoBuildsAvailable { power });
                }
                let p = unit.province();
                if p.home_power() != Some(power) {
                    return Err(IllegalOrder::NotHomeCenter(p));
                }
                if self.state.sc_owner[p as usize] != Some(power) {
                    return Err(IllegalOrder::CenterNotOwned(p));
                }
                if self.state.unit_at(p).is_some() {
                    return Err(IllegalOrder::CenterOccupied(p));
                }
                let location = build_location(unit)?;
                Ok(Order::Build { unit: OrderUnit::new(unit.unit_type, location) })
            }
            Order::Waive => match allowance {
                Adjustment::Builds(_) => Ok(Order::Waive),
                _ => Err(IllegalOrder::NoBuildsAvailable { power }),
            },
            Order::Disband { unit } => {
                if !matches!(allowance, Adjustment::Disbands(_)) {
                    return Err(IllegalOrder::NoDisbandsDue { power });
                }
                Ok(Order::Disband { unit: self.own_unit(unit)? })
            }
            other => Ok(other),
        }
    }
}

/// Where a built unit stands: armies on land, fleets on a named coast.
fn build_location(unit: OrderUnit) -> Result<Location, IllegalOrder> {
    let loc = unit.location;
    let p = loc.province;
    match unit.unit_type {
        UnitType::Army if loc.coast.is_some() => Err(IllegalOrder::BadCoast(loc)),
        UnitType::Army if p.is_sea() => Err(IllegalOrder::BadTerrain(loc)),
        UnitType::Army => Ok(loc),
        UnitType::Fleet if p.province_type() != ProvinceType::Coastal => Err(IllegalOrder::BadTerrain(loc)),
        UnitType::Fleet => match loc.coast {
            None if p.has_coasts() => Err(IllegalOrder::CoastRequired(p)),
            Some(coast) if !p.coasts().contains(&coast) => Err(IllegalOrder::BadCoast(loc)),
            _ => Ok(loc),
        },
    }
}

/// The province an order claims. Two orders may not claim the same one.
fn order_key(order: &Order) -> Option<Province> {
    order.unit().map(|u| u.province())
}
