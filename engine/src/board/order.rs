//! Order types for all phases.
//!
//! The data model covers every order a power can give: hold, move, support,
//! convoy, retreat, disband, build, and waive. Text conversion lives in
//! `crate::notation`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::province::{Coast, Power, Province};
use super::unit::UnitType;

/// A location on the board: a province with an optional coast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub province: Province,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coast: Option<Coast>,
}

impl Location {
    /// Creates a location without a coast.
    pub const fn new(province: Province) -> Self {
        Location { province, coast: None }
    }

    /// Creates a location on a named coast.
    pub const fn with_coast(province: Province, coast: Coast) -> Self {
        Location { province, coast: Some(coast) }
    }
}

impl From<Province> for Location {
    fn from(province: Province) -> Self {
        Location::new(province)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coast {
            Some(coast) => write!(f, "{}({})", self.province, coast),
            None => write!(f, "{}", self.province),
        }
    }
}

/// A unit reference inside an order: its type and where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderUnit {
    pub unit_type: UnitType,
    pub location: Location,
}

impl OrderUnit {
    pub const fn new(unit_type: UnitType, location: Location) -> Self {
        OrderUnit { unit_type, location }
    }

    #[inline]
    pub const fn province(&self) -> Province {
        self.location.province
    }
}

impl fmt::Display for OrderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.unit_type, self.location)
    }
}

/// An order for any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// `A vie holds`
    Hold { unit: OrderUnit },

    /// `A bud -> rum`, `F nrg -> stp(nc)`
    Move { unit: OrderUnit, dest: Location },

    /// `A tyr supports A vie`
    SupportHold { unit: OrderUnit, supported: OrderUnit },

    /// `A gal supports A bud -> rum`
    SupportMove { unit: OrderUnit, supported: OrderUnit, dest: Location },

    /// `F mao convoys A bre -> spa`
    Convoy { unit: OrderUnit, convoyed_from: Location, convoyed_to: Location },

    /// `A vie retreats boh`
    Retreat { unit: OrderUnit, dest: Location },

    /// `F tri disband`, in a retreat or adjustment phase.
    Disband { unit: OrderUnit },

    /// `F stp(sc) build`
    Build { unit: OrderUnit },

    /// `waive`: decline one build.
    Waive,
}

/// The phase family an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Movement,
    Retreat,
    Adjustment,
}

impl Order {
    /// The acting unit, if the order has one.
    pub const fn unit(&self) -> Option<OrderUnit> {
        match *self {
            Order::Hold { unit }
            | Order::Move { unit, .. }
            | Order::SupportHold { unit, .. }
            | Order::SupportMove { unit, .. }
            | Order::Convoy { unit, .. }
            | Order::Retreat { unit, .. }
            | Order::Disband { unit }
            | Order::Build { unit } => Some(unit),
            Order::Waive => None,
        }
    }

    /// Whether the order may be given in a phase of the given kind.
    pub const fn allowed_in(&self, kind: OrderKind) -> bool {
        match self {
            Order::Hold { .. }
            | Order::Move { .. }
            | Order::SupportHold { .. }
            | Order::SupportMove { .. }
            | Order::Convoy { .. } => matches!(kind, OrderKind::Movement),
            Order::Retreat { .. } => matches!(kind, OrderKind::Retreat),
            Order::Disband { .. } => matches!(kind, OrderKind::Retreat | OrderKind::Adjustment),
            Order::Build { .. } | Order::Waive => matches!(kind, OrderKind::Adjustment),
        }
    }
}

/// An order together with the power that gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssuedOrder {
    pub power: Power,
    pub order: Order,
}

impl IssuedOrder {
    pub const fn new(power: Power, order: Order) -> Self {
        IssuedOrder { power, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn army(p: Province) -> OrderUnit {
        OrderUnit::new(UnitType::Army, Location::new(p))
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new(Province::Vie).to_string(), "vie");
        assert_eq!(Location::with_coast(Province::Stp, Coast::North).to_string(), "stp(nc)");
    }

    #[test]
    fn order_unit_lookup() {
        let hold = Order::Hold { unit: army(Province::Vie) };
        assert_eq!(hold.unit(), Some(army(Province::Vie)));
        assert_eq!(Order::Waive.unit(), None);
    }

    #[test]
    fn phase_families() {
        let mv = Order::Move { unit: army(Province::Vie), dest: Location::new(Province::Boh) };
        assert!(mv.allowed_in(OrderKind::Movement));
        assert!(!mv.allowed_in(OrderKind::Retreat));

        let disband = Order::Disband { unit: army(Province::Vie) };
        assert!(disband.allowed_in(OrderKind::Retreat));
        assert!(disband.allowed_in(OrderKind::Adjustment));
        assert!(!disband.allowed_in(OrderKind::Movement));

        assert!(Order::Waive.allowed_in(OrderKind::Adjustment));
        assert!(!Order::Waive.allowed_in(OrderKind::Movement));
    }
}
