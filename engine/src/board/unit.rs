//! Unit types and ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::Location;
use super::province::Power;

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "A")]
    Army,
    #[serde(rename = "F")]
    Fleet,
}

impl UnitType {
    /// Returns the uppercase letter used in order notation.
    pub const fn code(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
        }
    }

    /// Parses a unit type from its letter, ignoring case.
    pub fn from_code(c: char) -> Option<UnitType> {
        match c.to_ascii_uppercase() {
            'A' => Some(UnitType::Army),
            'F' => Some(UnitType::Fleet),
            _ => None,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A military unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub power: Power,
    pub unit_type: UnitType,
    pub location: Location,
}

impl Unit {
    pub fn new(power: Power, unit_type: UnitType, location: Location) -> Self {
        Unit { power, unit_type, location }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.power, self.unit_type, self.location)
    }
}
