//! Error kinds shared by the validator, the adjudicator and the game.
//!
//! Per-order problems (`OrderError`) are collected into reports and never
//! abort a phase. `EngineInvariantError` signals a bug in the engine itself.

use thiserror::Error;

use crate::board::order::{Location, OrderUnit};
use crate::board::province::{Power, Province};
use crate::board::state::Phase;
use crate::board::unit::UnitType;
use crate::notation::NotationError;

/// A rule an order breaks, given the board it was written against.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IllegalOrder {
    #[error("no unit at {0}")]
    NoSuchUnit(Location),

    #[error("the unit at {0} is not of type {1}")]
    WrongUnitType(Province, UnitType),

    #[error("{unit} belongs to {owner}")]
    ForeignUnit { unit: OrderUnit, owner: Power },

    #[error("order for {issuer} submitted by {submitter}")]
    NotYourOrder { issuer: Power, submitter: Power },

    #[error("{unit} cannot reach {dest}")]
    Unreachable { unit: OrderUnit, dest: Location },

    #[error("a fleet moving to {0} must name a coast")]
    CoastRequired(Province),

    #[error("{0} is not a valid coast here")]
    BadCoast(Location),

    #[error("no convoy route for {unit} to {dest}")]
    NoConvoyRoute { unit: OrderUnit, dest: Location },

    #[error("{unit} cannot support into {target}")]
    SupportUnreachable { unit: OrderUnit, target: Province },

    #[error("a unit cannot support itself")]
    SupportSelf,

    #[error("{0} is not a fleet at sea")]
    ConvoyNotAtSea(OrderUnit),

    #[error("{0} is not dislodged")]
    NotDislodged(Location),

    #[error("{unit} cannot retreat to {dest}")]
    RetreatNotAllowed { unit: OrderUnit, dest: Location },

    #[error("{0} is not a home supply center of the builder")]
    NotHomeCenter(Province),

    #[error("{0} is not owned by the builder")]
    CenterNotOwned(Province),

    #[error("{0} is occupied")]
    CenterOccupied(Province),

    #[error("{0} cannot hold that unit type")]
    BadTerrain(Location),

    #[error("{power} has no builds available")]
    NoBuildsAvailable { power: Power },

    #[error("{power} has no disbands due")]
    NoDisbandsDue { power: Power },

    #[error("{power} already used all {allowed} adjustments")]
    QuotaExceeded { power: Power, allowed: usize },

    #[error("{0} already has an order")]
    DuplicateOrder(Province),
}

/// Why an individual order string was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error(transparent)]
    Parse(#[from] NotationError),

    #[error(transparent)]
    Illegal(#[from] IllegalOrder),

    #[error("'{order}' cannot be given during {phase}")]
    PhaseMismatch { phase: Phase, order: String },
}

/// A broken engine invariant. Never caused by order content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineInvariantError {
    #[error("adjudication did not converge after {passes} passes")]
    NonConvergence { passes: usize },

    #[error("two units in {0}")]
    DoubleOccupancy(Province),

    #[error("unit recorded at {recorded} stands in {actual}")]
    MisplacedUnit { recorded: Province, actual: Province },

    #[error("{0} has no unit to act on")]
    MissingUnit(Province),
}

/// Failures of a game-level operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("'{order}' cannot be given during {phase}")]
    PhaseMismatch { phase: Phase, order: String },

    #[error("{0} has nothing to order this phase")]
    NothingToOrder(Power),

    #[error("the game is over")]
    GameOver,

    #[error("engine invariant broken: {0}")]
    Invariant(#[from] EngineInvariantError),
}
