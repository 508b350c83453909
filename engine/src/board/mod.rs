//! Board representation and game-state types.
//!
//! Contains the static map (provinces, coasts, adjacency) and the mutable
//! per-game data: units, orders and the game state.

pub mod adjacency;
pub mod order;
pub mod province;
pub mod state;
pub mod unit;

pub use adjacency::{map, Border, MapGraph, Step, BORDERS, BORDER_COUNT};
pub use order::{IssuedOrder, Location, Order, OrderKind, OrderUnit};
pub use province::{
    Center, Coast, Power, Province, ProvinceInfo, ProvinceType, ALL_POWERS, ALL_PROVINCES, PROVINCE_COUNT,
    PROVINCE_INFO, SUPPLY_CENTER_COUNT,
};
pub use state::{BoardSnapshot, Dislodged, GameState, Phase};
pub use unit::{Unit, UnitType};
