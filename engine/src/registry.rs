//! Many games side by side.
//!
//! Games live in a `DashMap` keyed by id; holding an entry's write guard is
//! the exclusive section for that game. Games never share mutable state, so
//! a batch of them can be resolved in parallel.

use std::collections::BTreeMap;

use dashmap::DashMap;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::board::province::Power;
use crate::board::state::{BoardSnapshot, Phase};
use crate::config::EngineConfig;
use crate::error::GameError;
use crate::game::{Game, GameStatus, SubmitOutcome};
use crate::resolve::outcome::PhaseReport;

pub type GameId = Uuid;

/// The order in which joining players are seated.
pub const SEAT_ORDER: [Power; 7] = [
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Austria,
    Power::Russia,
    Power::Turkey,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no game {0}")]
    GameNotFound(GameId),

    #[error("game is full")]
    GameFull,

    #[error("{0} is already taken")]
    PowerTaken(Power),

    #[error("{player} already plays {power} in this game")]
    AlreadySeated { player: String, power: Power },

    #[error("{0} is not seated in this game")]
    NotSeated(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A game and the players seated at it.
#[derive(Debug, Clone)]
pub struct Table {
    pub game: Game,
    seats: BTreeMap<Power, String>,
}

impl Table {
    fn new(game: Game) -> Self {
        Table { game, seats: BTreeMap::new() }
    }

    pub fn seat_of(&self, player: &str) -> Option<Power> {
        self.seats.iter().find(|(_, name)| name.as_str() == player).map(|(&p, _)| p)
    }

    pub fn free_seats(&self) -> Vec<Power> {
        SEAT_ORDER.into_iter().filter(|p| !self.seats.contains_key(p)).collect()
    }

    /// Seats `player` at `requested`, or at the next free power.
    fn seat(&mut self, player: &str, requested: Option<Power>, random: bool) -> Result<Power, RegistryError> {
        if let Some(power) = self.seat_of(player) {
            return Err(RegistryError::AlreadySeated { player: player.to_string(), power });
        }
        let free = self.free_seats();
        let power = match requested {
            Some(p) if free.contains(&p) => p,
            Some(p) => return Err(RegistryError::PowerTaken(p)),
            None if random => *free.choose(&mut SmallRng::from_entropy()).ok_or(RegistryError::GameFull)?,
            None => *free.first().ok_or(RegistryError::GameFull)?,
        };
        self.seats.insert(power, player.to_string());
        Ok(power)
    }
}

/// A row of the game list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub year: u16,
    pub phase: Phase,
    pub seated: usize,
}

#[derive(Debug, Default)]
pub struct GameRegistry {
    tables: DashMap<GameId, Table>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a game and seats its creator.
    pub fn create(&self, config: EngineConfig, creator: &str) -> Result<(GameId, Power), RegistryError> {
        let id = Uuid::new_v4();
        let random = config.random_seating;
        let mut table = Table::new(Game::new_game(config));
        let power = table.seat(creator, None, random)?;
        self.tables.insert(id, table);
        info!(game = %id, player = creator, power = %power, "game created");
        Ok((id, power))
    }

    pub fn join(&self, id: GameId, player: &str, requested: Option<Power>) -> Result<Power, RegistryError> {
        let mut table = self.tables.get_mut(&id).ok_or(RegistryError::GameNotFound(id))?;
        let random = table.game.config().random_seating;
        let power = table.seat(player, requested, random)?;
        info!(game = %id, player, power = %power, "player joined");
        Ok(power)
    }

    pub fn seat_of(&self, id: GameId, player: &str) -> Result<Power, RegistryError> {
        let table = self.tables.get(&id).ok_or(RegistryError::GameNotFound(id))?;
        table.seat_of(player).ok_or_else(|| RegistryError::NotSeated(player.to_string()))
    }

    /// Submits `player`'s orders to the game, as the power they play.
    pub fn submit(&self, id: GameId, player: &str, lines: &[String]) -> Result<SubmitOutcome, RegistryError> {
        let mut table = self.tables.get_mut(&id).ok_or(RegistryError::GameNotFound(id))?;
        let power = table.seat_of(player).ok_or_else(|| RegistryError::NotSeated(player.to_string()))?;
        Ok(table.game.submit(power, lines)?)
    }

    /// Resolves the game's current phase without waiting for missing orders.
    pub fn force_advance(&self, id: GameId) -> Result<Vec<PhaseReport>, RegistryError> {
        let mut table = self.tables.get_mut(&id).ok_or(RegistryError::GameNotFound(id))?;
        Ok(table.game.force_advance()?)
    }

    /// Forces every unfinished game forward one phase, in parallel.
    pub fn advance_all(&self) -> Vec<(GameId, Result<Vec<PhaseReport>, RegistryError>)> {
        let ids: Vec<GameId> =
            self.tables.iter().filter(|t| !t.game.is_over()).map(|t| *t.key()).collect();
        let results: Vec<_> = ids.into_par_iter().map(|id| (id, self.force_advance(id))).collect();
        info!(games = results.len(), "batch advanced");
        results
    }

    pub fn status(&self, id: GameId) -> Result<GameStatus, RegistryError> {
        let table = self.tables.get(&id).ok_or(RegistryError::GameNotFound(id))?;
        Ok(table.game.status())
    }

    pub fn snapshot(&self, id: GameId) -> Result<BoardSnapshot, RegistryError> {
        let table = self.tables.get(&id).ok_or(RegistryError::GameNotFound(id))?;
        Ok(table.game.snapshot())
    }

    pub fn last_report(&self, id: GameId) -> Result<Option<PhaseReport>, RegistryError> {
        let table = self.tables.get(&id).ok_or(RegistryError::GameNotFound(id))?;
        Ok(table.game.last_report().cloned())
    }

    pub fn list(&self) -> Vec<GameSummary> {
        let mut out: Vec<GameSummary> = self
            .tables
            .iter()
            .map(|t| GameSummary {
                id: *t.key(),
                year: t.game.state().year,
                phase: t.game.phase(),
                seated: t.seats.len(),
            })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
