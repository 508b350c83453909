//! Driver state management.
//!
//! Holds everything the driver keeps between commands: the games, the
//! player directory, the logged-in player, the game they act in and the
//! configuration applied to newly created games.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::command::{Command, CommandError};
use crate::config::{ConfigError, EngineConfig};
use crate::notation::{parse_order_list, NotationError};
use crate::registry::{GameRegistry, RegistryError};
use crate::session::{PlayerDirectory, Session, SessionError};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no game selected; create or join one first")]
    NoGame,

    #[error("cannot encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single line of driver output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok(String),
    Report(String),
    Error(String),
}

impl Reply {
    fn report<T: Serialize>(value: &T) -> Result<Reply, DriverError> {
        Ok(Reply::Report(serde_json::to_string(value)?))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok(msg) if msg.is_empty() => write!(f, "ok"),
            Reply::Ok(msg) => write!(f, "ok {}", msg),
            Reply::Report(json) => write!(f, "report {}", json),
            Reply::Error(msg) => write!(f, "error {}", msg),
        }
    }
}

impl From<DriverError> for Reply {
    fn from(e: DriverError) -> Self {
        Reply::Error(e.to_string())
    }
}

/// Holds the mutable state of the driver between commands.
#[derive(Debug, Default)]
pub struct Engine {
    pub config: EngineConfig,
    registry: GameRegistry,
    players: PlayerDirectory,
    session: Session,
    current_game: Option<Uuid>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config, ..Engine::default() }
    }

    pub fn current_game(&self) -> Option<Uuid> {
        self.current_game
    }

    /// Runs one command. `Quit` is handled by the caller.
    pub fn handle(&mut self, cmd: Command) -> Reply {
        self.dispatch(cmd).unwrap_or_else(Reply::from)
    }

    fn dispatch(&mut self, cmd: Command) -> Result<Reply, DriverError> {
        match cmd {
            Command::Register { name, credential } => {
                self.players.register(&name, &credential)?;
                // Registering also starts a session for the new player.
                self.session.log_in(name.clone());
                Ok(Reply::Ok(format!("registered {}", name)))
            }
            Command::Login { name, credential } => {
                let player = self.players.login(&name, &credential)?;
                self.session.log_in(player);
                Ok(Reply::Ok(format!("logged in {}", name)))
            }
            Command::Create => {
                let player = self.session.player()?.to_string();
                let (id, power) = self.registry.create(self.config.clone(), &player)?;
                self.current_game = Some(id);
                Ok(Reply::Ok(format!("game {} {}", id, power)))
            }
            Command::Join { game, power } => {
                let player = self.session.player()?.to_string();
                let power = self.registry.join(game, &player, power)?;
                self.current_game = Some(game);
                Ok(Reply::Ok(format!("joined {} {}", game, power)))
            }
            Command::Order { payload } => {
                let player = self.session.player()?.to_string();
                let game = self.game(None)?;
                let lines = parse_order_list(&payload)?;
                let outcome = self.registry.submit(game, &player, &lines)?;
                Reply::report(&outcome)
            }
            Command::Status { game } => {
                let game = self.game(game)?;
                Reply::report(&self.registry.status(game)?)
            }
            Command::Board { game } => {
                let game = self.game(game)?;
                Reply::report(&self.registry.snapshot(game)?)
            }
            Command::Games => Reply::report(&self.registry.list()),
            Command::SetOption { name, value } => {
                self.config.set_option(&name, &value)?;
                Ok(Reply::Ok(format!("{} = {}", name, value)))
            }
            Command::Force { game } => {
                let game = self.game(game)?;
                Reply::report(&self.registry.force_advance(game)?)
            }
            Command::Quit => Ok(Reply::Ok(String::new())),
        }
    }

    fn game(&self, explicit: Option<Uuid>) -> Result<Uuid, DriverError> {
        explicit.or(self.current_game).ok_or(DriverError::NoGame)
    }
}
