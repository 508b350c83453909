//! Driver command parser.
//!
//! Turns one line of driver input into a `Command`. Order payloads are kept
//! as raw JSON text and decoded later by the notation module.

use thiserror::Error;
use uuid::Uuid;

use crate::board::province::Power;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `register <name> <credential>`
    Register { name: String, credential: String },

    /// `login <name> <credential>`
    Login { name: String, credential: String },

    /// Start a new game and take the first seat.
    Create,

    /// `join <game-id> [power]`
    Join { game: Uuid, power: Option<Power> },

    /// `order [-o] '<json array>'`
    Order { payload: String },

    /// `status [game-id]`
    Status { game: Option<Uuid> },

    /// `board [game-id]`
    Board { game: Option<Uuid> },

    /// List all games.
    Games,

    /// `setoption <name> <value>`, or `setoption name <id> value <x>`.
    SetOption { name: String, value: String },

    /// `force [game-id]`: resolve the phase without waiting for missing orders.
    Force { game: Option<Uuid> },

    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid game id '{0}'")]
    BadGameId(String),

    #[error("unknown power '{0}'")]
    UnknownPower(String),
}

/// Parses a single line of input into a `Command`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (trimmed, ""),
    };
    if word.is_empty() {
        return Err(CommandError::Empty);
    }
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    match word.to_ascii_lowercase().as_str() {
        "register" => parse_credentials(&tokens, "register <name> <credential>")
            .map(|(name, credential)| Command::Register { name, credential }),
        "login" => parse_credentials(&tokens, "login <name> <credential>")
            .map(|(name, credential)| Command::Login { name, credential }),
        "create" => Ok(Command::Create),
        "join" => parse_join(&tokens),
        "order" => parse_order_payload(rest),
        "status" => parse_game_arg(&tokens).map(|game| Command::Status { game }),
        "board" => parse_game_arg(&tokens).map(|game| Command::Board { game }),
        "games" => Ok(Command::Games),
        "setoption" => parse_setoption(&tokens),
        "force" => parse_game_arg(&tokens).map(|game| Command::Force { game }),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_credentials(tokens: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match tokens {
        [name, credential] => Ok((name.to_string(), credential.to_string())),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_game_id(token: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(token).map_err(|_| CommandError::BadGameId(token.to_string()))
}

fn parse_game_arg(tokens: &[&str]) -> Result<Option<Uuid>, CommandError> {
    match tokens {
        [] => Ok(None),
        [id] => parse_game_id(id).map(Some),
        _ => Err(CommandError::Usage("<command> [game-id]")),
    }
}

/// Parses `join <game-id> [power]`.
fn parse_join(tokens: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "join <game-id> [power]";
    let (id, power) = match tokens {
        [id] => (id, None),
        [id, power] => (id, Some(*power)),
        _ => return Err(CommandError::Usage(USAGE)),
    };
    let game = parse_game_id(id)?;
    let power = match power {
        Some(name) => Some(Power::from_name(name).ok_or_else(|| CommandError::UnknownPower(name.to_string()))?),
        None => None,
    };
    Ok(Command::Join { game, power })
}

/// Parses `order [-o] <payload>`. Shell-style single quotes around the
/// payload are removed.
fn parse_order_payload(rest: &str) -> Result<Command, CommandError> {
    let rest = rest.strip_prefix("-o").map(str::trim_start).unwrap_or(rest);
    let payload = rest
        .strip_prefix('\'')
        .and_then(|r| r.strip_suffix('\''))
        .unwrap_or(rest)
        .trim();
    if payload.is_empty() {
        return Err(CommandError::Usage("order [-o] '[\"<order>\", ...]'"));
    }
    Ok(Command::Order { payload: payload.to_string() })
}

/// Parses `setoption <name> <value>` or `setoption name <id> value <x>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "setoption <name> <value>";
    match tokens {
        ["name", name, "value", value] | [name, value] => {
            Ok(Command::SetOption { name: name.to_string(), value: value.to_string() })
        }
        _ => Err(CommandError::Usage(USAGE)),
    }
}
