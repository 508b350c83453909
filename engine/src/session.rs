//! Player directory for the driver.
//!
//! Credentials are never stored: each player keeps a random salt and the
//! SHA-256 digest of salt and credential, both hex encoded.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("name '{0}' is already registered")]
    NameTaken(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("wrong credential for '{0}'")]
    BadCredential(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("invalid player name '{0}'")]
    InvalidName(String),
}

#[derive(Debug, Clone)]
struct Account {
    salt: String,
    digest: String,
}

fn digest(salt: &str, credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(credential.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn new_salt() -> String {
    let bytes: [u8; 16] = SmallRng::from_entropy().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Debug, Default)]
pub struct PlayerDirectory {
    accounts: DashMap<String, Account>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, credential: &str) -> Result<(), SessionError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(SessionError::InvalidName(name.to_string()));
        }
        let salt = new_salt();
        let digest = digest(&salt, credential);
        match self.accounts.entry(name.to_string()) {
            Entry::Occupied(_) => Err(SessionError::NameTaken(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Account { salt, digest });
                info!(player = name, "player registered");
                Ok(())
            }
        }
    }

    /// Checks a credential. Returns the canonical player name on success.
    pub fn login(&self, name: &str, credential: &str) -> Result<String, SessionError> {
        let account = self.accounts.get(name).ok_or_else(|| SessionError::UnknownPlayer(name.to_string()))?;
        if digest(&account.salt, credential) != account.digest {
            return Err(SessionError::BadCredential(name.to_string()));
        }
        Ok(name.to_string())
    }
}

/// The player a driver connection acts as.
#[derive(Debug, Clone, Default)]
pub struct Session {
    player: Option<String>,
}

impl Session {
    pub fn log_in(&mut self, player: String) {
        self.player = Some(player);
    }

    pub fn player(&self) -> Result<&str, SessionError> {
        self.player.as_deref().ok_or(SessionError::NotLoggedIn)
    }
}
