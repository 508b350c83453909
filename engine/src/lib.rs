//! Entente engine library.
//!
//! Exposes the board representation, order notation and validation, the
//! adjudicator and phase machine, and the multi-game registry used by the
//! driver binary and the integration tests.

pub mod board;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod notation;
pub mod registry;
pub mod resolve;
pub mod session;
pub mod validate;
