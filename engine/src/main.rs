//! Entente -- a Diplomacy adjudication engine driven over stdin/stdout.
//!
//! Each input line is one command; each command gets exactly one reply line
//! (`ok ...`, `report <json>` or `error <message>`). Logs go to stderr.

use std::io::{self, BufRead, Write};

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use entente::command::{parse_command, Command};
use entente::config::EngineConfig;
use entente::engine::{Engine, Reply};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    info!(?config, "entente starting");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new(config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("stdin closed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => engine.handle(cmd),
            Err(e) => Reply::Error(e.to_string()),
        };
        if writeln!(out, "{}", reply).and_then(|_| out.flush()).is_err() {
            break;
        }
    }
    info!("entente stopped");
}
