//! Merit Tap Server Library
//!
//! Server side of a digital merit counter: taps batched by the client are
//! folded into per-user daily counters, an append-only tap ledger, and
//! ranked leaderboards. The `client` module carries the matching tap
//! batcher.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use config::Config;
pub use error::{AppError, Result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: Config,
}
