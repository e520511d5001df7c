//! # Kasir API
//!
//! HTTP server for the Kasir POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir API Server                               │
//! │                                                                         │
//! │  Client ──► axum Router (TraceLayer) ──► handlers ──► kasir-db          │
//! │                                            │             │              │
//! │                                            ▼             ▼              │
//! │                                        ApiError    SQLite (WAL)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `kasir.toml` (path from `KASIR_CONFIG`) and environment variables:
//! - `KASIR_PORT` - HTTP port (default: 8080)
//! - `KASIR_DATABASE_PATH` - SQLite file (default: kasir.db)
//! - `KASIR_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `KASIR_ALLOW_NEGATIVE_STOCK` - Let checkout oversell (default: false)
//! - `RUST_LOG` - Log filter (default: info)

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;
