//! Replay API server for Reverie simulations.
//!
//! This crate provides an Axum HTTP server that exposes recorded
//! simulations to the replay dashboard:
//!
//! - **Replay endpoint** (`/api/replays/{id}`) returning sampled,
//!   paginated frames
//! - **State endpoint** (`/api/simulations/{id}/state`) returning the
//!   latest single frame
//! - **Health endpoint** (`/api/health`)
//!
//! # Architecture
//!
//! Handlers validate the path id, then hand the blocking storage work to
//! the components in [`reverie_replay`] on the blocking thread pool. Unknown
//! or unreadable simulations are answered with an explanatory payload
//! rather than an error status; only malformed requests are rejected.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
