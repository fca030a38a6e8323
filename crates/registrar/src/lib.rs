//! MetaSense registrar service.
//!
//! Wires the scoring engine to the outside world: TOML configuration, the
//! on-chain ReputationRegistry publisher, and the HTTP scoring API. The
//! binary in `main.rs` exposes the same pipeline as CLI subcommands.

#![warn(clippy::all)]

pub mod config;
pub mod publisher;
pub mod server;
