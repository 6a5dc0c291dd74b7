//! Hijri Clock API.
//!
//! Relays a date and location to the AlAdhan prayer-times service and
//! re-expresses the returned clock strings relative to a mid-night anchor.
//!
//! Modules:
//! - `clock`   — `HH:MM` arithmetic modulo one day.
//! - `model`   — request, response and error types.
//! - `ingest`  — upstream timings providers.
//! - `router`  — request validation and result derivation.
//! - `server`  — axum routes and error envelopes.
//! - `config`  — TOML + environment configuration.
//! - `logging` — leveled console/file logger.

pub mod clock;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod router;
pub mod server;
