//! vortex-core library.
//!
//! Data flows one way: raw CSV text is decoded into [`model::Record`]s,
//! held by a [`store::TaskStore`], classified per record on demand and
//! folded into [`aggregate::Summary`] and chart buckets. Mutations go back
//! through the store, which re-aggregates from scratch.
//!
//! # Conventions
//!
//! - **Errors**: [`error::VortexError`] for typed failures, `anyhow::Result`
//!   where a call mostly adds context (config loading).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).
//! - **Time**: every time-dependent function takes the reference instant
//!   `now` explicitly.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod csv;
pub mod error;
pub mod export;
pub mod model;
pub mod source;
pub mod store;

pub use error::VortexError;
pub use model::{Record, TaskId};
pub use source::Source;
pub use store::TaskStore;
