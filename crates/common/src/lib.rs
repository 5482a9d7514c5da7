//! Common utilities and shared types for chirp.
//!
//! This crate provides foundational components used across all chirp crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Clock**: Millisecond-precision time source via [`Clock`]
//! - **Metrics**: Request and engagement counters via [`Metrics`]
//!
//! # Example
//!
//! ```no_run
//! use chirp_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on {}:{}, next id {id}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod metrics;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{Config, TimelineConfig, TrendsConfig};
pub use error::{AppError, AppResult, ConflictKind};
pub use id::IdGenerator;
pub use metrics::{Metrics, MetricsSnapshot, Timer, get_metrics};
