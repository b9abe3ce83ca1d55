//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Navigator / Router / SerialQueue produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → fmt subscriber installed by the binary (or the embedding app)
//!     → whatever metrics recorder the embedding app installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the
//!   application's job
//! - Navigation request IDs flow through every log event of a round
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
