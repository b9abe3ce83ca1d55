//! Navigation orchestration.
//!
//! # Data Flow
//! ```text
//! NavigationInstruction (from Navigator)
//!     → resolve: transform, clear prefix, parse
//!     → reconcile loop: defaults → stage → canLeave → canEnter/enter
//!                       → added + remaining instructions → repeat
//!     → loadContent → paths → finalize → Navigator::finalize
//!     (guard says no → abort → Navigator::cancel)
//! ```
//!
//! # Design Decisions
//! - One round at a time; instructions discovered mid-round join the round
//! - The loop is bounded by `navigation.guard_limit`
//! - A failed or timed-out hook aborts the round and is reported to the caller

pub mod nav;
#[allow(clippy::module_inception)]
pub mod router;
pub mod transform;

pub use nav::{Nav, NavRoute};
pub use router::{NavigationTarget, ReportCallback, Router, RouterOptions};
pub use transform::{RouteTransformer, Transformed};
