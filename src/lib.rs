//! Viewport Router Library
//!
//! Client-side navigation: a serial queue of navigation requests, a
//! branching history, and a router reconciling a tree of named viewports
//! against path-like instructions.

// Core subsystems
pub mod instruction;
pub mod navigation;
pub mod queue;
pub mod router;
pub mod viewport;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use config::RouterConfig;
pub use error::{ComponentError, RouterError, RouterResult};
pub use navigation::{HistoryStore, MemoryHistoryStore, Navigator};
pub use queue::{Completion, SerialQueue};
pub use router::{Router, RouterOptions};
pub use viewport::{ComponentRegistry, GuardResult, RouteComponent};
