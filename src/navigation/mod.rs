//! Navigation history subsystem.
//!
//! # Data Flow
//! ```text
//! goto / replace / refresh / go(n) / browser event
//!     → Navigator::navigate (SerialQueue, one round at a time)
//!     → flag classification (first / new / refresh / back / forward)
//!     → NavigationHandler (the Router) reconciles viewports
//!     → Navigator::finalize  (commit entry, persist, resolve caller)
//!       or Navigator::cancel (undo browser movement, resolve caller)
//! ```
//!
//! # Design Decisions
//! - The entry list branches: a new navigation discards "future" entries
//! - Only the storable projection of an entry crosses the store boundary
//! - Cancellation is not an error to the caller

pub mod entry;
pub mod navigator;
pub mod store;

pub use entry::{Instruction, NavigationEntry, NavigationFlags, NavigationInstruction, StoredEntry};
pub use navigator::{NavigationHandler, Navigator};
pub use store::{BrowserNavigation, HistoryStore, MemoryHistoryStore, NavigationState};
