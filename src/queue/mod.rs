//! Serial work queue.
//!
//! # Data Flow
//! ```text
//! enqueue(value)
//!     → completion registered under a fresh RequestId
//!     → item appended to the pending list
//!     → if idle: a drain task is spawned
//!
//! drain task:
//!     pop head → await processor(item) → resolve/reject leftover completion
//!     → next item, or mark idle when empty
//! ```
//!
//! # Design Decisions
//! - At most one drain task exists, so processors never overlap
//! - Completions live in a side table keyed by request ID, so whoever finishes
//!   the work (the processor itself, or a later commit/cancel step) resolves
//!   it exactly once
//! - A processor error rejects the caller's completion and the queue moves on

pub mod completion;
pub mod serial;

pub use completion::{Completion, RequestId};
pub use serial::{Processor, QueueItem, SerialQueue};
