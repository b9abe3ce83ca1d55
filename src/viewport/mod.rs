//! Viewport tree.
//!
//! # Data Flow
//! ```text
//! Scope (root)
//!  └─ Viewport "main"         content: shell      next: None
//!      └─ Scope (shell)
//!          ├─ Viewport "left"  content: list       next: Some(detail)
//!          └─ Viewport "right" content: -          next: None
//! ```
//!
//! # Design Decisions
//! - Scopes own their viewports; parents are held weakly
//! - A viewport carries at most one pending content change
//! - Content changes run as guard → enter → load → finalize or abort

pub mod component;
pub mod content;
pub mod scope;
#[allow(clippy::module_inception)]
pub mod viewport;

pub use component::{
    ComponentDefinition, ComponentRegistry, ConfiguredComponent, GuardResult, RouteComponent,
};
pub use content::{ContentStatus, ViewportContent};
pub use scope::{FindViewportsResult, Scope};
pub use viewport::{Viewport, ViewportOptions};
