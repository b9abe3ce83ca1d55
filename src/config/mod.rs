//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → handed to Router::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the viewport tree changes at runtime
//!   through registration, not through config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ComponentConfig;
pub use schema::NavigationConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouterConfig;
pub use schema::SeparatorConfig;
pub use schema::ViewportConfig;
