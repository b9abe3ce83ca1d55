//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Reconciliation bounds and guard timeouts.
    pub navigation: NavigationConfig,

    /// Instruction grammar.
    pub separators: SeparatorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// History persistence.
    pub history: HistoryConfig,

    /// Viewports attached to the root scope.
    pub viewports: Vec<ViewportConfig>,

    /// Components that can be routed into viewports.
    pub components: Vec<ComponentConfig>,
}

/// Navigation round configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Maximum reconciliation iterations per round before the round fails.
    pub guard_limit: usize,

    /// Deadline for a single lifecycle hook in milliseconds (0 = none).
    pub guard_timeout_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            guard_limit: 100,
            guard_timeout_ms: 0,
        }
    }
}

/// Characters used by the instruction grammar.
///
/// `component(parameters)@viewport/child+sibling`, with `-` clearing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeparatorConfig {
    pub viewport: String,
    pub sibling: String,
    pub scope: String,
    pub parameters: String,
    pub parameters_end: String,
    pub parameter_separator: String,
    pub clear: String,
    pub add: String,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            viewport: "@".to_string(),
            sibling: "+".to_string(),
            scope: "/".to_string(),
            parameters: "(".to_string(),
            parameters_end: ")".to_string(),
            parameter_separator: ",".to_string(),
            clear: "-".to_string(),
            add: "+".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record navigation metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

/// History persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON file the in-memory history store is loaded from and saved to.
    pub persist_path: Option<String>,
}

/// A viewport declaration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Name, unique within its scope.
    pub name: String,

    /// Instruction loaded when the viewport is empty.
    pub default: Option<String>,

    /// Changes to this viewport alone do not create history entries.
    pub no_history: bool,

    /// Left out of the user-facing path.
    pub no_link: bool,

    /// The viewport owns a scope for the viewports of its content.
    pub scope: bool,

    /// Components preferring this viewport when no viewport is named.
    pub used_by: Vec<String>,
}

/// A routable component declaration with static guard behaviour.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ComponentConfig {
    /// Component name used in instructions.
    pub name: String,

    /// Viewports hosted by the component's content.
    pub viewports: Vec<ViewportConfig>,

    /// Result of the leave guard.
    pub can_leave: bool,

    /// Result of the enter guard (ignored when `redirect` is set).
    pub can_enter: bool,

    /// Instructions returned by the enter guard instead of entering.
    pub redirect: Option<String>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            viewports: Vec::new(),
            can_leave: true,
            can_enter: true,
            redirect: None,
        }
    }
}
