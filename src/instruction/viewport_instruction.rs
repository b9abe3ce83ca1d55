use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// A request to show a component (or nothing) in a viewport.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportInstruction {
    /// `None` clears the viewport.
    pub component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_name: Option<String>,
    /// Set once the instruction has been matched against the tree.
    #[serde(skip)]
    pub viewport: Option<Arc<Viewport>>,
    /// Instructions for the scope the target viewport's content exposes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next_scope_instructions: Vec<ViewportInstruction>,
}

impl ViewportInstruction {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component_name: Some(component.into()),
            ..Default::default()
        }
    }

    /// An instruction emptying its viewport.
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn in_viewport(mut self, name: impl Into<String>) -> Self {
        self.viewport_name = Some(name.into());
        self
    }

    pub fn with_viewport(mut self, viewport: Arc<Viewport>) -> Self {
        self.viewport_name = Some(viewport.name().to_string());
        self.viewport = Some(viewport);
        self
    }

    pub fn with_children(mut self, children: Vec<ViewportInstruction>) -> Self {
        self.next_scope_instructions = children;
        self
    }

    pub fn is_clear(&self) -> bool {
        self.component_name.is_none()
    }

    /// Name of the viewport this instruction is aimed at, resolved or not.
    pub fn target_name(&self) -> Option<&str> {
        self.viewport
            .as_ref()
            .map(|v| v.name())
            .or(self.viewport_name.as_deref())
    }

    pub fn targets(&self, viewport: &Arc<Viewport>) -> bool {
        self.viewport
            .as_ref()
            .is_some_and(|v| Arc::ptr_eq(v, viewport))
    }

    /// Parameters split on `separator`, empty entries dropped.
    pub fn parameter_list(&self, separator: &str) -> Vec<String> {
        match &self.parameters {
            Some(p) if !p.is_empty() => p
                .split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Same component and parameters, ignoring the target.
    pub fn same_content(&self, other: &ViewportInstruction) -> bool {
        self.component_name == other.component_name && self.parameters == other.parameters
    }
}

impl PartialEq for ViewportInstruction {
    fn eq(&self, other: &Self) -> bool {
        let same_viewport = match (&self.viewport, &other.viewport) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_viewport
            && self.same_content(other)
            && self.viewport_name == other.viewport_name
            && self.next_scope_instructions == other.next_scope_instructions
    }
}

impl fmt::Debug for ViewportInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportInstruction")
            .field("component", &self.component_name)
            .field("parameters", &self.parameters)
            .field("viewport", &self.target_name())
            .field("resolved", &self.viewport.is_some())
            .field("children", &self.next_scope_instructions)
            .finish()
    }
}
