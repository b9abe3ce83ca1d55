//! What a viewport shows.

use std::fmt;
use std::sync::Arc;

use crate::instruction::ViewportInstruction;
use crate::viewport::component::RouteComponent;
use crate::viewport::viewport::Viewport;

/// Progress of a content change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContentStatus {
    #[default]
    Pending,
    Created,
    Entered,
    Loaded,
}

/// A component identity plus parameters, and the live instance once created.
#[derive(Clone, Default)]
pub struct ViewportContent {
    pub component: Option<String>,
    pub parameters: Option<String>,
    pub(crate) instance: Option<Arc<dyn RouteComponent>>,
    pub(crate) status: ContentStatus,
    /// Viewports registered by this content's component.
    pub(crate) children: Vec<Arc<Viewport>>,
}

impl ViewportContent {
    pub fn from_instruction(instruction: &ViewportInstruction) -> Self {
        Self {
            component: instruction.component_name.clone(),
            parameters: instruction.parameters.clone().filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.component.is_none()
    }

    /// Whether switching from `self` to `other` changes what is shown.
    pub fn is_change(&self, other: &ViewportContent) -> bool {
        self.component != other.component || self.parameters != other.parameters
    }

    pub fn status(&self) -> ContentStatus {
        self.status
    }

    pub fn to_instruction(&self) -> ViewportInstruction {
        ViewportInstruction {
            component_name: self.component.clone(),
            parameters: self.parameters.clone(),
            ..Default::default()
        }
    }
}

impl fmt::Debug for ViewportContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportContent")
            .field("component", &self.component)
            .field("parameters", &self.parameters)
            .field("status", &self.status)
            .field("children", &self.children.iter().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}
