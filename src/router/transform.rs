//! URL rewriting hooks.

use crate::instruction::ViewportInstruction;

/// Output of a route transformer.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    Path(String),
    Instructions(Vec<ViewportInstruction>),
}

/// Rewrites paths on the way in and instructions on the way out.
pub trait RouteTransformer: Send + Sync {
    /// Applied to incoming paths, except history replays.
    fn transform_from_url(&self, path: &str) -> Transformed {
        Transformed::Path(path.to_string())
    }

    /// Applied to the instructions describing the tree before they become
    /// the entry's path.
    fn transform_to_url(&self, instructions: Vec<ViewportInstruction>) -> Transformed {
        Transformed::Instructions(instructions)
    }
}
