//! Named menus of routes.

use serde::{Deserialize, Serialize};

use crate::instruction::{split_query, InstructionResolver, ViewportInstruction};

/// One menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavRoute {
    pub title: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavRoute>,
}

impl NavRoute {
    pub fn new(title: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            route: route.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NavRoute>) -> Self {
        self.children = children;
        self
    }

    /// True when every component the route names is shown.
    pub fn is_active(&self, resolver: &InstructionResolver, active_components: &[String]) -> bool {
        let (path, _) = split_query(&self.route);
        let Ok(instructions) = resolver.parse_viewport_instructions(path) else {
            return false;
        };
        let mut components = Vec::new();
        flatten(&instructions, resolver, &mut components);
        !components.is_empty() && components.iter().all(|c| active_components.contains(c))
    }

    /// Active, or containing an active child.
    pub fn has_active(&self, resolver: &InstructionResolver, active_components: &[String]) -> bool {
        self.is_active(resolver, active_components)
            || self.children.iter().any(|c| c.has_active(resolver, active_components))
    }
}

fn flatten(instructions: &[ViewportInstruction], resolver: &InstructionResolver, out: &mut Vec<String>) {
    for vi in instructions {
        out.push(resolver.stringify_component(vi));
        flatten(&vi.next_scope_instructions, resolver, out);
    }
}

/// A named, ordered list of routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nav {
    pub name: String,
    pub routes: Vec<NavRoute>,
}

impl Nav {
    pub fn new(name: impl Into<String>, routes: Vec<NavRoute>) -> Self {
        Self {
            name: name.into(),
            routes,
        }
    }

    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = NavRoute>) {
        self.routes.extend(routes);
    }

    pub fn active_routes<'a>(&'a self, resolver: &InstructionResolver, active_components: &[String]) -> Vec<&'a NavRoute> {
        self.routes
            .iter()
            .filter(|r| r.has_active(resolver, active_components))
            .collect()
    }
}
