//! Routed components and their registry.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::ComponentConfig;
use crate::error::{ComponentError, RouterResult};
use crate::instruction::{InstructionResolver, ViewportInstruction};
use crate::viewport::viewport::ViewportOptions;

/// Answer of an enter guard.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardResult {
    Proceed,
    Reject,
    /// Do not enter; route these instructions instead.
    AddInstructions(Vec<ViewportInstruction>),
}

impl From<bool> for GuardResult {
    fn from(allowed: bool) -> Self {
        if allowed {
            GuardResult::Proceed
        } else {
            GuardResult::Reject
        }
    }
}

/// Lifecycle hooks of a component instance hosted by a viewport.
///
/// Every hook defaults to allowing the transition.
#[async_trait]
pub trait RouteComponent: Send + Sync {
    async fn can_leave(&self) -> Result<bool, ComponentError> {
        Ok(true)
    }

    async fn can_enter(&self, _parameters: &[String]) -> Result<GuardResult, ComponentError> {
        Ok(GuardResult::Proceed)
    }

    async fn enter(&self, _parameters: &[String]) -> Result<(), ComponentError> {
        Ok(())
    }

    async fn leave(&self) -> Result<(), ComponentError> {
        Ok(())
    }
}

pub type ComponentFactory = Arc<dyn Fn() -> Arc<dyn RouteComponent> + Send + Sync>;

/// How to build a component, and which viewports its content hosts.
#[derive(Clone)]
pub struct ComponentDefinition {
    pub name: String,
    pub viewports: Vec<(String, ViewportOptions)>,
    factory: ComponentFactory,
}

impl ComponentDefinition {
    pub fn new<F, C>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: RouteComponent + 'static,
    {
        Self {
            name: name.into(),
            viewports: Vec::new(),
            factory: Arc::new(move || Arc::new(factory()) as Arc<dyn RouteComponent>),
        }
    }

    pub fn with_viewport(mut self, name: impl Into<String>, options: ViewportOptions) -> Self {
        self.viewports.push((name.into(), options));
        self
    }

    pub fn instantiate(&self) -> Arc<dyn RouteComponent> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("viewports", &self.viewports)
            .finish()
    }
}

/// Components known by name.
#[derive(Default)]
pub struct ComponentRegistry {
    definitions: DashMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of `ConfiguredComponent`s.
    pub fn from_config(components: &[ComponentConfig], resolver: &InstructionResolver) -> RouterResult<Self> {
        let registry = Self::new();
        for config in components {
            let component = ConfiguredComponent::from_config(config, resolver)?;
            let mut definition = ComponentDefinition::new(&config.name, move || component.clone());
            for viewport in &config.viewports {
                definition = definition.with_viewport(&viewport.name, ViewportOptions::from(viewport));
            }
            registry.register_definition(definition);
        }
        Ok(registry)
    }

    pub fn register<F, C>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: RouteComponent + 'static,
    {
        self.register_definition(ComponentDefinition::new(name, factory));
    }

    /// Register or replace a definition.
    pub fn register_definition(&self, definition: ComponentDefinition) {
        tracing::debug!(component = %definition.name, "Registered component");
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<ComponentDefinition> {
        self.definitions.get(name).map(|d| d.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Component with fixed guard answers, declared in configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredComponent {
    can_leave: bool,
    can_enter: bool,
    redirect: Option<Vec<ViewportInstruction>>,
}

impl ConfiguredComponent {
    pub fn from_config(config: &ComponentConfig, resolver: &InstructionResolver) -> RouterResult<Self> {
        let redirect = config
            .redirect
            .as_deref()
            .map(|path| resolver.parse_viewport_instructions(path))
            .transpose()?;
        Ok(Self {
            can_leave: config.can_leave,
            can_enter: config.can_enter,
            redirect,
        })
    }
}

#[async_trait]
impl RouteComponent for ConfiguredComponent {
    async fn can_leave(&self) -> Result<bool, ComponentError> {
        Ok(self.can_leave)
    }

    async fn can_enter(&self, _parameters: &[String]) -> Result<GuardResult, ComponentError> {
        Ok(match &self.redirect {
            Some(instructions) => GuardResult::AddInstructions(instructions.clone()),
            None => self.can_enter.into(),
        })
    }
}
