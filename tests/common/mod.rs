//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use viewport_router::config::{RouterConfig, ViewportConfig};
use viewport_router::instruction::ViewportInstruction;
use viewport_router::viewport::{ComponentDefinition, ViewportOptions};
use viewport_router::{ComponentError, ComponentRegistry, GuardResult, MemoryHistoryStore, RouteComponent, Router, RouterOptions};

/// Ordered log of lifecycle calls, as `component:hook`.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// Scripted guard answers for a test component.
#[derive(Clone)]
pub struct Behaviour {
    pub can_leave: bool,
    pub can_enter: GuardResult,
    pub fail_enter: bool,
    /// Fail every `enter` after this many, counted across instances.
    pub fail_enter_after: Option<usize>,
    pub panic_can_enter: bool,
    pub delay: Option<Duration>,
    pub enters: Arc<AtomicUsize>,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            can_leave: true,
            can_enter: GuardResult::Proceed,
            fail_enter: false,
            fail_enter_after: None,
            panic_can_enter: false,
            delay: None,
            enters: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Behaviour {
    pub fn locked() -> Self {
        Self {
            can_leave: false,
            ..Default::default()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            can_enter: GuardResult::Reject,
            ..Default::default()
        }
    }

    pub fn flaky(succeeding: usize) -> Self {
        Self {
            fail_enter_after: Some(succeeding),
            ..Default::default()
        }
    }

    pub fn redirecting(instructions: Vec<ViewportInstruction>) -> Self {
        Self {
            can_enter: GuardResult::AddInstructions(instructions),
            ..Default::default()
        }
    }
}

pub struct Scripted {
    name: String,
    behaviour: Behaviour,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl RouteComponent for Scripted {
    async fn can_leave(&self) -> Result<bool, ComponentError> {
        self.recorder.log(format!("{}:canLeave", self.name));
        Ok(self.behaviour.can_leave)
    }

    async fn can_enter(&self, parameters: &[String]) -> Result<GuardResult, ComponentError> {
        self.recorder.log(format!("{}:canEnter{:?}", self.name, parameters));
        if let Some(delay) = self.behaviour.delay {
            tokio::time::sleep(delay).await;
        }
        if self.behaviour.panic_can_enter {
            panic!("guard bug in {}", self.name);
        }
        Ok(self.behaviour.can_enter.clone())
    }

    async fn enter(&self, _parameters: &[String]) -> Result<(), ComponentError> {
        self.recorder.log(format!("{}:enter", self.name));
        let entered = self.behaviour.enters.fetch_add(1, Ordering::SeqCst) + 1;
        if self.behaviour.fail_enter || self.behaviour.fail_enter_after.is_some_and(|limit| entered > limit) {
            return Err(ComponentError::new("enter exploded"));
        }
        Ok(())
    }

    async fn leave(&self) -> Result<(), ComponentError> {
        self.recorder.log(format!("{}:leave", self.name));
        Ok(())
    }
}

/// Registry builder for scripted components.
pub struct Components {
    pub registry: ComponentRegistry,
    pub recorder: Arc<Recorder>,
}

impl Components {
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
            recorder: Arc::new(Recorder::default()),
        }
    }

    pub fn plain(self, names: &[&str]) -> Self {
        for name in names {
            self.add(name, Behaviour::default(), &[]);
        }
        self
    }

    pub fn with(self, name: &str, behaviour: Behaviour) -> Self {
        self.add(name, behaviour, &[]);
        self
    }

    /// A component whose content hosts `viewports` (`scope` viewports own a
    /// nested scope).
    pub fn hosting(self, name: &str, viewports: &[(&str, ViewportOptions)]) -> Self {
        self.add(name, Behaviour::default(), viewports);
        self
    }

    fn add(&self, name: &str, behaviour: Behaviour, viewports: &[(&str, ViewportOptions)]) {
        let recorder = self.recorder.clone();
        let component = name.to_string();
        let mut definition = ComponentDefinition::new(name, move || Scripted {
            name: component.clone(),
            behaviour: behaviour.clone(),
            recorder: recorder.clone(),
        });
        for (viewport, options) in viewports {
            definition = definition.with_viewport(*viewport, options.clone());
        }
        self.registry.register_definition(definition);
    }
}

pub struct Fixture {
    pub router: Arc<Router>,
    pub store: Arc<MemoryHistoryStore>,
    pub recorder: Arc<Recorder>,
}

pub fn viewport(name: &str) -> ViewportConfig {
    ViewportConfig {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn config(viewports: Vec<ViewportConfig>) -> RouterConfig {
    RouterConfig {
        viewports,
        ..Default::default()
    }
}

/// An activated router over an in-memory history.
pub fn fixture(config: RouterConfig, components: Components) -> Fixture {
    fixture_with(config, components, RouterOptions::default())
}

pub fn fixture_with(config: RouterConfig, components: Components, options: RouterOptions) -> Fixture {
    let store = Arc::new(MemoryHistoryStore::new());
    let router = Router::new(&config, Arc::new(components.registry), store.clone());
    router.activate(options).unwrap();
    Fixture {
        router,
        store,
        recorder: components.recorder,
    }
}

impl Fixture {
    /// `component(parameters)` committed in `viewport`, `None` when empty.
    pub fn shown(&self, viewport: &str) -> Option<String> {
        let viewport = self.router.get_viewport(viewport)?;
        let content = viewport.content();
        content.component.as_ref()?;
        Some(self.router.resolver().stringify_component(&content.to_instruction()))
    }

    pub fn path(&self) -> Option<String> {
        self.router.navigator().current_entry().and_then(|e| e.path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.router
            .navigator()
            .entries()
            .into_iter()
            .map(|e| e.path.unwrap_or_default())
            .collect()
    }

    pub fn index(&self) -> Option<usize> {
        self.router.navigator().current_entry().and_then(|e| e.index)
    }
}

/// Wait (up to a second) for `condition` to hold.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 1s");
}
