//! A named content region and its guarded content transitions.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::config::ViewportConfig;
use crate::error::{ComponentError, RouterError, RouterResult};
use crate::instruction::ViewportInstruction;
use crate::viewport::component::{ComponentRegistry, GuardResult};
use crate::viewport::content::{ContentStatus, ViewportContent};
use crate::viewport::scope::Scope;

/// Behaviour switches of a viewport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportOptions {
    /// Instruction loaded while the viewport is empty.
    pub default: Option<String>,
    pub no_history: bool,
    pub no_link: bool,
    /// Own a scope for the viewports of the content.
    pub scope: bool,
    pub used_by: Vec<String>,
}

impl From<&ViewportConfig> for ViewportOptions {
    fn from(config: &ViewportConfig) -> Self {
        Self {
            default: config.default.clone(),
            no_history: config.no_history,
            no_link: config.no_link,
            scope: config.scope,
            used_by: config.used_by.clone(),
        }
    }
}

#[derive(Default)]
struct ViewportState {
    content: ViewportContent,
    next_content: Option<ViewportContent>,
    /// Instructions for the children scope, released once the next content
    /// has entered.
    pending_children: Vec<ViewportInstruction>,
}

pub struct Viewport {
    name: String,
    options: ViewportOptions,
    owning_scope: Weak<Scope>,
    scope: Option<Arc<Scope>>,
    registry: Arc<ComponentRegistry>,
    parameter_separator: String,
    state: Mutex<ViewportState>,
}

impl Viewport {
    pub(crate) fn new(name: &str, options: ViewportOptions, owning_scope: &Arc<Scope>) -> Arc<Self> {
        Arc::new_cyclic(|viewport| {
            let scope = options
                .scope
                .then(|| Scope::new_child(owning_scope, viewport.clone()));
            Self {
                name: name.to_string(),
                options,
                owning_scope: Arc::downgrade(owning_scope),
                scope,
                registry: owning_scope.registry().clone(),
                parameter_separator: owning_scope.parameter_separator().to_string(),
                state: Mutex::new(ViewportState::default()),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn owning_scope(&self) -> Option<Arc<Scope>> {
        self.owning_scope.upgrade()
    }

    /// The scope this viewport owns, if it was created with `scope`.
    pub fn scope(&self) -> Option<&Arc<Scope>> {
        self.scope.as_ref()
    }

    /// Where the viewports of this viewport's content live.
    pub fn children_scope(&self) -> Option<Arc<Scope>> {
        self.scope.clone().or_else(|| self.owning_scope())
    }

    pub fn content(&self) -> ViewportContent {
        self.lock().content.clone()
    }

    pub fn next_content(&self) -> Option<ViewportContent> {
        self.lock().next_content.clone()
    }

    /// Pending content if any, else current content.
    pub fn active_content(&self) -> ViewportContent {
        let state = self.lock();
        state.next_content.clone().unwrap_or_else(|| state.content.clone())
    }

    pub fn wants_component(&self, component: &str) -> bool {
        self.options.used_by.iter().any(|c| c == component)
    }

    /// Stage `instruction` as next content. Returns whether it differs from
    /// what is shown (or already staged). Staged content that already entered
    /// is left before it is dropped.
    pub async fn set_next_content(&self, instruction: &ViewportInstruction) -> bool {
        let next = ViewportContent::from_instruction(instruction);
        let (changed, discarded, owned) = {
            let mut state = self.lock();
            if let Some(staged) = &state.next_content {
                if !staged.is_change(&next) {
                    return false;
                }
            }
            let discarded = state.next_content.take();
            let changed = state.content.is_change(&next);
            if changed {
                state.next_content = Some(next);
            }
            (changed, discarded, state.content.children.clone())
        };
        if let Some(discarded) = discarded {
            self.discard(discarded, &owned).await;
        }
        changed
    }

    /// Viewports of the shown content that the staged content drops.
    pub(crate) fn stale_children(&self) -> Vec<Arc<Viewport>> {
        let state = self.lock();
        match &state.next_content {
            Some(next) => state
                .content
                .children
                .iter()
                .filter(|child| !next.children.iter().any(|n| Arc::ptr_eq(n, child)))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn set_pending_children(&self, children: Vec<ViewportInstruction>) {
        self.lock().pending_children = children;
    }

    pub fn has_pending_children(&self) -> bool {
        !self.lock().pending_children.is_empty()
    }

    /// Child instructions, once the next content (if any) has entered.
    pub(crate) fn take_ready_children(&self) -> Vec<ViewportInstruction> {
        let mut state = self.lock();
        let ready = state
            .next_content
            .as_ref()
            .map(|next| next.status >= ContentStatus::Entered)
            .unwrap_or(true);
        if ready {
            std::mem::take(&mut state.pending_children)
        } else {
            Vec::new()
        }
    }

    pub async fn can_leave(&self) -> RouterResult<bool> {
        let instance = {
            let state = self.lock();
            if state.next_content.is_none() {
                return Ok(true);
            }
            state.content.instance.clone()
        };
        match instance {
            Some(instance) => instance.can_leave().await.map_err(self.hook_error("canLeave")),
            None => Ok(true),
        }
    }

    /// Instantiate the next component and ask whether it may enter.
    pub async fn can_enter(&self) -> RouterResult<GuardResult> {
        let (component, parameters) = {
            let state = self.lock();
            match &state.next_content {
                Some(next) => match &next.component {
                    Some(component) => (component.clone(), self.parameter_list(next)),
                    None => return Ok(GuardResult::Proceed),
                },
                None => return Ok(GuardResult::Proceed),
            }
        };

        let definition = self
            .registry
            .get(&component)
            .ok_or_else(|| RouterError::UnknownComponent(component.clone()))?;
        let instance = definition.instantiate();
        {
            let mut state = self.lock();
            if let Some(next) = state.next_content.as_mut() {
                next.instance = Some(instance.clone());
                next.status = ContentStatus::Created;
            }
        }
        instance.can_enter(&parameters).await.map_err(self.hook_error("canEnter"))
    }

    /// Enter the next content and register the viewports it declares.
    pub async fn enter(&self) -> RouterResult<()> {
        let (instance, component, parameters) = {
            let state = self.lock();
            match &state.next_content {
                Some(next) => (next.instance.clone(), next.component.clone(), self.parameter_list(next)),
                None => return Ok(()),
            }
        };
        if let Some(instance) = &instance {
            instance.enter(&parameters).await.map_err(self.hook_error("enter"))?;
        }

        let mut children = Vec::new();
        let declared = component.and_then(|c| self.registry.get(&c)).map(|d| d.viewports);
        if let (Some(declared), Some(scope)) = (declared, self.children_scope()) {
            let owned = self.lock().content.children.clone();
            for (name, options) in declared {
                match scope.get_viewport(&name) {
                    // Reuse viewports of the content being replaced.
                    Some(existing) if owned.iter().any(|o| Arc::ptr_eq(o, &existing)) => children.push(existing),
                    Some(_) => {
                        tracing::warn!(viewport = %self.name, child = %name, "Declared viewport already exists in scope; not claiming it");
                    }
                    None => children.push(scope.add_viewport(&name, options)),
                }
            }
        }

        let mut state = self.lock();
        if let Some(next) = state.next_content.as_mut() {
            next.status = ContentStatus::Entered;
            next.children = children;
        }
        Ok(())
    }

    /// Let the outgoing component leave.
    pub async fn load_content(&self) -> RouterResult<()> {
        let previous = {
            let state = self.lock();
            if state.next_content.is_none() {
                return Ok(());
            }
            state.content.instance.clone()
        };
        if let Some(previous) = previous {
            previous.leave().await.map_err(self.hook_error("leave"))?;
        }
        if let Some(next) = self.lock().next_content.as_mut() {
            next.status = ContentStatus::Loaded;
        }
        Ok(())
    }

    /// Commit the next content.
    pub fn finalize_content_change(&self) {
        let (stale, owned) = {
            let mut state = self.lock();
            let Some(next) = state.next_content.take() else {
                return;
            };
            let previous = std::mem::replace(&mut state.content, next);
            state.pending_children.clear();
            (previous.children, state.content.children.clone())
        };
        release_children(stale, &owned);
        tracing::debug!(viewport = %self.name, component = ?self.lock().content.component, "Content committed");
    }

    /// Discard the next content.
    pub async fn abort_content_change(&self) {
        let (next, owned) = {
            let mut state = self.lock();
            state.pending_children.clear();
            let Some(next) = state.next_content.take() else {
                return;
            };
            (next, state.content.children.clone())
        };
        self.discard(next, &owned).await;
    }

    async fn discard(&self, content: ViewportContent, owned: &[Arc<Viewport>]) {
        if content.status >= ContentStatus::Entered {
            if let Some(instance) = &content.instance {
                if let Err(e) = instance.leave().await {
                    tracing::warn!(viewport = %self.name, error = %e, "Leave failed while discarding content");
                }
            }
        }
        release_children(content.children, owned);
    }

    /// Remove this viewport, the viewports of its content and its scope.
    pub(crate) fn dispose(self: &Arc<Self>) {
        let children = {
            let mut state = self.lock();
            state.pending_children.clear();
            let mut children = std::mem::take(&mut state.content.children);
            if let Some(next) = state.next_content.as_mut() {
                children.append(&mut next.children);
            }
            children
        };
        for child in children {
            child.dispose();
        }
        if let Some(scope) = &self.scope {
            scope.clear();
        }
        if let Some(owner) = self.owning_scope() {
            owner.remove_viewport(self);
        }
    }

    fn parameter_list(&self, content: &ViewportContent) -> Vec<String> {
        content.to_instruction().parameter_list(&self.parameter_separator)
    }

    fn hook_error(&self, hook: &'static str) -> impl FnOnce(ComponentError) -> RouterError + '_ {
        move |source| RouterError::Hook {
            viewport: self.name.clone(),
            hook,
            source,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewportState> {
        self.state.lock().expect("viewport mutex poisoned")
    }
}

/// Dispose `children` that are not also in `owned`.
fn release_children(children: Vec<Arc<Viewport>>, owned: &[Arc<Viewport>]) {
    for child in children {
        if !owned.iter().any(|o| Arc::ptr_eq(o, &child)) {
            child.dispose();
        }
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Viewport")
            .field("name", &self.name)
            .field("content", &state.content.component)
            .field("next", &state.next_content.as_ref().map(|n| n.component.clone()))
            .finish()
    }
}
