//! Scopes: the nodes of the routing tree that own viewports.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::instruction::{InstructionResolver, ViewportInstruction};
use crate::viewport::component::ComponentRegistry;
use crate::viewport::viewport::{Viewport, ViewportOptions};

/// Instructions matched to viewports by `Scope::find_viewports`.
#[derive(Debug, Default)]
pub struct FindViewportsResult {
    pub viewport_instructions: Vec<ViewportInstruction>,
    /// Some instruction in the tree is still waiting for its viewport.
    pub viewports_remaining: bool,
}

struct PendingInstruction {
    instruction: ViewportInstruction,
    attempts: u32,
}

pub struct Scope {
    root: bool,
    parent: Weak<Scope>,
    owner: Weak<Viewport>,
    registry: Arc<ComponentRegistry>,
    parameter_separator: String,
    viewports: Mutex<Vec<Arc<Viewport>>>,
    pending: Mutex<Vec<PendingInstruction>>,
}

impl Scope {
    pub fn new_root(registry: Arc<ComponentRegistry>, parameter_separator: &str) -> Arc<Self> {
        Arc::new(Self {
            root: true,
            parent: Weak::new(),
            owner: Weak::new(),
            registry,
            parameter_separator: parameter_separator.to_string(),
            viewports: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn new_child(parent: &Arc<Scope>, owner: Weak<Viewport>) -> Arc<Self> {
        Arc::new(Self {
            root: false,
            parent: Arc::downgrade(parent),
            owner,
            registry: parent.registry.clone(),
            parameter_separator: parent.parameter_separator.clone(),
            viewports: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn parent(&self) -> Option<Arc<Scope>> {
        self.parent.upgrade()
    }

    /// The viewport whose content this scope belongs to.
    pub fn owner(&self) -> Option<Arc<Viewport>> {
        self.owner.upgrade()
    }

    pub(crate) fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub(crate) fn parameter_separator(&self) -> &str {
        &self.parameter_separator
    }

    pub fn viewports(&self) -> Vec<Arc<Viewport>> {
        self.lock_viewports().clone()
    }

    pub fn get_viewport(&self, name: &str) -> Option<Arc<Viewport>> {
        self.lock_viewports().iter().find(|v| v.name() == name).cloned()
    }

    /// Register a viewport, or return the one already registered under `name`.
    pub fn add_viewport(self: &Arc<Self>, name: &str, options: ViewportOptions) -> Arc<Viewport> {
        if let Some(existing) = self.get_viewport(name) {
            return existing;
        }
        let viewport = Viewport::new(name, options, self);
        self.lock_viewports().push(viewport.clone());
        tracing::debug!(viewport = name, "Viewport registered");
        viewport
    }

    /// Detach `viewport`. Returns whether it was registered here.
    pub(crate) fn remove_viewport(&self, viewport: &Arc<Viewport>) -> bool {
        let mut viewports = self.lock_viewports();
        let before = viewports.len();
        viewports.retain(|v| !Arc::ptr_eq(v, viewport));
        before != viewports.len()
    }

    /// Dispose every viewport of this scope.
    pub(crate) fn clear(&self) {
        let viewports = std::mem::take(&mut *self.lock_viewports());
        for viewport in viewports {
            viewport.dispose();
        }
        self.lock_pending().clear();
    }

    /// Every viewport below this scope, depth first.
    pub fn all_viewports(&self) -> Vec<Arc<Viewport>> {
        let mut all = Vec::new();
        for viewport in self.viewports() {
            let nested = viewport.scope().map(|s| s.all_viewports());
            all.push(viewport);
            all.extend(nested.unwrap_or_default());
        }
        all
    }

    pub fn all_scopes(self: &Arc<Self>) -> Vec<Arc<Scope>> {
        let mut scopes = vec![self.clone()];
        for viewport in self.viewports() {
            if let Some(scope) = viewport.scope() {
                scopes.extend(scope.all_scopes());
            }
        }
        scopes
    }

    pub(crate) fn add_pending(&self, instructions: Vec<ViewportInstruction>) {
        self.lock_pending().extend(instructions.into_iter().map(|instruction| PendingInstruction {
            instruction,
            attempts: 0,
        }));
    }

    /// Forget pending instructions in this scope and below.
    pub(crate) fn clear_pending(&self) {
        self.lock_pending().clear();
        for viewport in self.viewports() {
            viewport.set_pending_children(Vec::new());
            if let Some(scope) = viewport.scope() {
                scope.clear_pending();
            }
        }
    }

    /// Match `instructions` (plus anything still pending in the tree) to
    /// viewports.
    ///
    /// Named instructions match by name. Unnamed ones go to the first free
    /// viewport listing the component in `used_by`, else the first free
    /// viewport with a default, else the first free viewport. An instruction
    /// whose viewport does not exist gets another attempt on the next call,
    /// and keeps waiting while other instructions of this scope still resolve.
    pub fn find_viewports(&self, instructions: Option<Vec<ViewportInstruction>>) -> FindViewportsResult {
        if let Some(instructions) = instructions {
            self.add_pending(instructions);
        }
        let viewports = self.viewports();

        for viewport in &viewports {
            let ready = viewport.take_ready_children();
            if ready.is_empty() {
                continue;
            }
            match viewport.children_scope() {
                Some(scope) => scope.add_pending(ready),
                None => tracing::warn!(viewport = %viewport.name(), "No scope for child instructions"),
            }
        }

        let pending = std::mem::take(&mut *self.lock_pending());
        let mut claimed: Vec<Arc<Viewport>> = Vec::new();
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for mut item in pending {
            let target = match &item.instruction.viewport {
                Some(viewport) => Some(viewport.clone()),
                None => select_viewport(&item.instruction, &viewports, &claimed),
            };
            match target {
                Some(viewport) => {
                    claimed.push(viewport.clone());
                    item.instruction.viewport = Some(viewport);
                    resolved.push(item.instruction);
                }
                None => {
                    item.attempts += 1;
                    unresolved.push(item);
                }
            }
        }

        let progress = !resolved.is_empty();
        let mut remaining = resolved.iter().any(|vi| !vi.next_scope_instructions.is_empty());
        for item in unresolved {
            if item.attempts <= 1 || progress {
                remaining = true;
                self.lock_pending().push(item);
            } else {
                tracing::warn!(instruction = ?item.instruction, "No viewport matches instruction; dropping it");
            }
        }

        for viewport in &viewports {
            remaining |= viewport.has_pending_children();
            if let Some(scope) = viewport.scope() {
                let nested = scope.find_viewports(None);
                resolved.extend(nested.viewport_instructions);
                remaining |= nested.viewports_remaining;
            }
        }

        FindViewportsResult {
            viewport_instructions: resolved,
            viewports_remaining: remaining,
        }
    }

    /// Instructions reproducing what this scope shows. Without `full`,
    /// `no_link` viewports are left out. Viewports in `exclude` (and their
    /// scopes) are skipped.
    pub fn viewport_states(&self, full: bool, exclude: &[Arc<Viewport>]) -> Vec<ViewportInstruction> {
        self.viewports()
            .iter()
            .filter(|viewport| full || !viewport.options().no_link)
            .filter(|viewport| !exclude.iter().any(|e| Arc::ptr_eq(e, viewport)))
            .filter_map(|viewport| {
                let content = viewport.active_content();
                if content.is_empty() {
                    return None;
                }
                let mut vi = content.to_instruction();
                vi.viewport_name = Some(viewport.name().to_string());
                if let Some(scope) = viewport.scope() {
                    vi.next_scope_instructions = scope.viewport_states(full, exclude);
                }
                Some(vi)
            })
            .collect()
    }

    /// Path of the owning viewports from the root down to this scope.
    pub fn scope_context(&self, resolver: &InstructionResolver) -> String {
        let mut segments = Vec::new();
        let mut owner = self.owner();
        while let Some(viewport) = owner {
            let mut vi = viewport.active_content().to_instruction();
            vi.viewport_name = Some(viewport.name().to_string());
            segments.push(resolver.stringify_viewport_instruction(&vi, false));
            owner = viewport.owning_scope().and_then(|scope| scope.owner());
        }
        segments.reverse();
        segments.join(&resolver.separators().scope)
    }

    fn lock_viewports(&self) -> MutexGuard<'_, Vec<Arc<Viewport>>> {
        self.viewports.lock().expect("scope mutex poisoned")
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<PendingInstruction>> {
        self.pending.lock().expect("scope mutex poisoned")
    }
}

fn select_viewport(
    instruction: &ViewportInstruction,
    viewports: &[Arc<Viewport>],
    claimed: &[Arc<Viewport>],
) -> Option<Arc<Viewport>> {
    if let Some(name) = &instruction.viewport_name {
        return viewports.iter().find(|v| v.name() == name).cloned();
    }
    let free: Vec<&Arc<Viewport>> = viewports
        .iter()
        .filter(|v| !claimed.iter().any(|c| Arc::ptr_eq(c, v)))
        .collect();
    let component = instruction.component_name.as_deref();
    free.iter()
        .find(|v| component.is_some_and(|c| v.wants_component(c)))
        .or_else(|| free.iter().find(|v| v.options().default.is_some()))
        .or_else(|| free.first())
        .map(|v| Arc::clone(v))
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("root", &self.root)
            .field("viewports", &self.viewports().iter().map(|v| v.name().to_string()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Arc<Scope> {
        Scope::new_root(Arc::new(ComponentRegistry::new()), ",")
    }

    fn named(component: &str, viewport: &str) -> ViewportInstruction {
        ViewportInstruction::new(component).in_viewport(viewport)
    }

    #[test]
    fn test_named_instructions_resolve_by_name() {
        let scope = root();
        let left = scope.add_viewport("left", ViewportOptions::default());
        let right = scope.add_viewport("right", ViewportOptions::default());

        let found = scope.find_viewports(Some(vec![named("b", "right"), named("a", "left")]));
        assert_eq!(found.viewport_instructions.len(), 2);
        assert!(found.viewport_instructions[0].targets(&right));
        assert!(found.viewport_instructions[1].targets(&left));
        assert!(!found.viewports_remaining);
    }

    #[test]
    fn test_unnamed_instruction_priority() {
        let scope = root();
        let plain = scope.add_viewport("plain", ViewportOptions::default());
        let with_default = scope.add_viewport(
            "main",
            ViewportOptions {
                default: Some("home".into()),
                ..Default::default()
            },
        );
        let preferred = scope.add_viewport(
            "side",
            ViewportOptions {
                used_by: vec!["menu".into()],
                ..Default::default()
            },
        );

        let found = scope.find_viewports(Some(vec![
            ViewportInstruction::new("menu"),
            ViewportInstruction::new("page"),
            ViewportInstruction::new("other"),
        ]));
        let targets: Vec<_> = found.viewport_instructions.iter().map(|vi| vi.viewport.clone().unwrap()).collect();
        assert!(Arc::ptr_eq(&targets[0], &preferred));
        assert!(Arc::ptr_eq(&targets[1], &with_default));
        assert!(Arc::ptr_eq(&targets[2], &plain));
    }

    #[test]
    fn test_unknown_viewport_gets_one_retry() {
        let scope = root();
        scope.add_viewport("main", ViewportOptions::default());

        let first = scope.find_viewports(Some(vec![named("a", "ghost")]));
        assert!(first.viewport_instructions.is_empty());
        assert!(first.viewports_remaining);

        let second = scope.find_viewports(None);
        assert!(second.viewport_instructions.is_empty());
        assert!(!second.viewports_remaining);
    }

    #[test]
    fn test_nested_scopes_and_tree_walks() {
        let scope = root();
        let shell = scope.add_viewport(
            "shell",
            ViewportOptions {
                scope: true,
                ..Default::default()
            },
        );
        let nested = shell.scope().unwrap().add_viewport("inner", ViewportOptions::default());
        scope.add_viewport("footer", ViewportOptions::default());

        let names: Vec<_> = scope.all_viewports().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["shell", "inner", "footer"]);
        assert_eq!(scope.all_scopes().len(), 2);
        assert!(Arc::ptr_eq(&nested.owning_scope().unwrap().owner().unwrap(), &shell));

        shell.dispose();
        assert_eq!(scope.all_viewports().len(), 1);
    }

    #[test]
    fn test_add_viewport_is_idempotent() {
        let scope = root();
        let a = scope.add_viewport("main", ViewportOptions::default());
        let b = scope.add_viewport("main", ViewportOptions::default());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(scope.viewports().len(), 1);
    }
}
