//! The router: turns navigation instructions into viewport content.

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::future::join_all;
use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::config::validation::validate_config;
use crate::config::{NavigationConfig, RouterConfig};
use crate::error::{RouterError, RouterResult};
use crate::instruction::{parse_query, split_query, InstructionResolver, ViewportInstruction};
use crate::navigation::{
    BrowserNavigation, HistoryStore, Instruction, NavigationEntry, NavigationHandler,
    NavigationInstruction, Navigator, StoredEntry,
};
use crate::observability::metrics::{self, Outcome};
use crate::queue::{Completion, RequestId};
use crate::router::nav::{Nav, NavRoute};
use crate::router::transform::{RouteTransformer, Transformed};
use crate::viewport::{ComponentRegistry, GuardResult, Scope, Viewport, ViewportOptions};

/// Called with every instruction before its round starts.
pub type ReportCallback = Arc<dyn Fn(&NavigationInstruction) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RouterOptions {
    pub transformer: Option<Arc<dyn RouteTransformer>>,
    pub report_callback: Option<ReportCallback>,
}

/// Where to navigate.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationTarget {
    /// A path, optionally followed by `?query`.
    Path(String),
    Instructions(Vec<ViewportInstruction>),
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        NavigationTarget::Path(path.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        NavigationTarget::Path(path)
    }
}

impl From<Vec<ViewportInstruction>> for NavigationTarget {
    fn from(instructions: Vec<ViewportInstruction>) -> Self {
        NavigationTarget::Instructions(instructions)
    }
}

impl From<ViewportInstruction> for NavigationTarget {
    fn from(instruction: ViewportInstruction) -> Self {
        NavigationTarget::Instructions(vec![instruction])
    }
}

#[derive(Default)]
struct RouterState {
    active: bool,
    options: RouterOptions,
    processing: Option<RequestId>,
    last_navigation: Option<StoredEntry>,
    added_viewports: Vec<ViewportInstruction>,
    active_components: Vec<String>,
    navs: BTreeMap<String, Nav>,
    bridge: Option<JoinHandle<()>>,
}

/// Viewports touched by the round in progress.
#[derive(Default)]
struct Round {
    changed: Vec<Arc<Viewport>>,
    updated: Vec<Arc<Viewport>>,
    iterations: usize,
}

impl Round {
    fn touched(&self) -> Vec<Arc<Viewport>> {
        let mut touched = self.updated.clone();
        for viewport in &self.changed {
            push_unique(&mut touched, viewport);
        }
        touched
    }
}

fn push_unique(list: &mut Vec<Arc<Viewport>>, viewport: &Arc<Viewport>) {
    if !list.iter().any(|v| Arc::ptr_eq(v, viewport)) {
        list.push(viewport.clone());
    }
}

pub struct Router {
    config: NavigationConfig,
    resolver: InstructionResolver,
    registry: Arc<ComponentRegistry>,
    root_scope: Arc<Scope>,
    navigator: Arc<Navigator>,
    store: Arc<dyn HistoryStore>,
    state: Mutex<RouterState>,
}

impl Router {
    /// Build a router with the viewports of `config` and the given components.
    /// `config` is taken as is; `from_config` validates it.
    pub fn new(config: &RouterConfig, registry: Arc<ComponentRegistry>, store: Arc<dyn HistoryStore>) -> Arc<Self> {
        let resolver = InstructionResolver::new(config.separators.clone());
        let root_scope = Scope::new_root(registry.clone(), &config.separators.parameter_separator);
        for viewport in &config.viewports {
            root_scope.add_viewport(&viewport.name, ViewportOptions::from(viewport));
        }
        Arc::new(Self {
            config: config.navigation.clone(),
            resolver,
            registry,
            root_scope,
            navigator: Navigator::new(store.clone()),
            store,
            state: Mutex::new(RouterState::default()),
        })
    }

    /// Build a router whose components are the ones declared in `config`,
    /// after validating it.
    pub fn from_config(config: &RouterConfig, store: Arc<dyn HistoryStore>) -> RouterResult<Arc<Self>> {
        validate_config(config).map_err(|errors| {
            RouterError::InvalidConfig(errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
        })?;
        let resolver = InstructionResolver::new(config.separators.clone());
        let registry = Arc::new(ComponentRegistry::from_config(&config.components, &resolver)?);
        Ok(Self::new(config, registry, store))
    }

    /// Start processing navigations. Must run inside a Tokio runtime.
    pub fn activate(self: &Arc<Self>, options: RouterOptions) -> RouterResult<()> {
        {
            let mut state = self.lock();
            if state.active {
                return Err(RouterError::AlreadyActivated("router"));
            }
            state.active = true;
            state.options = options;
        }
        let handler: Arc<dyn NavigationHandler> = self.clone();
        self.navigator.activate(Arc::downgrade(&handler))?;

        if let Some(mut events) = self.store.subscribe() {
            let router = Arc::downgrade(self);
            let bridge = tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    let Some(router) = router.upgrade() else {
                        break;
                    };
                    let completion = router.browser_navigated(event);
                    drop(router);
                    tokio::spawn(async move {
                        if let Err(e) = completion.await {
                            tracing::warn!(error = %e, "Browser navigation failed");
                        }
                    });
                }
            });
            self.lock().bridge = Some(bridge);
        }
        tracing::info!(viewports = self.all_viewports().len(), components = self.registry.len(), "Router activated");
        Ok(())
    }

    pub fn deactivate(&self) -> RouterResult<()> {
        let bridge = {
            let mut state = self.lock();
            if !state.active {
                return Err(RouterError::NotActivated("router"));
            }
            state.active = false;
            state.bridge.take()
        };
        if let Some(bridge) = bridge {
            bridge.abort();
        }
        self.navigator.deactivate()?;
        tracing::info!("Router deactivated");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn is_navigating(&self) -> bool {
        self.lock().processing.is_some()
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn resolver(&self) -> &InstructionResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub fn root_scope(&self) -> &Arc<Scope> {
        &self.root_scope
    }

    // Navigation requests

    pub fn goto(&self, target: impl Into<NavigationTarget>, title: Option<String>, data: Option<serde_json::Value>) -> Completion {
        self.navigator.navigate(self.entry_for(target.into(), title, data, false))
    }

    /// Like `goto`, but overwrite the current entry.
    pub fn replace(&self, target: impl Into<NavigationTarget>, title: Option<String>, data: Option<serde_json::Value>) -> Completion {
        self.navigator.navigate(self.entry_for(target.into(), title, data, true))
    }

    pub fn refresh(&self) -> Completion {
        self.navigator.refresh()
    }

    pub fn back(&self) -> Completion {
        self.navigator.go(-1)
    }

    pub fn forward(&self) -> Completion {
        self.navigator.go(1)
    }

    pub fn go(&self, movement: isize) -> Completion {
        self.navigator.go(movement)
    }

    /// Navigate to `href` as clicked inside `from`. Relative links resolve
    /// against the scope `from` shows its content in.
    pub fn follow_link(&self, href: &str, from: Option<&Arc<Viewport>>) -> Completion {
        let href = href.strip_prefix('#').unwrap_or(href);
        let scope_separator = &self.resolver.separators().scope;
        let path = if href.starts_with(scope_separator.as_str()) {
            href.to_string()
        } else {
            let context = self.find_scope(from).scope_context(&self.resolver);
            self.resolver.build_scoped_link(&context, href)
        };
        tracing::debug!(href, path = %path, "Following link");
        self.goto(path, None, None)
    }

    /// Handle a history movement reported by the store.
    pub fn browser_navigated(&self, event: BrowserNavigation) -> Completion {
        let mut entry: NavigationEntry = event.state.map(|s| s.entry.into()).unwrap_or_default();
        entry.instruction = Instruction::Path(event.instruction);
        entry.from_browser = true;
        self.navigator.navigate(entry)
    }

    fn entry_for(&self, target: NavigationTarget, title: Option<String>, data: Option<serde_json::Value>, replacing: bool) -> NavigationEntry {
        let mut entry = NavigationEntry {
            title,
            data,
            replacing,
            ..Default::default()
        };
        match target {
            NavigationTarget::Path(path) => {
                let (path, query) = split_query(&path);
                entry.instruction = Instruction::Path(path.to_string());
                entry.query = query.map(str::to_string);
            }
            NavigationTarget::Instructions(instructions) => {
                entry.instruction = Instruction::Viewports(instructions);
            }
        }
        entry
    }

    // Viewport tree

    /// Route `instruction` as part of the round in progress, or start a
    /// round for it once one has completed before.
    pub fn add_processing_viewport(&self, mut instruction: ViewportInstruction) {
        if instruction.viewport.is_none() {
            if let Some(name) = &instruction.viewport_name {
                instruction.viewport = self.get_viewport(name);
            }
        }
        let trigger = {
            let mut state = self.lock();
            state.added_viewports.push(instruction);
            state.active && state.processing.is_none() && state.last_navigation.is_some()
        };
        if trigger {
            let completion = self.navigator.navigate(NavigationEntry {
                repeating: true,
                ..Default::default()
            });
            tokio::spawn(async move {
                if let Err(e) = completion.await {
                    tracing::warn!(error = %e, "Repeating navigation failed");
                }
            });
        }
    }

    /// Register a viewport in the scope `parent` exposes to its content (the
    /// root scope without a parent).
    pub fn add_viewport(&self, name: &str, parent: Option<&Arc<Viewport>>, options: ViewportOptions) -> Arc<Viewport> {
        self.find_scope(parent).add_viewport(name, options)
    }

    pub fn remove_viewport(&self, viewport: &Arc<Viewport>) {
        let scope = viewport.owning_scope();
        viewport.dispose();
        if let Some(scope) = scope {
            if scope.viewports().is_empty() {
                self.remove_scope(&scope);
            }
        }
        tracing::debug!(viewport = %viewport.name(), "Viewport removed");
    }

    pub fn get_viewport(&self, name: &str) -> Option<Arc<Viewport>> {
        self.all_viewports().into_iter().find(|v| v.name() == name)
    }

    pub fn all_viewports(&self) -> Vec<Arc<Viewport>> {
        self.root_scope.all_viewports()
    }

    pub fn scopes(&self) -> Vec<Arc<Scope>> {
        self.root_scope.all_scopes()
    }

    pub fn find_scope(&self, viewport: Option<&Arc<Viewport>>) -> Arc<Scope> {
        viewport
            .and_then(|v| v.children_scope())
            .unwrap_or_else(|| self.root_scope.clone())
    }

    /// Empty a scope. The root scope is never removed.
    pub fn remove_scope(&self, scope: &Arc<Scope>) {
        if !scope.is_root() {
            scope.clear();
        }
    }

    /// `component(parameters)` of everything shown.
    pub fn active_components(&self) -> Vec<String> {
        self.lock().active_components.clone()
    }

    // Navs

    pub fn set_nav(&self, name: &str, routes: Vec<NavRoute>) {
        self.lock().navs.insert(name.to_string(), Nav::new(name, routes));
    }

    pub fn add_nav(&self, name: &str, routes: Vec<NavRoute>) {
        self.lock()
            .navs
            .entry(name.to_string())
            .or_insert_with(|| Nav::new(name, Vec::new()))
            .add_routes(routes);
    }

    pub fn find_nav(&self, name: &str) -> Option<Nav> {
        self.lock().navs.get(name).cloned()
    }

    pub fn is_route_active(&self, route: &NavRoute) -> bool {
        route.is_active(&self.resolver, &self.active_components())
    }

    // Rounds

    async fn run_round(&self, mut instruction: NavigationInstruction) -> RouterResult<()> {
        let started = Instant::now();
        let report = {
            let mut state = self.lock();
            state.processing = Some(instruction.id);
            state.options.report_callback.clone()
        };
        if let Some(report) = report {
            report(&instruction);
        }

        let mut round = Round::default();
        let outcome = AssertUnwindSafe(self.reconcile(&mut instruction, &mut round))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(RouterError::from_panic(payload)));
        match outcome {
            Ok(true) => {
                for viewport in &round.updated {
                    viewport.finalize_content_change();
                }
                self.root_scope.clear_pending();
                instruction.entry.repeating = false;
                {
                    let mut state = self.lock();
                    state.last_navigation = Some(instruction.entry.to_storable());
                    state.processing = None;
                }
                metrics::record_navigation(Outcome::Committed, started, round.iterations);
                tracing::info!(
                    request_id = %instruction.id,
                    path = ?instruction.entry.path,
                    updated = round.updated.len(),
                    iterations = round.iterations,
                    "Navigation committed"
                );
                self.navigator.finalize(instruction).await
            }
            Ok(false) => {
                self.abort_round(&round).await;
                metrics::record_navigation(Outcome::Cancelled, started, round.iterations);
                tracing::info!(request_id = %instruction.id, "Navigation cancelled by guard");
                self.navigator.cancel(&instruction).await
            }
            Err(e) => {
                self.abort_round(&round).await;
                metrics::record_navigation(Outcome::Failed, started, round.iterations);
                tracing::error!(request_id = %instruction.id, error = %e, "Navigation failed");
                if let Err(undo) = self.navigator.undo_browser_movement(&instruction).await {
                    tracing::warn!(request_id = %instruction.id, error = %undo, "Could not restore history position");
                }
                Err(e)
            }
        }
    }

    async fn abort_round(&self, round: &Round) {
        join_all(round.touched().iter().map(|v| v.abort_content_change())).await;
        self.root_scope.clear_pending();
        let mut state = self.lock();
        state.added_viewports.clear();
        state.processing = None;
    }

    /// Stage, guard and enter until the tree settles. `Ok(false)` means a
    /// guard refused.
    async fn reconcile(&self, instruction: &mut NavigationInstruction, round: &mut Round) -> RouterResult<bool> {
        let navigation = instruction.navigation;
        let entry = &mut instruction.entry;
        let full_state = (navigation.back || navigation.forward)
            && entry.full_state_instruction.as_deref().is_some_and(|s| !s.is_empty());

        // History replays carry the query inside the instruction.
        let split = match &entry.instruction {
            Instruction::Path(path) => {
                let (path, query) = split_query(path);
                Some((path.to_string(), query.map(str::to_string)))
            }
            Instruction::Viewports(_) => None,
        };
        if let Some((path, query)) = split {
            entry.instruction = Instruction::Path(path);
            if entry.query.is_none() {
                entry.query = query;
            }
        }
        let (views, clear) = self.resolve_instruction(&entry.instruction, full_state)?;
        let mut clear = clear || full_state;

        let parsed = parse_query(entry.query.as_deref());
        entry.parameters = parsed.parameters;
        entry.parameter_list = parsed.list;

        let mut views = views;
        views.extend(self.take_added_viewports());

        let mut used: Vec<Arc<Viewport>> = if clear {
            self.all_viewports()
                .into_iter()
                .filter(|v| !v.content().is_empty())
                .collect()
        } else {
            Vec::new()
        };
        let mut done_defaults: Vec<Arc<Viewport>> = Vec::new();
        let mut default_viewports = self.pending_default_viewports(&done_defaults);
        let found = self.root_scope.find_viewports(Some(views));
        let mut viewport_instructions = found.viewport_instructions;
        let mut viewports_remaining = found.viewports_remaining;

        while !viewport_instructions.is_empty() || viewports_remaining || !default_viewports.is_empty() || clear {
            if round.iterations >= self.config.guard_limit {
                return Err(RouterError::GuardExhausted(self.config.guard_limit));
            }
            round.iterations += 1;

            for viewport in default_viewports.drain(..) {
                if !viewport_instructions.iter().any(|vi| vi.targets(&viewport)) {
                    if let Some(default) = &viewport.options().default {
                        let parsed = self.resolver.parse_viewport_instructions(default)?;
                        if let Some(mut vi) = parsed.into_iter().next() {
                            vi.viewport = Some(viewport.clone());
                            viewport_instructions.push(vi);
                        }
                    }
                }
                done_defaults.push(viewport);
            }

            let mut changed = Vec::new();
            for vi in &viewport_instructions {
                let Some(viewport) = vi.viewport.clone() else {
                    continue;
                };
                if viewport.set_next_content(vi).await {
                    push_unique(&mut changed, &viewport);
                }
                viewport.set_pending_children(vi.next_scope_instructions.clone());
                used.retain(|u| !Arc::ptr_eq(u, &viewport));
            }
            let empty = self.resolver.clear_viewport_instruction();
            for viewport in &used {
                if viewport.set_next_content(&empty).await {
                    push_unique(&mut changed, viewport);
                }
            }
            round.changed = changed.clone();

            let leaving = join_all(changed.iter().map(|v| self.guarded(v, "canLeave", v.can_leave()))).await;
            if !leaving.into_iter().collect::<RouterResult<Vec<bool>>>()?.into_iter().all(|ok| ok) {
                return Ok(false);
            }

            let entering = join_all(changed.iter().map(|v| self.enter_viewport(v))).await;
            if !entering.into_iter().collect::<RouterResult<Vec<bool>>>()?.into_iter().all(|ok| ok) {
                return Ok(false);
            }
            for viewport in &changed {
                push_unique(&mut round.updated, viewport);
            }

            let (added, unresolved): (Vec<_>, Vec<_>) = self
                .take_added_viewports()
                .into_iter()
                .partition(|vi| vi.viewport.is_some());
            if !unresolved.is_empty() {
                self.root_scope.add_pending(unresolved);
            }
            let found = self.root_scope.find_viewports(None);
            viewport_instructions = merge_added(added, found.viewport_instructions);
            viewports_remaining = found.viewports_remaining;
            default_viewports = self.pending_default_viewports(&done_defaults);
            clear = false;
        }

        let loaded = join_all(round.updated.iter().map(|v| self.guarded(v, "loadContent", v.load_content()))).await;
        loaded.into_iter().collect::<RouterResult<Vec<()>>>()?;

        self.replace_paths(entry);

        if navigation.new
            && !navigation.first
            && !navigation.replace
            && !entry.repeating
            && round.updated.iter().all(|v| v.options().no_history)
        {
            entry.untracked = true;
        }
        Ok(true)
    }

    async fn enter_viewport(&self, viewport: &Arc<Viewport>) -> RouterResult<bool> {
        match self.guarded(viewport, "canEnter", viewport.can_enter()).await? {
            GuardResult::Proceed => {
                self.guarded(viewport, "enter", viewport.enter()).await?;
                Ok(true)
            }
            GuardResult::Reject => Ok(false),
            GuardResult::AddInstructions(instructions) => {
                tracing::debug!(viewport = %viewport.name(), added = instructions.len(), "Enter guard redirected");
                for instruction in instructions {
                    self.add_processing_viewport(instruction);
                }
                viewport.abort_content_change().await;
                Ok(true)
            }
        }
    }

    /// Run a hook, bounded by `navigation.guard_timeout_ms` when set.
    async fn guarded<T, F>(&self, viewport: &Viewport, hook: &'static str, hook_future: F) -> RouterResult<T>
    where
        F: Future<Output = RouterResult<T>>,
    {
        match self.config.guard_timeout_ms {
            0 => hook_future.await,
            timeout_ms => tokio::time::timeout(Duration::from_millis(timeout_ms), hook_future)
                .await
                .map_err(|_| RouterError::GuardTimeout {
                    viewport: viewport.name().to_string(),
                    hook,
                    timeout_ms,
                })?,
        }
    }

    fn resolve_instruction(&self, instruction: &Instruction, full_state: bool) -> RouterResult<(Vec<ViewportInstruction>, bool)> {
        match instruction {
            Instruction::Viewports(instructions) => Ok((instructions.clone(), false)),
            Instruction::Path(path) => {
                let transformer = self.lock().options.transformer.clone();
                let path = match transformer.filter(|_| !full_state) {
                    Some(transformer) => match transformer.transform_from_url(path) {
                        Transformed::Path(path) => path,
                        Transformed::Instructions(list) => self.resolver.stringify_viewport_instructions(&list),
                    },
                    None => path.clone(),
                };
                let (clear, path) = self.resolver.should_clear_viewports(&path);
                Ok((self.resolver.parse_viewport_instructions(&path)?, clear))
            }
        }
    }

    fn take_added_viewports(&self) -> Vec<ViewportInstruction> {
        std::mem::take(&mut self.lock().added_viewports)
    }

    /// Empty viewports with a default that this round has not handled yet.
    fn pending_default_viewports(&self, done: &[Arc<Viewport>]) -> Vec<Arc<Viewport>> {
        self.all_viewports()
            .into_iter()
            .filter(|v| v.options().default.is_some())
            .filter(|v| v.content().is_empty())
            .filter(|v| !done.iter().any(|d| Arc::ptr_eq(d, v)))
            .collect()
    }

    /// Set the entry's path and full-state instruction from the tree.
    fn replace_paths(&self, entry: &mut NavigationEntry) {
        let viewports = self.all_viewports();
        // Children of replaced content are only released on commit.
        let stale: Vec<Arc<Viewport>> = viewports.iter().flat_map(|v| v.stale_children()).collect();
        let active_components: Vec<String> = viewports
            .iter()
            .filter(|v| !stale.iter().any(|s| Arc::ptr_eq(s, v)))
            .map(|v| v.active_content())
            .filter(|c| !c.is_empty())
            .map(|c| self.resolver.stringify_component(&c.to_instruction()))
            .collect();

        let states = self.root_scope.viewport_states(false, &stale);
        let transformer = self.lock().options.transformer.clone();
        let path = match transformer {
            Some(transformer) => match transformer.transform_to_url(states) {
                Transformed::Path(path) => path,
                Transformed::Instructions(list) => self.resolver.stringify_viewport_instructions(&list),
            },
            None => self.resolver.stringify_viewport_instructions(&states),
        };
        let full = self
            .resolver
            .stringify_viewport_instructions(&self.root_scope.viewport_states(true, &stale));
        let query = entry
            .query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default();

        entry.path = Some(format!("{path}{query}"));
        entry.full_state_instruction = Some(format!("{full}{query}"));
        self.lock().active_components = active_components;
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().expect("router mutex poisoned")
    }
}

#[async_trait]
impl NavigationHandler for Router {
    async fn process_navigation(&self, instruction: NavigationInstruction) -> RouterResult<()> {
        self.run_round(instruction).await
    }
}

/// Added instructions first; they replace remaining ones for the same
/// viewport, and a later added instruction replaces an earlier one.
fn merge_added(added: Vec<ViewportInstruction>, remaining: Vec<ViewportInstruction>) -> Vec<ViewportInstruction> {
    let mut merged: Vec<ViewportInstruction> = Vec::new();
    for vi in added {
        if let Some(viewport) = vi.viewport.clone() {
            merged.retain(|m| !m.targets(&viewport));
        }
        merged.push(vi);
    }
    for vi in remaining {
        let taken = vi
            .viewport
            .as_ref()
            .is_some_and(|viewport| merged.iter().any(|m| m.targets(viewport)));
        if !taken {
            merged.push(vi);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targeted(component: &str, viewport: &Arc<Viewport>) -> ViewportInstruction {
        ViewportInstruction::new(component).with_viewport(viewport.clone())
    }

    #[test]
    fn test_merge_added_overwrites() {
        let scope = Scope::new_root(Arc::new(ComponentRegistry::new()), ",");
        let main = scope.add_viewport("main", ViewportOptions::default());
        let side = scope.add_viewport("side", ViewportOptions::default());

        let merged = merge_added(
            vec![targeted("a", &main), targeted("b", &main)],
            vec![targeted("c", &main), targeted("d", &side)],
        );
        let components: Vec<_> = merged.iter().map(|vi| vi.component_name.clone().unwrap()).collect();
        assert_eq!(components, vec!["b", "d"]);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = RouterConfig::default();
        config.navigation.guard_limit = 0;
        config.separators.parameters = String::new();

        let store = Arc::new(crate::navigation::MemoryHistoryStore::new());
        match Router::from_config(&config, store) {
            Err(RouterError::InvalidConfig(message)) => {
                assert!(message.contains("guard_limit"));
                assert!(message.contains("must not be empty"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_target_conversions() {
        assert_eq!(NavigationTarget::from("a@main"), NavigationTarget::Path("a@main".into()));
        assert!(matches!(
            NavigationTarget::from(ViewportInstruction::new("a")),
            NavigationTarget::Instructions(list) if list.len() == 1
        ));
    }
}
