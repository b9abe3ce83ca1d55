//! Serialized navigation history.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::{RouterError, RouterResult};
use crate::navigation::entry::{
    Instruction, NavigationEntry, NavigationFlags, NavigationInstruction, StoredEntry,
};
use crate::navigation::store::{HistoryStore, NavigationState};
use crate::queue::{Completion, QueueItem, SerialQueue};

/// Receives classified navigations, one at a time. Every call must end in
/// `Navigator::finalize`, `Navigator::cancel` or an error.
#[async_trait]
pub trait NavigationHandler: Send + Sync {
    async fn process_navigation(&self, instruction: NavigationInstruction) -> RouterResult<()>;
}

#[derive(Default)]
struct NavigatorState {
    handler: Option<Weak<dyn NavigationHandler>>,
    current: Option<NavigationEntry>,
    entries: Vec<StoredEntry>,
}

impl NavigatorState {
    /// Write the current entry into the list and build the store snapshot.
    fn snapshot(&mut self) -> NavigationState {
        let entry = self
            .current
            .as_ref()
            .map(NavigationEntry::to_storable)
            .unwrap_or_default();
        let index = entry.index.unwrap_or(0);
        if index < self.entries.len() {
            self.entries[index] = entry.clone();
        } else {
            self.entries.push(entry.clone());
        }
        NavigationState {
            entries: self.entries.clone(),
            entry,
        }
    }
}

/// Owns the entry list and the serial queue of pending navigations.
pub struct Navigator {
    state: Mutex<NavigatorState>,
    queue: SerialQueue<NavigationEntry>,
    store: Arc<dyn HistoryStore>,
}

impl Navigator {
    pub fn new(store: Arc<dyn HistoryStore>) -> Arc<Self> {
        Arc::new_cyclic(|navigator: &Weak<Navigator>| {
            let navigator = navigator.clone();
            let queue = SerialQueue::new(Arc::new(
                move |item: QueueItem<NavigationEntry>| -> BoxFuture<'static, RouterResult<()>> {
                    let navigator = navigator.clone();
                    async move {
                        match navigator.upgrade() {
                            Some(navigator) => navigator.process_navigations(item).await,
                            None => Err(RouterError::NotActivated("navigator")),
                        }
                    }
                    .boxed()
                },
            ));
            Self {
                state: Mutex::new(NavigatorState::default()),
                queue,
                store,
            }
        })
    }

    pub fn activate(&self, handler: Weak<dyn NavigationHandler>) -> RouterResult<()> {
        let mut state = self.lock();
        if state.handler.is_some() {
            return Err(RouterError::AlreadyActivated("navigator"));
        }
        state.handler = Some(handler);
        Ok(())
    }

    /// Stop accepting work. Waiting navigations are dropped.
    pub fn deactivate(&self) -> RouterResult<()> {
        {
            let mut state = self.lock();
            if state.handler.is_none() {
                return Err(RouterError::NotActivated("navigator"));
            }
            state.handler = None;
        }
        self.queue.clear();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lock().handler.is_some()
    }

    /// Queue a navigation. The completion settles once the round for this
    /// entry has been committed, cancelled or has failed.
    pub fn navigate(&self, entry: NavigationEntry) -> Completion {
        self.queue.enqueue(entry)
    }

    /// Replay the current entry.
    pub fn refresh(&self) -> Completion {
        let current = self.lock().current.clone();
        match current {
            Some(current) => {
                let mut entry: NavigationEntry = current.to_storable().into();
                entry.replacing = true;
                entry.refreshing = true;
                self.navigate(entry)
            }
            None => Completion::failed(RouterError::NoCurrentEntry),
        }
    }

    /// Navigate `movement` steps through the recorded entries.
    pub fn go(&self, movement: isize) -> Completion {
        let target = {
            let state = self.lock();
            let from = state.current.as_ref().and_then(|c| c.index).unwrap_or(0);
            let len = state.entries.len();
            let index = from as isize + movement;
            if index < 0 || index >= len as isize {
                return Completion::failed(RouterError::HistoryOutOfRange {
                    from,
                    movement,
                    len,
                });
            }
            state.entries[index as usize].clone()
        };
        self.navigate(target.into())
    }

    /// Number of navigations waiting behind the one in progress.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn current_entry(&self) -> Option<NavigationEntry> {
        self.lock().current.clone()
    }

    pub fn entries(&self) -> Vec<StoredEntry> {
        self.lock().entries.clone()
    }

    /// Titles from the first entry up to and including the current one.
    pub fn titles(&self) -> Vec<String> {
        let state = self.lock();
        let end = state
            .current
            .as_ref()
            .and_then(|c| c.index)
            .map(|i| i + 1)
            .unwrap_or(0)
            .min(state.entries.len());
        state.entries[..end]
            .iter()
            .map(|e| e.title.clone().unwrap_or_default())
            .collect()
    }

    pub async fn set_entry_title(&self, title: impl Into<String>) -> RouterResult<()> {
        let snapshot = {
            let mut state = self.lock();
            match state.current.as_mut() {
                Some(current) => current.title = Some(title.into()),
                None => return Err(RouterError::NoCurrentEntry),
            }
            state.snapshot()
        };
        self.store.replace_state(snapshot).await
    }

    /// Commit the instruction's entry as current and resolve its completion.
    pub async fn finalize(&self, instruction: NavigationInstruction) -> RouterResult<()> {
        let NavigationInstruction { id, mut entry, .. } = instruction;

        if entry.untracked && entry.from_browser {
            self.store.pop_state().await?;
        }
        // Keep the store cursor on the entry being shown.
        if entry.history_movement != 0 && !entry.from_browser {
            self.store.go(entry.history_movement, true).await?;
        }

        let (snapshot, push) = {
            let mut state = self.lock();
            let index = entry.index.unwrap_or(0);
            let push = if entry.untracked {
                entry.index = Some(index.saturating_sub(1));
                false
            } else if entry.replacing {
                false
            } else {
                state.entries.truncate(index);
                true
            };
            tracing::debug!(
                request_id = %id,
                index = ?entry.index,
                path = ?entry.path,
                untracked = entry.untracked,
                "Committing navigation entry"
            );
            state.current = Some(entry);
            (state.snapshot(), push)
        };

        if push {
            self.store.push_state(snapshot).await?;
        } else {
            self.store.replace_state(snapshot).await?;
        }
        self.queue.complete(id, Ok(()));
        Ok(())
    }

    /// Drop the instruction's entry, undoing any browser movement, and resolve
    /// its completion.
    pub async fn cancel(&self, instruction: &NavigationInstruction) -> RouterResult<()> {
        self.undo_browser_movement(instruction).await?;
        tracing::debug!(request_id = %instruction.id, "Navigation cancelled");
        self.queue.complete(instruction.id, Ok(()));
        Ok(())
    }

    /// Put the store back where it was before a browser-originated
    /// instruction moved it. The completion is left alone.
    pub async fn undo_browser_movement(&self, instruction: &NavigationInstruction) -> RouterResult<()> {
        if !instruction.entry.from_browser {
            return Ok(());
        }
        if instruction.navigation.new {
            self.store.pop_state().await?;
        } else if instruction.entry.history_movement != 0 {
            self.store
                .go(-instruction.entry.history_movement, true)
                .await?;
        }
        Ok(())
    }

    async fn process_navigations(&self, item: QueueItem<NavigationEntry>) -> RouterResult<()> {
        let QueueItem { id, value: mut entry } = item;

        let (handler, needs_state) = {
            let state = self.lock();
            let handler = state
                .handler
                .as_ref()
                .and_then(Weak::upgrade)
                .ok_or(RouterError::NotActivated("navigator"))?;
            (handler, state.current.is_none())
        };
        let persisted = if needs_state {
            self.store.state().await?
        } else {
            None
        };

        let instruction = {
            let mut state = self.lock();
            let mut navigation = NavigationFlags::default();

            if state.current.is_none() {
                match persisted {
                    Some(saved) => {
                        state.entries = saved.entries;
                        state.current = Some(saved.entry.into());
                        navigation.refresh = true;
                    }
                    None => {
                        state.entries = Vec::new();
                        state.current = Some(NavigationEntry {
                            index: Some(0),
                            ..Default::default()
                        });
                        navigation.first = true;
                        navigation.new = true;
                        entry.first_entry = true;
                    }
                }
            }

            let current_index = state.current.as_ref().and_then(|c| c.index).unwrap_or(0);
            match entry.index {
                Some(index) if !entry.replacing && !entry.refreshing => {
                    entry.history_movement = index as isize - current_index as isize;
                    if let Some(full) = &entry.full_state_instruction {
                        entry.instruction = Instruction::Path(full.clone());
                    }
                    entry.replacing = true;
                    if entry.history_movement > 0 {
                        navigation.forward = true;
                    } else if entry.history_movement < 0 {
                        navigation.back = true;
                    }
                }
                _ if entry.refreshing => {
                    navigation.refresh = true;
                }
                _ => {
                    navigation.new = true;
                    navigation.replace = entry.replacing;
                    entry.index = if entry.replacing {
                        entry.index.or(Some(current_index))
                    } else if state.entries.is_empty() {
                        Some(0)
                    } else {
                        // Branch off the current entry.
                        Some(current_index + 1)
                    };
                }
            }

            NavigationInstruction {
                id,
                previous: state.current.as_ref().map(NavigationEntry::to_storable),
                entry,
                navigation,
            }
        };

        tracing::debug!(
            request_id = %id,
            instruction = ?instruction.entry.instruction,
            navigation = ?instruction.navigation,
            "Dispatching navigation"
        );
        handler.process_navigation(instruction).await
    }

    fn lock(&self) -> MutexGuard<'_, NavigatorState> {
        self.state.lock().expect("navigator mutex poisoned")
    }
}
