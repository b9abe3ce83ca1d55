//! History persistence boundary.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{RouterError, RouterResult};
use crate::navigation::entry::{Instruction, StoredEntry};

/// Snapshot written to the store on every committed navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub entries: Vec<StoredEntry>,
    pub entry: StoredEntry,
}

/// A history movement that originated outside the router (e.g. the user
/// pressing the browser's back button).
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserNavigation {
    pub instruction: String,
    pub state: Option<NavigationState>,
}

/// Browser-like history storage.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// State at the current position, if any has been saved.
    async fn state(&self) -> RouterResult<Option<NavigationState>>;

    async fn push_state(&self, state: NavigationState) -> RouterResult<()>;

    async fn replace_state(&self, state: NavigationState) -> RouterResult<()>;

    /// Step back and forget the state that was current.
    async fn pop_state(&self) -> RouterResult<()>;

    /// Move the position. Unless `suppress_event` is set, subscribers are
    /// told about the movement.
    async fn go(&self, movement: isize, suppress_event: bool) -> RouterResult<()>;

    /// Receive externally triggered movements. Stores without such events
    /// return `None`.
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<BrowserNavigation>> {
        None
    }
}

#[derive(Default, Serialize, Deserialize)]
struct StoreInner {
    states: Vec<NavigationState>,
    position: usize,
    #[serde(skip)]
    listener: Option<mpsc::UnboundedSender<BrowserNavigation>>,
}

/// In-memory history stack with a cursor, optionally persisted as JSON.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<StoreInner>,
    persistence_path: Option<PathBuf>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from file if it exists. `save_to_file` writes back to `path`.
    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let mut inner = StoreInner::default();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            inner = serde_json::from_reader(reader)?;
            if inner.position >= inner.states.len() {
                inner.position = inner.states.len().saturating_sub(1);
            }
            tracing::info!(states = inner.states.len(), "Loaded history from file");
        }
        Ok(Self {
            inner: Mutex::new(inner),
            persistence_path: Some(path.to_path_buf()),
        })
    }

    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let writer = BufWriter::new(File::create(path)?);
            let inner = self.lock();
            serde_json::to_writer(writer, &*inner)?;
            tracing::info!(states = inner.states.len(), "Saved history to file");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> usize {
        self.lock().position
    }

    pub fn states(&self) -> Vec<NavigationState> {
        self.lock().states.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("history store mutex poisoned")
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn state(&self) -> RouterResult<Option<NavigationState>> {
        let inner = self.lock();
        Ok(inner.states.get(inner.position).cloned())
    }

    async fn push_state(&self, state: NavigationState) -> RouterResult<()> {
        let mut inner = self.lock();
        if !inner.states.is_empty() {
            let keep = inner.position + 1;
            inner.states.truncate(keep);
        }
        inner.states.push(state);
        inner.position = inner.states.len() - 1;
        Ok(())
    }

    async fn replace_state(&self, state: NavigationState) -> RouterResult<()> {
        let mut inner = self.lock();
        let position = inner.position;
        match inner.states.get_mut(position) {
            Some(slot) => *slot = state,
            None => {
                inner.states.push(state);
                inner.position = inner.states.len() - 1;
            }
        }
        Ok(())
    }

    async fn pop_state(&self) -> RouterResult<()> {
        let mut inner = self.lock();
        let position = inner.position;
        inner.states.truncate(position);
        inner.position = position.saturating_sub(1);
        Ok(())
    }

    async fn go(&self, movement: isize, suppress_event: bool) -> RouterResult<()> {
        let mut inner = self.lock();
        let target = inner.position as isize + movement;
        if target < 0 || target >= inner.states.len() as isize {
            return Err(RouterError::Store(format!(
                "cannot move {movement} from position {} of {}",
                inner.position,
                inner.states.len()
            )));
        }
        inner.position = target as usize;

        if !suppress_event {
            let state = inner.states[inner.position].clone();
            let instruction = match (&state.entry.path, &state.entry.instruction) {
                (Some(path), _) => path.clone(),
                (None, Instruction::Path(path)) => path.clone(),
                (None, Instruction::Viewports(_)) => String::new(),
            };
            if let Some(listener) = &inner.listener {
                if listener
                    .send(BrowserNavigation {
                        instruction,
                        state: Some(state),
                    })
                    .is_err()
                {
                    tracing::debug!("History listener is gone");
                }
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<BrowserNavigation>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().listener = Some(tx);
        Some(rx)
    }
}
