//! FIFO queue processing one item at a time.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::error::{RouterError, RouterResult};
use crate::observability::metrics;
use crate::queue::completion::{Completion, RequestId};

/// An enqueued value together with the ID of its completion.
#[derive(Debug, Clone)]
pub struct QueueItem<T> {
    pub id: RequestId,
    pub value: T,
}

/// Callback invoked for every dequeued item.
pub type Processor<T> =
    Arc<dyn Fn(QueueItem<T>) -> BoxFuture<'static, RouterResult<()>> + Send + Sync>;

struct QueueState<T> {
    items: VecDeque<QueueItem<T>>,
    processing: bool,
}

struct Inner<T> {
    state: Mutex<QueueState<T>>,
    completions: DashMap<RequestId, oneshot::Sender<RouterResult<()>>>,
    processor: Processor<T>,
}

/// Queue guaranteeing that the processor for an item never starts before the
/// processor of the previous item has returned.
///
/// Requires a Tokio runtime: draining runs on a spawned task.
pub struct SerialQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SerialQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> SerialQueue<T> {
    pub fn new(processor: Processor<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    items: VecDeque::new(),
                    processing: false,
                }),
                completions: DashMap::new(),
                processor,
            }),
        }
    }

    /// Append `value` and start draining if idle.
    pub fn enqueue(&self, value: T) -> Completion {
        let id = RequestId::new();
        let (tx, rx) = oneshot::channel();
        self.inner.completions.insert(id, tx);

        let (start, depth) = {
            let mut state = self.inner.state.lock().expect("queue mutex poisoned");
            state.items.push_back(QueueItem { id, value });
            let start = !state.processing;
            state.processing = true;
            (start, state.items.len())
        };
        metrics::record_queue_depth(depth);

        if start {
            let inner = self.inner.clone();
            tokio::spawn(async move {
                inner.drain().await;
            });
        }
        Completion::new(id, rx)
    }

    /// Number of items waiting (not counting the one being processed).
    pub fn len(&self) -> usize {
        self.inner.state.lock().expect("queue mutex poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while an item is being processed or waiting.
    pub fn is_processing(&self) -> bool {
        self.inner.state.lock().expect("queue mutex poisoned").processing
    }

    /// Drop every waiting item. Their completions resolve to
    /// `RouterError::Dropped`.
    pub fn clear(&self) -> usize {
        let dropped: Vec<QueueItem<T>> = {
            let mut state = self.inner.state.lock().expect("queue mutex poisoned");
            state.items.drain(..).collect()
        };
        for item in &dropped {
            self.inner.completions.remove(&item.id);
        }
        metrics::record_queue_depth(0);
        if !dropped.is_empty() {
            tracing::debug!(dropped = dropped.len(), "Cleared pending queue items");
        }
        dropped.len()
    }

    /// Settle the completion of `id`. Returns `false` if it was already
    /// settled or dropped.
    pub fn complete(&self, id: RequestId, result: RouterResult<()>) -> bool {
        self.inner.complete(id, result)
    }
}

impl<T: Send + 'static> Inner<T> {
    fn complete(&self, id: RequestId, result: RouterResult<()>) -> bool {
        match self.completions.remove(&id) {
            Some((_, tx)) => {
                // The caller may have stopped waiting.
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let item = {
                let mut state = self.state.lock().expect("queue mutex poisoned");
                match state.items.pop_front() {
                    Some(item) => item,
                    None => {
                        state.processing = false;
                        return;
                    }
                }
            };
            let id = item.id;

            let processor = self.processor.clone();
            let outcome = AssertUnwindSafe(async move { processor(item).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(RouterError::from_panic(payload)));
            match outcome {
                Ok(()) => {
                    self.complete(id, Ok(()));
                }
                Err(e) => {
                    tracing::error!(request_id = %id, error = %e, "Queued request failed");
                    self.complete(id, Err(e));
                }
            }
        }
    }
}
