//! Completion handles for queued work.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{RouterError, RouterResult};

/// Identifier of one queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Future resolved when a queued request settles.
///
/// Resolves to `Err(RouterError::Dropped)` if the request was discarded
/// without being settled.
#[derive(Debug)]
pub struct Completion {
    id: RequestId,
    rx: oneshot::Receiver<RouterResult<()>>,
}

impl Completion {
    pub(crate) fn new(id: RequestId, rx: oneshot::Receiver<RouterResult<()>>) -> Self {
        Self { id, rx }
    }

    /// A completion that is already settled with `err`.
    pub fn failed(err: RouterError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self::new(RequestId::new(), rx)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Future for Completion {
    type Output = RouterResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(RouterError::Dropped)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_completion() {
        let completion = Completion::failed(RouterError::NoCurrentEntry);
        assert!(matches!(completion.await, Err(RouterError::NoCurrentEntry)));
    }

    #[tokio::test]
    async fn test_dropped_sender() {
        let (tx, rx) = oneshot::channel();
        let completion = Completion::new(RequestId::new(), rx);
        drop(tx);
        assert!(matches!(completion.await, Err(RouterError::Dropped)));
    }
}
