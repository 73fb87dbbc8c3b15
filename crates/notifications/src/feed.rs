//! Change feed of the notification queue.
//!
//! Broadcast semantics: every subscriber gets a copy of every event published
//! after it subscribed. The feed is lossy: a subscriber that falls more than
//! the channel capacity behind skips ahead and is told how many it missed.
//! The queue itself stays the source of truth (`list_active`).

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use commissionhub_core::ToastId;

use crate::toast::Toast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    Enqueued { toast: Toast },
    Dismissed { id: ToastId },
    Expired { id: ToastId },
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enqueued { .. } => "enqueued",
            Self::Dismissed { .. } => "dismissed",
            Self::Expired { .. } => "expired",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    #[error("subscriber lagged; {0} events skipped")]
    Lagged(u64),

    #[error("queue closed")]
    Closed,

    #[error("no event available")]
    Empty,
}

/// A subscription to the queue's change feed.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<QueueEvent>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<QueueEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Result<QueueEvent, FeedError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Lagged(n) => FeedError::Lagged(n),
            broadcast::error::RecvError::Closed => FeedError::Closed,
        })
    }

    /// Take an event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<QueueEvent, FeedError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Lagged(n) => FeedError::Lagged(n),
            broadcast::error::TryRecvError::Closed => FeedError::Closed,
            broadcast::error::TryRecvError::Empty => FeedError::Empty,
        })
    }

    pub fn into_inner(self) -> broadcast::Receiver<QueueEvent> {
        self.receiver
    }
}
