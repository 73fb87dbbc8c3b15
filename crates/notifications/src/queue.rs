use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::Instant;

use commissionhub_core::ToastId;

use crate::feed::{QueueEvent, Subscription};
use crate::toast::{Toast, ToastKind, ToastRequest};

const DEFAULT_FEED_CAPACITY: usize = 64;

#[derive(Debug)]
struct Entry {
    toast: Toast,
    expires_at: Instant,
}

#[derive(Debug)]
struct Inner {
    active: Mutex<Vec<Entry>>,
    events: broadcast::Sender<QueueEvent>,
}

impl Inner {
    fn active(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A panic while holding the lock cannot leave the list half-updated.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: ToastId) -> bool {
        let mut active = self.active();
        let before = active.len();
        active.retain(|e| e.toast.id != id);
        active.len() != before
    }

    fn expire(&self, id: ToastId) {
        if self.remove(id) {
            tracing::debug!(toast_id = %id, "toast expired");
            let _ = self.events.send(QueueEvent::Expired { id });
        }
    }
}

/// Ordered list of active toasts with independent per-toast expiry.
///
/// Cheap to clone; clones share the same queue. Expiry timers run on the
/// ambient tokio runtime and hold only a weak reference, so dropping every
/// handle drops the queue. Outside a runtime toasts still disappear from
/// [`list_active`](Self::list_active) once their duration has elapsed.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_feed_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_feed_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                active: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    /// Append a toast and start its expiry timer.
    pub fn enqueue(&self, request: ToastRequest) -> ToastId {
        let id = ToastId::new();
        let toast = Toast::from_request(id, request, Utc::now());
        let duration = toast.duration();

        self.inner.active().push(Entry {
            toast: toast.clone(),
            expires_at: Instant::now() + duration,
        });
        tracing::debug!(toast_id = %id, kind = ?toast.kind, ?duration, "toast enqueued");
        let _ = self.inner.events.send(QueueEvent::Enqueued { toast });

        schedule_expiry(Arc::downgrade(&self.inner), id, duration);
        id
    }

    /// Shorthand for [`enqueue`](Self::enqueue) with positional arguments.
    pub fn emit(
        &self,
        kind: ToastKind,
        title: impl Into<String>,
        description: Option<String>,
        duration: Option<Duration>,
    ) -> ToastId {
        let mut request = ToastRequest::new(kind, title);
        if let Some(description) = description {
            request = request.with_description(description);
        }
        if let Some(duration) = duration {
            request = request.with_duration(duration);
        }
        self.enqueue(request)
    }

    /// Remove a toast before it expires. Returns `false` if it was not active.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let removed = self.inner.remove(id);
        if removed {
            let _ = self.inner.events.send(QueueEvent::Dismissed { id });
        }
        removed
    }

    /// Active toasts in insertion order.
    pub fn list_active(&self) -> Vec<Toast> {
        let now = Instant::now();
        self.inner
            .active()
            .iter()
            .filter(|e| e.expires_at > now)
            .map(|e| e.toast.clone())
            .collect()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.events.subscribe())
    }
}

fn schedule_expiry(inner: Weak<Inner>, id: ToastId, duration: Duration) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::debug!(toast_id = %id, "no runtime; toast will expire lazily");
        return;
    };
    handle.spawn(async move {
        tokio::time::sleep(duration).await;
        if let Some(inner) = inner.upgrade() {
            inner.expire(id);
        }
    });
}
