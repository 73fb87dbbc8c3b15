//! Toast notifications as an injected queue service.
//!
//! Components that want to show a toast hold a [`NotificationQueue`] handle
//! instead of broadcasting on a global bus. Display surfaces read
//! [`NotificationQueue::list_active`] or follow the change feed.

pub mod feed;
pub mod queue;
pub mod toast;

pub use feed::{FeedError, QueueEvent, Subscription};
pub use queue::NotificationQueue;
pub use toast::{DEFAULT_TOAST_DURATION, Toast, ToastKind, ToastRequest};
