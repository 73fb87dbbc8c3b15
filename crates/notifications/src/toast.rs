use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commissionhub_core::ToastId;

/// How long a toast stays up unless the caller says otherwise.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// What a caller asks to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastRequest {
    #[serde(default, rename = "type")]
    pub kind: ToastKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Milliseconds; defaults to [`DEFAULT_TOAST_DURATION`].
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            duration_ms: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TOAST_DURATION)
    }
}

/// An active toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub(crate) fn from_request(id: ToastId, request: ToastRequest, now: DateTime<Utc>) -> Self {
        let duration_ms = request
            .duration()
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX);
        Self {
            id,
            kind: request.kind,
            title: request.title,
            description: request.description,
            duration_ms,
            created_at: now,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
