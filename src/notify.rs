//! Toast notifications — fire-and-forget user-facing messages.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use crate::frame::ServerFrame;

/// How long a success toast for a completed draw stays up.
pub const RESULT_TOAST_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Success, message: message.into(), duration_ms: None }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, message: message.into(), duration_ms: None }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Sink for toasts. Delivery is best effort; callers never wait on it.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

impl Notifier for mpsc::Sender<ServerFrame> {
    fn notify(&self, toast: Toast) {
        if let Err(e) = self.try_send(ServerFrame::Toast(toast)) {
            warn!(error = %e, "notify: toast dropped");
        }
    }
}
