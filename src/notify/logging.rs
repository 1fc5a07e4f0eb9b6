use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::{Notification, NotificationKind, Notifier};

/// A notifier that logs through `tracing`, optionally recording into a buffer.
#[derive(Clone, Default)]
pub struct LogNotifier {
    buffer: Option<Arc<Mutex<Vec<Notification>>>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<Notification>>>) -> Self {
        LogNotifier {
            buffer: Some(buffer),
        }
    }

    /// Snapshot of the recorded notifications. Empty without a buffer.
    pub fn recorded(&self) -> Vec<Notification> {
        self.buffer
            .as_ref()
            .and_then(|buffer| buffer.lock().ok().map(|b| b.clone()))
            .unwrap_or_default()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!(message = %notification.message, "notify"),
            NotificationKind::Error => warn!(message = %notification.message, "notify"),
        }
        if let Some(buffer) = &self.buffer {
            // A poisoned buffer loses the entry; the log line above still went out.
            if let Ok(mut buffer) = buffer.lock() {
                buffer.push(notification);
            }
        }
    }
}
