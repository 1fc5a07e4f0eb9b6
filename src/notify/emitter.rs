use std::sync::{Mutex, PoisonError};

use event_emitter_rs::EventEmitter;

use super::{Notification, Notifier};

/// Event name notifications are published under.
pub const NOTIFICATION_EVENT: &str = "notification";

/// A notifier that emits via an EventEmitter for in-process toast listeners.
///
/// Listeners run on the emitter's own threads, so delivery is asynchronous
/// with respect to the call to `notify`.
pub struct EmitterNotifier {
    emitter: Mutex<EventEmitter>,
}

impl Default for EmitterNotifier {
    fn default() -> Self {
        Self::new(EventEmitter::new())
    }
}

impl EmitterNotifier {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterNotifier {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for every notification. Returns the listener id.
    pub fn on_notification<F>(&self, listener: F) -> String
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(NOTIFICATION_EVENT, listener)
    }
}

impl Notifier for EmitterNotifier {
    fn notify(&self, notification: Notification) {
        let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
        emitter.emit(NOTIFICATION_EVENT, notification);
    }
}
