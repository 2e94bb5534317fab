//! Notification sink contract.
//!
//! The access layer never renders anything itself; it hands human-readable
//! success/failure text to whatever sink the application registered.

use std::sync::{Mutex, PoisonError};

use aula_core::ApiError;

pub trait NotificationSink: Send + Sync {
    /// A mutation or session operation succeeded.
    fn success(&self, message: &str);

    /// An operation failed. `override_message`, when present, replaces the
    /// error's own display text (used e.g. to avoid revealing which
    /// credential field was wrong).
    fn error(&self, error: Option<&ApiError>, override_message: Option<&str>);
}

/// Text that should reach the user for a failure.
pub fn error_text(error: Option<&ApiError>, override_message: Option<&str>) -> String {
    match (override_message, error) {
        (Some(message), _) => message.to_string(),
        (None, Some(error)) => error.to_string(),
        (None, None) => String::new(),
    }
}

/// Sink that forwards notifications to `tracing` (headless default).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, error: Option<&ApiError>, override_message: Option<&str>) {
        tracing::error!("{}", error_text(error, override_message));
    }
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Sink that records notifications in memory.
///
/// The UI-less counterpart used by the integration tests and by embedders
/// that want to assert on user-facing text.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn successes(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Success(text) => Some(text.clone()),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(text) => Some(text.clone()),
                Notification::Success(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for RecordingSink {
    fn success(&self, message: &str) {
        self.lock().push(Notification::Success(message.to_string()));
    }

    fn error(&self, error: Option<&ApiError>, override_message: Option<&str>) {
        self.lock()
            .push(Notification::Error(error_text(error, override_message)));
    }
}
