//! Notification capability handed to the coordinator.

use std::sync::{Mutex, PoisonError};

/// Short, transient user notices (toasts in a GUI, log lines in the CLI).
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
    fn notify_info(&self, message: &str);
}

/// Writes notices to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!(target: "dish_go::notice", "{message}");
    }

    fn notify_info(&self, message: &str) {
        tracing::info!(target: "dish_go::notice", "{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

/// Keeps every notice in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.push(Notice::Error(message.to_string()));
    }

    fn notify_info(&self, message: &str) {
        self.push(Notice::Info(message.to_string()));
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify_error(&self, message: &str) {
        (**self).notify_error(message);
    }

    fn notify_info(&self, message: &str) {
        (**self).notify_info(message);
    }
}
