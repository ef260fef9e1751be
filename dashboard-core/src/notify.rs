use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub posted_at: Instant,
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    items: VecDeque<Notification>,
}

/// Transient user feedback. Posting never blocks; messages retire on
/// their own once the display duration has elapsed.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    display_for: Duration,
    queue: Arc<Mutex<Queue>>,
}

impl NotificationCenter {
    pub fn new(display_for: Duration) -> Self {
        Self { display_for, queue: Arc::new(Mutex::new(Queue::default())) }
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        match severity {
            Severity::Error => error!(%severity, "{message}"),
            Severity::Warning => warn!(%severity, "{message}"),
            Severity::Success | Severity::Info => info!(%severity, "{message}"),
        }

        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let id = queue.next_id;
        queue.next_id += 1;
        queue.items.push_back(Notification { id, message, severity, posted_at: Instant::now() });
        id
    }

    /// Messages still on display, oldest first. Retired ones are dropped.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.items.retain(|n| now.duration_since(n.posted_at) < self.display_for);
        queue.items.iter().cloned().collect()
    }

    /// Remove and return everything posted so far, retired or not.
    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.items.drain(..).collect()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_NOTIFICATION_DISPLAY_MS))
    }
}
