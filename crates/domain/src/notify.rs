//! Fire-and-forget notification dispatch.
//!
//! The request path hands a notification to the dispatcher and moves on;
//! delivery (email, queue worker) happens elsewhere and is never awaited.
//! Failures are the dispatcher's problem, not the caller's.

use std::sync::{Arc, Mutex};

use common::UserId;

/// The kinds of notifications the purchase flows emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Checkout committed; the enrollment confirmation goes out.
    EnrollmentConfirmed,
    /// An event ticket was issued.
    TicketIssued,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::EnrollmentConfirmed => "enrollment_confirmed",
            NotificationKind::TicketIssued => "ticket_issued",
        }
    }
}

/// One-way notification channel.
///
/// Implementations must not block the caller; anything slow gets spawned.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, kind: NotificationKind, user: UserId);
}

/// Notifier that logs the dispatch and drops it.
///
/// Stands in for the real delivery worker in local runs.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, kind: NotificationKind, user: UserId) {
        tracing::info!(kind = kind.as_str(), %user, "notification dispatched");
    }
}

/// Notifier that records every dispatch, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(NotificationKind, UserId)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every dispatched notification so far.
    pub fn sent(&self) -> Vec<(NotificationKind, UserId)> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn dispatch(&self, kind: NotificationKind, user: UserId) {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push((kind, user));
    }
}
