use common::{EventId, UserId};
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user already holds a ticket for this event.
    ///
    /// Backed by the unique `(user_id, event_id)` constraint on the
    /// `event_tickets` table.
    #[error("User {user} already holds a ticket for event {event}")]
    DuplicateTicket { user: UserId, event: EventId },

    /// The enrollment code collided with an existing one at commit time.
    ///
    /// The generator probes for collisions before committing, so this only
    /// fires when another enrollment claimed the code in the window
    /// between the probe and the insert.
    #[error("Enrollment code already taken: {0}")]
    DuplicateEnrollmentCode(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
