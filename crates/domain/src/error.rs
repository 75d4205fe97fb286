//! Domain error types.

use common::{CourseId, EventId};
use store::StoreError;
use thiserror::Error;

use crate::idgen::IdError;

/// Errors that can occur during domain operations.
///
/// Recoverable conditions (already enrolled, duplicate ticket, empty cart)
/// are not errors; they are outcome variants carrying a user notice. These
/// variants cover the cases where the request cannot proceed at all.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the persistence layer.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identifier generation failed.
    #[error("Identifier generation error: {0}")]
    Id(#[from] IdError),

    /// The requested course does not exist.
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    /// The requested event does not exist.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),
}
