//! Persistent record types.
//!
//! These are the durable rows the domain layer orchestrates. The store
//! owns them once created; the checkout pipeline never mutates an
//! `Enrollment` after commit.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CourseId, EventId, Money, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course offered on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// URL-safe identifier, unique among courses.
    pub slug: String,
    pub price: Money,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

/// A course category (slugged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created: DateTime<Utc>,
}

/// A content tag (slugged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created: DateTime<Utc>,
}

/// A blog article (slugged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created: DateTime<Utc>,
}

/// A live event with a start date and a ticket price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub price: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

/// One completed checkout transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    /// Human-readable enrollment code, unique among enrollments.
    pub code: String,
    /// None once the student account has been deleted.
    pub student: Option<UserId>,
    /// Sum of the purchased course prices at commit time.
    pub amount: Money,
    pub date_enrolled: DateTime<Utc>,
}

/// Links one student to one course within one enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub enrollment: Uuid,
    pub student: UserId,
    pub course: CourseId,
    pub date_enrolled: DateTime<Utc>,
}

/// A ticket to a live event, issued per purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTicket {
    pub ticket_id: Uuid,
    pub user: UserId,
    pub event: EventId,
    pub amount: Money,
    pub created: DateTime<Utc>,
}

/// The entity families that own a slug column.
///
/// Slugs are unique within a scope, never across scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugScope {
    Course,
    Category,
    Tag,
    Article,
    Event,
}

impl SlugScope {
    /// Table backing this scope in the relational store.
    pub fn table(&self) -> &'static str {
        match self {
            SlugScope::Course => "courses",
            SlugScope::Category => "categories",
            SlugScope::Tag => "tags",
            SlugScope::Article => "articles",
            SlugScope::Event => "events",
        }
    }
}

impl std::fmt::Display for SlugScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}
