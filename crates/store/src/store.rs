use async_trait::async_trait;
use common::{CourseId, EventId, Money, UserId};
use uuid::Uuid;

use crate::records::{
    Article, Category, Course, Enrollment, EnrolledCourse, Event, EventTicket, SlugScope, Tag,
};
use crate::Result;

/// Input for an enrollment commit.
///
/// The checkout pipeline builds this after reconciliation; the store turns
/// it into one `Enrollment` row plus one `EnrolledCourse` row per course,
/// atomically.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    /// Pre-generated unique enrollment code.
    pub code: String,
    pub student: UserId,
    /// Cart total at commit time.
    pub amount: Money,
    pub courses: Vec<CourseId>,
}

/// Core trait for persistence backends.
///
/// All implementations must be thread-safe (Send + Sync). Write methods
/// that create multiple rows are atomic: either every row is created or
/// none are.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Catalog --

    /// Inserts a course. The slug must already be unique.
    async fn insert_course(&self, course: Course) -> Result<()>;

    /// Looks up a course by id.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// Looks up a course by slug.
    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>>;

    /// Resolves a batch of course ids.
    ///
    /// Missing ids are silently omitted; the returned courses preserve the
    /// order of the input ids.
    async fn get_courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>>;

    async fn insert_category(&self, category: Category) -> Result<()>;

    async fn insert_tag(&self, tag: Tag) -> Result<()>;

    async fn insert_article(&self, article: Article) -> Result<()>;

    async fn insert_event(&self, event: Event) -> Result<()>;

    /// Looks up a live event by id.
    async fn get_event(&self, id: EventId) -> Result<Option<Event>>;

    // -- Uniqueness probes (read-only) --

    /// Returns true if `slug` is already taken within `scope`, excluding
    /// the record identified by `exclude` (the record being re-saved).
    async fn slug_exists(&self, scope: SlugScope, slug: &str, exclude: Option<Uuid>)
        -> Result<bool>;

    /// Returns true if an enrollment already uses `code`.
    async fn enrollment_code_exists(&self, code: &str) -> Result<bool>;

    // -- Enrollment --

    /// Returns true if the user holds an `EnrolledCourse` for the course.
    async fn is_enrolled(&self, user: UserId, course: CourseId) -> Result<bool>;

    /// Creates the enrollment and its per-course rows in one atomic unit.
    async fn commit_enrollment(&self, new: NewEnrollment) -> Result<Enrollment>;

    /// Returns every course enrollment held by the user.
    async fn enrolled_courses(&self, user: UserId) -> Result<Vec<EnrolledCourse>>;

    // -- Tickets --

    /// Creates an event ticket.
    ///
    /// Fails with [`StoreError::DuplicateTicket`](crate::StoreError) if the
    /// user already holds a ticket for the event.
    async fn insert_ticket(&self, ticket: EventTicket) -> Result<EventTicket>;

    /// Returns every ticket held by the user.
    async fn tickets_for_user(&self, user: UserId) -> Result<Vec<EventTicket>>;
}
