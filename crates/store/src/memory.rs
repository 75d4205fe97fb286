use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CourseId, EventId, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::records::{
    Article, Category, Course, Enrollment, EnrolledCourse, Event, EventTicket, SlugScope, Tag,
};
use crate::store::{NewEnrollment, Store};
use crate::{Result, StoreError};

#[derive(Default)]
struct Inner {
    courses: HashMap<CourseId, Course>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    articles: Vec<Article>,
    events: HashMap<EventId, Event>,
    enrollments: Vec<Enrollment>,
    enrolled_courses: Vec<EnrolledCourse>,
    tickets: Vec<EventTicket>,
}

/// In-memory store implementation for tests and local development.
///
/// Provides the same interface as the PostgreSQL implementation. Multi-row
/// writes happen under a single write lock, so they are atomic with
/// respect to readers.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of enrollments committed so far.
    pub async fn enrollment_count(&self) -> usize {
        self.inner.read().await.enrollments.len()
    }

    /// Returns the number of tickets issued so far.
    pub async fn ticket_count(&self) -> usize {
        self.inner.read().await.tickets.len()
    }

    /// Seeds an enrollment code directly, bypassing checkout.
    pub async fn seed_enrollment_code(&self, code: &str) {
        let mut inner = self.inner.write().await;
        inner.enrollments.push(Enrollment {
            id: Uuid::new_v4(),
            code: code.to_string(),
            student: None,
            amount: common::Money::zero(),
            date_enrolled: Utc::now(),
        });
    }
}

impl Inner {
    fn slugs_in_scope(&self, scope: SlugScope) -> Vec<(Uuid, &str)> {
        match scope {
            SlugScope::Course => self
                .courses
                .values()
                .map(|c| (c.id.as_uuid(), c.slug.as_str()))
                .collect(),
            SlugScope::Category => self
                .categories
                .iter()
                .map(|c| (c.id, c.slug.as_str()))
                .collect(),
            SlugScope::Tag => self.tags.iter().map(|t| (t.id, t.slug.as_str())).collect(),
            SlugScope::Article => self
                .articles
                .iter()
                .map(|a| (a.id, a.slug.as_str()))
                .collect(),
            SlugScope::Event => self
                .events
                .values()
                .map(|e| (e.id.as_uuid(), e.slug.as_str()))
                .collect(),
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_course(&self, course: Course) -> Result<()> {
        self.inner.write().await.courses.insert(course.id, course);
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.inner.read().await.courses.get(&id).cloned())
    }

    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let inner = self.inner.read().await;
        Ok(inner.courses.values().find(|c| c.slug == slug).cloned())
    }

    async fn get_courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.courses.get(id).cloned())
            .collect())
    }

    async fn insert_category(&self, category: Category) -> Result<()> {
        self.inner.write().await.categories.push(category);
        Ok(())
    }

    async fn insert_tag(&self, tag: Tag) -> Result<()> {
        self.inner.write().await.tags.push(tag);
        Ok(())
    }

    async fn insert_article(&self, article: Article) -> Result<()> {
        self.inner.write().await.articles.push(article);
        Ok(())
    }

    async fn insert_event(&self, event: Event) -> Result<()> {
        self.inner.write().await.events.insert(event.id, event);
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn slug_exists(
        &self,
        scope: SlugScope,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .slugs_in_scope(scope)
            .iter()
            .any(|(id, s)| *s == slug && Some(*id) != exclude))
    }

    async fn enrollment_code_exists(&self, code: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.enrollments.iter().any(|e| e.code == code))
    }

    async fn is_enrolled(&self, user: UserId, course: CourseId) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .enrolled_courses
            .iter()
            .any(|ec| ec.student == user && ec.course == course))
    }

    async fn commit_enrollment(&self, new: NewEnrollment) -> Result<Enrollment> {
        let mut inner = self.inner.write().await;

        if inner.enrollments.iter().any(|e| e.code == new.code) {
            return Err(StoreError::DuplicateEnrollmentCode(new.code));
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            code: new.code,
            student: Some(new.student),
            amount: new.amount,
            date_enrolled: now,
        };

        // Single write-lock section: rows become visible together.
        inner.enrollments.push(enrollment.clone());
        for course in new.courses {
            inner.enrolled_courses.push(EnrolledCourse {
                enrollment: enrollment.id,
                student: new.student,
                course,
                date_enrolled: now,
            });
        }

        Ok(enrollment)
    }

    async fn enrolled_courses(&self, user: UserId) -> Result<Vec<EnrolledCourse>> {
        let inner = self.inner.read().await;
        Ok(inner
            .enrolled_courses
            .iter()
            .filter(|ec| ec.student == user)
            .cloned()
            .collect())
    }

    async fn insert_ticket(&self, ticket: EventTicket) -> Result<EventTicket> {
        let mut inner = self.inner.write().await;

        if inner
            .tickets
            .iter()
            .any(|t| t.user == ticket.user && t.event == ticket.event)
        {
            return Err(StoreError::DuplicateTicket {
                user: ticket.user,
                event: ticket.event,
            });
        }

        inner.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn tickets_for_user(&self, user: UserId) -> Result<Vec<EventTicket>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tickets
            .iter()
            .filter(|t| t.user == user)
            .cloned()
            .collect())
    }
}
