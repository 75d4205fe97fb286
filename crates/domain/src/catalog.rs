//! Creation and lookup of slugged catalog entities.

use chrono::{NaiveDate, Utc};
use common::{CourseId, EventId, Money};
use store::{Article, Category, Course, Event, SlugScope, Store, Tag};
use uuid::Uuid;

use crate::error::DomainError;
use crate::idgen::unique_slug;

/// Service for managing the course and event catalog.
///
/// Every `create_*` derives a unique slug from the title at creation time,
/// so two entities titled "Test Course" end up as `test-course` and
/// `test-course-<number>`.
pub struct CatalogService<S> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_course(&self, title: &str, price: Money) -> Result<Course, DomainError> {
        let slug = unique_slug(&self.store, SlugScope::Course, title, None).await?;
        let course = Course {
            id: CourseId::new(),
            title: title.to_string(),
            slug,
            price,
            is_active: true,
            created: Utc::now(),
        };
        self.store.insert_course(course.clone()).await?;
        Ok(course)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, title: &str) -> Result<Category, DomainError> {
        let slug = unique_slug(&self.store, SlugScope::Category, title, None).await?;
        let category = Category {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug,
            created: Utc::now(),
        };
        self.store.insert_category(category.clone()).await?;
        Ok(category)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_tag(&self, title: &str) -> Result<Tag, DomainError> {
        let slug = unique_slug(&self.store, SlugScope::Tag, title, None).await?;
        let tag = Tag {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug,
            created: Utc::now(),
        };
        self.store.insert_tag(tag.clone()).await?;
        Ok(tag)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_article(&self, title: &str) -> Result<Article, DomainError> {
        let slug = unique_slug(&self.store, SlugScope::Article, title, None).await?;
        let article = Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug,
            created: Utc::now(),
        };
        self.store.insert_article(article.clone()).await?;
        Ok(article)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_event(
        &self,
        title: &str,
        price: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
        venue: &str,
    ) -> Result<Event, DomainError> {
        let slug = unique_slug(&self.store, SlugScope::Event, title, None).await?;
        let event = Event {
            id: EventId::new(),
            title: title.to_string(),
            slug,
            price,
            start_date,
            end_date,
            venue: venue.to_string(),
            is_active: true,
            created: Utc::now(),
        };
        self.store.insert_event(event.clone()).await?;
        Ok(event)
    }

    /// Looks up a course by id.
    pub async fn get_course(&self, id: CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.store.get_course(id).await?)
    }

    /// Looks up a course by slug.
    pub async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        Ok(self.store.get_course_by_slug(slug).await?)
    }

    /// Looks up a live event by id.
    pub async fn get_event(&self, id: EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.store.get_event(id).await?)
    }
}
