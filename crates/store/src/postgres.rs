use async_trait::async_trait;
use common::{CourseId, EventId, Money, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::records::{
    Article, Category, Course, Enrollment, EnrolledCourse, Event, EventTicket, SlugScope, Tag,
};
use crate::store::{NewEnrollment, Store};
use crate::{Result, StoreError};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a small default pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_course(row: PgRow) -> Result<Course> {
        Ok(Course {
            id: CourseId::from_uuid(row.try_get::<Uuid, _>("id")?),
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            is_active: row.try_get("is_active")?,
            created: row.try_get("created")?,
        })
    }

    fn row_to_event(row: PgRow) -> Result<Event> {
        Ok(Event {
            id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            venue: row.try_get("venue")?,
            is_active: row.try_get("is_active")?,
            created: row.try_get("created")?,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_course(&self, course: Course) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, title, slug, price_cents, is_active, created)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.title)
        .bind(&course.slug)
        .bind(course.price.cents())
        .bind(course.is_active)
        .bind(course.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query(
            "SELECT id, title, slug, price_cents, is_active, created FROM courses WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let row = sqlx::query(
            "SELECT id, title, slug, price_cents, is_active, created FROM courses WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn get_courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, price_cents, is_active, created
            FROM courses
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        let mut courses = rows
            .into_iter()
            .map(Self::row_to_course)
            .collect::<Result<Vec<_>>>()?;

        // Missing ids are omitted; survivors keep the input id order.
        courses.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
        Ok(courses)
    }

    async fn insert_category(&self, category: Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (id, title, slug, created) VALUES ($1, $2, $3, $4)")
            .bind(category.id)
            .bind(&category.title)
            .bind(&category.slug)
            .bind(category.created)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_tag(&self, tag: Tag) -> Result<()> {
        sqlx::query("INSERT INTO tags (id, title, slug, created) VALUES ($1, $2, $3, $4)")
            .bind(tag.id)
            .bind(&tag.title)
            .bind(&tag.slug)
            .bind(tag.created)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_article(&self, article: Article) -> Result<()> {
        sqlx::query("INSERT INTO articles (id, title, slug, created) VALUES ($1, $2, $3, $4)")
            .bind(article.id)
            .bind(&article.title)
            .bind(&article.slug)
            .bind(article.created)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_event(&self, event: Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, slug, price_cents, start_date, end_date, venue, is_active, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.slug)
        .bind(event.price.cents())
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.venue)
        .bind(event.is_active)
        .bind(event.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, price_cents, start_date, end_date, venue, is_active, created
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn slug_exists(
        &self,
        scope: SlugScope,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        // Table names come from a fixed enum, never from user input.
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
            scope.table()
        );

        let exists: bool = sqlx::query_scalar(&sql)
            .bind(slug)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn enrollment_code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM enrollments WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn is_enrolled(&self, user: UserId, course: CourseId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrolled_courses WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(user.as_uuid())
        .bind(course.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn commit_enrollment(&self, new: NewEnrollment) -> Result<Enrollment> {
        let mut tx = self.pool.begin().await?;

        let enrollment_id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            INSERT INTO enrollments (id, code, student_id, amount_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING date_enrolled
            "#,
        )
        .bind(enrollment_id)
        .bind(&new.code)
        .bind(new.student.as_uuid())
        .bind(new.amount.cents())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("enrollments_code_key")
            {
                return StoreError::DuplicateEnrollmentCode(new.code.clone());
            }
            StoreError::Database(e)
        })?;
        let date_enrolled = row.try_get("date_enrolled")?;

        for course in &new.courses {
            sqlx::query(
                r#"
                INSERT INTO enrolled_courses (enrollment_id, student_id, course_id, date_enrolled)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(enrollment_id)
            .bind(new.student.as_uuid())
            .bind(course.as_uuid())
            .bind(date_enrolled)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Enrollment {
            id: enrollment_id,
            code: new.code,
            student: Some(new.student),
            amount: new.amount,
            date_enrolled,
        })
    }

    async fn enrolled_courses(&self, user: UserId) -> Result<Vec<EnrolledCourse>> {
        let rows = sqlx::query(
            r#"
            SELECT enrollment_id, student_id, course_id, date_enrolled
            FROM enrolled_courses
            WHERE student_id = $1
            ORDER BY date_enrolled ASC
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(EnrolledCourse {
                    enrollment: row.try_get("enrollment_id")?,
                    student: UserId::from_uuid(row.try_get::<Uuid, _>("student_id")?),
                    course: CourseId::from_uuid(row.try_get::<Uuid, _>("course_id")?),
                    date_enrolled: row.try_get("date_enrolled")?,
                })
            })
            .collect()
    }

    async fn insert_ticket(&self, ticket: EventTicket) -> Result<EventTicket> {
        sqlx::query(
            r#"
            INSERT INTO event_tickets (ticket_id, user_id, event_id, amount_cents, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ticket.ticket_id)
        .bind(ticket.user.as_uuid())
        .bind(ticket.event.as_uuid())
        .bind(ticket.amount.cents())
        .bind(ticket.created)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("event_tickets_user_event_key")
            {
                return StoreError::DuplicateTicket {
                    user: ticket.user,
                    event: ticket.event,
                };
            }
            StoreError::Database(e)
        })?;

        Ok(ticket)
    }

    async fn tickets_for_user(&self, user: UserId) -> Result<Vec<EventTicket>> {
        let rows = sqlx::query(
            r#"
            SELECT ticket_id, user_id, event_id, amount_cents, created
            FROM event_tickets
            WHERE user_id = $1
            ORDER BY created ASC
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(EventTicket {
                    ticket_id: row.try_get("ticket_id")?,
                    user: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
                    event: EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
                    amount: Money::from_cents(row.try_get("amount_cents")?),
                    created: row.try_get("created")?,
                })
            })
            .collect()
    }
}
