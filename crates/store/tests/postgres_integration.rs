//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency; each test
//! truncates the tables, so they are marked serial.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use common::{CourseId, EventId, Money, UserId};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    Course, Event, EventTicket, NewEnrollment, PostgresStore, SlugScope, Store, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_core_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query(
        "TRUNCATE TABLE enrolled_courses, event_tickets, enrollments, \
         courses, categories, tags, articles, events CASCADE",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

fn make_course(title: &str, slug: &str, price_cents: i64) -> Course {
    Course {
        id: CourseId::new(),
        title: title.to_string(),
        slug: slug.to_string(),
        price: Money::from_cents(price_cents),
        is_active: true,
        created: Utc::now(),
    }
}

fn make_event(title: &str, slug: &str, start: NaiveDate) -> Event {
    Event {
        id: EventId::new(),
        title: title.to_string(),
        slug: slug.to_string(),
        price: Money::from_cents(5000),
        start_date: start,
        end_date: start,
        venue: "Nairobi".to_string(),
        is_active: true,
        created: Utc::now(),
    }
}

#[tokio::test]
#[serial]
async fn insert_and_get_course() {
    let store = get_test_store().await;
    let course = make_course("Intro to Rust", "intro-to-rust", 15000);

    store.insert_course(course.clone()).await.unwrap();

    let by_id = store.get_course(course.id).await.unwrap().unwrap();
    assert_eq!(by_id.title, "Intro to Rust");
    assert_eq!(by_id.price, Money::from_cents(15000));

    let by_slug = store
        .get_course_by_slug("intro-to-rust")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_slug.id, course.id);

    assert!(store.get_course(CourseId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn batch_lookup_preserves_input_order_and_omits_missing() {
    let store = get_test_store().await;
    let a = make_course("Course A", "course-a", 100);
    let b = make_course("Course B", "course-b", 200);
    store.insert_course(a.clone()).await.unwrap();
    store.insert_course(b.clone()).await.unwrap();

    let missing = CourseId::new();
    let courses = store
        .get_courses_by_ids(&[b.id, missing, a.id])
        .await
        .unwrap();

    let ids: Vec<_> = courses.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
#[serial]
async fn slug_exists_is_scoped_and_respects_exclusion() {
    let store = get_test_store().await;
    let course = make_course("Test Course", "test-course", 100);
    store.insert_course(course.clone()).await.unwrap();

    assert!(
        store
            .slug_exists(SlugScope::Course, "test-course", None)
            .await
            .unwrap()
    );
    // Same slug in a different scope is free
    assert!(
        !store
            .slug_exists(SlugScope::Event, "test-course", None)
            .await
            .unwrap()
    );
    // Re-saving the same record does not collide with itself
    assert!(
        !store
            .slug_exists(SlugScope::Course, "test-course", Some(course.id.into()))
            .await
            .unwrap()
    );
}

#[tokio::test]
#[serial]
async fn commit_enrollment_creates_all_rows() {
    let store = get_test_store().await;
    let a = make_course("Course A", "course-a", 15000);
    let b = make_course("Course B", "course-b", 10000);
    store.insert_course(a.clone()).await.unwrap();
    store.insert_course(b.clone()).await.unwrap();
    let user = UserId::new();

    let enrollment = store
        .commit_enrollment(NewEnrollment {
            code: "A1B2C".to_string(),
            student: user,
            amount: Money::from_cents(25000),
            courses: vec![a.id, b.id],
        })
        .await
        .unwrap();

    assert_eq!(enrollment.code, "A1B2C");
    assert_eq!(enrollment.amount, Money::from_cents(25000));
    assert!(store.enrollment_code_exists("A1B2C").await.unwrap());
    assert!(store.is_enrolled(user, a.id).await.unwrap());
    assert!(store.is_enrolled(user, b.id).await.unwrap());

    let enrolled = store.enrolled_courses(user).await.unwrap();
    assert_eq!(enrolled.len(), 2);
}

#[tokio::test]
#[serial]
async fn commit_enrollment_rolls_back_on_failure() {
    let store = get_test_store().await;
    let a = make_course("Course A", "course-a", 15000);
    store.insert_course(a.clone()).await.unwrap();
    let user = UserId::new();

    // The second course id violates the foreign key, so the whole commit
    // must roll back.
    let result = store
        .commit_enrollment(NewEnrollment {
            code: "ZZ999".to_string(),
            student: user,
            amount: Money::from_cents(15000),
            courses: vec![a.id, CourseId::new()],
        })
        .await;
    assert!(result.is_err());

    assert!(!store.enrollment_code_exists("ZZ999").await.unwrap());
    assert!(!store.is_enrolled(user, a.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn duplicate_enrollment_code_is_a_typed_conflict() {
    let store = get_test_store().await;
    let a = make_course("Course A", "course-a", 100);
    store.insert_course(a.clone()).await.unwrap();

    let new = |user: UserId| NewEnrollment {
        code: "AAAAA".to_string(),
        student: user,
        amount: Money::from_cents(100),
        courses: vec![a.id],
    };

    store.commit_enrollment(new(UserId::new())).await.unwrap();
    let result = store.commit_enrollment(new(UserId::new())).await;

    assert!(matches!(
        result,
        Err(StoreError::DuplicateEnrollmentCode(code)) if code == "AAAAA"
    ));
}

#[tokio::test]
#[serial]
async fn is_enrolled_is_per_user() {
    let store = get_test_store().await;
    let a = make_course("Course A", "course-a", 100);
    store.insert_course(a.clone()).await.unwrap();
    let owner = UserId::new();

    store
        .commit_enrollment(NewEnrollment {
            code: "B2C3D".to_string(),
            student: owner,
            amount: Money::from_cents(100),
            courses: vec![a.id],
        })
        .await
        .unwrap();

    assert!(store.is_enrolled(owner, a.id).await.unwrap());
    assert!(!store.is_enrolled(UserId::new(), a.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn duplicate_ticket_is_a_typed_conflict() {
    let store = get_test_store().await;
    let event = make_event("Rust Meetup", "rust-meetup", Utc::now().date_naive());
    store.insert_event(event.clone()).await.unwrap();
    let user = UserId::new();

    let ticket = |user| EventTicket {
        ticket_id: Uuid::new_v4(),
        user,
        event: event.id,
        amount: event.price,
        created: Utc::now(),
    };

    store.insert_ticket(ticket(user)).await.unwrap();
    let result = store.insert_ticket(ticket(user)).await;
    assert!(matches!(
        result,
        Err(StoreError::DuplicateTicket { .. })
    ));

    // A different user still gets a ticket
    let other = UserId::new();
    store.insert_ticket(ticket(other)).await.unwrap();
    assert_eq!(store.tickets_for_user(other).await.unwrap().len(), 1);
    assert_eq!(store.tickets_for_user(user).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn event_roundtrip() {
    let store = get_test_store().await;
    let start = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
    let event = make_event("Sept Workshop", "sept-workshop", start);

    store.insert_event(event.clone()).await.unwrap();

    let loaded = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(loaded.start_date, start);
    assert_eq!(loaded.venue, "Nairobi");

    assert!(store.get_event(EventId::new()).await.unwrap().is_none());
}
