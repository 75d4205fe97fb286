//! Persistence layer for the enrollment platform.
//!
//! The [`Store`] trait is the seam between the domain and storage. Two
//! implementations exist: [`InMemoryStore`] for tests and local runs, and
//! [`PostgresStore`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{
    Article, Category, Course, Enrollment, EnrolledCourse, Event, EventTicket, SlugScope, Tag,
};
pub use store::{NewEnrollment, Store};
