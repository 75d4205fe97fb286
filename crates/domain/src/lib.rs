//! Domain layer for the enrollment platform.
//!
//! This crate provides the core pieces of the purchase flow:
//! - the session-scoped shopping [`Cart`] and its [`SessionStore`]
//! - the collision-retry identifier generator (slugs, enrollment codes)
//! - the [`CheckoutService`] pipeline from cart to committed enrollment
//! - the [`TicketService`] for single-shot event ticket purchases
//! - the [`CatalogService`] for creating slugged entities

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod idgen;
pub mod notice;
pub mod notify;
pub mod session;
pub mod tickets;

pub use cart::Cart;
pub use catalog::CatalogService;
pub use checkout::{CartOutcome, CartView, CheckoutOutcome, CheckoutService, ReviewOutcome};
pub use error::DomainError;
pub use idgen::{IdError, slugify, unique_enrollment_code, unique_slug};
pub use notice::{Level, Notice};
pub use notify::{LogNotifier, NotificationKind, Notifier, RecordingNotifier};
pub use session::{InMemorySessionStore, SessionStore};
pub use tickets::{TicketOutcome, TicketService};
