//! The cart → checkout → enrollment pipeline.
//!
//! A checkout runs inside one request: reconcile the cart against existing
//! enrollments, present it for review, and on confirmation commit the
//! Enrollment aggregate atomically. No intermediate checkout state is
//! persisted between requests.

use std::sync::Arc;

use common::{CourseId, Money, SessionId, UserId};
use store::{Course, Enrollment, NewEnrollment, Store};

use crate::cart::Cart;
use crate::error::DomainError;
use crate::idgen::unique_enrollment_code;
use crate::notice::Notice;
use crate::notify::{NotificationKind, Notifier};
use crate::session::SessionStore;

/// The cart's resolved contents: courses in cart-key order plus their
/// price sum. Courses that no longer exist are omitted from both.
#[derive(Debug, Clone)]
pub struct CartView {
    pub courses: Vec<Course>,
    pub total: Money,
}

/// Outcome of a cart mutation.
#[derive(Debug)]
pub enum CartOutcome {
    /// The course went into the cart.
    Added { course: Course },
    /// The user already owns the course; the cart was not touched.
    AlreadyEnrolled { course: Course },
    /// The course was removed (or was never present).
    Removed,
}

impl CartOutcome {
    /// The single user-facing message for this outcome.
    pub fn notice(&self) -> Notice {
        match self {
            CartOutcome::Added { course } => {
                Notice::success(format!("{} added to cart successfully.", course.title))
            }
            CartOutcome::AlreadyEnrolled { .. } => {
                Notice::info("You are already enrolled for this course.")
            }
            CartOutcome::Removed => Notice::info("Course removed from cart successfully."),
        }
    }

    /// Where the caller should send the user next.
    pub fn redirect(&self) -> String {
        match self {
            CartOutcome::Added { course } => format!("/courses/{}", course.id),
            CartOutcome::AlreadyEnrolled { .. } => "/my-courses".to_string(),
            CartOutcome::Removed => "/cart".to_string(),
        }
    }
}

/// Outcome of a checkout review (no confirming action yet).
#[derive(Debug)]
pub enum ReviewOutcome {
    /// Nothing to check out; `dropped` lists any courses reconciliation
    /// removed on the way to empty.
    EmptyCart { dropped: Vec<String> },
    /// The remaining cart, ready for confirmation.
    Ready { dropped: Vec<String>, cart: CartView },
}

/// Outcome of a checkout confirmation.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Nothing to check out.
    EmptyCart,
    /// Reconciliation removed already-enrolled courses; nothing was
    /// committed. The trimmed cart is back in the session and the caller
    /// re-invokes checkout to proceed with it.
    ItemsDropped { dropped: Vec<String> },
    /// The enrollment committed and the cart is cleared.
    Enrolled {
        enrollment: Enrollment,
        courses: Vec<Course>,
    },
}

impl CheckoutOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            CheckoutOutcome::EmptyCart => {
                Notice::info("Please select course(s) to enroll first.")
            }
            CheckoutOutcome::ItemsDropped { dropped } => Notice::info(format!(
                "{} removed. You are enrolled for the course already!",
                dropped.join(", ")
            )),
            CheckoutOutcome::Enrolled { .. } => {
                Notice::success("Enrollment successful. Thank you!")
            }
        }
    }

    pub fn redirect(&self) -> String {
        match self {
            CheckoutOutcome::EmptyCart => "/courses".to_string(),
            CheckoutOutcome::ItemsDropped { .. } => "/checkout".to_string(),
            CheckoutOutcome::Enrolled { .. } => "/my-courses".to_string(),
        }
    }
}

/// Service driving the cart and checkout flows.
pub struct CheckoutService<S> {
    store: S,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl<S: Store> CheckoutService<S> {
    /// Creates a new checkout service.
    pub fn new(store: S, sessions: Arc<dyn SessionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            sessions,
            notifier,
        }
    }

    /// Adds a course to the session's cart.
    ///
    /// Fails with `CourseNotFound` before any mutation if the id is
    /// unknown. A course the user already owns never enters the cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        session: SessionId,
        user: UserId,
        course_id: CourseId,
    ) -> Result<CartOutcome, DomainError> {
        let course = self
            .store
            .get_course(course_id)
            .await?
            .ok_or(DomainError::CourseNotFound(course_id))?;

        if self.store.is_enrolled(user, course_id).await? {
            return Ok(CartOutcome::AlreadyEnrolled { course });
        }

        let mut cart = self.sessions.get_cart(session).await;
        cart.add(course_id);
        self.sessions.put_cart(session, cart).await;

        metrics::counter!("cart_items_added_total").increment(1);
        Ok(CartOutcome::Added { course })
    }

    /// Removes a course from the session's cart. Absent courses are a
    /// silent no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        session: SessionId,
        course_id: CourseId,
    ) -> Result<CartOutcome, DomainError> {
        let mut cart = self.sessions.get_cart(session).await;
        cart.remove(course_id);
        self.sessions.put_cart(session, cart).await;

        Ok(CartOutcome::Removed)
    }

    /// Resolves the session's cart to courses and a total.
    #[tracing::instrument(skip(self))]
    pub async fn view_cart(&self, session: SessionId) -> Result<CartView, DomainError> {
        let cart = self.sessions.get_cart(session).await;
        self.resolve(&cart).await
    }

    /// Reviews the cart for checkout.
    ///
    /// Reconciles the whole cart in one pass: every course the user is
    /// already enrolled in is removed and reported, and the trimmed cart
    /// is persisted before the remaining contents are presented.
    #[tracing::instrument(skip(self))]
    pub async fn review(
        &self,
        session: SessionId,
        user: UserId,
    ) -> Result<ReviewOutcome, DomainError> {
        let cart = self.sessions.get_cart(session).await;
        if cart.is_empty() {
            return Ok(ReviewOutcome::EmptyCart { dropped: vec![] });
        }

        let (kept, dropped) = self.reconcile(user, &cart).await?;
        if !dropped.is_empty() || kept.len() != cart.len() {
            let mut trimmed = Cart::new();
            for course in &kept {
                trimmed.add(course.id);
            }
            self.sessions.put_cart(session, trimmed).await;
        }

        if kept.is_empty() {
            return Ok(ReviewOutcome::EmptyCart { dropped });
        }

        let total = kept.iter().map(|c| c.price).sum();
        Ok(ReviewOutcome::Ready {
            dropped,
            cart: CartView {
                courses: kept,
                total,
            },
        })
    }

    /// Confirms checkout and commits the enrollment.
    ///
    /// The cart is claimed atomically up front, so a concurrent confirm on
    /// the same session observes an empty cart. If reconciliation drops
    /// anything, nothing is committed and the trimmed cart goes back to
    /// the session. On a commit failure the claimed cart is restored
    /// before the error propagates; the store guarantees no partial
    /// Enrollment/EnrolledCourse set is ever visible.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(
        &self,
        session: SessionId,
        user: UserId,
    ) -> Result<CheckoutOutcome, DomainError> {
        let cart = self.sessions.take_cart(session).await;
        if cart.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let (kept, dropped) = self.reconcile(user, &cart).await?;
        if !dropped.is_empty() {
            let mut trimmed = Cart::new();
            for course in &kept {
                trimmed.add(course.id);
            }
            self.sessions.put_cart(session, trimmed).await;
            return Ok(CheckoutOutcome::ItemsDropped { dropped });
        }

        if kept.is_empty() {
            // Every cart entry pointed at a deleted course.
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let total: Money = kept.iter().map(|c| c.price).sum();

        let start = std::time::Instant::now();
        let enrollment = match self.commit(user, total, &kept).await {
            Ok(enrollment) => enrollment,
            Err(e) => {
                // Restore the claimed cart so the user can retry.
                self.sessions.put_cart(session, cart).await;
                return Err(e);
            }
        };
        metrics::histogram!("checkout_commit_seconds").record(start.elapsed().as_secs_f64());
        metrics::counter!("checkouts_committed_total").increment(1);

        self.notifier
            .dispatch(NotificationKind::EnrollmentConfirmed, user);

        Ok(CheckoutOutcome::Enrolled {
            enrollment,
            courses: kept,
        })
    }

    async fn commit(
        &self,
        user: UserId,
        total: Money,
        courses: &[Course],
    ) -> Result<Enrollment, DomainError> {
        let code = unique_enrollment_code(&self.store).await?;
        let enrollment = self
            .store
            .commit_enrollment(NewEnrollment {
                code,
                student: user,
                amount: total,
                courses: courses.iter().map(|c| c.id).collect(),
            })
            .await?;
        Ok(enrollment)
    }

    /// Splits the cart's resolvable courses into (not yet enrolled,
    /// titles of already-enrolled). Unresolvable ids fall out silently.
    async fn reconcile(
        &self,
        user: UserId,
        cart: &Cart,
    ) -> Result<(Vec<Course>, Vec<String>), DomainError> {
        let courses = self.store.get_courses_by_ids(&cart.course_ids()).await?;

        let mut kept = Vec::with_capacity(courses.len());
        let mut dropped = Vec::new();
        for course in courses {
            if self.store.is_enrolled(user, course.id).await? {
                dropped.push(course.title);
            } else {
                kept.push(course);
            }
        }
        Ok((kept, dropped))
    }

    async fn resolve(&self, cart: &Cart) -> Result<CartView, DomainError> {
        let courses = self.store.get_courses_by_ids(&cart.course_ids()).await?;
        let total = courses.iter().map(|c| c.price).sum();
        Ok(CartView { courses, total })
    }
}
