//! Collision-retry generation of unique identifiers.
//!
//! Two variants share the same probe-and-retry shape:
//! - slugs, derived from a title and disambiguated with a random numeric
//!   suffix on collision;
//! - enrollment codes, short random alphanumerics redrawn from scratch on
//!   collision.
//!
//! Both probe the store's uniqueness predicates and give up with
//! [`IdError::Exhausted`] after a fixed number of attempts instead of
//! retrying forever.

use rand::Rng;
use store::{SlugScope, Store, StoreError};
use thiserror::Error;
use uuid::Uuid;

/// Attempt cap for both generator variants.
pub const MAX_ATTEMPTS: u32 = 32;

/// Length of a generated enrollment code.
pub const CODE_LENGTH: usize = 5;

/// Range of the numeric suffix appended to a colliding slug.
const SLUG_SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 300_000..=500_000;

const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Errors from identifier generation.
#[derive(Debug, Error)]
pub enum IdError {
    /// Every candidate collided. With a healthy keyspace this indicates a
    /// configuration problem, not bad luck.
    #[error("Gave up generating a unique {kind} after {attempts} attempts")]
    Exhausted { kind: &'static str, attempts: u32 },

    /// The uniqueness probe failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Turns a title into a URL-safe slug.
///
/// Lowercases, keeps alphanumerics, and collapses every other run of
/// characters into a single hyphen. `"Test Course"` becomes `"test-course"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Generates a slug for `title` that is unique within `scope`.
///
/// `exclude` identifies the record being re-saved, so an entity keeps its
/// own slug across updates. On collision the base slug gets a fresh
/// `-<number>` suffix and is probed again.
pub async fn unique_slug<S: Store + ?Sized>(
    store: &S,
    scope: SlugScope,
    title: &str,
    exclude: Option<Uuid>,
) -> Result<String, IdError> {
    let base = slugify(title);
    let mut candidate = base.clone();

    for _ in 0..MAX_ATTEMPTS {
        if !store.slug_exists(scope, &candidate, exclude).await? {
            return Ok(candidate);
        }
        let suffix = rand::thread_rng().gen_range(SLUG_SUFFIX_RANGE);
        candidate = format!("{base}-{suffix}");
    }

    Err(IdError::Exhausted {
        kind: "slug",
        attempts: MAX_ATTEMPTS,
    })
}

/// Generates an enrollment code no existing enrollment uses.
///
/// Unlike the slug variant, a colliding code is discarded entirely and a
/// fresh one drawn.
pub async fn unique_enrollment_code<S: Store + ?Sized>(store: &S) -> Result<String, IdError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_code(CODE_LENGTH);
        if !store.enrollment_code_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(IdError::Exhausted {
        kind: "enrollment code",
        attempts: MAX_ATTEMPTS,
    })
}

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}
