//! Route handlers and shared request plumbing.

pub mod cart;
pub mod checkout;
pub mod courses;
pub mod events;
pub mod health;
pub mod metrics;

use axum::http::HeaderMap;
use common::{SessionId, UserId};
use domain::{CatalogService, CheckoutService, TicketService};
use store::Store;
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub catalog: CatalogService<S>,
    pub checkout: CheckoutService<S>,
    pub tickets: TicketService<S>,
}

/// The caller's session, from the `x-session-id` header.
///
/// Authentication and session issuance live outside this service; the
/// headers carry already-established identities.
pub(crate) fn session_id(headers: &HeaderMap) -> Result<SessionId, ApiError> {
    Ok(SessionId::from_uuid(header_uuid(headers, "x-session-id")?))
}

/// The caller's identity, from the `x-user-id` header.
pub(crate) fn user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    Ok(UserId::from_uuid(header_uuid(headers, "x-user-id")?))
}

fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Uuid, ApiError> {
    let value = headers
        .get(name)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("invalid {name} header")))?;
    Uuid::parse_str(value).map_err(|e| ApiError::BadRequest(format!("invalid {name}: {e}")))
}
