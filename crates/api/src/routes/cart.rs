//! Session cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::CourseId;
use domain::Notice;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;
use crate::routes::courses::CourseResponse;
use crate::routes::{AppState, session_id, user_id};

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub course_id: String,
}

#[derive(Serialize)]
pub struct CartActionResponse {
    pub notice: Notice,
    pub redirect: String,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub courses: Vec<CourseResponse>,
    pub total_cents: i64,
}

/// POST /cart/items — add a course to the session's cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartActionResponse>, ApiError> {
    let session = session_id(&headers)?;
    let user = user_id(&headers)?;
    let course_id: CourseId = req
        .course_id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid course_id: {e}")))?;

    let outcome = state.checkout.add_to_cart(session, user, course_id).await?;

    Ok(Json(CartActionResponse {
        notice: outcome.notice(),
        redirect: outcome.redirect(),
    }))
}

/// DELETE /cart/items/:course_id — remove a course from the cart.
#[tracing::instrument(skip(state, headers))]
pub async fn remove<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
) -> Result<Json<CartActionResponse>, ApiError> {
    let session = session_id(&headers)?;
    let course_id: CourseId = course_id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid course id: {e}")))?;

    let outcome = state.checkout.remove_from_cart(session, course_id).await?;

    Ok(Json(CartActionResponse {
        notice: outcome.notice(),
        redirect: outcome.redirect(),
    }))
}

/// GET /cart — the cart's resolved courses and total.
#[tracing::instrument(skip(state, headers))]
pub async fn view<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let session = session_id(&headers)?;

    let view = state.checkout.view_cart(session).await?;

    Ok(Json(CartResponse {
        total_cents: view.total.cents(),
        courses: view.courses.into_iter().map(Into::into).collect(),
    }))
}
