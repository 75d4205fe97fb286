//! Course catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CourseId, Money};
use serde::{Deserialize, Serialize};
use store::{Course, Store};

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price_cents: i64,
    pub is_active: bool,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.to_string(),
            title: course.title,
            slug: course.slug,
            price_cents: course.price.cents(),
            is_active: course.is_active,
        }
    }
}

/// POST /courses — create a course with a derived unique slug.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(axum::http::StatusCode, Json<CourseResponse>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest(
            "price_cents must not be negative".to_string(),
        ));
    }

    let course = state
        .catalog
        .create_course(req.title.trim(), Money::from_cents(req.price_cents))
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(course.into())))
}

/// GET /courses/:id — look up a course by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course_id: CourseId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid course id: {e}")))?;

    let course = state
        .catalog
        .get_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {id} not found")))?;

    Ok(Json(course.into()))
}
