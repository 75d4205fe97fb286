//! Checkout review and confirmation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use domain::{CheckoutOutcome, Notice, ReviewOutcome};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;
use crate::routes::courses::CourseResponse;
use crate::routes::{AppState, session_id, user_id};

#[derive(Deserialize, Default)]
pub struct ConfirmRequest {
    /// Payment contact number. Recorded nowhere yet; the payment gateway
    /// integration that would consume it is an external collaborator.
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub notice: Option<Notice>,
    pub dropped: Vec<String>,
    pub courses: Vec<CourseResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub notice: Notice,
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<CourseResponse>,
}

/// GET /checkout — reconcile the cart and present it for confirmation.
#[tracing::instrument(skip(state, headers))]
pub async fn review<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<ReviewResponse>, ApiError> {
    let session = session_id(&headers)?;
    let user = user_id(&headers)?;

    let outcome = state.checkout.review(session, user).await?;

    let response = match outcome {
        ReviewOutcome::EmptyCart { dropped } => ReviewResponse {
            notice: Some(Notice::info("Please select course(s) to enroll first.")),
            dropped,
            courses: vec![],
            total_cents: 0,
        },
        ReviewOutcome::Ready { dropped, cart } => ReviewResponse {
            notice: (!dropped.is_empty()).then(|| {
                Notice::info(format!(
                    "{} removed. You are enrolled for the course already!",
                    dropped.join(", ")
                ))
            }),
            dropped,
            total_cents: cart.total.cents(),
            courses: cart.courses.into_iter().map(Into::into).collect(),
        },
    };

    Ok(Json(response))
}

/// POST /checkout — confirm the checkout and commit the enrollment.
#[tracing::instrument(skip(state, headers, req))]
pub async fn confirm<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    req: Option<Json<ConfirmRequest>>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let session = session_id(&headers)?;
    let user = user_id(&headers)?;
    let _phone = req.and_then(|Json(r)| r.phone);

    let outcome = state.checkout.confirm(session, user).await?;

    let response = match outcome {
        CheckoutOutcome::EmptyCart | CheckoutOutcome::ItemsDropped { .. } => ConfirmResponse {
            notice: outcome.notice(),
            redirect: outcome.redirect(),
            enrollment_code: None,
            courses: vec![],
        },
        CheckoutOutcome::Enrolled {
            ref enrollment,
            ref courses,
        } => ConfirmResponse {
            notice: outcome.notice(),
            redirect: outcome.redirect(),
            enrollment_code: Some(enrollment.code.clone()),
            courses: courses.iter().cloned().map(Into::into).collect(),
        },
    };

    Ok(Json(response))
}
