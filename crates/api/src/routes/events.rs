//! Event catalog and ticket endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::NaiveDate;
use common::{EventId, Money};
use domain::{Notice, TicketOutcome};
use serde::{Deserialize, Serialize};
use store::{Event, Store};

use crate::error::ApiError;
use crate::routes::{AppState, user_id};

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub price_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title,
            slug: event.slug,
            price_cents: event.price.cents(),
            start_date: event.start_date,
            end_date: event.end_date,
            venue: event.venue,
        }
    }
}

#[derive(Serialize)]
pub struct TicketResponse {
    pub notice: Notice,
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

/// POST /events — create an event with a derived unique slug.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(axum::http::StatusCode, Json<EventResponse>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest(
            "price_cents must not be negative".to_string(),
        ));
    }
    if req.end_date < req.start_date {
        return Err(ApiError::BadRequest(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let event = state
        .catalog
        .create_event(
            req.title.trim(),
            Money::from_cents(req.price_cents),
            req.start_date,
            req.end_date,
            &req.venue,
        )
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(event.into())))
}

/// POST /events/:id/tickets — issue a ticket for the requesting user.
#[tracing::instrument(skip(state, headers))]
pub async fn purchase<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let user = user_id(&headers)?;
    let event_id: EventId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid event id: {e}")))?;

    let outcome = state.tickets.purchase(user, event_id).await?;

    let ticket_id = match &outcome {
        TicketOutcome::Issued { ticket, .. } => Some(ticket.ticket_id.to_string()),
        TicketOutcome::EventClosed { .. } | TicketOutcome::AlreadyTicketed { .. } => None,
    };

    Ok(Json(TicketResponse {
        notice: outcome.notice(),
        redirect: outcome.redirect(),
        ticket_id,
    }))
}
