//! HTTP API server with observability for the enrollment platform.
//!
//! Provides REST endpoints for the catalog, the session cart, checkout,
//! and event tickets, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::{CatalogService, CheckoutService, InMemorySessionStore, LogNotifier, TicketService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/courses", post(routes::courses::create::<S>))
        .route("/courses/{id}", get(routes::courses::get::<S>))
        .route("/events", post(routes::events::create::<S>))
        .route("/events/{id}/tickets", post(routes::events::purchase::<S>))
        .route("/cart/items", post(routes::cart::add::<S>))
        .route("/cart/items/{course_id}", delete(routes::cart::remove::<S>))
        .route("/cart", get(routes::cart::view::<S>))
        .route("/checkout", get(routes::checkout::review::<S>))
        .route("/checkout", post(routes::checkout::confirm::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store, with an
/// in-memory session store and a log-only notifier.
pub fn create_default_state<S: Store + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    let sessions = Arc::new(InMemorySessionStore::new());
    let notifier = Arc::new(LogNotifier);

    Arc::new(AppState {
        catalog: CatalogService::new(store.clone()),
        checkout: CheckoutService::new(store.clone(), sessions, notifier.clone()),
        tickets: TicketService::new(store, notifier),
    })
}
