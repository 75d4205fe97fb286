//! Integration tests for the API server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let store = InMemoryStore::new();
    let state = api::create_default_state(store);
    api::create_app(state, get_metrics_handle())
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn session_request(
    method: &str,
    uri: &str,
    session: &str,
    user: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-session-id", session)
        .header("x-user-id", user);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_course(app: &axum::Router, title: &str, price_cents: i64) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/courses",
            serde_json::json!({ "title": title, "price_cents": price_cents }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_course_derives_slug() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/courses",
            serde_json::json!({ "title": "Intro to Rust", "price_cents": 15000 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["slug"], "intro-to-rust");
    assert_eq!(json["price_cents"], 15000);
    assert!(json["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_and_get_course() {
    let app = setup();
    let id = create_course(&app, "Databases", 20000).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/courses/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["title"], "Databases");
}

#[tokio::test]
async fn test_get_nonexistent_course() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/courses/{fake_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_course_id_format() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/courses/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_title_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/courses",
            serde_json::json!({ "title": "   ", "price_cents": 100 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_requires_session_header() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_to_cart_and_view() {
    let app = setup();
    let course_id = create_course(&app, "Networking", 15000).await;
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    let response = app
        .clone()
        .oneshot(session_request(
            "POST",
            "/cart/items",
            &session,
            &user,
            Some(serde_json::json!({ "course_id": course_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "success");
    assert_eq!(json["redirect"], format!("/courses/{course_id}"));

    let response = app
        .oneshot(session_request("GET", "/cart", &session, &user, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["courses"].as_array().unwrap().len(), 1);
    assert_eq!(json["total_cents"], 15000);
}

#[tokio::test]
async fn test_add_unknown_course_is_not_found() {
    let app = setup();
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    let response = app
        .oneshot(session_request(
            "POST",
            "/cart/items",
            &session,
            &user,
            Some(serde_json::json!({ "course_id": uuid::Uuid::new_v4().to_string() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_from_cart() {
    let app = setup();
    let course_id = create_course(&app, "Compilers", 30000).await;
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    app.clone()
        .oneshot(session_request(
            "POST",
            "/cart/items",
            &session,
            &user,
            Some(serde_json::json!({ "course_id": course_id })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(session_request(
            "DELETE",
            &format!("/cart/items/{course_id}"),
            &session,
            &user,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["redirect"], "/cart");

    let response = app
        .oneshot(session_request("GET", "/cart", &session, &user, None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["courses"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_cents"], 0);
}

#[tokio::test]
async fn test_full_checkout_flow() {
    let app = setup();
    let first = create_course(&app, "Operating Systems", 15000).await;
    let second = create_course(&app, "Distributed Systems", 10000).await;
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    for course_id in [&first, &second] {
        let response = app
            .clone()
            .oneshot(session_request(
                "POST",
                "/cart/items",
                &session,
                &user,
                Some(serde_json::json!({ "course_id": course_id })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Review
    let response = app
        .clone()
        .oneshot(session_request("GET", "/checkout", &session, &user, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["courses"].as_array().unwrap().len(), 2);
    assert_eq!(json["total_cents"], 25000);
    assert_eq!(json["dropped"].as_array().unwrap().len(), 0);

    // Confirm
    let response = app
        .clone()
        .oneshot(session_request(
            "POST",
            "/checkout",
            &session,
            &user,
            Some(serde_json::json!({ "phone": "+254700000000" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "success");
    assert_eq!(json["redirect"], "/my-courses");
    assert_eq!(json["enrollment_code"].as_str().unwrap().len(), 5);
    assert_eq!(json["courses"].as_array().unwrap().len(), 2);

    // The cart is now empty
    let response = app
        .oneshot(session_request("GET", "/cart", &session, &user, None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_cents"], 0);
}

#[tokio::test]
async fn test_confirm_empty_cart() {
    let app = setup();
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    let response = app
        .oneshot(session_request("POST", "/checkout", &session, &user, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "info");
    assert_eq!(json["redirect"], "/courses");
    assert!(json.get("enrollment_code").is_none());
}

#[tokio::test]
async fn test_readding_purchased_course_redirects_to_my_courses() {
    let app = setup();
    let course_id = create_course(&app, "Security", 5000).await;
    let session = uuid::Uuid::new_v4().to_string();
    let user = uuid::Uuid::new_v4().to_string();

    app.clone()
        .oneshot(session_request(
            "POST",
            "/cart/items",
            &session,
            &user,
            Some(serde_json::json!({ "course_id": course_id })),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(session_request("POST", "/checkout", &session, &user, None))
        .await
        .unwrap();

    let response = app
        .oneshot(session_request(
            "POST",
            "/cart/items",
            &session,
            &user,
            Some(serde_json::json!({ "course_id": course_id })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "info");
    assert_eq!(json["redirect"], "/my-courses");
}

#[tokio::test]
async fn test_event_ticket_flow() {
    let app = setup();
    let user = uuid::Uuid::new_v4().to_string();
    let today = chrono::Utc::now().date_naive();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/events",
            serde_json::json!({
                "title": "Rust Meetup",
                "price_cents": 5000,
                "start_date": today,
                "end_date": today,
                "venue": "Nairobi"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = body_json(response).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["slug"], "rust-meetup");

    let purchase = |app: axum::Router, user: String| {
        let uri = format!("/events/{event_id}/tickets");
        async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("x-user-id", user)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let response = purchase(app.clone(), user.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "success");
    assert!(json["ticket_id"].as_str().is_some());

    // A second purchase by the same user is rejected as informational
    let response = purchase(app, user).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "info");
    assert!(json.get("ticket_id").is_none());
}

#[tokio::test]
async fn test_negative_event_price_is_rejected() {
    let app = setup();
    let today = chrono::Utc::now().date_naive();

    let response = app
        .oneshot(json_request(
            "POST",
            "/events",
            serde_json::json!({
                "title": "Free-er Than Free",
                "price_cents": -100,
                "start_date": today,
                "end_date": today,
                "venue": "Nairobi"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_past_event_ticket_is_closed() {
    let app = setup();
    let user = uuid::Uuid::new_v4().to_string();
    let yesterday = chrono::Utc::now().date_naive() - chrono::Days::new(1);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/events",
            serde_json::json!({
                "title": "Past Workshop",
                "price_cents": 5000,
                "start_date": yesterday,
                "end_date": yesterday,
                "venue": "Mombasa"
            }),
        ))
        .await
        .unwrap();
    let event = body_json(response).await;
    let event_id = event["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/events/{event_id}/tickets"))
                .header("x-user-id", user)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["notice"]["level"], "error");
    assert!(json.get("ticket_id").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
