mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use evently::api;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> anyhow::Result<Router> {
    let ctx = common::setup().await?;
    Ok(api::create_app(Arc::new(ctx)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string()))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}

async fn create_user(app: &Router, name: &str) -> anyhow::Result<String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/admin/users",
        Some(json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(id_of(&body))
}

fn event_body(category_id: &str, hours_ahead: i64, limit: i64) -> Value {
    json!({
        "category_id": category_id,
        "title": "Chamber Music Night",
        "annotation": "Three string quartets in the old library hall",
        "description": "Doors open at seven. The programme runs for about two hours.",
        "event_date": (Utc::now() + Duration::hours(hours_ahead)).to_rfc3339(),
        "location": { "lat": 48.85, "lon": 2.35 },
        "participant_limit": limit
    })
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, body) = send(&app, Method::GET, "/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "up");
    Ok(())
}

#[tokio::test]
async fn test_event_flow_over_http() -> anyhow::Result<()> {
    let app = app().await?;
    let organizer = create_user(&app, "Organizer").await?;
    let guest = create_user(&app, "Guest").await?;

    let (status, category) = send(
        &app,
        Method::POST,
        "/admin/categories",
        Some(json!({ "name": "Classical" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = id_of(&category);

    let (status, event) = send(
        &app,
        Method::POST,
        &format!("/users/{}/events", organizer),
        Some(event_body(&category_id, 48, 1)),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["state"], "DRAFT");
    assert_eq!(event["request_moderation"], true);
    let event_id = id_of(&event);

    // Drafts are invisible on the public route.
    let (status, _) = send(&app, Method::GET, &format!("/events/{}", event_id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, published) = send(
        &app,
        Method::POST,
        &format!("/admin/events/{}/publish", event_id),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["state"], "PUBLISHED");

    let (status, _) = send(&app, Method::GET, &format!("/events/{}", event_id), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, request) = send(
        &app,
        Method::POST,
        &format!("/users/{}/requests?event_id={}", guest, event_id),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "PENDING");
    let request_id = id_of(&request);

    let (status, result) = send(
        &app,
        Method::PATCH,
        &format!("/users/{}/events/{}/requests", organizer, event_id),
        Some(json!({ "request_ids": [request_id], "status": "CONFIRMED" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["confirmed"].as_array().map(Vec::len), Some(1));
    assert_eq!(result["rejected"].as_array().map(Vec::len), Some(0));

    let (status, event) = send(&app, Method::GET, &format!("/events/{}", event_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["confirmed_count"], 1);

    // The event is now full.
    let late = create_user(&app, "Late").await?;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/users/{}/requests?event_id={}", late, event_id),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("limit reached"));
    Ok(())
}

#[tokio::test]
async fn test_organizer_lead_time_is_enforced() -> anyhow::Result<()> {
    let app = app().await?;
    let organizer = create_user(&app, "Organizer").await?;
    let (_, category) = send(
        &app,
        Method::POST,
        "/admin/categories",
        Some(json!({ "name": "Lectures" })),
    )
    .await?;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/users/{}/events", organizer),
        Some(event_body(&id_of(&category), 1, 0)),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_invalid_payloads_are_bad_requests() -> anyhow::Result<()> {
    let app = app().await?;
    let organizer = create_user(&app, "Organizer").await?;
    let (_, category) = send(
        &app,
        Method::POST,
        "/admin/categories",
        Some(json!({ "name": "Theatre" })),
    )
    .await?;

    let mut body = event_body(&id_of(&category), 48, 0);
    body["title"] = json!("Hi");
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/users/{}/events", organizer),
        Some(body),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/users",
        Some(json!({ "name": "Nobody", "email": "not-an-email" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_conflicts() -> anyhow::Result<()> {
    let app = app().await?;
    create_user(&app, "Twin").await?;

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/users",
        Some(json!({ "name": "Twin", "email": "twin@example.com" })),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}
