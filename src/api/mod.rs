pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::service::ServiceContext;
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>) -> Router {
    let app_state = AppState::new(service_context);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Organizer and participant routes, scoped by the acting user
        .nest("/users/:user_id", user_routes())

        // Published events
        .route("/events/:event_id", get(handlers::events::get_published))

        // Moderation
        .nest("/admin", admin_routes())

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::events::list).post(handlers::events::create))
        .route("/events/:event_id", get(handlers::events::get).patch(handlers::events::update))
        .route(
            "/events/:event_id/requests",
            get(handlers::events::list_requests).patch(handlers::events::resolve_requests),
        )
        .route("/requests", get(handlers::requests::list).post(handlers::requests::create))
        .route("/requests/:request_id/cancel", patch(handlers::requests::cancel))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/events/:event_id", patch(handlers::admin::update_event))
        .route("/events/:event_id/publish", post(handlers::admin::publish_event))
        .route("/events/:event_id/reject", post(handlers::admin::reject_event))
        .route("/users", post(handlers::admin::create_user))
        .route("/categories", post(handlers::admin::create_category))
}
