#![allow(dead_code)]

use chrono::{Duration, Utc};
use evently::{
    config::EventRules,
    domain::{Category, CreateCategoryRequest, CreateUserRequest, Event, Location, NewEvent, User},
    repository::{CategoryRepository, UserRepository},
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

/// In-memory database with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = setup_pool().await?;
    Ok(ServiceContext::new(pool, EventRules::default()))
}

pub async fn create_user(ctx: &ServiceContext, name: &str) -> anyhow::Result<User> {
    let user = ctx.user_repo.create(CreateUserRequest {
        name: name.to_string(),
        email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
    }).await?;
    Ok(user)
}

pub async fn create_category(ctx: &ServiceContext) -> anyhow::Result<Category> {
    let category = ctx.category_repo.create(CreateCategoryRequest {
        name: format!("Concerts {}", Uuid::new_v4()),
    }).await?;
    Ok(category)
}

pub fn new_event(category_id: Uuid, participant_limit: i64, request_moderation: bool) -> NewEvent {
    NewEvent {
        category_id,
        title: "Jazz in the Park".to_string(),
        annotation: "An open-air jazz evening with local bands".to_string(),
        description: "Bring a blanket. Three bands, food trucks and a late jam session.".to_string(),
        event_date: Utc::now() + Duration::days(5),
        location: Location { lat: 52.52, lon: 13.40 },
        paid: false,
        participant_limit,
        request_moderation,
    }
}

/// Organizer plus a published event with the given capacity policy.
pub async fn published_event(
    ctx: &ServiceContext,
    participant_limit: i64,
    request_moderation: bool,
) -> anyhow::Result<(User, Event)> {
    let organizer = create_user(ctx, "Organizer").await?;
    let category = create_category(ctx).await?;

    let event = ctx.event_service
        .create_event(organizer.id, new_event(category.id, participant_limit, request_moderation))
        .await?;
    let event = ctx.event_service.publish(event.id).await?;

    Ok((organizer, event))
}

pub async fn create_users(ctx: &ServiceContext, count: usize) -> anyhow::Result<Vec<User>> {
    let mut users = Vec::with_capacity(count);
    for i in 0..count {
        users.push(create_user(ctx, &format!("Guest{}", i)).await?);
    }
    Ok(users)
}
