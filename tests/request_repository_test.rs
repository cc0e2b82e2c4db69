mod common;

use evently::{
    domain::{admission, RequestStatus, ResolutionTarget},
    error::AppError,
    repository::{
        EventRepository, RequestRepository, SqliteEventRepository, SqliteRequestRepository,
    },
};

#[tokio::test]
async fn test_pending_insert_invalidates_planned_resolution() -> anyhow::Result<()> {
    let ctx = common::setup().await?;
    let (_, event) = common::published_event(&ctx, 1, true).await?;
    let guests = common::create_users(&ctx, 2).await?;

    // A second writer sharing the database but not this process's event locks.
    let events = SqliteEventRepository::new(ctx.db_pool.clone());
    let requests = SqliteRequestRepository::new(ctx.db_pool.clone());

    let first = ctx.request_service.create_request(guests[0].id, event.id).await?;

    let stale = events.find_by_id(event.id).await?.expect("event exists");
    let pending = requests.find_pending_by_event(event.id).await?;
    let plan = admission::plan_resolution(
        &stale,
        vec![first.clone()],
        pending,
        ResolutionTarget::Confirmed,
    )?;
    assert_eq!(plan.confirmed().len(), 1);
    assert!(plan.rejected().is_empty());

    // Lands between planning and applying the exact fill above.
    let late = requests
        .create(admission::admit(&stale, guests[1].id, None)?)
        .await?;
    assert_eq!(late.status, RequestStatus::Pending);

    let applied = requests.apply_resolution(&plan).await;
    assert!(matches!(applied, Err(AppError::Conflict(_))));

    // Nothing from the stale plan was written.
    let event = events.find_by_id(event.id).await?.expect("event exists");
    assert_eq!(event.confirmed_count, 0);
    let first = requests.find_by_id(first.id).await?.expect("request exists");
    assert_eq!(first.status, RequestStatus::Pending);

    // A fresh resolution sees the late request and cascades it.
    let result = ctx.request_service
        .resolve_batch(event.organizer_id, event.id, &[first.id], ResolutionTarget::Confirmed)
        .await?;
    assert_eq!(result.confirmed.len(), 1);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].id, late.id);
    Ok(())
}

#[tokio::test]
async fn test_stale_admission_is_refused() -> anyhow::Result<()> {
    let ctx = common::setup().await?;
    let (_, event) = common::published_event(&ctx, 5, true).await?;
    let guests = common::create_users(&ctx, 2).await?;

    let events = SqliteEventRepository::new(ctx.db_pool.clone());
    let requests = SqliteRequestRepository::new(ctx.db_pool.clone());

    let stale = events.find_by_id(event.id).await?.expect("event exists");
    requests.create(admission::admit(&stale, guests[0].id, None)?).await?;

    let second = requests
        .create(admission::admit(&stale, guests[1].id, None)?)
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let stored = requests.list_by_event(event.id).await?;
    assert_eq!(stored.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_find_by_ids_keeps_caller_order() -> anyhow::Result<()> {
    let ctx = common::setup().await?;
    let (organizer, event) = common::published_event(&ctx, 5, true).await?;
    let guests = common::create_users(&ctx, 3).await?;

    let mut ids = Vec::new();
    for guest in &guests {
        ids.push(ctx.request_service.create_request(guest.id, event.id).await?.id);
    }

    let requests = SqliteRequestRepository::new(ctx.db_pool.clone());
    let missing = uuid::Uuid::new_v4();
    let found = requests
        .find_by_ids(&[ids[2], missing, ids[0], ids[1]])
        .await?;

    let found: Vec<_> = found.iter().map(|r| r.id).collect();
    assert_eq!(found, vec![ids[2], ids[0], ids[1]]);
    assert!(requests.find_by_ids(&[]).await?.is_empty());

    let listed = ctx.request_service.list_for_event(organizer.id, event.id).await?;
    assert_eq!(listed.len(), 3);
    Ok(())
}
