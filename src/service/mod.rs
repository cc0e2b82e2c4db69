pub mod event_locks;
pub mod event_service;
pub mod request_service;
pub mod validation;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::config::EventRules;
use crate::repository::*;
use event_locks::EventLocks;
use event_service::EventService;
use request_service::RequestService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub event_service: Arc<EventService>,
    pub request_service: Arc<RequestService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, rules: EventRules) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let category_repo: Arc<dyn CategoryRepository> = Arc::new(SqliteCategoryRepository::new(db_pool.clone()));
        let event_repo: Arc<dyn EventRepository> = Arc::new(SqliteEventRepository::new(db_pool.clone()));
        let request_repo: Arc<dyn RequestRepository> = Arc::new(SqliteRequestRepository::new(db_pool.clone()));

        // Shared: edits, admissions and resolutions of one event take the same key.
        let locks = Arc::new(EventLocks::new());

        let event_service = Arc::new(EventService::new(
            event_repo.clone(),
            user_repo.clone(),
            category_repo.clone(),
            locks.clone(),
            rules,
        ));
        let request_service = Arc::new(RequestService::new(
            request_repo,
            event_repo,
            user_repo.clone(),
            locks,
        ));

        Self {
            user_repo,
            category_repo,
            event_service,
            request_service,
            db_pool,
        }
    }
}
