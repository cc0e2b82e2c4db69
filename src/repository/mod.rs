use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::admission::{Admission, ResolutionPlan};
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod category_repository;
pub mod event_repository;
pub mod request_repository;

pub use user_repository::SqliteUserRepository;
pub use category_repository::SqliteCategoryRepository;
pub use event_repository::SqliteEventRepository;
pub use request_repository::SqliteRequestRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, request: CreateCategoryRequest) -> Result<Category>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;
}

/// Event records. `update` writes content, state and publication time but
/// never the confirmed counter; seats are only claimed through
/// [`RequestRepository`].
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    async fn list_by_organizer(&self, organizer_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Event>>;
    async fn update(&self, event: Event) -> Result<Event>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Store a new request and claim its seats in one transaction.
    async fn create(&self, admission: Admission) -> Result<ParticipationRequest>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ParticipationRequest>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ParticipationRequest>>;
    async fn find_pending_by_event(&self, event_id: Uuid) -> Result<Vec<ParticipationRequest>>;
    async fn find_active(&self, requester_id: Uuid, event_id: Uuid) -> Result<Option<ParticipationRequest>>;
    async fn list_by_requester(&self, requester_id: Uuid) -> Result<Vec<ParticipationRequest>>;
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<ParticipationRequest>>;
    /// Apply every status change and the seat claim of `plan` atomically.
    async fn apply_resolution(&self, plan: &ResolutionPlan) -> Result<()>;
    async fn cancel(&self, id: Uuid) -> Result<ParticipationRequest>;
}
