use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{admission, *},
    error::{AppError, Result},
    repository::{EventRepository, RequestRepository, UserRepository},
    service::{event_locks::EventLocks, validation::ensure_organizer},
};

/// Participation requests: creation, organizer resolution and cancellation.
///
/// Every path that reads capacity to make a decision does so while holding the
/// event's lock, and re-reads the event after acquiring it.
pub struct RequestService {
    request_repo: Arc<dyn RequestRepository>,
    event_repo: Arc<dyn EventRepository>,
    user_repo: Arc<dyn UserRepository>,
    locks: Arc<EventLocks>,
}

impl RequestService {
    pub fn new(
        request_repo: Arc<dyn RequestRepository>,
        event_repo: Arc<dyn EventRepository>,
        user_repo: Arc<dyn UserRepository>,
        locks: Arc<EventLocks>,
    ) -> Self {
        Self { request_repo, event_repo, user_repo, locks }
    }

    pub async fn create_request(&self, requester_id: Uuid, event_id: Uuid) -> Result<ParticipationRequest> {
        self.require_user(requester_id).await?;
        self.require_event(event_id).await?;

        let _guard = self.locks.acquire(event_id).await;
        let event = self.require_event(event_id).await?;

        let existing = self.request_repo
            .find_active(requester_id, event_id)
            .await?;

        let admission = admission::admit(&event, requester_id, existing.as_ref())?;
        let request = self.request_repo.create(admission).await?;

        tracing::debug!(
            request_id = %request.id,
            event_id = %event_id,
            status = request.status.as_str(),
            "Participation request created"
        );

        Ok(request)
    }

    /// Confirm or reject a batch of pending requests of one event.
    ///
    /// Seats go to the batch in ascending creation order, not in the order of
    /// `request_ids`; requests created at the same instant keep the caller's
    /// order. When confirming fills the event, the overflow of the batch and
    /// every other pending request of the event are rejected.
    pub async fn resolve_batch(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
        request_ids: &[Uuid],
        target: ResolutionTarget,
    ) -> Result<ResolutionResult> {
        self.require_user(organizer_id).await?;
        let event = self.require_event(event_id).await?;
        ensure_organizer(&event, organizer_id)?;

        let _guard = self.locks.acquire(event_id).await;
        let event = self.require_event(event_id).await?;

        let batch = self.load_batch(request_ids).await?;
        let pending = match target {
            ResolutionTarget::Confirmed => self.request_repo.find_pending_by_event(event_id).await?,
            ResolutionTarget::Rejected => Vec::new(),
        };

        let plan = admission::plan_resolution(&event, batch, pending, target)?;
        if !plan.is_empty() {
            self.request_repo.apply_resolution(&plan).await?;
        }

        tracing::info!(
            event_id = %event_id,
            confirmed = plan.confirmed().len(),
            rejected = plan.rejected().len(),
            seats_claimed = plan.seats_claimed(),
            "Resolved participation requests"
        );

        Ok(plan.into_result())
    }

    pub async fn cancel_request(&self, requester_id: Uuid, request_id: Uuid) -> Result<ParticipationRequest> {
        self.require_user(requester_id).await?;
        let request = self.require_request(request_id).await?;
        if request.requester_id != requester_id {
            return Err(AppError::not_allowed(
                "Only the requester may cancel this request",
            ));
        }

        let _guard = self.locks.acquire(request.event_id).await;
        let request = self.require_request(request_id).await?;

        if !request.status.can_transition_to(RequestStatus::Canceled) {
            return Err(AppError::not_allowed(format!(
                "Request {} is already {}",
                request_id,
                request.status.as_str().to_lowercase()
            )));
        }

        self.request_repo.cancel(request_id).await
    }

    pub async fn list_for_requester(&self, requester_id: Uuid) -> Result<Vec<ParticipationRequest>> {
        self.require_user(requester_id).await?;
        self.request_repo.list_by_requester(requester_id).await
    }

    pub async fn list_for_event(&self, organizer_id: Uuid, event_id: Uuid) -> Result<Vec<ParticipationRequest>> {
        self.require_user(organizer_id).await?;
        let event = self.require_event(event_id).await?;
        ensure_organizer(&event, organizer_id)?;
        self.request_repo.list_by_event(event_id).await
    }

    /// Load the requests in caller order, failing on the first unknown id.
    async fn load_batch(&self, request_ids: &[Uuid]) -> Result<Vec<ParticipationRequest>> {
        let found = self.request_repo.find_by_ids(request_ids).await?;
        let known: HashSet<Uuid> = found.iter().map(|r| r.id).collect();

        if let Some(missing) = request_ids.iter().find(|id| !known.contains(id)) {
            return Err(AppError::not_found(format!("Request {} not found", missing)));
        }

        Ok(found)
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.user_repo.find_by_id(user_id).await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))
    }

    async fn require_event(&self, event_id: Uuid) -> Result<Event> {
        self.event_repo.find_by_id(event_id).await?
            .ok_or_else(|| AppError::not_found(format!("Event {} not found", event_id)))
    }

    async fn require_request(&self, request_id: Uuid) -> Result<ParticipationRequest> {
        self.request_repo.find_by_id(request_id).await?
            .ok_or_else(|| AppError::not_found(format!("Request {} not found", request_id)))
    }
}
