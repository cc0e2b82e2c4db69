//! Seat admission decisions.
//!
//! Everything here is pure: callers load the event and its requests inside
//! the per-event critical section, ask for a plan, and hand the plan to the
//! request store, which applies it in a single transaction. Plans can only be
//! built through this module, so there is no way to bump an event's confirmed
//! counter without going through a capacity decision.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    domain::{Event, ParticipationRequest, RequestStatus, ResolutionResult, ResolutionTarget},
    error::{AppError, Result},
};

/// A new request together with the seats it takes on its event.
#[derive(Debug, Clone)]
pub struct Admission {
    request: ParticipationRequest,
    event_version: i64,
    seats_claimed: i64,
}

impl Admission {
    pub fn request(&self) -> &ParticipationRequest {
        &self.request
    }

    pub fn event_version(&self) -> i64 {
        self.event_version
    }

    pub fn seats_claimed(&self) -> i64 {
        self.seats_claimed
    }

    pub fn into_request(self) -> ParticipationRequest {
        self.request
    }
}

/// Status changes and counter increment produced by resolving a batch.
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    event_id: Uuid,
    event_version: i64,
    seats_claimed: i64,
    confirmed: Vec<ParticipationRequest>,
    rejected: Vec<ParticipationRequest>,
}

impl ResolutionPlan {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_version(&self) -> i64 {
        self.event_version
    }

    pub fn seats_claimed(&self) -> i64 {
        self.seats_claimed
    }

    pub fn confirmed(&self) -> &[ParticipationRequest] {
        &self.confirmed
    }

    pub fn rejected(&self) -> &[ParticipationRequest] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.rejected.is_empty()
    }

    pub fn into_result(self) -> ResolutionResult {
        ResolutionResult {
            confirmed: self.confirmed,
            rejected: self.rejected,
        }
    }
}

/// Decide how a new request from `requester_id` enters `event`.
///
/// `existing` is the requester's latest request for the event, if any.
pub fn admit(
    event: &Event,
    requester_id: Uuid,
    existing: Option<&ParticipationRequest>,
) -> Result<Admission> {
    if !event.is_published() {
        return Err(AppError::not_allowed(
            "Cannot participate in an unpublished event",
        ));
    }
    if event.organizer_id == requester_id {
        return Err(AppError::not_allowed(
            "The organizer cannot request participation in their own event",
        ));
    }
    if existing.is_some_and(|request| request.status.is_active()) {
        return Err(AppError::not_allowed(
            "A participation request for this event already exists",
        ));
    }
    if event.is_full() {
        return Err(AppError::not_allowed("Participant limit reached"));
    }

    let (status, seats_claimed) = if event.auto_confirms() {
        (RequestStatus::Confirmed, 1)
    } else {
        (RequestStatus::Pending, 0)
    };

    Ok(Admission {
        request: ParticipationRequest::new(requester_id, event.id, status),
        event_version: event.version,
        seats_claimed,
    })
}

/// Resolve `batch` against the remaining capacity of `event`.
///
/// `pending` is every request of the event that is currently pending; the
/// ones outside the batch are rejected when the batch fills the event.
/// The batch is admitted in ascending `created` order, keeping the caller's
/// order for equal timestamps.
pub fn plan_resolution(
    event: &Event,
    batch: Vec<ParticipationRequest>,
    pending: Vec<ParticipationRequest>,
    target: ResolutionTarget,
) -> Result<ResolutionPlan> {
    let mut seen = HashSet::new();
    let mut batch: Vec<ParticipationRequest> = batch
        .into_iter()
        .filter(|request| seen.insert(request.id))
        .collect();

    if let Some(stale) = batch
        .iter()
        .find(|r| r.event_id != event.id || r.status != RequestStatus::Pending)
    {
        return Err(AppError::not_allowed(format!(
            "Request {} is not pending",
            stale.id
        )));
    }

    batch.sort_by_key(|request| request.created);

    let mut plan = ResolutionPlan {
        event_id: event.id,
        event_version: event.version,
        seats_claimed: 0,
        confirmed: Vec::new(),
        rejected: Vec::new(),
    };

    if target == ResolutionTarget::Rejected {
        plan.rejected = with_status(batch, RequestStatus::Rejected);
        return Ok(plan);
    }

    let available = match event.available_seats() {
        Some(available) if !event.auto_confirms() => available,
        _ => {
            plan.seats_claimed = batch.len() as i64;
            plan.confirmed = with_status(batch, RequestStatus::Confirmed);
            return Ok(plan);
        }
    };

    if available <= 0 {
        return Err(AppError::not_allowed("Participant limit reached"));
    }

    let admitted = batch.len().min(available as usize);
    let overflow = batch.split_off(admitted);

    plan.seats_claimed = batch.len() as i64;
    plan.confirmed = with_status(batch, RequestStatus::Confirmed);

    if plan.seats_claimed == available {
        plan.rejected = with_status(overflow, RequestStatus::Rejected);

        let resolved: HashSet<Uuid> = seen;
        let cascade = pending
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending && !resolved.contains(&r.id));
        plan.rejected.extend(with_status(cascade, RequestStatus::Rejected));
    }

    Ok(plan)
}

fn with_status(
    requests: impl IntoIterator<Item = ParticipationRequest>,
    status: RequestStatus,
) -> Vec<ParticipationRequest> {
    requests
        .into_iter()
        .map(|mut request| {
            request.status = status;
            request
        })
        .collect()
}
