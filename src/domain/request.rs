use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub event_id: Uuid,
    pub status: RequestStatus,
    pub created: DateTime<Utc>,
}

impl ParticipationRequest {
    pub fn new(requester_id: Uuid, event_id: Uuid, status: RequestStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester_id,
            event_id,
            status,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Confirmed => "Confirmed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Canceled => "Canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RequestStatus::Pending),
            "Confirmed" => Some(RequestStatus::Confirmed),
            "Rejected" => Some(RequestStatus::Rejected),
            "Canceled" => Some(RequestStatus::Canceled),
            _ => None,
        }
    }

    /// Pending and confirmed requests hold (or wait for) a seat.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Rejected) | (Pending, Canceled) | (Confirmed, Canceled)
        )
    }
}

/// Outcome an organizer asks for when resolving pending requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionTarget {
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolutionResult {
    pub confirmed: Vec<ParticipationRequest>,
    pub rejected: Vec<ParticipationRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Confirmed));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Canceled));
        assert!(RequestStatus::Confirmed.can_transition_to(RequestStatus::Canceled));

        assert!(!RequestStatus::Confirmed.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Rejected.can_transition_to(RequestStatus::Confirmed));
        assert!(!RequestStatus::Canceled.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn test_active_statuses() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Confirmed.is_active());
        assert!(!RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Canceled.is_active());
    }
}
