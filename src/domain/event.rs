use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: Location,
    pub paid: bool,
    pub participant_limit: i64,
    pub request_moderation: bool,
    pub state: EventState,
    pub confirmed_count: i64,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub version: i64,
}

impl Event {
    /// Requests against this event are confirmed without organizer review.
    pub fn auto_confirms(&self) -> bool {
        self.participant_limit == 0 || !self.request_moderation
    }

    /// Seats still free, or `None` when the event has no limit.
    pub fn available_seats(&self) -> Option<i64> {
        if self.participant_limit == 0 {
            None
        } else {
            Some(self.participant_limit - self.confirmed_count)
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self.available_seats(), Some(n) if n <= 0)
    }

    pub fn is_published(&self) -> bool {
        self.state == EventState::Published
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    /// Awaiting moderation.
    Draft,
    Published,
    /// Canceled by the organizer or rejected by an admin.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateAction {
    SendToReview,
    CancelReview,
    PublishEvent,
    RejectEvent,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Draft => "Draft",
            EventState::Published => "Published",
            EventState::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(EventState::Draft),
            "Published" => Some(EventState::Published),
            "Rejected" => Some(EventState::Rejected),
            _ => None,
        }
    }

    /// Content may only change before publication.
    pub fn is_editable(&self) -> bool {
        !matches!(self, EventState::Published)
    }

    pub fn apply(self, action: StateAction) -> Result<EventState> {
        use EventState::*;
        use StateAction::*;

        match (self, action) {
            (Published, _) => Err(AppError::not_allowed(
                "Published events cannot change state",
            )),
            (Draft | Rejected, SendToReview) => Ok(Draft),
            (Draft | Rejected, CancelReview) => Ok(Rejected),
            (Draft, PublishEvent) => Ok(Published),
            (Draft, RejectEvent) => Ok(Rejected),
            (Rejected, PublishEvent | RejectEvent) => Err(AppError::not_allowed(format!(
                "Event must be in Draft state to {}, current state is {}",
                action.verb(),
                self.as_str()
            ))),
        }
    }
}

impl StateAction {
    fn verb(&self) -> &'static str {
        match self {
            StateAction::SendToReview => "send to review",
            StateAction::CancelReview => "cancel",
            StateAction::PublishEvent => "publish",
            StateAction::RejectEvent => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub category_id: Uuid,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub participant_limit: i64,
    #[serde(default = "default_moderation")]
    pub request_moderation: bool,
}

fn default_moderation() -> bool {
    true
}

/// Partial update of an event's content. `None` leaves a field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventContentPatch {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub annotation: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i64>,
    pub request_moderation: Option<bool>,
}

impl EventContentPatch {
    pub fn apply_to(self, event: &mut Event) {
        if let Some(category_id) = self.category_id {
            event.category_id = category_id;
        }
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(annotation) = self.annotation {
            event.annotation = annotation;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(event_date) = self.event_date {
            event.event_date = event_date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(paid) = self.paid {
            event.paid = paid;
        }
        if let Some(limit) = self.participant_limit {
            event.participant_limit = limit;
        }
        if let Some(moderation) = self.request_moderation {
            event.request_moderation = moderation;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrganizerEventPatch {
    #[serde(flatten)]
    pub content: EventContentPatch,
    pub state_action: Option<OrganizerStateAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminEventPatch {
    #[serde(flatten)]
    pub content: EventContentPatch,
    pub state_action: Option<AdminStateAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizerStateAction {
    SendToReview,
    CancelReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

impl From<OrganizerStateAction> for StateAction {
    fn from(action: OrganizerStateAction) -> Self {
        match action {
            OrganizerStateAction::SendToReview => StateAction::SendToReview,
            OrganizerStateAction::CancelReview => StateAction::CancelReview,
        }
    }
}

impl From<AdminStateAction> for StateAction {
    fn from(action: AdminStateAction) -> Self {
        match action {
            AdminStateAction::PublishEvent => StateAction::PublishEvent,
            AdminStateAction::RejectEvent => StateAction::RejectEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_transitions() {
        use StateAction::*;

        let cases = [
            (PublishEvent, EventState::Published),
            (RejectEvent, EventState::Rejected),
            (SendToReview, EventState::Draft),
            (CancelReview, EventState::Rejected),
        ];
        for (action, expected) in cases {
            assert_eq!(EventState::Draft.apply(action).unwrap(), expected);
        }
    }

    #[test]
    fn test_rejected_can_be_resubmitted_but_not_moderated() {
        let resubmitted = EventState::Rejected.apply(StateAction::SendToReview).unwrap();
        assert_eq!(resubmitted, EventState::Draft);
        assert!(matches!(
            EventState::Rejected.apply(StateAction::PublishEvent),
            Err(AppError::NotAllowed(_))
        ));
        assert!(matches!(
            EventState::Rejected.apply(StateAction::RejectEvent),
            Err(AppError::NotAllowed(_))
        ));
    }

    #[test]
    fn test_published_is_terminal() {
        for action in [
            StateAction::SendToReview,
            StateAction::CancelReview,
            StateAction::PublishEvent,
            StateAction::RejectEvent,
        ] {
            assert!(matches!(
                EventState::Published.apply(action),
                Err(AppError::NotAllowed(_))
            ));
        }
        assert!(!EventState::Published.is_editable());
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in [EventState::Draft, EventState::Published, EventState::Rejected] {
            assert_eq!(EventState::parse(state.as_str()), Some(state));
        }
        assert_eq!(EventState::parse("PENDING"), None);
    }

    #[test]
    fn test_patch_only_overwrites_supplied_fields() {
        let mut event = crate::domain::test_support::event(5, true);
        let original_title = event.title.clone();

        EventContentPatch {
            paid: Some(true),
            participant_limit: Some(10),
            ..Default::default()
        }
        .apply_to(&mut event);

        assert!(event.paid);
        assert_eq!(event.participant_limit, 10);
        assert_eq!(event.title, original_title);
        assert!(event.request_moderation);
    }

    #[test]
    fn test_capacity_helpers() {
        let mut event = crate::domain::test_support::event(2, true);
        assert_eq!(event.available_seats(), Some(2));
        assert!(!event.auto_confirms());

        event.confirmed_count = 2;
        assert!(event.is_full());

        event.participant_limit = 0;
        assert_eq!(event.available_seats(), None);
        assert!(!event.is_full());
        assert!(event.auto_confirms());
    }
}
