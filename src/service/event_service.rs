use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::EventRules,
    domain::*,
    error::{AppError, Result},
    repository::{CategoryRepository, EventRepository, UserRepository},
    service::{
        event_locks::EventLocks,
        validation::{ensure_lead_time, ensure_organizer},
    },
};

/// Event creation, editing and moderation.
pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
    user_repo: Arc<dyn UserRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    locks: Arc<EventLocks>,
    rules: EventRules,
}

impl EventService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        user_repo: Arc<dyn UserRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        locks: Arc<EventLocks>,
        rules: EventRules,
    ) -> Self {
        Self { event_repo, user_repo, category_repo, locks, rules }
    }

    pub fn rules(&self) -> EventRules {
        self.rules
    }

    pub async fn create_event(&self, organizer_id: Uuid, new_event: NewEvent) -> Result<Event> {
        self.require_user(organizer_id).await?;
        self.require_category(new_event.category_id).await?;
        ensure_limit(new_event.participant_limit)?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id,
            category_id: new_event.category_id,
            title: new_event.title,
            annotation: new_event.annotation,
            description: new_event.description,
            event_date: new_event.event_date,
            location: new_event.location,
            paid: new_event.paid,
            participant_limit: new_event.participant_limit,
            request_moderation: new_event.request_moderation,
            state: EventState::Draft,
            confirmed_count: 0,
            created_on: now,
            published_on: None,
            version: 0,
        };

        let event = self.event_repo.create(event).await?;
        tracing::info!(event_id = %event.id, organizer_id = %organizer_id, "Event created");

        Ok(event)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.event_repo.find_by_id(event_id).await?
            .ok_or_else(|| AppError::not_found(format!("Event {} not found", event_id)))
    }

    /// Public view of an event: unpublished events do not exist for outsiders.
    pub async fn get_published(&self, event_id: Uuid) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        if !event.is_published() {
            return Err(AppError::not_found(format!("Event {} not found", event_id)));
        }
        Ok(event)
    }

    pub async fn get_for_organizer(&self, organizer_id: Uuid, event_id: Uuid) -> Result<Event> {
        self.require_user(organizer_id).await?;
        let event = self.get_event(event_id).await?;
        ensure_organizer(&event, organizer_id)?;
        Ok(event)
    }

    pub async fn list_by_organizer(&self, organizer_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Event>> {
        self.require_user(organizer_id).await?;
        self.event_repo.list_by_organizer(organizer_id, limit, offset).await
    }

    pub async fn edit_by_organizer(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
        patch: OrganizerEventPatch,
    ) -> Result<Event> {
        self.require_user(organizer_id).await?;

        let _guard = self.locks.acquire(event_id).await;
        let mut event = self.get_event(event_id).await?;
        ensure_organizer(&event, organizer_id)?;

        if !event.state.is_editable() {
            return Err(AppError::not_allowed(
                "Only draft or rejected events can be changed",
            ));
        }

        if let Some(category_id) = patch.content.category_id {
            self.require_category(category_id).await?;
        }
        if let Some(limit) = patch.content.participant_limit {
            ensure_limit(limit)?;
        }

        patch.content.apply_to(&mut event);

        if let Some(action) = patch.state_action {
            let previous = event.state;
            event.state = event.state.apply(action.into())?;
            tracing::info!(
                event_id = %event_id,
                from = previous.as_str(),
                to = event.state.as_str(),
                "Organizer changed event state"
            );
        }

        self.event_repo.update(event).await
    }

    pub async fn edit_by_admin(&self, event_id: Uuid, patch: AdminEventPatch) -> Result<Event> {
        let _guard = self.locks.acquire(event_id).await;
        let mut event = self.get_event(event_id).await?;

        if !event.state.is_editable() {
            return Err(AppError::not_allowed("Published events cannot be changed"));
        }

        let now = Utc::now();
        if let Some(event_date) = patch.content.event_date {
            ensure_lead_time(event_date, now, self.rules.admin_lead(), "eventDate")?;
        }
        if let Some(category_id) = patch.content.category_id {
            self.require_category(category_id).await?;
        }
        if let Some(limit) = patch.content.participant_limit {
            ensure_limit(limit)?;
        }

        patch.content.apply_to(&mut event);

        if let Some(action) = patch.state_action {
            let next = event.state.apply(action.into())?;
            if next == EventState::Published {
                ensure_lead_time(event.event_date, now, self.rules.admin_lead(), "eventDate")?;
                event.published_on = Some(now);
            }
            tracing::info!(
                event_id = %event_id,
                from = event.state.as_str(),
                to = next.as_str(),
                "Admin moderated event"
            );
            event.state = next;
        }

        self.event_repo.update(event).await
    }

    pub async fn publish(&self, event_id: Uuid) -> Result<Event> {
        self.edit_by_admin(event_id, AdminEventPatch {
            state_action: Some(AdminStateAction::PublishEvent),
            ..Default::default()
        })
        .await
    }

    pub async fn reject(&self, event_id: Uuid) -> Result<Event> {
        self.edit_by_admin(event_id, AdminEventPatch {
            state_action: Some(AdminStateAction::RejectEvent),
            ..Default::default()
        })
        .await
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.user_repo.find_by_id(user_id).await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))
    }

    async fn require_category(&self, category_id: Uuid) -> Result<Category> {
        self.category_repo.find_by_id(category_id).await?
            .ok_or_else(|| AppError::not_found(format!("Category {} not found", category_id)))
    }
}

fn ensure_limit(limit: i64) -> Result<()> {
    if limit < 0 {
        return Err(AppError::BadRequest(
            "participantLimit must not be negative".to_string(),
        ));
    }
    Ok(())
}
