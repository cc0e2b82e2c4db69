use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    domain::Event,
    error::{AppError, Result},
};

/// Fails unless `date` is at least `lead` after `now`.
pub fn ensure_lead_time(date: DateTime<Utc>, now: DateTime<Utc>, lead: Duration, field: &str) -> Result<()> {
    if date < now + lead {
        return Err(AppError::not_allowed(format!(
            "{} must be at least {} minutes in the future, got {}",
            field,
            lead.num_minutes(),
            date.to_rfc3339()
        )));
    }
    Ok(())
}

pub fn ensure_organizer(event: &Event, user_id: Uuid) -> Result<()> {
    if event.organizer_id != user_id {
        return Err(AppError::not_allowed(
            "Only the organizer may manage this event",
        ));
    }
    Ok(())
}
