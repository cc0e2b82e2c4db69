use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::{
    domain::{
        admission::{Admission, ResolutionPlan},
        ParticipationRequest, RequestStatus,
    },
    error::{AppError, Result},
    repository::RequestRepository,
};

#[derive(FromRow)]
struct RequestRow {
    id: String,
    requester_id: String,
    event_id: String,
    status: String,
    created: NaiveDateTime,
}

pub struct SqliteRequestRepository {
    pool: SqlitePool,
}

impl SqliteRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_request(row: RequestRow) -> Result<ParticipationRequest> {
        let parse_id = |s: &str| Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()));

        Ok(ParticipationRequest {
            id: parse_id(&row.id)?,
            requester_id: parse_id(&row.requester_id)?,
            event_id: parse_id(&row.event_id)?,
            status: RequestStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid request status: {}", row.status)))?,
            created: DateTime::from_naive_utc_and_offset(row.created, Utc),
        })
    }

    /// Bump the confirmed counter and the event version, failing if another
    /// writer got there first.
    async fn claim_seats(
        tx: &mut Transaction<'_, Sqlite>,
        event_id: Uuid,
        expected_version: i64,
        seats: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET confirmed_count = confirmed_count + ?, version = version + 1
            WHERE id = ? AND version = ?
            "#
        )
        .bind(seats)
        .bind(event_id.to_string())
        .bind(expected_version)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Event {} was modified concurrently",
                event_id
            )));
        }

        Ok(())
    }

    async fn set_status_from_pending(
        tx: &mut Transaction<'_, Sqlite>,
        request: &ParticipationRequest,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE participation_requests SET status = ? WHERE id = ? AND status = 'Pending'"
        )
        .bind(request.status.as_str())
        .bind(request.id.to_string())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Request {} is no longer pending",
                request.id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RequestRepository for SqliteRequestRepository {
    async fn create(&self, admission: Admission) -> Result<ParticipationRequest> {
        let mut tx = self.pool.begin().await?;
        let request = admission.request();

        // Pending inserts bump the version too, so a resolution planned
        // before this request existed cannot commit its cascade.
        Self::claim_seats(
            &mut tx,
            request.event_id,
            admission.event_version(),
            admission.seats_claimed(),
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO participation_requests (id, requester_id, event_id, status, created)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(request.id.to_string())
        .bind(request.requester_id.to_string())
        .bind(request.event_id.to_string())
        .bind(request.status.as_str())
        .bind(request.created.naive_utc())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(admission.into_request())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ParticipationRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(
            "SELECT id, requester_id, event_id, status, created FROM participation_requests WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_request).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ParticipationRequest>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, requester_id, event_id, status, created FROM participation_requests WHERE id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let request = Self::row_to_request(row)?;
            by_id.insert(request.id, request);
        }

        // Caller order, one entry per id that exists.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_pending_by_event(&self, event_id: Uuid) -> Result<Vec<ParticipationRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, requester_id, event_id, status, created
            FROM participation_requests
            WHERE event_id = ? AND status = 'Pending'
            ORDER BY created ASC
            "#
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_request)
            .collect()
    }

    async fn find_active(&self, requester_id: Uuid, event_id: Uuid) -> Result<Option<ParticipationRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, requester_id, event_id, status, created
            FROM participation_requests
            WHERE requester_id = ? AND event_id = ? AND status IN ('Pending', 'Confirmed')
            "#
        )
        .bind(requester_id.to_string())
        .bind(event_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_request).transpose()
    }

    async fn list_by_requester(&self, requester_id: Uuid) -> Result<Vec<ParticipationRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, requester_id, event_id, status, created
            FROM participation_requests
            WHERE requester_id = ?
            ORDER BY created DESC
            "#
        )
        .bind(requester_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_request)
            .collect()
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<ParticipationRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, requester_id, event_id, status, created
            FROM participation_requests
            WHERE event_id = ?
            ORDER BY created ASC
            "#
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_request)
            .collect()
    }

    async fn apply_resolution(&self, plan: &ResolutionPlan) -> Result<()> {
        // Dropping the transaction on an early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        if plan.seats_claimed() > 0 {
            Self::claim_seats(&mut tx, plan.event_id(), plan.event_version(), plan.seats_claimed())
                .await?;
        }

        for request in plan.confirmed().iter().chain(plan.rejected()) {
            Self::set_status_from_pending(&mut tx, request).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn cancel(&self, id: Uuid) -> Result<ParticipationRequest> {
        let result = sqlx::query(
            r#"
            UPDATE participation_requests
            SET status = 'Canceled'
            WHERE id = ? AND status IN ('Pending', 'Confirmed')
            "#
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("Request {} is no longer active", id)));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve canceled request".to_string())
        })
    }
}
