//! `SQLite` implementation of [`ActionStore`].
//!
//! Idempotent enqueueing relies on the `UNIQUE (event_id, automation_id,
//! step_index)` constraint, and claiming is a single `UPDATE ... RETURNING`
//! statement so concurrent sweepers never hand out the same row twice.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use driphub_app::ports::ActionStore;
use driphub_domain::automation::ActionKind;
use driphub_domain::error::DripHubError;
use driphub_domain::id::{ActionId, AutomationId, EventId, MerchantId, UserId};
use driphub_domain::schedule::{ActionStatus, ScheduledAction};
use driphub_domain::time::Timestamp;

use crate::error::StorageError;

struct Wrapper(ScheduledAction);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ScheduledAction> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let automation_id: uuid::Uuid = row.try_get("automation_id")?;
        let event_id: uuid::Uuid = row.try_get("event_id")?;
        let merchant_id: uuid::Uuid = row.try_get("merchant_id")?;
        let user_id: String = row.try_get("user_id")?;
        let step_index: u32 = row.try_get("step_index")?;
        let kind_json: String = row.try_get("kind")?;
        let data_json: String = row.try_get("data")?;
        let fire_at_str: String = row.try_get("fire_at")?;
        let status_str: String = row.try_get("status")?;
        let attempt_count: u32 = row.try_get("attempt_count")?;
        let last_error: Option<String> = row.try_get("last_error")?;
        let claimed_at_str: Option<String> = row.try_get("claimed_at")?;
        let created_at_str: String = row.try_get("created_at")?;

        let user_id = UserId::new(user_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let kind: ActionKind =
            serde_json::from_str(&kind_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let data: serde_json::Value =
            serde_json::from_str(&data_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status: ActionStatus = status_str
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let fire_at = chrono::DateTime::parse_from_rfc3339(&fire_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let claimed_at = claimed_at_str
            .map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|ts| ts.to_utc()))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(ScheduledAction {
            id: ActionId::from_uuid(id),
            automation_id: AutomationId::from_uuid(automation_id),
            event_id: EventId::from_uuid(event_id),
            merchant_id: MerchantId::from_uuid(merchant_id),
            user_id,
            step_index,
            kind,
            data,
            fire_at,
            status,
            attempt_count,
            last_error,
            claimed_at,
            created_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT OR IGNORE INTO scheduled_actions
        (id, automation_id, event_id, merchant_id, user_id, step_index, kind,
         data, fire_at, status, attempt_count, last_error, claimed_at, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

// Runnable rows are due pending ones plus claims older than the stale
// boundary. SQLite serializes writers, so the inner SELECT and the UPDATE
// act as one atomic claim.
const CLAIM: &str = r"
    UPDATE scheduled_actions
    SET status = 'claimed', claimed_at = ?, attempt_count = attempt_count + 1
    WHERE id IN (
        SELECT id FROM scheduled_actions
        WHERE (status = 'pending' AND fire_at <= ?)
           OR (status = 'claimed' AND claimed_at <= ?)
        ORDER BY fire_at
        LIMIT ?
    )
    RETURNING *
";

// Terminal transitions apply only while the row is still claimed, so a
// worker that lost its claim to a timeout cannot overwrite the outcome
// of whoever reclaimed it.
const MARK_FIRED: &str = r"
    UPDATE scheduled_actions
    SET status = 'fired'
    WHERE id = ? AND status = 'claimed'
";

const MARK_FAILED: &str = r"
    UPDATE scheduled_actions
    SET status = 'failed', last_error = ?
    WHERE id = ? AND status = 'claimed'
";

const RESCHEDULE: &str = r"
    UPDATE scheduled_actions
    SET status = 'pending', fire_at = ?, last_error = ?, claimed_at = NULL
    WHERE id = ? AND status = 'claimed'
";

const CANCEL: &str = r"
    UPDATE scheduled_actions
    SET status = 'cancelled'
    WHERE automation_id = ? AND user_id = ? AND status = 'pending'
";

const LIST: &str = r"
    SELECT * FROM scheduled_actions
    WHERE status = ?
    ORDER BY created_at DESC
    LIMIT ?
";

const LIST_ALL: &str = r"
    SELECT * FROM scheduled_actions
    ORDER BY created_at DESC
    LIMIT ?
";

/// `SQLite`-backed durable action queue.
pub struct SqliteActionStore {
    pool: SqlitePool,
}

impl SqliteActionStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ActionStore for SqliteActionStore {
    async fn enqueue(&self, actions: Vec<ScheduledAction>) -> Result<u32, DripHubError> {
        let mut inserted = 0;
        for action in &actions {
            let kind_json = serde_json::to_string(&action.kind).map_err(StorageError::from)?;
            let data_json = serde_json::to_string(&action.data).map_err(StorageError::from)?;
            let result = sqlx::query(INSERT)
                .bind(action.id.as_uuid())
                .bind(action.automation_id.as_uuid())
                .bind(action.event_id.as_uuid())
                .bind(action.merchant_id.as_uuid())
                .bind(action.user_id.as_str())
                .bind(action.step_index)
                .bind(&kind_json)
                .bind(&data_json)
                .bind(action.fire_at.to_rfc3339())
                .bind(action.status.as_str())
                .bind(action.attempt_count)
                .bind(action.last_error.as_deref())
                .bind(action.claimed_at.map(|ts| ts.to_rfc3339()))
                .bind(action.created_at.to_rfc3339())
                .execute(&self.pool)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn claim_due(
        &self,
        now: Timestamp,
        claim_timeout: chrono::Duration,
        limit: u32,
    ) -> Result<Vec<ScheduledAction>, DripHubError> {
        let stale_boundary = (now - claim_timeout).to_rfc3339();
        let rows: Vec<Wrapper> = sqlx::query_as(CLAIM)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(stale_boundary)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn mark_fired(&self, id: ActionId) -> Result<bool, DripHubError> {
        let result = sqlx::query(MARK_FIRED)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, id: ActionId, error: &str) -> Result<bool, DripHubError> {
        let result = sqlx::query(MARK_FAILED)
            .bind(error)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reschedule(
        &self,
        id: ActionId,
        fire_at: Timestamp,
        error: &str,
    ) -> Result<bool, DripHubError> {
        let result = sqlx::query(RESCHEDULE)
            .bind(fire_at.to_rfc3339())
            .bind(error)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn cancel_pending(
        &self,
        automation_id: AutomationId,
        user_id: &UserId,
    ) -> Result<u32, DripHubError> {
        let result = sqlx::query(CANCEL)
            .bind(automation_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        #[allow(clippy::cast_possible_truncation)]
        Ok(result.rows_affected() as u32)
    }

    async fn get_by_id(&self, id: ActionId) -> Result<Option<ScheduledAction>, DripHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM scheduled_actions WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list(
        &self,
        status: Option<ActionStatus>,
        limit: u32,
    ) -> Result<Vec<ScheduledAction>, DripHubError> {
        let rows: Vec<Wrapper> = match status {
            Some(status) => {
                sqlx::query_as(LIST)
                    .bind(status.as_str())
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as(LIST_ALL)
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
