//! `SQLite` implementation of [`AutomationRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use driphub_app::ports::AutomationRepository;
use driphub_domain::automation::{ActionStep, AutomationDefinition, Condition, Trigger};
use driphub_domain::error::DripHubError;
use driphub_domain::event::Topic;
use driphub_domain::id::{AutomationId, MerchantId};

use crate::error::StorageError;

struct Wrapper(AutomationDefinition);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationDefinition> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let merchant_id: uuid::Uuid = row.try_get("merchant_id")?;
        let name: String = row.try_get("name")?;
        let enabled: bool = row.try_get("enabled")?;
        let trigger_json: String = row.try_get("trigger_data")?;
        let conditions_json: String = row.try_get("conditions")?;
        let steps_json: String = row.try_get("steps")?;
        let created_at_str: String = row.try_get("created_at")?;

        let trigger: Trigger = serde_json::from_str(&trigger_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let conditions: Vec<Condition> = serde_json::from_str(&conditions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let steps: Vec<ActionStep> = serde_json::from_str(&steps_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(AutomationDefinition {
            id: AutomationId::from_uuid(id),
            merchant_id: MerchantId::from_uuid(merchant_id),
            name,
            enabled,
            trigger,
            conditions,
            steps,
            created_at,
        }))
    }
}

/// The denormalized trigger columns used by the matching lookup.
fn trigger_columns(trigger: &Trigger) -> (Option<&'static str>, Option<&str>) {
    match trigger {
        Trigger::EventType { topic, event_type } => {
            (Some(topic.as_str()), Some(event_type.as_str()))
        }
        Trigger::Manual => (None, None),
    }
}

const INSERT: &str = r"
    INSERT INTO automations
        (id, merchant_id, name, enabled, trigger_topic, trigger_type,
         trigger_data, conditions, steps, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE automations
    SET name = ?, enabled = ?, trigger_topic = ?, trigger_type = ?,
        trigger_data = ?, conditions = ?, steps = ?
    WHERE id = ?
";

const SELECT_MATCHING: &str = r"
    SELECT * FROM automations
    WHERE merchant_id = ? AND enabled = 1
      AND trigger_topic = ? AND trigger_type = ?
    ORDER BY name
";

/// `SQLite`-backed automation repository.
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(
        &self,
        automation: AutomationDefinition,
    ) -> Result<AutomationDefinition, DripHubError> {
        let trigger_json =
            serde_json::to_string(&automation.trigger).map_err(StorageError::from)?;
        let conditions_json =
            serde_json::to_string(&automation.conditions).map_err(StorageError::from)?;
        let steps_json = serde_json::to_string(&automation.steps).map_err(StorageError::from)?;
        let (trigger_topic, trigger_type) = trigger_columns(&automation.trigger);

        sqlx::query(INSERT)
            .bind(automation.id.as_uuid())
            .bind(automation.merchant_id.as_uuid())
            .bind(&automation.name)
            .bind(automation.enabled)
            .bind(trigger_topic)
            .bind(trigger_type)
            .bind(&trigger_json)
            .bind(&conditions_json)
            .bind(&steps_json)
            .bind(automation.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn get_by_id(
        &self,
        id: AutomationId,
    ) -> Result<Option<AutomationDefinition>, DripHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automations WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<AutomationDefinition>, DripHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM automations ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_matching(
        &self,
        merchant_id: MerchantId,
        topic: Topic,
        event_type: &str,
    ) -> Result<Vec<AutomationDefinition>, DripHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_MATCHING)
            .bind(merchant_id.as_uuid())
            .bind(topic.as_str())
            .bind(event_type)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(
        &self,
        automation: AutomationDefinition,
    ) -> Result<AutomationDefinition, DripHubError> {
        let trigger_json =
            serde_json::to_string(&automation.trigger).map_err(StorageError::from)?;
        let conditions_json =
            serde_json::to_string(&automation.conditions).map_err(StorageError::from)?;
        let steps_json = serde_json::to_string(&automation.steps).map_err(StorageError::from)?;
        let (trigger_topic, trigger_type) = trigger_columns(&automation.trigger);

        sqlx::query(UPDATE)
            .bind(&automation.name)
            .bind(automation.enabled)
            .bind(trigger_topic)
            .bind(trigger_type)
            .bind(&trigger_json)
            .bind(&conditions_json)
            .bind(&steps_json)
            .bind(automation.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn delete(&self, id: AutomationId) -> Result<(), DripHubError> {
        sqlx::query("DELETE FROM automations WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
