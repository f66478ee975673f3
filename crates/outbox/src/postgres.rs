//! PostgreSQL-backed outbox store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::EventId;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{OutboxError, Result};
use crate::log::{EventLogState, IntegrationEventLog};
use crate::store::{OutboxStore, TransactionToken};

/// PostgreSQL implementation of [`OutboxStore`].
///
/// Explicit transactions opened through [`begin`](OutboxStore::begin) are
/// held in a token-keyed side table until the matching commit or rollback;
/// inserts carrying a token execute on that open transaction, which is how
/// outbox rows land atomically with the business change.
#[derive(Clone)]
pub struct PostgresOutboxStore {
    pool: PgPool,
    transactions: Arc<Mutex<HashMap<TransactionToken, Transaction<'static, Postgres>>>>,
}

impl PostgresOutboxStore {
    /// Creates a new store on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            transactions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_log(row: PgRow) -> Result<IntegrationEventLog> {
        let id = EventId::from_uuid(row.try_get::<Uuid, _>("id")?);
        let state_value: i32 = row.try_get("state")?;
        let state = EventLogState::from_i32(state_value).ok_or(OutboxError::UnknownState {
            id,
            value: state_value,
        })?;

        Ok(IntegrationEventLog::from_columns(
            id,
            row.try_get("event_name")?,
            row.try_get("event_type_name")?,
            row.try_get("identifier")?,
            row.try_get("content")?,
            row.try_get("create_time")?,
            row.try_get("sequence")?,
            row.try_get("last_update_time")?,
            row.try_get("times_sent")?,
            state,
            row.try_get("error")?,
        ))
    }
}

const SELECT_COLUMNS: &str = "id, event_name, event_type_name, identifier, content, \
     create_time, sequence, last_update_time, times_sent, state, error";

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn begin(&self) -> Result<TransactionToken> {
        let tx = self.pool.begin().await?;
        let token = TransactionToken::new();
        self.transactions.lock().await.insert(token, tx);
        tracing::debug!(token = %token, "opened outbox transaction");
        Ok(token)
    }

    async fn commit(&self, token: TransactionToken) -> Result<()> {
        let tx = self
            .transactions
            .lock()
            .await
            .remove(&token)
            .ok_or(OutboxError::UnknownTransaction(token))?;
        tx.commit().await?;
        tracing::debug!(token = %token, "committed outbox transaction");
        Ok(())
    }

    async fn rollback(&self, token: TransactionToken) -> Result<()> {
        let tx = self
            .transactions
            .lock()
            .await
            .remove(&token)
            .ok_or(OutboxError::UnknownTransaction(token))?;
        tx.rollback().await?;
        tracing::debug!(token = %token, "rolled back outbox transaction");
        Ok(())
    }

    async fn insert(
        &self,
        log: &IntegrationEventLog,
        token: Option<TransactionToken>,
    ) -> Result<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO integration_event_log
                (id, event_name, event_type_name, identifier, content,
                 create_time, sequence, last_update_time, times_sent, state, error)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(log.id().as_uuid())
        .bind(log.event_name())
        .bind(log.event_type_name())
        .bind(log.identifier())
        .bind(log.content())
        .bind(log.create_time())
        .bind(log.sequence())
        .bind(log.last_update_time())
        .bind(log.times_sent())
        .bind(log.state().as_i32())
        .bind(log.error());

        let result = match token {
            Some(token) => {
                let mut transactions = self.transactions.lock().await;
                let tx = transactions
                    .get_mut(&token)
                    .ok_or(OutboxError::UnknownTransaction(token))?;
                query.execute(&mut **tx).await
            }
            None => query.execute(&self.pool).await,
        };

        result.map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return OutboxError::DuplicateEvent(log.id());
            }
            OutboxError::Database(e)
        })?;
        tracing::debug!(
            event_id = %log.id(),
            event_name = %log.event_name(),
            "captured outbox row"
        );
        Ok(())
    }

    async fn find(&self, id: EventId) -> Result<Option<IntegrationEventLog>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM integration_event_log WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_log).transpose()
    }

    async fn update(&self, log: &IntegrationEventLog) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE integration_event_log
            SET state = $2, times_sent = $3, last_update_time = $4, error = $5
            WHERE id = $1
            "#,
        )
        .bind(log.id().as_uuid())
        .bind(log.state().as_i32())
        .bind(log.times_sent())
        .bind(log.last_update_time())
        .bind(log.error())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::NotFound(log.id()));
        }
        tracing::debug!(
            event_id = %log.id(),
            state = %log.state(),
            times_sent = log.times_sent(),
            "updated outbox row"
        );
        Ok(())
    }

    async fn list_undelivered(&self, limit: i64) -> Result<Vec<IntegrationEventLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM integration_event_log \
             WHERE state <> $1 ORDER BY create_time, sequence LIMIT $2"
        ))
        .bind(EventLogState::Published.as_i32())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_log).collect()
    }
}
