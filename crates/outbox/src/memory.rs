//! In-memory outbox store for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::EventId;
use tokio::sync::RwLock;

use crate::error::{OutboxError, Result};
use crate::log::{EventLogState, IntegrationEventLog};
use crate::store::{OutboxStore, TransactionToken};

/// In-memory implementation of [`OutboxStore`].
///
/// Mirrors the PostgreSQL store's contract, including duplicate-id
/// rejection and explicit-transaction staging: rows inserted under a token
/// stay invisible until the token commits, and are discarded when it rolls
/// back.
#[derive(Clone, Default)]
pub struct InMemoryOutboxStore {
    rows: Arc<RwLock<HashMap<EventId, IntegrationEventLog>>>,
    staged: Arc<RwLock<HashMap<TransactionToken, Vec<IntegrationEventLog>>>>,
}

impl InMemoryOutboxStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed rows.
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Number of explicit transactions currently open.
    pub async fn open_transactions(&self) -> usize {
        self.staged.read().await.len()
    }

    /// Clears all rows and staged transactions.
    pub async fn clear(&self) {
        self.rows.write().await.clear();
        self.staged.write().await.clear();
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn begin(&self) -> Result<TransactionToken> {
        let token = TransactionToken::new();
        self.staged.write().await.insert(token, Vec::new());
        Ok(token)
    }

    async fn commit(&self, token: TransactionToken) -> Result<()> {
        let batch = self
            .staged
            .write()
            .await
            .remove(&token)
            .ok_or(OutboxError::UnknownTransaction(token))?;

        let mut rows = self.rows.write().await;
        for log in &batch {
            if rows.contains_key(&log.id()) {
                return Err(OutboxError::DuplicateEvent(log.id()));
            }
        }
        for log in batch {
            rows.insert(log.id(), log);
        }
        Ok(())
    }

    async fn rollback(&self, token: TransactionToken) -> Result<()> {
        self.staged
            .write()
            .await
            .remove(&token)
            .ok_or(OutboxError::UnknownTransaction(token))?;
        Ok(())
    }

    async fn insert(
        &self,
        log: &IntegrationEventLog,
        token: Option<TransactionToken>,
    ) -> Result<()> {
        match token {
            Some(token) => {
                if self.rows.read().await.contains_key(&log.id()) {
                    return Err(OutboxError::DuplicateEvent(log.id()));
                }
                let mut staged = self.staged.write().await;
                let batch = staged
                    .get_mut(&token)
                    .ok_or(OutboxError::UnknownTransaction(token))?;
                if batch.iter().any(|l| l.id() == log.id()) {
                    return Err(OutboxError::DuplicateEvent(log.id()));
                }
                batch.push(log.clone());
            }
            None => {
                let mut rows = self.rows.write().await;
                if rows.contains_key(&log.id()) {
                    return Err(OutboxError::DuplicateEvent(log.id()));
                }
                rows.insert(log.id(), log.clone());
            }
        }
        Ok(())
    }

    async fn find(&self, id: EventId) -> Result<Option<IntegrationEventLog>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update(&self, log: &IntegrationEventLog) -> Result<()> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&log.id()) {
            return Err(OutboxError::NotFound(log.id()));
        }
        rows.insert(log.id(), log.clone());
        Ok(())
    }

    async fn list_undelivered(&self, limit: i64) -> Result<Vec<IntegrationEventLog>> {
        let rows = self.rows.read().await;
        let mut undelivered: Vec<IntegrationEventLog> = rows
            .values()
            .filter(|l| l.state() != EventLogState::Published)
            .cloned()
            .collect();
        undelivered.sort_by_key(|l| (l.create_time(), l.sequence()));
        undelivered.truncate(limit.max(0) as usize);
        Ok(undelivered)
    }
}
