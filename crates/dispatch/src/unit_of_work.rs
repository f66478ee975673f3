//! Commit hook: collecting pending events around saves and explicit
//! transactions.

use std::collections::HashMap;
use std::sync::Arc;

use domain::{AggregateRoot, EventRecord};
use outbox::{OutboxStore, TransactionToken};
use tokio::sync::Mutex;

use crate::dispatcher::EventDispatcher;
use crate::Result;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Glue between aggregate saves and the two dispatch phases.
///
/// On every save the pending events of all touched aggregates are drained
/// (aggregate-iteration order, then per-aggregate insertion order) and
/// handed to `pre_dispatch` while the save is open. What happens after
/// the commit depends on whether an explicit transaction is in play:
///
/// - top-level saves `post_dispatch` immediately, logging (never
///   returning) a delivery-side failure, because the business change has
///   already committed;
/// - saves inside [`transaction`](Self::transaction) buffer their events
///   under the transaction's token. The buffer is dispatched exactly once
///   when the transaction commits and discarded wholesale when it rolls
///   back — events of an aborted transaction are never delivered.
pub struct UnitOfWork {
    store: Arc<dyn OutboxStore>,
    dispatcher: Arc<dyn EventDispatcher>,
    buffers: Mutex<HashMap<TransactionToken, Vec<EventRecord>>>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn OutboxStore>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Saves outside any explicit transaction: capture, then dispatch
    /// right away.
    #[tracing::instrument(skip_all)]
    pub async fn save_changes(&self, aggregates: &mut [&mut dyn AggregateRoot]) -> Result<()> {
        let events = collect_events(aggregates);
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            self.dispatcher.pre_dispatch(event, None).await?;
        }

        for event in events {
            let event_id = event.id();
            if let Err(err) = self.dispatcher.post_dispatch(event).await {
                // The business change is already durable; a delivery-side
                // failure must not unwind into its caller.
                tracing::error!(
                    event_id = %event_id,
                    error = %err,
                    "post-dispatch failed after commit"
                );
            }
        }
        Ok(())
    }

    /// Saves inside the explicit transaction identified by `token`:
    /// capture on the open transaction, buffer dispatch until it commits.
    #[tracing::instrument(skip_all, fields(token = %token))]
    pub async fn save_changes_in(
        &self,
        token: TransactionToken,
        aggregates: &mut [&mut dyn AggregateRoot],
    ) -> Result<()> {
        let events = collect_events(aggregates);
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            self.dispatcher.pre_dispatch(event, Some(token)).await?;
        }

        self.buffers
            .lock()
            .await
            .entry(token)
            .or_default()
            .extend(events);
        Ok(())
    }

    /// Runs `work` inside an explicit transaction and returns whether it
    /// committed. Failures of the work, the commit, or the rollback are
    /// logged rather than propagated; only a failure to open the
    /// transaction is returned.
    #[tracing::instrument(skip_all)]
    pub async fn transaction<F, Fut>(&self, work: F) -> Result<bool>
    where
        F: FnOnce(TransactionToken) -> Fut,
        Fut: Future<Output = std::result::Result<(), BoxError>>,
    {
        let token = self.store.begin().await?;
        let mut success = false;

        match work(token).await {
            Ok(()) => match self.store.commit(token).await {
                Ok(()) => success = true,
                Err(err) => {
                    tracing::error!(token = %token, error = %err, "transaction commit failed");
                }
            },
            Err(err) => {
                tracing::error!(token = %token, error = %err, "transaction failed, rolling back");
                if let Err(rollback_err) = self.store.rollback(token).await {
                    tracing::error!(
                        token = %token,
                        error = %rollback_err,
                        "transaction rollback failed"
                    );
                }
            }
        }

        // The buffer is removed in every outcome; it is only dispatched
        // after a successful commit.
        let buffered = self.buffers.lock().await.remove(&token);
        if let Some(events) = buffered
            && success
        {
            for event in events {
                let event_id = event.id();
                if let Err(err) = self.dispatcher.post_dispatch(event).await {
                    tracing::error!(
                        event_id = %event_id,
                        error = %err,
                        "post-dispatch failed after transaction commit"
                    );
                }
            }
        }

        Ok(success)
    }
}

/// Drains pending events from the aggregates, preserving aggregate
/// iteration order then insertion order, and assigns each event its
/// write-once tie-break sequence within this save.
fn collect_events(aggregates: &mut [&mut dyn AggregateRoot]) -> Vec<EventRecord> {
    let mut collected = Vec::new();
    for aggregate in aggregates.iter_mut() {
        for record in aggregate.pending_events_mut().as_mut_slice() {
            record.assign_sort(collected.len() as i32);
            collected.push(record.clone());
        }
        aggregate.clear_domain_events();
    }
    collected
}
