//! Asynchronous dispatcher: durable outbox capture plus a single
//! background consumer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{EventRecord, HandlerRegistry};
use outbox::{IntegrationEventLog, OutboxStore, TransactionToken};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::delivery::execute_handlers;
use crate::dispatcher::EventDispatcher;
use crate::error::DispatchError;
use crate::Result;

/// Dispatcher that decouples delivery from the request path.
///
/// `pre_dispatch` writes the outbox row inside the caller's save;
/// `post_dispatch` pushes the committed event onto an unbounded queue and
/// returns immediately. Construction spawns exactly one consumer task
/// which owns the receiving end for the life of the process, so delivery
/// order matches enqueue order.
pub struct AsyncDispatcher {
    store: Arc<dyn OutboxStore>,
    queue: mpsc::UnboundedSender<EventRecord>,
    worker: JoinHandle<()>,
}

impl AsyncDispatcher {
    /// Starts the dispatcher and its background consumer.
    pub fn start(store: Arc<dyn OutboxStore>, registry: Arc<HandlerRegistry>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(rx, Arc::clone(&store), registry));
        Self {
            store,
            queue,
            worker,
        }
    }

    /// Closes the queue and waits for the consumer to drain what is
    /// already enqueued.
    pub async fn stop(self) {
        drop(self.queue);
        if let Err(err) = self.worker.await
            && !err.is_cancelled()
        {
            tracing::error!(error = %err, "dispatch worker panicked");
        }
    }
}

#[async_trait]
impl EventDispatcher for AsyncDispatcher {
    async fn pre_dispatch(
        &self,
        event: &EventRecord,
        token: Option<TransactionToken>,
    ) -> Result<()> {
        let log = IntegrationEventLog::capture(event)?;
        self.store.insert(&log, token).await?;
        Ok(())
    }

    async fn post_dispatch(&self, event: EventRecord) -> Result<()> {
        self.queue
            .send(event)
            .map_err(|_| DispatchError::QueueClosed)
    }
}

/// The consumer loop. Lives for the whole process; a failure delivering
/// one event is logged and the loop moves on to the next.
async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<EventRecord>,
    store: Arc<dyn OutboxStore>,
    registry: Arc<HandlerRegistry>,
) {
    tracing::debug!("dispatch worker started");
    while let Some(event) = rx.recv().await {
        let event_id = event.id();
        let event_name = event.event_name().to_string();
        if let Err(err) = deliver(store.as_ref(), &registry, event).await {
            metrics::counter!("dispatch_infra_failures").increment(1);
            tracing::error!(
                event_id = %event_id,
                event_name = %event_name,
                error = %err,
                "delivery aborted by infrastructure failure"
            );
        }
    }
    tracing::debug!("dispatch queue closed, worker exiting");
}

/// One delivery: load the outbox row, walk it to `InProgress`, run the
/// handlers, and record the terminal state. Returned errors are
/// infrastructure failures; handler failures are absorbed into the row's
/// `InError` state here.
#[tracing::instrument(skip_all, fields(event_id = %event.id(), event_name = %event.event_name()))]
async fn deliver(
    store: &dyn OutboxStore,
    registry: &HandlerRegistry,
    event: EventRecord,
) -> Result<()> {
    let Some(mut log) = store.find(event.id()).await? else {
        // pre_dispatch was supposed to have written this row; without it
        // there is no durability record, so handlers must not run.
        metrics::counter!("dispatch_unrecorded_events").increment(1);
        tracing::error!("event was never recorded in the outbox, skipping delivery");
        return Ok(());
    };

    log.mark_in_progress(Utc::now())?;
    store.update(&log).await?;

    match execute_handlers(registry, &event).await {
        Ok(()) => {
            log.mark_published(Utc::now())?;
            store.update(&log).await?;
            metrics::counter!("dispatch_events_published").increment(1);
            tracing::debug!("event published");
        }
        Err(err) => {
            log.mark_in_error(err.to_string(), Utc::now())?;
            store.update(&log).await?;
            metrics::counter!("dispatch_events_in_error").increment(1);
            tracing::warn!(error = %err, "event moved to InError");
        }
    }

    Ok(())
}
