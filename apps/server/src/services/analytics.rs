//! Search analytics recording.
//!
//! Events are handed to a bounded channel with a non-blocking `try_send` and
//! written to the `AnalyticsSink` by a background worker. Recording is best
//! effort: a full or closed queue drops the event, and sink failures are logged
//! and dropped. Nothing here can fail or slow down a search.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::AnalyticsConfig;
use crate::db::traits::AnalyticsSink;
use crate::metrics::ANALYTICS_EVENTS_TOTAL;
use crate::models::SearchEvent;

/// Cheap, cloneable handle used on the search path.
#[derive(Clone, Debug)]
pub struct AnalyticsRecorder {
    sender: Option<mpsc::Sender<SearchEvent>>,
}

/// Owns the background writer task.
pub struct AnalyticsWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AnalyticsRecorder {
    /// Start the writer task and return the recorder feeding it.
    pub fn spawn<S>(sink: Arc<S>, config: &AnalyticsConfig) -> (Self, AnalyticsWorker)
    where
        S: AnalyticsSink + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel::<SearchEvent>(config.queue_capacity.max(1));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_worker(sink, receiver, shutdown_rx));

        tracing::info!(
            queue_capacity = config.queue_capacity,
            "Search analytics recorder started"
        );

        (
            Self {
                sender: Some(sender),
            },
            AnalyticsWorker { shutdown, handle },
        )
    }

    /// Recorder that discards every event.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue an event without waiting. Never fails.
    pub fn record(&self, event: SearchEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {
                ANALYTICS_EVENTS_TOTAL.with_label_values(&["queued"]).inc();
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                ANALYTICS_EVENTS_TOTAL.with_label_values(&["dropped"]).inc();
                tracing::debug!(
                    cache_key = %event.cache_key,
                    "Analytics queue full; dropping search event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                ANALYTICS_EVENTS_TOTAL.with_label_values(&["dropped"]).inc();
                tracing::warn!("Analytics queue closed; dropping search event");
            }
        }
    }
}

impl AnalyticsWorker {
    /// Stop accepting events, write what is already queued, then wait for the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("Analytics worker ended abnormally: {}", e);
        }
    }
}

async fn run_worker<S>(
    sink: Arc<S>,
    mut receiver: mpsc::Receiver<SearchEvent>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: AnalyticsSink + ?Sized,
{
    let mut shutdown_open = true;

    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Some(event) => write_event(sink.as_ref(), &event).await,
                // Every recorder is gone: nothing more can arrive.
                None => return,
            },
            changed = shutdown.changed(), if shutdown_open => match changed {
                Ok(()) if *shutdown.borrow() => break,
                Ok(()) => {}
                Err(_) => shutdown_open = false,
            },
        }
    }

    receiver.close();
    let mut drained = 0usize;
    while let Some(event) = receiver.recv().await {
        write_event(sink.as_ref(), &event).await;
        drained += 1;
    }
    tracing::info!(drained, "Search analytics recorder stopped");
}

async fn write_event<S: AnalyticsSink + ?Sized>(sink: &S, event: &SearchEvent) {
    match sink.append(event).await {
        Ok(()) => {
            ANALYTICS_EVENTS_TOTAL.with_label_values(&["written"]).inc();
        }
        Err(e) => {
            ANALYTICS_EVENTS_TOTAL.with_label_values(&["failed"]).inc();
            tracing::warn!("Failed to persist search event: {}", e);
        }
    }
}
