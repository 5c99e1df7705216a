use std::sync::Arc;
use std::time::Duration;

use adgen_core::AdResult;
use adgen_logging::{adgen_debug, adgen_info, adgen_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{GenerationApi, LifecycleError, PollStatus, TaskStore};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Fixed spacing between status queries. There is no backoff and no limit
    /// on how long a task may stay pending.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
        }
    }
}

/// Receives the non-terminal ticks of a poll loop.
pub trait PollObserver: Send + Sync {
    fn on_pending(&self, task_id: &str);
}

impl PollObserver for () {
    fn on_pending(&self, _task_id: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded(AdResult),
    Failed(LifecycleError),
    /// Stopped from outside; the session record is left alone.
    Cancelled,
}

pub struct Poller {
    api: Arc<dyn GenerationApi>,
    store: Arc<dyn TaskStore>,
    settings: PollSettings,
}

impl Poller {
    pub fn new(
        api: Arc<dyn GenerationApi>,
        store: Arc<dyn TaskStore>,
        settings: PollSettings,
    ) -> Self {
        Self {
            api,
            store,
            settings,
        }
    }

    /// Queries the task once per interval until it succeeds, fails or `cancel`
    /// fires.
    ///
    /// Ticks are serialised: the next one is not awaited before the previous
    /// response has been handled, so at most one request is in flight. A
    /// response that arrives after cancellation is dropped.
    pub async fn run(
        &self,
        task_id: &str,
        cancel: &CancellationToken,
        observer: &dyn PollObserver,
    ) -> PollOutcome {
        let period = self.settings.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        adgen_info!("Polling task {} every {:?}", task_id, period);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    adgen_info!("Polling of task {} cancelled", task_id);
                    return PollOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }
            tick += 1;

            let response = self.api.poll(task_id).await;
            if cancel.is_cancelled() {
                adgen_debug!("Dropping tick {} response for cancelled task {}", tick, task_id);
                return PollOutcome::Cancelled;
            }

            match response {
                Ok(PollStatus::Pending) => {
                    adgen_debug!("Task {} still processing (tick {})", task_id, tick);
                    observer.on_pending(task_id);
                }
                Ok(PollStatus::Ready(result)) => {
                    adgen_info!("Task {} finished after {} ticks", task_id, tick);
                    self.forget(task_id);
                    return PollOutcome::Succeeded(result);
                }
                Err(err) => {
                    adgen_warn!("Task {} failed ({}): {}", task_id, err.kind(), err);
                    self.forget(task_id);
                    return PollOutcome::Failed(err);
                }
            }
        }
    }

    fn forget(&self, task_id: &str) {
        if let Err(err) = self.store.clear_task(task_id) {
            adgen_warn!("Failed to clear session record for task {}: {}", task_id, err);
        }
    }
}
