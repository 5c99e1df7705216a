use std::sync::Arc;

use adgen_logging::adgen_info;

use crate::{GenerationApi, PollSettings, Poller, Submitter, TaskRecord, TaskStore};

/// Wires the API client and the session store into submitters and pollers.
#[derive(Clone)]
pub struct Lifecycle {
    api: Arc<dyn GenerationApi>,
    store: Arc<dyn TaskStore>,
    poll: PollSettings,
}

impl Lifecycle {
    pub fn new(api: Arc<dyn GenerationApi>, store: Arc<dyn TaskStore>, poll: PollSettings) -> Self {
        Self { api, store, poll }
    }

    pub fn submitter(&self) -> Submitter {
        Submitter::new(self.api.clone(), self.store.clone())
    }

    pub fn poller(&self) -> Poller {
        Poller::new(self.api.clone(), self.store.clone(), self.poll.clone())
    }

    /// Startup check: the task a previous run left unfinished, if any.
    pub fn resume_pending(&self) -> Option<TaskRecord> {
        let record = self.store.load()?;
        adgen_info!("Found active task {}; resuming", record.task_id);
        Some(record)
    }
}
