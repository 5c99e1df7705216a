//! Adgen engine: backend client, session store and task lifecycle.
mod api;
mod lifecycle;
mod persist;
mod poll;
mod store;
mod submit;
mod types;

pub use api::{ApiSettings, GenerationApi, ReqwestApi};
pub use lifecycle::Lifecycle;
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use poll::{PollObserver, PollOutcome, PollSettings, Poller};
pub use store::{
    MemoryTaskStore, SessionFileStore, StoreError, TaskStore, PREVIEW_KEY, TASK_ID_KEY,
};
pub use submit::{validate_media_type, validate_upload, Submitter};
pub use types::{ImageUpload, LifecycleError, PollStatus, TaskRecord};
