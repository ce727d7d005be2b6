//! Job board engine: HTTP access to the jobs backend and effect execution.
mod engine;
mod fetch;
mod types;

pub use engine::{EngineCommand, EngineError, EngineHandle};
pub use fetch::{Endpoints, FetchSettings, JobsApi, ReqwestJobsApi};
pub use types::{
    EngineEvent, FailureKind, FetchError, JobLogs, JobRecord, JobStatuses, RequestTag,
};
