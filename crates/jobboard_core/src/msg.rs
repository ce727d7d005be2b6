use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{FetchOrigin, JobId, StatusCode};

/// A job as first listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub name: Option<String>,
    pub status: StatusCode,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    pub fn new(job_id: impl Into<JobId>, status: StatusCode) -> Self {
        Self {
            job_id: job_id.into(),
            name: None,
            status,
            created_at: None,
            completed_at: None,
        }
    }

    /// Final run time for a job listed after it finished.
    pub fn final_duration(&self) -> Option<Duration> {
        let (start, end) = (self.created_at?, self.completed_at?);
        Some((end - start).to_std().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Initial job list arrived.
    JobsLoaded(Vec<JobSnapshot>),
    /// Initial job list could not be fetched.
    JobsLoadFailed { error: String },
    /// Status/log interval fired.
    PollTick,
    /// Duration interval fired.
    DurationTick { now: DateTime<Utc> },
    /// Batched status response, sorted by job id.
    StatusesReceived {
        origin: FetchOrigin,
        statuses: Vec<(JobId, StatusCode)>,
    },
    StatusesFailed { origin: FetchOrigin, error: String },
    /// Batched log response; each entry replaces that job's log buffer.
    LogsReceived {
        origin: FetchOrigin,
        logs: Vec<(JobId, Vec<String>)>,
    },
    LogsFailed { origin: FetchOrigin, error: String },
    /// Host is tearing the board down.
    Stop,
    /// Fallback for placeholder wiring.
    NoOp,
}
