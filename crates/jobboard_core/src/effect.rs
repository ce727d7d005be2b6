use std::time::Duration;

use crate::{JobId, JobSnapshot, StatusCode, TimelineStage};

/// Why a batched fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Regular status/log tick over the in-flight set.
    Poll,
    /// One-shot refresh for a job that was already terminal when listed.
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create the row and detail panel for a newly listed job.
    RenderJob { job: JobSnapshot },
    ShowNoJobs { visible: bool },
    SetStatus { job_id: JobId, status: StatusCode },
    SetTimelineCompleted { job_id: JobId, stage: TimelineStage },
    SetTimelineFailed { job_id: JobId, stage: TimelineStage },
    SetLogs { job_id: JobId, lines: Vec<String> },
    UpdateDuration { job_id: JobId, elapsed: Duration },
    FetchStatuses { origin: FetchOrigin, job_ids: Vec<JobId> },
    FetchLogs { origin: FetchOrigin, job_ids: Vec<JobId> },
    StopPolling,
}
