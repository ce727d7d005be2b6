use std::time::Duration;

use crate::{JobId, StatusCode, TimelineStage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardViewModel {
    pub jobs: Vec<JobRowView>,
    pub in_flight: usize,
    pub loaded: bool,
    pub no_jobs: bool,
    pub stopped: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub name: Option<String>,
    pub status: StatusCode,
    pub reached: TimelineStage,
    pub failed: Option<TimelineStage>,
    pub log_lines: Vec<String>,
    pub elapsed: Option<Duration>,
}
