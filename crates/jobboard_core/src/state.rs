use std::collections::HashMap;
use std::time::Duration;

use board_logging::board_warn;
use chrono::{DateTime, Utc};

use crate::view_model::{BoardViewModel, JobRowView};
use crate::{project_stage, FetchOrigin, JobRegistry, JobSnapshot, StageProjection, StatusCode, TimelineStage};

pub type JobId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
struct JobEntry {
    snapshot: JobSnapshot,
    status: StatusCode,
    reached: TimelineStage,
    failed: Option<TimelineStage>,
    log_lines: Vec<String>,
    elapsed: Option<Duration>,
}

impl JobEntry {
    fn new(snapshot: JobSnapshot) -> Self {
        let elapsed = if snapshot.status.is_terminal() {
            snapshot.final_duration()
        } else {
            None
        };
        Self {
            status: snapshot.status.clone(),
            snapshot,
            reached: TimelineStage::Created,
            failed: None,
            log_lines: Vec::new(),
            elapsed,
        }
    }
}

/// Visible consequences of applying one status entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatusChange {
    pub status: Option<StatusCode>,
    pub completed: Option<TimelineStage>,
    pub failed: Option<TimelineStage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusOutcome {
    Applied,
    /// Stored status is already terminal and the new one differs.
    IgnoredAfterTerminal,
    UnknownJob,
}

/// State for one board session: every listed job plus the in-flight registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardState {
    order: Vec<JobId>,
    jobs: HashMap<JobId, JobEntry>,
    registry: JobRegistry,
    loaded: bool,
    statuses_pending: bool,
    logs_pending: bool,
    backfills_pending: usize,
    poll_ticks: u64,
    stopped: bool,
    dirty: bool,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> BoardViewModel {
        let jobs = self
            .order
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .map(|entry| JobRowView {
                job_id: entry.snapshot.job_id.clone(),
                name: entry.snapshot.name.clone(),
                status: entry.status.clone(),
                reached: entry.reached,
                failed: entry.failed,
                log_lines: entry.log_lines.clone(),
                elapsed: entry.elapsed,
            })
            .collect::<Vec<_>>();
        BoardViewModel {
            no_jobs: self.loaded && jobs.is_empty(),
            jobs,
            in_flight: self.registry.len(),
            loaded: self.loaded,
            stopped: self.stopped,
            dirty: self.dirty,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn status_of(&self, job_id: &str) -> Option<&StatusCode> {
        self.jobs.get(job_id).map(|entry| &entry.status)
    }

    pub fn stage_of(&self, job_id: &str) -> Option<TimelineStage> {
        self.jobs.get(job_id).map(|entry| entry.reached)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Loaded, nothing in flight and no request outstanding.
    pub fn is_idle(&self) -> bool {
        self.loaded
            && self.registry.is_empty()
            && !self.statuses_pending
            && !self.logs_pending
            && self.backfills_pending == 0
    }

    pub fn poll_ticks(&self) -> u64 {
        self.poll_ticks
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Registers the listed jobs. Returns the jobs actually kept and the ids
    /// that need a backfill.
    ///
    /// The first entry for a job id wins; later duplicates are dropped.
    pub(crate) fn load_jobs(&mut self, jobs: Vec<JobSnapshot>) -> (Vec<JobSnapshot>, Vec<JobId>) {
        self.loaded = true;
        self.dirty = true;
        let mut kept = Vec::with_capacity(jobs.len());
        for job in jobs {
            if self.jobs.contains_key(&job.job_id) {
                board_warn!("duplicate job {} in job list dropped", job.job_id);
                continue;
            }
            self.order.push(job.job_id.clone());
            self.jobs
                .insert(job.job_id.clone(), JobEntry::new(job.clone()));
            kept.push(job);
        }
        let backfill = self
            .registry
            .seed(kept.iter().map(|job| (job.job_id.as_str(), &job.status)));
        // One status and one log request per backfilled job.
        self.backfills_pending += backfill.len() * 2;
        (kept, backfill)
    }

    pub(crate) fn mark_load_failed(&mut self) {
        self.loaded = true;
        self.dirty = true;
    }

    /// Starts a poll tick. Returns the in-flight ids for each request kind
    /// whose previous poll request has completed.
    pub(crate) fn begin_poll(&mut self) -> (Option<Vec<JobId>>, Option<Vec<JobId>>) {
        self.poll_ticks += 1;
        if self.registry.is_empty() {
            return (None, None);
        }
        let snapshot = self.registry.snapshot();
        let statuses = (!self.statuses_pending).then(|| snapshot.clone());
        let logs = (!self.logs_pending).then_some(snapshot);
        self.statuses_pending |= statuses.is_some();
        self.logs_pending |= logs.is_some();
        (statuses, logs)
    }

    pub(crate) fn finish_statuses(&mut self, origin: FetchOrigin) {
        match origin {
            FetchOrigin::Poll => self.statuses_pending = false,
            FetchOrigin::Backfill => self.finish_backfill(),
        }
    }

    pub(crate) fn finish_logs(&mut self, origin: FetchOrigin) {
        match origin {
            FetchOrigin::Poll => self.logs_pending = false,
            FetchOrigin::Backfill => self.finish_backfill(),
        }
    }

    fn finish_backfill(&mut self) {
        self.backfills_pending = self.backfills_pending.saturating_sub(1);
    }

    /// Applies a status to one job, keeping its timeline from moving backwards.
    pub(crate) fn apply_status(
        &mut self,
        job_id: &str,
        status: StatusCode,
    ) -> (StatusOutcome, StatusChange) {
        let mut change = StatusChange::default();
        let Some(entry) = self.jobs.get_mut(job_id) else {
            return (StatusOutcome::UnknownJob, change);
        };
        if entry.status.is_terminal() && entry.status != status {
            return (StatusOutcome::IgnoredAfterTerminal, change);
        }

        if entry.failed.is_none() {
            match project_stage(&status) {
                StageProjection::Reached(stage) if stage > entry.reached => {
                    entry.reached = stage;
                    change.completed = Some(stage);
                }
                StageProjection::FailedAt(stage) => {
                    let at = stage.max(entry.reached);
                    if at > entry.reached {
                        change.completed = Some(at);
                    }
                    entry.reached = at;
                    entry.failed = Some(at);
                    change.failed = Some(at);
                }
                StageProjection::Reached(_) | StageProjection::Unknown => {}
            }
        }

        if entry.status != status {
            entry.status = status.clone();
            change.status = Some(status.clone());
        }
        if status.is_terminal() {
            self.registry.mark_terminal(job_id);
        }
        if change != StatusChange::default() {
            self.dirty = true;
        }
        (StatusOutcome::Applied, change)
    }

    /// Replaces a job's log buffer. Returns false for unknown jobs.
    pub(crate) fn apply_logs(&mut self, job_id: &str, lines: Vec<String>) -> bool {
        let Some(entry) = self.jobs.get_mut(job_id) else {
            return false;
        };
        entry.log_lines = lines;
        self.dirty = true;
        true
    }

    /// Recomputes elapsed time for every in-flight, non-terminal job.
    pub(crate) fn refresh_durations(&mut self, now: DateTime<Utc>) -> Vec<(JobId, Duration)> {
        let mut updated = Vec::new();
        for job_id in self.registry.snapshot() {
            let Some(entry) = self.jobs.get_mut(&job_id) else {
                continue;
            };
            if entry.status.is_terminal() {
                continue;
            }
            let Some(created_at) = entry.snapshot.created_at else {
                continue;
            };
            let elapsed = (now - created_at).to_std().unwrap_or_default();
            entry.elapsed = Some(elapsed);
            updated.push((job_id, elapsed));
        }
        if !updated.is_empty() {
            self.dirty = true;
        }
        updated
    }

    pub(crate) fn stop(&mut self) -> bool {
        let was_running = !self.stopped;
        self.stopped = true;
        self.dirty |= was_running;
        was_running
    }
}
