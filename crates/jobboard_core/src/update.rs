use board_logging::{board_debug, board_warn};

use crate::state::StatusOutcome;
use crate::{BoardState, Effect, FetchOrigin, Msg, TimelineStage};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: BoardState, msg: Msg) -> (BoardState, Vec<Effect>) {
    if state.is_stopped() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::JobsLoaded(jobs) => {
            let (jobs, backfill) = state.load_jobs(jobs);
            let mut effects = Vec::with_capacity(jobs.len() * 2 + backfill.len() * 2 + 1);
            effects.push(Effect::ShowNoJobs {
                visible: jobs.is_empty(),
            });
            for job in jobs {
                let job_id = job.job_id.clone();
                effects.push(Effect::RenderJob { job });
                effects.push(Effect::SetTimelineCompleted {
                    job_id,
                    stage: TimelineStage::Created,
                });
            }
            // Terminal jobs get their final status and logs exactly once.
            for job_id in backfill {
                effects.push(Effect::FetchStatuses {
                    origin: FetchOrigin::Backfill,
                    job_ids: vec![job_id.clone()],
                });
                effects.push(Effect::FetchLogs {
                    origin: FetchOrigin::Backfill,
                    job_ids: vec![job_id],
                });
            }
            effects
        }
        Msg::JobsLoadFailed { error } => {
            board_warn!("job list unavailable: {}", error);
            state.mark_load_failed();
            Vec::new()
        }
        Msg::PollTick => {
            let (statuses, logs) = state.begin_poll();
            let mut effects = Vec::with_capacity(2);
            if let Some(job_ids) = statuses {
                effects.push(Effect::FetchStatuses {
                    origin: FetchOrigin::Poll,
                    job_ids,
                });
            }
            if let Some(job_ids) = logs {
                effects.push(Effect::FetchLogs {
                    origin: FetchOrigin::Poll,
                    job_ids,
                });
            }
            effects
        }
        Msg::DurationTick { now } => state
            .refresh_durations(now)
            .into_iter()
            .map(|(job_id, elapsed)| Effect::UpdateDuration { job_id, elapsed })
            .collect(),
        Msg::StatusesReceived { origin, statuses } => {
            state.finish_statuses(origin);
            let mut effects = Vec::new();
            for (job_id, status) in statuses {
                let (outcome, change) = state.apply_status(&job_id, status);
                match outcome {
                    StatusOutcome::UnknownJob => {
                        board_warn!("status for unlisted job {} skipped", job_id);
                        continue;
                    }
                    StatusOutcome::IgnoredAfterTerminal => {
                        board_debug!("late status for finished job {} ignored", job_id);
                        continue;
                    }
                    StatusOutcome::Applied => {}
                }
                if let Some(status) = change.status {
                    effects.push(Effect::SetStatus {
                        job_id: job_id.clone(),
                        status,
                    });
                }
                if let Some(stage) = change.completed {
                    effects.push(Effect::SetTimelineCompleted {
                        job_id: job_id.clone(),
                        stage,
                    });
                }
                if let Some(stage) = change.failed {
                    effects.push(Effect::SetTimelineFailed { job_id, stage });
                }
            }
            effects
        }
        Msg::StatusesFailed { origin, error } => {
            board_warn!("status fetch ({:?}) failed: {}", origin, error);
            state.finish_statuses(origin);
            Vec::new()
        }
        Msg::LogsReceived { origin, logs } => {
            state.finish_logs(origin);
            let mut effects = Vec::with_capacity(logs.len());
            for (job_id, lines) in logs {
                if state.apply_logs(&job_id, lines.clone()) {
                    effects.push(Effect::SetLogs { job_id, lines });
                } else {
                    board_warn!("logs for unlisted job {} skipped", job_id);
                }
            }
            effects
        }
        Msg::LogsFailed { origin, error } => {
            board_warn!("log fetch ({:?}) failed: {}", origin, error);
            state.finish_logs(origin);
            Vec::new()
        }
        Msg::Stop => {
            if state.stop() {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
