use board_logging::{board_debug, board_info, board_warn, poll_tick};
use jobboard_core::{Effect, FetchOrigin, JobSnapshot, JobTableRenderer, Msg, StatusCode};
use jobboard_engine::{EngineEvent, EngineHandle, JobRecord, RequestTag};

use super::timers::StopHandle;
use super::ui::surface::BoardSurface;

/// Executes the effects returned by `update`: render effects go to the
/// surface, fetches to the engine.
pub struct EffectRunner<R: JobTableRenderer> {
    engine: EngineHandle,
    surface: BoardSurface<R>,
    timers: StopHandle,
}

impl<R: JobTableRenderer> EffectRunner<R> {
    pub fn new(engine: EngineHandle, surface: BoardSurface<R>, timers: StopHandle) -> Self {
        Self {
            engine,
            surface,
            timers,
        }
    }

    pub fn load_jobs(&self) {
        board_info!("loading job list");
        if !self.engine.list_jobs() {
            board_warn!("engine unavailable; job list not requested");
        }
    }

    pub fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if self.surface.apply(&effect) {
                continue;
            }
            match effect {
                Effect::FetchStatuses { origin, job_ids } => {
                    board_debug!(
                        "tick={} fetch statuses ({:?}) for {} job(s)",
                        poll_tick(),
                        origin,
                        job_ids.len()
                    );
                    if !self.engine.fetch_statuses(map_origin(origin), job_ids) {
                        board_warn!("engine unavailable; status fetch dropped");
                    }
                }
                Effect::FetchLogs { origin, job_ids } => {
                    board_debug!(
                        "tick={} fetch logs ({:?}) for {} job(s)",
                        poll_tick(),
                        origin,
                        job_ids.len()
                    );
                    if !self.engine.fetch_logs(map_origin(origin), job_ids) {
                        board_warn!("engine unavailable; log fetch dropped");
                    }
                }
                Effect::StopPolling => {
                    board_info!("stopping polling timers");
                    self.timers.stop();
                }
                // Render effects were handled by the surface.
                _ => {}
            }
        }
    }
}

fn map_origin(origin: FetchOrigin) -> RequestTag {
    match origin {
        FetchOrigin::Poll => RequestTag::Poll,
        FetchOrigin::Backfill => RequestTag::Backfill,
    }
}

fn map_tag(tag: RequestTag) -> FetchOrigin {
    match tag {
        RequestTag::Poll => FetchOrigin::Poll,
        RequestTag::Backfill => FetchOrigin::Backfill,
    }
}

fn map_record(record: JobRecord) -> JobSnapshot {
    JobSnapshot {
        status: StatusCode::parse(&record.status),
        job_id: record.job_id,
        name: record.name,
        created_at: record.created_at,
        completed_at: record.completed_at,
    }
}

/// Turns an engine result into the message the board understands.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::JobsListed(Ok(records)) => {
            board_info!("job list loaded: {} job(s)", records.len());
            Msg::JobsLoaded(records.into_iter().map(map_record).collect())
        }
        EngineEvent::JobsListed(Err(err)) => Msg::JobsLoadFailed {
            error: err.to_string(),
        },
        EngineEvent::StatusesFetched {
            tag,
            result: Ok(statuses),
            ..
        } => Msg::StatusesReceived {
            origin: map_tag(tag),
            statuses: statuses
                .into_iter()
                .map(|(job_id, code)| (job_id, StatusCode::parse(&code)))
                .collect(),
        },
        EngineEvent::StatusesFetched {
            tag,
            job_ids,
            result: Err(err),
        } => Msg::StatusesFailed {
            origin: map_tag(tag),
            error: format!("{err} (jobs: {})", job_ids.join(",")),
        },
        EngineEvent::LogsFetched {
            tag,
            result: Ok(logs),
            ..
        } => Msg::LogsReceived {
            origin: map_tag(tag),
            logs: logs.into_iter().collect(),
        },
        EngineEvent::LogsFetched {
            tag,
            job_ids,
            result: Err(err),
        } => Msg::LogsFailed {
            origin: map_tag(tag),
            error: format!("{err} (jobs: {})", job_ids.join(",")),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn statuses_are_delivered_in_job_id_order() {
        let statuses = [("b2", "PRO"), ("a1", "FAI"), ("c3", "XYZ")]
            .into_iter()
            .map(|(id, code)| (id.to_string(), code.to_string()))
            .collect();
        let msg = map_event(EngineEvent::StatusesFetched {
            tag: RequestTag::Poll,
            job_ids: vec!["b2".to_string(), "a1".to_string(), "c3".to_string()],
            result: Ok(statuses),
        });

        assert_eq!(
            msg,
            Msg::StatusesReceived {
                origin: FetchOrigin::Poll,
                statuses: vec![
                    ("a1".to_string(), StatusCode::Failed),
                    ("b2".to_string(), StatusCode::Processing),
                    ("c3".to_string(), StatusCode::Unknown("XYZ".to_string())),
                ],
            }
        );
    }
}
