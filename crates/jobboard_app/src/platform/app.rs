use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use board_logging::{board_debug, board_info, set_poll_tick};
use jobboard_core::{update, BoardState, JobTableRenderer, Msg};
use jobboard_engine::{EngineEvent, EngineHandle};
use log::LevelFilter;

use super::config::{BoardConfig, DEFAULT_CONFIG_PATH};
use super::effects::{map_event, EffectRunner};
use super::logging;
use super::timers::Timers;
use super::ui::render::TerminalRenderer;
use super::ui::surface::BoardSurface;

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = BoardConfig::read_optional(&config_path).context("loading board config")?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);
    if from_file {
        board_info!("config loaded from {}", config_path.display());
    } else {
        board_info!("no config at {}; using defaults", config_path.display());
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
    let engine = EngineHandle::new(config.endpoints(), config.fetch_settings(), event_tx)
        .context("starting engine")?;
    spawn_event_forwarder(event_rx, msg_tx.clone()).context("starting event forwarder")?;
    let timers = Timers::start(config.polling_interval(), msg_tx).context("starting timers")?;

    let surface = BoardSurface::new(TerminalRenderer::stdout());
    let mut runner = EffectRunner::new(engine, surface, timers.stop_handle());
    runner.load_jobs();

    let state = run_dispatch_loop(BoardState::new(), &msg_rx, &mut runner, config.exit_when_idle);
    timers.shutdown();

    let view = state.view();
    board_info!(
        "board stopped after {} poll tick(s): {} job(s), {} still in flight",
        state.poll_ticks(),
        view.jobs.len(),
        view.in_flight
    );
    Ok(())
}

/// Forwards engine results into the board's message channel.
fn spawn_event_forwarder(
    event_rx: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("engine-events".to_string())
        .spawn(move || {
            for event in event_rx {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        })
}

/// Consumes messages on the calling thread until the board stops.
///
/// With `exit_when_idle`, the board stops itself once nothing is left to poll.
fn run_dispatch_loop<R: JobTableRenderer>(
    mut state: BoardState,
    msg_rx: &mpsc::Receiver<Msg>,
    runner: &mut EffectRunner<R>,
    exit_when_idle: bool,
) -> BoardState {
    while let Ok(msg) = msg_rx.recv() {
        state = dispatch(state, msg, runner);
        if state.is_stopped() {
            break;
        }
        if exit_when_idle && state.is_idle() {
            board_info!("all jobs finished");
            state = dispatch(state, Msg::Stop, runner);
            break;
        }
    }
    state
}

fn dispatch<R: JobTableRenderer>(
    state: BoardState,
    msg: Msg,
    runner: &mut EffectRunner<R>,
) -> BoardState {
    let is_poll = matches!(msg, Msg::PollTick);
    let (mut state, effects) = update(state, msg);
    if is_poll {
        set_poll_tick(state.poll_ticks());
    }
    runner.apply(effects);
    if state.consume_dirty() {
        board_debug!(
            "tick={} board changed; {} job(s) in flight",
            state.poll_ticks(),
            state.registry().len()
        );
    }
    state
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use jobboard_core::{
        DetailPanel, JobSnapshot, LogHandle, RowHandle, StatusCode, TimelineHandle, TimelineStage,
    };
    use jobboard_engine::{FetchError, JobLogs, JobRecord, JobStatuses, JobsApi};

    use super::super::timers::StopHandle;
    use super::*;

    type Calls = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Calls,
    }

    struct Recorder {
        calls: Calls,
        job_id: String,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.borrow_mut().push(format!("{} {}", call, self.job_id));
        }
    }

    impl RowHandle for Recorder {
        fn set_status(&mut self, status: &StatusCode) {
            self.record(format!("status:{}", status.code()));
        }

        fn update_duration(&mut self, elapsed: Duration) {
            self.record(format!("duration:{}", elapsed.as_secs()));
        }
    }

    impl TimelineHandle for Recorder {
        fn add_event(&mut self, label: &str) {
            self.record(format!("event:{label}"));
        }

        fn set_completed(&mut self, stage: TimelineStage) {
            self.record(format!("completed:{}", stage.index()));
        }

        fn set_failed(&mut self, stage: TimelineStage) {
            self.record(format!("failed:{}", stage.index()));
        }
    }

    impl LogHandle for Recorder {
        fn set_lines(&mut self, lines: &[String]) {
            self.record(format!("logs:{}", lines.len()));
        }
    }

    impl RecordingRenderer {
        fn recorder(&self, job: &JobSnapshot) -> Recorder {
            Recorder {
                calls: self.calls.clone(),
                job_id: job.job_id.clone(),
            }
        }
    }

    impl JobTableRenderer for RecordingRenderer {
        type Row = Recorder;
        type Timeline = Recorder;
        type Logs = Recorder;

        fn render_row(&mut self, job: &JobSnapshot) -> Recorder {
            self.calls.borrow_mut().push(format!("row {}", job.job_id));
            self.recorder(job)
        }

        fn render_detail_panel(&mut self, job: &JobSnapshot) -> DetailPanel<Recorder, Recorder> {
            DetailPanel {
                timeline: self.recorder(job),
                log_view: self.recorder(job),
            }
        }

        fn show_no_jobs(&mut self, visible: bool) {
            self.calls.borrow_mut().push(format!("no_jobs {visible}"));
        }
    }

    /// Lists one finished and one queued job; every status answer is COM.
    struct FinishingApi;

    #[async_trait::async_trait]
    impl JobsApi for FinishingApi {
        async fn list_jobs(&self) -> Result<Vec<JobRecord>, FetchError> {
            Ok(vec![
                JobRecord {
                    job_id: "a".to_string(),
                    status: "COM".to_string(),
                    name: None,
                    created_at: None,
                    completed_at: None,
                },
                JobRecord {
                    job_id: "b".to_string(),
                    status: "INQ".to_string(),
                    name: None,
                    created_at: None,
                    completed_at: None,
                },
            ])
        }

        async fn fetch_statuses(&self, job_ids: &[String]) -> Result<JobStatuses, FetchError> {
            Ok(job_ids
                .iter()
                .map(|id| (id.clone(), "COM".to_string()))
                .collect())
        }

        async fn fetch_logs(&self, job_ids: &[String]) -> Result<JobLogs, FetchError> {
            Ok(job_ids
                .iter()
                .map(|id| (id.clone(), vec![format!("{id} done")]))
                .collect())
        }
    }

    fn recording_runner(
        msg_tx: mpsc::Sender<Msg>,
        stop: StopHandle,
    ) -> (EffectRunner<RecordingRenderer>, Calls) {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::spawn(Arc::new(FinishingApi), event_tx).unwrap();
        spawn_event_forwarder(event_rx, msg_tx).unwrap();
        let renderer = RecordingRenderer::default();
        let calls = renderer.calls.clone();
        let runner = EffectRunner::new(engine, BoardSurface::new(renderer), stop);
        (runner, calls)
    }

    #[test]
    fn board_runs_until_every_job_is_terminal() {
        board_logging::initialize_for_tests();
        let (msg_tx, msg_rx) = mpsc::channel();
        let timers = Timers::start(Duration::from_millis(10), msg_tx.clone()).unwrap();
        let (mut runner, calls) = recording_runner(msg_tx, timers.stop_handle());

        runner.load_jobs();
        let state = run_dispatch_loop(BoardState::new(), &msg_rx, &mut runner, true);
        timers.shutdown();

        assert!(state.is_stopped());
        assert!(state.registry().is_empty());
        assert_eq!(state.status_of("b"), Some(&StatusCode::Completed));

        let calls = calls.borrow();
        assert_eq!(calls[0], "no_jobs false");
        assert_eq!(calls[1], "row a");
        assert!(calls.contains(&"event:Created a".to_string()));
        assert!(calls.contains(&"completed:6 a".to_string()));
        assert!(calls.contains(&"logs:1 a".to_string()));
        assert!(calls.contains(&"status:COM b".to_string()));
        assert!(calls.contains(&"completed:6 b".to_string()));
        // The finished job is backfilled once and never polled.
        assert_eq!(
            calls.iter().filter(|call| *call == "completed:6 a").count(),
            1
        );
        assert!(!calls.iter().any(|call| call.starts_with("status:") && call.ends_with(" a")));
    }

    #[test]
    fn durations_only_reach_in_flight_rows() {
        let (msg_tx, _msg_rx) = mpsc::channel();
        let stop = StopHandle::default();
        let (mut runner, calls) = recording_runner(msg_tx, stop.clone());

        let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let jobs = [("a", StatusCode::Completed), ("b", StatusCode::Processing)]
            .into_iter()
            .map(|(id, status)| {
                let mut job = JobSnapshot::new(id, status);
                job.created_at = Some(created);
                job
            })
            .collect();
        let state = dispatch(BoardState::new(), Msg::JobsLoaded(jobs), &mut runner);
        let state = dispatch(
            state,
            Msg::DurationTick {
                now: created + chrono::Duration::seconds(5),
            },
            &mut runner,
        );

        let durations: Vec<String> = calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with("duration:"))
            .cloned()
            .collect();
        assert_eq!(durations, vec!["duration:5 b".to_string()]);

        let state = dispatch(state, Msg::Stop, &mut runner);
        assert!(state.is_stopped());
        assert!(stop.is_stopped());
    }

    #[test]
    fn poll_tick_number_is_recorded_for_logging() {
        let (msg_tx, _msg_rx) = mpsc::channel();
        let (mut runner, _calls) = recording_runner(msg_tx, StopHandle::default());

        let state = dispatch(BoardState::new(), Msg::PollTick, &mut runner);
        let state = dispatch(state, Msg::PollTick, &mut runner);

        assert_eq!(state.poll_ticks(), 2);
        assert_eq!(board_logging::poll_tick(), 2);
    }
}
