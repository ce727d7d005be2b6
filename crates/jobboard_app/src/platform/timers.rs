use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use board_logging::board_debug;
use chrono::Utc;
use jobboard_core::Msg;

pub const DURATION_PERIOD: Duration = Duration::from_secs(1);

/// Shared stop signal for the session's repeating timers.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// The status/log timer and the duration timer of one board session.
pub struct Timers {
    stop: StopHandle,
    threads: Vec<JoinHandle<()>>,
}

impl Timers {
    pub fn start(polling_interval: Duration, msg_tx: mpsc::Sender<Msg>) -> io::Result<Self> {
        let stop = StopHandle::default();
        let threads = vec![
            spawn_repeating(
                "poll-timer",
                polling_interval,
                stop.clone(),
                msg_tx.clone(),
                || Msg::PollTick,
            )?,
            spawn_repeating("duration-timer", DURATION_PERIOD, stop.clone(), msg_tx, || {
                Msg::DurationTick { now: Utc::now() }
            })?,
        ];
        Ok(Self { stop, threads })
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Stops both timers and waits for their threads to exit.
    pub fn shutdown(self) {
        self.stop.stop();
        for handle in self.threads {
            let _ = handle.join();
        }
    }
}

/// Sends `make_msg()` every `period` until stopped or the receiver is gone.
pub fn spawn_repeating<F>(
    name: &str,
    period: Duration,
    stop: StopHandle,
    msg_tx: mpsc::Sender<Msg>,
    mut make_msg: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnMut() -> Msg + Send + 'static,
{
    let label = name.to_string();
    thread::Builder::new().name(label.clone()).spawn(move || {
        loop {
            thread::sleep(period);
            if stop.is_stopped() || msg_tx.send(make_msg()).is_err() {
                break;
            }
        }
        board_debug!("{} exited", label);
    })
}
