use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use board_logging::{board_debug, board_info};

use crate::fetch::{Endpoints, FetchSettings, JobsApi, ReqwestJobsApi};
use crate::{EngineEvent, FetchError, RequestTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    ListJobs,
    FetchStatuses { tag: RequestTag, job_ids: Vec<String> },
    FetchLogs { tag: RequestTag, job_ids: Vec<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("http client: {0}")]
    Client(#[from] FetchError),
    #[error("async runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Runs backend requests on a background tokio runtime.
///
/// Every command produces exactly one [`EngineEvent`] on the event channel.
/// Commands run concurrently, so a slow request never holds back another.
/// Dropping the handle shuts the runtime down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        endpoints: Endpoints,
        settings: FetchSettings,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let api = ReqwestJobsApi::new(endpoints, settings)?;
        Ok(Self::spawn(Arc::new(api), event_tx)?)
    }

    pub fn spawn(api: Arc<dyn JobsApi>, event_tx: mpsc::Sender<EngineEvent>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("jobboard-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
            board_info!("engine command channel closed; shutting down");
        });

        Ok(Self { cmd_tx })
    }

    /// Queues a command. Returns false once the engine has shut down.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.cmd_tx.send(command).is_ok()
    }

    pub fn list_jobs(&self) -> bool {
        self.send(EngineCommand::ListJobs)
    }

    pub fn fetch_statuses(&self, tag: RequestTag, job_ids: Vec<String>) -> bool {
        self.send(EngineCommand::FetchStatuses { tag, job_ids })
    }

    pub fn fetch_logs(&self, tag: RequestTag, job_ids: Vec<String>) -> bool {
        self.send(EngineCommand::FetchLogs { tag, job_ids })
    }
}

async fn handle_command(
    api: &dyn JobsApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::ListJobs => EngineEvent::JobsListed(api.list_jobs().await),
        EngineCommand::FetchStatuses { tag, job_ids } => {
            let result = api.fetch_statuses(&job_ids).await;
            EngineEvent::StatusesFetched {
                tag,
                job_ids,
                result,
            }
        }
        EngineCommand::FetchLogs { tag, job_ids } => {
            let result = api.fetch_logs(&job_ids).await;
            EngineEvent::LogsFetched {
                tag,
                job_ids,
                result,
            }
        }
    };
    if event_tx.send(event).is_err() {
        board_debug!("event receiver gone; dropping engine result");
    }
}
