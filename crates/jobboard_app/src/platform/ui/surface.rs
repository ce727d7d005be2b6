use std::collections::HashMap;

use board_logging::board_warn;
use jobboard_core::{
    DetailPanel, Effect, JobId, JobTableRenderer, LogHandle, RowHandle, TimelineHandle,
};

struct JobWidgets<R: JobTableRenderer> {
    row: R::Row,
    panel: DetailPanel<R::Timeline, R::Logs>,
}

/// Keeps the handles a renderer returned and routes render effects to them.
pub struct BoardSurface<R: JobTableRenderer> {
    renderer: R,
    widgets: HashMap<JobId, JobWidgets<R>>,
}

impl<R: JobTableRenderer> BoardSurface<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            widgets: HashMap::new(),
        }
    }

    /// Applies a render effect. Returns false for effects that are not about rendering.
    pub fn apply(&mut self, effect: &Effect) -> bool {
        match effect {
            Effect::RenderJob { job } => {
                let (row, panel) = self.renderer.render_job(job);
                self.widgets
                    .insert(job.job_id.clone(), JobWidgets { row, panel });
            }
            Effect::ShowNoJobs { visible } => self.renderer.show_no_jobs(*visible),
            Effect::SetStatus { job_id, status } => {
                if let Some(widgets) = self.widgets_mut(job_id) {
                    widgets.row.set_status(status);
                }
            }
            Effect::SetTimelineCompleted { job_id, stage } => {
                if let Some(widgets) = self.widgets_mut(job_id) {
                    widgets.panel.timeline.set_completed(*stage);
                }
            }
            Effect::SetTimelineFailed { job_id, stage } => {
                if let Some(widgets) = self.widgets_mut(job_id) {
                    widgets.panel.timeline.set_failed(*stage);
                }
            }
            Effect::SetLogs { job_id, lines } => {
                if let Some(widgets) = self.widgets_mut(job_id) {
                    widgets.panel.log_view.set_lines(lines);
                }
            }
            Effect::UpdateDuration { job_id, elapsed } => {
                if let Some(widgets) = self.widgets_mut(job_id) {
                    widgets.row.update_duration(*elapsed);
                }
            }
            Effect::FetchStatuses { .. } | Effect::FetchLogs { .. } | Effect::StopPolling => {
                return false;
            }
        }
        true
    }

    fn widgets_mut(&mut self, job_id: &str) -> Option<&mut JobWidgets<R>> {
        let widgets = self.widgets.get_mut(job_id);
        if widgets.is_none() {
            board_warn!("no rendered row for job {}", job_id);
        }
        widgets
    }
}
