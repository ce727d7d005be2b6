//! Boundary of the presentation layer.
//!
//! The board never touches a concrete UI. Hosts implement these traits and
//! route [`Effect`](crate::Effect)s to the handles they return.
use std::time::Duration;

use crate::{JobSnapshot, StatusCode, TimelineStage};

/// A job's row in the table.
pub trait RowHandle {
    fn set_status(&mut self, status: &StatusCode);
    /// Redisplays the elapsed time since the job was created.
    fn update_duration(&mut self, elapsed: Duration);
}

pub trait TimelineHandle {
    fn add_event(&mut self, label: &str);
    /// Marks stages `1..=stage` completed.
    fn set_completed(&mut self, stage: TimelineStage);
    fn set_failed(&mut self, stage: TimelineStage);
}

pub trait LogHandle {
    /// Replaces the whole log view.
    fn set_lines(&mut self, lines: &[String]);
}

pub struct DetailPanel<T, L> {
    pub timeline: T,
    pub log_view: L,
}

pub trait JobTableRenderer {
    type Row: RowHandle;
    type Timeline: TimelineHandle;
    type Logs: LogHandle;

    fn render_row(&mut self, job: &JobSnapshot) -> Self::Row;
    fn render_detail_panel(&mut self, job: &JobSnapshot) -> DetailPanel<Self::Timeline, Self::Logs>;
    fn show_no_jobs(&mut self, visible: bool);

    /// Renders the row and detail panel, with one timeline event per stage.
    fn render_job(&mut self, job: &JobSnapshot) -> (Self::Row, DetailPanel<Self::Timeline, Self::Logs>) {
        let row = self.render_row(job);
        let mut panel = self.render_detail_panel(job);
        for stage in TimelineStage::ALL {
            panel.timeline.add_event(stage.label());
        }
        (row, panel)
    }
}
