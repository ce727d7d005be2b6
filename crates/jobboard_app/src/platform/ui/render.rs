//! Plain-text renderer: prints row, timeline and log changes as they happen.
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use board_logging::{board_debug, board_warn};
use jobboard_core::{
    DetailPanel, JobSnapshot, JobTableRenderer, LogHandle, RowHandle, StatusCode, TimelineHandle,
    TimelineStage,
};

type SharedOut<W> = Rc<RefCell<W>>;

fn emit<W: Write>(out: &SharedOut<W>, line: &str) {
    if let Err(err) = writeln!(out.borrow_mut(), "{line}") {
        board_warn!("board output failed: {}", err);
    }
}

pub struct TerminalRenderer<W: Write> {
    out: SharedOut<W>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Rc::new(RefCell::new(out)),
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> std::cell::Ref<'_, W> {
        self.out.borrow()
    }
}

impl<W: Write> JobTableRenderer for TerminalRenderer<W> {
    type Row = TerminalRow<W>;
    type Timeline = TerminalTimeline<W>;
    type Logs = TerminalLogs<W>;

    fn render_row(&mut self, job: &JobSnapshot) -> Self::Row {
        let title = match &job.name {
            Some(name) => format!("{name} ({})", job.job_id),
            None => job.job_id.clone(),
        };
        let line = match job.final_duration().filter(|_| job.status.is_terminal()) {
            Some(elapsed) => format!(
                "+ {title}  {}  {}",
                job.status.label(),
                format_elapsed(elapsed)
            ),
            None => format!("+ {title}  {}", job.status.label()),
        };
        emit(&self.out, &line);
        TerminalRow {
            out: self.out.clone(),
            job_id: job.job_id.clone(),
            shown_duration: None,
        }
    }

    fn render_detail_panel(&mut self, job: &JobSnapshot) -> DetailPanel<Self::Timeline, Self::Logs> {
        DetailPanel {
            timeline: TerminalTimeline {
                out: self.out.clone(),
                job_id: job.job_id.clone(),
                events: Vec::new(),
                completed: 0,
                failed: None,
            },
            log_view: TerminalLogs {
                out: self.out.clone(),
                job_id: job.job_id.clone(),
                text: String::new(),
            },
        }
    }

    fn show_no_jobs(&mut self, visible: bool) {
        if visible {
            emit(&self.out, "No jobs yet.");
        }
    }
}

pub struct TerminalRow<W: Write> {
    out: SharedOut<W>,
    job_id: String,
    shown_duration: Option<String>,
}

impl<W: Write> RowHandle for TerminalRow<W> {
    fn set_status(&mut self, status: &StatusCode) {
        emit(
            &self.out,
            &format!("[{}] status: {}", self.job_id, status.label()),
        );
    }

    fn update_duration(&mut self, elapsed: Duration) {
        // Once a second per job is too chatty for stdout.
        let text = format_elapsed(elapsed);
        if self.shown_duration.as_deref() != Some(text.as_str()) {
            board_debug!("[{}] elapsed {}", self.job_id, text);
            self.shown_duration = Some(text);
        }
    }
}

pub struct TerminalTimeline<W: Write> {
    out: SharedOut<W>,
    job_id: String,
    events: Vec<String>,
    completed: usize,
    failed: Option<usize>,
}

impl<W: Write> TerminalTimeline<W> {
    fn print(&self) {
        let marks = self
            .events
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let position = i + 1;
                let mark = if self.failed == Some(position) {
                    "!"
                } else if position <= self.completed {
                    "x"
                } else {
                    " "
                };
                format!("[{mark}] {label}")
            })
            .collect::<Vec<_>>()
            .join("  ");
        emit(&self.out, &format!("[{}] {}", self.job_id, marks));
    }
}

impl<W: Write> TimelineHandle for TerminalTimeline<W> {
    fn add_event(&mut self, label: &str) {
        self.events.push(label.to_string());
    }

    fn set_completed(&mut self, stage: TimelineStage) {
        self.completed = usize::from(stage.index());
        self.print();
    }

    fn set_failed(&mut self, stage: TimelineStage) {
        self.failed = Some(usize::from(stage.index()));
        self.print();
    }
}

pub struct TerminalLogs<W: Write> {
    out: SharedOut<W>,
    job_id: String,
    text: String,
}

impl<W: Write> LogHandle for TerminalLogs<W> {
    fn set_lines(&mut self, lines: &[String]) {
        let text = join_log_lines(lines);
        if text == self.text {
            return;
        }
        for line in text.split('\n') {
            emit(&self.out, &format!("[{}] | {}", self.job_id, line));
        }
        self.text = text;
    }
}

/// Log view text: lines joined with newlines. Empty lines, trailing ones
/// included, are kept.
pub fn join_log_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// `HH:MM:SS`, with a day prefix past 24 hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
