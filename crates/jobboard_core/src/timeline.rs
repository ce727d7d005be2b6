use crate::StatusCode;

/// Ordered milestones shown on a job's timeline, indexed 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimelineStage {
    Created = 1,
    InQueue = 2,
    Uploading = 3,
    Processing = 4,
    Parsing = 5,
    Completed = 6,
}

impl TimelineStage {
    pub const ALL: [TimelineStage; 6] = [
        TimelineStage::Created,
        TimelineStage::InQueue,
        TimelineStage::Uploading,
        TimelineStage::Processing,
        TimelineStage::Parsing,
        TimelineStage::Completed,
    ];

    /// 1-based position on the timeline.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineStage::Created => "Created",
            TimelineStage::InQueue => "In Queue",
            TimelineStage::Uploading => "Uploading",
            TimelineStage::Processing => "Processing",
            TimelineStage::Parsing => "Parsing",
            TimelineStage::Completed => "Completed",
        }
    }
}

/// Where a status lands on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageProjection {
    /// Stages `1..=stage` are completed.
    Reached(TimelineStage),
    /// Stages `1..=stage` are completed and `stage` is marked failed.
    FailedAt(TimelineStage),
    /// Status has no place on the timeline; nothing changes.
    Unknown,
}

impl StageProjection {
    pub fn stage(self) -> Option<TimelineStage> {
        match self {
            StageProjection::Reached(stage) | StageProjection::FailedAt(stage) => Some(stage),
            StageProjection::Unknown => None,
        }
    }
}

/// Fixed status-to-stage table: INQ→1, UPL→2, PRO→3, PAR→4, COM→6, FAI→3.
///
/// The index counts completed milestones, so INQ (index 1) means only
/// `Created` is done. Failures are not tracked per stage by the backend and
/// collapse onto index 3.
pub fn project_stage(status: &StatusCode) -> StageProjection {
    match status {
        StatusCode::InQueue => StageProjection::Reached(TimelineStage::Created),
        StatusCode::Uploading => StageProjection::Reached(TimelineStage::InQueue),
        StatusCode::Processing => StageProjection::Reached(TimelineStage::Uploading),
        StatusCode::Parsing => StageProjection::Reached(TimelineStage::Processing),
        StatusCode::Completed => StageProjection::Reached(TimelineStage::Completed),
        StatusCode::Failed => StageProjection::FailedAt(TimelineStage::Uploading),
        StatusCode::Unknown(_) => StageProjection::Unknown,
    }
}
