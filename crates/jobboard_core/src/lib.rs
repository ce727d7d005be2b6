//! Job board core: pure state machine for job lifecycle tracking.
mod effect;
mod msg;
mod registry;
mod render;
mod state;
mod status;
mod timeline;
mod update;
mod view_model;

pub use effect::{Effect, FetchOrigin};
pub use msg::{JobSnapshot, Msg};
pub use registry::JobRegistry;
pub use render::{DetailPanel, JobTableRenderer, LogHandle, RowHandle, TimelineHandle};
pub use state::{BoardState, JobId};
pub use status::StatusCode;
pub use timeline::{project_stage, StageProjection, TimelineStage};
pub use update::update;
pub use view_model::{BoardViewModel, JobRowView};
