//! Stage orchestration.
//!
//! [`StageOrchestrator`] binds the repacker and merge walker to the host
//! build's three lifecycle hooks. [`FollowUpRegistry`] collects the copy
//! obligations static frameworks leave for the app packaging step.

mod follow_up;
mod orchestrator;

pub use follow_up::{
    ENTRY_POINT_TASK_NAME, FollowUpEntry, FollowUpKey, FollowUpRegistry, FollowUpTask,
};
pub use orchestrator::{
    FollowUpRegistration, FrameworkLink, FrameworkLinkReport, LinkKind, ModuleState,
    StageOrchestrator,
};
