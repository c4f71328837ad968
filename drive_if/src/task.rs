//! # Task status
//!
//! Controllers which run for several ticks report their lifecycle to the orchestrator once per
//! tick instead of suspending.

use serde::{Deserialize, Serialize};

/// Result of one tick of a task.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// The task has finished successfully and should not be ticked again without a restart.
    Succeeded,

    /// The task is still running and expects to be ticked next cycle.
    InProgress,

    /// The task has stopped without completing. All actuator outputs were zeroed beforehand.
    Aborted,
}

impl TaskStatus {
    /// True if the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        !matches!(self, TaskStatus::InProgress)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::InProgress
    }
}
