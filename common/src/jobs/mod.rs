use crate::model::merge::BatchReport;
use serde::{Deserialize, Serialize};

/// Lifecycle of a background dispatch job as seen by a polling client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of rows attempted and the latest status line.
    InProgress { percent: u32, message: String },
    /// The batch ran to the end; the report may still carry per-row failures.
    Completed(BatchReport),
    /// The batch aborted before finishing. No row should be assumed sent.
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}
