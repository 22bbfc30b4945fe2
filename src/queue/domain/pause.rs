//! Cluster-wide worker pause states.

use serde::{Deserialize, Serialize};

/// Pause state of the worker fleet.
///
/// The state is never cached: it is recomputed from the persisted pause
/// flag and the number of in-progress queue rows on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkersPauseStatus {
    /// Workers may claim pending tasks.
    Resumed,
    /// A pause was requested; in-progress tasks are draining.
    Pausing,
    /// No task is in progress and claiming is suspended.
    Paused,
}

impl WorkersPauseStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resumed => "RESUMED",
            Self::Pausing => "PAUSING",
            Self::Paused => "PAUSED",
        }
    }
}
