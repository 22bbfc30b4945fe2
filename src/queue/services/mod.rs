//! Application services for queue coordination.

mod admission;
mod pause;

pub use admission::{AdmissionError, AdmissionResult, TaskAdmissionService};
pub use pause::{PauseError, PauseResult, WorkerPauseService};
