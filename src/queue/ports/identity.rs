//! Task identifier generation port.

use crate::queue::domain::TaskId;

/// Produces identifiers for submissions that do not pin their own.
///
/// Injected so tests can substitute a deterministic source.
pub trait TaskIdSource: Send + Sync {
    /// Returns the next task identifier.
    fn generate(&self) -> TaskId;
}

/// Production identifier source backed by random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTaskIdSource;

impl TaskIdSource for RandomTaskIdSource {
    fn generate(&self) -> TaskId {
        TaskId::new()
    }
}
