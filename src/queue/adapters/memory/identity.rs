//! Deterministic task identifier source for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::queue::{domain::TaskId, ports::TaskIdSource};

/// Identifier source producing the sequence 1, 2, 3, … as UUIDs.
#[derive(Debug, Default)]
pub struct SequentialTaskIdSource {
    next: AtomicU64,
}

impl SequentialTaskIdSource {
    /// Creates a source starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskIdSource for SequentialTaskIdSource {
    fn generate(&self) -> TaskId {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        TaskId::from_uuid(Uuid::from_u128(u128::from(sequence)))
    }
}
