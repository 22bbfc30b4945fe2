//! Background task queue and execution coordination.
//!
//! This module tracks analysis tasks from submission through claiming to a
//! terminal outcome: admission control with optional uniqueness policies
//! (single and batch submission), the pending → in-progress → terminal
//! state machine with cancellation and failure recording, and the
//! cluster-wide worker pause/resume control loop. Concurrency correctness
//! is delegated to atomic store operations, so multiple nodes can share
//! one queue. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
