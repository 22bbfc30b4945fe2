//! Brunel: background analysis task coordination.
//!
//! This crate provides the task queue and execution coordinator for
//! background analysis jobs: uniqueness-constrained admission control,
//! atomic worker claiming, cancellation and failure recording, and
//! cluster-wide worker pause/resume, all backed by a shared persistent
//! store that multiple nodes access concurrently.
//!
//! # Architecture
//!
//! Brunel follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, fakes)
//!
//! # Modules
//!
//! - [`queue`]: Task admission, lifecycle tracking, and pause coordination

pub mod queue;
