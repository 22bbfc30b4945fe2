//! Port contracts for task queue coordination.
//!
//! Ports define infrastructure-agnostic interfaces used by queue services.

pub mod identity;
pub mod node;
pub mod resolver;
pub mod store;

pub use identity::{RandomTaskIdSource, TaskIdSource};
pub use node::NodeInformation;
pub use resolver::{
    ContextResolver, ContextResolverError, ContextResolverResult, ResourceDetails,
    SubmitterDetails,
};
pub use store::{AdmissionScope, InsertOutcome, QueueStore, QueueStoreError, QueueStoreResult};
