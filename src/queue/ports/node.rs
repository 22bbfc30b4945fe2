//! Cluster node identity port.

/// Reports the identity of the current cluster node.
///
/// Terminal activity rows are stamped with the node name when one is
/// known; single-node deployments may report `None`.
pub trait NodeInformation: Send + Sync {
    /// Returns the current node name, if the deployment exposes one.
    fn node_name(&self) -> Option<String>;
}
