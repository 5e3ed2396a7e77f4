//! Cluster-scoped resources

pub mod namespaces;
pub mod nodes;
