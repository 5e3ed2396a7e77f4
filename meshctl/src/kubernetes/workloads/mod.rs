//! Workload resources

pub mod pods;
pub mod statefulsets;
