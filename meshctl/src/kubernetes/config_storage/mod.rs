//! Configuration and storage resources

pub mod configmaps;
pub mod volumes;
