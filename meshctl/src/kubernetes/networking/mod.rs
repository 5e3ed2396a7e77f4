//! Networking resources

pub mod services;
