//! Command handlers

pub mod install;
pub mod manifest;
pub mod route_group;
