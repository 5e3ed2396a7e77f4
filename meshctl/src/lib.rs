//! meshctl
//!
//! Installs the EaseMesh control plane onto Kubernetes and manages mesh
//! resources through the control plane's REST API.

pub mod cli;
pub mod commands;
pub mod config;
pub mod http;
pub mod install;
pub mod kubernetes;
pub mod logging;
pub mod meshclient;
pub mod output;
