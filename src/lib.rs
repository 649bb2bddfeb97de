//! kk - list common Kubernetes resources and pass through to kubectl

pub mod commands;
pub mod config;
pub mod k8s;
pub mod utils;
