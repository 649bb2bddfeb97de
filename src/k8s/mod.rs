//! Kubernetes operations

pub mod client;
pub mod kubectl;
pub mod options;
pub mod resources;

pub use client::KubeClient;
pub use options::{ListOptions, SearchOptions};
pub use resources::ResourceKind;
