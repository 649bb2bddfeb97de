//! Configuration for kk

pub mod settings;

pub use settings::Settings;
