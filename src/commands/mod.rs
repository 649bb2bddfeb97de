//! Command implementations for the kk CLI

pub mod config;
pub mod get;
pub mod output;
pub mod raw;
