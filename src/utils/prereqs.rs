//! Prerequisite checking for external tools kk shells out to

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrereqError {
    #[error("Tool '{name}' not found")]
    NotFound { name: String, hint: String },
}

/// Trait for checking prerequisites
pub trait Prerequisite {
    /// Name of the prerequisite tool
    fn name(&self) -> &str;

    /// Check if the tool is available, returning its resolved path
    fn check(&self) -> Result<PathBuf, PrereqError>;

    /// Installation hint for the user
    fn install_hint(&self) -> &str;
}

/// Basic prerequisite that checks if a command exists
pub struct CommandPrereq {
    pub name: String,
    pub hint: String,
}

impl CommandPrereq {
    pub fn new(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: hint.into(),
        }
    }
}

impl Prerequisite for CommandPrereq {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<PathBuf, PrereqError> {
        which::which(&self.name).map_err(|_| PrereqError::NotFound {
            name: self.name.clone(),
            hint: self.hint.clone(),
        })
    }

    fn install_hint(&self) -> &str {
        &self.hint
    }
}

/// Common prerequisites for kk
pub struct CommonPrereqs;

impl CommonPrereqs {
    /// kubectl, or whatever binary the config points at
    pub fn kubectl(binary: &str) -> CommandPrereq {
        CommandPrereq::new(binary, "https://kubernetes.io/docs/tasks/tools/")
    }

    /// Check all prerequisites
    /// Returns (found_tools, missing_tools)
    pub fn check_all(
        prereqs: &[&dyn Prerequisite],
    ) -> (Vec<(String, PathBuf)>, Vec<(String, String)>) {
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for prereq in prereqs {
            match prereq.check() {
                Ok(path) => {
                    crate::log_debug!("{} resolved to {}", prereq.name(), path.display());
                    found.push((prereq.name().to_string(), path));
                }
                Err(PrereqError::NotFound { name, hint }) => {
                    missing.push((name, hint));
                }
            }
        }

        (found, missing)
    }
}
