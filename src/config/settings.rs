//! Configuration file support for kk

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub kubectl: KubectlSettings,

    #[serde(default)]
    pub behavior: Behavior,

    #[serde(default)]
    pub output: OutputSettings,
}

/// Fallbacks for flags not given on the command line
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Defaults {
    /// Namespace used when neither --namespace nor --all-namespaces is given.
    /// If not set, the kubeconfig context namespace is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Kubeconfig context to use instead of current-context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Kubeconfig path, overridden by --kubeconfig / KUBECONFIG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
}

/// External kubectl invocation
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KubectlSettings {
    #[serde(default = "default_kubectl_binary")]
    pub binary: String,

    /// Extra arguments appended to every raw invocation, shell-quoted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<String>,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    /// Print empty results instead of failing when a list call errors
    #[serde(default)]
    pub best_effort: bool,

    #[serde(default = "default_true")]
    pub colors: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputSettings {
    #[serde(default = "default_output_format")]
    pub format: String,
}

// Default value functions
fn default_kubectl_binary() -> String {
    "kubectl".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> String {
    "table".to_string()
}

impl Default for KubectlSettings {
    fn default() -> Self {
        Self {
            binary: default_kubectl_binary(),
            extra_args: None,
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            best_effort: false,
            colors: default_true(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: default_output_format(),
        }
    }
}

impl KubectlSettings {
    /// Split `extra_args` with shell quoting rules
    pub fn extra_args(&self) -> Result<Vec<String>> {
        match &self.extra_args {
            Some(raw) => shell_words::split(raw)
                .with_context(|| format!("Invalid kubectl.extra_args: {}", raw)),
            None => Ok(Vec::new()),
        }
    }
}

impl Settings {
    /// Load settings from file or return defaults
    pub fn load() -> Self {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path).unwrap_or_else(|e| {
                crate::log_warn!("Ignoring config file: {:#}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        crate::log_debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .kk.toml in current directory
    /// 2. ~/.config/kk/config.toml (XDG config directory)
    pub fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(".kk.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        Self::user_config_path().filter(|p| p.exists())
    }

    /// Location `kk config init` writes to
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kk").join("config.toml"))
    }

    /// Generate example config file content
    pub fn example_config() -> String {
        r#"# kk configuration file
# Place this file at ~/.config/kk/config.toml or .kk.toml in your project

[defaults]
# namespace = "team-a"            # Used when -n/-A are not given
# context = "staging"             # Overrides the kubeconfig current-context
# kubeconfig = "~/.kube/config"   # Overridden by --kubeconfig / KUBECONFIG

[kubectl]
binary = "kubectl"
# extra_args = "--request-timeout=10s"

[behavior]
# Print empty results instead of failing when a list call errors
best_effort = false
colors = true

[output]
format = "table"  # Options: table, name, json, yaml
"#
        .to_string()
    }
}
