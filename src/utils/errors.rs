//! Enhanced error types with actionable suggestions

use colored::Colorize;
use thiserror::Error;

use crate::k8s::kubectl::KubectlError;

/// Error with suggestions shown to the user before exiting
#[derive(Error, Debug)]
#[error("{message}")]
pub struct KkError {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl KkError {
    /// Create a new error with no suggestions
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Display the error with suggestions
    pub fn display(&self) {
        crate::log_error!("{}", self.message);

        if !self.suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &self.suggestions {
                eprintln!("  {} {}", "→".blue(), suggestion);
            }
        }
    }

    // Common error patterns

    /// No usable kubeconfig
    pub fn kubeconfig_unavailable(detail: &str) -> Self {
        Self::new(format!("Unable to load kubeconfig: {}", detail))
            .suggest("Set KUBECONFIG or pass --kubeconfig <path>")
            .suggest("Verify ~/.kube/config exists and is readable")
    }

    /// Context named on the command line or in config does not exist
    pub fn context_not_found(context: &str) -> Self {
        Self::new(format!("Context '{}' not found in kubeconfig", context))
            .suggest("List contexts with: kubectl config get-contexts")
            .suggest("Drop --context to use the current context")
    }

    /// API server could not be reached
    pub fn cluster_unreachable() -> Self {
        Self::new("Unable to reach the Kubernetes API server")
            .suggest("Check that the cluster is running and reachable")
            .suggest("Verify the current context: kubectl config current-context")
            .suggest("Use --best-effort to print empty results instead of failing")
    }

    /// RBAC rejected the list call
    pub fn permission_denied(operation: &str) -> Self {
        Self::new(format!("Permission denied: {}", operation))
            .suggest("Verify you have list permissions for this resource")
            .suggest("Check with: kubectl auth can-i list <resource>")
    }

    /// Tool not found error
    pub fn tool_not_found(tool: &str, install_hint: &str) -> Self {
        Self::new(format!("Required tool '{}' not found", tool))
            .suggest(format!("Install with: {}", install_hint))
            .suggest("Ensure the tool is in your PATH")
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: KkError) -> ! {
    error.display();
    std::process::exit(1);
}

/// Convert anyhow error to KkError when possible
pub fn enhance_error(err: anyhow::Error) -> KkError {
    // kubectl failures carry kubectl's own words; keep them out of the text matching
    if let Some(kubectl) = err.chain().find_map(|e| e.downcast_ref::<KubectlError>()) {
        return match kubectl {
            KubectlError::NotFound { binary } => {
                KkError::tool_not_found(binary, "https://kubernetes.io/docs/tasks/tools/")
            }
            _ => KkError::new(format!("{:#}", err)).suggest("Run with -vv for more details"),
        };
    }

    // Match against the whole chain; the root cause usually carries the signal
    let err_str = format!("{:#}", err);
    let lower = err_str.to_lowercase();

    if let Some(context) = extract_quoted(&err_str, "context '")
        && lower.contains("not found")
    {
        return KkError::context_not_found(context);
    }

    if lower.contains("kubeconfig") {
        return KkError::kubeconfig_unavailable(&err_str);
    }

    if lower.contains("connection refused")
        || lower.contains("timed out")
        || lower.contains("dns error")
    {
        return KkError::cluster_unreachable();
    }

    if lower.contains("forbidden") || lower.contains("unauthorized") {
        return KkError::permission_denied(&err_str);
    }

    KkError::new(err_str).suggest("Run with -vv for more details")
}

/// Extract the text between `prefix` and the next single quote
fn extract_quoted<'a>(msg: &'a str, prefix: &str) -> Option<&'a str> {
    let start = msg.find(prefix)? + prefix.len();
    let end = msg[start..].find('\'')?;
    Some(&msg[start..start + end])
}
