//! `kk raw` - pass through to kubectl with kk's namespace/context/selector flags

use anyhow::Result;

use crate::k8s::kubectl::{Kubectl, KubectlError};

/// Inputs for a raw kubectl invocation
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub args: Vec<String>,
    pub namespace: String,
    pub all_namespaces: bool,
    pub context: String,
    pub labels: String,
    /// Print a diagnostic and keep going instead of failing on a bad exit
    pub best_effort: bool,
}

impl RawOptions {
    /// Caller arguments, plus `--all-namespaces` when requested
    fn base_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if self.all_namespaces {
            args.push("--all-namespaces".to_string());
        }
        args
    }

    /// `--all-namespaces` replaces `--namespace=`
    fn namespace(&self) -> &str {
        if self.all_namespaces { "" } else { &self.namespace }
    }
}

/// Run kubectl and return its output lines
pub fn raw(kubectl: &Kubectl, opts: &RawOptions) -> Result<Vec<String>> {
    let base = opts.base_args();

    if opts.best_effort {
        return Ok(kubectl.raw_output_lossy(opts.namespace(), &opts.context, &opts.labels, &base));
    }

    let lines = kubectl.raw_output(opts.namespace(), &opts.context, &opts.labels, &base)?;
    Ok(lines)
}

/// Handle `kk raw`
pub fn run(kubectl: &Kubectl, opts: &RawOptions) -> Result<()> {
    match raw(kubectl, opts) {
        Ok(lines) => {
            print_lines(&lines);
            Ok(())
        }
        Err(e) => {
            if let Some(failure) = e.downcast_ref::<KubectlError>() {
                print_lines(failure.output());
            }
            Err(e)
        }
    }
}

/// Print lines, dropping the empty entry left by a trailing newline
fn print_lines(lines: &[String]) {
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => lines,
    };
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> RawOptions {
        RawOptions {
            args: vec!["-c".to_string(), script.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_all_namespaces_replaces_namespace() {
        let opts = RawOptions {
            args: vec!["get".to_string(), "pods".to_string()],
            namespace: "ns1".to_string(),
            all_namespaces: true,
            ..Default::default()
        };
        let kubectl = Kubectl::default();
        assert_eq!(
            kubectl.args_for(&opts.base_args(), opts.namespace(), "", ""),
            vec!["get", "pods", "--all-namespaces"]
        );
    }

    #[test]
    fn test_raw_success() {
        let lines = raw(&Kubectl::new("sh"), &sh("echo hello")).unwrap();
        assert_eq!(lines, vec!["hello", ""]);
    }

    #[test]
    fn test_raw_failure_is_an_error() {
        let err = raw(&Kubectl::new("sh"), &sh("echo oops; exit 2")).unwrap_err();
        let failure = err.downcast_ref::<KubectlError>().unwrap();
        assert_eq!(failure.output(), ["oops".to_string(), String::new()].as_slice());
    }

    #[test]
    fn test_raw_best_effort_returns_output() {
        let mut opts = sh("echo oops; exit 2");
        opts.best_effort = true;
        let lines = raw(&Kubectl::new("sh"), &opts).unwrap();
        assert_eq!(lines, vec!["oops", ""]);
    }
}
