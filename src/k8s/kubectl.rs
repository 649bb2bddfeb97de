//! Kubectl wrapper utilities

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubectlError {
    #[error("{binary} not found in PATH")]
    NotFound { binary: String },

    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully; `output` holds what it printed
    #[error("{binary} exited with {status}: {binary} {}", .args.join(" "))]
    Failed {
        binary: String,
        args: Vec<String>,
        status: String,
        output: Vec<String>,
    },
}

impl KubectlError {
    /// Lines captured before the failure, if the command got that far
    pub fn output(&self) -> &[String] {
        match self {
            KubectlError::Failed { output, .. } => output,
            _ => &[],
        }
    }
}

/// Append `--namespace=`, `--context=` and `--selector=` to `args`, in that
/// order, skipping empty inputs.
pub fn command_args<S: Into<String>>(
    args: impl IntoIterator<Item = S>,
    namespace: &str,
    context: &str,
    labels: &str,
) -> Vec<String> {
    let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
    if !namespace.is_empty() {
        args.push(format!("--namespace={}", namespace));
    }
    if !context.is_empty() {
        args.push(format!("--context={}", context));
    }
    if !labels.is_empty() {
        args.push(format!("--selector={}", labels));
    }
    args
}

/// Split combined output on `\n`; a trailing newline yields a trailing empty line
fn split_lines(stdout: &[u8], stderr: &[u8]) -> Vec<String> {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    combined.split('\n').map(str::to_string).collect()
}

/// Run a command and return its stdout followed by its stderr, split into lines
pub fn run_command(name: &str, args: &[String]) -> Result<Vec<String>, KubectlError> {
    run(Command::new(name), name, args)
}

fn run(mut cmd: Command, name: &str, args: &[String]) -> Result<Vec<String>, KubectlError> {
    crate::log_debug!("Running: {} {}", name, shell_words::join(args));

    let output = cmd.args(args).output().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => KubectlError::NotFound {
            binary: name.to_string(),
        },
        _ => KubectlError::Spawn {
            binary: name.to_string(),
            source: e,
        },
    })?;

    let lines = split_lines(&output.stdout, &output.stderr);

    if !output.status.success() {
        return Err(KubectlError::Failed {
            binary: name.to_string(),
            args: args.to_vec(),
            status: output.status.to_string(),
            output: lines,
        });
    }

    Ok(lines)
}

/// Run a command the forgiving way: on failure print a diagnostic to stdout
/// and return whatever output was captured
pub fn run_command_lossy(name: &str, args: &[String]) -> Vec<String> {
    lossy(name, args, run_command(name, args))
}

fn lossy(name: &str, args: &[String], result: Result<Vec<String>, KubectlError>) -> Vec<String> {
    match result {
        Ok(lines) => lines,
        Err(e) => {
            println!("{}", failure_line(name, args));
            crate::log_debug!("{}", e);
            match e {
                KubectlError::Failed { output, .. } => output,
                _ => vec![String::new()],
            }
        }
    }
}

fn failure_line(name: &str, args: &[String]) -> String {
    format!("error running command: {} [{}]", name, shell_words::join(args))
}

/// `kubectl <args> [--namespace=] [--context=] [--selector=]`, combined output as lines
pub fn raw_output(
    namespace: &str,
    context: &str,
    labels: &str,
    args: &[String],
) -> Result<Vec<String>, KubectlError> {
    run_command("kubectl", &command_args(args.iter().cloned(), namespace, context, labels))
}

/// Configured kubectl invocation
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
    kubeconfig: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

impl Kubectl {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            kubeconfig: None,
            extra_args: Vec::new(),
        }
    }

    /// Export `KUBECONFIG` for the child process
    pub fn with_kubeconfig(mut self, kubeconfig: Option<&Path>) -> Self {
        self.kubeconfig = kubeconfig.map(Path::to_path_buf);
        self
    }

    /// Arguments placed after the namespace/context/selector flags
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Full argument list for a raw invocation
    pub fn args_for(&self, args: &[String], namespace: &str, context: &str, labels: &str) -> Vec<String> {
        let mut full = command_args(args.iter().cloned(), namespace, context, labels);
        full.extend(self.extra_args.iter().cloned());
        full
    }

    /// Like [`raw_output`], using this runner's binary, kubeconfig and extra args
    pub fn raw_output(
        &self,
        namespace: &str,
        context: &str,
        labels: &str,
        args: &[String],
    ) -> Result<Vec<String>, KubectlError> {
        let mut cmd = Command::new(&self.binary);
        if let Some(kc) = &self.kubeconfig {
            cmd.env("KUBECONFIG", kc);
        }
        run(cmd, &self.binary, &self.args_for(args, namespace, context, labels))
    }

    /// [`Kubectl::raw_output`] with the forgiving failure handling of [`run_command_lossy`]
    pub fn raw_output_lossy(
        &self,
        namespace: &str,
        context: &str,
        labels: &str,
        args: &[String],
    ) -> Vec<String> {
        let full = self.args_for(args, namespace, context, labels);
        lossy(
            &self.binary,
            &full,
            self.raw_output(namespace, context, labels, args),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_args_all_flags() {
        let args = command_args(["get", "pods"], "ns1", "ctx1", "app=x");
        assert_eq!(
            args,
            strings(&[
                "get",
                "pods",
                "--namespace=ns1",
                "--context=ctx1",
                "--selector=app=x"
            ])
        );
    }

    #[test]
    fn test_command_args_omits_empty() {
        assert_eq!(
            command_args(["get", "pods"], "", "", ""),
            strings(&["get", "pods"])
        );
        assert_eq!(
            command_args(["get", "pods"], "", "ctx1", ""),
            strings(&["get", "pods", "--context=ctx1"])
        );
        assert_eq!(
            command_args(["top", "pod"], "ns1", "", "tier=db"),
            strings(&["top", "pod", "--namespace=ns1", "--selector=tier=db"])
        );
    }

    #[test]
    fn test_command_args_no_base() {
        let args = command_args(Vec::<String>::new(), "ns1", "", "");
        assert_eq!(args, strings(&["--namespace=ns1"]));
    }

    #[test]
    fn test_run_command_success() {
        let lines = run_command("sh", &strings(&["-c", "printf 'a\\nb\\n'"])).unwrap();
        assert_eq!(lines, strings(&["a", "b", ""]));
    }

    #[test]
    fn test_run_command_combines_stderr() {
        let lines = run_command("sh", &strings(&["-c", "echo out; echo err >&2"])).unwrap();
        assert_eq!(lines, strings(&["out", "err", ""]));
    }

    #[test]
    fn test_run_command_failure_keeps_output() {
        let err = run_command("sh", &strings(&["-c", "echo partial; exit 3"])).unwrap_err();
        assert!(matches!(err, KubectlError::Failed { .. }));
        assert_eq!(err.output(), strings(&["partial", ""]).as_slice());
    }

    #[test]
    fn test_run_command_missing_binary() {
        let err = run_command("kk-no-such-binary-xyz", &[]).unwrap_err();
        assert!(matches!(err, KubectlError::NotFound { .. }));
        assert!(err.output().is_empty());
    }

    #[test]
    fn test_run_command_lossy_returns_partial_output() {
        let lines = run_command_lossy("sh", &strings(&["-c", "echo half; exit 1"]));
        assert_eq!(lines, strings(&["half", ""]));

        let lines = run_command_lossy("kk-no-such-binary-xyz", &[]);
        assert_eq!(lines, strings(&[""]));
    }

    #[test]
    fn test_failure_line_lists_args_plainly() {
        assert_eq!(
            failure_line("kubectl", &strings(&["get", "pods", "--namespace=ns1"])),
            "error running command: kubectl [get pods --namespace=ns1]"
        );
        assert_eq!(
            failure_line("kubectl", &strings(&["get", "pods", "-l", "app in (a,b)"])),
            "error running command: kubectl [get pods -l 'app in (a,b)']"
        );
    }

    #[test]
    fn test_runner_args_include_extra() {
        let kubectl = Kubectl::default().with_extra_args(strings(&["--request-timeout=5s"]));
        assert_eq!(kubectl.binary(), "kubectl");
        assert_eq!(
            kubectl.args_for(&strings(&["get", "svc"]), "ns1", "", "app=x"),
            strings(&[
                "get",
                "svc",
                "--namespace=ns1",
                "--selector=app=x",
                "--request-timeout=5s"
            ])
        );
    }

    #[test]
    fn test_runner_exports_kubeconfig() {
        // `sh -c 'echo $KUBECONFIG' --namespace=ns1` runs the script with $0 set
        let kubectl = Kubectl::new("sh").with_kubeconfig(Some(Path::new("/tmp/kk-test-config")));
        let lines = kubectl
            .raw_output("ns1", "", "", &strings(&["-c", "echo $KUBECONFIG"]))
            .unwrap();
        assert_eq!(lines[0], "/tmp/kk-test-config");
    }

    #[test]
    fn test_raw_output_targets_kubectl() {
        // kubectl may or may not be installed where tests run
        match raw_output("", "", "", &strings(&["version", "--client"])) {
            Ok(lines) => assert!(!lines.is_empty()),
            Err(KubectlError::NotFound { binary }) => assert_eq!(binary, "kubectl"),
            Err(e) => assert!(!e.to_string().is_empty()),
        }
    }
}
