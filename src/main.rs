//! kk CLI - list common Kubernetes resources and pass through to kubectl

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use kk::commands::get::GetOptions;
use kk::commands::output::OutputFormat;
use kk::commands::raw::RawOptions;
use kk::config::Settings;
use kk::k8s::kubectl::Kubectl;
use kk::k8s::options::{KubeconfigNamespace, resolve};
use kk::k8s::{KubeClient, ResourceKind, SearchOptions};
use kk::utils::errors::display_error_and_exit;
use kk::utils::{CommonPrereqs, KkError, Prerequisite, enhance_error, trim_quote_and_space};
use kk::{log_debug, log_info};
use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kk")]
#[command(author, version, about = "List common Kubernetes resources and pass through to kubectl", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    /// -v: INFO, -vv: DEBUG, -vvv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that talks to a cluster
#[derive(Args, Debug, Clone, Default)]
struct TargetArgs {
    /// Namespace to query (defaults to the kubeconfig context namespace)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Query all namespaces; overrides --namespace
    #[arg(short = 'A', long, global = true)]
    all_namespaces: bool,

    /// Label selector, e.g. app=web,tier!=db
    #[arg(short = 'l', long, global = true)]
    selector: Option<String>,

    /// Field selector, e.g. status.phase=Running
    #[arg(long, global = true)]
    field_selector: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Path to kubeconfig file (defaults to KUBECONFIG, then the config file, then ~/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Print empty results instead of failing when a call errors
    #[arg(long, global = true)]
    best_effort: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources of one kind
    Get {
        /// Resource kind (pods, deploy, ds, sts, svc, cm, secrets, nodes)
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Add a LABELS column to table output
        #[arg(long)]
        show_labels: bool,
    },

    /// Run kubectl with the namespace/context/selector flags applied
    Raw {
        /// Arguments passed to kubectl, e.g. `kk raw -- get events`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the namespace list commands would use
    Namespace,

    /// Check prerequisites
    Check,

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings
    Show,

    /// Write an example config file
    Init {
        /// Destination (default: ~/.config/kk/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Command-line flags merged with the config file; flags win
#[derive(Debug, Clone)]
struct Target {
    search: SearchOptions,
    context: Option<String>,
    kubeconfig: Option<PathBuf>,
    best_effort: bool,
    format: OutputFormat,
}

impl Target {
    /// `kubeconfig_env` is the value of `KUBECONFIG`, which ranks between the
    /// flag and the config file
    fn merge(
        args: &TargetArgs,
        settings: &Settings,
        kubeconfig_env: Option<&OsStr>,
    ) -> Result<Self> {
        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(trim_quote_and_space)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let namespace = trimmed(&args.namespace).or_else(|| settings.defaults.namespace.clone());
        let context = trimmed(&args.context).or_else(|| settings.defaults.context.clone());
        let kubeconfig = match (&args.kubeconfig, kubeconfig_env) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(env)) => single_path(env),
            (None, None) => settings.defaults.kubeconfig.as_deref().map(expand_home),
        };

        let format = match args.output {
            Some(format) => format,
            None => settings.output.format.parse()?,
        };

        Ok(Self {
            search: SearchOptions {
                namespace,
                all_namespaces: args.all_namespaces,
                selector: trimmed(&args.selector).unwrap_or_default(),
                field_selector: trimmed(&args.field_selector).unwrap_or_default(),
            },
            context,
            kubeconfig,
            best_effort: args.best_effort || settings.behavior.best_effort,
            format,
        })
    }
}

/// `KUBECONFIG` if set and non-empty
fn kubeconfig_env() -> Option<OsString> {
    env::var_os("KUBECONFIG").filter(|v| !v.is_empty())
}

/// A `KUBECONFIG` naming one file becomes an explicit path. A list stays
/// with the kubeconfig loading rules, which merge it.
fn single_path(value: &OsStr) -> Option<PathBuf> {
    let mut paths = env::split_paths(value).filter(|p| !p.as_os_str().is_empty());
    match (paths.next(), paths.next()) {
        (Some(path), None) => Some(path),
        _ => None,
    }
}

/// Expand a leading `~/` in paths read from the config file
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    kk::utils::logger::init(cli.verbose);

    let settings = Settings::load();
    if !settings.behavior.colors {
        colored::control::set_override(false);
    }

    let kubeconfig_env = kubeconfig_env();
    let result = Target::merge(&cli.target, &settings, kubeconfig_env.as_deref()).and_then(|target| {
        log_debug!("Resolved flags: {:?}", target);
        match cli.command {
            Commands::Get { kind, show_labels } => handle_get_command(&target, kind, show_labels),
            Commands::Raw { args } => handle_raw_command(&target, &settings, args),
            Commands::Namespace => handle_namespace_command(&target),
            Commands::Check => handle_check_command(&settings),
            Commands::Config { command } => handle_config_command(command),
            Commands::Completion { shell } => handle_completion_command(shell),
            Commands::Version => handle_version_command(),
        }
    });

    if let Err(e) = result {
        display_error_and_exit(enhance_error(e));
    }
    Ok(())
}

fn handle_get_command(target: &Target, kind: ResourceKind, show_labels: bool) -> Result<()> {
    let opts = GetOptions {
        kind,
        search: target.search.clone(),
        format: target.format,
        show_labels,
        best_effort: target.best_effort,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client =
            KubeClient::connect(target.kubeconfig.as_deref(), target.context.as_deref()).await?;
        kk::commands::get::run(&client, &opts).await
    })
}

fn handle_raw_command(target: &Target, settings: &Settings, args: Vec<String>) -> Result<()> {
    let kubectl = Kubectl::new(settings.kubectl.binary.clone())
        .with_kubeconfig(target.kubeconfig.as_deref())
        .with_extra_args(settings.kubectl.extra_args()?);

    let opts = RawOptions {
        args,
        namespace: target.search.namespace.clone().unwrap_or_default(),
        all_namespaces: target.search.all_namespaces,
        context: target.context.clone().unwrap_or_default(),
        labels: target.search.selector.clone(),
        best_effort: target.best_effort,
    };

    kk::commands::raw::run(&kubectl, &opts)
}

fn handle_namespace_command(target: &Target) -> Result<()> {
    let source = KubeconfigNamespace::new(target.kubeconfig.clone(), target.context.clone());
    let (namespace, _) = resolve(&target.search, &source);
    println!("{}", namespace);
    Ok(())
}

fn handle_check_command(settings: &Settings) -> Result<()> {
    log_info!("Checking prerequisites...");

    let kubectl = CommonPrereqs::kubectl(&settings.kubectl.binary);
    let prereqs: Vec<&dyn Prerequisite> = vec![&kubectl];

    let (found, missing) = CommonPrereqs::check_all(&prereqs);
    for (name, path) in &found {
        println!("{} {} ({})", "✓".green(), name, path.display());
    }

    if let Some((name, hint)) = missing.into_iter().next() {
        display_error_and_exit(KkError::tool_not_found(&name, &hint));
    }

    println!("{}", "All prerequisites satisfied!".green().bold());
    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => kk::commands::config::show(),
        ConfigCommands::Init { path, force } => kk::commands::config::init(path.as_deref(), force),
    }
}

fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "kk", &mut io::stdout());
    Ok(())
}

fn handle_version_command() -> Result<()> {
    println!("kk {}", env!("CARGO_PKG_VERSION"));
    println!("List common Kubernetes resources and pass through to kubectl");
    Ok(())
}
