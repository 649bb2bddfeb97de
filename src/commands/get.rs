//! `kk get` - list a resource kind and print it

use anyhow::Result;

use crate::commands::output::{OutputFormat, RenderOptions, Row, render};
use crate::k8s::options::resolve;
use crate::k8s::resources::{ResourceKind, best_effort};
use crate::k8s::{KubeClient, SearchOptions};

/// Everything `kk get` needs besides the client
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub kind: ResourceKind,
    pub search: SearchOptions,
    pub format: OutputFormat,
    pub show_labels: bool,
    /// Print an empty result instead of failing when the list call errors
    pub best_effort: bool,
}

impl GetOptions {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.format,
            show_namespace: self.search.all_namespaces && !self.kind.is_cluster_scoped(),
            show_labels: self.show_labels,
        }
    }

    fn settle<K>(&self, result: Result<Vec<K>>) -> Result<Vec<K>> {
        if self.best_effort {
            Ok(best_effort(self.kind, result))
        } else {
            result
        }
    }
}

/// List `opts.kind` and render it to a string
pub async fn get(client: &KubeClient, opts: &GetOptions) -> Result<String> {
    let search = &opts.search;
    match opts.kind {
        ResourceKind::DaemonSets => finish(opts, client.daemon_sets(search).await),
        ResourceKind::Deployments => finish(opts, client.deployments(search).await),
        ResourceKind::Pods => finish(opts, client.pods(search).await),
        ResourceKind::Nodes => finish(opts, client.nodes(search).await),
        ResourceKind::ConfigMaps => finish(opts, client.config_maps(search).await),
        ResourceKind::Secrets => finish(opts, client.secrets(search).await),
        ResourceKind::StatefulSets => finish(opts, client.stateful_sets(search).await),
        ResourceKind::Services => finish(opts, client.services(search).await),
    }
}

fn finish<K: Row>(opts: &GetOptions, result: Result<Vec<K>>) -> Result<String> {
    let items = opts.settle(result)?;
    crate::log_info!("Listed {} {}", items.len(), opts.kind);
    render(&items, opts.kind.plural(), opts.render_options())
}

/// Handle `kk get`
pub async fn run(client: &KubeClient, opts: &GetOptions) -> Result<()> {
    let rendered = get(client, opts).await?;
    if rendered.is_empty() && opts.format == OutputFormat::Table {
        let (namespace, _) = resolve(&opts.search, client.namespace_source());
        let scope = if namespace.is_empty() || opts.kind.is_cluster_scoped() {
            String::new()
        } else {
            format!(" in {} namespace", namespace)
        };
        eprintln!("No resources found{}.", scope);
    } else {
        print!("{}", rendered);
    }
    Ok(())
}
