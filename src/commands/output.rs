//! Rendering of listed resources as tables, names, JSON or YAML

use anyhow::{Context, Result};
use clap::ValueEnum;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{ConfigMap, Node, Pod, Secret, Service};
use kube::{Resource, ResourceExt};
use serde::Serialize;
use std::str::FromStr;

use crate::utils::{age, keys_string};

const NONE: &str = "<none>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Name,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| anyhow::anyhow!("Unknown output format '{}' (table, name, json, yaml)", s))
    }
}

/// Per-kind table columns, modelled on `kubectl get`
pub trait Row: ResourceExt + Serialize {
    /// Headers after NAME, ending with AGE
    fn headers() -> &'static [&'static str];

    /// Cells matching `headers()`
    fn cells(&self) -> Vec<String>;
}

/// Presentation switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub show_namespace: bool,
    pub show_labels: bool,
}

/// Render a list of resources; `plural` is used for the `name` format prefix
pub fn render<K: Row>(items: &[K], plural: &str, opts: RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Table => Ok(render_table(items, opts)),
        OutputFormat::Name => Ok(items
            .iter()
            .map(|item| format!("{}/{}\n", singular(plural), item.name_any()))
            .collect()),
        OutputFormat::Json => {
            let list = list_value(items)?;
            let mut out = serde_json::to_string_pretty(&list).context("Failed to encode JSON")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => {
            let list = list_value(items)?;
            serde_yaml::to_string(&list).context("Failed to encode YAML")
        }
    }
}

fn singular(plural: &str) -> &str {
    plural.strip_suffix('s').unwrap_or(plural)
}

fn list_value<K: Serialize>(items: &[K]) -> Result<serde_json::Value> {
    let items = serde_json::to_value(items).context("Failed to serialize items")?;
    Ok(serde_json::json!({
        "apiVersion": "v1",
        "kind": "List",
        "metadata": { "resourceVersion": "" },
        "items": items,
    }))
}

fn render_table<K: Row>(items: &[K], opts: RenderOptions) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut header: Vec<String> = Vec::new();
    if opts.show_namespace {
        header.push("NAMESPACE".to_string());
    }
    header.push("NAME".to_string());
    header.extend(K::headers().iter().map(|h| h.to_string()));
    if opts.show_labels {
        header.push("LABELS".to_string());
    }

    let mut rows = vec![header];
    for item in items {
        let mut row = Vec::new();
        if opts.show_namespace {
            row.push(item.namespace().unwrap_or_default());
        }
        row.push(item.name_any());
        row.extend(item.cells());
        if opts.show_labels {
            let labels = keys_string(item.labels());
            row.push(if labels.is_empty() { NONE.to_string() } else { labels });
        }
        rows.push(row);
    }

    format_columns(&rows)
}

/// Left-align columns separated by three spaces, like kubectl's tabwriter
fn format_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{:<width$}   ", cell, width = widths[i]));
            }
        }
        out.push('\n');
    }
    out
}

fn count(n: Option<i32>) -> String {
    n.unwrap_or(0).to_string()
}

impl Row for DaemonSet {
    fn headers() -> &'static [&'static str] {
        &["DESIRED", "CURRENT", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let status = self.status.clone().unwrap_or_default();
        vec![
            status.desired_number_scheduled.to_string(),
            status.current_number_scheduled.to_string(),
            status.number_ready.to_string(),
            count(status.updated_number_scheduled),
            count(status.number_available),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

impl Row for Deployment {
    fn headers() -> &'static [&'static str] {
        &["READY", "UP-TO-DATE", "AVAILABLE", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let desired = self.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
        let status = self.status.clone().unwrap_or_default();
        vec![
            format!("{}/{}", status.ready_replicas.unwrap_or(0), desired),
            count(status.updated_replicas),
            count(status.available_replicas),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

impl Row for StatefulSet {
    fn headers() -> &'static [&'static str] {
        &["READY", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let desired = self.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
        let ready = self.status.as_ref().and_then(|s| s.ready_replicas);
        vec![
            format!("{}/{}", ready.unwrap_or(0), desired),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

impl Row for Pod {
    fn headers() -> &'static [&'static str] {
        &["READY", "STATUS", "RESTARTS", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let total = self.spec.as_ref().map(|s| s.containers.len()).unwrap_or(0);
        let statuses = self
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.clone())
            .unwrap_or_default();
        let ready = statuses.iter().filter(|c| c.ready).count();
        let restarts: i32 = statuses.iter().map(|c| c.restart_count).sum();

        vec![
            format!("{}/{}", ready, total),
            pod_status(self),
            restarts.to_string(),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

/// Phase, overridden by a container's waiting/terminated reason or deletion
fn pod_status(pod: &Pod) -> String {
    if pod.meta().deletion_timestamp.is_some() {
        return "Terminating".to_string();
    }

    let status = match &pod.status {
        Some(status) => status,
        None => return "Unknown".to_string(),
    };

    for container in status.container_statuses.iter().flatten() {
        let Some(state) = &container.state else {
            continue;
        };
        if let Some(reason) = state.waiting.as_ref().and_then(|w| w.reason.clone()) {
            return reason;
        }
        if let Some(reason) = state.terminated.as_ref().and_then(|t| t.reason.clone()) {
            return reason;
        }
    }

    status.phase.clone().unwrap_or_else(|| "Unknown".to_string())
}

impl Row for Node {
    fn headers() -> &'static [&'static str] {
        &["STATUS", "ROLES", "AGE", "VERSION"]
    }

    fn cells(&self) -> Vec<String> {
        let ready = self
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"))
            .map(|c| c.status == "True")
            .unwrap_or(false);
        let mut status = if ready { "Ready" } else { "NotReady" }.to_string();
        if self.spec.as_ref().and_then(|s| s.unschedulable).unwrap_or(false) {
            status.push_str(",SchedulingDisabled");
        }

        let roles: Vec<&str> = self
            .labels()
            .keys()
            .filter_map(|k| k.strip_prefix("node-role.kubernetes.io/"))
            .filter(|r| !r.is_empty())
            .collect();
        let roles = if roles.is_empty() {
            NONE.to_string()
        } else {
            roles.join(",")
        };

        let version = self
            .status
            .as_ref()
            .and_then(|s| s.node_info.as_ref())
            .map(|info| info.kubelet_version.clone())
            .unwrap_or_default();

        vec![
            status,
            roles,
            age(self.meta().creation_timestamp.as_ref()),
            version,
        ]
    }
}

impl Row for ConfigMap {
    fn headers() -> &'static [&'static str] {
        &["DATA", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let entries = self.data.as_ref().map(|d| d.len()).unwrap_or(0)
            + self.binary_data.as_ref().map(|d| d.len()).unwrap_or(0);
        vec![
            entries.to_string(),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

impl Row for Secret {
    fn headers() -> &'static [&'static str] {
        &["TYPE", "DATA", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
            self.data.as_ref().map(|d| d.len()).unwrap_or(0).to_string(),
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

impl Row for Service {
    fn headers() -> &'static [&'static str] {
        &["TYPE", "CLUSTER-IP", "EXTERNAL-IP", "PORT(S)", "AGE"]
    }

    fn cells(&self) -> Vec<String> {
        let spec = self.spec.clone().unwrap_or_default();
        let type_ = spec.type_.clone().unwrap_or_else(|| "ClusterIP".to_string());

        let ports: Vec<String> = spec
            .ports
            .iter()
            .flatten()
            .map(|p| {
                let protocol = p.protocol.as_deref().unwrap_or("TCP");
                match p.node_port {
                    Some(node_port) => format!("{}:{}/{}", p.port, node_port, protocol),
                    None => format!("{}/{}", p.port, protocol),
                }
            })
            .collect();

        vec![
            type_.clone(),
            spec.cluster_ip.clone().unwrap_or_else(|| NONE.to_string()),
            external_ip(self, &type_),
            if ports.is_empty() { NONE.to_string() } else { ports.join(",") },
            age(self.meta().creation_timestamp.as_ref()),
        ]
    }
}

fn external_ip(svc: &Service, type_: &str) -> String {
    let mut ips: Vec<String> = svc
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|ing| ing.ip.clone().or_else(|| ing.hostname.clone()))
        .collect();
    ips.extend(
        svc.spec
            .as_ref()
            .and_then(|s| s.external_ips.clone())
            .unwrap_or_default(),
    );

    if !ips.is_empty() {
        return ips.join(",");
    }
    match type_ {
        "LoadBalancer" => "<pending>".to_string(),
        "ExternalName" => svc
            .spec
            .as_ref()
            .and_then(|s| s.external_name.clone())
            .unwrap_or_else(|| NONE.to_string()),
        _ => NONE.to_string(),
    }
}
