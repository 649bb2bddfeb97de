//! List operations for the resource kinds kk knows about

use anyhow::{Context, Result};
use clap::ValueEnum;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{ConfigMap, Node, Pod, Secret, Service};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::{self, Debug};

use crate::k8s::client::KubeClient;
use crate::k8s::options::{SearchOptions, resolve};

/// Resource kinds accepted by `kk get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    #[value(name = "daemonsets", aliases = ["daemonset", "ds"])]
    DaemonSets,
    #[value(name = "deployments", aliases = ["deployment", "deploy"])]
    Deployments,
    #[value(name = "pods", aliases = ["pod", "po"])]
    Pods,
    #[value(name = "nodes", aliases = ["node", "no"])]
    Nodes,
    #[value(name = "configmaps", aliases = ["configmap", "cm"])]
    ConfigMaps,
    #[value(name = "secrets", aliases = ["secret"])]
    Secrets,
    #[value(name = "statefulsets", aliases = ["statefulset", "sts"])]
    StatefulSets,
    #[value(name = "services", aliases = ["service", "svc"])]
    Services,
}

impl ResourceKind {
    /// Plural name as kubectl spells it
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::DaemonSets => "daemonsets",
            ResourceKind::Deployments => "deployments",
            ResourceKind::Pods => "pods",
            ResourceKind::Nodes => "nodes",
            ResourceKind::ConfigMaps => "configmaps",
            ResourceKind::Secrets => "secrets",
            ResourceKind::StatefulSets => "statefulsets",
            ResourceKind::Services => "services",
        }
    }

    /// Kind name used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::DaemonSets => "DaemonSet",
            ResourceKind::Deployments => "Deployment",
            ResourceKind::Pods => "Pod",
            ResourceKind::Nodes => "Node",
            ResourceKind::ConfigMaps => "ConfigMap",
            ResourceKind::Secrets => "Secret",
            ResourceKind::StatefulSets => "StatefulSet",
            ResourceKind::Services => "Service",
        }
    }

    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self, ResourceKind::Nodes)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// Legacy error policy: log the failure at debug level and hand back an
/// empty list, so the caller cannot tell "none found" from "call failed".
pub fn best_effort<K>(kind: ResourceKind, result: Result<Vec<K>>) -> Vec<K> {
    result.unwrap_or_else(|e| {
        crate::log_debug!("Unable to get {} List: {:#}", kind.kind(), e);
        Vec::new()
    })
}

impl KubeClient {
    /// List a namespaced kind; an empty resolved namespace lists across all of them
    async fn list_namespaced<K>(&self, kind: ResourceKind, opts: &SearchOptions) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let (namespace, list_options) = resolve(opts, self.namespace_source());
        let api: Api<K> = if namespace.is_empty() {
            Api::all(self.client())
        } else {
            Api::namespaced(self.client(), &namespace)
        };

        let scope = if namespace.is_empty() {
            "all namespaces".to_string()
        } else {
            format!("namespace {}", namespace)
        };
        crate::log_debug!("Listing {} in {}", kind, scope);

        let list = api
            .list(&list_options.to_list_params())
            .await
            .with_context(|| format!("Failed to list {} in {}", kind, scope))?;

        crate::log_debug!("Found {} {}", list.items.len(), kind);
        Ok(list.items)
    }

    /// DaemonSets in the resolved namespace
    pub async fn daemon_sets(&self, opts: &SearchOptions) -> Result<Vec<DaemonSet>> {
        self.list_namespaced(ResourceKind::DaemonSets, opts).await
    }

    /// Deployments in the resolved namespace
    pub async fn deployments(&self, opts: &SearchOptions) -> Result<Vec<Deployment>> {
        self.list_namespaced(ResourceKind::Deployments, opts).await
    }

    /// Pods in the resolved namespace
    pub async fn pods(&self, opts: &SearchOptions) -> Result<Vec<Pod>> {
        self.list_namespaced(ResourceKind::Pods, opts).await
    }

    /// Nodes are cluster-scoped; only the selectors of `opts` apply
    pub async fn nodes(&self, opts: &SearchOptions) -> Result<Vec<Node>> {
        let (_, list_options) = resolve(opts, self.namespace_source());
        let api: Api<Node> = Api::all(self.client());

        let list = api
            .list(&list_options.to_list_params())
            .await
            .context("Failed to list nodes")?;

        crate::log_debug!("Found {} nodes", list.items.len());
        Ok(list.items)
    }

    pub async fn config_maps(&self, opts: &SearchOptions) -> Result<Vec<ConfigMap>> {
        self.list_namespaced(ResourceKind::ConfigMaps, opts).await
    }

    pub async fn secrets(&self, opts: &SearchOptions) -> Result<Vec<Secret>> {
        self.list_namespaced(ResourceKind::Secrets, opts).await
    }

    pub async fn stateful_sets(&self, opts: &SearchOptions) -> Result<Vec<StatefulSet>> {
        self.list_namespaced(ResourceKind::StatefulSets, opts).await
    }

    pub async fn services(&self, opts: &SearchOptions) -> Result<Vec<Service>> {
        self.list_namespaced(ResourceKind::Services, opts).await
    }
}
