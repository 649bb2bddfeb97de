//! Cluster client handle shared by every lister

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

use crate::k8s::options::KubeconfigNamespace;

/// A connected client plus the kubeconfig selection it was built from.
///
/// Built once at startup and passed by reference to the listers.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    namespaces: KubeconfigNamespace,
}

impl KubeClient {
    /// Connect using an explicit kubeconfig and/or context, or the ambient
    /// configuration (KUBECONFIG, ~/.kube/config, in-cluster) when neither is set.
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Self> {
        let config = Self::load_config(kubeconfig, context).await?;
        crate::log_debug!(
            "Using cluster {} (default namespace {})",
            config.cluster_url,
            config.default_namespace
        );

        let namespaces =
            KubeconfigNamespace::new(kubeconfig.map(Path::to_path_buf), context.map(str::to_string))
                .with_fallback(config.default_namespace.clone());
        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self::from_parts(client, namespaces))
    }

    /// Wrap an existing client, e.g. one built against a test server
    pub fn from_parts(client: Client, namespaces: KubeconfigNamespace) -> Self {
        Self { client, namespaces }
    }

    /// Resolve the kube `Config` without connecting
    pub async fn load_config(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Config> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };

        match (kubeconfig, context) {
            (Some(path), _) => {
                let kc = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                Config::from_custom_kubeconfig(kc, &options)
                    .await
                    .with_context(|| format!("Failed to load kubeconfig {}", path.display()))
            }
            (None, Some(ctx)) => Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{}'", ctx)),
            (None, None) => Config::infer()
                .await
                .context("Failed to infer kubeconfig"),
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Source consulted when a list call has no explicit namespace
    pub fn namespace_source(&self) -> &KubeconfigNamespace {
        &self.namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: local
  cluster:
    server: https://127.0.0.1:6443
    insecure-skip-tls-verify: true
- name: remote
  cluster:
    server: https://10.0.0.1:443
    insecure-skip-tls-verify: true
users:
- name: admin
  user:
    token: abc
contexts:
- name: dev
  context:
    cluster: local
    user: admin
    namespace: team-a
- name: prod
  context:
    cluster: remote
    user: admin
"#;

    fn write_kubeconfig() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, KUBECONFIG).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_load_config_current_context() {
        let (_dir, path) = write_kubeconfig();
        let config = KubeClient::load_config(Some(path.as_path()), None).await.unwrap();
        assert_eq!(config.default_namespace, "team-a");
        assert_eq!(config.cluster_url.host(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_load_config_context_override() {
        let (_dir, path) = write_kubeconfig();
        let config = KubeClient::load_config(Some(path.as_path()), Some("prod"))
            .await
            .unwrap();
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_load_config_unknown_context() {
        let (_dir, path) = write_kubeconfig();
        assert!(
            KubeClient::load_config(Some(path.as_path()), Some("missing"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let path = PathBuf::from("/nonexistent/kubeconfig");
        assert!(KubeClient::load_config(Some(path.as_path()), None).await.is_err());
    }
}
