//! Namespace and selector resolution for list calls

use anyhow::{Context, Result, anyhow};
use kube::api::ListParams;
use kube::config::Kubeconfig;
use std::path::PathBuf;

/// Namespace used when nothing better is known
pub const DEFAULT_NAMESPACE: &str = "default";

/// User-supplied filters for a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub namespace: Option<String>,
    /// Overrides `namespace` when set
    pub all_namespaces: bool,
    pub selector: String,
    pub field_selector: String,
}

/// Selectors handed to the API server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub label_selector: String,
    pub field_selector: String,
}

impl ListOptions {
    /// Empty selectors are left off the request entirely
    pub fn to_list_params(&self) -> ListParams {
        let mut params = ListParams::default();
        if !self.label_selector.is_empty() {
            params = params.labels(&self.label_selector);
        }
        if !self.field_selector.is_empty() {
            params = params.fields(&self.field_selector);
        }
        params
    }
}

/// Where the fallback namespace comes from when none was given
pub trait NamespaceSource {
    fn current_namespace(&self) -> Result<String>;
}

/// Reads the namespace of a kubeconfig context.
///
/// `path` of `None` follows the standard loading rules (`KUBECONFIG`, then
/// `~/.kube/config`); `context` of `None` uses `current-context`.
/// `fallback` answers when no kubeconfig can be read at all, e.g. the
/// service account namespace of an in-cluster config.
#[derive(Debug, Clone, Default)]
pub struct KubeconfigNamespace {
    pub path: Option<PathBuf>,
    pub context: Option<String>,
    pub fallback: Option<String>,
}

impl KubeconfigNamespace {
    pub fn new(path: Option<PathBuf>, context: Option<String>) -> Self {
        Self {
            path,
            context,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, namespace: impl Into<String>) -> Self {
        self.fallback = Some(namespace.into()).filter(|ns| !ns.is_empty());
        self
    }

    fn read(&self) -> Result<Kubeconfig> {
        match &self.path {
            Some(path) => Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display())),
            None => Kubeconfig::read().context("Failed to read kubeconfig"),
        }
    }
}

impl NamespaceSource for KubeconfigNamespace {
    fn current_namespace(&self) -> Result<String> {
        let kubeconfig = match (self.read(), &self.fallback) {
            (Ok(kubeconfig), _) => kubeconfig,
            (Err(e), Some(fallback)) => {
                crate::log_debug!("Using namespace {} from cluster config: {:#}", fallback, e);
                return Ok(fallback.clone());
            }
            (Err(e), None) => return Err(e),
        };
        namespace_for_context(&kubeconfig, self.context.as_deref())
    }
}

/// Namespace of `context` (or current-context) in an already loaded kubeconfig
pub fn namespace_for_context(kubeconfig: &Kubeconfig, context: Option<&str>) -> Result<String> {
    let name = match context {
        Some(name) => name,
        None => kubeconfig
            .current_context
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("current-context is not set in kubeconfig"))?,
    };

    let named = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| anyhow!("context '{}' not found in kubeconfig", name))?;

    Ok(named
        .context
        .as_ref()
        .and_then(|ctx| ctx.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()))
}

/// Resolve search options into the namespace to query and the list options.
///
/// An empty namespace means all namespaces. Failure to consult `source` is
/// not an error: it is logged at debug level and `"default"` is used.
pub fn resolve(opts: &SearchOptions, source: &dyn NamespaceSource) -> (String, ListOptions) {
    let namespace = if opts.all_namespaces {
        String::new()
    } else if let Some(ns) = opts.namespace.as_deref().filter(|ns| !ns.is_empty()) {
        ns.to_string()
    } else {
        match source.current_namespace() {
            Ok(ns) => ns,
            Err(e) => {
                crate::log_debug!("Failed to resolve namespace: {:#}", e);
                DEFAULT_NAMESPACE.to_string()
            }
        }
    };

    let list_options = ListOptions {
        label_selector: opts.selector.clone(),
        field_selector: opts.field_selector.clone(),
    };

    (namespace, list_options)
}

/// Namespace from the standard kubeconfig loading rules, without overrides
pub fn default_namespace() -> String {
    KubeconfigNamespace::default()
        .current_namespace()
        .unwrap_or_else(|e| {
            crate::log_debug!("Falling back to default namespace: {:#}", e);
            DEFAULT_NAMESPACE.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed(&'static str);

    impl NamespaceSource for Fixed {
        fn current_namespace(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl NamespaceSource for Failing {
        fn current_namespace(&self) -> Result<String> {
            Err(anyhow!("no kubeconfig"))
        }
    }

    /// Counts lookups so tests can assert the source was never consulted
    struct Counting(Cell<u32>);

    impl NamespaceSource for Counting {
        fn current_namespace(&self) -> Result<String> {
            self.0.set(self.0.get() + 1);
            Ok("ambient".to_string())
        }
    }

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: local
  cluster:
    server: https://127.0.0.1:6443
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
- name: bare
  context:
    cluster: local
    user: admin
"#;

    #[test]
    fn test_all_namespaces_wins() {
        let opts = SearchOptions {
            namespace: Some("ns1".to_string()),
            all_namespaces: true,
            ..Default::default()
        };
        let source = Counting(Cell::new(0));
        let (ns, _) = resolve(&opts, &source);
        assert_eq!(ns, "");
        assert_eq!(source.0.get(), 0);
    }

    #[test]
    fn test_explicit_namespace() {
        let opts = SearchOptions {
            namespace: Some("ns1".to_string()),
            ..Default::default()
        };
        let source = Counting(Cell::new(0));
        let (ns, _) = resolve(&opts, &source);
        assert_eq!(ns, "ns1");
        assert_eq!(source.0.get(), 0);
    }

    #[test]
    fn test_ambient_namespace() {
        let (ns, _) = resolve(&SearchOptions::default(), &Fixed("team-b"));
        assert_eq!(ns, "team-b");

        // an empty explicit namespace counts as not given
        let opts = SearchOptions {
            namespace: Some(String::new()),
            ..Default::default()
        };
        let (ns, _) = resolve(&opts, &Fixed("team-b"));
        assert_eq!(ns, "team-b");
    }

    #[test]
    fn test_lookup_failure_falls_back_to_default() {
        let (ns, _) = resolve(&SearchOptions::default(), &Failing);
        assert_eq!(ns, "default");
    }

    #[test]
    fn test_selectors_carried_through() {
        let opts = SearchOptions {
            all_namespaces: true,
            selector: "app=web".to_string(),
            field_selector: "status.phase=Running".to_string(),
            ..Default::default()
        };
        let (_, list) = resolve(&opts, &Failing);
        assert_eq!(list.label_selector, "app=web");
        assert_eq!(list.field_selector, "status.phase=Running");

        let params = list.to_list_params();
        assert_eq!(params.label_selector.as_deref(), Some("app=web"));
        assert_eq!(params.field_selector.as_deref(), Some("status.phase=Running"));
    }

    #[test]
    fn test_empty_selectors_omitted() {
        let params = ListOptions::default().to_list_params();
        assert!(params.label_selector.is_none());
        assert!(params.field_selector.is_none());
    }

    #[test]
    fn test_namespace_for_context() {
        let kubeconfig = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        assert_eq!(namespace_for_context(&kubeconfig, None).unwrap(), "team-a");
        assert_eq!(
            namespace_for_context(&kubeconfig, Some("bare")).unwrap(),
            "default"
        );
        let err = namespace_for_context(&kubeconfig, Some("missing")).unwrap_err();
        assert!(err.to_string().contains("context 'missing' not found"));
    }

    #[test]
    fn test_kubeconfig_namespace_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, KUBECONFIG).unwrap();

        let source = KubeconfigNamespace::new(Some(path.clone()), None);
        assert_eq!(source.current_namespace().unwrap(), "team-a");

        let source = KubeconfigNamespace::new(Some(path), Some("bare".to_string()));
        assert_eq!(source.current_namespace().unwrap(), "default");
    }

    #[test]
    fn test_kubeconfig_namespace_missing_file() {
        let source = KubeconfigNamespace::new(Some(PathBuf::from("/nonexistent/kubeconfig")), None);
        assert!(source.current_namespace().is_err());

        let (ns, _) = resolve(&SearchOptions::default(), &source);
        assert_eq!(ns, "default");
    }

    #[test]
    fn test_fallback_when_kubeconfig_unreadable() {
        let source = KubeconfigNamespace::new(Some(PathBuf::from("/nonexistent/kubeconfig")), None)
            .with_fallback("from-service-account");
        assert_eq!(source.current_namespace().unwrap(), "from-service-account");

        let (ns, _) = resolve(&SearchOptions::default(), &source);
        assert_eq!(ns, "from-service-account");
    }

    #[test]
    fn test_fallback_ignored_when_kubeconfig_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, KUBECONFIG).unwrap();

        let source = KubeconfigNamespace::new(Some(path.clone()), None).with_fallback("other");
        assert_eq!(source.current_namespace().unwrap(), "team-a");

        // an unknown context is still an error, not the fallback
        let source = KubeconfigNamespace::new(Some(path), Some("missing".to_string()))
            .with_fallback("other");
        assert!(source.current_namespace().is_err());
    }

    #[test]
    fn test_default_namespace_never_empty() {
        // whatever the ambient kubeconfig looks like, a name comes back
        assert!(!default_namespace().is_empty());
    }
}
