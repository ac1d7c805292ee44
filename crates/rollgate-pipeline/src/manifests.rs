//! Target manifest builder
//!
//! One GitOps `Application` per destination. The returned [`ManifestIndex`]
//! is the only link between destinations and their manifest files; the
//! synthesizer looks paths up there instead of re-deriving them.

use crate::error::SynthesisError;
use crate::naming::NameTable;
use indexmap::IndexMap;
use rollgate_types::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, DestinationKey,
    ObjectMeta, ResolvedDestination, ResolvedService, SourceDirectory,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub const DEFAULT_TARGET_REVISION: &str = "HEAD";
pub const DEFAULT_APPLICATION_NAMESPACE: &str = "argocd";
pub const DEFAULT_PROJECT: &str = "default";
pub const DEFAULT_MANIFEST_DIR: &str = ".rollgate/applications";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "rollgate";

/// Manifest generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Repository the controller pulls manifests from
    pub repo_url: String,
    /// Initial revision; deploy jobs overwrite it on every run
    pub target_revision: String,
    /// Namespace the controller watches for applications
    pub application_namespace: String,
    pub project: String,
    /// Repository-relative directory for manifest files
    pub output_dir: String,
}

impl ManifestOptions {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            target_revision: DEFAULT_TARGET_REVISION.to_string(),
            application_namespace: DEFAULT_APPLICATION_NAMESPACE.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            output_dir: DEFAULT_MANIFEST_DIR.to_string(),
        }
    }
}

/// Destination key → manifest path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestIndex(BTreeMap<DestinationKey, String>);

impl ManifestIndex {
    pub fn insert(&mut self, key: DestinationKey, path: String) -> Option<String> {
        self.0.insert(key, path)
    }

    pub fn get(&self, key: &DestinationKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A manifest and where it is written
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    pub path: String,
    pub application: Application,
}

/// Join a repository-relative directory and file name with `/`
pub(crate) fn join_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

fn build_application(
    service: &ResolvedService,
    destination: &ResolvedDestination,
    name: &str,
    options: &ManifestOptions,
) -> Application {
    let mut labels = IndexMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

    let (cluster_name, server) = match destination.cluster_name.as_deref() {
        Some(name) if !name.is_empty() => (Some(name.to_string()), None),
        _ => (None, destination.server.clone()),
    };

    Application::new(
        ObjectMeta {
            name: name.to_string(),
            namespace: options.application_namespace.clone(),
            labels,
        },
        ApplicationSpec {
            project: options.project.clone(),
            source: ApplicationSource {
                repo_url: options.repo_url.clone(),
                path: service.source.path.clone(),
                target_revision: options.target_revision.clone(),
                directory: Some(SourceDirectory {
                    recurse: true,
                    include: Some(service.source.include.clone()),
                    exclude: service.source.exclude.clone(),
                }),
            },
            destination: ApplicationDestination {
                name: cluster_name,
                server,
                namespace: destination.namespace.value.clone(),
            },
            sync_policy: destination.settings.sync_policy.value.clone(),
        },
    )
}

/// Build one manifest per destination and the index pointing at them
#[instrument(skip_all, fields(service = %service.name))]
pub fn build_manifests(
    service: &ResolvedService,
    names: &NameTable,
    options: &ManifestOptions,
) -> Result<(Vec<ManifestRecord>, ManifestIndex), SynthesisError> {
    let mut records = Vec::new();
    let mut index = ManifestIndex::default();

    for (_, destination) in service.destinations() {
        let key = destination.key();
        let resource = &names
            .get(&key)
            .ok_or_else(|| SynthesisError::MissingName(key.clone()))?
            .resource;

        let path = join_path(&options.output_dir, &format!("{}.yaml", resource));
        if index.insert(key, path.clone()).is_some() {
            return Err(SynthesisError::DuplicatePath(path));
        }

        debug!(path = %path, "Built manifest");
        records.push(ManifestRecord {
            path,
            application: build_application(service, destination, resource, options),
        });
    }

    Ok((records, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::resolve;
    use crate::naming::derive_names;
    use rollgate_types::{AutomatedSync, Destination, DestinationGroup, Service, SyncPolicy};

    fn service() -> Service {
        let mut prod = Destination::at_server("https://kube.Local:6443", "web");
        prod.argocd.sync_policy = Some(SyncPolicy {
            automated: Some(AutomatedSync {
                prune: true,
                self_heal: false,
            }),
            sync_options: vec!["CreateNamespace=true".into()],
        });

        Service {
            name: "checkout".into(),
            destination_groups: vec![
                DestinationGroup {
                    name: "staging".into(),
                    destinations: vec![Destination::named("c1", "web")],
                    ..Default::default()
                },
                DestinationGroup {
                    name: "prod".into(),
                    destinations: vec![prod],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("apps/", "a.yaml"), "apps/a.yaml");
        assert_eq!(join_path(".", "a.yaml"), "a.yaml");
        assert_eq!(join_path("", "a.yaml"), "a.yaml");
    }

    #[test]
    fn test_build_manifests() {
        let resolved = resolve(&service());
        let names = derive_names(&resolved).unwrap();
        let options = ManifestOptions::new("https://github.com/acme/checkout.git");
        let (records, index) = build_manifests(&resolved, &names, &options).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(index.len(), 2);
        assert_eq!(
            records[0].path,
            ".rollgate/applications/checkout-staging-c1.yaml"
        );

        let staging = &records[0].application;
        assert_eq!(staging.metadata.namespace, "argocd");
        assert_eq!(staging.metadata.labels[MANAGED_BY_LABEL], "rollgate");
        assert_eq!(staging.spec.destination.name.as_deref(), Some("c1"));
        assert!(staging.spec.destination.server.is_none());
        assert_eq!(staging.spec.source.target_revision, "HEAD");
        assert!(staging.spec.sync_policy.is_none());

        let prod = &records[1].application;
        assert_eq!(prod.name(), "checkout-prod-kube-local-6443");
        assert_eq!(
            prod.spec.destination.server.as_deref(),
            Some("https://kube.Local:6443")
        );
        assert!(prod.spec.sync_policy.as_ref().unwrap().automated.is_some());

        let key = resolved.groups[1].destinations[0].key();
        assert_eq!(
            index.get(&key),
            Some(".rollgate/applications/checkout-prod-kube-local-6443.yaml")
        );
    }

    #[test]
    fn test_missing_name_fails_fast() {
        let resolved = resolve(&service());
        let err = build_manifests(&resolved, &NameTable::default(), &ManifestOptions::new("r"))
            .unwrap_err();
        assert!(matches!(err, SynthesisError::MissingName(_)));
    }
}
