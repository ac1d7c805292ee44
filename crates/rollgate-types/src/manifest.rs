//! GitOps target manifest records
//!
//! Only the fields Rollgate writes are modelled; the controller owns the full
//! schema.

use crate::spec::SyncPolicy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const APPLICATION_API_VERSION: &str = "argoproj.io/v1alpha1";
pub const APPLICATION_KIND: &str = "Application";

/// An Argo CD `Application` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ApplicationSpec,
}

impl Application {
    pub fn new(metadata: ObjectMeta, spec: ApplicationSpec) -> Self {
        Self {
            api_version: APPLICATION_API_VERSION.to_string(),
            kind: APPLICATION_KIND.to_string(),
            metadata,
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    pub project: String,
    pub source: ApplicationSource,
    pub destination: ApplicationDestination,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_policy: Option<SyncPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
    #[serde(rename = "repoURL")]
    pub repo_url: String,

    pub path: String,

    /// Revision pointer rewritten by the deploy job on every run
    pub target_revision: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<SourceDirectory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDirectory {
    pub recurse: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

/// Target cluster and namespace; exactly one of `name`/`server` is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    pub namespace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_serializes_controller_field_names() {
        let app = Application::new(
            ObjectMeta {
                name: "checkout-staging-c1".into(),
                namespace: "argocd".into(),
                labels: IndexMap::new(),
            },
            ApplicationSpec {
                project: "default".into(),
                source: ApplicationSource {
                    repo_url: "https://example.com/repo.git".into(),
                    path: "deploy".into(),
                    target_revision: "HEAD".into(),
                    directory: None,
                },
                destination: ApplicationDestination {
                    name: Some("c1".into()),
                    server: None,
                    namespace: "ns1".into(),
                },
                sync_policy: None,
            },
        );

        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["apiVersion"], APPLICATION_API_VERSION);
        assert_eq!(json["kind"], "Application");
        assert_eq!(json["spec"]["source"]["repoURL"], "https://example.com/repo.git");
        assert_eq!(json["spec"]["source"]["targetRevision"], "HEAD");
        assert!(json["spec"]["destination"].get("server").is_none());
        assert!(json["spec"].get("syncPolicy").is_none());
        assert!(json["metadata"].get("labels").is_none());
        assert_eq!(app.name(), "checkout-staging-c1");
    }
}
