//! Author-supplied service specifications
//!
//! A [`Service`] is exactly what the author wrote: every inheritable field is
//! optional (or an empty collection) at every level. Resolution never mutates
//! these types; it produces a [`ResolvedService`](crate::ResolvedService).

use crate::sanitize::cluster_identity;
use crate::workflow::{Job, Step, Triggers};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Top-level unit of deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service name, the first segment of every generated name
    #[serde(default)]
    pub name: String,

    /// Promotion stages, in rollout order
    #[serde(default)]
    pub destination_groups: Vec<DestinationGroup>,

    /// Namespace used by destinations that do not set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_namespace: Option<String>,

    /// Which parts go into generated resource names
    #[serde(default)]
    pub application_name_uniqueness_strategy: UniquenessStrategy,

    /// Manifest source settings
    #[serde(default)]
    pub source: Source,

    /// Service-wide GitOps controller settings
    #[serde(rename = "argoCD", default)]
    pub argocd: ArgoCdSettings,

    /// Service-wide CI settings
    #[serde(default)]
    pub github: ServiceGithub,
}

/// A promotion stage: destinations deployed together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub destinations: Vec<Destination>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_namespace: Option<String>,

    #[serde(rename = "argoCD", default)]
    pub argocd: ArgoCdSettings,

    #[serde(default)]
    pub github: GithubSettings,
}

/// One deployment target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Symbolic cluster name (mutually exclusive with `server`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Cluster API URL (mutually exclusive with `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(rename = "argoCD", default)]
    pub argocd: ArgoCdSettings,

    #[serde(default)]
    pub github: GithubSettings,
}

impl Destination {
    /// Destination targeting a symbolic cluster name
    pub fn named(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: Some(cluster.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Destination targeting a cluster API URL
    pub fn at_server(server: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    pub fn cluster_identity(&self) -> String {
        cluster_identity(self.name.as_deref(), self.server.as_deref())
    }
}

/// Naming uniqueness strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessStrategy {
    /// Append the destination namespace to generated names
    #[serde(default, alias = "usingManyNamespaces")]
    pub include_destination_namespace: bool,

    /// Include the group name in generated names
    #[serde(default = "default_true")]
    pub include_group: bool,
}

impl Default for UniquenessStrategy {
    fn default() -> Self {
        Self {
            include_destination_namespace: false,
            include_group: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where the deployable manifests live in the repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Branch the pipeline checks out and pushes revision bumps to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

/// GitOps controller settings, inheritable at every level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCdSettings {
    /// Login hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Extra arguments for `argocd login`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub login_command_args: Vec<String>,

    /// Extra arguments for `argocd app create` and `argocd app sync`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// Run against a local kube context instead of logging in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_kube_context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_timeout_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_policy: Option<SyncPolicy>,
}

/// CI settings, inheritable at every level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_deploy_steps: Vec<Step>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_deploy_steps: Vec<Step>,

    /// Additional jobs placed next to the deploy job
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra_deploy_jobs: IndexMap<String, Job>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<SecretsPolicy>,
}

/// Service-level CI settings: the inheritable block plus top-level triggers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceGithub {
    #[serde(flatten)]
    pub settings: GithubSettings,

    /// Triggers for the top-level promotion workflow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Triggers>,
}

/// Sync policy copied into the target manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automated: Option<AutomatedSync>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sync_options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedSync {
    #[serde(default)]
    pub prune: bool,

    #[serde(default)]
    pub self_heal: bool,
}

/// How secrets are passed into reusable workflow calls
///
/// Serialized as the keyword `inherit` or as a name → expression map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecretsPolicy {
    /// Pass every caller secret through
    #[default]
    Inherit,
    /// Pass only the listed secrets
    Explicit(IndexMap<String, String>),
}

impl Serialize for SecretsPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SecretsPolicy::Inherit => serializer.serialize_str("inherit"),
            SecretsPolicy::Explicit(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SecretsPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Keyword(String),
            Map(IndexMap<String, String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Keyword(k) if k == "inherit" => Ok(SecretsPolicy::Inherit),
            Repr::Keyword(other) => Err(serde::de::Error::custom(format!(
                "unknown secrets policy {:?}, expected \"inherit\" or a map",
                other
            ))),
            Repr::Map(map) => Ok(SecretsPolicy::Explicit(map)),
        }
    }
}
