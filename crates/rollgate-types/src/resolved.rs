//! Resolved service trees
//!
//! After cascade resolution every inheritable field holds a concrete value
//! plus the [`Origin`] it was taken from. The author's [`Service`] stays
//! untouched next to it, so tests and diagnostics can tell explicitly-set
//! values from inherited ones.

use crate::ids::DestinationKey;
use crate::sanitize::{cluster_identity, sanitize};
use crate::spec::{
    ArgoCdSettings, Destination, DestinationGroup, GithubSettings, SecretsPolicy, Service,
    ServiceGithub, Source, SyncPolicy, UniquenessStrategy,
};
use crate::workflow::{Job, Step, Triggers};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// The level a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Destination,
    Group,
    Service,
    /// Static default; no level set the field
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Destination => write!(f, "destination"),
            Origin::Group => write!(f, "group"),
            Origin::Service => write!(f, "service"),
            Origin::Default => write!(f, "default"),
        }
    }
}

/// A resolved value and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Resolved<T> {
    pub fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            origin: self.origin,
        }
    }

    pub fn is_default(&self) -> bool {
        self.origin == Origin::Default
    }
}

/// Inheritable settings after resolution, shared by groups and destinations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSettings {
    pub hostname: Resolved<String>,
    pub login_args: Resolved<Vec<String>>,
    pub extra_args: Resolved<Vec<String>>,
    pub kube_context: Resolved<Option<String>>,
    pub sync_timeout_seconds: Resolved<u32>,
    pub retry_limit: Resolved<u32>,
    pub sync_policy: Resolved<Option<SyncPolicy>>,
    pub pre_deploy_steps: Resolved<Vec<Step>>,
    pub post_deploy_steps: Resolved<Vec<Step>>,
    pub extra_deploy_jobs: Resolved<IndexMap<String, Job>>,
    pub env: Resolved<IndexMap<String, String>>,
    pub secrets: Resolved<SecretsPolicy>,
}

impl ResolvedSettings {
    /// Write every resolved value back as explicitly set
    pub fn to_settings(&self) -> (ArgoCdSettings, GithubSettings) {
        let argocd = ArgoCdSettings {
            hostname: non_empty(&self.hostname.value),
            login_command_args: self.login_args.value.clone(),
            extra_args: self.extra_args.value.clone(),
            use_kube_context: self.kube_context.value.clone(),
            sync_timeout_seconds: Some(self.sync_timeout_seconds.value),
            retry_limit: Some(self.retry_limit.value),
            sync_policy: self.sync_policy.value.clone(),
        };
        let github = GithubSettings {
            pre_deploy_steps: self.pre_deploy_steps.value.clone(),
            post_deploy_steps: self.post_deploy_steps.value.clone(),
            extra_deploy_jobs: self.extra_deploy_jobs.value.clone(),
            env: self.env.value.clone(),
            secrets: Some(self.secrets.value.clone()),
        };
        (argocd, github)
    }
}

/// Service-level source settings with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub path: String,
    pub commit_branch: String,
    pub include: String,
    pub exclude: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDestination {
    /// Symbolic cluster name as authored
    pub cluster_name: Option<String>,
    /// Cluster API URL as authored
    pub server: Option<String>,
    pub namespace: Resolved<String>,
    pub settings: ResolvedSettings,
}

impl ResolvedDestination {
    pub fn cluster_identity(&self) -> String {
        cluster_identity(self.cluster_name.as_deref(), self.server.as_deref())
    }

    pub fn key(&self) -> DestinationKey {
        DestinationKey::new(&self.cluster_identity(), &self.namespace.value)
    }

    fn to_spec(&self) -> Destination {
        let (argocd, github) = self.settings.to_settings();
        Destination {
            name: self.cluster_name.clone(),
            server: self.server.clone(),
            namespace: non_empty(&self.namespace.value),
            argocd,
            github,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub name: String,
    pub namespace: Resolved<String>,
    pub settings: ResolvedSettings,
    pub destinations: Vec<ResolvedDestination>,
}

impl ResolvedGroup {
    /// Job key of this group's stage in the top-level workflow
    pub fn stage_key(&self) -> String {
        sanitize(&self.name)
    }

    fn to_spec(&self) -> DestinationGroup {
        let (argocd, github) = self.settings.to_settings();
        DestinationGroup {
            name: self.name.clone(),
            destinations: self.destinations.iter().map(ResolvedDestination::to_spec).collect(),
            destination_namespace: non_empty(&self.namespace.value),
            argocd,
            github,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedService {
    pub name: String,
    pub source: ResolvedSource,
    pub uniqueness: UniquenessStrategy,
    pub triggers: Triggers,
    pub groups: Vec<ResolvedGroup>,
}

impl ResolvedService {
    /// Convert back into an author tree where every group and destination
    /// sets every field explicitly. Resolving the result yields the same
    /// values as `self`.
    pub fn to_spec(&self) -> Service {
        Service {
            name: self.name.clone(),
            destination_groups: self.groups.iter().map(ResolvedGroup::to_spec).collect(),
            destination_namespace: None,
            application_name_uniqueness_strategy: self.uniqueness.clone(),
            source: Source {
                path: Some(self.source.path.clone()),
                commit_branch: Some(self.source.commit_branch.clone()),
                include: Some(self.source.include.clone()),
                exclude: self.source.exclude.clone(),
            },
            argocd: ArgoCdSettings::default(),
            github: ServiceGithub {
                settings: GithubSettings::default(),
                on: Some(self.triggers.clone()),
            },
        }
    }

    /// Every destination with its group, in declaration order
    pub fn destinations(&self) -> impl Iterator<Item = (&ResolvedGroup, &ResolvedDestination)> {
        self.groups
            .iter()
            .flat_map(|g| g.destinations.iter().map(move |d| (g, d)))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_map_keeps_origin() {
        let r = Resolved::new("ctx".to_string(), Origin::Group).map(Some);
        assert_eq!(r.value.as_deref(), Some("ctx"));
        assert_eq!(r.origin, Origin::Group);
        assert!(!r.is_default());
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(Origin::Default.to_string(), "default");
        assert_eq!(Origin::Destination.to_string(), "destination");
    }
}
