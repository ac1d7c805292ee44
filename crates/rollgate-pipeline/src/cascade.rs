//! Cascade resolution
//!
//! Every inheritable field is taken from the nearest level that sets it:
//! destination, then group, then service, then a typed static default.
//! Collections are never merged; the first non-empty one wins. Empty strings
//! count as unset. Resolution is total, pure and idempotent.

use indexmap::IndexMap;
use rollgate_types::{
    ArgoCdSettings, DestinationGroup, GithubSettings, Job, Origin, Resolved, ResolvedDestination,
    ResolvedGroup, ResolvedService, ResolvedSettings, ResolvedSource, SecretsPolicy, Service,
    Source, Step, SyncPolicy, Triggers,
};
use tracing::{debug, instrument};

pub const DEFAULT_SYNC_TIMEOUT_SECONDS: u32 = 300;
pub const DEFAULT_RETRY_LIMIT: u32 = 3;
pub const DEFAULT_SOURCE_PATH: &str = ".";
pub const DEFAULT_COMMIT_BRANCH: &str = "main";
pub const DEFAULT_SOURCE_INCLUDE: &str = "{*.yml,*.yaml}";

/// Whether a field value counts as set
pub trait Presence {
    fn is_set(&self) -> bool;
}

impl Presence for String {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Presence for IndexMap<K, V> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for u32 {
    fn is_set(&self) -> bool {
        true
    }
}

impl Presence for SyncPolicy {
    fn is_set(&self) -> bool {
        true
    }
}

impl Presence for SecretsPolicy {
    fn is_set(&self) -> bool {
        true
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_set(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_set)
    }
}

/// First set value across `layers`, in order, or `None` from [`Origin::Default`]
pub fn coalesce_opt<'a, T, I>(layers: I) -> Resolved<Option<T>>
where
    T: Presence + Clone + 'a,
    I: IntoIterator<Item = (Origin, Option<&'a T>)>,
{
    layers
        .into_iter()
        .find_map(|(origin, value)| {
            value
                .filter(|v| v.is_set())
                .map(|v| Resolved::new(Some(v.clone()), origin))
        })
        .unwrap_or_else(|| Resolved::new(None, Origin::Default))
}

/// First set value across `layers`, falling back to `default`
pub fn coalesce<'a, T, I>(layers: I, default: T) -> Resolved<T>
where
    T: Presence + Clone + 'a,
    I: IntoIterator<Item = (Origin, Option<&'a T>)>,
{
    coalesce_opt(layers).map(|v| v.unwrap_or(default))
}

/// Destination, else group, else service, else `default`
pub fn first_set<T: Presence + Clone>(
    destination: Option<&T>,
    group: Option<&T>,
    service: Option<&T>,
    default: T,
) -> Resolved<T> {
    coalesce(
        [
            (Origin::Destination, destination),
            (Origin::Group, group),
            (Origin::Service, service),
        ],
        default,
    )
}

/// Inheritable fields of one level
#[derive(Clone, Copy)]
struct Layer<'a> {
    namespace: Option<&'a String>,
    argocd: &'a ArgoCdSettings,
    github: &'a GithubSettings,
}

/// The levels above a resolved node; `destination` is absent for groups
#[derive(Clone, Copy)]
struct Chain<'a> {
    destination: Option<Layer<'a>>,
    group: Layer<'a>,
    service: Layer<'a>,
}

impl<'a> Chain<'a> {
    fn pick<T, F>(&self, field: F, default: T) -> Resolved<T>
    where
        T: Presence + Clone + 'a,
        F: Fn(Layer<'a>) -> Option<&'a T>,
    {
        first_set(
            self.destination.and_then(&field),
            field(self.group),
            field(self.service),
            default,
        )
    }
}

fn resolve_settings(chain: &Chain<'_>) -> ResolvedSettings {
    ResolvedSettings {
        hostname: chain.pick(|l| l.argocd.hostname.as_ref(), String::new()),
        login_args: chain.pick(|l| Some(&l.argocd.login_command_args), Vec::new()),
        extra_args: chain.pick(|l| Some(&l.argocd.extra_args), Vec::new()),
        kube_context: chain.pick(|l| Some(&l.argocd.use_kube_context), None),
        sync_timeout_seconds: chain.pick(
            |l| l.argocd.sync_timeout_seconds.as_ref(),
            DEFAULT_SYNC_TIMEOUT_SECONDS,
        ),
        retry_limit: chain.pick(|l| l.argocd.retry_limit.as_ref(), DEFAULT_RETRY_LIMIT),
        sync_policy: chain.pick(|l| Some(&l.argocd.sync_policy), None),
        pre_deploy_steps: chain.pick(|l| Some(&l.github.pre_deploy_steps), Vec::<Step>::new()),
        post_deploy_steps: chain.pick(|l| Some(&l.github.post_deploy_steps), Vec::<Step>::new()),
        extra_deploy_jobs: chain.pick(
            |l| Some(&l.github.extra_deploy_jobs),
            IndexMap::<String, Job>::new(),
        ),
        env: chain.pick(|l| Some(&l.github.env), IndexMap::<String, String>::new()),
        secrets: chain.pick(|l| l.github.secrets.as_ref(), SecretsPolicy::default()),
    }
}

fn resolve_namespace(chain: &Chain<'_>) -> Resolved<String> {
    chain.pick(|l| l.namespace, String::new())
}

fn resolve_source(source: &Source) -> ResolvedSource {
    let or_default = |value: &Option<String>, default: &str| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    ResolvedSource {
        path: or_default(&source.path, DEFAULT_SOURCE_PATH),
        commit_branch: or_default(&source.commit_branch, DEFAULT_COMMIT_BRANCH),
        include: or_default(&source.include, DEFAULT_SOURCE_INCLUDE),
        exclude: source.exclude.clone().filter(|e| !e.is_empty()),
    }
}

fn resolve_group(group: &DestinationGroup, service_layer: Layer<'_>) -> ResolvedGroup {
    let group_chain = Chain {
        destination: None,
        group: Layer {
            namespace: group.destination_namespace.as_ref(),
            argocd: &group.argocd,
            github: &group.github,
        },
        service: service_layer,
    };

    let destinations = group
        .destinations
        .iter()
        .map(|destination| {
            let chain = Chain {
                destination: Some(Layer {
                    namespace: destination.namespace.as_ref(),
                    argocd: &destination.argocd,
                    github: &destination.github,
                }),
                ..group_chain
            };

            let resolved = ResolvedDestination {
                cluster_name: destination.name.clone(),
                server: destination.server.clone(),
                namespace: resolve_namespace(&chain),
                settings: resolve_settings(&chain),
            };

            debug!(
                group = %group.name,
                destination = %resolved.key(),
                hostname_from = %resolved.settings.hostname.origin,
                timeout_from = %resolved.settings.sync_timeout_seconds.origin,
                "Resolved destination"
            );

            resolved
        })
        .collect();

    ResolvedGroup {
        name: group.name.clone(),
        namespace: resolve_namespace(&group_chain),
        settings: resolve_settings(&group_chain),
        destinations,
    }
}

/// Resolve every inheritable field of `service` into a new tree.
///
/// The author tree is left untouched. This never fails: validation of the
/// result is a separate step.
#[instrument(skip_all, fields(service = %service.name))]
pub fn resolve(service: &Service) -> ResolvedService {
    let service_layer = Layer {
        namespace: service.destination_namespace.as_ref(),
        argocd: &service.argocd,
        github: &service.github.settings,
    };

    let groups: Vec<_> = service
        .destination_groups
        .iter()
        .map(|group| resolve_group(group, service_layer))
        .collect();

    debug!(groups = groups.len(), "Resolved service");

    ResolvedService {
        name: service.name.clone(),
        source: resolve_source(&service.source),
        uniqueness: service.application_name_uniqueness_strategy.clone(),
        triggers: service
            .github
            .on
            .clone()
            .filter(|on| !on.is_empty())
            .unwrap_or_else(Triggers::dispatch),
        groups,
    }
}
