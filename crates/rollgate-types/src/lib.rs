//! Rollgate Types - Core types for progressive service rollouts
//!
//! Rollgate compiles a declarative [`Service`] spec into GitOps target
//! manifests and a promotion pipeline that deploys each destination group
//! only after the previous group has fully succeeded.
//!
//! ## Key Concepts
//!
//! - **Service**: The author-supplied tree (service → groups → destinations)
//! - **ResolvedService**: The same tree with every inheritable field filled in,
//!   each value tagged with the level it came from
//! - **Destination**: One cluster + namespace target
//! - **DestinationGroup**: A promotion stage
//! - **Application**: The GitOps controller record generated per destination
//! - **Workflow**: The CI record generated per destination, group and service

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod ids;
pub mod manifest;
pub mod resolved;
pub mod sanitize;
pub mod spec;
pub mod workflow;

// Re-export main types
pub use error::{ErrorList, ValidationError, ValidationErrors};
pub use ids::DestinationKey;
pub use manifest::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, ObjectMeta,
    SourceDirectory,
};
pub use resolved::{
    Origin, Resolved, ResolvedDestination, ResolvedGroup, ResolvedService, ResolvedSettings,
    ResolvedSource,
};
pub use sanitize::{cluster_identity, sanitize, MAX_NAME_LEN};
pub use spec::{
    ArgoCdSettings, AutomatedSync, Destination, DestinationGroup, GithubSettings,
    SecretsPolicy, Service, ServiceGithub, Source, SyncPolicy, UniquenessStrategy,
};
pub use workflow::{
    CallTrigger, Concurrency, Defaults, DefaultsRun, DispatchTrigger, Job, PushTrigger, Step,
    Triggers, Workflow,
};
