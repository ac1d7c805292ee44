//! Rollgate Pipeline - Compiles service specs into promotion pipelines
//!
//! Turns an author-supplied [`Service`](rollgate_types::Service) into GitOps
//! target manifests and a three-tier CI workflow graph in which every
//! destination group waits for the previous group to succeed.
//!
//! ## Stages
//!
//! 1. [`cascade`]: resolve inherited settings (destination → group → service → default)
//! 2. [`validate`]: aggregate every structural error, fail closed
//! 3. [`naming`]: derive stable resource and job names
//! 4. [`manifests`]: one target manifest per destination, indexed by destination key
//! 5. [`synthesis`]: destination, group and top-level workflows
//! 6. [`artifacts`]: the ordered artifact set and its YAML rendering
//!
//! ## Usage
//!
//! ```
//! use rollgate_pipeline::{compile, CompileOptions};
//! use rollgate_types::{ArgoCdSettings, Destination, DestinationGroup, Service};
//!
//! let service = Service {
//!     name: "checkout".into(),
//!     argocd: ArgoCdSettings {
//!         hostname: Some("argocd.example.com".into()),
//!         ..Default::default()
//!     },
//!     destination_groups: vec![DestinationGroup {
//!         name: "staging".into(),
//!         destinations: vec![Destination::named("c1", "web")],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let artifacts = compile(&service, &CompileOptions::new("https://github.com/acme/checkout.git"))?;
//! // one manifest, one destination workflow, one group workflow, one top-level workflow
//! assert_eq!(artifacts.len(), 4);
//! # Ok::<(), rollgate_pipeline::CompileError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod artifacts;
pub mod cascade;
pub mod compile;
pub mod error;
pub mod jobs;
pub mod manifests;
pub mod naming;
pub mod synthesis;
pub mod validate;

pub use artifacts::{Artifact, ArtifactSet, Document, RenderedArtifact, GENERATED_HEADER};
pub use cascade::{first_set, resolve};
pub use compile::{compile, plan, CompileOptions, Plan};
pub use error::{CompileError, NameError, NameErrors, Result, SynthesisError};
pub use manifests::{build_manifests, ManifestIndex, ManifestOptions, ManifestRecord};
pub use naming::{derive_job_name, derive_names, derive_resource_name, sanitize_identifier, NameTable};
pub use synthesis::{synthesize, Pipeline, WorkflowOptions, WorkflowRecord};
pub use validate::validate;
