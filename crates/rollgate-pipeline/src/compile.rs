//! Compile entry point: spec in, artifact set out

use crate::artifacts::ArtifactSet;
use crate::cascade::resolve;
use crate::error::Result;
use crate::manifests::{build_manifests, ManifestOptions};
use crate::naming::{derive_names, NameTable};
use crate::synthesis::{synthesize, WorkflowOptions};
use crate::validate::validate;
use rollgate_types::{ResolvedService, Service};
use tracing::{info, instrument};

/// Options for a compile run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub manifests: ManifestOptions,
    pub workflows: WorkflowOptions,
}

impl CompileOptions {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            manifests: ManifestOptions::new(repo_url),
            workflows: WorkflowOptions::default(),
        }
    }
}

/// A validated service with its derived names
#[derive(Debug, Clone)]
pub struct Plan {
    pub service: ResolvedService,
    pub names: NameTable,
}

/// Resolve, validate (fail closed) and derive names
#[instrument(skip_all, fields(service = %service.name))]
pub fn plan(service: &Service) -> Result<Plan> {
    let resolved = resolve(service);
    validate(&resolved)?;
    let names = derive_names(&resolved)?;
    Ok(Plan {
        service: resolved,
        names,
    })
}

/// Compile a service spec into its full artifact set.
///
/// Nothing is produced unless the spec is structurally valid and every
/// derived name fits.
#[instrument(skip_all, fields(service = %service.name))]
pub fn compile(service: &Service, options: &CompileOptions) -> Result<ArtifactSet> {
    let Plan { service, names } = plan(service)?;
    let (manifests, index) = build_manifests(&service, &names, &options.manifests)?;
    let pipeline = synthesize(&service, &names, &index, &options.workflows)?;
    let artifacts = ArtifactSet::assemble(manifests, pipeline)?;

    info!(
        groups = service.groups.len(),
        destinations = names.len(),
        artifacts = artifacts.len(),
        "Compiled service"
    );
    Ok(artifacts)
}
