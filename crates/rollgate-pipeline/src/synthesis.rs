//! Promotion pipeline synthesis
//!
//! Three tiers of workflows:
//!
//! - one per destination, holding its deploy job (plus any extra jobs)
//! - one per group, calling every destination workflow of the group in parallel
//! - one top-level workflow, calling the group workflows in declared order,
//!   each group job needing the previous one

use crate::error::SynthesisError;
use crate::jobs::{deploy_job, DeployJobInput};
use crate::manifests::{join_path, ManifestIndex};
use crate::naming::{sanitize_identifier, NameTable};
use indexmap::IndexMap;
use rollgate_types::{
    Concurrency, Defaults, Job, ResolvedDestination, ResolvedGroup, ResolvedService,
    Triggers, Workflow,
};
use tracing::{debug, instrument};

pub const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";
pub const DEFAULT_WORKFLOW_PREFIX: &str = "rollgate";
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Workflow generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Repository-relative workflow directory
    pub output_dir: String,
    /// Filename prefix marking generated workflows
    pub prefix: String,
    pub runs_on: Vec<String>,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_WORKFLOW_DIR.to_string(),
            prefix: DEFAULT_WORKFLOW_PREFIX.to_string(),
            runs_on: vec![DEFAULT_RUNNER.to_string()],
        }
    }
}

impl WorkflowOptions {
    /// Generated filename for a workflow name
    pub fn file_name(&self, workflow_name: &str) -> String {
        format!("{}-{}.yml", self.prefix, sanitize_identifier(workflow_name))
    }

    /// Repository-relative path for a workflow name
    pub fn path(&self, workflow_name: &str) -> String {
        join_path(&self.output_dir, &self.file_name(workflow_name))
    }

    /// Reference used by jobs that call the workflow
    pub fn uses(&self, workflow_name: &str) -> String {
        format!("./{}", self.path(workflow_name))
    }
}

/// A workflow and where it is written
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRecord {
    pub path: String,
    pub workflow: Workflow,
}

/// The synthesized promotion pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub top: WorkflowRecord,
    /// One per group, in declared order
    pub groups: Vec<WorkflowRecord>,
    /// One per destination, in declared order
    pub destinations: Vec<WorkflowRecord>,
}

impl Pipeline {
    /// Destination workflows, group workflows, then the top-level workflow
    pub fn workflows(&self) -> impl Iterator<Item = &WorkflowRecord> {
        self.destinations
            .iter()
            .chain(self.groups.iter())
            .chain(std::iter::once(&self.top))
    }
}

/// A promotion stage before `needs` edges are stitched in
struct Stage {
    key: String,
    job: Job,
}

fn insert_job(
    jobs: &mut IndexMap<String, Job>,
    workflow: &str,
    key: String,
    job: Job,
) -> Result<(), SynthesisError> {
    if jobs.contains_key(&key) {
        return Err(SynthesisError::DuplicateJob {
            workflow: workflow.to_string(),
            job: key,
        });
    }
    jobs.insert(key, job);
    Ok(())
}

fn destination_workflow(
    service: &ResolvedService,
    destination: &ResolvedDestination,
    resource_name: &str,
    job_name: &str,
    manifest_path: &str,
    options: &WorkflowOptions,
) -> Workflow {
    let identity = destination.cluster_identity();
    let deploy = deploy_job(DeployJobInput {
        resource_name,
        identity: &identity,
        commit_branch: &service.source.commit_branch,
        manifest_path,
        settings: &destination.settings,
        runs_on: &options.runs_on,
    });

    // Extra jobs keep their own keys; the deploy job replaces any extra job
    // sharing its key
    let mut jobs = destination.settings.extra_deploy_jobs.value.clone();
    jobs.insert(job_name.to_string(), deploy);

    Workflow {
        name: resource_name.to_string(),
        on: Triggers::dispatch_and_call(),
        concurrency: Some(Concurrency {
            group: resource_name.to_string(),
            cancel_in_progress: false,
        }),
        defaults: Some(Defaults::bash()),
        jobs,
    }
}

fn group_workflow_name(service: &ResolvedService, group: &ResolvedGroup) -> String {
    format!("{}-{}", service.name, group.name)
}

/// Build the three workflow tiers.
///
/// Every destination must have an entry in both `names` and `manifests`; a
/// missing entry is a broken invariant and aborts synthesis.
#[instrument(skip_all, fields(service = %service.name))]
pub fn synthesize(
    service: &ResolvedService,
    names: &NameTable,
    manifests: &ManifestIndex,
    options: &WorkflowOptions,
) -> Result<Pipeline, SynthesisError> {
    let mut destinations = Vec::new();
    let mut groups = Vec::new();
    let mut stages = Vec::with_capacity(service.groups.len());

    for group in &service.groups {
        let group_name = group_workflow_name(service, group);
        let mut group_jobs = IndexMap::new();

        for destination in &group.destinations {
            let key = destination.key();
            let derived = names
                .get(&key)
                .ok_or_else(|| SynthesisError::MissingName(key.clone()))?;
            let manifest_path = manifests
                .get(&key)
                .ok_or_else(|| SynthesisError::MissingManifest(key.clone()))?;

            let workflow = destination_workflow(
                service,
                destination,
                &derived.resource,
                &derived.job,
                manifest_path,
                options,
            );
            destinations.push(WorkflowRecord {
                path: options.path(&workflow.name),
                workflow,
            });

            insert_job(
                &mut group_jobs,
                &group_name,
                derived.job.clone(),
                Job::calling(
                    derived.resource.clone(),
                    options.uses(&derived.resource),
                    destination.settings.secrets.value.clone(),
                ),
            )?;
        }

        let stage_key = group.stage_key();
        if stage_key.is_empty() {
            return Err(SynthesisError::EmptyJobName {
                workflow: service.name.clone(),
                raw: group.name.clone(),
            });
        }
        stages.push(Stage {
            key: stage_key,
            job: Job::calling(
                group.name.clone(),
                options.uses(&group_name),
                group.settings.secrets.value.clone(),
            ),
        });

        debug!(group = %group.name, destinations = group_jobs.len(), "Synthesized group");
        groups.push(WorkflowRecord {
            path: options.path(&group_name),
            workflow: Workflow {
                name: group_name,
                on: Triggers::dispatch_and_call(),
                concurrency: None,
                defaults: None,
                jobs: group_jobs,
            },
        });
    }

    // Each stage waits for exactly the stage before it
    let previous: Vec<Option<String>> = std::iter::once(None)
        .chain(stages.iter().map(|s| Some(s.key.clone())))
        .collect();
    let mut top_jobs = IndexMap::new();
    for (stage, needs) in stages.into_iter().zip(previous) {
        let mut job = stage.job;
        job.needs = needs.into_iter().collect();
        insert_job(&mut top_jobs, &service.name, stage.key, job)?;
    }

    let top = WorkflowRecord {
        path: options.path(&service.name),
        workflow: Workflow {
            name: service.name.clone(),
            on: service.triggers.clone(),
            concurrency: None,
            defaults: None,
            jobs: top_jobs,
        },
    };

    Ok(Pipeline {
        top,
        groups,
        destinations,
    })
}
