//! `rollgate plan`

use super::load_service;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Args;
use rollgate_pipeline::{plan, Plan};
use rollgate_types::{Origin, Resolved};
use serde::Serialize;
use std::fmt::Display;
use tabled::Tabled;

/// Arguments for `plan`
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Service spec file (YAML, or JSON by extension); `-` reads stdin
    #[arg(short, long)]
    pub service_file: Option<String>,
}

/// Table row for one destination
#[derive(Debug, Serialize, Tabled)]
struct PlanRow {
    /// Stage number, starting at 1
    stage: usize,
    /// Group name
    group: String,
    /// Group this stage waits for
    after: String,
    /// Destination key
    destination: String,
    /// Derived resource name
    resource: String,
    /// Job key in the group workflow
    job: String,
    namespace: String,
    hostname: String,
    timeout: String,
    retries: String,
    secrets: String,
}

/// `value (origin)`, or just `value` when set on the destination
fn with_origin<T: Display>(resolved: &Resolved<T>) -> String {
    match resolved.origin {
        Origin::Destination => resolved.value.to_string(),
        origin => format!("{} ({})", resolved.value, origin),
    }
}

fn rows(plan: &Plan) -> Vec<PlanRow> {
    let mut rows = Vec::new();
    let mut after = "-".to_string();

    for (i, group) in plan.service.groups.iter().enumerate() {
        for destination in &group.destinations {
            let key = destination.key();
            let (resource, job) = plan
                .names
                .get(&key)
                .map(|n| (n.resource.clone(), n.job.clone()))
                .unwrap_or_default();
            let settings = &destination.settings;
            let secrets = settings.secrets.clone().map(|s| match s {
                rollgate_types::SecretsPolicy::Inherit => "inherit".to_string(),
                rollgate_types::SecretsPolicy::Explicit(map) => {
                    map.keys().cloned().collect::<Vec<_>>().join(",")
                }
            });

            rows.push(PlanRow {
                stage: i + 1,
                group: group.name.clone(),
                after: after.clone(),
                destination: key.to_string(),
                resource,
                job,
                namespace: with_origin(&destination.namespace),
                hostname: with_origin(&settings.hostname),
                timeout: with_origin(&settings.sync_timeout_seconds),
                retries: with_origin(&settings.retry_limit),
                secrets: with_origin(&secrets),
            });
        }
        after = group.name.clone();
    }

    rows
}

/// Execute `plan`
pub fn execute(args: PlanArgs, format: OutputFormat) -> CliResult<()> {
    let service = load_service(args.service_file.as_deref())?;
    let plan = plan(&service)?;
    output::print_output(rows(&plan), format)
}
