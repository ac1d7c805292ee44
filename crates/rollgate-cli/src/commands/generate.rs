//! `rollgate generate`

use super::load_service;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::print_success;
use crate::writer::ArtifactWriter;
use clap::Args;
use rollgate_pipeline::{compile, CompileOptions};
use tracing::info;

/// Arguments for `generate`
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Repository URL the GitOps controller pulls manifests from
    #[arg(short, long, env = "ROLLGATE_REPO_URL")]
    pub repo_url: Option<String>,

    /// Service spec file (YAML, or JSON by extension); `-` reads stdin
    #[arg(short, long)]
    pub service_file: Option<String>,

    /// Initial target revision written into manifests
    #[arg(long)]
    pub target_revision: Option<String>,

    /// Directory for generated manifests
    #[arg(long)]
    pub manifest_output_path: Option<String>,

    /// Directory for generated workflows
    #[arg(long)]
    pub workflow_output_path: Option<String>,

    /// Print artifacts to stdout instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Merge flags over config-file values over built-in defaults
    pub fn compile_options(&self, config: &CliConfig) -> CliResult<CompileOptions> {
        let repo_url = self
            .repo_url
            .clone()
            .or_else(|| config.repo_url.clone())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CliError::InvalidInput("--repo-url is required".into()))?;

        let mut options = CompileOptions::new(repo_url);
        let manifests = &mut options.manifests;
        if let Some(revision) = self.target_revision.clone().or_else(|| config.target_revision.clone()) {
            manifests.target_revision = revision;
        }
        if let Some(dir) = self
            .manifest_output_path
            .clone()
            .or_else(|| config.manifest_output_path.clone())
        {
            manifests.output_dir = dir;
        }
        if let Some(namespace) = config.application_namespace.clone() {
            manifests.application_namespace = namespace;
        }
        if let Some(project) = config.project.clone() {
            manifests.project = project;
        }

        let workflows = &mut options.workflows;
        if let Some(dir) = self
            .workflow_output_path
            .clone()
            .or_else(|| config.workflow_output_path.clone())
        {
            workflows.output_dir = dir;
        }
        if let Some(runs_on) = config.runs_on.clone().filter(|r| !r.is_empty()) {
            workflows.runs_on = runs_on;
        }

        Ok(options)
    }
}

/// Execute `generate`
pub fn execute(args: GenerateArgs, config: &CliConfig) -> CliResult<()> {
    let options = args.compile_options(config)?;
    let service = load_service(args.service_file.as_deref())?;
    let artifacts = compile(&service, &options)?;
    let rendered = artifacts.render()?;

    if args.dry_run {
        for (i, artifact) in rendered.iter().enumerate() {
            if i > 0 {
                println!("---");
            }
            println!("# Source: {}", artifact.path);
            print!("{}", artifact.contents);
        }
        return Ok(());
    }

    let writer = ArtifactWriter::new(
        ".",
        options.manifests.output_dir.clone(),
        options.workflows.output_dir.clone(),
        options.workflows.prefix.clone(),
    );
    let written = writer.write(&rendered)?;
    info!(service = %service.name, written, "Generation complete");
    print_success(&format!(
        "Generated {} artifacts for service {}",
        written, service.name
    ));
    Ok(())
}
