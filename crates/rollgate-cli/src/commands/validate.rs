//! `rollgate validate`

use super::load_service;
use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_success};
use clap::Args;
use rollgate_pipeline::{plan, CompileError};

/// Arguments for `validate`
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Service spec file (YAML, or JSON by extension); `-` reads stdin
    #[arg(short, long)]
    pub service_file: Option<String>,
}

/// Execute `validate`
///
/// Prints every problem found, one per line with its full context.
pub fn execute(args: ValidateArgs) -> CliResult<()> {
    let service = match load_service(args.service_file.as_deref()) {
        Ok(service) => service,
        Err(CliError::Compile(CompileError::Invalid(errors))) => return report(errors.leaves()),
        Err(e) => return Err(e),
    };

    match plan(&service) {
        Ok(plan) => {
            print_success(&format!(
                "Service {} is valid ({} groups, {} destinations)",
                plan.service.name,
                plan.service.groups.len(),
                plan.names.len()
            ));
            Ok(())
        }
        Err(CompileError::Invalid(errors)) => report(errors.leaves()),
        Err(CompileError::Naming(errors)) => {
            report(errors.iter().map(|e| e.to_string()).collect())
        }
        Err(e) => Err(e.into()),
    }
}

fn report(problems: Vec<String>) -> CliResult<()> {
    for problem in &problems {
        print_error(problem);
    }
    Err(CliError::InvalidInput(format!(
        "{} validation error(s)",
        problems.len()
    )))
}
