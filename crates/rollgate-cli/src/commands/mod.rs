//! Command implementations

pub mod generate;
pub mod plan;
pub mod validate;

use crate::error::{CliError, CliResult};
use crate::input::read_service;
use rollgate_pipeline::CompileError;
use rollgate_types::{Service, ValidationError};

/// Read a spec, treating an empty document as an invalid service
pub(crate) fn load_service(path: Option<&str>) -> CliResult<Service> {
    read_service(path)?
        .ok_or_else(|| CliError::Compile(CompileError::Invalid(ValidationError::NilService.into())))
}
