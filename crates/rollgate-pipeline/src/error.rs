//! Pipeline error types

use rollgate_types::{DestinationKey, ErrorList, ValidationErrors};
use thiserror::Error;

/// Aggregated name-derivation errors
pub type NameErrors = ErrorList<NameError>;

/// Name derivation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name length exceeds {max} characters: {name} ({len} characters)")]
    TooLong { name: String, len: usize, max: usize },

    #[error("derived name is empty")]
    Empty,

    #[error("name {name} derived for both {first} and {second}")]
    Collision {
        name: String,
        first: DestinationKey,
        second: DestinationKey,
    },

    /// A problem tied to one destination
    #[error("deriving names for destination: {destination}: {error}")]
    Destination {
        destination: DestinationKey,
        error: Box<NameError>,
    },
}

/// Synthesis errors
///
/// These indicate a broken invariant between compile stages rather than a
/// problem in the author's spec, and abort the run. Name collisions an
/// author can cause are rejected earlier by validation or name derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("no manifest recorded for destination {0}")]
    MissingManifest(DestinationKey),

    #[error("no derived name recorded for destination {0}")]
    MissingName(DestinationKey),

    #[error("workflow {workflow} already defines job {job}")]
    DuplicateJob { workflow: String, job: String },

    #[error("workflow {workflow}: job name derived from {raw:?} is empty")]
    EmptyJobName { workflow: String, raw: String },

    #[error("artifact path {0} generated more than once")]
    DuplicatePath(String),
}

/// Errors from the full compile pipeline
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("deriving names: {0}")]
    Naming(#[from] NameErrors),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("rendering artifact {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type for compile operations
pub type Result<T> = std::result::Result<T, CompileError>;
