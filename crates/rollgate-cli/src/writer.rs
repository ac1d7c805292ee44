//! Artifact writer
//!
//! Before writing, artifacts left by a previous run are removed: workflow
//! files carrying the generated prefix, and manifest files carrying the
//! generated header. Nothing else in either directory is touched.

use crate::error::CliResult;
use rollgate_pipeline::{RenderedArtifact, GENERATED_HEADER};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes rendered artifacts under a repository root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    manifest_dir: String,
    workflow_dir: String,
    workflow_prefix: String,
}

impl ArtifactWriter {
    pub fn new(
        root: impl Into<PathBuf>,
        manifest_dir: impl Into<String>,
        workflow_dir: impl Into<String>,
        workflow_prefix: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            manifest_dir: manifest_dir.into(),
            workflow_dir: workflow_dir.into(),
            workflow_prefix: workflow_prefix.into(),
        }
    }

    /// Remove previously generated artifacts, returning how many were removed
    pub fn clean(&self) -> CliResult<usize> {
        let prefix = format!("{}-", self.workflow_prefix);
        let mut removed = remove_matching(&self.root.join(&self.workflow_dir), |name, _| {
            name.starts_with(&prefix) && name.ends_with(".yml")
        })?;

        removed += remove_matching(&self.root.join(&self.manifest_dir), |name, path| {
            name.ends_with(".yaml") && is_generated(path)
        })?;

        debug!(removed, "Removed previously generated artifacts");
        Ok(removed)
    }

    /// Clean, then write every artifact, returning how many were written
    pub fn write(&self, artifacts: &[RenderedArtifact]) -> CliResult<usize> {
        self.clean()?;

        for artifact in artifacts {
            let path = self.root.join(&artifact.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &artifact.contents)?;
            info!(path = %artifact.path, "Wrote artifact");
        }

        Ok(artifacts.len())
    }
}

fn is_generated(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|contents| contents.starts_with(GENERATED_HEADER))
        .unwrap_or(false)
}

fn remove_matching(dir: &Path, matches: impl Fn(&str, &Path) -> bool) -> CliResult<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if matches(name, &path) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
