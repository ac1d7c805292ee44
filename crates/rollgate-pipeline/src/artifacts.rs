//! Generated artifact set and YAML emitter

use crate::error::{CompileError, Result, SynthesisError};
use crate::manifests::ManifestRecord;
use crate::synthesis::Pipeline;
use rollgate_types::{Application, Workflow};
use serde::Serialize;
use std::collections::HashSet;

/// Header written at the top of every rendered artifact
pub const GENERATED_HEADER: &str = "# Code generated by rollgate. DO NOT EDIT.\n";

/// A generated document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Manifest(Application),
    Workflow(Workflow),
}

/// A document and its repository-relative path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub path: String,
    pub document: Document,
}

/// A rendered artifact ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: String,
    pub contents: String,
}

/// Every artifact of one compile run: manifests first, then destination,
/// group and top-level workflows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// Assemble the set, rejecting two artifacts with the same path
    pub fn assemble(
        manifests: Vec<ManifestRecord>,
        pipeline: Pipeline,
    ) -> std::result::Result<Self, SynthesisError> {
        let Pipeline {
            top,
            groups,
            destinations,
        } = pipeline;

        let manifests = manifests.into_iter().map(|m| Artifact {
            path: m.path,
            document: Document::Manifest(m.application),
        });
        let workflows = destinations
            .into_iter()
            .chain(groups)
            .chain(std::iter::once(top))
            .map(|w| Artifact {
                path: w.path,
                document: Document::Workflow(w.workflow),
            });

        let mut seen = HashSet::new();
        let mut artifacts = Vec::new();
        for artifact in manifests.chain(workflows) {
            if !seen.insert(artifact.path.clone()) {
                return Err(SynthesisError::DuplicatePath(artifact.path));
            }
            artifacts.push(artifact);
        }

        Ok(Self { artifacts })
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    pub fn manifests(&self) -> impl Iterator<Item = (&str, &Application)> {
        self.artifacts.iter().filter_map(|a| match &a.document {
            Document::Manifest(app) => Some((a.path.as_str(), app)),
            Document::Workflow(_) => None,
        })
    }

    pub fn workflows(&self) -> impl Iterator<Item = (&str, &Workflow)> {
        self.artifacts.iter().filter_map(|a| match &a.document {
            Document::Workflow(wf) => Some((a.path.as_str(), wf)),
            Document::Manifest(_) => None,
        })
    }

    pub fn get(&self, path: &str) -> Option<&Document> {
        self.artifacts
            .iter()
            .find(|a| a.path == path)
            .map(|a| &a.document)
    }

    /// Render every artifact as YAML, in set order
    pub fn render(&self) -> Result<Vec<RenderedArtifact>> {
        self.artifacts
            .iter()
            .map(|artifact| {
                let body =
                    serde_yaml::to_string(&artifact.document).map_err(|source| {
                        CompileError::Render {
                            path: artifact.path.clone(),
                            source,
                        }
                    })?;
                Ok(RenderedArtifact {
                    path: artifact.path.clone(),
                    contents: format!("{}{}", GENERATED_HEADER, body),
                })
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::WorkflowRecord;

    fn record(path: &str, name: &str) -> WorkflowRecord {
        WorkflowRecord {
            path: path.to_string(),
            workflow: Workflow {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    fn pipeline(destination_path: &str) -> Pipeline {
        Pipeline {
            top: record("wf/rollgate-svc.yml", "svc"),
            groups: vec![record("wf/rollgate-svc-g.yml", "svc-g")],
            destinations: vec![record(destination_path, "svc-g-c1")],
        }
    }

    #[test]
    fn test_assemble_orders_workflow_tiers() {
        let set = ArtifactSet::assemble(vec![], pipeline("wf/rollgate-svc-g-c1.yml")).unwrap();
        let names: Vec<&str> = set.workflows().map(|(_, wf)| wf.name.as_str()).collect();
        assert_eq!(names, vec!["svc-g-c1", "svc-g", "svc"]);
        assert!(matches!(set.get("wf/rollgate-svc.yml"), Some(Document::Workflow(_))));
        assert_eq!(set.manifests().count(), 0);
    }

    #[test]
    fn test_assemble_rejects_duplicate_paths() {
        let err = ArtifactSet::assemble(vec![], pipeline("wf/rollgate-svc.yml")).unwrap_err();
        assert_eq!(err, SynthesisError::DuplicatePath("wf/rollgate-svc.yml".into()));
    }

    #[test]
    fn test_render_prefixes_header() {
        let set = ArtifactSet::assemble(vec![], pipeline("wf/a.yml")).unwrap();
        let rendered = set.render().unwrap();
        assert_eq!(rendered.len(), 3);
        assert!(rendered
            .iter()
            .all(|r| r.contents.starts_with(GENERATED_HEADER)));
        assert!(rendered[2].contents.contains("name: svc\n"));
    }
}
