//! CI workflow records
//!
//! The subset of the GitHub Actions workflow schema that Rollgate reads from
//! author specs (steps, extra jobs, triggers) and writes into generated
//! workflows. Empty fields are omitted on serialization.

use crate::spec::SecretsPolicy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A workflow document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Display name, also the source of the generated filename
    pub name: String,

    /// Events that start the workflow
    #[serde(default)]
    pub on: Triggers,

    /// Concurrency group for whole-workflow serialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    /// Default settings for `run` steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    /// Jobs keyed by job id, in declaration order
    #[serde(default)]
    pub jobs: IndexMap<String, Job>,
}

/// Workflow triggers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<DispatchTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_call: Option<CallTrigger>,
}

impl Triggers {
    /// Manual dispatch only
    pub fn dispatch() -> Self {
        Self {
            workflow_dispatch: Some(DispatchTrigger::default()),
            ..Default::default()
        }
    }

    /// Manual dispatch plus reuse from another workflow
    pub fn dispatch_and_call() -> Self {
        Self {
            workflow_dispatch: Some(DispatchTrigger::default()),
            workflow_call: Some(CallTrigger::default()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.push.is_none() && self.workflow_dispatch.is_none() && self.workflow_call.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushTrigger {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchTrigger {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallTrigger {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concurrency {
    pub group: String,

    #[serde(rename = "cancel-in-progress", default)]
    pub cancel_in_progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub run: DefaultsRun,
}

impl Defaults {
    pub fn bash() -> Self {
        Self {
            run: DefaultsRun {
                shell: Some("bash".into()),
                working_directory: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(
        rename = "working-directory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub working_directory: Option<String>,
}

/// A workflow job: either a list of steps, or a call to a reusable workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Jobs that must complete successfully before this one starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(rename = "runs-on", default, skip_serializing_if = "Vec::is_empty")]
    pub runs_on: Vec<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub permissions: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,

    #[serde(
        rename = "timeout-minutes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_minutes: Option<u32>,

    /// Reusable workflow reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub with: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<SecretsPolicy>,
}

impl Job {
    /// A job that delegates to another workflow file
    pub fn calling(name: impl Into<String>, uses: impl Into<String>, secrets: SecretsPolicy) -> Self {
        Self {
            name: Some(name.into()),
            uses: Some(uses.into()),
            secrets: Some(secrets),
            ..Default::default()
        }
    }

    pub fn is_reusable_call(&self) -> bool {
        self.uses.is_some()
    }
}

/// A single job step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(
        rename = "working-directory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub working_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub with: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(
        rename = "continue-on-error",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continue_on_error: Option<bool>,

    #[serde(
        rename = "timeout-minutes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_minutes: Option<u32>,
}

impl Step {
    /// A shell step
    pub fn run(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            run: Some(script.into()),
            ..Default::default()
        }
    }

    /// An action step
    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}
