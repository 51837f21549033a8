//! Output records in the shape of Prow's job configuration.
//!
//! These types are a write-only contract: they are populated by the
//! materializer and serialized by the pipeline. Empty fields are omitted from
//! the rendered YAML.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::job::{EnvVar, ExtraRepo};

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// The job configuration written to one destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobConfig {
    /// Presubmits keyed by `org/repo`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub presubmits: BTreeMap<String, Vec<Presubmit>>,
    /// Postsubmits keyed by `org/repo`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub postsubmits: BTreeMap<String, Vec<Postsubmit>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub periodics: Vec<Periodic>,
}

impl JobConfig {
    /// True when no record of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.presubmits.values().all(Vec::is_empty)
            && self.postsubmits.values().all(Vec::is_empty)
            && self.periodics.is_empty()
    }

    pub fn presubmit_count(&self) -> usize {
        self.presubmits.values().map(Vec::len).sum()
    }

    pub fn postsubmit_count(&self) -> usize {
        self.postsubmits.values().map(Vec::len).sum()
    }

    pub fn periodic_count(&self) -> usize {
        self.periodics.len()
    }
}

/// A job run against a proposed change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presubmit {
    #[serde(flatten)]
    pub base: JobBase,
    pub always_run: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trigger: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rerun_command: String,
    #[serde(flatten)]
    pub brancher: Brancher,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_if_changed: String,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_report: bool,
}

/// A job run after a change is merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Postsubmit {
    #[serde(flatten)]
    pub base: JobBase,
    #[serde(flatten)]
    pub brancher: Brancher,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_if_changed: String,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_report: bool,
}

/// A job run on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Periodic {
    #[serde(flatten)]
    pub base: JobBase,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cron: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interval: String,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_report: bool,
}

/// Branch allow and deny lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Brancher {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_branches: Vec<String>,
}

/// Fields shared by every record kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobBase {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_concurrency: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    pub spec: PodSpec,
    pub decorate: bool,
    pub skip_submodules: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path_alias: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clone_uri: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_refs: Vec<Refs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerun_auth_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_config: Option<Value>,
}

/// The pod a job runs in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Value>,
    #[serde(rename = "nodeSelector", skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

/// The single test container of a job's pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Container {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
    #[serde(rename = "volumeMounts", skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<Value>,
    #[serde(rename = "securityContext", skip_serializing_if = "Option::is_none")]
    pub security_context: Option<Value>,
}

/// A repository checked out next to the job's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refs {
    pub org: String,
    pub repo: String,
    pub base_ref: String,
}

impl From<ExtraRepo> for Refs {
    fn from(extra: ExtraRepo) -> Self {
        Self {
            org: extra.org,
            repo: extra.repo,
            base_ref: extra.branch,
        }
    }
}
