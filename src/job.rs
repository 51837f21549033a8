//! # Job Model
//!
//! In-memory representation of a job definition and the documents that carry
//! them. A [`Job`] is deserialized from one entry of a document's `jobs`
//! list (or from a `defaults`/`global_defaults` block, or a named
//! requirement fragment), filled in by the merge engine, and finally read by
//! the materializer.
//!
//! Fields are grouped by concern:
//!
//! - identity and metadata (`name`, `labels`, `repo`, ...)
//! - execution spec (`image`, `command`, `env`, volumes, ...)
//! - CI behaviour (`branches`, `trigger`, templates, opaque Prow blocks, ...)
//! - classification (`types`, `modifiers`)
//! - schedule (`cron`, `interval`)
//! - inheritance (`require`, `requirements`)
//!
//! Every field defaults to its empty value so that "unset" and "empty" are
//! the same thing, which is what the merge engine keys on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};

/// The kind of record a job materializes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum JobType {
    /// Runs against a proposed change before it is merged.
    Presubmit,
    /// Runs after a change is merged.
    Postsubmit,
    /// Runs on a time-based trigger.
    Periodic,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Presubmit => "presubmit",
            JobType::Postsubmit => "postsubmit",
            JobType::Periodic => "periodic",
        }
    }
}

impl FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "presubmit" => Ok(JobType::Presubmit),
            "postsubmit" => Ok(JobType::Postsubmit),
            "periodic" => Ok(JobType::Periodic),
            other => Err(Error::UnknownJobType {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named flag that toggles one derived boolean on a materialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Modifier {
    /// Presubmit does not run on every change.
    Skipped,
    /// Presubmit failure does not block merging.
    Optional,
    /// Results are not reported back.
    Hidden,
    /// Job is hidden from public listings.
    Private,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Skipped => "skipped",
            Modifier::Optional => "optional",
            Modifier::Hidden => "hidden",
            Modifier::Private => "private",
        }
    }
}

impl FromStr for Modifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skipped" => Ok(Modifier::Skipped),
            "optional" => Ok(Modifier::Optional),
            "hidden" => Ok(Modifier::Hidden),
            "private" => Ok(Modifier::Private),
            other => Err(Error::UnknownModifier {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Modifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container environment variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Kubernetes `valueFrom` source, passed through untouched.
    #[serde(rename = "valueFrom", skip_serializing_if = "Option::is_none")]
    pub value_from: Option<Value>,
}

/// A job definition, or a partial one used as a defaults layer or
/// requirement fragment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Job {
    // Identity and metadata
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub namespace: String,
    #[serde(alias = "clusterName")]
    pub cluster: String,
    /// `org/repo` identifier of the repository the job belongs to.
    #[serde(rename = "repo")]
    pub org_repo: String,

    // Execution spec
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<EnvVar>,
    pub resources: Option<Value>,
    #[serde(alias = "volumeMounts")]
    pub volume_mounts: Vec<Value>,
    #[serde(alias = "securityContext")]
    pub security_context: Option<Value>,
    pub volumes: Vec<Value>,
    #[serde(alias = "nodeSelector")]
    pub node_selector: BTreeMap<String, String>,
    /// Additional repositories to check out, each `org/repo[@branch]`.
    pub extra_repos: Vec<String>,

    // CI behaviour
    pub branches: Vec<String>,
    pub skip_branches: Vec<String>,
    /// Only run when changed paths match this regex.
    pub regex: String,
    pub trigger: String,
    pub rerun_command: String,
    /// Path alias per organization.
    pub aliases: BTreeMap<String, String>,
    pub clone_tmpl: String,
    pub output_tmpl: String,
    pub max_concurrency: u32,
    pub timeout: String,
    pub decoration_config: Option<Value>,
    pub rerun_auth_config: Option<Value>,
    pub reporter_config: Option<Value>,

    // Classification
    pub types: Vec<JobType>,
    pub modifiers: Vec<Modifier>,

    // Schedule
    pub cron: String,
    pub interval: String,

    // Inheritance
    /// Requirement names applied in order after defaults.
    pub require: Vec<String>,
    /// Named fragments available to `require`.
    pub requirements: BTreeMap<String, Job>,
}

impl Job {
    /// Split the `repo` identifier into organization and repository.
    pub fn org_repo(&self) -> Result<OrgRepo> {
        self.org_repo.parse()
    }

    /// Parse every `extra_repos` entry.
    pub fn extra_repos(&self) -> Result<Vec<ExtraRepo>> {
        self.extra_repos.iter().map(|r| r.parse()).collect()
    }

    /// The job's types with duplicates removed, defaulting to presubmit when
    /// none are set.
    pub fn effective_types(&self) -> Vec<JobType> {
        if self.types.is_empty() {
            return vec![JobType::Presubmit];
        }

        let mut types = Vec::with_capacity(self.types.len());
        for job_type in &self.types {
            if !types.contains(job_type) {
                types.push(*job_type);
            }
        }
        types
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// An `org/repo` identifier split on its first `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrgRepo {
    pub org: String,
    pub repo: String,
}

impl FromStr for OrgRepo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((org, repo)) if !org.is_empty() && !repo.is_empty() => Ok(OrgRepo {
                org: org.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(Error::InvalidOrgRepo {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrgRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

/// An extra repository reference, `org/repo[@branch]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraRepo {
    pub org: String,
    pub repo: String,
    pub branch: String,
}

impl FromStr for ExtraRepo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidExtraRepo {
            value: s.to_string(),
        };

        let (org_repo, branch) = match s.split_once('@') {
            Some((_, "")) => return Err(invalid()),
            Some((org_repo, branch)) => (org_repo, branch),
            None => (s, DEFAULT_BRANCH),
        };
        let org_repo: OrgRepo = org_repo.parse().map_err(|_| invalid())?;

        Ok(ExtraRepo {
            org: org_repo.org,
            repo: org_repo.repo,
            branch: branch.to_string(),
        })
    }
}

/// One parsed input file.
///
/// Job entries are kept as raw YAML so that a single malformed entry can be
/// reported without discarding the rest of the document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobDocument {
    /// Defaults shared with every document (only meaningful in global files,
    /// but honoured in input documents too).
    pub global_defaults: Job,
    /// Defaults local to this document.
    pub defaults: Job,
    pub jobs: Vec<Value>,
}

impl JobDocument {
    /// Parse a document. Blank input is an empty document.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Deserialize each job entry independently, in document order.
    pub fn jobs(&self) -> impl Iterator<Item = Result<Job>> + '_ {
        self.jobs
            .iter()
            .map(|raw| serde_yaml::from_value::<Job>(raw.clone()).map_err(Error::Yaml))
    }

    /// A human-readable label for the job entry at `index`.
    pub fn job_label(&self, index: usize) -> String {
        match self
            .jobs
            .get(index)
            .and_then(|raw| raw.get("name"))
            .and_then(Value::as_str)
        {
            Some(name) => format!("job '{}'", name),
            None => format!("job #{}", index + 1),
        }
    }
}
