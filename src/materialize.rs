//! # Job Materialization
//!
//! Turns a fully merged job into one output record per job type.
//!
//! Materialization happens in two steps:
//!
//! 1. [`ResolvedJob::new`] validates the strings the records depend on (the
//!    `org/repo` identifier, extra repository references), resolves the
//!    clone URI template and settles the job's type set. This is the only
//!    step that can fail.
//! 2. [`materialize`] is a total function from a `ResolvedJob` to records.
//!
//! Modifiers map onto record flags as follows:
//!
//! | Modifier   | Effect                                   |
//! |------------|------------------------------------------|
//! | `skipped`  | presubmit `always_run` is false          |
//! | `optional` | presubmit `optional` is true             |
//! | `hidden`   | `skip_report` is true on every kind      |
//! | `private`  | `hidden` is true on every kind           |

use serde_yaml::{Mapping, Value};

use crate::error::{ErrorCollection, Result};
use crate::job::{ExtraRepo, Job, JobType, Modifier, OrgRepo};
use crate::records::{Brancher, Container, JobBase, Periodic, PodSpec, Postsubmit, Presubmit, Refs};
use crate::template::{self, TemplateVars};

/// A merged job whose derived values have been validated and computed.
#[derive(Debug, Clone)]
pub struct ResolvedJob {
    pub job: Job,
    pub org_repo: OrgRepo,
    pub extra_repos: Vec<ExtraRepo>,
    /// Deduplicated job types, never empty.
    pub types: Vec<JobType>,
    pub clone_uri: String,
}

impl ResolvedJob {
    /// Validate `job` and compute its derived values.
    ///
    /// Template failures are not fatal: the raw template is kept and the
    /// error is pushed onto `warnings`.
    pub fn new(job: Job, warnings: &mut ErrorCollection) -> Result<Self> {
        let org_repo = job.org_repo()?;
        let extra_repos = job.extra_repos()?;
        let types = job.effective_types();
        let clone_uri = template::resolve(
            &job.clone_tmpl,
            &TemplateVars::from(&org_repo),
            warnings,
        );

        Ok(Self {
            job,
            org_repo,
            extra_repos,
            types,
            clone_uri,
        })
    }

    pub fn vars(&self) -> TemplateVars<'_> {
        TemplateVars::from(&self.org_repo)
    }
}

/// One materialized output record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Presubmit(Presubmit),
    Postsubmit(Postsubmit),
    Periodic(Periodic),
}

impl Record {
    pub fn kind(&self) -> JobType {
        match self {
            Record::Presubmit(_) => JobType::Presubmit,
            Record::Postsubmit(_) => JobType::Postsubmit,
            Record::Periodic(_) => JobType::Periodic,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Presubmit(r) => &r.base.name,
            Record::Postsubmit(r) => &r.base.name,
            Record::Periodic(r) => &r.base.name,
        }
    }
}

/// Produce one record per job type, in type order.
pub fn materialize(resolved: &ResolvedJob) -> Vec<Record> {
    resolved
        .types
        .iter()
        .map(|job_type| match job_type {
            JobType::Presubmit => Record::Presubmit(presubmit(resolved)),
            JobType::Postsubmit => Record::Postsubmit(postsubmit(resolved)),
            JobType::Periodic => Record::Periodic(periodic(resolved)),
        })
        .collect()
}

fn presubmit(resolved: &ResolvedJob) -> Presubmit {
    let job = &resolved.job;
    Presubmit {
        base: job_base(resolved),
        always_run: !job.has_modifier(Modifier::Skipped),
        optional: job.has_modifier(Modifier::Optional),
        trigger: job.trigger.clone(),
        rerun_command: job.rerun_command.clone(),
        brancher: brancher(job),
        run_if_changed: job.regex.clone(),
        skip_report: job.has_modifier(Modifier::Hidden),
    }
}

fn postsubmit(resolved: &ResolvedJob) -> Postsubmit {
    let job = &resolved.job;
    Postsubmit {
        base: job_base(resolved),
        brancher: brancher(job),
        run_if_changed: job.regex.clone(),
        skip_report: job.has_modifier(Modifier::Hidden),
    }
}

fn periodic(resolved: &ResolvedJob) -> Periodic {
    let job = &resolved.job;
    Periodic {
        base: job_base(resolved),
        cron: job.cron.clone(),
        interval: job.interval.clone(),
        skip_report: job.has_modifier(Modifier::Hidden),
    }
}

fn brancher(job: &Job) -> Brancher {
    Brancher {
        branches: job.branches.clone(),
        skip_branches: job.skip_branches.clone(),
    }
}

fn job_base(resolved: &ResolvedJob) -> JobBase {
    let job = &resolved.job;
    JobBase {
        name: job.name.clone(),
        labels: job.labels.clone(),
        annotations: job.annotations.clone(),
        max_concurrency: job.max_concurrency,
        cluster: job.cluster.clone(),
        namespace: job.namespace.clone(),
        hidden: job.has_modifier(Modifier::Private),
        spec: PodSpec {
            containers: vec![Container {
                image: job.image.clone(),
                command: job.command.clone(),
                env: job.env.clone(),
                resources: job.resources.clone(),
                volume_mounts: job.volume_mounts.clone(),
                security_context: job.security_context.clone(),
            }],
            volumes: job.volumes.clone(),
            node_selector: job.node_selector.clone(),
        },
        decorate: true,
        skip_submodules: true,
        path_alias: job
            .aliases
            .get(&resolved.org_repo.org)
            .cloned()
            .unwrap_or_default(),
        clone_uri: resolved.clone_uri.clone(),
        extra_refs: resolved
            .extra_repos
            .iter()
            .cloned()
            .map(Refs::from)
            .collect(),
        decoration_config: decoration_config(job),
        rerun_auth_config: job.rerun_auth_config.clone(),
        reporter_config: job.reporter_config.clone(),
    }
}

/// The job's decoration block with its `timeout` filled from the job's
/// `timeout` field when the block does not set one.
fn decoration_config(job: &Job) -> Option<Value> {
    if job.timeout.is_empty() {
        return job.decoration_config.clone();
    }

    match job.decoration_config.clone() {
        None => {
            let mut block = Mapping::new();
            block.insert("timeout".into(), job.timeout.clone().into());
            Some(Value::Mapping(block))
        }
        Some(Value::Mapping(mut block)) => {
            if !block.contains_key("timeout") {
                block.insert("timeout".into(), job.timeout.clone().into());
            }
            Some(Value::Mapping(block))
        }
        other => other,
    }
}
